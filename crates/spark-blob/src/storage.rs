//! blob 的底层存储。
//!
//! 存储区始终整体初始化（`Vec` 的长度即容量），因此无需 `unsafe` 即可暴露任意子区间的切片；
//! 逻辑长度由上层 [`Blob`](crate::Blob) 维护。

/// 分配器无法满足请求。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AllocError;

#[derive(Clone, Default)]
pub(crate) struct Storage {
    bytes: Vec<u8>,
}

impl Storage {
    /// 分配 `capacity` 字节的零初始化存储。
    pub(crate) fn allocate(capacity: usize, limit: Option<usize>) -> Result<Self, AllocError> {
        let mut storage = Self::default();
        storage.reallocate(capacity, limit)?;
        Ok(storage)
    }

    pub(crate) fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// 把容量调整为 `target`；失败时存储保持原样。
    ///
    /// - 增长通过 `try_reserve_exact` 申请，分配失败不会 abort 进程；
    /// - `limit` 是配置给出的容量上限，超过即按分配失败处理；
    /// - 收缩会截断并归还多余内存。
    pub(crate) fn reallocate(
        &mut self,
        target: usize,
        limit: Option<usize>,
    ) -> Result<(), AllocError> {
        if limit.is_some_and(|limit| target > limit) {
            return Err(AllocError);
        }
        let current = self.bytes.len();
        if target > current {
            self.bytes
                .try_reserve_exact(target - current)
                .map_err(|_| AllocError)?;
            self.bytes.resize(target, 0);
        } else if target < current {
            self.bytes.truncate(target);
            self.bytes.shrink_to_fit();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grow_and_shrink_keep_prefix() {
        let mut storage = Storage::allocate(4, None).expect("分配 4 字节");
        storage.as_mut_slice().copy_from_slice(&[1, 2, 3, 4]);
        storage.reallocate(8, None).expect("增长到 8 字节");
        assert_eq!(storage.as_slice(), &[1, 2, 3, 4, 0, 0, 0, 0]);
        storage.reallocate(2, None).expect("收缩到 2 字节");
        assert_eq!(storage.as_slice(), &[1, 2]);
    }

    #[test]
    fn limit_rejects_without_touching_storage() {
        let mut storage = Storage::allocate(4, Some(8)).expect("上限内分配");
        storage.as_mut_slice()[0] = 9;
        assert_eq!(storage.reallocate(9, Some(8)), Err(AllocError));
        assert_eq!(storage.capacity(), 4);
        assert_eq!(storage.as_slice()[0], 9);
    }

    #[test]
    fn impossible_request_is_reported_not_aborted() {
        let mut storage = Storage::allocate(1, None).expect("分配 1 字节");
        assert_eq!(storage.reallocate(usize::MAX, None), Err(AllocError));
        assert_eq!(storage.capacity(), 1);
    }
}
