use core::fmt;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::{
    config::BlobConfig,
    error::{BlobError, Result},
    policy::{CapacityPlan, Footprint, GrowthPolicy},
    storage::Storage,
};

/// 底层重新分配的三态结果。
///
/// - `Failed`：增长策略无法满足请求，blob 保持调用前状态；
/// - `Resized`：成功，携带调整后的容量；
/// - `Freed`：请求大小为 0，blob 因此被释放。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reallocation {
    Failed,
    Resized { capacity: usize },
    Freed,
}

/// `Blob` 是独占所有权的可增长二进制缓冲。
///
/// # 设计动机（Why）
/// - 序列化、收发、摘要等场景都需要一块“逻辑长度可变、容量由策略决定”的连续内存；
/// - 把容量变化委托给 [`GrowthPolicy`]，调用方只关心逻辑长度，内存开销与分配频率的取舍留给构造时决定。
///
/// # 结构设计（How）
/// - `storage` 为 `None` 表示已释放，这是终态；
/// - `length` 为逻辑长度，`storage` 的长度即容量，二者满足 `length <= capacity`；
/// - `limit` 来自配置的容量上限，超过上限的分配按失败处理。
///
/// # 契约说明（What）
/// - 除 [`is_freed`](Self::is_freed) 与重复的 [`free`](Self::free) 外，已释放 blob 上的任何操作都返回
///   [`BlobError::UseAfterFree`]；
/// - 借出的切片视图与 `&self`/`&mut self` 等长，借用规则保证视图不会跨越 resize 或 free；
/// - `Clone` 深拷贝存储，不存在只复制头部元数据的别名。
///
/// # 风险提示（Trade-offs）
/// - 存储区整体零初始化，换来无 `unsafe` 的切片访问，代价是增长时多一次清零写入。
#[derive(Clone)]
pub struct Blob {
    storage: Option<Storage>,
    length: usize,
    policy: GrowthPolicy,
    limit: Option<usize>,
}

impl Blob {
    /// 创建初始容量至少为 `initial_size` 的空 blob（逻辑长度为 0）。
    ///
    /// `initial_size` 为 0 时返回 `InvalidArgument`；初始分配同样经过增长策略，
    /// 因此 `RoundedReserve` 会把初始容量取整到边界。
    pub fn new(initial_size: usize, policy: GrowthPolicy) -> Result<Self> {
        Self::create(initial_size, policy, None)
    }

    /// 按配置创建 blob，容量上限一并生效。
    pub fn with_config(config: &BlobConfig) -> Result<Self> {
        config.validate()?;
        Self::create(
            config.initial_size,
            config.growth_policy()?,
            config.max_capacity,
        )
    }

    /// 创建后立即把逻辑长度设为 `len`，内容全部为零。
    ///
    /// 供“创建后马上写入”的调用方使用，例如读取子 blob 与摘要输出。
    pub fn with_len(len: usize, policy: GrowthPolicy) -> Result<Self> {
        let mut blob = Self::new(len, policy)?;
        blob.resize(len, false)?;
        Ok(blob)
    }

    /// 以给定字节创建 blob；空切片仍会分配 1 字节以满足构造约束。
    pub fn from_slice(data: &[u8], policy: GrowthPolicy) -> Result<Self> {
        let mut blob = Self::new(data.len().max(1), policy)?;
        if !data.is_empty() {
            blob.resize(data.len(), false)?;
            blob.as_bytes_mut()?.copy_from_slice(data);
        }
        Ok(blob)
    }

    fn create(initial_size: usize, policy: GrowthPolicy, limit: Option<usize>) -> Result<Self> {
        if initial_size == 0 {
            return Err(BlobError::invalid_argument(
                "argument out of range; initial size must be greater than 0",
            ));
        }
        let empty = Footprint {
            length: 0,
            capacity: 0,
        };
        let target = match policy.plan(empty, initial_size) {
            CapacityPlan::Reallocate { target, .. } => {
                clamp_to_limit(target, initial_size, limit)
            }
            CapacityPlan::Keep => initial_size,
        };
        let storage = Storage::allocate(target, limit).map_err(|_| {
            warn!(
                policy = policy.name(),
                requested = initial_size,
                "failed to allocate initial blob memory"
            );
            BlobError::AllocationFailure {
                requested: initial_size,
                capacity: 0,
            }
        })?;
        trace!(policy = policy.name(), capacity = target, "blob created");
        Ok(Self {
            storage: Some(storage),
            length: 0,
            policy,
            limit,
        })
    }

    /// 构造时确定的增长策略。
    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// 是否已释放。该查询在释放后依然可用。
    pub fn is_freed(&self) -> bool {
        self.storage.is_none()
    }

    /// 逻辑长度。
    pub fn len(&self) -> Result<usize> {
        self.live().map(|_| self.length)
    }

    /// 逻辑长度是否为 0。
    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }

    /// 已分配容量。
    pub fn capacity(&self) -> Result<usize> {
        self.live().map(Storage::capacity)
    }

    /// 逻辑内容 `[0, length)` 的只读视图。
    pub fn as_bytes(&self) -> Result<&[u8]> {
        let length = self.length;
        self.live().map(|storage| &storage.as_slice()[..length])
    }

    /// 逻辑内容 `[0, length)` 的可写视图。
    pub fn as_bytes_mut(&mut self) -> Result<&mut [u8]> {
        let length = self.length;
        self.live_mut()
            .map(|storage| &mut storage.as_mut_slice()[..length])
    }

    /// 只读子区间 `[start, start + count)`；`count` 缺省时取到逻辑末尾。
    pub fn range(&self, start: usize, count: Option<usize>) -> Result<&[u8]> {
        let span = self.span(start, count)?;
        Ok(&self.as_bytes()?[span])
    }

    /// 可写子区间，边界规则同 [`range`](Self::range)。
    pub fn range_mut(&mut self, start: usize, count: Option<usize>) -> Result<&mut [u8]> {
        let span = self.span(start, count)?;
        Ok(&mut self.as_bytes_mut()?[span])
    }

    fn span(&self, start: usize, count: Option<usize>) -> Result<core::ops::Range<usize>> {
        let length = self.len()?;
        if start > length {
            return Err(BlobError::out_of_range(format!(
                "start {start} exceeds blob length {length}"
            )));
        }
        let count = count.unwrap_or(length - start);
        match start.checked_add(count) {
            Some(end) if end <= length => Ok(start..end),
            _ => Err(BlobError::out_of_range(format!(
                "range {start}+{count} exceeds blob length {length}"
            ))),
        }
    }

    /// 底层重新分配：按增长策略把容量调整到能容纳 `size` 字节。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：把“失败 / 成功 / 因请求为 0 而释放”三种结局显式建模，替代整数编码。
    /// - **执行 (How)**：`size == 0` 直接释放；否则向策略索取 [`CapacityPlan`] 并执行；
    ///   成功后若逻辑长度超过 `size` 则截断到 `size`。
    /// - **契约 (What)**：返回 `Failed` 时存储与逻辑长度均未改变；该方法不做零填充，
    ///   零填充由 [`resize`](Self::resize) 负责。
    pub fn reallocate(&mut self, size: usize) -> Result<Reallocation> {
        if size == 0 {
            self.live()?;
            self.free();
            return Ok(Reallocation::Freed);
        }
        let policy = self.policy;
        let limit = self.limit;
        let length = self.length;
        let storage = self.live_mut()?;
        let capacity = storage.capacity();
        let footprint = Footprint { length, capacity };

        let capacity = match policy.plan(footprint, size) {
            CapacityPlan::Keep => capacity,
            CapacityPlan::Reallocate {
                target,
                keep_on_failure,
            } => {
                let target = clamp_to_limit(target, size, limit);
                match storage.reallocate(target, limit) {
                    Ok(()) => {
                        trace!(
                            policy = policy.name(),
                            from = capacity,
                            to = target,
                            "blob storage reallocated"
                        );
                        target
                    }
                    Err(_) if keep_on_failure && capacity >= size => {
                        debug!(
                            policy = policy.name(),
                            requested = size,
                            capacity,
                            "reallocation failed; existing capacity already covers request"
                        );
                        capacity
                    }
                    Err(_) => {
                        warn!(
                            policy = policy.name(),
                            requested = size,
                            target,
                            capacity,
                            "growth policy could not satisfy reallocation"
                        );
                        return Ok(Reallocation::Failed);
                    }
                }
            }
        };

        if self.length > size {
            self.length = size;
        }
        debug_assert!(self.length <= capacity);
        Ok(Reallocation::Resized { capacity })
    }

    /// 调整逻辑长度。
    ///
    /// - `size` 大于当前长度时增长，新暴露的 `[旧长度, size)` 全部清零；
    /// - `trim` 为真时允许收缩到 `size`；为假且 `size <= 长度` 时不做任何事；
    /// - `size == 0` 返回 `InvalidArgument`（释放请使用 [`free`](Self::free)）；
    /// - 策略分配失败返回 `AllocationFailure`，blob 保持原状。
    pub fn resize(&mut self, size: usize, trim: bool) -> Result<()> {
        self.live()?;
        if size == 0 {
            return Err(BlobError::invalid_argument(
                "new size must be greater than 0",
            ));
        }
        if size <= self.length && !trim {
            return Ok(());
        }

        let old_length = self.length;
        match self.reallocate(size)? {
            Reallocation::Resized { .. } => {}
            Reallocation::Failed => {
                return Err(BlobError::AllocationFailure {
                    requested: size,
                    capacity: self.capacity()?,
                });
            }
            Reallocation::Freed => return Err(BlobError::UseAfterFree),
        }

        self.length = size;
        if size > old_length {
            self.as_bytes_mut()?[old_length..size].fill(0);
        }
        Ok(())
    }

    /// 确保逻辑长度至少为 `size`，不足时按 [`resize`](Self::resize) 增长。
    pub fn ensure_len(&mut self, size: usize) -> Result<()> {
        if size > self.len()? {
            self.resize(size, false)?;
        }
        Ok(())
    }

    /// 把逻辑长度降到 `len`，不触发重新分配。
    pub(crate) fn truncate(&mut self, len: usize) -> Result<()> {
        let length = self.len()?;
        self.length = length.min(len);
        Ok(())
    }

    /// 将 `[start, start + count)` 清零。
    ///
    /// - 指定 `count` 且区间超出逻辑长度时先增长再清零；
    /// - 未指定 `count` 时清到逻辑末尾，此时 `start` 超过长度返回 `OutOfRange`。
    pub fn clear(&mut self, start: usize, count: Option<usize>) -> Result<()> {
        let length = self.len()?;
        let end = match count {
            Some(count) => {
                let end = start.checked_add(count).ok_or_else(|| {
                    BlobError::out_of_range(format!("clear range {start}+{count} overflows"))
                })?;
                self.ensure_len(end)?;
                end
            }
            None => {
                if start > length {
                    return Err(BlobError::out_of_range(format!(
                        "clear start {start} exceeds blob length {length}"
                    )));
                }
                length
            }
        };
        self.as_bytes_mut()?[start..end].fill(0);
        Ok(())
    }

    /// 释放存储并进入终态；重复调用无副作用。
    pub fn free(&mut self) {
        if let Some(storage) = self.storage.take() {
            debug!(
                policy = self.policy.name(),
                capacity = storage.capacity(),
                "blob freed"
            );
        }
        self.length = 0;
    }

    /// 内容相等：同一实例直接相等；否则逻辑长度与字节内容均一致才相等。
    ///
    /// 任一方已释放时返回 `UseAfterFree`。
    pub fn equals(&self, other: &Blob) -> Result<bool> {
        if core::ptr::eq(self, other) {
            self.live()?;
            return Ok(true);
        }
        Ok(self.as_bytes()? == other.as_bytes()?)
    }

    /// 把逻辑内容复制为不可变的 [`Bytes`]，用于交给持久化或传输层。
    pub fn freeze(&self) -> Result<Bytes> {
        self.as_bytes().map(Bytes::copy_from_slice)
    }

    /// 逻辑内容的拥有型副本。
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        self.as_bytes().map(<[u8]>::to_vec)
    }

    fn live(&self) -> Result<&Storage> {
        self.storage.as_ref().ok_or(BlobError::UseAfterFree)
    }

    fn live_mut(&mut self) -> Result<&mut Storage> {
        self.storage.as_mut().ok_or(BlobError::UseAfterFree)
    }
}

/// 取整后的目标超过容量上限而请求本身仍在上限内时，收敛到上限。
fn clamp_to_limit(target: usize, size: usize, limit: Option<usize>) -> usize {
    match limit {
        Some(limit) if target > limit && size <= limit => limit,
        _ => target,
    }
}

impl Default for Blob {
    /// 8 字节初始容量、`Exact` 策略的空 blob。
    fn default() -> Self {
        let storage = Storage::allocate(BlobConfig::DEFAULT_INITIAL_SIZE, None).ok();
        Self {
            storage,
            length: 0,
            policy: GrowthPolicy::Exact,
            limit: None,
        }
    }
}

impl PartialEq for Blob {
    /// 两个已释放的 blob 视为相等；仅一方释放时不等；其余按内容比较。
    fn eq(&self, other: &Self) -> bool {
        match (self.as_bytes(), other.as_bytes()) {
            (Ok(lhs), Ok(rhs)) => lhs == rhs,
            (Err(_), Err(_)) => true,
            _ => false,
        }
    }
}

impl Eq for Blob {}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("length", &self.length)
            .field("capacity", &self.storage.as_ref().map_or(0, Storage::capacity))
            .field("policy", &self.policy)
            .field("freed", &self.is_freed())
            .finish()
    }
}

impl fmt::Display for Blob {
    /// 空或已释放的 blob 显示为 `{empty blob}`，否则把原始字节按文本输出（非 UTF-8 字节有损替换）。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_bytes() {
            Ok(bytes) if !bytes.is_empty() => f.write_str(&String::from_utf8_lossy(bytes)),
            _ => f.write_str("{empty blob}"),
        }
    }
}
