//! blob 与字节流之间的收发适配。
//!
//! # 教案背景（Why）
//! - 网络或文件层常见的诉求是“把 blob 的一段发出去”与“把对端数据收进 blob 的某个位置”；
//! - 适配层只依赖 [`std::io::Read`]/[`std::io::Write`]，对具体传输保持无感。
//!
//! # 契约说明（What）
//! - 区间越界返回 `OutOfRange`，已释放 blob 返回 `UseAfterFree`；
//! - 底层 I/O 失败映射为 [`BlobError::Io`]，`Interrupted` 会被透明重试。

use std::io::{self, Read, Write};

use tracing::trace;

use crate::{
    blob::Blob,
    error::{BlobError, Result},
};

impl Blob {
    /// 把 `[start, start + count)` 整段写入 `writer`，返回写出的字节数。
    ///
    /// `count` 缺省时发送到逻辑末尾。
    pub fn send_to<W: Write>(
        &self,
        writer: &mut W,
        start: usize,
        count: Option<usize>,
    ) -> Result<usize> {
        let chunk = self.range(start, count)?;
        writer.write_all(chunk)?;
        trace!(start, sent = chunk.len(), "blob range sent");
        Ok(chunk.len())
    }

    /// 从 `reader` 接收最多 `count` 字节，写入 `start` 起始处，返回实际接收的字节数。
    ///
    /// # 逻辑解析（How）
    /// 1. `start` 超过逻辑长度返回 `OutOfRange`；`count` 缺省时取 `长度 - start`；
    /// 2. 先把 blob 增长到 `start + count`，再循环读取直至填满或遇到 EOF；
    /// 3. 短读（EOF 或中途失败）时把逻辑长度收缩到 `max(调用前长度, start + 实际接收)`，
    ///    为接收而临时增长出的尾部不会残留；完整接收时长度保持不变。
    ///
    /// # 风险提示（Trade-offs）
    /// - 读取中途失败时，已接收的数据保留在 blob 中，逻辑长度按上述规则收敛后再返回错误；
    /// - 调用前已有的内容永远不会因接收而被截掉。
    pub fn receive_from<R: Read>(
        &mut self,
        reader: &mut R,
        start: usize,
        count: Option<usize>,
    ) -> Result<usize> {
        let length = self.len()?;
        if start > length {
            return Err(BlobError::out_of_range(format!(
                "receive start {start} exceeds blob length {length}"
            )));
        }
        let count = count.unwrap_or(length - start);
        if count == 0 {
            return Ok(0);
        }
        let end = start.checked_add(count).ok_or_else(|| {
            BlobError::out_of_range(format!("receive range {start}+{count} overflows"))
        })?;
        self.ensure_len(end)?;

        let mut received = 0;
        let outcome = {
            let target = &mut self.as_bytes_mut()?[start..end];
            loop {
                if received == target.len() {
                    break Ok(());
                }
                match reader.read(&mut target[received..]) {
                    Ok(0) => break Ok(()),
                    Ok(n) => received += n,
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                    Err(err) => break Err(BlobError::from(err)),
                }
            }
        };

        if received < count {
            let settled = (start + received).max(length);
            if settled < self.len()? {
                self.settle_length(settled)?;
            }
        }
        trace!(start, requested = count, received, "blob range received");
        outcome.map(|()| received)
    }

    fn settle_length(&mut self, len: usize) -> Result<()> {
        if len == 0 {
            self.truncate(0)
        } else {
            self.resize(len, true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::GrowthPolicy;
    use std::io::Cursor;

    struct Flaky {
        chunks: Vec<io::Result<Vec<u8>>>,
    }

    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.chunks.is_empty() {
                return Ok(0);
            }
            match self.chunks.remove(0) {
                Ok(bytes) => {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    Ok(n)
                }
                Err(err) => Err(err),
            }
        }
    }

    #[test]
    fn receive_trims_to_what_arrived() {
        let mut blob = Blob::from_slice(b"head", GrowthPolicy::Exact).expect("创建 blob");
        let mut reader = Cursor::new(b"tail".to_vec());
        let received = blob.receive_from(&mut reader, 4, Some(16)).expect("接收");
        assert_eq!(received, 4);
        assert_eq!(blob.as_bytes(), Ok(&b"headtail"[..]));
    }

    #[test]
    fn full_receive_keeps_bytes_after_window() {
        let mut blob = Blob::from_slice(b"0123456789", GrowthPolicy::Exact).expect("创建 blob");
        let received = blob
            .receive_from(&mut Cursor::new(b"ab".to_vec()), 0, Some(2))
            .expect("接收");
        assert_eq!(received, 2);
        assert_eq!(blob.as_bytes(), Ok(&b"ab23456789"[..]));
    }

    #[test]
    fn short_receive_never_cuts_existing_content() {
        let mut blob = Blob::from_slice(b"0123456789", GrowthPolicy::Exact).expect("创建 blob");
        let received = blob
            .receive_from(&mut Cursor::new(b"xyz".to_vec()), 8, Some(6))
            .expect("接收");
        assert_eq!(received, 3);
        assert_eq!(blob.as_bytes(), Ok(&b"01234567xyz"[..]));

        let received = blob
            .receive_from(&mut Cursor::new(b"A".to_vec()), 1, Some(4))
            .expect("接收");
        assert_eq!(received, 1);
        assert_eq!(blob.as_bytes(), Ok(&b"0A234567xyz"[..]));
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let mut blob = Blob::new(4, GrowthPolicy::Exact).expect("创建 blob");
        let mut reader = Flaky {
            chunks: vec![
                Ok(b"ab".to_vec()),
                Err(io::Error::from(io::ErrorKind::Interrupted)),
                Ok(b"cd".to_vec()),
            ],
        };
        let received = blob.receive_from(&mut reader, 0, Some(4)).expect("接收");
        assert_eq!(received, 4);
        assert_eq!(blob.as_bytes(), Ok(&b"abcd"[..]));
    }

    #[test]
    fn failure_keeps_partial_data() {
        let mut blob = Blob::new(4, GrowthPolicy::Exact).expect("创建 blob");
        let mut reader = Flaky {
            chunks: vec![
                Ok(b"xy".to_vec()),
                Err(io::Error::from(io::ErrorKind::ConnectionReset)),
            ],
        };
        let err = blob.receive_from(&mut reader, 0, Some(8)).unwrap_err();
        assert_eq!(err.code(), crate::error::codes::IO);
        assert_eq!(blob.as_bytes(), Ok(&b"xy"[..]));
    }

    #[test]
    fn send_writes_requested_range() {
        let blob = Blob::from_slice(b"hello world", GrowthPolicy::Exact).expect("创建 blob");
        let mut out = Vec::new();
        assert_eq!(blob.send_to(&mut out, 6, None), Ok(5));
        assert_eq!(out, b"world");
        assert_eq!(
            blob.send_to(&mut out, 6, Some(6)).unwrap_err().code(),
            crate::error::codes::OUT_OF_RANGE
        );
    }
}
