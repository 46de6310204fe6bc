//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 为 blob 缓冲核心与其上层游标编解码提供统一的错误域，避免两层各自定义一套相似的枚举；
//! - 每个变体绑定一个稳定错误码（见 [`codes`]），便于日志、指标按错误码聚合。
//!
//! ## 设计要求（What）
//! - 所有错误均为 fail-fast：操作内部不重试，是否重试由调用方决定；
//! - 错误类型满足 `Clone + PartialEq`，测试可直接断言具体变体。

use std::{borrow::Cow, io};

use thiserror::Error;

/// 稳定错误码。调用方应依赖这些字符串而非 `Display` 文案做分支判断。
pub mod codes {
    /// 构造或调整参数非法，例如零长度、未知类型标签、`offset` 与 `pos` 同时出现。
    pub const INVALID_ARGUMENT: &str = "blob.invalid_argument";
    /// 读写或拷贝访问越过了当前逻辑长度。
    pub const OUT_OF_RANGE: &str = "blob.out_of_range";
    /// 增长策略无法满足重新分配请求。
    pub const ALLOCATION_FAILURE: &str = "blob.allocation_failure";
    /// 在已释放的 blob 上执行了操作。
    pub const USE_AFTER_FREE: &str = "blob.use_after_free";
    /// 写入阶段的值校验失败。
    pub const INVALID_VALUE: &str = "blob.invalid_value";
    /// 适配层的底层 I/O 失败。
    pub const IO: &str = "blob.io";
}

/// blob 错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：把“参数非法 / 越界 / 分配失败 / 释放后使用 / 值非法”五类失败显式区分，
///   让上层能够精确决定是修正输入、扩容重试还是放弃该 blob。
/// - **契约 (What)**：`detail` 字段携带人类可读的上下文；`AllocationFailure` 记录请求大小与失败时的容量，
///   失败发生后 blob 保持调用前的状态。
/// - **设计权衡 (Trade-offs)**：`detail` 使用 `Cow<'static, str>`，常量文案零分配，动态文案才分配。
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BlobError {
    /// 参数非法。
    #[error("invalid argument: {detail}")]
    InvalidArgument { detail: Cow<'static, str> },

    /// 访问越过逻辑长度。
    #[error("out of range: {detail}")]
    OutOfRange { detail: Cow<'static, str> },

    /// 增长策略未能满足分配请求。
    #[error("failed to allocate blob memory: requested {requested} bytes with capacity {capacity}")]
    AllocationFailure { requested: usize, capacity: usize },

    /// blob 已被释放。
    #[error("unable to use freed blob")]
    UseAfterFree,

    /// 写入值未通过校验。
    #[error("invalid value: {detail}")]
    InvalidValue { detail: Cow<'static, str> },

    /// 收发适配层的 I/O 失败。
    #[error("i/o failure ({kind:?}): {detail}")]
    Io { kind: io::ErrorKind, detail: String },
}

impl BlobError {
    /// 构造 [`BlobError::InvalidArgument`]。
    pub fn invalid_argument(detail: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidArgument {
            detail: detail.into(),
        }
    }

    /// 构造 [`BlobError::OutOfRange`]。
    pub fn out_of_range(detail: impl Into<Cow<'static, str>>) -> Self {
        Self::OutOfRange {
            detail: detail.into(),
        }
    }

    /// 构造 [`BlobError::InvalidValue`]。
    pub fn invalid_value(detail: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidValue {
            detail: detail.into(),
        }
    }

    /// 返回该错误对应的稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => codes::INVALID_ARGUMENT,
            Self::OutOfRange { .. } => codes::OUT_OF_RANGE,
            Self::AllocationFailure { .. } => codes::ALLOCATION_FAILURE,
            Self::UseAfterFree => codes::USE_AFTER_FREE,
            Self::InvalidValue { .. } => codes::INVALID_VALUE,
            Self::Io { .. } => codes::IO,
        }
    }
}

impl From<io::Error> for BlobError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            detail: err.to_string(),
        }
    }
}

/// 统一的结果别名，错误类型默认为 [`BlobError`]。
pub type Result<T, E = BlobError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_variants() {
        assert_eq!(
            BlobError::invalid_argument("x").code(),
            codes::INVALID_ARGUMENT
        );
        assert_eq!(BlobError::out_of_range("x").code(), codes::OUT_OF_RANGE);
        assert_eq!(BlobError::UseAfterFree.code(), codes::USE_AFTER_FREE);
        assert_eq!(
            BlobError::AllocationFailure {
                requested: 1,
                capacity: 0
            }
            .code(),
            codes::ALLOCATION_FAILURE
        );
    }

    #[test]
    fn io_errors_keep_their_kind() {
        let err = BlobError::from(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"));
        match err {
            BlobError::Io { kind, detail } => {
                assert_eq!(kind, io::ErrorKind::BrokenPipe);
                assert!(detail.contains("peer gone"));
            }
            other => panic!("意外的错误变体: {other:?}"),
        }
    }
}
