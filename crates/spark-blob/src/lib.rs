//! `spark-blob` 提供带可插拔增长策略的可增长二进制缓冲。
//!
//! # 模块定位（Why）
//! - 为序列化、收发与摘要等场景提供一块“逻辑长度可变、容量由策略决定”的连续内存；
//! - 上层的游标编解码（`spark-codec-blob`）只依赖本 crate 暴露的 [`Blob`] 与 [`BlobError`]。
//!
//! # 设计概要（How）
//! - `policy` 模块以封闭枚举 [`GrowthPolicy`] 描述三种增长策略，并只做纯计算；
//! - `blob` 模块持有存储与逻辑长度，执行策略给出的 [`CapacityPlan`]；
//! - `config` 模块从 TOML 解析构造参数，`io` 与 `digest` 模块是面向外部协作方的适配层。
//!
//! # 契约提示（What）
//! - 释放是终态：除查询 [`Blob::is_freed`] 外，已释放 blob 上的操作一律返回 [`BlobError::UseAfterFree`]；
//! - 所有失败均为 fail-fast，blob 保持调用前状态，是否重试由调用方决定。

mod blob;
pub mod config;
#[cfg(feature = "digest")]
pub mod digest;
pub mod error;
mod io;
pub mod policy;
mod storage;

pub use blob::{Blob, Reallocation};
pub use config::{BlobConfig, PolicyKind};
#[cfg(feature = "digest")]
pub use digest::{DigestAlgorithm, SHA256_LEN, digest};
pub use error::{BlobError, Result, codes};
pub use policy::{CapacityPlan, DEFAULT_RESERVE_BOUNDARY, Footprint, GrowthPolicy};
