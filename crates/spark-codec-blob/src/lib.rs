//! `spark-codec-blob` 在 `spark-blob` 缓冲之上提供带类型的游标读写协议。
//!
//! # 教案背景（Why）
//! - 二进制记录通常由“定长数值 + 各类字符串 + 子 blob”拼接而成，逐字节手写偏移既易错又难以审查；
//! - 本 crate 把一次读写描述为条目列表，由游标顺序执行，调用方只声明“读什么 / 写什么 / 在哪里”。
//!
//! # 使用概览（How）
//! - 读取：[`read`] 接受 [`ReadItem`] 列表（游标位移、裸 [`ScalarKind`]、结构化 [`ReadField`]），返回 [`Value`] 列表；
//! - 写入：[`write`] 接受 [`WriteItem`] 列表（游标位移、原始字节、结构化 [`WriteField`]），按需增长 blob；
//! - 类型标签可由字符串经 `FromStr` 在边界处解析一次，之后以封闭枚举流转。
//!
//! # 合约说明（What）
//! - 多字节数值与长度前缀使用本机字节序，数据不具备跨架构可移植性；
//! - 所有错误复用 [`spark_blob::BlobError`] 及其稳定错误码；读取失败不返回部分结果，写入失败保留已提交条目。
//!
//! # 风险提示（Trade-offs）
//! - 读取产出的字符串是字节串（[`bytes::Bytes`]），不保证是合法 UTF-8，需要文本的调用方自行校验。

mod cursor;
mod item;
mod kind;
mod read;
mod value;
mod write;

pub use crate::item::{ReadField, ReadItem, WriteField, WriteItem};
pub use crate::kind::{FieldKind, ScalarKind};
pub use crate::read::read;
pub use crate::value::{Value, WriteValue};
pub use crate::write::write;
