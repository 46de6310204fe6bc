//! 读写协议的条目模型。
//!
//! # 教案背景（Why）
//! - 读写列表由三类条目组成：游标位移、裸类型（读）或裸字节串（写）、结构化描述符；
//! - 结构化描述符的可选字段较多，采用构建器风格，调用方只写出关心的字段。
//!
//! # 契约说明（What）
//! - `offset` 是相对当前游标的位移，`pos` 是绝对位置，二者同时出现时在执行阶段报告 `InvalidArgument`；
//! - 描述符缺少类型（写入时缺少值）时仅移动游标。

use core::str::FromStr;

use spark_blob::{Blob, BlobError, GrowthPolicy};

use crate::{
    kind::{FieldKind, ScalarKind},
    value::WriteValue,
};

/// 读取列表中的一个条目。
#[derive(Debug)]
pub enum ReadItem<'a> {
    /// 游标位移，可以为负。
    Skip(i64),
    /// 在游标处解码一个标量并前进。
    Scalar(ScalarKind),
    /// 结构化描述符。
    Field(ReadField<'a>),
}

impl From<i64> for ReadItem<'_> {
    fn from(delta: i64) -> Self {
        Self::Skip(delta)
    }
}

impl From<ScalarKind> for ReadItem<'_> {
    fn from(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }
}

impl<'a> From<ReadField<'a>> for ReadItem<'a> {
    fn from(field: ReadField<'a>) -> Self {
        Self::Field(field)
    }
}

impl FromStr for ReadItem<'_> {
    type Err = BlobError;

    /// 把裸类型标签解析为 [`ReadItem::Scalar`]。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self::Scalar)
    }
}

/// 读取用的结构化描述符。
///
/// - `len`：`str`/`blob` 必填，其余类型忽略；
/// - `dest` + `start`：仅对 `blob` 生效，把数据拷贝进已有 blob 的 `start` 处，此时不产出值；
/// - `policy`：仅对未指定 `dest` 的 `blob` 生效，决定新建 blob 的增长策略，缺省为 `Exact`。
#[derive(Debug, Default)]
pub struct ReadField<'a> {
    pub(crate) kind: Option<FieldKind>,
    pub(crate) offset: Option<i64>,
    pub(crate) pos: Option<usize>,
    pub(crate) len: Option<usize>,
    pub(crate) dest: Option<&'a mut Blob>,
    pub(crate) start: Option<usize>,
    pub(crate) policy: Option<GrowthPolicy>,
}

impl<'a> ReadField<'a> {
    /// 指定类型的描述符。
    pub fn new(kind: impl Into<FieldKind>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    /// 没有类型、只移动游标的描述符。
    pub fn seek() -> Self {
        Self::default()
    }

    /// 按类型标签构造描述符，未知标签返回 `InvalidArgument`。
    pub fn parse(tag: &str) -> Result<Self, BlobError> {
        tag.parse::<FieldKind>().map(Self::new)
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn pos(mut self, pos: usize) -> Self {
        self.pos = Some(pos);
        self
    }

    pub fn len(mut self, len: usize) -> Self {
        self.len = Some(len);
        self
    }

    pub fn dest(mut self, dest: &'a mut Blob) -> Self {
        self.dest = Some(dest);
        self
    }

    pub fn start(mut self, start: usize) -> Self {
        self.start = Some(start);
        self
    }

    pub fn policy(mut self, policy: GrowthPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}

/// 写入列表中的一个条目。
#[derive(Clone, Copy, Debug)]
pub enum WriteItem<'a> {
    /// 游标位移，可以为负。
    Skip(i64),
    /// 在游标处原样写入字节并前进；空切片为空操作。
    Raw(&'a [u8]),
    /// 结构化描述符。
    Field(WriteField<'a>),
}

impl From<i64> for WriteItem<'_> {
    fn from(delta: i64) -> Self {
        Self::Skip(delta)
    }
}

impl<'a> From<&'a [u8]> for WriteItem<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Raw(bytes)
    }
}

impl<'a> From<&'a str> for WriteItem<'a> {
    fn from(text: &'a str) -> Self {
        Self::Raw(text.as_bytes())
    }
}

impl<'a> From<WriteField<'a>> for WriteItem<'a> {
    fn from(field: WriteField<'a>) -> Self {
        Self::Field(field)
    }
}

/// 写入用的结构化描述符。
///
/// - `index`：仅对 `char` 生效，写出 `value[index]`，缺省为 0；
/// - `start` + `count`：仅对 `blob` 生效，选择源 blob 的区间，缺省为整个源。
#[derive(Clone, Copy, Debug, Default)]
pub struct WriteField<'a> {
    pub(crate) kind: Option<FieldKind>,
    pub(crate) value: Option<WriteValue<'a>>,
    pub(crate) offset: Option<i64>,
    pub(crate) pos: Option<usize>,
    pub(crate) index: Option<usize>,
    pub(crate) start: Option<usize>,
    pub(crate) count: Option<usize>,
}

impl<'a> WriteField<'a> {
    /// 指定类型与值的描述符。
    pub fn new(kind: impl Into<FieldKind>, value: impl Into<WriteValue<'a>>) -> Self {
        Self {
            kind: Some(kind.into()),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// 没有类型与值、只移动游标的描述符。
    pub fn seek() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: impl Into<FieldKind>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn value(mut self, value: impl Into<WriteValue<'a>>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn pos(mut self, pos: usize) -> Self {
        self.pos = Some(pos);
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn start(mut self, start: usize) -> Self {
        self.start = Some(start);
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}
