use bytes::Bytes;
use spark_blob::Blob;

/// 读取协议产出的值。
///
/// - 有符号整数解码为 `Int`，无符号整数解码为 `UInt`，`float`/`double` 统一提升为 `f64`；
/// - 字符串类（`cstr`、长度前缀字符串、`char`、`str`）解码为字节串，不要求是合法 UTF-8；
/// - 未指定目标的 `blob` 描述符产出新建的 [`Blob`]。
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(Bytes),
    Blob(Blob),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt(v) => Some(*v),
            Self::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Str(bytes) => Some(bytes.as_ref()),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Self::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    pub fn into_blob(self) -> Option<Blob> {
        match self {
            Self::Blob(blob) => Some(blob),
            _ => None,
        }
    }
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Self::Str(Bytes::from_static(s.as_bytes()))
    }
}

/// 写入协议接受的值，借用调用方数据而不复制。
///
/// 数值类目标接受 `Int`/`UInt`/`Float`（整数目标拒绝 `Float`），字符串类目标接受 `Bytes`，
/// `blob` 目标只接受 `Blob`。类型不匹配在写入时报告为 `InvalidValue`。
#[derive(Clone, Copy, Debug)]
pub enum WriteValue<'a> {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bytes(&'a [u8]),
    Blob(&'a Blob),
}

impl WriteValue<'_> {
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Int(_) | Self::UInt(_) => "integer",
            Self::Float(_) => "float",
            Self::Bytes(_) => "string",
            Self::Blob(_) => "blob",
        }
    }
}

macro_rules! signed_into_write_value {
    ($($ty:ty),*) => {
        $(impl From<$ty> for WriteValue<'_> {
            fn from(v: $ty) -> Self {
                Self::Int(v.into())
            }
        })*
    };
}

macro_rules! unsigned_into_write_value {
    ($($ty:ty),*) => {
        $(impl From<$ty> for WriteValue<'_> {
            fn from(v: $ty) -> Self {
                Self::UInt(v.into())
            }
        })*
    };
}

signed_into_write_value!(i8, i16, i32, i64);
unsigned_into_write_value!(u8, u16, u32, u64);

impl From<f32> for WriteValue<'_> {
    fn from(v: f32) -> Self {
        Self::Float(v.into())
    }
}

impl From<f64> for WriteValue<'_> {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl<'a> From<&'a [u8]> for WriteValue<'a> {
    fn from(v: &'a [u8]) -> Self {
        Self::Bytes(v)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for WriteValue<'a> {
    fn from(v: &'a [u8; N]) -> Self {
        Self::Bytes(v.as_slice())
    }
}

impl<'a> From<&'a str> for WriteValue<'a> {
    fn from(v: &'a str) -> Self {
        Self::Bytes(v.as_bytes())
    }
}

impl<'a> From<&'a Bytes> for WriteValue<'a> {
    fn from(v: &'a Bytes) -> Self {
        Self::Bytes(v.as_ref())
    }
}

impl<'a> From<&'a Blob> for WriteValue<'a> {
    fn from(v: &'a Blob) -> Self {
        Self::Blob(v)
    }
}
