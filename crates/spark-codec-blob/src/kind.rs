use core::{fmt, str::FromStr};

use spark_blob::BlobError;

/// 可以裸写在读取列表中的标量类型标签。
///
/// # 设计动机（Why）
/// - 类型标签只在边界处由字符串解析一次，此后以封闭枚举流转，读写分支由编译器保证穷尽；
/// - `str` 与 `blob` 需要 `len` 等附加参数，只能出现在结构化描述符中，因此不在此枚举内（见 [`FieldKind`]）。
///
/// # 契约说明（What）
/// - 多字节数值与长度前缀一律使用本机字节序；
/// - `char` 占 1 字节，解码为单字节字符串。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    CStr,
    U8Str,
    U16Str,
    U32Str,
    Char,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    Float,
    Double,
}

impl ScalarKind {
    /// 全部标量类型，按标签表顺序排列。
    pub const ALL: [ScalarKind; 15] = [
        Self::CStr,
        Self::U8Str,
        Self::U16Str,
        Self::U32Str,
        Self::Char,
        Self::I8,
        Self::U8,
        Self::I16,
        Self::U16,
        Self::I32,
        Self::U32,
        Self::I64,
        Self::U64,
        Self::Float,
        Self::Double,
    ];

    /// 线上使用的类型标签。
    pub fn tag(&self) -> &'static str {
        match self {
            Self::CStr => "cstr",
            Self::U8Str => "u8str",
            Self::U16Str => "u16str",
            Self::U32Str => "u32str",
            Self::Char => "char",
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// 定长类型的编码宽度；`cstr` 与长度前缀字符串返回 `None`。
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            Self::CStr | Self::U8Str | Self::U16Str | Self::U32Str => None,
            Self::Char | Self::I8 | Self::U8 => Some(1),
            Self::I16 | Self::U16 => Some(2),
            Self::I32 | Self::U32 | Self::Float => Some(4),
            Self::I64 | Self::U64 | Self::Double => Some(8),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ScalarKind {
    type Err = BlobError;

    /// 解析标量标签；`str`/`blob` 只能用于结构化描述符，此处同样拒绝。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == s)
            .ok_or_else(|| match s {
                "str" | "blob" => BlobError::invalid_argument(format!(
                    "datatype '{s}' requires a structured descriptor with a length"
                )),
                _ => unrecognized(s),
            })
    }
}

/// 结构化描述符可使用的全部类型：标量加上 `str` 与 `blob`。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Scalar(ScalarKind),
    /// 定长原始字节，需要 `len`。
    Str,
    /// 定长子 blob，需要 `len`。
    Blob,
}

impl FieldKind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Scalar(kind) => kind.tag(),
            Self::Str => "str",
            Self::Blob => "blob",
        }
    }
}

impl From<ScalarKind> for FieldKind {
    fn from(kind: ScalarKind) -> Self {
        Self::Scalar(kind)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for FieldKind {
    type Err = BlobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "str" => Ok(Self::Str),
            "blob" => Ok(Self::Blob),
            other => ScalarKind::ALL
                .into_iter()
                .find(|kind| kind.tag() == other)
                .map(Self::Scalar)
                .ok_or_else(|| unrecognized(other)),
        }
    }
}

fn unrecognized(tag: &str) -> BlobError {
    BlobError::invalid_argument(format!("unrecognized datatype specifier '{tag}'"))
}
