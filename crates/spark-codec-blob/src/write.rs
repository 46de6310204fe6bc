use bytes::BufMut;
use spark_blob::{Blob, BlobError, Result};
use tracing::trace;

use crate::{
    cursor::Cursor,
    item::{WriteField, WriteItem},
    kind::{FieldKind, ScalarKind},
    value::WriteValue,
};

/// 按条目顺序向 `blob` 编码，返回结束时的游标位置。
///
/// # 教案式说明
/// - **意图 (Why)**：与 [`read`](fn@crate::read) 对称，把声明式条目列表翻译为顺序写入，需要空间时自动增长 blob。
/// - **执行 (How)**：每个条目先定位并检查写入起点不超过逻辑长度，再校验值，最后申请空间并写入；
///   空间经由 `Blob::ensure_len` 申请，增长策略失败时以 `AllocationFailure` 中止。
/// - **契约 (What)**：单个条目要么完整写入，要么不写任何字节；
///   调用中途失败时，此前条目已写入的数据保持可见。
pub fn write<'a, I>(blob: &mut Blob, items: I) -> Result<usize>
where
    I: IntoIterator,
    I::Item: Into<WriteItem<'a>>,
{
    blob.len()?;
    let mut cursor = Cursor::new();

    for item in items {
        match item.into() {
            WriteItem::Skip(delta) => cursor.advance_by(delta)?,
            WriteItem::Raw(bytes) => {
                cursor.ensure_writable(blob.len()?)?;
                if !bytes.is_empty() {
                    reserve(blob, &mut cursor, bytes.len())?.put_slice(bytes);
                }
            }
            WriteItem::Field(field) => write_field(blob, &mut cursor, &field)?,
        }
    }

    let length = blob.len()?;
    trace!(length, position = cursor.position(), "blob write finished");
    Ok(cursor.position())
}

fn write_field(blob: &mut Blob, cursor: &mut Cursor, field: &WriteField<'_>) -> Result<()> {
    cursor.place(field.offset, field.pos)?;
    cursor.ensure_writable(blob.len()?)?;
    let (Some(kind), Some(value)) = (field.kind, field.value) else {
        return Ok(());
    };

    match kind {
        FieldKind::Scalar(kind) => write_scalar(blob, cursor, kind, value, field.index),
        FieldKind::Str => {
            let bytes = expect_bytes(kind, value)?;
            if !bytes.is_empty() {
                reserve(blob, cursor, bytes.len())?.put_slice(bytes);
            }
            Ok(())
        }
        FieldKind::Blob => {
            let WriteValue::Blob(src) = value else {
                return Err(mismatch(kind, value));
            };
            if src.is_empty()? {
                return Ok(());
            }
            let chunk = src.range(field.start.unwrap_or(0), field.count)?;
            reserve(blob, cursor, chunk.len())?.put_slice(chunk);
            Ok(())
        }
    }
}

fn write_scalar(
    blob: &mut Blob,
    cursor: &mut Cursor,
    kind: ScalarKind,
    value: WriteValue<'_>,
    index: Option<usize>,
) -> Result<()> {
    match kind {
        ScalarKind::CStr => {
            let bytes = expect_bytes(kind.into(), value)?;
            let body = bytes.strip_suffix(&[0_u8]).unwrap_or(bytes);
            if body.contains(&0) {
                return Err(BlobError::invalid_value(
                    "specified cstr contains an internal null character",
                ));
            }
            let mut window = reserve(blob, cursor, body.len() + 1)?;
            window.put_slice(body);
            window.put_u8(0);
        }
        ScalarKind::U8Str => {
            let bytes = expect_bytes(kind.into(), value)?;
            let prefix = u8::try_from(bytes.len()).map_err(|_| too_long(kind, bytes.len()))?;
            let mut window = reserve(blob, cursor, 1 + bytes.len())?;
            window.put_u8(prefix);
            window.put_slice(bytes);
        }
        ScalarKind::U16Str => {
            let bytes = expect_bytes(kind.into(), value)?;
            let prefix = u16::try_from(bytes.len()).map_err(|_| too_long(kind, bytes.len()))?;
            let mut window = reserve(blob, cursor, 2 + bytes.len())?;
            window.put_u16_ne(prefix);
            window.put_slice(bytes);
        }
        ScalarKind::U32Str => {
            let bytes = expect_bytes(kind.into(), value)?;
            let prefix = u32::try_from(bytes.len()).map_err(|_| too_long(kind, bytes.len()))?;
            let mut window = reserve(blob, cursor, 4 + bytes.len())?;
            window.put_u32_ne(prefix);
            window.put_slice(bytes);
        }
        ScalarKind::Char => {
            let bytes = expect_bytes(kind.into(), value)?;
            if bytes.is_empty() {
                return Ok(());
            }
            let index = index.unwrap_or(0);
            let Some(byte) = bytes.get(index).copied() else {
                return Err(BlobError::invalid_value(format!(
                    "char index {index} out of range for value of length {}",
                    bytes.len()
                )));
            };
            reserve(blob, cursor, 1)?.put_u8(byte);
        }
        ScalarKind::I8 => {
            let v = integer::<i8>(kind, value)?;
            reserve(blob, cursor, 1)?.put_i8(v);
        }
        ScalarKind::U8 => {
            let v = integer::<u8>(kind, value)?;
            reserve(blob, cursor, 1)?.put_u8(v);
        }
        ScalarKind::I16 => {
            let v = integer::<i16>(kind, value)?;
            reserve(blob, cursor, 2)?.put_i16_ne(v);
        }
        ScalarKind::U16 => {
            let v = integer::<u16>(kind, value)?;
            reserve(blob, cursor, 2)?.put_u16_ne(v);
        }
        ScalarKind::I32 => {
            let v = integer::<i32>(kind, value)?;
            reserve(blob, cursor, 4)?.put_i32_ne(v);
        }
        ScalarKind::U32 => {
            let v = integer::<u32>(kind, value)?;
            reserve(blob, cursor, 4)?.put_u32_ne(v);
        }
        ScalarKind::I64 => {
            let v = integer::<i64>(kind, value)?;
            reserve(blob, cursor, 8)?.put_i64_ne(v);
        }
        ScalarKind::U64 => {
            let v = integer::<u64>(kind, value)?;
            reserve(blob, cursor, 8)?.put_u64_ne(v);
        }
        ScalarKind::Float => {
            // f32 目标按 IEEE 舍入，超出范围时得到无穷大。
            let v = number(kind, value)? as f32;
            reserve(blob, cursor, 4)?.put_f32_ne(v);
        }
        ScalarKind::Double => {
            let v = number(kind, value)?;
            reserve(blob, cursor, 8)?.put_f64_ne(v);
        }
    }
    Ok(())
}

/// 把 blob 增长到足以容纳游标后的 `width` 字节，返回该窗口并推进游标。
fn reserve<'b>(blob: &'b mut Blob, cursor: &mut Cursor, width: usize) -> Result<&'b mut [u8]> {
    let start = cursor.position();
    let end = start.checked_add(width).ok_or_else(|| {
        BlobError::out_of_range(format!("write of {width} bytes at {start} overflows"))
    })?;
    blob.ensure_len(end)?;
    cursor.skip(width);
    blob.range_mut(start, Some(width))
}

fn expect_bytes<'v>(kind: FieldKind, value: WriteValue<'v>) -> Result<&'v [u8]> {
    match value {
        WriteValue::Bytes(bytes) => Ok(bytes),
        other => Err(mismatch(kind, other)),
    }
}

fn integer<T>(kind: ScalarKind, value: WriteValue<'_>) -> Result<T>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    let converted = match value {
        WriteValue::Int(v) => <T as TryFrom<i64>>::try_from(v).ok(),
        WriteValue::UInt(v) => <T as TryFrom<u64>>::try_from(v).ok(),
        other => return Err(mismatch(kind.into(), other)),
    };
    converted.ok_or_else(|| {
        BlobError::invalid_value(format!("value {value:?} is not representable as {kind}"))
    })
}

fn number(kind: ScalarKind, value: WriteValue<'_>) -> Result<f64> {
    match value {
        WriteValue::Float(v) => Ok(v),
        WriteValue::Int(v) => Ok(v as f64),
        WriteValue::UInt(v) => Ok(v as f64),
        other => Err(mismatch(kind.into(), other)),
    }
}

fn mismatch(kind: FieldKind, value: WriteValue<'_>) -> BlobError {
    BlobError::invalid_value(format!(
        "datatype '{kind}' cannot be written from a {} value",
        value.describe()
    ))
}

fn too_long(kind: ScalarKind, len: usize) -> BlobError {
    BlobError::invalid_value(format!(
        "string of {len} bytes too large to be represented by {kind}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_blob::{GrowthPolicy, codes};

    fn empty() -> Blob {
        Blob::new(8, GrowthPolicy::Exact).expect("创建 blob")
    }

    #[test]
    fn cstr_terminator_is_appended_once() {
        let mut blob = empty();
        write(
            &mut blob,
            [
                WriteField::new(ScalarKind::CStr, "ab"),
                WriteField::new(ScalarKind::CStr, b"cd\0"),
                WriteField::new(ScalarKind::CStr, ""),
            ],
        )
        .expect("写入 cstr");
        assert_eq!(blob.as_bytes(), Ok(&b"ab\0cd\0\0"[..]));
    }

    #[test]
    fn cstr_rejects_inner_nul() {
        let mut blob = empty();
        let err = write(&mut blob, [WriteField::new(ScalarKind::CStr, b"a\0b")]).unwrap_err();
        assert_eq!(err.code(), codes::INVALID_VALUE);
        assert_eq!(blob.len(), Ok(0));
    }

    #[test]
    fn integers_are_range_checked() {
        let mut blob = empty();
        for field in [
            WriteField::new(ScalarKind::U8, 256_u16),
            WriteField::new(ScalarKind::I8, -129_i16),
            WriteField::new(ScalarKind::U32, -1_i32),
            WriteField::new(ScalarKind::I64, u64::MAX),
            WriteField::new(ScalarKind::U16, 1.5_f64),
            WriteField::new(ScalarKind::U8, "1"),
        ] {
            let err = write(&mut blob, [field]).unwrap_err();
            assert_eq!(err.code(), codes::INVALID_VALUE, "条目 {field:?}");
        }
        assert_eq!(blob.len(), Ok(0));
    }

    #[test]
    fn start_beyond_length_is_rejected() {
        let mut blob = empty();
        let err = write(&mut blob, [WriteItem::Skip(1), WriteItem::Raw(b"x")]).unwrap_err();
        assert_eq!(err.code(), codes::OUT_OF_RANGE);

        let err = write(&mut blob, [WriteField::seek().pos(3)]).unwrap_err();
        assert_eq!(err.code(), codes::OUT_OF_RANGE);
    }

    #[test]
    fn descriptor_without_value_only_moves() {
        let mut blob = empty();
        write(&mut blob, [WriteItem::Raw(b"abcd")]).expect("写入原始字节");
        let end = write(
            &mut blob,
            [
                WriteItem::from(WriteField::seek().pos(2)),
                WriteItem::from(WriteField::seek().kind(ScalarKind::U8)),
                WriteItem::Raw(b"Z"),
            ],
        )
        .expect("定位后覆盖");
        assert_eq!(end, 3);
        assert_eq!(blob.as_bytes(), Ok(&b"abZd"[..]));
    }
}
