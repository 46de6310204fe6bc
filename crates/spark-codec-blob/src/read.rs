use bytes::{Buf, Bytes};
use spark_blob::{Blob, BlobError, Result};
use tracing::{debug, trace};

use crate::{
    cursor::Cursor,
    item::{ReadField, ReadItem},
    kind::{FieldKind, ScalarKind},
    value::Value,
};

/// 按条目顺序从 `blob` 解码，返回产出的值列表。
///
/// # 教案式说明
/// - **意图 (Why)**：把“游标位移 + 类型标签”的声明式列表翻译为一次顺序扫描，调用方无需手算偏移。
/// - **执行 (How)**：游标从 0 开始；位移条目只移动游标，裸类型在游标处解码并前进，
///   结构化描述符先按 `offset`/`pos` 定位再解码；每次解码前都做边界检查。
/// - **契约 (What)**：任一条目失败即中止整个调用并返回错误，不返回部分结果；
///   写入 `dest` 的 `blob` 描述符在失败前已完成的拷贝保持可见。
pub fn read<'a, I>(blob: &Blob, items: I) -> Result<Vec<Value>>
where
    I: IntoIterator,
    I::Item: Into<ReadItem<'a>>,
{
    let data = blob.as_bytes()?;
    let mut cursor = Cursor::new();
    let mut values = Vec::new();

    for item in items {
        match item.into() {
            ReadItem::Skip(delta) => cursor.advance_by(delta)?,
            ReadItem::Scalar(kind) => values.push(decode_scalar(data, &mut cursor, kind)?),
            ReadItem::Field(field) => {
                if let Some(value) = read_field(data, &mut cursor, field)? {
                    values.push(value);
                }
            }
        }
    }

    trace!(
        length = data.len(),
        values = values.len(),
        position = cursor.position(),
        "blob read finished"
    );
    Ok(values)
}

fn read_field(data: &[u8], cursor: &mut Cursor, field: ReadField<'_>) -> Result<Option<Value>> {
    cursor.place(field.offset, field.pos)?;
    let Some(kind) = field.kind else {
        return Ok(None);
    };
    match kind {
        FieldKind::Scalar(kind) => decode_scalar(data, cursor, kind).map(Some),
        FieldKind::Str => {
            let len = required_len(field.len, kind)?;
            text(data, cursor, len).map(Some)
        }
        FieldKind::Blob => {
            let len = required_len(field.len, kind)?;
            let span = cursor.span(len, data.len())?;
            match field.dest {
                Some(dest) => {
                    copy_into(dest, field.start.unwrap_or(0), &data[span])?;
                    cursor.skip(len);
                    Ok(None)
                }
                None => {
                    let mut out = Blob::with_len(len, field.policy.unwrap_or_default())?;
                    out.as_bytes_mut()?.copy_from_slice(&data[span]);
                    cursor.skip(len);
                    Ok(Some(Value::Blob(out)))
                }
            }
        }
    }
}

fn required_len(len: Option<usize>, kind: FieldKind) -> Result<usize> {
    len.ok_or_else(|| {
        BlobError::invalid_argument(format!("datatype '{kind}' requires a 'len' field"))
    })
}

/// 把 `chunk` 拷贝到 `dest` 的 `start` 处，必要时先增长 `dest`。
fn copy_into(dest: &mut Blob, start: usize, chunk: &[u8]) -> Result<()> {
    let length = dest.len()?;
    if start > length {
        debug!(start, length, "destination start out of range");
        return Err(BlobError::out_of_range(format!(
            "destination blob does not contain read start offset {start}; blob length is {length}"
        )));
    }
    if chunk.is_empty() {
        return Ok(());
    }
    dest.ensure_len(start + chunk.len())?;
    dest.range_mut(start, Some(chunk.len()))?
        .copy_from_slice(chunk);
    Ok(())
}

fn decode_scalar(data: &[u8], cursor: &mut Cursor, kind: ScalarKind) -> Result<Value> {
    let value = match kind {
        ScalarKind::CStr => {
            let start = cursor.position();
            let tail = data.get(start..).unwrap_or_default();
            let Some(end) = tail.iter().position(|byte| *byte == 0) else {
                debug!(position = start, length = data.len(), "cstr terminator not found");
                return Err(BlobError::out_of_range(format!(
                    "no cstr terminator between {start} and blob length {}",
                    data.len()
                )));
            };
            cursor.skip(end + 1);
            Value::Str(Bytes::copy_from_slice(&tail[..end]))
        }
        ScalarKind::U8Str => {
            let size = usize::from(take(data, cursor, 1)?.get_u8());
            text(data, cursor, size)?
        }
        ScalarKind::U16Str => {
            let size = usize::from(take(data, cursor, 2)?.get_u16_ne());
            text(data, cursor, size)?
        }
        ScalarKind::U32Str => {
            let prefix = take(data, cursor, 4)?.get_u32_ne();
            let size = usize::try_from(prefix).map_err(|_| {
                BlobError::out_of_range(format!("u32str length {prefix} is not addressable"))
            })?;
            text(data, cursor, size)?
        }
        ScalarKind::Char => text(data, cursor, 1)?,
        ScalarKind::I8 => Value::Int(take(data, cursor, 1)?.get_i8().into()),
        ScalarKind::U8 => Value::UInt(take(data, cursor, 1)?.get_u8().into()),
        ScalarKind::I16 => Value::Int(take(data, cursor, 2)?.get_i16_ne().into()),
        ScalarKind::U16 => Value::UInt(take(data, cursor, 2)?.get_u16_ne().into()),
        ScalarKind::I32 => Value::Int(take(data, cursor, 4)?.get_i32_ne().into()),
        ScalarKind::U32 => Value::UInt(take(data, cursor, 4)?.get_u32_ne().into()),
        ScalarKind::I64 => Value::Int(take(data, cursor, 8)?.get_i64_ne()),
        ScalarKind::U64 => Value::UInt(take(data, cursor, 8)?.get_u64_ne()),
        ScalarKind::Float => Value::Float(take(data, cursor, 4)?.get_f32_ne().into()),
        ScalarKind::Double => Value::Float(take(data, cursor, 8)?.get_f64_ne()),
    };
    Ok(value)
}

/// 校验并取出游标处 `width` 字节，游标随之前进。
fn take<'d>(data: &'d [u8], cursor: &mut Cursor, width: usize) -> Result<&'d [u8]> {
    let span = cursor.span(width, data.len())?;
    cursor.skip(width);
    Ok(&data[span])
}

fn text(data: &[u8], cursor: &mut Cursor, len: usize) -> Result<Value> {
    take(data, cursor, len).map(|chunk| Value::Str(Bytes::copy_from_slice(chunk)))
}
