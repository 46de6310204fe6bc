use core::ops::Range;

use spark_blob::{BlobError, Result};
use tracing::debug;

/// 读写共用的游标。
///
/// 游标只记录位置，不借用 blob；边界检查时由调用方传入当前逻辑长度。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Cursor {
    position: usize,
}

impl Cursor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    /// 相对位移；移动到 0 之前或溢出时返回 `OutOfRange`。
    pub(crate) fn advance_by(&mut self, delta: i64) -> Result<()> {
        let magnitude = usize::try_from(delta.unsigned_abs()).ok();
        let next = if delta < 0 {
            magnitude.and_then(|m| self.position.checked_sub(m))
        } else {
            magnitude.and_then(|m| self.position.checked_add(m))
        };
        match next {
            Some(position) => {
                self.position = position;
                Ok(())
            }
            None => {
                debug!(position = self.position, delta, "cursor moved out of range");
                Err(BlobError::out_of_range(format!(
                    "cursor move by {delta} from {} leaves the addressable range",
                    self.position
                )))
            }
        }
    }

    /// 绝对定位。
    pub(crate) fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// 按描述符的 `offset`/`pos` 调整游标，二者同时出现返回 `InvalidArgument`。
    pub(crate) fn place(&mut self, offset: Option<i64>, pos: Option<usize>) -> Result<()> {
        match (offset, pos) {
            (Some(_), Some(_)) => Err(BlobError::invalid_argument(
                "a descriptor may not contain both a position and an offset",
            )),
            (Some(delta), None) => self.advance_by(delta),
            (None, Some(position)) => {
                self.seek(position);
                Ok(())
            }
            (None, None) => Ok(()),
        }
    }

    /// 校验 `[position, position + width)` 位于 `length` 之内并返回该区间，不移动游标。
    pub(crate) fn span(&self, width: usize, length: usize) -> Result<Range<usize>> {
        match self.position.checked_add(width) {
            Some(end) if end <= length => Ok(self.position..end),
            _ => {
                debug!(
                    position = self.position,
                    width, length, "read bounds out of range"
                );
                Err(BlobError::out_of_range(format!(
                    "unable to read {width} bytes at {}; blob length is {length}",
                    self.position
                )))
            }
        }
    }

    /// 游标须位于 `[0, length]` 内才能写入。
    pub(crate) fn ensure_writable(&self, length: usize) -> Result<()> {
        if self.position > length {
            debug!(position = self.position, length, "write start out of range");
            return Err(BlobError::out_of_range(format!(
                "destination blob does not contain write start offset {}; blob length is {length}",
                self.position
            )));
        }
        Ok(())
    }

    pub(crate) fn skip(&mut self, width: usize) {
        self.position += width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_blob::codes;

    #[test]
    fn negative_moves_stop_at_zero() {
        let mut cursor = Cursor::new();
        cursor.advance_by(4).expect("前进");
        cursor.advance_by(-4).expect("回到 0");
        assert_eq!(cursor.position(), 0);
        let err = cursor.advance_by(-1).unwrap_err();
        assert_eq!(err.code(), codes::OUT_OF_RANGE);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn offset_and_pos_are_exclusive() {
        let mut cursor = Cursor::new();
        let err = cursor.place(Some(1), Some(2)).unwrap_err();
        assert_eq!(err.code(), codes::INVALID_ARGUMENT);
        cursor.place(None, Some(7)).expect("绝对定位");
        cursor.place(Some(-3), None).expect("相对位移");
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn span_checks_against_length() {
        let mut cursor = Cursor::new();
        cursor.seek(6);
        assert_eq!(cursor.span(2, 8), Ok(6..8));
        assert!(cursor.span(3, 8).is_err());
        assert!(cursor.span(usize::MAX, 8).is_err());
        assert!(cursor.ensure_writable(6).is_ok());
        assert!(cursor.ensure_writable(5).is_err());
    }
}
