use crate::classify::read_head;
use crate::decode::decode_with;
use crate::edit::Editor;
use crate::error::EditError;
use crate::scanner::map_header;
use crate::types::*;
use crate::value::MsgValue;

/// Read access shared by [`Record`](super::Record) and [`RecordMut`](super::RecordMut).
///
/// Lookups walk the map from the front on every call; nothing is cached.
pub trait RecordReadable {
    fn data_buf(&self) -> &[u8];
    fn editor(&self) -> &Editor;

    /// Pair count from the map header.
    #[inline]
    fn field_count(&self) -> usize {
        map_header(self.data_buf(), 0).map(|(n, _)| n).unwrap_or(0)
    }

    /// Iterate over all raw fields (zero-copy)
    fn iter_fields(&self) -> FieldIter<'_> {
        let buf = self.data_buf();
        self.editor()
            .fields(buf)
            .unwrap_or_else(|_| FieldIter::empty(buf))
    }

    /// Encoded value bytes for `name`, with the reason when it cannot be read.
    fn find_field(&self, name: &str) -> Result<&[u8], EditError> {
        self.editor()
            .scan(name, self.data_buf())?
            .ok_or(EditError::FieldNotFound)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Read access (zero-copy where the family allows it)
    // ════════════════════════════════════════════════════════════════════════

    /// Get raw field bytes (zero-copy).
    #[inline]
    fn get_raw(&self, name: &str) -> Option<&[u8]> {
        self.find_field(name).ok()
    }

    #[inline]
    fn has_field(&self, name: &str) -> bool {
        self.get_raw(name).is_some()
    }

    #[inline]
    fn field_type(&self, name: &str) -> Option<Family> {
        let raw = self.get_raw(name)?;
        read_head(raw, 0).ok().map(|head| head.family)
    }

    /// Get a string field (zero-copy).
    fn get_str(&self, name: &str) -> Option<&str> {
        let raw = self.get_raw(name)?;
        let head = read_head(raw, 0).ok()?;
        if head.family != Family::Str {
            return None;
        }
        std::str::from_utf8(raw.get(head.header_len..)?).ok()
    }

    /// Get a binary field (zero-copy).
    fn get_bin(&self, name: &str) -> Option<&[u8]> {
        let raw = self.get_raw(name)?;
        let head = read_head(raw, 0).ok()?;
        if head.family != Family::Bin {
            return None;
        }
        raw.get(head.header_len..)
    }

    /// Get an integer field that fits in i64.
    fn get_i64(&self, name: &str) -> Option<i64> {
        match self.field_type(name)? {
            Family::Int | Family::Uint => self.get_field(name)?.as_i64(),
            _ => None,
        }
    }

    /// Get a non-negative integer field.
    fn get_u64(&self, name: &str) -> Option<u64> {
        match self.field_type(name)? {
            Family::Int | Family::Uint => self.get_field(name)?.as_u64(),
            _ => None,
        }
    }

    /// Get a float field (f32 is widened).
    fn get_f64(&self, name: &str) -> Option<f64> {
        match self.field_type(name)? {
            Family::Float => self.get_field(name)?.as_f64(),
            _ => None,
        }
    }

    /// Get any numeric field as f64.
    fn get_number_as_f64(&self, name: &str) -> Option<f64> {
        match self.field_type(name)? {
            Family::Int | Family::Uint | Family::Float => self.get_field(name)?.as_f64(),
            _ => None,
        }
    }

    #[inline]
    fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get_raw(name)? {
            [TRUE] => Some(true),
            [FALSE] => Some(false),
            _ => None,
        }
    }

    /// True when the field exists and holds nil.
    #[inline]
    fn is_nil(&self, name: &str) -> bool {
        matches!(self.get_raw(name), Some([NIL]))
    }

    /// Decode one field into a [`MsgValue`]. Only that field is decoded.
    fn get_field(&self, name: &str) -> Option<MsgValue> {
        let raw = self.get_raw(name)?;
        decode_with(raw, self.editor().limits()).ok()
    }

    /// Decode the whole record. This is the slow path.
    fn to_value(&self) -> Result<MsgValue, EditError> {
        decode_with(self.data_buf(), self.editor().limits())
    }
}
