use super::record_mut::RecordMut;
use crate::edit::{grown_header, write_count};
use crate::encode::{Encoder, str_header};
use crate::error::EditError;
use crate::scanner::{Pair, Scan, map_header, scan};
use crate::value::MsgValue;

impl RecordMut {
    #[inline]
    fn find_pair(&self, name: &str) -> Result<Scan, EditError> {
        scan(&self.data_buf, 0, name.as_bytes(), 0, self.editor.limits())
    }

    #[inline]
    fn existing_pair(&self, name: &str) -> Result<Pair, EditError> {
        match self.find_pair(name)? {
            Scan::Found(pair) => Ok(pair),
            Scan::Missing { .. } => Err(EditError::FieldNotFound),
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Internal: buffer splice
    // ════════════════════════════════════════════════════════════════════════

    /// Replace `old_len` bytes at `offset` with `new_data`.
    /// Handles grow, shrink, and same-size cases.
    fn splice_data(&mut self, offset: usize, old_len: usize, new_data: &[u8]) {
        let new_len = new_data.len();
        let old_end = offset + old_len;
        let tail_len = self.data_buf.len() - old_end;

        if new_len == old_len {
            self.data_buf[offset..offset + new_len].copy_from_slice(new_data);
        } else if new_len > old_len {
            let growth = new_len - old_len;
            self.data_buf.resize(self.data_buf.len() + growth, 0);
            // Shift tail right
            self.data_buf
                .copy_within(old_end..old_end + tail_len, old_end + growth);
            self.data_buf[offset..offset + new_len].copy_from_slice(new_data);
        } else {
            let shrink = old_len - new_len;
            self.data_buf[offset..offset + new_len].copy_from_slice(new_data);
            // Shift tail left
            self.data_buf
                .copy_within(old_end..old_end + tail_len, old_end - shrink);
            self.data_buf.truncate(self.data_buf.len() - shrink);
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Overwrite existing fields
    // ════════════════════════════════════════════════════════════════════════

    /// Swap the encoded value of `name` for `raw`, in place.
    ///
    /// `raw` must be exactly one encoded value; it is not checked.
    pub fn set_raw(&mut self, name: &str, raw: &[u8]) -> Result<(), EditError> {
        let old = self.existing_pair(name)?.value;
        self.splice_data(old.start, old.len, raw);
        tracing::trace!(key = name, old_len = old.len, new_len = raw.len(), "set field");
        Ok(())
    }

    pub fn set_field(&mut self, name: &str, value: &MsgValue) -> Result<(), EditError> {
        self.set_with(name, |en| en.write_value(value))
    }

    #[inline]
    pub fn set_str(&mut self, name: &str, value: &str) -> Result<(), EditError> {
        self.set_with(name, |en| en.write_str(value))
    }

    #[inline]
    pub fn set_i64(&mut self, name: &str, value: i64) -> Result<(), EditError> {
        self.set_with(name, |en| en.write_i64(value))
    }

    #[inline]
    pub fn set_u64(&mut self, name: &str, value: u64) -> Result<(), EditError> {
        self.set_with(name, |en| en.write_u64(value))
    }

    #[inline]
    pub fn set_f64(&mut self, name: &str, value: f64) -> Result<(), EditError> {
        self.set_with(name, |en| en.write_f64(value))
    }

    #[inline]
    pub fn set_bool(&mut self, name: &str, value: bool) -> Result<(), EditError> {
        self.set_with(name, |en| en.write_bool(value))
    }

    #[inline]
    pub fn set_nil(&mut self, name: &str) -> Result<(), EditError> {
        self.set_with(name, |en| en.write_nil())
    }

    fn set_with(&mut self, name: &str, write: impl FnOnce(&mut Encoder)) -> Result<(), EditError> {
        let mut scratch = Vec::new();
        write(&mut Encoder::new(&mut scratch));
        self.set_raw(name, &scratch)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Add / remove fields
    // ════════════════════════════════════════════════════════════════════════

    /// Append `name => value` as the last pair. Fails with
    /// [`EditError::FieldExists`] when the key is already present.
    pub fn add_field(&mut self, name: &str, value: &MsgValue) -> Result<(), EditError> {
        let mut raw = Vec::new();
        Encoder::new(&mut raw).write_value(value);
        self.add_raw(name, &raw)
    }

    /// Append `name => raw`, widening the map header when the count needs it.
    pub fn add_raw(&mut self, name: &str, raw: &[u8]) -> Result<(), EditError> {
        let end = match self.find_pair(name)? {
            Scan::Found(_) => return Err(EditError::FieldExists),
            Scan::Missing { end } => end,
        };
        let (count, header_len) = map_header(&self.data_buf, 0)?;
        let new_count = count + 1;
        if new_count > u32::MAX as usize {
            return Err(EditError::TooManyFields);
        }

        // Tail first so `end` stays valid, then the header.
        let key_header = str_header(name.len());
        let mut pair = Vec::with_capacity(key_header.len() + name.len() + raw.len());
        pair.extend_from_slice(&key_header);
        pair.extend_from_slice(name.as_bytes());
        pair.extend_from_slice(raw);
        self.splice_data(end, 0, &pair);

        let header = grown_header(self.data_buf[0], new_count);
        self.splice_data(0, header_len, &header);

        tracing::trace!(key = name, new_len = raw.len(), count = new_count, "added field");
        Ok(())
    }

    /// Drop the first pair for `name`. The map header keeps its width.
    pub fn remove_field(&mut self, name: &str) -> Result<(), EditError> {
        let pair = self.existing_pair(name)?;
        let (count, header_len) = map_header(&self.data_buf, 0)?;
        let pair_len = pair.value.end() - pair.key_start;

        self.splice_data(pair.key_start, pair_len, &[]);
        write_count(&mut self.data_buf[..header_len], count - 1)?;

        tracing::trace!(key = name, removed = pair_len, "removed field");
        Ok(())
    }
}
