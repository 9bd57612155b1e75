//! Field-level edits on an encoded map, done by moving byte ranges.
//!
//! `locate` is a best-effort probe: any failure reads as "absent". The
//! editing operations report the exact reason instead.

use crate::classify::sized;
use crate::config::Limits;
use crate::encode::{Header, map_header as encode_map_header, str_header};
use crate::error::EditError;
use crate::scanner::{Pair, Scan, map_header, scan, seek_index};
use crate::types::*;

/// Carries the [`Limits`] used by every operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Editor {
    limits: Limits,
}

impl Editor {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    #[inline]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Total encoded length of the value at `offset`.
    #[inline]
    pub fn size_at(&self, buf: &[u8], offset: usize) -> Result<usize, EditError> {
        sized(buf, offset, 0, &self.limits)
    }

    #[inline]
    fn find(&self, key: &str, buf: &[u8]) -> Result<Scan, EditError> {
        scan(buf, 0, key.as_bytes(), 0, &self.limits)
    }

    #[inline]
    fn find_pair(&self, key: &str, buf: &[u8]) -> Result<Pair, EditError> {
        match self.find(key, buf)? {
            Scan::Found(pair) => Ok(pair),
            Scan::Missing { .. } => Err(EditError::FieldNotFound),
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Lookup
    // ════════════════════════════════════════════════════════════════════════

    /// Value bytes for `key`, with malformed input reported as an error.
    /// `Ok(None)` means the map is well-formed up to its end and has no such key.
    pub fn scan<'a>(&self, key: &str, buf: &'a [u8]) -> Result<Option<&'a [u8]>, EditError> {
        Ok(match self.find(key, buf)? {
            Scan::Found(pair) => Some(&buf[pair.value.start..pair.value.end()]),
            Scan::Missing { .. } => None,
        })
    }

    /// Value bytes for `key`, or an empty slice when absent or malformed.
    pub fn locate<'a>(&self, key: &str, buf: &'a [u8]) -> &'a [u8] {
        match self.scan(key, buf) {
            Ok(Some(value)) => value,
            Ok(None) => &[],
            Err(err) => {
                tracing::trace!(key, error = %err, "locate: scan failed");
                &[]
            }
        }
    }

    pub fn has_key(&self, key: &str, buf: &[u8]) -> bool {
        !self.locate(key, buf).is_empty()
    }

    /// Top-level pairs in encoding order, without decoding values.
    pub fn fields<'a>(&self, buf: &'a [u8]) -> Result<FieldIter<'a>, EditError> {
        FieldIter::new(buf, 0, self.limits)
    }

    /// Follow `path` through nested maps and arrays.
    ///
    /// `Ok(None)` when a key is absent or an index is out of range.
    pub fn locate_path<'a>(
        &self,
        buf: &'a [u8],
        path: &[PathSegment<'_>],
    ) -> Result<Option<&'a [u8]>, EditError> {
        let mut offset = 0;
        for (depth, segment) in path.iter().enumerate() {
            let next = match *segment {
                PathSegment::Key(key) => match scan(buf, offset, key.as_bytes(), depth, &self.limits)? {
                    Scan::Found(pair) => Some(pair.value.start),
                    Scan::Missing { .. } => None,
                },
                PathSegment::Index(index) => seek_index(buf, offset, index, depth, &self.limits)?,
            };
            match next {
                Some(next) => offset = next,
                None => return Ok(None),
            }
        }
        let len = sized(buf, offset, path.len(), &self.limits)?;
        Ok(Some(&buf[offset..offset + len]))
    }

    // ════════════════════════════════════════════════════════════════════════
    // Edits (always into a new buffer)
    // ════════════════════════════════════════════════════════════════════════

    /// Copy of `buf` with the value for `key` swapped for `new_value`.
    ///
    /// `new_value` is inserted verbatim; it must be one encoded value.
    pub fn replace(&self, key: &str, buf: &[u8], new_value: &[u8]) -> Result<Vec<u8>, EditError> {
        let mut out = Vec::new();
        self.replace_into(key, buf, new_value, &mut out)?;
        Ok(out)
    }

    /// Like [`Editor::replace`], writing into `out` (cleared first, capacity kept).
    pub fn replace_into(
        &self,
        key: &str,
        buf: &[u8],
        new_value: &[u8],
        out: &mut Vec<u8>,
    ) -> Result<(), EditError> {
        let pair = self.find_pair(key, buf)?;
        let old = pair.value;

        out.clear();
        out.reserve(buf.len() - old.len + new_value.len());
        out.extend_from_slice(&buf[..old.start]);
        out.extend_from_slice(new_value);
        out.extend_from_slice(&buf[old.end()..]);

        tracing::trace!(key, old_len = old.len, new_len = new_value.len(), "replaced field");
        Ok(())
    }

    /// Copy of `buf` without the first pair for `key`. The header keeps its width.
    pub fn remove(&self, key: &str, buf: &[u8]) -> Result<Vec<u8>, EditError> {
        let pair = self.find_pair(key, buf)?;
        let (count, header_len) = map_header(buf, 0)?;

        let mut out = Vec::with_capacity(buf.len() - (pair.value.end() - pair.key_start));
        out.extend_from_slice(&buf[..pair.key_start]);
        out.extend_from_slice(&buf[pair.value.end()..]);
        write_count(&mut out[..header_len], count - 1)?;

        tracing::trace!(key, removed = pair.value.end() - pair.key_start, "removed field");
        Ok(out)
    }

    /// Copy of `buf` with `key => new_value` appended as the map's last pair.
    ///
    /// The header widens when the new count needs it.
    pub fn insert(&self, key: &str, buf: &[u8], new_value: &[u8]) -> Result<Vec<u8>, EditError> {
        let end = match self.find(key, buf)? {
            Scan::Found(_) => return Err(EditError::FieldExists),
            Scan::Missing { end } => end,
        };
        let (count, header_len) = map_header(buf, 0)?;
        let new_count = count + 1;
        if new_count > u32::MAX as usize {
            return Err(EditError::TooManyFields);
        }

        let header = grown_header(buf[0], new_count);
        let key_header = str_header(key.len());
        let mut out = Vec::with_capacity(
            buf.len() - header_len + header.len() + key_header.len() + key.len() + new_value.len(),
        );
        out.extend_from_slice(&header);
        out.extend_from_slice(&buf[header_len..end]);
        out.extend_from_slice(&key_header);
        out.extend_from_slice(key.as_bytes());
        out.extend_from_slice(new_value);
        out.extend_from_slice(&buf[end..]);

        tracing::trace!(key, new_len = new_value.len(), count = new_count, "inserted field");
        Ok(out)
    }
}

// ─── Header rewriting ───────────────────────────────────────────────────────

/// Rewrite the pair count of an existing map header in place, keeping its width.
pub(crate) fn write_count(header: &mut [u8], count: usize) -> Result<(), EditError> {
    match header {
        [tag] if count <= 0x0f => *tag = FIXMAP | count as u8,
        [MAP16, rest @ ..] if count <= u16::MAX as usize => {
            rest.copy_from_slice(&(count as u16).to_be_bytes())
        }
        [MAP32, rest @ ..] if count <= u32::MAX as usize => {
            rest.copy_from_slice(&(count as u32).to_be_bytes())
        }
        _ => return Err(EditError::TooManyFields),
    }
    Ok(())
}

/// Header for `count` pairs, never narrower than the header tagged `tag`.
pub(crate) fn grown_header(tag: u8, count: usize) -> Header {
    let mut header = Header::new();
    match tag {
        MAP32 => {
            header.push(MAP32);
            header.extend((count as u32).to_be_bytes());
        }
        MAP16 if count <= u16::MAX as usize => {
            header.push(MAP16);
            header.extend((count as u16).to_be_bytes());
        }
        _ => return encode_map_header(count),
    }
    header
}

// ─── Free functions (default limits) ────────────────────────────────────────

/// Encoded bytes of the value for `key`; empty when absent or malformed.
pub fn locate<'a>(key: &str, buf: &'a [u8]) -> &'a [u8] {
    Editor::default().locate(key, buf)
}

pub fn has_key(key: &str, buf: &[u8]) -> bool {
    Editor::default().has_key(key, buf)
}

pub fn replace(key: &str, buf: &[u8], new_value: &[u8]) -> Result<Vec<u8>, EditError> {
    Editor::default().replace(key, buf, new_value)
}

pub fn replace_into(
    key: &str,
    buf: &[u8],
    new_value: &[u8],
    out: &mut Vec<u8>,
) -> Result<(), EditError> {
    Editor::default().replace_into(key, buf, new_value, out)
}

pub fn remove(key: &str, buf: &[u8]) -> Result<Vec<u8>, EditError> {
    Editor::default().remove(key, buf)
}

pub fn insert(key: &str, buf: &[u8], new_value: &[u8]) -> Result<Vec<u8>, EditError> {
    Editor::default().insert(key, buf, new_value)
}

pub fn fields(buf: &[u8]) -> Result<FieldIter<'_>, EditError> {
    Editor::default().fields(buf)
}

pub fn locate_path<'a>(
    buf: &'a [u8],
    path: &[PathSegment<'_>],
) -> Result<Option<&'a [u8]>, EditError> {
    Editor::default().locate_path(buf, path)
}
