use crate::classify::sized;
use crate::config::Limits;
use crate::error::EditError;
use crate::scanner::{map_header, read_key};

// ─── Tag Bytes ──────────────────────────────────────────────────────────────
//
//  0x00..=0x7f  positive fixint      0xc0  nil
//  0x80..=0x8f  fixmap (n pairs)     0xc1  never used
//  0x90..=0x9f  fixarray (n items)   0xc2  false / 0xc3 true
//  0xa0..=0xbf  fixstr (n bytes)     0xe0..=0xff  negative fixint
//
//  Multi-byte length and count fields are big-endian.

pub const FIXMAP: u8 = 0x80;
pub const FIXARRAY: u8 = 0x90;
pub const FIXSTR: u8 = 0xa0;
pub const NIL: u8 = 0xc0;
pub const NEVER_USED: u8 = 0xc1;
pub const FALSE: u8 = 0xc2;
pub const TRUE: u8 = 0xc3;
pub const BIN8: u8 = 0xc4;
pub const BIN16: u8 = 0xc5;
pub const BIN32: u8 = 0xc6;
pub const EXT8: u8 = 0xc7;
pub const EXT16: u8 = 0xc8;
pub const EXT32: u8 = 0xc9;
pub const FLOAT32: u8 = 0xca;
pub const FLOAT64: u8 = 0xcb;
pub const UINT8: u8 = 0xcc;
pub const UINT16: u8 = 0xcd;
pub const UINT32: u8 = 0xce;
pub const UINT64: u8 = 0xcf;
pub const INT8: u8 = 0xd0;
pub const INT16: u8 = 0xd1;
pub const INT32: u8 = 0xd2;
pub const INT64: u8 = 0xd3;
pub const FIXEXT1: u8 = 0xd4;
pub const FIXEXT2: u8 = 0xd5;
pub const FIXEXT4: u8 = 0xd6;
pub const FIXEXT8: u8 = 0xd7;
pub const FIXEXT16: u8 = 0xd8;
pub const STR8: u8 = 0xd9;
pub const STR16: u8 = 0xda;
pub const STR32: u8 = 0xdb;
pub const ARRAY16: u8 = 0xdc;
pub const ARRAY32: u8 = 0xdd;
pub const MAP16: u8 = 0xde;
pub const MAP32: u8 = 0xdf;
pub const NEG_FIXINT: u8 = 0xe0;

// ─── Families ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Nil,
    Bool,
    Int,
    Uint,
    Float,
    Str,
    Bin,
    Array,
    Map,
    Ext,
}

impl Family {
    #[inline]
    pub fn is_container(self) -> bool {
        matches!(self, Family::Array | Family::Map)
    }
}

/// Where one encoded value lives inside a buffer. Internal only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// One step of a nested lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    Key(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for PathSegment<'a> {
    fn from(key: &'a str) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment<'_> {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A raw, zero-copy reference to one map pair. No decoding of the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef<'a> {
    pub key: &'a str,
    pub value: &'a [u8],
}

// ─── Iterator ───────────────────────────────────────────────────────────────

/// Walks the pairs of a map in encoding order.
///
/// An `Err` item ends the iteration; the pairs after a malformed one cannot
/// be located.
#[derive(Debug, Clone)]
pub struct FieldIter<'a> {
    buf: &'a [u8],
    pos: usize,
    remaining: usize,
    limits: Limits,
}

impl<'a> FieldIter<'a> {
    /// Start iterating the map encoded at `offset`.
    pub(crate) fn new(buf: &'a [u8], offset: usize, limits: Limits) -> Result<Self, EditError> {
        let (count, header_len) = map_header(buf, offset)?;
        Ok(Self {
            buf,
            pos: offset + header_len,
            remaining: count,
            limits,
        })
    }

    pub(crate) fn empty(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            remaining: 0,
            limits: Limits::default(),
        }
    }

    fn advance(&mut self) -> Result<FieldRef<'a>, EditError> {
        let key_start = self.pos;
        let (key, key_len) = read_key(self.buf, key_start)?;
        let key = std::str::from_utf8(key).map_err(|_| EditError::InvalidUtf8 { offset: key_start })?;
        let value_start = key_start + key_len;
        let value_len = sized(self.buf, value_start, 1, &self.limits)?;
        self.pos = value_start + value_len;
        Ok(FieldRef {
            key,
            value: &self.buf[value_start..self.pos],
        })
    }
}

impl<'a> Iterator for FieldIter<'a> {
    type Item = Result<FieldRef<'a>, EditError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let item = self.advance();
        if item.is_err() {
            self.remaining = 0;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
