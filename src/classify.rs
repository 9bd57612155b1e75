//! Sizing of encoded values from their tag byte.
//!
//! Everything here reads only; nothing allocates. Containers are sized by
//! recursing over their elements, bounded by [`Limits::max_depth`].

use crate::config::Limits;
use crate::error::EditError;
use crate::types::*;

/// What follows a value's header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    /// Opaque payload of exactly this many bytes.
    Bytes(usize),
    /// This many encoded values (array).
    Elements(usize),
    /// This many key/value pairs (map).
    Pairs(usize),
}

/// The decoded header of the value at some offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Head {
    pub tag: u8,
    pub family: Family,
    /// Bytes taken by the tag plus any length/count/type fields.
    pub header_len: usize,
    pub body: Body,
}

impl Head {
    #[inline]
    fn new(tag: u8, family: Family, header_len: usize, body: Body) -> Self {
        Self {
            tag,
            family,
            header_len,
            body,
        }
    }

    #[inline]
    fn fixed(tag: u8, family: Family, payload: usize) -> Self {
        Self::new(tag, family, 1, Body::Bytes(payload))
    }
}

/// Family of a tag byte, or `None` for the reserved `0xc1`.
#[inline]
pub fn classify(tag: u8) -> Option<Family> {
    Some(match tag {
        0x00..=0x7f | NEG_FIXINT..=0xff | INT8..=INT64 => Family::Int,
        0x80..=0x8f | MAP16 | MAP32 => Family::Map,
        0x90..=0x9f | ARRAY16 | ARRAY32 => Family::Array,
        0xa0..=0xbf | STR8 | STR16 | STR32 => Family::Str,
        NIL => Family::Nil,
        FALSE | TRUE => Family::Bool,
        BIN8 | BIN16 | BIN32 => Family::Bin,
        EXT8 | EXT16 | EXT32 | FIXEXT1..=FIXEXT16 => Family::Ext,
        FLOAT32 | FLOAT64 => Family::Float,
        UINT8..=UINT64 => Family::Uint,
        _ => return None,
    })
}

#[inline]
pub(crate) fn short(offset: usize, needed: usize, len: usize) -> EditError {
    EditError::ShortBuffer {
        offset,
        needed,
        len,
    }
}

/// Read `N` bytes at `at`, failing with short-buffer past the end.
#[inline]
fn field<const N: usize>(buf: &[u8], at: usize) -> Result<[u8; N], EditError> {
    at.checked_add(N)
        .and_then(|end| buf.get(at..end))
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| short(at, N, buf.len()))
}

#[inline]
fn len8(buf: &[u8], at: usize) -> Result<usize, EditError> {
    Ok(field::<1>(buf, at)?[0] as usize)
}

#[inline]
fn len16(buf: &[u8], at: usize) -> Result<usize, EditError> {
    Ok(u16::from_be_bytes(field(buf, at)?) as usize)
}

#[inline]
fn len32(buf: &[u8], at: usize) -> Result<usize, EditError> {
    Ok(u32::from_be_bytes(field(buf, at)?) as usize)
}

/// Decode the header of the value starting at `offset`.
///
/// Length and count fields are read and bounds-checked; the payload is not.
pub fn read_head(buf: &[u8], offset: usize) -> Result<Head, EditError> {
    let tag = *buf.get(offset).ok_or_else(|| short(offset, 1, buf.len()))?;
    let at = offset + 1;
    Ok(match tag {
        0x00..=0x7f | NEG_FIXINT..=0xff => Head::fixed(tag, Family::Int, 0),
        0x80..=0x8f => Head::new(tag, Family::Map, 1, Body::Pairs((tag & 0x0f) as usize)),
        0x90..=0x9f => Head::new(tag, Family::Array, 1, Body::Elements((tag & 0x0f) as usize)),
        0xa0..=0xbf => Head::fixed(tag, Family::Str, (tag & 0x1f) as usize),
        NIL => Head::fixed(tag, Family::Nil, 0),
        FALSE | TRUE => Head::fixed(tag, Family::Bool, 0),
        BIN8 => Head::new(tag, Family::Bin, 2, Body::Bytes(len8(buf, at)?)),
        BIN16 => Head::new(tag, Family::Bin, 3, Body::Bytes(len16(buf, at)?)),
        BIN32 => Head::new(tag, Family::Bin, 5, Body::Bytes(len32(buf, at)?)),
        // ext headers carry a one-byte type after the length
        EXT8 => Head::new(tag, Family::Ext, 3, Body::Bytes(len8(buf, at)?)),
        EXT16 => Head::new(tag, Family::Ext, 4, Body::Bytes(len16(buf, at)?)),
        EXT32 => Head::new(tag, Family::Ext, 6, Body::Bytes(len32(buf, at)?)),
        FLOAT32 => Head::fixed(tag, Family::Float, 4),
        FLOAT64 => Head::fixed(tag, Family::Float, 8),
        UINT8..=UINT64 => Head::fixed(tag, Family::Uint, 1 << (tag - UINT8)),
        INT8..=INT64 => Head::fixed(tag, Family::Int, 1 << (tag - INT8)),
        FIXEXT1..=FIXEXT16 => Head::new(tag, Family::Ext, 2, Body::Bytes(1 << (tag - FIXEXT1))),
        STR8 => Head::new(tag, Family::Str, 2, Body::Bytes(len8(buf, at)?)),
        STR16 => Head::new(tag, Family::Str, 3, Body::Bytes(len16(buf, at)?)),
        STR32 => Head::new(tag, Family::Str, 5, Body::Bytes(len32(buf, at)?)),
        ARRAY16 => Head::new(tag, Family::Array, 3, Body::Elements(len16(buf, at)?)),
        ARRAY32 => Head::new(tag, Family::Array, 5, Body::Elements(len32(buf, at)?)),
        MAP16 => Head::new(tag, Family::Map, 3, Body::Pairs(len16(buf, at)?)),
        MAP32 => Head::new(tag, Family::Map, 5, Body::Pairs(len32(buf, at)?)),
        _ => return Err(EditError::InvalidTag { tag, offset }),
    })
}

/// Total encoded length (header + payload) of the value at `offset`.
pub fn size_at(buf: &[u8], offset: usize) -> Result<usize, EditError> {
    sized(buf, offset, 0, &Limits::default())
}

/// [`size_at`] with explicit limits.
pub fn size_at_with(buf: &[u8], offset: usize, limits: &Limits) -> Result<usize, EditError> {
    sized(buf, offset, 0, limits)
}

/// Recursive worker. `depth` is the number of containers enclosing `offset`.
pub(crate) fn sized(
    buf: &[u8],
    offset: usize,
    depth: usize,
    limits: &Limits,
) -> Result<usize, EditError> {
    let head = read_head(buf, offset)?;
    let count = match head.body {
        Body::Bytes(payload) => {
            let total = head
                .header_len
                .checked_add(payload)
                .ok_or_else(|| short(offset, usize::MAX, buf.len()))?;
            if buf.len() - offset < total {
                return Err(short(offset, total, buf.len()));
            }
            return Ok(total);
        }
        Body::Elements(n) => n,
        Body::Pairs(n) => n.saturating_mul(2),
    };

    check_depth(depth, limits)?;
    let mut cursor = offset + head.header_len;
    for _ in 0..count {
        cursor += sized(buf, cursor, depth + 1, limits)?;
    }
    Ok(cursor - offset)
}

/// Fail when a container at `depth` would exceed the configured nesting.
#[inline]
pub(crate) fn check_depth(depth: usize, limits: &Limits) -> Result<(), EditError> {
    if depth >= limits.max_depth {
        tracing::debug!(depth, limit = limits.max_depth, "nesting limit reached");
        return Err(EditError::DepthLimitExceeded {
            limit: limits.max_depth,
        });
    }
    Ok(())
}
