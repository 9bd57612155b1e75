use crate::classify::{Body, check_depth, classify, read_head, short, sized};
use crate::config::Limits;
use crate::error::EditError;
use crate::types::{Family, Span};

/// Location of one matched pair inside a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pair {
    pub key_start: usize,
    pub value: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scan {
    Found(Pair),
    /// No pair matched. `end` is the offset just past the map's last pair.
    Missing { end: usize },
}

/// Read a map header at `offset`: `(pair_count, header_len)`.
pub(crate) fn map_header(buf: &[u8], offset: usize) -> Result<(usize, usize), EditError> {
    let tag = *buf.get(offset).ok_or_else(|| short(offset, 1, buf.len()))?;
    if classify(tag) != Some(Family::Map) {
        return Err(EditError::NotAMap { tag, offset });
    }
    let head = read_head(buf, offset)?;
    match head.body {
        Body::Pairs(n) => Ok((n, head.header_len)),
        _ => Err(EditError::NotAMap { tag, offset }),
    }
}

/// Read an array header at `offset`: `(element_count, header_len)`.
pub(crate) fn array_header(buf: &[u8], offset: usize) -> Result<(usize, usize), EditError> {
    let tag = *buf.get(offset).ok_or_else(|| short(offset, 1, buf.len()))?;
    if classify(tag) != Some(Family::Array) {
        return Err(EditError::NotAnArray { tag, offset });
    }
    let head = read_head(buf, offset)?;
    match head.body {
        Body::Elements(n) => Ok((n, head.header_len)),
        _ => Err(EditError::NotAnArray { tag, offset }),
    }
}

/// Read a string-encoded map key: `(content, total_encoded_len)`.
pub(crate) fn read_key(buf: &[u8], offset: usize) -> Result<(&[u8], usize), EditError> {
    let tag = *buf.get(offset).ok_or_else(|| short(offset, 1, buf.len()))?;
    match classify(tag) {
        Some(Family::Str) => {}
        Some(_) => return Err(EditError::UnsupportedKeyType { tag, offset }),
        None => return Err(EditError::InvalidTag { tag, offset }),
    }
    let head = read_head(buf, offset)?;
    let len = match head.body {
        Body::Bytes(n) => n,
        _ => return Err(EditError::UnsupportedKeyType { tag, offset }),
    };
    let start = offset + head.header_len;
    let content = start
        .checked_add(len)
        .and_then(|end| buf.get(start..end))
        .ok_or_else(|| short(offset, head.header_len.saturating_add(len), buf.len()))?;
    Ok((content, head.header_len + len))
}

/// Walk the map at `start` looking for `key`; stops at the first match.
///
/// `depth` is the number of containers enclosing the map itself.
pub(crate) fn scan(
    buf: &[u8],
    start: usize,
    key: &[u8],
    depth: usize,
    limits: &Limits,
) -> Result<Scan, EditError> {
    let (count, header_len) = map_header(buf, start)?;
    check_depth(depth, limits)?;

    let mut offset = start + header_len;
    for _ in 0..count {
        let key_start = offset;
        let (candidate, key_len) = read_key(buf, offset)?;
        offset += key_len;

        let value_len = sized(buf, offset, depth + 1, limits)?;
        if candidate == key {
            return Ok(Scan::Found(Pair {
                key_start,
                value: Span {
                    start: offset,
                    len: value_len,
                },
            }));
        }
        offset += value_len;
    }
    Ok(Scan::Missing { end: offset })
}

/// Offset of element `index` of the array at `start`, or `None` when out of range.
pub(crate) fn seek_index(
    buf: &[u8],
    start: usize,
    index: usize,
    depth: usize,
    limits: &Limits,
) -> Result<Option<usize>, EditError> {
    let (count, header_len) = array_header(buf, start)?;
    check_depth(depth, limits)?;
    if index >= count {
        return Ok(None);
    }
    let mut offset = start + header_len;
    for _ in 0..index {
        offset += sized(buf, offset, depth + 1, limits)?;
    }
    Ok(Some(offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    // {"a": 1, "bb": [true, nil], "a": "dup"}
    const MAP: &[u8] = &[
        0x83, 0xa1, b'a', 0x01, 0xa2, b'b', b'b', 0x92, TRUE, NIL, 0xa1, b'a', 0xa3, b'd', b'u',
        b'p',
    ];

    fn scan_default(buf: &[u8], key: &str) -> Result<Scan, EditError> {
        scan(buf, 0, key.as_bytes(), 0, &Limits::default())
    }

    #[test]
    fn test_scan_finds_value_span() {
        let Scan::Found(pair) = scan_default(MAP, "bb").unwrap() else {
            panic!("bb should be found");
        };
        assert_eq!(pair.key_start, 4);
        assert_eq!(pair.value, Span { start: 7, len: 3 });
        assert_eq!(&MAP[pair.value.start..pair.value.end()], &[0x92, TRUE, NIL]);
    }

    #[test]
    fn test_scan_first_match_wins() {
        let Scan::Found(pair) = scan_default(MAP, "a").unwrap() else {
            panic!("a should be found");
        };
        assert_eq!(pair.value, Span { start: 3, len: 1 });
    }

    #[test]
    fn test_scan_missing_reports_end() {
        assert_eq!(
            scan_default(MAP, "zz").unwrap(),
            Scan::Missing { end: MAP.len() }
        );
        assert_eq!(scan_default(&[0x80], "a").unwrap(), Scan::Missing { end: 1 });
    }

    #[test]
    fn test_scan_not_a_map() {
        assert_eq!(
            scan_default(&[0x91, NIL], "a"),
            Err(EditError::NotAMap { tag: 0x91, offset: 0 })
        );
        assert_eq!(
            scan_default(&[NEVER_USED], "a"),
            Err(EditError::NotAMap {
                tag: NEVER_USED,
                offset: 0
            })
        );
    }

    #[test]
    fn test_scan_rejects_non_string_key() {
        let buf = [0x81, 0x01, 0x02];
        assert_eq!(
            scan_default(&buf, "a"),
            Err(EditError::UnsupportedKeyType { tag: 0x01, offset: 1 })
        );
    }

    #[test]
    fn test_scan_stops_before_truncation() {
        // second value is cut short but the first key matches before it
        let buf = [0x82, 0xa1, b'a', 0x01, 0xa1, b'b', FLOAT64, 0x40];
        assert!(matches!(scan_default(&buf, "a"), Ok(Scan::Found(_))));
        assert!(matches!(
            scan_default(&buf, "b"),
            Err(EditError::ShortBuffer { .. })
        ));
    }

    #[test]
    fn test_read_key_truncated() {
        assert!(matches!(
            read_key(&[0xa4, b'a', b'b'], 0),
            Err(EditError::ShortBuffer { .. })
        ));
    }

    #[test]
    fn test_seek_index() {
        let arr = [0x93, 0xa1, b'x', 0x92, 1, 2, NIL];
        let limits = Limits::default();
        assert_eq!(seek_index(&arr, 0, 0, 0, &limits), Ok(Some(1)));
        assert_eq!(seek_index(&arr, 0, 2, 0, &limits), Ok(Some(6)));
        assert_eq!(seek_index(&arr, 0, 3, 0, &limits), Ok(None));
        assert_eq!(
            seek_index(&[0x80], 0, 0, 0, &limits),
            Err(EditError::NotAnArray { tag: 0x80, offset: 0 })
        );
    }
}
