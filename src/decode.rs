//! Full decoding into [`MsgValue`]. The editing paths never call this; it
//! backs typed getters, verification and the CLI's JSON output.

use smol_str::SmolStr;

use crate::classify::{Body, check_depth, read_head, short};
use crate::config::Limits;
use crate::error::EditError;
use crate::scanner::read_key;
use crate::types::*;
use crate::value::{FastMap, MsgNumber, MsgValue};

struct Decoder<'a> {
    data: &'a [u8],
    x: usize,
    limits: Limits,
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8], limits: Limits) -> Self {
        Self { data, x: 0, limits }
    }

    #[inline]
    fn take(&mut self, start: usize, n: usize) -> Result<&'a [u8], EditError> {
        let bytes = start
            .checked_add(n)
            .and_then(|end| self.data.get(start..end))
            .ok_or_else(|| short(start, n, self.data.len()))?;
        self.x = start + n;
        Ok(bytes)
    }

    fn read_any(&mut self, depth: usize) -> Result<MsgValue, EditError> {
        let offset = self.x;
        let head = read_head(self.data, offset)?;
        let body_start = offset + head.header_len;
        match head.body {
            Body::Bytes(n) => {
                let payload = self.take(body_start, n)?;
                self.scalar(head.tag, head.family, offset, body_start, payload)
            }
            Body::Elements(n) => {
                check_depth(depth, &self.limits)?;
                self.x = body_start;
                // every element takes at least one byte
                let mut items = Vec::with_capacity(n.min(self.data.len() - body_start));
                for _ in 0..n {
                    items.push(self.read_any(depth + 1)?);
                }
                Ok(MsgValue::Array(items))
            }
            Body::Pairs(n) => {
                check_depth(depth, &self.limits)?;
                self.x = body_start;
                self.read_pairs(n, depth).map(MsgValue::Map)
            }
        }
    }

    fn read_pairs(
        &mut self,
        n: usize,
        depth: usize,
    ) -> Result<FastMap<SmolStr, MsgValue>, EditError> {
        let mut map = FastMap::new();
        for _ in 0..n {
            let key_start = self.x;
            let (key, key_len) = read_key(self.data, key_start)?;
            let key = std::str::from_utf8(key)
                .map_err(|_| EditError::InvalidUtf8 { offset: key_start })?;
            self.x = key_start + key_len;
            let value = self.read_any(depth + 1)?;
            map.insert(SmolStr::from(key), value);
        }
        Ok(map)
    }

    fn scalar(
        &self,
        tag: u8,
        family: Family,
        offset: usize,
        body_start: usize,
        payload: &[u8],
    ) -> Result<MsgValue, EditError> {
        Ok(match family {
            Family::Nil => MsgValue::Nil,
            Family::Bool => MsgValue::Bool(tag == TRUE),
            Family::Uint => MsgValue::Number(MsgNumber::U64(be_uint(payload))),
            Family::Int => MsgValue::Number(MsgNumber::I64(match tag {
                0x00..=0x7f => tag as i64,
                NEG_FIXINT..=0xff => tag as i8 as i64,
                _ => be_int(payload),
            })),
            Family::Float if tag == FLOAT32 => {
                MsgValue::Number(MsgNumber::F32(f32::from_bits(be_uint(payload) as u32)))
            }
            Family::Float => MsgValue::Number(MsgNumber::F64(f64::from_bits(be_uint(payload)))),
            Family::Str => {
                let s = std::str::from_utf8(payload)
                    .map_err(|_| EditError::InvalidUtf8 { offset })?;
                MsgValue::Str(SmolStr::from(s))
            }
            Family::Bin => MsgValue::Bin(payload.to_vec()),
            Family::Ext => {
                // the type byte is the last header byte for every ext form
                let ext_type = self.data[body_start - 1] as i8;
                MsgValue::Ext(ext_type, payload.to_vec())
            }
            Family::Array | Family::Map => return Err(EditError::InvalidTag { tag, offset }),
        })
    }
}

/// Big-endian unsigned integer of up to eight bytes.
#[inline]
fn be_uint(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64)
}

/// Big-endian two's complement integer of one to eight bytes.
#[inline]
fn be_int(bytes: &[u8]) -> i64 {
    let shift = 64 - 8 * bytes.len() as u32;
    ((be_uint(bytes) << shift) as i64) >> shift
}

/// Decode the first value in `buf`. Trailing bytes are ignored.
pub fn decode(buf: &[u8]) -> Result<MsgValue, EditError> {
    decode_with(buf, &Limits::default())
}

pub fn decode_with(buf: &[u8], limits: &Limits) -> Result<MsgValue, EditError> {
    Decoder::new(buf, *limits).read_any(0)
}

/// Decode a map with string keys, returning it with the unread remainder.
///
/// When a key repeats, the last pair wins.
pub fn decode_map(buf: &[u8]) -> Result<(FastMap<SmolStr, MsgValue>, &[u8]), EditError> {
    let mut decoder = Decoder::new(buf, Limits::default());
    let (count, header_len) = crate::scanner::map_header(buf, 0)?;
    check_depth(0, &decoder.limits)?;
    decoder.x = header_len;
    let map = decoder.read_pairs(count, 0)?;
    Ok((map, &buf[decoder.x..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{Encoder, encode};
    use crate::msg_obj;

    #[test]
    fn test_scalars() {
        assert_eq!(decode(&[NIL]), Ok(MsgValue::Nil));
        assert_eq!(decode(&[TRUE]), Ok(MsgValue::Bool(true)));
        assert_eq!(decode(&[0x05]), Ok(MsgValue::from(5i64)));
        assert_eq!(decode(&[0xff]), Ok(MsgValue::from(-1i64)));
        assert_eq!(decode(&[INT8, 0x80]), Ok(MsgValue::from(-128i64)));
        assert_eq!(decode(&[INT16, 0xff, 0x38]), Ok(MsgValue::from(-200i64)));
        assert_eq!(decode(&[UINT16, 0x01, 0x2c]), Ok(MsgValue::from(300u64)));
        assert_eq!(
            decode(&[FLOAT32, 0x3f, 0xc0, 0, 0]),
            Ok(MsgValue::from(1.5f32))
        );
    }

    #[test]
    fn test_extremes_round_trip() {
        for i in [i64::MIN, i64::MAX, -33, -32, 127, 128, -129, 65536] {
            assert_eq!(
                decode(&encode(&MsgValue::from(i))).unwrap().as_i64(),
                Some(i)
            );
        }
        assert_eq!(
            decode(&encode(&MsgValue::from(u64::MAX))),
            Ok(MsgValue::from(u64::MAX))
        );
    }

    #[test]
    fn test_nested_document() {
        let tags = MsgValue::Array(vec!["a".into(), 2i64.into()]);
        let blob = MsgValue::Bin(vec![1, 2, 3]);
        let ext = MsgValue::Ext(9, vec![0; 5]);
        let doc = msg_obj!({
            "id" => "user:1",
            "tags" => tags,
            "blob" => blob,
            "ext" => ext,
            "profile" => { "score" => 99.5f64, "active" => true },
        });
        assert_eq!(decode(&encode(&doc)), Ok(doc));
    }

    #[test]
    fn test_decode_map_returns_remainder() {
        let mut buf = Vec::new();
        let mut en = Encoder::new(&mut buf);
        en.write_map_header(1);
        en.write_str("k");
        en.write_nil();
        en.write_bool(false);

        let (map, rest) = decode_map(&buf).unwrap();
        assert_eq!(map.get("k"), Some(&MsgValue::Nil));
        assert_eq!(rest, &[FALSE]);
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let buf = [0x82, 0xa1, b'a', 0x01, 0xa1, b'a', 0x02];
        let (map, _) = decode_map(&buf).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a"), Some(&MsgValue::from(2i64)));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            decode(&[0xa2, 0xff, 0xfe]),
            Err(EditError::InvalidUtf8 { offset: 0 })
        ));
        assert!(matches!(
            decode_map(&[0x91, NIL]),
            Err(EditError::NotAMap { .. })
        ));
        assert!(matches!(
            decode(&[0x81, 0x01, NIL]),
            Err(EditError::UnsupportedKeyType { .. })
        ));
        assert!(matches!(
            decode(&[ARRAY32, 0xff, 0xff, 0xff, 0xff]),
            Err(EditError::ShortBuffer { .. })
        ));
    }
}
