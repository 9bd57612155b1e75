//! Sequential writer for the wire format.
//!
//! Each writer picks the shortest header that fits. Lengths and counts above
//! `u32::MAX` are not representable in the format.

use arrayvec::ArrayVec;

use crate::types::*;
use crate::value::{MsgNumber, MsgValue};

/// Longest possible header: tag + 32-bit length + ext type byte.
pub type Header = ArrayVec<u8, 6>;

#[inline]
fn sized_header(len: usize, fix: Option<(u8, usize)>, tags: [u8; 3]) -> Header {
    let mut hdr = Header::new();
    match fix {
        Some((prefix, max)) if len <= max => hdr.push(prefix | len as u8),
        _ if len <= u8::MAX as usize && tags[0] != 0 => {
            hdr.push(tags[0]);
            hdr.push(len as u8);
        }
        _ if len <= u16::MAX as usize => {
            hdr.push(tags[1]);
            hdr.extend((len as u16).to_be_bytes());
        }
        _ => {
            hdr.push(tags[2]);
            hdr.extend((len as u32).to_be_bytes());
        }
    }
    hdr
}

pub fn str_header(len: usize) -> Header {
    sized_header(len, Some((FIXSTR, 0x1f)), [STR8, STR16, STR32])
}

pub fn bin_header(len: usize) -> Header {
    sized_header(len, None, [BIN8, BIN16, BIN32])
}

pub fn array_header(len: usize) -> Header {
    sized_header(len, Some((FIXARRAY, 0x0f)), [0, ARRAY16, ARRAY32])
}

pub fn map_header(len: usize) -> Header {
    sized_header(len, Some((FIXMAP, 0x0f)), [0, MAP16, MAP32])
}

pub fn ext_header(len: usize, ext_type: i8) -> Header {
    let fixed = match len {
        1 => Some(FIXEXT1),
        2 => Some(FIXEXT2),
        4 => Some(FIXEXT4),
        8 => Some(FIXEXT8),
        16 => Some(FIXEXT16),
        _ => None,
    };
    let mut hdr = match fixed {
        Some(tag) => {
            let mut hdr = Header::new();
            hdr.push(tag);
            hdr
        }
        None => sized_header(len, None, [EXT8, EXT16, EXT32]),
    };
    hdr.push(ext_type as u8);
    hdr
}

// ─── Encoder ────────────────────────────────────────────────────────────────

/// Appends encoded values to a caller-owned buffer.
pub struct Encoder<'a> {
    buf: &'a mut Vec<u8>,
}

impl<'a> Encoder<'a> {
    pub fn new(buf: &'a mut Vec<u8>) -> Self {
        Self { buf }
    }

    #[inline]
    pub fn write_nil(&mut self) {
        self.buf.push(NIL);
    }

    #[inline]
    pub fn write_bool(&mut self, b: bool) {
        self.buf.push(if b { TRUE } else { FALSE });
    }

    pub fn write_u64(&mut self, u: u64) {
        if u <= 0x7f {
            self.buf.push(u as u8);
        } else if u <= u8::MAX as u64 {
            self.buf.extend_from_slice(&[UINT8, u as u8]);
        } else if u <= u16::MAX as u64 {
            self.buf.push(UINT16);
            self.buf.extend_from_slice(&(u as u16).to_be_bytes());
        } else if u <= u32::MAX as u64 {
            self.buf.push(UINT32);
            self.buf.extend_from_slice(&(u as u32).to_be_bytes());
        } else {
            self.buf.push(UINT64);
            self.buf.extend_from_slice(&u.to_be_bytes());
        }
    }

    pub fn write_i64(&mut self, i: i64) {
        if i >= 0 {
            self.write_u64(i as u64);
        } else if i >= -32 {
            self.buf.push(i as i8 as u8);
        } else if i >= i8::MIN as i64 {
            self.buf.extend_from_slice(&[INT8, i as i8 as u8]);
        } else if i >= i16::MIN as i64 {
            self.buf.push(INT16);
            self.buf.extend_from_slice(&(i as i16).to_be_bytes());
        } else if i >= i32::MIN as i64 {
            self.buf.push(INT32);
            self.buf.extend_from_slice(&(i as i32).to_be_bytes());
        } else {
            self.buf.push(INT64);
            self.buf.extend_from_slice(&i.to_be_bytes());
        }
    }

    pub fn write_f32(&mut self, f: f32) {
        self.buf.push(FLOAT32);
        self.buf.extend_from_slice(&f.to_be_bytes());
    }

    pub fn write_f64(&mut self, f: f64) {
        self.buf.push(FLOAT64);
        self.buf.extend_from_slice(&f.to_be_bytes());
    }

    pub fn write_str(&mut self, s: &str) {
        self.buf.extend_from_slice(&str_header(s.len()));
        self.buf.extend_from_slice(s.as_bytes());
    }

    pub fn write_bin(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(&bin_header(b.len()));
        self.buf.extend_from_slice(b);
    }

    pub fn write_ext(&mut self, ext_type: i8, data: &[u8]) {
        self.buf.extend_from_slice(&ext_header(data.len(), ext_type));
        self.buf.extend_from_slice(data);
    }

    pub fn write_array_header(&mut self, len: usize) {
        self.buf.extend_from_slice(&array_header(len));
    }

    pub fn write_map_header(&mut self, len: usize) {
        self.buf.extend_from_slice(&map_header(len));
    }

    /// Append bytes that are already encoded.
    pub fn write_raw(&mut self, raw: &[u8]) {
        self.buf.extend_from_slice(raw);
    }

    pub fn write_value(&mut self, value: &MsgValue) {
        match value {
            MsgValue::Nil => self.write_nil(),
            MsgValue::Bool(b) => self.write_bool(*b),
            MsgValue::Number(n) => match n {
                MsgNumber::I64(i) => self.write_i64(*i),
                MsgNumber::U64(u) => self.write_u64(*u),
                MsgNumber::F32(f) => self.write_f32(*f),
                MsgNumber::F64(f) => self.write_f64(*f),
            },
            MsgValue::Str(s) => self.write_str(s),
            MsgValue::Bin(b) => self.write_bin(b),
            MsgValue::Array(items) => {
                self.write_array_header(items.len());
                for item in items {
                    self.write_value(item);
                }
            }
            MsgValue::Map(map) => {
                self.write_map_header(map.len());
                for (k, v) in map {
                    self.write_str(k);
                    self.write_value(v);
                }
            }
            MsgValue::Ext(ext_type, data) => self.write_ext(*ext_type, data),
        }
    }
}

/// Encode one value into a fresh buffer.
pub fn encode(value: &MsgValue) -> Vec<u8> {
    let mut buf = Vec::new();
    Encoder::new(&mut buf).write_value(value);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::size_at;

    fn encoded(f: impl FnOnce(&mut Encoder)) -> Vec<u8> {
        let mut buf = Vec::new();
        f(&mut Encoder::new(&mut buf));
        buf
    }

    #[test]
    fn test_int_shortest_forms() {
        assert_eq!(encoded(|e| e.write_i64(5)), vec![0x05]);
        assert_eq!(encoded(|e| e.write_i64(-1)), vec![0xff]);
        assert_eq!(encoded(|e| e.write_i64(-32)), vec![0xe0]);
        assert_eq!(encoded(|e| e.write_i64(-33)), vec![INT8, 0xdf]);
        assert_eq!(encoded(|e| e.write_i64(-200)), vec![INT16, 0xff, 0x38]);
        assert_eq!(encoded(|e| e.write_u64(200)), vec![UINT8, 200]);
        assert_eq!(encoded(|e| e.write_u64(300)), vec![UINT16, 0x01, 0x2c]);
        assert_eq!(encoded(|e| e.write_u64(70_000)).len(), 5);
        assert_eq!(encoded(|e| e.write_u64(u64::MAX)).len(), 9);
        assert_eq!(encoded(|e| e.write_i64(i64::MIN)).len(), 9);
    }

    #[test]
    fn test_floats_fixed_width() {
        assert_eq!(
            encoded(|e| e.write_f64(2.0)),
            vec![FLOAT64, 0x40, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(encoded(|e| e.write_f32(1.5)), vec![FLOAT32, 0x3f, 0xc0, 0, 0]);
    }

    #[test]
    fn test_header_widths() {
        assert_eq!(str_header(31).as_slice(), &[0xbf]);
        assert_eq!(str_header(32).as_slice(), &[STR8, 32]);
        assert_eq!(str_header(256).as_slice(), &[STR16, 1, 0]);
        assert_eq!(str_header(65536).as_slice(), &[STR32, 0, 1, 0, 0]);
        assert_eq!(bin_header(0).as_slice(), &[BIN8, 0]);
        assert_eq!(bin_header(300).as_slice(), &[BIN16, 1, 0x2c]);
        assert_eq!(map_header(15).as_slice(), &[0x8f]);
        assert_eq!(map_header(16).as_slice(), &[MAP16, 0, 16]);
        assert_eq!(map_header(70_000).as_slice(), &[MAP32, 0, 1, 0x11, 0x70]);
        assert_eq!(array_header(16).as_slice(), &[ARRAY16, 0, 16]);
        assert_eq!(ext_header(4, 7).as_slice(), &[FIXEXT4, 7]);
        assert_eq!(ext_header(3, -1).as_slice(), &[EXT8, 3, 0xff]);
    }

    #[test]
    fn test_every_write_is_sized_exactly() {
        let long = "x".repeat(300);
        let blob = vec![0u8; 70_000];
        let buf = encoded(|e| {
            e.write_nil();
            e.write_bool(true);
            e.write_i64(-5000);
            e.write_u64(1 << 40);
            e.write_f32(0.5);
            e.write_str("short");
            e.write_str(&long);
            e.write_bin(&blob);
            e.write_ext(3, &[1, 2, 3]);
            e.write_ext(4, &[0; 16]);
            e.write_array_header(2);
            e.write_nil();
            e.write_str("a");
        });
        let mut offset = 0;
        let mut values = 0;
        while offset < buf.len() {
            offset += size_at(&buf, offset).unwrap();
            values += 1;
        }
        assert_eq!(offset, buf.len());
        assert_eq!(values, 11);
    }
}
