use serde::ser::{Serialize, SerializeMap, SerializeSeq, SerializeTuple, Serializer};
use smol_str::SmolStr;
use std::collections::BTreeMap;
use std::convert::TryFrom;

pub type FastMap<K, V> = BTreeMap<K, V>;

// ─── MsgNumber ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq)]
pub enum MsgNumber {
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl std::fmt::Debug for MsgNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MsgNumber::I64(i) => write!(f, "I64({})", i),
            MsgNumber::U64(u) => write!(f, "U64({})", u),
            MsgNumber::F32(v) => write!(f, "F32({})", v),
            MsgNumber::F64(v) => write!(f, "F64({})", v),
        }
    }
}

impl MsgNumber {
    pub fn as_f64(self) -> f64 {
        match self {
            MsgNumber::I64(i) => i as f64,
            MsgNumber::U64(u) => u as f64,
            MsgNumber::F32(f) => f as f64,
            MsgNumber::F64(f) => f,
        }
    }

    pub fn as_i64(self) -> Option<i64> {
        match self {
            MsgNumber::I64(i) => Some(i),
            MsgNumber::U64(u) => i64::try_from(u).ok(),
            MsgNumber::F32(_) | MsgNumber::F64(_) => None,
        }
    }

    pub fn as_u64(self) -> Option<u64> {
        match self {
            MsgNumber::U64(u) => Some(u),
            MsgNumber::I64(i) => u64::try_from(i).ok(),
            MsgNumber::F32(_) | MsgNumber::F64(_) => None,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, MsgNumber::F32(_) | MsgNumber::F64(_))
    }
}

// ─── MsgValue ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub enum MsgValue {
    #[default]
    Nil,
    Bool(bool),
    Number(MsgNumber),
    Str(SmolStr),
    Bin(Vec<u8>),
    Array(Vec<MsgValue>),
    Map(FastMap<SmolStr, MsgValue>),
    Ext(i8, Vec<u8>),
}

impl MsgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MsgValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MsgValue::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MsgValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            MsgValue::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MsgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bin(&self) -> Option<&[u8]> {
        match self {
            MsgValue::Bin(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&FastMap<SmolStr, MsgValue>> {
        match self {
            MsgValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<MsgValue>> {
        match self {
            MsgValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&MsgValue> {
        self.as_map()?.get(key)
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, MsgValue::Nil)
    }
}

// ─── Serialize ──────────────────────────────────────────────────────────────

impl Serialize for MsgValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MsgValue::Nil => serializer.serialize_none(),
            MsgValue::Bool(b) => serializer.serialize_bool(*b),
            MsgValue::Number(n) => match n {
                MsgNumber::I64(i) => serializer.serialize_i64(*i),
                MsgNumber::U64(u) => serializer.serialize_u64(*u),
                MsgNumber::F32(f) => serializer.serialize_f32(*f),
                MsgNumber::F64(f) => serializer.serialize_f64(*f),
            },
            MsgValue::Str(s) => serializer.serialize_str(s.as_str()),
            MsgValue::Bin(b) => serializer.serialize_bytes(b),
            MsgValue::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for v in arr {
                    seq.serialize_element(v)?;
                }
                seq.end()
            }
            MsgValue::Map(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k.as_str(), v)?;
                }
                m.end()
            }
            MsgValue::Ext(ext_type, data) => {
                let mut tup = serializer.serialize_tuple(2)?;
                tup.serialize_element(ext_type)?;
                tup.serialize_element(&BytesRef(data))?;
                tup.end()
            }
        }
    }
}

/// Serializes a byte slice through `serialize_bytes` rather than as a sequence.
struct BytesRef<'a>(&'a [u8]);

impl Serialize for BytesRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.0)
    }
}

// ─── From impls ─────────────────────────────────────────────────────────────

impl From<f64> for MsgValue {
    fn from(n: f64) -> Self {
        MsgValue::Number(MsgNumber::F64(n))
    }
}

impl From<f32> for MsgValue {
    fn from(n: f32) -> Self {
        MsgValue::Number(MsgNumber::F32(n))
    }
}

impl From<i64> for MsgValue {
    fn from(n: i64) -> Self {
        MsgValue::Number(MsgNumber::I64(n))
    }
}

impl From<u64> for MsgValue {
    fn from(n: u64) -> Self {
        MsgValue::Number(MsgNumber::U64(n))
    }
}

impl From<bool> for MsgValue {
    fn from(b: bool) -> Self {
        MsgValue::Bool(b)
    }
}

impl From<&str> for MsgValue {
    fn from(s: &str) -> Self {
        MsgValue::Str(SmolStr::from(s))
    }
}

impl From<String> for MsgValue {
    fn from(s: String) -> Self {
        MsgValue::Str(SmolStr::from(s))
    }
}

impl From<Vec<u8>> for MsgValue {
    fn from(b: Vec<u8>) -> Self {
        MsgValue::Bin(b)
    }
}

impl From<&[u8]> for MsgValue {
    fn from(b: &[u8]) -> Self {
        MsgValue::Bin(b.to_vec())
    }
}

// ─── From/Into serde_json::Value ────────────────────────────────────────────

impl From<serde_json::Value> for MsgValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => MsgValue::Nil,
            serde_json::Value::Bool(b) => MsgValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    MsgValue::Number(MsgNumber::I64(i))
                } else if let Some(u) = n.as_u64() {
                    MsgValue::Number(MsgNumber::U64(u))
                } else {
                    MsgValue::Number(MsgNumber::F64(n.as_f64().unwrap_or(0.0)))
                }
            }
            serde_json::Value::String(s) => MsgValue::Str(SmolStr::from(s)),
            serde_json::Value::Array(arr) => {
                MsgValue::Array(arr.into_iter().map(MsgValue::from).collect())
            }
            serde_json::Value::Object(obj) => MsgValue::Map(
                obj.into_iter()
                    .map(|(k, v)| (SmolStr::from(k), MsgValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Binary payloads become arrays of byte values; extensions become
/// `{"type": t, "data": [...]}`. Non-finite floats become `null`.
impl From<MsgValue> for serde_json::Value {
    fn from(val: MsgValue) -> Self {
        match val {
            MsgValue::Nil => serde_json::Value::Null,
            MsgValue::Bool(b) => serde_json::Value::Bool(b),
            MsgValue::Number(n) => match n {
                MsgNumber::I64(i) => serde_json::json!(i),
                MsgNumber::U64(u) => serde_json::json!(u),
                MsgNumber::F32(f) => serde_json::json!(f as f64),
                MsgNumber::F64(f) => serde_json::json!(f),
            },
            MsgValue::Str(s) => serde_json::Value::String(s.to_string()),
            MsgValue::Bin(b) => serde_json::json!(b),
            MsgValue::Array(arr) => {
                serde_json::Value::Array(arr.into_iter().map(|v| v.into()).collect())
            }
            MsgValue::Map(obj) => serde_json::Value::Object(
                obj.into_iter()
                    .map(|(k, v)| (k.to_string(), v.into()))
                    .collect(),
            ),
            MsgValue::Ext(ext_type, data) => serde_json::json!({
                "type": ext_type,
                "data": data,
            }),
        }
    }
}

/// Build a `MsgValue::Map` from `key => value` pairs; nested `{ ... }` blocks
/// become nested maps.
#[macro_export]
macro_rules! msg_obj {
    ({ $($key:expr => $val:tt),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut map = $crate::value::FastMap::default();
        $(
            map.insert(
                $crate::SmolStr::new($key),
                $crate::value::MsgValue::from($crate::msg_obj!(@value $val))
            );
        )*
        $crate::value::MsgValue::Map(map)
    }};

    (@value { $($inner:tt)* }) => {
        $crate::msg_obj!({ $($inner)* })
    };

    (@value $val:expr) => {
        $val
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_conversions() {
        assert_eq!(MsgNumber::U64(7).as_i64(), Some(7));
        assert_eq!(MsgNumber::U64(u64::MAX).as_i64(), None);
        assert_eq!(MsgNumber::I64(-1).as_u64(), None);
        assert_eq!(MsgNumber::F32(1.5).as_f64(), 1.5);
        assert_eq!(MsgNumber::F64(2.0).as_i64(), None);
    }

    #[test]
    fn test_macro_builds_nested_map() {
        let v = msg_obj!({
            "name" => "Alice",
            "age" => 30i64,
            "profile" => { "bio" => "dev" },
        });
        assert_eq!(v.get("name").and_then(|v| v.as_str()), Some("Alice"));
        assert_eq!(v.get("age").and_then(|v| v.as_i64()), Some(30));
        assert_eq!(
            v.get("profile").and_then(|p| p.get("bio")).and_then(|v| v.as_str()),
            Some("dev")
        );
    }

    #[test]
    fn test_json_conversion() {
        let json = serde_json::json!({"a": [1, -2, 2.5, null, true], "s": "x"});
        let v = MsgValue::from(json.clone());
        let back: serde_json::Value = v.into();
        assert_eq!(back, json);
    }

    #[test]
    fn test_json_bin_and_ext() {
        let bin: serde_json::Value = MsgValue::Bin(vec![1, 2]).into();
        assert_eq!(bin, serde_json::json!([1, 2]));
        let ext: serde_json::Value = MsgValue::Ext(-3, vec![9]).into();
        assert_eq!(ext, serde_json::json!({"type": -3, "data": [9]}));
    }

    #[test]
    fn test_serialize_to_json_text() {
        let v = msg_obj!({ "k" => 1i64, "f" => 2.0f64 });
        let text = serde_json::to_string(&v).unwrap();
        assert_eq!(text, r#"{"f":2.0,"k":1}"#);
    }
}
