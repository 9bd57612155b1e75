//! Field-level surgery on MessagePack maps.
//!
//! Values are found by walking the encoded bytes, and edits copy byte ranges
//! around the one value that changes. Nothing is decoded on the edit path.
//!
//! - [`edit`]: locate, replace, insert and remove on a top-level map
//! - [`classify`]: tag families and the encoded length of any value
//! - [`record`]: borrowed and owned views with typed getters and setters
//! - [`encode`] / [`decode`]: a small companion codec built on [`MsgValue`]

pub mod classify;
pub mod config;
pub mod decode;
pub mod edit;
pub mod encode;
pub mod error;
pub mod record;
mod scanner;
pub mod types;
pub mod value;

pub use smol_str::SmolStr;

pub use classify::{classify, size_at, size_at_with};
pub use config::Limits;
pub use decode::{decode, decode_map, decode_with};
pub use edit::{Editor, fields, has_key, insert, locate, locate_path, remove, replace, replace_into};
pub use encode::{Encoder, encode};
pub use error::EditError;
pub use record::{Record, RecordMut, RecordReadable};
pub use types::{Family, FieldIter, FieldRef, PathSegment};
pub use value::{FastMap, MsgNumber, MsgValue};
