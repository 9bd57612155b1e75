use super::Record;
use super::read_op::RecordReadable;
use crate::config::Limits;
use crate::edit::Editor;
use crate::error::EditError;
use crate::scanner::map_header;
use crate::types::FIXMAP;

/// An encoded map that owns its bytes and is edited in place.
#[derive(Debug, Clone)]
pub struct RecordMut {
    pub(crate) data_buf: Vec<u8>,
    pub(crate) editor: Editor,
}

impl RecordMut {
    pub fn new(data_buf: Vec<u8>) -> Result<Self, EditError> {
        Self::with_limits(data_buf, Limits::default())
    }

    pub fn with_limits(data_buf: Vec<u8>, limits: Limits) -> Result<Self, EditError> {
        map_header(&data_buf, 0)?;
        Ok(Self {
            data_buf,
            editor: Editor::new(limits),
        })
    }

    /// Create a new empty mutable record.
    pub fn new_empty() -> Self {
        Self {
            data_buf: vec![FIXMAP],
            editor: Editor::default(),
        }
    }

    #[inline]
    pub fn as_record(&self) -> Record<'_> {
        Record {
            data_buf: &self.data_buf,
            editor: self.editor,
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Finalize
    // ════════════════════════════════════════════════════════════════════════

    /// Consume and return the underlying buffer.
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data_buf
    }

    /// Borrow the underlying buffer.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data_buf
    }

    /// Total byte size of the record.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.data_buf.len()
    }
}

impl RecordReadable for RecordMut {
    #[inline]
    fn data_buf(&self) -> &[u8] {
        &self.data_buf
    }

    #[inline]
    fn editor(&self) -> &Editor {
        &self.editor
    }
}
