use super::read_op::RecordReadable;
use crate::config::Limits;
use crate::edit::Editor;
use crate::error::EditError;
use crate::scanner::map_header;

// ─── Reader (zero-copy) ────────────────────────────────────────────────────
/// Zero-copy reader over an encoded map.
/// No parsing happens until you request a specific field.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    pub data_buf: &'a [u8],
    pub(crate) editor: Editor,
}

impl<'a> Record<'a> {
    /// Wrap `data_buf`, checking only that it starts with a map header.
    #[inline]
    pub fn new(data_buf: &'a [u8]) -> Result<Self, EditError> {
        Self::with_limits(data_buf, Limits::default())
    }

    pub fn with_limits(data_buf: &'a [u8], limits: Limits) -> Result<Self, EditError> {
        map_header(data_buf, 0)?;
        Ok(Self {
            data_buf,
            editor: Editor::new(limits),
        })
    }

    /// Value bytes borrowed from the underlying buffer rather than from `self`.
    pub fn get_raw_ref(&self, name: &str) -> Option<&'a [u8]> {
        self.editor.scan(name, self.data_buf).ok().flatten()
    }
}

impl RecordReadable for Record<'_> {
    #[inline]
    fn data_buf(&self) -> &[u8] {
        self.data_buf
    }

    #[inline]
    fn editor(&self) -> &Editor {
        &self.editor
    }
}
