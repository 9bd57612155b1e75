pub mod read_op;
pub mod record;
pub mod record_mut;
pub mod write_op;

pub use read_op::RecordReadable;
pub use record::Record;
pub use record_mut::RecordMut;
