mod error;
mod mmcif;
mod table;

pub use mmcif::reader::read as read_field_table;

pub use table::{FieldTable, LoopRow, is_set};

pub use error::Error;
