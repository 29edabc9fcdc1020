//! Record model: the normalized log entry, its field-value variant, and ID
//! generation.

pub mod field;
pub mod id;
pub mod level;
pub mod record;

pub use field::FieldValue;
pub use id::IdGenerator;
pub use record::{FieldInfo, Record};
