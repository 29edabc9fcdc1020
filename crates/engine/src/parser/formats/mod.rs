pub mod logfmt;
pub mod raw;
pub mod structured;

pub use logfmt::LogfmtFormat;
pub use raw::RawFormat;
pub use structured::StructuredFormat;
