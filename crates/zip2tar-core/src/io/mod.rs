//! I/O wrappers used by the converter.

pub mod exact;

pub use exact::ExactSizeReader;
pub use exact::ReadFailure;
