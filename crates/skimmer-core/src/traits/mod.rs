pub mod filler;
pub mod source;

pub use filler::Filler;
pub use source::{Records, SourceAccessor};
