pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Audit, Keygen, Reconstruct, Split, TagSegment, Version};
