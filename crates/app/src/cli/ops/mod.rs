pub mod audit;
pub mod keygen;
pub mod reconstruct;
pub mod split;
pub mod tag;
pub mod version;

pub use audit::Audit;
pub use keygen::Keygen;
pub use reconstruct::Reconstruct;
pub use split::Split;
pub use tag::TagSegment;
pub use version::Version;
