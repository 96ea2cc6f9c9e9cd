pub mod assembler;
pub mod record;
pub mod reference;
pub mod schema;

// Re-export commonly used types
pub use assembler::{assemble, join, project, FeatureVector, JoinedRecord, MissingRegionPolicy};
pub use record::{Record, RegionCode};
pub use reference::{ReferenceRow, ReferenceStore};
pub use schema::FeatureSchema;
