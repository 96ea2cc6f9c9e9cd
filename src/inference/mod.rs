pub mod context;
pub mod pipeline;

// Re-export commonly used types
pub use context::ServingContext;
pub use pipeline::InferencePipeline;
