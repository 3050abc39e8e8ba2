//! Value objects representing immutable domain concepts.

pub mod request_meta;

// Re-export commonly used types
pub use request_meta::RequestMeta;
