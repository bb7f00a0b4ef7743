//! HTTP request handlers for the Delve web server

pub mod capabilities;
pub mod docs;
pub mod health;
pub mod research;
pub mod types;

pub use capabilities::*;
pub use docs::*;
pub use health::*;
pub use research::*;

// Re-export all types for convenience
pub use types::*;
