//! Request/response types used by the handlers

pub mod common;
pub mod research;

pub use common::*;
pub use research::*;
