//! Core engine types and utilities

pub mod types;
pub mod error;
pub mod logging;
pub mod binary;

pub use types::*;
pub use error::{Error, ImportError, MaterialError, SceneLoadError};
