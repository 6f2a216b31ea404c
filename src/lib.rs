pub mod alignment;
pub mod analyzer;
pub mod archive;
pub mod assets;
pub mod batch;
pub mod buffer;
pub mod compose;
pub mod config;
pub mod error;
pub mod platform;
pub mod worker;

pub use error::{JunctionError, Result};
