#![doc = include_str!("../README.md")]
#![warn(missing_docs, missing_debug_implementations)]
mod config;
mod error;
mod instantiate;
mod pool;
mod registry;

pub use config::*;
pub use error::*;
pub use instantiate::*;
pub use pool::*;
pub use registry::*;
