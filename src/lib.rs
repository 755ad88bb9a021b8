pub mod domain;
pub mod generation;
pub mod pipeline;
pub mod processing;
pub mod reader;
pub mod utils;
pub mod writer;

pub use utils::error::{Error, Result};
