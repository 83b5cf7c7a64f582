pub mod definition;
pub mod error;
pub mod options;
pub mod output;
pub mod report;
pub mod stats;
pub mod summary;

pub use error::{Error, Result};
