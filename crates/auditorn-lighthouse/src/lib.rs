mod args;
mod engine;
mod error;
mod finder;

pub use args::LighthouseArgs;
pub use engine::{AuditEngine, LighthouseEngine};
pub use error::{Error, Result};
pub use finder::{ChromeFinder, LighthouseFinder};
