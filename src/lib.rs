pub mod aggregate;
pub mod analyzer;
pub mod authors;
pub mod chart;
pub mod cli;
pub mod config;
pub mod discover;
pub mod error;
pub mod git;
pub mod logging;
pub mod model;
pub mod report;
pub mod summary;
pub mod util;

pub use analyzer::{Analysis, Analyzer};
pub use error::{ContribError, Result};
