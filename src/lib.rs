pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod render;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::Cli;
pub use config::{AppConfig, LocalStorage};

pub use app::ScoreAnalyzer;
pub use domain::model::{Gradebook, Level, ScoreEntry, Term};
pub use utils::error::{Result, ScoreError};
