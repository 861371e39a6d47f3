pub mod analyzer;
#[cfg(feature = "cli")]
pub mod commands;
pub mod report;

pub use analyzer::ScoreAnalyzer;
