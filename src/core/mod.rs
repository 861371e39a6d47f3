pub mod gradebook;
pub mod grading;
pub mod persistence;
pub mod stats;

pub use crate::domain::model::{Gradebook, Level, ScoreEntry, Term};
pub use crate::domain::ports::{SettingsProvider, Storage};
pub use crate::utils::error::Result;
