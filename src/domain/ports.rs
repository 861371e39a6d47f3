use crate::core::grading::GradeThresholds;
use crate::domain::catalog::GradeCatalog;
use crate::utils::error::Result;

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
    fn exists(&self, path: &str) -> bool;
}

pub trait SettingsProvider {
    fn data_file(&self) -> &str;
    fn catalog(&self) -> &GradeCatalog;
    fn thresholds(&self) -> GradeThresholds;
    fn default_full_mark(&self) -> u32;
    fn font_path(&self) -> Option<&str>;
    fn chart_size(&self) -> (u32, u32);
}
