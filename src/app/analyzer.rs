use crate::app::report::{render_report, ReportContent};
use crate::core::persistence;
use crate::core::stats::{self, TermAnalysis, TrendAnalysis};
use crate::domain::model::{format_score, Gradebook, ScoreEntry};
use crate::domain::ports::{SettingsProvider, Storage};
use crate::render::chart::{term_chart, trend_chart};
use crate::render::font::PdfFont;
use crate::render::scene::Scene;
use crate::render::svg::to_svg;
use crate::render::{render_chart, ChartFormat};
use crate::utils::error::{Result, ScoreError};
use crate::utils::validation::validate_file_extension;
use chrono::{Datelike, Local, NaiveDateTime};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// Gradebook service: every mutation is persisted to the working file.
pub struct ScoreAnalyzer<S: Storage, C: SettingsProvider> {
    storage: S,
    config: C,
    gradebook: Gradebook,
}

impl<S: Storage, C: SettingsProvider> ScoreAnalyzer<S, C> {
    /// Loads the working file named by the settings, or starts empty.
    pub fn open(storage: S, config: C) -> Result<Self> {
        let gradebook = persistence::load_or_default(&storage, config.data_file())?;
        Ok(Self {
            storage,
            config,
            gradebook,
        })
    }

    pub fn gradebook(&self) -> &Gradebook {
        &self.gradebook
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&self) -> Result<()> {
        persistence::save(&self.storage, self.config.data_file(), &self.gradebook)
    }

    fn full_mark_of(&self) -> impl Fn(&str) -> u32 + '_ {
        let default = self.config.default_full_mark();
        move |subject: &str| self.gradebook.full_mark(subject, default)
    }

    pub fn create_term(&mut self, grade: Option<&str>) -> Result<String> {
        let year = Local::now().year();
        let name = self
            .gradebook
            .create_term(year, grade, self.config.catalog())?;
        self.persist()?;
        tracing::info!("Created term {}", name);
        Ok(name)
    }

    pub fn select_term(&mut self, name: &str) -> Result<()> {
        self.gradebook.select_term(name)?;
        self.persist()
    }

    pub fn set_grade(&mut self, term: Option<&str>, grade: &str) -> Result<String> {
        let name = self
            .gradebook
            .set_grade(term, grade, self.config.catalog())?;
        self.persist()?;
        tracing::info!("Term {} is now {}", name, grade);
        Ok(name)
    }

    pub fn add_score(&mut self, term: Option<&str>, subject: &str, input: &str) -> Result<(String, f64)> {
        let recorded = self.gradebook.add_score(
            term,
            subject,
            input,
            self.config.catalog(),
            self.config.default_full_mark(),
        )?;
        self.persist()?;
        tracing::debug!("Recorded {} = {} in {}", subject, recorded.1, recorded.0);
        Ok(recorded)
    }

    pub fn remove_score(&mut self, term: Option<&str>, subject: &str) -> Result<f64> {
        let score = self.gradebook.remove_score(term, subject)?;
        self.persist()?;
        Ok(score)
    }

    pub fn add_custom_subject(&mut self, grade: &str, name: &str) -> Result<String> {
        let name = self
            .gradebook
            .add_custom_subject(grade, name, self.config.catalog())?;
        self.persist()?;
        tracing::info!("Added subject {} to {}", name, grade);
        Ok(name)
    }

    pub fn set_full_mark(&mut self, subject: &str, input: &str) -> Result<u32> {
        let mark = self
            .gradebook
            .set_full_mark(subject, input, self.config.catalog())?;
        self.persist()?;
        Ok(mark)
    }

    /// Subjects of one grade, or of every grade when `grade` is `None`.
    pub fn subjects(&self, grade: Option<&str>) -> Result<Vec<String>> {
        let catalog = self.config.catalog();
        match grade {
            Some(grade) if !catalog.contains(grade) => Err(ScoreError::UnknownGrade(grade.to_string())),
            Some(grade) => Ok(self.gradebook.subjects_for_grade(grade, catalog)),
            None => Ok(self.gradebook.all_subjects(catalog)),
        }
    }

    pub fn score_table(&self, term: Option<&str>) -> Result<(String, Vec<ScoreEntry>)> {
        let (name, resolved) = self.gradebook.resolve_term(term)?;
        let entries = stats::score_entries(resolved, self.full_mark_of(), &self.config.thresholds());
        Ok((name.to_string(), entries))
    }

    pub fn analyze_term(&self, term: Option<&str>) -> Result<TermAnalysis> {
        let (name, resolved) = self.gradebook.resolve_term(term)?;
        stats::analyze_term(name, resolved, self.full_mark_of(), &self.config.thresholds())
    }

    /// Trend over `subjects`, or over every recorded subject when empty.
    pub fn analyze_trend(&self, subjects: &[String]) -> Result<TrendAnalysis> {
        let subjects = if subjects.is_empty() {
            self.gradebook.recorded_subjects()
        } else {
            subjects.to_vec()
        };
        stats::analyze_trend(&self.gradebook, &subjects, self.full_mark_of())
    }

    pub fn term_scene(&self, analysis: &TermAnalysis) -> Scene {
        let (width, height) = self.config.chart_size();
        term_chart(analysis, width, height)
    }

    pub fn trend_scene(&self, trend: &TrendAnalysis) -> Scene {
        let (width, height) = self.config.chart_size();
        trend_chart(trend, width, height)
    }

    /// Writes a chart in the format implied by the extension of `path`.
    pub fn export_chart(&self, scene: &Scene, path: &str) -> Result<()> {
        let format = ChartFormat::from_path(path)?;
        let bytes = render_chart(scene, format, self.config.font_path())?;
        self.storage.write_file(path, &bytes)?;
        tracing::info!("Chart saved to {} ({} bytes)", path, bytes.len());
        Ok(())
    }

    /// Report rows of a term. A term without scores yields an empty table.
    pub fn report_content(&self, term: Option<&str>) -> Result<ReportContent> {
        let (name, resolved) = self.gradebook.resolve_term(term)?;
        let entries = stats::score_entries(resolved, self.full_mark_of(), &self.config.thresholds());
        Ok(ReportContent::new(name, resolved.grade.as_str(), entries))
    }

    fn report_bytes(&self, content: &ReportContent, generated_at: NaiveDateTime) -> Result<Vec<u8>> {
        let font = PdfFont::load(self.config.font_path())?;
        render_report(content, generated_at, font)
    }

    pub fn generate_report(&self, term: Option<&str>, path: &str) -> Result<ReportContent> {
        validate_file_extension(path, &["pdf"])?;
        let content = self.report_content(term)?;
        let bytes = self.report_bytes(&content, Local::now().naive_local())?;
        self.storage.write_file(path, &bytes)?;
        tracing::info!("Report for {} saved to {}", content.term, path);
        Ok(content)
    }

    pub fn export_data(&self, path: &str) -> Result<()> {
        persistence::save(&self.storage, path, &self.gradebook)?;
        tracing::info!("Data exported to {}", path);
        Ok(())
    }

    /// Replaces the gradebook with the file at `path`. The working file is
    /// left untouched when the import does not validate.
    pub fn import_data(&mut self, path: &str) -> Result<()> {
        let imported = persistence::load(&self.storage, path)?;
        self.gradebook = imported;
        self.persist()?;
        tracing::info!(
            "Imported {} terms from {}",
            self.gradebook.terms.len(),
            path
        );
        Ok(())
    }

    pub fn export_csv(&self, term: Option<&str>, path: &str) -> Result<usize> {
        validate_file_extension(path, &["csv"])?;
        let (_, entries) = self.score_table(term)?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["subject", "score", "full_mark", "level"])?;
        for entry in &entries {
            writer.write_record([
                entry.subject.as_str(),
                format_score(entry.score).as_str(),
                entry.full_mark.to_string().as_str(),
                entry.level.label(),
            ])?;
        }
        let data = writer
            .into_inner()
            .map_err(|e| ScoreError::IoError(e.into_error()))?;

        self.storage.write_file(path, &data)?;
        tracing::info!("Score table ({} rows) saved to {}", entries.len(), path);
        Ok(entries.len())
    }

    /// Bundles the data file with a report and charts. Entries that have
    /// nothing to show are left out.
    pub fn archive(&self, path: &str) -> Result<Vec<String>> {
        validate_file_extension(path, &["zip"])?;
        let mut entries: Vec<(String, Vec<u8>)> =
            vec![("gradebook.json".to_string(), persistence::encode(&self.gradebook)?)];

        match self.report_content(None) {
            Ok(content) => {
                let report = self.report_bytes(&content, Local::now().naive_local())?;
                entries.push(("report.pdf".to_string(), report));
            }
            Err(ScoreError::NoTermSelected) => {
                tracing::warn!("Archive without report: no term selected");
            }
            Err(e) => return Err(e),
        }

        match self.analyze_term(None) {
            Ok(analysis) => {
                let chart = to_svg(&self.term_scene(&analysis));
                entries.push(("chart.svg".to_string(), chart.into_bytes()));
            }
            Err(e @ (ScoreError::NoTermSelected | ScoreError::EmptyTerm(_))) => {
                tracing::warn!("Archive without term chart: {}", e);
            }
            Err(e) => return Err(e),
        }

        match self.analyze_trend(&[]) {
            Ok(trend) => {
                let chart = to_svg(&self.trend_scene(&trend));
                entries.push(("trend.svg".to_string(), chart.into_bytes()));
            }
            Err(ScoreError::ValidationError { message }) => {
                tracing::warn!("Archive without trend chart: {}", message);
            }
            Err(e) => return Err(e),
        }

        tracing::debug!("Creating ZIP file with {} files", entries.len());

        // 建立 ZIP 並取回底層 Vec<u8>
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            for (name, data) in &entries {
                zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                zip.write_all(data)?;
            }
            zip.finish()?.into_inner()
        };

        self.storage.write_file(path, &zip_data)?;
        tracing::info!("Archive ({} bytes) saved to {}", zip_data.len(), path);
        Ok(entries.into_iter().map(|(name, _)| name).collect())
    }
}
