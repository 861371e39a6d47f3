use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "score-analyzer")]
#[command(about = "Record student scores by term, classify grade bands, chart trends and print reports")]
#[command(version)]
pub struct Cli {
    /// Path to TOML configuration file (defaults to ./score-analyzer.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Working data file, overrides [storage] data_file
    #[arg(short, long, global = true)]
    pub data: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage terms
    #[command(subcommand)]
    Term(TermCommand),
    /// Manage subjects and full marks
    #[command(subcommand)]
    Subject(SubjectCommand),
    /// Enter and inspect scores
    #[command(subcommand)]
    Score(ScoreCommand),
    /// Statistics and charts
    #[command(subcommand)]
    Analyze(AnalyzeCommand),
    /// Generate a PDF score report
    Report {
        /// Output PDF path
        #[arg(short, long)]
        output: String,
        /// Term to report on (defaults to the current term)
        #[arg(long)]
        term: Option<String>,
    },
    /// Export the whole gradebook to a JSON file
    Save { path: String },
    /// Replace the gradebook with a JSON file previously saved
    Load { path: String },
    /// Bundle data, report and charts into a ZIP archive
    Archive { path: String },
}

#[derive(Debug, Subcommand)]
pub enum TermCommand {
    /// Create a new term and make it current
    New {
        #[arg(long)]
        grade: Option<String>,
    },
    /// List terms
    List,
    /// Make a term current
    Select { name: String },
    /// Change the grade of a term
    Grade {
        grade: String,
        #[arg(long)]
        term: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SubjectCommand {
    /// Add a custom subject to a grade
    Add {
        name: String,
        #[arg(long)]
        grade: String,
    },
    /// List subjects of a grade, or of all grades
    List {
        #[arg(long)]
        grade: Option<String>,
    },
    /// Set the full mark of a subject
    FullMark { subject: String, mark: String },
}

#[derive(Debug, Subcommand)]
pub enum ScoreCommand {
    /// Record a score
    Add {
        subject: String,
        score: String,
        #[arg(long)]
        term: Option<String>,
    },
    /// Delete a recorded score
    Remove {
        subject: String,
        #[arg(long)]
        term: Option<String>,
    },
    /// Print the score table
    Table {
        #[arg(long)]
        term: Option<String>,
        /// Also write the table as CSV
        #[arg(long)]
        csv: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum AnalyzeCommand {
    /// Summary and level distribution of one term
    Term {
        #[arg(long)]
        term: Option<String>,
        /// Export the chart (.png, .svg or .pdf)
        #[arg(long)]
        chart: Option<String>,
    },
    /// Score trend of subjects across terms
    Trend {
        /// Subjects to plot (defaults to every recorded subject)
        #[arg(long, value_delimiter = ',')]
        subjects: Vec<String>,
        /// Export the chart (.png, .svg or .pdf)
        #[arg(long)]
        chart: Option<String>,
    },
}
