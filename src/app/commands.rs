//! Executes parsed CLI commands against a [`ScoreAnalyzer`].

use crate::app::analyzer::ScoreAnalyzer;
use crate::config::args::{AnalyzeCommand, Command, ScoreCommand, SubjectCommand, TermCommand};
use crate::core::grading::LevelDistribution;
use crate::core::stats::TermAnalysis;
use crate::domain::model::{format_score, ScoreEntry};
use crate::domain::ports::{SettingsProvider, Storage};
use crate::utils::error::Result;

pub fn execute<S: Storage, C: SettingsProvider>(
    analyzer: &mut ScoreAnalyzer<S, C>,
    command: &Command,
) -> Result<()> {
    match command {
        Command::Term(cmd) => term(analyzer, cmd),
        Command::Subject(cmd) => subject(analyzer, cmd),
        Command::Score(cmd) => score(analyzer, cmd),
        Command::Analyze(cmd) => analyze(analyzer, cmd),
        Command::Report { output, term } => {
            let content = analyzer.generate_report(term.as_deref(), output)?;
            println!("✅ Report for {} saved to {}", content.term, output);
            Ok(())
        }
        Command::Save { path } => {
            analyzer.export_data(path)?;
            println!("✅ Data saved to {}", path);
            Ok(())
        }
        Command::Load { path } => {
            analyzer.import_data(path)?;
            println!(
                "✅ Loaded {} terms from {}",
                analyzer.gradebook().terms.len(),
                path
            );
            Ok(())
        }
        Command::Archive { path } => {
            let names = analyzer.archive(path)?;
            println!("✅ Archive saved to {}", path);
            for name in names {
                println!("   {}", name);
            }
            Ok(())
        }
    }
}

fn term<S: Storage, C: SettingsProvider>(
    analyzer: &mut ScoreAnalyzer<S, C>,
    cmd: &TermCommand,
) -> Result<()> {
    match cmd {
        TermCommand::New { grade } => {
            let name = analyzer.create_term(grade.as_deref())?;
            println!("✅ Created {} (now current)", name);
        }
        TermCommand::List => {
            let book = analyzer.gradebook();
            if book.terms.is_empty() {
                println!("No terms yet. Create one with `term new`.");
            }
            for (name, term) in &book.terms {
                let marker = if book.current_term.as_deref() == Some(name.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{} {}  [{}]  {} scores",
                    marker,
                    name,
                    term.grade,
                    term.subjects.len()
                );
            }
        }
        TermCommand::Select { name } => {
            analyzer.select_term(name)?;
            println!("✅ Current term: {}", name);
        }
        TermCommand::Grade { grade, term } => {
            let name = analyzer.set_grade(term.as_deref(), grade)?;
            println!("✅ {} is now {}", name, grade);
        }
    }
    Ok(())
}

fn subject<S: Storage, C: SettingsProvider>(
    analyzer: &mut ScoreAnalyzer<S, C>,
    cmd: &SubjectCommand,
) -> Result<()> {
    match cmd {
        SubjectCommand::Add { name, grade } => {
            let name = analyzer.add_custom_subject(grade, name)?;
            println!("✅ Added {} to {}", name, grade);
        }
        SubjectCommand::List { grade } => {
            let default_full_mark = analyzer.config().default_full_mark();
            for subject in analyzer.subjects(grade.as_deref())? {
                let full_mark = analyzer.gradebook().full_mark(&subject, default_full_mark);
                println!("{:<16} full mark {}", subject, full_mark);
            }
        }
        SubjectCommand::FullMark { subject, mark } => {
            let mark = analyzer.set_full_mark(subject, mark)?;
            println!("✅ Full mark of {} set to {}", subject.trim(), mark);
        }
    }
    Ok(())
}

fn print_table(term: &str, entries: &[ScoreEntry]) {
    println!("{}", term);
    println!("{:<16} {:>8} {:>10}  {}", "Subject", "Score", "Full mark", "Level");
    for entry in entries {
        println!(
            "{:<16} {:>8} {:>10}  {}{}",
            entry.subject,
            format_score(entry.score),
            entry.full_mark,
            entry.level,
            if entry.is_failing() { "  !" } else { "" }
        );
    }
}

fn score<S: Storage, C: SettingsProvider>(
    analyzer: &mut ScoreAnalyzer<S, C>,
    cmd: &ScoreCommand,
) -> Result<()> {
    match cmd {
        ScoreCommand::Add {
            subject,
            score,
            term,
        } => {
            let (name, value) = analyzer.add_score(term.as_deref(), subject, score)?;
            println!("✅ {}: {} = {}", name, subject.trim(), format_score(value));
        }
        ScoreCommand::Remove { subject, term } => {
            let value = analyzer.remove_score(term.as_deref(), subject)?;
            println!("✅ Removed {} ({})", subject.trim(), format_score(value));
        }
        ScoreCommand::Table { term, csv } => {
            let (name, entries) = analyzer.score_table(term.as_deref())?;
            print_table(&name, &entries);
            if let Some(path) = csv {
                let rows = analyzer.export_csv(Some(&name), path)?;
                println!("📁 {} rows written to {}", rows, path);
            }
        }
    }
    Ok(())
}

fn print_distribution(distribution: &LevelDistribution) {
    for (level, count) in distribution.iter() {
        println!(
            "  {:<10} {:>3}  {:>5.1}%",
            level.label(),
            count,
            distribution.percentage(level)
        );
    }
}

fn print_summary(analysis: &TermAnalysis) {
    let summary = &analysis.summary;
    println!("{} [{}]", analysis.term, analysis.grade);
    println!("  Average:  {:.1}", summary.average);
    println!("  Highest:  {}", format_score(summary.highest));
    println!("  Lowest:   {}", format_score(summary.lowest));
    println!("  Subjects: {}", summary.subject_count);
    println!("Level distribution");
    print_distribution(&analysis.distribution);
}

fn analyze<S: Storage, C: SettingsProvider>(
    analyzer: &mut ScoreAnalyzer<S, C>,
    cmd: &AnalyzeCommand,
) -> Result<()> {
    match cmd {
        AnalyzeCommand::Term { term, chart } => {
            let analysis = analyzer.analyze_term(term.as_deref())?;
            print_summary(&analysis);
            if let Some(path) = chart {
                analyzer.export_chart(&analyzer.term_scene(&analysis), path)?;
                println!("📁 Chart saved to {}", path);
            }
        }
        AnalyzeCommand::Trend { subjects, chart } => {
            let trend = analyzer.analyze_trend(subjects)?;
            for series in &trend.series {
                let points: Vec<String> = series
                    .points
                    .iter()
                    .map(|p| format!("{} {}", p.term, format_score(p.score)))
                    .collect();
                println!("{}: {}", series.subject, points.join(" -> "));
            }
            if let Some(path) = chart {
                analyzer.export_chart(&analyzer.trend_scene(&trend), path)?;
                println!("📁 Chart saved to {}", path);
            }
        }
    }
    Ok(())
}
