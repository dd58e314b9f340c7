//! CLI entry point for the exam rater.
//!
//! Loads a results sheet from a file or URL, runs the analysis, and prints,
//! exports or narrates the outcome.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use exam_rater::analyzers::analyzer::{analyze, search_students};
use exam_rater::analyzers::dataset::Dataset;
use exam_rater::analyzers::group::class_stats_for_subjects;
use exam_rater::analyzers::subject::subject_group_matrix;
use exam_rater::analyzers::types::{AnalysisResult, ClassStats, SubjectGroupRow};
use exam_rater::fetch::{BasicClient, fetch_bytes};
use exam_rater::infra::genai::{NarrativeConfig, write_brief};
use exam_rater::output::{ReportEnvelope, export_students, print_json, print_pretty, write_json};
use exam_rater::summary::NarrativeSummary;
use flate2::read::GzDecoder;
use serde::Serialize;
use std::ffi::OsStr;
use std::io::Read;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Written instead of a brief when generation fails.
const BRIEF_FAILED_MESSAGE: &str =
    "Error generating analysis. Please check your API key and network connection.";

#[derive(Parser)]
#[command(name = "exam_rater")]
#[command(about = "A tool to analyze exam result sheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a results sheet from a file or URL
    Analyze {
        /// Path to file or URL to fetch (`.gz` is decompressed)
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Only analyze students of this stream
        #[arg(short, long)]
        group: Option<String>,

        /// Write the full report as JSON to this file
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Export the ranked student list as CSV
    Export {
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        #[arg(short, long)]
        group: Option<String>,

        /// CSV file to write
        #[arg(short, long, default_value = "ranked.csv")]
        output: String,
    },
    /// Compare streams over a selection of subjects
    Streams {
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Comma separated subjects to compare on (default: all)
        #[arg(short, long, value_delimiter = ',')]
        subjects: Vec<String>,

        /// Write the comparison as JSON to this file
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Find students by name or admission number
    Search {
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Case-insensitive search term
        term: String,
    },
    /// Write a narrative brief of the results
    Brief {
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        #[arg(short, long)]
        group: Option<String>,

        /// Markdown file to write
        #[arg(short, long, default_value = "brief.md")]
        output: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamComparison<'a> {
    subjects: &'a [String],
    class_stats: Vec<ClassStats>,
    matrix: Vec<SubjectGroupRow>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/exam_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("exam_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            source,
            group,
            output,
        } => {
            let analysis = load_analysis(&source, group.as_deref()).await?;
            log_overview(&analysis);

            match output {
                Some(path) => {
                    write_json(&path, &ReportEnvelope::new(&source, &analysis))?;
                    info!(path = %path, "Report written");
                }
                None => print_json(&analysis.global_stats)?,
            }
        }
        Commands::Export {
            source,
            group,
            output,
        } => {
            let analysis = load_analysis(&source, group.as_deref()).await?;
            export_students(&output, &analysis)?;
            info!(path = %output, students = analysis.records.len(), "Ranked list exported");
        }
        Commands::Streams {
            source,
            subjects,
            output,
        } => {
            let analysis = load_analysis(&source, None).await?;
            if analysis.classes.is_empty() {
                warn!("No stream column found, nothing to compare");
                return Ok(());
            }

            let selected = select_subjects(&analysis, subjects);
            let comparison = StreamComparison {
                subjects: &selected,
                class_stats: class_stats_for_subjects(&analysis.records, &analysis.classes, &selected),
                matrix: subject_group_matrix(&analysis.records, &selected, &analysis.classes),
            };

            for stats in &comparison.class_stats {
                info!(
                    stream = %stats.class_name,
                    students = stats.student_count,
                    mean_points = stats.mean_points,
                    mean_grade = stats.mean_grade.map(|g| g.label()).unwrap_or("-"),
                    pass_rate = stats.pass_rate,
                    "Stream"
                );
            }

            match output {
                Some(path) => write_json(&path, &ReportEnvelope::new(&source, &comparison))?,
                None => print_json(&comparison)?,
            }
        }
        Commands::Search { source, term } => {
            let analysis = load_analysis(&source, None).await?;
            let hits = search_students(&analysis.records, &term);
            info!(term = %term, matches = hits.len(), "Search complete");

            for record in hits {
                let perf = record.performance.as_ref();
                info!(
                    adm_no = record.display_adm_no(),
                    name = record.display_name(),
                    stream = record.group.as_deref().unwrap_or("-"),
                    mean_score = perf.map(|p| p.mean_score),
                    mean_grade = perf.map(|p| p.mean_grade.label()).unwrap_or("-"),
                    rank = record.overall_rank,
                    stream_rank = record.stream_rank,
                    "Student"
                );
            }
        }
        Commands::Brief {
            source,
            group,
            output,
        } => {
            let analysis = load_analysis(&source, group.as_deref()).await?;
            let summary = NarrativeSummary::from_analysis(&analysis);
            print_pretty(&summary);

            let config = NarrativeConfig::from_env()?;
            let brief = match write_brief(&config, &summary).await {
                Ok(text) => text,
                Err(e) => {
                    error!(error = %e, "Brief generation failed");
                    BRIEF_FAILED_MESSAGE.to_string()
                }
            };

            std::fs::write(&output, brief).with_context(|| format!("Failed to write {output}"))?;
            info!(path = %output, "Brief written");
        }
    }

    Ok(())
}

/// Loads, optionally filters to one stream, and analyzes a sheet.
async fn load_analysis(source: &str, group: Option<&str>) -> Result<AnalysisResult> {
    let text = fetcher(source).await?;
    let mut dataset = Dataset::parse(&text)?;

    if let Some(group) = group {
        if !dataset.roles.has_group() {
            warn!(group, "No stream column found, ignoring filter");
        } else {
            dataset = dataset.filter_group(group);
        }
    }

    Ok(analyze(&dataset)?)
}

/// Keeps the requested subjects that exist in the sheet, in the order given.
/// An empty request selects every subject.
fn select_subjects(analysis: &AnalysisResult, requested: Vec<String>) -> Vec<String> {
    if requested.is_empty() {
        return analysis.subjects.clone();
    }

    requested
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| {
            let known = analysis.subjects.contains(s);
            if !known {
                warn!(subject = %s, "Unknown subject, skipping");
            }
            known
        })
        .collect()
}

fn log_overview(analysis: &AnalysisResult) {
    let global = &analysis.global_stats;
    info!(
        students = global.total_students,
        mean_score = global.mean_score,
        mean_points = global.mean_points,
        mean_grade = %global.mean_grade,
        top_subject = global.top_performing_subject.as_deref().unwrap_or("-"),
        lowest_subject = global.lowest_performing_subject.as_deref().unwrap_or("-"),
        "School overview"
    );

    for (position, student) in analysis.top_students.iter().enumerate() {
        info!(
            position = position + 1,
            name = %student.name,
            adm_no = %student.adm_no,
            mean_points = student.mean_points,
            mean_grade = %student.mean_grade,
            "Top student"
        );
    }

    for champion in &analysis.subject_champions {
        info!(
            subject = %champion.subject,
            name = %champion.name,
            score = champion.score,
            "Subject champion"
        );
    }
}

/// Loads sheet text from a local file path or fetches it over HTTP.
/// Sources ending in `.gz` are decompressed first.
#[tracing::instrument(fields(source = %source))]
async fn fetcher(source: &str) -> Result<String> {
    let bytes = if source.starts_with("http") {
        let client = BasicClient::new()?;
        fetch_bytes(&client, source).await?
    } else {
        std::fs::read(source).with_context(|| format!("Failed to read {source}"))?
    };

    if source.ends_with(".gz") {
        let mut text = String::new();
        GzDecoder::new(bytes.as_slice())
            .read_to_string(&mut text)
            .context("Failed to decompress sheet")?;
        Ok(text)
    } else {
        String::from_utf8(bytes).context("Sheet is not valid UTF-8")
    }
}
