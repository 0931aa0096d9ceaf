use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use sectionist_core::config_file::{self, ConfigFile};
use sectionist_parsing::{ParsingConfig, ParsingConfigBuilder, SectionExtractor};
use sectionist_pdf_mupdf::MupdfBackend;

mod output;

use output::ColorMode;

/// Section extractor - split PDF case files into sections at their horizontal rules
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split one or more PDFs into rule-delimited sections
    Sections {
        /// PDF files to segment
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        segment: SegmentArgs,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Rebuild a flat document from a PDF's sections
    Assemble {
        /// PDF file to segment and reassemble
        file: PathBuf,

        #[command(flatten)]
        segment: SegmentArgs,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Print the full text of a PDF without segmenting it
    Text {
        /// PDF file to read
        file: PathBuf,

        /// Drop everything from the first occurrence of this marker on
        #[arg(long)]
        until: Option<String>,

        /// Strip page markers, timestamps and extra whitespace
        #[arg(long)]
        clean: bool,

        #[command(flatten)]
        out: OutputArgs,
    },
}

#[derive(Args, Debug, Default)]
struct SegmentArgs {
    /// Max vertical delta for a stroke to count as a horizontal rule
    #[arg(long)]
    tolerance: Option<f32>,

    /// Keep the final section even when no rule closes it
    #[arg(long)]
    flush_trailing: bool,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Path to output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

impl OutputArgs {
    fn writer(&self) -> anyhow::Result<Box<dyn Write>> {
        Ok(match &self.output {
            Some(path) => Box::new(std::fs::File::create(path)?),
            None => Box::new(std::io::stdout()),
        })
    }

    fn color(&self) -> ColorMode {
        ColorMode(!self.no_color && self.output.is_none())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_config = config_file::load_config();

    match cli.command {
        Command::Sections {
            files,
            json,
            segment,
            out,
        } => {
            let config = parsing_config(&segment, &file_config)?;
            sections(files, json, config, &out).await
        }
        Command::Assemble { file, segment, out } => {
            let config = parsing_config(&segment, &file_config)?;
            assemble(&file, config, &out)
        }
        Command::Text {
            file,
            until,
            clean,
            out,
        } => {
            let config = parsing_config(&SegmentArgs::default(), &file_config)?;
            text(&file, until.as_deref(), clean, config, &out)
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve configuration: CLI flags > env vars > config file > defaults
fn parsing_config(args: &SegmentArgs, file: &ConfigFile) -> anyhow::Result<ParsingConfig> {
    let mut builder = match &file.segmenter {
        Some(seg) => ParsingConfigBuilder::from_file_config(seg),
        None => ParsingConfigBuilder::new(),
    };

    let env_tolerance: Option<f32> = std::env::var("SECTIONIST_TOLERANCE")
        .ok()
        .and_then(|v| v.parse().ok());
    if let Some(tolerance) = args.tolerance.or(env_tolerance) {
        builder = builder.horizontal_tolerance(tolerance);
    }

    let env_flush = std::env::var("SECTIONIST_FLUSH_TRAILING")
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));
    if args.flush_trailing {
        builder = builder.flush_trailing_section(true);
    } else if let Some(flush) = env_flush {
        builder = builder.flush_trailing_section(flush);
    }

    builder
        .build()
        .context("invalid artifact pattern in configuration")
}

fn ensure_exists(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    Ok(())
}

async fn sections(
    files: Vec<PathBuf>,
    json: bool,
    config: ParsingConfig,
    out: &OutputArgs,
) -> anyhow::Result<()> {
    for path in &files {
        ensure_exists(path)?;
    }

    let progress = if files.len() > 1 {
        let bar = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}") {
            bar.set_style(style);
        }
        bar
    } else {
        ProgressBar::hidden()
    };

    // Documents are independent, so each one is segmented on its own
    // blocking thread; pages within a document stay sequential.
    let extractor = Arc::new(SectionExtractor::with_config(config));
    let handles: Vec<_> = files
        .iter()
        .cloned()
        .map(|path| {
            let extractor = Arc::clone(&extractor);
            let progress = progress.clone();
            tokio::task::spawn_blocking(move || {
                let result = extractor.segment_path(&path, &MupdfBackend::new());
                progress.set_message(output::file_name(&path));
                progress.inc(1);
                result
            })
        })
        .collect();

    let mut results = Vec::with_capacity(files.len());
    for (path, handle) in files.into_iter().zip(handles) {
        let sections = handle
            .await?
            .with_context(|| format!("failed to segment {}", path.display()))?;
        tracing::info!(file = %path.display(), sections = sections.len(), "segmented");
        results.push((path, sections));
    }
    progress.finish_and_clear();

    let mut writer = out.writer()?;
    if json {
        output::write_json(&mut *writer, &results)?;
    } else {
        let color = out.color();
        for (path, sections) in &results {
            output::print_sections(&mut *writer, &output::file_name(path), sections, color)?;
        }
    }
    Ok(())
}

fn assemble(file: &Path, config: ParsingConfig, out: &OutputArgs) -> anyhow::Result<()> {
    ensure_exists(file)?;

    let extractor = SectionExtractor::with_config(config);
    let sections = extractor
        .segment_path(file, &MupdfBackend::new())
        .with_context(|| format!("failed to segment {}", file.display()))?;

    let mut writer = out.writer()?;
    write!(writer, "{}", extractor.assemble(&sections))?;
    Ok(())
}

fn text(
    file: &Path,
    until: Option<&str>,
    clean: bool,
    config: ParsingConfig,
    out: &OutputArgs,
) -> anyhow::Result<()> {
    ensure_exists(file)?;

    let extractor = SectionExtractor::with_config(config);
    let full = extractor
        .extract_text_path(file, &MupdfBackend::new())
        .with_context(|| format!("failed to read {}", file.display()))?;

    let mut body = match until {
        Some(marker) => sectionist_parsing::truncate_at(&full, marker).to_string(),
        None => full,
    };
    if clean {
        body = extractor.clean(&body);
    }

    let mut writer = out.writer()?;
    write!(writer, "{}", body)?;
    Ok(())
}
