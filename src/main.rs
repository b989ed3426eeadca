use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pgn_print::{Document, PageSize, PrintConfig, TriggerSet, load_game, log};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Markup,
}

/// Pretty print for PGN: composes move text and board diagrams for a
/// two-column page layout.
#[derive(Debug, Parser)]
#[command(name = "pgn-print", version)]
struct Cli {
    /// Path to the PGN file (`.zst` is decoded)
    pgn_path: PathBuf,

    /// Moves to print with a board, e.g. "2w 3b 10w"
    #[arg(short = 'p', long, default_value = "1w")]
    print_board: String,

    /// Directory the output is written to
    #[arg(short = 'o', long, default_value = "")]
    output_path: PathBuf,

    /// Output file name; "-" writes to stdout. Default: "[White] - [Black].json"
    #[arg(short = 'n', long)]
    filename: Option<String>,

    /// JSON configuration file; flags below override it
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    #[arg(long)]
    font_name: Option<String>,

    #[arg(long)]
    font_size: Option<f32>,

    /// Space before every paragraph
    #[arg(long)]
    space_before: Option<f32>,

    /// Space after every paragraph
    #[arg(long)]
    space_after: Option<f32>,

    /// Page margin in cm
    #[arg(long)]
    page_margin: Option<f32>,

    /// Gap between the two columns in cm
    #[arg(long)]
    column_gap: Option<f32>,

    /// a4 or letter
    #[arg(long)]
    page_size: Option<PageSize>,

    #[arg(long, value_enum, default_value = "json")]
    format: Format,
}

impl Cli {
    fn print_config(&self) -> Result<PrintConfig> {
        let mut config = match &self.config {
            Some(path) => PrintConfig::load(path)
                .with_context(|| format!("Failed to load config '{}'", path.display()))?,
            None => PrintConfig::default(),
        };

        if let Some(font_name) = &self.font_name {
            config.font_name = font_name.clone();
        }
        if let Some(font_size) = self.font_size {
            config.font_size = font_size;
        }
        if let Some(space_before) = self.space_before {
            config.space_before = space_before;
        }
        if let Some(space_after) = self.space_after {
            config.space_after = space_after;
        }
        if let Some(page_margin) = self.page_margin {
            config.page_margin = page_margin;
        }
        if let Some(column_gap) = self.column_gap {
            config.column_gap = column_gap;
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        Ok(config)
    }
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Markup => "xml",
        }
    }
}

/// `<dir>/<filename>.<ext>`. Only the default `.pdf` suffix is replaced; any
/// other dots belong to the name.
fn output_file(dir: &Path, filename: &str, format: Format) -> PathBuf {
    let stem = filename.strip_suffix(".pdf").unwrap_or(filename);
    dir.join(format!("{stem}.{}", format.extension()))
}

fn run(cli: &Cli) -> Result<()> {
    let triggers = TriggerSet::parse(&cli.print_board).context("Invalid --print-board list")?;
    let config = cli.print_config()?;
    let game = load_game(&cli.pgn_path)
        .with_context(|| format!("Failed to read game from '{}'", cli.pgn_path.display()))?;

    let mut document = Document::build(&game, &triggers, &config)?;
    if let Some(filename) = &cli.filename {
        document = document.with_filename(filename.clone());
    }

    let rendered = match cli.format {
        Format::Json => document.to_json()?,
        Format::Markup => document.to_markup(),
    };

    if cli.filename.as_deref() == Some("-") {
        io::stdout().write_all(rendered.as_bytes())?;
        return Ok(());
    }

    let path = output_file(&cli.output_path, &document.filename, cli.format);
    fs::write(&path, rendered).with_context(|| format!("Failed to write '{}'", path.display()))?;
    log::info(format!("Wrote {}", path.display()));
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
