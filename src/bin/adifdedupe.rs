use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
};

use adiflog::{
    convert::{ConvertConfig, OutputFormat, convert},
    registry::FieldRegistry,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Drop duplicate contacts from an ADIF log and rewrite it.
#[derive(Parser, Debug)]
#[command(name = "adifdedupe", version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Input ADIF file.
    #[arg(long)]
    infile: PathBuf,

    /// Output file (standard output when omitted).
    #[arg(long)]
    outfile: Option<PathBuf>,

    /// JSON field registry replacing the built-in ADIF table.
    #[arg(long)]
    fields: Option<PathBuf>,

    /// Output encoding.
    #[arg(long, value_enum, default_value_t = FormatOpt::Adif)]
    format: FormatOpt,

    /// Write every record, duplicates included.
    #[arg(long, default_value_t = false)]
    keep_duplicates: bool,

    /// Header comment written before the first record.
    #[arg(long)]
    comment: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatOpt {
    Adif,
    Jsonl,
}

impl From<FormatOpt> for OutputFormat {
    fn from(value: FormatOpt) -> Self {
        match value {
            FormatOpt::Adif => OutputFormat::Adif,
            FormatOpt::Jsonl => OutputFormat::Jsonl,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let registry = match &cli.fields {
        Some(path) => FieldRegistry::from_json_file(path)
            .with_context(|| format!("load field registry {}", path.display()))?,
        None => FieldRegistry::adif(),
    };

    let config = ConvertConfig {
        dedupe: !cli.keep_duplicates,
        format: cli.format.into(),
        comment: cli.comment.clone(),
    };

    let input = File::open(&cli.infile)
        .with_context(|| format!("open {}", cli.infile.display()))?;
    let output: Box<dyn Write> = match &cli.outfile {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    convert(input, output, &registry, &config)
        .with_context(|| format!("convert {}", cli.infile.display()))?;
    Ok(())
}
