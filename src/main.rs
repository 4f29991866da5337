use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use city_directory::{
    pattern_tables, run_clean, run_export_csv, run_extract, run_filter_occupations,
    PipelineConfig, SourceFormat, VERSION,
};

#[derive(Parser)]
#[command(name = "city-directory")]
#[command(about = "Extract resident records from OCR'd city directory pages", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse OCR text files into structured records
    Extract {
        /// OCR text files; each is parsed as an independent run
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[arg(short, long, default_value = "structured_residents.json")]
        output: PathBuf,

        #[arg(short, long, value_enum, default_value_t = SourceFormat::LineEntries)]
        format: SourceFormat,

        /// Directory name stamped on each record
        #[arg(long)]
        directory: Option<String>,

        /// Page number (otherwise taken from a page_<N> file name, then config)
        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        year: Option<u16>,

        /// Write a JSON run report with every skipped entry
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Move widow annotations to spouse, reject junk names and incomplete addresses
    Clean {
        input: PathBuf,

        #[arg(short, long, default_value = "cleaned_residents.json")]
        output: PathBuf,

        #[arg(long, default_value = "rejected_entries.txt")]
        rejected: PathBuf,
    },

    /// Clear single-letter occupations (in place unless -o is given)
    FilterOccupations {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Flatten records to CSV for manual review
    ExportCsv {
        input: PathBuf,

        #[arg(short, long, default_value = "residents.csv")]
        output: PathBuf,
    },

    /// Print every pattern table
    Patterns,
}

fn main() -> Result<()> {
    // Logs on stderr, summaries on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("city-directory v{}", VERSION);

    let mut config = PipelineConfig::load(cli.config.as_deref())?;
    if let Some(path) = &cli.config {
        info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Extract {
            inputs,
            output,
            format,
            directory,
            page,
            year,
            report,
        } => {
            if let Some(directory) = directory {
                config.directory_name = directory;
            }
            if year.is_some() {
                config.year = year;
            }

            println!("📖 Extracting {} file(s) as {}", inputs.len(), format.name());
            let run = run_extract(&inputs, format, &config, page, &output, report.as_deref())?;

            for file in &run.report.files {
                println!("  {}: {}", file.source, file.extraction.summary());
            }
            println!("✓ {}", run.report.summary());
            println!("✓ Wrote {} records to {}", run.records.len(), output.display());
        }

        Command::Clean {
            input,
            output,
            rejected,
        } => {
            let summary = run_clean(&input, &output, &rejected, &config)?;

            println!("{}", summary.console_report(&rejected, &output));
        }

        Command::FilterOccupations { input, output } => {
            let output = output.unwrap_or_else(|| input.clone());
            let cleared = run_filter_occupations(&input, &output, &config)?;

            println!(
                "✓ Cleared {} single-letter occupations → {}",
                cleared,
                output.display()
            );
        }

        Command::ExportCsv { input, output } => {
            let rows = run_export_csv(&input, &output, &config)?;
            println!("✓ Exported {} rows to {}", rows, output.display());
        }

        Command::Patterns => print_patterns(),
    }

    Ok(())
}

fn print_patterns() {
    for (table, rules) in pattern_tables() {
        println!("🔎 {}", table);
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        for rule in rules {
            println!("  {} - {}", rule.name, rule.description);
            println!("    {}", rule.pattern());
        }
        println!();
    }
}
