use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use clap::{Args, Parser, Subcommand};
use engine::{Currency, Engine};

mod case;
mod error;
mod report;
mod settings;

use case::Case;
use settings::{Format, Settings};

#[derive(Parser, Debug)]
#[command(name = "faraid")]
#[command(about = "Distributes an estate among heirs following fixed succession rules")]
struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, env = "FARAID_CONFIG")]
    config: Option<String>,
    /// Override log level (e.g. `debug`).
    #[arg(long)]
    level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Allocates the estate of a case file.
    Allocate(AllocateArgs),
    /// Lists the recognized relationships.
    Relationships,
}

#[derive(Args, Debug)]
struct AllocateArgs {
    /// Case file (JSON).
    case: PathBuf,
    #[arg(long, value_enum)]
    format: Option<Format>,
    /// Currency used when the case file does not name one.
    #[arg(long)]
    currency: Option<String>,
    /// Write the report to a file instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    let level = cli.level.as_deref().unwrap_or(&settings.level);

    tracing_subscriber::fmt()
        .with_env_filter(format!("faraid={level},engine={level}"))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Allocate(args) => allocate(&settings, args)?,
        Command::Relationships => {
            let mut out = std::io::stdout().lock();
            report::write_relationships(&mut out, &engine::relationship::all_tags())?;
        }
    }

    Ok(())
}

fn allocate(settings: &Settings, args: AllocateArgs) -> error::Result<()> {
    let default_currency = match args.currency.as_deref() {
        Some(code) => Currency::try_from(code)?,
        None => settings.currency,
    };
    let case = Case::load(&args.case, default_currency)?;
    tracing::debug!(
        path = %args.case.display(),
        heirs = case.heirs.len(),
        currency = %case.currency,
        "case loaded"
    );

    let engine = Engine::builder().currency(case.currency).build();
    let estate = case.estate(&engine)?;
    let result = engine.allocate(estate, &case.heirs)?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    match args.format.unwrap_or(settings.format) {
        Format::Table => report::write_table(&mut out, &result)?,
        Format::Json => report::write_json(&mut out, &result)?,
        Format::Csv => report::write_csv(&mut out, &result)?,
    }
    out.flush()?;

    if let Some(path) = &args.output {
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(())
}
