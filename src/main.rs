use anyhow::Context;
use clap::Parser;
use sheetsql::workbook::Workbook;
use sheetsql::{ConvertError, Options, convert};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Convert a spreadsheet schema to SQL for database creation.
///
/// Each worksheet describes one table and each row one field. Worksheets whose
/// cell A1 does not read 'field name' are ignored, and a blank row ends the
/// field list. Foreign keys name the referenced table and field with a colon
/// in between (table:field). Supported field types are int, float, date and
/// text.
#[derive(Debug, Parser)]
#[command(name = "sheetsql", version)]
struct Cli {
    /// Name of the database to create
    database: String,

    /// Workbook exported as JSON
    #[arg(value_parser = existing_file)]
    workbook: PathBuf,

    /// Write the SQL to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail on multiple primary keys per table and on tables that cannot be ordered
    #[arg(long, env = "SHEETSQL_STRICT")]
    strict: bool,
}

fn existing_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("'{}' is not a file", value))
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        eprintln!("Exiting...");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    info!(workbook = %cli.workbook.display(), "processing");

    let workbook = Workbook::from_path(&cli.workbook)?;
    let options = Options {
        database: cli.database.clone(),
        strict: cli.strict,
    };

    let conversion = match convert(&workbook, &options) {
        Ok(conversion) => conversion,
        Err(ConvertError::Validation(report)) => {
            eprint!("{}", report);
            anyhow::bail!(
                "{} validation error(s) in {} table(s)",
                report.error_count(),
                report.table_count()
            );
        }
        Err(e) => return Err(e.into()),
    };

    match &cli.output {
        Some(path) => write_output(path, &conversion.sql)?,
        None => print!("{}", conversion.sql),
    }
    Ok(())
}

fn write_output(path: &Path, sql: &str) -> anyhow::Result<()> {
    fs::write(path, sql).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(output = %path.display(), "wrote SQL");
    Ok(())
}
