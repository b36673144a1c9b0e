//! Standalone tenant schema derivation.
//!
//! Regenerates the derived tenant schema artifact from the master entity
//! schema, outside of a provisioning run. Useful for reviewing the tenant
//! surface after editing the master schema.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use dealerhub::config::SchemaConfig;
use dealerhub::schema::SchemaDeriver;

#[derive(Parser)]
#[command(
    name = "derive-tenant-schema",
    about = "Derive the tenant schema document from the master entity schema"
)]
struct Args {
    /// Master schema source path
    #[arg(long)]
    source: Option<PathBuf>,

    /// Output path for the derived tenant schema
    #[arg(long)]
    output: Option<PathBuf>,

    /// Comma-separated entity names to exclude (defaults to the standard
    /// master-only set)
    #[arg(long)]
    exclude: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let defaults = SchemaConfig::default();

    let source = args.source.unwrap_or(defaults.source_path);
    let output = args.output.unwrap_or(defaults.tenant_output_path);
    let excluded: Vec<String> = match args.exclude {
        Some(csv) => csv
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => defaults.excluded_entities,
    };

    let deriver = SchemaDeriver::new(excluded);
    match deriver.generate(&source, &output) {
        Ok(document) => {
            let entities = document.matches("entity ").count();
            println!(
                "Derived {} entities from {} into {}",
                entities,
                source.display(),
                output.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Schema derivation failed: {err}");
            ExitCode::FAILURE
        }
    }
}
