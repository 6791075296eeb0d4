//! Command-line front end
//!
//! Each subcommand is generic over the entity being processed; `EntityKind`
//! picks the concrete type at run time.

use crate::diff::{diff_imports, get_changed, DiffSpec};
use crate::export::{json_payload, spreadsheet_rows};
use crate::files::{csv_string, read_data_context, read_import_file, write_csv, write_json};
use crate::models::{Applicant, Assignment, Ddah, Entity, Instructor, Position};
use crate::normalize::{normalize_import, parse_records};
use crate::resolve::Resolver;
use crate::schema::ImportSchema;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tapp_common::config::TomlConfig;
use tracing::info;

/// Import, diff and export TAPP records
#[derive(Parser, Debug)]
#[command(name = "tapp-import")]
#[command(about = "Normalize, diff and export TAPP import files")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to $TAPP_CONFIG, then the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Map a spreadsheet or JSON file onto canonical minimal records
    Normalize {
        #[arg(value_enum)]
        entity: EntityKind,
        input: PathBuf,
        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Classify imported records as new, duplicate or modified
    Diff {
        #[arg(value_enum)]
        entity: EntityKind,
        input: PathBuf,
        /// Store snapshot to diff against
        #[arg(long)]
        store: PathBuf,
        /// Only print the records that need to be upserted
        #[arg(long)]
        changed_only: bool,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write store records back out in import format
    Export {
        #[arg(value_enum)]
        entity: EntityKind,
        #[arg(long)]
        store: PathBuf,
        #[arg(long, value_enum, default_value = "json")]
        format: ExportFormat,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Instructors,
    Applicants,
    Positions,
    Assignments,
    Ddahs,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Dispatch `$body` with `$t` bound to the entity type for `$kind`
macro_rules! with_entity {
    ($kind:expr, $t:ident => $body:expr) => {
        match $kind {
            EntityKind::Instructors => {
                type $t = Instructor;
                $body
            }
            EntityKind::Applicants => {
                type $t = Applicant;
                $body
            }
            EntityKind::Positions => {
                type $t = Position;
                $body
            }
            EntityKind::Assignments => {
                type $t = Assignment;
                $body
            }
            EntityKind::Ddahs => {
                type $t = Ddah;
                $body
            }
        }
    };
}

pub fn run(cli: &Cli, config: &TomlConfig) -> Result<()> {
    match &cli.command {
        Command::Normalize {
            entity,
            input,
            output,
        } => with_entity!(*entity, T => {
            let value = run_normalize::<T>(input, config)?;
            emit_json(&value, output.as_deref())
        }),
        Command::Diff {
            entity,
            input,
            store,
            changed_only,
            output,
        } => with_entity!(*entity, T => {
            let value = run_diff::<T>(input, store, *changed_only, config)?;
            emit_json(&value, output.as_deref())
        }),
        Command::Export {
            entity,
            store,
            format,
            output,
        } => with_entity!(*entity, T => run_export::<T>(store, *format, output.as_deref())),
    }
}

/// Entity schema extended with configured aliases
pub fn configured_schema<T: Entity>(config: &TomlConfig) -> ImportSchema {
    T::schema().with_aliases(config.import.aliases_for(T::NAME))
}

fn load_minimal<T: Entity>(input: &Path, config: &TomlConfig) -> Result<Vec<T::Minimal>> {
    let data = read_import_file(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let schema = configured_schema::<T>(config);
    let rows = normalize_import(&data, &schema, config.import.similarity_threshold)?;
    Ok(parse_records(rows)?)
}

pub fn run_normalize<T: Entity>(input: &Path, config: &TomlConfig) -> Result<Value> {
    let records = load_minimal::<T>(input, config)?;
    info!("Normalized {} {} from {}", records.len(), T::NAME, input.display());

    let mut payload = Map::new();
    payload.insert(T::NAME.to_string(), serde_json::to_value(records)?);
    Ok(Value::Object(payload))
}

pub fn run_diff<T: Entity>(
    input: &Path,
    store: &Path,
    changed_only: bool,
    config: &TomlConfig,
) -> Result<Value> {
    let records = load_minimal::<T>(input, config)?;
    let data = read_data_context(store)
        .with_context(|| format!("Failed to read store {}", store.display()))?;
    let resolver = Resolver::new(&data).with_wage_chunk_boundary(config.import.boundary_month_day()?);

    let diffs: Vec<DiffSpec<T>> = diff_imports(&records, &resolver)?;
    let changed = diffs.iter().filter(|d| d.is_changed()).count();
    info!(
        "{} of {} {} need to be sent",
        changed,
        diffs.len(),
        T::NAME
    );

    if changed_only {
        Ok(serde_json::to_value(get_changed(&diffs))?)
    } else {
        Ok(serde_json::to_value(diffs)?)
    }
}

pub fn run_export<T: Entity>(store: &Path, format: ExportFormat, output: Option<&Path>) -> Result<()> {
    let data = read_data_context(store)
        .with_context(|| format!("Failed to read store {}", store.display()))?;
    let records = T::existing(&data);
    info!("Exporting {} {}", records.len(), T::NAME);

    match format {
        ExportFormat::Json => emit_json(&json_payload(records)?, output),
        ExportFormat::Csv => {
            let table = spreadsheet_rows(records)?;
            match output {
                Some(path) => Ok(write_csv(path, &table)?),
                None => {
                    print!("{}", csv_string(&table)?);
                    Ok(())
                }
            }
        }
    }
}

fn emit_json(value: &Value, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            write_json(path, value)?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
