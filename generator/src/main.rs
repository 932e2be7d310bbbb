use clap::{Parser, ValueEnum};
use common::jobs::RunStatus;
use env_logger::Env;
use log::{error, info};
use qr_generator::config::Config;
use qr_generator::error::{GeneratorError, Result};
use qr_generator::pipeline::{Pipeline, RunSummary, RunUpdate};
use qr_generator::services::encoder::CodeEncoder;
use qr_generator::services::metadata::sqlite::SqliteMetadataStore;
use qr_generator::services::metadata::supabase::SupabaseTable;
use qr_generator::services::metadata::MetadataStore;
use qr_generator::services::publisher::supabase::SupabaseStorage;
use qr_generator::services::publisher::ArtifactPublisher;
use qr_generator::services::records::CsvRecordSource;
use qr_generator::services::signer::PayloadSigner;
use qr_generator::services::supabase::SupabaseClient;
use std::path::PathBuf;
use std::process::ExitCode;

/// Generates signed QR codes for every row of a store list.
#[derive(Parser, Debug)]
#[command(name = "qr-generator", version)]
struct Cli {
    /// CSV with columns store_id, banner_id, item_id, lat, lng and optional campaign_id.
    #[arg(long, default_value = "qr_generator/stores.csv")]
    input: PathBuf,

    /// Directory for the local PNG copies. Overrides QR_OUTPUT_DIR.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Where metadata rows are written.
    #[arg(long, value_enum, default_value_t = MetadataBackend::Supabase)]
    metadata_backend: MetadataBackend,

    /// SQLite database used with `--metadata-backend sqlite`.
    #[arg(long, default_value = "qr_codes.sqlite")]
    sqlite_db: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum MetadataBackend {
    Supabase,
    Sqlite,
}

fn main() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let cli = Cli::parse();

    match run(cli) {
        Ok(summary) => {
            info!(
                "All QR codes processed successfully ({} generated).",
                summary.processed.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("An error occurred: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<RunSummary> {
    // Configuration is complete before the input is touched or anything is written.
    let config = Config::from_env()?;
    let output_dir = cli.output_dir.unwrap_or_else(|| config.output_dir.clone());

    info!(
        "Reading data from '{}' and generating QR codes...",
        cli.input.display()
    );
    let mut source = CsvRecordSource::open(&cli.input)?;

    let supabase = SupabaseClient::new(
        &config.supabase_url,
        &config.supabase_key,
        config.http_timeout,
    )
    .map_err(|e| GeneratorError::Config(e.to_string()))?;
    let storage = SupabaseStorage::new(supabase.clone(), &config.bucket);
    let metadata: Box<dyn MetadataStore> = match cli.metadata_backend {
        MetadataBackend::Supabase => Box::new(SupabaseTable::new(supabase, &config.table)),
        MetadataBackend::Sqlite => {
            Box::new(SqliteMetadataStore::open(&cli.sqlite_db, &config.table)?)
        }
    };

    let pipeline = Pipeline::new(
        PayloadSigner::new(config.hmac_secret.clone()),
        CodeEncoder::new(&config.scan_base_url),
        ArtifactPublisher::new(output_dir, &storage),
        metadata.as_ref(),
    );

    let summary = pipeline.run(source.records(), &mut log_update)?;
    Ok(summary)
}

fn log_update(update: RunUpdate) {
    match update {
        RunUpdate::Record {
            row_index,
            unique_id,
        } => info!("Row {} done: QR ID {}", row_index + 1, unique_id),
        RunUpdate::Run(RunStatus::Failed(reason)) => error!("Run failed: {}", reason),
        RunUpdate::Run(RunStatus::Completed(message)) => info!("{}", message),
        RunUpdate::Run(_) => {}
    }
}
