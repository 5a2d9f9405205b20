use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, warn};

use medscan_core::{read_csv_records, Database, ReferenceTable, Resolver};
use medscan_ner::{first_drug, EntityExtractor, GazetteerExtractor, HttpEntityExtractor};
use medscan_server::config::DEFAULT_LOG_FILTER;
use medscan_server::routes::outcome_body;
use medscan_server::{router, AppState, Config, NerBackend, ScanOutcome, ScanPipeline, VisionOcr};

#[derive(Parser)]
#[command(name = "medscan")]
#[command(about = "Identify medicines from package photos")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind the HTTP server to
        #[arg(long)]
        bind: Option<String>,
        /// Reference table (.csv, .db, .sqlite)
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Resolve OCR text offline and print the result as JSON
    Resolve {
        /// OCR text of the package
        #[arg(long)]
        text: String,
        /// Drug name to use instead of running entity extraction
        #[arg(long)]
        candidate: Option<String>,
        /// Reference table (.csv, .db, .sqlite)
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Import a CSV dataset into a SQLite reference database
    Import {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        db: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let mut config = Config::from_env();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            bind,
            dataset,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(bind) = bind {
                config.bind_address = bind;
            }
            if let Some(dataset) = dataset {
                config.dataset_path = dataset;
            }
            serve(config).await
        }
        Commands::Resolve {
            text,
            candidate,
            dataset,
        } => {
            let table = load_table(dataset.as_ref().unwrap_or(&config.dataset_path))?;
            let candidate = match candidate {
                Some(candidate) => Some(candidate),
                None => first_drug(&gazetteer_for(&table).tag(&text)),
            };
            let result = Resolver::new(&table).resolve(&text, candidate.as_deref());
            let body = outcome_body(&ScanOutcome::from(result));
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        Commands::Import { csv, db } => {
            let file = File::open(&csv)
                .with_context(|| format!("Cannot open {}", csv.display()))?;
            let records = read_csv_records(file)?;
            let mut database = Database::open(&db)?;
            let imported = database.import_medicines(&records)?;
            info!(
                csv = %csv.display(),
                db = %db.display(),
                imported,
                total = database.count_medicines()?,
                "Import complete"
            );
            Ok(())
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    let table = Arc::new(load_table(&config.dataset_path)?);
    if table.is_empty() {
        warn!("Reference table is empty, every scan will be unrecognized");
    }

    let ner: Arc<dyn EntityExtractor> = match config.ner_backend {
        NerBackend::Gazetteer => Arc::new(gazetteer_for(&table)),
        NerBackend::Http => {
            let Some(url) = config.ner_url.as_deref() else {
                bail!("MEDSCAN_NER_URL must be set for the http NER backend");
            };
            Arc::new(HttpEntityExtractor::new(url, config.collaborator_timeout())?)
        }
    };

    let credential = config.vision_credential();
    if credential.is_none() {
        warn!("No OCR credential configured (MEDSCAN_VISION_API_KEY or MEDSCAN_VISION_TOKEN)");
    }
    let ocr = Arc::new(VisionOcr::new(
        config.vision_endpoint.clone(),
        credential,
        config.collaborator_timeout(),
    )?);

    let pipeline = ScanPipeline::new(table, ocr, ner);
    info!(
        ocr = pipeline.ocr_backend(),
        ner = pipeline.ner_backend(),
        "Scan pipeline ready"
    );

    let app = router(Arc::new(AppState::new(pipeline)), config.max_body_bytes);
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Cannot bind {}", addr))?;
    info!("MedScan listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await?;

    Ok(())
}

fn load_table(path: &Path) -> Result<ReferenceTable> {
    ReferenceTable::load(path)
        .with_context(|| format!("Cannot load reference table {}", path.display()))
}

/// Built-in lexicon plus the leading word of every table name.
fn gazetteer_for(table: &ReferenceTable) -> GazetteerExtractor {
    let mut gazetteer = GazetteerExtractor::new();
    gazetteer.extend(table.fuzzy_candidates().map(|(name, _)| name));
    gazetteer
}
