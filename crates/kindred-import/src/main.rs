//! CLI entry point for the Kindred sheet-to-graph importer.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use kindred_graph::{GraphClient, GraphConfig};
use kindred_import::source::{extract_spreadsheet_id, CsvSource, SheetsSource};
use kindred_import::{ImportConfig, Importer, Source};

#[derive(Parser)]
#[command(name = "kindred-import")]
#[command(about = "Imports spreadsheet data into the Kindred relationship graph")]
struct Cli {
    /// Google Sheets URL (https://docs.google.com/spreadsheets/d/...).
    #[arg(long)]
    url: Option<String>,

    /// Spreadsheet ID, as an alternative to --url.
    #[arg(long)]
    spreadsheet_id: Option<String>,

    /// Remote CSV URL, imported as a single node sheet.
    #[arg(long)]
    csv: Option<String>,

    /// Wipe the entire graph before importing (destructive full reset).
    #[arg(long)]
    reset: bool,

    /// Config file prefix (default: kindred).
    #[arg(short, long, default_value = "kindred")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let import_config = load_import_config(&cli.config)?;
    let graph_config = load_graph_config(&cli.config);

    let source = resolve_source(&cli, &import_config)?;

    let graph = GraphClient::connect(&graph_config).await?;
    graph.ping().await?;

    if cli.reset {
        graph.wipe().await?;
    }

    let importer = Importer::new(source, graph, import_config);
    let report = importer.import_all().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    let failed = report.failed_sheets();
    if failed > 0 {
        anyhow::bail!("{failed} sheet(s) failed to import");
    }
    Ok(())
}

fn resolve_source(cli: &Cli, config: &ImportConfig) -> anyhow::Result<Source> {
    let spreadsheet_id = match (&cli.url, &cli.spreadsheet_id) {
        (Some(url), _) => Some(extract_spreadsheet_id(url)?),
        (None, Some(id)) => Some(id.clone()),
        (None, None) => None,
    };

    if let Some(id) = spreadsheet_id {
        if config.google_api_key.is_empty() {
            anyhow::bail!(
                "Google API key required: set import.google_api_key or KINDRED__IMPORT__GOOGLE_API_KEY"
            );
        }
        return Ok(Source::Sheets(SheetsSource::new(
            id,
            config.google_api_key.clone(),
        )));
    }
    if let Some(csv_url) = &cli.csv {
        return Ok(Source::Csv(CsvSource::new(csv_url)?));
    }
    anyhow::bail!("Specify --url, --spreadsheet-id, or --csv");
}

fn load_import_config(file_prefix: &str) -> anyhow::Result<ImportConfig> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("KINDRED")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    match cfg.get::<ImportConfig>("import") {
        Ok(c) => Ok(c),
        Err(_) => Ok(ImportConfig::default()),
    }
}

fn load_graph_config(file_prefix: &str) -> GraphConfig {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("KINDRED")
                .separator("__")
                .try_parsing(true),
        )
        .build();

    match cfg {
        Ok(c) => GraphConfig {
            uri: c
                .get_string("neo4j.uri")
                .unwrap_or_else(|_| "bolt://localhost:7687".to_string()),
            user: c
                .get_string("neo4j.user")
                .unwrap_or_else(|_| "neo4j".to_string()),
            password: c
                .get_string("neo4j.password")
                .unwrap_or_else(|_| "kindred-dev".to_string()),
            database: c
                .get_string("neo4j.database")
                .unwrap_or_else(|_| "neo4j".to_string()),
            ..Default::default()
        },
        Err(_) => GraphConfig::default(),
    }
}
