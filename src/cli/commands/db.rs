use anyhow::{anyhow, Context};
use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{Collection, DatabaseManager};
use crate::filter::{Filter, FilterData};

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create collections and unique indexes (idempotent)")]
    Init,

    #[command(about = "Check connectivity to the configured store")]
    Ping,

    #[command(about = "Query a collection with a filter document")]
    Find {
        #[arg(help = "Collection: classes, instructors, users or carts")]
        collection: String,
        #[arg(long, help = "Filter, e.g. '{\"where\":{\"status\":\"pending\"},\"order\":\"enrolled desc\",\"limit\":5}'")]
        filter: Option<String>,
    },
}

pub async fn handle(cmd: DbCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = DatabaseManager::open_store(&config.database)
        .await
        .with_context(|| format!("failed to open {:?} store", config.database.backend))?;

    let result = match cmd {
        DbCommands::Init => store
            .ensure_collections()
            .await
            .context("failed to create collections")
            .map(|_| json!({ "status": "collections ready", "database": config.database.name })),
        DbCommands::Ping => store
            .health_check()
            .await
            .context("store unreachable")
            .map(|_| json!({ "status": "ok", "database": config.database.name })),
        DbCommands::Find { collection, filter } => match parse_find(&collection, filter.as_deref()) {
            Ok((collection, filter)) => store
                .find(collection, &filter)
                .await
                .context("query failed")
                .map(|docs| Value::Array(docs.into_iter().map(Value::Object).collect())),
            Err(e) => Err(e),
        },
    };
    store.close().await;
    let output = result?;

    match (output_format, &output) {
        (OutputFormat::Json, _) => println!("{}", output),
        (OutputFormat::Text, Value::Array(docs)) => {
            for doc in docs {
                println!("{}", doc);
            }
            println!("({} documents)", docs.len());
        }
        (OutputFormat::Text, _) => println!("{}: {}", output["database"], output["status"]),
    }
    Ok(())
}

fn parse_find(collection: &str, filter: Option<&str>) -> anyhow::Result<(Collection, Filter)> {
    let collection = Collection::from_name(collection).ok_or_else(|| anyhow!("unknown collection: {}", collection))?;
    let filter = match filter {
        Some(raw) => {
            let data: FilterData = serde_json::from_str(raw).context("filter is not valid JSON")?;
            Filter::from_data(data)?
        }
        None => Filter::new(),
    };
    Ok((collection, filter))
}
