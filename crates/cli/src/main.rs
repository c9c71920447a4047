//! `catalog` -- command-line front end for a remote record catalog.
//!
//! Loads the collection, then lists, creates, updates or deletes records
//! through [`CatalogClient`].
//!
//! # Environment variables
//!
//! | Variable                       | Required | Default                     |
//! |--------------------------------|----------|-----------------------------|
//! | `CATALOG_API_URL`              | no       | `http://localhost:3000/api` |
//! | `CATALOG_KIND`                 | no       | `employees`                 |
//! | `CATALOG_REQUEST_TIMEOUT_SECS` | no       | `30`                        |
//! | `CATALOG_RELOAD_AFTER_SUBMIT`  | no       | `false`                     |

use std::path::Path;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_client::config::parse_kind;
use catalog_client::{CatalogClient, ClientConfig};
use catalog_core::image::ImageUpload;
use catalog_core::schema::RecordSchema;
use catalog_core::types::RecordId;
use catalog_core::view::{CatalogView, SortKey};

mod cli;

use cli::{Cli, Command};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "catalog_core=info,catalog_client=info,catalog=info";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(kind) = cli.kind {
        config.schema =
            parse_kind(&kind).ok_or_else(|| anyhow!("unknown kind `{kind}` (employees|movies)"))?;
    }

    tracing::info!(
        api_url = %config.api_url,
        collection = config.schema.collection,
        "Starting catalog",
    );

    let mut client = CatalogClient::from_config(&config)?;
    client.load_all().await.context("loading records")?;

    match cli.command {
        Command::List { search, sort } => {
            let sort = sort
                .map(|key| SortKey::parse(client.schema(), &key))
                .transpose()?;
            print_view(client.schema(), &client.view(&search, sort.as_ref()));
        }
        Command::Create { fields, image } => {
            apply(&mut client, &fields, image.as_deref()).await?;
            let id = client.submit().await?;
            println!("created {id}");
        }
        Command::Update { id, fields, image } => {
            client.begin_edit(&RecordId::new(id))?;
            apply(&mut client, &fields, image.as_deref()).await?;
            let id = client.submit().await?;
            println!("updated {id}");
        }
        Command::Delete { id } => {
            let id = RecordId::new(id);
            client.remove(&id).await?;
            println!("deleted {id}");
        }
    }

    Ok(())
}

/// Copy field assignments and an optional image file into the form.
async fn apply(
    client: &mut CatalogClient,
    fields: &[(String, String)],
    image: Option<&Path>,
) -> Result<()> {
    for (name, value) in fields {
        client.set_field(name, value.as_str())?;
    }

    if let Some(path) = image {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading image {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        client.select_image(ImageUpload::new(file_name, bytes));
    }

    Ok(())
}

fn print_view(schema: &RecordSchema, view: &CatalogView<'_>) {
    for record in view.iter() {
        let mut line = record.id.to_string();
        for spec in schema.fields {
            let value = record
                .get(spec.name)
                .map(|v| v.to_string())
                .unwrap_or_default();
            line.push_str(&format!("\t{}: {value}", spec.label));
        }
        if let Some(image) = &record.image {
            line.push_str(&format!("\t[{}]", image.content_type()));
        }
        println!("{line}");
    }
    println!("{} {}(s)", view.len(), schema.display_name.to_lowercase());
}
