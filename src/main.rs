//! Hydra Admin CLI
//!
//! Command-line front-end over the admin core:
//! - List, show, create, update and delete resources
//! - Print the routes an admin would render for a resource type
//! - Follow live updates of a resource or a collection page

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use hydra_admin::{
    descriptor, paths, ApiClient, Config, FormOutcome, LiveView, LoggingConfig, PagedCollection,
    Resource, ResourceDescriptor, ResourceForm,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "hydra-admin")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Admin client for Hydra (JSON-LD) APIs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API entrypoint (overrides HYDRA_ADMIN_ENTRYPOINT)
    #[arg(long, global = true)]
    entrypoint: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List one page of a collection
    List {
        /// Resource type (hero, location, ...)
        resource: String,
        /// Page number (default: first page)
        #[arg(short, long)]
        page: Option<u64>,
    },

    /// Show a single resource
    Show { resource: String, id: String },

    /// Create a resource
    Create {
        resource: String,
        /// Field values in name=value format
        #[arg(short, long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },

    /// Update a resource
    Update {
        resource: String,
        id: String,
        /// Field values in name=value format
        #[arg(short, long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },

    /// Delete a resource
    Delete { resource: String, id: String },

    /// Print the admin routes of a resource type
    Paths {
        resource: String,
        #[arg(value_enum)]
        kind: PathKind,
    },

    /// Follow live updates of a resource, or of the first page when no id is given
    Watch { resource: String, id: Option<String> },
}

#[derive(Clone, Copy, ValueEnum)]
enum PathKind {
    Pages,
    Items,
    Edit,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected name=value, got {:?}", raw))
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hydra_admin={}", config.level)));
    let registry = tracing_subscriber::registry().with(filter);

    match config.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        other => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
            if other != "pretty" {
                tracing::warn!(format = other, "Unknown log format, using pretty");
            }
        }
    }
}

fn lookup(name: &str) -> anyhow::Result<&'static ResourceDescriptor> {
    match descriptor(name) {
        Some(descriptor) => Ok(descriptor),
        None => bail!("Unknown resource type: {}", name),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(entrypoint) = cli.entrypoint.as_deref() {
        config.api.set_entrypoint(entrypoint)?;
    }
    init_logging(&config.logging);

    tracing::debug!(entrypoint = %config.api.entrypoint, "Hydra Admin v{}", env!("CARGO_PKG_VERSION"));
    let page_size = config.api.page_size;
    let client = ApiClient::new(config.api)?;

    match cli.command {
        Commands::List { resource, page } => {
            let descriptor = lookup(&resource)?;
            let response = client.get_collection(descriptor, page).await?;
            let collection = response.data;

            for member in &collection.members {
                println!(
                    "{}\t{}",
                    member.short_id().unwrap_or("-"),
                    serde_json::Value::Object(member.fields.clone())
                );
            }
            println!(
                "Page {} of {} ({} total)",
                page.unwrap_or(1),
                paths::page_count(&collection, page_size),
                collection
                    .total_items
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "?".to_string())
            );
        }

        Commands::Show { resource, id } => {
            let descriptor = lookup(&resource)?;
            match client.get_item(descriptor, &id).await? {
                Some(response) => print_json(&response.data)?,
                None => bail!("{} {} not found", descriptor.name, descriptor.item_iri(&id)),
            }
        }

        Commands::Create { resource, set } => {
            let descriptor = lookup(&resource)?;
            let form = ResourceForm::create(descriptor);
            submit(form, &client, &set).await?;
        }

        Commands::Update { resource, id, set } => {
            let descriptor = lookup(&resource)?;
            let current = client
                .get_item(descriptor, &id)
                .await?
                .with_context(|| format!("{} {} not found", descriptor.name, id))?;
            let form = ResourceForm::edit(descriptor, current.data);
            submit(form, &client, &set).await?;
        }

        Commands::Delete { resource, id } => {
            let descriptor = lookup(&resource)?;
            let mut form = ResourceForm::edit(descriptor, Resource::with_id(descriptor.item_iri(&id)));
            if let FormOutcome::Stay = form.delete(&client).await {
                let msg = form.status().map(|s| s.msg.clone()).unwrap_or_default();
                bail!(msg);
            }
            println!("Deleted {}", descriptor.item_iri(&id));
        }

        Commands::Paths { resource, kind } => {
            let descriptor = lookup(&resource)?;
            let first = client.get_collection(descriptor, None).await?.data;
            let routes = match kind {
                PathKind::Pages => {
                    paths::collection_paths(&first, page_size, &descriptor.page_route_template())
                }
                PathKind::Items => {
                    paths::item_paths(&client, first, &descriptor.show_route_template()).await?
                }
                PathKind::Edit => {
                    paths::item_paths(&client, first, &descriptor.edit_route_template()).await?
                }
            };
            for route in routes {
                println!("{}", route);
            }
        }

        Commands::Watch { resource, id } => {
            let descriptor = lookup(&resource)?;
            match id {
                Some(id) => {
                    let response = client
                        .get_item(descriptor, &id)
                        .await?
                        .with_context(|| format!("{} {} not found", descriptor.name, id))?;
                    follow(LiveView::item(&client, response)).await?;
                }
                None => {
                    let response = client.get_collection(descriptor, None).await?;
                    follow::<PagedCollection>(LiveView::collection(&client, response)).await?;
                }
            }
        }
    }

    Ok(())
}

async fn submit(
    mut form: ResourceForm<'_>,
    client: &ApiClient,
    assignments: &[(String, String)],
) -> anyhow::Result<()> {
    for (name, value) in assignments {
        form.set_field(name, value);
    }

    let outcome = form.submit(client).await;
    for (field, message) in form.errors() {
        eprintln!("  {}: {}", field, message);
    }
    if let Some(status) = form.status() {
        println!("{}", status.msg);
    }

    match outcome {
        FormOutcome::Navigate(_) => print_json(form.resource()),
        FormOutcome::Stay => bail!("{} was not saved", form.title()),
    }
}

/// Print the displayed value after every merge until interrupted
async fn follow<S>(mut view: LiveView<S>) -> anyhow::Result<()>
where
    S: hydra_admin::LiveState + serde::Serialize,
{
    if view.hub_url().is_none() {
        bail!("The API does not advertise a live-update hub");
    }

    print_json(&view.current())?;
    let mut updates = view.watch();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = updates.borrow_and_update().clone();
                print_json(&current)?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    view.close();
    Ok(())
}
