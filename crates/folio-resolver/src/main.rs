//! CLI entry point for the folio-resolver.
//!
//! Executes one resolver event against the graph, or runs an
//! operational task (schema init, user provisioning).

use std::io::Read;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use folio_core::SubjectId;
use folio_graph::GraphClient;

use folio_resolver::config::load_graph_config;
use folio_resolver::dispatch::dispatch;
use folio_resolver::event::ResolverEvent;

#[derive(Parser)]
#[command(name = "folio-resolver")]
#[command(about = "Field resolver runner for the Folio content graph")]
struct Cli {
    /// Resolver event JSON file ("-" for stdin).
    #[arg(short, long)]
    event: Option<String>,

    /// Create the uniqueness constraint and full-text index, then exit.
    #[arg(long)]
    init_schema: bool,

    /// Provision a User node for a confirmed identity, then exit.
    #[arg(long)]
    provision_user: bool,

    /// Subject id for --provision-user.
    #[arg(long)]
    sub: Option<String>,

    /// Email for --provision-user.
    #[arg(long)]
    email: Option<String>,

    /// Config file prefix (default: folio).
    #[arg(short, long, default_value = "folio")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let graph_config = load_graph_config(&cli.config);
    let graph = GraphClient::connect(&graph_config).await?;

    if cli.init_schema {
        graph.ensure_schema().await?;
        return Ok(());
    }

    if cli.provision_user {
        let sub = cli
            .sub
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("--sub is required with --provision-user"))?;
        let email = cli
            .email
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("--email is required with --provision-user"))?;
        let sub = SubjectId(Uuid::parse_str(sub)?);
        let user = graph.provision_user(&sub, email).await?;
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    let Some(path) = cli.event.as_deref() else {
        anyhow::bail!("Specify --event <file>, --init-schema, or --provision-user");
    };

    let raw = if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };

    let event: ResolverEvent = serde_json::from_str(&raw)?;
    let result = dispatch(&event, &graph).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
