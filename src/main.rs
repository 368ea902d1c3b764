//! gwa CLI entrypoint
//! Parses command-line arguments and dispatches to the gateway services.
#![deny(unsafe_code)]
mod api;
mod core;
mod services;
mod ui;

use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{Level, debug};
use tracing_subscriber::EnvFilter;

use crate::api::request::ApiClient;
use crate::core::config::Settings;
use crate::core::resource::ResourceCache;
use crate::core::utils::output_filename;
use crate::services::openapi::{
    ConvertOptions, DeclarativeConverter, GatewayConverter, OpenApiDocument,
};
use crate::services::{app, gateway, openapi, plugins};
use crate::ui::{AsyncAction, views};

#[derive(Parser)]
#[command(name = "gwa")]
#[command(author, version, about = "Manage gateway service configuration", long_about = None)]
struct Cli {
    /// Print full error chains when an action fails
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Write a .env file with the namespace and service account credentials
    Init {
        /// Namespace to manage, a collection of gateway services and routes
        #[arg(long)]
        namespace: String,
        /// Service account client id
        #[arg(long)]
        client_id: String,
        /// Service account client secret
        #[arg(long)]
        client_secret: String,
        /// Target environment (legacy, dev, test or prod)
        #[arg(long, default_value = "dev")]
        env: String,
    },
    /// Generate a gateway config from an OpenAPI spec file or URL
    New {
        /// OpenAPI JSON/YAML file on disk or an HTTP(S) URL
        input: String,
        /// Team tag applied to generated objects, defaults to the namespace
        #[arg(long)]
        team: Option<String>,
        /// Starter plugins to include
        #[arg(short, long, value_delimiter = ',')]
        plugins: Vec<String>,
        /// Output file name
        #[arg(short, long)]
        outfile: Option<String>,
    },
    /// Check a gateway config file for structural problems
    Validate {
        /// Gateway config YAML file
        input: String,
    },
    /// List the available plugins
    Plugins {
        /// Plugin catalogue directory
        #[arg(default_value = "plugins")]
        dir: String,
    },
    /// Replace the namespace membership list
    ///
    /// The remote list is overwritten with exactly the users given here, so
    /// include every member on each run.
    Acl {
        /// Users granted the viewer role
        #[arg(short, long, value_delimiter = ',')]
        users: Vec<String>,
        /// Managers granted the admin role
        #[arg(short, long, value_delimiter = ',')]
        managers: Vec<String>,
    },
    /// Publish a gateway config bundle
    #[command(name = "publish-gateway", alias = "pg")]
    PublishGateway {
        /// Config file; when omitted every YAML file in the directory is merged
        input: Option<String>,
        /// Validate remotely without applying changes
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Default to WARN so interactive output stays clean; RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .init();

    let cli = Cli::parse();
    let verbose = cli.debug;

    match dispatch(cli).await {
        Ok(()) => {
            update_notice().await;
            ExitCode::SUCCESS
        }
        Err(err) => {
            views::failure(&err, verbose);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init {
            namespace,
            client_id,
            client_secret,
            env,
        } => run_init(namespace, client_id, client_secret, env).await,
        Commands::New {
            input,
            team,
            plugins,
            outfile,
        } => run_new(input, team, plugins, outfile).await,
        Commands::Validate { input } => run_validate(&input).await,
        Commands::Plugins { dir } => run_plugins(&dir).await,
        Commands::Acl { users, managers } => run_acl(users, managers).await,
        Commands::PublishGateway { input, dry_run } => run_publish(input, dry_run).await,
    }
}

async fn run_init(
    namespace: String,
    client_id: String,
    client_secret: String,
    env: String,
) -> anyhow::Result<()> {
    let dir = Path::new(".");
    if app::env_file_exists(dir) {
        anyhow::bail!("You already have an .env file in this project");
    }

    let options = app::InitOptions {
        namespace,
        client_id,
        client_secret,
        env,
    };
    let message = app::make_env_file(dir, &options).await?;
    views::success(message);
    Ok(())
}

async fn run_new(
    input: String,
    team: Option<String>,
    plugin_names: Vec<String>,
    outfile: Option<String>,
) -> anyhow::Result<()> {
    let settings = Settings::load();
    let team = team.unwrap_or_else(|| settings.namespace.clone());
    let outfile = output_filename(&input, outfile.as_deref())?;

    let document = OpenApiDocument::from_file_or_url(&input)
        .await
        .context("Failed to load the OpenAPI document")?;

    let mut templates = Vec::new();
    if !plugin_names.is_empty() {
        let catalogue = plugins::load_plugins("plugins").await.unwrap_or_default();
        templates = plugins::generate_plugin_templates(&plugin_names, &team, &catalogue);

        let missing: Vec<&str> = plugin_names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty() && !catalogue.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            eprintln!(
                "The following plugins are named incorrectly or are not supported: {}",
                missing.join(", ")
            );
        }
    }

    let options = ConvertOptions {
        team,
        plugins: templates,
    };
    let output = DeclarativeConverter.convert(&document, &options).await?;
    tokio::fs::write(&outfile, output)
        .await
        .with_context(|| format!("Failed to write {outfile}"))?;

    views::success(format!("File {outfile} generated"));
    Ok(())
}

async fn run_validate(input: &str) -> anyhow::Result<()> {
    let problems = openapi::validate_config(input)
        .await
        .with_context(|| format!("Failed to read {input}"))?;

    if !problems.is_empty() {
        anyhow::bail!("{input} failed validation:\n   {}", problems.join("\n   "));
    }
    views::success(format!("{input} is a valid gateway config"));
    Ok(())
}

async fn run_plugins(dir: &str) -> anyhow::Result<()> {
    let catalogue = plugins::load_plugins(dir)
        .await
        .with_context(|| format!("Failed to read plugin directory {dir}"))?;
    views::plugins_list(&catalogue);
    Ok(())
}

async fn run_acl(users: Vec<String>, managers: Vec<String>) -> anyhow::Result<()> {
    let settings = Settings::load();
    let client = Arc::new(ApiClient::new(settings));

    let users_key = users.join(",");
    let managers_key = managers.join(",");
    let task_client = Arc::clone(&client);
    let resource = ResourceCache::global().call(
        "acl-membership",
        &[users_key.as_str(), managers_key.as_str()],
        move || async move { gateway::add_members(&task_client, &users, &managers).await },
    );

    let counters = AsyncAction::new("Publishing membership changes...")
        .run(resource)
        .await?;
    views::membership_result(&counters);
    Ok(())
}

async fn run_publish(input: Option<String>, dry_run: bool) -> anyhow::Result<()> {
    let settings = Settings::load();
    let client = Arc::new(ApiClient::new(settings));

    let label = input.clone().unwrap_or_else(|| "bundle".to_string());
    let file_key = input.clone().unwrap_or_default();
    let dry_run_key = if dry_run { "true" } else { "false" };

    let task_client = Arc::clone(&client);
    let resource = ResourceCache::global().call(
        "publish-gateway",
        &[file_key.as_str(), dry_run_key],
        move || async move { gateway::publish_config(&task_client, input.as_deref(), dry_run).await },
    );

    let response = AsyncAction::new("Publishing gateway config...")
        .run(resource)
        .await?;
    views::publish_result(&label, &response);
    Ok(())
}

/// Best-effort release check after interactive runs; never blocks an outcome.
async fn update_notice() {
    if !std::io::stderr().is_terminal() {
        return;
    }
    match app::check_version(env!("CARGO_PKG_VERSION")).await {
        Ok(Some(latest)) => views::update_notice(&latest),
        Ok(None) => {}
        Err(err) => debug!(error = %err, "release check failed"),
    }
}
