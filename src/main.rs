//! pingone-mfa command line front end.
//!
//! Drives the library the way a host would: load configuration, build the
//! API client, and run one lifecycle entry point per invocation.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pingone_mfa::config::ClientConfig;
use pingone_mfa::locator::DefaultPolicyLocator;
use pingone_mfa::logging::{init_logging, LogConfig, LogFormat};
use pingone_mfa::model::{DevicePolicyConfig, POLICY_TYPE_PINGONE_MFA};
use pingone_mfa::resources::device_policies::DevicePoliciesDataSource;
use pingone_mfa::resources::device_policy::DevicePolicyResource;
use pingone_mfa::resources::device_policy_default::DefaultDevicePolicyResource;
use pingone_mfa::resources::device_policy_migration::DevicePolicyMigrationResource;
use pingone_mfa::resources::fido2_policy::Fido2PolicyResource;
use pingone_mfa::resources::mfa_settings::MfaSettingsResource;
use pingone_mfa::resources::push_credential::PushCredentialResource;
use pingone_mfa::resources::schema::ResourceSchema;
use pingone_mfa::{validate, ApiClient, Diagnostics, OperationContext, Resource, Response};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "pingone-mfa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Client configuration file (TOML)
    #[arg(long, global = true, env = "PINGONE_MFA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level or EnvFilter directives
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Log output format: human or json
    #[arg(long, global = true, default_value = "human")]
    log_format: String,

    /// Also write daily-rotated log files into this directory
    #[arg(long, global = true, env = "PINGONE_MFA_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Disable ANSI colors on console output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a device policy definition (TOML or JSON)
    Validate {
        file: PathBuf,
        /// Treat the policy as the environment default
        #[arg(long)]
        default: bool,
        /// Skip checks that read applications from the API
        #[arg(long)]
        offline: bool,
    },

    /// Print the attribute schema of a resource
    Schema {
        resource: ResourceKind,
        #[arg(long)]
        json: bool,
    },

    /// Parse an import identifier into seed state
    Import { resource: ResourceKind, id: String },

    /// Import a resource and read its current state from the API
    Read { resource: ResourceKind, id: String },

    /// Find the default device policy of an environment
    LocateDefault { environment_id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum ResourceKind {
    DevicePolicy,
    DevicePolicyDefault,
    DevicePolicies,
    DevicePolicyMigration,
    Fido2Policy,
    PushCredential,
    MfaSettings,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::default()
        .with_level(cli.log_level.clone())
        .with_format(cli.log_format.parse::<LogFormat>()?)
        .with_ansi(!cli.no_color);
    if let Some(dir) = &cli.log_dir {
        log_config = log_config.with_log_dir(dir.clone());
    }
    let _guard = init_logging(&log_config)?;

    let config = ClientConfig::load(cli.config.as_deref()).context("loading client configuration")?;
    debug!("Using API base URL {}", config.api_base_url);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling");
            ctrl_c.cancel();
        }
    });

    let client = Arc::new(ApiClient::new(&config)?);
    let ctx = OperationContext::with_cancel(cancel);

    match cli.command {
        Commands::Validate { file, default, offline } => validate_file(&client, &config, &file, default, offline).await,
        Commands::Schema { resource, json } => {
            let schema = schema_of(resource, &client, &config);
            if json {
                println!("{}", serde_json::to_string_pretty(&schema)?);
            } else {
                print!("{}", schema);
            }
            Ok(())
        }
        Commands::Import { resource, id } => import(resource, &client, &config, &ctx, &id, false).await,
        Commands::Read { resource, id } => import(resource, &client, &config, &ctx, &id, true).await,
        Commands::LocateDefault { environment_id } => {
            let mut diags = Diagnostics::new();
            let found = DefaultPolicyLocator::new(config.locator.clone())
                .locate(&client, &environment_id, true, &mut diags, &ctx.cancel)
                .await?;
            report(&diags);
            match found {
                Some(policy) => {
                    println!("{}", serde_json::to_string_pretty(&policy)?);
                    Ok(())
                }
                None => bail!("no default device policy found in {}", environment_id),
            }
        }
    }
}

fn schema_of(kind: ResourceKind, client: &Arc<ApiClient>, config: &ClientConfig) -> ResourceSchema {
    match kind {
        ResourceKind::DevicePolicy => DevicePolicyResource::new(client.clone()).schema(),
        ResourceKind::DevicePolicyDefault => {
            DefaultDevicePolicyResource::new(client.clone(), config.locator.clone()).schema()
        }
        ResourceKind::DevicePolicies => DevicePoliciesDataSource::new(client.clone()).schema(),
        ResourceKind::DevicePolicyMigration => DevicePolicyMigrationResource::new(client.clone()).schema(),
        ResourceKind::Fido2Policy => Fido2PolicyResource::new(client.clone()).schema(),
        ResourceKind::PushCredential => PushCredentialResource::new(client.clone()).schema(),
        ResourceKind::MfaSettings => MfaSettingsResource::new(client.clone()).schema(),
    }
}

fn load_policy(file: &Path) -> Result<DevicePolicyConfig> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let policy = match file.extension().and_then(|e| e.to_str()) {
        Some("json") => DevicePolicyConfig::from_json(&text)?,
        _ => DevicePolicyConfig::from_toml(&text)?,
    };
    Ok(policy)
}

async fn validate_file(
    client: &Arc<ApiClient>,
    config: &ClientConfig,
    file: &Path,
    default: bool,
    offline: bool,
) -> Result<()> {
    let mut plan = load_policy(file)?;

    let diags = if offline {
        plan.policy_type
            .or_default_with(|| POLICY_TYPE_PINGONE_MFA.to_string());
        plan.apply_defaults();
        validate::device_policy::validate(&plan)
    } else if default {
        DefaultDevicePolicyResource::new(client.clone(), config.locator.clone())
            .validate(&plan)
            .await
    } else {
        DevicePolicyResource::new(client.clone()).validate(&plan).await
    };

    report(&diags);
    if diags.has_error() {
        bail!("{} is not valid", file.display());
    }
    println!("{} is valid", file.display());
    Ok(())
}

async fn import(
    kind: ResourceKind,
    client: &Arc<ApiClient>,
    config: &ClientConfig,
    ctx: &OperationContext,
    id: &str,
    read: bool,
) -> Result<()> {
    match kind {
        ResourceKind::DevicePolicy => run_import(&DevicePolicyResource::new(client.clone()), ctx, id, read).await,
        ResourceKind::DevicePolicyDefault => {
            let resource = DefaultDevicePolicyResource::new(client.clone(), config.locator.clone());
            run_import(&resource, ctx, id, read).await
        }
        ResourceKind::DevicePolicyMigration => {
            run_import(&DevicePolicyMigrationResource::new(client.clone()), ctx, id, read).await
        }
        ResourceKind::Fido2Policy => run_import(&Fido2PolicyResource::new(client.clone()), ctx, id, read).await,
        ResourceKind::PushCredential => run_import(&PushCredentialResource::new(client.clone()), ctx, id, read).await,
        ResourceKind::MfaSettings => run_import(&MfaSettingsResource::new(client.clone()), ctx, id, read).await,
        ResourceKind::DevicePolicies => {
            let response = DevicePoliciesDataSource::new(client.clone()).read(ctx, id).await;
            print_response(&response)
        }
    }
}

async fn run_import<R>(resource: &R, ctx: &OperationContext, id: &str, read: bool) -> Result<()>
where
    R: Resource,
    R::State: Serialize,
{
    let seed = resource.import(id)?;
    if !read {
        println!("{}", serde_json::to_string_pretty(&seed)?);
        return Ok(());
    }
    let response = resource.read(ctx, &seed).await;
    print_response(&response)
}

fn print_response<S: Serialize>(response: &Response<S>) -> Result<()> {
    report(&response.diagnostics);
    if response.has_error() {
        bail!("operation failed");
    }
    match &response.state {
        Some(state) => println!("{}", serde_json::to_string_pretty(state)?),
        None => println!("resource no longer exists"),
    }
    Ok(())
}

fn report(diags: &Diagnostics) {
    for diag in diags.iter() {
        eprintln!("{}", diag);
    }
}
