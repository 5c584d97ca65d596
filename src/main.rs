use anyhow::{Context, Result};
use circlesync::circleci::Client;
use circlesync::config::{Overrides, ProviderConfig, Settings};
use circlesync::manifest::Manifest;
use circlesync::resource::context::{ContextResource, DesiredContext};
use circlesync::resource::context_envvar::{
    ContextEnvironmentVariableResource, DesiredContextEnvironmentVariable,
};
use circlesync::resource::envvar::{DesiredEnvironmentVariable, EnvironmentVariableResource};
use circlesync::resource::project::{DesiredProject, ProjectResource, SCHEMA_VERSION};
use circlesync::resource::{Resource, ResourceKind, Tracked};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Reconcile CircleCI projects, contexts and environment variables
#[derive(Parser, Debug)]
#[command(name = "circlesync", version = circlesync::VERSION, about, long_about = None)]
struct Args {
    /// API token (falls back to CIRCLECI_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Organization (falls back to CIRCLECI_ORGANIZATION, then the settings file)
    #[arg(short, long, global = true)]
    organization: Option<String>,

    /// VCS type, e.g. github or bitbucket (default: github)
    #[arg(long, global = true)]
    vcs_type: Option<String>,

    /// API v2 base URL (default: https://circleci.com/api/v2/)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Projects
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Project environment variables
    #[command(subcommand)]
    EnvVar(EnvVarCommand),

    /// Contexts
    #[command(subcommand)]
    Context(ContextCommand),

    /// Context environment variables
    #[command(subcommand)]
    ContextEnvVar(ContextEnvVarCommand),

    /// Converge every resource declared in a YAML manifest
    Apply {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Persist organization, VCS type and URL defaults (never the token)
    Configure,
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// Follow a project
    Follow { name: String },

    /// Refresh a project by name
    Show { name: String },

    /// Import a followed project by name
    Import { name: String },

    /// Stop tracking a project (it stays followed)
    Delete { name: String },

    /// Migrate a stored project state record (JSON file, or - for stdin)
    UpgradeState {
        /// Schema version the record was written with
        #[arg(long, default_value_t = 0)]
        version: u32,
        input: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum EnvVarCommand {
    /// Create a project environment variable
    Create {
        #[arg(long)]
        project: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        value: String,
        /// Delete an existing variable of the same name first
        #[arg(long)]
        replace: bool,
    },

    /// Refresh a variable by key (<vcs>/<org>/<project>:<name>)
    Show { key: String },

    /// Delete a variable by key (<vcs>/<org>/<project>:<name>)
    Delete { key: String },
}

#[derive(Subcommand, Debug)]
enum ContextCommand {
    /// Create a context
    Create { name: String },

    /// Refresh a context by id
    Show { id: String },

    /// Import a context by id or by name
    Import { key: String },

    /// Delete a context and its variables
    Delete { id: String },

    /// Find a context by name without tracking it
    Lookup { name: String },
}

#[derive(Subcommand, Debug)]
enum ContextEnvVarCommand {
    /// Create or overwrite a context environment variable
    Create {
        #[arg(long)]
        context_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        value: String,
    },

    /// Refresh a context variable by key (<context-id>:<name>)
    Show { key: String },

    /// Delete a context variable by key (<context-id>:<name>)
    Delete { key: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, err);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("circlesync started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("circlesync").join("circlesync.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".circlesync").join("circlesync.log");
    }
    PathBuf::from("circlesync.log")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_state<R: Resource>(state: &R::State) -> Result<()> {
    print_json(&json!({
        "type": R::TYPE_NAME,
        "key": state.key(),
        "state": state,
    }))
}

async fn show(kind: ResourceKind, client: &Client, key: &str) -> Result<()> {
    let state = kind
        .read(client, key)
        .await
        .with_context(|| format!("Error reading {} {}", kind, key))?;
    if state.is_none() {
        tracing::info!("{} {} is gone", kind, key);
    }
    print_json(&json!({ "type": kind.type_name(), "key": key, "state": state }))
}

async fn import(kind: ResourceKind, client: &Client, raw_key: &str) -> Result<()> {
    let (key, state) = kind
        .import(client, raw_key)
        .await
        .with_context(|| format!("Error importing {} {}", kind, raw_key))?;
    print_json(&json!({ "type": kind.type_name(), "key": key, "state": state }))
}

async fn delete(kind: ResourceKind, client: &Client, key: &str) -> Result<()> {
    kind.delete(client, key)
        .await
        .with_context(|| format!("Error deleting {} {}", kind, key))?;
    print_json(&json!({ "type": kind.type_name(), "key": key, "state": null }))
}

fn read_record(input: &Path) -> Result<Map<String, Value>> {
    let content = if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read state from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {:?}", input))?
    };

    serde_json::from_str(&content).context("State record must be a JSON object")
}

fn configure(args: &Args) -> Result<()> {
    let mut settings = Settings::load();
    if let Some(org) = &args.organization {
        settings.organization = Some(org.clone());
    }
    if let Some(vcs) = &args.vcs_type {
        settings.vcs_type = Some(vcs.clone());
    }
    if let Some(url) = &args.url {
        url::Url::parse(url).with_context(|| format!("Invalid url '{}'", url))?;
        settings.url = Some(url.clone());
    }

    let path = settings.save()?;
    eprintln!("Saved settings to {:?}", path);
    print_json(&settings)
}

async fn run(args: Args, client: &Client) -> Result<()> {
    match args.command {
        Command::Project(ProjectCommand::Follow { name }) => {
            let state = ProjectResource::create(client, &DesiredProject { name })
                .await
                .context("Error following project")?;
            print_state::<ProjectResource>(&state)
        }
        Command::Project(ProjectCommand::Show { name }) => {
            show(ResourceKind::Project, client, &name).await
        }
        Command::Project(ProjectCommand::Import { name }) => {
            import(ResourceKind::Project, client, &name).await
        }
        Command::Project(ProjectCommand::Delete { name }) => {
            delete(ResourceKind::Project, client, &name).await
        }
        Command::Project(ProjectCommand::UpgradeState { version, input }) => {
            let record = read_record(&input)?;
            let upgraded = ProjectResource::upgrade_state(client, version, record).await?;
            print_json(&json!({
                "schema_version": SCHEMA_VERSION,
                "state": upgraded,
            }))
        }
        Command::EnvVar(EnvVarCommand::Create {
            project,
            name,
            value,
            replace,
        }) => {
            let desired = DesiredEnvironmentVariable {
                organization: args.organization.clone(),
                project,
                name,
                value,
            };
            let state = if replace {
                EnvironmentVariableResource::replace(client, &desired).await
            } else {
                EnvironmentVariableResource::create(client, &desired).await
            }
            .context("Error creating environment variable")?;
            print_state::<EnvironmentVariableResource>(&state)
        }
        Command::EnvVar(EnvVarCommand::Show { key }) => {
            show(ResourceKind::EnvironmentVariable, client, &key).await
        }
        Command::EnvVar(EnvVarCommand::Delete { key }) => {
            delete(ResourceKind::EnvironmentVariable, client, &key).await
        }
        Command::Context(ContextCommand::Create { name }) => {
            let desired = DesiredContext {
                name,
                organization: args.organization.clone(),
            };
            let state = ContextResource::create(client, &desired)
                .await
                .context("Error creating context")?;
            print_state::<ContextResource>(&state)
        }
        Command::Context(ContextCommand::Show { id }) => {
            show(ResourceKind::Context, client, &id).await
        }
        Command::Context(ContextCommand::Import { key }) => {
            import(ResourceKind::Context, client, &key).await
        }
        Command::Context(ContextCommand::Delete { id }) => {
            delete(ResourceKind::Context, client, &id).await
        }
        Command::Context(ContextCommand::Lookup { name }) => {
            let found = ContextResource::lookup(client, client.organization(), &name).await?;
            print_json(&found)
        }
        Command::ContextEnvVar(ContextEnvVarCommand::Create {
            context_id,
            name,
            value,
        }) => {
            let desired = DesiredContextEnvironmentVariable {
                context_id,
                name,
                value,
            };
            let state = ContextEnvironmentVariableResource::create(client, &desired)
                .await
                .context("Error creating context environment variable")?;
            print_state::<ContextEnvironmentVariableResource>(&state)
        }
        Command::ContextEnvVar(ContextEnvVarCommand::Show { key }) => {
            show(ResourceKind::ContextEnvironmentVariable, client, &key).await
        }
        Command::ContextEnvVar(ContextEnvVarCommand::Delete { key }) => {
            delete(ResourceKind::ContextEnvironmentVariable, client, &key).await
        }
        Command::Apply { file } => {
            let manifest = Manifest::load(&file)?;
            let applied = manifest.apply(client).await?;
            print_json(&applied)
        }
        // Handled in main before a client is built
        Command::Configure => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    if matches!(args.command, Command::Configure) {
        return configure(&args);
    }

    let overrides = Overrides {
        api_token: args.token.clone(),
        vcs_type: args.vcs_type.clone(),
        organization: args.organization.clone(),
        url: args.url.clone(),
    };
    let config = ProviderConfig::resolve(overrides, &Settings::load())?;
    tracing::debug!("Resolved configuration: {:?}", config);

    let client = Client::new(&config)?;

    run(args, &client).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Command {
        Args::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn test_per_kind_subcommands() {
        assert!(matches!(
            parse(&["circlesync", "project", "show", "web"]),
            Command::Project(ProjectCommand::Show { name }) if name == "web"
        ));
        assert!(matches!(
            parse(&["circlesync", "project", "import", "web"]),
            Command::Project(ProjectCommand::Import { .. })
        ));
        assert!(matches!(
            parse(&["circlesync", "env-var", "delete", "github/acme/web:API_KEY"]),
            Command::EnvVar(EnvVarCommand::Delete { key }) if key == "github/acme/web:API_KEY"
        ));
        assert!(matches!(
            parse(&["circlesync", "context", "import", "deploy"]),
            Command::Context(ContextCommand::Import { .. })
        ));
        assert!(matches!(
            parse(&["circlesync", "context-env-var", "show", "ctx:AWS_KEY"]),
            Command::ContextEnvVar(ContextEnvVarCommand::Show { .. })
        ));
    }

    #[test]
    fn test_generic_commands_are_gone() {
        assert!(Args::try_parse_from(["circlesync", "read", "project", "web"]).is_err());
        assert!(Args::try_parse_from(["circlesync", "env-var", "import", "k"]).is_err());
    }
}
