/// Version injected at compile time via TARM_VERSION env var (set by CI/CD),
/// or the crate version for local builds.
pub const VERSION: &str = match option_env!("TARM_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tarm::arm::auth::ArmCredentials;
use tarm::arm::client::ArmClient;
use tarm::arm::http::format_arm_error;
use tarm::config::Config;
use tarm::network::{
    ApplicationGateway, LoadBalancer, Network, NetworkManager, NetworkSecurityGroup, RouteTable,
};
use tarm::resource::{
    extract_json_value, fetch_resources, fetcher, find_by_full_type, get_all_resource_keys,
    get_resource, Aggregate, ResourceDef, ResourceId, ResourceScope, Transport,
};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Define, inspect, and apply Azure networking resources
#[derive(Parser, Debug)]
#[command(name = "tarm", version = VERSION, about, long_about = None)]
struct Args {
    /// Subscription to use
    #[arg(short, long, global = true)]
    subscription: Option<String>,

    /// Management endpoint (defaults to the public cloud)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Run in read-only mode (block apply and delete)
    #[arg(long, global = true)]
    readonly: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the resource kinds this tool understands
    Kinds,
    /// Parse a resource id and print its components
    Id { id: String },
    /// Rebuild a resource document and drop dangling references, offline
    Normalize {
        /// Resource kind; taken from the document's `type` when omitted
        #[arg(short, long)]
        kind: Option<String>,
        /// JSON or YAML document
        file: PathBuf,
    },
    /// Show one resource
    Get {
        kind: String,
        name: String,
        #[arg(short = 'g', long)]
        resource_group: Option<String>,
        #[arg(short, long, value_enum, default_value = "json")]
        output: OutputFormat,
    },
    /// List resources of a kind in a resource group
    List {
        kind: String,
        #[arg(short = 'g', long)]
        resource_group: Option<String>,
    },
    /// Delete one resource
    Delete {
        kind: String,
        name: String,
        #[arg(short = 'g', long)]
        resource_group: Option<String>,
    },
    /// Create or update a resource from a document
    Apply {
        #[arg(short, long)]
        kind: Option<String>,
        #[arg(short = 'g', long)]
        resource_group: Option<String>,
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
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

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

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

    tracing::info!("tarm {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("tarm").join("tarm.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".tarm").join("tarm.log");
    }
    PathBuf::from("tarm.log")
}

/// Run `$body` with `$A` bound to the aggregate type registered under `$kind`
macro_rules! with_aggregate {
    ($kind:expr, $A:ident => $body:expr) => {
        match $kind {
            "application-gateways" => {
                type $A = ApplicationGateway;
                $body
            }
            "load-balancers" => {
                type $A = LoadBalancer;
                $body
            }
            "networks" => {
                type $A = Network;
                $body
            }
            "network-security-groups" => {
                type $A = NetworkSecurityGroup;
                $body
            }
            "route-tables" => {
                type $A = RouteTable;
                $body
            }
            other => bail!(
                "Unknown kind '{}'. Available: {}",
                other,
                get_all_resource_keys().join(", ")
            ),
        }
    };
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Warning: {err:#}");
            None
        }
    };

    if let Err(err) = run(args).await {
        tracing::error!("{:#}", err);
        if err.downcast_ref::<reqwest::Error>().is_some() || err.to_string().contains("API request failed") {
            eprintln!("Error: {}", format_arm_error(&err));
        } else {
            eprintln!("Error: {err:#}");
        }
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load();

    match &args.command {
        Command::Kinds => {
            print_kinds();
            Ok(())
        }
        Command::Id { id } => print_id(id),
        Command::Normalize { kind, file } => {
            let document = read_document(file)?;
            let kind = resolve_kind(kind.as_deref(), &document)?;
            let subscription = config.effective_subscription(args.subscription.as_deref());
            let scope = document_scope(&document, subscription.as_deref(), None)?;
            let normalized = with_aggregate!(kind, A => normalize::<A>(scope, document)?);
            println!("{}", serde_json::to_string_pretty(&normalized)?);
            Ok(())
        }
        Command::Get {
            kind,
            name,
            resource_group,
            output,
        } => {
            let def = kind_def(kind)?;
            let resource_group = require_group(&config, resource_group.as_deref())?;
            let client = connect(&args, &config)?;
            let value = client.get(def, &resource_group, name).await?;
            match output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
                OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&value)?),
            }
            Ok(())
        }
        Command::List {
            kind,
            resource_group,
        } => {
            let def = kind_def(kind)?;
            let resource_group = require_group(&config, resource_group.as_deref())?;
            let client = connect(&args, &config)?;
            let items = fetch_resources(&client, def, &resource_group).await?;
            print_table(def, &items);
            Ok(())
        }
        Command::Delete {
            kind,
            name,
            resource_group,
        } => {
            ensure_writable(&args)?;
            let resource_group = require_group(&config, resource_group.as_deref())?;
            let manager = NetworkManager::new(connect(&args, &config)?);
            with_aggregate!(kind.as_str(), A => manager.delete::<A>(&resource_group, name).await?);
            println!("Deleted {} '{}'", kind, name);
            Ok(())
        }
        Command::Apply {
            kind,
            resource_group,
            file,
        } => {
            ensure_writable(&args)?;
            let document = read_document(file)?;
            let kind = resolve_kind(kind.as_deref(), &document)?;
            let manager = NetworkManager::new(connect(&args, &config)?);
            let group = config.effective_resource_group(resource_group.as_deref());
            let scope = document_scope(&document, Some(manager.subscription_id()), group.as_deref())?;
            let id = with_aggregate!(kind, A => apply::<A, _>(&manager, &config, scope, document).await?);
            println!("Applied {}", id);
            Ok(())
        }
    }
}

fn connect(args: &Args, config: &Config) -> Result<ArmClient> {
    let Some(subscription) = config.effective_subscription(args.subscription.as_deref()) else {
        bail!("No subscription configured. Set AZURE_SUBSCRIPTION_ID, run 'az login', or use --subscription");
    };
    let endpoint = config.effective_endpoint(args.endpoint.as_deref());
    tracing::info!("Using subscription: {}, endpoint: {}", subscription, endpoint);
    ArmClient::new(&subscription, &endpoint, ArmCredentials::new(&endpoint))
}

fn ensure_writable(args: &Args) -> Result<()> {
    if args.readonly {
        bail!("Refusing to modify resources in read-only mode");
    }
    Ok(())
}

fn require_group(config: &Config, cli: Option<&str>) -> Result<String> {
    config
        .effective_resource_group(cli)
        .context("No resource group given. Use --resource-group")
}

fn kind_def(kind: &str) -> Result<&'static ResourceDef> {
    get_resource(kind).with_context(|| {
        format!(
            "Unknown kind '{}'. Available: {}",
            kind,
            get_all_resource_keys().join(", ")
        )
    })
}

fn read_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&content).with_context(|| format!("Invalid YAML in {}", path.display()))
    } else {
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
    }
}

/// Registry key from `--kind`, falling back to the document's `type`
fn resolve_kind<'a>(kind: Option<&'a str>, document: &Value) -> Result<&'a str> {
    if let Some(kind) = kind {
        kind_def(kind)?;
        return Ok(kind);
    }
    let Some(full_type) = document.get("type").and_then(|t| t.as_str()) else {
        bail!("Document has no 'type'; pass --kind");
    };
    match find_by_full_type(full_type) {
        Some((key, _)) => Ok(key),
        None => bail!("Unsupported resource type '{}'", full_type),
    }
}

/// Scope from the document's `id`, or from its `name` and the given defaults
fn document_scope(document: &Value, subscription: Option<&str>, resource_group: Option<&str>) -> Result<ResourceScope> {
    if let Some(id) = document.get("id").and_then(|v| v.as_str()) {
        let id = ResourceId::parse(id)?;
        if let Some(scope) = ResourceScope::from_id(&id) {
            return Ok(scope);
        }
    }
    let Some(name) = document.get("name").and_then(|v| v.as_str()) else {
        bail!("Document has neither 'id' nor 'name'");
    };
    Ok(ResourceScope::new(
        subscription.unwrap_or_default(),
        resource_group.unwrap_or_default(),
        name,
    ))
}

fn normalize<A: Aggregate>(scope: ResourceScope, document: Value) -> Result<Value> {
    let mut resource: A = fetcher::decode(scope, document)?;
    let cleared = resource.clean_dangling_references();
    if cleared > 0 {
        eprintln!("Cleared {} dangling reference(s) in {}", cleared, resource.label());
    }
    Ok(fetcher::encode(&mut resource)?)
}

async fn apply<A: Aggregate, T: Transport>(
    manager: &NetworkManager<T>,
    config: &Config,
    scope: ResourceScope,
    document: Value,
) -> Result<String> {
    if scope.resource_group.is_empty() {
        bail!("No resource group given. Use --resource-group or a document 'id'");
    }
    let mut resource: A = fetcher::decode(scope, document)?;
    if resource.region_name().is_none() {
        if let Some(location) = config.location.as_deref() {
            resource.with_region(location);
        }
    }
    manager.create(&mut resource).await?;
    Ok(match resource.id() {
        Some(id) => id.to_string(),
        None => resource.future_id()?,
    })
}

fn print_kinds() {
    println!("{:<26} {:<42} {:<12} CHILDREN", "KIND", "TYPE", "API");
    for key in get_all_resource_keys() {
        let Some(def) = get_resource(key) else {
            continue;
        };
        let children: Vec<&str> = def
            .sub_resources
            .iter()
            .map(|s| s.type_segment.as_str())
            .collect();
        println!(
            "{:<26} {:<42} {:<12} {}",
            key,
            def.full_type(),
            def.api_version,
            children.join(",")
        );
    }
}

fn print_id(id: &str) -> Result<()> {
    let id = ResourceId::parse(id)?;
    let field = |v: Option<&str>| v.unwrap_or("-").to_string();
    println!("subscription:   {}", field(id.subscription_id()));
    println!("resource group: {}", field(id.resource_group_name()));
    println!("provider:       {}", field(id.provider_namespace()));
    println!("type:           {}", id.full_resource_type().unwrap_or_else(|| "-".to_string()));
    println!("name:           {}", id.name());
    if let Some(parent) = id.parent() {
        println!("parent:         {}", parent);
    }
    Ok(())
}

fn print_table(def: &ResourceDef, items: &[Value]) {
    let header: Vec<String> = def
        .columns
        .iter()
        .map(|c| format!("{:<width$}", c.header, width = c.width as usize))
        .collect();
    println!("{}", header.join(" ").trim_end());

    for item in items {
        let row: Vec<String> = def
            .columns
            .iter()
            .map(|c| {
                let mut value = extract_json_value(item, &c.json_path);
                if value.chars().count() > c.width as usize {
                    value = value.chars().take(c.width.saturating_sub(1) as usize).collect();
                    value.push('~');
                }
                format!("{:<width$}", value, width = c.width as usize)
            })
            .collect();
        println!("{}", row.join(" ").trim_end());
    }
}
