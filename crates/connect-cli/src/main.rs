use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use connect_client::ApiClient;
use connect_config::AppConfig;
use connect_core::{group_defs, group_plugins, short_name, ConnectorEditor, Submission, ViewMode};
use connect_providers::{
    ExternalSourcesProvider, FormSession, KafkaProvider, SchemaRegistryProvider,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "connect-admin")]
#[command(about = "Manage Kafka Connect external sources of an organization", long_about = None)]
struct Cli {
    /// Path to configuration directory
    #[arg(short, long, global = true, default_value = "config")]
    config_dir: String,

    /// Organization domain, overrides the configured one
    #[arg(short, long, global = true)]
    domain: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List connectors with their state
    List,

    /// List installed connector plugins
    Plugins,

    /// Show the configuration keys a connector class declares
    ConfigDefs {
        connector_class: String,

        /// Filter optional keys by name or group
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Create a connector
    Create {
        #[arg(short, long)]
        name: Option<String>,

        /// Connector class
        #[arg(short = 't', long = "class")]
        connector_class: Option<String>,

        /// Config entry, repeatable
        #[arg(short, long = "set", value_parser = parse_key_val)]
        set: Vec<(String, String)>,

        /// JSON body `{"name": ..., "config": {...}}` applied before --set
        #[arg(short, long)]
        raw: Option<PathBuf>,

        /// Schema Registry subject stored in the connector config
        #[arg(long)]
        schema_subject: Option<String>,

        /// Print the request instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Update an existing connector's config
    Edit {
        name: String,

        #[arg(short, long = "set", value_parser = parse_key_val)]
        set: Vec<(String, String)>,

        #[arg(short, long)]
        raw: Option<PathBuf>,

        #[arg(long)]
        dry_run: bool,
    },

    Delete {
        name: String,
    },

    Status {
        name: String,
    },

    Pause {
        name: String,
    },

    Resume {
        name: String,
    },

    /// Data directory used by file-source connectors
    Files {
        #[command(subcommand)]
        command: FilesCommand,
    },

    /// Schema Registry
    Schema {
        #[command(subcommand)]
        command: SchemaCommand,
    },

    /// List Kafka topics
    Topics {
        #[arg(long)]
        include_internal: bool,
    },
}

#[derive(Subcommand)]
enum FilesCommand {
    List,
    Upload { path: PathBuf },
}

#[derive(Subcommand)]
enum SchemaCommand {
    Subjects,
    Upload {
        #[arg(short, long)]
        subject: String,

        /// File holding the JSON schema
        path: PathBuf,
    },
    Health,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    Ok((key.trim().to_string(), value.to_string()))
}

fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let level = match config.logging.level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    if config.logging.json {
        let subscriber = FmtSubscriber::builder()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

/// Closes the form session on Ctrl-C
fn cancel_on_ctrl_c(form: &FormSession) {
    let cancel = form.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, dropping pending results");
            cancel.cancel();
        }
    });
}

fn print_submission(submission: &Submission) -> anyhow::Result<()> {
    let body = match submission {
        Submission::Create(request) => serde_json::to_value(request)?,
        Submission::Update { name, config } => {
            serde_json::json!({ "name": name, "config": config })
        }
    };
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

async fn apply_raw(form: &mut FormSession, path: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    form.switch_view(ViewMode::Raw);
    form.edit_raw(&text).await?;
    if let Some(error) = form.editor().raw_error() {
        bail!("{}: {}", path.display(), error);
    }
    form.switch_view(ViewMode::Form);
    Ok(())
}

async fn finish(form: &mut FormSession, dry_run: bool) -> anyhow::Result<()> {
    if let Some(error) = form.defs_error() {
        bail!("{}", error);
    }
    if dry_run {
        return print_submission(&form.editor().build_submission()?);
    }

    let result = form.submit().await?;
    if !result.success {
        bail!("{}", result.message);
    }
    println!("✓ {}", result.message);
    Ok(())
}

fn print_editor_summary(editor: &ConnectorEditor) {
    let missing = editor.missing_required_fields();
    if !missing.is_empty() {
        println!("Required keys still blank: {}", missing.join(", "));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut app_config = AppConfig::load(&cli.config_dir)?;
    if let Some(domain) = &cli.domain {
        app_config.session.domain = domain.clone();
    }
    init_tracing(&app_config)?;

    let client = Arc::new(ApiClient::with_options(
        app_config.session(),
        app_config.client_options(),
    )?);
    let sources = Arc::new(ExternalSourcesProvider::new(client.clone()));
    let schemas = Arc::new(SchemaRegistryProvider::new(client.clone()));

    match cli.command {
        Commands::List => {
            let connectors = sources.get_sources().await?;
            println!("📦 Connectors: {}", connectors.len());
            for connector in connectors {
                println!(
                    "  • {} [{}] {}",
                    connector.name,
                    connector.state,
                    short_name(&connector.connector_class)
                );
                if !connector.topics.is_empty() {
                    println!("    topics: {}", connector.topics);
                }
            }
        }

        Commands::Plugins => {
            let plugins = sources.get_connector_plugins().await?;
            let grouped = group_plugins(&plugins);
            for (label, list) in [
                ("Source", &grouped.source),
                ("Sink", &grouped.sink),
                ("Other", &grouped.other),
            ] {
                if list.is_empty() {
                    continue;
                }
                println!("{}:", label);
                for plugin in list {
                    println!("  • {}  {}", plugin.label(), plugin.class);
                }
            }
        }

        Commands::ConfigDefs {
            connector_class,
            search,
        } => {
            let defs = sources
                .get_connector_plugin_config_defs(&connector_class)
                .await?;
            println!("Required:");
            for def in defs.iter().filter(|d| d.required) {
                println!(
                    "  • {} = {:?}",
                    def.name,
                    def.default_value.as_deref().unwrap_or("")
                );
            }
            let optional: Vec<_> = defs.iter().filter(|d| !d.required).cloned().collect();
            for group in group_defs(&optional, &search) {
                println!("{}:", group.name);
                for def in group.defs {
                    println!(
                        "  • {} ({})",
                        def.name,
                        String::from(def.kind.clone()).to_lowercase()
                    );
                    if let Some(doc) = &def.documentation {
                        println!("    {}", doc);
                    }
                }
            }
        }

        Commands::Create {
            name,
            connector_class,
            set,
            raw,
            schema_subject,
            dry_run,
        } => {
            let mut form = FormSession::new(sources.clone(), schemas.clone());
            cancel_on_ctrl_c(&form);
            form.open_create().await?;
            if let Some(error) = form.plugins_error() {
                bail!("{}", error);
            }

            if let Some(name) = &name {
                form.set_name(name)?;
            }
            if let Some(class) = &connector_class {
                if !form.grouped_plugins().contains(class) {
                    bail!("Connector class '{}' is not installed", class);
                }
                form.select_connector_class(class).await?;
            }
            if let Some(path) = &raw {
                apply_raw(&mut form, path).await?;
            }
            for (key, value) in &set {
                form.set_value(key, value)?;
            }
            if let Some(subject) = &schema_subject {
                form.set_schema_subject(subject)?;
            }

            print_editor_summary(form.editor());
            finish(&mut form, dry_run).await?;
        }

        Commands::Edit {
            name,
            set,
            raw,
            dry_run,
        } => {
            let mut form = FormSession::new(sources.clone(), schemas.clone());
            cancel_on_ctrl_c(&form);
            form.open_edit(&name).await?;

            if let Some(path) = &raw {
                apply_raw(&mut form, path).await?;
            }
            for (key, value) in &set {
                form.set_value(key, value)?;
            }

            print_editor_summary(form.editor());
            finish(&mut form, dry_run).await?;
        }

        Commands::Delete { name } => {
            let result = sources.delete_external_source(&name).await;
            if !result.success {
                bail!("{}", result.message);
            }
            println!("✓ {}", result.message);
        }

        Commands::Status { name } => {
            let status = sources.get_external_source_status(&name).await?;
            println!("{} {}", status.name, status.state);
        }

        Commands::Pause { name } => {
            let state = sources.pause_external_source(&name).await?;
            println!("{} {}", name, state);
        }

        Commands::Resume { name } => {
            let state = sources.resume_external_source(&name).await?;
            println!("{} {}", name, state);
        }

        Commands::Files { command } => match command {
            FilesCommand::List => {
                for file in sources.list_files().await? {
                    println!("  • {} ({} bytes) {}", file.name, file.size, file.connect_path);
                }
            }
            FilesCommand::Upload { path } => {
                let file_name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .with_context(|| format!("no file name in {}", path.display()))?
                    .to_string();
                let contents =
                    std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
                let result = sources.upload_file(&file_name, contents).await;
                if !result.success {
                    bail!("{}", result.message);
                }
                println!("✓ {}", result.message);
            }
        },

        Commands::Schema { command } => match command {
            SchemaCommand::Subjects => {
                let subjects = schemas.refresh_subjects().await;
                if let Some(error) = schemas.state().await.last_error {
                    bail!("{}", error);
                }
                for subject in subjects {
                    println!("  • {}", subject);
                }
            }
            SchemaCommand::Upload { subject, path } => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let result = schemas.upload_schema(&subject, &text).await;
                if !result.success {
                    bail!("{}", result.message);
                }
                match result.schema_id {
                    Some(id) => println!("✓ {} (id {})", result.message, id),
                    None => println!("✓ {}", result.message),
                }
            }
            SchemaCommand::Health => {
                let health = schemas.health().await?;
                println!("Schema Registry: {}", health.status);
            }
        },

        Commands::Topics { include_internal } => {
            let kafka = KafkaProvider::new(client.clone());
            for topic in kafka.refresh_topics(include_internal).await? {
                println!("  • {}", topic);
            }
        }
    }

    Ok(())
}
