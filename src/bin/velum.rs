//! Command line tools for velum applications.
//!
//! - `check-config` loads and validates a YAML config file
//! - `validate` runs a rule set against field values, without a server

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use velum::config::load_config;
use velum::form::{Form, FormFile, FormSource, MultipartForm};
use velum::observability::logging;
use velum::validation::{Overrides, Rules, Schema, Validated, Vocabulary};

#[derive(Parser)]
#[command(name = "velum")]
#[command(about = "Config and form validation tools for velum applications", long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a config file and print a summary
    CheckConfig {
        /// Path to the YAML config file
        file: PathBuf,
    },
    /// Validate field values against a YAML rule set
    Validate {
        /// YAML map of field name to rules
        #[arg(short, long)]
        rules: PathBuf,

        /// YAML map of field name to rule name to message
        #[arg(short, long)]
        overrides: Option<PathBuf>,

        /// Use the multipart vocabulary; `field=@path` attaches a file
        #[arg(short, long)]
        multipart: bool,

        /// Field values as `field=value`
        fields: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match cli.command {
        Commands::CheckConfig { file } => {
            let config = load_config(&file)?;
            tracing::info!(path = %file.display(), "Configuration loaded");

            println!("port:           {}", config.port);
            if config.serves_static() {
                println!(
                    "static:         {} -> {}",
                    config.static_files.path, config.static_files.dir
                );
            }
            println!("body limit:     {} bytes", config.limits.body_bytes);
            println!("request timeout: {}s", config.limits.request_timeout_secs);
            println!(
                "sessions:       {}",
                if config.keys.sessions.is_empty() { "disabled" } else { "enabled" }
            );
            if config.observability.metrics_enabled {
                println!("metrics:        {}", config.observability.metrics_address);
            }
        }
        Commands::Validate {
            rules,
            overrides,
            multipart,
            fields,
        } => {
            let rules: Rules = serde_yaml::from_str(&std::fs::read_to_string(&rules)?)?;
            let overrides: Overrides = match overrides {
                Some(path) => serde_yaml::from_str(&std::fs::read_to_string(path)?)?,
                None => Overrides::new(),
            };

            let pairs = fields
                .iter()
                .map(|field| {
                    field
                        .split_once('=')
                        .ok_or_else(|| format!("`{}` is not of the form field=value", field))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let source: Box<dyn FormSource> = if multipart {
                let mut form = MultipartForm::new();
                for (key, value) in pairs {
                    form = match value.strip_prefix('@') {
                        Some(path) => {
                            let path = PathBuf::from(path);
                            let filename = path.file_name().map(|f| f.to_string_lossy().into_owned());
                            let content = std::fs::read(&path)?;
                            form.with_file(key, FormFile::new(filename, None, content))
                        }
                        None => form.with_value(key, value),
                    };
                }
                Box::new(form)
            } else {
                Box::new(Form::from_pairs(pairs))
            };

            let vocabulary = if multipart { Vocabulary::Multipart } else { Vocabulary::Form };
            let outcome = Schema::compile(&rules, vocabulary)?
                .with_overrides(overrides)
                .validate(source.as_ref())?;

            match outcome {
                Validated::Valid(data) => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "valid": true, "data": data }))?);
                }
                Validated::Invalid(errors) => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "valid": false, "errors": errors }))?);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
