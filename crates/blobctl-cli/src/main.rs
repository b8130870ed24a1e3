use anyhow::Result;
use blobctl_cloud::{AzureBlobDriver, CloudError, Driver};
use blobctl_lib::{env_file, Error as SettingsError, LogLevel, Settings, SECRET_PLACEHOLDER};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "blobctl")]
#[command(author, version, about = "A command-line tool for pulling, pushing and listing blobs in cloud object storage", long_about = None)]
struct Cli {
    /// Settings file to read and write (defaults to ~/.env)
    #[arg(long, global = true, env = "BLOBCTL_ENV_FILE")]
    env_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a blob into the output folder
    Pull {
        /// Remote blob name; names with '/' produce nested directories
        remote_name: String,
    },

    /// Upload a local file to the container
    Push {
        /// Local file to upload
        local_path: PathBuf,

        /// Remote name for the blob (defaults to the file's base name)
        remote_name: Option<String>,
    },

    /// List blobs in the container
    List {
        /// Only list names containing this substring
        filter: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Commands for settings management
    #[command(subcommand)]
    Settings(SettingsCommands),
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Set a setting value
    Set {
        /// Setting name
        name: String,
        /// New value
        value: String,
    },

    /// Show the current values
    Show,

    /// Unset a setting value
    Unset {
        /// Setting name
        #[arg(required_unless_present = "all")]
        name: Option<String>,

        /// Restore all the settings by deleting the settings file
        #[arg(short, long)]
        all: bool,
    },
}

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(level.as_filter_directive())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    match run() {
        Ok(_) => process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(map_error_to_exit_code(&e));
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let env_path = cli
        .env_file
        .clone()
        .unwrap_or_else(Settings::default_env_path);
    let settings = Settings::load(&env_path)?;

    setup_logging(cli.verbose, cli.quiet, settings.log_level());

    match cli.command {
        Commands::Pull { remote_name } => {
            let driver = build_driver(&settings)?;
            settings.ensure_output_folder()?;

            info!("Pulling '{}' from '{}'", remote_name, settings.container());
            let dst = driver.pull(&remote_name)?;
            println!("{}", dst.display());
        }

        Commands::Push {
            local_path,
            remote_name,
        } => {
            let driver = build_driver(&settings)?;

            info!("Pushing {:?} to '{}'", local_path, settings.container());
            let name = driver.push(&local_path, remote_name.as_deref())?;
            println!("{}", name);
        }

        Commands::List { filter, json } => {
            let driver = build_driver(&settings)?;

            let names = driver.list_blobs(filter.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else {
                for name in names {
                    println!("{}", name);
                }
            }
        }

        Commands::Settings(command) => run_settings(command, &settings, &env_path)?,
    }

    Ok(())
}

fn run_settings(command: SettingsCommands, settings: &Settings, env_path: &Path) -> Result<()> {
    match command {
        SettingsCommands::Set { name, value } => {
            Settings::validate_field(&name, &value)?;
            env_file::set_key(env_path, &name, &value)?;
            println!("Setting '{}' successfully updated!", name);
        }

        SettingsCommands::Show => {
            for name in Settings::field_names() {
                let current = settings.get_value(name)?;
                let rendered = if Settings::is_secret(name) && !current.is_empty() {
                    SECRET_PLACEHOLDER.to_string()
                } else {
                    current
                };
                println!("{}: {} ({})", name, rendered, Settings::default_value(name)?);
            }
        }

        SettingsCommands::Unset { name, all } => {
            if all {
                if env_path.exists() {
                    fs::remove_file(env_path)?;
                    println!("Settings file ({}) removed.", env_path.display());
                } else {
                    println!("No settings file at {}.", env_path.display());
                }
            } else if let Some(name) = name {
                if !Settings::is_field(&name) {
                    return Err(SettingsError::UnknownSetting(name).into());
                }
                env_file::unset_key(env_path, &name)?;
                println!("Setting '{}' unset successfully.", name);
            }
        }
    }

    Ok(())
}

fn build_driver(settings: &Settings) -> Result<AzureBlobDriver> {
    let connection_string = settings.connection_string()?;
    let driver = AzureBlobDriver::new(
        &connection_string,
        settings.container(),
        settings.output_folder(),
    )?;
    Ok(driver)
}

/// Map errors to exit codes:
/// - 0: success
/// - 2: validation failure, unknown setting, or missing mandatory configuration
/// - 1: everything else (transport errors surface the client's message as-is)
fn map_error_to_exit_code(err: &anyhow::Error) -> i32 {
    if let Some(settings_err) = err.downcast_ref::<SettingsError>() {
        return match settings_err {
            SettingsError::Validation(_)
            | SettingsError::UnknownSetting(_)
            | SettingsError::MissingCredential(_) => 2,
            _ => 1,
        };
    }

    if let Some(cloud_err) = err.downcast_ref::<CloudError>() {
        return match cloud_err {
            CloudError::Configuration(_)
            | CloudError::InvalidConnectionString(_)
            | CloudError::InvalidName(_) => 2,
            _ => 1,
        };
    }

    1
}
