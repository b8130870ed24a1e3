//! Settings record for blobctl.
//!
//! Settings are persisted as key=value lines in an env file (default
//! `~/.env`), overridden at load time by process environment variables of the
//! same name. The value is constructed once in `main` and passed to whoever
//! needs it; there is no global singleton.

use crate::{env_file, Error, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Log verbosity levels, mirroring the persisted `LOG_LEVEL` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// All accepted setting values, in severity order.
    pub const VARIANTS: [&'static str; 6] =
        ["TRACE", "DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// The equivalent `tracing` env-filter directive.
    pub fn as_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            other => Err(Error::Validation(format!(
                "'{}' is not a valid LOG_LEVEL (expected one of {})",
                other,
                LogLevel::VARIANTS.join(", ")
            ))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for one settings field.
struct Field {
    name: &'static str,
    default: &'static str,
    secret: bool,
}

const FIELDS: [Field; 6] = [
    Field {
        name: "ACCOUNT_NAME",
        default: "",
        secret: false,
    },
    Field {
        name: "ACCOUNT_KEY",
        default: "",
        secret: true,
    },
    Field {
        name: "AZURE_BLOB_CONNECTION_STRING",
        default: "",
        secret: true,
    },
    Field {
        name: "AZURE_CONTAINER",
        default: "",
        secret: false,
    },
    Field {
        name: "OUTPUT_FOLDER",
        default: "~/output",
        secret: false,
    },
    Field {
        name: "LOG_LEVEL",
        default: "WARNING",
        secret: false,
    },
];

/// Placeholder used wherever a secret value is rendered.
pub const SECRET_PLACEHOLDER: &str = "**********";

/// The loaded, validated configuration record.
#[derive(Clone)]
pub struct Settings {
    account_name: String,
    account_key: String,
    connection_string: String,
    container: String,
    output_folder: String,
    log_level: LogLevel,
    env_path: PathBuf,
}

impl Settings {
    /// The default persisted settings location: `~/.env`.
    pub fn default_env_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".env")
    }

    /// Load settings from the env file at `env_path`, then apply process
    /// environment overrides (environment wins over file). Unknown keys in
    /// the file are ignored.
    pub fn load(env_path: impl Into<PathBuf>) -> Result<Self> {
        let env_path = env_path.into();
        let mut settings = Self {
            account_name: String::new(),
            account_key: String::new(),
            connection_string: String::new(),
            container: String::new(),
            output_folder: "~/output".to_string(),
            log_level: LogLevel::default(),
            env_path: env_path.clone(),
        };

        for (name, value) in env_file::read(&env_path)? {
            if Self::is_field(&name) {
                settings.set_value(&name, &value)?;
            }
        }

        for field in &FIELDS {
            if let Ok(value) = std::env::var(field.name) {
                settings.set_value(field.name, &value)?;
            }
        }

        debug!("loaded settings from {:?}", settings.env_path);
        Ok(settings)
    }

    /// Names of all settings fields, in display order.
    pub fn field_names() -> impl Iterator<Item = &'static str> {
        FIELDS.iter().map(|f| f.name)
    }

    /// Whether `name` is a known settings field.
    pub fn is_field(name: &str) -> bool {
        FIELDS.iter().any(|f| f.name == name)
    }

    /// Whether the field holds a secret that must be redacted when shown.
    pub fn is_secret(name: &str) -> bool {
        FIELDS.iter().any(|f| f.name == name && f.secret)
    }

    /// Built-in default for the field, as it would appear in the env file.
    pub fn default_value(name: &str) -> Result<&'static str> {
        FIELDS
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.default)
            .ok_or_else(|| Error::UnknownSetting(name.to_string()))
    }

    /// Validate one proposed value against the field's declared type without
    /// mutating anything. Used by `settings set` before writing.
    pub fn validate_field(name: &str, value: &str) -> Result<()> {
        match name {
            "LOG_LEVEL" => {
                value.parse::<LogLevel>()?;
            }
            "OUTPUT_FOLDER" => {
                if value.trim().is_empty() {
                    return Err(Error::Validation(
                        "OUTPUT_FOLDER must not be empty".to_string(),
                    ));
                }
            }
            _ if Self::is_field(name) => {}
            _ => return Err(Error::UnknownSetting(name.to_string())),
        }
        Ok(())
    }

    /// Apply one value to the in-memory record. Explicit calls take
    /// precedence over anything read at load time.
    pub fn set_value(&mut self, name: &str, value: &str) -> Result<()> {
        Self::validate_field(name, value)?;
        match name {
            "ACCOUNT_NAME" => self.account_name = value.to_string(),
            "ACCOUNT_KEY" => self.account_key = value.to_string(),
            "AZURE_BLOB_CONNECTION_STRING" => self.connection_string = value.to_string(),
            "AZURE_CONTAINER" => self.container = value.to_string(),
            "OUTPUT_FOLDER" => self.output_folder = value.to_string(),
            "LOG_LEVEL" => self.log_level = value.parse()?,
            _ => return Err(Error::UnknownSetting(name.to_string())),
        }
        Ok(())
    }

    /// Current value of a field, rendered as it would appear in the env
    /// file. Secrets are returned raw; callers redact for display.
    pub fn get_value(&self, name: &str) -> Result<String> {
        match name {
            "ACCOUNT_NAME" => Ok(self.account_name.clone()),
            "ACCOUNT_KEY" => Ok(self.account_key.clone()),
            "AZURE_BLOB_CONNECTION_STRING" => Ok(self.connection_string.clone()),
            "AZURE_CONTAINER" => Ok(self.container.clone()),
            "OUTPUT_FOLDER" => Ok(self.output_folder.clone()),
            "LOG_LEVEL" => Ok(self.log_level.to_string()),
            _ => Err(Error::UnknownSetting(name.to_string())),
        }
    }

    /// Path of the env file this record was loaded from.
    pub fn env_path(&self) -> &Path {
        &self.env_path
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// The output folder as an expanded path. Pure accessor: reading it
    /// never touches the filesystem, see [`Settings::ensure_output_folder`].
    pub fn output_folder(&self) -> PathBuf {
        expand_tilde(&self.output_folder)
    }

    /// Create the output folder (and parents) if it does not exist and
    /// return the expanded path. Idempotent; called once before any pull.
    pub fn ensure_output_folder(&self) -> Result<PathBuf> {
        let folder = self.output_folder();
        if !folder.exists() {
            fs::create_dir_all(&folder)?;
        }
        Ok(folder)
    }

    /// The connection string for the storage account.
    ///
    /// An explicitly configured `AZURE_BLOB_CONNECTION_STRING` is returned
    /// verbatim; otherwise the string is synthesized from `ACCOUNT_NAME` and
    /// `ACCOUNT_KEY`. The result is a secret and must not be logged.
    pub fn connection_string(&self) -> Result<String> {
        if !self.connection_string.is_empty() {
            return Ok(self.connection_string.clone());
        }

        if self.account_name.is_empty() || self.account_key.is_empty() {
            return Err(Error::MissingCredential(
                "both ACCOUNT_NAME and ACCOUNT_KEY (or AZURE_BLOB_CONNECTION_STRING) \
                 must be set to connect to the storage account"
                    .to_string(),
            ));
        }

        let account = &self.account_name;
        Ok(format!(
            "DefaultEndpointsProtocol=https;\
             AccountName={account};\
             AccountKey={key};\
             BlobEndpoint=https://{account}.blob.core.windows.net/;\
             QueueEndpoint=https://{account}.queue.core.windows.net/;\
             TableEndpoint=https://{account}.table.core.windows.net/;\
             FileEndpoint=https://{account}.file.core.windows.net/",
            account = account,
            key = self.account_key,
        ))
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |s: &str| {
            if s.is_empty() {
                ""
            } else {
                SECRET_PLACEHOLDER
            }
        };
        f.debug_struct("Settings")
            .field("account_name", &self.account_name)
            .field("account_key", &redact(&self.account_key))
            .field("connection_string", &redact(&self.connection_string))
            .field("container", &self.container)
            .field("output_folder", &self.output_folder)
            .field("log_level", &self.log_level)
            .field("env_path", &self.env_path)
            .finish()
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
