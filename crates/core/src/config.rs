use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub whatsapp: WhatsAppConfig,
    pub branding: BrandingConfig,
    pub database: DatabaseConfig,
    pub registry: RegistryConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Directory served at `/public` (rendered documents, downloaded media).
    pub public_dir: PathBuf,
    /// External base URL used when composing document links for outbound
    /// messages. Falls back to the bind address when unset.
    pub public_base_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct WhatsAppConfig {
    pub verify_token: String,
    pub api_token: SecretString,
    pub phone_number_id: String,
    pub graph_base_url: String,
}

#[derive(Clone, Debug)]
pub struct BrandingConfig {
    pub company_name: String,
    pub logo_url: String,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Optional lookup endpoint; unset disables registry enrichment.
    pub lookup_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub verify_token: Option<String>,
    pub api_token: Option<String>,
    pub phone_number_id: Option<String>,
    pub log_level: Option<String>,
    pub public_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 3000,
                public_dir: PathBuf::from("public"),
                public_base_url: None,
            },
            whatsapp: WhatsAppConfig {
                verify_token: "change-me".to_string(),
                api_token: String::new().into(),
                phone_number_id: String::new(),
                graph_base_url: "https://graph.facebook.com/v20.0".to_string(),
            },
            branding: BrandingConfig {
                company_name: "TH Logistics".to_string(),
                logo_url: "https://placehold.co/600x200?text=TH+Logistics".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://freightbot.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            registry: RegistryConfig { lookup_url: None },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    whatsapp: Option<WhatsAppPatch>,
    branding: Option<BrandingPatch>,
    database: Option<DatabasePatch>,
    registry: Option<RegistryPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    public_dir: Option<PathBuf>,
    public_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WhatsAppPatch {
    verify_token: Option<String>,
    api_token: Option<String>,
    phone_number_id: Option<String>,
    graph_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BrandingPatch {
    company_name: Option<String>,
    logo_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RegistryPatch {
    lookup_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("freightbot.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(public_dir) = server.public_dir {
                self.server.public_dir = public_dir;
            }
            if let Some(public_base_url) = server.public_base_url {
                self.server.public_base_url = Some(public_base_url);
            }
        }
        if let Some(whatsapp) = patch.whatsapp {
            if let Some(verify_token) = whatsapp.verify_token {
                self.whatsapp.verify_token = verify_token;
            }
            if let Some(api_token) = whatsapp.api_token {
                self.whatsapp.api_token = api_token.into();
            }
            if let Some(phone_number_id) = whatsapp.phone_number_id {
                self.whatsapp.phone_number_id = phone_number_id;
            }
            if let Some(graph_base_url) = whatsapp.graph_base_url {
                self.whatsapp.graph_base_url = graph_base_url;
            }
        }
        if let Some(branding) = patch.branding {
            if let Some(company_name) = branding.company_name {
                self.branding.company_name = company_name;
            }
            if let Some(logo_url) = branding.logo_url {
                self.branding.logo_url = logo_url;
            }
        }
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }
        if let Some(registry) = patch.registry {
            if let Some(lookup_url) = registry.lookup_url {
                self.registry.lookup_url = Some(lookup_url);
            }
        }
        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = env::var("FREIGHTBOT_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Ok(value) = env::var("FREIGHTBOT_PORT") {
            self.server.port = value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                key: "FREIGHTBOT_PORT".to_string(),
                value,
            })?;
        }
        if let Ok(value) = env::var("FREIGHTBOT_PUBLIC_BASE_URL") {
            self.server.public_base_url = Some(value);
        }
        if let Ok(value) = env::var("FREIGHTBOT_VERIFY_TOKEN") {
            self.whatsapp.verify_token = value;
        }
        if let Ok(value) = env::var("FREIGHTBOT_WHATSAPP_TOKEN") {
            self.whatsapp.api_token = value.into();
        }
        if let Ok(value) = env::var("FREIGHTBOT_PHONE_NUMBER_ID") {
            self.whatsapp.phone_number_id = value;
        }
        if let Ok(value) = env::var("FREIGHTBOT_COMPANY_NAME") {
            self.branding.company_name = value;
        }
        if let Ok(value) = env::var("FREIGHTBOT_LOGO_URL") {
            self.branding.logo_url = value;
        }
        if let Ok(value) = env::var("FREIGHTBOT_DATABASE_URL") {
            self.database.url = value;
        }
        if let Ok(value) = env::var("FREIGHTBOT_REGISTRY_URL") {
            self.registry.lookup_url = Some(value);
        }
        if let Ok(value) = env::var("FREIGHTBOT_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Ok(value) = env::var("FREIGHTBOT_LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(verify_token) = overrides.verify_token {
            self.whatsapp.verify_token = verify_token;
        }
        if let Some(api_token) = overrides.api_token {
            self.whatsapp.api_token = api_token.into();
        }
        if let Some(phone_number_id) = overrides.phone_number_id {
            self.whatsapp.phone_number_id = phone_number_id;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(public_dir) = overrides.public_dir {
            self.server.public_dir = public_dir;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.whatsapp.verify_token.trim().is_empty() {
            return Err(ConfigError::Validation(
                "whatsapp.verify_token must not be empty".to_string(),
            ));
        }
        if self.server.bind_address.trim().is_empty() {
            return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
        }
        if let Some(base_url) = &self.server.public_base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "server.public_base_url must be an http(s) url, got `{base_url}`"
                )));
            }
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn resolve_config_path(requested: Option<&Path>) -> Option<PathBuf> {
    match requested {
        Some(path) => path.exists().then(|| path.to_path_buf()),
        None => {
            let default = PathBuf::from("freightbot.toml");
            default.exists().then_some(default)
        }
    }
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}
