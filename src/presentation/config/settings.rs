use config::{Config, ConfigError, Environment as EnvironmentSource, File};
use serde::Deserialize;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub extraction: ExtractionSettings,
    #[serde(default)]
    pub notification: NotificationSettings,
    #[serde(default)]
    pub harvest: HarvestSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Layers `appsettings.<env>` (optional) under `APP_` environment
    /// variables, e.g. `APP_STORAGE__BUCKET`.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let settings: Self = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("storage.provider", "local")?
            .set_default("storage.bucket", "")?
            .set_default("storage.local_path", "./data")?
            .set_default("storage.upload_prefix", "uploads/")?
            .set_default("storage.accepted_extension", ".pdf")?
            .set_default("extraction.provider", "textract")?
            .set_default("logging.level", "info,resume_scout=debug,tower_http=debug")?
            .set_default("logging.enable_json", false)?
            .add_source(
                File::with_name(&environment.settings_file()).required(false),
            )
            .add_source(
                EnvironmentSource::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.harvest.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderSetting {
    Local,
    S3,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub provider: StorageProviderSetting,
    pub bucket: String,
    pub local_path: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    pub upload_prefix: String,
    pub accepted_extension: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionProviderSetting {
    Textract,
    Scripted,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionSettings {
    pub provider: ExtractionProviderSetting,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub scripted_pages: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub topic_arn: Option<String>,
    #[serde(default)]
    pub role_arn: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HarvestSettings {
    #[serde(default = "default_page_size")]
    pub page_size: i32,
    #[serde(default = "default_max_pages")]
    pub max_pages_per_invocation: u32,
    #[serde(default = "default_budget_secs")]
    pub invocation_budget_secs: u64,
}

fn default_page_size() -> i32 {
    1000
}

fn default_max_pages() -> u32 {
    200
}

fn default_budget_secs() -> u64 {
    240
}

impl HarvestSettings {
    /// A zero budget would suspend every invocation before its first page.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size < 1 {
            return Err(ConfigError::Message(
                "harvest.page_size must be at least 1".to_string(),
            ));
        }
        if self.max_pages_per_invocation == 0 {
            return Err(ConfigError::Message(
                "harvest.max_pages_per_invocation must be at least 1".to_string(),
            ));
        }
        if self.invocation_budget_secs == 0 {
            return Err(ConfigError::Message(
                "harvest.invocation_budget_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages_per_invocation: default_max_pages(),
            invocation_budget_secs: default_budget_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}
