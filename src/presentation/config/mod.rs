mod environment;
mod settings;

pub use environment::{ENVIRONMENT_VAR, Environment};
pub use settings::{
    ExtractionProviderSetting, ExtractionSettings, HarvestSettings, LoggingSettings,
    NotificationSettings, ServerSettings, Settings, StorageProviderSetting, StorageSettings,
};
