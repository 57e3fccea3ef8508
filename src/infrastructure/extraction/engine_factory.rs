use std::sync::Arc;

use crate::application::ports::ExtractionEngine;
use crate::presentation::config::{ExtractionProviderSetting, ExtractionSettings};

use super::scripted_engine::ScriptedExtractionEngine;
use super::textract_engine::TextractEngine;

pub struct ExtractionEngineFactory;

impl ExtractionEngineFactory {
    pub async fn create(settings: &ExtractionSettings) -> Arc<dyn ExtractionEngine> {
        match settings.provider {
            ExtractionProviderSetting::Textract => {
                tracing::info!(region = ?settings.region, "Loading Textract extraction engine");
                Arc::new(
                    TextractEngine::from_env(settings.region.clone(), settings.endpoint.clone())
                        .await,
                )
            }
            ExtractionProviderSetting::Scripted => {
                tracing::warn!(
                    pages = settings.scripted_pages.len(),
                    "Using scripted extraction engine; documents are not actually read"
                );
                Arc::new(ScriptedExtractionEngine::new(settings.scripted_pages.clone()))
            }
        }
    }
}
