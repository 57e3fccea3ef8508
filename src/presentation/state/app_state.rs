use std::sync::Arc;

use crate::application::services::{Collector, Dispatcher, Scorer};

/// Services built once at startup and shared by every invocation.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub collector: Arc<Collector>,
    pub scorer: Arc<Scorer>,
    /// Bucket assumed for wrapped upload events that omit one.
    pub default_bucket: String,
}
