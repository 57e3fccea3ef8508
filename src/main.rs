use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

use resume_scout::application::ports::NotificationTarget;
use resume_scout::application::services::{
    Collector, Dispatcher, DispatcherConfig, HarvestBudget, JobStore, Scorer,
};
use resume_scout::infrastructure::extraction::ExtractionEngineFactory;
use resume_scout::infrastructure::observability::{TracingConfig, init_tracing};
use resume_scout::infrastructure::storage::ObjectStorageFactory;
use resume_scout::presentation::config::NotificationSettings;
use resume_scout::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(TracingConfig::from_settings(
        environment.as_str(),
        &settings.logging,
    ));

    let storage = ObjectStorageFactory::create(&settings.storage)
        .context("Failed to initialise object storage")?;
    let engine = ExtractionEngineFactory::create(&settings.extraction).await;
    let job_store = Arc::new(JobStore::new(storage));

    let dispatcher = Dispatcher::new(
        Arc::clone(&job_store),
        Arc::clone(&engine),
        DispatcherConfig {
            bucket: settings.storage.bucket.clone(),
            upload_prefix: settings.storage.upload_prefix.clone(),
            accepted_extension: settings.storage.accepted_extension.clone(),
            notification: notification_target(&settings.notification),
        },
    );

    let budget = HarvestBudget {
        page_size: settings.harvest.page_size,
        max_pages_per_invocation: settings.harvest.max_pages_per_invocation,
        invocation_budget: Duration::from_secs(settings.harvest.invocation_budget_secs),
    };
    let collector = Collector::new(Arc::clone(&job_store), engine, budget);
    let scorer = Scorer::new(job_store);

    let state = AppState {
        dispatcher: Arc::new(dispatcher),
        collector: Arc::new(collector),
        scorer: Arc::new(scorer),
        default_bucket: settings.storage.bucket.clone(),
    };

    let router = create_router(state);

    let ip = settings
        .server
        .host
        .parse::<std::net::IpAddr>()
        .context("server.host must be an IP address")?;
    let addr = SocketAddr::from((ip, settings.server.port));
    tracing::info!(%addr, environment = %environment, "Listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn notification_target(settings: &NotificationSettings) -> Option<NotificationTarget> {
    match (&settings.topic_arn, &settings.role_arn) {
        (Some(topic_arn), Some(role_arn)) if !topic_arn.is_empty() && !role_arn.is_empty() => {
            Some(NotificationTarget {
                topic_arn: topic_arn.clone(),
                role_arn: role_arn.clone(),
            })
        }
        _ => {
            tracing::warn!("No completion notification channel configured");
            None
        }
    }
}
