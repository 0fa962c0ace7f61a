pub mod analytics; // Age, BMI and disease pie charts
pub mod api; // HTTP surface: pages, forms, downloads, search
pub mod config;
pub mod consultation; // Diagnosis → prescription → payment
pub mod core_state;
pub mod dashboard;
pub mod db;
pub mod models;
pub mod notifier; // SMTP delivery of patient reports
pub mod registry; // Patient search
pub mod report; // PDF documents

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::api::ServerError;
use crate::config::AppConfig;
use crate::core_state::{CoreError, CoreState};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Initialize tracing. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Open the clinic database and serve HTTP until Ctrl-C.
pub async fn run(config: AppConfig) -> Result<(), RunError> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    tracing::info!(data_dir = %config.data_dir.display(), "Using data directory");
    if !config.mail.is_configured() {
        tracing::warn!("Mail relay not configured; e-mailing reports is disabled");
    }

    let bind_addr = config.bind_addr;
    let core = Arc::new(CoreState::open(config)?);
    api::serve(core, bind_addr).await?;

    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
