use std::sync::Arc;

use retrobot_core::config::AppConfig;
use retrobot_store::client::{HttpRecordStore, RecordStore};
use thiserror::Error;
use tracing::info;

use crate::sweep::{FollowUpNotifier, HttpFollowUpNotifier};
use crate::webhook::AppState;

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("http client construction failed: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Assemble the shared, read-only request state once at startup: one HTTP
/// client backing both the record store and the follow-up notifier, plus the
/// setup notice computed from whatever configuration is still missing.
/// Missing required settings do not abort startup; they switch every request
/// into the setup-instructions path instead.
pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let client = reqwest::Client::builder().build().map_err(BootstrapError::HttpClient)?;

    let setup_notice = setup_notice(&config);
    let store: Arc<dyn RecordStore> = Arc::new(HttpRecordStore::new(client.clone(), &config.store));
    let notifier: Arc<dyn FollowUpNotifier> = Arc::new(HttpFollowUpNotifier::new(client));

    info!(
        event_name = "system.bootstrap.ready",
        setup_complete = setup_notice.is_none(),
        "application bootstrap complete"
    );

    let state =
        AppState { slack_token: config.slack.token.clone(), setup_notice, store, notifier };
    Ok(Application { config, state })
}

fn setup_notice(config: &AppConfig) -> Option<String> {
    let missing = config.missing_settings();
    if missing.is_empty() {
        None
    } else {
        Some(format!(
            "Need to setup the following environment variables:\n{}",
            missing.join("\n")
        ))
    }
}
