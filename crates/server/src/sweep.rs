use std::sync::Arc;

use async_trait::async_trait;
use retrobot_core::domain;
use retrobot_slack::attachments::item_attachments;
use retrobot_slack::response::SlackResponse;
use retrobot_store::client::{RecordStore, StoreError, CURRENT_VIEW, ITEMS_TABLE};
use retrobot_store::records::ReviewPatch;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("follow-up request failed: {0}")]
    Request(String),
    #[error("follow-up endpoint returned {0}")]
    UnexpectedStatus(reqwest::StatusCode),
}

/// Delivery seam for the out-of-band result of the sweep. The request path
/// never observes this; the sweep owns its own notification call.
#[async_trait]
pub trait FollowUpNotifier: Send + Sync {
    async fn post(&self, response_url: &str, response: &SlackResponse) -> Result<(), NotifyError>;
}

pub struct HttpFollowUpNotifier {
    client: reqwest::Client,
}

impl HttpFollowUpNotifier {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FollowUpNotifier for HttpFollowUpNotifier {
    async fn post(&self, response_url: &str, response: &SlackResponse) -> Result<(), NotifyError> {
        let reply = self
            .client
            .post(response_url)
            .json(response)
            .send()
            .await
            .map_err(|error| NotifyError::Request(error.to_string()))?;

        if !reply.status().is_success() {
            return Err(NotifyError::UnexpectedStatus(reply.status()));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Fire-and-forget entry point. The caller replies to the user immediately;
/// the spawned task reports its outcome to `response_url` on its own.
pub fn spawn(
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn FollowUpNotifier>,
    response_url: String,
) {
    tokio::spawn(async move {
        if let Err(sweep_error) = run(store.as_ref(), notifier.as_ref(), &response_url).await {
            error!(
                event_name = "retro.sweep.failed",
                error = %sweep_error,
                "background sweep aborted"
            );
        }
    });
}

/// Mark every item in the current view as reviewed, then tell the channel.
///
/// Updates are independent: one failing does not block the rest. The closing
/// notification is built from a re-read of the view rather than assuming
/// emptiness, so items that slipped in (or failed to update) still show up.
pub async fn run(
    store: &dyn RecordStore,
    notifier: &dyn FollowUpNotifier,
    response_url: &str,
) -> Result<(), SweepError> {
    let items = store.list(ITEMS_TABLE, CURRENT_VIEW, None).await?;
    if items.is_empty() {
        notifier
            .post(
                response_url,
                &SlackResponse::broadcast("All retrospective items were already marked as reviewed!"),
            )
            .await?;
        return Ok(());
    }

    let reviewed_at = domain::utc_timestamp_millis();
    let mut failed_updates = 0usize;
    for item in &items {
        let patch = ReviewPatch { reviewed_at: reviewed_at.clone() };
        if let Err(update_error) = store.update(ITEMS_TABLE, &item.id, patch).await {
            failed_updates += 1;
            warn!(
                event_name = "retro.sweep.update_failed",
                record_id = %item.id,
                error = %update_error,
                "item could not be marked as reviewed"
            );
        }
    }

    let remaining = store.list(ITEMS_TABLE, CURRENT_VIEW, None).await?;
    let remaining_items: Vec<_> =
        remaining.iter().map(|record| record.fields.to_domain()).collect();
    let attachments = item_attachments(&remaining_items);

    let mut text = String::from("All retrospective items marked as reviewed!");
    if !attachments.is_empty() {
        text.push_str("\nHere are the remaining 'try' items to complete:");
    }
    if failed_updates > 0 {
        text.push_str(&format!(" ({failed_updates} items could not be updated)"));
    }

    info!(
        event_name = "retro.sweep.completed",
        updated = items.len() - failed_updates,
        failed = failed_updates,
        "sweep finished"
    );

    notifier
        .post(response_url, &SlackResponse::broadcast(text).with_attachments(attachments))
        .await?;
    Ok(())
}
