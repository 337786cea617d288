use std::sync::Arc;

use async_trait::async_trait;
use retrobot_core::domain::{self, Category, BOT_NAME};
use retrobot_slack::attachments::item_attachments;
use retrobot_slack::commands::{CommandRouteError, RetroCommandService};
use retrobot_slack::response::SlackResponse;
use retrobot_store::client::{
    category_and_object_filter, RecordStore, StoreError, CURRENT_VIEW, ITEMS_TABLE,
};
use retrobot_store::records::ItemFields;
use tracing::info;

use crate::sweep;

/// Command behaviors backed by the record store. One instance serves every
/// request; it owns nothing but shared handles.
pub struct RetroService {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn sweep::FollowUpNotifier>,
}

impl RetroService {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn sweep::FollowUpNotifier>) -> Self {
        Self { store, notifier }
    }
}

pub fn store_unavailable_message() -> String {
    format!("Sorry, but *{BOT_NAME}* couldn't reach the retrospective store.")
}

fn service_error(error: StoreError) -> CommandRouteError {
    CommandRouteError::Service(error.to_string())
}

#[async_trait]
impl RetroCommandService for RetroService {
    async fn add_item(
        &self,
        category: Category,
        object: String,
        creator: &str,
    ) -> Result<SlackResponse, CommandRouteError> {
        // Item text colliding with a command keyword would be unreachable
        // through the parser later, so it never gets stored.
        if domain::is_reserved_term(&object) {
            return Ok(SlackResponse::broadcast(format!(
                "Sorry, but *{BOT_NAME}* can't save *{object}* because it's a reserved term."
            )));
        }

        let object = domain::capitalize_object(&object);
        let filter = category_and_object_filter(category.as_str(), &object);
        let existing =
            self.store.list(ITEMS_TABLE, CURRENT_VIEW, Some(&filter)).await.map_err(service_error)?;
        if !existing.is_empty() {
            return Ok(SlackResponse::broadcast(
                "This retrospective item has already been added!",
            ));
        }

        let fields = ItemFields {
            category: category.as_str().to_owned(),
            object,
            creator: creator.to_owned(),
            created_at: Some(domain::utc_timestamp_millis()),
            reviewed_at: None,
        };
        let created = self.store.create(ITEMS_TABLE, fields).await.map_err(service_error)?;
        let Some(record) = created else {
            return Ok(SlackResponse::broadcast(format!(
                "Sorry, but *{BOT_NAME}* was unable to save the retrospective item."
            )));
        };

        info!(
            event_name = "retro.item.created",
            category = category.as_str(),
            creator,
            record_id = %record.id,
            "retrospective item saved"
        );

        let attachments = item_attachments(&[record.fields.to_domain()]);
        Ok(SlackResponse::broadcast("New retrospective item:").with_attachments(attachments))
    }

    async fn list_items(&self) -> Result<SlackResponse, CommandRouteError> {
        let records =
            self.store.list(ITEMS_TABLE, CURRENT_VIEW, None).await.map_err(service_error)?;
        if records.is_empty() {
            return Ok(SlackResponse::broadcast("No retrospective items yet."));
        }

        let items: Vec<_> = records.iter().map(|record| record.fields.to_domain()).collect();
        Ok(SlackResponse::broadcast("Retrospective items:")
            .with_attachments(item_attachments(&items)))
    }

    async fn start_cycle(&self, response_url: &str) -> Result<SlackResponse, CommandRouteError> {
        sweep::spawn(self.store.clone(), self.notifier.clone(), response_url.to_owned());
        Ok(SlackResponse::broadcast("Marking all current retrospective items as reviewed..."))
    }
}
