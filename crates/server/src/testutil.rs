use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use retrobot_slack::response::SlackResponse;
use retrobot_store::client::{RecordStore, StoreError};
use retrobot_store::records::{ItemFields, ItemRecord, ReviewPatch};

use crate::sweep::{FollowUpNotifier, NotifyError};

pub fn record(id: &str, category: &str, object: &str) -> ItemRecord {
    ItemRecord {
        id: id.to_owned(),
        fields: ItemFields {
            category: category.to_owned(),
            object: object.to_owned(),
            creator: "alice".to_owned(),
            created_at: Some("2026-08-05T10:00:00.000Z".to_owned()),
            reviewed_at: None,
        },
    }
}

/// Scripted stand-in for the record store: queued read/create results plus a
/// call log. Reads default to an empty view; creates default to echoing the
/// submitted fields back under a fresh id.
#[derive(Default)]
pub struct ScriptedStore {
    pub state: Mutex<ScriptedStoreState>,
}

#[derive(Default)]
pub struct ScriptedStoreState {
    pub list_results: VecDeque<Result<Vec<ItemRecord>, StoreError>>,
    pub create_results: VecDeque<Result<Option<ItemRecord>, StoreError>>,
    pub failing_updates: Vec<String>,
    pub list_filters: Vec<Option<String>>,
    pub created: Vec<ItemFields>,
    pub updated: Vec<(String, String)>,
}

impl ScriptedStore {
    pub fn push_list(&self, records: Vec<ItemRecord>) {
        self.state.lock().expect("lock").list_results.push_back(Ok(records));
    }

    pub fn push_create(&self, result: Result<Option<ItemRecord>, StoreError>) {
        self.state.lock().expect("lock").create_results.push_back(result);
    }

    pub fn fail_update(&self, record_id: &str) {
        self.state.lock().expect("lock").failing_updates.push(record_id.to_owned());
    }
}

#[async_trait]
impl RecordStore for ScriptedStore {
    async fn list(
        &self,
        _table: &str,
        _view: &str,
        filter: Option<&str>,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        let mut state = self.state.lock().expect("lock");
        state.list_filters.push(filter.map(str::to_owned));
        state.list_results.pop_front().unwrap_or(Ok(Vec::new()))
    }

    async fn create(
        &self,
        _table: &str,
        fields: ItemFields,
    ) -> Result<Option<ItemRecord>, StoreError> {
        let mut state = self.state.lock().expect("lock");
        state.created.push(fields.clone());
        state
            .create_results
            .pop_front()
            .unwrap_or(Ok(Some(ItemRecord { id: "rec-created".to_owned(), fields })))
    }

    async fn update(
        &self,
        _table: &str,
        record_id: &str,
        patch: ReviewPatch,
    ) -> Result<ItemRecord, StoreError> {
        let mut state = self.state.lock().expect("lock");
        state.updated.push((record_id.to_owned(), patch.reviewed_at.clone()));

        if state.failing_updates.iter().any(|id| id == record_id) {
            return Err(StoreError::UnexpectedStatus {
                operation: "update",
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            });
        }

        Ok(ItemRecord {
            id: record_id.to_owned(),
            fields: ItemFields { reviewed_at: Some(patch.reviewed_at), ..ItemFields::default() },
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub posts: Mutex<Vec<(String, SlackResponse)>>,
}

#[async_trait]
impl FollowUpNotifier for RecordingNotifier {
    async fn post(&self, response_url: &str, response: &SlackResponse) -> Result<(), NotifyError> {
        self.posts.lock().expect("lock").push((response_url.to_owned(), response.clone()));
        Ok(())
    }
}
