use serde::Serialize;

use crate::attachments::Attachment;

/// Reply visibility. Everything is broadcast to the channel except help
/// text, which only the invoking user should see.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    InChannel,
    Ephemeral,
}

/// Wire payload returned to the calling platform, both as the immediate
/// webhook reply and as the body of asynchronous follow-up posts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlackResponse {
    pub response_type: ResponseType,
    pub text: String,
    pub attachments: Vec<Attachment>,
}

impl SlackResponse {
    pub fn broadcast(text: impl Into<String>) -> Self {
        Self { response_type: ResponseType::InChannel, text: text.into(), attachments: Vec::new() }
    }

    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self { response_type: ResponseType::Ephemeral, text: text.into(), attachments: Vec::new() }
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }
}
