use async_trait::async_trait;
use retrobot_core::domain::Category;
use thiserror::Error;

use crate::response::SlackResponse;

/// Fields of an inbound slash-command notification, already authenticated by
/// the webhook layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashCommandPayload {
    /// Invoking slash alias as sent by the platform, e.g. `/retro` or `/good`.
    pub command: String,
    pub text: String,
    pub user_name: String,
    pub response_url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandAction {
    Category(Category),
    New,
    List,
    Help,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub action: CommandAction,
    pub params: String,
}

/// Extract the action and free-text parameter from a slash invocation.
///
/// When the alias itself is a category keyword (`/good well done`), the alias
/// is the action and the whole text is the parameter. Otherwise the first
/// token of the text (case-folded) is the action and the rest is the
/// parameter. Anything unrecognized, including empty input, falls back to
/// help rather than an error.
pub fn parse_command(alias: &str, text: &str) -> Command {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let alias_keyword = alias.trim_start_matches('/').to_ascii_lowercase();
    if let Some(category) = Category::parse(&alias_keyword) {
        return Command { action: CommandAction::Category(category), params: collapsed };
    }

    let mut parts = collapsed.split(' ');
    let action_token = parts.next().unwrap_or_default().to_ascii_lowercase();
    let params = parts.collect::<Vec<_>>().join(" ");

    if let Some(category) = Category::from_stored(&action_token) {
        return Command { action: CommandAction::Category(category), params };
    }

    match action_token.as_str() {
        "new" => Command { action: CommandAction::New, params },
        "list" => Command { action: CommandAction::List, params },
        "help" | "?" => Command { action: CommandAction::Help, params },
        _ => Command { action: CommandAction::Help, params: String::new() },
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandRouteError {
    #[error("command service failed: {0}")]
    Service(String),
}

/// Behavior behind each recognized command. The server crate implements this
/// against the record store; tests swap in recorders.
#[async_trait]
pub trait RetroCommandService: Send + Sync {
    async fn add_item(
        &self,
        category: Category,
        object: String,
        creator: &str,
    ) -> Result<SlackResponse, CommandRouteError>;

    async fn list_items(&self) -> Result<SlackResponse, CommandRouteError>;

    /// Kick off the review sweep in the background and acknowledge
    /// immediately; the sweep reports its own outcome to `response_url`.
    async fn start_cycle(&self, response_url: &str) -> Result<SlackResponse, CommandRouteError>;
}

pub struct CommandRouter<S> {
    service: S,
}

impl<S> CommandRouter<S>
where
    S: RetroCommandService,
{
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub async fn route(
        &self,
        payload: &SlashCommandPayload,
    ) -> Result<SlackResponse, CommandRouteError> {
        let command = parse_command(&payload.command, &payload.text);
        match command.action {
            CommandAction::Category(category) => {
                self.service.add_item(category, command.params, &payload.user_name).await
            }
            CommandAction::List => self.service.list_items().await,
            CommandAction::New if !command.params.is_empty() => {
                Ok(SlackResponse::broadcast(clarify_message(&payload.command, &command.params)))
            }
            CommandAction::New => self.service.start_cycle(&payload.response_url).await,
            CommandAction::Help => Ok(help_message(&payload.command)),
        }
    }
}

/// Usage text, visible only to the invoking user.
pub fn help_message(command: &str) -> SlackResponse {
    SlackResponse::ephemeral(
        [
            format!(r#"*{command} good <item>* to save an item in the "good" list"#),
            format!(r#"*{command} bad <item>* to save an item in the "bad" list"#),
            format!(r#"*{command} try <item>* to save an item in the "try" list"#),
            format!("*{command} list* to see the different lists saved for the current sprint"),
            format!("*{command} new* to start a fresh list for the new sprint"),
            format!("*{command} help* to see this message"),
        ]
        .join("\n"),
    )
}

fn clarify_message(command: &str, params: &str) -> String {
    format!(r#"Oops, did you mean "{command} good {params}"?"#)
}

#[derive(Default)]
pub struct NoopRetroCommandService;

#[async_trait]
impl RetroCommandService for NoopRetroCommandService {
    async fn add_item(
        &self,
        category: Category,
        object: String,
        _creator: &str,
    ) -> Result<SlackResponse, CommandRouteError> {
        Ok(SlackResponse::broadcast(format!("would save `{object}` under `{category}`")))
    }

    async fn list_items(&self) -> Result<SlackResponse, CommandRouteError> {
        Ok(SlackResponse::broadcast("would list retrospective items"))
    }

    async fn start_cycle(&self, _response_url: &str) -> Result<SlackResponse, CommandRouteError> {
        Ok(SlackResponse::broadcast("would start a new cycle"))
    }
}
