mod chat;
mod evaluate;
mod health;
mod queries;
mod session;
mod speak;

use ipp_client::Client;
use ipp_config::PartialConfig;
use ipp_turn::{Conversation, TurnStatus};
use serde_json::Value;
use tracing::debug;

use crate::{Ctx, error::Result};

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Commands {
    /// Send a typed message to the interviewer.
    #[command(visible_alias = "c")]
    Chat(chat::Chat),

    /// Send a recorded answer to the interviewer.
    #[command(visible_alias = "s")]
    Speak(speak::Speak),

    /// List the search queries an interview can be based on.
    Queries(queries::Queries),

    /// Show a session and its history.
    Session(session::Session),

    /// Request an evaluation of a finished exchange.
    Evaluate(evaluate::Evaluate),

    /// Check that the backend is reachable.
    Health(health::Health),
}

impl Commands {
    pub(crate) async fn run(self, ctx: &Ctx) -> Result<Success> {
        match self {
            Commands::Chat(args) => args.run(ctx).await,
            Commands::Speak(args) => args.run(ctx).await,
            Commands::Queries(args) => args.run(ctx).await,
            Commands::Session(args) => args.run(ctx).await,
            Commands::Evaluate(args) => args.run(ctx).await,
            Commands::Health(args) => args.run(ctx).await,
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Commands::Chat(_) => "chat",
            Commands::Speak(_) => "speak",
            Commands::Queries(_) => "queries",
            Commands::Session(_) => "session",
            Commands::Evaluate(_) => "evaluate",
            Commands::Health(_) => "health",
        }
    }

    /// Layer command-specific flags over `partial`.
    pub(crate) fn apply_cli_config(&self, partial: PartialConfig) -> PartialConfig {
        match self {
            Commands::Speak(args) => args.apply_cli_config(partial),
            _ => partial,
        }
    }
}

/// The type of output that should be printed to the screen.
#[derive(Debug)]
pub(crate) enum Success {
    /// The command was successful.
    Ok,

    /// Single message to be printed to the screen.
    Message(String),

    /// JSON value to be printed.
    Json(Value),
}

impl From<()> for Success {
    fn from(_value: ()) -> Self {
        Self::Ok
    }
}

impl From<String> for Success {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<Value> for Success {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Arguments identifying the conversation a command works on.
#[derive(Debug, clap::Args)]
pub(crate) struct Target {
    /// The chat session to continue.
    #[arg(short, long)]
    session: String,

    /// The search query that gives the interview its context.
    ///
    /// Only needed for new sessions; existing sessions remember theirs.
    #[arg(long = "query-id", value_name = "ID")]
    search_query_id: Option<i64>,

    /// Do not load the session's history from the backend.
    #[arg(long)]
    fresh: bool,
}

impl Target {
    /// Build the local conversation state for the session.
    pub(crate) async fn conversation(&self, client: &Client) -> Result<Conversation> {
        let mut conversation = Conversation::new(&self.session);

        if !self.fresh {
            match client.session(&self.session).await {
                Ok(details) => conversation.hydrate(details)?,
                Err(ipp_client::Error::Api { code: 404, .. }) => {
                    debug!(session = self.session, "Session not found, starting a new one.");
                }
                Err(error) => return Err(error.into()),
            }
        }

        if let Some(id) = self.search_query_id {
            conversation.select_context(id)?;
        }

        Ok(conversation)
    }
}

pub(crate) fn status_label(status: &TurnStatus) -> &'static str {
    match status {
        TurnStatus::Idle => "idle",
        TurnStatus::Streaming => "streaming",
        TurnStatus::Completed => "completed",
        TurnStatus::Incomplete => "incomplete",
        TurnStatus::Failed(_) => "failed",
    }
}
