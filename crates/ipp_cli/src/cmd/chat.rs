use std::io::{self, Write as _};

use ipp_turn::{Conversation, chat_turn};
use serde_json::json;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tracing::info;

use crate::{
    Ctx,
    cmd::{Success, Target, status_label},
    error::Result,
};

#[derive(Debug, clap::Args)]
pub(crate) struct Chat {
    #[command(flatten)]
    target: Target,

    /// Wait for the complete answer instead of streaming it.
    #[arg(long)]
    no_stream: bool,

    /// The message to send.
    ///
    /// If omitted, messages are read from stdin, one per line, until the
    /// input ends or the interview is finished.
    message: Option<String>,
}

impl Chat {
    pub(crate) async fn run(self, ctx: &Ctx) -> Result<Success> {
        let mut conversation = self.target.conversation(&ctx.client).await?;

        match self.message.as_deref() {
            Some(message) if self.no_stream => one_shot(ctx, &conversation, message).await,
            Some(message) => {
                let status = chat_turn(&ctx.client, &mut conversation, message)
                    .await?
                    .status;

                Ok(json!({
                    "status": status_label(&status),
                    "answer": last_answer(&conversation),
                    "interview_finished": conversation.interview_finished(),
                })
                .into())
            }
            None => interactive(ctx, &mut conversation).await,
        }
    }
}

async fn one_shot(ctx: &Ctx, conversation: &Conversation, message: &str) -> Result<Success> {
    let search_query_id = conversation
        .search_query_id()
        .ok_or(ipp_turn::Error::MissingContext)?;

    let response = ctx
        .client
        .chat(conversation.session_id(), search_query_id, message)
        .await?;

    Ok(json!({
        "status": "completed",
        "answer": response.response,
        "interview_finished": response.interview_finished,
    })
    .into())
}

async fn interactive(ctx: &Ctx, conversation: &mut Conversation) -> Result<Success> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        chat_turn(&ctx.client, conversation, &line).await?;
        if let Some(answer) = last_answer(conversation) {
            writeln!(io::stdout(), "{answer}\n")?;
        }

        if conversation.interview_finished() {
            info!(session = conversation.session_id(), "Interview finished.");
            break;
        }
    }

    Ok(Success::Ok)
}

fn last_answer(conversation: &Conversation) -> Option<&str> {
    conversation
        .messages()
        .last()
        .filter(|message| message.role == ipp_client::types::Role::Assistant)
        .map(|message| message.content.as_str())
}
