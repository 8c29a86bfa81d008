use tracing::info;

use crate::{
    Ctx,
    cmd::{Success, Target},
    error::{Error, Result},
};

#[derive(Debug, clap::Args)]
pub(crate) struct Evaluate {
    #[command(flatten)]
    target: Target,
}

impl Evaluate {
    pub(crate) async fn run(self, ctx: &Ctx) -> Result<Success> {
        let conversation = self.target.conversation(&ctx.client).await?;

        let Some(search_query_id) = conversation
            .search_query_id()
            .filter(|_| conversation.can_evaluate())
        else {
            return Err(Error::NotReady(conversation.session_id().to_owned()));
        };

        ctx.client
            .evaluate(conversation.session_id(), search_query_id)
            .await?;
        info!(session = conversation.session_id(), "Evaluation requested.");

        Ok(format!(
            "Evaluation requested for session {}.",
            conversation.session_id()
        )
        .into())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use httpmock::prelude::*;
    use ipp_config::Config;
    use serde_json::json;

    use super::*;

    fn evaluate(fresh: bool) -> Evaluate {
        Evaluate {
            target: Target {
                session: "S1".to_owned(),
                search_query_id: None,
                fresh,
            },
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_evaluates_hydrated_session() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/conversation_history/session/S1");
                then.status(200).json_body(json!({
                    "session_id": "S1",
                    "search_query_id": 42,
                    "messages": [
                        { "role": "user", "content": "Hi" },
                        { "role": "assistant", "content": "Hello" },
                    ],
                }));
            })
            .await;
        let evaluation = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/evaluation/evaluate")
                    .json_body(json!({ "chat_session_id": "S1", "search_query_id": 42 }));
                then.status(200).json_body(json!({ "status": "queued" }));
            })
            .await;

        let ctx = Ctx::new(Config {
            base_url: server.url("/api/v1"),
            ..Config::default()
        });

        let output = evaluate(false).run(&ctx).await.unwrap();

        evaluation.assert_async().await;
        assert_matches!(output, Success::Message(message) if message.contains("S1"));
    }

    #[test_log::test(tokio::test)]
    async fn test_empty_session_is_not_evaluated() {
        let ctx = Ctx::new(Config::default());

        assert_matches!(evaluate(true).run(&ctx).await, Err(Error::NotReady(id)) if id == "S1");
    }
}
