use std::path::PathBuf;

use ipp_client::{SpeechOutcome, types::Role};
use ipp_config::PartialConfig;
use ipp_turn::speech_turn;
use serde_json::json;
use tracing::warn;

use crate::{
    Ctx,
    cmd::{Success, Target, status_label},
    error::Result,
};

#[derive(Debug, clap::Args)]
pub(crate) struct Speak {
    #[command(flatten)]
    target: Target,

    /// Language of the recording, e.g. `en`.
    #[arg(long = "language", value_name = "CODE")]
    language_code: Option<String>,

    /// Do not synthesize the answer as audio.
    #[arg(long)]
    no_tts: bool,

    /// Write the synthesized answer to this file.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// The recorded answer to send.
    clip: PathBuf,
}

impl Speak {
    pub(crate) fn apply_cli_config(&self, partial: PartialConfig) -> PartialConfig {
        PartialConfig {
            language_code: self.language_code.clone(),
            tts_enabled: self.no_tts.then_some(false),
            ..PartialConfig::empty()
        }
        .with_fallback(partial)
    }

    pub(crate) async fn run(self, ctx: &Ctx) -> Result<Success> {
        let clip = tokio::fs::read(&self.clip).await?;
        let mut conversation = self.target.conversation(&ctx.client).await?;
        let before = conversation.messages().len();

        let report =
            speech_turn(&ctx.client, &mut conversation, clip, &ctx.speech_options()).await?;

        let added = &conversation.messages()[before..];
        let transcript = added.iter().find(|m| m.role == Role::User);
        let answer = added.iter().find(|m| m.role == Role::Assistant);

        let audio = answer
            .and_then(|m| m.audio_url.as_deref())
            .and_then(|url| conversation.audio().get(url));

        let written = match (&self.output, audio) {
            (Some(path), Some(blob)) => {
                tokio::fs::write(path, blob.bytes()).await?;
                Some(path.display().to_string())
            }
            (Some(path), None) => {
                warn!(path = %path.display(), "No synthesized audio to write.");
                None
            }
            (None, _) => None,
        };

        Ok(json!({
            "status": status_label(&report.status),
            "closed_without_sentinel": report.speech == Some(SpeechOutcome::ClosedWithoutSentinel),
            "transcript": transcript.map(|m| m.content.as_str()),
            "answer": answer.map(|m| m.content.as_str()),
            "audio": written,
            "interview_finished": conversation.interview_finished(),
        })
        .into())
    }
}
