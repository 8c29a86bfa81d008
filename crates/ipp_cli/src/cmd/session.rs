use crate::{Ctx, cmd::Success, error::Result};

#[derive(Debug, clap::Args)]
pub(crate) struct Session {
    /// The session to show.
    id: String,
}

impl Session {
    pub(crate) async fn run(self, ctx: &Ctx) -> Result<Success> {
        let details = ctx.client.session(&self.id).await?;

        Ok(serde_json::to_value(details)?.into())
    }
}
