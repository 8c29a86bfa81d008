use crate::{Ctx, cmd::Success, error::Result};

#[derive(Debug, clap::Args)]
pub(crate) struct Health {}

impl Health {
    pub(crate) async fn run(self, ctx: &Ctx) -> Result<Success> {
        let health = ctx.client.health().await?;

        Ok(match health.message.as_str() {
            "" => health.status,
            message => format!("{}: {message}", health.status),
        }
        .into())
    }
}
