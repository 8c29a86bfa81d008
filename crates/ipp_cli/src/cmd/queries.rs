use crate::{Ctx, cmd::Success, error::Result};

#[derive(Debug, clap::Args)]
pub(crate) struct Queries {}

impl Queries {
    pub(crate) async fn run(self, ctx: &Ctx) -> Result<Success> {
        let queries = ctx.client.search_queries().await?;

        Ok(serde_json::to_value(queries)?.into())
    }
}
