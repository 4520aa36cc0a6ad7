use clap::Args;
use serde_json::json;

use common::identity::IdentityError;

/// Show the public half of the stored identity
#[derive(Args, Debug, Clone)]
pub struct Load;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("load failed: {0}")]
    Identity(#[from] IdentityError),
    #[error("failed to render identity: {0}")]
    Render(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for Load {
    type Error = LoadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let identity = ctx.identity().await?;
        let public = json!({
            "curve": identity.curve().as_str(),
            "public": identity.public_tagged(),
            "id": identity.id(),
        });
        Ok(serde_json::to_string_pretty(&public)?)
    }
}
