use clap::Args;

use common::identity::{self, IdentityError};

/// Create a new identity at the key file, refusing to replace one
#[derive(Args, Debug, Clone)]
pub struct Create;

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("create failed: {0}")]
    Identity(#[from] IdentityError),
    #[error("failed to create ssb directory: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for Create {
    type Error = CreateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let keys_path = ctx.state.keys_path.clone();
        // only the default location gets its directory made for it
        if keys_path.parent() == Some(ctx.state.ssb_dir.as_path()) {
            tokio::fs::create_dir_all(&ctx.state.ssb_dir).await?;
        }

        let identity = identity::create_async(keys_path.clone()).await?;
        tracing::info!(id = %identity.id(), "created identity");

        Ok(format!(
            "Created identity {}\n - Key file: {}",
            identity.id(),
            keys_path.display()
        ))
    }
}
