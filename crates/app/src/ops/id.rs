use clap::Args;

use common::identity::{self, IdentityError};

/// Print the id of the stored identity, creating one if there is none
#[derive(Args, Debug, Clone)]
pub struct Id;

#[derive(Debug, thiserror::Error)]
pub enum IdError {
    #[error("id failed: {0}")]
    Identity(#[from] IdentityError),
}

#[async_trait::async_trait]
impl crate::op::Op for Id {
    type Error = IdError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let identity = identity::load_or_create_async(ctx.state.keys_path.clone()).await?;
        Ok(identity.id())
    }
}
