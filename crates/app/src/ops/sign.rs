use std::path::PathBuf;

use clap::Args;

use common::identity::IdentityError;
use common::sign::{sign, sign_object, SignError};

use super::{read_json, InputError};
use crate::state::StateError;

/// Sign a JSON message with the stored identity
#[derive(Args, Debug, Clone)]
pub struct Sign {
    /// JSON message to sign (reads stdin when omitted)
    pub input: Option<PathBuf>,

    /// Print only the signature instead of the signed object
    #[arg(long)]
    pub detached: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SignOpError {
    #[error("sign failed: {0}")]
    Identity(#[from] IdentityError),
    #[error("sign failed: {0}")]
    Sign(#[from] SignError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to render signed message: {0}")]
    Render(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for Sign {
    type Error = SignOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let message = read_json(self.input.as_ref()).await?;
        let identity = ctx.identity().await?;
        let cap = ctx.sign_cap()?;

        if self.detached {
            return Ok(sign(&identity, &message, cap.as_ref())?);
        }
        let signed = sign_object(&identity, cap.as_ref(), &message)?;
        Ok(serde_json::to_string_pretty(&signed)?)
    }
}
