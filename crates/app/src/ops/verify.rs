use std::path::PathBuf;

use clap::Args;

use common::crypto::{KeyError, PublicKey};
use common::identity::IdentityError;
use common::sign::{verify, verify_object, SignError};

use super::{read_json, InputError};
use crate::state::StateError;

/// Verify a signed JSON message
#[derive(Args, Debug, Clone)]
pub struct Verify {
    /// Signed JSON message (reads stdin when omitted)
    pub input: Option<PathBuf>,

    /// Author id to verify against (defaults to the stored identity)
    #[arg(long)]
    pub author: Option<String>,

    /// Detached signature; the input is then the unsigned message
    #[arg(long)]
    pub signature: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("invalid author: {0}")]
    Author(#[from] KeyError),
    #[error("verify failed: {0}")]
    Identity(#[from] IdentityError),
    #[error("verify failed: {0}")]
    Sign(#[from] SignError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("signature does not match")]
    Invalid,
}

#[async_trait::async_trait]
impl crate::op::Op for Verify {
    type Error = VerifyError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let message = read_json(self.input.as_ref()).await?;
        let author = match &self.author {
            Some(author) => author.parse::<PublicKey>()?,
            None => ctx.identity().await?.public(),
        };
        let cap = ctx.sign_cap()?;

        let valid = match &self.signature {
            Some(signature) => verify(author, signature, &message, cap.as_ref())?,
            None => verify_object(author, &message, cap.as_ref())?,
        };
        if !valid {
            return Err(VerifyError::Invalid);
        }
        Ok(format!("valid signature by {}", author.to_id()))
    }
}
