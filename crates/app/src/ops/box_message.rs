use std::path::PathBuf;

use clap::Args;

use common::boxes::{box_message, BoxError};
use common::crypto::{KeyError, PublicKey};
use common::identity::IdentityError;

use super::{read_json, InputError};

/// Encrypt a JSON message to up to seven recipients
#[derive(Args, Debug, Clone)]
pub struct BoxMessage {
    /// JSON message to encrypt (reads stdin when omitted)
    pub input: Option<PathBuf>,

    /// Recipient id; repeat for several recipients
    #[arg(long = "recipient", short = 'r')]
    pub recipients: Vec<String>,

    /// Add the stored identity as a recipient
    #[arg(long)]
    pub include_self: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum BoxMessageError {
    #[error("invalid recipient: {0}")]
    Recipient(#[from] KeyError),
    #[error("box failed: {0}")]
    Identity(#[from] IdentityError),
    #[error("box failed: {0}")]
    Box(#[from] BoxError),
    #[error(transparent)]
    Input(#[from] InputError),
}

#[async_trait::async_trait]
impl crate::op::Op for BoxMessage {
    type Error = BoxMessageError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut recipients = self
            .recipients
            .iter()
            .map(|id| id.parse::<PublicKey>())
            .collect::<Result<Vec<_>, _>>()?;
        if self.include_self {
            recipients.push(ctx.identity().await?.public());
        }

        let message = read_json(self.input.as_ref()).await?;
        Ok(box_message(&message, &recipients)?)
    }
}
