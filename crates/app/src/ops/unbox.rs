use std::path::PathBuf;

use clap::Args;

use common::boxes::{unbox, unbox_body, unbox_key, BoxError, MessageKey};
use common::identity::IdentityError;

use super::{decode_base64, encode_base64, read_tagged, InputError};

/// Decrypt a box addressed to the stored identity
#[derive(Args, Debug, Clone)]
pub struct Unbox {
    /// Boxed message (reads stdin when omitted)
    pub input: Option<PathBuf>,

    /// Print the message key instead of the message
    #[arg(long, conflicts_with = "message_key")]
    pub print_key: bool,

    /// Decrypt with a base64 message key instead of the stored identity
    #[arg(long)]
    pub message_key: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum UnboxError {
    #[error("unbox failed: {0}")]
    Identity(#[from] IdentityError),
    #[error("unbox failed: {0}")]
    Box(#[from] BoxError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("invalid message key")]
    InvalidMessageKey,
    #[error("not a recipient of this box")]
    NotRecipient,
    #[error("failed to render message: {0}")]
    Render(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for Unbox {
    type Error = UnboxError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let boxed = read_tagged(self.input.as_ref()).await?;

        if let Some(encoded) = &self.message_key {
            let bytes = decode_base64(encoded)?;
            let key = MessageKey::from_bytes(&bytes).ok_or(UnboxError::InvalidMessageKey)?;
            let message = unbox_body(&boxed, &key)?;
            return Ok(serde_json::to_string_pretty(&message)?);
        }

        let identity = ctx.identity().await?;
        if self.print_key {
            let key = unbox_key(&boxed, &identity)?.ok_or(UnboxError::NotRecipient)?;
            return Ok(encode_base64(&key.to_bytes()));
        }
        let message = unbox(&boxed, &identity)?.ok_or(UnboxError::NotRecipient)?;
        Ok(serde_json::to_string_pretty(&message)?)
    }
}
