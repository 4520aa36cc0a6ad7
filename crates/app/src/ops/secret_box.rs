use std::path::PathBuf;

use clap::Args;

use common::boxes::{secret_box, BoxError};

use super::{decode_base64, read_json, InputError};

/// Encrypt a JSON message under a shared 32-byte secret
#[derive(Args, Debug, Clone)]
pub struct SecretBox {
    /// JSON message to encrypt (reads stdin when omitted)
    pub input: Option<PathBuf>,

    /// Base64 32-byte secret
    #[arg(long)]
    pub secret: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SecretBoxError {
    #[error("secret box failed: {0}")]
    Box(#[from] BoxError),
    #[error(transparent)]
    Input(#[from] InputError),
}

#[async_trait::async_trait]
impl crate::op::Op for SecretBox {
    type Error = SecretBoxError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let secret = decode_base64(&self.secret)?;
        let message = read_json(self.input.as_ref()).await?;
        Ok(secret_box(&message, &secret)?)
    }
}
