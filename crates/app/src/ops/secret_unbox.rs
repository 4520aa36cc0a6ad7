use std::path::PathBuf;

use clap::Args;

use common::boxes::{secret_unbox, BoxError};

use super::{decode_base64, read_tagged, InputError};

/// Decrypt a box made with a shared 32-byte secret
#[derive(Args, Debug, Clone)]
pub struct SecretUnbox {
    /// Boxed message (reads stdin when omitted)
    pub input: Option<PathBuf>,

    /// Base64 32-byte secret
    #[arg(long)]
    pub secret: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SecretUnboxError {
    #[error("secret unbox failed: {0}")]
    Box(#[from] BoxError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("box does not open with this secret")]
    WrongSecret,
    #[error("failed to render message: {0}")]
    Render(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for SecretUnbox {
    type Error = SecretUnboxError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let secret = decode_base64(&self.secret)?;
        let boxed = read_tagged(self.input.as_ref()).await?;
        let message = secret_unbox(&boxed, &secret)?.ok_or(SecretUnboxError::WrongSecret)?;
        Ok(serde_json::to_string_pretty(&message)?)
    }
}
