use clap::Args;

use common::identity::{Identity, IdentityError, KeyRecord};

use super::{decode_base64, InputError};

/// Print a new identity record without saving it
#[derive(Args, Debug, Clone)]
pub struct Generate {
    /// Curve to generate the keypair on
    #[arg(long, default_value = "ed25519")]
    pub curve: String,

    /// Base64 32-byte seed for a deterministic keypair
    #[arg(long)]
    pub seed: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("generate failed: {0}")]
    Identity(#[from] IdentityError),
    #[error("invalid seed: {0}")]
    Seed(#[from] InputError),
    #[error("failed to render identity: {0}")]
    Render(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for Generate {
    type Error = GenerateError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let seed = self.seed.as_deref().map(decode_base64).transpose()?;
        let identity = Identity::generate(&self.curve, seed.as_deref())?;
        Ok(serde_json::to_string_pretty(&KeyRecord::from(identity))?)
    }
}
