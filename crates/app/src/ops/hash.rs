use std::path::PathBuf;

use clap::Args;

use common::encoding::EncodingError;
use common::hash::{hash, message_id};

use super::{read_input, InputError};

/// Hash bytes, or compute the id of a JSON message
#[derive(Args, Debug, Clone)]
pub struct Hash {
    /// File to hash (reads stdin when omitted)
    pub input: Option<PathBuf>,

    /// Treat the input as a JSON message and print its `%` id
    #[arg(long)]
    pub message: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("hash failed: {0}")]
    Encoding(#[from] EncodingError),
}

#[async_trait::async_trait]
impl crate::op::Op for Hash {
    type Error = HashError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let bytes = read_input(self.input.as_deref()).await?;
        if !self.message {
            return Ok(hash(&bytes));
        }
        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(InputError::from)?;
        Ok(message_id(&value)?)
    }
}
