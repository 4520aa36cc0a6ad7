pub mod box_message;
pub mod create;
pub mod generate;
pub mod hash;
pub mod id;
pub mod load;
pub mod secret_box;
pub mod secret_unbox;
pub mod sign;
pub mod tag;
pub mod unbox;
pub mod verify;
pub mod version;

pub use box_message::BoxMessage;
pub use create::Create;
pub use generate::Generate;
pub use hash::Hash;
pub use id::Id;
pub use load::Load;
pub use secret_box::SecretBox;
pub use secret_unbox::SecretUnbox;
pub use sign::Sign;
pub use tag::Tag;
pub use unbox::Unbox;
pub use verify::Verify;
pub use version::Version;

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use tokio::io::AsyncReadExt;

/// Errors reading an op's input
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("input is not JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("input is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Read the whole of `path`, or stdin when it is absent or `-`.
pub async fn read_input(path: Option<&Path>) -> Result<Vec<u8>, InputError> {
    match path {
        Some(path) if path != Path::new("-") => Ok(tokio::fs::read(path).await?),
        _ => {
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await?;
            Ok(buf)
        }
    }
}

/// Read a JSON message from `path` or stdin
pub async fn read_json(path: Option<&PathBuf>) -> Result<Value, InputError> {
    let bytes = read_input(path.map(PathBuf::as_path)).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Read a single tagged string (a box, say) from `path` or stdin
pub async fn read_tagged(path: Option<&PathBuf>) -> Result<String, InputError> {
    let bytes = read_input(path.map(PathBuf::as_path)).await?;
    Ok(String::from_utf8(bytes)?.trim().to_string())
}

pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, InputError> {
    Ok(STANDARD.decode(encoded.trim())?)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_json_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("msg.json");
        std::fs::write(&path, "{\"b\": 1, \"a\": 2}").unwrap();
        let value = read_json(Some(&path)).await.unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[tokio::test]
    async fn test_read_tagged_trims_whitespace() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boxed");
        std::fs::write(&path, "  AAAA.box\n").unwrap();
        assert_eq!(read_tagged(Some(&path)).await.unwrap(), "AAAA.box");
    }

    #[tokio::test]
    async fn test_non_utf8_tagged_input_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boxed");
        std::fs::write(&path, b"AAAA\xff.box\n").unwrap();
        assert!(matches!(
            read_tagged(Some(&path)).await,
            Err(InputError::Utf8(_))
        ));
    }

    #[tokio::test]
    async fn test_bad_json_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("msg.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            read_json(Some(&path)).await,
            Err(InputError::Json(_))
        ));
    }
}
