//! Persisting identities to the filesystem
//!
//! Every operation has a blocking form and an `_async` form. The async form
//! runs the blocking one on tokio's blocking pool, so file I/O never stalls
//! the executor that other cryptographic work is running on.
//!
//! # Limitations
//!
//! [`load_or_create`] is not atomic: two callers racing on the same missing
//! path may both generate an identity. The file is created exclusively, so
//! exactly one write lands and the other caller gets `AlreadyExists`.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::keyfile::{parse_keyfile, render_keyfile};
use super::{Identity, IdentityError};

/// File name used when a store path points at an existing directory
pub const KEY_FILE_NAME: &str = "secret";

/// An existing directory stands for the key file inside it; anything else is
/// the key file itself. Directories are never created here.
fn resolve(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(KEY_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}

/// Load the identity stored at `path`.
///
/// # Errors
///
/// - `NotFound` if there is no file at `path`
/// - `CorruptRecord` if the file does not hold a valid identity
/// - `Io` for any other read failure
pub fn load(path: impl AsRef<Path>) -> Result<Identity, IdentityError> {
    let path = resolve(path.as_ref());
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(IdentityError::NotFound(path)),
        Err(e) => return Err(e.into()),
    };
    let corrupt = |reason: String| IdentityError::CorruptRecord {
        path: path.clone(),
        reason,
    };
    let contents = String::from_utf8(bytes).map_err(|e| corrupt(e.to_string()))?;
    let identity = parse_keyfile(&contents).map_err(|e| corrupt(e.to_string()))?;
    tracing::debug!(path = %path.display(), id = %identity.id(), "loaded identity");
    Ok(identity)
}

/// Write `identity` to `path`, refusing to replace an existing file.
///
/// The file is created exclusively, so an existing file is never truncated
/// even when another writer gets there first.
pub fn save(identity: &Identity, path: impl AsRef<Path>) -> Result<(), IdentityError> {
    let path = resolve(path.as_ref());

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = match options.open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(IdentityError::AlreadyExists(path))
        }
        Err(e) => return Err(e.into()),
    };
    file.write_all(render_keyfile(identity).as_bytes())?;
    file.sync_all()?;
    tracing::debug!(path = %path.display(), id = %identity.id(), "wrote identity");
    Ok(())
}

/// Generate a fresh identity and save it at `path`.
pub fn create(path: impl AsRef<Path>) -> Result<Identity, IdentityError> {
    let identity = Identity::random();
    save(&identity, path)?;
    Ok(identity)
}

/// Load the identity at `path`, creating it first if there is none.
///
/// A corrupt record is reported, never replaced.
pub fn load_or_create(path: impl AsRef<Path>) -> Result<Identity, IdentityError> {
    let path = path.as_ref();
    match load(path) {
        Err(IdentityError::NotFound(missing)) => {
            tracing::info!(path = %missing.display(), "no identity found, creating one");
            create(path)
        }
        result => result,
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, IdentityError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, IdentityError> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// [`load`] on the blocking pool
pub async fn load_async(path: impl Into<PathBuf>) -> Result<Identity, IdentityError> {
    let path = path.into();
    run_blocking(move || load(path)).await
}

/// [`save`] on the blocking pool
pub async fn save_async(identity: Identity, path: impl Into<PathBuf>) -> Result<(), IdentityError> {
    let path = path.into();
    run_blocking(move || save(&identity, path)).await
}

/// [`create`] on the blocking pool
pub async fn create_async(path: impl Into<PathBuf>) -> Result<Identity, IdentityError> {
    let path = path.into();
    run_blocking(move || create(path)).await
}

/// [`load_or_create`] on the blocking pool
pub async fn load_or_create_async(path: impl Into<PathBuf>) -> Result<Identity, IdentityError> {
    let path = path.into();
    run_blocking(move || load_or_create(path)).await
}
