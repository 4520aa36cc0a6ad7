/**
 * Authenticated encryption of JSON messages.
 *  - Multi-recipient boxes addressed to identities
 *  - Shared-secret boxes
 */
pub mod boxes;
/**
 * Cryptographic types and operations.
 *  - Ed25519 keypairs and their X25519 forms
 *  - Symmetric secrets and keyed hashing
 */
pub mod crypto;
/**
 * Tagged base64 identifiers and the canonical
 *  JSON form that gets hashed and signed.
 */
pub mod encoding;
pub mod hash;
/**
 * Signing identities and the commented
 *  key file they are persisted in.
 */
pub mod identity;
pub mod sign;

pub mod prelude {
    pub use crate::boxes::{
        box_message, secret_box, secret_unbox, unbox, unbox_body, unbox_key, BoxError, MessageKey,
    };
    pub use crate::crypto::{AuthKey, PublicKey, SecretKey};
    pub use crate::encoding::{canonicalize, get_tag, Sigil};
    pub use crate::hash::{hash, message_id};
    pub use crate::identity::{Identity, IdentityError};
    pub use crate::sign::{sign, sign_object, verify, verify_object, SignError};
}
