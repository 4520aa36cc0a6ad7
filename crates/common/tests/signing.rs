//! Integration tests for signing identities' messages

mod common;

use ::common::crypto::AuthKey;
use ::common::hash::message_id;
use ::common::sign::{sign, sign_object, verify, verify_object, SignError};
use serde_json::json;

#[test]
fn test_signed_message_verifies_for_author_only() {
    let ids = common::identities(2);
    let msg = json!({"type": "contact", "contact": ids[1].id(), "following": true});
    let signed = sign_object(&ids[0], None, &msg).unwrap();

    assert!(verify_object(&ids[0], &signed, None).unwrap());
    assert!(!verify_object(&ids[1], &signed, None).unwrap());
}

#[test]
fn test_verify_accepts_bare_public_key() {
    let ids = common::identities(1);
    let msg = json!({"text": "hi"});
    let signature = sign(&ids[0], &msg, None).unwrap();
    let public = ids[0].public_tagged().parse::<::common::crypto::PublicKey>().unwrap();
    assert!(verify(public, &signature, &msg, None).unwrap());
}

#[test]
fn test_keyed_signatures_need_the_same_key() {
    let ids = common::identities(1);
    let cap = AuthKey::from_base64("AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=").unwrap();
    let msg = json!({"type": "post", "text": "on another network"});
    let signed = sign_object(&ids[0], Some(&cap), &msg).unwrap();

    assert!(verify_object(&ids[0], &signed, Some(&cap)).unwrap());
    assert!(!verify_object(&ids[0], &signed, None).unwrap());
}

#[test]
fn test_field_order_is_part_of_the_signature() {
    let ids = common::identities(1);
    let msg = json!({"a": 1, "b": 2});
    let signature = sign(&ids[0], &msg, None).unwrap();
    let reordered = json!({"b": 2, "a": 1});
    assert!(!verify(&ids[0], &signature, &reordered, None).unwrap());
}

#[test]
fn test_signed_object_without_signature_is_malformed() {
    let ids = common::identities(1);
    assert!(matches!(
        verify_object(&ids[0], &json!({"a": 1}), None),
        Err(SignError::MalformedInput(_))
    ));
}

#[test]
fn test_message_id_changes_with_signature() {
    let ids = common::identities(1);
    let msg = json!({"type": "post"});
    let signed = sign_object(&ids[0], None, &msg).unwrap();
    let unsigned_id = message_id(&msg).unwrap();
    let signed_id = message_id(&signed).unwrap();
    assert!(signed_id.starts_with('%') && signed_id.ends_with(".sha256"));
    assert_ne!(unsigned_id, signed_id);
}
