//! Integration tests for multi-recipient and shared-secret boxes

mod common;

use ::common::boxes::{
    box_message, secret_box, secret_unbox, unbox, unbox_body, unbox_key, BoxError,
};
use ::common::crypto::PublicKey;
use serde_json::json;

#[test]
fn test_only_recipients_can_unbox() {
    let ids = common::identities(3);
    let (a, b, c) = (&ids[0], &ids[1], &ids[2]);
    let msg = json!({"type": "post", "text": "for a and b", "mentions": [a.id(), b.id()]});

    let boxed = box_message(&msg, &[a.public(), b.public()]).unwrap();
    assert_eq!(unbox(&boxed, a).unwrap(), Some(msg.clone()));
    assert_eq!(unbox(&boxed, b).unwrap(), Some(msg));
    assert_eq!(unbox(&boxed, c).unwrap(), None);
    assert!(unbox_key(&boxed, c).unwrap().is_none());
}

#[test]
fn test_two_step_unbox_matches_unbox() {
    let ids = common::identities(2);
    let msg = json!({"n": 1.5, "nested": {"ok": true}});
    let recipients: Vec<PublicKey> = ids.iter().map(|id| id.public()).collect();
    let boxed = box_message(&msg, &recipients).unwrap();

    for id in &ids {
        let key = unbox_key(&boxed, id).unwrap().unwrap();
        assert_eq!(key.recipients(), 2);
        assert_eq!(unbox_body(&boxed, &key).unwrap(), msg);
        assert_eq!(unbox(&boxed, id).unwrap(), Some(msg.clone()));
    }
}

#[test]
fn test_boxes_of_same_message_differ() {
    let ids = common::identities(1);
    let msg = json!({"same": "message"});
    let first = box_message(&msg, &[ids[0].public()]).unwrap();
    let second = box_message(&msg, &[ids[0].public()]).unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_message_key_from_one_box_does_not_open_another() {
    let ids = common::identities(1);
    let first = box_message(&json!(1), &[ids[0].public()]).unwrap();
    let second = box_message(&json!(2), &[ids[0].public()]).unwrap();
    let key = unbox_key(&first, &ids[0]).unwrap().unwrap();
    assert!(matches!(
        unbox_body(&second, &key),
        Err(BoxError::DecryptionFailed)
    ));
}

#[test]
fn test_envelope_tags_are_not_interchangeable() {
    let ids = common::identities(1);
    let secret = [9u8; 32];
    let boxed = box_message(&json!("x"), &[ids[0].public()]).unwrap();
    let secret_boxed = secret_box(&json!("x"), &secret).unwrap();

    assert!(matches!(
        secret_unbox(&boxed, &secret),
        Err(BoxError::MalformedInput(_))
    ));
    assert!(matches!(
        unbox(&secret_boxed, &ids[0]),
        Err(BoxError::MalformedInput(_))
    ));
}

#[test]
fn test_secret_box_shared_between_parties() {
    let secret = [42u8; 32];
    let msg = json!({"type": "group", "members": 3});
    let boxed = secret_box(&msg, &secret).unwrap();
    assert_eq!(secret_unbox(&boxed, &secret).unwrap(), Some(msg));
    assert_eq!(secret_unbox(&boxed, &[41u8; 32]).unwrap(), None);
}

#[test]
fn test_identities_agree_on_a_secret_box_key() {
    let ids = common::identities(3);
    let (a, b, c) = (&ids[0], &ids[1], &ids[2]);
    let msg = json!({"type": "dm", "text": "just us"});

    let boxed = secret_box(&msg, &a.shared_secret(&b.public()).unwrap()).unwrap();
    let theirs = b.shared_secret(&a.public()).unwrap();
    assert_eq!(secret_unbox(&boxed, &theirs).unwrap(), Some(msg));

    let outsider = c.shared_secret(&a.public()).unwrap();
    assert_eq!(secret_unbox(&boxed, &outsider).unwrap(), None);
}
