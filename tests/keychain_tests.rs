//! Integration tests for the keystash credential store.
//!
//! Everything here runs against the in-memory item store so the suite never
//! touches the real OS keyring.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use keystash::backend::{Interaction, ItemStore, MemoryItemStore, Operation};
use keystash::errors::KeychainError;
use keystash::keychain::{
    Accessibility, AuthRequirement, CredentialStore, DeviceCapabilities, GenericPasswordItem,
    Identity, Status, WriteSerialization,
};

/// Helper: a fresh store over an empty in-memory backend.
fn memory_store() -> CredentialStore<MemoryItemStore> {
    CredentialStore::new(MemoryItemStore::new())
}

// ---------------------------------------------------------------------------
// Basic round-trips
// ---------------------------------------------------------------------------

#[test]
fn set_then_get_returns_stored_bytes() {
    let store = memory_store();
    store
        .set_data(&[0x00, 0xff, 0x10], "alice", "svc", None, None)
        .unwrap();

    let value = store.get("alice", "svc", None).unwrap().unwrap();
    assert_eq!(value.as_slice(), &[0x00, 0xff, 0x10]);
}

#[test]
fn string_roundtrip() {
    let store = memory_store();
    store.set_string("pässwörd", "alice", "svc", None, None).unwrap();

    let value = store.get_string("alice", "svc", None).unwrap().unwrap();
    assert_eq!(value.as_str(), "pässwörd");
}

#[test]
fn empty_payload_is_stored() {
    let store = memory_store();
    store.set_data(&[], "alice", "svc", None, None).unwrap();

    let value = store.get("alice", "svc", None).unwrap().unwrap();
    assert!(value.is_empty());
}

#[test]
fn set_get_delete_lifecycle() {
    let store = memory_store();
    store.set_string("s3cr3t", "alice", "svc", None, None).unwrap();
    assert_eq!(
        store.get_string("alice", "svc", None).unwrap().unwrap().as_str(),
        "s3cr3t"
    );

    store.delete("alice", "svc", None).unwrap();
    assert_eq!(store.get_string("alice", "svc", None).unwrap(), None);
}

// ---------------------------------------------------------------------------
// Absence
// ---------------------------------------------------------------------------

#[test]
fn reading_unknown_account_is_none() {
    let store = memory_store();
    assert_eq!(store.get("nobody", "svc", None).unwrap(), None);
    assert_eq!(store.get_string("nobody", "svc", None).unwrap(), None);
}

#[test]
fn deleting_unknown_account_is_item_not_found() {
    let store = memory_store();
    assert_eq!(
        store.delete("nobody", "svc", None),
        Err(KeychainError::ItemNotFound)
    );
}

#[test]
fn delete_removes_item() {
    let store = memory_store();
    store.set_string("v", "alice", "svc", None, None).unwrap();
    store.delete("alice", "svc", None).unwrap();

    assert_eq!(store.get("alice", "svc", None).unwrap(), None);
    assert!(store.backend().is_empty());
}

// ---------------------------------------------------------------------------
// Upsert
// ---------------------------------------------------------------------------

#[test]
fn set_overwrites_existing_value() {
    let store = memory_store();
    store.set_string("first", "alice", "svc", None, None).unwrap();
    store.set_string("second", "alice", "svc", None, None).unwrap();

    assert_eq!(
        store.get_string("alice", "svc", None).unwrap().unwrap().as_str(),
        "second"
    );
    assert_eq!(store.backend().len(), 1);
}

#[test]
fn failed_pre_add_delete_does_not_fail_set() {
    let store = memory_store();
    store.backend().fail_next(Operation::Delete, Status::IO);

    store.set_string("v", "alice", "svc", None, None).unwrap();
    assert!(store.get("alice", "svc", None).unwrap().is_some());
}

#[test]
fn add_failure_is_reported_by_set() {
    let store = memory_store();
    store.backend().fail_next(Operation::Add, Status::AUTH_FAILED);

    assert_eq!(
        store.set_string("v", "alice", "svc", None, None),
        Err(KeychainError::AuthenticationFailure)
    );
}

#[test]
fn primitive_add_reports_duplicates() {
    let store = memory_store();
    let item = GenericPasswordItem::from_string("v", "alice", "svc");
    store.set(&item).unwrap();

    let attrs = keystash::keychain::query::add_attributes(&item);
    assert_eq!(store.add(&attrs), Err(KeychainError::DuplicateItem));
}

// ---------------------------------------------------------------------------
// Identity and grouping
// ---------------------------------------------------------------------------

#[test]
fn accounts_and_services_are_isolated() {
    let store = memory_store();
    store.set_string("a-svc1", "alice", "svc1", None, None).unwrap();
    store.set_string("a-svc2", "alice", "svc2", None, None).unwrap();
    store.set_string("b-svc1", "bob", "svc1", None, None).unwrap();

    assert_eq!(
        store.get_string("alice", "svc2", None).unwrap().unwrap().as_str(),
        "a-svc2"
    );
    assert_eq!(
        store.get_string("bob", "svc1", None).unwrap().unwrap().as_str(),
        "b-svc1"
    );
}

#[test]
fn access_groups_keep_items_apart() {
    let store = memory_store();
    store
        .set_string("team", "alice", "svc", Some("team.shared"), None)
        .unwrap();
    store
        .set_string("other", "alice", "svc", Some("other.shared"), None)
        .unwrap();

    assert_eq!(
        store
            .get_string("alice", "svc", Some("team.shared"))
            .unwrap()
            .unwrap()
            .as_str(),
        "team"
    );
    assert!(store
        .backend()
        .contains(&Identity::new("alice", "svc", Some("other.shared"))));
    assert_eq!(store.get("alice", "svc", Some("third.shared")).unwrap(), None);
}

#[test]
fn default_access_group_applies_on_add() {
    let store = CredentialStore::new(MemoryItemStore::new().with_default_access_group("app.default"));
    store.set_string("v", "alice", "svc", None, None).unwrap();

    assert!(store
        .backend()
        .contains(&Identity::new("alice", "svc", Some("app.default"))));
    assert!(store.get("alice", "svc", Some("app.default")).unwrap().is_some());
}

#[test]
fn empty_identity_is_rejected_before_the_store() {
    let store = memory_store();
    // A one-shot failure that would surface if the store were contacted.
    store.backend().fail_next(Operation::Copy, Status::IO);

    assert_eq!(store.get("", "svc", None), Err(KeychainError::BadParameters));
    assert_eq!(
        store.set_string("v", "alice", "", None, None),
        Err(KeychainError::BadParameters)
    );
    assert_eq!(store.get("alice", "svc", None), Err(KeychainError::UnexpectedFailure));
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

#[test]
fn non_utf8_payload_is_decode_failure_not_absence() {
    let store = memory_store();
    store.set_data(&[0xc3, 0x28], "alice", "svc", None, None).unwrap();

    assert_eq!(
        store.get_string("alice", "svc", None),
        Err(KeychainError::DecodeFailure)
    );
    // The raw bytes are still readable.
    assert_eq!(
        store.get("alice", "svc", None).unwrap().unwrap().as_slice(),
        &[0xc3, 0x28]
    );
}

// ---------------------------------------------------------------------------
// Store failures
// ---------------------------------------------------------------------------

#[test]
fn unavailable_store_maps_to_keychain_not_available() {
    let store = memory_store();
    store.backend().set_available(false);

    assert_eq!(
        store.get("alice", "svc", None),
        Err(KeychainError::KeychainNotAvailable)
    );
    assert_eq!(
        store.set_string("v", "alice", "svc", None, None),
        Err(KeychainError::KeychainNotAvailable)
    );
}

#[test]
fn unknown_status_maps_to_unexpected_failure() {
    let store = memory_store();
    store.backend().fail_next(Operation::Copy, Status(-99_999));

    assert_eq!(
        store.get("alice", "svc", None),
        Err(KeychainError::UnexpectedFailure)
    );
}

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

#[test]
fn biometry_without_sensor_fails_to_create_access_control() {
    let store = CredentialStore::new(
        MemoryItemStore::new().with_capabilities(DeviceCapabilities {
            biometry: false,
            passcode_set: true,
        }),
    );

    assert_eq!(
        store.access_control(Accessibility::WhenUnlocked, AuthRequirement::BIOMETRY_ANY),
        Err(KeychainError::FailedToCreateAccessControl)
    );
    // Nothing was written.
    assert!(store.backend().is_empty());
}

#[test]
fn protected_item_reads_follow_the_prompt_outcome() {
    let store = memory_store();
    let control = store
        .access_control(
            Accessibility::WhenPasscodeSetThisDeviceOnly,
            AuthRequirement::USER_PRESENCE,
        )
        .unwrap();
    store
        .set_string("guarded", "alice", "svc", None, Some(&control))
        .unwrap();

    store.backend().set_interaction(Interaction::Canceled);
    assert_eq!(
        store.get("alice", "svc", None),
        Err(KeychainError::UserCanceled)
    );

    store.backend().set_interaction(Interaction::NotAllowed);
    assert_eq!(
        store.get("alice", "svc", None),
        Err(KeychainError::InteractionNotAllowed)
    );

    store.backend().set_interaction(Interaction::Allowed);
    assert_eq!(
        store.get_string("alice", "svc", None).unwrap().unwrap().as_str(),
        "guarded"
    );
}

#[test]
fn configured_item_uses_store_capabilities() {
    let store = memory_store();
    let mut item = GenericPasswordItem::from_string("v", "alice", "svc");
    item.configure_access_control(
        Accessibility::AfterFirstUnlock,
        AuthRequirement::NONE,
        store.backend().capabilities(),
    )
    .unwrap();

    store.set(&item).unwrap();
    assert!(store.get("alice", "svc", None).unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Scoped handle
// ---------------------------------------------------------------------------

#[test]
fn scoped_handle_fills_in_service_and_group() {
    let store = memory_store();
    let scoped = store.scoped_with_group("com.example.app", "team.shared");

    scoped.set_string("token", "alice", None).unwrap();

    assert_eq!(
        store
            .get_string("alice", "com.example.app", Some("team.shared"))
            .unwrap()
            .unwrap()
            .as_str(),
        "token"
    );
    assert_eq!(scoped.get_string("alice").unwrap().unwrap().as_str(), "token");
    scoped.delete("alice").unwrap();
    assert_eq!(scoped.delete("alice"), Err(KeychainError::ItemNotFound));
}

#[test]
fn scoped_handles_for_different_services_do_not_collide() {
    let store = memory_store();
    let first = store.scoped("svc-a");
    let second = store.scoped("svc-b");

    first.set_string("a", "alice", None).unwrap();
    assert_eq!(second.get("alice").unwrap(), None);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn per_identity_serialization_hides_the_replace_window() {
    let store = Arc::new(CredentialStore::with_write_serialization(
        MemoryItemStore::new(),
        WriteSerialization::PerIdentity,
    ));
    store.set_string("v0", "alice", "svc", None, None).unwrap();

    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 1..200 {
                store
                    .set_string(&format!("v{i}"), "alice", "svc", None, None)
                    .unwrap();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    while !done.load(Ordering::SeqCst) {
        let value = store.get_string("alice", "svc", None).unwrap();
        assert!(value.is_some(), "reader observed the item as absent");
    }

    writer.join().unwrap();
    assert_eq!(
        store.get_string("alice", "svc", None).unwrap().unwrap().as_str(),
        "v199"
    );
}

#[test]
fn ungrouped_reader_never_sees_a_grouped_replace_window() {
    let store = Arc::new(CredentialStore::with_write_serialization(
        MemoryItemStore::new(),
        WriteSerialization::PerIdentity,
    ));
    store
        .set_string("v0", "alice", "svc", Some("team.a"), None)
        .unwrap();

    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 1..500 {
                store
                    .set_string(&format!("v{i}"), "alice", "svc", Some("team.a"), None)
                    .unwrap();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    while !done.load(Ordering::SeqCst) {
        let value = store.get_string("alice", "svc", None).unwrap();
        assert!(value.is_some(), "ungrouped read observed the item as absent");
    }

    writer.join().unwrap();
    assert_eq!(
        store.get_string("alice", "svc", None).unwrap().unwrap().as_str(),
        "v499"
    );
}

#[test]
fn grouped_reader_never_sees_an_ungrouped_replace_window() {
    let store = Arc::new(CredentialStore::with_write_serialization(
        MemoryItemStore::new().with_default_access_group("app.default"),
        WriteSerialization::PerIdentity,
    ));
    store.set_string("v0", "alice", "svc", None, None).unwrap();

    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 1..500 {
                store
                    .set_string(&format!("v{i}"), "alice", "svc", None, None)
                    .unwrap();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    while !done.load(Ordering::SeqCst) {
        let value = store
            .get_string("alice", "svc", Some("app.default"))
            .unwrap();
        assert!(value.is_some(), "grouped read observed the item as absent");
    }

    writer.join().unwrap();
}

#[test]
fn concurrent_sets_on_different_accounts_all_land() {
    let store = CredentialStore::with_write_serialization(
        MemoryItemStore::new(),
        WriteSerialization::PerIdentity,
    );

    thread::scope(|s| {
        for i in 0..8 {
            let store = &store;
            s.spawn(move || {
                store
                    .set_string("v", &format!("user-{i}"), "svc", None, None)
                    .unwrap();
            });
        }
    });

    assert_eq!(store.backend().len(), 8);
}
