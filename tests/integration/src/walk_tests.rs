//! End-to-end reconciliation walks against a canned remote

#[path = "support.rs"]
mod support;

use std::fs;

use mirror_api::HttpResponse;
use mirror_core::{Error, Policy, WalkOptions};
use pretty_assertions::assert_eq;
use support::*;

fn walk(
    session: &mirror_core::Mirror,
    policy: Policy,
) -> mirror_core::Result<mirror_core::WalkReport> {
    session.walk(&policy.hooks(), &policy.effects(), &WalkOptions::default())
}

#[test]
fn dry_run_counts_without_touching_disk() {
    let local = tempfile::tempdir().unwrap();
    let transport = transport_with_snapshot(vec![
        blob("a.txt", "100644", 6, HELLO_SHA),
        tree("docs"),
    ]);
    let calls = transport.calls_handle();
    let session = session(transport, local.path(), None);

    let report = walk(&session, Policy::ReadOnly).unwrap();

    assert_eq!(report.stats.matched, 0);
    assert_eq!(report.stats.missing_or_new, 2);
    assert_eq!(report.stats.conflicts, 0);
    assert!(report.entry_errors.is_empty());

    // nothing was created and only the tree listing went out
    assert!(!local.path().join("a.txt").exists());
    assert!(!local.path().join("docs").exists());
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn matching_file_counts_as_matched() {
    let local = tempfile::tempdir().unwrap();
    fs::write(local.path().join("a.txt"), "hello\n").unwrap();

    let transport = transport_with_snapshot(vec![blob("a.txt", "100644", 6, HELLO_SHA)]);
    let session = session(transport, local.path(), None);

    let report = walk(&session, Policy::ReadOnly).unwrap();
    assert_eq!(report.stats.matched, 1);
    assert_eq!(report.stats.conflicts, 0);
}

#[test]
fn symlink_entry_conflicts_even_with_identical_bytes() {
    let local = tempfile::tempdir().unwrap();
    fs::write(local.path().join("link"), "hello\n").unwrap();

    let transport = transport_with_snapshot(vec![blob("link", "120000", 6, HELLO_SHA)]);
    let session = session(transport, local.path(), None);

    let report = walk(&session, Policy::ReadOnly).unwrap();
    assert_eq!(report.stats.conflicts, 1);
    assert_eq!(report.stats.matched, 0);
}

#[test]
fn write_policy_materializes_then_second_pass_is_clean() {
    let local = tempfile::tempdir().unwrap();
    let transport = transport_with_snapshot(vec![
        tree("src"),
        blob("src/a.txt", "100644", 6, HELLO_SHA),
    ])
    .route(&raw_url("src/a.txt"), HttpResponse::new(200, b"hello\n".to_vec()));
    let session = session(transport, local.path(), None);

    let first = walk(&session, Policy::Write).unwrap();
    assert_eq!(first.stats.missing_or_new, 2);
    assert_eq!(fs::read(local.path().join("src/a.txt")).unwrap(), b"hello\n");

    // unchanged remote: the second pass sees everything in place
    let second = walk(&session, Policy::Write).unwrap();
    assert_eq!(second.stats.matched, 2);
    assert_eq!(second.stats.missing_or_new, 0);
    assert_eq!(second.stats.conflicts, 0);
}

#[test]
fn file_download_does_not_require_parent_tree_entry_first() {
    let local = tempfile::tempdir().unwrap();
    // child listed before its parent directory
    let transport = transport_with_snapshot(vec![
        blob("deep/nested/a.txt", "100644", 6, HELLO_SHA),
        tree("deep"),
    ])
    .route(
        &raw_url("deep/nested/a.txt"),
        HttpResponse::new(200, b"hello\n".to_vec()),
    );
    let session = session(transport, local.path(), None);

    walk(&session, Policy::Write).unwrap();
    assert_eq!(
        fs::read(local.path().join("deep/nested/a.txt")).unwrap(),
        b"hello\n"
    );
}

#[test]
fn write_policy_reports_conflicts_without_resolving() {
    let local = tempfile::tempdir().unwrap();
    fs::write(local.path().join("a.txt"), "local edits").unwrap();

    let transport = transport_with_snapshot(vec![blob("a.txt", "100644", 6, HELLO_SHA)])
        .route(&raw_url("a.txt"), HttpResponse::new(200, b"hello\n".to_vec()));
    let session = session(transport, local.path(), None);

    let report = walk(&session, Policy::Write).unwrap();
    assert_eq!(report.stats.conflicts, 1);
    assert_eq!(fs::read(local.path().join("a.txt")).unwrap(), b"local edits");
}

#[test]
fn overwrite_policy_deletes_and_redownloads_conflicts() {
    let local = tempfile::tempdir().unwrap();
    fs::write(local.path().join("a.txt"), "local edits").unwrap();

    let transport = transport_with_snapshot(vec![blob("a.txt", "100644", 6, HELLO_SHA)])
        .route(&raw_url("a.txt"), HttpResponse::new(200, b"hello\n".to_vec()));
    let session = session(transport, local.path(), None);

    let report = walk(&session, Policy::WriteOverwrite).unwrap();
    assert_eq!(report.stats.conflicts, 1);
    assert_eq!(fs::read(local.path().join("a.txt")).unwrap(), b"hello\n");
}

#[test]
fn unknown_entry_type_aborts_before_later_entries() {
    let local = tempfile::tempdir().unwrap();
    let transport = transport_with_snapshot(vec![
        blob("before.txt", "100644", 6, HELLO_SHA),
        serde_json::json!({"path": "submodule", "mode": "160000", "type": "commit", "sha": "e".repeat(40)}),
        blob("after.txt", "100644", 6, HELLO_SHA),
    ])
    .route(&raw_url("before.txt"), HttpResponse::new(200, b"hello\n".to_vec()))
    .route(&raw_url("after.txt"), HttpResponse::new(200, b"hello\n".to_vec()));
    let session = session(transport, local.path(), None);

    let err = walk(&session, Policy::Write).unwrap_err();
    assert!(matches!(err, Error::UnknownEntryType { .. }));

    // entries before the violation were processed, entries after were not
    assert!(local.path().join("before.txt").exists());
    assert!(!local.path().join("after.txt").exists());
}

#[test]
fn hook_failure_is_local_to_its_entry() {
    let local = tempfile::tempdir().unwrap();
    let transport = transport_with_snapshot(vec![
        blob("broken.txt", "100644", 6, HELLO_SHA),
        blob("fine.txt", "100644", 6, HELLO_SHA),
    ])
    .fail(&raw_url("broken.txt"))
    .route(&raw_url("fine.txt"), HttpResponse::new(200, b"hello\n".to_vec()));
    let session = session(transport, local.path(), None);

    let report = walk(&session, Policy::Write).unwrap();

    assert_eq!(report.stats.missing_or_new, 2);
    assert_eq!(report.entry_errors.len(), 1);
    assert_eq!(report.entry_errors[0].path, "broken.txt");
    assert!(!local.path().join("broken.txt").exists());
    assert_eq!(fs::read(local.path().join("fine.txt")).unwrap(), b"hello\n");
}

#[test]
fn missing_tree_identity_is_not_found_before_any_entry() {
    let local = tempfile::tempdir().unwrap();
    let transport = mirror_test_utils::MockTransport::new().route(
        TREE_URL,
        mirror_test_utils::json_response(serde_json::json!({"tree": []})),
    );
    let session = session(transport, local.path(), None);

    let err = walk(&session, Policy::ReadOnly).unwrap_err();
    match err {
        Error::NotFound { reference, branch } => {
            assert_eq!(reference, "octocat/hello");
            assert_eq!(branch, "main");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn api_message_on_tree_fetch_surfaces_the_server_wording() {
    let local = tempfile::tempdir().unwrap();
    let transport = mirror_test_utils::MockTransport::new().route(
        TREE_URL,
        mirror_test_utils::json_response_with_status(
            403,
            serde_json::json!({"message": "API rate limit exceeded"}),
        ),
    );
    let session = session(transport, local.path(), None);

    let err = walk(&session, Policy::ReadOnly).unwrap_err();
    match err {
        Error::Api(mirror_api::Error::Api { code, message }) => {
            assert_eq!(code, 403);
            assert_eq!(message, "API rate limit exceeded");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}
