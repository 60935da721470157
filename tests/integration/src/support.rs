//! Shared fixtures: a canned remote repository served by the mock transport

use std::path::Path;

use mirror_core::{Mirror, SessionConfig};
use mirror_test_utils::{MockTransport, json_response};
use serde_json::{Value, json};

/// git hash-object on "hello\n"
pub const HELLO_SHA: &str = "ce013625030ba8dba906f756967f9e9ca394464a";

pub const TREE_URL: &str =
    "https://api.github.com/repos/octocat/hello/git/trees/main?recursive=1";

pub fn blob(path: &str, mode: &str, size: u64, sha: &str) -> Value {
    json!({"path": path, "mode": mode, "type": "blob", "size": size, "sha": sha})
}

pub fn tree(path: &str) -> Value {
    json!({"path": path, "mode": "040000", "type": "tree", "sha": "d".repeat(40)})
}

pub fn snapshot(entries: Vec<Value>) -> Value {
    json!({
        "sha": "abc123",
        "url": "https://api.github.com/repos/octocat/hello/git/trees/abc123",
        "tree": entries,
        "truncated": false
    })
}

pub fn transport_with_snapshot(entries: Vec<Value>) -> MockTransport {
    MockTransport::new().route(TREE_URL, json_response(snapshot(entries)))
}

pub fn raw_url(path: &str) -> String {
    format!("https://raw.githubusercontent.com/octocat/hello/main/{path}")
}

/// A session pinned to octocat/hello@main over the given transport.
pub fn session(transport: MockTransport, local_root: &Path, cache_dir: Option<&Path>) -> Mirror {
    Mirror::new(
        SessionConfig {
            reference: Some("octocat/hello".to_string()),
            branch: Some("main".to_string()),
            local_root: Some(local_root.to_path_buf()),
            cache_dir: cache_dir.map(Path::to_path_buf),
            ..SessionConfig::default()
        },
        Box::new(transport),
    )
}
