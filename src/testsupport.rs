//! Shared test fixtures for gateway, preparation and session test modules.

use crate::types::{CapabilityCall, ChatResponse, Choice, Message, Usage};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    /// Create a unique temporary directory with a readable prefix.
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!(
            "tally-{prefix}-{}-{millis}-{suffix}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    /// Root directory path for this fixture.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build a child path under the fixture root.
    pub fn child(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Write UTF-8 text to a child path, creating parent directories as needed.
    pub fn write_text(&self, relative: &str, content: &str) -> PathBuf {
        self.write_bytes(relative, content.as_bytes())
    }

    /// Write raw bytes to a child path.
    pub fn write_bytes(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.child(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directories for fixture");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Write an executable `/bin/sh` script standing in for the external tool.
#[cfg(unix)]
pub fn write_fake_tool(dir: &TestTempDir, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.write_text(name, &format!("#!/bin/sh\n{body}"));
    let mut perms = fs::metadata(&path).expect("stat fake tool").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod fake tool");
    path
}

/// Assistant text reply with optional usage.
pub fn text_response(content: &str, usage: Option<(u64, u64)>) -> ChatResponse {
    response_with(Message::assistant(Some(content.to_string()), Vec::new()), usage)
}

/// Assistant reply carrying capability calls and no text.
pub fn calls_response(calls: Vec<CapabilityCall>, usage: Option<(u64, u64)>) -> ChatResponse {
    response_with(Message::assistant(None, calls), usage)
}

fn response_with(message: Message, usage: Option<(u64, u64)>) -> ChatResponse {
    ChatResponse {
        id: "resp".to_string(),
        choices: vec![Choice {
            index: 0,
            message,
            finish_reason: Some("stop".to_string()),
        }],
        usage: usage.map(|(prompt_tokens, completion_tokens)| Usage {
            prompt_tokens,
            completion_tokens,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_fixture_writes_and_resolves_paths() {
        let fixture = TestTempDir::new("fixture");
        let file = fixture.write_text("nested/file.txt", "hello");
        assert_eq!(fs::read_to_string(file).unwrap(), "hello");
    }

    #[test]
    fn response_helpers_build_single_choice() {
        let resp = text_response("count a.csv", Some((5, 2)));
        assert_eq!(resp.choices.len(), 1);
        assert_eq!(resp.usage.unwrap().completion_tokens, 2);
        assert!(calls_response(Vec::new(), None).usage.is_none());
    }
}
