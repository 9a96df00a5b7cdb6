//! Repository metadata side-channel: current revision and canonical remote.
//!
//! Resolution shells out to git and never fails the scan; any problem degrades
//! to the placeholder values.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;

pub const UNKNOWN_REVISION: &str = "HEAD";
pub const UNKNOWN_REMOTE: &str = "unknown";

lazy_static! {
    /// `git@host:owner/repo(.git)` scp-style remotes.
    static ref SCP_REMOTE_RE: Regex = Regex::new(r"^[\w.-]+@([\w.-]+):(.+?)(?:\.git)?/?$").unwrap();

    /// `ssh://`, `git://`, `http(s)://` remotes, optionally carrying credentials.
    static ref URL_REMOTE_RE: Regex =
        Regex::new(r"^(?:ssh|git|https?)://(?:[^@/]+@)?([^/:]+)(?::\d+)?/(.+?)(?:\.git)?/?$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoMetadata {
    pub revision: String,
    pub remote_origin: String,
}

impl RepoMetadata {
    pub fn placeholder() -> Self {
        Self {
            revision: UNKNOWN_REVISION.to_string(),
            remote_origin: UNKNOWN_REMOTE.to_string(),
        }
    }

    pub fn resolve(root: &Path) -> Self {
        let revision = git(root, &["rev-parse", "HEAD"]);
        let remote = git(root, &["config", "--get", "remote.origin.url"]);

        if revision.is_none() || remote.is_none() {
            tracing::warn!(
                root = %root.display(),
                "repository metadata unavailable, using placeholders"
            );
        }

        Self {
            revision: revision.unwrap_or_else(|| UNKNOWN_REVISION.to_string()),
            remote_origin: remote
                .map(|url| canonical_remote(&url))
                .unwrap_or_else(|| UNKNOWN_REMOTE.to_string()),
        }
    }
}

impl Default for RepoMetadata {
    fn default() -> Self {
        Self::placeholder()
    }
}

fn git(root: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(root)
        .args(args)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let value = String::from_utf8(output.stdout).ok()?.trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Normalize a remote URL to `https://<host>/<path>` without credentials or `.git`.
pub fn canonical_remote(url: &str) -> String {
    let url = url.trim();
    if let Some(caps) = SCP_REMOTE_RE.captures(url) {
        return format!("https://{}/{}", &caps[1], &caps[2]);
    }
    if let Some(caps) = URL_REMOTE_RE.captures(url) {
        return format!("https://{}/{}", &caps[1], &caps[2]);
    }
    url.trim_end_matches('/').to_string()
}
