//! Media uploads
//!
//! Uploads are checked against a MIME allow-list, stored under the media
//! directory with a sanitized, timestamp-prefixed name and served back from
//! `/media/<name>`.

use crate::error::{WorkspaceError, WorkspaceResult};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "video/mp4",
];

/// URL prefix media is served from
pub const MEDIA_ROUTE: &str = "/media";

const MAX_NAME_LEN: usize = 96;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMedia {
    pub file_name: String,
    pub url: String,
    pub mime_type: String,
    pub size: usize,
}

#[derive(Debug, Clone)]
pub struct MediaLibrary {
    dir: PathBuf,
    allowed: Vec<String>,
}

impl MediaLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            allowed: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }

    pub fn with_allowed_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn allowed_types(&self) -> &[String] {
        &self.allowed
    }

    /// Parameters such as `; charset=` are ignored; matching is case-insensitive
    pub fn is_allowed(&self, mime_type: &str) -> bool {
        let essence = essence(mime_type);
        self.allowed.iter().any(|m| m.eq_ignore_ascii_case(&essence))
    }

    pub fn store(&self, file_name: &str, mime_type: &str, bytes: &[u8]) -> WorkspaceResult<StoredMedia> {
        let mime_type = essence(mime_type);
        if !self.is_allowed(&mime_type) {
            return Err(WorkspaceError::UnsupportedMediaType(mime_type));
        }
        if bytes.is_empty() {
            return Err(WorkspaceError::EmptyUpload);
        }

        let clean = sanitize_file_name(file_name)
            .ok_or_else(|| WorkspaceError::InvalidFileName(file_name.to_string()))?;
        let stored_name = format!("{}-{}", chrono::Utc::now().timestamp_millis(), clean);

        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.dir.join(&stored_name), bytes)?;

        tracing::info!(file = %stored_name, %mime_type, size = bytes.len(), "media stored");

        Ok(StoredMedia {
            url: format!("{}/{}", MEDIA_ROUTE, stored_name),
            file_name: stored_name,
            mime_type,
            size: bytes.len(),
        })
    }
}

fn essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Reduce a client-supplied name to `[a-z0-9._-]`
///
/// Directory components are dropped, runs of other characters collapse to a
/// single `-`, and leading dots are stripped so the result is never hidden.
/// `None` when nothing usable is left.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }

    let trimmed = out.trim_start_matches(['.', '-']).trim_end_matches('-');
    let trimmed = if trimmed.len() > MAX_NAME_LEN {
        &trimmed[trimmed.len() - MAX_NAME_LEN..]
    } else {
        trimmed
    };

    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        None
    } else {
        Some(trimmed.to_string())
    }
}
