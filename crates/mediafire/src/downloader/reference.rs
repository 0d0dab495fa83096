//! Folder reference extraction
//!
//! Turns a user-supplied folder URL into the folder key the API expects.
//! Two URL shapes are recognised, checked in this order:
//!
//! 1. fragment form, `https://www.mediafire.com/#<key>` (also
//!    `.../#a#b#<key>`): the last `#`-delimited segment is the key;
//! 2. path form, `https://www.mediafire.com/folder/<key>/<name>`: the
//!    segment after the literal `folder/` is the key.
//!
//! An empty fragment counts as absent. Keys are ASCII word characters.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::downloader::core::{DownloadError, Result};

static PATH_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"folder/([A-Za-z0-9_]+)/?").expect("folder path pattern is valid")
});

static KEY_ALPHABET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+$").expect("folder key pattern is valid")
});

/// Opaque folder key extracted from a folder URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderRef(String);

impl FolderRef {
    /// Extract the folder key from a raw folder URL
    pub fn resolve(raw_url: &str) -> Result<Self> {
        let raw = raw_url.trim();

        if let Some((_, fragment)) = raw.split_once('#') {
            let key = fragment.rsplit('#').next().unwrap_or_default();
            if !key.is_empty() {
                return if KEY_ALPHABET.is_match(key) {
                    Ok(FolderRef(key.to_string()))
                } else {
                    Err(invalid(raw_url, format!("fragment '{}' is not a folder key", key)))
                };
            }
        }

        PATH_KEY
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .map(|key| FolderRef(key.as_str().to_string()))
            .ok_or_else(|| {
                invalid(
                    raw_url,
                    "no 'folder/<key>' segment and no '#<key>' fragment".to_string(),
                )
            })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn invalid(url: &str, reason: String) -> DownloadError {
    DownloadError::InvalidReference {
        url: url.to_string(),
        reason,
    }
}

impl FromStr for FolderRef {
    type Err = DownloadError;

    fn from_str(s: &str) -> Result<Self> {
        FolderRef::resolve(s)
    }
}

impl fmt::Display for FolderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FolderRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_and_fragment_forms_agree() {
        let keys = ["abc123", "x9y8z7w6v5", "A_b_C"];
        for key in keys {
            let resolve = |url: String| FolderRef::resolve(&url).unwrap();
            let from_path = resolve(format!("https://www.mediafire.com/folder/{key}/Some+Name"));
            let from_path_bare = resolve(format!("https://www.mediafire.com/folder/{key}"));
            let from_fragment = resolve(format!("https://www.mediafire.com/#{key}"));
            let from_nested = resolve(format!("https://app.mediafire.com/#myfiles#{key}"));

            assert_eq!(from_path.as_str(), key);
            assert_eq!(from_path, from_path_bare);
            assert_eq!(from_path, from_fragment);
            assert_eq!(from_path, from_nested);
        }
    }

    #[test]
    fn fragment_takes_precedence_over_path() {
        let folder =
            FolderRef::resolve("https://www.mediafire.com/folder/pathkey/name#fragkey").unwrap();
        assert_eq!(folder.as_str(), "fragkey");
    }

    #[test]
    fn empty_fragment_falls_back_to_path() {
        let folder = FolderRef::resolve("https://www.mediafire.com/folder/pathkey/name#").unwrap();
        assert_eq!(folder.as_str(), "pathkey");
    }

    #[test]
    fn malformed_urls_are_rejected() {
        for url in [
            "",
            "https://www.mediafire.com/",
            "https://www.mediafire.com/file/abc123/a.txt/file",
            "https://example.com/folders/abc",
            "not a url at all",
        ] {
            match FolderRef::resolve(url) {
                Err(DownloadError::InvalidReference { .. }) => {}
                other => panic!("expected InvalidReference for {url:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn bad_fragment_is_rejected() {
        assert!(matches!(
            FolderRef::resolve("https://www.mediafire.com/#not-a-key!"),
            Err(DownloadError::InvalidReference { .. })
        ));
    }

    #[test]
    fn parses_through_from_str() {
        let folder: FolderRef = "https://www.mediafire.com/folder/k3y/x".parse().unwrap();
        assert_eq!(folder.to_string(), "k3y");
    }
}
