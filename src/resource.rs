//! Resource path handles for sink output.
//!
//! A [`ResourceId`] is a purely syntactic handle over a cloud object URI
//! (`gs://`, `s3://`, `abfss://`, ...), a `file://` URI, or a plain local
//! path. The directory/file distinction follows the object-store convention:
//! a handle denotes a directory iff its string form ends with `/`.
//!
//! Nothing in this module touches the file system. Resolution is a string
//! computation, so equal inputs always produce equal handles.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::error::{InvalidSegmentSnafu, InvalidUriSnafu, NotADirectorySnafu, ResourceError};

const SCHEME_URI: &str = r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*)://(?P<rest>.*)$";

fn scheme_uri() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SCHEME_URI).unwrap())
}

/// How a name resolved under a directory should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveKind {
    File,
    Directory,
}

/// Handle to a file or directory in some storage backend.
///
/// Stores the `scheme://authority` root (empty for local paths) separately
/// from the path portion so resolution never has to re-parse the URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    root: String,
    path: String,
}

impl ResourceId {
    /// Parse a URI or local path into a handle.
    ///
    /// A bucket root without a trailing slash (`gs://bucket`) normalizes to
    /// the bucket's root directory (`gs://bucket/`).
    pub fn from_uri(uri: impl AsRef<str>) -> Result<Self, ResourceError> {
        let uri = uri.as_ref();
        ensure!(!uri.is_empty(), InvalidUriSnafu { uri });

        if let Some(caps) = scheme_uri().captures(uri) {
            let scheme = caps
                .name("scheme")
                .expect("scheme group is always captured")
                .as_str();
            let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or("");
            ensure!(!rest.is_empty(), InvalidUriSnafu { uri });

            let (authority, path) = match rest.find('/') {
                Some(idx) => (&rest[..idx], &rest[idx..]),
                None => (rest, "/"),
            };

            Ok(Self {
                root: format!("{scheme}://{authority}"),
                path: path.to_string(),
            })
        } else {
            // A stray "://" that the scheme pattern rejected is malformed,
            // not a local path.
            ensure!(!uri.contains("://"), InvalidUriSnafu { uri });

            Ok(Self {
                root: String::new(),
                path: uri.to_string(),
            })
        }
    }

    /// Whether this handle denotes a directory.
    pub fn is_directory(&self) -> bool {
        self.path.ends_with('/')
    }

    /// The directory containing this resource; the resource itself when it
    /// is already a directory.
    pub fn current_directory(&self) -> ResourceId {
        if self.is_directory() {
            return self.clone();
        }

        let path = match self.path.rfind('/') {
            Some(idx) => self.path[..=idx].to_string(),
            // Relative single-segment local path.
            None => "./".to_string(),
        };

        ResourceId {
            root: self.root.clone(),
            path,
        }
    }

    /// Resolve `name` under this directory.
    ///
    /// Fails on a non-directory receiver and on empty or multi-segment
    /// names. Glob characters are allowed, so the result may name a match
    /// pattern rather than a single object.
    pub fn resolve(&self, name: &str, kind: ResolveKind) -> Result<ResourceId, ResourceError> {
        ensure!(
            self.is_directory(),
            NotADirectorySnafu {
                uri: self.to_string()
            }
        );
        ensure!(
            !name.is_empty() && !name.contains('/'),
            InvalidSegmentSnafu { name }
        );

        let mut path = format!("{}{}", self.path, name);
        if kind == ResolveKind::Directory {
            path.push('/');
        }

        Ok(ResourceId {
            root: self.root.clone(),
            path,
        })
    }

    /// Final name segment, or `None` for directories.
    pub fn filename(&self) -> Option<&str> {
        if self.is_directory() {
            return None;
        }
        match self.path.rfind('/') {
            Some(idx) => Some(&self.path[idx + 1..]),
            None => Some(&self.path),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.path)
    }
}
