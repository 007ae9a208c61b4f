use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

/// Address of an audio object: either a POSIX-style path or a URL.
///
/// Parsing tries a URL with a scheme first and falls back to a plain path, so
/// `s3://bucket/a.wav` is a URL while `/data/a.wav` and `a.wav` are paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Reference {
    Path(PosixPath),
    Url(Url),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("reference is empty")]
    Empty,
    #[error("cannot determine format from empty path: {0}")]
    EmptyUrlPath(String),
}

impl Reference {
    pub fn parse(raw: &str) -> Result<Self, ReferenceError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ReferenceError::Empty);
        }

        match Url::parse(raw) {
            Ok(url) if !url.cannot_be_a_base() => Ok(Self::Url(url)),
            _ => Ok(Self::Path(PosixPath::new(raw))),
        }
    }

    /// Returns a new reference with `name` appended as the final path segment.
    pub fn append_name(&self, name: &str) -> Self {
        match self {
            Self::Path(path) => Self::Path(path.join(name)),
            Self::Url(url) => {
                let base = PosixPath::new(url.path().trim_start_matches('/'));
                let joined = base.join(name);
                let mut appended = url.clone();
                appended.set_path(&format!("/{}", joined.segments().join("/")));
                Self::Url(appended)
            }
        }
    }

    /// File extension of the final path segment, without the dot.
    pub fn extension(&self) -> Result<String, ReferenceError> {
        match self {
            Self::Path(path) => Ok(path.extension().to_string()),
            Self::Url(url) => {
                if url.path().is_empty() || url.path() == "/" {
                    return Err(ReferenceError::EmptyUrlPath(self.redacted()));
                }
                Ok(PosixPath::new(url.path()).extension().to_string())
            }
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Self::Url(url) => Some(url),
            Self::Path(_) => None,
        }
    }

    /// Display form safe for logs and error messages: URL passwords and
    /// credential-like query values are masked.
    pub fn redacted(&self) -> String {
        let Self::Url(url) = self else {
            return self.to_string();
        };

        let mut masked = url.clone();
        if masked.password().is_some() {
            let _ = masked.set_password(Some(REDACTED));
        }

        if masked.query().is_some() {
            let pairs: Vec<(String, String)> = url
                .query_pairs()
                .map(|(key, value)| {
                    let lowered = key.to_lowercase();
                    if SENSITIVE_QUERY_KEYS.iter().any(|k| lowered.contains(k)) {
                        (key.into_owned(), REDACTED.to_string())
                    } else {
                        (key.into_owned(), value.into_owned())
                    }
                })
                .collect();
            masked.query_pairs_mut().clear().extend_pairs(pairs);
        }

        masked.to_string()
    }
}

const REDACTED: &str = "REDACTED";

const SENSITIVE_QUERY_KEYS: [&str; 6] = [
    "signature",
    "token",
    "secret",
    "credential",
    "password",
    "sig",
];

impl FromStr for Reference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Reference {
    type Error = ReferenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Reference> for String {
    fn from(reference: Reference) -> Self {
        reference.to_string()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path),
            Self::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Lexically normalized POSIX path: repeated slashes and `.` segments are
/// dropped, `..` is kept as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosixPath {
    absolute: bool,
    segments: Vec<String>,
}

impl PosixPath {
    pub fn new(raw: &str) -> Self {
        Self {
            absolute: raw.starts_with('/'),
            segments: split_segments(raw),
        }
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn join(&self, name: &str) -> Self {
        let tail = Self::new(name);
        if tail.absolute {
            return tail;
        }

        let mut segments = self.segments.clone();
        segments.extend(tail.segments);
        Self {
            absolute: self.absolute,
            segments,
        }
    }

    pub fn extension(&self) -> &str {
        let Some(name) = self.file_name() else {
            return "";
        };

        match name.rfind('.') {
            Some(idx) if idx > 0 && idx < name.len() - 1 => &name[idx + 1..],
            _ => "",
        }
    }
}

impl fmt::Display for PosixPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.segments.join("/");
        match (self.absolute, joined.is_empty()) {
            (true, _) => write!(f, "/{}", joined),
            (false, true) => f.write_str("."),
            (false, false) => f.write_str(&joined),
        }
    }
}

fn split_segments(raw: &str) -> Vec<String> {
    raw.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .map(String::from)
        .collect()
}
