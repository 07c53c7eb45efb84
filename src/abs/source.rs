//! Combined shader source files.
//!
//! A single text file carries both stages of a program, each introduced by a
//! `#type` marker line:
//!
//! ```text
//! #type vertex
//! <vertex stage source>
//! #type fragment
//! <fragment stage source>
//! ```
//!
//! The two markers may appear in either order. Anything before the first
//! marker is discarded.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use log::debug;

use crate::abs::error::ShaderError;

const STAGE_MARKER: &str = "#type";

/// One compilation unit of a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    /// Parses the identifier that follows a `#type` marker.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "vertex" => Some(Self::Vertex),
            "fragment" => Some(Self::Fragment),
            _ => None,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

struct Marker<'a> {
    /// Identifier as written on the marker line, trimmed.
    token: &'a str,
    /// Verbatim segment between this marker's identifier and the next marker.
    body: &'a str,
}

/// Locates every `#type` marker: the keyword followed by at least one blank.
/// The identifier token is taken from the rest of the marker line, while the
/// body is everything after the identifier up to the next marker.
fn find_markers(text: &str) -> Vec<Marker<'_>> {
    let mut starts = Vec::new();
    let mut at = 0;
    while let Some(found) = text[at..].find(STAGE_MARKER) {
        let start = at + found;
        let after = start + STAGE_MARKER.len();
        if text[after..].starts_with([' ', '\t']) {
            starts.push(start);
        }
        at = after;
    }

    let mut markers = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let after = start + STAGE_MARKER.len();
        let rest = &text[after..];

        let line_end = rest.find('\n').map(|n| after + n).unwrap_or(text.len());
        let token = text[after..line_end].trim();

        let blanks = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        let ident = &rest[blanks..];
        let ident_len = ident.len()
            - ident
                .trim_start_matches(|c: char| c.is_ascii_alphabetic())
                .len();

        let body_start = after + blanks + ident_len;
        let body_end = starts.get(i + 1).copied().unwrap_or(text.len());
        markers.push(Marker {
            token,
            body: &text[body_start..body_end],
        });
    }
    markers
}

/// A parsed combined shader source: one body of text per stage.
#[derive(Debug, Clone)]
pub struct ShaderSource {
    origin: String,
    stages: HashMap<StageKind, String>,
}

impl ShaderSource {
    /// Reads and parses a combined source file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ShaderError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = Self::parse(path.display().to_string(), &text)?;
        debug!("loaded shader source from '{}'", parsed.origin);
        Ok(parsed)
    }

    /// Parses combined source text already in memory (e.g. `include_str!`).
    ///
    /// `origin` is only used in diagnostics. A repeated stage identifier
    /// overwrites the earlier body, so the resulting map can be missing the
    /// other stage; the program build step guards against that.
    pub fn parse(origin: impl Into<String>, text: &str) -> Result<Self, ShaderError> {
        let markers = find_markers(text);
        if markers.len() != 2 {
            return Err(ShaderError::StageMarkerCount {
                found: markers.len(),
            });
        }

        let mut stages = HashMap::new();
        for marker in markers {
            let kind = StageKind::from_token(marker.token).ok_or_else(|| {
                ShaderError::UnexpectedStageToken {
                    token: marker.token.to_string(),
                }
            })?;
            stages.insert(kind, marker.body.to_string());
        }

        Ok(Self {
            origin: origin.into(),
            stages,
        })
    }

    /// Returns the path or label this source was parsed from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Returns the body of the given stage, if the source contained one.
    pub fn stage(&self, kind: StageKind) -> Option<&str> {
        self.stages.get(&kind).map(String::as_str)
    }
}
