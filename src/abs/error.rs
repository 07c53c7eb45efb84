//! Error types for shader loading, compilation, and linking.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::abs::source::StageKind;

/// Errors produced while building a shader program.
///
/// All of these are fatal to the load that produced them: there is no
/// fallback shader and no retry. The device-side variants carry the device's
/// diagnostic log so the caller can decide whether to log or propagate.
#[derive(Debug)]
pub enum ShaderError {
    /// The combined source file could not be read.
    Read { path: PathBuf, source: io::Error },
    /// The source did not contain exactly two `#type` markers.
    StageMarkerCount { found: usize },
    /// A `#type` marker carried an identifier other than `vertex` or
    /// `fragment`.
    UnexpectedStageToken { token: String },
    /// The source is missing one of the two required stages.
    MissingStage { stage: StageKind },
    /// The device failed to create a shader or program object.
    CreateResource {
        what: &'static str,
        detail: String,
    },
    /// The device rejected a stage's source.
    Compile { stage: StageKind, log: String },
    /// The device failed to link the program.
    Link { log: String },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "could not read shader source '{}': {}", path.display(), source)
            }
            Self::StageMarkerCount { found } => {
                write!(f, "expected exactly 2 '#type' markers, found {found}")
            }
            Self::UnexpectedStageToken { token } => {
                write!(f, "unexpected stage token: '{token}'")
            }
            Self::MissingStage { stage } => write!(f, "missing {stage} stage"),
            Self::CreateResource { what, detail } => {
                write!(f, "could not create {what} object: {detail}")
            }
            Self::Compile { stage, log } => {
                write!(f, "{stage} shader compilation failed: {log}")
            }
            Self::Link { log } => write!(f, "shader program linking failed: {log}"),
        }
    }
}

impl Error for ShaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}
