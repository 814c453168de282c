//! Error kinds shared by every core component (spec §7). Leaf scoring terms
//! and chromosome elements never swallow an error; they propagate it up to
//! the transform, which propagates it to `Workspace::run`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("bad argument: {0}")]
    BadArgument(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("ligand error: feature {feature} required {required}, found {found}")]
    LigandError {
        feature: String,
        required: usize,
        found: usize,
    },

    #[error("file parse error in {file}{}: {message}", line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    FileParseError {
        file: String,
        line: Option<usize>,
        message: String,
    },

    #[error("file write error for {file}: {message}")]
    FileWriteError { file: String, message: String },

    #[error("file read error for {file}: {message}")]
    FileReadError { file: String, message: String },

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("internal assertion failed: {0}")]
    Assertion(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn bad_argument<S: Into<String>>(msg: S) -> CoreError {
        CoreError::BadArgument(msg.into())
    }

    pub fn invalid_request<S: Into<String>>(msg: S) -> CoreError {
        CoreError::InvalidRequest(msg.into())
    }
}
