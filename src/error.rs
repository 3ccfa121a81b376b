use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Reading from a stream failed.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// A named file could not be opened, read or written.
    #[error("failed to access {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A non-blank line is not of the form `word<TAB>tag`.
    #[error("line {line}: expected `word<TAB>tag`, found {content:?}")]
    InputFormat { line: usize, content: String },

    #[error("training data contains no tagged tokens")]
    EmptyCorpus,

    /// A count distribution with a zero total was met during normalization.
    #[error("distribution for {0:?} has no observations")]
    EmptyDistribution(String),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bson: {0}")]
    BsonEncode(#[from] bson::ser::Error),

    #[error("bson: {0}")]
    BsonDecode(#[from] bson::de::Error),
}

impl Error {
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File { path: path.into(), source }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
