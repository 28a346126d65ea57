//! Error taxonomy for the parse → build → write pipeline.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parser only supports Cppcheck XML version 2.  Use --xml-version=2.")]
    UnsupportedVersion { found: Option<String> },

    #[error("No such file or directory: '{}'", .0.display())]
    FileNotFound(PathBuf),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is a malformed XML file. Did you use --xml-version=2? {detail}", path.display())]
    MalformedDocument { path: PathBuf, detail: String },

    #[error("config error in {}: {detail}", path.display())]
    Config { path: PathBuf, detail: String },

    #[error("failed to render report: {0}")]
    Render(String),
}

impl Error {
    /// Map an open/read failure on `path` to `FileNotFound` or `Io`.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound(path)
        } else {
            Error::Io { path, source }
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Error::MalformedDocument {
            path: path.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
