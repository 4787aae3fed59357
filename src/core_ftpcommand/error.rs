use thiserror::Error;

/// Why a file or transfer command gave up. The session carries on.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Access not allowed to {0}")]
    AccessDenied(String),

    #[error("File unavailable {path}: {reason}")]
    FileUnavailable { path: String, reason: String },

    #[error("Not a regular file: {0}")]
    NotAFile(String),

    #[error("Can't open data connection: {0}")]
    DataConnection(String),

    #[error("Local error: {0}")]
    Local(#[from] std::io::Error),
}

impl TransferError {
    pub fn unavailable(path: &str, err: impl std::fmt::Display) -> Self {
        TransferError::FileUnavailable {
            path: path.to_string(),
            reason: err.to_string(),
        }
    }

    /// Reply code and message sent to the client for this failure.
    pub fn reply(&self) -> (u16, &'static str) {
        match self {
            TransferError::AccessDenied(_) => {
                (553, "Requested action not taken. File name not allowed.")
            }
            TransferError::FileUnavailable { .. } => {
                (550, "Requested action not taken. File unavailable.")
            }
            TransferError::NotAFile(_) => (551, "Requested action aborted. Not a regular file."),
            TransferError::DataConnection(_) => (425, "Can't open data connection."),
            TransferError::Local(_) => {
                (451, "Requested action aborted. Local error in processing.")
            }
        }
    }
}
