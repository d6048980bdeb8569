use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings Error: {0}")]
    Error(String),
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Logging Error: {0}")]
    Error(String),
}

#[derive(Error, Debug)]
pub enum UtilError {
    #[error("Util Error: {0}")]
    Error(String),

    #[error("Failed to read file: {0}")]
    ReadError(String),

    #[error("File has no name")]
    MissingFileName,
}

/// Failure of a single REST call.
///
/// Non-2xx responses keep the original status code and body so callers can
/// inspect them; nothing is retried.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to send request with error: {0}")]
    Transport(String),

    #[error("Failed to parse response with error: {0}")]
    Decode(String),

    #[error("Request was cancelled")]
    Cancelled,

    #[error("Api Error: {0}")]
    Error(String),
}

impl ApiError {
    /// HTTP status of the rejected response, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

/// One variant per step of the multipart upload protocol.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Failed to start multipart upload: {0}")]
    Init(#[source] ApiError),

    #[error("Failed to request upload urls: {0}")]
    Url(#[source] ApiError),

    #[error("Failed to upload part: {0}")]
    Put(#[source] ApiError),

    #[error("Failed to finalize upload: {0}")]
    Finalize(#[source] ApiError),
}

impl UploadError {
    pub fn api_error(&self) -> &ApiError {
        match self {
            UploadError::Init(e)
            | UploadError::Url(e)
            | UploadError::Put(e)
            | UploadError::Finalize(e) => e,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.api_error().is_cancelled()
    }
}

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to access state storage: {0}")]
    Io(String),

    #[error("Failed to serialize state: {0}")]
    Serialization(String),

    #[error("State Error: {0}")]
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_preserved() {
        let err = ApiError::Status {
            status: 404,
            body: "not found".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            "Request failed with status 404: not found"
        );

        let err = UploadError::Put(err);
        assert_eq!(err.api_error().status(), Some(404));
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_cancelled_upload() {
        let err = UploadError::Url(ApiError::Cancelled);
        assert!(err.is_cancelled());
        assert_eq!(err.api_error().status(), None);
    }
}
