use thiserror::Error;

/// Failures talking to one of the remote services.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx answer. Shown as `context` alone; the status goes to the log.
    #[error("{context}")]
    Status {
        status: reqwest::StatusCode,
        context: &'static str,
    },

    #[error("unreadable response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client-side form checks. These block a submission before any request goes out.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("File is required")]
    FileRequired,

    #[error("Max file size is {}MB (got {size} bytes)", .limit / (1024 * 1024))]
    FileTooLarge { size: u64, limit: u64 },
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Api(#[from] ApiError),
}
