use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while querying the metrics API.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("cluster authentication failed: {0}")]
    Authentication(String),
    #[error("metrics API unavailable: {0}")]
    ApiUnavailable(String),
    #[error("could not decode PodMetrics response: {0}")]
    Decode(String),
}

impl From<kube::Error> for CollectError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(resp) => match resp.code {
                401 | 403 => CollectError::Authentication(resp.message),
                _ => CollectError::ApiUnavailable(format!("{} ({})", resp.message, resp.code)),
            },
            kube::Error::Auth(e) => CollectError::Authentication(e.to_string()),
            kube::Error::InferConfig(e) => CollectError::Authentication(e.to_string()),
            kube::Error::SerdeError(e) => CollectError::Decode(e.to_string()),
            other => CollectError::ApiUnavailable(other.to_string()),
        }
    }
}

/// Failures while writing the output file.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("cannot create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

/// Anything that stops the sampling loop.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error(transparent)]
    Collect(#[from] CollectError),
    #[error(transparent)]
    Write(#[from] WriteError),
}
