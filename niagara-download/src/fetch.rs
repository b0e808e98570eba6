use async_trait::async_trait;
use thiserror::Error;

/// One history point to pull from the station
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointRequest {
    /// Station-relative point path, e.g. `/Building/AHU-1/SupplyTemp`
    pub point: String,
    /// Fully built history export URL
    pub url: String,
}

impl PointRequest {
    pub fn new<P: Into<String>, U: Into<String>>(point: P, url: U) -> Self {
        Self {
            point: point.into(),
            url: url.into(),
        }
    }
}

impl<P: Into<String>, U: Into<String>> From<(P, U)> for PointRequest {
    fn from((point, url): (P, U)) -> Self {
        Self::new(point, url)
    }
}

/// Why a single fetch failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Timeout")]
    Timeout,

    #[error("HTTP {status}")]
    Http { status: u16 },

    #[error("{message}")]
    Request { message: String },

    /// The batch broke off before this point got a worker
    #[error("Cancelled")]
    Cancelled,
}

impl FetchError {
    pub fn request<S: Into<String>>(message: S) -> Self {
        Self::Request {
            message: message.into(),
        }
    }
}

/// Retrieves and stores one point's data.
///
/// Implementations own the transport, the session cookies and where the
/// payload ends up; the runner only needs the stored size.
#[async_trait]
pub trait PointFetcher: Send + Sync {
    /// Fetch and store `request`, returning the payload size in bytes
    async fn fetch(&self, request: &PointRequest) -> Result<u64, FetchError>;
}
