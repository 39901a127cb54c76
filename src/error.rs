//! Error types for the mesh operator

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    /// Listing workloads of one kind failed; the rest of the readiness pass was skipped
    #[error("failed to list {kind} resources: {source}")]
    ProbeFetchError {
        kind: String,
        #[source]
        source: Box<Error>,
    },

    /// Writing the control plane status failed
    #[error("failed to update status: {0}")]
    PersistenceError(#[source] Box<Error>),

    /// A resource store backend rejected or failed a request
    #[error("resource store error: {0}")]
    StoreError(String),

    /// Operator configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Wrap a listing failure for the given workload kind
    pub fn probe_fetch(kind: impl Into<String>, source: Error) -> Self {
        Self::ProbeFetchError {
            kind: kind.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a status write failure
    pub fn persistence(source: Error) -> Self {
        Self::PersistenceError(Box::new(source))
    }

    /// Whether the controller should retry quickly
    pub fn is_retriable(&self) -> bool {
        match self {
            Error::KubeError(_) | Error::StoreError(_) => true,
            Error::ProbeFetchError { source, .. } | Error::PersistenceError(source) => {
                source.is_retriable()
            }
            Error::ConfigError(_) => false,
        }
    }

    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Error::KubeError(_) => "kube",
            Error::ProbeFetchError { .. } => "probe",
            Error::PersistenceError(_) => "persistence",
            Error::StoreError(_) => "store",
            Error::ConfigError(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
