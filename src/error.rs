use thiserror::Error;

/// Failures of a single HTTP exchange with the backend.
#[derive(Debug, Error)]
pub enum TransportError {
    /// No response was received (connection refused, dns, timeout, io).
    #[error("no response from server: {0}")]
    Network(String),
    #[error("resource not found")]
    NotFound,
    #[error("server answered with status {status}")]
    Server { status: u16 },
    #[error("unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("could not encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

impl TransportError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::NotFound)
    }
}

/// Domain level failure of a resource service call.
///
/// The message is fixed and meant for the user; the transport cause stays
/// available through `source()` and is logged where the error is raised.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Could not load the {noun}. Please try again.")]
    Fetch {
        noun: &'static str,
        #[source]
        source: TransportError,
    },
    #[error("The {noun} was not found.")]
    Get {
        noun: &'static str,
        #[source]
        source: TransportError,
    },
    #[error("Could not add the {noun}. Please try again.")]
    Create {
        noun: &'static str,
        #[source]
        source: TransportError,
    },
    #[error("Could not update the {noun}. Please try again.")]
    Update {
        noun: &'static str,
        #[source]
        source: TransportError,
    },
    #[error("Could not delete the {noun}. Please try again.")]
    Delete {
        noun: &'static str,
        #[source]
        source: TransportError,
    },
}

impl ServiceError {
    pub fn transport(&self) -> &TransportError {
        match self {
            ServiceError::Fetch { source, .. }
            | ServiceError::Get { source, .. }
            | ServiceError::Create { source, .. }
            | ServiceError::Update { source, .. }
            | ServiceError::Delete { source, .. } => source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.transport().is_not_found()
    }
}
