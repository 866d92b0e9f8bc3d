use alloy_transport::{RpcError, TransportErrorKind};

/// An error occurring at the [`crate::RollupRpc`].
#[derive(Debug, thiserror::Error)]
pub enum RollupRpcError {
    /// The request did not reach the rollup or its response was lost. The request may or may not
    /// have been processed.
    #[error("transport error: {0}")]
    Transport(RpcError<TransportErrorKind>),
    /// The rollup processed the request and rejected it.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    /// The request or the response could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl RollupRpcError {
    /// Returns true if the rollup processed and rejected the request.
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }
}

impl From<RpcError<TransportErrorKind>> for RollupRpcError {
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        match err {
            RpcError::ErrorResp(payload) => Self::Execution(ExecutionError {
                code: Some(payload.code),
                message: payload.message.to_string(),
            }),
            RpcError::SerError(err) => Self::Serialization(err.to_string()),
            RpcError::DeserError { err, text } => Self::Serialization(format!("{err}: {text}")),
            err => Self::Transport(err),
        }
    }
}

/// An application-level error returned by the rollup, either as a JSON-RPC error or as a
/// `{ message }` result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rollup rejected the request: {message}")]
pub struct ExecutionError {
    /// The JSON-RPC error code, absent for rejections carried in a result.
    pub code: Option<i64>,
    /// The error message.
    pub message: String,
}

impl ExecutionError {
    /// Returns an [`ExecutionError`] carried in a successful response.
    pub fn message(message: impl Into<String>) -> Self {
        Self { code: None, message: message.into() }
    }
}

/// An error occurring at the [`crate::L1TransactionBuilder`].
#[derive(Debug, thiserror::Error)]
#[error("base-layer transaction builder error: {0}")]
pub struct L1BuilderError(pub Box<dyn std::error::Error + Send + Sync + 'static>);

impl L1BuilderError {
    /// Returns a [`L1BuilderError`] from the provided message.
    pub fn msg(msg: impl Into<String>) -> Self {
        Self(msg.into().into())
    }
}
