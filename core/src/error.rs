use thiserror::Error;

/// Errors surfaced by the bundler client and the signer.
///
/// Bundler-originated failures keep the raw JSON-RPC code and message so
/// callers can decide whether a retry is worthwhile; this layer never
/// retries on its own.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A caller-supplied value was malformed (bad private key, bad
    /// mnemonic, bad derivation path).
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The reply could not be parsed into the expected shape, or a
    /// mandatory field was missing or invalid.
    #[error("malformed response data: {0}")]
    Data(String),

    /// The bundler rejected the request parameters (`-32700`, `-32602`).
    #[error("bundler input error (code {code}): {message}")]
    InputError { code: i64, message: String },

    /// The bundler could not process the request (`-32601`, `-32600`).
    #[error("bundler processing error (code {code}): {message}")]
    ProcessingError { code: i64, message: String },

    /// A bundler-side failure: `-32603`, the server-error range, or any
    /// code this client does not recognize.
    #[error("bundler node error (code {code}): {message}")]
    NodeError { code: i64, message: String },

    /// The endpoint answered with a non-success HTTP status.
    #[error("HTTP error {status}")]
    Http { status: u16, body: String },

    /// Network-level failure issuing the request.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Producing the recoverable signature failed.
    #[error("signing failed: {0}")]
    Signing(String),
}

impl ClientError {
    /// Maps a JSON-RPC error envelope onto the bundler error taxonomy.
    pub fn from_rpc_error(code: i64, message: String) -> Self {
        match code {
            -32700 | -32602 => Self::InputError { code, message },
            -32601 | -32600 => Self::ProcessingError { code, message },
            _ => Self::NodeError { code, message },
        }
    }
}
