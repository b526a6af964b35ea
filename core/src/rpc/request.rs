use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use alloy::primitives::{Address, B256};
use erc4337_types::UserOperation;
use serde::Serialize;

/// Monotonically increasing JSON-RPC request id source.
///
/// Clones share the same sequence, so several clients can reuse one id
/// space; a fresh counter gives tests an isolated sequence. Ids are only
/// used for request/response correlation and are never persisted.
#[derive(Debug, Clone, Default)]
pub struct RequestIdCounter(Arc<AtomicU64>);

impl RequestIdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next id, starting at 1. Never resets.
    pub fn next_id(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// A single positional parameter of a bundler call.
///
/// The bundler surface only ever takes hex strings and user operations, so
/// the union is closed; serialization dispatches on the variant, never on
/// runtime type inspection.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RequestParam {
    String(String),
    UserOperation(UserOperation),
}

/// How a call's `result` field decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// A bare JSON string, parsed into a typed scalar afterwards.
    Literal,
    /// A structured value deserialized directly.
    Object,
}

/// The six calls of the bundler JSON-RPC surface.
#[derive(Debug, Clone)]
pub enum BundlerRequest {
    /// `eth_chainId`
    ChainId,
    /// `eth_supportedEntryPoints`
    SupportedEntryPoints,
    /// `eth_sendUserOperation`: submit a signed operation through the given
    /// entrypoint.
    SendUserOperation(UserOperation, Address),
    /// `eth_estimateUserOperationGas`
    EstimateUserOperationGas(UserOperation, Address),
    /// `eth_getUserOperationByHash`
    GetUserOperationByHash(B256),
    /// `eth_getUserOperationReceipt`
    GetUserOperationReceipt(B256),
}

impl BundlerRequest {
    pub fn method(&self) -> &'static str {
        match self {
            Self::ChainId => "eth_chainId",
            Self::SupportedEntryPoints => "eth_supportedEntryPoints",
            Self::SendUserOperation(..) => "eth_sendUserOperation",
            Self::EstimateUserOperationGas(..) => "eth_estimateUserOperationGas",
            Self::GetUserOperationByHash(_) => "eth_getUserOperationByHash",
            Self::GetUserOperationReceipt(_) => "eth_getUserOperationReceipt",
        }
    }

    /// Ordered positional parameters for this call.
    pub fn params(&self) -> Vec<RequestParam> {
        match self {
            Self::ChainId | Self::SupportedEntryPoints => Vec::new(),
            Self::SendUserOperation(op, entry_point)
            | Self::EstimateUserOperationGas(op, entry_point) => vec![
                RequestParam::UserOperation(op.clone()),
                RequestParam::String(entry_point.to_string()),
            ],
            Self::GetUserOperationByHash(hash) | Self::GetUserOperationReceipt(hash) => {
                vec![RequestParam::String(hash.to_string())]
            }
        }
    }

    /// Declares how this call's result decodes. The client selects the
    /// decode path from this descriptor, not from the generic result type.
    pub fn result_shape(&self) -> ResultShape {
        match self {
            Self::ChainId | Self::SendUserOperation(..) => ResultShape::Literal,
            Self::SupportedEntryPoints
            | Self::EstimateUserOperationGas(..)
            | Self::GetUserOperationByHash(_)
            | Self::GetUserOperationReceipt(_) => ResultShape::Object,
        }
    }
}

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: &'a [RequestParam],
}
