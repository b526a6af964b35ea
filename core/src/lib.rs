//! ERC-4337 bundler client: the JSON-RPC protocol surface, the HTTP
//! transport, response decoding, and local user-operation signing.

pub mod error;
pub mod rpc;
pub mod signer;

pub use error::ClientError;
pub use rpc::client::BundlerClient;
pub use rpc::request::{BundlerRequest, RequestIdCounter, RequestParam, ResultShape};
pub use rpc::response::{
    EstimateUserOperationGasResult, UserOperationByHashResult, UserOperationReceiptResult,
};
pub use signer::SignKey;
