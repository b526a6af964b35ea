use alloy::primitives::{Address, B256};
use erc4337_types::UserOperation;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, trace};

use crate::error::ClientError;

use super::request::{BundlerRequest, JsonRpcRequest, RequestIdCounter};
use super::response::{
    self, EstimateUserOperationGasResult, UserOperationByHashResult, UserOperationReceiptResult,
};

/// HTTP client for an ERC-4337 bundler endpoint.
///
/// Cheap to clone; clones share the underlying connection pool and the
/// request id sequence.
#[derive(Debug, Clone)]
pub struct BundlerClient {
    http: reqwest::Client,
    url: String,
    request_ids: RequestIdCounter,
}

impl BundlerClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_parts(reqwest::Client::new(), url, RequestIdCounter::new())
    }

    /// Builds a client over an existing HTTP client and id sequence, so
    /// several bundler clients can share both.
    pub fn with_parts(
        http: reqwest::Client,
        url: impl Into<String>,
        request_ids: RequestIdCounter,
    ) -> Self {
        Self {
            http,
            url: url.into(),
            request_ids,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// `eth_chainId`
    pub async fn chain_id(&self) -> Result<u64, ClientError> {
        self.call(BundlerRequest::ChainId).await
    }

    /// `eth_supportedEntryPoints`
    pub async fn supported_entry_points(&self) -> Result<Vec<Address>, ClientError> {
        self.call(BundlerRequest::SupportedEntryPoints).await
    }

    /// `eth_sendUserOperation`: submits a signed operation and returns its
    /// hash. Acceptance here means the bundler queued it, not inclusion.
    pub async fn send_user_operation(
        &self,
        user_op: &UserOperation,
        entry_point: Address,
    ) -> Result<B256, ClientError> {
        self.call(BundlerRequest::SendUserOperation(
            user_op.clone(),
            entry_point,
        ))
        .await
    }

    /// `eth_estimateUserOperationGas`
    pub async fn estimate_user_operation_gas(
        &self,
        user_op: &UserOperation,
        entry_point: Address,
    ) -> Result<EstimateUserOperationGasResult, ClientError> {
        self.call(BundlerRequest::EstimateUserOperationGas(
            user_op.clone(),
            entry_point,
        ))
        .await
    }

    /// `eth_getUserOperationByHash`. `None` when the bundler does not know
    /// the hash.
    pub async fn get_user_operation_by_hash(
        &self,
        hash: B256,
    ) -> Result<Option<UserOperationByHashResult>, ClientError> {
        self.call(BundlerRequest::GetUserOperationByHash(hash))
            .await
    }

    /// `eth_getUserOperationReceipt`. `None` until the operation is
    /// included on chain.
    pub async fn get_user_operation_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<UserOperationReceiptResult>, ClientError> {
        self.call(BundlerRequest::GetUserOperationReceipt(hash))
            .await
    }

    /// The request's shape descriptor selects the decode path.
    async fn call<T: response::DecodeResult>(
        &self,
        request: BundlerRequest,
    ) -> Result<T, ClientError> {
        let body = self.post(&request).await?;
        response::decode(request.result_shape(), &body)
    }

    async fn post(&self, request: &BundlerRequest) -> Result<Vec<u8>, ClientError> {
        let id = self.request_ids.next_id();
        let params = request.params();
        let envelope = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method: request.method(),
            params: &params,
        };

        debug!(method = request.method(), id, url = %self.url, "sending bundler request");

        let http_response = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&envelope)
            .send()
            .await?;

        let status = http_response.status();
        let body = http_response.bytes().await?;
        trace!(
            method = request.method(),
            id,
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&body),
            "bundler response"
        );

        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(body.to_vec())
    }
}
