use alloy::{
    primitives::{Address, B256, U256},
    rpc::types::TransactionReceipt,
};
use erc4337_types::UserOperation;
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

use crate::error::ClientError;
use crate::rpc::request::ResultShape;

/// Result of `eth_estimateUserOperationGas`.
///
/// Bundlers disagree on number encoding here, so every field tolerates both
/// a plain JSON integer and a 0x-hex string; a missing or unparsable field
/// decodes as zero rather than failing the whole estimate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateUserOperationGasResult {
    #[serde(default, deserialize_with = "flexible_u256")]
    pub pre_verification_gas: U256,
    #[serde(
        default,
        deserialize_with = "flexible_u256",
        alias = "verificationGas"
    )]
    pub verification_gas_limit: U256,
    #[serde(default, deserialize_with = "flexible_u256")]
    pub call_gas_limit: U256,
}

/// Result of `eth_getUserOperationByHash` when the operation is known.
///
/// Some bundlers send `blockNumber` as a plain JSON integer instead of a
/// hex string; both are accepted, but a missing or unparsable value is a
/// data error. The hash fields may be absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationByHashResult {
    pub user_operation: UserOperation,
    pub entry_point: Address,
    #[serde(deserialize_with = "quantity_u256")]
    pub block_number: U256,
    #[serde(default)]
    pub block_hash: Option<B256>,
    #[serde(default)]
    pub transaction_hash: Option<B256>,
}

/// Result of `eth_getUserOperationReceipt` when the operation was included.
///
/// The numeric fields are mandatory hex-string quantities; only the
/// paymaster tolerates being missing or malformed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationReceiptResult {
    pub user_op_hash: B256,
    pub sender: Address,
    #[serde(deserialize_with = "hex_u256")]
    pub nonce: U256,
    /// Absent (or unparsable) when no paymaster sponsored the operation.
    #[serde(default, deserialize_with = "lenient_address")]
    pub paymaster: Option<Address>,
    #[serde(deserialize_with = "hex_u256")]
    pub actual_gas_cost: U256,
    #[serde(deserialize_with = "hex_u256")]
    pub actual_gas_used: U256,
    pub success: bool,
    #[serde(default)]
    pub reason: Option<String>,
    /// Receipt of the bundle transaction that carried the operation.
    pub receipt: TransactionReceipt,
}

/// A mandatory 0x-hex quantity; anything else is an error.
fn hex_u256<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let digits = raw.strip_prefix("0x").unwrap_or(&raw);
    U256::from_str_radix(digits, 16)
        .map_err(|_| serde::de::Error::custom(format!("invalid hex quantity: {raw}")))
}

/// A mandatory quantity, either a plain JSON integer or a 0x-hex string.
fn quantity_u256<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(U256::from(n)),
        Raw::Text(s) => {
            let digits = s.strip_prefix("0x").unwrap_or(&s);
            U256::from_str_radix(digits, 16)
                .map_err(|_| serde::de::Error::custom(format!("invalid hex quantity: {s}")))
        }
    }
}

/// Accepts a plain JSON integer or a 0x-hex string; anything else, including
/// an absent field, decodes as zero. Only the gas-estimate reply is this
/// tolerant.
fn flexible_u256<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => U256::from(n),
        Some(Raw::Text(s)) => {
            let digits = s.strip_prefix("0x").unwrap_or(&s);
            U256::from_str_radix(digits, 16).unwrap_or(U256::ZERO)
        }
        None => U256::ZERO,
    })
}

/// A missing, null, or malformed address decodes as `None`.
fn lenient_address<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok()))
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// JSON-RPC 2.0 response envelope. Either `result` or `error` is set.
#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcReply {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// Parses the envelope and promotes a populated `error` member onto the
/// bundler error taxonomy.
pub(crate) fn check_error_envelope(body: &[u8]) -> Result<JsonRpcReply, ClientError> {
    let reply: JsonRpcReply =
        serde_json::from_slice(body).map_err(|e| ClientError::Data(e.to_string()))?;
    if let Some(error) = reply.error {
        return Err(ClientError::from_rpc_error(error.code, error.message));
    }
    Ok(reply)
}

/// Decodes a structured `result`. A null result decodes through `T`, so
/// lookups use `Option<_>` as their target and map null to `None`.
pub(crate) fn decode_object<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    let reply = check_error_envelope(body)?;
    let result = reply.result.unwrap_or(Value::Null);
    serde_json::from_value(result).map_err(|e| ClientError::Data(e.to_string()))
}

/// Decodes a bare string `result` into a typed scalar.
pub(crate) fn decode_literal<T: FromLiteral>(body: &[u8]) -> Result<T, ClientError> {
    let reply = check_error_envelope(body)?;
    let raw = match reply.result {
        Some(Value::String(s)) => s,
        other => {
            return Err(ClientError::Data(format!(
                "expected a string result, got {other:?}"
            )));
        }
    };
    T::from_literal(&raw)
}

/// Scalars that parse out of a bare string result.
pub(crate) trait FromLiteral: Sized {
    fn from_literal(raw: &str) -> Result<Self, ClientError>;
}

impl FromLiteral for u64 {
    fn from_literal(raw: &str) -> Result<Self, ClientError> {
        let digits = raw.strip_prefix("0x").unwrap_or(raw);
        u64::from_str_radix(digits, 16)
            .map_err(|_| ClientError::Data(format!("invalid quantity literal: {raw}")))
    }
}

impl FromLiteral for B256 {
    fn from_literal(raw: &str) -> Result<Self, ClientError> {
        raw.parse()
            .map_err(|_| ClientError::Data(format!("invalid hash literal: {raw}")))
    }
}

/// Result decoding driven by the request's [`ResultShape`] descriptor: the
/// shape selects the decode path, and a shape the target type cannot take
/// is a data error.
pub(crate) trait DecodeResult: Sized {
    fn decode(shape: ResultShape, body: &[u8]) -> Result<Self, ClientError>;
}

/// Entry point for the client: dispatches on the declared shape.
pub(crate) fn decode<T: DecodeResult>(shape: ResultShape, body: &[u8]) -> Result<T, ClientError> {
    T::decode(shape, body)
}

macro_rules! decode_as_literal {
    ($($ty:ty),* $(,)?) => {$(
        impl DecodeResult for $ty {
            fn decode(shape: ResultShape, body: &[u8]) -> Result<Self, ClientError> {
                match shape {
                    ResultShape::Literal => decode_literal(body),
                    ResultShape::Object => Err(ClientError::Data(
                        "result shape mismatch".into(),
                    )),
                }
            }
        }
    )*};
}

macro_rules! decode_as_object {
    ($($ty:ty),* $(,)?) => {$(
        impl DecodeResult for $ty {
            fn decode(shape: ResultShape, body: &[u8]) -> Result<Self, ClientError> {
                match shape {
                    ResultShape::Object => decode_object(body),
                    ResultShape::Literal => Err(ClientError::Data(
                        "result shape mismatch".into(),
                    )),
                }
            }
        }
    )*};
}

decode_as_literal!(u64, B256);
decode_as_object!(
    Vec<Address>,
    EstimateUserOperationGasResult,
    Option<UserOperationByHashResult>,
    Option<UserOperationReceiptResult>,
);
