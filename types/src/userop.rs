use alloy::{
    core::sol_types::SolValue,
    primitives::{Address, B256, Bytes, ChainId, U256, keccak256},
};
use serde::{Deserialize, Serialize};

/// An ERC-4337 user operation (entrypoint v0.6 layout).
///
/// Integer fields go over the wire as minimal `0x`-prefixed hex quantities
/// (`"0x0"` for zero) and byte fields as `0x`-prefixed hex strings (`"0x"`
/// when empty); decoding accepts hex-string integers for every numeric
/// field.
///
/// Fields stay freely mutable until [`signature`](Self::signature) is set;
/// changing anything afterwards invalidates the signature and the operation
/// must be re-signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    /// Smart-contract account issuing the call.
    pub sender: Address,
    /// Anti-replay counter scoped to `sender`.
    pub nonce: U256,
    /// `factory ‖ factory-calldata` when the account is deployed together
    /// with its first operation; empty otherwise.
    pub init_code: Bytes,
    /// Account-specific call payload (e.g. an `execute` invocation).
    pub call_data: Bytes,
    pub call_gas_limit: U256,
    pub verification_gas_limit: U256,
    pub pre_verification_gas: U256,
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
    /// Empty when no paymaster sponsors the operation.
    pub paymaster_and_data: Bytes,
    /// 65-byte recoverable ECDSA signature; empty until signed.
    pub signature: Bytes,
}

impl UserOperation {
    /// Creates an operation with the mandatory fields; gas and fee fields
    /// default to zero and the remaining byte fields to empty. No
    /// validation happens here.
    pub fn new(sender: Address, call_data: Bytes) -> Self {
        Self {
            sender,
            nonce: U256::ZERO,
            init_code: Bytes::new(),
            call_data,
            call_gas_limit: U256::ZERO,
            verification_gas_limit: U256::ZERO,
            pre_verification_gas: U256::ZERO,
            max_fee_per_gas: U256::ZERO,
            max_priority_fee_per_gas: U256::ZERO,
            paymaster_and_data: Bytes::new(),
            signature: Bytes::new(),
        }
    }

    /// ABI-encodes the operation in its signing form.
    ///
    /// The dynamic byte fields are replaced by their keccak256 digests and
    /// the signature is excluded, so every element is a static 32-byte word
    /// and the encoding needs no offset table.
    pub fn pack_for_signature(&self) -> Bytes {
        let init_code_hash = keccak256(&self.init_code);
        let call_data_hash = keccak256(&self.call_data);
        let paymaster_and_data_hash = keccak256(&self.paymaster_and_data);

        let signing_tuple = (
            self.sender,
            self.nonce,
            init_code_hash,
            call_data_hash,
            self.call_gas_limit,
            self.verification_gas_limit,
            self.pre_verification_gas,
            self.max_fee_per_gas,
            self.max_priority_fee_per_gas,
            paymaster_and_data_hash,
        );

        signing_tuple.abi_encode().into()
    }

    /// ABI-encodes the complete operation in its full (submission) form:
    /// the byte fields are passed as raw dynamic `bytes` and the signature
    /// is included, encoded as function parameters.
    pub fn pack(&self) -> Bytes {
        let full_tuple = (
            self.sender,
            self.nonce,
            self.init_code.clone(),
            self.call_data.clone(),
            self.call_gas_limit,
            self.verification_gas_limit,
            self.pre_verification_gas,
            self.max_fee_per_gas,
            self.max_priority_fee_per_gas,
            self.paymaster_and_data.clone(),
            self.signature.clone(),
        );

        full_tuple.abi_encode_params().into()
    }

    /// Computes the chain-bound operation hash used as the signing
    /// pre-image:
    /// `keccak256(abi.encode(keccak256(signingForm), entryPoint, chainId))`.
    ///
    /// Pure in the pre-image fields; the signature never participates.
    pub fn hash(&self, entry_point: Address, chain_id: ChainId) -> B256 {
        let inner_hash = keccak256(self.pack_for_signature());
        let outer_tuple = (inner_hash, entry_point, U256::from(chain_id));
        keccak256(outer_tuple.abi_encode())
    }
}
