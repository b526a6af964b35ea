use alloy::{
    primitives::{Address, B256, Bytes, ChainId},
    signers::{
        SignerSync,
        local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English},
    },
};
use erc4337_types::UserOperation;

use crate::error::ClientError;

/// Default derivation path for mnemonic keys, matching common wallets.
pub const DEFAULT_DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// A local ECDSA key that signs user operations.
///
/// Signatures are produced over the EIP-191 personal-message envelope of the
/// operation hash, which is what the reference `SimpleAccount` validates.
/// Signing is deterministic (RFC 6979), so the same key and operation always
/// yield the same signature.
#[derive(Debug, Clone)]
pub struct SignKey {
    signer: PrivateKeySigner,
    mnemonic: Option<String>,
}

impl SignKey {
    /// Generates a fresh random key.
    pub fn random() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
            mnemonic: None,
        }
    }

    /// Loads a key from a 32-byte hex private key, with or without the 0x
    /// prefix.
    pub fn from_private_key(private_key: &str) -> Result<Self, ClientError> {
        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|_| ClientError::InvalidValue("invalid private key".into()))?;
        Ok(Self {
            signer,
            mnemonic: None,
        })
    }

    /// Derives a key from a BIP-39 mnemonic phrase. `derivation_path`
    /// defaults to [`DEFAULT_DERIVATION_PATH`].
    pub fn from_mnemonic(
        phrase: &str,
        derivation_path: Option<&str>,
    ) -> Result<Self, ClientError> {
        let path = derivation_path.unwrap_or(DEFAULT_DERIVATION_PATH);
        let signer = MnemonicBuilder::<English>::default()
            .phrase(phrase)
            .derivation_path(path)
            .map_err(|e| ClientError::InvalidValue(e.to_string()))?
            .build()
            .map_err(|e| ClientError::InvalidValue(e.to_string()))?;
        Ok(Self {
            signer,
            mnemonic: Some(phrase.to_owned()),
        })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// The mnemonic this key was derived from, if any.
    pub fn mnemonic(&self) -> Option<&str> {
        self.mnemonic.as_deref()
    }

    /// Signs arbitrary bytes under the EIP-191 personal-message envelope.
    /// Returns the 65-byte `r || s || v` signature with `v` in {27, 28}.
    pub fn sign_message(&self, message: &[u8]) -> Result<Bytes, ClientError> {
        let signature = self
            .signer
            .sign_message_sync(message)
            .map_err(|e| ClientError::Signing(e.to_string()))?;
        Ok(signature.as_bytes().into())
    }

    /// Signs a 32-byte digest under the EIP-191 personal-message envelope.
    pub fn sign_hash(&self, hash: B256) -> Result<Bytes, ClientError> {
        self.sign_message(hash.as_slice())
    }

    /// Computes the operation hash for the given entrypoint and chain,
    /// signs it, and writes the signature into the operation. Returns the
    /// hash that was signed.
    pub fn sign_user_op(
        &self,
        user_op: &mut UserOperation,
        entry_point: Address,
        chain_id: ChainId,
    ) -> Result<B256, ClientError> {
        let hash = user_op.hash(entry_point, chain_id);
        user_op.signature = self.sign_hash(hash)?;
        Ok(hash)
    }
}
