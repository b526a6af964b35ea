use alloy::{
    primitives::{Address, B256, Bytes, U256},
    sol,
    sol_types::{SolCall, SolValue},
};
use erc4337_types::UserOperation;

sol! {
    function createAccount(address owner, uint256 salt);
}

sol! {
    function initialize(address anOwner);
}

sol! {
    function execute(address dest, uint256 value, bytes func);
}

sol! {
    function executeBatch(address[] dest, uint256[] value, bytes[] func);
}

mod erc20 {
    alloy::sol! {
        function transfer(address to, uint256 amount) returns (bool);
    }
}

mod erc721 {
    alloy::sol! {
        function safeTransferFrom(address from, address to, uint256 tokenId, bytes data);
    }
}

mod erc1155 {
    alloy::sol! {
        function safeTransferFrom(address from, address to, uint256 id, uint256 amount, bytes data);
    }
}

/// A counterfactual `SimpleAccount`: an owner key, the factory that deploys
/// it, and the salt that fixes its address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleAccount {
    pub owner: Address,
    pub factory: Address,
    pub salt: U256,
}

impl SimpleAccount {
    pub fn new(owner: Address, factory: Address) -> Self {
        Self::with_salt(owner, factory, U256::ZERO)
    }

    pub fn with_salt(owner: Address, factory: Address, salt: U256) -> Self {
        Self {
            owner,
            factory,
            salt,
        }
    }

    /// Init code for a first operation: the factory address followed by the
    /// `createAccount(owner, salt)` calldata. The entrypoint splits it at
    /// byte 20.
    pub fn init_code(&self) -> Bytes {
        let call = createAccountCall {
            owner: self.owner,
            salt: self.salt,
        }
        .abi_encode();
        let mut out = Vec::with_capacity(20 + call.len());
        out.extend_from_slice(self.factory.as_slice());
        out.extend_from_slice(&call);
        out.into()
    }

    /// The account implementation the factory deploys proxies against. The
    /// factory constructor deploys it with its first nonce.
    pub fn implementation_address(factory: Address) -> Address {
        factory.create(1)
    }

    /// Predicts the deployed account address.
    ///
    /// The factory CREATE2-deploys an ERC-1967 proxy whose constructor
    /// arguments are the implementation and the `initialize(owner)` call,
    /// so the address is a pure function of those plus the salt.
    pub fn address(&self, implementation: Address, proxy_creation_code: &[u8]) -> Address {
        let data: Bytes = initializeCall { anOwner: self.owner }.abi_encode().into();
        let args = (implementation, data).abi_encode_params();

        let mut deploy_code = Vec::with_capacity(proxy_creation_code.len() + args.len());
        deploy_code.extend_from_slice(proxy_creation_code);
        deploy_code.extend_from_slice(&args);

        self.factory
            .create2_from_code(B256::from(self.salt), deploy_code)
    }

    /// `execute(dest, value, func)` calldata for a single call.
    pub fn execute_calldata(dest: Address, value: U256, func: Bytes) -> Bytes {
        executeCall { dest, value, func }.abi_encode().into()
    }

    /// `executeBatch` calldata for several calls executed in order.
    pub fn execute_batch_calldata(calls: &[(Address, U256, Bytes)]) -> Bytes {
        let mut dest = Vec::with_capacity(calls.len());
        let mut value = Vec::with_capacity(calls.len());
        let mut func = Vec::with_capacity(calls.len());
        for (d, v, f) in calls {
            dest.push(*d);
            value.push(*v);
            func.push(f.clone());
        }
        executeBatchCall { dest, value, func }.abi_encode().into()
    }

    /// A plain ether transfer: `execute(to, amount, "")`.
    pub fn transfer_calldata(to: Address, amount: U256) -> Bytes {
        Self::execute_calldata(to, amount, Bytes::new())
    }

    /// An ERC-20 `transfer` routed through the account.
    pub fn erc20_transfer_calldata(token: Address, to: Address, amount: U256) -> Bytes {
        let inner = erc20::transferCall { to, amount }.abi_encode();
        Self::execute_calldata(token, U256::ZERO, inner.into())
    }

    /// An ERC-721 `safeTransferFrom` routed through the account.
    pub fn erc721_transfer_calldata(
        token: Address,
        from: Address,
        to: Address,
        token_id: U256,
    ) -> Bytes {
        let inner = erc721::safeTransferFromCall {
            from,
            to,
            tokenId: token_id,
            data: Bytes::new(),
        }
        .abi_encode();
        Self::execute_calldata(token, U256::ZERO, inner.into())
    }

    /// An ERC-1155 `safeTransferFrom` routed through the account.
    pub fn erc1155_transfer_calldata(
        token: Address,
        from: Address,
        to: Address,
        id: U256,
        amount: U256,
    ) -> Bytes {
        let inner = erc1155::safeTransferFromCall {
            from,
            to,
            id,
            amount,
            data: Bytes::new(),
        }
        .abi_encode();
        Self::execute_calldata(token, U256::ZERO, inner.into())
    }

    /// Builds an unsigned operation for this account. The init code is only
    /// attached while the account is not yet deployed; afterwards it must
    /// stay empty or the entrypoint rejects the operation.
    pub fn user_operation(
        &self,
        sender: Address,
        nonce: U256,
        deployed: bool,
        call_data: Bytes,
    ) -> UserOperation {
        let mut op = UserOperation::new(sender, call_data);
        op.nonce = nonce;
        if !deployed {
            op.init_code = self.init_code();
        }
        op
    }
}
