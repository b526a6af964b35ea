//! Helpers for the eth-infinitism `SimpleAccount`: deterministic address
//! prediction, factory init code, and calldata builders for the common
//! execute paths.

pub mod simple;

pub use simple::SimpleAccount;
