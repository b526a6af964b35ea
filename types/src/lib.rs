//! Core ERC-4337 types: the `UserOperation` entity, its canonical ABI
//! encodings, and the chain-bound operation hash.

pub mod userop;

pub use userop::UserOperation;
