//! The bundler JSON-RPC surface: request variants and envelopes, the HTTP
//! client, and reply decoding.

pub mod client;
pub mod request;
pub mod response;
