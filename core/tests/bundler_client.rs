//! Exercises the bundler client against a local HTTP listener, asserting
//! both the request envelopes it sends and the decoding of replies.

use std::net::SocketAddr;

use alloy::primitives::{U256, address, b256};
use erc4337_core::{BundlerClient, ClientError};
use erc4337_types::UserOperation;
use serde_json::Value;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::mpsc,
};

/// Serves one canned HTTP response per incoming connection and forwards
/// every received JSON body for inspection.
async fn serve(replies: Vec<(u16, String)>) -> (SocketAddr, mpsc::UnboundedReceiver<Value>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        for (status, body) in replies {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request_body = read_request_body(&mut stream).await;
            tx.send(serde_json::from_slice(&request_body).unwrap())
                .unwrap();

            let reason = if status == 200 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\n\
                 content-type: application/json\r\n\
                 content-length: {}\r\n\
                 connection: close\r\n\r\n{body}",
                body.len(),
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
    });

    (addr, rx)
}

async fn read_request_body(stream: &mut tokio::net::TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    loop {
        let mut chunk = [0u8; 4096];
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before the request completed");
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let body_start = end + 4;
        let headers = String::from_utf8_lossy(&buf[..end]).to_string();
        let content_length = headers
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())?
            })
            .unwrap_or(0);
        if buf.len() >= body_start + content_length {
            return buf[body_start..body_start + content_length].to_vec();
        }
    }
}

fn ok(body: &str) -> (u16, String) {
    (200, body.to_string())
}

#[tokio::test]
async fn chain_id_sends_a_well_formed_envelope_and_decodes_the_literal() {
    let (addr, mut requests) =
        serve(vec![ok(r#"{"jsonrpc":"2.0","id":1,"result":"0x13881"}"#)]).await;
    let client = BundlerClient::new(format!("http://{addr}"));

    let chain_id = client.chain_id().await.unwrap();
    assert_eq!(chain_id, 80001);

    let envelope = requests.recv().await.unwrap();
    assert_eq!(envelope["jsonrpc"], "2.0");
    assert_eq!(envelope["id"], 1);
    assert_eq!(envelope["method"], "eth_chainId");
    assert_eq!(envelope["params"], serde_json::json!([]));
}

#[tokio::test]
async fn request_ids_increase_across_calls() {
    let (addr, mut requests) = serve(vec![
        ok(r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#),
        ok(r#"{"jsonrpc":"2.0","id":2,"result":"0x1"}"#),
    ])
    .await;
    let client = BundlerClient::new(format!("http://{addr}"));

    client.chain_id().await.unwrap();
    client.chain_id().await.unwrap();

    assert_eq!(requests.recv().await.unwrap()["id"], 1);
    assert_eq!(requests.recv().await.unwrap()["id"], 2);
}

#[tokio::test]
async fn send_user_operation_posts_the_operation_and_entry_point() {
    let (addr, mut requests) = serve(vec![ok(
        r#"{"jsonrpc":"2.0","id":1,"result":"0x2ee75abcf48ee1429aaeac495cfa236fba8270e06dc5cc1be397d36885e1aef3"}"#,
    )])
    .await;
    let client = BundlerClient::new(format!("http://{addr}"));

    let mut op = UserOperation::new(
        address!("0xDb4c934675Ddeb4981F9756cd247d0C50692d535"),
        alloy::primitives::bytes!("0xb61d27f6"),
    );
    op.nonce = U256::from(7u64);
    let entry_point = address!("0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");

    let hash = client.send_user_operation(&op, entry_point).await.unwrap();
    assert_eq!(
        hash,
        b256!("0x2ee75abcf48ee1429aaeac495cfa236fba8270e06dc5cc1be397d36885e1aef3")
    );

    let envelope = requests.recv().await.unwrap();
    assert_eq!(envelope["method"], "eth_sendUserOperation");
    let params = envelope["params"].as_array().unwrap();
    assert_eq!(params.len(), 2);
    assert_eq!(
        params[0]["sender"],
        "0xdb4c934675ddeb4981f9756cd247d0c50692d535"
    );
    assert_eq!(params[0]["nonce"], "0x7");
    assert_eq!(params[0]["callData"], "0xb61d27f6");
    assert_eq!(params[1], "0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789");
}

#[tokio::test]
async fn estimate_decodes_mixed_number_encodings() {
    let (addr, _requests) = serve(vec![ok(
        r#"{"jsonrpc":"2.0","id":1,"result":{"preVerificationGas":49133,"verificationGasLimit":"0x9adf","callGasLimit":"0x814c"}}"#,
    )])
    .await;
    let client = BundlerClient::new(format!("http://{addr}"));

    let op = UserOperation::new(
        address!("0xDb4c934675Ddeb4981F9756cd247d0C50692d535"),
        alloy::primitives::Bytes::new(),
    );
    let estimate = client
        .estimate_user_operation_gas(&op, address!("0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789"))
        .await
        .unwrap();

    assert_eq!(estimate.pre_verification_gas, U256::from(49133u64));
    assert_eq!(estimate.verification_gas_limit, U256::from(0x9adfu64));
    assert_eq!(estimate.call_gas_limit, U256::from(0x814cu64));
}

#[tokio::test]
async fn supported_entry_points_decode_as_addresses() {
    let (addr, _requests) = serve(vec![ok(
        r#"{"jsonrpc":"2.0","id":1,"result":["0x5ff137d4b0fdcd49dca30c7cf57e578a026d2789"]}"#,
    )])
    .await;
    let client = BundlerClient::new(format!("http://{addr}"));

    let entry_points = client.supported_entry_points().await.unwrap();
    assert_eq!(
        entry_points,
        vec![address!("0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789")]
    );
}

#[tokio::test]
async fn rpc_errors_map_onto_the_taxonomy() {
    let (addr, _requests) = serve(vec![ok(
        r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"invalid UserOperation struct/fields"}}"#,
    )])
    .await;
    let client = BundlerClient::new(format!("http://{addr}"));

    match client.chain_id().await {
        Err(ClientError::InputError { code, message }) => {
            assert_eq!(code, -32602);
            assert_eq!(message, "invalid UserOperation struct/fields");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn non_success_status_is_an_http_error() {
    let (addr, _requests) = serve(vec![(503, r#"{"error":"overloaded"}"#.to_string())]).await;
    let client = BundlerClient::new(format!("http://{addr}"));

    match client.chain_id().await {
        Err(ClientError::Http { status, body }) => {
            assert_eq!(status, 503);
            assert!(body.contains("overloaded"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn unknown_hashes_look_up_as_none() {
    let (addr, mut requests) = serve(vec![
        ok(r#"{"jsonrpc":"2.0","id":1,"result":null}"#),
        ok(r#"{"jsonrpc":"2.0","id":2,"result":null}"#),
    ])
    .await;
    let client = BundlerClient::new(format!("http://{addr}"));
    let hash = b256!("0x59ce54ca5ba00d0e087e8013a51e689a766f443b598a2d4fe511dba87889c7b9");

    assert!(client.get_user_operation_by_hash(hash).await.unwrap().is_none());
    assert!(client.get_user_operation_receipt(hash).await.unwrap().is_none());

    let envelope = requests.recv().await.unwrap();
    assert_eq!(envelope["method"], "eth_getUserOperationByHash");
    assert_eq!(
        envelope["params"][0],
        "0x59ce54ca5ba00d0e087e8013a51e689a766f443b598a2d4fe511dba87889c7b9"
    );
    let envelope = requests.recv().await.unwrap();
    assert_eq!(envelope["method"], "eth_getUserOperationReceipt");
}
