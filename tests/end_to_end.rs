//! # End-to-End Loopback Tests
//!
//! Binds a real coordinator on an ephemeral loopback port and drives it
//! with the client over TCP.

use futures::future::join_all;
use sfe_core::{analyze, order, ClientConfig, CodingMode, OrderedSymbols, ServerConfig};
use sfe_transport::{render_table, SfeClient, SfeServer};
use std::net::SocketAddr;
use std::time::Instant;

async fn spawn_server(mode: CodingMode) -> SocketAddr {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        coding_mode: mode,
        ..ServerConfig::default()
    };
    let server = SfeServer::bind(config).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.serve());
    addr
}

fn client_config(addr: SocketAddr) -> ClientConfig {
    ClientConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        io_timeout_ms: Some(5_000),
        ..ClientConfig::default()
    }
}

async fn code_text(addr: SocketAddr, text: &[u8]) -> (OrderedSymbols, Vec<String>) {
    let ordered = order(analyze(text).records());
    let client = SfeClient::connect(&client_config(addr)).await.unwrap();
    let replies = client.encode_all(&ordered).await.unwrap();
    assert_eq!(replies.len(), ordered.len());
    let codes = replies.iter().map(|r| r.render()).collect();
    (ordered, codes)
}

/// No code word may be a prefix of another.
fn assert_prefix_free(codes: &[String]) {
    for (i, a) in codes.iter().enumerate() {
        for (j, b) in codes.iter().enumerate() {
            if i != j {
                assert!(!b.starts_with(a.as_str()), "{} is a prefix of {}", a, b);
            }
        }
    }
}

#[tokio::test]
async fn test_aaab_table() {
    let t = Instant::now();

    let addr = spawn_server(CodingMode::Pipelined).await;
    let ordered = order(analyze(b"aaab").records());
    let client = SfeClient::connect(&client_config(addr)).await.unwrap();
    let replies = client.encode_all(&ordered).await.unwrap();

    assert_eq!(
        render_table(&ordered, &replies),
        b"SHANNON-FANO-ELIAS Codes:\nSymbol a, Code: 01\nSymbol b, Code: 111\n"
    );

    println!("test_aaab_table: Testing Overhead = {:?}", t.elapsed());
}

#[tokio::test]
async fn test_single_symbol() {
    let addr = spawn_server(CodingMode::Sequential).await;
    let (_, codes) = code_text(addr, b"zzzz").await;
    assert_eq!(codes, vec!["1"]);
}

#[tokio::test]
async fn test_empty_input_exchanges_nothing() {
    let addr = spawn_server(CodingMode::Pipelined).await;
    let (ordered, codes) = code_text(addr, b"").await;
    assert!(ordered.is_empty());
    assert!(codes.is_empty());
    assert_eq!(render_table(&ordered, &[]), b"SHANNON-FANO-ELIAS Codes:\n");
}

/// Many symbols exercise the worker relay; both modes must agree.
#[tokio::test]
async fn test_modes_agree_on_rich_alphabet() {
    let text: Vec<u8> = (0u8..95)
        .flat_map(|i| std::iter::repeat(b' ' + i).take(1 + (i as usize % 7)))
        .collect();

    let sequential = spawn_server(CodingMode::Sequential).await;
    let pipelined = spawn_server(CodingMode::Pipelined).await;
    let (ordered, seq_codes) = code_text(sequential, &text).await;
    let (_, pipe_codes) = code_text(pipelined, &text).await;

    assert_eq!(ordered.len(), 95);
    assert_eq!(seq_codes, pipe_codes);
    assert_prefix_free(&seq_codes);

    for (record, code) in ordered.iter().zip(&seq_codes) {
        let n = (-record.probability.log2()).ceil() as usize + 1;
        assert_eq!(code.len(), n, "glyph {}", record.glyph_char());
    }
}

#[tokio::test]
async fn test_concurrent_sessions_are_isolated() {
    let addr = spawn_server(CodingMode::Pipelined).await;
    let texts: [&[u8]; 5] = [
        b"aaab",
        b"mississippi",
        b"abracadabra",
        b"the quick brown fox",
        b"aaab",
    ];

    let sessions = texts.iter().map(|text| code_text(addr, text));
    let results = join_all(sessions).await;

    assert_eq!(results[0].1, vec!["01", "111"]);
    assert_eq!(results[0].1, results[4].1);
    for (_, codes) in &results {
        assert_prefix_free(codes);
    }
}

#[tokio::test]
async fn test_connect_refused_is_setup_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = match SfeClient::connect(&client_config(addr)).await {
        Ok(_) => panic!("connect to a closed port succeeded"),
        Err(e) => e,
    };
    assert!(matches!(err, sfe_core::SfeError::TransportSetup { op: "connect", .. }));
}
