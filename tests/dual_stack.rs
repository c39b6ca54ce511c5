use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use dualserve::config::{AppState, Config, Overrides};
use dualserve::server::{Server, ServerError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

const CONTENT: &[u8] = b"0123456789";

fn loopback_config(root: &std::path::Path) -> Config {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "[server]\nipv6_host = \"::1\"\nipv6_port = 0\nipv4_host = \"127.0.0.1\"\nipv4_port = 0\n\n[logging]\naccess_log = false\nlevel = \"error\"\n"
    )
    .unwrap();

    let overrides = Overrides {
        use_https: false,
        root: Some(root.to_string_lossy().into_owned()),
    };
    Config::load_from(file.path().to_str().unwrap(), &overrides).unwrap()
}

/// Send one request with `Connection: close` and return the raw response
async fn raw_request(addr: SocketAddr, head: &str) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(head.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    response
}

fn split_response(raw: &[u8]) -> (String, &[u8]) {
    let pos = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("header terminator");
    (
        String::from_utf8_lossy(&raw[..pos]).to_ascii_lowercase(),
        &raw[pos + 4..],
    )
}

#[tokio::test(flavor = "multi_thread")]
async fn test_both_listeners_serve_the_same_tree() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("ten.bin"), CONTENT).unwrap();

    let cfg = loopback_config(dir.path());
    let state = Arc::new(AppState::new(&cfg).unwrap());

    let server = match Server::bind(state) {
        Ok(server) => server,
        Err(ServerError::Bind { addr, source }) if addr.is_ipv6() => {
            eprintln!("skipping: IPv6 loopback unavailable ({source})");
            return;
        }
        Err(e) => panic!("bind failed: {e}"),
    };

    let addrs = server.local_addrs().unwrap();
    assert_eq!(addrs.len(), 2);
    assert!(addrs[0].is_ipv6());
    assert!(addrs[1].is_ipv4());

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(server.run(shutdown.clone()));

    for addr in &addrs {
        let raw = raw_request(
            *addr,
            "GET /ten.bin HTTP/1.1\r\nHost: localhost\r\nRange: bytes=8-\r\nConnection: close\r\n\r\n",
        )
        .await;
        let (head, body) = split_response(&raw);
        assert!(head.starts_with("http/1.1 206"), "{head}");
        assert!(head.contains("content-range: bytes 8-9/10"));
        assert_eq!(body, b"89");

        let raw = raw_request(
            *addr,
            "GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        let (head, body) = split_response(&raw);
        assert!(head.starts_with("http/1.1 200"), "{head}");
        assert!(String::from_utf8_lossy(body).contains("<a href=\"/ten.bin\">ten.bin</a>"));

        let raw = raw_request(
            *addr,
            "GET /missing.txt HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        let (head, body) = split_response(&raw);
        assert!(head.starts_with("http/1.1 404"), "{head}");
        assert_eq!(body, b"File Not Found");
    }

    shutdown.cancel();
    handle.await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_client_disconnect_mid_stream() {
    let dir = tempfile::tempdir().unwrap();
    // Far larger than one chunk and than the socket buffers
    let big = vec![b'x'; 8 * 1024 * 1024];
    std::fs::write(dir.path().join("big.bin"), &big).unwrap();
    std::fs::write(dir.path().join("ten.bin"), CONTENT).unwrap();

    let cfg = loopback_config(dir.path());
    let state = Arc::new(AppState::new(&cfg).unwrap());
    let server = match Server::bind(state) {
        Ok(server) => server,
        Err(ServerError::Bind { addr, source }) if addr.is_ipv6() => {
            eprintln!("skipping: IPv6 loopback unavailable ({source})");
            return;
        }
        Err(e) => panic!("bind failed: {e}"),
    };
    let addr = server.local_addrs().unwrap()[1];

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(server.run(shutdown.clone()));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /big.bin HTTP/1.1\r\nHost: localhost\r\nRange: bytes=1-\r\n\r\n")
        .await
        .unwrap();
    let mut buf = vec![0u8; 4096];
    let n = stream.read(&mut buf).await.unwrap();
    assert!(buf[..n].starts_with(b"HTTP/1.1 206"));
    // Hang up with most of the body unsent
    drop(stream);

    let raw = raw_request(
        addr,
        "GET /ten.bin HTTP/1.1\r\nHost: localhost\r\nRange: bytes=8-\r\nConnection: close\r\n\r\n",
    )
    .await;
    let (head, body) = split_response(&raw);
    assert!(head.starts_with("http/1.1 206"), "{head}");
    assert_eq!(body, b"89");

    shutdown.cancel();
    handle.await.unwrap();
}
