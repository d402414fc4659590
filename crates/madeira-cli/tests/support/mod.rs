//! Helpers shared by the CLI integration tests.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

/// The `madeira` binary with logging quietened.
pub fn cli() -> Command {
    let mut cmd = cargo_bin_cmd!("madeira");
    cmd.env("RUST_LOG", "error").env_remove("MADEIRA_DNS_CONFIG");
    cmd
}

/// Answer a single HTTP request with `status` and a JSON `body`.
///
/// The handle yields the request line and body that were received.
#[allow(dead_code)]
pub fn respond_once(status: &str, body: &str) -> (String, JoinHandle<(String, String)>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let base_url = format!("http://{}", listener.local_addr().expect("listener address"));
    let response = format!(
        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept connection");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("read request line");

        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read header");
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((key, value)) = line.split_once(':') {
                if key.trim().eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
        }

        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).expect("read body");
        stream
            .write_all(response.as_bytes())
            .expect("write response");

        (
            request_line.trim_end().to_string(),
            String::from_utf8_lossy(&body).into_owned(),
        )
    });

    (base_url, handle)
}
