// ABOUTME: Shared test support: in-memory control plane and HTTP stubs.
// ABOUTME: Each integration test binary pulls in what it needs.

#![allow(dead_code)]

pub mod fake_controlplane;

use polepole::provider::ContainerSpec;
use polepole::types::{AppName, ImageRef};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Build a minimal valid spec for tests.
pub fn spec(name: &str, image: &str, port: u16) -> ContainerSpec {
    ContainerSpec::new(
        AppName::new(name).expect("test app name is valid"),
        ImageRef::parse(image).expect("test image ref is valid"),
        port,
    )
}

/// Serve a fixed HTTP status on a local port; returns the base URL.
///
/// The listener task lives until the runtime shuts down, which is fine for
/// test lifetimes.
pub async fn http_stub(status: u16) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {status} STUB\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok"
                );
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });

    format!("http://{}", addr)
}
