//! A small local site for the harness to request against.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

use axum::Router;
use axum::http::header::{CONTENT_TYPE, USER_AGENT};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::get;

/// Size of the body served at `/large`.
pub const LARGE_BODY_BYTES: usize = 4096;

/// How long the stalling site goes quiet after the first body bytes.
pub const STALL: Duration = Duration::from_secs(5);

/// Where the site is listening.
#[derive(Clone, Copy, Debug)]
pub struct TestSite {
    pub addr: SocketAddr,
}

impl TestSite {
    /// `http://127.0.0.1:<port>/`
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Absolute URL for `path` on this site.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

fn router() -> Router {
    Router::new()
        .route(
            "/ok",
            get(|| async { Html("<html><body><h1>Welcome</h1></body></html>") }),
        )
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route("/plain", get(|| async { "plain text" }))
        .route(
            "/spaced",
            get(|| async { ([(CONTENT_TYPE, "Text/HTML;charset=UTF-8")], "spaced out") }),
        )
        .route(
            "/teapot",
            get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }),
        )
        .route("/moved", get(|| async { Redirect::permanent("/ok") }))
        .route("/loop", get(|| async { Redirect::temporary("/loop") }))
        .route(
            "/latin1",
            get(|| async {
                (
                    [(CONTENT_TYPE, "text/plain; charset=iso-8859-1")],
                    b"Caf\xe9 au lait".to_vec(),
                )
            }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "finally"
            }),
        )
        .route("/large", get(|| async { "x".repeat(LARGE_BODY_BYTES) }))
        .route("/agent", get(echo_user_agent))
}

async fn echo_user_agent(headers: HeaderMap) -> impl IntoResponse {
    headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Serves the site from a background thread with its own runtime.
///
/// The thread lives until the test process exits.
pub fn spawn_site() -> TestSite {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test site");
    listener
        .set_nonblocking(true)
        .expect("non-blocking listener");
    let addr = listener.local_addr().expect("test site address");

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("test site runtime");
        runtime.block_on(async move {
            let listener =
                tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            axum::serve(listener, router()).await.expect("serve test site");
        });
    });

    TestSite { addr }
}

/// An address nothing is listening on.
pub fn closed_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind throwaway port");
    listener.local_addr().expect("throwaway address")
}

/// A raw listener that answers with headers promising 100 bytes, sends
/// five of them, then stalls for [`STALL`].
pub fn spawn_stalling_site() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stalling site");
    let addr = listener.local_addr().expect("stalling site address");

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            std::thread::spawn(move || {
                let mut request = [0_u8; 1024];
                let _ = stream.read(&mut request);
                let _ = stream.write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 100\r\n\r\nhello",
                );
                let _ = stream.flush();
                std::thread::sleep(STALL);
            });
        }
    });

    addr
}
