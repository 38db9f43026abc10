//! Local HTTP stand-ins for the Groq and Confluence endpoints.

use axum::http::{header, HeaderMap, StatusCode};
use axum::Router;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub(crate) struct CapturedRequest {
    pub headers: HeaderMap,
    pub body: String,
}

pub(crate) struct MockEndpoint {
    pub base_url: String,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockEndpoint {
    pub fn captured(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }
}

/// Serve `POST path` on an ephemeral port.
///
/// The n-th request gets `responses[n]`; once the list runs out the last
/// response repeats.
pub(crate) async fn mock_endpoint(path: &str, responses: Vec<(u16, String)>) -> MockEndpoint {
    assert!(!responses.is_empty(), "mock needs at least one response");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured = Arc::new(Mutex::new(Vec::new()));
    let responses = Arc::new(responses);

    let store = Arc::clone(&captured);
    let route = axum::routing::post(move |headers: HeaderMap, body: String| {
        let store = Arc::clone(&store);
        let responses = Arc::clone(&responses);
        async move {
            let n = {
                let mut seen = store.lock().unwrap();
                seen.push(CapturedRequest { headers, body });
                seen.len() - 1
            };
            let (status, body) = responses[n.min(responses.len() - 1)].clone();
            (
                StatusCode::from_u16(status).unwrap(),
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
        }
    });

    let app = Router::new().route(path, route);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockEndpoint {
        base_url: format!("http://127.0.0.1:{}", addr.port()),
        captured,
    }
}
