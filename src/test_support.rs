//! Throwaway HTTP backend for exercising the client against real sockets.

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub struct CannedResponse {
	pub status: u16,
	pub content_type: String,
	pub body: Vec<u8>,
}

impl CannedResponse {
	pub fn json(body: &str) -> Self {
		Self::with_body("application/json", body.as_bytes().to_vec())
	}

	pub fn status(status: u16) -> Self {
		Self {
			status,
			content_type: "text/html".to_owned(),
			body: b"<h1>error</h1>".to_vec(),
		}
	}

	pub fn with_body(content_type: &str, body: Vec<u8>) -> Self {
		Self {
			status: 200,
			content_type: content_type.to_owned(),
			body,
		}
	}
}

type Handler = Arc<dyn Fn(&str) -> CannedResponse + Send + Sync>;

#[derive(Clone)]
struct BackendState {
	handler: Handler,
	requests: Arc<Mutex<Vec<String>>>,
}

pub struct FakeBackend {
	pub base_url: String,
	requests: Arc<Mutex<Vec<String>>>,
}

impl FakeBackend {
	/// Answer every request with `handler(path)`, query string stripped
	pub async fn start(handler: impl Fn(&str) -> CannedResponse + Send + Sync + 'static) -> Self {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let requests = Arc::new(Mutex::new(Vec::new()));

		let app = Router::new().fallback(serve_canned).with_state(BackendState {
			handler: Arc::new(handler),
			requests: requests.clone(),
		});
		tokio::spawn(async move {
			let _ = axum::serve(listener, app).await;
		});

		Self {
			base_url: format!("http://{}", addr),
			requests,
		}
	}

	/// Request targets (path and query) in arrival order
	pub fn requests(&self) -> Vec<String> {
		self.requests.lock().unwrap().clone()
	}
}

async fn serve_canned(State(state): State<BackendState>, uri: Uri) -> Response {
	let target = uri
		.path_and_query()
		.map(|target| target.as_str().to_owned())
		.unwrap_or_else(|| uri.path().to_owned());
	state.requests.lock().unwrap().push(target);

	let canned = (state.handler)(uri.path());
	let status = StatusCode::from_u16(canned.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
	(status, [(header::CONTENT_TYPE, canned.content_type)], canned.body).into_response()
}
