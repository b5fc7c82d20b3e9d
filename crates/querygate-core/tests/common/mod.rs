//! In-process HTTP endpoints with hit counters

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Default)]
pub struct Hits {
    pub count: AtomicUsize,
    pub queries: Mutex<Vec<HashMap<String, String>>>,
    pub bodies: Mutex<Vec<Value>>,
}

impl Hits {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

pub struct Endpoints {
    pub addr: SocketAddr,
    pub hits: Arc<Hits>,
}

impl Endpoints {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

async fn weather(State(hits): State<Arc<Hits>>, Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    hits.count.fetch_add(1, Ordering::SeqCst);
    let city = params.get("city").cloned().unwrap_or_default();
    hits.queries.lock().unwrap().push(params);
    Json(json!({ "temp": 20, "city": city }))
}

async fn echo(State(hits): State<Arc<Hits>>, Json(body): Json<Value>) -> impl IntoResponse {
    hits.count.fetch_add(1, Ordering::SeqCst);
    hits.bodies.lock().unwrap().push(body.clone());
    ([(header::CONTENT_TYPE, "text/plain")], format!("got {}", body))
}

async fn xml(State(hits): State<Arc<Hits>>) -> impl IntoResponse {
    hits.count.fetch_add(1, Ordering::SeqCst);
    ([(header::CONTENT_TYPE, "application/xml")], "<temp>20</temp>")
}

async fn slow(State(hits): State<Arc<Hits>>) -> Json<Value> {
    hits.count.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({ "late": true }))
}

pub async fn serve() -> Endpoints {
    let hits = Arc::new(Hits::default());
    let app = Router::new()
        .route("/weather", get(weather))
        .route("/echo", post(echo))
        .route("/xml", get(xml))
        .route("/slow", get(slow))
        .with_state(hits.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Endpoints { addr, hits }
}
