//! In-process fake of the catalog REST API.
//!
//! Serves `GET/POST /api/<collection>` and `PUT/DELETE /api/<collection>/{id}`
//! from an in-memory store, records every request, and can be told to fail
//! the next request with a given status.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::http::{Method, StatusCode};
use axum::routing::{get, put};
use axum::{Json, Router};
use catalog_client::{CatalogApi, CatalogClient};
use catalog_core::schema::RecordSchema;
use serde_json::{json, Map, Value};

type Shared = Arc<Mutex<MockState>>;
type HandlerResult = Result<Json<Value>, (StatusCode, String)>;

#[derive(Default)]
pub struct MockState {
    /// Stored records, as the server would serialize them.
    pub records: Vec<Value>,
    /// `(method, path)` of every request received.
    pub requests: Vec<(Method, String)>,
    /// Part names of the most recent multipart body.
    pub last_parts: Vec<String>,
    /// Status to return for the next request instead of handling it.
    pub fail_next: Option<StatusCode>,
    /// Identifiers handed out by create, in order.
    pub next_ids: VecDeque<String>,
    /// Leave `image`/`contentType` out of create/update responses.
    pub omit_image_in_response: bool,
    counter: u32,
}

pub struct MockApi {
    pub base_url: String,
    pub state: Shared,
}

impl MockApi {
    /// Start the fake API for `collection` on an ephemeral port.
    pub async fn spawn(collection: &str) -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::default()));

        let app = Router::new()
            .route(&format!("/api/{collection}"), get(list).post(create))
            .route(
                &format!("/api/{collection}/{{id}}"),
                put(update).delete(remove),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock API server");
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
        }
    }

    /// Build a client for `schema` pointed at this server.
    pub fn client(&self, schema: &'static RecordSchema) -> CatalogClient {
        let api = CatalogApi::new(&self.base_url, schema, Duration::from_secs(5))
            .expect("valid mock URL");
        CatalogClient::new(api, schema)
    }

    pub fn seed(&self, records: Vec<Value>) {
        self.state.lock().unwrap().records = records;
    }

    pub fn fail_next(&self, status: StatusCode) {
        self.state.lock().unwrap().fail_next = Some(status);
    }

    pub fn hand_out_id(&self, id: &str) {
        self.state.lock().unwrap().next_ids.push_back(id.to_string());
    }

    pub fn omit_image_in_response(&self) {
        self.state.lock().unwrap().omit_image_in_response = true;
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn methods(&self) -> Vec<Method> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .map(|(m, _)| m.clone())
            .collect()
    }

    pub fn last_parts(&self) -> Vec<String> {
        self.state.lock().unwrap().last_parts.clone()
    }

    pub fn stored(&self, id: &str) -> Option<Value> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .find(|r| r["_id"] == id)
            .cloned()
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Node `Buffer#toJSON` shape.
pub fn buffer(bytes: &[u8]) -> Value {
    json!({ "type": "Buffer", "data": bytes })
}

pub fn employee(id: &str, name: &str, designation: &str) -> Value {
    json!({
        "_id": id,
        "title": "Mx",
        "name": name,
        "designation": designation,
        "dob": "1990-01-01",
        "address": "1 Main St",
        "__v": 0
    })
}

pub fn movie(id: &str, title: &str, genre: &str, rating: f64) -> Value {
    json!({
        "_id": id,
        "title": title,
        "description": format!("{title} description"),
        "genre": genre,
        "releaseDate": "2010-07-16T00:00:00.000Z",
        "rating": rating,
        "image": buffer(title.as_bytes()),
        "contentType": "image/jpeg"
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Record the request and consume an injected failure, if any.
fn begin(state: &Shared, method: Method, path: String) -> Result<(), (StatusCode, String)> {
    let mut state = state.lock().unwrap();
    state.requests.push((method, path));
    match state.fail_next.take() {
        Some(status) => Err((status, "injected failure".to_string())),
        None => Ok(()),
    }
}

async fn read_form(
    state: &Shared,
    mut multipart: Multipart,
) -> Result<(Map<String, Value>, Option<(String, Vec<u8>)>), (StatusCode, String)> {
    let bad = |e: axum::extract::multipart::MultipartError| (StatusCode::BAD_REQUEST, e.to_string());

    let mut fields = Map::new();
    let mut image = None;
    let mut parts = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad)? {
        let name = field.name().unwrap_or_default().to_string();
        parts.push(name.clone());
        if name == "image" {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(bad)?;
            image = Some((content_type, bytes.to_vec()));
        } else {
            let text = field.text().await.map_err(bad)?;
            fields.insert(name, Value::String(text));
        }
    }

    state.lock().unwrap().last_parts = parts;
    Ok((fields, image))
}

fn respond(state: &MockState, record: &Value) -> Json<Value> {
    let mut body = record.clone();
    if state.omit_image_in_response {
        if let Some(obj) = body.as_object_mut() {
            obj.remove("image");
            obj.remove("contentType");
        }
    }
    Json(body)
}

async fn list(State(state): State<Shared>) -> HandlerResult {
    begin(&state, Method::GET, "list".to_string())?;
    let records = state.lock().unwrap().records.clone();
    Ok(Json(Value::Array(records)))
}

async fn create(State(state): State<Shared>, multipart: Multipart) -> HandlerResult {
    begin(&state, Method::POST, "create".to_string())?;
    let (mut fields, image) = read_form(&state, multipart).await?;

    let mut state = state.lock().unwrap();
    state.counter += 1;
    let id = match state.next_ids.pop_front() {
        Some(id) => id,
        None => format!("gen{}", state.counter),
    };
    fields.insert("_id".to_string(), Value::String(id));
    if let Some((content_type, bytes)) = image {
        fields.insert("image".to_string(), buffer(&bytes));
        fields.insert("contentType".to_string(), Value::String(content_type));
    }

    let record = Value::Object(fields);
    state.records.push(record.clone());
    Ok(respond(&state, &record))
}

async fn update(
    State(state): State<Shared>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> HandlerResult {
    begin(&state, Method::PUT, format!("update/{id}"))?;
    let (fields, image) = read_form(&state, multipart).await?;

    let mut state = state.lock().unwrap();
    let Some(stored) = state.records.iter_mut().find(|r| r["_id"] == id.as_str()) else {
        return Err((StatusCode::NOT_FOUND, format!("no record {id}")));
    };
    let obj = stored.as_object_mut().expect("records are objects");
    obj.extend(fields);
    if let Some((content_type, bytes)) = image {
        obj.insert("image".to_string(), buffer(&bytes));
        obj.insert("contentType".to_string(), Value::String(content_type));
    }

    let record = stored.clone();
    Ok(respond(&state, &record))
}

async fn remove(State(state): State<Shared>, Path(id): Path<String>) -> HandlerResult {
    begin(&state, Method::DELETE, format!("delete/{id}"))?;
    let mut state = state.lock().unwrap();
    let before = state.records.len();
    state.records.retain(|r| r["_id"] != id.as_str());
    if state.records.len() == before {
        return Err((StatusCode::NOT_FOUND, format!("no record {id}")));
    }
    Ok(Json(json!({ "message": "deleted" })))
}
