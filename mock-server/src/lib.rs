//! HTTP fixture server for exercising the fetch client end to end.
//!
//! Every route is registered with a trailing slash, which is what the client
//! composes by default.
//!
//! - `/echo/` (any method) reflects the request back as JSON.
//! - `/status/{code}/` answers with the given status and a small JSON body.
//! - `/text/` answers with a plain-text, non-JSON body.
//! - `/items/` and `/items/{id}/` are an in-memory collection supporting
//!   GET, POST, PUT, PATCH and DELETE.

use std::{collections::BTreeMap, collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub done: bool,
}

#[derive(Deserialize)]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub done: Option<bool>,
}

/// What `/echo/` saw.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Item>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/echo/", any(echo))
        .route("/status/{code}/", get(status))
        .route("/text/", get(text))
        .route("/items/", get(list_items).post(create_item))
        .route(
            "/items/{id}/",
            get(get_item)
                .put(replace_item)
                .patch(patch_item)
                .delete(delete_item),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Echo> {
    log::debug!("echo {method} {uri}");
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: (!body.is_empty()).then_some(body),
    })
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<Value>), StatusCode> {
    log::debug!("status {code}");
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((
        status,
        Json(json!({ "status": code, "reason": status.canonical_reason() })),
    ))
}

async fn text() -> &'static str {
    log::debug!("text");
    "hello, world"
}

async fn list_items(State(db): State<Db>) -> Json<Vec<Item>> {
    let items = db.read().await;
    log::debug!("list items ({} stored)", items.len());
    Json(items.values().cloned().collect())
}

async fn create_item(State(db): State<Db>, Json(input): Json<NewItem>) -> (StatusCode, Json<Item>) {
    let item = Item {
        id: Uuid::new_v4(),
        name: input.name,
        done: input.done,
    };
    log::debug!("created item {}", item.id);
    db.write().await.insert(item.id, item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn get_item(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Item>, StatusCode> {
    log::debug!("get item {id}");
    let items = db.read().await;
    items.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn replace_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewItem>,
) -> Result<Json<Item>, StatusCode> {
    log::debug!("replace item {id}");
    let mut items = db.write().await;
    let item = items.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    item.name = input.name;
    item.done = input.done;
    Ok(Json(item.clone()))
}

async fn patch_item(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<ItemPatch>,
) -> Result<Json<Item>, StatusCode> {
    log::debug!("patch item {id}");
    let mut items = db.write().await;
    let item = items.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        item.name = name;
    }
    if let Some(done) = input.done {
        item.done = done;
    }
    Ok(Json(item.clone()))
}

async fn delete_item(State(db): State<Db>, Path(id): Path<Uuid>) -> StatusCode {
    let mut items = db.write().await;
    if items.remove(&id).is_some() {
        log::debug!("deleted item {id}");
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
