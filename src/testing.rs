//! In-process fake of the Hydra API for client tests
//!
//! Serves a paged `/heroes` collection with item CRUD, field and
//! class-level validation violations, a `Link` header advertising its hub,
//! and the hub itself as an event stream fed by [`FakeApi::publish`].

use crate::config::ApiConfig;
use crate::fetch::ApiClient;
use axum::extract::{Path, Query, RawQuery, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures_util::stream::{self, Stream};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

#[derive(Default)]
struct Store {
    heroes: BTreeMap<u64, Value>,
    next_id: u64,
    requests: Vec<String>,
    last_headers: (Option<String>, Option<String>),
    fail_page: Option<u64>,
    hub_topics: Vec<String>,
}

struct Shared {
    store: Mutex<Store>,
    page_size: u64,
    advertise_hub: AtomicBool,
    hub: broadcast::Sender<String>,
    base_url: String,
}

impl Shared {
    fn hub_url(&self) -> String {
        format!("{}/.well-known/mercure", self.base_url)
    }

    fn record(&self, method: &Method, uri: &Uri, headers: &HeaderMap) {
        let value_of = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let target = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string());

        let mut store = self.store.lock().unwrap();
        store.requests.push(format!("{} {}", method, target));
        store.last_headers = (value_of(header::ACCEPT), value_of(header::CONTENT_TYPE));
    }

    fn link_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.append(
            header::LINK,
            HeaderValue::from_static(
                "</docs.jsonld>; rel=\"http://www.w3.org/ns/hydra/core#apiDocumentation\"",
            ),
        );
        if self.advertise_hub.load(Ordering::SeqCst) {
            let link = format!("<{}>; rel=\"mercure\"", self.hub_url());
            headers.append(header::LINK, HeaderValue::from_str(&link).unwrap());
        }
        headers
    }
}

/// Handle to a running fake API
pub(crate) struct FakeApi {
    shared: Arc<Shared>,
    server: JoinHandle<()>,
}

impl FakeApi {
    /// Start serving on an ephemeral port with the given page size
    pub(crate) async fn start(page_size: u64) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (hub, _) = broadcast::channel(64);

        let shared = Arc::new(Shared {
            store: Mutex::new(Store::default()),
            page_size,
            advertise_hub: AtomicBool::new(true),
            hub,
            base_url: format!("http://{}", addr),
        });

        let app = Router::new()
            .route("/heroes", get(list_heroes).post(create_hero))
            .route(
                "/heroes/:id",
                get(get_hero).put(update_hero).delete(delete_hero),
            )
            .route("/.well-known/mercure", get(hub_stream))
            .route("/villains", get(list_villains))
            .route("/teapot", get(teapot))
            .route("/broken", get(broken))
            .with_state(Arc::clone(&shared));

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { shared, server }
    }

    pub(crate) fn base_url(&self) -> String {
        self.shared.base_url.clone()
    }

    pub(crate) fn hub_url(&self) -> String {
        self.shared.hub_url()
    }

    /// A fresh client pointed at this server
    pub(crate) fn client(&self) -> ApiClient {
        ApiClient::new(ApiConfig::with_entrypoint(&self.shared.base_url).unwrap()).unwrap()
    }

    /// Insert heroes with ids 1, 2, ...
    pub(crate) fn seed_heroes(&self, names: &[&str]) {
        let mut store = self.shared.store.lock().unwrap();
        for name in names {
            store.next_id += 1;
            let id = store.next_id;
            store.heroes.insert(id, hero_json(id, name));
        }
    }

    pub(crate) fn advertise_hub(&self, advertise: bool) {
        self.shared.advertise_hub.store(advertise, Ordering::SeqCst);
    }

    /// Answer 500 for the given collection page
    pub(crate) fn fail_page(&self, page: u64) {
        self.shared.store.lock().unwrap().fail_page = Some(page);
    }

    /// Requests to the hero endpoints, as `METHOD /path?query`
    pub(crate) fn requests(&self) -> Vec<String> {
        self.shared.store.lock().unwrap().requests.clone()
    }

    /// `Accept` and `Content-Type` of the last hero request
    pub(crate) fn last_headers(&self) -> (Option<String>, Option<String>) {
        self.shared.store.lock().unwrap().last_headers.clone()
    }

    /// Topics of the last hub subscription
    pub(crate) fn hub_topics(&self) -> Vec<String> {
        self.shared.store.lock().unwrap().hub_topics.clone()
    }

    /// Push a message to every hub subscriber
    pub(crate) fn publish(&self, update: Value) {
        let _ = self.shared.hub.send(update.to_string());
    }

    pub(crate) async fn wait_for_subscriber(&self) {
        for _ in 0..500 {
            if self.shared.hub.receiver_count() > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no live-update subscriber connected");
    }

    pub(crate) async fn shutdown(mut self) {
        self.server.abort();
        let _ = (&mut self.server).await;
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn hero_json(id: u64, name: &str) -> Value {
    json!({"@id": format!("/heroes/{}", id), "@type": "Hero", "name": name})
}

fn problem(status: StatusCode, description: &str, violations: Option<Value>) -> Response {
    let mut body = json!({
        "@context": "/contexts/Error",
        "@type": "hydra:Error",
        "hydra:title": "An error occurred",
        "hydra:description": description,
    });
    if let Some(violations) = violations {
        body["@type"] = json!("ConstraintViolationList");
        body["violations"] = violations;
    }
    (status, Json(body)).into_response()
}

fn validate(body: &Value) -> Option<Response> {
    let name = body.get("name").and_then(Value::as_str).unwrap_or("");
    let message = if name.trim().is_empty() {
        "This value should not be blank."
    } else if name.chars().count() < 3 {
        "too short"
    } else {
        return None;
    };

    Some(problem(
        StatusCode::UNPROCESSABLE_ENTITY,
        &format!("name: {}", message),
        Some(json!([{"propertyPath": "name", "message": message}])),
    ))
}

/// Class-level violation: hero names are unique
fn duplicate(store: &Store, name: &str, except: Option<u64>) -> Option<Response> {
    let taken = store
        .heroes
        .iter()
        .any(|(id, hero)| Some(*id) != except && hero["name"] == name);
    if !taken {
        return None;
    }

    let message = "This hero already exists.";
    Some(problem(
        StatusCode::UNPROCESSABLE_ENTITY,
        message,
        Some(json!([{"propertyPath": "", "message": message}])),
    ))
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<u64>,
}

async fn list_heroes(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    shared.record(&method, &uri, &headers);
    let page = query.page.unwrap_or(1).max(1);

    let store = shared.store.lock().unwrap();
    if store.fail_page == Some(page) {
        return problem(StatusCode::INTERNAL_SERVER_ERROR, "page unavailable", None);
    }

    let total = store.heroes.len() as u64;
    let size = shared.page_size;
    let last = total.div_ceil(size).max(1);
    let members: Vec<Value> = store
        .heroes
        .values()
        .skip(((page - 1) * size) as usize)
        .take(size as usize)
        .cloned()
        .collect();

    let mut view = json!({
        "@id": format!("/heroes?page={}", page),
        "@type": "hydra:PartialCollectionView",
        "hydra:first": "/heroes?page=1",
        "hydra:last": format!("/heroes?page={}", last),
    });
    if page > 1 {
        view["hydra:previous"] = json!(format!("/heroes?page={}", page - 1));
    }
    if page < last {
        view["hydra:next"] = json!(format!("/heroes?page={}", page + 1));
    }

    let body = json!({
        "@context": "/contexts/Hero",
        "@id": "/heroes",
        "@type": "hydra:Collection",
        "hydra:member": members,
        "hydra:totalItems": total,
        "hydra:view": view,
    });
    (StatusCode::OK, shared.link_headers(), Json(body)).into_response()
}

async fn create_hero(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    shared.record(&method, &uri, &headers);
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    if let Some(rejection) = validate(&body) {
        return rejection;
    }

    let name = body["name"].as_str().unwrap_or_default();
    let mut store = shared.store.lock().unwrap();
    if let Some(rejection) = duplicate(&store, name, None) {
        return rejection;
    }
    store.next_id += 1;
    let id = store.next_id;
    let hero = hero_json(id, name);
    store.heroes.insert(id, hero.clone());
    (StatusCode::CREATED, shared.link_headers(), Json(hero)).into_response()
}

async fn get_hero(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    shared.record(&method, &uri, &headers);
    let hero = shared.store.lock().unwrap().heroes.get(&id).cloned();
    match hero {
        Some(hero) => (StatusCode::OK, shared.link_headers(), Json(hero)).into_response(),
        None => problem(StatusCode::NOT_FOUND, "Not Found", None),
    }
}

async fn update_hero(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<u64>,
    body: String,
) -> Response {
    shared.record(&method, &uri, &headers);
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    if let Some(rejection) = validate(&body) {
        return rejection;
    }

    let name = body["name"].as_str().unwrap_or_default();
    let mut store = shared.store.lock().unwrap();
    if !store.heroes.contains_key(&id) {
        return problem(StatusCode::NOT_FOUND, "Not Found", None);
    }
    if let Some(rejection) = duplicate(&store, name, Some(id)) {
        return rejection;
    }
    let hero = hero_json(id, name);
    store.heroes.insert(id, hero.clone());
    (StatusCode::OK, shared.link_headers(), Json(hero)).into_response()
}

async fn delete_hero(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    shared.record(&method, &uri, &headers);
    match shared.store.lock().unwrap().heroes.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => problem(StatusCode::NOT_FOUND, "Not Found", None),
    }
}

async fn hub_stream(
    State(shared): State<Arc<Shared>>,
    RawQuery(query): RawQuery,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let topics = reqwest::Url::parse(&format!("http://hub/?{}", query.unwrap_or_default()))
        .map(|url| {
            url.query_pairs()
                .filter(|(key, _)| key == "topic")
                .map(|(_, value)| value.into_owned())
                .collect()
        })
        .unwrap_or_default();
    shared.store.lock().unwrap().hub_topics = topics;

    let rx = shared.hub.subscribe();
    let events = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(data) => {
                    return Some((Ok::<_, Infallible>(Event::default().data(data)), rx))
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// An empty collection that omits its member list entirely
async fn list_villains(State(shared): State<Arc<Shared>>) -> Response {
    let body = json!({
        "@context": "/contexts/Villain",
        "@id": "/villains",
        "@type": "hydra:Collection",
        "hydra:totalItems": 0,
        "hydra:view": {
            "@id": "/villains?page=1",
            "@type": "hydra:PartialCollectionView",
            "hydra:first": "/villains?page=1",
            "hydra:last": "/villains?page=1",
        },
    });
    (StatusCode::OK, shared.link_headers(), Json(body)).into_response()
}

async fn teapot() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>").into_response()
}

async fn broken() -> Response {
    (StatusCode::OK, "{not json").into_response()
}
