//! api-server — Contact Gateway HTTP API.
//!
//! Forwards contact create/read/update/delete requests to one of two
//! interchangeable backends, chosen per-request by the `data_store` field:
//! - CRM: outbound HTTP calls against the CRM's contact resource.
//! - DATABASE: parameterized statements against a MySQL `Contacts` table
//!   (or an in-memory store when STORAGE_PROVIDER=memory).
//!
//! Run:
//! ```bash
//! # pretty logs (default); PORT optional (default 3000)
//! CRM_DOMAIN=acme CRM_API_KEY=... \
//! DB_HOST=localhost DB_USER=app DB_PASSWORD=... DB_NAME=contacts \
//!   cargo run -p api-server
//! ```
//!
//! Configuration: See `config.rs` for all environment variables.
//!

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use crm_adapter::CrmClient;
use domain::adapters::memory_store::MemoryStore;
use domain::{BackendError, ContactBackend, ContactUpdate, DataStore, NewContact};
#[cfg(feature = "mysql")]
use mysql_adapter::MysqlStore;
use serde::Deserialize;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// Local store abstraction serving the DATABASE branch: mysql or memory.
enum StoreKind {
    Memory(MemoryStore),
    #[cfg(feature = "mysql")]
    Mysql(MysqlStore),
}

#[derive(Clone)]
struct AnyStore {
    kind: Arc<StoreKind>,
}

impl AnyStore {
    fn memory() -> Self {
        Self {
            kind: Arc::new(StoreKind::Memory(MemoryStore::new())),
        }
    }

    #[cfg(feature = "mysql")]
    fn mysql(store: MysqlStore) -> Self {
        Self {
            kind: Arc::new(StoreKind::Mysql(store)),
        }
    }

    async fn create(&self, new: &NewContact) -> Result<domain::Contact, BackendError> {
        match &*self.kind {
            StoreKind::Memory(s) => s.create(new).await,
            #[cfg(feature = "mysql")]
            StoreKind::Mysql(s) => s.create(new).await,
        }
    }

    async fn get(&self, id: i64) -> Result<domain::Contact, BackendError> {
        match &*self.kind {
            StoreKind::Memory(s) => s.get(id).await,
            #[cfg(feature = "mysql")]
            StoreKind::Mysql(s) => s.get(id).await,
        }
    }

    async fn update(
        &self,
        id: i64,
        changes: &ContactUpdate,
    ) -> Result<Option<domain::Contact>, BackendError> {
        match &*self.kind {
            StoreKind::Memory(s) => s.update(id, changes).await,
            #[cfg(feature = "mysql")]
            StoreKind::Mysql(s) => s.update(id, changes).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<(), BackendError> {
        match &*self.kind {
            StoreKind::Memory(s) => s.delete(id).await,
            #[cfg(feature = "mysql")]
            StoreKind::Mysql(s) => s.delete(id).await,
        }
    }
}

#[derive(Clone)]
struct AppState {
    store: AnyStore,
    crm: CrmClient,
}

#[tokio::main]
async fn main() {
    // Load and validate config first (fail fast on misconfiguration)
    let cfg = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&cfg);
    cfg.warn_if_dev();

    let crm = build_crm_client(&cfg);
    let store = build_store(&cfg).await;
    let state = AppState { store, crm };

    let app = app_router(state);

    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    info!(%addr, "contact-gateway listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind port");
    axum::serve(listener, app).await.expect("server error");
}

fn app_router(state: AppState) -> Router {
    // Request ID header name
    let x_request_id = axum::http::HeaderName::from_static("x-request-id");

    Router::new()
        .route("/createContact", post(create_contact))
        .route("/getContact", post(get_contact))
        .route("/updateContact", post(update_contact))
        .route("/deleteContact", post(delete_contact))
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
        .with_state(state)
}

fn init_tracing(cfg: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(std::io::stdout),
                )
                .init();
        }
    }
}

// Construct the CRM client from config. Fatal on bad credentials.
fn build_crm_client(cfg: &config::Config) -> CrmClient {
    let built = match (&cfg.crm_base_url, &cfg.crm_domain) {
        (Some(base), _) => CrmClient::new(base.clone(), &cfg.crm_api_key),
        (None, Some(domain)) => CrmClient::for_domain(domain, &cfg.crm_api_key),
        (None, None) => {
            // Unreachable when config validation passed; treated as fatal anyway.
            eprintln!("Configuration error for CRM_DOMAIN: missing");
            std::process::exit(1);
        }
    };
    match built {
        Ok(client) => client,
        Err(e) => {
            eprintln!("failed to build CRM client: {e}");
            std::process::exit(1);
        }
    }
}

// Construct the DATABASE-branch store. A failed MySQL connection is fatal
// at startup; the server never comes up half-wired.
async fn build_store(cfg: &config::Config) -> AnyStore {
    match cfg.storage_provider {
        config::StorageProvider::Memory => AnyStore::memory(),
        #[cfg(feature = "mysql")]
        config::StorageProvider::Mysql => {
            let url = match cfg.database_url.as_deref() {
                Some(u) => u,
                None => {
                    eprintln!("Configuration error for DATABASE_URL: missing");
                    std::process::exit(1);
                }
            };
            match MysqlStore::connect(url).await {
                Ok(store) => {
                    info!("connected to MySQL");
                    AnyStore::mysql(store)
                }
                Err(e) => {
                    eprintln!("failed to connect to MySQL: {e}");
                    std::process::exit(1);
                }
            }
        }
        #[cfg(not(feature = "mysql"))]
        config::StorageProvider::Mysql => {
            eprintln!("built without the `mysql` feature; set STORAGE_PROVIDER=memory");
            std::process::exit(1);
        }
    }
}

// The selector is accepted as any JSON value so that a wrong type (number,
// bool, object) still reaches the selector check and gets the 400 JSON body
// instead of failing whole-body extraction.
#[derive(Deserialize)]
struct CreateContactReq {
    first_name: String,
    last_name: String,
    email: String,
    mobile_number: String,
    #[serde(default)]
    data_store: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct GetContactReq {
    contact_id: i64,
    #[serde(default)]
    data_store: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct UpdateContactReq {
    contact_id: i64,
    new_email: String,
    new_mobile_number: String,
    #[serde(default)]
    data_store: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct DeleteContactReq {
    contact_id: i64,
    #[serde(default)]
    data_store: Option<serde_json::Value>,
}

fn parse_selector(value: Option<&serde_json::Value>) -> Option<DataStore> {
    DataStore::parse(value.and_then(serde_json::Value::as_str))
}

// The selector is evaluated before anything else; unrecognized values
// short-circuit without touching either backend.
fn invalid_selector(op: &'static str) -> Response {
    warn!(op, "rejected: invalid data_store value");
    (
        StatusCode::BAD_REQUEST,
        Json(http_common::json_err("Invalid data_store value")),
    )
        .into_response()
}

fn backend_failure(op: &'static str, ds: DataStore, e: BackendError) -> Response {
    match e {
        BackendError::NotFound => {
            warn!(op, store = ds.as_str(), "contact not found");
            (
                StatusCode::NOT_FOUND,
                Json(http_common::json_err("Contact not found")),
            )
                .into_response()
        }
        e => {
            error!(op, store = ds.as_str(), err = %e, "backend call failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(http_common::json_err(&e.to_string())),
            )
                .into_response()
        }
    }
}

async fn create_contact(
    State(state): State<AppState>,
    Json(body): Json<CreateContactReq>,
) -> Response {
    let Some(ds) = parse_selector(body.data_store.as_ref()) else {
        return invalid_selector("create");
    };
    let new = NewContact {
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email,
        mobile_number: body.mobile_number,
    };
    let result = match ds {
        DataStore::Crm => state.crm.create(&new).await,
        DataStore::Database => state.store.create(&new).await,
    };
    match result {
        Ok(contact) => {
            info!(id = contact.id, store = ds.as_str(), "create ok");
            (StatusCode::CREATED, Json(contact)).into_response()
        }
        Err(e) => backend_failure("create", ds, e),
    }
}

async fn get_contact(State(state): State<AppState>, Json(body): Json<GetContactReq>) -> Response {
    let Some(ds) = parse_selector(body.data_store.as_ref()) else {
        return invalid_selector("get");
    };
    let result = match ds {
        DataStore::Crm => state.crm.get(body.contact_id).await,
        DataStore::Database => state.store.get(body.contact_id).await,
    };
    match result {
        Ok(contact) => {
            info!(id = contact.id, store = ds.as_str(), "get ok");
            (StatusCode::OK, Json(contact)).into_response()
        }
        Err(e) => backend_failure("get", ds, e),
    }
}

async fn update_contact(
    State(state): State<AppState>,
    Json(body): Json<UpdateContactReq>,
) -> Response {
    let Some(ds) = parse_selector(body.data_store.as_ref()) else {
        return invalid_selector("update");
    };
    let changes = ContactUpdate {
        email: body.new_email,
        mobile_number: body.new_mobile_number,
    };
    let result = match ds {
        DataStore::Crm => state.crm.update(body.contact_id, &changes).await,
        DataStore::Database => state.store.update(body.contact_id, &changes).await,
    };
    match result {
        Ok(Some(contact)) => {
            info!(id = contact.id, store = ds.as_str(), "update ok");
            (StatusCode::OK, Json(contact)).into_response()
        }
        Ok(None) => {
            info!(id = body.contact_id, store = ds.as_str(), "update ok");
            (
                StatusCode::OK,
                Json(http_common::json_message("Contact updated successfully")),
            )
                .into_response()
        }
        Err(e) => backend_failure("update", ds, e),
    }
}

async fn delete_contact(
    State(state): State<AppState>,
    Json(body): Json<DeleteContactReq>,
) -> Response {
    let Some(ds) = parse_selector(body.data_store.as_ref()) else {
        return invalid_selector("delete");
    };
    let result = match ds {
        DataStore::Crm => state.crm.delete(body.contact_id).await,
        DataStore::Database => state.store.delete(body.contact_id).await,
    };
    match result {
        Ok(()) => {
            info!(id = body.contact_id, store = ds.as_str(), "delete ok");
            let msg = format!("Contact deleted successfully from {}", ds.label());
            (StatusCode::OK, Json(http_common::json_message(&msg))).into_response()
        }
        Err(e) => backend_failure("delete", ds, e),
    }
}
