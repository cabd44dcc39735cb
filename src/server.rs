//! HTTP/JSON API over a shared [`Directory`], plus an HTML page at `/` driving it
//!
//! | Route                        | Success                | Failure              |
//! |------------------------------|------------------------|----------------------|
//! | `GET /`                      | 200, directory page    |                      |
//! | `GET /api/contacts[?name=]`  | 200, array of contacts |                      |
//! | `POST /api/contacts`         | 201, created contact   | 400, 409             |
//! | `GET /api/contacts/:name`    | 200, contact           | 404                  |
//! | `PUT /api/contacts/:name`    | 200, updated contact   | 400, 404, 409        |
//! | `DELETE /api/contacts/:name` | 200                    | 404                  |
//!
//! Store I/O or parse failures are reported as 500. Error bodies look like `{"error": "..."}`.
//!
//! Every store call runs on the blocking pool, since readers wait while a writer holds the lock
//! across a file write.

use {
    crate::{
        store::{Directory, DirectoryError},
        Contact,
    },
    anyhow::Context,
    askama::Template,
    axum::{
        extract::{rejection::JsonRejection, Path, Query, State},
        http::StatusCode,
        response::{Html, IntoResponse, Response},
        routing::get,
        Json, Router,
    },
    serde::Deserialize,
    std::sync::Arc,
    tokio::{net::TcpListener, task},
};

pub fn router(directory: Arc<Directory>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/contacts", get(list_contacts).post(add_contact))
        .route(
            "/api/contacts/:name",
            get(get_contact).put(edit_contact).delete(delete_contact),
        )
        .with_state(directory)
}

pub async fn serve(directory: Arc<Directory>, bind: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to listen on {bind}"))?;
    tracing::info!(
        "Starting server on http://{}",
        listener.local_addr().context("Failed to read local address")?
    );

    axum::serve(listener, router(directory).into_make_service())
        .await
        .context("HTTP server failed")
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexPage {
    contacts: Vec<Contact>,
}

async fn index(State(directory): State<Arc<Directory>>) -> Result<Html<String>, ApiError> {
    let contacts = with_directory(&directory, |directory| Ok(directory.list())).await?;
    IndexPage { contacts }
        .render()
        .map(Html)
        .map_err(|error| ApiError::Internal(format!("Failed to render page: {error}")))
}

#[derive(Debug, Deserialize)]
struct FindQuery {
    #[serde(default)]
    name: String,
}

async fn list_contacts(
    State(directory): State<Arc<Directory>>,
    Query(query): Query<FindQuery>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    with_directory(&directory, move |directory| Ok(directory.find_by_name(&query.name)))
        .await
        .map(Json)
}

async fn get_contact(
    State(directory): State<Arc<Directory>>,
    Path(name): Path<String>,
) -> Result<Json<Contact>, ApiError> {
    with_directory(&directory, move |directory| {
        directory
            .find_by_name(&name)
            .into_iter()
            .next()
            .ok_or(DirectoryError::NotFound(name))
    })
    .await
    .map(Json)
}

async fn add_contact(
    State(directory): State<Arc<Directory>>,
    payload: Result<Json<Contact>, JsonRejection>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    let Json(contact) = payload?;
    contact.validate()?;

    let added = contact.clone();
    with_directory(&directory, move |directory| directory.add(added)).await?;

    tracing::info!(name = %contact.name, "added contact");
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn edit_contact(
    State(directory): State<Arc<Directory>>,
    Path(name): Path<String>,
    payload: Result<Json<Contact>, JsonRejection>,
) -> Result<Json<Contact>, ApiError> {
    let Json(contact) = payload?;
    contact.validate()?;

    let edited = contact.clone();
    let old_name = name.clone();
    with_directory(&directory, move |directory| directory.edit(&old_name, edited)).await?;

    tracing::info!(old_name = %name, name = %contact.name, "edited contact");
    Ok(Json(contact))
}

async fn delete_contact(
    State(directory): State<Arc<Directory>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = name.clone();
    with_directory(&directory, move |directory| directory.delete(&deleted)).await?;

    tracing::info!(%name, "deleted contact");
    Ok(StatusCode::OK)
}

/// Runs a store call on the blocking pool.
async fn with_directory<T, F>(directory: &Arc<Directory>, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Directory) -> Result<T, DirectoryError> + Send + 'static,
    T: Send + 'static,
{
    let directory = Arc::clone(directory);
    task::spawn_blocking(move || f(&directory))
        .await
        .map_err(|error| ApiError::Internal(error.to_string()))?
        .map_err(ApiError::Directory)
}

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Directory(DirectoryError),
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::BadRequest(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Directory(error @ DirectoryError::DuplicateName(_)) => {
                (StatusCode::CONFLICT, error.to_string())
            }
            ApiError::Directory(error @ DirectoryError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, error.to_string())
            }
            ApiError::Directory(
                error @ (DirectoryError::Io { .. } | DirectoryError::Parse { .. }),
            ) => {
                tracing::error!("Contact store failure: {:#}", anyhow::Error::from(error));
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to access contact store".to_owned(),
                )
            }
            ApiError::Internal(message) => {
                tracing::error!("Request failed: {message}");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        tracing::debug!(%status, %message, "request rejected");
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
