//! GET and PUT on logical paths.
//!
//! Repository calls are blocking filesystem work, so each request runs them
//! on the blocking pool against one snapshot taken at its start.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use vds_repo::{
    DirEntry, ExpectedId, LogicalPath, ObjectId, Repository, Signature, View, ViewContent,
    WriteOutcome, WriteRequest,
};

use crate::error::{ServerError, ServerResult};

pub const LAST_ID_HEADER: &str = "wiki-last-id";
pub const MESSAGE_HEADER: &str = "wiki-message";
pub const AUTHOR_NAME_HEADER: &str = "wiki-author-name";
pub const AUTHOR_EMAIL_HEADER: &str = "wiki-author-email";
/// Id of the blob a GET returned, for use as the next `Wiki-Last-Id`.
pub const ID_HEADER: &str = "wiki-id";

#[derive(Clone, Debug)]
pub struct AppState {
    pub repo: Repository,
}

/// Rebuild the raw logical path from the wildcard capture, keeping the
/// trailing slash the capture may have lost.
fn raw_path(captured: &str, uri: &Uri) -> String {
    let trimmed = captured.trim_matches('/');
    if trimmed.is_empty() {
        return "/".into();
    }
    let slash = if uri.path().ends_with('/') { "/" } else { "" };
    format!("/{trimmed}{slash}")
}

async fn blocking<T, F>(f: F) -> ServerResult<T>
where
    F: FnOnce() -> ServerResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
}

enum ReadResponse {
    Blob { id: ObjectId, data: Vec<u8> },
    Listing(View),
    Metadata(View),
    Redirect(String),
}

impl IntoResponse for ReadResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Blob { id, data } => {
                let mut headers = HeaderMap::new();
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/octet-stream"),
                );
                if let Ok(value) = HeaderValue::from_str(&id.to_hex()) {
                    headers.insert(ID_HEADER, value);
                }
                (headers, data).into_response()
            }
            Self::Listing(view) | Self::Metadata(view) => Json(view).into_response(),
            Self::Redirect(location) => match HeaderValue::from_str(&location) {
                Ok(value) => {
                    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, value)]).into_response()
                }
                Err(_) => StatusCode::BAD_REQUEST.into_response(),
            },
        }
    }
}

fn read(repo: &Repository, raw: &str, uri_path: &str) -> ServerResult<ReadResponse> {
    let path = LogicalPath::parse(raw)?;
    let snapshot = repo.snapshot(None)?;

    if let Some(target) = path.strip_metadata_suffix(&repo.config().metadata_suffix) {
        return Ok(ReadResponse::Metadata(repo.view_in(&snapshot, &target, true)?));
    }

    let mut view = repo.view_in(&snapshot, &path, false)?;
    if let ViewContent::File { data, .. } = &mut view.content {
        let data = std::mem::take(data);
        return Ok(ReadResponse::Blob { id: view.id, data });
    }
    if !path.is_root() && !path.has_trailing_slash() {
        return Ok(ReadResponse::Redirect(format!("{uri_path}/")));
    }
    if let (Some(parent), ViewContent::Directory { entries }) = (path.parent(), &mut view.content) {
        if let Some(target) = repo.locate_in(&snapshot, &parent)? {
            entries.insert(0, DirEntry::parent(target.id));
        }
    }
    Ok(ReadResponse::Listing(view))
}

fn expected_from(headers: &HeaderMap) -> ServerResult<ExpectedId> {
    let Some(value) = headers.get(LAST_ID_HEADER) else {
        return Ok(ExpectedId::Unchecked);
    };
    let raw = value
        .to_str()
        .map_err(|_| ServerError::InvalidLastId(String::from_utf8_lossy(value.as_bytes()).into()))?
        .trim();
    match raw {
        "" => Ok(ExpectedId::Unchecked),
        "null" => Ok(ExpectedId::ExpectAbsent),
        hex => ObjectId::from_hex(hex)
            .map(ExpectedId::ExpectId)
            .map_err(|_| ServerError::InvalidLastId(hex.to_string())),
    }
}

fn text_header(headers: &HeaderMap, name: &str) -> ServerResult<Option<String>> {
    headers
        .get(name)
        .map(|v| {
            v.to_str()
                .map(str::to_string)
                .map_err(|_| ServerError::BadRequest(format!("{name} is not valid text")))
        })
        .transpose()
}

fn write_request(
    repo: &Repository,
    raw: &str,
    headers: &HeaderMap,
    body: Bytes,
) -> ServerResult<WriteRequest> {
    let path = LogicalPath::parse(raw)?;
    let expected = expected_from(headers)?;
    let mut request = WriteRequest::new(path, body.to_vec()).expect(expected);

    if let Some(message) = text_header(headers, MESSAGE_HEADER)?.filter(|m| !m.trim().is_empty()) {
        request = request.message(message);
    }

    let name = text_header(headers, AUTHOR_NAME_HEADER)?;
    let email = text_header(headers, AUTHOR_EMAIL_HEADER)?;
    if name.is_some() || email.is_some() {
        let defaults = &repo.config().default_author;
        let author = Signature::now(
            name.unwrap_or_else(|| defaults.name.clone()),
            email.unwrap_or_else(|| defaults.email.clone()),
        )
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;
        request = request.author(author);
    }
    Ok(request)
}

/// `GET /`
pub async fn get_root(State(state): State<AppState>, uri: Uri) -> ServerResult<Response> {
    blocking(move || read(&state.repo, "/", uri.path()))
        .await
        .map(IntoResponse::into_response)
}

/// `GET /<path>`
pub async fn get_path(
    State(state): State<AppState>,
    Path(captured): Path<String>,
    uri: Uri,
) -> ServerResult<Response> {
    let raw = raw_path(&captured, &uri);
    blocking(move || read(&state.repo, &raw, uri.path()))
        .await
        .map(IntoResponse::into_response)
}

/// `PUT /<path>`
pub async fn put_path(
    State(state): State<AppState>,
    Path(captured): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Json<WriteOutcome>> {
    let raw = raw_path(&captured, &uri);
    let outcome = blocking(move || {
        let request = write_request(&state.repo, &raw, &headers, body)?;
        tracing::debug!(path = %request.path, expected = %request.expected, "write requested");
        Ok(state.repo.write(&request)?)
    })
    .await?;
    Ok(Json(outcome))
}

/// `PUT /` always fails: the root is not a file.
pub async fn put_root(State(state): State<AppState>) -> ServerResult<Json<WriteOutcome>> {
    let request = WriteRequest::new(LogicalPath::root(), Vec::new());
    blocking(move || Ok(state.repo.write(&request)?))
        .await
        .map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_path_keeps_trailing_slash() {
        let uri: Uri = "/a/b/".parse().unwrap();
        assert_eq!(raw_path("a/b/", &uri), "/a/b/");
        assert_eq!(raw_path("a/b", &uri), "/a/b/");
        let uri: Uri = "/a/b".parse().unwrap();
        assert_eq!(raw_path("/a/b", &uri), "/a/b");
    }

    #[test]
    fn last_id_header_states() {
        let mut headers = HeaderMap::new();
        assert_eq!(expected_from(&headers).unwrap(), ExpectedId::Unchecked);

        headers.insert(LAST_ID_HEADER, HeaderValue::from_static(""));
        assert_eq!(expected_from(&headers).unwrap(), ExpectedId::Unchecked);

        headers.insert(LAST_ID_HEADER, HeaderValue::from_static("null"));
        assert_eq!(expected_from(&headers).unwrap(), ExpectedId::ExpectAbsent);

        let id = ObjectId::from_hash([7; 32]);
        headers.insert(LAST_ID_HEADER, HeaderValue::from_str(&id.to_hex()).unwrap());
        assert_eq!(expected_from(&headers).unwrap(), ExpectedId::ExpectId(id));

        headers.insert(LAST_ID_HEADER, HeaderValue::from_static("abc"));
        assert!(matches!(
            expected_from(&headers),
            Err(ServerError::InvalidLastId(_))
        ));
    }
}
