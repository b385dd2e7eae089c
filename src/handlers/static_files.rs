use crate::range::{self, ResolvedRange};
use crate::state::AppState;
use axum::body::{boxed, Body, Empty, StreamBody};
use axum::extract::State;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::response::Response;
use percent_encoding::percent_decode_str;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

fn not_found() -> Response {
    let mut res = Response::new(boxed(Empty::new()));
    *res.status_mut() = StatusCode::NOT_FOUND;
    res
}

fn range_not_satisfiable(total_size: u64) -> Response {
    let mut res = Response::new(boxed(Empty::new()));
    *res.status_mut() = StatusCode::RANGE_NOT_SATISFIABLE;
    res.headers_mut().insert(
        header::CONTENT_RANGE,
        HeaderValue::from_str(&range::content_range_unsatisfied(total_size))
            .unwrap_or(HeaderValue::from_static("bytes */0")),
    );
    res
}

// Fallback handler: everything that is not an /api route is served from the
// static root, with single-range partial content support for large media.
pub async fn serve_static_handler(
    State(state): State<Arc<AppState>>,
    req: Request<Body>,
) -> Response {
    let raw_path = req.uri().path();
    let decoded = match percent_decode_str(raw_path).decode_utf8() {
        Ok(p) => p.to_string(),
        Err(_) => return not_found(),
    };
    let rel = if decoded == "/" {
        state.index_document.clone()
    } else {
        decoded.trim_start_matches('/').to_string()
    };
    if rel.contains("..") {
        return not_found();
    }

    let file_path = state.static_root.join(&rel);
    // absence and stat failures both fold into 404
    let meta = match tokio::fs::metadata(&file_path).await {
        Ok(m) if m.is_file() => m,
        _ => return not_found(),
    };
    let total_size = meta.len();

    let range_header = req
        .headers()
        .get(header::RANGE)
        .and_then(|hv| hv.to_str().ok());
    let resolved = range::resolve(range_header, total_size);

    let (start, length, is_partial) = match resolved {
        ResolvedRange::Unsatisfiable => return range_not_satisfiable(total_size),
        ResolvedRange::Full => (0, total_size, false),
        ResolvedRange::Partial { start, end } => (start, end - start + 1, true),
    };

    let file = match tokio::fs::File::open(&file_path).await {
        Ok(f) => f,
        Err(_) => return not_found(),
    };
    let mut reader = tokio::io::BufReader::new(file);
    if start > 0 {
        if let Err(e) = reader.seek(std::io::SeekFrom::Start(start)).await {
            tracing::error!("seek failed for {}: {}", file_path.display(), e);
            let mut res = Response::new(boxed(Empty::new()));
            *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            return res;
        }
    }
    // the ReaderStream is dropped (and the handle released) when the client
    // disconnects or the body is fully written
    let stream = ReaderStream::new(reader.take(length));
    let mut res = Response::new(boxed(StreamBody::new(stream)));

    let mime = mime_guess::from_path(&file_path).first_or_octet_stream();
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime.as_ref())
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    res.headers_mut().insert(
        header::ACCEPT_RANGES,
        HeaderValue::from_static("bytes"),
    );
    if let Ok(hv) = HeaderValue::from_str(&length.to_string()) {
        res.headers_mut().insert(header::CONTENT_LENGTH, hv);
    }
    if is_partial {
        *res.status_mut() = StatusCode::PARTIAL_CONTENT;
        let cr = range::content_range(start, start + length - 1, total_size);
        if let Ok(hv) = HeaderValue::from_str(&cr) {
            res.headers_mut().insert(header::CONTENT_RANGE, hv);
        }
    }
    res
}
