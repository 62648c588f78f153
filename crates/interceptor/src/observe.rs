use axum::body::Body;
use error_cache::{ErrorCache, extract_error_message};
use futures::StreamExt as _;
use http::{
    Response, StatusCode,
    header::{CONTENT_LENGTH, CONTENT_TYPE},
};

use crate::debug_log::DebugLog;

/// Upper bound for the mirrored copy of a reply body.
const BODY_LIMIT: usize = 32 * 1024 * 1024;

/// Mirrors a response to the debug log and records failures in the error
/// cache.
///
/// The body handed back to the caller is the original one. Chunks are copied
/// into a capped side buffer as the caller reads them, and the copy is logged
/// once the body is finished or dropped. Event streams and bodies announced
/// larger than the cap are not copied at all.
pub(crate) fn observe(
    response: Response<Body>,
    url: &str,
    error_cache: Option<&ErrorCache>,
    debug_log: Option<&DebugLog>,
) -> Response<Body> {
    if error_cache.is_none() && debug_log.is_none() {
        return response;
    }

    let status = response.status();
    let summary = format!("{status} {url}");

    if is_event_stream(&response) {
        if let Some(debug_log) = debug_log {
            debug_log.response(&summary, b"<event stream>");
        }

        record(error_cache, status, "");
        return response;
    }

    if let Some(length) = content_length(&response)
        && length > BODY_LIMIT
    {
        if let Some(debug_log) = debug_log {
            debug_log.response(&summary, format!("<body of {length} bytes not mirrored>").as_bytes());
        }

        record(error_cache, status, "");
        return response;
    }

    let mut mirror = Mirror {
        summary,
        status,
        copy: Vec::new(),
        truncated: false,
        error_cache: error_cache.cloned(),
        debug_log: debug_log.cloned(),
    };

    let (parts, body) = response.into_parts();

    let body = body.into_data_stream().map(move |chunk| {
        if let Ok(bytes) = &chunk {
            mirror.push(bytes);
        }

        chunk
    });

    Response::from_parts(parts, Body::from_stream(body))
}

/// Side copy of a body in flight. Flushed to the debug log and the error
/// cache when dropped together with the body stream.
struct Mirror {
    summary: String,
    status: StatusCode,
    copy: Vec<u8>,
    truncated: bool,
    error_cache: Option<ErrorCache>,
    debug_log: Option<DebugLog>,
}

impl Mirror {
    fn push(&mut self, chunk: &[u8]) {
        let room = BODY_LIMIT - self.copy.len();

        if chunk.len() > room {
            self.truncated = true;
        }

        self.copy.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }
}

impl Drop for Mirror {
    fn drop(&mut self) {
        record(self.error_cache.as_ref(), self.status, &String::from_utf8_lossy(&self.copy));

        if let Some(debug_log) = &self.debug_log {
            if self.truncated {
                self.copy
                    .extend_from_slice(format!("\n<truncated after {BODY_LIMIT} bytes>").as_bytes());
            }

            debug_log.response(&self.summary, &self.copy);
        }
    }
}

fn record(error_cache: Option<&ErrorCache>, status: StatusCode, body: &str) {
    let Some(error_cache) = error_cache else {
        return;
    };

    if status.as_u16() < 400 {
        return;
    }

    let status_text = status.canonical_reason().unwrap_or_default();
    let message = extract_error_message(body, status_text);

    if let Err(err) = error_cache.record(status.as_u16(), status_text, &message) {
        log::debug!("Failed to record API error in {}: {err}", error_cache.path().display());
    }
}

fn is_event_stream(response: &Response<Body>) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with("text/event-stream"))
}

fn content_length(response: &Response<Body>) -> Option<usize> {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}
