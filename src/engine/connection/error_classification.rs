//! Maps Bollard client construction failures onto [`ConnectionError`].
//!
//! Socket endpoints get path-bearing variants (`SocketNotFound`,
//! `PermissionDenied`) so diagnostics can name the file the operator should
//! look at. Everything else collapses to `ConnectionFailed`.

use std::io::ErrorKind;
use std::path::Path;

use crate::error::ConnectionError;

/// Strip the `unix://` or `npipe://` scheme from a socket URI.
///
/// HTTP endpoints have no filesystem path and yield `None`.
pub(super) fn extract_socket_path(socket_uri: &str) -> Option<&Path> {
    socket_uri
        .strip_prefix("unix://")
        .or_else(|| socket_uri.strip_prefix("npipe://"))
        .map(Path::new)
}

fn from_io_kind(kind: ErrorKind, socket_path: Option<&Path>, message: String) -> ConnectionError {
    match (kind, socket_path) {
        (ErrorKind::NotFound, Some(path)) => ConnectionError::SocketNotFound {
            path: path.to_path_buf(),
        },
        (ErrorKind::PermissionDenied, Some(path)) => ConnectionError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ConnectionError::ConnectionFailed { message },
    }
}

/// Classify a Bollard error raised while building a client for `socket_uri`.
pub(super) fn classify_connection_error(
    error: &bollard::errors::Error,
    socket_uri: &str,
) -> ConnectionError {
    let socket_path = extract_socket_path(socket_uri);
    let message = error.to_string();

    match error {
        bollard::errors::Error::SocketNotFoundError(_) => {
            from_io_kind(ErrorKind::NotFound, socket_path, message)
        }
        bollard::errors::Error::IOError { err } => {
            let kind = io_kind_in_chain(err).unwrap_or_else(|| err.kind());
            from_io_kind(kind, socket_path, message)
        }
        other => match io_kind_in_chain(other) {
            Some(kind) => from_io_kind(kind, socket_path, message),
            None => ConnectionError::ConnectionFailed { message },
        },
    }
}

/// First `io::Error` kind found in the source chain of `error`.
fn io_kind_in_chain(error: &dyn std::error::Error) -> Option<ErrorKind> {
    let mut current = error.source();
    while let Some(cause) = current {
        if let Some(io_error) = cause.downcast_ref::<std::io::Error>() {
            return Some(io_error.kind());
        }
        current = cause.source();
    }
    None
}
