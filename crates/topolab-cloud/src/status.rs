//! Provider status codes and their mapping onto [`ErrorKind`]
//!
//! Some SDKs only report failures as text of the form
//! `"<http status> <http error> <response body>"`. [`ParsedError::parse`]
//! splits such a message; [`StatusTable::dispatch`] turns a status into the
//! typed error.

use crate::error::{CloudError, ErrorKind};

/// Number of leading characters holding the status code.
const STATUS_WIDTH: usize = 3;

/// Base status table shared by every operation.
const BASE_TABLE: &[(u16, ErrorKind)] = &[
    (400, ErrorKind::BadRequest),
    (401, ErrorKind::Unauthorized),
    (404, ErrorKind::ItemNotFound),
    (405, ErrorKind::MethodNotAllowed),
    (413, ErrorKind::OverLimit),
    (500, ErrorKind::ApiError),
    (503, ErrorKind::ServiceUnavailable),
];

/// A provider message split into status code and detail text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedError {
    pub status: Option<u16>,
    pub detail: String,
}

impl ParsedError {
    /// Split `text` into a leading status and the remaining detail.
    ///
    /// When the first three characters are not a base-10 integer there is
    /// no status and the detail is the whole text.
    pub fn parse(text: &str) -> Self {
        let split = text
            .char_indices()
            .nth(STATUS_WIDTH)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        let (head, rest) = text.split_at(split);

        match parse_status(head) {
            Some(status) => Self {
                status: Some(status),
                detail: rest.to_string(),
            },
            None => Self {
                status: None,
                detail: text.to_string(),
            },
        }
    }
}

fn parse_status(head: &str) -> Option<u16> {
    let digits = head.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Status to error-kind lookup with optional per-call overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusTable<'a> {
    overrides: &'a [(u16, ErrorKind)],
}

impl<'a> StatusTable<'a> {
    /// The base table alone.
    pub const fn base() -> Self {
        Self { overrides: &[] }
    }

    /// The base table with `overrides` consulted first.
    pub const fn with_overrides(overrides: &'a [(u16, ErrorKind)]) -> Self {
        Self { overrides }
    }

    pub fn lookup(&self, status: u16) -> Option<ErrorKind> {
        self.overrides
            .iter()
            .chain(BASE_TABLE)
            .find(|(code, _)| *code == status)
            .map(|(_, kind)| *kind)
    }

    /// Build the typed error for `status`.
    ///
    /// A status with no entry yields [`CloudError::UnmappedStatus`].
    pub fn dispatch(&self, status: u16, detail: impl Into<String>) -> CloudError {
        let detail = detail.into();
        match self.lookup(status) {
            Some(kind) => kind.into_error(detail),
            None => CloudError::UnmappedStatus { status, detail },
        }
    }
}
