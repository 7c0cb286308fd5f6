//! Identifier validation shared by the entity handlers.

use serde_json::json;

use crate::domain::{Error, InvalidEntityId};

/// Validation error codes for identifier failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IdErrorCode {
    /// Identifier is zero or negative.
    Invalid,
    /// Body id disagrees with the path id.
    Mismatch,
}

impl IdErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "idinvalid",
            Self::Mismatch => "idmismatch",
        }
    }
}

fn id_error(message: String, code: IdErrorCode) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": "id",
        "code": code.as_str(),
    }))
}

/// Parse a raw path or body identifier into a typed id.
pub(crate) fn parse_id<T>(raw: i64) -> Result<T, Error>
where
    T: TryFrom<i64, Error = InvalidEntityId>,
{
    T::try_from(raw).map_err(|err| id_error(err.to_string(), IdErrorCode::Invalid))
}

/// Resolve the target of a PUT.
///
/// `PUT /x/{id}` uses the path id; a body id, when present, must agree.
/// `PUT /x` uses the body id. `None` means the request carries no id at all
/// and is handled as a create.
pub(crate) fn resolve_put_target<T>(
    path_id: Option<i64>,
    body_id: Option<i64>,
) -> Result<Option<T>, Error>
where
    T: TryFrom<i64, Error = InvalidEntityId>,
{
    let raw = match (path_id, body_id) {
        (Some(path), Some(body)) if path != body => {
            return Err(id_error(
                format!("body id {body} does not match path id {path}"),
                IdErrorCode::Mismatch,
            ));
        }
        (Some(id), _) | (None, Some(id)) => Some(id),
        (None, None) => None,
    };
    raw.map(parse_id).transpose()
}
