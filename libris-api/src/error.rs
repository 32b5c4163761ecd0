use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde_json::json;
use uuid::Uuid;

use crate::Time;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Banned from forum interactions")]
    Banned { expires_at: Option<Time> },

    #[error("Comment needs either text content or an image")]
    MissingContent,

    #[error("Not found: {0}")]
    NotFound(Uuid),

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::NotLoggedIn => StatusCode::UNAUTHORIZED,
            Error::Banned { .. } => StatusCode::FORBIDDEN,
            Error::MissingContent => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
            Error::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::PermissionDenied => json!({
                "message": "permission denied",
                "type": "permission-denied",
            }),
            Error::NotLoggedIn => json!({
                "message": "not logged in",
                "type": "not-logged-in",
            }),
            Error::Banned { expires_at } => json!({
                "message": "banned from forum interactions",
                "type": "banned",
                "expires_at": expires_at,
            }),
            Error::MissingContent => json!({
                "message": "comment needs either text content or an image",
                "type": "missing-content",
            }),
            Error::NotFound(u) => json!({
                "message": "not found",
                "type": "not-found",
                "uuid": u,
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
            Error::Server(msg) => json!({
                "message": msg,
                "type": "server",
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let message = || {
            String::from(
                data.get("message")
                    .and_then(|msg| msg.as_str())
                    .unwrap_or(""),
            )
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(message()),
                "permission-denied" => Error::PermissionDenied,
                "not-logged-in" => Error::NotLoggedIn,
                "banned" => Error::Banned {
                    expires_at: match data.get("expires_at") {
                        None | Some(serde_json::Value::Null) => None,
                        Some(t) => Some(
                            serde_json::from_value(t.clone())
                                .context("parsing ban expiry time")?,
                        ),
                    },
                },
                "missing-content" => Error::MissingContent,
                "not-found" => Error::NotFound(
                    data.get("uuid")
                        .and_then(|uuid| uuid.as_str())
                        .and_then(|uuid| Uuid::from_str(uuid).ok())
                        .ok_or_else(|| anyhow!("error is a not-found without a proper uuid"))?,
                ),
                "null-byte" => Error::NullByteInString(String::from(
                    data.get("string").and_then(|s| s.as_str()).ok_or_else(|| {
                        anyhow!("error is a null-byte-in-string without a string")
                    })?,
                )),
                "server" => Error::Server(message()),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn errors_round_trip_through_json() {
        let errors = vec![
            Error::Unknown(String::from("boom")),
            Error::PermissionDenied,
            Error::NotLoggedIn,
            Error::Banned { expires_at: None },
            Error::Banned {
                expires_at: Some(Utc::now()),
            },
            Error::MissingContent,
            Error::NotFound(Uuid::new_v4()),
            Error::NullByteInString(String::from("a\0b")),
            Error::Server(String::from("db down")),
        ];
        for e in errors {
            assert_eq!(Error::parse(&e.contents()).unwrap(), e);
        }
    }
}
