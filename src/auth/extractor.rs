//! Actix-web extractor for the calling owner.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use std::future::{Ready, ready};
use uuid::Uuid;

use crate::config::USER_ID_HEADER;
use crate::error::AppError;

/// The user on whose behalf the request is made.
///
/// ```ignore
/// async fn handler(owner: Owner) -> impl Responder {
///     // owner.id scopes every store lookup
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub id: Uuid,
}

fn owner_from_request(req: &HttpRequest) -> Result<Owner, AppError> {
    let value = req
        .headers()
        .get(USER_ID_HEADER)
        .ok_or_else(|| {
            AppError::Unauthorized(format!(
                "Missing caller identity. Provide {} header.",
                USER_ID_HEADER
            ))
        })?
        .to_str()
        .map_err(|_| {
            AppError::Unauthorized(format!("{} header is not valid text", USER_ID_HEADER))
        })?;

    let id = Uuid::parse_str(value.trim()).map_err(|_| {
        AppError::Unauthorized(format!("{} header is not a valid UUID", USER_ID_HEADER))
    })?;

    Ok(Owner { id })
}

impl FromRequest for Owner {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(owner_from_request(req))
    }
}
