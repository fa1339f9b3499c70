//! Request guards
//!
//! Identity is verified upstream; the gateway asserts the caller's id on
//! the request. Extracting [`User`] in a handler signature is what makes
//! an endpoint authenticated.

use std::future::Future;
use std::pin::Pin;

use actix_web::{Error, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::error::AppError;

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct User {
    pub id: Uuid,
}

impl FromRequest for User {
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user_id = req
            .headers()
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok());

        Box::pin(async move {
            let id = user_id.ok_or(AppError::AuthRequired)?;
            Ok(User { id })
        })
    }
}
