use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::AuthenticatedUser;
use crate::error::AppError;

/// Extracts the caller identity stored by `AuthMiddleware`.
///
/// If the identity is missing (the middleware did not run on this route), the
/// extractor fails with `AppError::Unauthorized`.
impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().cloned() {
            Some(authenticated) => ready(Ok(authenticated)),
            None => {
                let err = AppError::Unauthorized(
                    "No authenticated user on request. Ensure AuthMiddleware is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
