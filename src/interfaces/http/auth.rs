use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::domain::error::AppError;
use crate::interfaces::http::error_response;

/// Identity header set by the upstream authentication layer.
const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, resolved before any handler runs.
///
/// Authentication itself lives outside this service; requests arrive with the
/// resolved user id in the identity header. Anything without a parseable id
/// is rejected up front.
#[derive(Debug, Clone, Copy)]
pub struct AuthedUser {
    pub id: i64,
}

impl FromRequest for AuthedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user_id = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i64>().ok());

        ready(match user_id {
            Some(id) => Ok(AuthedUser { id }),
            None => Err(actix_web::error::InternalError::from_response(
                "missing identity header",
                error_response(AppError::Unauthorized(
                    "Missing or invalid identity header".to_string(),
                )),
            )
            .into()),
        })
    }
}
