use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload};

/// Header set by the upstream authentication layer once the bearer token
/// has been verified.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Identity context attached to a request. `user_id` is 0 for anonymous
/// calls (public questionnaire links, self registration).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
}

impl Actor {
    pub fn from_request_headers(req: &HttpRequest) -> Self {
        let user_id = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0);
        Actor { user_id }
    }
}

impl FromRequest for Actor {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Actor::from_request_headers(req)))
    }
}
