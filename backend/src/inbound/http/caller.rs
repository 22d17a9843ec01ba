//! Request principal extraction.
//!
//! A [`Caller`] is resolved from the session cookie first and, failing that,
//! from an `Authorization: Bearer <api key>` header. Requests with neither
//! are rejected with `401`. Handlers that also serve anonymous visitors take
//! `Option<Caller>` instead.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Caller, Error};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

fn bearer_token(req: &HttpRequest) -> Result<Option<String>, Error> {
    let Some(value) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    match raw.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_owned())),
        _ => Err(Error::unauthorized("unsupported authorization scheme")),
    }
}

async fn resolve(req: HttpRequest, session: SessionContext) -> Result<Caller, Error> {
    if let Some(user) = session.user()? {
        return Ok(Caller::from_session(user));
    }
    let Some(token) = bearer_token(&req)? else {
        return Err(Error::unauthorized("authentication required"));
    };
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))?;
    let principal = state.api_key_auth.authenticate(&token).await?;
    Ok(Caller::from_api_key(principal))
}

impl FromRequest for Caller {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = SessionContext::from_request(req, payload);
        let req = req.clone();
        Box::pin(async move {
            let session = session.await?;
            resolve(req, session).await.map_err(actix_web::Error::from)
        })
    }
}
