//! API key middleware for Actix Web.
//!
//! SePay authenticates its webhook calls with a static API key, sent in the `Authorization` header as
//!
//! ```text
//! Authorization: Apikey <api_key>
//! ```
//!
//! Wrap the webhook route with this middleware to reject calls that do not carry the configured key. If no key is
//! configured, every call is let through.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use spg_common::Secret;

use crate::errors::{AuthError, ServerError};

pub const API_KEY_PREFIX: &str = "Apikey ";

pub struct ApiKeyMiddlewareFactory {
    // If None, then the middleware does not check the API key and always allows the call
    key: Option<Secret<String>>,
}

impl ApiKeyMiddlewareFactory {
    pub fn new(key: Option<Secret<String>>) -> Self {
        ApiKeyMiddlewareFactory { key }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = ApiKeyMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyMiddlewareService { key: self.key.clone(), service: Rc::new(service) }))
    }
}

pub struct ApiKeyMiddlewareService<S> {
    key: Option<Secret<String>>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let key = self.key.clone();
        Box::pin(async move {
            trace!("🔐️ Checking API key for request");
            let Some(key) = key else {
                trace!("🔐️ No API key is configured. Allowing request.");
                return service.call(req).await;
            };
            let header = req.headers().get(AUTHORIZATION).map(|v| v.to_str());
            match check_api_key(&key, header) {
                Ok(()) => {
                    trace!("🔐️ API key check for request ✅️");
                    service.call(req).await
                },
                Err(e) => {
                    warn!("🔐️ Denying access to {}. {e}", req.path());
                    Err(ServerError::from(e).into())
                },
            }
        })
    }
}

/// Validates the contents of an `Authorization` header against the configured key.
///
/// `header` is `None` if the header is absent, and `Some(Err(_))` if it is not valid visible ASCII.
pub fn check_api_key<E>(key: &Secret<String>, header: Option<Result<&str, E>>) -> Result<(), AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?.map_err(|_| AuthError::InvalidFormat)?;
    let provided = header.strip_prefix(API_KEY_PREFIX).ok_or(AuthError::InvalidFormat)?.trim();
    if provided.is_empty() || !key.matches(provided) {
        return Err(AuthError::InvalidApiKey);
    }
    Ok(())
}
