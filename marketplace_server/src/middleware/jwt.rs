//! Bearer token middleware.
//!
//! Wrap a scope with [`JwtMiddlewareFactory`] and every request under it must carry a valid
//! `Authorization: Bearer <jwt>` header. The decoded [`JwtClaims`] are stored in the request extensions, where the
//! ACL middleware and the `JwtClaims` extractor pick them up. Anything else is answered with a 401.
use std::{future::Future, pin::Pin, rc::Rc, sync::Arc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error,
    HttpMessage,
};
use futures::future::{ok, Ready};
use log::*;

use crate::{
    auth::{JwtClaims, TokenValidator},
    errors::ServerError,
};

pub struct JwtMiddlewareFactory {
    validator: Arc<TokenValidator>,
}

impl JwtMiddlewareFactory {
    pub fn new(validator: Arc<TokenValidator>) -> Self {
        Self { validator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(JwtMiddlewareService { validator: Arc::clone(&self.validator), service: Rc::new(service) })
    }
}

pub struct JwtMiddlewareService<S> {
    validator: Arc<TokenValidator>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let claims = self.validator.validate_header(req.headers().get(AUTHORIZATION));
        Box::pin(async move {
            match claims {
                Ok(claims) => {
                    trace!("🔐 {} authenticated as {}", claims.sub, claims.role);
                    req.extensions_mut().insert::<JwtClaims>(claims);
                    service.call(req).await
                },
                Err(e) => {
                    warn!("🔐 Rejected unauthenticated request to {}. {e}", req.path());
                    Err(ServerError::AuthenticationError(e).into())
                },
            }
        })
    }
}
