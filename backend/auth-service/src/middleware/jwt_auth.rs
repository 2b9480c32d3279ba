/// JWT authentication middleware
///
/// Resolves the caller from the `accessToken` cookie (or a bearer header),
/// loads the public projection of the user and attaches it to the request.
/// Any failure short-circuits with 401 and the inner service is never called.
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, ResponseError,
};
use crypto_core::jwt::{TokenError, TokenIssuer};
use futures::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use crate::db::UserStore;
use crate::error::{AuthError, AuthResult};
use crate::handlers::ACCESS_TOKEN_COOKIE;
use crate::models::PublicUser;

/// The authenticated caller, without credentials
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub PublicUser);

/// JWT Authentication Middleware
#[derive(Clone)]
pub struct JwtAuthMiddleware {
    store: Arc<dyn UserStore>,
    tokens: Arc<TokenIssuer>,
}

impl JwtAuthMiddleware {
    pub fn new(store: Arc<dyn UserStore>, tokens: Arc<TokenIssuer>) -> Self {
        Self { store, tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            store: self.store.clone(),
            tokens: self.tokens.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    store: Arc<dyn UserStore>,
    tokens: Arc<TokenIssuer>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let store = self.store.clone();
        let tokens = self.tokens.clone();

        Box::pin(async move {
            let token = access_token_from(&req);
            match authenticate(store.as_ref(), &tokens, token.as_deref()).await {
                Ok(user) => {
                    req.extensions_mut().insert(AuthenticatedUser(user));
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    let response = err.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// Non-empty `accessToken` cookie first, then `Authorization: Bearer`
pub fn access_token_from(req: &ServiceRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(ACCESS_TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Every failure here is reported as 401
pub async fn authenticate(
    store: &dyn UserStore,
    tokens: &TokenIssuer,
    token: Option<&str>,
) -> AuthResult<PublicUser> {
    let token = token.ok_or_else(|| AuthError::unauthorized("Unauthorized request"))?;

    let claims = tokens.decode_access(token).map_err(|err| {
        tracing::warn!(error = %err, "access token rejected");
        match err {
            TokenError::Expired => AuthError::unauthorized("Access token expired"),
            _ => AuthError::unauthorized("Invalid access token"),
        }
    })?;

    match store.find_public_by_id(claims.sub).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => {
            tracing::warn!(user_id = %claims.sub, "access token for unknown user");
            Err(AuthError::unauthorized("Invalid access token"))
        }
        Err(err) => {
            tracing::error!(error = %err, "user lookup failed during authentication");
            Err(AuthError::unauthorized("Invalid access token"))
        }
    }
}

impl actix_web::FromRequest for AuthenticatedUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(AuthError::unauthorized("Unauthorized request"))),
        }
    }
}
