/// HTTP middleware for social-api
///
/// Bearer-token authentication: [`JwtAuthMiddleware`] verifies the token,
/// checks that its subject is still a registered user and stores the acting
/// [`UserId`] in request extensions, where handlers pick it up through the
/// [`UserId`] extractor.
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{http::header, Error, FromRequest, HttpMessage, HttpRequest};
use crypto_core::JwtKeys;
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use crate::db::CredentialStore;
use crate::error::AppError;

/// Acting user resolved from a verified bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub i64);

/// Actix middleware that rejects requests without a valid bearer token.
///
/// Rejections are answered here with a 401 JSON body; the wrapped service is
/// never called.
#[derive(Clone)]
pub struct JwtAuthMiddleware {
    keys: Arc<JwtKeys>,
    credentials: Arc<dyn CredentialStore>,
}

impl JwtAuthMiddleware {
    pub fn new(keys: Arc<JwtKeys>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self { keys, credentials }
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
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            keys: self.keys.clone(),
            credentials: self.credentials.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    keys: Arc<JwtKeys>,
    credentials: Arc<dyn CredentialStore>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let keys = self.keys.clone();
        let credentials = self.credentials.clone();

        Box::pin(async move {
            let user_id = match authenticate(&keys, &req) {
                Ok(user_id) => resolve_subject(credentials.as_ref(), user_id).await,
                Err(err) => Err(err),
            };

            match user_id {
                Ok(user_id) => {
                    req.extensions_mut().insert(user_id);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Err(err) => {
                    tracing::debug!(path = %req.path(), error = %err, "Rejected unauthenticated request");
                    Ok(req.error_response(err).map_into_right_body())
                }
            }
        })
    }
}

fn authenticate(keys: &JwtKeys, req: &ServiceRequest) -> Result<UserId, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Authentication("Invalid Authorization scheme".to_string()))?;

    Ok(UserId(keys.verify(token)?))
}

/// Tokens outlive in-memory stores; a subject that is no longer registered is rejected.
async fn resolve_subject(
    credentials: &dyn CredentialStore,
    user_id: UserId,
) -> Result<UserId, AppError> {
    if credentials.user_exists(user_id.0).await? {
        Ok(user_id)
    } else {
        Err(AppError::Authentication(
            "Token subject no longer exists".to_string(),
        ))
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<UserId>()
                .copied()
                .ok_or_else(|| Error::from(AppError::Authentication("User ID missing".to_string()))),
        )
    }
}
