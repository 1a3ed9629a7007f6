use crate::auth::jwt::verify_access_token;
use crate::config::Config;
use crate::error::ApiError;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

/// Caller identity for one request. Set by the auth middleware, or decoded
/// from the bearer token when a handler is mounted without it.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub person_id: String,
    pub email: String,
}

impl AuthUser {
    pub(crate) fn from_bearer(req: &HttpRequest) -> Result<Self, ApiError> {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        let config = req.app_data::<Data<Config>>().ok_or_else(|| {
            tracing::error!("Config missing from app data");
            ApiError::Internal
        })?;

        let claims =
            verify_access_token(token, &config.jwt_secret).map_err(|_| ApiError::Unauthorized)?;

        Ok(AuthUser {
            person_id: claims.user_id,
            email: claims.sub,
        })
    }
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }
        ready(AuthUser::from_bearer(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn extractor_prefers_identity_set_by_middleware() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthUser {
            person_id: "p-1".to_string(),
            email: "p1@example.com".to_string(),
        });

        let user = AuthUser::extract(&req).await.unwrap();
        assert_eq!(user.person_id, "p-1");
    }

    #[actix_web::test]
    async fn extractor_without_identity_or_header_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        let err = AuthUser::extract(&req).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }
}
