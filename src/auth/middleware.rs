use actix_web::http::header::Header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::db::users::find_or_create_from_auth;
use crate::error::MarketError;
use crate::models::users::{self, CreateUserFromAuth};

/// The verified caller. Handlers that take this reject anonymous requests with 401.
pub struct AuthenticatedUser(pub users::Model);

impl FromRequest for AuthenticatedUser {
    type Error = MarketError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let auth = Authorization::<Bearer>::parse(&req).map_err(|_| {
                MarketError::Unauthorized(
                    "Authorization header must be: Bearer <token>".to_string(),
                )
            })?;
            let bearer = auth.into_scheme();
            let token = bearer.token();

            let verifier = req
                .app_data::<web::Data<Arc<TokenVerifier>>>()
                .ok_or_else(|| MarketError::Unauthorized("Token verifier not configured".into()))?;

            let claims = verifier
                .verify(token)
                .await
                .map_err(|e| MarketError::Unauthorized(format!("Invalid token: {e}")))?;

            let user_id = claims.user_id().map_err(MarketError::Unauthorized)?;
            let email = claims
                .user_email()
                .ok_or_else(|| MarketError::Unauthorized("No email in token claims".into()))?;

            let db = req
                .app_data::<web::Data<DatabaseConnection>>()
                .ok_or_else(|| MarketError::Unauthorized("Database not configured".into()))?;

            let user = find_or_create_from_auth(
                db.get_ref(),
                CreateUserFromAuth {
                    id: user_id,
                    email,
                    display_name: claims.display_name(),
                    avatar_url: claims.avatar_url(),
                    auth_provider: claims.iss.clone().unwrap_or_else(|| "jwt".to_string()),
                },
            )
            .await?;

            Ok(AuthenticatedUser(user))
        })
    }
}
