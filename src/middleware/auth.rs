use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::ledger::Caller;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};
use thiserror::Error;
use tracing::warn;

/// Verifies the bearer token, then hands the resolved [`Caller`] to the
/// handler as an extension.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = bearer_token(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let caller = match authenticate(&state, token).await {
        Ok(caller) => caller,
        Err(err) => {
            warn!(error = %err, uri = %req.uri(), "Rejected request");
            return Err(err.status());
        }
    };

    if !caller.role.grants(state.role) {
        warn!(
            user_id = caller.user_id,
            role = caller.role.as_str(),
            required = state.role.as_str(),
            "Insufficient role"
        );
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    pub role: String,
    pub exp: usize,
}

#[derive(Clone, Debug)]
pub struct AuthState {
    pub db: Arc<DatabaseConnection>,
    pub role: Role,
    pub secret: Arc<str>,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthMiddlewareError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AuthMiddlewareError::ValidationFail)
}

/// The claimed role has to match what is stored for the user.
async fn authenticate(state: &AuthState, token: &str) -> Result<Caller, AuthMiddlewareError> {
    let claims = validate_token(token, &state.secret)?;
    let role = Role::from_str(&claims.role).map_err(|_| AuthMiddlewareError::InvalidUserOrRole)?;

    match UserEntity::find_by_id(claims.user_id)
        .filter(user::Column::Role.eq(role))
        .one(&*state.db)
        .await
    {
        Ok(Some(user)) => Ok(Caller {
            user_id: user.id,
            email: user.email,
            role: user.role,
        }),
        Ok(None) => Err(AuthMiddlewareError::InvalidUserOrRole),
        Err(err) => Err(AuthMiddlewareError::InternalServerError(err.to_string())),
    }
}

#[derive(Error, Debug)]
pub enum AuthMiddlewareError {
    #[error("Invalid user id or role")]
    InvalidUserOrRole,
    #[error("Failed to validate token")]
    ValidationFail,
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AuthMiddlewareError {
    fn status(&self) -> StatusCode {
        match self {
            AuthMiddlewareError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}
