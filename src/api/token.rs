use axum::{extract::State, Json};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{
    create_access_token, create_refresh_token, decode_jwt, verify_password, TOKEN_KIND_REFRESH,
};
use crate::error::ApiError;
use crate::models::account::{self, Entity as AccountEntity};

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

pub async fn obtain_pair(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<Value>, ApiError> {
    tracing::info!("Token request for user: {}", payload.username);

    let invalid = || {
        ApiError::Unauthorized(
            "No active account found with the given credentials".to_string(),
        )
    };

    let account = AccountEntity::find()
        .filter(account::Column::Username.eq(&payload.username))
        .one(&db)
        .await?
        .ok_or_else(invalid)?;

    match verify_password(&payload.password, &account.password_hash) {
        Ok(true) => {}
        _ => {
            tracing::warn!("Password verification failed for user: {}", account.username);
            return Err(invalid());
        }
    }

    let access =
        create_access_token(&account.username, account.id).map_err(ApiError::Database)?;
    let refresh =
        create_refresh_token(&account.username, account.id).map_err(ApiError::Database)?;

    Ok(Json(json!({
        "access": access,
        "refresh": refresh
    })))
}

pub async fn refresh(Json(payload): Json<RefreshRequest>) -> Result<Json<Value>, ApiError> {
    let claims = decode_jwt(&payload.refresh)
        .map_err(|_| ApiError::Unauthorized("Token is invalid or expired".to_string()))?;

    if claims.kind != TOKEN_KIND_REFRESH {
        return Err(ApiError::Unauthorized(
            "Token is not a refresh token".to_string(),
        ));
    }

    let access =
        create_access_token(&claims.sub, claims.account_id).map_err(ApiError::Database)?;

    Ok(Json(json!({ "access": access })))
}
