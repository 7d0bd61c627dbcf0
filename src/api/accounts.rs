use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{hash_password, Claims};
use crate::error::ApiError;
use crate::models::account::{self, Account, Entity as AccountEntity};
use crate::models::{book, image, wishlist, wishlist_book};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AccountUpdate {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

pub async fn register(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::Validation {
            field: "username",
            message: "This field may not be blank.".to_string(),
        });
    }
    if payload.password.is_empty() {
        return Err(ApiError::Validation {
            field: "password",
            message: "This field may not be blank.".to_string(),
        });
    }

    let existing = AccountEntity::find()
        .filter(account::Column::Username.eq(&payload.username))
        .one(&db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Validation {
            field: "username",
            message: "A user with that username already exists.".to_string(),
        });
    }

    let password_hash =
        hash_password(&payload.password).map_err(ApiError::Database)?;

    // Account and its empty wishlist are created atomically
    let txn = db.begin().await?;

    let new_account = account::ActiveModel {
        username: Set(payload.username),
        password_hash: Set(password_hash),
        first_name: Set(payload.first_name),
        last_name: Set(payload.last_name),
        image: Set(payload.image),
        phone_number: Set(payload.phone_number),
        date_joined: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };
    let model = new_account.insert(&txn).await?;

    let new_wishlist = wishlist::ActiveModel {
        account_id: Set(model.id),
        ..Default::default()
    };
    new_wishlist.insert(&txn).await?;

    txn.commit().await?;

    tracing::info!("Account registered: {}", model.username);

    Ok((StatusCode::CREATED, Json(json!(Account::from(model)))))
}

async fn find_caller(
    db: &DatabaseConnection,
    claims: &Claims,
) -> Result<account::Model, ApiError> {
    AccountEntity::find_by_id(claims.account_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))
}

pub async fn get_me(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> Result<Json<Value>, ApiError> {
    let model = find_caller(&db, &claims).await?;
    Ok(Json(json!(Account::from(model))))
}

pub async fn update_me(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<Value>, ApiError> {
    let model = find_caller(&db, &claims).await?;

    if let Some(username) = &payload.username {
        if username.trim().is_empty() {
            return Err(ApiError::Validation {
                field: "username",
                message: "This field may not be blank.".to_string(),
            });
        }
        if username != &model.username {
            let taken = AccountEntity::find()
                .filter(account::Column::Username.eq(username))
                .one(&db)
                .await?;
            if taken.is_some() {
                return Err(ApiError::Validation {
                    field: "username",
                    message: "A user with that username already exists.".to_string(),
                });
            }
        }
    }

    let mut active: account::ActiveModel = model.into();
    if let Some(username) = payload.username {
        active.username = Set(username);
    }
    if let Some(password) = payload.password {
        let password_hash = hash_password(&password).map_err(ApiError::Database)?;
        active.password_hash = Set(password_hash);
    }
    if let Some(first_name) = payload.first_name {
        active.first_name = Set(Some(first_name));
    }
    if let Some(last_name) = payload.last_name {
        active.last_name = Set(Some(last_name));
    }
    if let Some(image) = payload.image {
        active.image = Set(Some(image));
    }
    if let Some(phone_number) = payload.phone_number {
        active.phone_number = Set(Some(phone_number));
    }

    let model = active.update(&db).await?;
    Ok(Json(json!(Account::from(model))))
}

pub async fn delete_me(
    State(db): State<DatabaseConnection>,
    claims: Claims,
) -> Result<impl IntoResponse, ApiError> {
    let model = find_caller(&db, &claims).await?;

    // Cascade: owned books (with their images and wishlist memberships),
    // then the caller's own wishlist, then the account itself
    let txn = db.begin().await?;

    let owned_ids: Vec<i32> = book::Entity::find()
        .filter(book::Column::AccountId.eq(model.id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|b| b.id)
        .collect();

    if !owned_ids.is_empty() {
        image::Entity::delete_many()
            .filter(image::Column::BookId.is_in(owned_ids.clone()))
            .exec(&txn)
            .await?;
        wishlist_book::Entity::delete_many()
            .filter(wishlist_book::Column::BookId.is_in(owned_ids.clone()))
            .exec(&txn)
            .await?;
        book::Entity::delete_many()
            .filter(book::Column::AccountId.eq(model.id))
            .exec(&txn)
            .await?;
    }

    if let Some(own_wishlist) = wishlist::Entity::find()
        .filter(wishlist::Column::AccountId.eq(model.id))
        .one(&txn)
        .await?
    {
        wishlist_book::Entity::delete_many()
            .filter(wishlist_book::Column::WishlistId.eq(own_wishlist.id))
            .exec(&txn)
            .await?;
        wishlist::Entity::delete_by_id(own_wishlist.id)
            .exec(&txn)
            .await?;
    }

    let username = model.username.clone();
    AccountEntity::delete_by_id(model.id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!("Account deleted: {}", username);

    Ok(StatusCode::NO_CONTENT)
}
