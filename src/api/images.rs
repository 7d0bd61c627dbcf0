use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::models::book;
use crate::models::image::{self, Entity as ImageEntity};

#[derive(Debug, Deserialize)]
pub struct ImageCreate {
    pub image: String,
    pub book: i32,
}

#[derive(Debug, Deserialize)]
pub struct ImageUpdate {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub book: Option<i32>,
}

/// Full read model, used when the image is the addressed resource.
#[derive(Debug, Serialize)]
pub struct ImageDetail {
    pub id: i32,
    pub image: String,
    pub book: i32,
}

impl From<image::Model> for ImageDetail {
    fn from(model: image::Model) -> Self {
        Self {
            id: model.id,
            image: model.image,
            book: model.book_id,
        }
    }
}

/// Resolve a book the caller owns, or 404. Used wherever an image is created
/// against or re-pointed at a book.
async fn find_owned_book(
    db: &DatabaseConnection,
    book_id: i32,
    claims: &Claims,
) -> Result<book::Model, ApiError> {
    book::Entity::find()
        .filter(book::Column::Id.eq(book_id))
        .filter(book::Column::AccountId.eq(claims.account_id))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))
}

pub async fn create_image(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<ImageCreate>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.image.trim().is_empty() {
        return Err(ApiError::Validation {
            field: "image",
            message: "This field may not be blank.".to_string(),
        });
    }

    // Images can only be attached to the caller's own listings
    let book = find_owned_book(&db, payload.book, &claims).await?;

    let new_image = image::ActiveModel {
        image: Set(payload.image),
        book_id: Set(book.id),
        ..Default::default()
    };
    let model = new_image.insert(&db).await?;

    Ok((StatusCode::CREATED, Json(json!(ImageDetail::from(model)))))
}

pub async fn get_image(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let model = ImageEntity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))?;

    Ok(Json(json!(ImageDetail::from(model))))
}

/// Ownership of an image is derived through its parent book.
async fn check_parent_owner(
    db: &DatabaseConnection,
    model: &image::Model,
    claims: &Claims,
) -> Result<(), ApiError> {
    let parent = book::Entity::find_by_id(model.book_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))?;
    if parent.account_id != claims.account_id {
        return Err(ApiError::not_owner());
    }
    Ok(())
}

pub async fn update_image(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    claims: Claims,
    Json(payload): Json<ImageUpdate>,
) -> Result<Json<Value>, ApiError> {
    let model = ImageEntity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))?;

    check_parent_owner(&db, &model, &claims).await?;

    let mut active: image::ActiveModel = model.into();
    if let Some(file_ref) = payload.image {
        active.image = Set(file_ref);
    }
    if let Some(book_id) = payload.book {
        // Re-pointing is limited to listings the caller owns
        let target = find_owned_book(&db, book_id, &claims).await?;
        active.book_id = Set(target.id);
    }

    let model = active.update(&db).await?;
    Ok(Json(json!(ImageDetail::from(model))))
}

pub async fn delete_image(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    claims: Claims,
) -> Result<impl IntoResponse, ApiError> {
    let model = ImageEntity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))?;

    check_parent_owner(&db, &model, &claims).await?;

    ImageEntity::delete_by_id(model.id).exec(&db).await?;

    Ok(StatusCode::NO_CONTENT)
}
