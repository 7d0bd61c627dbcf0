use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::models::book::{self, Book};
use crate::models::{image, wishlist, wishlist_book};
use crate::pagination;

#[derive(Debug, Deserialize)]
pub struct WishlistQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

async fn find_wishlist(
    db: &DatabaseConnection,
    claims: &Claims,
) -> Result<wishlist::Model, ApiError> {
    wishlist::Entity::find()
        .filter(wishlist::Column::AccountId.eq(claims.account_id))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Wishlist not found".to_string()))
}

pub async fn list_wishlist(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Query(query): Query<WishlistQuery>,
) -> Result<Json<Value>, ApiError> {
    let wishlist = find_wishlist(&db, &claims).await?;

    let member_ids: Vec<i32> = wishlist_book::Entity::find()
        .filter(wishlist_book::Column::WishlistId.eq(wishlist.id))
        .all(&db)
        .await?
        .into_iter()
        .map(|m| m.book_id)
        .collect();

    let (page, page_size) = pagination::normalize(query.page, query.page_size);
    let paginator = book::Entity::find()
        .filter(book::Column::Id.is_in(member_ids))
        .order_by_asc(book::Column::Title)
        .paginate(&db, page_size);

    let count = paginator.num_items().await?;
    let books = paginator.fetch_page(page).await?;
    let images = books.load_many(image::Entity, &db).await?;
    let results: Vec<Book> = books
        .into_iter()
        .zip(images)
        .map(|(model, images)| Book::from_model(model, images))
        .collect();

    Ok(Json(json!({
        "count": count,
        "results": results
    })))
}

pub async fn add_book(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    claims: Claims,
) -> Result<impl IntoResponse, ApiError> {
    let book = book::Entity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))?;

    let wishlist = find_wishlist(&db, &claims).await?;

    // Set semantics: adding an existing member is a no-op
    let already_member = wishlist_book::Entity::find_by_id((wishlist.id, book.id))
        .one(&db)
        .await?
        .is_some();
    if !already_member {
        let membership = wishlist_book::ActiveModel {
            wishlist_id: Set(wishlist.id),
            book_id: Set(book.id),
        };
        membership.insert(&db).await?;
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Book added to wishlist."
        })),
    ))
}

pub async fn remove_book(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    claims: Claims,
) -> Result<impl IntoResponse, ApiError> {
    let book = book::Entity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))?;

    let wishlist = find_wishlist(&db, &claims).await?;

    // Removing a non-member is equally a no-op
    wishlist_book::Entity::delete_many()
        .filter(wishlist_book::Column::WishlistId.eq(wishlist.id))
        .filter(wishlist_book::Column::BookId.eq(book.id))
        .exec(&db)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Book removed from wishlist."
        })),
    ))
}
