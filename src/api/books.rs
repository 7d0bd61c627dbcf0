use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::models::book::{self, Book, BookCreate, BookUpdate, Entity as BookEntity};
use crate::models::{image, wishlist_book};
use crate::pagination;

#[derive(Debug, Deserialize)]
pub struct BookListQuery {
    pub sold: Option<bool>,
    pub account: Option<i32>,
    pub cover: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

fn apply_filters(mut select: Select<BookEntity>, query: &BookListQuery) -> Select<BookEntity> {
    if let Some(sold) = query.sold {
        select = select.filter(book::Column::Sold.eq(sold));
    }
    if let Some(account) = query.account {
        select = select.filter(book::Column::AccountId.eq(account));
    }
    if let Some(cover) = &query.cover {
        select = select.filter(book::Column::Cover.eq(cover.clone()));
    }
    if let Some(search) = &query.search {
        select = select.filter(book::Column::Title.contains(search));
    }
    match query.ordering.as_deref() {
        Some("title") => select = select.order_by_asc(book::Column::Title),
        Some("-title") => select = select.order_by_desc(book::Column::Title),
        Some("price") => select = select.order_by_asc(book::Column::Price),
        Some("-price") => select = select.order_by_desc(book::Column::Price),
        Some("created_at") => select = select.order_by_asc(book::Column::CreatedAt),
        Some("-created_at") => select = select.order_by_desc(book::Column::CreatedAt),
        // Unknown ordering values are ignored, not rejected
        _ => {}
    }
    select
}

/// Attach each book's images and produce the read models.
async fn to_read_models(
    db: &DatabaseConnection,
    books: Vec<book::Model>,
) -> Result<Vec<Book>, ApiError> {
    let images = books.load_many(image::Entity, db).await?;
    Ok(books
        .into_iter()
        .zip(images)
        .map(|(model, images)| Book::from_model(model, images))
        .collect())
}

/// Shared by the public list and the caller-scoped list.
async fn paginated_list(
    db: &DatabaseConnection,
    select: Select<BookEntity>,
    query: &BookListQuery,
) -> Result<Json<Value>, ApiError> {
    let select = apply_filters(select, query);
    let (page, page_size) = pagination::normalize(query.page, query.page_size);

    let paginator = select.paginate(db, page_size);
    let count = paginator.num_items().await?;
    let books = paginator.fetch_page(page).await?;
    let results = to_read_models(db, books).await?;

    Ok(Json(json!({
        "count": count,
        "results": results
    })))
}

pub async fn list_books(
    State(db): State<DatabaseConnection>,
    Query(query): Query<BookListQuery>,
) -> Result<Json<Value>, ApiError> {
    paginated_list(&db, BookEntity::find(), &query).await
}

pub async fn my_books(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Query(mut query): Query<BookListQuery>,
) -> Result<Json<Value>, ApiError> {
    // The account filter is implicit here
    query.account = None;
    let select = BookEntity::find().filter(book::Column::AccountId.eq(claims.account_id));
    paginated_list(&db, select, &query).await
}

fn validate_price(price: f64) -> Result<(), ApiError> {
    if price < 0.0 || !price.is_finite() {
        return Err(ApiError::Validation {
            field: "price",
            message: "Ensure this value is greater than or equal to 0.".to_string(),
        });
    }
    Ok(())
}

pub async fn create_book(
    State(db): State<DatabaseConnection>,
    claims: Claims,
    Json(payload): Json<BookCreate>,
) -> Result<impl IntoResponse, ApiError> {
    validate_price(payload.price)?;
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation {
            field: "title",
            message: "This field may not be blank.".to_string(),
        });
    }

    let new_book = book::ActiveModel {
        title: Set(payload.title),
        details: Set(payload.details),
        region: Set(payload.region),
        price: Set(payload.price),
        cover: Set(payload.cover),
        sold: Set(payload.sold.unwrap_or(false)),
        phone: Set(payload.phone),
        telegram: Set(payload.telegram),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        // Owner is always the caller, regardless of what the client sent
        account_id: Set(claims.account_id),
        ..Default::default()
    };

    let model = new_book.insert(&db).await?;
    tracing::info!("Book {} created by account {}", model.id, claims.account_id);

    Ok((
        StatusCode::CREATED,
        Json(json!(Book::from_model(model, vec![]))),
    ))
}

pub async fn get_book(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    let model = BookEntity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))?;

    let images = image::Entity::find()
        .filter(image::Column::BookId.eq(model.id))
        .all(&db)
        .await?;

    Ok(Json(json!(Book::from_model(model, images))))
}

pub async fn update_book(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    claims: Claims,
    Json(payload): Json<BookUpdate>,
) -> Result<Json<Value>, ApiError> {
    let model = BookEntity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))?;

    if model.account_id != claims.account_id {
        return Err(ApiError::not_owner());
    }

    if let Some(price) = payload.price {
        validate_price(price)?;
    }

    let mut active: book::ActiveModel = model.into();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(details) = payload.details {
        active.details = Set(Some(details));
    }
    if let Some(region) = payload.region {
        active.region = Set(Some(region));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(cover) = payload.cover {
        active.cover = Set(Some(cover));
    }
    if let Some(sold) = payload.sold {
        active.sold = Set(sold);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(telegram) = payload.telegram {
        active.telegram = Set(Some(telegram));
    }

    let model = active.update(&db).await?;

    let images = image::Entity::find()
        .filter(image::Column::BookId.eq(model.id))
        .all(&db)
        .await?;

    Ok(Json(json!(Book::from_model(model, images))))
}

pub async fn delete_book(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    claims: Claims,
) -> Result<impl IntoResponse, ApiError> {
    let model = BookEntity::find_by_id(id)
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))?;

    if model.account_id != claims.account_id {
        return Err(ApiError::not_owner());
    }

    // Cascade to images and wishlist memberships in one transaction
    let txn = db.begin().await?;
    image::Entity::delete_many()
        .filter(image::Column::BookId.eq(model.id))
        .exec(&txn)
        .await?;
    wishlist_book::Entity::delete_many()
        .filter(wishlist_book::Column::BookId.eq(model.id))
        .exec(&txn)
        .await?;
    BookEntity::delete_by_id(model.id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!("Book {} deleted by account {}", id, claims.account_id);

    Ok(StatusCode::NO_CONTENT)
}

/// One-way transition to sold. Ownership is enforced by filtering the lookup
/// to caller+id, so a non-owner sees a 404 rather than a 403.
pub async fn mark_sold(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    claims: Claims,
) -> Result<Json<Value>, ApiError> {
    let model = BookEntity::find()
        .filter(book::Column::Id.eq(id))
        .filter(book::Column::AccountId.eq(claims.account_id))
        .one(&db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))?;

    let mut active: book::ActiveModel = model.into();
    active.sold = Set(true);
    let model = active.update(&db).await?;

    let images = image::Entity::find()
        .filter(image::Column::BookId.eq(model.id))
        .all(&db)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Book marked sold.",
        "data": Book::from_model(model, images)
    })))
}
