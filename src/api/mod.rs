pub mod accounts;
pub mod books;
pub mod health;
pub mod images;
pub mod token;
pub mod wishlist;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use sea_orm::DatabaseConnection;

pub fn api_router(db: DatabaseConnection) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Accounts
        .route("/accounts/register/", post(accounts::register))
        .route(
            "/accounts/me/",
            get(accounts::get_me)
                .put(accounts::update_me)
                .patch(accounts::update_me)
                .delete(accounts::delete_me),
        )
        // Wishlist
        .route("/accounts/wishlist/", get(wishlist::list_wishlist))
        .route("/accounts/wishlist/add-book/:id/", post(wishlist::add_book))
        .route(
            "/accounts/wishlist/remove-book/:id/",
            delete(wishlist::remove_book),
        )
        // Books
        .route("/books/", get(books::list_books).post(books::create_book))
        .route("/books/mine/", get(books::my_books))
        .route(
            "/books/:id/",
            get(books::get_book)
                .put(books::update_book)
                .patch(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/mark-sold/", patch(books::mark_sold))
        // Images
        .route("/books/add-image/", post(images::create_image))
        .route(
            "/books/images/:id/",
            get(images::get_image)
                .put(images::update_image)
                .patch(images::update_image)
                .delete(images::delete_image),
        )
        // Tokens
        .route("/token/", post(token::obtain_pair))
        .route("/token/refresh/", post(token::refresh))
        .with_state(db)
}
