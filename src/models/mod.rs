pub mod account;
pub mod book;
pub mod image;
pub mod wishlist;
pub mod wishlist_book;

pub use account::Account;
pub use book::Book;
