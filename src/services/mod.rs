pub mod auth;
pub mod catalog;
pub mod notification;

pub use auth::{AuthError, AuthService, IssuedCode, Session};
pub use catalog::{Catalog, CatalogError, InMemoryCatalog, NewMovie, NewShowtime};
pub use notification::{
    HttpNotificationSender, LogNotificationSender, NotificationError, NotificationSender,
};
