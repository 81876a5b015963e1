pub mod auth;

pub mod health;
pub use self::health::health;

pub mod not_found;
pub use self::not_found::not_found;
