//! # diary-auth (Emotion Diary authentication stub)
//!
//! `diary-auth` serves two JSON endpoints, `POST /auth` (register) and
//! `POST /auth/login`, on top of an in-memory user directory, together with a
//! generated `OpenAPI` document and Swagger UI at `/api-docs`.
//!
//! ## Security notice
//!
//! Passwords are stored and compared in **plaintext**. No hashing, no sessions
//! and no tokens are issued: a successful login only answers `{"ok": true}`.
//! This mirrors the behavior of the service it stands in for and must not be
//! used as-is for real credentials.
//!
//! ## Request flow
//!
//! Every request except `/api-docs` and `/health` first goes through a fixed
//! artificial delay (300ms by default) before reaching the auth routes or the
//! not-found fallback. Errors propagated by the handlers are formatted and
//! logged by a single error middleware.

pub mod api;
pub mod cli;
pub mod directory;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
