use super::handlers::auth;
use utoipa::openapi::{server::Server, Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

pub const AUTH_TAG: &str = "Auth";
pub const API_TITLE: &str = "Emotion Diary API";
pub const API_DESCRIPTION: &str = "API для системы дневника эмоций и отслеживания настроения";
const CONTACT_NAME: &str = "API Support";

/// The generated document without any `servers` entry.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated OpenAPI spec.
    let (_router, openapi) = api_router(None).split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Add new endpoints here via `.routes(routes!(...))` so they are both served
/// and included in the generated `OpenAPI` spec.
/// Routes added outside (`/health`, `/api-docs`, the fallback) are not documented.
pub(crate) fn api_router(server_url: Option<&str>) -> OpenApiRouter {
    let mut base = base_openapi();

    if let Some(url) = server_url {
        let mut server = Server::new(url);
        server.description = Some("Настроенный сервер".to_string());
        base.servers = Some(vec![server]);
    }

    // `routes!` reads #[utoipa::path] to bind HTTP method + path and add the route to OpenAPI.
    OpenApiRouter::with_openapi(base)
        .routes(routes!(auth::register))
        .routes(routes!(auth::login))
}

fn base_openapi() -> utoipa::openapi::OpenApi {
    // Version and license come from Cargo.toml, the public identity does not.
    let mut info = InfoBuilder::new()
        .title(API_TITLE)
        .version(env!("CARGO_PKG_VERSION"))
        .description(Some(API_DESCRIPTION))
        .build();

    info.contact = Some(contact());
    info.license = cargo_license();

    let mut auth_tag = Tag::new(AUTH_TAG);
    auth_tag.description = Some("Эндпоинты для аутентификации и регистрации".to_string());

    OpenApiBuilder::new()
        .info(info)
        .tags(Some(vec![auth_tag]))
        .build()
}

fn contact() -> Contact {
    // Cargo authors are `;` separated and may include "Name <email>".
    let authors = env!("CARGO_PKG_AUTHORS");
    let email = authors
        .split(';')
        .next()
        .map(str::trim)
        .and_then(|primary| parse_author(primary).1);

    let mut contact = Contact::new();
    contact.name = Some(CONTACT_NAME.to_string());
    contact.email = email.map(str::to_string);
    contact
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    fn non_empty(s: &str) -> Option<&str> {
        let s = s.trim();
        (!s.is_empty()).then_some(s)
    }

    match author.split_once('<') {
        Some((name, email)) => (non_empty(name), non_empty(email.trim_end_matches('>'))),
        None => (non_empty(author), None),
    }
}
