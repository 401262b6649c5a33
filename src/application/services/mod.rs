//! Business logic services for the application layer.

pub mod link_service;
pub mod redirect_resolver;

pub use link_service::{
    LinkService, LinkSettings, MAX_COLLISION_RETRIES, MAX_EXPIRATION_DAYS, ShortenCommand,
    ShortenedLink,
};
pub use redirect_resolver::RedirectResolver;
