pub mod auth;

pub use auth::{AuthUser, Viewer, viewer_id};
