pub mod image;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod request;
pub mod short_link;
