use std::path::Path;

use actix_web::{get, web, HttpResponse};

use crate::errors::ApiError;
use crate::services::media_store::LocalMediaStore;

/// GET {MEDIA_URL}{path} - Fichiers médias (images de recettes, avatars)
#[get("/{path:.*}")]
pub async fn serve_media(
    path: web::Path<String>,
    media: web::Data<LocalMediaStore>,
) -> Result<HttpResponse, ApiError> {
    let bytes = media.read(&path).await?;

    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&path))
        .body(bytes))
}

fn content_type_for(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Monté sous MEDIA_URL (ex: "/media/")
pub fn media_routes(cfg: &mut web::ServiceConfig, media_url: &str) {
    cfg.service(web::scope(media_url.trim_end_matches('/')).service(serve_media));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use tempfile::TempDir;

    #[actix_web::test]
    async fn test_serves_stored_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("avatar_images")).unwrap();
        std::fs::write(dir.path().join("avatar_images/me.png"), b"png").unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(LocalMediaStore::new(dir.path(), "/media/")))
                .configure(|cfg| media_routes(cfg, "/media/")),
        )
        .await;

        let req = test::TestRequest::get().uri("/media/avatar_images/me.png").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("Content-Type").unwrap(), "image/png");

        let req = test::TestRequest::get().uri("/media/avatar_images/none.png").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_content_type_for() {
        assert_eq!(content_type_for("a/b.JPG"), "image/jpeg");
        assert_eq!(content_type_for("a/b"), "application/octet-stream");
    }
}
