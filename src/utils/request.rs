use actix_web::HttpRequest;

/// "scheme://host" de la requête courante
pub fn base_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

/// URL absolue de la ressource demandée, sans query string
pub fn current_url(req: &HttpRequest) -> String {
    format!("{}{}", base_url(req), req.path())
}

/// Interprète les booléens de filtre ("1", "true", "True")
pub fn parse_bool_flag(value: &str) -> bool {
    matches!(value, "1" | "true" | "True")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_parse_bool_flag() {
        assert!(parse_bool_flag("1"));
        assert!(parse_bool_flag("true"));
        assert!(parse_bool_flag("True"));
        assert!(!parse_bool_flag("0"));
        assert!(!parse_bool_flag("TRUE"));
        assert!(!parse_bool_flag("yes"));
    }

    #[test]
    fn test_current_url() {
        let req = TestRequest::get()
            .uri("/api/recipes/?limit=2")
            .insert_header(("Host", "foodgram.local"))
            .to_http_request();
        assert_eq!(current_url(&req), "http://foodgram.local/api/recipes/");
    }
}
