// ============================================================================
// PAGINATION
// ============================================================================
//
// Deux styles, comme côté client:
//   - limit/offset  → liste des recettes
//   - page/limit    → utilisateurs et abonnements
// Réponse commune: {count, next, previous, results}
//
// ============================================================================

use serde::{Deserialize, Serialize};

// LIMIT/OFFSET sont des BIGINT côté Postgres
pub const MAX_WINDOW: u64 = i64::MAX as u64;

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self, default: u64) -> u64 {
        clamp_window(self.limit.filter(|l| *l > 0).unwrap_or(default))
    }

    pub fn offset(&self, default: u64) -> u64 {
        clamp_window((self.page() - 1).saturating_mul(self.page_size(default)))
    }
}

/// Borne une valeur limit/offset venue de la query string
pub fn clamp_window(value: u64) -> u64 {
    value.min(MAX_WINDOW)
}

/// Liens next/previous pour la pagination limit/offset
pub fn limit_offset_links(
    url: &str,
    query_string: &str,
    count: u64,
    limit: u64,
    offset: u64,
) -> (Option<String>, Option<String>) {
    let next_offset = offset.saturating_add(limit);
    let next = (next_offset < count).then(|| {
        with_params(
            url,
            query_string,
            &[("limit", Some(limit)), ("offset", Some(next_offset))],
        )
    });

    let previous = (offset > 0).then(|| {
        let prev_offset = offset.saturating_sub(limit);
        with_params(
            url,
            query_string,
            &[
                ("limit", Some(limit)),
                ("offset", (prev_offset > 0).then_some(prev_offset)),
            ],
        )
    });

    (next, previous)
}

/// Liens next/previous pour la pagination par numéro de page
pub fn page_number_links(
    url: &str,
    query_string: &str,
    count: u64,
    page: u64,
    page_size: u64,
) -> (Option<String>, Option<String>) {
    let next = (page.saturating_mul(page_size) < count)
        .then(|| with_params(url, query_string, &[("page", Some(page + 1))]));

    let previous = (page > 1).then(|| {
        let prev = page - 1;
        with_params(url, query_string, &[("page", (prev > 1).then_some(prev))])
    });

    (next, previous)
}

// Remplace (ou retire si None) les paramètres donnés, garde les autres tels quels
fn with_params(url: &str, query_string: &str, updates: &[(&str, Option<u64>)]) -> String {
    let mut pairs: Vec<String> = query_string
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or_default();
            !updates.iter().any(|(k, _)| *k == key)
        })
        .map(str::to_string)
        .collect();

    for (key, value) in updates {
        if let Some(value) = value {
            pairs.push(format!("{}={}", key, value));
        }
    }

    if pairs.is_empty() {
        url.to_string()
    } else {
        format!("{}?{}", url, pairs.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://testserver/api/recipes/";

    #[test]
    fn test_limit_offset_first_page() {
        let (next, previous) = limit_offset_links(URL, "limit=6&author=3", 10, 6, 0);
        assert_eq!(
            next.as_deref(),
            Some("http://testserver/api/recipes/?author=3&limit=6&offset=6")
        );
        assert_eq!(previous, None);
    }

    #[test]
    fn test_limit_offset_last_page() {
        let (next, previous) = limit_offset_links(URL, "limit=6&offset=6", 10, 6, 6);
        assert_eq!(next, None);
        assert_eq!(previous.as_deref(), Some("http://testserver/api/recipes/?limit=6"));
    }

    #[test]
    fn test_page_number_links() {
        let (next, previous) = page_number_links(URL, "page=2&limit=1", 3, 2, 1);
        assert_eq!(next.as_deref(), Some("http://testserver/api/recipes/?limit=1&page=3"));
        assert_eq!(previous.as_deref(), Some("http://testserver/api/recipes/?limit=1"));
    }

    #[test]
    fn test_page_query_defaults() {
        let query = PageQuery { page: None, limit: None };
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(10), 10);
        assert_eq!(query.offset(10), 0);

        let query = PageQuery { page: Some(3), limit: Some(4) };
        assert_eq!(query.offset(10), 8);
    }

    #[test]
    fn test_huge_values_do_not_overflow() {
        let (next, previous) = limit_offset_links(URL, "offset=18446744073709551615", 10, 6, u64::MAX);
        assert_eq!(next, None);
        assert!(previous.is_some());

        let (next, _) = page_number_links(URL, "", 10, u64::MAX, 6);
        assert_eq!(next, None);

        let query = PageQuery { page: Some(u64::MAX), limit: Some(u64::MAX) };
        assert_eq!(query.page_size(6), MAX_WINDOW);
        assert_eq!(query.offset(6), MAX_WINDOW);
    }
}
