use serde::{Deserialize, Serialize};

/// A list endpoint response. The API paginates most lists
/// (`{count, next, previous, results}`) but some deployments return a bare
/// array; both decode into the same items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Page<T> {
    Paginated {
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
    List(Vec<T>),
}

impl<T> Page<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Page::Paginated { results, .. } => results,
            Page::List(items) => items,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Page::Paginated { results, .. } => results,
            Page::List(items) => items,
        }
    }

    /// URL of the next page, if the server reported one
    pub fn next_page(&self) -> Option<&str> {
        match self {
            Page::Paginated { next, .. } => next.as_deref(),
            Page::List(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_accepts_bare_list() {
        let page: Page<i64> = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(page.items(), &[1, 2, 3]);
        assert!(page.next_page().is_none());
    }

    #[test]
    fn test_page_accepts_paginated_envelope() {
        let json = r#"{"count": 30, "next": "http://host/api/x/?page=2", "previous": null, "results": [4, 5]}"#;
        let page: Page<i64> = serde_json::from_str(json).unwrap();
        assert_eq!(page.next_page(), Some("http://host/api/x/?page=2"));
        assert_eq!(page.into_items(), vec![4, 5]);
    }
}
