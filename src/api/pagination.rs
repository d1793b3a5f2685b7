use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_PAGE_SIZE: i64 = 10;
pub(crate) const MAX_PAGE_SIZE: i64 = 100;

const fn default_page() -> i64 {
    1
}

const fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// 1-based page query. Out of range values are clamped rather than rejected.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct PageQuery {
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: default_page(), limit: default_limit() }
    }
}

impl PageQuery {
    pub(crate) fn page(&self) -> i64 {
        self.page.max(1)
    }

    pub(crate) fn limit(&self) -> i64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    pub(crate) fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PageMeta {
    pub(crate) current_page: i64,
    pub(crate) total_pages: i64,
    pub(crate) total_items: i64,
    pub(crate) items_per_page: i64,
}

impl PageMeta {
    pub(crate) fn new(query: PageQuery, total_items: i64) -> Self {
        let limit = query.limit();
        Self {
            current_page: query.page(),
            total_pages: (total_items + limit - 1) / limit,
            total_items,
            items_per_page: limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PagedData<T> {
    pub(crate) data: Vec<T>,
    pub(crate) meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: i64, limit: i64) -> PageQuery {
        PageQuery { page, limit }
    }

    #[test]
    fn offsets_follow_pages() {
        assert_eq!(query(1, 10).offset(), 0);
        assert_eq!(query(3, 10).offset(), 20);
        assert_eq!(query(0, 10).offset(), 0);
        assert_eq!(query(-4, 10).page(), 1);
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(query(1, 0).limit(), 1);
        assert_eq!(query(1, 5000).limit(), MAX_PAGE_SIZE);
        assert_eq!(PageQuery::default().limit(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn total_pages_round_up() {
        assert_eq!(PageMeta::new(query(1, 10), 0).total_pages, 0);
        assert_eq!(PageMeta::new(query(1, 10), 10).total_pages, 1);
        assert_eq!(PageMeta::new(query(2, 10), 21).total_pages, 3);
    }
}
