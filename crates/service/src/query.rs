//! Query construction shared by every list/count endpoint pair.
//!
//! A request's `search`, `sort`, `page` and `size` plus an optional owner
//! scope become a [`ListQuery`]. Counting uses only [`Filter`], built by the
//! same function the listing uses, so `ceil(count / size)` always matches
//! the number of pages the listing will produce.

use serde::Deserialize;
use serde_json::Value;

use models::Fields;

use crate::errors::ServiceError;
use crate::pagination::{Pagination, Window};

/// Field the free-text search matches against.
pub const SEARCH_FIELD: &str = models::service::SERVICE_NAME;
/// Field `sort=asc|desc` orders by.
pub const SORT_FIELD: &str = models::service::PRICE;

/// Caps applied to listings regardless of what the client asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListingLimits {
    pub max_page_size: u64,
    pub popular_limit: u64,
}

impl Default for ListingLimits {
    fn default() -> Self {
        Self { max_page_size: 100, popular_limit: 6 }
    }
}

/// Raw listing parameters as they arrive in the query string. Kept as text
/// so malformed numbers surface as validation errors instead of extractor
/// rejections.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

impl ListParams {
    pub fn search(mut self, s: impl Into<String>) -> Self {
        self.search = Some(s.into());
        self
    }

    pub fn sort(mut self, s: impl Into<String>) -> Self {
        self.sort = Some(s.into());
        self
    }

    pub fn page(mut self, page: u64, size: u64) -> Self {
        self.page = Some(page.to_string());
        self.size = Some(size.to_string());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Empty or missing means store order.
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, ServiceError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(s) if s.eq_ignore_ascii_case("asc") => Ok(Some(Self::Asc)),
            Some(s) if s.eq_ignore_ascii_case("desc") => Ok(Some(Self::Desc)),
            Some(other) => Err(ServiceError::Validation(format!("sort must be asc or desc, got {other:?}"))),
        }
    }

    pub fn direction(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

/// Equality restriction on one field, e.g. `providerEmail == caller`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scope {
    pub field: String,
    pub value: String,
}

impl Scope {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self { field: field.into(), value: value.into() }
    }
}

/// Predicate half of a query: optional case-insensitive substring search
/// AND-ed with any number of equality scopes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    pub search: Option<String>,
    pub scopes: Vec<Scope>,
}

impl Filter {
    pub fn everything() -> Self {
        Self::default()
    }

    pub fn from_params(params: &ListParams, scope: Option<Scope>) -> Self {
        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self { search, scopes: scope.into_iter().collect() }
    }

    pub fn and_equals(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.scopes.push(Scope::new(field, value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.scopes.is_empty()
    }

    /// Evaluate against a plain document. Stores that cannot push the
    /// predicate down use this; it mirrors the MongoDB translation.
    pub fn matches(&self, doc: &Fields) -> bool {
        if let Some(needle) = &self.search {
            let hit = match doc.get(SEARCH_FIELD) {
                Some(Value::String(hay)) => hay.to_lowercase().contains(&needle.to_lowercase()),
                _ => false,
            };
            if !hit {
                return false;
            }
        }
        self.scopes.iter().all(|s| matches!(doc.get(&s.field), Some(Value::String(v)) if *v == s.value))
    }
}

/// Complete description of one listing request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: Filter,
    pub sort: Option<SortOrder>,
    pub window: Option<Window>,
}

impl ListQuery {
    pub fn build(params: &ListParams, scope: Option<Scope>, max_page_size: u64) -> Result<Self, ServiceError> {
        let filter = Filter::from_params(params, scope);
        let sort = SortOrder::parse(params.sort.as_deref())?;
        let window = Pagination::parse(params.page.as_deref(), params.size.as_deref())?
            .map(|p| p.window(max_page_size))
            .transpose()?;
        Ok(Self { filter, sort, window })
    }

    /// First `limit` documents matching `filter` in store order.
    pub fn limited(filter: Filter, limit: u64) -> Self {
        Self { filter, sort: None, window: Some(Window { skip: 0, limit }) }
    }
}
