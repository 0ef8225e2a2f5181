//! Request-scoped paging and filter values

use crate::config::CatalogConfig;
use crate::error::{AppError, Result};
use crate::search::{FieldSort, Pagination, SortOrder};
use serde::Serialize;
use std::collections::HashMap;

pub const PAGE: &str = "page";
pub const PAGE_SIZE: &str = "pageSize";
pub const SORT_BY: &str = "sortBy";
pub const SORT_ORDER: &str = "sortOrder";

pub const DEFAULT_PAGE: u32 = 0;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_SORT_BY: &str = "year";

/// Paging and ordering of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParameters {
    pub page: u32,
    pub page_size: u32,
    pub sort_by: String,
    pub sort_order: SortOrder,
}

impl Default for PageParameters {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: DEFAULT_SORT_BY.to_string(),
            sort_order: SortOrder::Descending,
        }
    }
}

impl PageParameters {
    /// Read paging values from raw query parameters, applying defaults
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self> {
        let page = match params.get(PAGE) {
            Some(raw) => parse_number(PAGE, raw)?,
            None => DEFAULT_PAGE,
        };

        let page_size = match params.get(PAGE_SIZE) {
            Some(raw) => parse_number(PAGE_SIZE, raw)?,
            None => DEFAULT_PAGE_SIZE,
        };
        if page_size == 0 {
            return Err(AppError::malformed(PAGE_SIZE, "must be greater than zero"));
        }

        let sort_by = match params.get(SORT_BY).map(|s| s.trim()) {
            Some("") => return Err(AppError::malformed(SORT_BY, "must not be empty")),
            Some(field) => field.to_string(),
            None => DEFAULT_SORT_BY.to_string(),
        };

        let sort_order = match params.get(SORT_ORDER) {
            Some(raw) => raw.trim().parse()?,
            None => SortOrder::Descending,
        };

        Ok(Self {
            page,
            page_size,
            sort_by,
            sort_order,
        })
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::for_page(self.page, self.page_size)
    }

    pub fn sort(&self) -> FieldSort {
        FieldSort::new(self.sort_by.clone(), self.sort_order)
    }
}

fn parse_number(name: &str, raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|e| AppError::malformed(name, format!("'{}' is not a valid number: {}", raw, e)))
}

/// Filter values pinned by the current request, in declared filter order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    selected: Vec<(String, String)>,
}

impl FilterSelection {
    /// Pick the declared filters out of raw query parameters
    pub fn from_params(config: &CatalogConfig, params: &HashMap<String, String>) -> Self {
        let selected = config
            .filter_names
            .iter()
            .filter_map(|name| params.get(name).map(|value| (name.clone(), value.clone())))
            .collect();
        Self { selected }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.selected
            .iter()
            .find(|(filter, _)| filter == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.selected.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterSelection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            selected: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
