use crate::catalog::FREE_TEXT_KEY;
use crate::config::CatalogConfig;
use crate::error::{AppError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Rejects query parameters outside the declared allow-lists
#[derive(Debug, Clone)]
pub struct RequestValidator {
    config: Arc<CatalogConfig>,
}

impl RequestValidator {
    pub fn new(config: Arc<CatalogConfig>) -> Self {
        Self { config }
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.config.is_page_parameter(name) || self.config.is_filter(name) || name == FREE_TEXT_KEY
    }

    /// Every parameter name must be a page parameter, a filter or the free-text key.
    ///
    /// Names are checked in sorted order so the reported name is stable.
    pub fn validate<V>(&self, params: &HashMap<String, V>) -> Result<()> {
        let mut names: Vec<&String> = params.keys().collect();
        names.sort();

        match names.into_iter().find(|name| !self.is_allowed(name)) {
            Some(name) => Err(AppError::InvalidParameter(name.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> RequestValidator {
        RequestValidator::new(Arc::new(CatalogConfig::default()))
    }

    fn params(names: &[&str]) -> HashMap<String, String> {
        names
            .iter()
            .map(|name| (name.to_string(), "1".to_string()))
            .collect()
    }

    #[test]
    fn test_accepts_declared_names() {
        let validator = validator();
        assert!(validator
            .validate(&params(&["page", "pageSize", "sortBy", "sortOrder", "size", "year", "q"]))
            .is_ok());
        assert!(validator.validate(&params(&[])).is_ok());
    }

    #[test]
    fn test_rejects_unknown_name() {
        let err = validator().validate(&params(&["page", "bogus"])).unwrap_err();
        match err {
            AppError::InvalidParameter(name) => assert_eq!(name, "bogus"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert!(validator().validate(&params(&["PageSize"])).is_err());
    }

    #[test]
    fn test_reports_first_unknown_name_in_sorted_order() {
        let err = validator().validate(&params(&["zeta", "alpha", "size"])).unwrap_err();
        assert_eq!(err.to_string(), "Bad request parameter: alpha");
    }

    #[test]
    fn test_allow_lists_come_from_config() {
        let config = CatalogConfig {
            filter_names: vec!["brand".to_string()],
            ..Default::default()
        };
        let validator = RequestValidator::new(Arc::new(config));
        assert!(validator.validate(&params(&["brand"])).is_ok());
        assert!(validator.validate(&params(&["size"])).is_err());
    }
}
