//! Scanning filters: predicates deciding whether an element is scanned.

use std::fmt;
use std::sync::Arc;

use crate::config::Configuration;
use crate::environment::HostEnvironment;
use crate::error::DiResult;
use crate::provider::ServiceProvider;
use crate::traits::Resolver;

/// Decides whether a type or factory method takes part in scanning.
///
/// Filters are evaluated against the provider snapshot taken when scanning
/// starts. All filters attached to an element must accept it.
pub trait ScanningFilter: Send + Sync {
    fn can_scan(&self, provider: &ServiceProvider) -> DiResult<bool>;
}

/// Enables an element only in some hosting environments.
///
/// Names are compared case-insensitively against the registered
/// [`HostEnvironment`]. An unset `enabled` list enables every environment not
/// listed in `disabled`; an empty one enables none.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{EnvironmentSelector, ScanningFilter, ServiceCollection};
///
/// let mut services = ServiceCollection::new();
/// services.add_host_environment("Staging");
/// let provider = services.build();
///
/// let filter = EnvironmentSelector::new().enabled(["staging", "production"]);
/// assert!(filter.can_scan(&provider).unwrap());
///
/// let filter = EnvironmentSelector::new().disabled(["STAGING"]);
/// assert!(!filter.can_scan(&provider).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSelector {
    enabled: Option<Vec<String>>,
    disabled: Option<Vec<String>>,
}

impl EnvironmentSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn disabled<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

impl ScanningFilter for EnvironmentSelector {
    fn can_scan(&self, provider: &ServiceProvider) -> DiResult<bool> {
        let environment = provider.get::<HostEnvironment>()?;
        let listed = |names: &Vec<String>| names.iter().any(|n| environment.is(n));

        let mut enabled = true;
        if let Some(names) = &self.enabled {
            enabled &= listed(names);
        }
        if let Some(names) = &self.disabled {
            enabled &= !listed(names);
        }
        Ok(enabled)
    }
}

/// Enables an element when a configuration value equals an expected value.
///
/// Comparison is case-insensitive; a missing value never matches.
#[derive(Debug, Clone)]
pub struct ConfigurationSelector {
    key: String,
    enabled_if_equals: String,
}

impl ConfigurationSelector {
    pub fn new(key: impl Into<String>, enabled_if_equals: impl Into<String>) -> Self {
        Self { key: key.into(), enabled_if_equals: enabled_if_equals.into() }
    }
}

impl ScanningFilter for ConfigurationSelector {
    fn can_scan(&self, provider: &ServiceProvider) -> DiResult<bool> {
        let configuration = provider.get_trait::<dyn Configuration>()?;
        Ok(configuration
            .get(&self.key)
            .is_some_and(|value| value.eq_ignore_ascii_case(&self.enabled_if_equals)))
    }
}

type Condition = Arc<dyn Fn(&ServiceProvider) -> DiResult<bool> + Send + Sync>;

/// Enables an element when an arbitrary predicate over the provider holds.
#[derive(Clone)]
pub struct ConditionSelector {
    condition: Condition,
}

impl ConditionSelector {
    pub fn new<F>(condition: F) -> Self
    where
        F: Fn(&ServiceProvider) -> DiResult<bool> + Send + Sync + 'static,
    {
        Self { condition: Arc::new(condition) }
    }
}

impl ScanningFilter for ConditionSelector {
    fn can_scan(&self, provider: &ServiceProvider) -> DiResult<bool> {
        (self.condition)(provider)
    }
}

impl fmt::Debug for ConditionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConditionSelector")
    }
}
