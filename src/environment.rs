//! Hosting environment description.

/// Name of the environment the application runs in (`Development`,
/// `Staging`, `Production`, ...).
///
/// Registered as a singleton with
/// [`add_host_environment`](crate::ServiceCollection::add_host_environment)
/// and read by [`EnvironmentSelector`](crate::EnvironmentSelector).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    name: String,
}

impl HostEnvironment {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-insensitive comparison against an environment name.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn is_development(&self) -> bool {
        self.is("Development")
    }

    pub fn is_production(&self) -> bool {
        self.is("Production")
    }
}
