use ferrous_wire::{
    ConditionSelector, Configuration, ConfigurationSelector, ConstructorInfo, EnvironmentSelector, LayeredConfiguration,
    MemoryConfiguration, MergeStrategy, MethodInfo, RegisterFactory, RegisterService, Resolver, ScanningFilter,
    ServiceCollection, TypeMetadata,
};
use serial_test::serial;
use std::env;

struct Cache;

fn cache_metadata<F: ScanningFilter + 'static>(filter: F) -> TypeMetadata {
    TypeMetadata::builder::<Cache>()
        .filter(filter)
        .register(RegisterService::singleton())
        .constructor(ConstructorInfo::new(vec![], |_| Ok(Cache)))
        .build()
}

fn scanned_with(sc: &mut ServiceCollection, metadata: TypeMetadata) -> bool {
    sc.scan_types(&[metadata], MergeStrategy::Replace).unwrap();
    sc.snapshot().get::<Cache>().is_ok()
}

#[test]
fn test_environment_selector_enabled_list() {
    let mut sc = ServiceCollection::new();
    sc.add_host_environment("Development");
    assert!(scanned_with(&mut sc, cache_metadata(EnvironmentSelector::new().enabled(["development"]))));

    let mut sc = ServiceCollection::new();
    sc.add_host_environment("Production");
    assert!(!scanned_with(&mut sc, cache_metadata(EnvironmentSelector::new().enabled(["Development", "Staging"]))));
}

#[test]
fn test_environment_selector_disabled_list() {
    let mut sc = ServiceCollection::new();
    sc.add_host_environment("Production");
    assert!(!scanned_with(&mut sc, cache_metadata(EnvironmentSelector::new().disabled(["PRODUCTION"]))));

    let mut sc = ServiceCollection::new();
    sc.add_host_environment("Staging");
    assert!(scanned_with(&mut sc, cache_metadata(EnvironmentSelector::new().disabled(["Production"]))));
}

#[test]
fn test_environment_selector_empty_enabled_list_rejects_all() {
    let mut sc = ServiceCollection::new();
    sc.add_host_environment("Production");
    assert!(!scanned_with(&mut sc, cache_metadata(EnvironmentSelector::new().enabled(Vec::<String>::new()))));
    assert!(scanned_with(&mut sc, cache_metadata(EnvironmentSelector::new())));
}

#[test]
fn test_environment_selector_requires_environment() {
    let mut sc = ServiceCollection::new();
    let result = sc.scan_types(&[cache_metadata(EnvironmentSelector::new())], MergeStrategy::Replace);
    assert!(result.unwrap_err().is_not_found());
}

#[test]
fn test_configuration_selector() {
    let mut sc = ServiceCollection::new();
    sc.add_configuration(MemoryConfiguration::from_pairs([("Features:Cache", "ON")]));
    assert!(scanned_with(&mut sc, cache_metadata(ConfigurationSelector::new("features:cache", "on"))));

    let mut sc = ServiceCollection::new();
    sc.add_configuration(MemoryConfiguration::from_pairs([("Features:Cache", "off")]));
    assert!(!scanned_with(&mut sc, cache_metadata(ConfigurationSelector::new("Features:Cache", "on"))));

    // A missing value never matches
    let mut sc = ServiceCollection::new();
    sc.add_configuration(MemoryConfiguration::new());
    assert!(!scanned_with(&mut sc, cache_metadata(ConfigurationSelector::new("Features:Cache", ""))));
}

#[test]
fn test_condition_selector_sees_snapshot() {
    struct FeatureFlag;

    let mut sc = ServiceCollection::new();
    sc.add_singleton(FeatureFlag);
    let condition = ConditionSelector::new(|provider| Ok(provider.get_optional::<FeatureFlag>()?.is_some()));
    assert!(scanned_with(&mut sc, cache_metadata(condition)));

    let mut sc = ServiceCollection::new();
    let condition = ConditionSelector::new(|provider| Ok(provider.get_optional::<FeatureFlag>()?.is_some()));
    assert!(!scanned_with(&mut sc, cache_metadata(condition)));
}

#[test]
fn test_method_filters_are_independent() {
    struct Sources;

    let metadata = TypeMetadata::builder::<Sources>()
        .static_type()
        .method(
            MethodInfo::new("dev_port", vec![], |_| Ok(3000u16))
                .filter(EnvironmentSelector::new().enabled(["Development"]))
                .register(RegisterFactory::singleton()),
        )
        .method(
            MethodInfo::new("prod_name", vec![], |_| Ok("prod".to_string()))
                .filter(EnvironmentSelector::new().enabled(["Production"]))
                .register(RegisterFactory::singleton()),
        )
        .build();

    let mut sc = ServiceCollection::new();
    sc.add_host_environment("Production");
    sc.scan_types(&[metadata], MergeStrategy::Replace).unwrap();
    let sp = sc.build();

    assert!(sp.get::<u16>().unwrap_err().is_not_found());
    assert_eq!(*sp.get_required::<String>(), "prod");
}

#[test]
#[serial]
fn test_environment_variables_configure_selector() {
    env::set_var("WIRETEST_Features__Cache", "on");
    let from_env = MemoryConfiguration::from_env("WIRETEST_");
    env::remove_var("WIRETEST_Features__Cache");

    assert_eq!(from_env.len(), 1);

    let mut sc = ServiceCollection::new();
    sc.add_configuration(from_env);
    assert!(scanned_with(&mut sc, cache_metadata(ConfigurationSelector::new("Features:Cache", "on"))));
}

#[test]
#[serial]
fn test_layered_configuration_prefers_first_source() {
    env::set_var("WIRETEST_Features__Cache", "off");
    let layered = LayeredConfiguration::new()
        .add_source(MemoryConfiguration::from_env("WIRETEST_"))
        .add_source(MemoryConfiguration::from_pairs([("Features:Cache", "on"), ("Features:Audit", "on")]));
    env::remove_var("WIRETEST_Features__Cache");

    let mut sc = ServiceCollection::new();
    sc.add_configuration(layered);
    assert!(!scanned_with(&mut sc, cache_metadata(ConfigurationSelector::new("Features:Cache", "on"))));
    assert!(scanned_with(&mut sc, cache_metadata(ConfigurationSelector::new("Features:Audit", "ON"))));
}

#[cfg(unix)]
#[test]
#[serial]
fn test_environment_configuration_skips_non_unicode_variables() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    env::set_var("WIRETEST_Features__Cache", "on");
    env::set_var("WIRETEST_Binary", OsStr::from_bytes(&[0xff, 0xfe]));
    env::set_var(OsStr::from_bytes(&[b'W', 0xff]), "on");
    let from_env = MemoryConfiguration::from_env("WIRETEST_");
    env::remove_var("WIRETEST_Features__Cache");
    env::remove_var("WIRETEST_Binary");
    env::remove_var(OsStr::from_bytes(&[b'W', 0xff]));

    assert_eq!(from_env.len(), 1);
    assert_eq!(from_env.get("features:cache").as_deref(), Some("on"));
}
