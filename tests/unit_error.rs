/// Unit tests for DiError messages and sources

use ferrous_wire::{key_of_trait, key_of_type, DiError, DiResult, Key};
use std::error::Error;

#[test]
fn test_error_display_not_found() {
    let error = DiError::NotFound("TestService");
    assert_eq!(error.to_string(), "No service for type TestService has been registered.");
    assert!(error.is_not_found());
}

#[test]
fn test_error_display_circular() {
    let error = DiError::Circular(vec!["ServiceA", "ServiceB", "ServiceA"]);
    assert_eq!(error.to_string(), "Circular dependency: ServiceA -> ServiceB -> ServiceA");
    assert!(!error.is_not_found());
}

#[test]
fn test_configuration_error_messages() {
    assert_eq!(
        DiError::GenericType("Repo").to_string(),
        "The service type Repo must not be generic."
    );
    assert_eq!(
        DiError::NoUniqueConstructor("Widget").to_string(),
        "The type Widget must have exactly one public constructor."
    );
    assert_eq!(
        DiError::AmbiguousConstructor("Widget").to_string(),
        "The type Widget has more than one constructor decorated as the service constructor."
    );
    assert_eq!(
        DiError::NonStaticFactory("Parts::make".to_string()).to_string(),
        "The factory method Parts::make must be static."
    );
    assert_eq!(
        DiError::GenericFactory("Parts::make".to_string()).to_string(),
        "The factory method Parts::make must not have any generic parameter."
    );
    assert_eq!(
        DiError::NotAssignable { implementation: "Widget", service: "dyn Part" }.to_string(),
        "The concrete type Widget cannot be used to register service type dyn Part."
    );
    assert_eq!(
        DiError::FactoryNotAssignable {
            method: "Parts::make".to_string(),
            return_type: "Gear",
            service: "dyn Part",
        }
        .to_string(),
        "The method Parts::make with return type Gear cannot be used to register service type dyn Part."
    );
    assert_eq!(
        DiError::AlreadyRegistered("dyn Comparable").to_string(),
        "The service of type dyn Comparable has already been added."
    );
}

#[test]
fn test_resolution_error_messages() {
    assert_eq!(
        DiError::Conversion { target: "u16", value: "eighty".to_string() }.to_string(),
        "Cannot convert 'eighty' to u16."
    );
    assert_eq!(
        DiError::MissingConfiguration { key: "Http:Port".to_string(), target: "u16" }.to_string(),
        "The configuration key 'Http:Port' has no value to bind to u16."
    );
}

#[test]
fn test_unresolvable_exposes_source() {
    let error = DiError::Unresolvable {
        owner: "Widget",
        member: "gear",
        source: Box::new(DiError::NotFound("Gear")),
    };

    assert_eq!(
        error.to_string(),
        "Unable to resolve gear of Widget: No service for type Gear has been registered."
    );
    let source = error.source().expect("source is kept");
    assert_eq!(source.to_string(), "No service for type Gear has been registered.");
}

#[test]
fn test_error_clone_and_result_alias() {
    fn failing() -> DiResult<u8> {
        Err(DiError::NullService("u8"))
    }

    let error = failing().unwrap_err();
    assert_eq!(error.clone().to_string(), error.to_string());
}

#[test]
fn test_keys_compare_by_identity() {
    trait Marker {}

    assert_eq!(key_of_type::<u8>(), key_of_type::<u8>());
    assert_ne!(key_of_type::<u8>(), key_of_type::<u16>());
    assert_eq!(key_of_trait::<dyn Marker>(), Key::Trait(std::any::type_name::<dyn Marker>()));
    assert_eq!(key_of_type::<u8>().to_string(), "u8");
    assert!(key_of_trait::<dyn Marker>().type_id().is_none());
}
