use ferrous_wire::config::{format_time_span, parse_time_span};
use ferrous_wire::{
    config_enum, ConfigBindable, ConstructorInfo, DefaultActivator, DiError, MemoryConfiguration, Parameter,
    Resolution, ServiceActivator, ServiceCollection, TypeMetadata, TypeRef,
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use proptest::prelude::*;
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Fast,
    Safe,
}

config_enum!(Mode { Fast, Safe });

fn resolve<T: ConfigBindable + Clone>(config: MemoryConfiguration, key: &str) -> Result<T, DiError> {
    let mut sc = ServiceCollection::new();
    sc.add_configuration(config);
    let sp = sc.build();

    let value = Resolution::configuration(key)
        .resolve(&sp.context(), &TypeRef::bindable::<T>())?
        .expect("configuration resolution always yields a value");
    Ok((*value.downcast::<T>().expect("bound value has the target type")).clone())
}

#[test]
fn test_timeout_binds_to_thirty_seconds() {
    let config = MemoryConfiguration::from_pairs([("timeout", "00:00:30")]);
    assert_eq!(resolve::<Duration>(config, "timeout").unwrap(), Duration::from_secs(30));
}

#[test]
fn test_keys_are_case_insensitive() {
    let config = MemoryConfiguration::from_pairs([("Http:Timeout", "00:01:00")]);
    assert_eq!(resolve::<Duration>(config, "http:TIMEOUT").unwrap(), Duration::from_secs(60));
}

#[test]
fn test_string_kept_verbatim() {
    let config = MemoryConfiguration::from_pairs([("Name", "  padded  ")]);
    assert_eq!(resolve::<String>(config, "Name").unwrap(), "  padded  ");
}

#[test]
fn test_missing_value_for_required_target() {
    let err = resolve::<u32>(MemoryConfiguration::new(), "Missing:Key").unwrap_err();
    match err {
        DiError::MissingConfiguration { key, target } => {
            assert_eq!(key, "Missing:Key");
            assert_eq!(target, "u32");
        }
        other => panic!("Expected MissingConfiguration, got {other:?}"),
    }
}

#[test]
fn test_missing_value_for_nullable_target() {
    assert_eq!(resolve::<Option<u32>>(MemoryConfiguration::new(), "Missing").unwrap(), None);

    let config = MemoryConfiguration::from_pairs([("Present", "5")]);
    assert_eq!(resolve::<Option<u32>>(config, "Present").unwrap(), Some(5));
}

#[test]
fn test_malformed_value_names_raw_text_and_target() {
    let config = MemoryConfiguration::from_pairs([("Port", "eighty")]);
    let err = resolve::<u16>(config, "Port").unwrap_err();
    assert_eq!(err.to_string(), "Cannot convert 'eighty' to u16.");
}

#[test]
fn test_structured_types() {
    let config = MemoryConfiguration::from_pairs([
        ("Endpoint", "https://example.com/api"),
        ("Id", "67e55044-10b1-426f-9247-bb680e5fe0c8"),
        ("Address", "10.0.0.1"),
        ("Mode", "Safe"),
        ("Day", "2024-02-29"),
        ("At", "13:45:00"),
        ("Stamp", "2024-02-29T13:45:00"),
        ("Instant", "2024-02-29T13:45:00+02:00"),
    ]);

    assert_eq!(
        resolve::<Url>(config.clone(), "Endpoint").unwrap().as_str(),
        "https://example.com/api"
    );
    assert_eq!(
        resolve::<Uuid>(config.clone(), "Id").unwrap().to_string(),
        "67e55044-10b1-426f-9247-bb680e5fe0c8"
    );
    assert_eq!(resolve::<IpAddr>(config.clone(), "Address").unwrap().to_string(), "10.0.0.1");
    assert_eq!(resolve::<Mode>(config.clone(), "Mode").unwrap(), Mode::Safe);
    assert_eq!(
        resolve::<NaiveDate>(config.clone(), "Day").unwrap(),
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    );
    assert_eq!(
        resolve::<NaiveTime>(config.clone(), "At").unwrap(),
        NaiveTime::from_hms_opt(13, 45, 0).unwrap()
    );
    assert_eq!(
        resolve::<NaiveDateTime>(config.clone(), "Stamp").unwrap(),
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap().and_hms_opt(13, 45, 0).unwrap()
    );

    let instant = resolve::<DateTime<FixedOffset>>(config.clone(), "Instant").unwrap();
    assert_eq!(instant.offset().local_minus_utc(), 7_200);
    let utc = resolve::<DateTime<Utc>>(config, "Instant").unwrap();
    assert_eq!(utc.to_rfc3339(), "2024-02-29T11:45:00+00:00");
}

#[test]
fn test_unknown_enum_variant_rejected() {
    let config = MemoryConfiguration::from_pairs([("Mode", "Reckless")]);
    assert!(matches!(resolve::<Mode>(config, "Mode"), Err(DiError::Conversion { .. })));
}

#[test]
fn test_sequences_follow_numeric_order() {
    let config = MemoryConfiguration::from_pairs([
        ("Ports:10", "8010"),
        ("Ports:2", "8002"),
        ("Ports:0", "8000"),
        ("Ports:1", "8001"),
    ]);

    let ports = resolve::<Vec<u16>>(config.clone(), "Ports").unwrap();
    assert_eq!(ports, [8000, 8001, 8002, 8010]);

    let shared = resolve::<Arc<[u16]>>(config.clone(), "Ports").unwrap();
    assert_eq!(&shared[..], &[8000, 8001, 8002, 8010]);

    let queue = resolve::<VecDeque<u16>>(config, "Ports").unwrap();
    assert_eq!(queue.front(), Some(&8000));
}

#[test]
fn test_sequence_element_failure_aborts() {
    let config = MemoryConfiguration::from_pairs([("Ports:0", "8000"), ("Ports:1", "oops")]);
    assert!(matches!(
        resolve::<Vec<u16>>(config, "Ports"),
        Err(DiError::Conversion { .. })
    ));
}

#[test]
fn test_json_configuration_feeds_constructor() {
    #[derive(Debug)]
    struct HttpOptions {
        timeout: Duration,
        hosts: Vec<String>,
        retries: Option<u8>,
    }

    let config = MemoryConfiguration::from_json_str(
        r#"{ "Http": { "Timeout": "00:00:05", "Hosts": ["a.example", "b.example"] } }"#,
    )
    .unwrap();

    let metadata = TypeMetadata::builder::<HttpOptions>()
        .constructor(ConstructorInfo::new(
            vec![
                Parameter::setting::<Duration>("timeout", "Http:Timeout"),
                Parameter::setting::<Vec<String>>("hosts", "Http:Hosts"),
                Parameter::setting::<Option<u8>>("retries", "Http:Retries"),
            ],
            |args| {
                Ok(HttpOptions {
                    timeout: args.value()?,
                    hosts: args.value()?,
                    retries: args.value()?,
                })
            },
        ))
        .build();

    let mut sc = ServiceCollection::new();
    sc.add_configuration(config);
    let sp = sc.build();

    let factory = DefaultActivator.instance_factory(&metadata).unwrap();
    let options = factory.create(&sp.context()).unwrap().downcast::<HttpOptions>().unwrap();
    assert_eq!(options.timeout, Duration::from_secs(5));
    assert_eq!(options.hosts, ["a.example", "b.example"]);
    assert_eq!(options.retries, None);
}

#[test]
fn test_missing_configuration_source_is_unresolvable() {
    struct Needs;

    let metadata = TypeMetadata::builder::<Needs>()
        .constructor(ConstructorInfo::new(vec![Parameter::setting::<u32>("size", "Size")], |_| Ok(Needs)))
        .build();

    let sp = ServiceCollection::new().build();
    let factory = DefaultActivator.instance_factory(&metadata).unwrap();
    match factory.create(&sp.context()) {
        Err(DiError::Unresolvable { member, source, .. }) => {
            assert_eq!(member, "size");
            assert!(source.is_not_found());
        }
        other => panic!("Expected Unresolvable, got {:?}", other.map(|_| ())),
    }
}

fn time_span() -> impl Strategy<Value = Duration> {
    (0u64..10_000 * 86_400, 0u32..10_000_000).prop_map(|(secs, ticks)| Duration::new(secs, ticks * 100))
}

proptest! {
    #[test]
    fn prop_list_binding_preserves_order(values in prop::collection::vec(any::<i64>(), 0..24)) {
        let config = MemoryConfiguration::from_pairs(
            values.iter().enumerate().map(|(i, v)| (format!("Items:{}", i), v.to_string())),
        );

        let bound = resolve::<Vec<i64>>(config, "Items").unwrap();
        prop_assert_eq!(bound, values);
    }

    #[test]
    fn prop_time_span_round_trips(duration in time_span()) {
        let text = format_time_span(duration);
        prop_assert_eq!(parse_time_span(&text), Some(duration));
    }

    #[test]
    fn prop_uuid_round_trips(bytes in any::<[u8; 16]>()) {
        let id = Uuid::from_bytes(bytes);
        let config = MemoryConfiguration::from_pairs([("Id", id.to_string())]);
        prop_assert_eq!(resolve::<Uuid>(config, "Id").unwrap(), id);
    }

    #[test]
    fn prop_ip_address_round_trips(octets in any::<[u8; 4]>(), segments in any::<[u16; 8]>()) {
        let v4 = IpAddr::from(octets);
        let v6 = IpAddr::from(segments);
        let config = MemoryConfiguration::from_pairs([("V4", v4.to_string()), ("V6", v6.to_string())]);
        prop_assert_eq!(resolve::<IpAddr>(config.clone(), "V4").unwrap(), v4);
        prop_assert_eq!(resolve::<IpAddr>(config, "V6").unwrap(), v6);
    }

    #[test]
    fn prop_date_time_round_trips(secs in 0i64..4_000_000_000, offset_minutes in -720i32..=720) {
        let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap();
        let instant = DateTime::from_timestamp(secs, 0).unwrap().with_timezone(&offset);
        let config = MemoryConfiguration::from_pairs([("At", instant.to_rfc3339())]);
        prop_assert_eq!(resolve::<DateTime<FixedOffset>>(config, "At").unwrap(), instant);
    }
}
