use ferrous_wire::{
    ConstructorInfo, DefaultActivator, DiError, MemoryConfiguration, MethodInfo, Parameter, PropertyInfo, Resolver,
    ServiceActivator, ServiceCollection, ServiceProvider, TypeMetadata, TypeRef,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Gear {
    teeth: u32,
}

#[derive(Debug)]
struct Widget {
    gear: Arc<Gear>,
}

fn provider_with_gear() -> ServiceProvider {
    let mut sc = ServiceCollection::new();
    sc.add_singleton(Gear { teeth: 12 });
    sc.build()
}

fn widget_metadata() -> TypeMetadata {
    TypeMetadata::builder::<Widget>()
        .constructor(ConstructorInfo::new(vec![Parameter::service::<Gear>("gear")], |args| {
            Ok(Widget { gear: args.service()? })
        }))
        .build()
}

#[test]
fn test_widget_receives_registered_gear() {
    let sp = provider_with_gear();
    let factory = DefaultActivator.instance_factory(&widget_metadata()).unwrap();

    let widget = factory.create(&sp.context()).unwrap().downcast::<Widget>().unwrap();

    assert_eq!(widget.gear.teeth, 12);
    assert!(Arc::ptr_eq(&widget.gear, &sp.get_required::<Gear>()));
}

#[test]
fn test_factory_builds_independent_instances() {
    let sp = provider_with_gear();
    let factory = DefaultActivator.instance_factory(&widget_metadata()).unwrap();

    let a = factory.create(&sp.context()).unwrap().downcast::<Widget>().unwrap();
    let b = factory.create(&sp.context()).unwrap().downcast::<Widget>().unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a.gear.teeth, b.gear.teeth);
}

#[test]
fn test_missing_dependency_names_owner_and_parameter() {
    let sp = ServiceCollection::new().build();
    let factory = DefaultActivator.instance_factory(&widget_metadata()).unwrap();

    match factory.create(&sp.context()) {
        Err(DiError::Unresolvable { owner, member, source }) => {
            assert!(owner.contains("Widget"));
            assert_eq!(member, "gear");
            assert!(source.is_not_found());
        }
        other => panic!("Expected Unresolvable error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_single_constructor_selected_regardless_of_markers() {
    struct Hidden(u8);

    let metadata = TypeMetadata::builder::<Hidden>()
        .constructor(ConstructorInfo::new(vec![], |_| Ok(Hidden(3))).non_public())
        .build();

    let sp = ServiceCollection::new().build();
    let factory = DefaultActivator.instance_factory(&metadata).unwrap();
    let hidden = factory.create(&sp.context()).unwrap().downcast::<Hidden>().unwrap();
    assert_eq!(hidden.0, 3);
}

#[test]
fn test_designated_constructor_wins() {
    struct Multi(&'static str);

    let metadata = TypeMetadata::builder::<Multi>()
        .constructor(ConstructorInfo::new(vec![], |_| Ok(Multi("default"))))
        .constructor(ConstructorInfo::new(vec![], |_| Ok(Multi("designated"))).designated())
        .build();

    let sp = ServiceCollection::new().build();
    let factory = DefaultActivator.instance_factory(&metadata).unwrap();
    let multi = factory.create(&sp.context()).unwrap().downcast::<Multi>().unwrap();
    assert_eq!(multi.0, "designated");
}

#[test]
fn test_constructor_selection_errors() {
    struct Multi;

    let none_designated = TypeMetadata::builder::<Multi>()
        .constructor(ConstructorInfo::new(vec![], |_| Ok(Multi)))
        .constructor(ConstructorInfo::new(vec![], |_| Ok(Multi)))
        .build();
    let err = DefaultActivator.instance_factory(&none_designated).unwrap_err();
    assert!(matches!(err, DiError::NoUniqueConstructor(_)));
    assert!(err.to_string().contains("must have exactly one public constructor"));

    let both_designated = TypeMetadata::builder::<Multi>()
        .constructor(ConstructorInfo::new(vec![], |_| Ok(Multi)).designated())
        .constructor(ConstructorInfo::new(vec![], |_| Ok(Multi)).designated())
        .build();
    let err = DefaultActivator.instance_factory(&both_designated).unwrap_err();
    assert!(matches!(err, DiError::AmbiguousConstructor(_)));
    assert!(err.to_string().contains("more than one constructor"));

    let no_constructor = TypeMetadata::builder::<Multi>().static_type().build();
    assert!(matches!(
        DefaultActivator.instance_factory(&no_constructor),
        Err(DiError::NoUniqueConstructor(_))
    ));
}

#[test]
fn test_generic_type_rejected() {
    struct Repository<T>(Option<T>);

    let metadata = TypeMetadata::builder::<Repository<u8>>()
        .generic()
        .constructor(ConstructorInfo::new(vec![], |_| Ok(Repository::<u8>(None))))
        .build();

    let err = DefaultActivator.instance_factory(&metadata).unwrap_err();
    assert!(matches!(err, DiError::GenericType(_)));
    assert!(err.to_string().contains("must not be generic"));
}

#[test]
fn test_constructor_for_another_type_rejected() {
    struct Declared;
    struct Other;

    let metadata = TypeMetadata::builder::<Declared>()
        .constructor(ConstructorInfo::new(vec![], |_| Ok(Other)))
        .build();

    assert!(matches!(
        DefaultActivator.instance_factory(&metadata),
        Err(DiError::TypeMismatch(_))
    ));
}

#[test]
fn test_configuration_parameter_requires_binder() {
    struct Service;

    let metadata = TypeMetadata::builder::<Service>()
        .constructor(ConstructorInfo::new(
            vec![Parameter::service::<Gear>("gear").configuration("Gear")],
            |_| Ok(Service),
        ))
        .build();

    match DefaultActivator.instance_factory(&metadata) {
        Err(DiError::NotBindable { member, .. }) => assert_eq!(member, "gear"),
        other => panic!("Expected NotBindable, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_optional_parameter_absent() {
    struct Consumer {
        gear: Option<Arc<Gear>>,
    }

    let metadata = TypeMetadata::builder::<Consumer>()
        .constructor(ConstructorInfo::new(vec![Parameter::service::<Gear>("gear").optional()], |args| {
            Ok(Consumer { gear: args.optional()? })
        }))
        .build();

    let factory = DefaultActivator.instance_factory(&metadata).unwrap();

    let empty = ServiceCollection::new().build();
    let consumer = factory.create(&empty.context()).unwrap().downcast::<Consumer>().unwrap();
    assert!(consumer.gear.is_none());

    let sp = provider_with_gear();
    let consumer = factory.create(&sp.context()).unwrap().downcast::<Consumer>().unwrap();
    assert_eq!(consumer.gear.as_ref().map(|g| g.teeth), Some(12));
}

#[derive(Default)]
struct Panel {
    gear: Option<Arc<Gear>>,
    label: Option<String>,
    spare: Option<Arc<Gear>>,
}

fn panel_builder() -> ferrous_wire::TypeMetadataBuilder<Panel> {
    TypeMetadata::builder::<Panel>()
        .constructor(ConstructorInfo::new(vec![], |_| Ok(Panel::default())))
        .property(PropertyInfo::init_only::<Panel, _>("gear", TypeRef::of::<Gear>(), |panel, value| {
            panel.gear = Some(value.service()?);
            Ok(())
        }))
        .property(
            PropertyInfo::mutable::<Panel, _>("label", TypeRef::bindable::<String>(), |panel, value| {
                panel.label = Some(value.value()?);
                Ok(())
            })
            .configuration("Panel:Label"),
        )
        .property(PropertyInfo::mutable::<Panel, _>("spare", TypeRef::of::<Gear>(), |panel, value| {
            panel.spare = Some(value.service()?);
            Ok(())
        }))
        .property(PropertyInfo::read_only("teeth", TypeRef::of::<u32>()).required())
}

fn panel_provider() -> ServiceProvider {
    let mut sc = ServiceCollection::new();
    sc.add_singleton(Gear { teeth: 40 });
    sc.add_configuration(MemoryConfiguration::from_pairs([("Panel:Label", "front")]));
    sc.build()
}

#[test]
fn test_init_only_properties_injected_when_opted_in() {
    let sp = panel_provider();
    let metadata = panel_builder().inject_all_init_only().build();

    let factory = DefaultActivator.instance_factory(&metadata).unwrap();
    let panel = factory.create(&sp.context()).unwrap().downcast::<Panel>().unwrap();

    assert_eq!(panel.gear.as_ref().map(|g| g.teeth), Some(40));
    assert_eq!(panel.label.as_deref(), Some("front"));
    // Unmarked mutable properties are never injected
    assert!(panel.spare.is_none());
}

#[test]
fn test_init_only_properties_untouched_without_opt_in() {
    let sp = panel_provider();
    let metadata = panel_builder().build();

    let factory = DefaultActivator.instance_factory(&metadata).unwrap();
    let panel = factory.create(&sp.context()).unwrap().downcast::<Panel>().unwrap();

    assert!(panel.gear.is_none());
    assert_eq!(panel.label.as_deref(), Some("front"));
}

#[test]
fn test_inherited_properties_follow_own_properties() {
    #[derive(Default)]
    struct Base {
        order: Vec<&'static str>,
    }

    #[derive(Default)]
    struct Derived {
        base: Base,
        order: Vec<&'static str>,
    }

    let base = TypeMetadata::builder::<Base>()
        .inject_all_init_only()
        .property(PropertyInfo::init_only::<Base, _>("base_gear", TypeRef::of::<Gear>(), |b, _| {
            b.order.push("base_gear");
            Ok(())
        }))
        .build();

    let derived = TypeMetadata::builder::<Derived>()
        .constructor(ConstructorInfo::new(vec![], |_| Ok(Derived::default())))
        .property(
            PropertyInfo::mutable::<Derived, _>("own_gear", TypeRef::of::<Gear>(), |d, _| {
                d.order.push("own_gear");
                Ok(())
            })
            .required(),
        )
        .inherit(&base, |d| &mut d.base)
        .build();

    assert!(derived.injects_all_init_only());
    let names: Vec<_> = derived.properties().iter().map(|p| p.name()).collect();
    assert_eq!(names, ["own_gear", "base_gear"]);

    let sp = provider_with_gear();
    let factory = DefaultActivator.instance_factory(&derived).unwrap();
    let instance = factory.create(&sp.context()).unwrap().downcast::<Derived>().unwrap();
    assert_eq!(instance.order, ["own_gear"]);
    assert_eq!(instance.base.order, ["base_gear"]);
}

#[test]
fn test_factory_method_must_be_static() {
    let make = MethodInfo::new("make", vec![Parameter::service::<Gear>("gear")], |args| {
        let gear = args.service::<Gear>()?;
        Ok(format!("gear with {} teeth", gear.teeth))
    })
    .instance();

    let err = DefaultActivator.method_factory(&make).unwrap_err();
    assert!(matches!(err, DiError::NonStaticFactory(_)));
    assert!(err.to_string().contains("must be static"));
}

#[test]
fn test_generic_factory_methods_rejected() {
    struct Factories;

    let generic_method = MethodInfo::new("make", vec![], |_| Ok(1u8)).generic();
    let err = DefaultActivator.method_factory(&generic_method).unwrap_err();
    assert!(matches!(err, DiError::GenericFactory(_)));

    let on_generic_type = TypeMetadata::builder::<Factories>()
        .generic()
        .method(MethodInfo::new("make", vec![], |_| Ok(1u8)))
        .build();
    let err = DefaultActivator.method_factory(&on_generic_type.methods()[0]).unwrap_err();
    assert!(matches!(err, DiError::GenericFactory(_)));
    assert!(err.to_string().contains("must not have any generic parameter"));
}

#[test]
fn test_method_factory_resolves_arguments() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let make = MethodInfo::new("make", vec![Parameter::service::<Gear>("gear")], move |args| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{} teeth", args.service::<Gear>()?.teeth))
    });

    let sp = provider_with_gear();
    let factory = DefaultActivator.method_factory(&make).unwrap();

    let value = factory.invoke(&sp.context()).unwrap().unwrap();
    assert_eq!(*value.downcast::<String>().unwrap(), "12 teeth");
    factory.invoke(&sp.context()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_nullable_method_returns_none() {
    let make = MethodInfo::nullable("maybe", vec![], |_| Ok(None::<u32>));

    let sp = ServiceCollection::new().build();
    let factory = DefaultActivator.method_factory(&make).unwrap();
    assert!(factory.invoke(&sp.context()).unwrap().is_none());
}
