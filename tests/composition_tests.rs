use metaobj::{
    ClassConfig, ClassKind, ConfigError, InterfaceConfig, LookupError, MetaError, MixinConfig,
    ObjectOps, PropertyDecl, ROOT_CLASS, Runtime, Value, member_fn, static_fn,
};

#[test]
fn subclass_inherits_members_and_properties() {
    let mut runtime = Runtime::new();

    runtime
        .define_class(
            ClassConfig::new("demo.Shape")
                .extend(ROOT_CLASS)
                .property(PropertyDecl::new("sides").with_init(0i64))
                .member(
                    "describe",
                    member_fn(|ctx, _args| {
                        let sides = ctx.get("sides")?;
                        Ok(Value::str(format!("shape with {sides} sides")))
                    }),
                ),
        )
        .unwrap();
    runtime
        .define_class(
            ClassConfig::new("demo.Triangle")
                .extend("demo.Shape")
                .property(PropertyDecl::new("sides").with_init(3i64).refine()),
        )
        .unwrap();

    let triangle = runtime.new_object("demo.Triangle", &[]).unwrap();

    assert!(runtime.is_instance_of(triangle, "demo.Shape"));
    assert!(runtime.is_instance_of(triangle, ROOT_CLASS));
    assert_eq!(runtime.get(triangle, "sides").unwrap(), Value::Int(3));
    assert_eq!(
        runtime.call(triangle, "describe", &[]).unwrap(),
        Value::str("shape with 3 sides")
    );
}

#[test]
fn member_override_reaches_base_implementation() {
    let mut runtime = Runtime::new();

    runtime
        .define_class(
            ClassConfig::new("demo.Animal").extend(ROOT_CLASS).member(
                "speak",
                member_fn(|_ctx, _args| Ok(Value::str("..."))),
            ),
        )
        .unwrap();
    runtime
        .define_class(
            ClassConfig::new("demo.Dog").extend("demo.Animal").member(
                "speak",
                member_fn(|ctx, args| {
                    let quiet = ctx.call_base(args)?;
                    Ok(Value::str(format!("woof {quiet}")))
                }),
            ),
        )
        .unwrap();

    let dog = runtime.new_object("demo.Dog", &[]).unwrap();
    assert_eq!(
        runtime.call(dog, "speak", &[]).unwrap(),
        Value::str("woof ...")
    );
}

#[test]
fn mixin_members_merge_into_including_class() {
    let mut runtime = Runtime::new();

    runtime
        .define_mixin(MixinConfig::new("demo.Loud").member(
            "shout",
            member_fn(|_ctx, args| {
                let word = args.first().and_then(|v| v.as_str()).unwrap_or_default();
                Ok(Value::str(word.to_uppercase()))
            }),
        ))
        .unwrap();
    runtime
        .define_class(
            ClassConfig::new("demo.Speaker")
                .extend(ROOT_CLASS)
                .include("demo.Loud"),
        )
        .unwrap();

    let speaker = runtime.new_object("demo.Speaker", &[]).unwrap();
    assert_eq!(
        runtime.call(speaker, "shout", &[Value::str("hi")]).unwrap(),
        Value::str("HI")
    );
}

#[test]
fn two_mixins_with_the_same_member_conflict() {
    let mut runtime = Runtime::new();

    runtime
        .define_mixin(
            MixinConfig::new("demo.A").member("act", member_fn(|_ctx, _args| Ok(Value::Null))),
        )
        .unwrap();
    runtime
        .define_mixin(
            MixinConfig::new("demo.B").member("act", member_fn(|_ctx, _args| Ok(Value::Null))),
        )
        .unwrap();

    let err = runtime
        .define_class(
            ClassConfig::new("demo.Both")
                .extend(ROOT_CLASS)
                .include("demo.A")
                .include("demo.B"),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        MetaError::Config(ConfigError::MixinConflict { .. })
    ));
}

#[test]
fn patch_overrides_and_keeps_prior_as_base() {
    let mut runtime = Runtime::new();

    runtime
        .define_class(
            ClassConfig::new("demo.Greeter").extend(ROOT_CLASS).member(
                "greet",
                member_fn(|_ctx, _args| Ok(Value::str("hello"))),
            ),
        )
        .unwrap();
    runtime
        .define_mixin(MixinConfig::new("demo.Excited").member(
            "greet",
            member_fn(|ctx, args| {
                let plain = ctx.call_base(args)?;
                Ok(Value::str(format!("{plain}!")))
            }),
        ))
        .unwrap();

    // A plain include refuses to clobber an existing member.
    let err = runtime.include_into("demo.Greeter", "demo.Excited").unwrap_err();
    assert!(matches!(
        err,
        MetaError::Config(ConfigError::MixinConflict { .. })
    ));

    runtime.patch("demo.Greeter", "demo.Excited").unwrap();
    let greeter = runtime.new_object("demo.Greeter", &[]).unwrap();
    assert_eq!(
        runtime.call(greeter, "greet", &[]).unwrap(),
        Value::str("hello!")
    );
}

#[test]
fn interface_satisfaction_checked_at_definition() {
    let mut runtime = Runtime::new();

    runtime
        .define_interface(InterfaceConfig::new("demo.ICanSpeak").member("speak"))
        .unwrap();

    let err = runtime
        .define_class(
            ClassConfig::new("demo.Mute")
                .extend(ROOT_CLASS)
                .implement("demo.ICanSpeak"),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        MetaError::Config(ConfigError::UnsatisfiedInterface { .. })
    ));

    runtime
        .define_class(
            ClassConfig::new("demo.Parrot")
                .extend(ROOT_CLASS)
                .implement("demo.ICanSpeak")
                .member("speak", member_fn(|_ctx, _args| Ok(Value::str("hello")))),
        )
        .unwrap();
}

#[test]
fn interface_property_requirement_met_by_accessors() {
    let mut runtime = Runtime::new();

    runtime
        .define_interface(InterfaceConfig::new("demo.IColored").property("color"))
        .unwrap();
    runtime
        .define_class(
            ClassConfig::new("demo.Swatch")
                .extend(ROOT_CLASS)
                .implement("demo.IColored")
                .property(PropertyDecl::new("color").with_init("red")),
        )
        .unwrap();

    let swatch = runtime.new_object("demo.Swatch", &[]).unwrap();
    // Accessors are reachable through the generic member surface too.
    assert_eq!(
        runtime.call(swatch, "get_color", &[]).unwrap(),
        Value::str("red")
    );
}

#[test]
fn static_class_exposes_statics_but_never_instantiates() {
    let mut runtime = Runtime::new();

    runtime
        .define_class(
            ClassConfig::new("demo.MathUtil")
                .kind(ClassKind::Static)
                .static_value("zero", 0i64)
                .static_member(
                    "double",
                    metaobj::StaticMember::Fn(static_fn(|_ops, args| {
                        let n = args.first().and_then(|v| v.as_int()).unwrap_or(0);
                        Ok(Value::Int(n * 2))
                    })),
                ),
        )
        .unwrap();

    assert_eq!(
        runtime.call_static("demo.MathUtil", "zero", &[]).unwrap(),
        Value::Int(0)
    );
    assert_eq!(
        runtime
            .call_static("demo.MathUtil", "double", &[Value::Int(21)])
            .unwrap(),
        Value::Int(42)
    );
    assert!(runtime.new_object("demo.MathUtil", &[]).is_err());
}

#[test]
fn namespace_component_cannot_shadow_a_definition() {
    let mut runtime = Runtime::new();

    runtime
        .define_class(ClassConfig::new("demo.Thing").extend(ROOT_CLASS))
        .unwrap();
    let err = runtime
        .define_class(ClassConfig::new("demo.Thing.Part").extend(ROOT_CLASS))
        .unwrap_err();
    assert!(matches!(
        err,
        MetaError::Config(ConfigError::NamespaceCollision { .. })
    ));
}

#[test]
fn unknown_lookups_report_structured_errors() {
    let mut runtime = Runtime::new();

    let err = runtime.new_object("demo.Ghost", &[]).unwrap_err();
    assert!(matches!(
        err,
        MetaError::Lookup(LookupError::NoSuchClass(_))
    ));

    runtime
        .define_class(ClassConfig::new("demo.Empty").extend(ROOT_CLASS))
        .unwrap();
    let obj = runtime.new_object("demo.Empty", &[]).unwrap();
    let err = runtime.call(obj, "missing", &[]).unwrap_err();
    assert!(matches!(
        err,
        MetaError::Lookup(LookupError::NoSuchMember { .. })
    ));
}
