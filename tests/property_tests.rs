use std::cell::RefCell;
use std::rc::Rc;

use metaobj::{
    CheckKind, ClassConfig, ContractError, Environment, LookupError, MetaError, ObjectOps,
    PropertyDecl, PropertyGroup, ROOT_CLASS, Runtime, Value, listener_fn, member_fn,
};

fn widget_runtime() -> Runtime {
    let mut runtime = Runtime::new();
    runtime
        .define_class(
            ClassConfig::new("ui.Widget")
                .extend(ROOT_CLASS)
                .property(PropertyDecl::new("color").with_init("black").themeable())
                .property(
                    PropertyDecl::new("width")
                        .with_check(CheckKind::Int)
                        .with_init(100i64),
                )
                .property(
                    PropertyDecl::new("visible")
                        .with_check(CheckKind::Bool)
                        .with_init(true),
                ),
        )
        .unwrap();
    runtime
}

#[test]
fn init_values_resolve_before_any_set() {
    let mut runtime = widget_runtime();
    let widget = runtime.new_object("ui.Widget", &[]).unwrap();

    assert_eq!(runtime.get(widget, "color").unwrap(), Value::str("black"));
    assert_eq!(runtime.get(widget, "width").unwrap(), Value::Int(100));
}

#[test]
fn set_and_reset_round_trip_through_the_user_layer() {
    let mut runtime = widget_runtime();
    let widget = runtime.new_object("ui.Widget", &[]).unwrap();

    runtime.set(widget, "color", Value::str("red")).unwrap();
    assert_eq!(runtime.get(widget, "color").unwrap(), Value::str("red"));

    runtime.reset(widget, "color").unwrap();
    assert_eq!(runtime.get(widget, "color").unwrap(), Value::str("black"));
}

#[test]
fn layer_precedence_is_independent_of_setting_order() {
    let mut runtime = widget_runtime();
    let widget = runtime.new_object("ui.Widget", &[]).unwrap();

    // Themed set first, then user: user still wins.
    runtime.set_themed(widget, "color", Value::str("navy")).unwrap();
    runtime.set(widget, "color", Value::str("red")).unwrap();
    assert_eq!(runtime.get(widget, "color").unwrap(), Value::str("red"));

    // Runtime layer tops both, whenever it arrives.
    runtime
        .set_runtime_value(widget, "color", Value::str("lime"))
        .unwrap();
    assert_eq!(runtime.get(widget, "color").unwrap(), Value::str("lime"));

    // Peeling layers falls back one level at a time.
    runtime.reset_runtime_value(widget, "color").unwrap();
    assert_eq!(runtime.get(widget, "color").unwrap(), Value::str("red"));
    runtime.reset(widget, "color").unwrap();
    assert_eq!(runtime.get(widget, "color").unwrap(), Value::str("navy"));
    runtime.reset_themed(widget, "color").unwrap();
    assert_eq!(runtime.get(widget, "color").unwrap(), Value::str("black"));
}

#[test]
fn change_event_fires_exactly_once_per_real_change() {
    let mut runtime = Runtime::new();
    runtime
        .define_class(
            ClassConfig::new("ui.Label")
                .extend(ROOT_CLASS)
                .property(
                    PropertyDecl::new("text")
                        .with_init("")
                        .with_event("changeText"),
                )
                .event("changeText", "Data"),
        )
        .unwrap();
    let label = runtime.new_object("ui.Label", &[]).unwrap();

    let seen: Rc<RefCell<Vec<(Value, Value)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    runtime
        .add_listener(
            label,
            "changeText",
            listener_fn(move |_ctx, event| {
                sink.borrow_mut().push((
                    event.data.clone().unwrap_or(Value::Null),
                    event.old_data.clone().unwrap_or(Value::Null),
                ));
                Ok(())
            }),
            None,
            false,
        )
        .unwrap();

    runtime.set(label, "text", Value::str("hello")).unwrap();
    // Same resolved value: no observer runs.
    runtime.set(label, "text", Value::str("hello")).unwrap();
    runtime.set(label, "text", Value::str("bye")).unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], (Value::str("hello"), Value::str("")));
    assert_eq!(seen[1], (Value::str("bye"), Value::str("hello")));
}

#[test]
fn apply_member_runs_with_new_old_and_name() {
    let mut runtime = Runtime::new();
    let log: Rc<RefCell<Vec<Vec<Value>>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    runtime
        .define_class(
            ClassConfig::new("ui.Slider")
                .extend(ROOT_CLASS)
                .property(
                    PropertyDecl::new("value")
                        .with_init(0i64)
                        .with_apply("apply_value"),
                )
                .member(
                    "apply_value",
                    member_fn(move |_ctx, args| {
                        sink.borrow_mut().push(args.to_vec());
                        Ok(Value::Null)
                    }),
                ),
        )
        .unwrap();
    let slider = runtime.new_object("ui.Slider", &[]).unwrap();

    runtime.set(slider, "value", Value::Int(5)).unwrap();

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(
        log[0],
        vec![Value::Int(5), Value::Int(0), Value::str("value")]
    );
}

#[test]
fn transform_and_validate_gate_incoming_values() {
    let mut runtime = Runtime::new();
    runtime
        .define_class(
            ClassConfig::new("ui.Field")
                .extend(ROOT_CLASS)
                .property(
                    PropertyDecl::new("name")
                        .with_init("")
                        .with_transform("trim_name")
                        .with_validate("name_not_empty"),
                )
                .member(
                    "trim_name",
                    member_fn(|_ctx, args| {
                        let raw = args.first().and_then(|v| v.as_str()).unwrap_or_default();
                        Ok(Value::str(raw.trim()))
                    }),
                )
                .member(
                    "name_not_empty",
                    member_fn(|_ctx, args| {
                        let trimmed = args.first().and_then(|v| v.as_str()).unwrap_or_default();
                        Ok(Value::Bool(!trimmed.is_empty()))
                    }),
                ),
        )
        .unwrap();
    let field = runtime.new_object("ui.Field", &[]).unwrap();

    runtime.set(field, "name", Value::str("  ada  ")).unwrap();
    assert_eq!(runtime.get(field, "name").unwrap(), Value::str("ada"));

    let err = runtime.set(field, "name", Value::str("   ")).unwrap_err();
    assert!(matches!(
        err,
        MetaError::Contract(ContractError::ValidateFailed { .. })
    ));
    assert_eq!(runtime.get(field, "name").unwrap(), Value::str("ada"));
}

#[test]
fn type_checks_reject_in_debug_and_relax_in_production() {
    let mut runtime = widget_runtime();
    let widget = runtime.new_object("ui.Widget", &[]).unwrap();

    let err = runtime.set(widget, "width", Value::str("wide")).unwrap_err();
    assert!(matches!(
        err,
        MetaError::Contract(ContractError::CheckFailed { .. })
    ));

    let mut relaxed = Runtime::with_env(Environment::production());
    relaxed
        .define_class(
            ClassConfig::new("ui.Widget").extend(ROOT_CLASS).property(
                PropertyDecl::new("width")
                    .with_check(CheckKind::Int)
                    .with_init(100i64),
            ),
        )
        .unwrap();
    let widget = relaxed.new_object("ui.Widget", &[]).unwrap();
    relaxed.set(widget, "width", Value::str("wide")).unwrap();
    assert_eq!(relaxed.get(widget, "width").unwrap(), Value::str("wide"));
}

#[test]
fn nullability_is_enforced_in_every_environment() {
    let mut runtime = Runtime::with_env(Environment::production());
    runtime
        .define_class(
            ClassConfig::new("ui.Box")
                .extend(ROOT_CLASS)
                .property(PropertyDecl::new("label").with_init("box"))
                .property(PropertyDecl::new("hint").nullable()),
        )
        .unwrap();
    let boxed = runtime.new_object("ui.Box", &[]).unwrap();

    let err = runtime.set(boxed, "label", Value::Null).unwrap_err();
    assert!(matches!(
        err,
        MetaError::Contract(ContractError::NotNullable { .. })
    ));

    runtime.set(boxed, "hint", Value::Null).unwrap();
    assert_eq!(runtime.get(boxed, "hint").unwrap(), Value::Null);
}

#[test]
fn uninitialized_property_reports_not_ready() {
    let mut runtime = Runtime::new();
    runtime
        .define_class(
            ClassConfig::new("ui.Late")
                .extend(ROOT_CLASS)
                .property(PropertyDecl::new("target")),
        )
        .unwrap();
    let late = runtime.new_object("ui.Late", &[]).unwrap();

    let err = runtime.get(late, "target").unwrap_err();
    assert!(matches!(
        err,
        MetaError::Contract(ContractError::PropertyNotReady { .. })
    ));

    runtime.set(late, "target", Value::Int(7)).unwrap();
    assert_eq!(runtime.get(late, "target").unwrap(), Value::Int(7));
}

#[test]
fn init_override_is_rejected_after_construction() {
    let mut runtime = widget_runtime();
    let widget = runtime.new_object("ui.Widget", &[]).unwrap();

    let err = runtime
        .init_value(widget, "color", Value::str("teal"))
        .unwrap_err();
    assert!(matches!(
        err,
        MetaError::Contract(ContractError::InitAfterConstruct { .. })
    ));
}

#[test]
fn inheritable_values_cascade_through_layout_parents() {
    let mut runtime = Runtime::new();
    runtime
        .define_class(
            ClassConfig::new("ui.Pane")
                .extend(ROOT_CLASS)
                .property(PropertyDecl::new("opacity").with_init(1i64).inheritable()),
        )
        .unwrap();
    let parent = runtime.new_object("ui.Pane", &[]).unwrap();
    let child = runtime.new_object("ui.Pane", &[]).unwrap();

    runtime.set(parent, "opacity", Value::Int(5)).unwrap();
    runtime.set_layout_parent(child, Some(parent)).unwrap();
    assert_eq!(runtime.get(child, "opacity").unwrap(), Value::Int(5));

    // Later parent changes keep cascading.
    runtime.set(parent, "opacity", Value::Int(7)).unwrap();
    assert_eq!(runtime.get(child, "opacity").unwrap(), Value::Int(7));

    // A local override detaches the child from the cascade.
    runtime.set(child, "opacity", Value::Int(2)).unwrap();
    runtime.set(parent, "opacity", Value::Int(9)).unwrap();
    assert_eq!(runtime.get(child, "opacity").unwrap(), Value::Int(2));

    // Dropping the local value rejoins the chain immediately, even
    // though the class declares an init default.
    runtime.reset(child, "opacity").unwrap();
    assert_eq!(runtime.get(child, "opacity").unwrap(), Value::Int(9));
    runtime.set(parent, "opacity", Value::Int(4)).unwrap();
    assert_eq!(runtime.get(child, "opacity").unwrap(), Value::Int(4));
}

#[test]
fn clearing_every_local_layer_restores_the_inherited_value() {
    let mut runtime = Runtime::new();
    runtime
        .define_class(
            ClassConfig::new("ui.Pane")
                .extend(ROOT_CLASS)
                .property(PropertyDecl::new("opacity").with_init(1i64).inheritable()),
        )
        .unwrap();
    let parent = runtime.new_object("ui.Pane", &[]).unwrap();
    let child = runtime.new_object("ui.Pane", &[]).unwrap();
    runtime.set_layout_parent(child, Some(parent)).unwrap();
    runtime.set(parent, "opacity", Value::Int(9)).unwrap();

    runtime.set(child, "opacity", Value::Int(2)).unwrap();
    runtime
        .set_runtime_value(child, "opacity", Value::Int(3))
        .unwrap();

    // Peeling one local layer exposes the next, not the parent.
    runtime.reset_runtime_value(child, "opacity").unwrap();
    assert_eq!(runtime.get(child, "opacity").unwrap(), Value::Int(2));

    // Peeling the last one rejoins the parent chain, not the init.
    runtime.reset(child, "opacity").unwrap();
    assert_eq!(runtime.get(child, "opacity").unwrap(), Value::Int(9));
}

#[test]
fn detaching_the_parent_clears_inherited_values() {
    let mut runtime = Runtime::new();
    runtime
        .define_class(
            ClassConfig::new("ui.Pane")
                .extend(ROOT_CLASS)
                .property(PropertyDecl::new("opacity").inheritable()),
        )
        .unwrap();
    let parent = runtime.new_object("ui.Pane", &[]).unwrap();
    let child = runtime.new_object("ui.Pane", &[]).unwrap();

    runtime.set(parent, "opacity", Value::Int(5)).unwrap();
    runtime.set_layout_parent(child, Some(parent)).unwrap();
    assert_eq!(runtime.get(child, "opacity").unwrap(), Value::Int(5));

    runtime.set_layout_parent(child, None).unwrap();
    // Undefined inheritable reads as null rather than erroring.
    assert_eq!(runtime.get(child, "opacity").unwrap(), Value::Null);
}

#[test]
fn boolean_accessors_toggle_and_test() {
    let mut runtime = widget_runtime();
    let widget = runtime.new_object("ui.Widget", &[]).unwrap();

    assert!(runtime.is_value(widget, "visible").unwrap());
    assert!(!runtime.toggle(widget, "visible").unwrap());
    assert!(!runtime.is_value(widget, "visible").unwrap());
    assert!(runtime.toggle(widget, "visible").unwrap());
}

#[test]
fn boolean_accessors_reject_non_boolean_properties() {
    let mut runtime = widget_runtime();
    let widget = runtime.new_object("ui.Widget", &[]).unwrap();

    let err = runtime.is_value(widget, "color").unwrap_err();
    assert!(matches!(
        err,
        MetaError::Lookup(LookupError::NoSuchAccessor { .. })
    ));
    let err = runtime.toggle(widget, "color").unwrap_err();
    assert!(matches!(
        err,
        MetaError::Lookup(LookupError::NoSuchAccessor { .. })
    ));
}

#[test]
fn group_shorthand_fans_out_css_style() {
    let mut runtime = Runtime::new();
    runtime
        .define_class(
            ClassConfig::new("ui.Panel")
                .extend(ROOT_CLASS)
                .property(PropertyDecl::new("padding_top").with_init(0i64))
                .property(PropertyDecl::new("padding_right").with_init(0i64))
                .property(PropertyDecl::new("padding_bottom").with_init(0i64))
                .property(PropertyDecl::new("padding_left").with_init(0i64))
                .group(
                    PropertyGroup::new(
                        "padding",
                        vec![
                            "padding_top".to_string(),
                            "padding_right".to_string(),
                            "padding_bottom".to_string(),
                            "padding_left".to_string(),
                        ],
                    )
                    .shorthand(),
                ),
        )
        .unwrap();
    let panel = runtime.new_object("ui.Panel", &[]).unwrap();

    runtime
        .call(panel, "set_padding", &[Value::Int(4), Value::Int(8)])
        .unwrap();
    assert_eq!(runtime.get(panel, "padding_top").unwrap(), Value::Int(4));
    assert_eq!(runtime.get(panel, "padding_right").unwrap(), Value::Int(8));
    assert_eq!(runtime.get(panel, "padding_bottom").unwrap(), Value::Int(4));
    assert_eq!(runtime.get(panel, "padding_left").unwrap(), Value::Int(8));

    runtime.call(panel, "reset_padding", &[]).unwrap();
    assert_eq!(runtime.get(panel, "padding_left").unwrap(), Value::Int(0));
}

#[test]
fn generic_accessor_surface_mirrors_the_typed_one() {
    let mut runtime = widget_runtime();
    let widget = runtime.new_object("ui.Widget", &[]).unwrap();

    runtime
        .call(widget, "set_color", &[Value::str("plum")])
        .unwrap();
    assert_eq!(
        runtime.call(widget, "get_color", &[]).unwrap(),
        Value::str("plum")
    );
    runtime
        .call(widget, "set_themed_color", &[Value::str("gray")])
        .unwrap();
    runtime.call(widget, "reset_color", &[]).unwrap();
    assert_eq!(
        runtime.call(widget, "get_color", &[]).unwrap(),
        Value::str("gray")
    );
    assert_eq!(
        runtime.call(widget, "toggle_visible", &[]).unwrap(),
        Value::Bool(false)
    );
}
