use std::cell::RefCell;
use std::rc::Rc;

use metaobj::{
    ClassConfig, ClassKind, ConfigError, ContractError, MetaError, MixinConfig, ObjectId,
    ObjectOps, PropertyDecl, ROOT_CLASS, Runtime, Value, hook_fn, member_fn,
};

#[test]
fn constructors_run_root_first_with_mixin_hooks_after_each_class() {
    let mut runtime = Runtime::new();
    let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

    let sink = order.clone();
    runtime
        .define_class(
            ClassConfig::new("life.Shape")
                .extend(ROOT_CLASS)
                .construct(hook_fn(move |_ctx, _args| {
                    sink.borrow_mut().push("shape");
                    Ok(())
                })),
        )
        .unwrap();
    let sink = order.clone();
    runtime
        .define_mixin(MixinConfig::new("life.Traced").construct(hook_fn(move |_ctx, _args| {
            sink.borrow_mut().push("traced");
            Ok(())
        })))
        .unwrap();
    let sink = order.clone();
    runtime
        .define_class(
            ClassConfig::new("life.Circle")
                .extend("life.Shape")
                .include("life.Traced")
                .construct(hook_fn(move |_ctx, _args| {
                    sink.borrow_mut().push("circle");
                    Ok(())
                })),
        )
        .unwrap();

    runtime.new_object("life.Circle", &[]).unwrap();
    assert_eq!(*order.borrow(), vec!["shape", "circle", "traced"]);
}

#[test]
fn constructor_arguments_reach_every_hook() {
    let mut runtime = Runtime::new();
    runtime
        .define_class(
            ClassConfig::new("life.Named")
                .extend(ROOT_CLASS)
                .property(PropertyDecl::new("name").nullable())
                .construct(hook_fn(|ctx, args| {
                    if let Some(name) = args.first() {
                        ctx.set("name", name.clone())?;
                    }
                    Ok(())
                })),
        )
        .unwrap();

    let named = runtime
        .new_object("life.Named", &[Value::str("ada")])
        .unwrap();
    assert_eq!(runtime.get(named, "name").unwrap(), Value::str("ada"));
}

#[test]
fn destructors_run_most_derived_first() {
    let mut runtime = Runtime::new();
    let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

    let sink = order.clone();
    runtime
        .define_class(
            ClassConfig::new("life.Shape")
                .extend(ROOT_CLASS)
                .destruct(hook_fn(move |_ctx, _args| {
                    sink.borrow_mut().push("shape");
                    Ok(())
                })),
        )
        .unwrap();
    let sink = order.clone();
    runtime
        .define_mixin(MixinConfig::new("life.Traced").destruct(hook_fn(move |_ctx, _args| {
            sink.borrow_mut().push("traced");
            Ok(())
        })))
        .unwrap();
    let sink = order.clone();
    runtime
        .define_class(
            ClassConfig::new("life.Circle")
                .extend("life.Shape")
                .include("life.Traced")
                .destruct(hook_fn(move |_ctx, _args| {
                    sink.borrow_mut().push("circle");
                    Ok(())
                })),
        )
        .unwrap();

    let circle = runtime.new_object("life.Circle", &[]).unwrap();
    runtime.dispose(circle).unwrap();
    assert_eq!(*order.borrow(), vec!["circle", "traced", "shape"]);
}

#[test]
fn dispose_is_idempotent_and_unlinks_the_layout_tree() {
    let mut runtime = Runtime::new();
    runtime
        .define_class(ClassConfig::new("life.Node").extend(ROOT_CLASS))
        .unwrap();
    let parent = runtime.new_object("life.Node", &[]).unwrap();
    let child = runtime.new_object("life.Node", &[]).unwrap();
    runtime.set_layout_parent(child, Some(parent)).unwrap();
    assert_eq!(runtime.live_objects(), 2);

    runtime.dispose(parent).unwrap();
    runtime.dispose(parent).unwrap();
    assert_eq!(runtime.live_objects(), 1);
    // The orphan survives, detached.
    assert_eq!(runtime.parent_of(child), None);
}

#[test]
fn disposed_members_are_unreachable() {
    let mut runtime = Runtime::new();
    runtime
        .define_class(
            ClassConfig::new("life.Echo")
                .extend(ROOT_CLASS)
                .member("echo", member_fn(|_ctx, _args| Ok(Value::str("echo")))),
        )
        .unwrap();
    let echo = runtime.new_object("life.Echo", &[]).unwrap();
    runtime.dispose(echo).unwrap();

    let err = runtime.call(echo, "echo", &[]).unwrap_err();
    assert!(matches!(
        err,
        MetaError::Contract(ContractError::Disposed { .. })
    ));
}

#[test]
fn failed_destructor_still_releases_the_object() {
    let mut runtime = Runtime::new();
    runtime
        .define_class(
            ClassConfig::new("life.Faulty")
                .extend(ROOT_CLASS)
                .destruct(hook_fn(|_ctx, _args| {
                    Err(ConfigError::InvalidDeclaration("teardown failed".to_string()).into())
                })),
        )
        .unwrap();
    let faulty = runtime.new_object("life.Faulty", &[]).unwrap();

    assert!(runtime.dispose(faulty).is_err());
    // The error surfaces, but the object is fully torn down regardless.
    assert_eq!(runtime.live_objects(), 0);
    runtime.dispose(faulty).unwrap();
}

#[test]
fn hash_codes_resolve_only_while_live() {
    let mut runtime = Runtime::new();
    runtime
        .define_class(ClassConfig::new("life.Node").extend(ROOT_CLASS))
        .unwrap();
    let node = runtime.new_object("life.Node", &[]).unwrap();

    let code = runtime.to_hash_code(node);
    assert_eq!(runtime.from_hash_code(code), Some(node));

    runtime.dispose(node).unwrap();
    assert_eq!(runtime.from_hash_code(code), None);
}

#[test]
fn singleton_instances_are_cached_until_disposed() {
    let mut runtime = Runtime::new();
    runtime
        .define_class(
            ClassConfig::new("life.Clock")
                .extend(ROOT_CLASS)
                .kind(ClassKind::Singleton),
        )
        .unwrap();

    let err = runtime.new_object("life.Clock", &[]).unwrap_err();
    assert!(matches!(
        err,
        MetaError::Contract(ContractError::SingletonConstructor { .. })
    ));

    let first = runtime.get_instance("life.Clock").unwrap();
    assert_eq!(runtime.get_instance("life.Clock").unwrap(), first);

    runtime.dispose(first).unwrap();
    let second = runtime.get_instance("life.Clock").unwrap();
    assert_ne!(second, first);
}

#[test]
fn get_instance_rejects_ordinary_classes() {
    let mut runtime = Runtime::new();
    runtime
        .define_class(ClassConfig::new("life.Plain").extend(ROOT_CLASS))
        .unwrap();

    let err = runtime.get_instance("life.Plain").unwrap_err();
    assert!(matches!(
        err,
        MetaError::Config(ConfigError::InvalidDeclaration(_))
    ));
}

#[test]
fn abstract_classes_never_instantiate() {
    let mut runtime = Runtime::new();
    runtime
        .define_class(
            ClassConfig::new("life.Base")
                .extend(ROOT_CLASS)
                .kind(ClassKind::Abstract),
        )
        .unwrap();

    let err = runtime.new_object("life.Base", &[]).unwrap_err();
    assert!(matches!(
        err,
        MetaError::Contract(ContractError::InstantiateAbstract { .. })
    ));
}

#[test]
fn shutdown_disposes_in_descending_token_order() {
    let mut runtime = Runtime::new();
    let order: Rc<RefCell<Vec<ObjectId>>> = Rc::new(RefCell::new(Vec::new()));

    let sink = order.clone();
    runtime
        .define_class(
            ClassConfig::new("life.Tracked")
                .extend(ROOT_CLASS)
                .destruct(hook_fn(move |ctx, _args| {
                    sink.borrow_mut().push(ctx.this());
                    Ok(())
                })),
        )
        .unwrap();

    let a = runtime.new_object("life.Tracked", &[]).unwrap();
    let b = runtime.new_object("life.Tracked", &[]).unwrap();
    let c = runtime.new_object("life.Tracked", &[]).unwrap();

    let errors = runtime.shutdown();
    assert!(errors.is_empty());
    assert_eq!(runtime.live_objects(), 0);
    assert_eq!(*order.borrow(), vec![c, b, a]);
}

#[test]
fn shutdown_collects_destructor_errors_and_keeps_going() {
    let mut runtime = Runtime::new();
    let disposed: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

    runtime
        .define_class(
            ClassConfig::new("life.Faulty")
                .extend(ROOT_CLASS)
                .destruct(hook_fn(|_ctx, _args| {
                    Err(ConfigError::InvalidDeclaration("teardown failed".to_string()).into())
                })),
        )
        .unwrap();
    let sink = disposed.clone();
    runtime
        .define_class(
            ClassConfig::new("life.Sound")
                .extend(ROOT_CLASS)
                .destruct(hook_fn(move |_ctx, _args| {
                    sink.borrow_mut().push("sound");
                    Ok(())
                })),
        )
        .unwrap();

    runtime.new_object("life.Sound", &[]).unwrap();
    runtime.new_object("life.Faulty", &[]).unwrap();
    runtime.new_object("life.Sound", &[]).unwrap();

    let errors = runtime.shutdown();
    assert_eq!(errors.len(), 1);
    assert_eq!(runtime.live_objects(), 0);
    assert_eq!(*disposed.borrow(), vec!["sound", "sound"]);
}
