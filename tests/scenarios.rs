use pretty_assertions::assert_eq;

use archgraph::analysis::DependencyKind;
use archgraph::import::batch::ImportBatch;
use archgraph::import::completion::CompletionEngine;
use archgraph::import::{RawAnnotation, RawAnnotationValue, RawClass, RawCodeUnit, RawType};
use archgraph::model::{AccessTarget, JavaClasses, JavaModifier};
use archgraph::resolution::resolve_member;

fn complete(batch: ImportBatch) -> JavaClasses {
    CompletionEngine::complete(&batch, Default::default()).unwrap()
}

fn caller_and_callee(import_callee: bool) -> JavaClasses {
    let mut batch = ImportBatch::new().with_class(
        RawClass::new("com.example.A").method(
            RawCodeUnit::method("foo", &[], "void")
                .line(4)
                .calls("com.example.B", "bar", &[], "void", 5),
        ),
    );
    if import_callee {
        batch.push(RawClass::new("com.example.B").method(RawCodeUnit::method("bar", &[], "void")));
    }
    complete(batch)
}

#[test]
fn test_string_superclasses_end_at_object() {
    let classes = complete(
        ImportBatch::new()
            .with_class(RawClass::new("java.lang.Object"))
            .with_class(RawClass::new("java.lang.String").modifiers(&[JavaModifier::Public, JavaModifier::Final])),
    );
    let string = classes.get("java.lang.String").unwrap();
    let object = classes.get("java.lang.Object").unwrap();

    assert_eq!(classes.all_superclasses(string.id), &[object.id]);
    assert!(classes.all_superclasses(object.id).is_empty());
    assert!(object.fully_imported);
}

#[test]
fn test_call_to_imported_class_is_one_dependency() {
    let classes = caller_and_callee(true);
    let a = classes.get("com.example.A").unwrap();
    let b = classes.get("com.example.B").unwrap();

    let to_b: Vec<_> = classes
        .direct_dependencies_from(a.id)
        .iter()
        .filter(|d| d.target_class == b.id)
        .collect();
    assert_eq!(to_b.len(), 1);
    assert!(to_b[0].description.contains("calls method"));
    assert_eq!(to_b[0].kind, DependencyKind::Access);

    let bar = classes.method(b.id, "bar", &[]).unwrap();
    assert_eq!(classes.calls_of(bar).len(), 1);
    assert_eq!(classes.direct_dependencies_to(b.id).len(), 1);
}

#[test]
fn test_default_package_classes_named_like_primitive_codes() {
    let classes = complete(
        ImportBatch::new()
            .with_class(RawClass::new("A").method(
                RawCodeUnit::method("foo", &[], "void").line(4).calls("B", "bar", &[], "void", 5),
            ))
            .with_class(RawClass::new("B").method(RawCodeUnit::method("bar", &[], "void"))),
    );
    let a = classes.get("A").unwrap();
    let b = classes.get("B").unwrap();
    assert_eq!(b.name, "B");
    assert!(!b.is_primitive);
    assert!(b.fully_imported);

    let to_b: Vec<_> = classes
        .direct_dependencies_from(a.id)
        .iter()
        .filter(|d| d.target_class == b.id)
        .collect();
    assert_eq!(to_b.len(), 1);
    assert_eq!(
        to_b[0].description,
        "Method <A.foo()> calls method <B.bar()> in (A.java:5)"
    );
    let bar = classes.method(b.id, "bar", &[]).unwrap();
    assert_eq!(classes.calls_of(bar).len(), 1);
}

#[test]
fn test_call_to_missing_class_resolves_to_nothing() {
    let classes = caller_and_callee(false);
    let a = classes.get("com.example.A").unwrap();
    let foo = classes.method(a.id, "foo", &[]).unwrap();
    let call = classes.method_calls_from(foo)[0];

    assert_eq!(classes.resolve(&call.target), None);
    assert_eq!(call.target.name, "bar");
    assert_eq!(classes.class(call.target.owner).name, "com.example.B");
    assert_eq!(call.target.full_name, "com.example.B.bar()");
    assert!(!classes.class(call.target.owner).fully_imported);
    assert!(!classes.contains("com.example.B"));

    // The dependency still exists, only resolution is absent.
    assert!(classes
        .direct_dependencies_from(a.id)
        .iter()
        .any(|d| d.target_class == call.target.owner));
}

#[test]
fn test_annotation_member_dependency_is_distinct() {
    let classes = complete(ImportBatch::new().with_class(
        RawClass::new("com.example.Y").annotation(
            RawAnnotation::new("com.example.X")
                .property("type", RawAnnotationValue::Class("com.example.Foo".into())),
        ),
    ));
    let y = classes.get("com.example.Y").unwrap();
    let x = classes.get("com.example.X").unwrap();
    let foo = classes.get("com.example.Foo").unwrap();
    let deps = classes.direct_dependencies_from(y.id);

    let to_x: Vec<_> = deps.iter().filter(|d| d.target_class == x.id).collect();
    let to_foo: Vec<_> = deps.iter().filter(|d| d.target_class == foo.id).collect();
    assert_eq!(to_x.len(), 1);
    assert_eq!(to_foo.len(), 1);
    assert_eq!(to_x[0].kind, DependencyKind::Annotation);
    assert_eq!(to_foo[0].kind, DependencyKind::AnnotationMember);
    assert_ne!(to_x[0], to_foo[0]);
}

#[test]
fn test_transitive_traversal_through_default_method_terminates() {
    let classes = complete(
        ImportBatch::new()
            .with_class(
                RawClass::interface("com.example.I").method(
                    RawCodeUnit::method("describe", &[], "java.util.List")
                        .returns(RawType::parameterized(
                            "java.util.List",
                            vec![RawType::class("com.example.P")],
                        ))
                        .line(10)
                        .calls("com.example.P", "name", &[], "java.lang.String", 11),
                ),
            )
            .with_class(
                RawClass::new("com.example.P")
                    .implements("com.example.I")
                    .method(RawCodeUnit::method("name", &[], "java.lang.String")),
            ),
    );
    let p = classes.get("com.example.P").unwrap();
    let i = classes.get("com.example.I").unwrap();

    let all = classes.transitive_dependencies_from(p.id);
    assert!(all.iter().any(|d| d.origin_class == p.id && d.target_class == i.id));
    assert!(all.iter().any(|d| d.origin_class == i.id && d.target_class == p.id));
    assert_eq!(all, classes.transitive_dependencies_from(p.id));
}

#[test]
fn test_direct_dependencies_are_memoized() {
    let classes = caller_and_callee(true);
    let a = classes.get("com.example.A").unwrap();
    let first = classes.direct_dependencies_from(a.id);
    let second = classes.direct_dependencies_from(a.id);
    assert_eq!(first, second);
    assert!(std::ptr::eq(first.as_ptr(), second.as_ptr()));
}

#[test]
fn test_superclasses_never_contain_self() {
    let classes = complete(
        ImportBatch::new()
            .with_class(RawClass::new("com.example.Base"))
            .with_class(RawClass::new("com.example.Middle").extends("com.example.Base"))
            .with_class(RawClass::new("com.example.Leaf").extends("com.example.Middle"))
            .with_class(RawClass::interface("com.example.Marker")),
    );
    let object = classes.object_class();
    for class in classes.iter() {
        let superclasses = classes.all_superclasses(class.id);
        assert!(!superclasses.contains(&class.id), "{} is its own superclass", class.name);
        if class.id != object && !class.is_interface {
            assert_eq!(superclasses.last(), Some(&object), "{}", class.name);
        }
    }
}

#[test]
fn test_synthetic_tie_break_is_stable() {
    let classes = complete(
        ImportBatch::new()
            .with_class(
                RawClass::new("com.example.Box")
                    .method(
                        RawCodeUnit::method("get", &[], "java.lang.Object")
                            .modifiers(&[JavaModifier::Public, JavaModifier::Synthetic]),
                    )
                    .method(RawCodeUnit::method("get", &[], "java.lang.String")),
            )
            .with_class(RawClass::new("com.example.Client").method(
                RawCodeUnit::method("use", &[], "void").calls("com.example.Box", "get", &[], "java.lang.Object", 3),
            )),
    );
    let client = classes.get("com.example.Client").unwrap();
    let use_method = classes.method(client.id, "use", &[]).unwrap();
    let target = &classes.method_calls_from(use_method)[0].target;

    let resolved = resolve_member(&classes, target).unwrap();
    assert!(!classes.member(resolved).is_synthetic());
    for _ in 0..3 {
        assert_eq!(resolve_member(&classes, target), Some(resolved));
    }
}

#[test]
fn test_tie_break_between_two_synthetic_candidates() {
    let synthetic = [JavaModifier::Public, JavaModifier::Synthetic];
    let classes = complete(
        ImportBatch::new()
            .with_class(
                RawClass::new("com.example.Box")
                    .method(RawCodeUnit::method("get", &[], "java.lang.String").modifiers(&synthetic))
                    .method(RawCodeUnit::method("get", &[], "java.lang.Object").modifiers(&synthetic)),
            )
            .with_class(RawClass::new("com.example.Client").method(
                RawCodeUnit::method("use", &[], "void").calls("com.example.Box", "get", &[], "java.lang.Object", 3),
            )),
    );
    let client = classes.get("com.example.Client").unwrap();
    let use_method = classes.method(client.id, "use", &[]).unwrap();
    let target = &classes.method_calls_from(use_method)[0].target;

    let resolved = resolve_member(&classes, target).unwrap();
    assert!(classes.member(resolved).is_synthetic());
    assert_eq!(classes.member(resolved).descriptor, "()Ljava/lang/Object;");
    for _ in 0..3 {
        assert_eq!(resolve_member(&classes, target), Some(resolved));
    }
    assert_eq!(classes.resolve(target), Some(resolved));
}

#[test]
fn test_tie_break_between_unrelated_interfaces_uses_full_name() {
    let classes = complete(
        ImportBatch::new()
            .with_class(RawClass::interface("com.example.Second").method(RawCodeUnit::method("name", &[], "java.lang.String")))
            .with_class(RawClass::interface("com.example.First").method(RawCodeUnit::method("name", &[], "java.lang.String")))
            .with_class(
                RawClass::new("com.example.Named")
                    .modifiers(&[JavaModifier::Public, JavaModifier::Abstract])
                    .implements("com.example.Second")
                    .implements("com.example.First"),
            )
            .with_class(RawClass::new("com.example.Client").method(
                RawCodeUnit::method("use", &[], "void").calls("com.example.Named", "name", &[], "java.lang.String", 3),
            )),
    );
    let client = classes.get("com.example.Client").unwrap();
    let use_method = classes.method(client.id, "use", &[]).unwrap();
    let target = &classes.method_calls_from(use_method)[0].target;

    let resolved = resolve_member(&classes, target).unwrap();
    assert_eq!(classes.member(resolved).full_name, "com.example.First.name()");
    for _ in 0..3 {
        assert_eq!(resolve_member(&classes, target), Some(resolved));
    }
}

#[test]
fn test_every_member_round_trips_through_its_target() {
    let classes = complete(
        ImportBatch::new()
            .with_class(
                RawClass::new("com.example.Base")
                    .field("id", RawType::class("long"))
                    .constructor(RawCodeUnit::constructor(&[]))
                    .method(RawCodeUnit::method("save", &["com.example.Base[]"], "boolean")),
            )
            .with_class(
                RawClass::new("com.example.Child")
                    .extends("com.example.Base")
                    .constructor(RawCodeUnit::constructor(&["java.lang.String"]))
                    .method(RawCodeUnit::method("save", &["int", "java.lang.String"], "void")),
            ),
    );
    for class in classes.iter() {
        for member in classes.members_of(class.id) {
            let Some(target) = AccessTarget::for_member(&classes, *member) else {
                continue;
            };
            let resolved = resolve_member(&classes, &target).unwrap();
            assert_eq!(
                classes.member(resolved).full_name,
                classes.member(*member).full_name
            );
        }
    }
}
