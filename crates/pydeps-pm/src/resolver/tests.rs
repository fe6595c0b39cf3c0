//! Resolver scenarios over in-memory package tables.

use super::*;
use crate::index::InMemoryIndex;
use crate::Error;

fn index(packages: Vec<(&str, Vec<&str>)>) -> InMemoryIndex {
    InMemoryIndex::new(packages).unwrap()
}

fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

/// Render a walk as `(spec, source)` pairs
fn walk(specs: &[Spec]) -> Vec<(String, String)> {
    specs
        .iter()
        .map(|s| (s.to_string(), s.source().unwrap_or_default().to_string()))
        .collect()
}

fn expect(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(spec, source)| (spec.to_string(), source.to_string()))
        .collect()
}

// ============================================================================
// Basic walks
// ============================================================================

#[tokio::test]
async fn test_resolve_closure() {
    let index = index(vec![
        ("foo-0.1", vec!["bar", "qux"]),
        ("bar-0.2", vec!["qux>0.1"]),
        ("qux-0.1", vec![]),
        ("qux-0.2", vec![]),
    ]);

    let specs = Resolver::new(&index)
        .resolve_package("foo", &v("0.1"))
        .await
        .unwrap();

    assert_eq!(
        walk(&specs),
        expect(&[("bar", "foo"), ("qux>0.1", "bar"), ("qux", "foo")])
    );
}

#[tokio::test]
async fn test_resolve_leaf_package() {
    let index = index(vec![("six-1.2.0", vec![])]);
    let specs = Resolver::new(&index)
        .resolve_package("six", &v("1.2"))
        .await
        .unwrap();
    assert!(specs.is_empty());
}

#[tokio::test]
async fn test_resolve_depth_first_order() {
    let index = index(vec![
        ("root-1.0", vec!["a", "b"]),
        ("a-1.0", vec!["a1", "a2"]),
        ("a1-1.0", vec!["a1x"]),
        ("a1x-1.0", vec![]),
        ("a2-1.0", vec![]),
        ("b-1.0", vec!["b1"]),
        ("b1-1.0", vec![]),
    ]);

    let specs = Resolver::new(&index)
        .resolve_package("root", &v("1.0"))
        .await
        .unwrap();

    let names: Vec<&str> = specs.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["a", "a1", "a1x", "a2", "b", "b1"]);
}

#[tokio::test]
async fn test_resolve_all_from_requirement() {
    let index = index(vec![
        ("foo-0.1", vec!["bar"]),
        ("foo-0.2", vec!["baz"]),
        ("bar-1.0", vec![]),
        ("baz-1.0", vec![]),
    ]);
    let resolver = Resolver::new(&index);

    let latest = resolver.resolve_all(&"foo".parse().unwrap()).await.unwrap();
    assert_eq!(walk(&latest), expect(&[("baz", "foo")]));

    let older = resolver
        .resolve_all(&"foo<0.2".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(walk(&older), expect(&[("bar", "foo")]));
}

#[tokio::test]
async fn test_resolve_keeps_duplicates() {
    let index = index(vec![
        ("app-1.0", vec!["lib", "util"]),
        ("util-1.0", vec!["lib>=1.0"]),
        ("lib-1.0", vec![]),
        ("lib-1.1", vec![]),
    ]);

    let specs = Resolver::new(&index)
        .resolve_package("app", &v("1.0"))
        .await
        .unwrap();

    assert_eq!(
        walk(&specs),
        expect(&[("lib", "app"), ("util", "app"), ("lib>=1.0", "util")])
    );

    let merged = merge_specs(&specs);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].spec.to_string(), "lib>=1.0");
    assert_eq!(merged[0].sources, vec!["app", "util"]);
}

// ============================================================================
// Version selection
// ============================================================================

#[tokio::test]
async fn test_best_match_within_range() {
    let index = index(vec![
        ("pkg-0.9", vec![]),
        ("pkg-1.0", vec![]),
        ("pkg-1.5", vec![]),
        ("pkg-1.9", vec![]),
        ("pkg-2.0", vec![]),
    ]);

    let spec: Spec = "pkg>1.0,<2.0".parse().unwrap();
    assert_eq!(index.find_best_match(&spec).await.unwrap(), v("1.9"));

    let spec: Spec = "pkg==3.0".parse().unwrap();
    assert!(matches!(
        index.find_best_match(&spec).await,
        Err(Error::NoPackageMatch(_))
    ));
}

#[tokio::test]
async fn test_missing_dependency_aborts() {
    let index = index(vec![
        ("foo-0.1", vec!["bar", "missing>=2.0"]),
        ("bar-1.0", vec![]),
    ]);

    let err = Resolver::new(&index)
        .resolve_package("foo", &v("0.1"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoPackageMatch(ref s) if s == "missing>=2.0"));
}

#[tokio::test]
async fn test_missing_root_aborts() {
    let index = index(vec![("foo-0.1", vec![])]);
    let result = Resolver::new(&index).resolve_package("foo", &v("0.2")).await;
    assert!(matches!(result, Err(Error::NoPackageMatch(_))));
}

// ============================================================================
// Cycles and revisiting
// ============================================================================

#[tokio::test]
async fn test_cycle_terminates() {
    let index = index(vec![("a-1.0", vec!["b"]), ("b-1.0", vec!["a"])]);

    let specs = Resolver::new(&index)
        .resolve_package("a", &v("1.0"))
        .await
        .unwrap();

    // `a` is recorded as b's dependency but not expanded again
    assert_eq!(walk(&specs), expect(&[("b", "a"), ("a", "b")]));
}

#[tokio::test]
async fn test_self_dependency_terminates() {
    let index = index(vec![("loop-1.0", vec!["loop"])]);
    let specs = Resolver::new(&index)
        .resolve_package("loop", &v("1.0"))
        .await
        .unwrap();
    assert_eq!(walk(&specs), expect(&[("loop", "loop")]));
}

#[tokio::test]
async fn test_diamond_expands_per_path() {
    let index = index(vec![
        ("top-1.0", vec!["left", "right"]),
        ("left-1.0", vec!["base"]),
        ("right-1.0", vec!["base"]),
        ("base-1.0", vec!["core"]),
        ("core-1.0", vec![]),
    ]);

    let specs = Resolver::new(&index)
        .resolve_package("top", &v("1.0"))
        .await
        .unwrap();

    assert_eq!(
        walk(&specs),
        expect(&[
            ("left", "top"),
            ("base", "left"),
            ("core", "base"),
            ("right", "top"),
            ("base", "right"),
            ("core", "base"),
        ])
    );
}

#[tokio::test]
async fn test_diamond_expands_once() {
    let index = index(vec![
        ("top-1.0", vec!["left", "right"]),
        ("left-1.0", vec!["base"]),
        ("right-1.0", vec!["base"]),
        ("base-1.0", vec!["core"]),
        ("core-1.0", vec![]),
    ]);

    let options = ResolverOptions::default().revisit(Revisit::Once);
    let specs = Resolver::with_options(&index, options)
        .resolve_package("top", &v("1.0"))
        .await
        .unwrap();

    assert_eq!(
        walk(&specs),
        expect(&[
            ("left", "top"),
            ("base", "left"),
            ("core", "base"),
            ("right", "top"),
            ("base", "right"),
        ])
    );
}

#[tokio::test]
async fn test_different_versions_are_different_nodes() {
    let index = index(vec![
        ("a-2.0", vec!["b"]),
        ("a-1.0", vec![]),
        ("b-1.0", vec!["a<2.0"]),
    ]);

    let specs = Resolver::new(&index)
        .resolve_package("a", &v("2.0"))
        .await
        .unwrap();

    assert_eq!(walk(&specs), expect(&[("b", "a"), ("a<2.0", "b")]));
}
