//! Unit tests for the configuration container.

use std::sync::{Arc, Mutex};

use rstest::{fixture, rstest};
use serde::Deserialize;
use serde_json::{Value, json};
use test_helpers::schemas;

use super::{Config, ConfigBuilder, LoadState};
use crate::{AccessMode, ConfigError, MapSource, Schema, Source};

/// Source whose data can be swapped between reloads.
#[derive(Debug, Clone)]
struct Shared(Arc<Mutex<Value>>);

impl Shared {
    fn new(data: Value) -> Self {
        Self(Arc::new(Mutex::new(data)))
    }

    fn set(&self, data: Value) {
        *self.0.lock().expect("lock") = data;
    }
}

impl Source for Shared {
    fn name(&self) -> &str {
        "shared"
    }

    fn mode(&self) -> AccessMode {
        AccessMode::ReadOnly
    }

    fn read(&self, schema: &Schema) -> crate::ConfigResult<Value> {
        crate::extract_leaves(schema, &self.0.lock().expect("lock"))
    }
}

#[fixture]
fn nested() -> Config {
    ConfigBuilder::new(schemas::nested())
        .build()
        .expect("defaults build")
}

#[rstest]
fn build_without_sources_yields_defaults(nested: Config) {
    assert_eq!(
        nested.as_value(),
        &json!({
            "foo": "bar",
            "bar": {"nested": "baz", "more_nested": {"subkey": 1}},
            "array_thing": {"some_prop": [1]}
        })
    );
    assert_eq!(nested.state(), LoadState::Loaded { generation: 1 });
}

#[test]
fn skip_initial_load_leaves_seeded_state() {
    let config = ConfigBuilder::new(schemas::nested())
        .source(MapSource::new(json!({"foo": "from-map"})))
        .skip_initial_load()
        .build()
        .expect("builds");
    assert_eq!(config.state(), LoadState::Seeded);
    assert_eq!(*config.get("foo").expect("default"), "bar");
}

#[test]
fn reload_picks_up_source_changes_and_counts_generations() {
    let shared = Shared::new(json!({"foo": "one"}));
    let mut config = ConfigBuilder::new(schemas::nested())
        .source(shared.clone())
        .build()
        .expect("builds");
    assert_eq!(*config.get("foo").expect("set"), "one");

    shared.set(json!({"foo": "two"}));
    config.reload().expect("reloads");
    assert_eq!(*config.get("foo").expect("set"), "two");
    assert_eq!(config.state(), LoadState::Loaded { generation: 2 });
}

#[test]
fn failed_reload_keeps_committed_data() {
    let shared = Shared::new(json!({"bar": {"more_nested": {"subkey": 5}}}));
    let mut config = ConfigBuilder::new(schemas::nested())
        .source(shared.clone())
        .build()
        .expect("builds");
    let before = config.as_value().clone();

    shared.set(json!({"bar": {"more_nested": {"subkey": "not-a-number"}}}));
    let err = config.reload().expect_err("coercion fails");
    assert!(matches!(err.as_ref(), ConfigError::Coercion { .. }));
    assert_eq!(config.as_value(), &before);
    assert_eq!(config.state(), LoadState::Loaded { generation: 1 });
}

#[test]
fn invalid_merge_is_rejected_before_commit() {
    let schema = json!({"properties": {
        "level": {"type": "string"},
        "limit": {"type": "integer", "maximum": 10}
    }});
    let err = ConfigBuilder::new(schema)
        .initial(json!({"limit": 50}))
        .build()
        .expect_err("seed violates maximum");
    assert!(matches!(err.as_ref(), ConfigError::ConfigInvalid { .. }));
}

#[rstest]
#[case(json!([]))]
#[case(json!("text"))]
fn non_mapping_seed_is_rejected(#[case] initial: Value) {
    let err = ConfigBuilder::new(schemas::nested())
        .initial(initial)
        .build()
        .expect_err("seed must be a mapping");
    assert!(matches!(err.as_ref(), ConfigError::ConfigInvalid { .. }));
}

#[rstest]
fn override_creates_independent_container(nested: Config) {
    let before = nested.as_value().clone();
    let child = nested
        .override_with(vec![Box::new(MapSource::new(json!({"foo": "child"})))])
        .expect("override builds");
    assert_eq!(*child.get("foo").expect("set"), "child");
    assert_eq!(*child.get_in("bar.nested").expect("inherited"), "baz");
    assert_eq!(nested.as_value(), &before);
    assert_eq!(child.source_names().collect::<Vec<_>>(), ["map"]);
    assert_eq!(nested.source_names().count(), 0);
}

#[rstest]
fn lookups_fall_back_only_when_asked(nested: Config) {
    let fallback = json!("fallback");
    assert_eq!(nested.get_or("missing", &fallback), &fallback);
    assert_eq!(*nested.get_or("foo", &fallback), "bar");
    assert_eq!(nested.get_in_or("bar.more_nested.subkey", &fallback), 1);
    assert_eq!(nested.get_in_or("bar.more_nested.other", &fallback), &fallback);

    let err = nested.get("missing").expect_err("absent");
    assert!(matches!(err.as_ref(), ConfigError::PathNotFound { path } if path == "missing"));
    let err = nested.get_in("bar.nope.deeper").expect_err("absent");
    assert!(matches!(err.as_ref(), ConfigError::PathNotFound { .. }));
}

#[rstest]
fn views_distinguish_missing_from_non_sections(nested: Config) {
    let view = nested.view();
    let bar = view.section("bar").expect("section");
    assert_eq!(bar.path().to_string(), "bar");
    assert_eq!(*bar.value("nested").expect("leaf"), "baz");
    let mut keys: Vec<&str> = bar.keys().expect("mapping").collect();
    keys.sort_unstable();
    assert_eq!(keys, ["more_nested", "nested"]);

    let missing = view.section("absent").expect_err("absent");
    assert!(matches!(missing.as_ref(), ConfigError::PathNotFound { path } if path == "absent"));
    let leaf = bar.section("nested").expect_err("leaf is not a section");
    assert!(matches!(leaf.as_ref(), ConfigError::NotASection { path } if path == "bar.nested"));
}

#[derive(Debug, Deserialize, PartialEq)]
struct MoreNested {
    subkey: u32,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Bar {
    nested: String,
    more_nested: MoreNested,
}

#[rstest]
fn sections_and_whole_config_extract_into_types(nested: Config) {
    let bar: Bar = nested
        .view()
        .section("bar")
        .expect("section")
        .extract()
        .expect("fits");
    assert_eq!(
        bar,
        Bar {
            nested: "baz".to_owned(),
            more_nested: MoreNested { subkey: 1 },
        }
    );
    let err = nested.extract::<MoreNested>().expect_err("root has no subkey");
    assert!(matches!(err.as_ref(), ConfigError::Gathering(_)));
}
