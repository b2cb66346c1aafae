//! Addressing and merging nested configuration values.
//!
//! A [`ConfigPath`] is the ordered list of mapping keys leading to a value.
//! The free functions here are the only places that walk or build nested
//! `serde_json` objects, so every source and the merge engine share one
//! definition of "present", "absent" and "later wins".

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{ConfigError, ConfigResult};

/// Ordered key segments locating a value inside a nested mapping.
///
/// # Examples
///
/// ```
/// use ortho_schema::ConfigPath;
/// let path = ConfigPath::from("network.port");
/// assert_eq!(path.segments(), ["network", "port"]);
/// assert_eq!(path.to_string(), "network.port");
/// ```
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ConfigPath(Vec<String>);

impl ConfigPath {
    /// Build a path from explicit segments. Segments are taken verbatim, so
    /// keys containing dots are preserved.
    #[must_use]
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Split a dotted string into segments. The empty string is the root.
    #[must_use]
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::default();
        }
        Self::new(dotted.split('.'))
    }

    /// The segments of this path.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this path addresses the root.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A new path with `key` appended.
    #[must_use]
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.into());
        Self(segments)
    }

    /// Join the segments with `separator`.
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join("."))
    }
}

impl From<&str> for ConfigPath {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

impl From<String> for ConfigPath {
    fn from(dotted: String) -> Self {
        Self::parse(&dotted)
    }
}

impl From<Vec<String>> for ConfigPath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl<const N: usize> From<[&str; N]> for ConfigPath {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

impl From<&ConfigPath> for ConfigPath {
    fn from(path: &ConfigPath) -> Self {
        path.clone()
    }
}

/// Build a single-branch structure holding `value` at `path`.
///
/// # Examples
///
/// ```
/// use ortho_schema::{ConfigPath, nest};
/// use serde_json::json;
/// let nested = nest(&ConfigPath::from("a.b"), json!(1));
/// assert_eq!(nested, json!({"a": {"b": 1}}));
/// ```
#[must_use]
pub fn nest(path: &ConfigPath, value: Value) -> Value {
    path.segments().iter().rev().fold(value, |inner, key| {
        let mut map = Map::new();
        map.insert(key.clone(), inner);
        Value::Object(map)
    })
}

/// Return the value stored at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::PathNotFound`] when any segment is missing or
/// passes through a value that is not a mapping.
pub fn get_in<'a>(value: &'a Value, path: &ConfigPath) -> ConfigResult<&'a Value> {
    path.segments()
        .iter()
        .try_fold(value, |current, key| current.as_object()?.get(key))
        .ok_or_else(|| Arc::new(ConfigError::not_found(path)))
}

/// Store `value` at `path`, creating intermediate mappings as needed.
///
/// Intermediate values that are not mappings are replaced by empty ones. An
/// empty path replaces `target` itself.
pub fn set_in(target: &mut Value, path: &ConfigPath, value: Value) {
    let Some((last, parents)) = path.segments().split_last() else {
        *target = value;
        return;
    };
    let mut current = target;
    for key in parents {
        let Some(map) = force_object(current) else {
            return;
        };
        current = map
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if let Some(map) = force_object(current) {
        map.insert(last.clone(), value);
    }
}

/// Overlay `updates` onto `target` in place.
///
/// - `null` updates are a no-op.
/// - Objects merge recursively; keys are added or overwritten and nested
///   objects are overlaid.
/// - Arrays and scalars replace the target value wholesale.
///
/// # Examples
///
/// ```
/// use ortho_schema::deep_merge;
/// use serde_json::json;
///
/// let mut acc = json!({"a": 1, "b": {"x": 1}});
/// deep_merge(&mut acc, json!({"b": {"y": 2}, "c": 3}));
/// assert_eq!(acc, json!({"a": 1, "b": {"x": 1, "y": 2}, "c": 3}));
///
/// deep_merge(&mut acc, json!({"b": [1, 2, 3]}));
/// assert_eq!(acc["b"], json!([1, 2, 3]));
/// ```
pub fn deep_merge(target: &mut Value, updates: Value) {
    if !updates.is_null() {
        merge_value(target, updates);
    }
}

fn merge_value(target: &mut Value, layer: Value) {
    match layer {
        Value::Object(map) => merge_object(target, map),
        _ => *target = layer,
    }
}

fn merge_object(target: &mut Value, map: Map<String, Value>) {
    let Some(target_map) = force_object(target) else {
        return;
    };
    for (key, value) in map {
        match target_map.get_mut(&key) {
            Some(existing) => merge_value(existing, value),
            None => {
                target_map.insert(key, value);
            }
        }
    }
}

/// Replace non-object values with an empty object and borrow the map.
fn force_object(value: &mut Value) -> Option<&mut Map<String, Value>> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    value.as_object_mut()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({}), json!({"a": 2}), json!({"a": 2}))]
    #[case(json!({"foo": "bar"}), json!({"foo": "baz"}), json!({"foo": "baz"}))]
    #[case(json!({"a": {"b": 3}}), json!({"a": {"b": 4, "c": 5}}), json!({"a": {"b": 4, "c": 5}}))]
    #[case(json!({"a": {"b": 3}}), json!({"a": 7}), json!({"a": 7}))]
    #[case(json!({"a": 7}), json!({"a": {"b": 1}}), json!({"a": {"b": 1}}))]
    #[case(json!({"list": [1, 2, 3]}), json!({"list": [9]}), json!({"list": [9]}))]
    fn deep_merge_overlays_updates(
        #[case] original: Value,
        #[case] updates: Value,
        #[case] expected: Value,
    ) {
        let mut target = original;
        deep_merge(&mut target, updates);
        assert_eq!(target, expected);
    }

    #[test]
    fn deep_merge_keeps_siblings_only_present_in_target() {
        let mut target = json!({"outer": {"keep": 1, "swap": 1}});
        deep_merge(&mut target, json!({"outer": {"swap": 2}}));
        assert_eq!(target, json!({"outer": {"keep": 1, "swap": 2}}));
    }

    #[rstest]
    #[case(Value::Null)]
    #[case(json!({}))]
    fn empty_updates_are_a_no_op(#[case] updates: Value) {
        let mut target = json!({"a": {"b": 1}});
        deep_merge(&mut target, updates);
        assert_eq!(target, json!({"a": {"b": 1}}));
    }

    #[test]
    fn get_in_reads_nested_values() {
        let data = json!({"bar": {"more_nested": {"subkey": 2}}});
        let value = get_in(&data, &ConfigPath::from("bar.more_nested.subkey"));
        assert_eq!(value.ok(), Some(&json!(2)));
    }

    #[rstest]
    #[case("missing")]
    #[case("bar.missing")]
    #[case("bar.leaf.deeper")]
    fn get_in_reports_missing_segments(#[case] path: &str) {
        let data = json!({"bar": {"leaf": 1}});
        let err = get_in(&data, &ConfigPath::from(path)).expect_err("path is absent");
        assert!(matches!(&*err, ConfigError::PathNotFound { path: p } if p == path));
    }

    #[test]
    fn get_in_with_root_path_returns_whole_value() {
        let data = json!({"a": 1});
        assert_eq!(get_in(&data, &ConfigPath::default()).ok(), Some(&data));
    }

    #[test]
    fn set_in_creates_intermediate_levels() {
        let mut data = json!({"a": {"keep": true}, "b": 5});
        set_in(&mut data, &ConfigPath::from("a.x.y"), json!(1));
        set_in(&mut data, &ConfigPath::from("b.c"), json!(2));
        assert_eq!(
            data,
            json!({"a": {"keep": true, "x": {"y": 1}}, "b": {"c": 2}})
        );
    }

    #[test]
    fn nest_builds_single_branch() {
        let nested = nest(&ConfigPath::new(["a", "b", "c"]), json!("v"));
        assert_eq!(nested, json!({"a": {"b": {"c": "v"}}}));
        assert_eq!(nest(&ConfigPath::default(), json!(3)), json!(3));
    }

    #[test]
    fn path_segments_preserve_dots_when_explicit() {
        let path = ConfigPath::new(["a.b", "c"]);
        assert_eq!(path.len(), 2);
        assert_eq!(path.child("d").segments(), ["a.b", "c", "d"]);
    }
}
