//! Values computed from already merged configuration.
//!
//! A [`Derivations`] tree mirrors the nesting of the keys it produces. Each
//! leaf is a [`Derivation`]: a list of dependency paths and a pure function
//! over the values found there. A rule whose dependencies are not all present
//! contributes nothing, which keeps optional parts of a configuration from
//! turning into errors.
//!
//! ```
//! use ortho_schema::{Derivation, Derivations};
//! use serde_json::{Value, json};
//!
//! let rules = Derivations::new().group(
//!     "urls",
//!     Derivations::new().rule(
//!         "api",
//!         Derivation::new(["host", "port"], |args: &[&Value]| {
//!             json!(format!("http://{}:{}", args[0].as_str().unwrap_or(""), args[1]))
//!         }),
//!     ),
//! );
//! let derived = rules.evaluate(&json!({"host": "localhost", "port": 80}));
//! assert_eq!(derived, json!({"urls": {"api": "http://localhost:80"}}));
//! assert_eq!(rules.evaluate(&json!({"host": "localhost"})), json!({}));
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{ConfigPath, get_in, set_in};

type DeriveFn = dyn Fn(&[&Value]) -> Value + Send + Sync;

/// A pure function over the values at `parameters`.
#[derive(Clone)]
pub struct Derivation {
    parameters: Vec<ConfigPath>,
    function: Arc<DeriveFn>,
    description: Option<String>,
}

impl Derivation {
    /// Build a rule. `function` receives the dependency values positionally,
    /// in the order of `parameters`.
    #[must_use]
    pub fn new<I, P, F>(parameters: I, function: F) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ConfigPath>,
        F: Fn(&[&Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            parameters: parameters.into_iter().map(Into::into).collect(),
            function: Arc::new(function),
            description: None,
        }
    }

    /// Attach a human readable description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Dependency paths in argument order.
    #[must_use]
    pub fn parameters(&self) -> &[ConfigPath] {
        &self.parameters
    }

    /// The description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Run the rule over `data`. `None` when a dependency is absent.
    #[must_use]
    pub fn compute(&self, data: &Value) -> Option<Value> {
        let arguments = self
            .parameters
            .iter()
            .map(|path| get_in(data, path).ok())
            .collect::<Option<Vec<_>>>()?;
        Some((self.function)(&arguments))
    }
}

impl fmt::Debug for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Derivation")
            .field("parameters", &self.parameters)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
enum Node {
    Rule(Derivation),
    Group(Derivations),
}

/// Ordered tree of derivation rules keyed like the output they produce.
#[derive(Clone, Debug, Default)]
pub struct Derivations {
    entries: Vec<(String, Node)>,
}

impl Derivations {
    /// An empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add or replace the rule producing `key`.
    #[must_use]
    pub fn rule(self, key: impl Into<String>, derivation: Derivation) -> Self {
        self.insert(key.into(), Node::Rule(derivation))
    }

    /// Add or replace the nested tree under `key`.
    #[must_use]
    pub fn group(self, key: impl Into<String>, group: Self) -> Self {
        self.insert(key.into(), Node::Group(group))
    }

    fn insert(mut self, key: String, node: Node) -> Self {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = node,
            None => self.entries.push((key, node)),
        }
        self
    }

    /// Whether the tree holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Every rule with its full output path, depth first.
    pub fn iter(&self) -> impl Iterator<Item = (ConfigPath, &Derivation)> + '_ {
        let mut rules = Vec::new();
        self.collect_into(&ConfigPath::default(), &mut rules);
        rules.into_iter()
    }

    fn collect_into<'a>(&'a self, prefix: &ConfigPath, out: &mut Vec<(ConfigPath, &'a Derivation)>) {
        for (key, node) in &self.entries {
            let path = prefix.child(key.as_str());
            match node {
                Node::Rule(rule) => out.push((path, rule)),
                Node::Group(group) => group.collect_into(&path, out),
            }
        }
    }

    /// Compute every rule whose dependencies resolve in `data` and nest the
    /// results. `data` is only read.
    #[must_use]
    pub fn evaluate(&self, data: &Value) -> Value {
        let mut derived = Value::Object(Map::new());
        for (path, rule) in self.iter() {
            match rule.compute(data) {
                Some(value) => {
                    tracing::debug!(path = %path, "computed derived value");
                    set_in(&mut derived, &path, value);
                }
                None => {
                    tracing::trace!(path = %path, "skipping derivation with unresolved dependency");
                }
            }
        }
        derived
    }
}
