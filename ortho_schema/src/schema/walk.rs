//! Depth-first enumeration of schema leaves.

use serde_json::Value;

use super::{Schema, children};
use crate::{ConfigPath, ConfigResult};

/// One addressable configuration key and the resolved schema that governs it.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaLeaf {
    /// Location of the key in the configuration structure.
    pub path: ConfigPath,
    /// Leaf schema with every `$ref` substituted, including those nested in
    /// unions and `items`.
    pub schema: Value,
}

struct Frame {
    path: ConfigPath,
    node: Value,
    refs: Vec<String>,
}

/// Lazy iterator over the leaves of a [`Schema`], created by
/// [`Schema::leaves`].
///
/// Leaves are produced in `properties` declaration order. A reference error
/// is yielded once and ends the walk.
pub struct Walk<'a> {
    schema: &'a Schema,
    pending: Vec<Frame>,
}

impl Schema {
    /// Enumerate every leaf reachable through nested `properties`.
    ///
    /// ```
    /// use ortho_schema::{ConfigPath, Schema};
    /// use serde_json::json;
    ///
    /// let schema = Schema::new(json!({
    ///     "definitions": {"port": {"type": "integer", "minimum": 1}},
    ///     "properties": {
    ///         "network": {"properties": {
    ///             "port": {"$ref": "#/definitions/port", "default": 80}
    ///         }}
    ///     }
    /// }))?;
    /// let leaf = schema.leaves().next().expect("one leaf")?;
    /// assert_eq!(leaf.path, ConfigPath::from(["network", "port"]));
    /// assert_eq!(leaf.schema["minimum"], 1);
    /// assert_eq!(leaf.schema["default"], 80);
    /// # Ok::<_, std::sync::Arc<ortho_schema::ConfigError>>(())
    /// ```
    #[must_use]
    pub fn leaves(&self) -> Walk<'_> {
        let pending = self
            .properties()
            .rev()
            .map(|(key, node)| Frame {
                path: ConfigPath::new([key.as_str()]),
                node: node.clone(),
                refs: Vec::new(),
            })
            .collect();
        Walk {
            schema: self,
            pending,
        }
    }
}

impl Iterator for Walk<'_> {
    type Item = ConfigResult<SchemaLeaf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Frame {
                path,
                node,
                mut refs,
            } = self.pending.pop()?;
            let resolved = match self.schema.resolve_node(&node, &mut refs) {
                Ok(resolved) => resolved,
                Err(err) => {
                    self.pending.clear();
                    return Some(Err(err));
                }
            };
            let Some(properties) = children(&resolved) else {
                return Some(match self.schema.inline_refs(resolved, &refs) {
                    Ok(schema) => Ok(SchemaLeaf { path, schema }),
                    Err(err) => {
                        self.pending.clear();
                        Err(err)
                    }
                });
            };
            self.pending
                .extend(properties.iter().rev().map(|(key, child)| Frame {
                    path: path.child(key.as_str()),
                    node: child.clone(),
                    refs: refs.clone(),
                }));
        }
    }
}
