//! Sample schemas shared by unit tests, integration tests and examples.

use serde_json::{Value, json};

/// Nested schema exercising object defaults, `$ref` with sibling defaults and
/// unknown keywords on leaves.
///
/// Leaves: `foo`, `bar.nested`, `bar.more_nested.subkey` and
/// `array_thing.some_prop`.
#[must_use]
pub fn nested() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-04/schema#",
        "definitions": {
            "reftype": {
                "type": "object",
                "properties": {
                    "some_prop": {"type": "array", "default": [1]}
                }
            }
        },
        "properties": {
            "foo": {
                "type": "string",
                "default": "bar",
                "randomextrakey": "whocareslol"
            },
            "bar": {
                "type": "object",
                "default": {},
                "properties": {
                    "nested": {"type": "string", "default": "baz"},
                    "more_nested": {
                        "type": "object",
                        "default": {},
                        "properties": {
                            "subkey": {"type": "integer", "default": 1}
                        }
                    }
                }
            },
            "array_thing": {"$ref": "#/definitions/reftype", "default": {}}
        }
    })
}

/// Flat service schema with a derived `DEBUG_PORT`.
///
/// `PORT` defaults to 8080 and is bounded to leave room for the debug port.
#[must_use]
pub fn service() -> Value {
    json!({
        "properties": {
            "PORT": {
                "type": "integer",
                "default": 8080,
                "minimum": 1,
                "maximum": 65534,
                "description": "Port the service listens on"
            },
            "DEBUG_PORT": {
                "type": "integer",
                "description": "Port for the debug endpoint"
            },
            "LOG_LEVEL": {
                "type": "string",
                "enum": ["DEBUG", "INFO", "WARNING", "ERROR"],
                "default": "INFO"
            },
            "LOG_FILE": {"type": ["string", "null"], "default": null},
            "FEATURES": {"type": "array", "items": {"type": "string"}, "default": []},
            "VERBOSE": {"type": "boolean", "default": false}
        }
    })
}
