//! Unit tests for schema-derived command-line flags.

use clap::{Arg, Command};
use rstest::{fixture, rstest};
use serde_json::json;
use test_helpers::schemas;

use super::{CliFlags, display_default, flag_name};
use crate::{Config, ConfigError, ConfigPath, Schema, SourceExt};

#[fixture]
fn base() -> Config {
    Config::builder(schemas::nested()).build().expect("defaults build")
}

#[rstest]
#[case("foo", "foo")]
#[case("bar.more_nested.subkey", "bar-more-nested-subkey")]
#[case("LOG_LEVEL", "log-level")]
fn flag_names_follow_path(#[case] path: &str, #[case] expected: &str) {
    assert_eq!(flag_name(&ConfigPath::from(path)), expected);
}

#[rstest]
fn flags_cover_every_leaf(base: Config) {
    let flags = CliFlags::from_schema(base.schema()).expect("no collisions");
    assert_eq!(
        flags.names().collect::<Vec<_>>(),
        ["foo", "bar-nested", "bar-more-nested-subkey", "array-thing-some-prop"]
    );
}

#[test]
fn colliding_flags_are_rejected() {
    let schema = Schema::new(json!({"properties": {
        "a_b": {"type": "string"},
        "a": {"properties": {"b": {"type": "string"}}}
    }}))
    .expect("schema is valid");
    let err = CliFlags::from_schema(&schema).expect_err("both map to --a-b");
    assert!(matches!(err.as_ref(), ConfigError::SchemaInvalid { message } if message.contains("--a-b")));
}

#[rstest]
fn supplied_flags_override_and_defaults_do_not(base: Config) {
    let flags = CliFlags::from_schema(base.schema()).expect("flags");
    let (config, _) = flags
        .parse_from(
            &base,
            Command::new("app"),
            ["app", "--bar-more-nested-subkey", "7", "--array-thing-some-prop", "x, y"],
        )
        .expect("parses");
    assert_eq!(config.get_in("bar.more_nested.subkey").expect("set"), 7);
    assert_eq!(config.get_in("array_thing.some_prop").expect("set"), &json!(["x", "y"]));
    assert_eq!(*config.get("foo").expect("default"), "bar");

    let matches = flags
        .augment(Command::new("app"), Some(&base))
        .try_get_matches_from(["app"])
        .expect("parses");
    let source = flags.source(&matches).expect("collects");
    assert!(source.is_empty());
    assert_eq!(source.load_config(base.schema()).expect("loads"), json!({}));
}

#[rstest]
fn caller_arguments_survive(base: Config) {
    let flags = CliFlags::from_schema(base.schema()).expect("flags");
    let command = Command::new("app").arg(Arg::new("name").long("name"));
    let (_, matches) = flags
        .parse_from(&base, command, ["app", "--name", "svc", "--foo", "cli"])
        .expect("parses");
    assert_eq!(matches.get_one::<String>("name").map(String::as_str), Some("svc"));
}

#[rstest]
fn help_shows_descriptions_and_current_values() {
    let base = Config::builder(schemas::service()).build().expect("builds");
    let flags = CliFlags::from_schema(base.schema()).expect("flags");
    let help = flags
        .augment(Command::new("svc"), Some(&base))
        .render_help()
        .to_string();
    assert!(help.contains("--port <INTEGER>"), "{help}");
    assert!(help.contains("Port the service listens on"), "{help}");
    assert!(help.contains("[default: 8080]"), "{help}");
}

#[rstest]
fn bad_flag_values_fail_coercion(base: Config) {
    let flags = CliFlags::from_schema(base.schema()).expect("flags");
    let err = flags
        .parse_from(&base, Command::new("app"), ["app", "--bar-more-nested-subkey", "many"])
        .expect_err("not an integer");
    assert!(matches!(err.as_ref(), ConfigError::Coercion { .. }));
}

#[rstest]
fn unknown_flags_are_parse_errors(base: Config) {
    let flags = CliFlags::from_schema(base.schema()).expect("flags");
    let err = flags
        .parse_from(&base, Command::new("app"), ["app", "--nope", "1"])
        .expect_err("unknown flag");
    assert!(matches!(err.as_ref(), ConfigError::CliParsing(_)));
}

#[rstest]
#[case(json!(null), None)]
#[case(json!("text"), Some("text"))]
#[case(json!(3), Some("3"))]
#[case(json!(["a", 1]), Some("a,1"))]
#[case(json!({"k": 1}), Some("{\"k\":1}"))]
fn defaults_render_as_flag_text(#[case] value: serde_json::Value, #[case] expected: Option<&str>) {
    assert_eq!(display_default(&value).as_deref(), expected);
}

#[test]
fn empty_values_show_no_default() {
    assert_eq!(display_default(&json!([])), None);
    assert_eq!(display_default(&json!("")), None);
}
