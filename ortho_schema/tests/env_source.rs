//! Environment sources reading the real process environment.

use anyhow::{Result, ensure};
use ortho_schema::{Config, ConfigError, EnvSource, Schema, SourceExt};
use rstest::rstest;
use serial_test::serial;
use test_helpers::figment::{jail_error, with_jail};
use test_helpers::{env, schemas};

#[test]
#[serial]
fn process_environment_overrides_defaults() -> Result<()> {
    let _guards = env::set_vars([
        ("foo", "asdf"),
        ("bar_nested", "asdf"),
        ("bar_more_nested_subkey", "2"),
    ]);
    let config = Config::builder(schemas::nested())
        .source(EnvSource::new(""))
        .build()?;
    ensure!(*config.get("foo")? == "asdf");
    ensure!(*config.get_in("bar.nested")? == "asdf");
    ensure!(config.get_in("bar.more_nested.subkey")? == 2);
    ensure!(config.get_in("array_thing.some_prop")? == &serde_json::json!([1]));
    Ok(())
}

#[rstest]
#[case("true", true)]
#[case("off", false)]
#[case("1", true)]
#[serial]
fn boolean_variables_use_the_vocabulary(#[case] raw: &str, #[case] expected: bool) -> Result<()> {
    let _guard = env::set_var("SVC_VERBOSE", raw);
    let config = Config::builder(schemas::service())
        .source(EnvSource::new("SVC_"))
        .build()?;
    ensure!(config.get("VERBOSE")? == expected);
    Ok(())
}

#[test]
#[serial]
fn unset_variables_leave_defaults() -> Result<()> {
    let _guard = env::remove_var("SVC_PORT");
    let config = Config::builder(schemas::service())
        .source(EnvSource::new("SVC_"))
        .build()?;
    ensure!(config.get("PORT")? == 8080);
    Ok(())
}

#[test]
#[serial]
fn names_match_case_sensitively_and_values_keep_whitespace() -> Result<()> {
    let held = env::lock();
    let _wrong_case = held.set_var("app_port", "  9000  ");
    let _absent = held.remove_var("APP_port");
    let _name = held.set_var("APP_name", "  spaced  ");
    let schema = Schema::new(serde_json::json!({"properties": {
        "port": {"type": "integer"},
        "name": {"type": "string"}
    }}))?;
    let partial = EnvSource::new("APP_").load_config(&schema)?;
    ensure!(
        partial == serde_json::json!({"name": "  spaced  "}),
        "unexpected partial: {partial}"
    );
    Ok(())
}

#[test]
#[serial]
fn malformed_variable_is_a_coercion_error() {
    let _guard = env::set_var("SVC_PORT", "eighty");
    let err = Config::builder(schemas::service())
        .source(EnvSource::new("SVC_"))
        .build()
        .expect_err("PORT is not an integer");
    assert!(matches!(err.as_ref(), ConfigError::Coercion { path, .. } if path == "PORT"));
}

#[test]
fn jailed_environment_feeds_lists() -> Result<()> {
    let config = with_jail(|j| {
        j.set_env("JAIL_FEATURES", "metrics, tracing");
        j.set_env("JAIL_LOG_FILE", "/var/log/svc.log");
        Config::builder(schemas::service())
            .source(EnvSource::new("JAIL_"))
            .build()
            .map_err(jail_error)
    })?;
    ensure!(config.get("FEATURES")? == &serde_json::json!(["metrics", "tracing"]));
    ensure!(*config.get("LOG_FILE")? == "/var/log/svc.log");
    Ok(())
}
