mod harness;

use pricewatch::error::{ConfigError, Error};
use pricewatch::infrastructure::{App, Config};

use harness::config::{write_config, STUB_ONLY};

#[test]
fn loads_config_from_file() {
    let file = write_config(STUB_ONLY);
    let config = Config::load(file.path()).unwrap();

    assert!(config.sources.stub.enabled);
    assert!(!config.aggregator.fallback);
    assert_eq!(config.checker.interval_secs, 90);
}

#[test]
fn load_reports_validation_errors() {
    let file = write_config(
        r#"
        [[sources.http]]
        name = "shop"
        url = "https://shop.test/search"
        "#,
    );

    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidValue {
            field: "sources.http.url",
            ..
        })
    ));
    assert!(err.to_string().contains("{query}"));
}

#[test]
fn load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
}

#[cfg(feature = "telegram")]
#[tokio::test]
async fn telegram_requires_token_at_startup() {
    std::env::remove_var("TELEGRAM_BOT_TOKEN");
    let config = Config::parse_toml("[telegram]\nenabled = true").unwrap();

    let result = App::build(config).run_until(async {}).await;

    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::MissingField {
            field: "TELEGRAM_BOT_TOKEN"
        }))
    ));
}

#[tokio::test]
async fn app_search_respects_disabled_fallback() {
    let config = Config::parse_toml(
        r#"
        [aggregator]
        fallback = false

        [sources.stub]
        enabled = false
        "#,
    )
    .unwrap();

    let aggregation = App::build(config).search("iphone").await;

    assert!(aggregation.offers.is_empty());
    assert!(!aggregation.degraded);
}
