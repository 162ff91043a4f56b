//! Config file to running dashboard

use std::io::Write;

use groflow_config::{ConfigError, GroflowConfig};
use groflow_engine::groflow_types::{Money, TrustPoints, View};
use groflow_engine::{App, AppOptions};
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn app_from(config: &GroflowConfig) -> App {
    App::new(AppOptions {
        seed: config.session_seed().unwrap(),
        gateway: config.gateway(),
        api_key: config.api_key(),
        start_view: config.start_view(),
        high_contrast: config.high_contrast(),
    })
}

#[test]
fn configured_session_reaches_the_dashboard() {
    let file = write_config(
        r#"
[app]
start_view = "investor"
high_contrast = true

[google]
model = "gemini-2.0-flash"
base_url = "http://127.0.0.1:8089"

[session]
starting_trust_points = 40
investor_liquidity = 800
demo_campaigns = false
"#,
    );
    let config = GroflowConfig::load_from(file.path()).unwrap().unwrap();
    let app = app_from(&config);

    assert_eq!(app.view(), View::Investor);
    assert!(app.high_contrast());
    assert!(!app.has_api_key());
    assert_eq!(app.gateway().model, "gemini-2.0-flash");
    assert_eq!(app.session().ledger().balance(), TrustPoints::new(40));
    assert_eq!(app.session().pool().liquidity(), Money::from_units(800));
    assert!(app.session().campaigns().is_empty());
}

#[test]
fn key_from_environment_is_held_masked() {
    unsafe {
        std::env::set_var("GROFLOW_SUITE_GEMINI_KEY", "AIzaSuiteSecretab12");
    }
    let file = write_config("[google]\napi_key = \"${GROFLOW_SUITE_GEMINI_KEY}\"\n");
    let config = GroflowConfig::load_from(file.path()).unwrap().unwrap();
    let app = app_from(&config);

    assert!(app.has_api_key());
    let masked = app.masked_api_key().unwrap();
    assert!(masked.ends_with("ab12"));
    assert!(!masked.contains("Secret"));
    assert!(!format!("{config:?}").contains("AIzaSuiteSecretab12"));
}

#[test]
fn missing_file_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = GroflowConfig::load_from(&dir.path().join("config.toml")).unwrap();
    assert!(loaded.is_none());

    let app = app_from(&GroflowConfig::default());
    assert_eq!(app.view(), View::Home);
    assert_eq!(app.session().campaigns().len(), 4);
}

#[test]
fn unknown_sections_and_bad_ranges_are_rejected() {
    let file = write_config("[gui]\ntheme = \"dark\"\n");
    assert!(matches!(
        GroflowConfig::load_from(file.path()),
        Err(ConfigError::Parse { .. })
    ));

    let file = write_config("[session]\nmin_investment = 900\nmax_investment = 100\n");
    let config = GroflowConfig::load_from(file.path()).unwrap().unwrap();
    assert!(matches!(
        config.session_seed(),
        Err(ConfigError::Invalid {
            field: "session.min_investment",
            ..
        })
    ));
}
