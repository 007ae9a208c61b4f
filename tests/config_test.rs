use kerf::application::services::{DEFAULT_OUTPUT_FORMAT, ScratchSpace};
use kerf::infrastructure::observability::TracingConfig;
use kerf::presentation::config::{AudioSettings, Environment, LoggingSettings, Settings};

#[test]
fn given_known_names_when_parsing_environment_then_variant_matches() {
    assert_eq!(Environment::try_from("local".to_string()).unwrap(), Environment::Local);
    assert_eq!(Environment::try_from(" TEST ".to_string()).unwrap(), Environment::Test);
    assert_eq!(Environment::try_from("production".to_string()).unwrap(), Environment::Prod);
    assert_eq!(Environment::Prod.to_string(), "prod");
}

#[test]
fn given_unknown_name_when_parsing_environment_then_error_lists_choices() {
    let err = Environment::try_from("staging".to_string()).unwrap_err();
    assert!(err.contains("staging"));
    assert!(err.contains("local, test, or prod"));
}

#[test]
fn given_default_audio_settings_when_built_then_matches_executor_defaults() {
    let audio = AudioSettings::default();
    assert_eq!(audio.ffmpeg_path, "ffmpeg");
    assert_eq!(audio.default_format, DEFAULT_OUTPUT_FORMAT);
    assert_eq!(audio.segment_concurrency, 1);
    assert!(audio.scratch_dir.is_none());
}

#[test]
fn given_logging_settings_when_building_tracing_config_then_level_leads_filter() {
    let logging = LoggingSettings {
        level: "warn".to_string(),
        json: true,
    };

    let config = TracingConfig::from_settings(&logging, Environment::Prod);

    assert!(config.json_format);
    assert_eq!(config.environment, "prod");
    assert!(config.default_filter.starts_with("warn,"));
    assert!(config.default_filter.contains("kerf=debug"));
}

#[test]
fn given_scratch_root_when_acquiring_then_file_lives_there_with_format_suffix() {
    let dir = tempfile::TempDir::new().unwrap();
    let scratch = ScratchSpace::new(Some(dir.path().join("work")));

    let file = scratch.acquire("mp3").unwrap();

    assert!(file.path().starts_with(dir.path().join("work")));
    assert_eq!(file.path().extension().unwrap(), "mp3");

    let path = file.path().to_path_buf();
    drop(file);
    assert!(!path.exists());
}

#[test]
fn given_hostile_format_when_acquiring_then_suffix_is_sanitized() {
    let scratch = ScratchSpace::default();

    let file = scratch.acquire("../../etc/passwd").unwrap();

    assert_eq!(file.path().parent(), Some(std::env::temp_dir().as_path()));
    assert_eq!(file.path().extension().unwrap(), "etcpasswd");
}

#[test]
fn given_installed_subscriber_when_initializing_again_then_returns_error() {
    let config = TracingConfig::default();

    let _ = kerf::infrastructure::observability::init_tracing(&config);

    assert!(kerf::infrastructure::observability::init_tracing(&config).is_err());
}

#[test]
fn given_no_settings_file_when_loading_then_defaults_apply() {
    let settings = Settings::load(Environment::Test).unwrap();

    assert_eq!(settings.server.port, 9080);
    assert_eq!(settings.service_name, "Pydub");
    assert!(settings.storage.url.is_none());
    assert_eq!(settings.logging.level, "info");
}
