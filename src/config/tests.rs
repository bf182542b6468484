use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_point_at_local_redis_database_one() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.broker.backend, BrokerBackend::Redis);
    assert_eq!(settings.broker.url, "redis://localhost:6379/1");
    assert!(settings.pubsub.enabled);
    assert_eq!(settings.pubsub.channel, "todo");
    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert!(settings.database.url.is_none());
}

#[test]
fn blank_channel_is_rejected() {
    let mut raw = RawSettings::default();
    raw.pubsub.channel = Some("   ".to_string());

    let err = Settings::from_raw(raw).expect_err("blank channel");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "pubsub.channel",
            ..
        }
    ));
}

#[test]
fn non_redis_url_is_rejected_for_redis_backend() {
    let mut raw = RawSettings::default();
    raw.broker.url = Some("http://localhost:6379".to_string());

    let err = Settings::from_raw(raw).expect_err("bad url");
    assert!(matches!(err, LoadError::Invalid { key: "broker.url", .. }));
}

#[test]
fn memory_backend_ignores_url_scheme() {
    let mut raw = RawSettings::default();
    raw.broker.backend = Some(BrokerBackend::Memory);
    raw.broker.url = Some("unused".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.broker.backend, BrokerBackend::Memory);
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn unknown_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());

    let err = Settings::from_raw(raw).expect_err("bad level");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "logging.level",
            ..
        }
    ));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["todo-service"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "todo-service",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--database-url",
        "postgres://override",
        "--broker-backend",
        "memory",
        "--pubsub-channel",
        "todo-changes",
        "--pubsub-enabled",
        "false",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.database_url.as_deref(),
                Some("postgres://override")
            );
            assert_eq!(serve.overrides.broker_backend, Some(BrokerBackend::Memory));
            assert_eq!(
                serve.overrides.pubsub_channel.as_deref(),
                Some("todo-changes")
            );
            assert_eq!(serve.overrides.pubsub_enabled, Some(false));
        }
    }
}
