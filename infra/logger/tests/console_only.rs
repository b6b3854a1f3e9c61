use razed_logger::{LevelFilter, Logger, parse_level};

#[test]
fn init_console_only_has_no_guard() {
    let logger = Logger::builder()
        .name("razed-console-only")
        .console(true)
        .level(parse_level("debug").expect("valid level"))
        .env_filter("razed_progression=trace,info")
        .init()
        .expect("logger should initialize");

    assert!(logger.guard().is_none(), "console-only logger should not create a file guard");
    assert_eq!(parse_level("info").unwrap(), LevelFilter::INFO);
}
