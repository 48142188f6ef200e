use log::LevelFilter;

/// Info by default, `RUST_LOG` wins when set.
pub fn setup_logger() {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
}
