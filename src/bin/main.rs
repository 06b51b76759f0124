use catalog_tree::{cli, config, telemetry};

fn main() {
    let cli = cli::parse_from(std::env::args_os());

    let telemetry_guard = init_tracing(cli.verbose);

    if let Err(e) = cli::run(cli) {
        tracing::error!("error: {}", e);
        // exit skips destructors; flush the file writer first.
        drop(telemetry_guard);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) -> telemetry::TelemetryGuard {
    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("config load failed, using defaults: {err}");
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    };
    let telemetry_cfg = telemetry::TelemetryConfig::new(verbose, cfg.logging);
    telemetry::init(telemetry_cfg)
}
