use wikigit::{cli, config, telemetry};

fn main() {
    let cli = cli::parse_from(std::env::args_os());

    let filter = config::load().ok().and_then(|cfg| cfg.logging.filter);
    telemetry::init(cli.verbose, cli.quiet, filter.as_deref());

    if let Err(e) = cli::run(cli) {
        tracing::error!("error: {e}");
        std::process::exit(1);
    }
}
