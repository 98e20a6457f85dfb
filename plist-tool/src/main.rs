#![forbid(unsafe_code)]
mod app;
mod exporters;

use std::process::exit;

use tracing_subscriber::EnvFilter;

use app::{
    options::{get_command, Options},
    runtime::Config,
};

/// Log to standard error, honoring `RUST_LOG` when it is set
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    // Get args from command line
    let args = get_command().get_matches();
    // Create application options
    let options = Options::from_args(&args);

    // Create app state and start
    match options {
        Ok(options) => {
            init_tracing(options.verbose);
            if let Err(why) = Config::new(options).and_then(|app| app.start()) {
                eprintln!("{why}");
                exit(1);
            }
        }
        Err(why) => {
            eprintln!("{why}");
            exit(2);
        }
    }
}
