use clap::{App, Arg};
use smolblog::build::build_site;
use smolblog::config::Config;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = App::new("smolblog")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::with_name("config")
                .help("The directive file describing the site")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Logs every post and page"),
        )
        .get_matches();

    init_logging(matches.is_present("verbose"));

    if let Err(e) = run(Path::new(matches.value_of("config").unwrap_or_default())) {
        eprintln!("{}", error_chain(e.as_ref()));
        std::process::exit(1);
    }
}

fn run(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_file(config_path)?;
    tracing::info!(
        source = %config.source_directory.display(),
        target = %config.target_directory.display(),
        identity = ?config.identity,
        "loaded config"
    );
    build_site(&config)?;
    tracing::info!("site built");
    Ok(())
}

// `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// Appends each cause unless its text already appears in the message.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message = format!("{}: {}", message, text);
        }
        source = cause.source();
    }
    message
}
