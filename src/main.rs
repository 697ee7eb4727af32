use anyhow::Result;
use clap::{crate_version, App, Arg};
use ghostlib::build::build_site;
use ghostlib::config::Config;
use std::path::PathBuf;

fn main() -> Result<()> {
    let matches = App::new("ghostlib")
        .version(crate_version!())
        .about("Builds an HTML archive from a directory of Markdown stories")
        .arg(
            Arg::with_name("PROJECT")
                .help("The project directory (holds stories/, templates/, static/)")
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("Overrides the output directory"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Increases log verbosity (-v, -vv, -vvv)"),
        )
        .get_matches();

    init_tracing(matches.occurrences_of("verbose"));

    let project = PathBuf::from(matches.value_of("PROJECT").unwrap_or("."));
    let mut config = Config::from_directory(&project)?;
    if let Some(output) = matches.value_of("output") {
        config.output_directory = PathBuf::from(output);
    }

    build_site(&config)?;
    Ok(())
}

fn init_tracing(verbose: u64) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::new(filter_directives(verbose, rust_log)))
        .init();
}

/// `RUST_LOG` wins when set; otherwise each `-v` raises the level one step
/// from `warn`.
fn filter_directives(verbose: u64, rust_log: Option<String>) -> String {
    match rust_log {
        Some(directives) if !directives.trim().is_empty() => directives,
        _ => match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
        .to_owned(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!("warn", filter_directives(0, None));
        assert_eq!("info", filter_directives(1, None));
        assert_eq!("debug", filter_directives(2, None));
        assert_eq!("trace", filter_directives(5, None));
    }

    #[test]
    fn test_rust_log_overrides_verbosity() {
        let rust_log = Some(String::from("ghostlib=trace"));
        assert_eq!("ghostlib=trace", filter_directives(0, rust_log.clone()));
        assert_eq!("ghostlib=trace", filter_directives(3, rust_log));
        assert_eq!("info", filter_directives(1, Some(String::from("  "))));
    }
}
