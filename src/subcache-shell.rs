//! Interactive shell for exploring incremental subtree caches.
//!
//! Builds a random tree, then reads single-letter commands from stdin to
//! insert nodes, attach or detach caches, and collect the ordered ids while
//! showing which caches were rebuilt. Logs go to stderr.

use anyhow::Result;
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod shell;

use shell::{parse_args, print_help, Session, ShellSettings};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    let settings_path = options.config_path.clone().or_else(ShellSettings::default_path);
    let mut settings = ShellSettings::load(settings_path.as_deref());
    settings.apply(&options);

    init_tracing(&settings.log_filter);
    info!(?settings_path, ?settings, "starting shell");

    let stdout = io::stdout();
    let mut session = Session::new(&settings, stdout.lock());
    session.run(io::stdin().lock())
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
