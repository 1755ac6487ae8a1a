use std::io;
use std::time::Duration;

use tracing::{info, info_span, warn};

use termlog::env::config_from_env;
use termlog::init::init_logging_with_config;
use termlog::{Attr, Handler, Level, Record, TerminalHandler, TerminalOptions, TerminalValue};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handlers used directly, with values that bring their own colors.
    let direct = TerminalHandler::tree(
        io::stderr(),
        TerminalOptions {
            level: Level::DEBUG,
            add_source: true,
            ..Default::default()
        },
    );
    let request = direct
        .with_group("request")
        .with_attrs(vec![Attr::new("method", "GET"), Attr::new("path", "/users")]);
    request.handle(
        &Record::new(Level::INFO, "served")
            .attr("status", TerminalValue::new("\x1b[32m200 OK\x1b[0m"))
            .attr("elapsed", Duration::from_millis(12))
            .attr("injected", "\x1b[2J screen stays intact"),
    )?;

    // The same handlers behind `tracing`, selected through TERMLOG_* variables.
    let config = config_from_env()?;
    init_logging_with_config(&config, io::stderr())?;

    info!("starting");
    {
        let span = info_span!("tx", id = "abc123");
        let _guard = span.enter();
        info!(rows = 3, "committed");
        warn!(detail = "line one\nline two", "slow commit");
    }
    info!("done");
    Ok(())
}
