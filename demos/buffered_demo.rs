use std::io;
use std::sync::Arc;
use std::time::Instant;

use termlog::{
    BufferedHandler, Handler, Level, MultiHandler, Record, TerminalHandler, TerminalOptions,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let console = Arc::new(TerminalHandler::line(io::stdout(), TerminalOptions::default()));
    let verbose = Arc::new(TerminalHandler::tree(
        io::stderr(),
        TerminalOptions {
            level: Level::DEBUG,
            ..Default::default()
        },
    ));
    let multi = Arc::new(MultiHandler::new(vec![console, verbose]));
    let buffered = BufferedHandler::new(multi);

    let worker = buffered.with_group("worker");
    let n: u64 = 1_000;
    let start = Instant::now();
    for i in 0..n {
        let level = if i % 10 == 0 { Level::INFO } else { Level::DEBUG };
        if worker.enabled(level) {
            worker.handle(&Record::new(level, "step").attr("iteration", i))?;
        }
    }
    println!(
        "buffered {} records in {:?}, flushing",
        buffered.len(),
        start.elapsed()
    );

    buffered.flush()?;
    println!("flushed in {:?}, {} left", start.elapsed(), buffered.len());
    Ok(())
}
