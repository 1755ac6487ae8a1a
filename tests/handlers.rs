use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

use termlog::{
    Attr, BufferedHandler, HandleError, Handler, HandlerConfig, HandlerLayer, Level, MultiHandler,
    Record, ReplaceAttr, TerminalHandler, TerminalOptions, TerminalValue,
};

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().clone()).unwrap()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Closed;

impl Write for Closed {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn colored() -> TerminalOptions {
    TerminalOptions {
        force_color: true,
        ..Default::default()
    }
}

#[test]
fn child_group_label_does_not_leak_to_root() {
    let capture = Capture::default();
    let root = TerminalHandler::tree(capture.clone(), TerminalOptions::default());
    root.handle(&Record::new(Level::INFO, "start")).unwrap();
    let child = root.with_group("tx");
    child
        .handle(&Record::new(Level::INFO, "go").attr("id", "abc123"))
        .unwrap();
    root.handle(&Record::new(Level::INFO, "done")).unwrap();

    let out = capture.contents();
    assert_eq!(out.matches("🗁 tx").count(), 1);
    assert_eq!(out, "INFO  start\nINFO  go\n  🗁 tx\n    id: abc123\nINFO  done\n");
}

#[test]
fn terminal_value_keeps_only_safe_styling() {
    let value = || TerminalValue::new("\x1b[31mred\x1b[2J\x1b[0m");

    let capture = Capture::default();
    TerminalHandler::line(capture.clone(), colored())
        .handle(&Record::new(Level::INFO, "m").attr("v", value()))
        .unwrap();
    let out = capture.contents();
    assert!(out.contains("\x1b[31mred\x1b[0m"), "{out:?}");
    assert!(!out.contains("\x1b[2J"), "{out:?}");

    let capture = Capture::default();
    TerminalHandler::line(capture.clone(), TerminalOptions::default())
        .handle(&Record::new(Level::INFO, "m").attr("v", value()))
        .unwrap();
    assert_eq!(capture.contents(), "INFO  m [v: red]\n");
}

#[test]
fn null_byte_is_escaped_in_both_modes() {
    for options in [TerminalOptions::default(), colored()] {
        let capture = Capture::default();
        TerminalHandler::tree(capture.clone(), options)
            .handle(
                &Record::new(Level::INFO, "m")
                    .attr("plain", "a\0b")
                    .attr("styled", TerminalValue::new("c\0d")),
            )
            .unwrap();
        let out = capture.contents();
        assert!(out.contains("a\\x00b"), "{out:?}");
        assert!(out.contains("c\\x00d"), "{out:?}");
        assert!(!out.contains('\0'));
    }
}

#[test]
fn multi_handler_attempts_every_delegate() {
    let capture = Capture::default();
    let multi = MultiHandler::new(vec![
        Arc::new(TerminalHandler::line(Closed, TerminalOptions::default())),
        Arc::new(TerminalHandler::line(capture.clone(), TerminalOptions::default())),
    ]);

    let err = multi.handle(&Record::new(Level::INFO, "both")).unwrap_err();
    assert!(matches!(err, HandleError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    assert_eq!(capture.contents(), "INFO  both\n");
}

#[test]
fn buffered_output_appears_only_after_flush() {
    let capture = Capture::default();
    let inner = Arc::new(TerminalHandler::line(capture.clone(), TerminalOptions::default()));
    let buffered = BufferedHandler::new(inner);
    let tx = buffered.with_group("tx");

    buffered.handle(&Record::new(Level::INFO, "first")).unwrap();
    tx.handle(&Record::new(Level::WARN, "second").attr("n", 2i64))
        .unwrap();
    assert_eq!(capture.contents(), "");

    buffered.flush().unwrap();
    let flushed = "INFO  first\nWARN  second tx[n: 2]\n";
    assert_eq!(capture.contents(), flushed);

    buffered.handle(&Record::new(Level::INFO, "third")).unwrap();
    assert_eq!(capture.contents(), flushed);
    buffered.flush().unwrap();
    assert_eq!(capture.contents(), format!("{flushed}INFO  third\n"));
}

#[test]
fn buffered_multi_composes() {
    let first = Capture::default();
    let second = Capture::default();
    let multi = MultiHandler::new(vec![
        Arc::new(TerminalHandler::line(first.clone(), TerminalOptions::default())),
        Arc::new(TerminalHandler::tree(second.clone(), TerminalOptions::default())),
    ]);
    let buffered = BufferedHandler::new(Arc::new(multi));
    buffered
        .with_attrs(vec![Attr::new("app", "demo")])
        .handle(&Record::new(Level::ERROR, "boom"))
        .unwrap();
    buffered.flush().unwrap();

    assert_eq!(first.contents(), "ERROR boom [app: demo]\n");
    assert_eq!(second.contents(), "ERROR boom\n  app: demo\n");
}

#[test]
fn tracing_events_reach_configured_handler() {
    let capture = Capture::default();
    let handler = HandlerConfig::parse("terminal-tree", "debug")
        .unwrap()
        .build(capture.clone())
        .unwrap();
    let subscriber = Registry::default().with(HandlerLayer::new(handler));

    tracing::subscriber::with_default(subscriber, || {
        tracing::trace!("hidden");
        let span = tracing::debug_span!("job", name = "sync");
        let _guard = span.enter();
        tracing::debug!(step = 1, "running");
    });

    assert_eq!(
        capture.contents(),
        "DEBUG running\n  🗁 job\n    name: sync\n    step: 1\n"
    );
}

#[test]
fn replace_attr_redacts_through_tracing() {
    let capture = Capture::default();
    let replace: ReplaceAttr = Arc::new(|_groups: &[&str], attr: Attr| {
        if attr.key == "password" {
            Some(Attr::new("password", "[redacted]"))
        } else {
            Some(attr)
        }
    });
    let handler = Arc::new(TerminalHandler::line(
        capture.clone(),
        TerminalOptions {
            replace_attr: Some(replace),
            ..Default::default()
        },
    ));
    let subscriber = Registry::default().with(HandlerLayer::new(handler));

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(user = "bob", password = "hunter2", "login");
    });

    assert_eq!(
        capture.contents(),
        "INFO  login [user: bob, password: [redacted]]\n"
    );
}

#[test]
fn unknown_configuration_is_rejected() {
    assert!(HandlerConfig::parse("fancy", "info").is_err());
    assert!(HandlerConfig::parse("line", "verbose").is_err());
}

#[cfg(feature = "json")]
#[test]
fn json_handler_is_selectable_by_name() {
    let capture = Capture::default();
    let handler = HandlerConfig::parse("json", "info")
        .unwrap()
        .build(capture.clone())
        .unwrap();
    handler
        .with_group("req")
        .handle(&Record::new(Level::INFO, "ok").attr("v", TerminalValue::new("\x1b[1mbold\x1b[0m")))
        .unwrap();

    let line: serde_json::Value = serde_json::from_str(capture.contents().trim_end()).unwrap();
    assert_eq!(line["msg"], "ok");
    assert_eq!(line["level"], "INFO");
    assert_eq!(line["req"]["v"], "bold");
}
