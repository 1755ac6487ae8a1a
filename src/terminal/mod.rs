//! Human-readable handlers for interactive terminals.
//!
//! [`TerminalHandler`] renders records either as a tree (one attribute per
//! line, groups indented) or as a single line per record. Both layouts share
//! the flattening of accumulated state into [`Item`]s, the header, and the
//! sanitization rules for keys, messages and values.

mod line;
mod tree;

use crate::ansi::{self, Sgrs};
use crate::color::{ColorScheme, Palette};
use crate::handler::{HandleError, Handler, ReplaceAttr};
use crate::record::{level_label, Record};
use crate::state::HandlerState;
use crate::value::{Attr, Value};
use chrono::Local;
use parking_lot::Mutex;
use std::any::Any;
use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use tracing::Level;

/// How records are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Tree,
    Line,
}

/// Options for [`TerminalHandler`].
#[derive(Clone)]
pub struct TerminalOptions {
    /// Minimum level handled.
    pub level: Level,
    /// Append file, line and function of the call site when known.
    pub add_source: bool,
    /// `chrono` format string for the local time; `None` omits the time.
    pub time_layout: Option<String>,
    /// Emit colors even when the sink is not a terminal.
    pub force_color: bool,
    /// Never emit colors unless `force_color` is set.
    pub no_color: bool,
    pub color_scheme: ColorScheme,
    pub replace_attr: Option<ReplaceAttr>,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            add_source: false,
            time_layout: None,
            force_color: false,
            no_color: false,
            color_scheme: ColorScheme::default(),
            replace_attr: None,
        }
    }
}

impl fmt::Debug for TerminalOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalOptions")
            .field("level", &self.level)
            .field("add_source", &self.add_source)
            .field("time_layout", &self.time_layout)
            .field("force_color", &self.force_color)
            .field("no_color", &self.no_color)
            .field("color_scheme", &self.color_scheme)
            .field("replace_attr", &self.replace_attr.is_some())
            .finish()
    }
}

/// Renders records for people reading a terminal.
#[derive(Clone)]
pub struct TerminalHandler {
    layout: Layout,
    renderer: Arc<Renderer>,
    state: HandlerState,
}

impl TerminalHandler {
    /// Create a handler writing to `writer`.
    ///
    /// Colors are enabled when `force_color` is set, or when `no_color` is not
    /// set and `writer` is a standard stream or file attached to a terminal.
    pub fn new<W>(layout: Layout, writer: W, options: TerminalOptions) -> Self
    where
        W: Write + Send + 'static,
    {
        let color = options.force_color || (!options.no_color && is_terminal(&writer));
        TerminalHandler {
            layout,
            renderer: Arc::new(Renderer {
                writer: Mutex::new(Box::new(writer)),
                level: options.level,
                add_source: options.add_source,
                time_layout: options.time_layout,
                color,
                palette: Palette::from_scheme(&options.color_scheme),
                replace_attr: options.replace_attr,
            }),
            state: HandlerState::new(),
        }
    }

    pub fn tree<W>(writer: W, options: TerminalOptions) -> Self
    where
        W: Write + Send + 'static,
    {
        Self::new(Layout::Tree, writer, options)
    }

    pub fn line<W>(writer: W, options: TerminalOptions) -> Self
    where
        W: Write + Send + 'static,
    {
        Self::new(Layout::Line, writer, options)
    }

    /// Whether this handler emits color codes.
    pub fn color(&self) -> bool {
        self.renderer.color
    }

    /// Render `record` without writing it.
    pub fn render(&self, record: &Record) -> String {
        let items = self.renderer.collect(&self.state, record);
        let mut out = String::new();
        match self.layout {
            Layout::Tree => tree::render(&self.renderer, record, &items, &mut out),
            Layout::Line => line::render(&self.renderer, record, &items, &mut out),
        }
        out
    }
}

impl Handler for TerminalHandler {
    fn enabled(&self, level: Level) -> bool {
        level <= self.renderer.level
    }

    fn handle(&self, record: &Record) -> Result<(), HandleError> {
        let out = self.render(record);
        let mut writer = self.renderer.writer.lock();
        writer.write_all(out.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(TerminalHandler {
            state: self.state.with_attrs(attrs),
            ..self.clone()
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        Arc::new(TerminalHandler {
            state: self.state.with_group(name),
            ..self.clone()
        })
    }
}

fn is_terminal<W: Write + 'static>(writer: &W) -> bool {
    let writer = writer as &dyn Any;
    if let Some(stdout) = writer.downcast_ref::<io::Stdout>() {
        stdout.is_terminal()
    } else if let Some(stderr) = writer.downcast_ref::<io::Stderr>() {
        stderr.is_terminal()
    } else if let Some(file) = writer.downcast_ref::<File>() {
        file.is_terminal()
    } else {
        false
    }
}

const RESET: &str = "\x1b[0m";

/// Flattened view of the groups and attributes to render for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Item {
    /// A group opens; its label is shown only if a field follows inside it.
    Enter(String),
    Leave,
    Field(Field),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Field {
    pub key: String,
    pub value: String,
    /// The value came from a terminal representation and carries its own styling.
    pub styled: bool,
}

/// Settings and sink shared by every handler derived from one constructor call.
pub(crate) struct Renderer {
    writer: Mutex<Box<dyn Write + Send>>,
    level: Level,
    add_source: bool,
    time_layout: Option<String>,
    color: bool,
    palette: Palette,
    replace_attr: Option<ReplaceAttr>,
}

impl Renderer {
    fn collect(&self, state: &HandlerState, record: &Record) -> Vec<Item> {
        let mut items = Vec::new();
        let mut path = Vec::new();
        for scope in state.scopes_with(&record.attrs) {
            if let Some(group) = scope.group {
                let name = single_line(group);
                path.push(name.clone());
                items.push(Item::Enter(name));
            }
            for attr in scope.attrs {
                self.collect_attr(attr, &mut path, &mut items);
            }
        }
        items
    }

    fn collect_attr(&self, attr: &Attr, path: &mut Vec<String>, items: &mut Vec<Item>) {
        let (value, styled) = attr.value.resolve(self.color);
        if let Value::Group(members) = &value {
            if members.is_empty() {
                return;
            }
            let named = !attr.key.is_empty();
            if named {
                let name = single_line(&attr.key);
                path.push(name.clone());
                items.push(Item::Enter(name));
            }
            for member in members {
                self.collect_attr(member, path, items);
            }
            if named {
                path.pop();
                items.push(Item::Leave);
            }
            return;
        }

        let (key, value, styled) = match &self.replace_attr {
            Some(replace) => {
                let groups: Vec<&str> = path.iter().map(String::as_str).collect();
                let Some(replaced) = replace(groups.as_slice(), attr.clone()) else {
                    return;
                };
                let (value, styled) = replaced.value.resolve(self.color);
                (replaced.key, value, styled)
            }
            None => (attr.key.clone(), value, styled),
        };

        let text = value.to_string();
        let text = if styled {
            ansi::sanitize(&text)
        } else {
            ansi::strip(&text)
        };
        items.push(Item::Field(Field {
            key: single_line(&key),
            value: text.into_owned(),
            styled,
        }));
    }

    fn paint(&self, out: &mut String, style: &Sgrs, text: &str) {
        if self.color {
            style.paint(out, text);
        } else {
            out.push_str(text);
        }
    }

    /// Writes the time, level, message and source of a record.
    ///
    /// Newlines in the message continue with `continuation`, or are escaped
    /// when it is `None`.
    fn header(&self, record: &Record, continuation: Option<&str>, out: &mut String) {
        if let Some(layout) = &self.time_layout {
            let mut time = String::new();
            let local = record.time.with_timezone(&Local);
            if write!(time, "{}", local.format(layout)).is_err() {
                time.clear();
                time.push_str(&local.to_rfc3339());
            }
            self.paint(out, &self.palette.time, &time);
            out.push(' ');
        }

        self.paint(out, self.palette.level(record.level), level_label(record.level));
        out.push(' ');
        let message = breaks(&ansi::strip(&record.message), continuation);
        self.paint(out, self.palette.message(record.level), &message);

        if !self.add_source {
            return;
        }
        if let Some(source) = &record.source {
            out.push(' ');
            self.paint(out, &self.palette.file, &single_line(&source.file));
            if let Some(line) = source.line {
                out.push(':');
                self.paint(out, &self.palette.line, &line.to_string());
            }
            if let Some(function) = &source.function {
                out.push(' ');
                self.paint(out, &self.palette.function, &single_line(function));
            }
        }
    }

    fn key(&self, out: &mut String, key: &str) {
        self.paint(out, &self.palette.attr_key, key);
    }

    fn group(&self, out: &mut String, name: &str) {
        self.paint(out, &self.palette.group_name, name);
    }

    fn value(&self, out: &mut String, field: &Field, continuation: Option<&str>) {
        let text = breaks(&field.value, continuation);
        if field.styled {
            out.push_str(&text);
            if text.contains('\x1b') && !(text.ends_with(RESET) || text.ends_with("\x1b[m")) {
                out.push_str(RESET);
            }
        } else {
            self.paint(out, &self.palette.attr_value, &text);
        }
    }
}

/// Keys, group names and source fields never span lines, in either layout.
fn single_line(text: &str) -> String {
    breaks(&ansi::strip(text), None)
}

/// Indents continuation lines, or escapes newlines when `continuation` is `None`.
fn breaks(text: &str, continuation: Option<&str>) -> String {
    if !text.contains('\n') {
        return text.to_string();
    }
    match continuation {
        Some(indent) => text.replace('\n', &format!("\n{indent}")),
        None => text.replace('\n', "\\n"),
    }
}
