//! Plain JSON lines, one object per record.
//!
//! Values always use their plain representation, so text that carries SGR
//! codes for terminals (see [`crate::value::TerminalValue`]) is written
//! without them.

use crate::handler::{HandleError, Handler, ReplaceAttr};
use crate::record::Record;
use crate::state::{HandlerState, Scope};
use crate::value::{Attr, Value};
use chrono::SecondsFormat;
use parking_lot::Mutex;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::Level;

/// Options for [`JsonHandler`].
#[derive(Clone)]
pub struct JsonOptions {
    pub level: Level,
    pub add_source: bool,
    pub replace_attr: Option<ReplaceAttr>,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            add_source: false,
            replace_attr: None,
        }
    }
}

impl fmt::Debug for JsonOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonOptions")
            .field("level", &self.level)
            .field("add_source", &self.add_source)
            .field("replace_attr", &self.replace_attr.is_some())
            .finish()
    }
}

struct Shared {
    writer: Mutex<Box<dyn Write + Send>>,
    options: JsonOptions,
}

/// Writes each record as a single JSON object followed by a newline.
#[derive(Clone)]
pub struct JsonHandler {
    shared: Arc<Shared>,
    state: HandlerState,
}

impl JsonHandler {
    pub fn new<W>(writer: W, options: JsonOptions) -> Self
    where
        W: Write + Send + 'static,
    {
        JsonHandler {
            shared: Arc::new(Shared {
                writer: Mutex::new(Box::new(writer)),
                options,
            }),
            state: HandlerState::new(),
        }
    }
}

impl Handler for JsonHandler {
    fn enabled(&self, level: Level) -> bool {
        level <= self.shared.options.level
    }

    fn handle(&self, record: &Record) -> Result<(), HandleError> {
        let scopes = self.state.scopes_with(&record.attrs);
        let mut line = serde_json::to_vec(&JsonRecord {
            options: &self.shared.options,
            record,
            scopes: &scopes,
        })
        .map_err(io::Error::from)?;
        line.push(b'\n');

        let mut writer = self.shared.writer.lock();
        writer.write_all(&line)?;
        writer.flush()?;
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(JsonHandler {
            state: self.state.with_attrs(attrs),
            ..self.clone()
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        Arc::new(JsonHandler {
            state: self.state.with_group(name),
            ..self.clone()
        })
    }
}

struct JsonRecord<'a> {
    options: &'a JsonOptions,
    record: &'a Record,
    scopes: &'a [Scope<'a>],
}

impl Serialize for JsonRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = self.record;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(
            "time",
            &record.time.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        )?;
        map.serialize_entry("level", record.level.as_str())?;
        map.serialize_entry("msg", &record.message)?;
        if self.options.add_source {
            if let Some(source) = &record.source {
                map.serialize_entry(
                    "source",
                    &JsonSource {
                        file: &source.file,
                        line: source.line,
                        function: source.function.as_deref(),
                    },
                )?;
            }
        }
        Nested {
            options: self.options,
            scopes: self.scopes,
            path: Vec::new(),
        }
        .write_entries(&mut map)?;
        map.end()
    }
}

#[derive(Serialize)]
struct JsonSource<'a> {
    file: &'a str,
    line: Option<u32>,
    function: Option<&'a str>,
}

/// The attributes of `scopes[0]`, followed by the deeper scopes as one nested object.
struct Nested<'a> {
    options: &'a JsonOptions,
    scopes: &'a [Scope<'a>],
    path: Vec<String>,
}

impl Nested<'_> {
    fn write_entries<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        let Some((scope, deeper)) = self.scopes.split_first() else {
            return Ok(());
        };
        for attr in &scope.attrs {
            write_attr(self.options, attr, &self.path, map)?;
        }
        if let Some(group) = deeper.first().and_then(|s| s.group) {
            if has_content(deeper) {
                let mut path = self.path.clone();
                path.push(group.to_string());
                map.serialize_entry(
                    group,
                    &Nested {
                        options: self.options,
                        scopes: deeper,
                        path,
                    },
                )?;
            }
        }
        Ok(())
    }
}

impl Serialize for Nested<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        self.write_entries(&mut map)?;
        map.end()
    }
}

struct GroupValue<'a> {
    options: &'a JsonOptions,
    members: &'a [Attr],
    path: Vec<String>,
}

impl Serialize for GroupValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.members.len()))?;
        for member in self.members {
            write_attr(self.options, member, &self.path, &mut map)?;
        }
        map.end()
    }
}

fn write_attr<M: SerializeMap>(
    options: &JsonOptions,
    attr: &Attr,
    path: &[String],
    map: &mut M,
) -> Result<(), M::Error> {
    let (value, _) = attr.value.resolve(false);
    if let Value::Group(members) = &value {
        if members.is_empty() {
            return Ok(());
        }
        if attr.key.is_empty() {
            for member in members {
                write_attr(options, member, path, map)?;
            }
            return Ok(());
        }
        let mut nested = path.to_vec();
        nested.push(attr.key.clone());
        return map.serialize_entry(
            &attr.key,
            &GroupValue {
                options,
                members,
                path: nested,
            },
        );
    }

    match &options.replace_attr {
        Some(replace) => {
            let groups: Vec<&str> = path.iter().map(String::as_str).collect();
            match replace(groups.as_slice(), attr.clone()) {
                Some(replaced) => map.serialize_entry(&replaced.key, &replaced.value),
                None => Ok(()),
            }
        }
        None => map.serialize_entry(&attr.key, &value),
    }
}

fn has_content(scopes: &[Scope<'_>]) -> bool {
    scopes
        .iter()
        .any(|scope| scope.attrs.iter().any(|attr| !attr.is_empty_group()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Source;
    use crate::terminal::tests::Capture;
    use crate::value::TerminalValue;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn json_handler(options: JsonOptions) -> (JsonHandler, Capture) {
        let capture = Capture::default();
        (JsonHandler::new(capture.clone(), options), capture)
    }

    fn record(message: &str) -> Record {
        Record::new(Level::INFO, message)
            .with_time(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap())
    }

    fn lines(capture: &Capture) -> Vec<serde_json::Value> {
        capture
            .contents()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn record_fields_and_nested_groups() {
        let (root, capture) = json_handler(JsonOptions::default());
        root.with_attrs(vec![Attr::new("app", "api")])
            .with_group("req")
            .with_attrs(vec![Attr::new("method", "GET")])
            .with_group("db")
            .handle(&record("query").attr("rows", 3i64))
            .unwrap();

        assert_eq!(
            lines(&capture),
            [json!({
                "time": "2024-06-15T12:00:00Z",
                "level": "INFO",
                "msg": "query",
                "app": "api",
                "req": {"method": "GET", "db": {"rows": 3}},
            })]
        );
    }

    #[test]
    fn empty_groups_are_omitted() {
        let (root, capture) = json_handler(JsonOptions::default());
        root.with_group("empty")
            .handle(&record("m").with_attrs(vec![Attr::group("g", Vec::new())]))
            .unwrap();
        assert_eq!(
            lines(&capture),
            [json!({"time": "2024-06-15T12:00:00Z", "level": "INFO", "msg": "m"})]
        );
    }

    #[test]
    fn terminal_values_use_plain_text() {
        let (root, capture) = json_handler(JsonOptions::default());
        root.handle(&record("m").attr("v", TerminalValue::new("\x1b[31mred text\x1b[0m")))
            .unwrap();
        let out = capture.contents();
        assert!(out.contains("red text"));
        assert!(!out.contains("\\u001b[31m"));
    }

    #[test]
    fn source_and_replace_attr() {
        let replace: ReplaceAttr = Arc::new(|_groups: &[&str], attr: Attr| {
            (attr.key != "secret").then_some(attr)
        });
        let (root, capture) = json_handler(JsonOptions {
            add_source: true,
            replace_attr: Some(replace),
            ..Default::default()
        });
        root.handle(
            &record("m")
                .attr("secret", "x")
                .attr("user", "bob")
                .with_source(Source {
                    file: "main.rs".to_string(),
                    line: Some(3),
                    function: None,
                }),
        )
        .unwrap();
        assert_eq!(
            lines(&capture),
            [json!({
                "time": "2024-06-15T12:00:00Z",
                "level": "INFO",
                "msg": "m",
                "source": {"file": "main.rs", "line": 3, "function": null},
                "user": "bob",
            })]
        );
    }
}
