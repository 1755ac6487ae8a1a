//! The whole record on one physical line.

use super::{Item, Renderer};
use crate::record::Record;

pub(super) fn render(renderer: &Renderer, record: &Record, items: &[Item], out: &mut String) {
    renderer.header(record, None, out);

    let mut path: Vec<&str> = Vec::new();
    // Label of the bracketed chunk currently open, if any.
    let mut chunk: Option<String> = None;
    for item in items {
        match item {
            Item::Enter(name) => path.push(name),
            Item::Leave => {
                path.pop();
            }
            Item::Field(field) => {
                let label = path.join(".");
                if chunk.as_deref() == Some(label.as_str()) {
                    out.push_str(", ");
                } else {
                    if chunk.is_some() {
                        out.push(']');
                    }
                    out.push(' ');
                    if !label.is_empty() {
                        renderer.group(out, &label);
                    }
                    out.push('[');
                    chunk = Some(label);
                }
                renderer.key(out, &field.key);
                out.push_str(": ");
                renderer.value(out, field, None);
            }
        }
    }
    if chunk.is_some() {
        out.push(']');
    }
    out.push('\n');
}
