//! One attribute per line, each group on its own indented line.

use super::{Item, Renderer};
use crate::record::Record;

const INDENT: &str = "  ";
const GROUP_MARKER: &str = "🗁 ";

pub(super) fn render(renderer: &Renderer, record: &Record, items: &[Item], out: &mut String) {
    renderer.header(record, Some(INDENT), out);
    out.push('\n');

    // Open groups and whether their label line was already written.
    let mut open: Vec<(&str, bool)> = Vec::new();
    for item in items {
        match item {
            Item::Enter(name) => open.push((name.as_str(), false)),
            Item::Leave => {
                open.pop();
            }
            Item::Field(field) => {
                for (depth, (name, written)) in open.iter_mut().enumerate() {
                    if !*written {
                        indent(out, depth + 1);
                        out.push_str(GROUP_MARKER);
                        renderer.group(out, name);
                        out.push('\n');
                        *written = true;
                    }
                }
                let depth = open.len() + 1;
                indent(out, depth);
                renderer.key(out, &field.key);
                out.push_str(": ");
                let continuation = INDENT.repeat(depth + 1);
                renderer.value(out, field, Some(&continuation));
                out.push('\n');
            }
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
