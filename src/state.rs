use crate::value::Attr;
use std::sync::Arc;

#[derive(Debug)]
enum Entry {
    Group(String),
    Attrs(Vec<Attr>),
}

#[derive(Debug)]
struct Link {
    entry: Entry,
    parent: Option<Arc<Link>>,
}

/// Groups and attributes accumulated by `with_group` / `with_attrs` calls.
///
/// The state is an append-only linked list shared between derived handlers:
/// specializing allocates one new link pointing at the receiver's tail, so
/// the receiver and every sibling keep seeing exactly what they saw before.
#[derive(Debug, Clone, Default)]
pub struct HandlerState {
    tail: Option<Arc<Link>>,
}

/// One nesting level: the group that opened it (none for the root) and the
/// attributes attached at that level, in insertion order.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    pub group: Option<&'a str>,
    pub attrs: Vec<&'a Attr>,
}

impl HandlerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a group. An empty name leaves the state unchanged.
    pub fn with_group(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        self.push(Entry::Group(name.to_string()))
    }

    /// Adds attributes to the innermost open group.
    pub fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        if attrs.is_empty() {
            return self.clone();
        }
        self.push(Entry::Attrs(attrs))
    }

    fn push(&self, entry: Entry) -> Self {
        HandlerState {
            tail: Some(Arc::new(Link {
                entry,
                parent: self.tail.clone(),
            })),
        }
    }

    fn entries(&self) -> Vec<&Entry> {
        let mut entries = Vec::new();
        let mut cursor = self.tail.as_deref();
        while let Some(link) = cursor {
            entries.push(&link.entry);
            cursor = link.parent.as_deref();
        }
        entries.reverse();
        entries
    }

    /// Open group names from the outermost to the innermost.
    pub fn groups(&self) -> Vec<&str> {
        self.entries()
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Group(name) => Some(name.as_str()),
                Entry::Attrs(_) => None,
            })
            .collect()
    }

    /// Nesting levels from the root, always starting with the root level.
    pub fn scopes(&self) -> Vec<Scope<'_>> {
        let mut scopes = vec![Scope {
            group: None,
            attrs: Vec::new(),
        }];
        for entry in self.entries() {
            match entry {
                Entry::Group(name) => scopes.push(Scope {
                    group: Some(name.as_str()),
                    attrs: Vec::new(),
                }),
                Entry::Attrs(attrs) => {
                    if let Some(scope) = scopes.last_mut() {
                        scope.attrs.extend(attrs.iter());
                    }
                }
            }
        }
        scopes
    }

    /// Nesting levels with a record's own attributes appended to the innermost one.
    pub fn scopes_with<'a>(&'a self, record_attrs: &'a [Attr]) -> Vec<Scope<'a>> {
        let mut scopes = self.scopes();
        if let Some(scope) = scopes.last_mut() {
            scope.attrs.extend(record_attrs.iter());
        }
        scopes
    }
}
