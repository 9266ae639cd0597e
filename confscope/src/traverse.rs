//! Flattening of configuration schemas into terminal field descriptors.
//!
//! Composite fields are never emitted; the engine recurses into them and
//! prefixes each descendant with the composite's qualified path. The result
//! is a depth-first, declaration-order list of leaf and array descriptors.
//!
//! Root layouts are cached process-wide by [`TypeId`]. Types do not change
//! shape at runtime, so entries are never evicted or rebuilt.

use std::{
    any::TypeId,
    sync::{Arc, OnceLock},
};

use dashmap::{mapref::entry::Entry, DashMap};
use serde::Serialize;
use tracing::debug;

use crate::{
    error::{Error, Result},
    field::{FieldClass, FieldKind},
    schema::{colloquial_type_name, TypeSchema},
    Configuration,
};

/// A terminal (leaf or array) field in a flattened layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    name: &'static str,
    declared_type: String,
    class: FieldClass,
    path: String,
    secret: bool,
    #[serde(skip)]
    route: Vec<usize>,
}

impl FieldDescriptor {
    /// The field's own name (last path segment).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Colloquial name of the declared type.
    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    /// [`FieldClass::Leaf`] or [`FieldClass::Array`].
    pub fn class(&self) -> FieldClass {
        self.class
    }

    /// Dotted path from the root, e.g. `Credentials.Password`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the field carries a secret marker.
    pub fn is_secret(&self) -> bool {
        self.secret
    }

    /// Field indices from the root down to this field.
    pub(crate) fn route(&self) -> &[usize] {
        &self.route
    }
}

/// Joins a parent path and a field name.
pub fn qualify(parent_path: &str, name: &str) -> String {
    if parent_path.is_empty() {
        name.to_string()
    } else {
        format!("{parent_path}.{name}")
    }
}

/// Flattens `schema` into its terminal fields, with paths rooted at `parent_path`.
///
/// Fails with [`Error::CyclicTypeGraph`] when a composite type is reached
/// again while it is still being expanded.
pub fn enumerate_fields(schema: &TypeSchema, parent_path: &str) -> Result<Vec<FieldDescriptor>> {
    let mut descriptors = Vec::new();
    let mut expanding = vec![schema.type_id()];
    expand(
        schema,
        parent_path,
        &[],
        &mut expanding,
        &mut descriptors,
    )?;
    Ok(descriptors)
}

fn expand(
    schema: &TypeSchema,
    parent_path: &str,
    parent_route: &[usize],
    expanding: &mut Vec<TypeId>,
    out: &mut Vec<FieldDescriptor>,
) -> Result<()> {
    for field in schema.fields() {
        let path = qualify(parent_path, field.name());
        let mut route = Vec::with_capacity(parent_route.len() + 1);
        route.extend_from_slice(parent_route);
        route.push(field.index());

        match field.kind() {
            FieldKind::Composite(nested) => {
                let nested = nested();
                if expanding.contains(&nested.type_id()) {
                    debug!(
                        type_name = nested.name(),
                        path = %path,
                        "cyclic configuration type graph"
                    );
                    return Err(Error::CyclicTypeGraph {
                        type_name: nested.name().to_string(),
                        path,
                    });
                }
                expanding.push(nested.type_id());
                expand(&nested, &path, &route, expanding, out)?;
                expanding.pop();
            }
            kind => out.push(FieldDescriptor {
                name: field.name(),
                declared_type: colloquial_type_name(field.declared_type()),
                class: kind.class(),
                path,
                secret: field.is_secret(),
                route,
            }),
        }
    }
    Ok(())
}

type Layout = Arc<[FieldDescriptor]>;

static LAYOUTS: OnceLock<DashMap<TypeId, Layout>> = OnceLock::new();

/// Terminal fields of `T`, rooted at the empty path.
///
/// The first call for a type builds and caches the layout; later calls share it.
pub fn terminal_fields<T: Configuration>() -> Result<Arc<[FieldDescriptor]>> {
    cached_layout(TypeId::of::<T>(), T::schema)
}

/// Terminal fields of the concrete type behind `value`.
pub(crate) fn layout_of(value: &dyn Configuration) -> Result<Layout> {
    cached_layout(value.type_identity(), || value.describe())
}

fn cached_layout(type_id: TypeId, schema: impl FnOnce() -> TypeSchema) -> Result<Layout> {
    cached_layout_in(LAYOUTS.get_or_init(DashMap::new), type_id, schema)
}

fn cached_layout_in(
    layouts: &DashMap<TypeId, Layout>,
    type_id: TypeId,
    schema: impl FnOnce() -> TypeSchema,
) -> Result<Layout> {
    if let Some(layout) = layouts.get(&type_id) {
        return Ok(Arc::clone(layout.value()));
    }

    // Built outside the map so concurrent first callers never block each
    // other; whichever insert lands first is kept.
    let schema = schema();
    let built: Layout = enumerate_fields(&schema, "")?.into();
    let layout = match layouts.entry(type_id) {
        Entry::Occupied(existing) => Arc::clone(existing.get()),
        Entry::Vacant(slot) => {
            debug!(
                type_name = schema.name(),
                fields = built.len(),
                "cached configuration layout"
            );
            Arc::clone(slot.insert(built).value())
        }
    };
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use std::{
        any::TypeId,
        io::{self, Write},
        sync::{Arc, Mutex},
    };

    use dashmap::DashMap;

    use super::{cached_layout_in, enumerate_fields, qualify, terminal_fields, Layout};
    use crate::{error::Error, field::FieldClass, Configuration};

    struct BufWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for BufWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Runs `f` with a debug-level subscriber and returns what it logged.
    fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer = Arc::clone(&buffer);
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || BufWriter(Arc::clone(&writer)))
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        let output = String::from_utf8_lossy(&buffer.lock().unwrap()).into_owned();
        (result, output)
    }

    #[derive(Clone, crate::Configuration)]
    #[cfg_attr(feature = "slog", derive(serde::Serialize))]
    #[config(rename_all = "PascalCase")]
    struct Credentials {
        username: String,
        #[config(secret)]
        password: String,
    }

    #[derive(Clone, crate::Configuration)]
    #[cfg_attr(feature = "slog", derive(serde::Serialize))]
    #[config(rename_all = "PascalCase")]
    struct Options {
        name: String,
        port: u16,
        credentials: Credentials,
        tags: Vec<String>,
    }

    #[derive(Clone, crate::Configuration)]
    #[cfg_attr(feature = "slog", derive(serde::Serialize))]
    struct Node {
        label: String,
        next: Box<Node>,
    }

    #[derive(Clone, crate::Configuration)]
    #[cfg_attr(feature = "slog", derive(serde::Serialize))]
    struct Ping {
        pong: Box<Pong>,
    }

    #[derive(Clone, crate::Configuration)]
    #[cfg_attr(feature = "slog", derive(serde::Serialize))]
    struct Pong {
        ping: Box<Ping>,
    }

    #[derive(Clone, crate::Configuration)]
    #[cfg_attr(feature = "slog", derive(serde::Serialize))]
    struct Twice {
        first: Credentials,
        second: Credentials,
    }

    #[test]
    fn qualify_joins_with_dot() {
        assert_eq!(qualify("", "Port"), "Port");
        assert_eq!(qualify("Credentials", "Password"), "Credentials.Password");
    }

    #[test]
    fn flattens_depth_first_in_declaration_order() {
        let fields = enumerate_fields(&Options::schema(), "").unwrap();
        let paths: Vec<_> = fields.iter().map(|f| f.path()).collect();
        assert_eq!(
            paths,
            [
                "Name",
                "Port",
                "Credentials.Username",
                "Credentials.Password",
                "Tags"
            ]
        );
        assert_eq!(fields[4].class(), FieldClass::Array);
        assert_eq!(fields[4].declared_type(), "Vec<String>");
        assert!(fields[3].is_secret());
        assert!(!fields[2].is_secret());
        assert_eq!(fields[3].route(), [2, 1]);
    }

    #[test]
    fn parent_path_prefixes_every_descriptor() {
        let fields = enumerate_fields(&Credentials::schema(), "Upstream").unwrap();
        let paths: Vec<_> = fields.iter().map(|f| f.path()).collect();
        assert_eq!(paths, ["Upstream.Username", "Upstream.Password"]);
    }

    #[test]
    fn same_type_twice_is_not_a_cycle() {
        let fields = enumerate_fields(&Twice::schema(), "").unwrap();
        assert_eq!(fields.len(), 4);
    }

    #[test]
    fn direct_self_reference_is_rejected() {
        let err = enumerate_fields(&Node::schema(), "").unwrap_err();
        match err {
            Error::CyclicTypeGraph { type_name, path } => {
                assert_eq!(type_name, "Node");
                assert_eq!(path, "next");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn transitive_self_reference_is_rejected() {
        let err = enumerate_fields(&Ping::schema(), "").unwrap_err();
        match err {
            Error::CyclicTypeGraph { type_name, path } => {
                assert_eq!(type_name, "Ping");
                assert_eq!(path, "pong.ping");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn layouts_are_cached_per_type() {
        let first = terminal_fields::<Options>().unwrap();
        let second = terminal_fields::<Options>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn cyclic_layout_fails_every_time() {
        assert!(terminal_fields::<Node>().is_err());
        assert!(terminal_fields::<Node>().is_err());
    }

    #[test]
    fn first_insert_is_logged() {
        let layouts = DashMap::new();
        let (layout, logs) = capture_logs(|| {
            cached_layout_in(&layouts, TypeId::of::<Options>(), Options::schema).unwrap()
        });
        assert_eq!(layout.len(), 5);
        assert_eq!(logs.matches("cached configuration layout").count(), 1);

        let (_, logs) = capture_logs(|| {
            cached_layout_in(&layouts, TypeId::of::<Options>(), Options::schema).unwrap()
        });
        assert!(!logs.contains("cached configuration layout"));
    }

    #[test]
    fn losing_build_is_discarded_silently() {
        let layouts = DashMap::new();
        let winner: Layout = enumerate_fields(&Options::schema(), "").unwrap().into();
        let seeded = Arc::clone(&winner);

        // Another caller lands its layout while this one is still building.
        let (layout, logs) = capture_logs(|| {
            cached_layout_in(&layouts, TypeId::of::<Options>(), || {
                layouts.insert(TypeId::of::<Options>(), seeded);
                Options::schema()
            })
            .unwrap()
        });

        assert!(Arc::ptr_eq(&layout, &winner));
        assert!(!logs.contains("cached configuration layout"));
    }
}
