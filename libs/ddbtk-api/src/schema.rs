//! Record schemas: the ordered, tag-resolved field table of a record type.
//!
//! A schema is a pure function of the type. `#[derive(Record)]` emits the
//! field descriptors and memoizes the resolved schema in a per-type static.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::attribute::WireType;
use crate::error::ConfigError;
use crate::tag::{parse_tag, Exclusion, FieldTag};
use crate::value::{DataFailure, NativeKind};

/// Static description of one declared field.
pub struct FieldDef<R> {
    name: &'static str,
    tag: Option<&'static str>,
    kind: NativeKind,
    get: fn(&R) -> String,
    set: fn(&mut R, &str) -> Result<(), DataFailure>,
}

impl<R> FieldDef<R> {
    /// `tag = None` means the field has no `#[ddb(...)]` attribute.
    pub fn new(
        name: &'static str,
        tag: Option<&'static str>,
        kind: NativeKind,
        get: fn(&R) -> String,
        set: fn(&mut R, &str) -> Result<(), DataFailure>,
    ) -> Self {
        Self { name, tag, kind, get, set }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tag(&self) -> Option<&'static str> {
        self.tag
    }
}

/// An included field with its resolved wire column.
pub struct SchemaField<R> {
    def: FieldDef<R>,
    wire_name: String,
    wire_type: WireType,
}

impl<R> SchemaField<R> {
    /// Declared Rust field name.
    pub fn name(&self) -> &'static str {
        self.def.name
    }

    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    pub fn kind(&self) -> NativeKind {
        self.def.kind
    }

    /// Canonical wire text of this field's current value in `record`.
    pub fn render(&self, record: &R) -> String {
        (self.def.get)(record)
    }

    /// Parse `text` and store it into this field of `record`.
    pub fn assign(&self, record: &mut R, text: &str) -> Result<(), DataFailure> {
        (self.def.set)(record, text)
    }
}

/// Included fields in declaration order plus a wire-name index.
pub struct RecordSchema<R> {
    record: &'static str,
    fields: Vec<SchemaField<R>>,
    by_wire: HashMap<String, usize>,
}

impl<R: 'static> RecordSchema<R> {
    /// Resolve every tag, drop excluded fields and index the rest.
    ///
    /// Fails if two included fields resolve to the same wire column.
    pub fn build(defs: Vec<FieldDef<R>>) -> Result<Self, ConfigError> {
        let record = std::any::type_name::<R>();
        let mut fields: Vec<SchemaField<R>> = Vec::with_capacity(defs.len());
        let mut by_wire: HashMap<String, usize> = HashMap::with_capacity(defs.len());

        for def in defs {
            let (wire_name, wire_type) = match parse_tag(def.name, def.tag) {
                FieldTag::Included { wire_name, wire_type } => (wire_name, wire_type),
                FieldTag::Excluded(Exclusion::Ignored) => continue,
                FieldTag::Excluded(reason) => {
                    tracing::debug!(record = record, field = def.name, %reason, "malformed tag, field excluded");
                    continue;
                }
            };

            if let Some(&existing) = by_wire.get(&wire_name) {
                return Err(ConfigError::DuplicateWireName {
                    record,
                    column: wire_name,
                    first: fields[existing].name(),
                    second: def.name,
                });
            }

            by_wire.insert(wire_name.clone(), fields.len());
            fields.push(SchemaField { def, wire_name, wire_type });
        }

        Ok(Self { record, fields, by_wire })
    }

    /// Build once into `cell` and hand out the cached result afterwards.
    pub fn memoized(
        cell: &'static OnceLock<Result<RecordSchema<R>, ConfigError>>,
    ) -> Result<&'static RecordSchema<R>, ConfigError>
    where
        R: Record,
    {
        cell.get_or_init(|| Self::build(R::field_defs()))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Fully qualified record type name, for diagnostics.
    pub fn record_name(&self) -> &'static str {
        self.record
    }

    pub fn fields(&self) -> &[SchemaField<R>] {
        &self.fields
    }

    /// Field stored under wire column `wire_name`.
    pub fn lookup(&self, wire_name: &str) -> Option<&SchemaField<R>> {
        self.by_wire.get(wire_name).map(|&i| &self.fields[i])
    }
}

/// A record type the codec can encode and decode.
///
/// Normally derived:
///
/// ```ignore
/// #[derive(Record, Default)]
/// struct User {
///     #[ddb("id,N")]
///     id: u64,
///     name: String,
///     #[ddb("-")]
///     cached: String,
/// }
/// ```
pub trait Record: Sized + 'static {
    /// Every declared field, in declaration order, excluded ones included.
    fn field_defs() -> Vec<FieldDef<Self>>;

    /// Resolved schema; memoized per type.
    fn schema() -> Result<&'static RecordSchema<Self>, ConfigError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NativeField;

    #[derive(Default)]
    struct Manual {
        id: u32,
        name: String,
        skip: i8,
    }

    impl Record for Manual {
        fn field_defs() -> Vec<FieldDef<Self>> {
            vec![
                FieldDef::new(
                    "id",
                    Some("pk,N"),
                    u32::KIND,
                    |r: &Manual| r.id.render(),
                    |r: &mut Manual, text: &str| {
                        r.id = u32::parse_wire(text)?;
                        Ok(())
                    },
                ),
                FieldDef::new(
                    "name",
                    None,
                    String::KIND,
                    |r: &Manual| r.name.render(),
                    |r: &mut Manual, text: &str| {
                        r.name = String::parse_wire(text)?;
                        Ok(())
                    },
                ),
                FieldDef::new(
                    "skip",
                    Some("x,B"),
                    i8::KIND,
                    |r: &Manual| r.skip.render(),
                    |r: &mut Manual, text: &str| {
                        r.skip = i8::parse_wire(text)?;
                        Ok(())
                    },
                ),
            ]
        }

        fn schema() -> Result<&'static RecordSchema<Self>, ConfigError> {
            static SCHEMA: OnceLock<Result<RecordSchema<Manual>, ConfigError>> = OnceLock::new();
            RecordSchema::memoized(&SCHEMA)
        }
    }

    #[derive(crate::Record, Default)]
    #[allow(dead_code)]
    struct Clashing {
        #[ddb("col,N")]
        a: i64,
        #[ddb("b")]
        b: String,
        #[ddb("col")]
        c: String,
    }

    #[test]
    fn walker_keeps_declaration_order_and_skips_excluded() {
        let schema = Manual::schema().unwrap();
        let names: Vec<_> = schema.fields().iter().map(|f| (f.name(), f.wire_name(), f.wire_type())).collect();
        assert_eq!(names, vec![("id", "pk", WireType::Numeric), ("name", "name", WireType::Text)]);
        assert!(schema.lookup("x").is_none());
        assert!(schema.lookup("skip").is_none());
        assert_eq!(schema.lookup("pk").map(|f| f.kind()), Some(NativeKind::Unsigned { bits: 32 }));
    }

    #[test]
    fn accessors_read_and_write_the_field() {
        let schema = Manual::schema().unwrap();
        let mut record = Manual { id: 5, name: "n".into(), skip: 1 };
        let pk = schema.lookup("pk").unwrap();
        assert_eq!(pk.render(&record), "5");
        pk.assign(&mut record, "77").unwrap();
        assert_eq!(record.id, 77);
        assert_eq!(pk.assign(&mut record, "-1"), Err(DataFailure::Parse));
        assert_eq!(record.id, 77);
    }

    #[test]
    fn schema_is_memoized() {
        let a = Manual::schema().unwrap() as *const RecordSchema<Manual>;
        let b = Manual::schema().unwrap() as *const RecordSchema<Manual>;
        assert_eq!(a, b);
    }

    #[test]
    fn duplicate_wire_names_are_a_config_error() {
        let err = Clashing::schema().err().unwrap();
        match err {
            ConfigError::DuplicateWireName { column, first, second, .. } => {
                assert_eq!(column, "col");
                assert_eq!(first, "a");
                assert_eq!(second, "c");
            }
            other => panic!("unexpected error: {other}"),
        }
        // The failure is cached, not recomputed into a different answer.
        assert!(Clashing::schema().is_err());
    }
}
