mod fixed;
mod info;
mod sample;

use indexmap::IndexMap;
use log::debug;

use crate::error::{BindError, Result};
use crate::schema::SchemaRegistry;
use crate::types::{FieldKind, HeaderField};
pub use fixed::FixedField;
pub use info::{Arity, InfoFieldAccessor};
pub use sample::SampleFieldAccessor;

/// The get/set pairs for every declared per-sample and annotation field.
///
/// Built once from the registry and only ever extended: declaring a field
/// adds its accessor and leaves the existing ones untouched.
#[derive(Debug, Clone, Default)]
pub struct Accessors {
    format: IndexMap<String, SampleFieldAccessor>,
    info: IndexMap<String, InfoFieldAccessor>,
}

impl Accessors {
    pub fn from_registry(registry: &SchemaRegistry) -> Self {
        let header = registry.header();
        Accessors {
            format: header
                .format()
                .values()
                .map(|f| (f.id.clone(), SampleFieldAccessor::new(f.clone())))
                .collect(),
            info: header
                .info()
                .values()
                .map(|f| (f.id.clone(), InfoFieldAccessor::new(f)))
                .collect(),
        }
    }

    /// The accessor for a per-sample field. A field declared in the header
    /// without going through [`Accessors::declare`] gets its accessor here.
    pub fn sample_field(
        &mut self,
        registry: &SchemaRegistry,
        id: &str,
    ) -> Result<&SampleFieldAccessor> {
        if !self.format.contains_key(id) {
            self.adopt(registry, FieldKind::Format, id);
        }
        self.format.get(id).ok_or_else(|| BindError::UnknownField {
            kind: FieldKind::Format,
            id: id.to_owned(),
        })
    }

    pub fn info_field(&mut self, registry: &SchemaRegistry, id: &str) -> Result<&InfoFieldAccessor> {
        if !self.info.contains_key(id) {
            self.adopt(registry, FieldKind::Info, id);
        }
        self.info.get(id).ok_or_else(|| BindError::UnknownField {
            kind: FieldKind::Info,
            id: id.to_owned(),
        })
    }

    pub fn sample_field_ids(&self) -> impl Iterator<Item = &str> {
        self.format.keys().map(String::as_str)
    }

    pub fn info_field_ids(&self) -> impl Iterator<Item = &str> {
        self.info.keys().map(String::as_str)
    }

    pub fn has_info_field(&mut self, registry: &SchemaRegistry, id: &str) -> bool {
        self.info_field(registry, id).is_ok()
    }

    /// Add accessors for header fields that have none yet, leaving the
    /// existing ones in place.
    pub fn refresh(&mut self, registry: &SchemaRegistry) {
        let (n_info, n_format) = {
            let header = registry.header();
            (header.info().len(), header.format().len())
        };
        // accessors only exist for declared fields, so equal counts mean nothing is missing
        if n_format != self.format.len() {
            for id in registry.declared_sample_fields() {
                if !self.format.contains_key(&id) {
                    self.adopt(registry, FieldKind::Format, &id);
                }
            }
        }
        if n_info != self.info.len() {
            for field in registry.declared_annotation_fields() {
                if !self.info.contains_key(&field.id) {
                    debug!("new accessor for INFO field {}", field.id);
                    self.info
                        .insert(field.id.clone(), InfoFieldAccessor::new(&field));
                }
            }
        }
    }

    fn adopt(&mut self, registry: &SchemaRegistry, kind: FieldKind, id: &str) {
        if let Some(declared) = registry.declared(kind, id) {
            debug!("new accessor for {} field {}", kind, id);
            match kind {
                FieldKind::Format => {
                    self.format
                        .insert(id.to_owned(), SampleFieldAccessor::new(declared));
                }
                FieldKind::Info => {
                    self.info
                        .insert(id.to_owned(), InfoFieldAccessor::new(&declared));
                }
                FieldKind::Filter => {}
            }
        }
    }

    /// Ensure `field` is declared in the registry's header and has an accessor.
    pub fn declare(
        &mut self,
        registry: &SchemaRegistry,
        kind: FieldKind,
        field: HeaderField,
    ) -> Result<()> {
        let id = field.id.clone();
        match kind {
            FieldKind::Format => {
                registry.declare_sample_field(field)?;
                if !self.format.contains_key(&id) {
                    self.adopt(registry, kind, &id);
                }
            }
            FieldKind::Info => {
                registry.declare_annotation_field(field)?;
                if !self.info.contains_key(&id) {
                    self.adopt(registry, kind, &id);
                }
            }
            FieldKind::Filter => {
                return Err(BindError::MalformedDeclaration(format!(
                    "FILTER {} is not a typed field",
                    id
                )))
            }
        }
        Ok(())
    }
}
