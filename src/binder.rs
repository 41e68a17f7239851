use std::cell::Ref;
use std::str::FromStr;

use log::{trace, warn};

use crate::accessor::{Accessors, FixedField, InfoFieldAccessor};
use crate::binding::RecordSlot;
use crate::config::{BinderConfig, UndeclaredFieldPolicy};
use crate::error::{BindError, Result};
use crate::parser::{self, MetaValue};
use crate::record::VcfRecord;
use crate::schema::{SchemaRegistry, SharedHeader};
use crate::types::{filter_from_pairs, FieldKind, Header, HeaderField, HeaderFilter};
use crate::value::Value;
use crate::version;

/// The accessor surface handed to an expression evaluator.
///
/// A `Binder` is set up once per stream: it resolves the header into a
/// [`SchemaRegistry`] and a table of field [`Accessors`], then records are
/// bound into its slot one at a time and evaluated through a [`Scope`].
#[derive(Debug)]
pub struct Binder {
    config: BinderConfig,
    registry: SchemaRegistry,
    accessors: Accessors,
    slot: RecordSlot,
}

impl Binder {
    pub fn new(header: SharedHeader) -> Self {
        Self::with_config(header, BinderConfig::default())
    }

    pub fn with_config(header: SharedHeader, config: BinderConfig) -> Self {
        let registry = SchemaRegistry::new(header);
        let accessors = Accessors::from_registry(&registry);
        Binder {
            config,
            registry,
            accessors,
            slot: RecordSlot::new(),
        }
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn header(&self) -> Ref<'_, Header> {
        self.registry.header()
    }

    /// Bind the next record, returning the previously bound one.
    pub fn bind(&mut self, record: VcfRecord) -> Result<Option<VcfRecord>> {
        let expected = self.registry.sample_count();
        if record.sample_count() != expected {
            return Err(BindError::SampleCountMismatch {
                header: expected,
                record: record.sample_count(),
            });
        }
        Ok(self.slot.bind(record))
    }

    pub fn unbind(&mut self) -> Option<VcfRecord> {
        self.slot.take()
    }

    pub fn record(&self) -> Result<&VcfRecord> {
        self.slot.get()
    }

    /// The accessor surface over the bound record.
    pub fn scope(&mut self) -> Result<Scope<'_>> {
        let record = self.slot.get_mut()?;
        self.accessors.refresh(&self.registry);
        Ok(Scope {
            record,
            registry: &self.registry,
            accessors: &mut self.accessors,
            config: &self.config,
        })
    }

    /// Fail unless the running engine version is at least `minimum`.
    pub fn check_min_version(&self, minimum: &str) -> Result<()> {
        version::check_minimum_version(&self.config.engine_version, minimum)
    }

    pub fn declare_sample_field(&mut self, field: HeaderField) -> Result<()> {
        self.accessors
            .declare(&self.registry, FieldKind::Format, field)
    }

    pub fn declare_annotation_field(&mut self, field: HeaderField) -> Result<()> {
        self.accessors.declare(&self.registry, FieldKind::Info, field)
    }

    /// Declare a field from a `##INFO=<...>` or `##FORMAT=<...>` line.
    pub fn declare_line(&mut self, line: &str) -> Result<()> {
        declare_line(&self.registry, &mut self.accessors, line)
    }

    pub fn declare_filter(&self, id: &str, description: &str) {
        self.registry
            .declare_filter(HeaderFilter::new(id, description));
    }
}

fn declare_line(registry: &SchemaRegistry, accessors: &mut Accessors, line: &str) -> Result<()> {
    use std::convert::TryFrom;

    let (key, value) = parser::meta_line(line)?;
    let kind = FieldKind::from_str(key)
        .map_err(|_| BindError::MalformedDeclaration(line.to_owned()))?;
    match (kind, value) {
        (FieldKind::Filter, MetaValue::Structured(pairs)) => {
            registry.declare_filter(filter_from_pairs(pairs)?);
            Ok(())
        }
        (kind, MetaValue::Structured(pairs)) => {
            accessors.declare(registry, kind, HeaderField::try_from(pairs)?)
        }
        (_, MetaValue::Plain(_)) => Err(BindError::MalformedDeclaration(line.to_owned())),
    }
}

/// The bound record together with the field accessors, for one evaluation.
pub struct Scope<'a> {
    record: &'a mut VcfRecord,
    registry: &'a SchemaRegistry,
    accessors: &'a mut Accessors,
    config: &'a BinderConfig,
}

impl<'a> Scope<'a> {
    pub fn record(&self) -> &VcfRecord {
        &*self.record
    }

    /// Read a fixed column by name, e.g. `"QUAL"`.
    pub fn get(&self, column: &str) -> Result<Value> {
        Ok(fixed_field(column)?.get(self.record))
    }

    /// Write a fixed column by name. Only ID, QUAL and FILTER are writable.
    pub fn set<V: Into<Value>>(&mut self, column: &str, value: V) -> Result<()> {
        fixed_field(column)?.set(self.record, &value.into())
    }

    pub fn chrom(&self) -> &str {
        &self.record.chrom
    }

    pub fn pos(&self) -> u64 {
        self.record.pos
    }

    pub fn id(&self) -> Value {
        FixedField::Id.get(self.record)
    }

    pub fn set_id<V: Into<Value>>(&mut self, value: V) -> Result<()> {
        FixedField::Id.set(self.record, &value.into())
    }

    pub fn ref_allele(&self) -> &str {
        &self.record.ref_allele
    }

    pub fn alt(&self) -> &[String] {
        &self.record.alt_alleles
    }

    pub fn qual(&self) -> Value {
        FixedField::Qual.get(self.record)
    }

    pub fn set_qual<V: Into<Value>>(&mut self, value: V) -> Result<()> {
        FixedField::Qual.set(self.record, &value.into())
    }

    pub fn filter(&mut self) -> FilterHandle<'_> {
        FilterHandle {
            record: &mut *self.record,
        }
    }

    pub fn set_filter<V: Into<Value>>(&mut self, value: V) -> Result<()> {
        FixedField::Filter.set(self.record, &value.into())
    }

    pub fn samples(&self) -> Vec<String> {
        self.registry.sample_names()
    }

    /// The per-sample handle for the sample called `name`.
    pub fn sample(&mut self, name: &str) -> Result<SampleHandle<'_>> {
        let index = self.registry.sample_index(name)?;
        Ok(SampleHandle {
            name: name.to_owned(),
            index,
            record: &mut *self.record,
            registry: self.registry,
            accessors: &mut *self.accessors,
        })
    }

    pub fn info(&mut self) -> InfoHandle<'_> {
        InfoHandle {
            record: &mut *self.record,
            registry: self.registry,
            accessors: &mut *self.accessors,
            config: self.config,
        }
    }

    pub fn check_min_version(&self, minimum: &str) -> Result<()> {
        version::check_minimum_version(&self.config.engine_version, minimum)
    }

    pub fn declare_sample_field(&mut self, field: HeaderField) -> Result<()> {
        self.accessors.declare(self.registry, FieldKind::Format, field)
    }

    pub fn declare_annotation_field(&mut self, field: HeaderField) -> Result<()> {
        self.accessors.declare(self.registry, FieldKind::Info, field)
    }

    pub fn declare_line(&mut self, line: &str) -> Result<()> {
        declare_line(self.registry, self.accessors, line)
    }

    pub fn declare_filter(&self, id: &str, description: &str) {
        self.registry
            .declare_filter(HeaderFilter::new(id, description));
    }
}

fn fixed_field(column: &str) -> Result<FixedField> {
    FixedField::from_str(column).map_err(|_| BindError::UnknownColumn(column.to_owned()))
}

/// The FILTER column of the bound record.
pub struct FilterHandle<'a> {
    record: &'a mut VcfRecord,
}

impl<'a> FilterHandle<'a> {
    pub fn get(&self) -> &[String] {
        &self.record.filters
    }

    /// Append `filter`, keeping the tokens already present.
    pub fn add(&mut self, filter: &str) -> Result<()> {
        FixedField::add_filter(self.record, filter)
    }

    /// Replace the whole list; clearing values empty it.
    pub fn set<V: Into<Value>>(&mut self, value: V) -> Result<()> {
        FixedField::Filter.set(self.record, &value.into())
    }
}

/// The per-sample fields of one sample of the bound record.
///
/// Field lookup goes through the shared accessor table, so fields declared
/// after the handle's sample was resolved are available too.
pub struct SampleHandle<'a> {
    name: String,
    index: usize,
    record: &'a mut VcfRecord,
    registry: &'a SchemaRegistry,
    accessors: &'a mut Accessors,
}

impl<'a> SampleHandle<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn fields(&self) -> Vec<&str> {
        self.accessors.sample_field_ids().collect()
    }

    pub fn get(&mut self, id: &str) -> Result<Value> {
        Ok(self
            .accessors
            .sample_field(self.registry, id)?
            .get(self.record, self.index))
    }

    pub fn set<V: Into<Value>>(&mut self, id: &str, value: V) -> Result<()> {
        self.accessors
            .sample_field(self.registry, id)?
            .set(self.record, self.index, &value.into())
    }
}

/// The annotation fields of the bound record.
pub struct InfoHandle<'a> {
    record: &'a mut VcfRecord,
    registry: &'a SchemaRegistry,
    accessors: &'a mut Accessors,
    config: &'a BinderConfig,
}

impl<'a> InfoHandle<'a> {
    pub fn fields(&self) -> Vec<&str> {
        self.accessors.info_field_ids().collect()
    }

    pub fn get(&mut self, id: &str) -> Result<Value> {
        Ok(self
            .accessors
            .info_field(self.registry, id)?
            .get(self.record))
    }

    /// Write an annotation field. What happens for fields the header does not
    /// declare is decided by [`BinderConfig::undeclared_info`].
    pub fn set<V: Into<Value>>(&mut self, id: &str, value: V) -> Result<()> {
        let value = value.into();
        if !self.accessors.has_info_field(self.registry, id) {
            match self.config.undeclared_info {
                UndeclaredFieldPolicy::Reject => {
                    return Err(BindError::UnknownField {
                        kind: FieldKind::Info,
                        id: id.to_owned(),
                    })
                }
                UndeclaredFieldPolicy::Declare if !value.is_clearing() => {
                    let field = InfoFieldAccessor::declaration_for(
                        id,
                        &value,
                        &self.config.declared_description,
                    );
                    self.accessors.declare(self.registry, FieldKind::Info, field)?;
                }
                UndeclaredFieldPolicy::Declare | UndeclaredFieldPolicy::WriteThrough => {
                    warn!("writing INFO field {} which is not declared in the header", id);
                    return InfoFieldAccessor::for_value(id, &value).set(self.record, &value);
                }
            }
        }
        trace!("setting INFO {} to {}", id, value);
        self.accessors
            .info_field(self.registry, id)?
            .set(self.record, &value)
    }
}
