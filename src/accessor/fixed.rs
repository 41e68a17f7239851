use strum::{Display, EnumIter, EnumString};

use crate::error::{BindError, Result};
use crate::record::VcfRecord;
use crate::types::{FILTER_AND_INFO_SEPARATOR, MISSING};
use crate::value::Value;

/// The fixed columns of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum FixedField {
    Chrom,
    Pos,
    Id,
    Ref,
    Alt,
    Qual,
    Filter,
}

impl FixedField {
    pub fn is_writable(self) -> bool {
        matches!(self, FixedField::Id | FixedField::Qual | FixedField::Filter)
    }

    pub fn get(self, record: &VcfRecord) -> Value {
        match self {
            FixedField::Chrom => Value::Text(record.chrom.clone()),
            FixedField::Pos => Value::Number(record.pos as f64),
            FixedField::Id if record.ids.is_empty() => Value::Missing,
            FixedField::Id => Value::List(record.ids.clone()),
            FixedField::Ref => Value::Text(record.ref_allele.clone()),
            FixedField::Alt => Value::List(record.alt_alleles.clone()),
            FixedField::Qual => record.qual.map_or(Value::Missing, Value::Number),
            FixedField::Filter => Value::List(record.filters.clone()),
        }
    }

    pub fn set(self, record: &mut VcfRecord, value: &Value) -> Result<()> {
        let name = self.to_string();
        match self {
            FixedField::Id => {
                let ids = if value.is_clearing() {
                    Vec::new()
                } else {
                    tokens(&name, value)?
                };
                record.set_ids(ids);
            }
            FixedField::Qual => {
                let qual = if value.is_clearing() {
                    None
                } else {
                    Some(value.to_number(&name)?)
                };
                record.set_qual(qual);
            }
            FixedField::Filter => {
                // resolve before clearing so a bad value leaves the record alone
                let filters = if value.is_clearing() {
                    Vec::new()
                } else {
                    tokens(&name, value)?
                };
                record.clear_filters();
                for filter in filters {
                    record.push_filter(filter);
                }
            }
            FixedField::Chrom | FixedField::Pos | FixedField::Ref | FixedField::Alt => {
                return Err(BindError::ReadOnlyField(name));
            }
        }
        Ok(())
    }

    /// Append one filter token to the live record, leaving the others in place.
    pub fn add_filter(record: &mut VcfRecord, filter: &str) -> Result<()> {
        if filter.is_empty() || filter == MISSING || filter.contains(FILTER_AND_INFO_SEPARATOR) {
            return Err(BindError::invalid(
                FixedField::Filter,
                filter,
                "expected a single filter name",
            ));
        }
        record.push_filter(filter);
        Ok(())
    }
}

/// `;`-separated tokens, without empty or missing entries.
fn tokens(name: &str, value: &Value) -> Result<Vec<String>> {
    Ok(value
        .to_tokens(name, FILTER_AND_INFO_SEPARATOR)?
        .into_iter()
        .filter(|t| !t.is_empty() && t != MISSING)
        .collect())
}
