use itertools::Itertools;

use crate::error::{BindError, Result};
use crate::record::{Record, VcfRecord};
use crate::types::{HeaderField, MISSING, VALUE_SEPARATOR};
use crate::value::{check_reserved, Value};

/// Characters that would break the sample column of a record line.
const RESERVED: &[char] = &[':', '\t', '\n', '\r'];

/// Get/set for one declared per-sample field, addressed by sample column.
#[derive(Debug, Clone)]
pub struct SampleFieldAccessor {
    field: HeaderField,
}

impl SampleFieldAccessor {
    pub fn new(field: HeaderField) -> Self {
        SampleFieldAccessor { field }
    }

    pub fn id(&self) -> &str {
        &self.field.id
    }

    pub fn field(&self) -> &HeaderField {
        &self.field
    }

    /// The value at `sample`, or the missing sentinel. Multi-valued fields
    /// read as a list.
    pub fn get(&self, record: &VcfRecord, sample: usize) -> Value {
        match record.format(&self.field.id, sample) {
            None | Some(MISSING) => Value::Missing,
            Some(value) if self.field.number().is_multi_valued() => Value::List(
                value.split(VALUE_SEPARATOR).map(str::to_owned).collect(),
            ),
            Some(value) => Value::Text(value.to_owned()),
        }
    }

    pub fn set(&self, record: &mut VcfRecord, sample: usize, value: &Value) -> Result<()> {
        let id = &self.field.id;
        if sample >= record.sample_count() {
            return Err(BindError::invalid(
                id,
                value,
                format!("record has no sample column {}", sample),
            ));
        }
        let text = if value.is_clearing() {
            if record.format(id, sample).is_none() {
                // nothing to clear, don't add an all-missing column
                return Ok(());
            }
            MISSING.to_owned()
        } else if self.field.number().is_multi_valued() {
            let tokens = value.to_tokens(id, VALUE_SEPARATOR)?;
            for token in &tokens {
                check_reserved(id, token, RESERVED)?;
                check_reserved(id, token, &[VALUE_SEPARATOR])?;
            }
            tokens.iter().join(&VALUE_SEPARATOR.to_string())
        } else {
            let text = value.to_scalar(id)?;
            check_reserved(id, &text, RESERVED)?;
            text
        };
        record.set_format(id, sample, text);
        Ok(())
    }
}
