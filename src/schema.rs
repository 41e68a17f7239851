use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info};

use crate::error::{BindError, Result};
use crate::types::{FieldKind, Header, HeaderField, HeaderFilter, Sample};

/// A header shared between the binder and whoever writes the output stream.
pub type SharedHeader = Rc<RefCell<Header>>;

/// Resolves sample names to columns and tracks which fields are declared.
///
/// The sample name to column mapping is taken once at construction and stays
/// fixed; field declarations go straight to the shared header so that the
/// writer sees them.
#[derive(Debug)]
pub struct SchemaRegistry {
    header: SharedHeader,
    sample_index: HashMap<Sample, usize>,
}

impl SchemaRegistry {
    pub fn new(header: SharedHeader) -> Self {
        let sample_index = header
            .borrow()
            .samples
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        SchemaRegistry {
            header,
            sample_index,
        }
    }

    pub fn header(&self) -> Ref<'_, Header> {
        self.header.borrow()
    }

    pub fn shared_header(&self) -> SharedHeader {
        Rc::clone(&self.header)
    }

    pub fn sample_count(&self) -> usize {
        self.sample_index.len()
    }

    pub fn sample_index(&self, name: &str) -> Result<usize> {
        self.sample_index
            .get(name)
            .copied()
            .ok_or_else(|| BindError::UnknownSample(name.to_owned()))
    }

    pub fn sample_names(&self) -> Vec<Sample> {
        self.header.borrow().samples.clone()
    }

    pub fn declared_sample_fields(&self) -> Vec<String> {
        self.header.borrow().format.keys().cloned().collect()
    }

    pub fn declared_annotation_fields(&self) -> Vec<HeaderField> {
        self.header.borrow().info.values().cloned().collect()
    }

    pub fn declared(&self, kind: FieldKind, id: &str) -> Option<HeaderField> {
        self.header.borrow().field(kind, id).cloned()
    }

    /// Ensure a per-sample field is declared. Returns whether the header changed.
    pub fn declare_sample_field(&self, field: HeaderField) -> Result<bool> {
        self.declare(FieldKind::Format, field)
    }

    /// Ensure an annotation field is declared. Returns whether the header changed.
    pub fn declare_annotation_field(&self, field: HeaderField) -> Result<bool> {
        self.declare(FieldKind::Info, field)
    }

    pub fn declare_filter(&self, filter: HeaderFilter) -> bool {
        let id = filter.id.clone();
        let added = self.header.borrow_mut().ensure_filter(filter);
        if added {
            info!("added FILTER {} to header", id);
        }
        added
    }

    fn declare(&self, kind: FieldKind, field: HeaderField) -> Result<bool> {
        let id = field.id.clone();
        let added = self.header.borrow_mut().ensure_field(kind, field)?;
        if added {
            info!("added {} field {} to header", kind, id);
        } else {
            debug!("{} field {} already declared", kind, id);
        }
        Ok(added)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{InfoNumber, InfoType};

    fn registry(samples: &[&str]) -> SchemaRegistry {
        let header = Header::new(samples.iter().copied()).unwrap();
        SchemaRegistry::new(Rc::new(RefCell::new(header)))
    }

    #[test]
    fn test_sample_index_is_a_bijection() {
        let names = ["NA12878", "NA12891", "NA12892", "child", "S5"];
        let registry = registry(&names);
        let mut seen = vec![false; names.len()];
        for name in &names {
            let i = registry.sample_index(name).unwrap();
            assert!(i < names.len());
            assert!(!seen[i], "index {} assigned twice", i);
            seen[i] = true;
            assert_eq!(registry.sample_names()[i], *name);
        }
        assert_eq!(registry.sample_count(), names.len());
    }

    #[test]
    fn test_unknown_sample() {
        let registry = registry(&["S1"]);
        assert_eq!(
            registry.sample_index("S2"),
            Err(BindError::UnknownSample("S2".into()))
        );
    }

    #[test]
    fn test_declare_is_idempotent() {
        let registry = registry(&["S1", "S2"]);
        let gq = HeaderField::new("GQ", InfoNumber::Count(1), InfoType::Integer, "GQ");
        assert_eq!(registry.declare_sample_field(gq.clone()), Ok(true));
        assert_eq!(registry.declare_sample_field(gq), Ok(false));
        assert_eq!(registry.declared_sample_fields(), vec!["GQ"]);

        let af = HeaderField::new("AF", InfoNumber::AlternateAlleles, InfoType::Float, "AF");
        assert_eq!(registry.declare_annotation_field(af.clone()), Ok(true));
        assert_eq!(registry.declare_annotation_field(af.clone()), Ok(false));
        assert_eq!(registry.declared_annotation_fields(), vec![af]);

        assert!(registry.declare_filter(HeaderFilter::new("LowQual", "Low quality")));
        assert!(!registry.declare_filter(HeaderFilter::new("LowQual", "Low quality")));
        assert_eq!(registry.header().filters().len(), 1);
    }

    #[test]
    fn test_declarations_are_visible_through_shared_header() {
        let registry = registry(&["S1"]);
        let writer_view = registry.shared_header();
        registry
            .declare_annotation_field(HeaderField::new(
                "DB",
                InfoNumber::Count(0),
                InfoType::Flag,
                "dbSNP membership",
            ))
            .unwrap();
        assert!(writer_view.borrow().info().contains_key("DB"));
    }
}
