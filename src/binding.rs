use log::trace;

use crate::error::{BindError, Result};
use crate::record::VcfRecord;

/// Holds the record currently under evaluation.
///
/// Exactly one record is bound at a time. Accessors never hold on to a record
/// themselves; they are handed the bound one on every call.
#[derive(Debug, Default)]
pub struct RecordSlot {
    record: Option<VcfRecord>,
}

impl RecordSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `record`, returning the previously bound one so it can be recycled.
    pub fn bind(&mut self, record: VcfRecord) -> Option<VcfRecord> {
        trace!("binding record at {}:{}", record.chrom, record.pos);
        self.record.replace(record)
    }

    pub fn take(&mut self) -> Option<VcfRecord> {
        self.record.take()
    }

    pub fn is_bound(&self) -> bool {
        self.record.is_some()
    }

    pub fn get(&self) -> Result<&VcfRecord> {
        self.record.as_ref().ok_or(BindError::NoRecordBound)
    }

    pub fn get_mut(&mut self) -> Result<&mut VcfRecord> {
        self.record.as_mut().ok_or(BindError::NoRecordBound)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rebind_returns_previous() {
        let mut slot = RecordSlot::new();
        assert_eq!(slot.get().unwrap_err(), BindError::NoRecordBound);
        assert!(slot.bind(VcfRecord::new("chr1", 10, "A", 0)).is_none());
        let previous = slot.bind(VcfRecord::new("chr1", 20, "C", 0)).unwrap();
        assert_eq!(previous.pos, 10);
        assert_eq!(slot.get().unwrap().pos, 20);
        assert_eq!(slot.take().unwrap().ref_allele, "C");
        assert!(!slot.is_bound());
    }
}
