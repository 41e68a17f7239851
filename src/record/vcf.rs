use std::fmt;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::record::Record;
use crate::types::{InfoValue, FILTER_AND_INFO_SEPARATOR, FORMAT_SEPARATOR, MISSING, VALUE_SEPARATOR};

/// An owned, mutable variant record.
#[derive(Debug, Clone, PartialEq)]
pub struct VcfRecord {
    pub(crate) chrom: String,
    pub(crate) pos: u64,
    pub(crate) ids: Vec<String>,
    pub(crate) ref_allele: String,
    pub(crate) alt_alleles: Vec<String>,
    pub(crate) qual: Option<f64>,
    pub(crate) filters: Vec<String>,
    pub(crate) info: IndexMap<String, InfoValue>,
    // FORMAT key -> one value per sample column
    pub(crate) format: IndexMap<String, Vec<String>>,
    n_samples: usize,
}

impl VcfRecord {
    pub fn new<C: Into<String>, R: Into<String>>(
        chrom: C,
        pos: u64,
        ref_allele: R,
        n_samples: usize,
    ) -> Self {
        VcfRecord {
            chrom: chrom.into(),
            pos,
            ids: Vec::new(),
            ref_allele: ref_allele.into(),
            alt_alleles: Vec::new(),
            qual: None,
            filters: Vec::new(),
            info: IndexMap::new(),
            format: IndexMap::new(),
            n_samples,
        }
    }

    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.ids.push(id.into());
        self
    }

    pub fn with_alt<S: Into<String>>(mut self, alt: S) -> Self {
        self.alt_alleles.push(alt.into());
        self
    }

    pub fn with_qual(mut self, qual: f64) -> Self {
        self.qual = Some(qual);
        self
    }

    pub fn with_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.filters.push(filter.into());
        self
    }

    pub fn with_info<S: Into<String>>(mut self, key: S, value: InfoValue) -> Self {
        self.info.insert(key.into(), value);
        self
    }

    /// Set the value of a per-sample field for one sample column.
    pub fn with_format<K: Into<String>, V: Into<String>>(
        mut self,
        key: K,
        sample: usize,
        value: V,
    ) -> Self {
        self.set_format(&key.into(), sample, value.into());
        self
    }

    pub fn sample_count(&self) -> usize {
        self.n_samples
    }

    pub fn set_ids(&mut self, ids: Vec<String>) {
        self.ids = ids;
    }

    pub fn set_qual(&mut self, qual: Option<f64>) {
        self.qual = qual;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Append a filter token as is, keeping any existing tokens (including PASS).
    pub fn push_filter<S: Into<String>>(&mut self, filter: S) {
        self.filters.push(filter.into());
    }

    pub fn set_info<S: Into<String>>(&mut self, key: S, value: InfoValue) {
        self.info.insert(key.into(), value);
    }

    /// Remove an INFO entry, keeping the order of the remaining ones.
    pub fn remove_info(&mut self, key: &str) -> Option<InfoValue> {
        self.info.shift_remove(key)
    }

    pub fn format_keys(&self) -> impl Iterator<Item = &str> {
        self.format.keys().map(String::as_str)
    }

    /// Set a per-sample value. A FORMAT key not yet present in this record is
    /// created with every other sample set to missing.
    ///
    /// # Panics
    ///
    /// If `sample` is not a valid sample column of this record.
    pub fn set_format(&mut self, key: &str, sample: usize, value: String) {
        assert!(
            sample < self.n_samples,
            "invalid sample index {} for record with {} samples",
            sample,
            self.n_samples
        );
        let n_samples = self.n_samples;
        let values = self
            .format
            .entry(key.to_owned())
            .or_insert_with(|| vec![MISSING.to_owned(); n_samples]);
        values[sample] = value;
    }

    /// Render one sample column, dropping trailing missing sub-fields.
    fn sample_column(&self, sample: usize) -> String {
        let mut column = String::new();
        let mut pending = String::new();
        for values in self.format.values() {
            let value = values.get(sample).map(String::as_str).unwrap_or(MISSING);
            if value == MISSING {
                pending.push_str(value);
                pending.push(FORMAT_SEPARATOR);
            } else {
                column.push_str(&pending);
                column.push_str(value);
                column.push(FORMAT_SEPARATOR);
                pending.clear();
            }
        }
        if column.is_empty() {
            MISSING.to_owned()
        } else {
            column.pop();
            column
        }
    }
}

fn or_missing(s: String) -> String {
    if s.is_empty() {
        MISSING.to_owned()
    } else {
        s
    }
}

impl Record for VcfRecord {
    fn chrom(&self) -> &str {
        &self.chrom
    }

    fn pos(&self) -> u64 {
        self.pos
    }

    fn ids(&self) -> &[String] {
        &self.ids
    }

    fn ref_allele(&self) -> &str {
        &self.ref_allele
    }

    fn alt_alleles(&self) -> &[String] {
        &self.alt_alleles
    }

    fn qual(&self) -> Option<f64> {
        self.qual
    }

    fn filters(&self) -> &[String] {
        &self.filters
    }

    fn info(&self, tag: &str) -> Option<&InfoValue> {
        self.info.get(tag)
    }

    fn format(&self, tag: &str, sample: usize) -> Option<&str> {
        self.format
            .get(tag)
            .and_then(|values| values.get(sample))
            .map(String::as_str)
    }
}

/// One tab-separated VCF data line.
impl fmt::Display for VcfRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self
            .info
            .iter()
            .map(|(key, value)| match value {
                InfoValue::Flag => key.clone(),
                value => format!("{}={}", key, value),
            })
            .join(&FILTER_AND_INFO_SEPARATOR.to_string());
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.pos,
            or_missing(self.ids.iter().join(&FILTER_AND_INFO_SEPARATOR.to_string())),
            self.ref_allele,
            or_missing(self.alt_alleles.iter().join(&VALUE_SEPARATOR.to_string())),
            self.qual.map_or_else(|| MISSING.to_owned(), |q| q.to_string()),
            or_missing(self.filters.iter().join(&FILTER_AND_INFO_SEPARATOR.to_string())),
            or_missing(info),
        )?;
        if self.n_samples > 0 {
            write!(
                f,
                "\t{}",
                or_missing(self.format.keys().join(&FORMAT_SEPARATOR.to_string()))
            )?;
            for sample in 0..self.n_samples {
                write!(f, "\t{}", self.sample_column(sample))?;
            }
        }
        Ok(())
    }
}
