mod vcf;
use crate::types::InfoValue;
pub use vcf::VcfRecord;

/// Read access to the columns of a variant record.
pub trait Record {
    fn chrom(&self) -> &str;

    /// 1-based position.
    fn pos(&self) -> u64;

    fn ids(&self) -> &[String];

    fn ref_allele(&self) -> &str;

    fn alt_alleles(&self) -> &[String];

    fn qual(&self) -> Option<f64>;

    fn filters(&self) -> &[String];

    fn info(&self, tag: &str) -> Option<&InfoValue>;

    /// The value of a per-sample field for the sample at `sample`, if present.
    fn format(&self, tag: &str, sample: usize) -> Option<&str>;

    fn has_flag(&self, tag: &str) -> bool {
        self.info(tag).is_some()
    }
}
