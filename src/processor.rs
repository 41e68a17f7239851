use anyhow::Context;
use log::debug;

use crate::binder::{Binder, Scope};
use crate::config::BinderConfig;
use crate::error::BindError;
use crate::record::VcfRecord;
use crate::schema::SharedHeader;

/// An expression run against every record of a stream.
pub trait Evaluator {
    /// Called once before the first record, e.g. to declare fields or check versions.
    fn begin(&mut self, _binder: &mut Binder) -> anyhow::Result<()> {
        Ok(())
    }

    /// Whether to keep the record. Modifications made through `scope` are kept
    /// even if the record is dropped from the output.
    fn evaluate(&mut self, scope: &mut Scope<'_>) -> anyhow::Result<bool>;

    /// Called once after the last record.
    fn end(&mut self, _binder: &mut Binder) -> anyhow::Result<()> {
        Ok(())
    }
}

/// An [`Evaluator`] that only has a per-record step.
pub struct FnEvaluator<F>(F);

pub fn from_fn<F>(f: F) -> FnEvaluator<F>
where
    F: FnMut(&mut Scope<'_>) -> anyhow::Result<bool>,
{
    FnEvaluator(f)
}

impl<F> Evaluator for FnEvaluator<F>
where
    F: FnMut(&mut Scope<'_>) -> anyhow::Result<bool>,
{
    fn evaluate(&mut self, scope: &mut Scope<'_>) -> anyhow::Result<bool> {
        (self.0)(scope)
    }
}

/// The records of `inner` that `evaluator` keeps, as modified by it.
pub struct ScriptedRecords<I, E> {
    inner: I,
    binder: Binder,
    evaluator: E,
    kept: usize,
    dropped: usize,
    finished: bool,
}

impl<I, E> ScriptedRecords<I, E>
where
    I: Iterator<Item = VcfRecord>,
    E: Evaluator,
{
    pub fn new(inner: I, header: SharedHeader, evaluator: E) -> anyhow::Result<Self> {
        Self::with_config(inner, header, BinderConfig::default(), evaluator)
    }

    pub fn with_config(
        inner: I,
        header: SharedHeader,
        config: BinderConfig,
        mut evaluator: E,
    ) -> anyhow::Result<Self> {
        let mut binder = Binder::with_config(header, config);
        evaluator
            .begin(&mut binder)
            .context("could not initialise expression")?;
        Ok(Self {
            inner,
            binder,
            evaluator,
            kept: 0,
            dropped: 0,
            finished: false,
        })
    }

    pub fn binder(&self) -> &Binder {
        &self.binder
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn kept(&self) -> usize {
        self.kept
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    fn process(&mut self, record: VcfRecord) -> anyhow::Result<Option<VcfRecord>> {
        self.binder.bind(record).context("could not bind record")?;
        let keep = {
            let mut scope = self.binder.scope()?;
            self.evaluator.evaluate(&mut scope)
        };
        let record = self.binder.unbind().ok_or(BindError::NoRecordBound)?;
        let keep = keep
            .with_context(|| format!("could not evaluate expression on record: {}", record))?;
        if keep {
            self.kept += 1;
            Ok(Some(record))
        } else {
            self.dropped += 1;
            Ok(None)
        }
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        self.finished = true;
        debug!(
            "expression kept {} and dropped {} records",
            self.kept, self.dropped
        );
        self.evaluator.end(&mut self.binder)
    }
}

impl<I, E> Iterator for ScriptedRecords<I, E>
where
    I: Iterator<Item = VcfRecord>,
    E: Evaluator,
{
    type Item = anyhow::Result<VcfRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let record = match self.inner.next() {
                Some(record) => record,
                None => return self.finish().err().map(Err),
            };
            match self.process(record) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
