use std::collections::HashMap;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use getset::Getters;
use indexmap::IndexMap;
use itertools::Itertools;
use multimap::MultiMap;
use strum::{Display, EnumString};

use crate::error::{BindError, Result};
use crate::parser;

/// The missing value sentinel. Never a valid data value.
pub const MISSING: &str = ".";

pub(crate) const VALUE_SEPARATOR: char = ',';
pub(crate) const FILTER_AND_INFO_SEPARATOR: char = ';';
pub(crate) const FORMAT_SEPARATOR: char = ':';

pub type Sample = String;

/// Which section of the header a field declaration lives in.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Display, EnumString)]
pub enum FieldKind {
    #[strum(serialize = "INFO")]
    Info,
    #[strum(serialize = "FORMAT")]
    Format,
    #[strum(serialize = "FILTER")]
    Filter,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Display, EnumString)]
pub enum InfoType {
    Integer,
    Float,
    Flag,
    Character,
    String,
}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum InfoNumber {
    Count(usize),
    Alleles,
    AlternateAlleles,
    Genotypes,
    Unknown,
}

impl InfoNumber {
    /// Whether values of this arity are stored as an ordered list.
    pub fn is_multi_valued(self) -> bool {
        !matches!(self, InfoNumber::Count(0) | InfoNumber::Count(1))
    }
}

impl fmt::Display for InfoNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoNumber::Count(n) => write!(f, "{}", n),
            InfoNumber::Alleles => f.write_str("R"),
            InfoNumber::AlternateAlleles => f.write_str("A"),
            InfoNumber::Genotypes => f.write_str("G"),
            InfoNumber::Unknown => f.write_str(MISSING),
        }
    }
}

impl FromStr for InfoNumber {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self> {
        match parser::info_number(s) {
            Ok(("", number)) => Ok(number),
            _ => Err(BindError::MalformedDeclaration(format!("Number={}", s))),
        }
    }
}

/// An INFO or FORMAT field descriptor.
#[derive(Debug, Getters, Clone, PartialEq)]
#[getset(get = "pub")]
pub struct HeaderField {
    pub(crate) id: String,
    number: InfoNumber,
    kind: InfoType,
    description: String,
    // may be empty
    source: String,
    // may be empty
    version: String,
    additional: Vec<(String, String)>,
}

impl HeaderField {
    pub fn new<I: Into<String>, D: Into<String>>(
        id: I,
        number: InfoNumber,
        kind: InfoType,
        description: D,
    ) -> Self {
        HeaderField {
            id: id.into(),
            number,
            kind,
            description: description.into(),
            source: String::new(),
            version: String::new(),
            additional: Vec::new(),
        }
    }

    pub fn is_flag(&self) -> bool {
        self.kind == InfoType::Flag
    }

    /// Same Type and Number, i.e. a re-declaration that may be silently accepted.
    pub fn is_compatible_with(&self, other: &HeaderField) -> bool {
        self.kind == other.kind && self.number == other.number
    }

    /// Render as a meta-information line of the given section, e.g. `##INFO=<ID=DP,...>`.
    pub fn meta_line(&self, kind: FieldKind) -> String {
        let mut entries = vec![
            format!("ID={}", self.id),
            format!("Number={}", self.number),
            format!("Type={}", self.kind),
            format!("Description=\"{}\"", escape(&self.description)),
        ];
        if !self.source.is_empty() {
            entries.push(format!("Source=\"{}\"", escape(&self.source)));
        }
        if !self.version.is_empty() {
            entries.push(format!("Version=\"{}\"", escape(&self.version)));
        }
        entries.extend(self.additional.iter().map(|(k, v)| format!("{}={}", k, v)));
        format!("##{}=<{}>", kind, entries.iter().join(","))
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

impl TryFrom<Vec<(&str, String)>> for HeaderField {
    type Error = BindError;

    fn try_from(data: Vec<(&str, String)>) -> Result<Self> {
        let mut h: HashMap<_, _> = data.iter().cloned().collect();
        let mut take = |key: &str| {
            h.remove(key).ok_or_else(|| {
                BindError::MalformedDeclaration(format!("{} is mandatory", key))
            })
        };
        let id = take("ID")?;
        let number: InfoNumber = take("Number")?.parse()?;
        let kind_text = take("Type")?;
        let kind = InfoType::from_str(&kind_text)
            .map_err(|_| BindError::MalformedDeclaration(format!("Type={}", kind_text)))?;
        let description = take("Description")?;
        let source = h.remove("Source").unwrap_or_default();
        let version = h.remove("Version").unwrap_or_default();
        // keep unrecognised keys in declaration order
        let additional = data
            .into_iter()
            .filter(|(k, _)| h.contains_key(k))
            .map(|(k, v)| (k.to_owned(), v))
            .collect();
        if kind == InfoType::Flag && number != InfoNumber::Count(0) {
            return Err(BindError::MalformedDeclaration(format!(
                "Flag field {} must have Number=0",
                id
            )));
        }
        Ok(HeaderField {
            id,
            number,
            kind,
            description,
            source,
            version,
            additional,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Getters)]
#[getset(get = "pub")]
pub struct HeaderFilter {
    pub(crate) id: String,
    description: String,
}

impl HeaderFilter {
    pub fn new<I: Into<String>, D: Into<String>>(id: I, description: D) -> Self {
        HeaderFilter {
            id: id.into(),
            description: description.into(),
        }
    }
}

/// The declared schema of a record stream.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct Header {
    /// Meta lines that are neither INFO, FORMAT nor FILTER declarations.
    pub(crate) meta: MultiMap<String, String>,
    pub(crate) info: IndexMap<String, HeaderField>,
    pub(crate) format: IndexMap<String, HeaderField>,
    pub(crate) filters: IndexMap<String, HeaderFilter>,
    pub(crate) samples: Vec<Sample>,
}

impl Header {
    pub fn new<S: Into<Sample>, I: IntoIterator<Item = S>>(samples: I) -> Result<Self> {
        let mut header = Header {
            meta: MultiMap::new(),
            info: IndexMap::new(),
            format: IndexMap::new(),
            filters: IndexMap::new(),
            samples: Vec::new(),
        };
        for sample in samples {
            let sample = sample.into();
            if header.samples.contains(&sample) {
                return Err(BindError::DuplicateSample(sample));
            }
            header.samples.push(sample);
        }
        Ok(header)
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn add_meta<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.meta.insert(key.into(), value.into());
    }

    /// Add a meta-information line. INFO, FORMAT and FILTER lines become
    /// field declarations and must not conflict with an existing one.
    pub fn add_meta_line(&mut self, line: &str) -> Result<()> {
        let (key, value) = parser::meta_line(line)?;
        match value {
            parser::MetaValue::Structured(pairs) => match FieldKind::from_str(key) {
                Ok(FieldKind::Filter) => {
                    let filter = filter_from_pairs(pairs)?;
                    self.ensure_filter(filter);
                    Ok(())
                }
                Ok(kind) => {
                    let field = HeaderField::try_from(pairs)?;
                    self.add_field(kind, field)
                }
                Err(_) => {
                    self.add_meta(key, line_value(line, key));
                    Ok(())
                }
            },
            parser::MetaValue::Plain(v) => {
                self.add_meta(key, v);
                Ok(())
            }
        }
    }

    pub fn field(&self, kind: FieldKind, id: &str) -> Option<&HeaderField> {
        match kind {
            FieldKind::Info => self.info.get(id),
            FieldKind::Format => self.format.get(id),
            FieldKind::Filter => None,
        }
    }

    fn fields_mut(
        &mut self,
        kind: FieldKind,
        id: &str,
    ) -> Result<&mut IndexMap<String, HeaderField>> {
        match kind {
            FieldKind::Info => Ok(&mut self.info),
            FieldKind::Format => Ok(&mut self.format),
            FieldKind::Filter => Err(BindError::MalformedDeclaration(format!(
                "FILTER {} is not a typed field",
                id
            ))),
        }
    }

    /// Add a declaration; an equal declaration is accepted, a different one is an error.
    pub fn add_field(&mut self, kind: FieldKind, field: HeaderField) -> Result<()> {
        let fields = self.fields_mut(kind, &field.id)?;
        match fields.get(&field.id) {
            Some(existing) if existing != &field => Err(BindError::IncompatibleDeclaration {
                kind,
                id: field.id,
            }),
            Some(_) => Ok(()),
            None => {
                fields.insert(field.id.clone(), field);
                Ok(())
            }
        }
    }

    /// Ensure a compatible declaration is present. Returns whether the header changed.
    pub fn ensure_field(&mut self, kind: FieldKind, field: HeaderField) -> Result<bool> {
        let fields = self.fields_mut(kind, &field.id)?;
        match fields.get(&field.id) {
            Some(existing) if !existing.is_compatible_with(&field) => {
                Err(BindError::IncompatibleDeclaration {
                    kind,
                    id: field.id,
                })
            }
            Some(_) => Ok(false),
            None => {
                fields.insert(field.id.clone(), field);
                Ok(true)
            }
        }
    }

    /// Returns whether the header changed.
    pub fn ensure_filter(&mut self, filter: HeaderFilter) -> bool {
        if self.filters.contains_key(&filter.id) {
            return false;
        }
        self.filters.insert(filter.id.clone(), filter);
        true
    }

    /// All INFO, FILTER and FORMAT declarations as meta-information lines.
    pub fn declaration_lines(&self) -> Vec<String> {
        let info = self.info.values().map(|f| f.meta_line(FieldKind::Info));
        let filters = self.filters.values().map(|f| {
            format!(
                "##FILTER=<ID={},Description=\"{}\">",
                f.id,
                escape(&f.description)
            )
        });
        let format = self.format.values().map(|f| f.meta_line(FieldKind::Format));
        info.chain(filters).chain(format).collect()
    }
}

fn line_value(line: &str, key: &str) -> String {
    line.trim_end()
        .trim_start_matches("##")
        .trim_start_matches(key)
        .trim_start_matches('=')
        .to_owned()
}

pub(crate) fn filter_from_pairs(pairs: Vec<(&str, String)>) -> Result<HeaderFilter> {
    let mut h: HashMap<_, _> = pairs.into_iter().collect();
    let id = h
        .remove("ID")
        .ok_or_else(|| BindError::MalformedDeclaration("ID is mandatory".into()))?;
    Ok(HeaderFilter {
        id,
        description: h.remove("Description").unwrap_or_default(),
    })
}

/// The value of an INFO entry in a record.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoValue {
    /// Present with no value.
    Flag,
    Scalar(String),
    List(Vec<String>),
}

impl fmt::Display for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoValue::Flag => Ok(()),
            InfoValue::Scalar(v) => f.write_str(v),
            InfoValue::List(v) => write!(f, "{}", v.iter().join(&VALUE_SEPARATOR.to_string())),
        }
    }
}
