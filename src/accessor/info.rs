use crate::error::{BindError, Result};
use crate::record::{Record, VcfRecord};
use crate::types::{HeaderField, InfoNumber, InfoType, InfoValue, VALUE_SEPARATOR};
use crate::value::{check_reserved, Value};

/// Characters that would break the INFO column of a record line.
const RESERVED: &[char] = &[';', '=', '\t', '\n', '\r'];

/// How an annotation field's value is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Present or absent, no value.
    Flag,
    Scalar,
    List,
}

impl From<&HeaderField> for Arity {
    fn from(field: &HeaderField) -> Self {
        if field.is_flag() {
            Arity::Flag
        } else if field.number().is_multi_valued() {
            Arity::List
        } else {
            Arity::Scalar
        }
    }
}

/// Get/set for one annotation field of the bound record.
#[derive(Debug, Clone)]
pub struct InfoFieldAccessor {
    id: String,
    arity: Arity,
}

impl InfoFieldAccessor {
    pub fn new(field: &HeaderField) -> Self {
        InfoFieldAccessor {
            id: field.id.clone(),
            arity: Arity::from(field),
        }
    }

    /// An accessor shaped after the value about to be written, for fields
    /// the header does not declare.
    pub(crate) fn for_value(id: &str, value: &Value) -> Self {
        InfoFieldAccessor {
            id: id.to_owned(),
            arity: match value {
                Value::Bool(_) => Arity::Flag,
                Value::List(_) => Arity::List,
                _ => Arity::Scalar,
            },
        }
    }

    /// A header declaration matching what [`InfoFieldAccessor::for_value`] would write.
    pub(crate) fn declaration_for(id: &str, value: &Value, description: &str) -> HeaderField {
        let (number, kind) = match value {
            Value::Bool(_) => (InfoNumber::Count(0), InfoType::Flag),
            Value::List(_) => (InfoNumber::Unknown, InfoType::String),
            Value::Number(_) => (InfoNumber::Count(1), InfoType::Float),
            Value::Missing | Value::Text(_) => (InfoNumber::Count(1), InfoType::String),
        };
        HeaderField::new(id, number, kind, description)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Flags read as booleans, scalars as the value or the missing sentinel,
    /// lists as the value or an empty list.
    pub fn get(&self, record: &VcfRecord) -> Value {
        let stored = record.info(&self.id);
        match self.arity {
            Arity::Flag => Value::Bool(stored.is_some()),
            Arity::Scalar => match stored {
                None => Value::Missing,
                Some(InfoValue::Flag) => Value::Bool(true),
                Some(InfoValue::Scalar(v)) => Value::Text(v.clone()),
                Some(InfoValue::List(v)) if v.len() == 1 => Value::Text(v[0].clone()),
                Some(InfoValue::List(v)) => Value::List(v.clone()),
            },
            Arity::List => match stored {
                None | Some(InfoValue::Flag) => Value::List(Vec::new()),
                Some(InfoValue::Scalar(v)) => Value::List(
                    v.split(VALUE_SEPARATOR).map(str::to_owned).collect(),
                ),
                Some(InfoValue::List(v)) => Value::List(v.clone()),
            },
        }
    }

    pub fn set(&self, record: &mut VcfRecord, value: &Value) -> Result<()> {
        if value.is_clearing() {
            record.remove_info(&self.id);
            return Ok(());
        }
        let stored = match (self.arity, value) {
            (Arity::Flag, Value::Bool(true)) => InfoValue::Flag,
            (Arity::Flag, _) => {
                return Err(BindError::invalid(
                    &self.id,
                    value,
                    "flag fields only take true or false",
                ))
            }
            (_, Value::Bool(true)) => {
                return Err(BindError::invalid(
                    &self.id,
                    value,
                    "only flag fields can be set to true",
                ))
            }
            (Arity::List, value) => {
                let tokens = value.to_tokens(&self.id, VALUE_SEPARATOR)?;
                for token in &tokens {
                    check_reserved(&self.id, token, RESERVED)?;
                    check_reserved(&self.id, token, &[VALUE_SEPARATOR])?;
                }
                InfoValue::List(tokens)
            }
            (Arity::Scalar, value) => {
                let text = value.to_scalar(&self.id)?;
                check_reserved(&self.id, &text, RESERVED)?;
                InfoValue::Scalar(text)
            }
        };
        record.set_info(self.id.clone(), stored);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn accessor(id: &str, number: InfoNumber, kind: InfoType) -> InfoFieldAccessor {
        InfoFieldAccessor::new(&HeaderField::new(id, number, kind, ""))
    }

    fn record() -> VcfRecord {
        VcfRecord::new("chr1", 100, "A", 0)
            .with_info("DP", InfoValue::Scalar("14".into()))
            .with_info("AF", InfoValue::List(vec!["0.5".into(), "0.1".into()]))
            .with_info("DB", InfoValue::Flag)
    }

    #[test]
    fn test_arity() {
        assert_eq!(accessor("DB", InfoNumber::Count(0), InfoType::Flag).arity(), Arity::Flag);
        assert_eq!(accessor("DP", InfoNumber::Count(1), InfoType::Integer).arity(), Arity::Scalar);
        assert_eq!(accessor("AF", InfoNumber::AlternateAlleles, InfoType::Float).arity(), Arity::List);
        assert_eq!(accessor("X", InfoNumber::Count(2), InfoType::String).arity(), Arity::List);
    }

    #[test]
    fn test_get() {
        let record = record();
        let dp = accessor("DP", InfoNumber::Count(1), InfoType::Integer);
        let af = accessor("AF", InfoNumber::AlternateAlleles, InfoType::Float);
        let db = accessor("DB", InfoNumber::Count(0), InfoType::Flag);
        let mq = accessor("MQ", InfoNumber::Count(1), InfoType::Float);
        let ac = accessor("AC", InfoNumber::AlternateAlleles, InfoType::Integer);
        let h2 = accessor("H2", InfoNumber::Count(0), InfoType::Flag);

        assert_eq!(dp.get(&record), Value::from("14"));
        assert_eq!(af.get(&record), Value::from(vec!["0.5", "0.1"]));
        assert_eq!(db.get(&record), Value::Bool(true));
        assert_eq!(mq.get(&record), Value::Missing);
        assert_eq!(ac.get(&record), Value::List(vec![]));
        assert_eq!(h2.get(&record), Value::Bool(false));
    }

    #[test]
    fn test_list_round_trip() {
        let mut record = record();
        let ac = accessor("AC", InfoNumber::AlternateAlleles, InfoType::Integer);
        ac.set(&mut record, &Value::from(vec!["3", "1", "2"])).unwrap();
        assert_eq!(ac.get(&record), Value::from(vec!["3", "1", "2"]));
        ac.set(&mut record, &Value::from("4,5")).unwrap();
        assert_eq!(ac.get(&record), Value::from(vec!["4", "5"]));
        assert_eq!(record.info("AC"), Some(&InfoValue::List(vec!["4".into(), "5".into()])));
    }

    #[test]
    fn test_clearing_removes() {
        let dp = accessor("DP", InfoNumber::Count(1), InfoType::Integer);
        let af = accessor("AF", InfoNumber::AlternateAlleles, InfoType::Float);
        let db = accessor("DB", InfoNumber::Count(0), InfoType::Flag);
        for clearing in &[Value::Missing, Value::from(""), Value::List(vec![]), Value::Bool(false)] {
            let mut record = record();
            dp.set(&mut record, clearing).unwrap();
            af.set(&mut record, clearing).unwrap();
            db.set(&mut record, clearing).unwrap();
            assert!(record.info.is_empty(), "{:?}", clearing);
            assert_eq!(dp.get(&record), Value::Missing);
            assert_eq!(af.get(&record), Value::List(vec![]));
            assert_eq!(db.get(&record), Value::Bool(false));
        }
    }

    #[test]
    fn test_flags() {
        let mut record = VcfRecord::new("chr1", 100, "A", 0);
        let db = accessor("DB", InfoNumber::Count(0), InfoType::Flag);
        db.set(&mut record, &Value::Bool(true)).unwrap();
        assert_eq!(record.info("DB"), Some(&InfoValue::Flag));
        assert!(db.set(&mut record, &Value::from("yes")).is_err());

        let dp = accessor("DP", InfoNumber::Count(1), InfoType::Integer);
        assert!(dp.set(&mut record, &Value::Bool(true)).is_err());
        dp.set(&mut record, &Value::Number(30.0)).unwrap();
        assert_eq!(record.info("DP"), Some(&InfoValue::Scalar("30".into())));
    }

    #[test]
    fn test_separators_rejected() {
        let mut record = record();
        let dp = accessor("DP", InfoNumber::Count(1), InfoType::Integer);
        let af = accessor("AF", InfoNumber::AlternateAlleles, InfoType::Float);
        for bad in &["1;DB", "a=b", "1\t3", "x\ny"] {
            assert!(dp.set(&mut record, &Value::from(*bad)).is_err(), "{:?}", bad);
        }
        assert!(af.set(&mut record, &Value::from(vec!["0.1", "0,2"])).is_err());
        assert!(af.set(&mut record, &Value::from("0.1;0.2")).is_err());
        assert_eq!(record, self::record());
    }

    #[test]
    fn test_inferred_declaration() {
        let field = InfoFieldAccessor::declaration_for("XF", &Value::Bool(true), "d");
        assert!(field.is_flag());
        assert_eq!(Arity::from(&field), InfoFieldAccessor::for_value("XF", &Value::Bool(true)).arity());
        let field = InfoFieldAccessor::declaration_for("XL", &Value::from(vec!["a"]), "d");
        assert_eq!(*field.number(), InfoNumber::Unknown);
        assert_eq!(Arity::from(&field), Arity::List);
    }
}
