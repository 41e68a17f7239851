pub mod accessor;
pub mod binder;
pub mod binding;
pub mod config;
pub mod error;
pub(crate) mod parser;
pub mod processor;
pub mod record;
pub mod schema;
pub mod types;
pub mod value;
pub mod version;

pub use binder::{Binder, Scope};
pub use config::{BinderConfig, UndeclaredFieldPolicy};
pub use error::{BindError, Result};
pub use processor::{Evaluator, ScriptedRecords};
pub use record::{Record, VcfRecord};
pub use schema::{SchemaRegistry, SharedHeader};
pub use value::Value;

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::types::{Header, HeaderField, InfoNumber, InfoType, InfoValue};
    use super::*;

    fn header() -> SharedHeader {
        let mut header = Header::new(vec!["S1", "S2"]).unwrap();
        for line in &[
            "##fileformat=VCFv4.2",
            r#"##INFO=<ID=AC,Number=A,Type=Integer,Description="Allele count">"#,
            r#"##INFO=<ID=DP,Number=1,Type=Integer,Description="Total depth">"#,
            r#"##FORMAT=<ID=GT,Number=1,Type=String,Description="Genotype">"#,
        ] {
            header.add_meta_line(line).unwrap();
        }
        Rc::new(RefCell::new(header))
    }

    #[test]
    fn test_genotype_scenario() {
        let mut binder = Binder::new(header());
        binder
            .bind(VcfRecord::new("chr1", 10, "C", 2).with_format("GT", 0, "0/1"))
            .unwrap();
        let mut scope = binder.scope().unwrap();
        assert_eq!(scope.sample("S1").unwrap().get("GT"), Ok(Value::from("0/1")));
        assert_eq!(scope.sample("S2").unwrap().get("GT"), Ok(Value::Missing));
        scope.sample("S2").unwrap().set("GT", "1/1").unwrap();
        assert_eq!(scope.sample("S2").unwrap().get("GT"), Ok(Value::from("1/1")));
        assert_eq!(scope.sample("S1").unwrap().get("GT"), Ok(Value::from("0/1")));
        assert_eq!(
            scope.record().to_string(),
            "chr1\t10\t.\tC\t.\t.\t.\t.\tGT\t0/1\t1/1"
        );
    }

    #[test]
    fn test_accessors_follow_rebinding() {
        let mut binder = Binder::new(header());
        let a = VcfRecord::new("chr1", 100, "A", 2)
            .with_id("rsA")
            .with_qual(10.0)
            .with_info("DP", InfoValue::Scalar("7".into()))
            .with_format("GT", 0, "0/0");
        let b = VcfRecord::new("chr2", 200, "G", 2)
            .with_alt("T")
            .with_format("GT", 0, "1/1");

        binder.bind(a.clone()).unwrap();
        assert_eq!(binder.scope().unwrap().info().get("DP"), Ok(Value::from("7")));
        let previous = binder.bind(b).unwrap();
        assert_eq!(previous, Some(a));

        let mut scope = binder.scope().unwrap();
        assert_eq!(scope.chrom(), "chr2");
        assert_eq!(scope.pos(), 200);
        assert_eq!(scope.id(), Value::Missing);
        assert_eq!(scope.qual(), Value::Missing);
        assert_eq!(scope.alt(), ["T"]);
        assert_eq!(scope.info().get("DP"), Ok(Value::Missing));
        assert_eq!(scope.sample("S1").unwrap().get("GT"), Ok(Value::from("1/1")));
    }

    #[test]
    fn test_annotation_round_trip() {
        let mut binder = Binder::new(header());
        binder
            .bind(VcfRecord::new("chr1", 1, "A", 2).with_alt("C").with_alt("G"))
            .unwrap();
        let mut scope = binder.scope().unwrap();
        let mut info = scope.info();
        info.set("AC", vec!["3", "1"]).unwrap();
        assert_eq!(info.get("AC"), Ok(Value::from(vec!["3", "1"])));
        info.set("AC", "5,6").unwrap();
        assert_eq!(info.get("AC"), Ok(Value::from(vec!["5", "6"])));
        info.set("DP", 12_i64).unwrap();
        assert_eq!(info.get("DP"), Ok(Value::from("12")));

        for clearing in vec![Value::Missing, Value::from(""), Value::List(vec![]), Value::Bool(false)] {
            info.set("AC", "1,1").unwrap();
            info.set("DP", "1").unwrap();
            info.set("AC", clearing.clone()).unwrap();
            info.set("DP", clearing).unwrap();
            assert_eq!(info.get("AC"), Ok(Value::List(vec![])));
            assert_eq!(info.get("DP"), Ok(Value::Missing));
        }
        assert!(scope.record().info.is_empty());
    }

    #[test]
    fn test_redeclaring_leaves_header_alone() {
        let header = header();
        let mut binder = Binder::new(Rc::clone(&header));
        let gt = HeaderField::new("GT", InfoNumber::Count(1), InfoType::String, "Genotype");
        let dp = HeaderField::new("DP", InfoNumber::Count(1), InfoType::Integer, "Total depth");
        let (n_format, n_info) = (header.borrow().format().len(), header.borrow().info().len());
        for _ in 0..2 {
            binder.declare_sample_field(gt.clone()).unwrap();
            binder.declare_annotation_field(dp.clone()).unwrap();
        }
        assert_eq!(header.borrow().format().len(), n_format);
        assert_eq!(header.borrow().info().len(), n_info);

        assert_eq!(
            binder.declare_annotation_field(HeaderField::new(
                "DP",
                InfoNumber::Unknown,
                InfoType::Integer,
                "Total depth"
            )),
            Err(BindError::IncompatibleDeclaration {
                kind: types::FieldKind::Info,
                id: "DP".into()
            })
        );

        binder
            .bind(VcfRecord::new("chr1", 1, "A", 2).with_format("GT", 1, "0|1"))
            .unwrap();
        let mut scope = binder.scope().unwrap();
        assert_eq!(scope.sample("S2").unwrap().get("GT"), Ok(Value::from("0|1")));
    }

    #[test]
    fn test_filter_add_then_clear() {
        let mut binder = Binder::new(header());
        binder.bind(VcfRecord::new("chr1", 1, "A", 2)).unwrap();
        let mut scope = binder.scope().unwrap();
        scope.filter().add("PASS").unwrap();
        scope.filter().add("LowQual").unwrap();
        assert_eq!(scope.get("FILTER"), Ok(Value::from(vec!["PASS", "LowQual"])));
        scope.set_filter(false).unwrap();
        assert_eq!(scope.get("FILTER"), Ok(Value::List(vec![])));
    }

    #[test]
    fn test_minimum_version() {
        let binder = Binder::with_config(header(), BinderConfig::default().with_engine_version("3.12.1"));
        assert!(binder.check_min_version("3.11").is_ok());
        assert!(binder.check_min_version("3.12.2").is_err());
        assert!(binder.check_min_version("4.0").is_err());
    }

    #[test]
    fn test_declarations_reach_output_header() {
        let header = header();
        let config = BinderConfig::default().with_undeclared_info(UndeclaredFieldPolicy::Declare);
        let mut binder = Binder::with_config(Rc::clone(&header), config);
        binder.declare_filter("LowQual", "Low quality");
        binder.bind(VcfRecord::new("chr1", 1, "A", 2)).unwrap();
        binder.scope().unwrap().info().set("SCORE", 0.5).unwrap();
        assert_eq!(
            header.borrow().declaration_lines(),
            vec![
                r#"##INFO=<ID=AC,Number=A,Type=Integer,Description="Allele count">"#,
                r#"##INFO=<ID=DP,Number=1,Type=Integer,Description="Total depth">"#,
                r#"##INFO=<ID=SCORE,Number=1,Type=Float,Description="Added by expression">"#,
                r#"##FILTER=<ID=LowQual,Description="Low quality">"#,
                r#"##FORMAT=<ID=GT,Number=1,Type=String,Description="Genotype">"#,
            ]
        );
        assert_eq!(
            header.borrow().meta().get("fileformat").map(String::as_str),
            Some("VCFv4.2")
        );
    }
}
