use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not, tag, take_while, take_while1};
use nom::character::complete::{char, digit1};
use nom::combinator::{all_consuming, map, map_res, opt, rest, value};
use nom::multi::separated_list0;
use nom::sequence::{delimited, preceded, separated_pair, tuple};
use nom::IResult;

use crate::error::{BindError, Result};
use crate::types::InfoNumber;

pub(crate) enum MetaValue<'a> {
    /// `##key=<k1=v1,k2="v 2">`
    Structured(Vec<(&'a str, String)>),
    /// `##key=value`
    Plain(&'a str),
}

pub(crate) fn info_number(input: &str) -> IResult<&str, InfoNumber> {
    alt((
        map_res(digit1, |d: &str| d.parse().map(InfoNumber::Count)),
        value(InfoNumber::AlternateAlleles, char('A')),
        value(InfoNumber::Alleles, char('R')),
        value(InfoNumber::Genotypes, char('G')),
        value(InfoNumber::Unknown, char('.')),
    ))(input)
}

fn string(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        // escaped_transform rejects empty input, so `""` goes through opt
        map(
            opt(escaped_transform(
                is_not("\\\""),
                '\\',
                alt((value("\\", tag("\\")), value("\"", tag("\"")))),
            )),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}

fn keys_and_values(input: &str) -> IResult<&str, Vec<(&str, String)>> {
    fn key_value(input: &str) -> IResult<&str, (&str, String)> {
        separated_pair(
            take_while1(|c: char| !"<>,=\n".contains(c)),
            char('='),
            alt((
                string,
                map(take_while(|c: char| !">,\n".contains(c)), str::to_owned),
            )),
        )(input)
    }
    separated_list0(char(','), key_value)(input)
}

fn header_line(input: &str) -> IResult<&str, (&str, &str)> {
    preceded(
        tag("##"),
        separated_pair(take_while1(|c: char| c != '='), char('='), rest),
    )(input)
}

/// Split a `##key=value` meta-information line, parsing `<...>` values into key/value pairs.
pub(crate) fn meta_line(line: &str) -> Result<(&str, MetaValue<'_>)> {
    let malformed = || BindError::MalformedDeclaration(line.to_owned());
    let (_, (key, value)) = header_line(line.trim_end()).map_err(|_| malformed())?;
    if value.starts_with('<') {
        let (_, pairs) = all_consuming(delimited(char('<'), keys_and_values, char('>')))(value)
            .map_err(|_| malformed())?;
        Ok((key, MetaValue::Structured(pairs)))
    } else {
        Ok((key, MetaValue::Plain(value)))
    }
}

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse::<u32>)(input)
}

/// `major.minor[.patch]`, leaving any remaining input unconsumed.
pub(crate) fn version(input: &str) -> IResult<&str, (u32, u32, Option<u32>)> {
    tuple((
        number,
        preceded(char('.'), number),
        opt(preceded(char('.'), number)),
    ))(input)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_info_number() {
        assert_eq!(info_number("1"), Ok(("", InfoNumber::Count(1))));
        assert_eq!(info_number("12"), Ok(("", InfoNumber::Count(12))));
        assert_eq!(info_number("A"), Ok(("", InfoNumber::AlternateAlleles)));
        assert_eq!(info_number("R"), Ok(("", InfoNumber::Alleles)));
        assert_eq!(info_number("G"), Ok(("", InfoNumber::Genotypes)));
        assert_eq!(info_number("."), Ok(("", InfoNumber::Unknown)));
        assert!(info_number("X").is_err());
    }

    #[test]
    fn test_structured_meta_line() {
        let (key, value) = meta_line(
            "##INFO=<ID=AF,Number=A,Type=Float,Description=\"Allele frequency, \\\"estimated\\\"\">\n",
        )
        .unwrap();
        assert_eq!(key, "INFO");
        match value {
            MetaValue::Structured(pairs) => assert_eq!(
                pairs,
                vec![
                    ("ID", "AF".to_owned()),
                    ("Number", "A".to_owned()),
                    ("Type", "Float".to_owned()),
                    ("Description", "Allele frequency, \"estimated\"".to_owned()),
                ]
            ),
            MetaValue::Plain(_) => panic!("expected structured value"),
        }
    }

    #[test]
    fn test_plain_meta_line() {
        match meta_line("##source=rtg vcffilter").unwrap() {
            ("source", MetaValue::Plain(v)) => assert_eq!(v, "rtg vcffilter"),
            _ => panic!("expected plain value"),
        }
        assert!(meta_line("#CHROM\tPOS").is_err());
        assert!(meta_line("##INFO=<ID=DP,Number=1").is_err());
    }

    #[test]
    fn test_version() {
        assert_eq!(version("3.12.1"), Ok(("", (3, 12, Some(1)))));
        assert_eq!(version("3.11"), Ok(("", (3, 11, None))));
        assert_eq!(version("3.12.1-dev"), Ok(("-dev", (3, 12, Some(1)))));
        assert!(version("3").is_err());
    }
}
