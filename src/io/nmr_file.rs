//! NMR restraint file parsing (spec §6.4, `[SUPPLEMENT]` 5): `#` comments,
//! `<atoms1> <atoms2> <max_distance>` for NOE restraints, `STD <atoms1>
//! <max_distance>` for ligand-to-receptor proximity restraints. Within a
//! group, `(a,b,c)` = MEAN, `[a,b,c]` = AND, a bare comma list = OR; a
//! group mixing `(` and `[` is rejected.

use crate::error::{CoreError, CoreResult};
use crate::model::AtomId;
use crate::scoring::nmr::{GroupAggregator, NoeRestraint, Penalty, StdRestraint};

#[derive(Debug, Clone)]
pub struct ParsedGroup {
    pub atom_names: Vec<String>,
    pub aggregator: GroupAggregator,
}

#[derive(Debug, Clone)]
pub enum ParsedRestraint {
    Noe { group1: ParsedGroup, group2: ParsedGroup, max_distance: f64 },
    Std { group: ParsedGroup, max_distance: f64 },
}

fn parse_group(field: &str, lineno: usize) -> CoreResult<ParsedGroup> {
    let has_paren = field.contains('(') || field.contains(')');
    let has_bracket = field.contains('[') || field.contains(']');
    if has_paren && has_bracket {
        return Err(CoreError::FileParseError {
            file: "<nmr>".to_string(),
            line: Some(lineno + 1),
            message: format!("atom group '{field}' mixes '(' and '[' delimiters"),
        });
    }
    let (aggregator, inner) = if has_paren {
        (GroupAggregator::Mean, field.trim_start_matches('(').trim_end_matches(')'))
    } else if has_bracket {
        (GroupAggregator::And, field.trim_start_matches('[').trim_end_matches(']'))
    } else {
        (GroupAggregator::Or, field)
    };
    let atom_names = inner.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect::<Vec<_>>();
    if atom_names.is_empty() {
        return Err(CoreError::FileParseError {
            file: "<nmr>".to_string(),
            line: Some(lineno + 1),
            message: format!("atom group '{field}' has no atom names"),
        });
    }
    if atom_names.iter().any(|n| n.contains(' ')) {
        return Err(CoreError::FileParseError {
            file: "<nmr>".to_string(),
            line: Some(lineno + 1),
            message: "atom names inside a group must not contain spaces".to_string(),
        });
    }
    Ok(ParsedGroup { atom_names, aggregator })
}

pub fn parse(text: &str) -> CoreResult<Vec<ParsedRestraint>> {
    let mut out = Vec::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let parse_err = |message: String| CoreError::FileParseError {
            file: "<nmr>".to_string(),
            line: Some(lineno + 1),
            message,
        };
        if fields.first().map(|f| f.eq_ignore_ascii_case("STD")).unwrap_or(false) {
            if fields.len() != 3 {
                return Err(parse_err(format!("expected 'STD <atoms> <max_distance>', got '{line}'")));
            }
            let group = parse_group(fields[1], lineno)?;
            let max_distance: f64 =
                fields[2].parse().map_err(|_| parse_err(format!("'{}' is not a number", fields[2])))?;
            out.push(ParsedRestraint::Std { group, max_distance });
        } else {
            if fields.len() != 3 {
                return Err(parse_err(format!("expected '<atoms1> <atoms2> <max_distance>', got '{line}'")));
            }
            let group1 = parse_group(fields[0], lineno)?;
            let group2 = parse_group(fields[1], lineno)?;
            let max_distance: f64 =
                fields[2].parse().map_err(|_| parse_err(format!("'{}' is not a number", fields[2])))?;
            out.push(ParsedRestraint::Noe { group1, group2, max_distance });
        }
    }
    Ok(out)
}

/// Resolves parsed atom-name groups into `AtomId` lists via `resolver`,
/// dropping names the resolver can't find. The first group's delimiter
/// decides the whole restraint's aggregator (the scoring term's
/// `group_distance` takes one aggregator per pair, see DESIGN.md).
pub fn resolve<F: Fn(&str) -> Option<AtomId>>(
    parsed: &[ParsedRestraint],
    resolver: F,
) -> (Vec<NoeRestraint>, Vec<StdRestraint>) {
    let mut noe = Vec::new();
    let mut std = Vec::new();
    for restraint in parsed.iter() {
        match restraint {
            ParsedRestraint::Noe { group1, group2, max_distance } => {
                let ids1: Vec<AtomId> = group1.atom_names.iter().filter_map(|n| resolver(n)).collect();
                let ids2: Vec<AtomId> = group2.atom_names.iter().filter_map(|n| resolver(n)).collect();
                noe.push(NoeRestraint {
                    group1: ids1,
                    group2: ids2,
                    aggregator: group1.aggregator,
                    max_distance: *max_distance,
                    penalty: Penalty::Quadratic,
                });
            }
            ParsedRestraint::Std { group, max_distance } => {
                let ids: Vec<AtomId> = group.atom_names.iter().filter_map(|n| resolver(n)).collect();
                std.push(StdRestraint { ligand_group: ids, max_distance: *max_distance, penalty: Penalty::Quadratic });
            }
        }
    }
    (noe, std)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mean_and_and_or_groups() {
        let text = "(a:1:N,a:1:H) [b:2:O,b:2:C] 5.0\n";
        let parsed = parse(text).unwrap();
        match &parsed[0] {
            ParsedRestraint::Noe { group1, group2, max_distance } => {
                assert_eq!(group1.aggregator, GroupAggregator::Mean);
                assert_eq!(group2.aggregator, GroupAggregator::And);
                assert_eq!(*max_distance, 5.0);
            }
            _ => panic!("expected Noe restraint"),
        }
    }

    #[test]
    fn std_form_is_recognised() {
        let text = "STD a:1:N,a:1:H 4.0\n";
        let parsed = parse(text).unwrap();
        assert!(matches!(parsed[0], ParsedRestraint::Std { .. }));
    }

    #[test]
    fn mixed_delimiters_are_rejected() {
        let text = "(a:1:N,b:2:O] c:3:C 5.0\n";
        assert!(parse(text).is_err());
    }
}
