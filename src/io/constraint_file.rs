//! Pharmacophore constraint file parsing (spec §6.3):
//! `x y z  tolerance  feature_code`, one per line, `#` comments.

use crate::error::{CoreError, CoreResult};
use crate::geom::Vec3;
use crate::scoring::pharmacophore::{Constraint, Feature};

pub fn parse(text: &str) -> CoreResult<Vec<Constraint>> {
    let mut constraints = Vec::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(CoreError::FileParseError {
                file: "<constraint>".to_string(),
                line: Some(lineno + 1),
                message: format!("expected 5 fields 'x y z tolerance feature', got {}", fields.len()),
            });
        }
        let parse_f64 = |s: &str| {
            s.parse::<f64>().map_err(|_| CoreError::FileParseError {
                file: "<constraint>".to_string(),
                line: Some(lineno + 1),
                message: format!("'{s}' is not a number"),
            })
        };
        let x = parse_f64(fields[0])?;
        let y = parse_f64(fields[1])?;
        let z = parse_f64(fields[2])?;
        let tolerance = parse_f64(fields[3])?;
        let feature = Feature::from_code(fields[4])?;
        constraints.push(Constraint { center: Vec3::new(x, y, z), tolerance, feature });
    }
    Ok(constraints)
}
