//! MDL SD output (spec §6.2). Writes one V2000 record per ligand pose plus
//! its data fields, keyed off a fresh per-record logical atom numbering
//! independent of the model's own atom ids.

use crate::error::{CoreError, CoreResult};
use crate::model::{DataValue, Model};
use crate::scoring::ScoreMap;

/// MDL formal-charge code for a signed integer charge, 0 when out of the
/// representable `{-3..=3}` range (spec §6.2).
fn mdl_charge_code(charge: i32) -> u8 {
    match charge {
        3 => 4,
        2 => 3,
        1 => 2,
        -1 => 5,
        -2 => 6,
        -3 => 7,
        _ => 0,
    }
}

fn element_field(element: &str) -> String {
    format!("{element:<3}")
}

/// Writes `model` as one SD record (title, program stamp, counts/atom/bond
/// blocks, data fields, `$$$$` terminator) into `out`.
pub fn write_record(
    out: &mut String,
    model: &Model,
    program: &str,
    timestamp: &str,
    scores: &ScoreMap,
) -> CoreResult<()> {
    out.push_str(&model.name);
    out.push('\n');
    out.push_str(&format!("  {program}{timestamp}3D\n"));
    out.push('\n');

    let n_atoms = model.atoms.len();
    let n_bonds = model.bonds.len();
    if n_atoms > 999 || n_bonds > 999 {
        return Err(CoreError::FileWriteError {
            file: model.name.clone(),
            message: "V2000 atom/bond count exceeds 999".to_string(),
        });
    }
    out.push_str(&format!("{n_atoms:>3}{n_bonds:>3}  0  0  0  0  0  0  0  0999 V2000\n"));

    for atom in model.atoms.iter() {
        let charge_code = mdl_charge_code(atom.group_charge.round() as i32);
        out.push_str(&format!(
            "{:>10.4}{:>10.4}{:>10.4} {} 0{:>3}  0  0  0  0\n",
            atom.coord.x,
            atom.coord.y,
            atom.coord.z,
            element_field(&atom.element),
            charge_code
        ));
    }

    let index_of: std::collections::HashMap<u32, usize> =
        model.atoms.iter().enumerate().map(|(i, a)| (a.id, i + 1)).collect();
    for bond in model.bonds.iter() {
        let (Some(&a1), Some(&a2)) = (index_of.get(&bond.atom1), index_of.get(&bond.atom2)) else {
            return Err(CoreError::FileWriteError {
                file: model.name.clone(),
                message: format!("bond references unknown atom id {}-{}", bond.atom1, bond.atom2),
            });
        };
        out.push_str(&format!("{a1:>3}{a2:>3}  1  0  0  0\n"));
    }
    out.push_str("M  END\n");

    for (key, value) in model.data_fields.iter() {
        out.push_str(&format!(">  <{key}>\n"));
        match value {
            DataValue::None => out.push('\n'),
            DataValue::Number(n) => out.push_str(&format!("{n}\n")),
            DataValue::Text(t) => out.push_str(&format!("{t}\n")),
        }
        out.push('\n');
    }
    let mut score_keys: Vec<&String> = scores.keys().collect();
    score_keys.sort();
    for key in score_keys {
        out.push_str(&format!(">  <{key}>\n{}\n\n", scores[key]));
    }

    out.push_str("$$$$\n");
    Ok(())
}
