//! Desolvation (weighted solvent-accessible surface area) term (spec
//! §4.4.6).

use crate::model::{AtomId, Model};

#[derive(Debug, Clone, Copy)]
pub struct AtomSolvationParams {
    pub radius: f64,
    pub point_density: f64,
    pub asp: f64,
    pub charge_scaled: bool,
}

impl Default for AtomSolvationParams {
    fn default() -> AtomSolvationParams {
        AtomSolvationParams { radius: 1.7, point_density: 5.0, asp: 0.005, charge_scaled: false }
    }
}

fn params_for(model: &Model, id: AtomId) -> AtomSolvationParams {
    let mut p = AtomSolvationParams::default();
    if let Some(atom) = model.atom(id) {
        p.radius = match atom.element.as_str() {
            "O" => 1.52,
            "N" => 1.55,
            "S" => 1.80,
            "H" => 1.20,
            _ => 1.70,
        };
        if p.charge_scaled {
            p.asp *= 1.0 + atom.group_charge.abs();
        }
    }
    p
}

/// Pairwise overlap `P_ij`: the fractional surface area atom `i` loses to
/// atom `j` as they approach, decaying to 0 beyond the sum of radii plus a
/// solvent probe diameter.
fn overlap(r: f64, pi: AtomSolvationParams, pj: AtomSolvationParams) -> f64 {
    let cutoff = pi.radius + pj.radius + 2.8;
    if r >= cutoff || cutoff <= 0.0 {
        return 0.0;
    }
    (1.0 - r / cutoff).clamp(0.0, 1.0)
}

fn full_surface_area(p: AtomSolvationParams) -> f64 {
    4.0 * std::f64::consts::PI * p.radius * p.radius * (p.point_density / 5.0)
}

/// Per-atom free surface area given a set of neighbours, within one model
/// (intramolecular, invariant once bonds are fixed) or across both
/// (intermolecular, bound state).
fn surface_areas(model: &Model, others: &[(AtomId, &Model)]) -> Vec<(AtomId, f64)> {
    model
        .atoms
        .iter()
        .map(|atom| {
            let pi = params_for(model, atom.id);
            let mut area = full_surface_area(pi);
            for &(other_id, other_model) in others.iter() {
                if std::ptr::eq(model, other_model) && other_id == atom.id {
                    continue;
                }
                if let Some(other_atom) = other_model.atom(other_id) {
                    let r = atom.coord.distance(&other_atom.coord);
                    let pj = params_for(other_model, other_id);
                    area *= 1.0 - overlap(r, pi, pj);
                }
            }
            (atom.id, area.max(0.0))
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct DesolvationSF {
    receptor_free: f64,
    ligand_free_initial: f64,
    solvent_free_initial: f64,
}

impl DesolvationSF {
    pub fn new() -> DesolvationSF {
        DesolvationSF::default()
    }

    fn total_asp_weighted(model: &Model, areas: &[(AtomId, f64)]) -> f64 {
        areas
            .iter()
            .map(|&(id, area)| {
                let p = params_for(model, id);
                p.asp * area
            })
            .sum()
    }

    /// Records the three zero-point energies (spec §4.4.6): receptor,
    /// ligand and solvent each in their initial, unbound conformation.
    pub fn setup(&mut self, receptor: Option<&Model>, ligand: Option<&Model>, solvent: &[Model]) {
        self.receptor_free = receptor
            .map(|r| {
                let areas = surface_areas(r, &[]);
                Self::total_asp_weighted(r, &areas)
            })
            .unwrap_or(0.0);
        self.ligand_free_initial = ligand
            .map(|l| {
                let areas = surface_areas(l, &[]);
                Self::total_asp_weighted(l, &areas)
            })
            .unwrap_or(0.0);
        self.solvent_free_initial = solvent
            .iter()
            .map(|s| {
                let areas = surface_areas(s, &[]);
                Self::total_asp_weighted(s, &areas)
            })
            .sum();
    }

    /// Bound-state score: intermolecular change for each component plus
    /// intra-ligand and system changes relative to the recorded zero
    /// points (spec §4.4.6).
    pub fn raw_score(&self, receptor: Option<&Model>, ligand: Option<&Model>, solvent: &[Model]) -> f64 {
        let (Some(receptor), Some(ligand)) = (receptor, ligand) else { return 0.0 };
        if ligand.atoms.is_empty() {
            return 0.0;
        }
        let cross: Vec<(AtomId, &Model)> = receptor.atoms.iter().map(|a| (a.id, receptor)).collect();
        let ligand_bound_areas = surface_areas(ligand, &cross);
        let ligand_bound = Self::total_asp_weighted(ligand, &ligand_bound_areas);

        let ligand_cross: Vec<(AtomId, &Model)> = ligand.atoms.iter().map(|a| (a.id, ligand)).collect();
        let receptor_bound_areas = surface_areas(receptor, &ligand_cross);
        let receptor_bound = Self::total_asp_weighted(receptor, &receptor_bound_areas);

        let intermolecular = (receptor_bound - self.receptor_free) + (ligand_bound - self.ligand_free_initial);
        let solvent_bound: f64 = solvent
            .iter()
            .map(|s| {
                let areas = surface_areas(s, &ligand_cross);
                Self::total_asp_weighted(s, &areas)
            })
            .sum();
        let system_change = solvent_bound - self.solvent_free_initial;
        intermolecular + system_change
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vec3;
    use crate::model::Atom;

    #[test]
    fn empty_ligand_scores_zero() {
        let mut sf = DesolvationSF::new();
        let receptor = Model::new("rec", vec![Atom::new(1, "C", Vec3::ZERO)]);
        let ligand = Model::new("lig", vec![]);
        sf.setup(Some(&receptor), Some(&ligand), &[]);
        assert_eq!(sf.raw_score(Some(&receptor), Some(&ligand), &[]), 0.0);
    }

    #[test]
    fn no_receptor_or_ligand_scores_zero() {
        let sf = DesolvationSF::new();
        assert_eq!(sf.raw_score(None, None, &[]), 0.0);
    }
}
