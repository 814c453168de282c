//! Polar (H-bond / metal / guanidinium) term (spec §4.4.4).

use crate::constants::LP_PHI_IDEAL;
use crate::ic::{Geom, InteractionCenter};
use crate::model::{Atom, Bond, Model};

use super::common::f1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolarRole {
    Donor,
    Acceptor,
}

/// Builds donor/acceptor interaction centers for one model using a bonded
/// heuristic (spec §4.2 "Polar acceptors"/"Polar donors", simplified:
/// the core receives an already-typed model and infers role from element
/// and bond count rather than perceiving hybridisation itself).
pub fn build_polar_ics(model: &Model) -> Vec<(PolarRole, InteractionCenter)> {
    let mut out = Vec::new();
    let bonded_heavy = |atom_id: u32, bonds: &[Bond]| -> Vec<u32> {
        bonds
            .iter()
            .filter_map(|b| {
                if b.atom1 == atom_id {
                    Some(b.atom2)
                } else if b.atom2 == atom_id {
                    Some(b.atom1)
                } else {
                    None
                }
            })
            .collect()
    };
    for atom in model.atoms.iter() {
        match atom.element.as_str() {
            "H" => {
                let parents = bonded_heavy(atom.id, &model.bonds);
                if let Some(&parent) = parents.iter().find(|&&p| {
                    model.atom(p).map(|a| matches!(a.element.as_str(), "N" | "O" | "S")).unwrap_or(false)
                }) {
                    out.push((PolarRole::Donor, InteractionCenter::point_axis(atom.id, parent)));
                }
            }
            "O" | "N" | "S" => {
                let neighbours = bonded_heavy(atom.id, &model.bonds);
                match neighbours.len() {
                    0 => {}
                    1 => out.push((PolarRole::Acceptor, InteractionCenter::point_axis(atom.id, neighbours[0]))),
                    _ => {
                        // Pick the first two heavy neighbours to define a plane.
                        out.push((
                            PolarRole::Acceptor,
                            InteractionCenter::plane(atom.id, neighbours[0], neighbours[1]),
                        ));
                    }
                }
            }
            _ => {}
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct PolarSF {
    pub r12: f64,
    pub r12_tol: f64,
    pub ideal_angle: f64,
    pub angle_tol: f64,
    receptor_ics: Vec<(PolarRole, InteractionCenter)>,
    ligand_ics: Vec<(PolarRole, InteractionCenter)>,
}

impl PolarSF {
    pub fn new(r12: f64, r12_tol: f64, ideal_angle: f64, angle_tol: f64) -> PolarSF {
        PolarSF {
            r12,
            r12_tol,
            ideal_angle,
            angle_tol,
            receptor_ics: Vec::new(),
            ligand_ics: Vec::new(),
        }
    }

    pub fn setup(&mut self, receptor: Option<&Model>, ligand: Option<&Model>) {
        self.receptor_ics = receptor.map(build_polar_ics).unwrap_or_default();
        self.ligand_ics = ligand.map(build_polar_ics).unwrap_or_default();
    }

    fn pair_score(&self, model_a: &Model, a: &InteractionCenter, model_b: &Model, b: &InteractionCenter) -> f64 {
        if !a.enabled(model_a) || !b.enabled(model_b) {
            return 0.0;
        }
        let (Some(pa), Some(pb)) = (a.anchor(model_a), b.anchor(model_b)) else {
            return 0.0;
        };
        let r = pa.distance(&pb);
        let dist_term = f1(r - self.r12, 0.0, self.r12_tol);
        if dist_term == 0.0 {
            return 0.0;
        }
        let mut angular = 1.0;
        if let Some(axis_a) = a.axis(model_a) {
            let to_partner = (pb - pa).normalized();
            let angle = axis_a.angle_deg(&to_partner);
            angular *= f1(angle - self.ideal_angle, 0.0, self.angle_tol);
        }
        if a.geom == Geom::LonePair {
            if let (Some(dir), Some(normal)) = (a.lone_pair_direction(model_a), a.plane_normal(model_a)) {
                let to_partner = (pb - pa).normalized();
                let in_plane = to_partner - normal * normal.dot(&to_partner);
                let phi = dir.angle_deg(&in_plane);
                angular *= f1(phi - LP_PHI_IDEAL, 0.0, self.angle_tol);
            }
        }
        let scale = |atoms: Vec<&Atom>| atoms.iter().map(|a| a.u1).fold(1.0, f64::max).max(0.0);
        let charge_scale = scale(a.resolved_atoms(model_a)) * scale(b.resolved_atoms(model_b));
        dist_term * angular * charge_scale.max(0.1)
    }

    pub fn raw_score(&self, receptor: Option<&Model>, ligand: Option<&Model>) -> f64 {
        let (Some(receptor), Some(ligand)) = (receptor, ligand) else { return 0.0 };
        let mut total = 0.0;
        for (role_r, ic_r) in self.receptor_ics.iter() {
            for (role_l, ic_l) in self.ligand_ics.iter() {
                if role_r == role_l {
                    continue; // donor-donor / acceptor-acceptor handled as repulsive elsewhere
                }
                total += self.pair_score(receptor, ic_r, ligand, ic_l);
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vec3;

    fn donor_acceptor_pair(distance: f64) -> (Model, Model) {
        let mut rec = Model::new("rec", vec![Atom::new(1, "O", Vec3::new(0.0, 0.0, 0.0)), Atom::new(2, "C", Vec3::new(1.0, 0.0, 0.0))]);
        rec.bonds = vec![Bond { atom1: 1, atom2: 2, rotatable: false }];
        let mut lig = Model::new(
            "lig",
            vec![Atom::new(1, "N", Vec3::new(distance, 0.0, 0.0)), Atom::new(2, "H", Vec3::new(distance + 1.0, 0.0, 0.0))],
        );
        lig.bonds = vec![Bond { atom1: 1, atom2: 2, rotatable: false }];
        (rec, lig)
    }

    #[test]
    fn empty_ligand_scores_zero() {
        let mut sf = PolarSF::new(2.9, 0.5, 0.0, 60.0);
        let (rec, _) = donor_acceptor_pair(3.0);
        let empty = Model::new("lig", vec![]);
        sf.setup(Some(&rec), Some(&empty));
        assert_eq!(sf.raw_score(Some(&rec), Some(&empty)), 0.0);
    }

    #[test]
    fn far_apart_pair_scores_zero() {
        let mut sf = PolarSF::new(2.9, 0.5, 0.0, 60.0);
        let (rec, lig) = donor_acceptor_pair(50.0);
        sf.setup(Some(&rec), Some(&lig));
        assert_eq!(sf.raw_score(Some(&rec), Some(&lig)), 0.0);
    }
}
