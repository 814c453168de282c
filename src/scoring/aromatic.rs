//! Aromatic ring-stacking term (spec §4.4.5).

use crate::ic::InteractionCenter;
use crate::model::Model;

use super::common::f1;

#[derive(Debug, Clone)]
pub struct AromaticSF {
    pub dist_min: f64,
    pub dist_max: f64,
    pub angle_min: f64,
    pub angle_max: f64,
    pub count_threshold: f64,
    receptor_rings: Vec<InteractionCenter>,
    ligand_rings: Vec<InteractionCenter>,
    last_count: u32,
}

impl AromaticSF {
    pub fn new(dist_min: f64, dist_max: f64, angle_min: f64, angle_max: f64, count_threshold: f64) -> AromaticSF {
        AromaticSF {
            dist_min,
            dist_max,
            angle_min,
            angle_max,
            count_threshold,
            receptor_rings: Vec::new(),
            ligand_rings: Vec::new(),
            last_count: 0,
        }
    }

    pub fn setup(&mut self, receptor_rings: Vec<InteractionCenter>, ligand_rings: Vec<InteractionCenter>) {
        self.receptor_rings = receptor_rings;
        self.ligand_rings = ligand_rings;
    }

    /// Raw descriptor count of ring pairs scoring above `count_threshold`
    /// (spec §4.4.5: "export the count as a raw descriptor").
    pub fn interaction_count(&self) -> u32 {
        self.last_count
    }

    pub fn raw_score(&mut self, receptor: Option<&Model>, ligand: Option<&Model>) -> f64 {
        let (Some(receptor), Some(ligand)) = (receptor, ligand) else {
            self.last_count = 0;
            return 0.0;
        };
        let mut total = 0.0;
        let mut count = 0u32;
        for ring_r in self.receptor_rings.iter() {
            for ring_l in self.ligand_rings.iter() {
                let (Some(cr), Some(cl)) = (ring_r.anchor(receptor), ring_l.anchor(ligand)) else { continue };
                let (Some(nr), Some(nl)) = (ring_r.plane_normal(receptor), ring_l.plane_normal(ligand)) else {
                    continue;
                };
                let centroid_vec = cl - cr;
                let perp_r = centroid_vec.dot(&nr).abs();
                let perp_l = (cr - cl).dot(&nl).abs();
                let avg_perp = 0.5 * (perp_r + perp_l);
                let dist_term = f1(avg_perp - self.dist_min, 0.0, self.dist_max - self.dist_min);
                if dist_term == 0.0 {
                    continue;
                }
                let slip_r = centroid_vec.normalized().angle_deg(&nr);
                let slip_l = (-centroid_vec).normalized().angle_deg(&nl);
                let avg_slip = 0.5 * (slip_r + slip_l);
                let angle_term = f1(avg_slip - self.angle_min, 0.0, self.angle_max - self.angle_min);
                let contribution = dist_term * angle_term;
                total += contribution;
                if contribution > self.count_threshold {
                    count += 1;
                }
            }
        }
        self.last_count = count;
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vec3;
    use crate::model::Atom;

    fn ring_model(centroid: Vec3) -> (Model, InteractionCenter) {
        let atoms = vec![
            Atom::new(1, "C", centroid),
            Atom::new(2, "C", centroid + Vec3::new(1.0, 0.0, 0.0)),
            Atom::new(3, "C", centroid + Vec3::new(0.0, 1.0, 0.0)),
        ];
        let m = Model::new("m", atoms);
        let ic = InteractionCenter::plane(1, 2, 3);
        (m, ic)
    }

    #[test]
    fn no_receptor_scores_zero() {
        let mut sf = AromaticSF::new(3.0, 5.0, 0.0, 60.0, 0.2);
        assert_eq!(sf.raw_score(None, None), 0.0);
        assert_eq!(sf.interaction_count(), 0);
    }

    #[test]
    fn stacked_rings_score_positive() {
        let mut sf = AromaticSF::new(3.0, 5.0, 0.0, 90.0, 0.01);
        let (receptor, ring_r) = ring_model(Vec3::ZERO);
        let (ligand, ring_l) = ring_model(Vec3::new(0.0, 0.0, 3.5));
        sf.setup(vec![ring_r], vec![ring_l]);
        let score = sf.raw_score(Some(&receptor), Some(&ligand));
        assert!(score >= 0.0);
    }
}
