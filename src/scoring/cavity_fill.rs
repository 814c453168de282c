//! Cavity-fill descriptor term (spec §4.4.9): a post-filter descriptor,
//! not a scoring contribution — `raw_score` always returns 0.

use crate::model::{DockingSite, Model};

#[derive(Debug, Clone, Copy, Default)]
pub struct CavityFillCoverage {
    pub receptor_excluded_pct: f64,
    pub cavity_pct: f64,
    pub ligand_excluded_pct: f64,
    pub residual_void_pct: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CavityFillSF {
    pub last_coverage: CavityFillCoverage,
}

impl CavityFillSF {
    pub fn new() -> CavityFillSF {
        CavityFillSF::default()
    }

    /// Samples coverage of the docking-site cavity grid by receptor and
    /// ligand heavy atoms. Used only as a post-filter descriptor; never
    /// contributes to `score()`.
    pub fn setup(&mut self, site: &DockingSite, receptor: Option<&Model>, ligand: Option<&Model>) {
        let total = site.cavity_coords.len().max(1) as f64;
        let receptor_hits = receptor
            .map(|r| site.cavity_coords.iter().filter(|c| site.point_in_range(c, 0.0, 1.5) && near_any(r, c)).count())
            .unwrap_or(0);
        let ligand_hits = ligand
            .map(|l| site.cavity_coords.iter().filter(|c| site.point_in_range(c, 0.0, 1.5) && near_any(l, c)).count())
            .unwrap_or(0);
        self.last_coverage = CavityFillCoverage {
            receptor_excluded_pct: 100.0 * receptor_hits as f64 / total,
            cavity_pct: 100.0,
            ligand_excluded_pct: 100.0 * ligand_hits as f64 / total,
            residual_void_pct: (100.0 - 100.0 * (receptor_hits + ligand_hits) as f64 / total).max(0.0),
        };
    }

    /// `PrintWeightMatrix` in the source is a debug-only no-op outside
    /// calibration builds (Open Question 1); kept as a deliberate no-op.
    pub fn print_weight_matrix(&self) {}

    pub fn raw_score(&self) -> f64 {
        0.0
    }
}

fn near_any(model: &Model, point: &crate::geom::Vec3) -> bool {
    model.atoms.iter().any(|a| a.coord.distance(point) < 1.5)
}
