//! Intermolecular van der Waals term (spec §4.4.2): ligand atoms scored
//! against a non-bonded grid of receptor atoms within the docking site.

use crate::grid::{GridDims, NonBondedGrid};
use crate::model::Model;
use crate::request::Request;

use super::common::{lj_pair_energy, vdw_params};

#[derive(Debug, Clone)]
pub struct VdwInterSF {
    pub ecut: f64,
    pub range: f64,
    grid: Option<NonBondedGrid>,
}

impl VdwInterSF {
    pub fn new(ecut: f64, range: f64) -> VdwInterSF {
        VdwInterSF { ecut, range, grid: None }
    }

    /// Rebuilds the receptor non-bonded grid from scratch (spec §3.3:
    /// "Grids... are reconstructed whenever the underlying model is
    /// reassigned").
    pub fn setup(&mut self, receptor: Option<&Model>, site_step: f64) {
        let Some(receptor) = receptor else {
            self.grid = None;
            return;
        };
        if receptor.atoms.is_empty() {
            self.grid = None;
            return;
        }
        let mut min = receptor.atoms[0].coord;
        let mut max = receptor.atoms[0].coord;
        for a in receptor.atoms.iter() {
            min.x = min.x.min(a.coord.x);
            min.y = min.y.min(a.coord.y);
            min.z = min.z.min(a.coord.z);
            max.x = max.x.max(a.coord.x);
            max.y = max.y.max(a.coord.y);
            max.z = max.z.max(a.coord.z);
        }
        let pad = self.range + site_step;
        min = min - crate::geom::Vec3::new(pad, pad, pad);
        let span = max - min + crate::geom::Vec3::new(2.0 * pad, 2.0 * pad, 2.0 * pad);
        let nx = ((span.x / site_step).ceil() as usize).max(1);
        let ny = ((span.y / site_step).ceil() as usize).max(1);
        let nz = ((span.z / site_step).ceil() as usize).max(1);
        let dims = match GridDims::new(min, crate::geom::Vec3::new(site_step, site_step, site_step), nx, ny, nz) {
            Ok(d) => d,
            Err(_) => {
                self.grid = None;
                return;
            }
        };
        let mut grid = NonBondedGrid::new(dims);
        for a in receptor.atoms.iter().filter(|a| a.enabled) {
            grid.bind(a.id, a.coord, self.range, 0.0);
        }
        grid.unique();
        self.grid = Some(grid);
    }

    /// Fails silently with 0 when either the grid or the ligand is absent
    /// (spec §4.4.2).
    pub fn raw_score(&self, receptor: Option<&Model>, ligand: Option<&Model>) -> f64 {
        let (Some(grid), Some(receptor), Some(ligand)) = (self.grid.as_ref(), receptor, ligand) else {
            return 0.0;
        };
        let mut total = 0.0;
        for latom in ligand.atoms.iter().filter(|a| a.enabled) {
            let lp = vdw_params(&latom.ff_type);
            for &rid in grid.atoms_at(&latom.coord) {
                let Some(ratom) = receptor.atom(rid) else { continue };
                if !ratom.enabled {
                    continue;
                }
                let r = latom.coord.distance(&ratom.coord);
                if r > self.range {
                    continue;
                }
                let rp = vdw_params(&ratom.ff_type);
                total += lj_pair_energy(r, lp, rp, self.ecut);
            }
        }
        total
    }

    pub fn handle_request(&mut self, req: &Request, name: &str) -> bool {
        match req {
            Request::SetParamTerm(term, param, value) if term == name && param == "ecut" => {
                self.ecut = *value;
                true
            }
            _ => false,
        }
    }
}
