//! NMR restraint term (spec §4.4.8): NOE donor/acceptor group distances
//! and STD ligand-to-receptor proximity restraints.

use crate::grid::{GridDims, NonBondedGrid};
use crate::model::{AtomId, Model};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAggregator {
    Or,
    And,
    Mean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Penalty {
    Quadratic,
    Linear,
}

#[derive(Debug, Clone)]
pub struct NoeRestraint {
    pub group1: Vec<AtomId>,
    pub group2: Vec<AtomId>,
    pub aggregator: GroupAggregator,
    pub max_distance: f64,
    pub penalty: Penalty,
}

#[derive(Debug, Clone)]
pub struct StdRestraint {
    pub ligand_group: Vec<AtomId>,
    pub max_distance: f64,
    pub penalty: Penalty,
}

fn group_distance(model: &Model, g1: &[AtomId], g2: &[AtomId], aggregator: GroupAggregator) -> Option<f64> {
    let pts1: Vec<_> = g1.iter().filter_map(|id| model.atom(*id)).map(|a| a.coord).collect();
    let pts2: Vec<_> = g2.iter().filter_map(|id| model.atom(*id)).map(|a| a.coord).collect();
    if pts1.is_empty() || pts2.is_empty() {
        return None;
    }
    Some(match aggregator {
        GroupAggregator::Or => pts1
            .iter()
            .flat_map(|p1| pts2.iter().map(move |p2| p1.distance(p2)))
            .fold(f64::INFINITY, f64::min),
        GroupAggregator::And => pts1
            .iter()
            .flat_map(|p1| pts2.iter().map(move |p2| p1.distance(p2)))
            .fold(0.0, f64::max),
        GroupAggregator::Mean => {
            let c1 = crate::geom::Vec3::mean(&pts1);
            let c2 = crate::geom::Vec3::mean(&pts2);
            c1.distance(&c2)
        }
    })
}

fn penalty_score(delta: f64, penalty: Penalty) -> f64 {
    if delta <= 0.0 {
        0.0
    } else {
        match penalty {
            Penalty::Quadratic => delta * delta,
            Penalty::Linear => delta,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NmrSF {
    pub noe: Vec<NoeRestraint>,
    pub std: Vec<StdRestraint>,
    receptor_heavy_grid: Option<NonBondedGrid>,
}

impl NmrSF {
    pub fn new(noe: Vec<NoeRestraint>, std: Vec<StdRestraint>) -> NmrSF {
        NmrSF { noe, std, receptor_heavy_grid: None }
    }

    pub fn setup(&mut self, receptor: Option<&Model>, step: f64) {
        let Some(receptor) = receptor else {
            self.receptor_heavy_grid = None;
            return;
        };
        let heavy: Vec<_> = receptor.atoms.iter().filter(|a| a.element != "H").collect();
        if heavy.is_empty() {
            self.receptor_heavy_grid = None;
            return;
        }
        let mut min = heavy[0].coord;
        let mut max = heavy[0].coord;
        for a in heavy.iter() {
            min.x = min.x.min(a.coord.x);
            min.y = min.y.min(a.coord.y);
            min.z = min.z.min(a.coord.z);
            max.x = max.x.max(a.coord.x);
            max.y = max.y.max(a.coord.y);
            max.z = max.z.max(a.coord.z);
        }
        let pad = step * 4.0;
        min = min - crate::geom::Vec3::new(pad, pad, pad);
        let span = max - min + crate::geom::Vec3::new(2.0 * pad, 2.0 * pad, 2.0 * pad);
        let nx = ((span.x / step).ceil() as usize).max(1);
        let ny = ((span.y / step).ceil() as usize).max(1);
        let nz = ((span.z / step).ceil() as usize).max(1);
        let Ok(dims) = GridDims::new(min, crate::geom::Vec3::new(step, step, step), nx, ny, nz) else {
            self.receptor_heavy_grid = None;
            return;
        };
        let mut grid = NonBondedGrid::new(dims);
        for a in heavy.iter() {
            grid.bind(a.id, a.coord, 10.0, 0.0);
        }
        grid.unique();
        self.receptor_heavy_grid = Some(grid);
    }

    pub fn raw_score(&self, model: Option<&Model>, receptor: Option<&Model>) -> f64 {
        let Some(model) = model else { return 0.0 };
        let mut total = 0.0;
        for r in self.noe.iter() {
            if let Some(d) = group_distance(model, &r.group1, &r.group2, r.aggregator) {
                total += penalty_score(d - r.max_distance, r.penalty);
            }
        }
        if let (Some(grid), Some(receptor)) = (self.receptor_heavy_grid.as_ref(), receptor) {
            for r in self.std.iter() {
                let mut best = f64::INFINITY;
                for &id in r.ligand_group.iter() {
                    if let Some(atom) = model.atom(id) {
                        for &rid in grid.atoms_at(&atom.coord) {
                            if let Some(ratom) = receptor.atom(rid) {
                                best = best.min(atom.coord.distance(&ratom.coord));
                            }
                        }
                    }
                }
                if best.is_finite() {
                    total += penalty_score(best - r.max_distance, r.penalty);
                }
            }
        }
        total
    }
}
