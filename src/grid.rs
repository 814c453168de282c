//! Spatial indexing grids (spec §4.1, component C1). A uniform
//! axis-aligned grid over a min-corner, step vector and cell counts;
//! `InteractionGrid` and `NonBondedGrid` share the same `BaseGrid` index
//! math and differ only in what each cell stores.

use crate::error::{CoreError, CoreResult};
use crate::geom::Vec3;
use crate::ic::InteractionCenter;
use crate::model::AtomId;

#[derive(Debug, Clone, Copy)]
pub struct GridDims {
    pub min_corner: Vec3,
    pub step: Vec3,
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl GridDims {
    pub fn new(min_corner: Vec3, step: Vec3, nx: usize, ny: usize, nz: usize) -> CoreResult<GridDims> {
        if step.x <= 0.0 || step.y <= 0.0 || step.z <= 0.0 {
            return Err(CoreError::InvalidGrid(
                "grid step must be strictly positive in every dimension".into(),
            ));
        }
        Ok(GridDims { min_corner, step, nx, ny, nz })
    }

    pub fn len(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Half-diagonal of one cell: the compensating error radius spec §4.1
    /// asks every sphere query to add so that the cell-center sphere test
    /// never misses an atom that truly lies within range.
    pub fn max_error(&self) -> f64 {
        0.5 * 3f64.sqrt() * self.step.x.max(self.step.y).max(self.step.z)
    }

    fn axis_index(&self, coord: f64, min: f64, step: f64, n: usize) -> Option<usize> {
        if step <= 0.0 {
            return None;
        }
        let i = ((coord - min) / step).floor();
        if i < 0.0 || i as usize >= n {
            None
        } else {
            Some(i as usize)
        }
    }

    /// Row-major, Z-fastest flat index of the cell containing `coord`, or
    /// `None` if `coord` lies off-grid.
    pub fn index_of(&self, coord: &Vec3) -> Option<usize> {
        let ix = self.axis_index(coord.x, self.min_corner.x, self.step.x, self.nx)?;
        let iy = self.axis_index(coord.y, self.min_corner.y, self.step.y, self.ny)?;
        let iz = self.axis_index(coord.z, self.min_corner.z, self.step.z, self.nz)?;
        Some(self.flat_index(ix, iy, iz))
    }

    fn flat_index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        (ix * self.ny + iy) * self.nz + iz
    }

    /// The grid-point (cell min-corner) of the cell at flat index `i`.
    pub fn coord_of(&self, i: usize) -> Vec3 {
        let iz = i % self.nz;
        let iy = (i / self.nz) % self.ny;
        let ix = i / (self.nz * self.ny);
        Vec3::new(
            self.min_corner.x + ix as f64 * self.step.x,
            self.min_corner.y + iy as f64 * self.step.y,
            self.min_corner.z + iz as f64 * self.step.z,
        )
    }

    fn cell_center(&self, ix: usize, iy: usize, iz: usize) -> Vec3 {
        Vec3::new(
            self.min_corner.x + (ix as f64 + 0.5) * self.step.x,
            self.min_corner.y + (iy as f64 + 0.5) * self.step.y,
            self.min_corner.z + (iz as f64 + 0.5) * self.step.z,
        )
    }

    /// All flat cell indices whose cell-center lies within `radius` of
    /// `center`, using the cell center (not its extent) as the test point
    /// — callers are expected to have already inflated `radius` by
    /// `max_error()` plus any configured border.
    pub fn sphere_indices(&self, center: &Vec3, radius: f64) -> Vec<usize> {
        if radius <= 0.0 {
            return Vec::new();
        }
        let lo_x = ((center.x - radius - self.min_corner.x) / self.step.x).floor().max(0.0) as usize;
        let hi_x = (((center.x + radius - self.min_corner.x) / self.step.x).ceil() as isize)
            .clamp(0, self.nx as isize - 1) as usize;
        let lo_y = ((center.y - radius - self.min_corner.y) / self.step.y).floor().max(0.0) as usize;
        let hi_y = (((center.y + radius - self.min_corner.y) / self.step.y).ceil() as isize)
            .clamp(0, self.ny as isize - 1) as usize;
        let lo_z = ((center.z - radius - self.min_corner.z) / self.step.z).floor().max(0.0) as usize;
        let hi_z = (((center.z + radius - self.min_corner.z) / self.step.z).ceil() as isize)
            .clamp(0, self.nz as isize - 1) as usize;

        let mut out = Vec::new();
        if self.nx == 0 || self.ny == 0 || self.nz == 0 {
            return out;
        }
        let r2 = radius * radius;
        for ix in lo_x..=hi_x.min(self.nx.saturating_sub(1)) {
            for iy in lo_y..=hi_y.min(self.ny.saturating_sub(1)) {
                for iz in lo_z..=hi_z.min(self.nz.saturating_sub(1)) {
                    let cc = self.cell_center(ix, iy, iz);
                    if cc.distance(center) * cc.distance(center) <= r2 {
                        out.push(self.flat_index(ix, iy, iz));
                    }
                }
            }
        }
        out
    }
}

/// Grid whose cells hold interaction centers (vdW/polar/aromatic neighbor
/// lookups).
#[derive(Debug, Clone)]
pub struct InteractionGrid {
    pub dims: GridDims,
    cells: Vec<Vec<InteractionCenter>>,
}

impl InteractionGrid {
    pub fn new(dims: GridDims) -> InteractionGrid {
        let n = dims.len();
        InteractionGrid {
            dims,
            cells: vec![Vec::new(); n],
        }
    }

    /// Binds `ic` into every cell within `radius` (plus the grid's
    /// compensating error and border) of the IC's anchor atom.
    pub fn bind(&mut self, ic: &InteractionCenter, anchor: Vec3, radius: f64, border: f64) {
        let effective_radius = radius + self.dims.max_error() + border;
        for idx in self.dims.sphere_indices(&anchor, effective_radius) {
            self.cells[idx].push(ic.clone());
        }
    }

    pub fn ics_at(&self, coord: &Vec3) -> &[InteractionCenter] {
        match self.dims.index_of(coord) {
            Some(i) => &self.cells[i],
            None => &[],
        }
    }

    pub fn ics_at_index(&self, i: usize) -> &[InteractionCenter] {
        self.cells.get(i).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Sorts and dedups each cell's list by interaction-center identity.
    pub fn unique(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.sort_by_key(|ic| ic.identity_key());
            cell.dedup_by_key(|ic| ic.identity_key());
        }
    }

    pub fn clear(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.clear();
        }
    }
}

/// Grid whose cells hold plain atom ids (vdW inter, NMR STD lookups).
#[derive(Debug, Clone)]
pub struct NonBondedGrid {
    pub dims: GridDims,
    cells: Vec<Vec<AtomId>>,
}

impl NonBondedGrid {
    pub fn new(dims: GridDims) -> NonBondedGrid {
        let n = dims.len();
        NonBondedGrid {
            dims,
            cells: vec![Vec::new(); n],
        }
    }

    pub fn bind(&mut self, atom_id: AtomId, coord: Vec3, radius: f64, border: f64) {
        let effective_radius = radius + self.dims.max_error() + border;
        for idx in self.dims.sphere_indices(&coord, effective_radius) {
            self.cells[idx].push(atom_id);
        }
    }

    pub fn atoms_at(&self, coord: &Vec3) -> &[AtomId] {
        match self.dims.index_of(coord) {
            Some(i) => &self.cells[i],
            None => &[],
        }
    }

    pub fn unique(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.sort_unstable();
            cell.dedup();
        }
    }

    pub fn clear(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.clear();
        }
    }
}
