//! The data contract the core consumes from (and writes back to) its
//! external collaborators (spec §1, §3.1). Full model construction, bond
//! perception, and file I/O for these types are out of scope for the core
//! — callers build a [`Model`] elsewhere and hand it to a [`Workspace`]
//! slot. What lives here is only the shape the core's chromosome, grids and
//! scoring terms need to read and mutate.

use std::collections::HashMap;

use crate::geom::Vec3;

/// Stable identity of an atom across the run; `id - 1` indexes any
/// per-atom array sized to the owning model's atom count (spec §3.2).
pub type AtomId = u32;

#[derive(Debug, Clone)]
pub struct Atom {
    pub id: AtomId,
    pub element: String,
    pub coord: Vec3,
    pub group_charge: f64,
    pub ff_type: String,
    pub enabled: bool,
    /// Scratch scalar used by scoring terms (formal charge / local density
    /// weighting in the polar term, invariant surface areas in desolvation).
    pub u1: f64,
    /// Scratch scalar used only in annotation mode (spec Design Notes, Open
    /// Question 3) to accumulate per-atom contributions; never read by a
    /// scoring term's own energy computation.
    pub u2: f64,
}

impl Atom {
    pub fn new(id: AtomId, element: &str, coord: Vec3) -> Atom {
        Atom {
            id,
            element: element.to_string(),
            coord,
            group_charge: 0.0,
            ff_type: element.to_string(),
            enabled: true,
            u1: 0.0,
            u2: 0.0,
        }
    }

    pub fn index(&self) -> usize {
        (self.id - 1) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bond {
    pub atom1: AtomId,
    pub atom2: AtomId,
    pub rotatable: bool,
}

/// The side of a rotatable bond that moves under `rotate_bond`: the set of
/// atom ids on the pendant (smaller) side, as computed once at model build
/// time by an external bond-perception step. The core only ever reads it.
#[derive(Debug, Clone)]
pub struct RotatableBond {
    pub bond: Bond,
    pub pendant_atoms: Vec<AtomId>,
}

#[derive(Debug, Clone, Default)]
pub enum DataValue {
    #[default]
    None,
    Number(f64),
    Text(String),
}

/// A graph of atoms and bonds (spec §3.1 "Model"). Field-for-field this is
/// the external collaborator's contract; the core never perceives bonds or
/// assigns force-field types itself.
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    pub rotatable_bonds: Vec<RotatableBond>,
    pub tethered_atoms: Vec<AtomId>,
    pub pseudo_atoms: Vec<PseudoAtom>,
    pub center_of_mass: Vec3,
    pub principal_axes: [Vec3; 3],
    saved_coords: Vec<Vec<Vec3>>,
    /// Pose captured at construction time, restored at the start of every
    /// `sync_to_model` pass (spec §3.2: a chromosome's elements store
    /// absolute values relative to this pose, not to whatever the model was
    /// last rotated to by some other chromosome sharing this slot).
    baseline: (Vec<Vec3>, Vec3),
    pub data_fields: HashMap<String, DataValue>,
    pub occupancy: f64,
    pub is_flexible: bool,
}

/// A pseudo-atom (ring centroid, lone-pair anchor, ...) whose coordinate is
/// the mean of its constituent real atoms; recomputed by
/// [`Model::update_pseudo_atoms`] after every `sync_to_model`.
#[derive(Debug, Clone)]
pub struct PseudoAtom {
    pub atom: Atom,
    pub constituents: Vec<AtomId>,
}

impl Model {
    pub fn new(name: &str, atoms: Vec<Atom>) -> Model {
        let center_of_mass = Vec3::mean(&atoms.iter().map(|a| a.coord).collect::<Vec<_>>());
        let baseline = (atoms.iter().map(|a| a.coord).collect(), center_of_mass);
        Model {
            name: name.to_string(),
            atoms,
            bonds: Vec::new(),
            rotatable_bonds: Vec::new(),
            tethered_atoms: Vec::new(),
            pseudo_atoms: Vec::new(),
            center_of_mass,
            principal_axes: [Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 1.0)],
            saved_coords: Vec::new(),
            baseline,
            data_fields: HashMap::new(),
            occupancy: 1.0,
            is_flexible: false,
        }
    }

    /// Restores every atom coordinate and the center of mass to the pose
    /// captured when this model was constructed, undoing any rotation or
    /// translation applied since. Called once at the top of every
    /// `Chrom::sync_to_model` so each chromosome's absolute values are
    /// applied against the same starting pose regardless of what pose a
    /// previously-scored chromosome left the model in.
    pub fn reset_to_baseline(&mut self) {
        let (coords, com) = &self.baseline;
        for (atom, c) in self.atoms.iter_mut().zip(coords.iter()) {
            atom.coord = *c;
        }
        self.center_of_mass = *com;
    }

    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.iter_mut().find(|a| a.id == id)
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.iter().find(|a| a.id == id)
    }

    /// Rigid-body translate every real atom so the center of mass matches
    /// `target` (§4.3.3 Position element).
    pub fn set_center_of_mass(&mut self, target: Vec3) {
        let delta = target - self.center_of_mass;
        for atom in self.atoms.iter_mut() {
            atom.coord = atom.coord + delta;
        }
        self.center_of_mass = target;
    }

    /// Rotates every real atom coordinate by `q` about the center of mass
    /// (§4.3.4 Orientation element).
    pub fn rotate_about_com(&mut self, q: crate::qt::Quaternion) {
        let com = self.center_of_mass;
        for atom in self.atoms.iter_mut() {
            let local = (atom.coord - com).to_array().to_vec();
            let rotated = q.rotate(local);
            atom.coord = com + Vec3::new(rotated[0], rotated[1], rotated[2]);
        }
    }

    /// Aligns principal axes to a target orthonormal frame (used by the
    /// Align transform's `mode=ALIGN` variant).
    pub fn align_principal_axes(&mut self, _target: [Vec3; 3]) {
        // Out of scope: full inertia-tensor diagonalisation belongs to the
        // external model-construction step. The core only needs the stored
        // `principal_axes` field to exist and be rotated consistently with
        // the atoms, which `rotate_about_com` already guarantees.
    }

    /// Applies a delta rotation of `delta_deg` about `bond`, rotating only
    /// the pendant side (§4.3.2 Dihedral element).
    pub fn rotate_bond(&mut self, bond: &RotatableBond, delta_deg: f64) {
        let a1 = self.atom(bond.bond.atom1).map(|a| a.coord);
        let a2 = self.atom(bond.bond.atom2).map(|a| a.coord);
        let (p1, p2) = match (a1, a2) {
            (Some(p1), Some(p2)) => (p1, p2),
            _ => return,
        };
        let axis = (p2 - p1).normalized();
        let q = crate::geom::axis_angle_quaternion(&axis, delta_deg);
        for &id in bond.pendant_atoms.iter() {
            if let Some(atom) = self.atom_mut(id) {
                let local = (atom.coord - p1).to_array().to_vec();
                let rotated = q.rotate(local);
                atom.coord = p1 + Vec3::new(rotated[0], rotated[1], rotated[2]);
            }
        }
    }

    /// Recomputes every pseudo-atom coordinate as the mean of its
    /// constituents (spec §3.2 invariant: "After sync_to_model the model's
    /// pseudo-atoms are recomputed").
    pub fn update_pseudo_atoms(&mut self) {
        let atoms = &self.atoms;
        for pseudo in self.pseudo_atoms.iter_mut() {
            let pts: Vec<Vec3> = pseudo
                .constituents
                .iter()
                .filter_map(|id| atoms.iter().find(|a| a.id == *id).map(|a| a.coord))
                .collect();
            if !pts.is_empty() {
                pseudo.atom.coord = Vec3::mean(&pts);
            }
        }
    }

    pub fn save_coords(&mut self) {
        self.saved_coords.push(self.atoms.iter().map(|a| a.coord).collect());
    }

    pub fn restore_coords(&mut self, snapshot: usize) -> bool {
        if let Some(coords) = self.saved_coords.get(snapshot).cloned() {
            for (atom, c) in self.atoms.iter_mut().zip(coords.into_iter()) {
                atom.coord = c;
            }
            true
        } else {
            false
        }
    }

    /// Sets the model-level enabled flag and propagates it to every atom
    /// (§4.3.5 Occupancy element).
    pub fn set_enabled(&mut self, enabled: bool) {
        for atom in self.atoms.iter_mut() {
            atom.enabled = enabled;
        }
    }
}

/// Axis-aligned bounding box over a docking site's cavity.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn contains(&self, p: &Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }
}

/// The docking site's cavity: a sparse set of grid points the Align
/// transform samples from and the cavity-fill descriptor consumes.
#[derive(Debug, Clone)]
pub struct DockingSite {
    pub bounding_box: BoundingBox,
    pub cavity_coords: Vec<Vec3>,
}

impl DockingSite {
    pub fn new(bounding_box: BoundingBox, cavity_coords: Vec<Vec3>) -> DockingSite {
        DockingSite {
            bounding_box,
            cavity_coords,
        }
    }

    /// Returns the subset of `atoms` whose coordinate lies within
    /// `[inner, outer]` of any cavity point.
    pub fn atoms_in_range<'a>(&self, atoms: &'a [Atom], inner: f64, outer: f64) -> Vec<&'a Atom> {
        atoms
            .iter()
            .filter(|a| self.point_in_range(&a.coord, inner, outer))
            .collect()
    }

    pub fn point_in_range(&self, p: &Vec3, inner: f64, outer: f64) -> bool {
        self.cavity_coords.iter().any(|c| {
            let d = c.distance(p);
            d >= inner && d <= outer
        })
    }

    pub fn cavity_com(&self) -> Vec3 {
        Vec3::mean(&self.cavity_coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> Model {
        let atoms = vec![
            Atom::new(1, "C", Vec3::new(0.0, 0.0, 0.0)),
            Atom::new(2, "C", Vec3::new(2.0, 0.0, 0.0)),
        ];
        Model::new("lig", atoms)
    }

    #[test]
    fn set_center_of_mass_translates_rigidly() {
        let mut m = sample_model();
        let d0 = m.atoms[0].coord.distance(&m.atoms[1].coord);
        m.set_center_of_mass(Vec3::new(10.0, 10.0, 10.0));
        assert!((m.center_of_mass.distance(&Vec3::new(10.0, 10.0, 10.0))).abs() < 1e-9);
        let d1 = m.atoms[0].coord.distance(&m.atoms[1].coord);
        assert!((d0 - d1).abs() < 1e-9);
    }

    #[test]
    fn pseudo_atom_tracks_mean() {
        let mut m = sample_model();
        m.pseudo_atoms.push(PseudoAtom {
            atom: Atom::new(100, "X", Vec3::ZERO),
            constituents: vec![1, 2],
        });
        m.update_pseudo_atoms();
        assert_eq!(m.pseudo_atoms[0].atom.coord, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn docking_site_range_query() {
        let site = DockingSite::new(
            BoundingBox {
                min: Vec3::new(-5.0, -5.0, -5.0),
                max: Vec3::new(5.0, 5.0, 5.0),
            },
            vec![Vec3::ZERO],
        );
        let atoms = vec![Atom::new(1, "C", Vec3::new(1.0, 0.0, 0.0))];
        assert_eq!(site.atoms_in_range(&atoms, 0.0, 2.0).len(), 1);
        assert_eq!(site.atoms_in_range(&atoms, 0.0, 0.5).len(), 0);
    }
}
