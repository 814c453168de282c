//! Dihedral chromosome element (spec §4.3.2): one angular slot (degrees,
//! standardised onto `(-180, 180]`) for a single rotatable bond.
//!
//! `Model::rotate_bond` is a delta operation, so `sync_to_model` rotates by
//! the cyclic difference between `value` and `last_applied` rather than
//! setting the torsion absolutely. `Chrom::sync_to_model` resets the model
//! slot to its baseline pose first, so in practice the delta is always taken
//! from `initial` unless a caller has explicitly `commit()`-ed otherwise.

use crate::constants::{DIHEDRAL_MAX, DIHEDRAL_MIN, DIHEDRAL_RANGE};
use crate::error::{CoreError, CoreResult};
use crate::model::{Model, RotatableBond};
use crate::rng::Rand;

use super::Mode;

/// Canonicalises `angle` onto `(-180, 180]` (spec §4.3.2).
pub fn standardised_value(angle: f64) -> f64 {
    let mut a = angle % DIHEDRAL_RANGE;
    if a <= DIHEDRAL_MIN {
        a += DIHEDRAL_RANGE;
    } else if a > DIHEDRAL_MAX {
        a -= DIHEDRAL_RANGE;
    }
    a
}

/// Shortest signed angular distance from `b` to `a`, in `(-180, 180]`.
fn cyclic_diff(a: f64, b: f64) -> f64 {
    standardised_value(a - b)
}

#[derive(Debug, Clone)]
pub struct DihedralElement {
    pub model_idx: usize,
    pub bond: RotatableBond,
    initial: f64,
    value: f64,
    /// Value actually baked into the model as of the last `sync_to_model`.
    last_applied: f64,
    mode: Mode,
    max_delta: f64,
    step: f64,
}

impl DihedralElement {
    pub fn new(model_idx: usize, bond: RotatableBond, initial: f64, mode: Mode, max_delta: f64, step: f64) -> DihedralElement {
        let initial = standardised_value(initial);
        DihedralElement {
            model_idx,
            bond,
            initial,
            value: initial,
            last_applied: initial,
            mode,
            max_delta,
            step,
        }
    }

    pub fn length(&self) -> usize {
        1
    }

    pub fn xover_length(&self) -> usize {
        1
    }

    pub fn reset(&mut self) {
        self.value = self.initial;
    }

    pub fn randomise(&mut self, rng: &mut Rand, _models: &[Model]) {
        match self.mode {
            Mode::Fixed => {}
            Mode::Tethered => {
                let delta = rng.uniform_range(-self.max_delta, self.max_delta);
                self.value = standardised_value(self.initial + delta);
            }
            Mode::Free => {
                self.value = standardised_value(rng.uniform_range(DIHEDRAL_MIN, DIHEDRAL_MAX));
            }
        }
    }

    pub fn mutate(&mut self, rel_step: f64, rng: &mut Rand) {
        if self.mode == Mode::Fixed {
            return;
        }
        let delta = rng.uniform_range(-1.0, 1.0) * self.step * rel_step;
        let mut candidate = standardised_value(self.value + delta);
        if self.mode == Mode::Tethered {
            let offset = cyclic_diff(candidate, self.initial);
            if offset.abs() > self.max_delta {
                candidate = standardised_value(self.initial + self.max_delta * offset.signum());
            }
        }
        self.value = candidate;
    }

    /// Identity read: like Orientation, the absolute dihedral isn't
    /// recoverable from `Model` without external geometry analysis.
    pub fn sync_from_model(&mut self, _models: &[Model]) {}

    pub fn sync_to_model(&self, models: &mut [Model]) {
        if let Some(model) = models.get_mut(self.model_idx) {
            let delta = cyclic_diff(self.value, self.last_applied);
            model.rotate_bond(&self.bond, delta);
        }
    }

    pub fn get_vector(&self, v: &mut Vec<f64>) {
        v.push(self.value);
    }

    pub fn set_vector(&mut self, v: &[f64], i: &mut usize) -> CoreResult<()> {
        let val = *v.get(*i).ok_or_else(|| CoreError::bad_argument("dihedral vector underflow"))?;
        self.value = standardised_value(val);
        *i += 1;
        Ok(())
    }

    pub fn get_xover_vector(&self, v: &mut Vec<Vec<f64>>) {
        v.push(vec![self.value]);
    }

    pub fn set_xover_vector(&mut self, v: &[Vec<f64>], i: &mut usize) -> CoreResult<()> {
        let group = v.get(*i).ok_or_else(|| CoreError::bad_argument("dihedral xover underflow"))?;
        self.value = standardised_value(group[0]);
        *i += 1;
        Ok(())
    }

    pub fn get_step_vector(&self, v: &mut Vec<f64>) {
        v.push(self.step);
    }

    /// Cyclic step-normalised distance: wraps through the shortest arc
    /// rather than the naive linear difference (spec §8.1 invariant 4).
    pub fn compare_vector(&self, v: &[f64], i: &mut usize) -> f64 {
        let other = v[*i];
        *i += 1;
        if self.step <= 0.0 {
            return 0.0;
        }
        cyclic_diff(self.value, other).abs() / self.step
    }

    pub fn commit(&mut self) {
        self.last_applied = self.value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Bond;

    fn bond() -> RotatableBond {
        RotatableBond {
            bond: Bond { atom1: 1, atom2: 2, rotatable: true },
            pendant_atoms: vec![3, 4],
        }
    }

    #[test]
    fn standardised_value_wraps_into_range() {
        assert!((standardised_value(190.0) - (-170.0)).abs() < 1e-9);
        assert!((standardised_value(-190.0) - 170.0).abs() < 1e-9);
        assert!((standardised_value(180.0) - 180.0).abs() < 1e-9);
        assert!((standardised_value(-180.0) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn cyclic_compare_is_shorter_than_linear_near_wraparound() {
        let e = DihedralElement::new(0, bond(), 179.0, Mode::Free, 30.0, 10.0);
        let mut i = 0;
        let d = e.compare_vector(&[-179.0], &mut i);
        // linear diff would be 358/10 = 35.8; cyclic diff is 2/10 = 0.2
        assert!(d < 1.0);
    }

    #[test]
    fn fixed_mode_randomise_is_noop() {
        let mut e = DihedralElement::new(0, bond(), 10.0, Mode::Fixed, 30.0, 10.0);
        let mut rng = Rand::new(4);
        e.randomise(&mut rng, &[]);
        assert_eq!(e.value, 10.0);
    }
}
