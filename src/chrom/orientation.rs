//! Orientation chromosome element (spec §4.3.4): three Euler-angle slots
//! (radians), relative to the model's initial pose at construction time.
//!
//! `Model` only exposes a delta rotation (`rotate_about_com`), never an
//! absolute "set the orientation to X" operation, so this element tracks
//! the last orientation it actually applied and, on `sync_to_model`,
//! rotates by the quaternion difference between the new and last-applied
//! values rather than the absolute value itself. `Chrom::sync_to_model`
//! resets the model slot to its baseline pose before calling this, so the
//! delta is always taken from `initial` unless a caller has explicitly
//! `commit()`-ed a different baseline for this element.

use crate::error::{CoreError, CoreResult};
use crate::geom::{axis_angle_quaternion, Vec3};
use crate::model::Model;
use crate::qt::Quaternion;
use crate::rng::Rand;

use super::Mode;

fn euler_to_quaternion(euler: Vec3) -> Quaternion {
    let qz = axis_angle_quaternion(&Vec3::new(0.0, 0.0, 1.0), euler.z.to_degrees());
    let qy = axis_angle_quaternion(&Vec3::new(0.0, 1.0, 0.0), euler.y.to_degrees());
    let qx = axis_angle_quaternion(&Vec3::new(1.0, 0.0, 0.0), euler.x.to_degrees());
    qz * qy * qx
}

#[derive(Debug, Clone)]
pub struct OrientationElement {
    pub model_idx: usize,
    initial: Vec3,
    value: Vec3,
    /// Euler angles actually baked into the model coordinates as of the
    /// last `sync_to_model` call.
    last_applied: Vec3,
    mode: Mode,
    max_rot_deg: f64,
    step_deg: f64,
}

impl OrientationElement {
    pub fn new(model_idx: usize, initial: Vec3, mode: Mode, max_rot_deg: f64, step_deg: f64) -> OrientationElement {
        OrientationElement {
            model_idx,
            initial,
            value: initial,
            last_applied: initial,
            mode,
            max_rot_deg,
            step_deg,
        }
    }

    pub fn length(&self) -> usize {
        3
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
                // Random axis-angle perturbation capped at max_rot_deg,
                // expressed back onto the Euler triple.
                let axis = rng.unit_vector();
                let angle = rng.uniform_range(-self.max_rot_deg, self.max_rot_deg);
                let delta = axis * angle.to_radians();
                self.value = self.initial + delta;
            }
            Mode::Free => {
                self.value = Vec3::new(
                    rng.uniform_range(-std::f64::consts::PI, std::f64::consts::PI),
                    rng.uniform_range(-std::f64::consts::PI, std::f64::consts::PI),
                    rng.uniform_range(-std::f64::consts::PI, std::f64::consts::PI),
                );
            }
        }
    }

    pub fn mutate(&mut self, rel_step: f64, rng: &mut Rand) {
        if self.mode == Mode::Fixed {
            return;
        }
        let step_rad = self.step_deg.to_radians() * rel_step;
        let mut candidate = Vec3::new(
            self.value.x + rng.uniform_range(-1.0, 1.0) * step_rad,
            self.value.y + rng.uniform_range(-1.0, 1.0) * step_rad,
            self.value.z + rng.uniform_range(-1.0, 1.0) * step_rad,
        );
        if self.mode == Mode::Tethered {
            let offset = candidate - self.initial;
            let max_rad = self.max_rot_deg.to_radians();
            if offset.norm() > max_rad {
                candidate = self.initial + offset.normalized() * max_rad;
            }
        }
        self.value = candidate;
    }

    /// Identity read: the model's absolute orientation isn't recoverable
    /// from `Model`'s fields, so this leaves `value` as the last value this
    /// element itself set.
    pub fn sync_from_model(&mut self, _models: &[Model]) {}

    pub fn sync_to_model(&self, models: &mut [Model]) {
        if let Some(model) = models.get_mut(self.model_idx) {
            let q_now = euler_to_quaternion(self.value);
            let q_prev = euler_to_quaternion(self.last_applied);
            let delta = q_now * q_prev.inverse();
            model.rotate_about_com(delta);
        }
    }

    pub fn get_vector(&self, v: &mut Vec<f64>) {
        v.push(self.value.x);
        v.push(self.value.y);
        v.push(self.value.z);
    }

    pub fn set_vector(&mut self, v: &[f64], i: &mut usize) -> CoreResult<()> {
        if *i + 3 > v.len() {
            return Err(CoreError::bad_argument("orientation vector underflow"));
        }
        self.value = Vec3::new(v[*i], v[*i + 1], v[*i + 2]);
        *i += 3;
        Ok(())
    }

    pub fn get_xover_vector(&self, v: &mut Vec<Vec<f64>>) {
        v.push(vec![self.value.x, self.value.y, self.value.z]);
    }

    pub fn set_xover_vector(&mut self, v: &[Vec<f64>], i: &mut usize) -> CoreResult<()> {
        let group = v.get(*i).ok_or_else(|| CoreError::bad_argument("orientation xover underflow"))?;
        if group.len() != 3 {
            return Err(CoreError::bad_argument("orientation xover group must have 3 values"));
        }
        self.value = Vec3::new(group[0], group[1], group[2]);
        *i += 1;
        Ok(())
    }

    pub fn get_step_vector(&self, v: &mut Vec<f64>) {
        let step_rad = self.step_deg.to_radians();
        v.push(step_rad);
        v.push(step_rad);
        v.push(step_rad);
    }

    pub fn compare_vector(&self, v: &[f64], i: &mut usize) -> f64 {
        let other = Vec3::new(v[*i], v[*i + 1], v[*i + 2]);
        *i += 3;
        let step_rad = self.step_deg.to_radians();
        if step_rad <= 0.0 {
            return 0.0;
        }
        let d = self.value - other;
        d.x.abs().max(d.y.abs()).max(d.z.abs()) / step_rad
    }

    /// Marks `value` as baked into the model, for the next delta to be
    /// computed against. Called once after a successful `sync_to_model`
    /// by the owning `Chrom`'s caller at checkpoint boundaries.
    pub fn commit(&mut self) {
        self.last_applied = self.value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_mode_randomise_is_noop() {
        let mut e = OrientationElement::new(0, Vec3::ZERO, Mode::Fixed, 30.0, 5.0);
        let mut rng = Rand::new(5);
        e.randomise(&mut rng, &[]);
        assert_eq!(e.value, Vec3::ZERO);
    }

    #[test]
    fn sync_to_model_applies_only_the_delta() {
        let mut e = OrientationElement::new(0, Vec3::ZERO, Mode::Free, 30.0, 5.0);
        let atoms = vec![crate::model::Atom::new(1, "C", Vec3::new(1.0, 0.0, 0.0))];
        let mut models = vec![Model::new("lig", atoms)];

        e.value = Vec3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2);
        e.sync_to_model(&mut models);
        e.commit();
        let after_first = models[0].atoms[0].coord;

        // Same absolute value again: delta should now be zero, coords unchanged.
        e.sync_to_model(&mut models);
        let after_second = models[0].atoms[0].coord;
        assert!((after_first.x - after_second.x).abs() < 1e-9);
        assert!((after_first.y - after_second.y).abs() < 1e-9);
    }

    #[test]
    fn get_set_vector_roundtrip() {
        let mut e = OrientationElement::new(0, Vec3::new(0.1, 0.2, 0.3), Mode::Free, 30.0, 5.0);
        let mut v = Vec::new();
        e.get_vector(&mut v);
        let mut i = 0;
        e.set_vector(&v, &mut i).unwrap();
        assert_eq!(i, 3);
    }
}
