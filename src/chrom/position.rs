//! Position chromosome element (spec §4.3.3): three real slots = (x, y, z)
//! of a model's center of mass.

use crate::error::{CoreError, CoreResult};
use crate::geom::Vec3;
use crate::model::{BoundingBox, Model};
use crate::rng::Rand;

use super::Mode;

#[derive(Debug, Clone)]
pub struct PositionElement {
    pub model_idx: usize,
    initial: Vec3,
    value: Vec3,
    mode: Mode,
    max_trans: f64,
    site_bbox: BoundingBox,
    step: f64,
}

impl PositionElement {
    pub fn new(model_idx: usize, initial: Vec3, mode: Mode, max_trans: f64, site_bbox: BoundingBox, step: f64) -> PositionElement {
        PositionElement {
            model_idx,
            initial,
            value: initial,
            mode,
            max_trans,
            site_bbox,
            step,
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
                // Uniform point inside the ball of radius max_trans around initial.
                loop {
                    let offset = Vec3::new(
                        rng.uniform_range(-self.max_trans, self.max_trans),
                        rng.uniform_range(-self.max_trans, self.max_trans),
                        rng.uniform_range(-self.max_trans, self.max_trans),
                    );
                    if offset.norm() <= self.max_trans {
                        self.value = self.initial + offset;
                        break;
                    }
                }
            }
            Mode::Free => {
                // Rejection-sample into the docking-site bounding box.
                let bb = self.site_bbox;
                for _ in 0..1000 {
                    let p = Vec3::new(
                        rng.uniform_range(bb.min.x, bb.max.x),
                        rng.uniform_range(bb.min.y, bb.max.y),
                        rng.uniform_range(bb.min.z, bb.max.z),
                    );
                    if bb.contains(&p) {
                        self.value = p;
                        return;
                    }
                }
                self.value = bb.center();
            }
        }
    }

    pub fn mutate(&mut self, rel_step: f64, rng: &mut Rand) {
        if self.mode == Mode::Fixed {
            return;
        }
        let delta = Vec3::new(
            rng.uniform_range(-1.0, 1.0) * self.step * rel_step,
            rng.uniform_range(-1.0, 1.0) * self.step * rel_step,
            rng.uniform_range(-1.0, 1.0) * self.step * rel_step,
        );
        let mut candidate = self.value + delta;
        if self.mode == Mode::Tethered {
            let offset = candidate - self.initial;
            if offset.norm() > self.max_trans {
                candidate = self.initial + offset.normalized() * self.max_trans;
            }
        }
        self.value = candidate;
    }

    pub fn sync_from_model(&mut self, models: &[Model]) {
        if let Some(model) = models.get(self.model_idx) {
            self.value = model.center_of_mass;
        }
    }

    pub fn sync_to_model(&self, models: &mut [Model]) {
        if let Some(model) = models.get_mut(self.model_idx) {
            model.set_center_of_mass(self.value);
        }
    }

    pub fn get_vector(&self, v: &mut Vec<f64>) {
        v.push(self.value.x);
        v.push(self.value.y);
        v.push(self.value.z);
    }

    pub fn set_vector(&mut self, v: &[f64], i: &mut usize) -> CoreResult<()> {
        if *i + 3 > v.len() {
            return Err(CoreError::bad_argument("position vector underflow"));
        }
        self.value = Vec3::new(v[*i], v[*i + 1], v[*i + 2]);
        *i += 3;
        Ok(())
    }

    pub fn get_xover_vector(&self, v: &mut Vec<Vec<f64>>) {
        v.push(vec![self.value.x, self.value.y, self.value.z]);
    }

    pub fn set_xover_vector(&mut self, v: &[Vec<f64>], i: &mut usize) -> CoreResult<()> {
        let group = v.get(*i).ok_or_else(|| CoreError::bad_argument("position xover underflow"))?;
        if group.len() != 3 {
            return Err(CoreError::bad_argument("position xover group must have 3 values"));
        }
        self.value = Vec3::new(group[0], group[1], group[2]);
        *i += 1;
        Ok(())
    }

    pub fn get_step_vector(&self, v: &mut Vec<f64>) {
        v.push(self.step);
        v.push(self.step);
        v.push(self.step);
    }

    pub fn compare_vector(&self, v: &[f64], i: &mut usize) -> f64 {
        let other = Vec3::new(v[*i], v[*i + 1], v[*i + 2]);
        *i += 3;
        if self.step <= 0.0 {
            return 0.0;
        }
        let d = self.value - other;
        d.x.abs().max(d.y.abs()).max(d.z.abs()) / self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox() -> BoundingBox {
        BoundingBox { min: Vec3::new(-5.0, -5.0, -5.0), max: Vec3::new(5.0, 5.0, 5.0) }
    }

    #[test]
    fn tethered_randomise_stays_within_ball() {
        let mut e = PositionElement::new(0, Vec3::ZERO, Mode::Tethered, 2.0, bbox(), 0.5);
        let mut rng = Rand::new(11);
        for _ in 0..50 {
            e.randomise(&mut rng, &[]);
            assert!(e.value.norm() <= 2.0 + 1e-9);
        }
    }

    #[test]
    fn free_randomise_stays_in_site_box() {
        let mut e = PositionElement::new(0, Vec3::ZERO, Mode::Free, 2.0, bbox(), 0.5);
        let mut rng = Rand::new(12);
        for _ in 0..50 {
            e.randomise(&mut rng, &[]);
            assert!(bbox().contains(&e.value));
        }
    }

    #[test]
    fn get_set_vector_roundtrip() {
        let mut e = PositionElement::new(0, Vec3::new(1.0, 2.0, 3.0), Mode::Free, 2.0, bbox(), 0.5);
        let mut v = Vec::new();
        e.get_vector(&mut v);
        let mut i = 0;
        e.set_vector(&v, &mut i).unwrap();
        assert_eq!(i, 3);
        let mut v2 = Vec::new();
        e.get_vector(&mut v2);
        assert_eq!(v, v2);
    }
}
