//! Occupancy chromosome element (spec §4.3.5): one real slot in [0,1]
//! controlling whether an explicit-solvent model is "on" for this pose.

use crate::constants::{OCCUPANCY_MAX, OCCUPANCY_MIN};
use crate::error::{CoreError, CoreResult};
use crate::model::Model;
use crate::rng::Rand;

use super::Mode;

#[derive(Debug, Clone)]
pub struct OccupancyElement {
    pub model_idx: usize,
    initial: f64,
    value: f64,
    mode: Mode,
    step: f64,
    /// Model is switched on when `value >= 1 - occupancy_probability`.
    occupancy_probability: f64,
}

impl OccupancyElement {
    pub fn new(model_idx: usize, initial: f64, mode: Mode, step: f64) -> OccupancyElement {
        OccupancyElement {
            model_idx,
            initial: initial.clamp(OCCUPANCY_MIN, OCCUPANCY_MAX),
            value: initial.clamp(OCCUPANCY_MIN, OCCUPANCY_MAX),
            mode,
            step,
            occupancy_probability: 0.5,
        }
    }

    pub fn with_occupancy_probability(mut self, p: f64) -> OccupancyElement {
        self.occupancy_probability = p;
        self
    }

    /// Whether this element should be instantiated at all: absent when the
    /// configured probability is 0 (model permanently off) or >= 1
    /// (permanently on), per spec §4.3.5.
    pub fn is_applicable(occupancy_probability: f64) -> bool {
        occupancy_probability > 0.0 && occupancy_probability < 1.0
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
                let lo = (self.initial - self.step).max(OCCUPANCY_MIN);
                let hi = (self.initial + self.step).min(OCCUPANCY_MAX);
                self.value = rng.uniform_range(lo, hi);
            }
            Mode::Free => {
                self.value = rng.uniform_range(OCCUPANCY_MIN, OCCUPANCY_MAX);
            }
        }
    }

    pub fn mutate(&mut self, rel_step: f64, rng: &mut Rand) {
        if self.mode == Mode::Fixed {
            return;
        }
        let delta = rng.uniform_range(-1.0, 1.0) * self.step * rel_step;
        let mut candidate = self.value + delta;
        if self.mode == Mode::Tethered {
            let lo = (self.initial - self.step).max(OCCUPANCY_MIN);
            let hi = (self.initial + self.step).min(OCCUPANCY_MAX);
            candidate = candidate.clamp(lo, hi);
        }
        self.value = candidate.clamp(OCCUPANCY_MIN, OCCUPANCY_MAX);
    }

    pub fn sync_from_model(&mut self, models: &[Model]) {
        if let Some(model) = models.get(self.model_idx) {
            self.value = if model.is_flexible { 1.0 } else { 0.0 };
        }
    }

    pub fn sync_to_model(&self, models: &mut [Model]) {
        if let Some(model) = models.get_mut(self.model_idx) {
            let enabled = self.value >= 1.0 - self.occupancy_probability;
            model.set_enabled(enabled);
        }
    }

    pub fn get_vector(&self, v: &mut Vec<f64>) {
        v.push(self.value);
    }

    pub fn set_vector(&mut self, v: &[f64], i: &mut usize) -> CoreResult<()> {
        let val = *v.get(*i).ok_or_else(|| CoreError::bad_argument("occupancy vector underflow"))?;
        self.value = val.clamp(OCCUPANCY_MIN, OCCUPANCY_MAX);
        *i += 1;
        Ok(())
    }

    pub fn get_xover_vector(&self, v: &mut Vec<Vec<f64>>) {
        v.push(vec![self.value]);
    }

    pub fn set_xover_vector(&mut self, v: &[Vec<f64>], i: &mut usize) -> CoreResult<()> {
        let group = v.get(*i).ok_or_else(|| CoreError::bad_argument("occupancy xover underflow"))?;
        self.value = group[0].clamp(OCCUPANCY_MIN, OCCUPANCY_MAX);
        *i += 1;
        Ok(())
    }

    pub fn get_step_vector(&self, v: &mut Vec<f64>) {
        v.push(self.step);
    }

    pub fn compare_vector(&self, v: &[f64], i: &mut usize) -> f64 {
        let other = v[*i];
        *i += 1;
        if self.step <= 0.0 {
            return 0.0;
        }
        (self.value - other).abs() / self.step
    }
}
