//! Simulated-annealing transform (spec §4.6.5).
//!
//! The scoring function returns raw energies where *lower* is better; this
//! transform works in `Context::fitness()` (the negation) throughout, so
//! "higher fitness is better" matches `Population`'s descending sort and
//! `best_vector` tracks the true minimum-energy pose (spec §3.1, S5).
//! `delta` below is `current − candidate` in fitness terms, so a positive
//! delta is a degradation and the Metropolis test reduces to "always accept
//! an improvement, sometimes accept a worse move".

use log::{debug, warn};

use crate::constants::{
    DEFAULT_BLOCK_LENGTH, DEFAULT_FINAL_T, DEFAULT_MIN_ACC_RATE, DEFAULT_N_BLOCKS, DEFAULT_PARTITION_DIST,
    DEFAULT_PARTITION_FREQ, DEFAULT_START_T, DEFAULT_STEP_SIZE, GAS_CONSTANT_J, KCAL_TO_J_FACTOR,
};
use crate::error::CoreResult;
use crate::request::Request;

use super::Context;

#[derive(Debug, Clone, Copy, Default)]
struct McStats {
    attempted: u32,
    accepted: u32,
}

impl McStats {
    fn acceptance_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempted as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimAnnTransform {
    pub start_t: f64,
    pub final_t: f64,
    pub n_blocks: u32,
    pub block_length: u32,
    pub step_size: f64,
    pub min_acc_rate: f64,
    pub partition_freq: u32,
    pub partition_dist: f64,
}

impl Default for SimAnnTransform {
    fn default() -> SimAnnTransform {
        SimAnnTransform {
            start_t: DEFAULT_START_T,
            final_t: DEFAULT_FINAL_T,
            n_blocks: DEFAULT_N_BLOCKS,
            block_length: DEFAULT_BLOCK_LENGTH,
            step_size: DEFAULT_STEP_SIZE,
            min_acc_rate: DEFAULT_MIN_ACC_RATE,
            partition_freq: DEFAULT_PARTITION_FREQ,
            partition_dist: DEFAULT_PARTITION_DIST,
        }
    }
}

/// Geometric temperature schedule from `start_T` to `final_T` over
/// `n_blocks` blocks.
fn temperature(start_t: f64, final_t: f64, n_blocks: u32, block: u32) -> f64 {
    if n_blocks <= 1 {
        return start_t;
    }
    let ratio = (final_t / start_t).powf(block as f64 / (n_blocks - 1) as f64);
    start_t * ratio
}

impl SimAnnTransform {
    pub fn execute(&mut self, ctx: &mut Context) -> CoreResult<()> {
        let mut current = ctx.chrom.clone();
        current.sync_from_model(ctx.models);
        let mut current_score = ctx.fitness();

        let mut best_vector = current.get_vector();
        let mut best_score = current_score;

        let mut step_size = self.step_size;
        let mut accepted_since_partition = 0u32;

        for block in 0..self.n_blocks {
            let t = temperature(self.start_t, self.final_t, self.n_blocks, block);
            let mut stats = McStats::default();

            for _ in 0..self.block_length {
                let mut candidate = current.clone();
                candidate.mutate(step_size, ctx.rng);
                candidate.sync_to_model(ctx.models);
                let candidate_score = ctx.fitness();
                stats.attempted += 1;

                let delta = current_score - candidate_score;
                let accept = if delta <= 0.0 {
                    true
                } else {
                    let p = (-KCAL_TO_J_FACTOR * delta / (GAS_CONSTANT_J * t)).exp();
                    ctx.rng.uniform01() < p
                };

                if accept {
                    current = candidate;
                    current_score = candidate_score;
                    stats.accepted += 1;
                    accepted_since_partition += 1;

                    if current_score > best_score {
                        best_score = current_score;
                        best_vector = current.get_vector();
                    }

                    if accepted_since_partition >= self.partition_freq {
                        accepted_since_partition = 0;
                        let before = current_score;
                        ctx.send_requests(&[Request::Partition(self.partition_dist)]);
                        let after = ctx.fitness();
                        if (after - before).abs() > 0.001 {
                            warn!("simann partition drift: {} -> {}", before, after);
                        }
                        current_score = after;
                    }
                } else {
                    current.sync_to_model(ctx.models);
                }
            }

            debug!("simann block {block}: T={t}, acceptance={}", stats.acceptance_rate());
            if stats.acceptance_rate() < self.min_acc_rate {
                step_size *= 0.5;
            }
        }

        current.set_vector(&best_vector)?;
        current.sync_to_model(ctx.models);
        ctx.send_requests(&[Request::Partition(0.0)]);
        Ok(())
    }

    pub fn handle_request(&mut self, req: &Request, name: &str) -> bool {
        match req {
            Request::SetParamTerm(term, param, value) if term == name => self.set_param(param, *value),
            Request::SetParam(param, value) => self.set_param(param, *value),
            _ => false,
        }
    }

    fn set_param(&mut self, param: &str, value: f64) -> bool {
        match param {
            "start_T" => self.start_t = value,
            "final_T" => self.final_t = value,
            "step_size" => self.step_size = value,
            "min_acc_rate" => self.min_acc_rate = value,
            "partition_dist" => self.partition_dist = value,
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chrom::{Chrom, ChromElement, Mode, OccupancyElement};
    use crate::geom::Vec3;
    use crate::model::{Atom, BoundingBox, DockingSite, Model};
    use crate::rng::Rand;
    use crate::scoring::cavity_fill::CavityFillSF;
    use crate::scoring::{SfNode, TermKind};

    #[test]
    fn temperature_schedule_endpoints() {
        assert_eq!(temperature(300.0, 50.0, 10, 0), 300.0);
        assert!((temperature(300.0, 50.0, 10, 9) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn runs_a_short_schedule_without_error() {
        let mut models = vec![Model::new("lig", vec![Atom::new(1, "C", Vec3::ZERO)])];
        let site = DockingSite::new(BoundingBox { min: Vec3::ZERO, max: Vec3::ZERO }, vec![]);
        let mut sf = SfNode::leaf("cav", 1.0, TermKind::CavityFill(CavityFillSF::new()));
        let mut rng = Rand::new(13);
        let mut chrom = Chrom::new();
        chrom.add(ChromElement::Occupancy(OccupancyElement::new(0, 0.5, Mode::Free, 0.1)));
        let mut ctx = Context::new(&mut models, &site, &mut sf, &mut rng, chrom);
        let mut t = SimAnnTransform { n_blocks: 2, block_length: 3, partition_freq: 100, ..SimAnnTransform::default() };
        t.execute(&mut ctx).unwrap();
    }
}
