//! Genetic-algorithm transform (spec §4.6.4).

use log::{debug, info};

use crate::constants::{
    CHROM_EQUALITY_THRESHOLD, DEFAULT_N_CONVERGENCE, DEFAULT_N_CYCLES, DEFAULT_NEW_FRACTION, DEFAULT_PCROSSOVER,
    DEFAULT_STEP_SIZE,
};
use crate::error::{CoreError, CoreResult};
use crate::request::Request;

use super::Context;

#[derive(Debug, Clone)]
pub struct GaTransform {
    pub new_fraction: f64,
    pub p_crossover: f64,
    pub step_size: f64,
    pub equality_threshold: f64,
    pub xovermut: bool,
    pub cmutate: bool,
    pub n_cycles: u32,
    pub n_convergence: u32,
}

impl Default for GaTransform {
    fn default() -> GaTransform {
        GaTransform {
            new_fraction: DEFAULT_NEW_FRACTION,
            p_crossover: DEFAULT_PCROSSOVER,
            step_size: DEFAULT_STEP_SIZE,
            equality_threshold: CHROM_EQUALITY_THRESHOLD,
            xovermut: true,
            cmutate: false,
            n_cycles: DEFAULT_N_CYCLES,
            n_convergence: DEFAULT_N_CONVERGENCE,
        }
    }
}

impl GaTransform {
    /// Runs GA cycles against the workspace's persistent population until
    /// convergence or `n_cycles` is reached (spec §4.6.4 step 5).
    pub fn execute(&mut self, ctx: &mut Context) -> CoreResult<()> {
        let mut best_score = {
            let Some(pop) = ctx.population.as_ref() else {
                return Err(CoreError::invalid_request("GaTransform requires an installed population"));
            };
            pop.best().map(|g| g.raw_score).unwrap_or(f64::NEG_INFINITY)
        };
        let mut stagnant = 0u32;

        for cycle in 0..self.n_cycles {
            ctx.send_requests(&[Request::Partition(0.0)]);
            let Some(pop) = ctx.population.as_mut() else {
                return Err(CoreError::invalid_request("GaTransform requires an installed population"));
            };
            let n_replicates = ((self.new_fraction * pop.max_size as f64).round() as usize).max(1);
            pop.ga_step(
                n_replicates,
                self.step_size,
                self.equality_threshold,
                self.p_crossover,
                self.xovermut,
                self.cmutate,
                ctx.rng,
                ctx.models,
                ctx.sf,
                ctx.site,
            );
            let current_best = pop.best().map(|g| g.raw_score).unwrap_or(f64::NEG_INFINITY);
            debug!("ga cycle {cycle}: best={current_best}");
            if current_best > best_score {
                best_score = current_best;
                stagnant = 0;
            } else {
                stagnant += 1;
            }
            if stagnant >= self.n_convergence {
                info!("ga converged after {cycle} cycles, best={best_score}");
                break;
            }
        }
        if let Some(pop) = ctx.population.as_ref() {
            pop.sync_best(ctx.models);
        }
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
            "new_fraction" => self.new_fraction = value,
            "p_crossover" => self.p_crossover = value,
            "step_size" => self.step_size = value,
            "n_cycles" => self.n_cycles = value as u32,
            "n_convergence" => self.n_convergence = value as u32,
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
    use crate::population::Population;
    use crate::rng::Rand;
    use crate::scoring::cavity_fill::CavityFillSF;
    use crate::scoring::{SfNode, TermKind};

    fn harness() -> (Vec<Model>, DockingSite, SfNode, Rand, Chrom) {
        let models = vec![Model::new("lig", vec![Atom::new(1, "C", Vec3::ZERO)])];
        let site = DockingSite::new(BoundingBox { min: Vec3::ZERO, max: Vec3::ZERO }, vec![]);
        let sf = SfNode::leaf("cav", 1.0, TermKind::CavityFill(CavityFillSF::new()));
        let rng = Rand::new(11);
        let mut chrom = Chrom::new();
        chrom.add(ChromElement::Occupancy(OccupancyElement::new(0, 0.5, Mode::Free, 0.1)));
        (models, site, sf, rng, chrom)
    }

    #[test]
    fn runs_without_error_on_tiny_population() {
        let (mut models, site, mut sf, mut rng, chrom) = harness();
        let pop = Population::new(&chrom, 4, &mut rng, &mut models, &mut sf, &site);
        let mut ctx = Context::new(&mut models, &site, &mut sf, &mut rng, chrom);
        ctx.population = Some(pop);
        let mut t = GaTransform { n_cycles: 2, ..GaTransform::default() };
        t.execute(&mut ctx).unwrap();
    }

    #[test]
    fn set_param_updates_step_size() {
        let mut t = GaTransform::default();
        assert!(t.handle_request(&Request::SetParamTerm("ga".to_string(), "step_size".to_string(), 2.0), "ga"));
        assert_eq!(t.step_size, 2.0);
    }

    #[test]
    fn errors_without_installed_population() {
        let (mut models, site, mut sf, mut rng, chrom) = harness();
        let mut ctx = Context::new(&mut models, &site, &mut sf, &mut rng, chrom);
        let mut t = GaTransform::default();
        assert!(t.execute(&mut ctx).is_err());
    }
}
