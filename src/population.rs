//! Population of scored chromosomes (spec §4.7, component C7).

use crate::chrom::{crossover, random_crossover_points, Chrom};
use crate::constants::CHROM_EQUALITY_THRESHOLD;
use crate::model::Model;
use crate::rng::Rand;
use crate::scoring::{ScoringContext, SfNode};

/// A chromosome clone plus its raw score and roulette-wheel fitness (spec
/// §3.1 "Genome"). Scoring terms return energies where *lower* is better;
/// `raw_score` stores the negation of that energy so "higher `raw_score` is
/// better" holds uniformly for sorting, roulette fitness and every
/// transform's improvement check. `fitness` is the cumulative roulette
/// value.
#[derive(Debug, Clone)]
pub struct Genome {
    pub chrom: Chrom,
    pub raw_score: f64,
    pub fitness: f64,
}

impl Genome {
    pub fn equals(&self, other: &Genome, threshold: f64) -> bool {
        self.chrom.equals(&other.chrom, threshold)
    }
}

#[derive(Debug, Clone)]
pub struct Population {
    pub genomes: Vec<Genome>,
    pub max_size: usize,
    pub equality_threshold: f64,
}

impl Population {
    /// Builds a population by cloning and randomising `seed` `size` times,
    /// scoring and sorting descending, then syncing the best genome back
    /// to the model list (spec §4.7).
    pub fn new(
        seed: &Chrom,
        size: usize,
        rng: &mut Rand,
        models: &mut [Model],
        sf: &mut SfNode,
        site: &crate::model::DockingSite,
    ) -> Population {
        let mut genomes = Vec::with_capacity(size);
        for _ in 0..size {
            let mut chrom = seed.clone();
            chrom.randomise(rng, models);
            genomes.push(Genome { chrom, raw_score: 0.0, fitness: 0.0 });
        }
        let mut pop = Population {
            genomes,
            max_size: size,
            equality_threshold: CHROM_EQUALITY_THRESHOLD,
        };
        pop.rescore_all(models, sf, site);
        pop.sort_and_refit();
        pop.sync_best(models);
        pop
    }

    fn rescore_all(&mut self, models: &mut [Model], sf: &mut SfNode, site: &crate::model::DockingSite) {
        for g in self.genomes.iter_mut() {
            g.chrom.sync_to_model(models);
            let ctx = ScoringContext { models, site, annotate: false };
            g.raw_score = -sf.score(&ctx);
        }
    }

    /// Sorts descending by raw score and recomputes sigma-truncated
    /// roulette fitness (spec §4.6.4 step 4, §3.2 invariant: "cumulative
    /// roulette fitness is non-decreasing and ends at 1").
    pub fn sort_and_refit(&mut self) {
        self.genomes.sort_by(|a, b| b.raw_score.partial_cmp(&a.raw_score).unwrap());
        if self.genomes.is_empty() {
            return;
        }
        let n = self.genomes.len() as f64;
        let mean = self.genomes.iter().map(|g| g.raw_score).sum::<f64>() / n;
        let variance = self.genomes.iter().map(|g| (g.raw_score - mean).powi(2)).sum::<f64>() / n;
        let stdev = variance.sqrt();
        const SIGMA_TRUNCATION_C: f64 = crate::constants::DEFAULT_SIGMA_TRUNCATION_C;
        let baseline = mean - SIGMA_TRUNCATION_C * stdev;
        let raw_fitness: Vec<f64> = self.genomes.iter().map(|g| (g.raw_score - baseline).max(0.0)).collect();
        let total: f64 = raw_fitness.iter().sum();
        let mut cumulative = 0.0;
        for (g, rf) in self.genomes.iter_mut().zip(raw_fitness.into_iter()) {
            cumulative += if total > 0.0 { rf / total } else { 1.0 / self.genomes.len() as f64 };
            g.fitness = cumulative;
        }
        if let Some(last) = self.genomes.last_mut() {
            last.fitness = 1.0;
        }
    }

    pub fn sync_best(&self, models: &mut [Model]) {
        if let Some(best) = self.genomes.first() {
            best.chrom.sync_to_model(models);
        }
    }

    pub fn best(&self) -> Option<&Genome> {
        self.genomes.first()
    }

    /// Roulette-wheel selection: draws `u ∈ [0,1)` and returns the first
    /// genome whose cumulative fitness `≥ u` (spec §4.7).
    pub fn select(&self, rng: &mut Rand) -> &Genome {
        let u = rng.uniform01();
        self.genomes
            .iter()
            .find(|g| g.fitness >= u)
            .unwrap_or_else(|| self.genomes.last().expect("population must be non-empty"))
    }

    /// One GA cycle (spec §4.6.4): generate offspring via roulette
    /// selection + 2-point crossover + mutation, merge, dedup, sort,
    /// truncate, refit.
    #[allow(clippy::too_many_arguments)]
    pub fn ga_step(
        &mut self,
        n_replicates: usize,
        rel_step_size: f64,
        equality_threshold: f64,
        p_crossover: f64,
        xovermut: bool,
        cmutate: bool,
        rng: &mut Rand,
        models: &mut [Model],
        sf: &mut SfNode,
        site: &crate::model::DockingSite,
    ) {
        let mut offspring = Vec::with_capacity(n_replicates);
        while offspring.len() < n_replicates {
            let p1 = self.select(rng).chrom.clone();
            let p2 = self.select(rng).chrom.clone();
            let (mut c1, mut c2) = if rng.uniform01() < p_crossover {
                let (b, e) = random_crossover_points(rng, p1.xover_length());
                crossover(&p1, &p2, b, e).unwrap_or_else(|_| (p1.clone(), p2.clone()))
            } else {
                (p1.clone(), p2.clone())
            };
            if xovermut || p_crossover <= 0.0 {
                mutate_chrom(&mut c1, rel_step_size, cmutate, rng);
                mutate_chrom(&mut c2, rel_step_size, cmutate, rng);
            }
            offspring.push(Genome { chrom: c1, raw_score: 0.0, fitness: 0.0 });
            if offspring.len() < n_replicates {
                offspring.push(Genome { chrom: c2, raw_score: 0.0, fitness: 0.0 });
            }
        }
        for g in offspring.iter_mut() {
            g.chrom.sync_to_model(models);
            let ctx = ScoringContext { models, site, annotate: false };
            g.raw_score = -sf.score(&ctx);
        }
        self.genomes.extend(offspring);
        self.dedup(equality_threshold);
        self.sort_and_refit();
        self.genomes.truncate(self.max_size);
        self.sort_and_refit();
    }

    fn dedup(&mut self, threshold: f64) {
        let mut kept: Vec<Genome> = Vec::with_capacity(self.genomes.len());
        'outer: for g in self.genomes.drain(..) {
            for existing in kept.iter() {
                if g.equals(existing, threshold) {
                    continue 'outer;
                }
            }
            kept.push(g);
        }
        self.genomes = kept;
    }
}

fn mutate_chrom(chrom: &mut Chrom, rel_step: f64, cmutate: bool, rng: &mut Rand) {
    if cmutate {
        // Cauchy-distributed relative step, applied once to the whole
        // chromosome's scale rather than per-element (spec §4.6.4).
        let scale = rng.cauchy(0.0, rel_step).abs().max(1e-6);
        chrom.mutate(scale, rng);
    } else {
        chrom.mutate(rel_step, rng);
    }
}
