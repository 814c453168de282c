//! Nelder-Mead simplex transform (spec §4.6.6). Single convergence gate
//! per Open Question 2: the outer cycle loop re-seeds the simplex from the
//! current best point and terminates on the relative-value tolerance test
//! alone (`convergence` and `ftol` fold into one comparison), not a
//! separate `n_cycles` counter.

use log::debug;

use crate::constants::{
    DEFAULT_FTOL, DEFAULT_FTOL_EPSILON, DEFAULT_MAX_CALLS, DEFAULT_NM_CONVERGENCE, DEFAULT_STEP_SIZE, NM_CONTRACTION,
    NM_EXPANSION, NM_REFLECTION,
};
use crate::error::CoreResult;

use super::Context;

#[derive(Debug, Clone)]
pub struct SimplexTransform {
    pub max_calls: u32,
    pub ftol: f64,
    pub convergence: f64,
    pub step_size: f64,
}

impl Default for SimplexTransform {
    fn default() -> SimplexTransform {
        SimplexTransform {
            max_calls: DEFAULT_MAX_CALLS,
            ftol: DEFAULT_FTOL,
            convergence: DEFAULT_NM_CONVERGENCE,
            step_size: DEFAULT_STEP_SIZE,
        }
    }
}

struct Vertex {
    point: Vec<f64>,
    score: f64,
}

impl SimplexTransform {
    pub fn execute(&mut self, ctx: &mut Context) -> CoreResult<()> {
        let mut best = ctx.chrom.clone();
        best.sync_from_model(ctx.models);
        let mut best_point = best.get_vector();
        let mut best_score = self.evaluate(ctx, &best_point)?;

        let mut calls = 1u32;
        loop {
            let step = ctx.chrom.get_step_vector().into_iter().map(|s| s * self.step_size).collect::<Vec<_>>();
            let (cycle_point, cycle_score, used) = self.run_simplex(ctx, &best_point, &step, self.max_calls - calls)?;
            calls += used;

            let improvement = if best_score.abs() + cycle_score.abs() < DEFAULT_FTOL_EPSILON {
                0.0
            } else {
                (cycle_score - best_score).abs()
            };

            if cycle_score > best_score {
                best_point = cycle_point;
                best_score = cycle_score;
            }
            debug!("simplex cycle: calls={calls}, best={best_score}");

            if improvement < self.convergence || calls >= self.max_calls {
                break;
            }
        }

        ctx.chrom.set_vector(&best_point)?;
        ctx.chrom.sync_to_model(ctx.models);
        Ok(())
    }

    /// Evaluates `point`, returning `Context::fitness()` (negated raw score)
    /// so every vertex/cycle comparison below, written as "higher is
    /// better", tracks the true minimum-energy point.
    fn evaluate(&self, ctx: &mut Context, point: &[f64]) -> CoreResult<f64> {
        ctx.chrom.set_vector(point)?;
        ctx.chrom.sync_to_model(ctx.models);
        Ok(ctx.fitness())
    }

    /// One Nelder-Mead run seeded at `origin` with per-coordinate deltas
    /// `step`, budgeted at `call_budget` evaluations. Returns the best
    /// point found, its score, and the number of evaluations used.
    fn run_simplex(
        &self,
        ctx: &mut Context,
        origin: &[f64],
        step: &[f64],
        call_budget: u32,
    ) -> CoreResult<(Vec<f64>, f64, u32)> {
        let n = origin.len();
        if n == 0 || call_budget == 0 {
            let score = self.evaluate(ctx, origin)?;
            return Ok((origin.to_vec(), score, 1));
        }

        let mut calls = 0u32;
        let mut vertices = Vec::with_capacity(n + 1);
        let score0 = self.evaluate(ctx, origin)?;
        calls += 1;
        vertices.push(Vertex { point: origin.to_vec(), score: score0 });
        for i in 0..n {
            let mut p = origin.to_vec();
            p[i] += step[i];
            let s = self.evaluate(ctx, &p)?;
            calls += 1;
            vertices.push(Vertex { point: p, score: s });
        }

        let ftol_gate = |best: f64, worst: f64| {
            2.0 * (best - worst).abs() / (best.abs() + worst.abs() + DEFAULT_FTOL_EPSILON)
        };

        while calls < call_budget {
            vertices.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
            let best = vertices[0].score;
            let worst = vertices[n].score;
            if ftol_gate(best, worst) < self.ftol {
                break;
            }

            let centroid: Vec<f64> = (0..n)
                .map(|i| vertices[..n].iter().map(|v| v.point[i]).sum::<f64>() / n as f64)
                .collect();

            let reflect = move_point(&centroid, &vertices[n].point, NM_REFLECTION);
            let reflect_score = self.evaluate(ctx, &reflect)?;
            calls += 1;

            if reflect_score > vertices[0].score {
                let expand = move_point(&centroid, &vertices[n].point, NM_EXPANSION);
                let expand_score = self.evaluate(ctx, &expand)?;
                calls += 1;
                if expand_score > reflect_score {
                    vertices[n] = Vertex { point: expand, score: expand_score };
                } else {
                    vertices[n] = Vertex { point: reflect, score: reflect_score };
                }
            } else if reflect_score > vertices[n - 1].score {
                vertices[n] = Vertex { point: reflect, score: reflect_score };
            } else {
                let contract = move_point(&centroid, &vertices[n].point, NM_CONTRACTION);
                let contract_score = self.evaluate(ctx, &contract)?;
                calls += 1;
                if contract_score > vertices[n].score {
                    vertices[n] = Vertex { point: contract, score: contract_score };
                } else {
                    let lowest = vertices[0].point.clone();
                    for v in vertices.iter_mut().skip(1) {
                        let shrunk: Vec<f64> = v.point.iter().zip(lowest.iter()).map(|(p, l)| (p + l) / 2.0).collect();
                        let s = self.evaluate(ctx, &shrunk)?;
                        calls += 1;
                        v.point = shrunk;
                        v.score = s;
                        if calls >= call_budget {
                            break;
                        }
                    }
                }
            }
            if calls >= call_budget {
                break;
            }
        }

        vertices.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        Ok((vertices[0].point.clone(), vertices[0].score, calls))
    }

    pub fn handle_request(&mut self, req: &crate::request::Request, name: &str) -> bool {
        use crate::request::Request;
        match req {
            Request::SetParamTerm(term, param, value) if term == name => self.set_param(param, *value),
            Request::SetParam(param, value) => self.set_param(param, *value),
            _ => false,
        }
    }

    fn set_param(&mut self, param: &str, value: f64) -> bool {
        match param {
            "max_calls" => self.max_calls = value as u32,
            "ftol" => self.ftol = value,
            "convergence" => self.convergence = value,
            "step_size" => self.step_size = value,
            _ => return false,
        }
        true
    }
}

/// `centroid + coeff * (centroid - worst)`; `coeff` negative per the
/// module-level reflection/expansion/contraction constants.
fn move_point(centroid: &[f64], worst: &[f64], coeff: f64) -> Vec<f64> {
    centroid.iter().zip(worst.iter()).map(|(c, w)| c - coeff * (c - w)).collect()
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
    fn runs_without_error_on_tiny_chromosome() {
        let mut models = vec![Model::new("lig", vec![Atom::new(1, "C", Vec3::ZERO)])];
        let site = DockingSite::new(BoundingBox { min: Vec3::ZERO, max: Vec3::ZERO }, vec![]);
        let mut sf = SfNode::leaf("cav", 1.0, TermKind::CavityFill(CavityFillSF::new()));
        let mut rng = Rand::new(17);
        let mut chrom = Chrom::new();
        chrom.add(ChromElement::Occupancy(OccupancyElement::new(0, 0.5, Mode::Free, 0.1)));
        let mut ctx = Context::new(&mut models, &site, &mut sf, &mut rng, chrom);
        let mut t = SimplexTransform { max_calls: 30, ..SimplexTransform::default() };
        t.execute(&mut ctx).unwrap();
    }

    #[test]
    fn move_point_reflection_is_centroid_minus_vector() {
        let centroid = vec![1.0, 1.0];
        let worst = vec![0.0, 0.0];
        let reflected = move_point(&centroid, &worst, NM_REFLECTION);
        assert_eq!(reflected, vec![2.0, 2.0]);
    }
}
