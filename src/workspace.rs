//! Observable workspace container (spec §4.8, component C8): fixed-size
//! model slots, the docking site, the current scoring aggregate and
//! transform, and optional persistent population / output sinks.

use log::info;

use crate::chrom::Chrom;
use crate::error::CoreResult;
use crate::model::{DockingSite, Model};
use crate::population::Population;
use crate::request::{Observer, Request};
use crate::rng::Rand;
use crate::scoring::{ScoreMap, ScoringContext, SfNode};
use crate::transform::{Context, TfNode};

/// Minimal sink contract for `save`/`save_history` (spec §4.8: "concrete
/// workspaces may write the current ligand + score-map to the configured
/// sinks"). The base `Workspace` never writes anything itself.
pub trait OutputSink {
    fn write(&mut self, ligand: &Model, scores: &ScoreMap) -> CoreResult<()>;
}

/// A filter gets first refusal on whether a scored pose should be kept
/// (used by callers wiring a "write only top N" or energy-cutoff policy).
pub trait PoseFilter {
    fn accept(&self, scores: &ScoreMap) -> bool;
}

#[derive(Default)]
struct ObserverRegistry {
    next_token: u64,
    observers: Vec<(u64, Box<dyn Observer>)>,
}

impl ObserverRegistry {
    fn register(&mut self, observer: Box<dyn Observer>) -> u64 {
        let token = self.next_token;
        self.next_token += 1;
        self.observers.push((token, observer));
        token
    }

    fn notify_all(&mut self) {
        for (_, obs) in self.observers.iter_mut() {
            obs.update();
        }
    }
}

/// Default slot convention: 0 = receptor, 1 = ligand, 2.. = solvent (spec
/// §3.1 Workspace).
pub struct Workspace {
    pub models: Vec<Model>,
    pub site: DockingSite,
    pub sf: Option<SfNode>,
    pub transform: Option<TfNode>,
    pub population: Option<Population>,
    pub rng: Rand,
    pub chrom_template: Option<Chrom>,
    pub output_sink: Option<Box<dyn OutputSink>>,
    pub history_sink: Option<Box<dyn OutputSink>>,
    pub filter: Option<Box<dyn PoseFilter>>,
    observers: ObserverRegistry,
}

impl Workspace {
    pub fn new(site: DockingSite, seed: u64) -> Workspace {
        Workspace {
            models: vec![Model::new("receptor", vec![]), Model::new("ligand", vec![])],
            site,
            sf: None,
            transform: None,
            population: None,
            rng: Rand::new(seed),
            chrom_template: None,
            output_sink: None,
            history_sink: None,
            filter: None,
            observers: ObserverRegistry::default(),
        }
    }

    /// Replaces the model at `slot`, growing the slot list if needed, and
    /// notifies every observer (spec §4.8).
    pub fn set_model(&mut self, slot: usize, model: Model) {
        if slot >= self.models.len() {
            self.models.resize_with(slot + 1, || Model::new("", vec![]));
        }
        self.models[slot] = model;
        self.observers.notify_all();
    }

    /// Appends solvent models past the fixed receptor/ligand slots.
    pub fn add_models(&mut self, models: Vec<Model>) {
        self.models.extend(models);
        self.observers.notify_all();
    }

    pub fn get_models(&self, from: usize) -> &[Model] {
        if from >= self.models.len() {
            &[]
        } else {
            &self.models[from..]
        }
    }

    pub fn set_sf(&mut self, sf: SfNode) {
        self.sf = Some(sf);
        self.observers.notify_all();
    }

    pub fn set_transform(&mut self, transform: TfNode) {
        self.transform = Some(transform);
        self.observers.notify_all();
    }

    pub fn register_observer(&mut self, observer: Box<dyn Observer>) -> u64 {
        self.observers.register(observer)
    }

    pub fn handle_request(&mut self, req: &Request) -> bool {
        let mut handled = false;
        if let Some(sf) = self.sf.as_mut() {
            let ctx = ScoringContext { models: &self.models, site: &self.site, annotate: false };
            handled |= sf.handle_request(req, &ctx);
        }
        if let Some(transform) = self.transform.as_mut() {
            handled |= transform.handle_request(req);
        }
        handled
    }

    pub fn score(&mut self) -> Option<f64> {
        let sf = self.sf.as_mut()?;
        let ctx = ScoringContext { models: &self.models, site: &self.site, annotate: false };
        Some(sf.score(&ctx))
    }

    pub fn score_map(&mut self) -> Option<ScoreMap> {
        let sf = self.sf.as_mut()?;
        let ctx = ScoringContext { models: &self.models, site: &self.site, annotate: false };
        let mut map = ScoreMap::new();
        sf.score_map(&ctx, "", &mut map);
        Some(map)
    }

    /// Invokes the configured transform against a fresh `transform::Context`
    /// built from the workspace's current state (spec §4.8 `run()`).
    pub fn run(&mut self) -> CoreResult<()> {
        let Some(mut transform) = self.transform.take() else {
            info!("workspace run() called with no transform configured");
            return Ok(());
        };
        let chrom = self.chrom_template.clone().unwrap_or_default();
        let Some(mut sf) = self.sf.take() else {
            self.transform = Some(transform);
            return Ok(());
        };
        let result = {
            let mut ctx = Context::new(&mut self.models, &self.site, &mut sf, &mut self.rng, chrom);
            ctx.population = self.population.take();
            let r = transform.go(&mut ctx);
            self.population = ctx.population.take();
            r
        };
        self.sf = Some(sf);
        self.transform = Some(transform);
        result
    }

    /// No-op when no sink is configured (spec §4.8: "`save`/`save_history`
    /// are no-ops at the base level"); writes the current ligand slot and,
    /// if `with_scores`, the score map, otherwise an empty map.
    pub fn save(&mut self, with_scores: bool) -> CoreResult<()> {
        self.write_to(false, with_scores)
    }

    pub fn save_history(&mut self, with_scores: bool) -> CoreResult<()> {
        self.write_to(true, with_scores)
    }

    fn write_to(&mut self, history: bool, with_scores: bool) -> CoreResult<()> {
        let scores = if with_scores { self.score_map().unwrap_or_default() } else { ScoreMap::new() };
        if let Some(filter) = self.filter.as_ref() {
            if !filter.accept(&scores) {
                return Ok(());
            }
        }
        let Some(ligand) = self.models.get(1) else { return Ok(()) };
        let sink = if history { self.history_sink.as_mut() } else { self.output_sink.as_mut() };
        if let Some(sink) = sink {
            sink.write(ligand, &scores)?;
        }
        Ok(())
    }
}
