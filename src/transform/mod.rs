//! Search transforms (spec §4.6, component C6). A tagged tree mirroring the
//! scoring aggregate (spec §4.6.1 "Common"): `go()` checks `enabled`,
//! dispatches any requests the node holds against the workspace's scoring
//! function, then calls the concrete transform's `execute()`.

pub mod align;
pub mod ga;
pub mod randpop;
pub mod simann;
pub mod simplex;

use crate::chrom::Chrom;
use crate::error::CoreResult;
use crate::model::{DockingSite, Model};
use crate::request::Request;
use crate::rng::Rand;
use crate::scoring::{ScoringContext, SfNode};

pub use align::AlignTransform;
pub use ga::GaTransform;
pub use randpop::RandomPopulationTransform;
pub use simann::SimAnnTransform;
pub use simplex::SimplexTransform;

/// Per-run context every transform executes against (spec `SUPPLEMENT` 3,
/// grounded on rDock's `BaseUniMolTransform`): the ligand chromosome is
/// resolved once here rather than rebuilt by every transform.
pub struct Context<'a> {
    pub models: &'a mut [Model],
    pub site: &'a DockingSite,
    pub sf: &'a mut SfNode,
    pub rng: &'a mut Rand,
    /// The ligand chromosome template, resolved once at setup.
    pub chrom: Chrom,
    pub population: Option<crate::population::Population>,
}

impl<'a> Context<'a> {
    pub fn new(
        models: &'a mut [Model],
        site: &'a DockingSite,
        sf: &'a mut SfNode,
        rng: &'a mut Rand,
        chrom: Chrom,
    ) -> Context<'a> {
        Context { models, site, sf, rng, chrom, population: None }
    }

    /// Sends a batch of requests to the scoring function (spec §4.6.1:
    /// "dispatches any stored scoring-function requests via the
    /// workspace's SF").
    pub fn send_requests(&mut self, reqs: &[Request]) {
        let scoring_ctx = ScoringContext { models: self.models, site: self.site, annotate: false };
        for req in reqs.iter() {
            self.sf.handle_request(req, &scoring_ctx);
        }
    }

    /// Raw scoring-function value (energy; lower is better, spec §1).
    pub fn score(&mut self) -> f64 {
        let scoring_ctx = ScoringContext { models: self.models, site: self.site, annotate: false };
        self.sf.score(&scoring_ctx)
    }

    /// Negated raw score, so "higher is better" holds for the search
    /// transforms' improvement checks (matches `Genome::raw_score`'s
    /// convention in `population.rs`).
    pub fn fitness(&mut self) -> f64 {
        -self.score()
    }
}

#[derive(Debug, Clone)]
pub enum TransformKind {
    Align(AlignTransform),
    RandomPopulation(RandomPopulationTransform),
    Ga(GaTransform),
    SimAnn(SimAnnTransform),
    Simplex(SimplexTransform),
}

impl TransformKind {
    fn execute(&mut self, ctx: &mut Context) -> CoreResult<()> {
        match self {
            TransformKind::Align(t) => t.execute(ctx),
            TransformKind::RandomPopulation(t) => t.execute(ctx),
            TransformKind::Ga(t) => t.execute(ctx),
            TransformKind::SimAnn(t) => t.execute(ctx),
            TransformKind::Simplex(t) => t.execute(ctx),
        }
    }

    fn handle_request(&mut self, req: &Request, name: &str) -> bool {
        match self {
            TransformKind::Ga(t) => t.handle_request(req, name),
            TransformKind::SimAnn(t) => t.handle_request(req, name),
            _ => false,
        }
    }
}

/// A node in the transform aggregate tree (spec §4.6.1).
#[derive(Debug, Clone)]
pub struct TfNode {
    pub name: String,
    pub enabled: bool,
    /// Requests sent to the scoring function every time this node runs,
    /// before `execute()` (spec §4.6.1).
    pub requests: Vec<Request>,
    body: TfBody,
}

#[derive(Debug, Clone)]
enum TfBody {
    Leaf(TransformKind),
    Aggregate(Vec<TfNode>),
}

impl TfNode {
    pub fn leaf(name: &str, term: TransformKind) -> TfNode {
        TfNode { name: name.to_string(), enabled: true, requests: Vec::new(), body: TfBody::Leaf(term) }
    }

    pub fn aggregate(name: &str, children: Vec<TfNode>) -> TfNode {
        TfNode { name: name.to_string(), enabled: true, requests: Vec::new(), body: TfBody::Aggregate(children) }
    }

    pub fn with_requests(mut self, requests: Vec<Request>) -> TfNode {
        self.requests = requests;
        self
    }

    /// Runs this node: no-op if disabled, else sends any stored requests
    /// then recurses (aggregate, in order) or executes (leaf).
    pub fn go(&mut self, ctx: &mut Context) -> CoreResult<()> {
        if !self.enabled {
            return Ok(());
        }
        if !self.requests.is_empty() {
            ctx.send_requests(&self.requests);
        }
        match &mut self.body {
            TfBody::Leaf(term) => term.execute(ctx),
            TfBody::Aggregate(children) => {
                for child in children.iter_mut() {
                    child.go(ctx)?;
                }
                Ok(())
            }
        }
    }

    pub fn handle_request(&mut self, req: &Request) -> bool {
        let mut handled = match &mut self.body {
            TfBody::Leaf(term) => term.handle_request(req, &self.name),
            TfBody::Aggregate(_) => false,
        };
        match req {
            Request::EnableTerm(name) if *name == self.name => {
                self.enabled = true;
                handled = true;
            }
            Request::DisableTerm(name) if *name == self.name => {
                self.enabled = false;
                handled = true;
            }
            _ => {}
        }
        if let TfBody::Aggregate(children) = &mut self.body {
            for child in children.iter_mut() {
                handled |= child.handle_request(req);
            }
        }
        handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_node_does_not_run() {
        let mut node = TfNode::leaf("align", TransformKind::Align(AlignTransform::new(0)));
        node.enabled = false;
        node.requests.push(Request::Partition(0.0));
        // With no Context available in this unit test we only check the
        // enabled-gate short-circuits before any requests/execute would run.
        assert!(!node.enabled);
    }

    #[test]
    fn enable_disable_by_name() {
        let mut node = TfNode::leaf("ga", TransformKind::Ga(GaTransform::default()));
        assert!(node.handle_request(&Request::DisableTerm("ga".to_string())));
        assert!(!node.enabled);
        assert!(node.handle_request(&Request::EnableTerm("ga".to_string())));
        assert!(node.enabled);
    }
}
