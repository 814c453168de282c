//! Scoring-function aggregate (spec §4.4 Scoring terms / C4, §4.5 Scoring
//! aggregate / C5). A tagged tree (spec Design Notes, "Polymorphic scoring
//! tree"): each node carries a name, weight and enabled flag, and is
//! either a leaf term or an aggregate of children.

pub mod aromatic;
pub mod cavity_fill;
pub mod common;
pub mod desolvation;
pub mod nmr;
pub mod pharmacophore;
pub mod polar;
pub mod vdw_inter;
pub mod vdw_intra;

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::model::{DockingSite, Model};
use crate::request::Request;

use aromatic::AromaticSF;
use cavity_fill::CavityFillSF;
use desolvation::DesolvationSF;
use nmr::NmrSF;
use pharmacophore::PharmacophoreSF;
use polar::PolarSF;
use vdw_inter::VdwInterSF;
use vdw_intra::VdwIntraSF;

pub type ScoreMap = HashMap<String, f64>;

/// Read-only view into the workspace's model slots a scoring pass needs
/// (spec §3.1 Workspace: "slot 0 = receptor, slot 1 = ligand, slots
/// 2..n = solvent").
pub struct ScoringContext<'a> {
    pub models: &'a [Model],
    pub site: &'a DockingSite,
    /// Opt-in per-atom annotation writes (spec Design Notes / Open
    /// Question 3, SPEC_FULL supplement 7); off by default.
    pub annotate: bool,
}

impl<'a> ScoringContext<'a> {
    pub fn receptor(&self) -> Option<&'a Model> {
        self.models.first()
    }

    pub fn ligand(&self) -> Option<&'a Model> {
        self.models.get(1)
    }

    pub fn solvent(&self) -> &'a [Model] {
        if self.models.len() > 2 {
            &self.models[2..]
        } else {
            &[]
        }
    }
}

#[derive(Debug, Clone)]
pub enum TermKind {
    VdwInter(VdwInterSF),
    VdwIntra(VdwIntraSF),
    Polar(PolarSF),
    Aromatic(AromaticSF),
    Desolvation(DesolvationSF),
    Pharmacophore(PharmacophoreSF),
    Nmr(NmrSF),
    CavityFill(CavityFillSF),
}

impl TermKind {
    fn raw_score(&mut self, ctx: &ScoringContext) -> f64 {
        match self {
            TermKind::VdwInter(t) => t.raw_score(ctx.receptor(), ctx.ligand()),
            TermKind::VdwIntra(t) => t.raw_score(ctx.ligand()),
            TermKind::Polar(t) => t.raw_score(ctx.receptor(), ctx.ligand()),
            TermKind::Aromatic(t) => t.raw_score(ctx.receptor(), ctx.ligand()),
            TermKind::Desolvation(t) => t.raw_score(ctx.receptor(), ctx.ligand(), ctx.solvent()),
            TermKind::Pharmacophore(t) => t.raw_score(ctx.ligand()),
            TermKind::Nmr(t) => t.raw_score(ctx.ligand(), ctx.receptor()),
            TermKind::CavityFill(t) => t.raw_score(),
        }
    }

    fn handle_request(&mut self, req: &Request, name: &str, ctx: &ScoringContext) -> bool {
        match self {
            TermKind::VdwInter(t) => t.handle_request(req, name),
            TermKind::VdwIntra(t) => t.handle_request(req, name, ctx.ligand()),
            _ => false,
        }
    }
}

/// A node in the scoring aggregate tree.
#[derive(Debug, Clone)]
pub struct SfNode {
    pub name: String,
    pub weight: f64,
    pub enabled: bool,
    body: SfBody,
}

#[derive(Debug, Clone)]
enum SfBody {
    Leaf(TermKind),
    Aggregate(Vec<SfNode>),
}

impl SfNode {
    pub fn leaf(name: &str, weight: f64, term: TermKind) -> SfNode {
        SfNode { name: name.to_string(), weight, enabled: true, body: SfBody::Leaf(term) }
    }

    pub fn aggregate(name: &str, weight: f64) -> SfNode {
        SfNode { name: name.to_string(), weight, enabled: true, body: SfBody::Aggregate(Vec::new()) }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self.body, SfBody::Aggregate(_))
    }

    /// Adds `child` to an aggregate node (spec §4.5 `add`); fails with
    /// `InvalidRequest` on a leaf (spec §7 InvalidRequest).
    pub fn add(&mut self, child: SfNode) -> CoreResult<()> {
        match &mut self.body {
            SfBody::Aggregate(children) => {
                children.push(child);
                Ok(())
            }
            SfBody::Leaf(_) => Err(CoreError::invalid_request(format!("'{}' is a leaf term, cannot add a child", self.name))),
        }
    }

    /// Removes the first child named `name`; fails on a leaf.
    pub fn remove(&mut self, name: &str) -> CoreResult<()> {
        match &mut self.body {
            SfBody::Aggregate(children) => {
                children.retain(|c| c.name != name);
                Ok(())
            }
            SfBody::Leaf(_) => Err(CoreError::invalid_request(format!("'{}' is a leaf term, cannot remove a child", self.name))),
        }
    }

    fn raw_score(&mut self, ctx: &ScoringContext) -> f64 {
        match &mut self.body {
            SfBody::Leaf(term) => term.raw_score(ctx),
            SfBody::Aggregate(children) => children.iter_mut().map(|c| c.score(ctx)).sum(),
        }
    }

    /// Weighted score if enabled, 0 otherwise (spec §4.5 `score()`).
    pub fn score(&mut self, ctx: &ScoringContext) -> f64 {
        if !self.enabled {
            return 0.0;
        }
        self.weight * self.raw_score(ctx)
    }

    /// Post-order score-map population with dotted fully-qualified names
    /// (spec §4.5 `score_map`): disabled terms emit nothing.
    pub fn score_map(&mut self, ctx: &ScoringContext, prefix: &str, map: &mut ScoreMap) -> f64 {
        if !self.enabled {
            return 0.0;
        }
        let fq_name = if prefix.is_empty() { self.name.clone() } else { format!("{prefix}.{}", self.name) };
        match &mut self.body {
            SfBody::Leaf(term) => {
                let raw = term.raw_score(ctx);
                map.insert(fq_name, raw);
                self.weight * raw
            }
            SfBody::Aggregate(children) => {
                let mut total = 0.0;
                for child in children.iter_mut() {
                    total += child.score_map(ctx, &fq_name, map);
                }
                map.insert(fq_name, total);
                self.weight * total
            }
        }
    }

    /// Default dispatch: apply to self by fully-qualified-name match, then
    /// forward to children (spec §4.9 "Aggregates forward requests to
    /// children after applying to themselves").
    pub fn handle_request(&mut self, req: &Request, ctx: &ScoringContext) -> bool {
        let mut handled = match &mut self.body {
            SfBody::Leaf(term) => term.handle_request(req, &self.name, ctx),
            SfBody::Aggregate(_) => false,
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
        if let SfBody::Aggregate(children) = &mut self.body {
            for child in children.iter_mut() {
                handled |= child.handle_request(req, ctx);
            }
        }
        handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;
    use crate::geom::Vec3;

    fn empty_site() -> DockingSite {
        DockingSite::new(BoundingBox { min: Vec3::ZERO, max: Vec3::ZERO }, vec![])
    }

    #[test]
    fn leaf_add_is_invalid_request() {
        let mut leaf = SfNode::leaf("x", 1.0, TermKind::CavityFill(CavityFillSF::new()));
        let child = SfNode::leaf("y", 1.0, TermKind::CavityFill(CavityFillSF::new()));
        assert!(leaf.add(child).is_err());
    }

    #[test]
    fn disabled_child_contributes_nothing() {
        let mut root = SfNode::aggregate("root", 1.0);
        let mut child = SfNode::leaf("cav", 1.0, TermKind::CavityFill(CavityFillSF::new()));
        child.enabled = false;
        root.add(child).unwrap();
        let site = empty_site();
        let ctx = ScoringContext { models: &[], site: &site, annotate: false };
        assert_eq!(root.score(&ctx), 0.0);
    }

    #[test]
    fn score_map_only_records_enabled_terms() {
        let mut root = SfNode::aggregate("rxdock.score", 1.0);
        let mut enabled_leaf = SfNode::leaf("cav", 1.0, TermKind::CavityFill(CavityFillSF::new()));
        let mut disabled_leaf = SfNode::leaf("other", 1.0, TermKind::CavityFill(CavityFillSF::new()));
        disabled_leaf.enabled = false;
        root.add(enabled_leaf.clone()).unwrap();
        root.add(disabled_leaf.clone()).unwrap();
        let site = empty_site();
        let ctx = ScoringContext { models: &[], site: &site, annotate: false };
        let mut map = ScoreMap::new();
        root.score_map(&ctx, "", &mut map);
        assert!(map.contains_key("rxdock.score.cav"));
        assert!(!map.contains_key("rxdock.score.other"));
        let _ = enabled_leaf.score(&ctx);
        let _ = disabled_leaf.score(&ctx);
    }
}
