//! Pharmacophore restraint term (spec §4.4.7).

use crate::constants::PHARMA_EMPTY_SENTINEL;
use crate::error::{CoreError, CoreResult};
use crate::geom::Vec3;
use crate::model::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Any,
    Don,
    Acc,
    Hyd,
    Ani,
    Cat,
    Aro,
    Hal,
    Har,
}

impl Feature {
    pub fn from_code(code: &str) -> CoreResult<Feature> {
        match code {
            "Any" => Ok(Feature::Any),
            "Don" => Ok(Feature::Don),
            "Acc" => Ok(Feature::Acc),
            "Hyd" => Ok(Feature::Hyd),
            "Ani" => Ok(Feature::Ani),
            "Cat" => Ok(Feature::Cat),
            "Aro" => Ok(Feature::Aro),
            "Hal" => Ok(Feature::Hal),
            "Har" => Ok(Feature::Har),
            other => Err(CoreError::bad_argument(format!("unknown pharmacophore feature code '{other}'"))),
        }
    }

    fn matches(&self, atom_element: &str) -> bool {
        match self {
            Feature::Any => true,
            Feature::Don => matches!(atom_element, "N" | "O"),
            Feature::Acc => matches!(atom_element, "O" | "N" | "S"),
            Feature::Hyd => matches!(atom_element, "C"),
            Feature::Ani => atom_element == "O",
            Feature::Cat => atom_element == "N",
            Feature::Aro => atom_element == "C",
            Feature::Hal => matches!(atom_element, "F" | "Cl" | "Br" | "I"),
            Feature::Har => atom_element == "C",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Constraint {
    pub center: Vec3,
    pub tolerance: f64,
    pub feature: Feature,
}

#[derive(Debug, Clone, Default)]
pub struct PharmacophoreSF {
    pub mandatory: Vec<Constraint>,
    pub optional: Vec<Constraint>,
    pub n_optional_required: usize,
}

impl PharmacophoreSF {
    pub fn new(mandatory: Vec<Constraint>, optional: Vec<Constraint>, n_optional_required: usize) -> PharmacophoreSF {
        PharmacophoreSF { mandatory, optional, n_optional_required }
    }

    fn constraint_score(c: &Constraint, ligand: &Model) -> f64 {
        let matches: Vec<f64> = ligand
            .atoms
            .iter()
            .filter(|a| a.enabled && c.feature.matches(&a.element))
            .map(|a| a.coord.distance(&c.center))
            .collect();
        if matches.is_empty() {
            return 0.0; // optional-constraint absence, spec §4.4.7
        }
        let d = matches.into_iter().fold(f64::INFINITY, f64::min);
        let dr = d - c.tolerance;
        dr.max(0.0).powi(2)
    }

    fn feature_count(c: &Constraint, ligand: &Model) -> usize {
        ligand.atoms.iter().filter(|a| a.enabled && c.feature.matches(&a.element)).count()
    }

    /// Resolves every constraint against the attached ligand; raises
    /// `LigandError` if a mandatory feature count is short (spec §4.4.7,
    /// §8.4 S6). Several mandatory constraints can name the same feature
    /// (e.g. three separate donor constraints means "the ligand must supply
    /// 3 donor-matching atoms"), so constraints are grouped by feature and
    /// the required count is the number of mandatory constraints in that
    /// group, not a flat "at least one" check.
    pub fn setup_ligand(&self, ligand: &Model) -> CoreResult<()> {
        let mut required_by_feature: Vec<(Feature, usize)> = Vec::new();
        for c in self.mandatory.iter() {
            match required_by_feature.iter_mut().find(|(f, _)| *f == c.feature) {
                Some((_, count)) => *count += 1,
                None => required_by_feature.push((c.feature, 1)),
            }
        }
        for (feature, required) in required_by_feature {
            let found = ligand.atoms.iter().filter(|a| a.enabled && feature.matches(&a.element)).count();
            if found < required {
                return Err(CoreError::LigandError {
                    feature: format!("{feature:?}"),
                    required,
                    found,
                });
            }
        }
        Ok(())
    }

    /// Sum over mandatory constraints plus the `n_optional_required`
    /// lowest-scoring optional constraints.
    pub fn raw_score(&self, ligand: Option<&Model>) -> f64 {
        let Some(ligand) = ligand else { return 0.0 };
        if ligand.atoms.is_empty() {
            return 0.0;
        }
        let mandatory_sum: f64 = self
            .mandatory
            .iter()
            .map(|c| {
                if Self::feature_count(c, ligand) == 0 {
                    PHARMA_EMPTY_SENTINEL
                } else {
                    Self::constraint_score(c, ligand)
                }
            })
            .sum();
        let mut optional_scores: Vec<f64> = self.optional.iter().map(|c| Self::constraint_score(c, ligand)).collect();
        optional_scores.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let optional_sum: f64 = optional_scores.iter().take(self.n_optional_required).sum();
        mandatory_sum + optional_sum
    }
}
