//! Chromosome elements (spec §4.3, component C3): a tagged sum over
//! {Position, Orientation, Dihedral, Occupancy, Aggregate}, replacing the
//! original source's `ChromElement` class hierarchy (spec Design Notes,
//! "Polymorphic chromosome elements"). Every variant exposes the same
//! operation set; `ChromElement::dispatch` below is the single match point.

mod dihedral;
mod occupancy;
mod orientation;
mod position;

pub use dihedral::DihedralElement;
pub use occupancy::OccupancyElement;
pub use orientation::OrientationElement;
pub use position::PositionElement;

use crate::error::{CoreError, CoreResult};
use crate::model::Model;
use crate::rng::Rand;

/// Equality threshold for chromosome comparison (rDock's
/// `ChromElement::_THRESHOLD`, kept here as a single module-level constant
/// rather than a per-instance field, per spec Design Notes).
pub const EQUALITY_THRESHOLD: f64 = crate::constants::CHROM_EQUALITY_THRESHOLD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Fixed,
    Tethered,
    Free,
}

impl Mode {
    pub fn from_str_case_insensitive(s: &str) -> CoreResult<Mode> {
        match s.to_ascii_uppercase().as_str() {
            "FIXED" => Ok(Mode::Fixed),
            "TETHERED" => Ok(Mode::Tethered),
            "FREE" => Ok(Mode::Free),
            other => Err(CoreError::bad_argument(format!("unknown chromosome mode '{other}'"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Fixed => "FIXED",
            Mode::Tethered => "TETHERED",
            Mode::Free => "FREE",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ChromElement {
    Position(PositionElement),
    Orientation(OrientationElement),
    Dihedral(DihedralElement),
    Occupancy(OccupancyElement),
    Aggregate(Chrom),
}

macro_rules! dispatch {
    ($self:expr, $method:ident $(, $arg:expr)*) => {
        match $self {
            ChromElement::Position(e) => e.$method($($arg),*),
            ChromElement::Orientation(e) => e.$method($($arg),*),
            ChromElement::Dihedral(e) => e.$method($($arg),*),
            ChromElement::Occupancy(e) => e.$method($($arg),*),
            ChromElement::Aggregate(e) => e.$method($($arg),*),
        }
    };
}

impl ChromElement {
    pub fn length(&self) -> usize {
        dispatch!(self, length)
    }

    pub fn xover_length(&self) -> usize {
        dispatch!(self, xover_length)
    }

    pub fn reset(&mut self) {
        dispatch!(self, reset)
    }

    pub fn randomise(&mut self, rng: &mut Rand, models: &[Model]) {
        dispatch!(self, randomise, rng, models)
    }

    pub fn mutate(&mut self, rel_step: f64, rng: &mut Rand) {
        dispatch!(self, mutate, rel_step, rng)
    }

    pub fn sync_from_model(&mut self, models: &[Model]) {
        dispatch!(self, sync_from_model, models)
    }

    pub fn sync_to_model(&self, models: &mut [Model]) {
        dispatch!(self, sync_to_model, models)
    }

    pub fn get_vector(&self, v: &mut Vec<f64>) {
        dispatch!(self, get_vector, v)
    }

    pub fn set_vector(&mut self, v: &[f64], i: &mut usize) -> CoreResult<()> {
        dispatch!(self, set_vector, v, i)
    }

    pub fn get_xover_vector(&self, v: &mut Vec<Vec<f64>>) {
        dispatch!(self, get_xover_vector, v)
    }

    pub fn set_xover_vector(&mut self, v: &[Vec<f64>], i: &mut usize) -> CoreResult<()> {
        dispatch!(self, set_xover_vector, v, i)
    }

    pub fn get_step_vector(&self, v: &mut Vec<f64>) {
        dispatch!(self, get_step_vector, v)
    }

    pub fn compare_vector(&self, v: &[f64], i: &mut usize) -> f64 {
        dispatch!(self, compare_vector, v, i)
    }
}

/// The aggregate chromosome element (spec §4.3.6 `Chrom`): an ordered list
/// of owned children plus the model slot list, so a full sync can invoke
/// `update_pseudo_atoms` afterwards.
#[derive(Debug, Clone, Default)]
pub struct Chrom {
    pub elements: Vec<ChromElement>,
}

impl Chrom {
    pub fn new() -> Chrom {
        Chrom { elements: Vec::new() }
    }

    pub fn add(&mut self, element: ChromElement) {
        self.elements.push(element);
    }

    pub fn length(&self) -> usize {
        self.elements.iter().map(|e| e.length()).sum()
    }

    pub fn xover_length(&self) -> usize {
        self.elements.iter().map(|e| e.xover_length()).sum()
    }

    pub fn reset(&mut self) {
        for e in self.elements.iter_mut() {
            e.reset();
        }
    }

    pub fn randomise(&mut self, rng: &mut Rand, models: &[Model]) {
        for e in self.elements.iter_mut() {
            e.randomise(rng, models);
        }
    }

    pub fn mutate(&mut self, rel_step: f64, rng: &mut Rand) {
        for e in self.elements.iter_mut() {
            e.mutate(rel_step, rng);
        }
    }

    pub fn sync_from_model(&mut self, models: &[Model]) {
        for e in self.elements.iter_mut() {
            e.sync_from_model(models);
        }
    }

    /// Resets every model slot to its baseline pose, writes every element's
    /// value into the model coordinates, then recomputes pseudo-atoms across
    /// every model slot (spec §3.2). The baseline reset is required because
    /// `OrientationElement`/`DihedralElement` only ever apply a *delta*
    /// relative to their own `last_applied` field; without resetting first,
    /// syncing a second chromosome clone onto a shared model slot would
    /// compound its delta onto whatever pose the previous clone left behind.
    pub fn sync_to_model(&self, models: &mut [Model]) {
        for model in models.iter_mut() {
            model.reset_to_baseline();
        }
        for e in self.elements.iter() {
            e.sync_to_model(models);
        }
        for model in models.iter_mut() {
            model.update_pseudo_atoms();
        }
    }

    pub fn get_vector(&self) -> Vec<f64> {
        let mut v = Vec::with_capacity(self.length());
        for e in self.elements.iter() {
            e.get_vector(&mut v);
        }
        v
    }

    pub fn set_vector(&mut self, v: &[f64]) -> CoreResult<()> {
        if v.len() != self.length() {
            return Err(CoreError::bad_argument(format!(
                "chromosome vector length mismatch: expected {}, got {}",
                self.length(),
                v.len()
            )));
        }
        let mut i = 0usize;
        for e in self.elements.iter_mut() {
            e.set_vector(v, &mut i)?;
        }
        Ok(())
    }

    pub fn get_xover_vector(&self) -> Vec<Vec<f64>> {
        let mut v = Vec::with_capacity(self.xover_length());
        for e in self.elements.iter() {
            e.get_xover_vector(&mut v);
        }
        v
    }

    pub fn set_xover_vector(&mut self, v: &[Vec<f64>]) -> CoreResult<()> {
        if v.len() != self.xover_length() {
            return Err(CoreError::bad_argument(format!(
                "chromosome xover-vector length mismatch: expected {}, got {}",
                self.xover_length(),
                v.len()
            )));
        }
        let mut i = 0usize;
        for e in self.elements.iter_mut() {
            e.set_xover_vector(v, &mut i)?;
        }
        Ok(())
    }

    pub fn get_step_vector(&self) -> Vec<f64> {
        let mut v = Vec::with_capacity(self.length());
        for e in self.elements.iter() {
            e.get_step_vector(&mut v);
        }
        v
    }

    /// Step-normalised max difference between this chromosome and `v`.
    /// Returns -1 on length mismatch (spec §3.2).
    pub fn compare_vector(&self, v: &[f64]) -> f64 {
        if v.len() != self.length() {
            return -1.0;
        }
        let mut i = 0usize;
        let mut max_diff = 0.0f64;
        for e in self.elements.iter() {
            let d = e.compare_vector(v, &mut i);
            if d > max_diff {
                max_diff = d;
            }
        }
        max_diff
    }

    /// Two chromosomes compare equal iff `compare_vector` is within
    /// `threshold` (default `EQUALITY_THRESHOLD`); undefined (false) when
    /// lengths differ.
    pub fn equals(&self, other: &Chrom, threshold: f64) -> bool {
        let v = other.get_vector();
        let d = self.compare_vector(&v);
        d >= 0.0 && d <= threshold
    }

    pub fn clone_independent(&self) -> Chrom {
        self.clone()
    }
}

/// 2-point crossover (spec §4.3.7): operates in xover-vector space so a
/// Position/Orientation triple is never split. `i_begin` is drawn in
/// `[0, L)`, `i_end` in `(i_begin, L]`; the xover-elements on
/// `[i_begin, i_end)` are swapped between the two parents.
pub fn crossover(
    parent1: &Chrom,
    parent2: &Chrom,
    i_begin: usize,
    i_end: usize,
) -> CoreResult<(Chrom, Chrom)> {
    let v1 = parent1.get_xover_vector();
    let v2 = parent2.get_xover_vector();
    if v1.len() != v2.len() {
        return Err(CoreError::invalid_request(
            "crossover requires parents with equal xover-length",
        ));
    }
    if i_end > v1.len() || i_begin > i_end {
        return Err(CoreError::bad_argument("crossover cut points out of range"));
    }
    let mut child1 = v1.clone();
    let mut child2 = v2.clone();
    child1[i_begin..i_end].clone_from_slice(&v2[i_begin..i_end]);
    child2[i_begin..i_end].clone_from_slice(&v1[i_begin..i_end]);

    let mut c1 = parent1.clone();
    let mut c2 = parent2.clone();
    c1.set_xover_vector(&child1)?;
    c2.set_xover_vector(&child2)?;
    Ok((c1, c2))
}

pub fn random_crossover_points(rng: &mut Rand, length: usize) -> (usize, usize) {
    if length == 0 {
        return (0, 0);
    }
    let i_begin = rng.uniform_int(length);
    // i_end in (i_begin, length]
    let i_end = i_begin + 1 + rng.uniform_int(length - i_begin);
    (i_begin, i_end.min(length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chrom::occupancy::OccupancyElement;

    fn simple_chrom(v: f64) -> Chrom {
        let mut c = Chrom::new();
        c.add(ChromElement::Occupancy(OccupancyElement::new(0, v, Mode::Free, 0.1)));
        c
    }

    #[test]
    fn crossover_identity_when_begin_eq_end() {
        let p1 = simple_chrom(0.1);
        let p2 = simple_chrom(0.9);
        let (c1, c2) = crossover(&p1, &p2, 0, 0).unwrap();
        assert_eq!(c1.get_vector(), p1.get_vector());
        assert_eq!(c2.get_vector(), p2.get_vector());
    }

    #[test]
    fn crossover_is_its_own_inverse() {
        let p1 = simple_chrom(0.2);
        let p2 = simple_chrom(0.8);
        let (c1, c2) = crossover(&p1, &p2, 0, 1).unwrap();
        let (back1, back2) = crossover(&c1, &c2, 0, 1).unwrap();
        assert_eq!(back1.get_vector(), p1.get_vector());
        assert_eq!(back2.get_vector(), p2.get_vector());
    }

    #[test]
    fn compare_vector_length_mismatch_is_negative_one() {
        let c = simple_chrom(0.5);
        assert_eq!(c.compare_vector(&[0.1, 0.2]), -1.0);
    }
}
