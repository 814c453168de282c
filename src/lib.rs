//! Search/scoring core of a molecular docking engine (spec §1): a
//! chromosome abstraction over ligand/solvent degrees of freedom, a
//! composite scoring-function aggregate with spatial indexing, and the
//! GA/SimAnn/Simplex/Align transforms that search against it, all wired
//! through an observable workspace and a typed request bus.

#[macro_use]
extern crate lazy_static;
extern crate rand;

pub mod chrom;
pub mod constants;
pub mod error;
pub mod geom;
pub mod grid;
pub mod ic;
pub mod io;
pub mod model;
pub mod param;
pub mod population;
pub mod qt;
pub mod request;
pub mod rng;
pub mod scoring;
pub mod transform;
pub mod workspace;
