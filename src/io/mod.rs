//! File formats at the core's boundary (spec §6.2-§6.4): SD output,
//! pharmacophore constraint files, NMR restraint files. Model/bond
//! construction itself stays out of scope (spec §1).

pub mod constraint_file;
pub mod nmr_file;
pub mod sd_writer;
