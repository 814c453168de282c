//! Shared primitives for scoring terms (spec §4.4.1).

use std::collections::HashMap;

/// Trapezoidal smoothing kernel used by polar, aromatic and NMR terms
/// (spec §4.4.1): 1 within `delta_min`, linearly down to 0 at `delta_max`,
/// 0 beyond.
pub fn f1(delta: f64, delta_min: f64, delta_max: f64) -> f64 {
    let d = delta.abs();
    if d <= delta_min {
        1.0
    } else if d <= delta_max {
        1.0 - (d - delta_min) / (delta_max - delta_min)
    } else {
        0.0
    }
}

/// Lennard-Jones-like per-force-field-type parameters (radius, well
/// depth), the generalised vdW-pair table the teacher's DFIRE residue
/// lookup plays the same structural role for (`dfire.rs`'s `ATOMNUMBER`
/// static map), scaled down to force-field types rather than per-residue
/// atom names since the core has no residue concept.
#[derive(Debug, Clone, Copy)]
pub struct VdwParams {
    pub radius: f64,
    pub well_depth: f64,
}

lazy_static::lazy_static! {
    pub static ref VDW_TABLE: HashMap<&'static str, VdwParams> = {
        let mut m = HashMap::new();
        m.insert("C", VdwParams { radius: 1.70, well_depth: 0.105 });
        m.insert("N", VdwParams { radius: 1.55, well_depth: 0.170 });
        m.insert("O", VdwParams { radius: 1.52, well_depth: 0.210 });
        m.insert("S", VdwParams { radius: 1.80, well_depth: 0.250 });
        m.insert("P", VdwParams { radius: 1.80, well_depth: 0.200 });
        m.insert("H", VdwParams { radius: 1.20, well_depth: 0.020 });
        m.insert("F", VdwParams { radius: 1.47, well_depth: 0.061 });
        m.insert("Cl", VdwParams { radius: 1.75, well_depth: 0.265 });
        m.insert("Br", VdwParams { radius: 1.85, well_depth: 0.320 });
        m.insert("I", VdwParams { radius: 1.98, well_depth: 0.400 });
        m
    };
}

/// Generic-element fallback when `ff_type` has no table entry: treat as
/// carbon-like, same convention the teacher's DFIRE loop falls back to
/// atom-number 0 for unknown entries.
pub fn vdw_params(ff_type: &str) -> VdwParams {
    *VDW_TABLE.get(ff_type).unwrap_or(&VdwParams { radius: 1.70, well_depth: 0.105 })
}

/// 12-6 Lennard-Jones pair energy with a configurable low-distance cutoff
/// energy `ecut` (spec §4.4.2): once the raw LJ value would exceed `ecut`
/// in magnitude, it's clamped to avoid numerical blow-up at near-zero
/// separation.
pub fn lj_pair_energy(r: f64, p1: VdwParams, p2: VdwParams, ecut: f64) -> f64 {
    if r <= 1e-6 {
        return ecut;
    }
    let sigma = p1.radius + p2.radius;
    let epsilon = (p1.well_depth * p2.well_depth).sqrt();
    let sr6 = (sigma / r).powi(6);
    let sr12 = sr6 * sr6;
    let e = epsilon * (sr12 - 2.0 * sr6);
    e.min(ecut).max(-ecut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f1_is_one_within_dmin() {
        assert_eq!(f1(0.5, 1.0, 2.0), 1.0);
    }

    #[test]
    fn f1_is_zero_beyond_dmax() {
        assert_eq!(f1(3.0, 1.0, 2.0), 0.0);
    }

    #[test]
    fn f1_is_symmetric_around_zero() {
        assert_eq!(f1(-1.5, 1.0, 2.0), f1(1.5, 1.0, 2.0));
    }

    #[test]
    fn f1_linear_midpoint() {
        assert!((f1(1.5, 1.0, 2.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn lj_minimum_is_near_sigma() {
        let p = VdwParams { radius: 1.7, well_depth: 0.1 };
        let at_sigma = lj_pair_energy(2.0 * p.radius, p, p, 100.0);
        let far = lj_pair_energy(10.0, p, p, 100.0);
        assert!(at_sigma < far);
    }
}
