// When a quaternion SLERP is considered linear and not spherical
pub const LINEAR_THRESHOLD: f64 = 0.9995;

// Equality threshold for chromosome / genome comparison (ChromElement::_THRESHOLD
// in the original source, kept here as a single module-level constant rather
// than a per-instance field).
pub const CHROM_EQUALITY_THRESHOLD: f64 = 1e-4;

// Dihedral angles are standardised onto (-180, 180].
pub const DIHEDRAL_MIN: f64 = -180.0;
pub const DIHEDRAL_MAX: f64 = 180.0;
pub const DIHEDRAL_RANGE: f64 = 360.0;

// Occupancy genotype domain.
pub const OCCUPANCY_MIN: f64 = 0.0;
pub const OCCUPANCY_MAX: f64 = 1.0;

// Default relative step sizes used by chromosome elements when none is
// supplied explicitly (mirrors rDock's ChromFactory defaults).
pub const DEFAULT_TRANSLATION_STEP: f64 = 1.0; // Angstrom
pub const DEFAULT_ROTATION_STEP: f64 = 10.0; // degrees, converted to radians at use
pub const DEFAULT_DIHEDRAL_STEP: f64 = 30.0; // degrees
pub const DEFAULT_OCCUPANCY_STEP: f64 = 0.1;

// GA defaults (Population::GAstep / GATransform parameter block).
pub const DEFAULT_POPULATION_SIZE: usize = 50;
pub const DEFAULT_NEW_FRACTION: f64 = 0.5;
pub const DEFAULT_PCROSSOVER: f64 = 0.4;
pub const DEFAULT_STEP_SIZE: f64 = 1.0;
pub const DEFAULT_SIGMA_TRUNCATION_C: f64 = 1.2;
pub const DEFAULT_N_CYCLES: u32 = 100;
pub const DEFAULT_N_CONVERGENCE: u32 = 4;

// Simulated annealing defaults (SimAnnTransform parameter block).
pub const DEFAULT_START_T: f64 = 1000.0;
pub const DEFAULT_FINAL_T: f64 = 50.0;
pub const DEFAULT_N_BLOCKS: u32 = 25;
pub const DEFAULT_BLOCK_LENGTH: u32 = 500;
pub const DEFAULT_MIN_ACC_RATE: f64 = 0.25;
pub const DEFAULT_PARTITION_FREQ: u32 = 50;
pub const DEFAULT_PARTITION_DIST: f64 = 8.0;
// gas constant in J/(mol.K); the x1000 factor converts the scoring function's
// kcal-equivalent score units to the same J convention used by the source.
pub const GAS_CONSTANT_J: f64 = 8.314;
pub const KCAL_TO_J_FACTOR: f64 = 1000.0;

// Nelder-Mead simplex defaults.
pub const DEFAULT_MAX_CALLS: u32 = 2000;
pub const DEFAULT_NM_CONVERGENCE: f64 = 0.001;
pub const DEFAULT_FTOL: f64 = 1e-4;
pub const DEFAULT_FTOL_EPSILON: f64 = 1e-10;
pub const NM_REFLECTION: f64 = -1.0;
pub const NM_EXPANSION: f64 = -2.0;
pub const NM_CONTRACTION: f64 = -0.5;

// Grid / interaction-center defaults.
pub const DEFAULT_GRID_STEP: f64 = 0.5;
pub const DEFAULT_GRID_BORDER: f64 = 1.0;

// Polar scoring ideal geometry (degrees), rDock PolarSF defaults.
pub const LP_PHI_IDEAL: f64 = 45.0;

// Atomic contact is below this value (Angstrom).
pub const INTERFACE_CUTOFF: f64 = 3.9;
pub const INTERFACE_CUTOFF2: f64 = INTERFACE_CUTOFF * INTERFACE_CUTOFF;

// Membrane / restraint biasing penalty, kept from the GSO scoring bias for
// terms that still want a large fixed penalty for a disallowed pose.
pub const MEMBRANE_PENALTY_SCORE: f64 = 999.0;

// Pharmacophore term sentinel score for an evaluated-but-empty mandatory
// constraint (should never be hit; mandatory features are pre-rejected).
pub const PHARMA_EMPTY_SENTINEL: f64 = 99.0;
