//! Cross-module integration tests (spec §8.1-§8.4), run against small
//! synthetic receptor/ligand fixtures rather than real PDB data.

use dockcore::chrom::{Chrom, ChromElement, Mode, OrientationElement, PositionElement};
use dockcore::geom::Vec3;
use dockcore::grid::{GridDims, NonBondedGrid};
use dockcore::model::{Atom, Bond, BoundingBox, DockingSite, Model, RotatableBond};
use dockcore::population::Population;
use dockcore::rng::Rand;
use dockcore::scoring::cavity_fill::CavityFillSF;
use dockcore::scoring::pharmacophore::{Constraint, Feature, PharmacophoreSF};
use dockcore::scoring::vdw_inter::VdwInterSF;
use dockcore::scoring::vdw_intra::VdwIntraSF;
use dockcore::scoring::{ScoringContext, SfNode, TermKind};
use dockcore::transform::{Context, SimAnnTransform};
use dockcore::workspace::Workspace;

fn small_receptor() -> Model {
    Model::new(
        "receptor",
        vec![Atom::new(1, "C", Vec3::new(0.0, 0.0, 0.0)), Atom::new(2, "C", Vec3::new(3.0, 0.0, 0.0))],
    )
}

fn small_ligand() -> Model {
    Model::new("ligand", vec![Atom::new(1, "C", Vec3::new(10.0, 10.0, 10.0))])
}

/// A 4-atom ligand with one rotatable bond, for `VdwIntraSF` partitioning.
fn flexible_ligand() -> Model {
    let atoms = vec![
        Atom::new(1, "C", Vec3::new(0.0, 0.0, 0.0)),
        Atom::new(2, "C", Vec3::new(1.5, 0.0, 0.0)),
        Atom::new(3, "C", Vec3::new(3.0, 0.0, 0.0)),
        Atom::new(4, "C", Vec3::new(6.0, 0.0, 0.0)),
    ];
    let mut m = Model::new("ligand", atoms);
    m.bonds = vec![
        Bond { atom1: 1, atom2: 2, rotatable: false },
        Bond { atom1: 2, atom2: 3, rotatable: true },
        Bond { atom1: 3, atom2: 4, rotatable: false },
    ];
    m.rotatable_bonds = vec![RotatableBond {
        bond: Bond { atom1: 2, atom2: 3, rotatable: true },
        pendant_atoms: vec![3, 4],
    }];
    m
}

fn position_chrom(model_idx: usize, model: &Model) -> Chrom {
    let mut chrom = Chrom::new();
    chrom.add(ChromElement::Position(PositionElement::new(
        model_idx,
        model.center_of_mass,
        Mode::Free,
        5.0,
        BoundingBox { min: Vec3::new(-10.0, -10.0, -10.0), max: Vec3::new(10.0, 10.0, 10.0) },
        1.0,
    )));
    chrom.add(ChromElement::Orientation(OrientationElement::new(model_idx, Vec3::ZERO, Mode::Free, 180.0, 10.0)));
    chrom
}

#[test]
fn chromosome_sync_round_trip_invariant() {
    // spec 8.1 invariant 3: sync_to_model then sync_from_model recovers the vector.
    let ligand = small_ligand();
    let mut models = vec![ligand];
    let mut chrom = position_chrom(0, &models[0]);
    let v = chrom.get_vector();
    chrom.sync_to_model(&mut models);
    chrom.sync_from_model(&models);
    assert!(chrom.compare_vector(&v) < 1e-6);
}

#[test]
fn empty_ligand_scores_zero_across_every_term() {
    // spec 8.3: "Empty ligand -> every scoring term returns 0."
    let receptor = small_receptor();
    let empty_ligand = Model::new("ligand", vec![]);
    let mut vdw = VdwInterSF::new(1.0, 10.0);
    vdw.setup(Some(&receptor), 0.5);
    assert_eq!(vdw.raw_score(Some(&receptor), Some(&empty_ligand)), 0.0);

    let pharma = PharmacophoreSF::new(vec![], vec![], 0);
    assert_eq!(pharma.raw_score(Some(&empty_ligand)), 0.0);
}

#[test]
fn partition_zero_restores_full_interaction_list() {
    // spec 8.2: Partition(0) after Partition(d) restores the full list and
    // yields the same raw score as a fresh setup.
    let ligand = flexible_ligand();
    let mut vdw = VdwIntraSF::new(10.0);
    vdw.setup(Some(&ligand));
    let fresh = vdw.raw_score(Some(&ligand));
    vdw.partition(Some(&ligand), 2.0);
    vdw.partition(Some(&ligand), 0.0);
    let restored = vdw.raw_score(Some(&ligand));
    assert!((fresh - restored).abs() < 1e-9);
}

#[test]
fn pharmacophore_constraint_deficit_raises_ligand_error() {
    // spec 8.4 S6: a ligand short of a mandatory feature count raises LigandError.
    let donors_only = Model::new(
        "ligand",
        vec![Atom::new(1, "N", Vec3::ZERO), Atom::new(2, "N", Vec3::new(1.0, 0.0, 0.0))],
    );
    let sf = PharmacophoreSF::new(
        vec![Constraint { center: Vec3::ZERO, tolerance: 1.0, feature: Feature::Hal }],
        vec![],
        0,
    );
    let err = sf.setup_ligand(&donors_only).unwrap_err();
    assert!(matches!(err, dockcore::error::CoreError::LigandError { .. }));
}

#[test]
fn pharmacophore_three_donor_constraints_require_three_donor_atoms() {
    // spec 4.4.7/S6: three mandatory constraints on the same feature mean
    // "the ligand must supply 3 matching atoms", not "at least one".
    let two_donors = Model::new(
        "ligand",
        vec![Atom::new(1, "N", Vec3::ZERO), Atom::new(2, "N", Vec3::new(1.0, 0.0, 0.0))],
    );
    let sf = PharmacophoreSF::new(
        vec![
            Constraint { center: Vec3::ZERO, tolerance: 1.0, feature: Feature::Don },
            Constraint { center: Vec3::ZERO, tolerance: 1.0, feature: Feature::Don },
            Constraint { center: Vec3::ZERO, tolerance: 1.0, feature: Feature::Don },
        ],
        vec![],
        0,
    );
    let err = sf.setup_ligand(&two_donors).unwrap_err();
    match err {
        dockcore::error::CoreError::LigandError { required, found, .. } => {
            assert_eq!(required, 3);
            assert_eq!(found, 2);
        }
        other => panic!("expected LigandError, got {other:?}"),
    }
}

#[test]
fn ga_step_keeps_population_sorted_and_fitness_normalised() {
    // spec 8.1 invariant 7.
    let ligand = small_ligand();
    let mut models = vec![ligand];
    let site = DockingSite::new(BoundingBox { min: Vec3::ZERO, max: Vec3::ZERO }, vec![]);
    let mut sf = SfNode::leaf("cav", 1.0, TermKind::CavityFill(CavityFillSF::new()));
    let mut rng = Rand::new(21);
    let chrom = position_chrom(0, &models[0]);

    let mut pop = Population::new(&chrom, 6, &mut rng, &mut models, &mut sf, &site);
    pop.ga_step(3, 1.0, 1e-4, 0.4, true, false, &mut rng, &mut models, &mut sf, &site);

    for w in pop.genomes.windows(2) {
        assert!(w[0].raw_score >= w[1].raw_score - 1e-9);
    }
    assert!((pop.genomes.last().unwrap().fitness - 1.0).abs() < 1e-9);
}

#[test]
fn simann_records_a_minimum_at_least_as_good_as_the_start() {
    // spec 8.4 S5: SimAnn tracks a minimum-score vector, so the raw score
    // (lower is better) it leaves the model at is never worse than the
    // score it started from (sampled, synthetic fixture).
    let mut models = vec![small_ligand()];
    let site = DockingSite::new(BoundingBox { min: Vec3::ZERO, max: Vec3::ZERO }, vec![]);
    let mut sf = SfNode::leaf("cav", 1.0, TermKind::CavityFill(CavityFillSF::new()));
    let mut rng = Rand::new(31);
    let chrom = position_chrom(0, &models[0]);

    let start_score = {
        let ctx = ScoringContext { models: &models, site: &site, annotate: false };
        sf.score(&ctx)
    };

    let mut ctx = Context::new(&mut models, &site, &mut sf, &mut rng, chrom);
    let mut sa = SimAnnTransform { n_blocks: 3, block_length: 4, partition_freq: 100, ..SimAnnTransform::default() };
    sa.execute(&mut ctx).unwrap();
    let end_score = ctx.score();
    assert!(end_score <= start_score + 1e-9);
}

#[test]
fn workspace_run_with_no_transform_is_a_noop() {
    let site = DockingSite::new(BoundingBox { min: Vec3::ZERO, max: Vec3::ZERO }, vec![]);
    let mut ws = Workspace::new(site, 1);
    ws.run().unwrap();
}

#[test]
fn grid_unique_deduplicates_atom_lists() {
    let dims = GridDims::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0), 4, 4, 4).unwrap();
    let mut grid = NonBondedGrid::new(dims);
    grid.bind(1, Vec3::new(0.1, 0.1, 0.1), 3.0, 0.0);
    grid.bind(1, Vec3::new(0.1, 0.1, 0.1), 3.0, 0.0);
    grid.unique();
    let hits = grid.atoms_at(&Vec3::new(0.1, 0.1, 0.1));
    assert_eq!(hits.iter().filter(|&&id| id == 1).count(), 1);
}
