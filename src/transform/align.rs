//! Align transform (spec §4.6.2): place and orient the ligand relative to
//! the docking site's cavity before a search transform runs.

use crate::error::CoreResult;
use crate::geom::{axis_angle_quaternion, Vec3};

use super::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationMode {
    /// Move the ligand COM to a randomly sampled cavity coordinate.
    RandomCavityPoint,
    /// Move the ligand COM to the cavity centroid (`mode=ALIGN`).
    CavityCentroid,
    /// Leave the ligand COM unchanged.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationMode {
    /// Rotate by a random axis, uniform angle in `[0, 180]` degrees.
    RandomAxisAngle,
    /// Align the ligand's principal axes to the cavity's, then flip each
    /// axis 180 degrees with probability one half.
    PrincipalAxes,
}

#[derive(Debug, Clone)]
pub struct AlignTransform {
    pub ligand_slot: usize,
    pub translation_mode: TranslationMode,
    pub rotation_mode: RotationMode,
}

impl AlignTransform {
    pub fn new(ligand_slot: usize) -> AlignTransform {
        AlignTransform {
            ligand_slot,
            translation_mode: TranslationMode::RandomCavityPoint,
            rotation_mode: RotationMode::RandomAxisAngle,
        }
    }

    pub fn with_modes(mut self, translation: TranslationMode, rotation: RotationMode) -> AlignTransform {
        self.translation_mode = translation;
        self.rotation_mode = rotation;
        self
    }

    pub fn execute(&mut self, ctx: &mut Context) -> CoreResult<()> {
        let target = match self.translation_mode {
            TranslationMode::RandomCavityPoint => {
                let coords = &ctx.site.cavity_coords;
                if coords.is_empty() {
                    None
                } else {
                    let i = ctx.rng.uniform_int(coords.len());
                    Some(coords[i])
                }
            }
            TranslationMode::CavityCentroid => Some(ctx.site.cavity_com()),
            TranslationMode::None => None,
        };

        let Some(model) = ctx.models.get_mut(self.ligand_slot) else { return Ok(()) };

        if let Some(target) = target {
            model.set_center_of_mass(target);
        }

        match self.rotation_mode {
            RotationMode::RandomAxisAngle => {
                let axis = ctx.rng.unit_vector();
                let theta = ctx.rng.uniform_range(0.0, 180.0);
                let q = axis_angle_quaternion(&axis, theta);
                model.rotate_about_com(q);
            }
            RotationMode::PrincipalAxes => {
                model.align_principal_axes(cavity_axes());
                for axis in [Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 1.0)] {
                    if ctx.rng.uniform01() < 0.5 {
                        let q = axis_angle_quaternion(&axis, 180.0);
                        model.rotate_about_com(q);
                    }
                }
            }
        }
        Ok(())
    }
}

fn cavity_axes() -> [Vec3; 3] {
    [Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 1.0)]
}
