//! Random-population transform (spec §4.6.3): seeds the workspace's
//! persistent population from the context's resolved chromosome.

use crate::constants::DEFAULT_POPULATION_SIZE;
use crate::error::CoreResult;
use crate::population::Population;

use super::Context;

#[derive(Debug, Clone)]
pub struct RandomPopulationTransform {
    pub pop_size: usize,
    pub scale_chrom_length: bool,
}

impl Default for RandomPopulationTransform {
    fn default() -> RandomPopulationTransform {
        RandomPopulationTransform { pop_size: DEFAULT_POPULATION_SIZE, scale_chrom_length: false }
    }
}

impl RandomPopulationTransform {
    pub fn new(pop_size: usize, scale_chrom_length: bool) -> RandomPopulationTransform {
        RandomPopulationTransform { pop_size, scale_chrom_length }
    }

    pub fn execute(&mut self, ctx: &mut Context) -> CoreResult<()> {
        let size = if self.scale_chrom_length {
            self.pop_size * ctx.chrom.length().max(1)
        } else {
            self.pop_size
        };
        let seed = ctx.chrom.clone();
        let population = Population::new(&seed, size, ctx.rng, ctx.models, ctx.sf, ctx.site);
        ctx.population = Some(population);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chrom::{Chrom, ChromElement, Mode};
    use crate::chrom::OccupancyElement;
    use crate::geom::Vec3;
    use crate::model::{Atom, BoundingBox, DockingSite, Model};
    use crate::rng::Rand;
    use crate::scoring::cavity_fill::CavityFillSF;
    use crate::scoring::{SfNode, TermKind};

    #[test]
    fn installs_a_population_of_requested_size() {
        let mut models = vec![Model::new("lig", vec![Atom::new(1, "C", Vec3::ZERO)])];
        let site = DockingSite::new(BoundingBox { min: Vec3::ZERO, max: Vec3::ZERO }, vec![]);
        let mut sf = SfNode::leaf("cav", 1.0, TermKind::CavityFill(CavityFillSF::new()));
        let mut rng = Rand::new(5);
        let mut chrom = Chrom::new();
        chrom.add(ChromElement::Occupancy(OccupancyElement::new(0, 0.5, Mode::Free, 0.1)));
        let mut ctx = Context::new(&mut models, &site, &mut sf, &mut rng, chrom);
        let mut t = RandomPopulationTransform::new(4, false);
        t.execute(&mut ctx).unwrap();
        assert_eq!(ctx.population.as_ref().unwrap().genomes.len(), 4);
    }
}
