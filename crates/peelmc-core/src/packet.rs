use rand::seq::IteratorRandom;
use rand::Rng;

use crate::{DegreeSampler, Error, HopSet, Result, Universe};

/// Draws random packets: a degree from the sampler, then that many distinct
/// hops chosen uniformly.
#[derive(Clone, Debug)]
pub struct PacketGenerator {
    universe: Universe,
    degrees: DegreeSampler,
}

impl PacketGenerator {
    pub fn new(universe: Universe, degrees: DegreeSampler) -> Self {
        Self { universe, degrees }
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn degrees(&self) -> &DegreeSampler {
        &self.degrees
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<HopSet> {
        let degree = self.degrees.sample(rng);
        self.packet_of_degree(degree, rng)
    }

    /// Packet of exactly `degree` hops. Reservoir sampling over the hop range
    /// makes every subset of that size equally likely.
    pub fn packet_of_degree<R: Rng + ?Sized>(&self, degree: usize, rng: &mut R) -> Result<HopSet> {
        let mut packet = HopSet::new(self.universe.capacity());
        if degree == 0 {
            return Ok(packet);
        }
        let hop_num = self.universe.hop_num();
        if degree > hop_num {
            return Err(Error::DegreeOutOfRange { degree, hop_num });
        }
        for hop in self.universe.hops().choose_multiple(rng, degree) {
            packet.insert(hop);
        }
        Ok(packet)
    }
}
