//! Peeling decoder over hop membership bits.
//!
//! A packet whose intersection with the undecided set is a single hop
//! resolves that hop. Packets with more than one undecided hop wait in a
//! reserve; every resolution re-examines the reserve until no further packet
//! narrows to a single hop.
//!
//! Two cascade strategies reach the same fixed point:
//!
//! - [`CascadeStrategy::Rescan`] sweeps the whole reserve repeatedly until a
//!   pass resolves nothing.
//! - [`CascadeStrategy::WorkQueue`] indexes reserved packets by their
//!   undecided hops and only revisits packets touching a hop that was just
//!   resolved.

use serde::{Deserialize, Serialize};

use crate::universe::SENTINEL;
use crate::{HopSet, MilestoneVector, Universe};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CascadeStrategy {
    #[default]
    Rescan,
    WorkQueue,
}

/// What happened to a received packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reception {
    /// The packet resolved a hop. `resolved` includes hops released by the
    /// cascade that followed.
    Resolved { resolved: usize },
    /// More than one undecided hop; held for later.
    Reserved,
    /// No undecided hop; dropped.
    Redundant,
}

enum Peel {
    Redundant,
    Resolved(usize),
    Ambiguous(usize),
}

/// Single decode step against `undecided`, clearing the hop on success.
fn peel(undecided: &mut HopSet, packet: &HopSet) -> Peel {
    match packet.intersection_count(undecided) {
        0 => Peel::Redundant,
        1 => {
            let hop = packet.first_common(undecided);
            undecided.difference_with(packet);
            hop.map_or(Peel::Redundant, Peel::Resolved)
        }
        n => Peel::Ambiguous(n),
    }
}

#[derive(Clone, Debug)]
enum Reserve {
    Rescan(Vec<HopSet>),
    WorkQueue(IndexedReserve),
}

#[derive(Clone, Debug)]
struct IndexedReserve {
    slots: Vec<Option<HopSet>>,
    by_hop: Vec<Vec<usize>>,
    live: usize,
}

impl IndexedReserve {
    fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            by_hop: vec![Vec::new(); capacity],
            live: 0,
        }
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.by_hop.iter_mut().for_each(Vec::clear);
        self.live = 0;
    }

    fn insert(&mut self, packet: HopSet, undecided: &HopSet) {
        let slot = self.slots.len();
        for hop in packet.intersection(undecided).iter() {
            self.by_hop[hop].push(slot);
        }
        self.slots.push(Some(packet));
        self.live += 1;
    }

    fn drain(
        &mut self,
        mut queue: Vec<usize>,
        universe: &Universe,
        undecided: &mut HopSet,
        milestones: &mut MilestoneVector,
    ) -> usize {
        let mut resolved = 0;
        while let Some(hop) = queue.pop() {
            for slot in std::mem::take(&mut self.by_hop[hop]) {
                let Some(packet) = self.slots[slot].as_ref() else {
                    continue;
                };
                match peel(undecided, packet) {
                    Peel::Ambiguous(_) => {}
                    Peel::Redundant => {
                        self.slots[slot] = None;
                        self.live -= 1;
                    }
                    Peel::Resolved(next) => {
                        self.slots[slot] = None;
                        self.live -= 1;
                        milestones.record(universe.decoded_count(undecided));
                        resolved += 1;
                        queue.push(next);
                    }
                }
            }
        }
        resolved
    }
}

fn rescan(
    packets: &mut Vec<HopSet>,
    universe: &Universe,
    undecided: &mut HopSet,
    milestones: &mut MilestoneVector,
) -> usize {
    let mut total = 0;
    loop {
        let mut resolved = 0;
        packets.retain(|packet| match peel(undecided, packet) {
            Peel::Resolved(_) => {
                milestones.record(universe.decoded_count(undecided));
                resolved += 1;
                false
            }
            Peel::Redundant => false,
            Peel::Ambiguous(_) => true,
        });
        if resolved == 0 {
            return total;
        }
        total += resolved;
    }
}

/// Per-trial decoder state: undecided hops, reserve, and milestones.
#[derive(Clone, Debug)]
pub struct PeelingDecoder {
    universe: Universe,
    undecided: HopSet,
    reserve: Reserve,
    milestones: MilestoneVector,
    /// Hops cleared by bare `decode_one` calls that the index has not seen.
    unpropagated: Vec<usize>,
}

impl PeelingDecoder {
    pub fn new(universe: Universe, strategy: CascadeStrategy) -> Self {
        let capacity = universe.capacity();
        let reserve = match strategy {
            CascadeStrategy::Rescan => Reserve::Rescan(Vec::new()),
            CascadeStrategy::WorkQueue => Reserve::WorkQueue(IndexedReserve::new(capacity)),
        };
        Self {
            universe,
            undecided: universe.initial_undecided(),
            reserve,
            milestones: MilestoneVector::new(capacity),
            unpropagated: Vec::new(),
        }
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Starts a new trial: only the sentinel known, empty reserve, no milestones.
    pub fn reset(&mut self) {
        self.undecided.fill();
        self.undecided.remove(SENTINEL);
        match &mut self.reserve {
            Reserve::Rescan(packets) => packets.clear(),
            Reserve::WorkQueue(index) => index.clear(),
        }
        self.milestones.clear();
        self.unpropagated.clear();
    }

    /// Returns `popcount(packet & undecided)`, clearing the hop when it is 1.
    ///
    /// Does not touch the reserve or record a milestone.
    pub fn decode_one(&mut self, packet: &HopSet) -> usize {
        match peel(&mut self.undecided, packet) {
            Peel::Redundant => 0,
            Peel::Resolved(hop) => {
                if let Reserve::WorkQueue(_) = self.reserve {
                    self.unpropagated.push(hop);
                }
                1
            }
            Peel::Ambiguous(n) => n,
        }
    }

    pub fn receive(&mut self, packet: HopSet) -> Reception {
        match peel(&mut self.undecided, &packet) {
            Peel::Redundant => Reception::Redundant,
            Peel::Ambiguous(_) => {
                match &mut self.reserve {
                    Reserve::Rescan(packets) => packets.push(packet),
                    Reserve::WorkQueue(index) => index.insert(packet, &self.undecided),
                }
                Reception::Reserved
            }
            Peel::Resolved(hop) => {
                self.milestones
                    .record(self.universe.decoded_count(&self.undecided));
                Reception::Resolved {
                    resolved: 1 + self.cascade(hop),
                }
            }
        }
    }

    fn cascade(&mut self, hop: usize) -> usize {
        let Self {
            universe,
            undecided,
            reserve,
            milestones,
            unpropagated,
        } = self;
        match reserve {
            Reserve::Rescan(packets) => {
                unpropagated.clear();
                rescan(packets, universe, undecided, milestones)
            }
            Reserve::WorkQueue(index) => {
                let mut queue = std::mem::take(unpropagated);
                queue.push(hop);
                index.drain(queue, universe, undecided, milestones)
            }
        }
    }

    /// Whether at most `target_undecided` bits remain undecided.
    pub fn is_done(&self, target_undecided: usize) -> bool {
        self.undecided.count() <= target_undecided
    }

    pub fn undecided(&self) -> &HopSet {
        &self.undecided
    }

    pub fn undecided_count(&self) -> usize {
        self.undecided.count()
    }

    /// Hops resolved so far in this trial.
    pub fn decoded_count(&self) -> usize {
        self.universe.decoded_count(&self.undecided)
    }

    pub fn milestones(&self) -> &MilestoneVector {
        &self.milestones
    }

    pub fn reserve_len(&self) -> usize {
        match &self.reserve {
            Reserve::Rescan(packets) => packets.len(),
            Reserve::WorkQueue(index) => index.live,
        }
    }

    /// Packets currently held in the reserve.
    pub fn reserved(&self) -> Box<dyn Iterator<Item = &HopSet> + '_> {
        match &self.reserve {
            Reserve::Rescan(packets) => Box::new(packets.iter()),
            Reserve::WorkQueue(index) => Box::new(index.slots.iter().flatten()),
        }
    }
}
