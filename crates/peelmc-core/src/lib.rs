pub mod error;
pub mod hopset;
pub mod universe;
pub mod degree;
pub mod packet;
pub mod milestone;
pub mod decoder;
pub mod noise;

pub use error::{Error, Result};

// Element space and bit-vectors
pub use hopset::HopSet;
pub use universe::{Universe, SENTINEL};

// Packet generation
pub use degree::DegreeSampler;
pub use packet::PacketGenerator;
pub use noise::{NoiseSource, SimRng};

// Decoding
pub use decoder::{CascadeStrategy, PeelingDecoder, Reception};
pub use milestone::MilestoneVector;
