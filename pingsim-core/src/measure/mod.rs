mod latency;
mod packet_loss;
mod probability;

pub use self::{
    latency::Latency,
    packet_loss::{PacketLoss, PacketLossParseError},
    probability::{Probability, ProbabilityError},
};

pub(crate) use self::probability::unit_interval;
