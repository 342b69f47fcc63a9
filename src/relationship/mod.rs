//! Social bonds, their decay, and trust-gated sharing.

mod decay;
#[allow(clippy::module_inception)]
mod relationship;
mod trust;

pub use decay::{DecayCurve, DecayManager};
pub use relationship::{
    InteractionOutcome, Relationship, FAMILIARITY_WEIGHT, INITIAL_FAMILIARITY, INITIAL_TRUST,
    TRUST_WEIGHT,
};
pub use trust::{
    ShareCategory, SharePolicy, TrustSystem, TrustTable, DEFAULT_TRUST_BASELINE,
    DEFAULT_TRUST_THRESHOLD,
};
