/*!
# Probe simulation primitives

Deterministic building blocks for simulated reachability probes: which
targets are accepted ([`target`]), how long a probe takes and whether it is
lost ([`ProbeModel`]), and the events and statistics a session reports
([`LogEvent`], [`SessionStats`]).

Nothing in this crate sleeps or spawns. All randomness comes from a
caller supplied [`rand_core::Rng`] so that a seeded generator reproduces a
run exactly.

```
use pingsim_core::{ProbeModel, target::is_valid_target};
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng as _;

assert!(is_valid_target("8.8.8.8"));

let mut rng = ChaChaRng::seed_from_u64(1);
let draw = ProbeModel::default().simulate(&mut rng);
assert!(draw.latency.as_millis() >= 10);
```
*/

pub mod defaults;
pub mod event;
pub mod measure;
mod probe;
mod stats;
pub mod target;
pub mod time;

pub use self::{
    event::{LogEvent, LogKind},
    measure::{Latency, PacketLoss, Probability},
    probe::{ProbeDraw, ProbeModel, ProbeOutcome},
    stats::SessionStats,
    target::{Target, TargetError, TargetKind},
};
