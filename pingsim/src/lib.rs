/*!
# Simulated ping sessions

[`ProbeSession`] runs one simulated ping at a time against a
[`Target`]: a probe cycle every interval, each resolving after a simulated
round-trip time into a reply or a timeout. Everything the session has to
say goes out as [`LogEvent`]s through a [`Sink`].

```
# #[tokio::main(flavor = "current_thread")]
# async fn main() {
use pingsim::{LogBook, ProbeSession};

let mut session = ProbeSession::new();
let mut events = session.subscribe();

assert!(!session.start("not_a_host"));
assert!(session.start("example.com"));
tokio::time::sleep(std::time::Duration::from_millis(200)).await;
let stats = session.stop().unwrap();
assert_eq!(stats.packets_transmitted, 1);

let mut book = LogBook::new();
book.drain_from(&mut events);
// invalid target, two banners, one reply or timeout, three summary lines
assert_eq!(book.len(), 7);
# }
```
*/

mod config;
mod log_book;
mod session;
mod sink;
mod ticker;

// convenient re-export of `pingsim_core` objects
pub use pingsim_core::{
    Latency, LogEvent, LogKind, PacketLoss, Probability, ProbeModel, SessionStats, Target,
    TargetError, TargetKind, defaults, event::messages, target::is_valid_target,
};

pub use self::{
    config::{MIN_PROBE_INTERVAL, SessionConfig},
    log_book::{LogBook, display_line, export_file_name},
    session::{CycleFault, ProbeSession},
    sink::{EventReceiver, Sink, event_channel},
};
