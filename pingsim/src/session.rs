use crate::{
    config::SessionConfig,
    sink::{EventReceiver, Sink, event_channel},
    ticker::ProbeTicker,
};
use chrono::Utc;
use log::{debug, trace, warn};
use pingsim_core::{LogEvent, LogKind, ProbeDraw, SessionStats, Target, event::messages};
use rand_chacha::ChaChaRng;
use rand_core::SeedableRng as _;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::task::JoinError;

/// A simulated ping session.
///
/// A [`ProbeSession`] is either idle or probing exactly one [`Target`].
/// While it runs it issues one probe cycle immediately on
/// [`start`](ProbeSession::start) and then one per configured interval.
/// Every cycle resolves after its own simulated round-trip time and reports
/// a reply or a timeout to the registered [`Sink`].
///
/// Misuse (starting twice, stopping an idle session, an invalid target) is
/// never an `Err`: it is reported as an [`LogKind::Error`] event and the
/// call returns `false`/`None`.
///
/// Sessions spawn tokio tasks: [`start`](ProbeSession::start) must be
/// called from within a tokio runtime.
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use pingsim::ProbeSession;
///
/// let mut session = ProbeSession::new();
/// let mut events = session.subscribe();
///
/// assert!(session.start("8.8.8.8"));
/// assert_eq!(
///     events.recv().await.unwrap().message,
///     "Starting ping to 8.8.8.8..."
/// );
///
/// let stats = session.stop().unwrap();
/// assert_eq!(stats.target.as_str(), "8.8.8.8");
/// assert_eq!(stats.packets_transmitted, 1);
/// # }
/// ```
pub struct ProbeSession {
    shared: Arc<Shared>,

    /// the repeating timer, only while running
    ticker: Option<ProbeTicker>,
}

/// state reachable from the timer and the in-flight cycles
struct Shared {
    config: SessionConfig,

    state: Mutex<State>,

    sink: Mutex<Option<Sink>>,
}

struct State {
    /// `Some` if and only if the session is running
    target: Option<Target>,

    /// reset on every start, incremented once per issued cycle
    sequence: u64,

    rng: ChaChaRng,
}

/// one issued probe, waiting for its simulated round trip
struct Cycle {
    sequence: u64,
    target: Target,
    draw: ProbeDraw,
}

/// Unexpected failure of a single probe cycle.
///
/// Faults are reported as error events; the session keeps running.
#[derive(Debug, Error)]
pub enum CycleFault {
    #[error("session state was poisoned by a panicking thread, recovered")]
    StatePoisoned,
    #[error("probe resolution did not complete: {0}")]
    Resolution(#[from] JoinError),
}

impl ProbeSession {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let rng = seed_rng(config.seed);
        let shared = Shared {
            config,
            state: Mutex::new(State {
                target: None,
                sequence: 0,
                rng,
            }),
            sink: Mutex::new(None),
        };

        Self {
            shared: Arc::new(shared),
            ticker: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    /// Route all future events to `sink`, replacing the previous one.
    ///
    /// Events of probes already in flight go to whichever sink is
    /// registered when they resolve. Nothing is replayed to a new sink.
    pub fn set_sink(&self, sink: Sink) {
        *self.shared.sink() = Some(sink);
    }

    /// create a new event channel and install its sending half as the sink
    pub fn subscribe(&self) -> EventReceiver {
        let (sink, events) = event_channel();
        self.set_sink(sink);
        events
    }

    pub fn is_running(&self) -> bool {
        self.shared.state().target.is_some()
    }

    pub fn current_target(&self) -> Option<Target> {
        self.shared.state().target.clone()
    }

    /// number of cycles issued by the current (or last) session
    pub fn sequence(&self) -> u64 {
        self.shared.state().sequence
    }

    /// Start probing `target`.
    ///
    /// Returns `false`, leaving any running session untouched, if a session
    /// is already running or if `target` is not a valid target.
    pub fn start(&mut self, target: &str) -> bool {
        if let Some(running) = self.current_target() {
            debug!("start({target:?}) ignored, already probing {running}");
            self.shared.emit(LogKind::Error, messages::ALREADY_RUNNING.to_owned());
            return false;
        }

        let target = match Target::parse(target) {
            Ok(target) => target,
            Err(_) => {
                self.shared.emit(LogKind::Error, messages::invalid_target(target));
                return false;
            }
        };

        {
            let mut state = self.shared.state();
            state.target = Some(target.clone());
            state.sequence = 0;
        }
        debug!("probe session started on {target}");

        self.shared.emit(LogKind::Info, messages::starting(&target));
        self.shared.emit(LogKind::Info, messages::header(&target));

        self.shared.issue_cycle();

        let shared = Arc::clone(&self.shared);
        let period = self.shared.config.effective_interval();
        self.ticker = Some(ProbeTicker::spawn(period, move || shared.issue_cycle()));

        true
    }

    /// Stop the running session and return its statistics.
    ///
    /// No new cycle is issued once this returns, but cycles already in
    /// flight still resolve and report.
    pub fn stop(&mut self) -> Option<SessionStats> {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }

        let Some((target, packets_transmitted)) = self.shared.end_session() else {
            self.shared.emit(LogKind::Error, messages::NOT_RUNNING.to_owned());
            return None;
        };
        debug!("probe session on {target} stopped after {packets_transmitted} cycles");

        let stats = SessionStats {
            target,
            packets_transmitted,
            timestamp: Utc::now(),
        };

        self.shared.emit(LogKind::Info, messages::statistics_header(&stats.target));
        self.shared.emit(LogKind::Info, messages::transmitted(packets_transmitted));
        self.shared.emit(LogKind::Info, messages::STOPPED.to_owned());

        Some(stats)
    }

    /// Stop the session if it is running. Called on drop.
    pub fn shutdown(&mut self) {
        if self.is_running() {
            self.stop();
        }
        self.ticker = None;
    }
}

impl Default for ProbeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProbeSession {
    fn drop(&mut self) {
        self.shutdown()
    }
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sink(&self) -> MutexGuard<'_, Option<Sink>> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, kind: LogKind, message: String) {
        let sequence = self.state().sequence;
        let event = LogEvent::new(kind, message, sequence);

        // deliver outside of the lock
        let sink = self.sink().clone();
        match sink {
            None => trace!("no sink registered, dropping event: {}", event.message),
            Some(sink) => {
                if !sink.deliver(event) {
                    debug!("sink receiver is gone, event dropped");
                }
            }
        }
    }

    /// clear the target, returning it with the final sequence number
    fn end_session(&self) -> Option<(Target, u64)> {
        let mut state = self.state();
        let sequence = state.sequence;
        state.target.take().map(|target| (target, sequence))
    }

    fn issue_cycle(self: &Arc<Self>) {
        if let Err(fault) = self.recover_state() {
            self.report(fault);
        }

        // stopped between the tick and now
        let Some(cycle) = self.next_cycle() else {
            return;
        };

        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let resolution = tokio::spawn(Arc::clone(&shared).resolve(cycle));
            if let Err(error) = resolution.await {
                shared.report(CycleFault::from(error));
            }
        });
    }

    /// clear the poison flag of the state lock, reporting it once
    ///
    /// The state is only ever mutated field by field, so the data behind
    /// a poisoned lock is still consistent.
    fn recover_state(&self) -> Result<(), CycleFault> {
        if self.state.is_poisoned() {
            self.state.clear_poison();
            return Err(CycleFault::StatePoisoned);
        }
        Ok(())
    }

    fn next_cycle(&self) -> Option<Cycle> {
        let mut state = self.state();
        let target = state.target.clone()?;

        state.sequence += 1;
        let sequence = state.sequence;
        let draw = self.config.model.simulate(&mut state.rng);

        Some(Cycle {
            sequence,
            target,
            draw,
        })
    }

    async fn resolve(self: Arc<Self>, cycle: Cycle) {
        tokio::time::sleep(cycle.draw.latency.into_duration()).await;

        let outcome = cycle.draw.resolve(Utc::now());
        if outcome.success {
            self.emit(
                LogKind::Success,
                messages::reply(&cycle.target, outcome.latency),
            );
        } else {
            self.emit(LogKind::Error, messages::timeout(cycle.sequence));
        }
    }

    fn report(&self, fault: CycleFault) {
        warn!("probe cycle failed: {fault}");
        self.emit(LogKind::Error, messages::cycle_fault(&fault));
    }
}

fn seed_rng(seed: Option<u64>) -> ChaChaRng {
    let seed = seed.unwrap_or_else(|| Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64);
    ChaChaRng::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pingsim_core::{Latency, PacketLoss, ProbeModel};
    use std::time::Duration;
    use tokio::time::sleep;

    fn session(model: ProbeModel) -> ProbeSession {
        ProbeSession::with_config(SessionConfig::default().with_model(model).with_seed(42))
    }

    fn steady() -> ProbeSession {
        session(ProbeModel::constant(Latency::from_millis(20)))
    }

    fn drain(events: &mut EventReceiver) -> Vec<LogEvent> {
        let mut received = Vec::new();
        while let Ok(event) = events.try_recv() {
            received.push(event);
        }
        received
    }

    fn messages_of(events: &[LogEvent]) -> Vec<&str> {
        events.iter().map(|event| event.message.as_str()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn start_with_valid_target() {
        let mut session = steady();
        let mut events = session.subscribe();

        assert!(session.start("8.8.8.8"));
        assert!(session.is_running());
        assert_eq!(session.current_target().unwrap().as_str(), "8.8.8.8");
        // the first cycle is issued right away
        assert_eq!(session.sequence(), 1);

        let received = drain(&mut events);
        assert_eq!(
            messages_of(&received),
            [
                "Starting ping to 8.8.8.8...",
                "PING 8.8.8.8 56(84) bytes of data."
            ]
        );
        assert!(received.iter().all(|event| event.kind == LogKind::Info));
        assert!(received.iter().all(|event| event.sequence == 0));
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_running() {
        let mut session = steady();
        let mut events = session.subscribe();

        assert!(session.start("8.8.8.8"));
        sleep(Duration::from_millis(1_500)).await;
        let sequence = session.sequence();
        drain(&mut events);

        assert!(!session.start("1.1.1.1"));
        assert_eq!(session.current_target().unwrap().as_str(), "8.8.8.8");
        assert_eq!(session.sequence(), sequence);

        let received = drain(&mut events);
        assert_eq!(messages_of(&received), ["Ping is already running"]);
        assert_eq!(received[0].kind, LogKind::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn start_with_invalid_target() {
        let mut session = steady();
        let mut events = session.subscribe();

        assert!(!session.start("not_a_host"));
        assert!(!session.is_running());
        assert!(session.current_target().is_none());

        sleep(Duration::from_secs(2)).await;
        let received = drain(&mut events);
        assert_eq!(
            messages_of(&received),
            ["Invalid IP address or hostname: not_a_host"]
        );
        assert_eq!(received[0].kind, LogKind::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_while_idle() {
        let mut session = steady();
        let mut events = session.subscribe();

        assert!(session.stop().is_none());

        let received = drain(&mut events);
        assert_eq!(messages_of(&received), ["No ping operation is running"]);
        assert_eq!(received[0].kind, LogKind::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_reports_issued_cycles() {
        let mut session = steady();
        let mut events = session.subscribe();

        assert!(session.start("example.com"));
        // cycles at 0ms, 1s and 2s
        sleep(Duration::from_millis(2_500)).await;
        drain(&mut events);

        let stats = session.stop().unwrap();
        assert_eq!(stats.target.as_str(), "example.com");
        assert_eq!(stats.packets_transmitted, 3);
        assert!(!session.is_running());
        assert!(session.current_target().is_none());

        let received = drain(&mut events);
        assert_eq!(
            messages_of(&received),
            [
                "\n--- example.com ping statistics ---",
                "3 packets transmitted",
                "Ping stopped."
            ]
        );

        // no more cycles once stopped
        sleep(Duration::from_secs(5)).await;
        assert!(drain(&mut events).is_empty());
        assert_eq!(session.sequence(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn replies_follow_the_probe_latency() {
        let mut session = steady();
        let mut events = session.subscribe();

        session.start("8.8.8.8");
        drain(&mut events);

        sleep(Duration::from_millis(10)).await;
        assert!(drain(&mut events).is_empty());

        sleep(Duration::from_millis(15)).await;
        let received = drain(&mut events);
        assert_eq!(
            messages_of(&received),
            ["Reply from 8.8.8.8: bytes=32 time=20ms TTL=64"]
        );
        assert_eq!(received[0].kind, LogKind::Success);
        assert_eq!(received[0].sequence, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn lost_probes_time_out() {
        let mut session = session(
            ProbeModel::constant(Latency::from_millis(20)).with_loss(PacketLoss::rate(1.0).unwrap()),
        );
        let mut events = session.subscribe();

        session.start("8.8.8.8");
        sleep(Duration::from_millis(1_100)).await;

        let received = drain(&mut events);
        assert_eq!(
            messages_of(&received[2..]),
            [
                "Request timeout for icmp_seq 1",
                "Request timeout for icmp_seq 2"
            ]
        );
        assert!(received[2..].iter().all(|event| event.kind == LogKind::Error));
        // a timeout does not stop the session
        assert!(session.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_does_not_interrupt_probes_in_flight() {
        let mut session = session(ProbeModel::constant(Latency::from_millis(100)));
        let mut events = session.subscribe();

        session.start("8.8.8.8");
        let stats = session.stop().unwrap();
        assert_eq!(stats.packets_transmitted, 1);

        sleep(Duration::from_millis(200)).await;
        let received = drain(&mut events);
        assert_eq!(
            messages_of(&received),
            [
                "Starting ping to 8.8.8.8...",
                "PING 8.8.8.8 56(84) bytes of data.",
                "\n--- 8.8.8.8 ping statistics ---",
                "1 packets transmitted",
                "Ping stopped.",
                "Reply from 8.8.8.8: bytes=32 time=100ms TTL=64",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn restart_resets_the_sequence() {
        let mut session = steady();
        let mut events = session.subscribe();

        session.start("8.8.8.8");
        sleep(Duration::from_millis(2_500)).await;
        assert_eq!(session.stop().unwrap().packets_transmitted, 3);

        assert!(session.start("1.1.1.1"));
        assert_eq!(session.sequence(), 1);
        sleep(Duration::from_millis(1_500)).await;

        let stats = session.stop().unwrap();
        assert_eq!(stats.target.as_str(), "1.1.1.1");
        assert_eq!(stats.packets_transmitted, 2);
        drain(&mut events);
    }

    #[tokio::test(start_paused = true)]
    async fn sequences_never_decrease() {
        let mut session = session(ProbeModel::default());
        let mut events = session.subscribe();

        session.start("8.8.8.8");
        sleep(Duration::from_millis(10_500)).await;
        session.stop();
        sleep(Duration::from_millis(500)).await;

        let received = drain(&mut events);
        // 2 banners, 11 replies or timeouts, 3 summary lines
        assert_eq!(received.len(), 16);
        assert!(
            received
                .windows(2)
                .all(|pair| pair[0].sequence <= pair[1].sequence)
        );
        for event in &received {
            assert!(chrono::DateTime::parse_from_rfc3339(&event.timestamp_iso()).is_ok());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn replacing_the_sink() {
        let mut session = steady();
        let mut first = session.subscribe();

        session.start("8.8.8.8");
        sleep(Duration::from_millis(500)).await;

        let mut second = session.subscribe();
        sleep(Duration::from_millis(1_000)).await;

        assert_eq!(drain(&mut first).len(), 3);
        assert_eq!(
            messages_of(&drain(&mut second)),
            ["Reply from 8.8.8.8: bytes=32 time=20ms TTL=64"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn replies_in_flight_go_to_the_current_sink() {
        let mut session = session(ProbeModel::constant(Latency::from_millis(100)));
        let mut first = session.subscribe();

        session.start("8.8.8.8");
        sleep(Duration::from_millis(50)).await;

        let mut second = session.subscribe();
        sleep(Duration::from_millis(100)).await;

        assert_eq!(
            messages_of(&drain(&mut first)),
            [
                "Starting ping to 8.8.8.8...",
                "PING 8.8.8.8 56(84) bytes of data."
            ]
        );
        let received = drain(&mut second);
        assert_eq!(
            messages_of(&received),
            ["Reply from 8.8.8.8: bytes=32 time=100ms TTL=64"]
        );
        assert_eq!(received[0].sequence, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn runs_without_a_sink() {
        let mut session = steady();

        assert!(session.start("8.8.8.8"));
        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(session.stop().unwrap().packets_transmitted, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_receiver_does_not_stop_the_session() {
        let mut session = steady();
        drop(session.subscribe());

        assert!(session.start("8.8.8.8"));
        sleep(Duration::from_millis(1_500)).await;
        assert!(session.is_running());
        assert_eq!(session.sequence(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn faults_are_reported_and_probing_continues() {
        let mut session = steady();
        let mut events = session.subscribe();

        session.start("8.8.8.8");
        sleep(Duration::from_millis(500)).await;
        drain(&mut events);

        let shared = Arc::clone(&session.shared);
        let poisoner = std::thread::spawn(move || {
            let _state = shared.state.lock().unwrap();
            panic!("panic while holding the session state");
        });
        assert!(poisoner.join().is_err());
        assert!(session.shared.state.is_poisoned());

        sleep(Duration::from_millis(3_000)).await;
        assert!(session.is_running());
        assert_eq!(session.sequence(), 4);
        assert!(!session.shared.state.is_poisoned());

        let received = drain(&mut events);
        let faults: Vec<_> = received
            .iter()
            .filter(|event| event.message.starts_with("Error during ping: "))
            .collect();
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].kind, LogKind::Error);
        assert_eq!(
            faults[0].message,
            "Error during ping: session state was poisoned by a panicking thread, recovered"
        );
        assert_eq!(
            received
                .iter()
                .filter(|event| event.kind == LogKind::Success)
                .count(),
            3
        );
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_a_running_session() {
        let mut session = steady();
        let mut events = session.subscribe();

        session.start("8.8.8.8");
        drain(&mut events);
        drop(session);

        let received = drain(&mut events);
        assert_eq!(received.last().unwrap().message, "Ping stopped.");
    }

    #[tokio::test(start_paused = true)]
    async fn seeded_sessions_are_reproducible() {
        async fn run() -> Vec<String> {
            let mut session = session(ProbeModel::default());
            let mut events = session.subscribe();
            session.start("8.8.8.8");
            sleep(Duration::from_millis(5_500)).await;
            session.stop();
            drain(&mut events).into_iter().map(|event| event.message).collect()
        }

        assert_eq!(run().await, run().await);
    }
}
