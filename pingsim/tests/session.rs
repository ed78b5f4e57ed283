use pingsim::{LogBook, LogKind, ProbeModel, ProbeSession, SessionConfig};
use std::time::Duration;
use tokio::time::sleep;

fn seeded_session() -> ProbeSession {
    ProbeSession::with_config(SessionConfig::default().with_seed(2024))
}

#[tokio::test(start_paused = true)]
async fn ping_a_dotted_quad() {
    let mut session = seeded_session();
    let mut events = session.subscribe();
    let mut book = LogBook::new();

    assert!(session.start("8.8.8.8"));
    // past the first reply, before the second cycle
    sleep(Duration::from_millis(500)).await;
    book.drain_from(&mut events);

    assert!(book.len() >= 3, "got {} events", book.len());
    let received: Vec<_> = book.iter().collect();
    assert_eq!(received[0].message, "Starting ping to 8.8.8.8...");
    assert_eq!(received[1].message, "PING 8.8.8.8 56(84) bytes of data.");
    let reply = received[2];
    assert!(
        matches!(reply.kind, LogKind::Success | LogKind::Error),
        "unexpected {reply:?}"
    );
    assert!(
        reply.message.starts_with("Reply from 8.8.8.8: bytes=32 time=")
            || reply.message == "Request timeout for icmp_seq 1"
    );
    assert_eq!(session.current_target().unwrap().as_str(), "8.8.8.8");

    let stats = session.stop().unwrap();
    assert_eq!(stats.target.as_str(), "8.8.8.8");
    assert!(stats.packets_transmitted >= 1);
    assert!(!session.is_running());

    book.drain_from(&mut events);
    assert_eq!(book.iter().last().unwrap().message, "Ping stopped.");
}

#[tokio::test(start_paused = true)]
async fn reject_a_malformed_target() {
    let mut session = seeded_session();
    let mut events = session.subscribe();

    assert!(!session.start("not_a_host"));
    assert!(!session.is_running());

    sleep(Duration::from_secs(3)).await;
    let mut book = LogBook::new();
    book.drain_from(&mut events);

    assert_eq!(book.len(), 1);
    let event = book.iter().next().unwrap();
    assert_eq!(event.kind, LogKind::Error);
    assert_eq!(event.message, "Invalid IP address or hostname: not_a_host");
}

#[tokio::test(start_paused = true)]
async fn long_running_session_with_custom_interval() {
    let model = ProbeModel::default();
    let config = SessionConfig::default()
        .with_seed(1)
        .with_interval(Duration::from_millis(250))
        .with_model(model);
    let mut session = ProbeSession::with_config(config);
    let mut events = session.subscribe();

    assert!(session.start("sub-domain.example.org"));
    // cycles at 0, 250, ..., 9750ms
    sleep(Duration::from_millis(9_900)).await;
    let stats = session.stop().unwrap();
    assert_eq!(stats.packets_transmitted, 40);
    sleep(Duration::from_millis(200)).await;

    let mut book = LogBook::new();
    book.drain_from(&mut events);

    let outcomes = book
        .iter()
        .filter(|event| {
            event.message.starts_with("Reply from") || event.message.starts_with("Request timeout")
        })
        .count();
    assert_eq!(outcomes, 40);
    assert!(
        book.iter()
            .zip(book.iter().skip(1))
            .all(|(a, b)| a.sequence <= b.sequence)
    );
}
