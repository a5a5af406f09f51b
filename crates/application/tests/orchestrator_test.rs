use ferrous_recon_application::ports::{EventBus, ResolverPool};
use ferrous_recon_application::use_cases::{
    AdmissionOutcome, BoundedOrchestrator, OrchestratorSettings, QueryPlan,
};
use ferrous_recon_domain::{
    Blacklist, BusEvent, DomainError, LogLevel, NameSubmission, QueryPriority, RecordType,
    SourceTag, SuppressReason, TerminalSignal, Topic,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

mod helpers;
use helpers::{a, cname, MockEventBus, MockResolverPool};

struct Harness {
    pool: Arc<MockResolverPool>,
    bus: Arc<MockEventBus>,
    orchestrator: Arc<BoundedOrchestrator>,
    answers: mpsc::Receiver<TerminalSignal>,
    cancel: CancellationToken,
}

fn harness(
    pool: MockResolverPool,
    types: &[RecordType],
    blacklist: &[&str],
    max_concurrent: usize,
) -> Harness {
    let pool = Arc::new(pool);
    let bus = Arc::new(MockEventBus::new());
    let cancel = CancellationToken::new();
    let (orchestrator, answers) = BoundedOrchestrator::new(
        pool.clone() as Arc<dyn ResolverPool>,
        bus.clone() as Arc<dyn EventBus>,
        QueryPlan::new(types),
        Blacklist::new(blacklist.iter().copied()),
        OrchestratorSettings {
            max_concurrent,
            ..OrchestratorSettings::default()
        },
        cancel.clone(),
    );
    Harness {
        pool,
        bus,
        orchestrator,
        answers,
        cancel,
    }
}

async fn next_signal(h: &mut Harness) -> TerminalSignal {
    tokio::time::timeout(Duration::from_secs(5), h.answers.recv())
        .await
        .expect("timed out waiting for a terminal signal")
        .expect("answer channel closed")
}

fn suppress_reason(signal: &TerminalSignal) -> Option<SuppressReason> {
    match signal {
        TerminalSignal::Suppressed { reason, .. } => Some(*reason),
        TerminalSignal::Resolved(_) => None,
    }
}

// ============================================================================
// Tests: scope, blacklist and wildcard gating
// ============================================================================

#[tokio::test]
async fn test_out_of_scope_name_is_suppressed_without_queries() {
    // Arrange
    let mut h = harness(MockResolverPool::new(&["example.com"]), &[RecordType::A], &[], 10);

    // Act
    h.orchestrator.submit("www.other.org").await.unwrap();
    let signal = next_signal(&mut h).await;

    // Assert
    assert_eq!(suppress_reason(&signal), Some(SuppressReason::OutOfScope));
    assert!(h.pool.calls().is_empty());
    assert_eq!(h.pool.wildcard_checks(), 0);
}

#[tokio::test]
async fn test_blacklisted_name_is_suppressed_without_queries() {
    // Arrange
    let pool = MockResolverPool::new(&["example.com"]);
    pool.set_answers("x.ads.example.com", RecordType::A, vec![a("10.0.0.5")]);
    let mut h = harness(pool, &[RecordType::A], &["ads.example.com"], 10);

    // Act
    h.orchestrator.submit("x.ads.example.com").await.unwrap();
    let signal = next_signal(&mut h).await;

    // Assert
    assert_eq!(suppress_reason(&signal), Some(SuppressReason::Blacklisted));
    assert!(h.pool.calls().is_empty());
}

#[tokio::test]
async fn test_dynamic_wildcard_domain_drops_every_name() {
    // Arrange
    let pool = MockResolverPool::new(&["example.com"]);
    pool.set_dynamic_wildcard("example.com");
    pool.set_answers("real.example.com", RecordType::A, vec![a("10.0.0.9")]);
    let mut h = harness(pool, &[RecordType::A], &[], 10);

    // Act
    h.orchestrator.submit("real.example.com").await.unwrap();
    let signal = next_signal(&mut h).await;

    // Assert
    assert_eq!(suppress_reason(&signal), Some(SuppressReason::DynamicWildcard));
    assert!(h.pool.calls().is_empty());
}

#[tokio::test]
async fn test_static_wildcard_suppresses_matching_answers_only() {
    // Arrange - example.com wildcards to 10.0.0.1
    let pool = MockResolverPool::new(&["example.com"]);
    pool.set_static_wildcard("example.com", &["10.0.0.1"]);
    pool.set_answers("mail.example.com", RecordType::A, vec![a("10.0.0.1")]);
    pool.set_answers("www.example.com", RecordType::A, vec![a("10.0.0.2")]);
    let mut h = harness(pool, &[RecordType::A], &[], 10);

    // Act
    h.orchestrator.submit("mail.example.com").await.unwrap();
    let first = next_signal(&mut h).await;
    h.orchestrator.submit("www.example.com").await.unwrap();
    let second = next_signal(&mut h).await;

    // Assert
    assert_eq!(first.name().as_ref(), "mail.example.com");
    assert_eq!(suppress_reason(&first), Some(SuppressReason::WildcardMatch));

    let kept = second.result().expect("www should resolve");
    assert_eq!(kept.name.as_ref(), "www.example.com");
    assert_eq!(kept.answers, vec![a("10.0.0.2")]);
    assert!(!kept.wildcard_rejected);

    let logs = h.bus.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].level, LogLevel::Debug);
    assert!(logs[0].message.contains("mail.example.com"));
}

#[tokio::test]
async fn test_name_without_answers_is_suppressed() {
    // Arrange
    let mut h = harness(
        MockResolverPool::new(&["example.com"]),
        &[RecordType::A, RecordType::AAAA],
        &[],
        10,
    );

    // Act
    h.orchestrator.submit("nothing.example.com").await.unwrap();
    let signal = next_signal(&mut h).await;

    // Assert
    assert_eq!(suppress_reason(&signal), Some(SuppressReason::NoAnswers));
    assert_eq!(
        h.pool.calls_for("nothing.example.com"),
        vec![RecordType::A, RecordType::AAAA]
    );
}

// ============================================================================
// Tests: query plan order
// ============================================================================

#[tokio::test]
async fn test_cname_answer_short_circuits_remaining_types() {
    // Arrange - types given as [A, CNAME]
    let pool = MockResolverPool::new(&["example.com"]);
    pool.set_answers("www.example.com", RecordType::CNAME, vec![cname("cdn.example.com")]);
    pool.set_answers("www.example.com", RecordType::A, vec![a("10.0.0.3")]);
    let mut h = harness(pool, &[RecordType::A, RecordType::CNAME], &[], 10);

    // Act
    h.orchestrator.submit("www.example.com").await.unwrap();
    let signal = next_signal(&mut h).await;

    // Assert - only the CNAME answer, A never queried
    let result = signal.result().expect("should resolve");
    assert_eq!(result.answers, vec![cname("cdn.example.com")]);
    assert_eq!(h.pool.calls_for("www.example.com"), vec![RecordType::CNAME]);
}

#[tokio::test]
async fn test_answers_accumulate_across_types_in_order() {
    // Arrange
    let pool = MockResolverPool::new(&["example.com"]);
    pool.set_answers("api.example.com", RecordType::A, vec![a("10.0.0.4")]);
    pool.set_answers(
        "api.example.com",
        RecordType::AAAA,
        vec![ferrous_recon_domain::ResolutionAnswer::new(RecordType::AAAA, "2001:db8::4")],
    );
    let mut h = harness(pool, &[RecordType::A, RecordType::AAAA], &[], 10);

    // Act
    h.orchestrator.submit("API.Example.com.").await.unwrap();
    let signal = next_signal(&mut h).await;

    // Assert
    let result = signal.result().expect("should resolve");
    assert_eq!(result.name.as_ref(), "api.example.com");
    assert_eq!(result.domain.as_ref(), "example.com");
    assert_eq!(result.record_types(), vec![RecordType::A, RecordType::AAAA]);
    assert!(h
        .pool
        .calls()
        .iter()
        .all(|(_, _, priority)| *priority == QueryPriority::Low));
}

// ============================================================================
// Tests: admission control
// ============================================================================

#[tokio::test]
async fn test_concurrency_never_exceeds_ticket_limit() {
    // Arrange - 1000 names, 5 tickets
    let pool = MockResolverPool::new(&["example.com"]);
    pool.set_delay(Duration::from_millis(2));
    let mut h = harness(pool, &[RecordType::A], &[], 5);
    let names: Vec<String> = (0..1000).map(|i| format!("host{}.example.com", i)).collect();

    // Act
    let orchestrator = h.orchestrator.clone();
    let admission = tokio::spawn(async move { orchestrator.admit_all(names).await });
    let mut received = 0;
    while received < 1000 {
        next_signal(&mut h).await;
        received += 1;
    }
    let admitted = admission.await.unwrap();

    // Assert
    assert_eq!(admitted, 1000);
    assert!(h.pool.max_in_flight() <= 5);
    let snapshot = h.orchestrator.snapshot();
    assert_eq!(snapshot.admitted, 1000);
    assert_eq!(snapshot.completed, snapshot.admitted);
}

#[tokio::test]
async fn test_empty_name_is_rejected_before_admission() {
    // Arrange
    let h = harness(MockResolverPool::new(&["example.com"]), &[RecordType::A], &[], 1);

    // Act
    let result = h.orchestrator.submit("   ").await;

    // Assert
    assert!(matches!(result, Err(DomainError::Admission(_))));
    let snapshot = h.orchestrator.snapshot();
    assert_eq!(snapshot.rejected, 1);
    assert_eq!(snapshot.admitted, 0);
    assert_eq!(h.orchestrator.in_flight(), 0);
}

#[tokio::test]
async fn test_malformed_names_are_rejected_without_lookups() {
    // Arrange
    let h = harness(MockResolverPool::new(&["example.com"]), &[RecordType::A], &[], 1);
    let long_label = format!("{}.example.com", "a".repeat(64));
    let long_name = format!("{}.example.com", ["abcdefghij"; 25].join("."));
    let malformed = [
        "bad name.example.com",
        "a..example.com",
        long_label.as_str(),
        long_name.as_str(),
    ];

    // Act
    let mut errors = 0;
    for raw in malformed {
        if let Err(DomainError::Admission(_)) = h.orchestrator.submit(raw).await {
            errors += 1;
        }
    }

    // Assert
    assert_eq!(errors, 4);
    let snapshot = h.orchestrator.snapshot();
    assert_eq!(snapshot.rejected, 4);
    assert_eq!(snapshot.admitted, 0);
    assert_eq!(h.orchestrator.in_flight(), 0);
    assert!(h.pool.calls().is_empty());
    assert_eq!(h.pool.wildcard_checks(), 0);
}

#[tokio::test]
async fn test_duplicate_name_is_admitted_once() {
    // Arrange
    let pool = MockResolverPool::new(&["example.com"]);
    pool.set_answers("www.example.com", RecordType::A, vec![a("10.0.0.2")]);
    let mut h = harness(pool, &[RecordType::A], &[], 10);

    // Act
    let first = h.orchestrator.submit("www.example.com").await.unwrap();
    let second = h.orchestrator.submit("WWW.example.com.").await.unwrap();
    next_signal(&mut h).await;

    // Assert
    assert_eq!(first, AdmissionOutcome::Admitted);
    assert_eq!(second, AdmissionOutcome::Duplicate);
    assert_eq!(h.orchestrator.snapshot().admitted, 1);
    assert_eq!(h.orchestrator.snapshot().duplicates, 1);
    assert!(h.answers.try_recv().is_err());
}

#[tokio::test]
async fn test_admission_publishes_liveness() {
    // Arrange
    let pool = MockResolverPool::new(&["example.com"]);
    pool.set_answers("www.example.com", RecordType::A, vec![a("10.0.0.2")]);
    let mut h = harness(pool, &[RecordType::A], &[], 10);

    // Act
    h.orchestrator.submit("www.example.com").await.unwrap();
    next_signal(&mut h).await;

    // Assert - one pulse on admission, one on completion
    assert_eq!(h.bus.published(Topic::SetActive).len(), 2);
}

#[tokio::test]
async fn test_waiting_admission_aborts_on_cancel() {
    // Arrange - single ticket held by a slow lookup
    let pool = MockResolverPool::new(&["example.com"]);
    pool.set_delay(Duration::from_secs(60));
    let mut h = harness(pool, &[RecordType::A], &[], 1);
    h.orchestrator.submit("slow.example.com").await.unwrap();

    let orchestrator = h.orchestrator.clone();
    let waiting = tokio::spawn(async move { orchestrator.submit("next.example.com").await });
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Act
    h.cancel.cancel();
    let result = tokio::time::timeout(Duration::from_secs(1), waiting)
        .await
        .expect("admission should not hang")
        .unwrap();
    let signal = next_signal(&mut h).await;

    // Assert
    assert!(matches!(result, Err(DomainError::Cancelled)));
    assert_eq!(suppress_reason(&signal), Some(SuppressReason::Cancelled));
    assert_eq!(h.orchestrator.snapshot().admitted, 1);
}

#[tokio::test]
async fn test_unreachable_resolvers_abort_the_run() {
    // Arrange
    let pool = MockResolverPool::new(&["example.com"]);
    pool.set_unreachable(true);
    let mut h = harness(pool, &[RecordType::A], &[], 10);

    // Act
    h.orchestrator.submit("www.example.com").await.unwrap();
    let signal = next_signal(&mut h).await;

    // Assert
    assert_eq!(suppress_reason(&signal), Some(SuppressReason::Cancelled));
    assert_eq!(
        h.orchestrator.fatal_error(),
        Some(DomainError::AllResolversUnreachable)
    );
    assert!(h.cancel.is_cancelled());
    assert!(h.bus.logs().iter().any(|l| l.level == LogLevel::Error));
}

// ============================================================================
// Tests: bus intake
// ============================================================================

#[tokio::test]
async fn test_bus_intake_submits_published_names() {
    // Arrange
    let pool = MockResolverPool::new(&["example.com"]);
    pool.set_answers("vpn.example.com", RecordType::A, vec![a("10.0.0.7")]);
    let mut h = harness(pool, &[RecordType::A], &[], 10);
    let producers_done = CancellationToken::new();
    let intake = h.orchestrator.spawn_bus_intake(producers_done.clone());

    // Act
    let submission =
        NameSubmission::new("VPN.example.com", "example.com", SourceTag::Api, "WhoisXML").unwrap();
    h.bus.publish(BusEvent::NewName(submission));
    let signal = next_signal(&mut h).await;
    producers_done.cancel();

    // Assert
    assert_eq!(signal.result().unwrap().name.as_ref(), "vpn.example.com");
    tokio::time::timeout(Duration::from_secs(1), intake)
        .await
        .expect("intake should stop once producers are done")
        .unwrap();
}
