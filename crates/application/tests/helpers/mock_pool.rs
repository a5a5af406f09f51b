use async_trait::async_trait;
use ferrous_recon_application::ports::ResolverPool;
use ferrous_recon_domain::{
    CandidateName, DomainError, QueryPriority, RecordType, Resolution, ResolutionAnswer,
    ScopeSet, WildcardType,
};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Mock ResolverPool
// ============================================================================

pub struct MockResolverPool {
    scope: ScopeSet,
    responses: RwLock<HashMap<(String, RecordType), Vec<ResolutionAnswer>>>,
    wildcards: RwLock<HashMap<String, WildcardType>>,
    static_wildcards: RwLock<HashMap<String, BTreeSet<String>>>,
    delay: RwLock<Option<Duration>>,
    unreachable: AtomicBool,
    calls: Mutex<Vec<(String, RecordType, QueryPriority)>>,
    wildcard_checks: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockResolverPool {
    pub fn new(domains: &[&str]) -> Self {
        Self {
            scope: ScopeSet::new(domains.iter().copied()),
            responses: RwLock::new(HashMap::new()),
            wildcards: RwLock::new(HashMap::new()),
            static_wildcards: RwLock::new(HashMap::new()),
            delay: RwLock::new(None),
            unreachable: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            wildcard_checks: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn set_answers(&self, name: &str, record_type: RecordType, answers: Vec<ResolutionAnswer>) {
        self.responses
            .write()
            .insert((name.to_string(), record_type), answers);
    }

    pub fn set_dynamic_wildcard(&self, domain: &str) {
        self.wildcards
            .write()
            .insert(domain.to_string(), WildcardType::Dynamic);
    }

    pub fn set_static_wildcard(&self, domain: &str, data: &[&str]) {
        self.wildcards
            .write()
            .insert(domain.to_string(), WildcardType::Static);
        self.static_wildcards.write().insert(
            domain.to_string(),
            data.iter().map(|d| d.to_string()).collect(),
        );
    }

    /// Every lookup sleeps this long before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.write() = Some(delay);
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<(String, RecordType, QueryPriority)> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, name: &str) -> Vec<RecordType> {
        self.calls
            .lock()
            .iter()
            .filter(|(n, _, _)| n == name)
            .map(|(_, t, _)| *t)
            .collect()
    }

    pub fn wildcard_checks(&self) -> usize {
        self.wildcard_checks.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResolverPool for MockResolverPool {
    async fn resolve(
        &self,
        ctx: &CancellationToken,
        name: &str,
        record_type: RecordType,
        priority: QueryPriority,
    ) -> Result<Resolution, DomainError> {
        self.calls
            .lock()
            .push((name.to_string(), record_type, priority));

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.delay.read();
        let outcome = async {
            if let Some(delay) = delay {
                tokio::select! {
                    _ = ctx.cancelled() => return Err(DomainError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            if self.unreachable.load(Ordering::SeqCst) {
                return Err(DomainError::AllResolversUnreachable);
            }
            let answers = self
                .responses
                .read()
                .get(&(name.to_string(), record_type))
                .cloned()
                .unwrap_or_default();
            Ok(Resolution {
                answers,
                elapsed: delay.unwrap_or_default(),
                upstream: Some(Arc::from("mock")),
            })
        }
        .await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    async fn get_wildcard_type(&self, _ctx: &CancellationToken, domain: &str) -> WildcardType {
        self.wildcard_checks.fetch_add(1, Ordering::SeqCst);
        self.wildcards
            .read()
            .get(domain)
            .copied()
            .unwrap_or_default()
    }

    async fn matches_wildcard(
        &self,
        _ctx: &CancellationToken,
        candidate: &CandidateName,
        answers: &[ResolutionAnswer],
    ) -> bool {
        let sets = self.static_wildcards.read();
        let Some(set) = sets.get(candidate.domain().as_ref()) else {
            return false;
        };
        !answers.is_empty() && answers.iter().all(|a| set.contains(a.data.as_ref()))
    }

    fn subdomain_to_domain(&self, name: &str) -> Option<Arc<str>> {
        self.scope.subdomain_to_domain(name)
    }
}
