use async_trait::async_trait;
use dashmap::DashMap;
use ferrous_recon_domain::{
    CandidateName, DomainError, RecordType, Resolution, ResolutionAnswer, WildcardType,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const PROBE_COUNT: usize = 3;
const PROBE_LABEL_LEN: usize = 12;
const LABEL_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Lookups issued on behalf of wildcard probing.
#[async_trait]
pub trait WildcardProbe: Send + Sync {
    async fn probe(
        &self,
        ctx: &CancellationToken,
        name: &str,
        record_type: RecordType,
    ) -> Result<Resolution, DomainError>;
}

/// Cached verdict for one root domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardEntry {
    pub kind: WildcardType,
    /// Answer data every probe returned; only meaningful for `Static`.
    pub answers: BTreeSet<Arc<str>>,
}

impl WildcardEntry {
    fn none() -> Self {
        Self {
            kind: WildcardType::None,
            answers: BTreeSet::new(),
        }
    }

    /// True when `answers` could have come from the wildcard alone.
    pub fn explains(&self, answers: &[ResolutionAnswer]) -> bool {
        match self.kind {
            WildcardType::None => false,
            WildcardType::Dynamic => true,
            WildcardType::Static => {
                !answers.is_empty() && answers.iter().all(|a| self.answers.contains(&a.data))
            }
        }
    }
}

/// Per-domain wildcard classification, computed at most once per domain.
///
/// Concurrent callers for the same domain wait on a single in-flight probe
/// round. A round interrupted by cancellation is not cached.
pub struct WildcardDetector {
    record_types: Vec<RecordType>,
    cache: DashMap<Arc<str>, Arc<OnceCell<WildcardEntry>>>,
}

impl WildcardDetector {
    pub fn new(record_types: &[RecordType]) -> Self {
        let record_types = if record_types.is_empty() {
            vec![RecordType::A]
        } else {
            record_types.to_vec()
        };
        Self {
            record_types,
            cache: DashMap::new(),
        }
    }

    /// Verdict for `domain`, probing through `resolver` on first use.
    pub async fn classify(
        &self,
        ctx: &CancellationToken,
        domain: &str,
        resolver: &dyn WildcardProbe,
    ) -> Result<WildcardEntry, DomainError> {
        let cell = self
            .cache
            .entry(Arc::from(domain))
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let entry = cell
            .get_or_try_init(|| self.run_probes(ctx, domain, resolver))
            .await?;
        Ok(entry.clone())
    }

    pub async fn wildcard_type(
        &self,
        ctx: &CancellationToken,
        domain: &str,
        resolver: &dyn WildcardProbe,
    ) -> WildcardType {
        match self.classify(ctx, domain, resolver).await {
            Ok(entry) => entry.kind,
            Err(e) => {
                debug!(domain = %domain, error = %e, "Wildcard classification unavailable");
                WildcardType::None
            }
        }
    }

    pub async fn matches(
        &self,
        ctx: &CancellationToken,
        candidate: &CandidateName,
        answers: &[ResolutionAnswer],
        resolver: &dyn WildcardProbe,
    ) -> bool {
        match self.classify(ctx, candidate.domain(), resolver).await {
            Ok(entry) => entry.explains(answers),
            Err(_) => false,
        }
    }

    async fn run_probes(
        &self,
        ctx: &CancellationToken,
        domain: &str,
        resolver: &dyn WildcardProbe,
    ) -> Result<WildcardEntry, DomainError> {
        let mut rounds: Vec<BTreeSet<Arc<str>>> = Vec::with_capacity(PROBE_COUNT);

        for _ in 0..PROBE_COUNT {
            let name = format!("{}.{}", random_label(), domain);
            let mut data = BTreeSet::new();
            for &record_type in &self.record_types {
                match resolver.probe(ctx, &name, record_type).await {
                    Ok(resolution) => data.extend(resolution.answers.into_iter().map(|a| a.data)),
                    Err(e @ (DomainError::Cancelled | DomainError::AllResolversUnreachable)) => {
                        return Err(e)
                    }
                    Err(e) => debug!(probe = %name, error = %e, "Wildcard probe failed"),
                }
            }
            rounds.push(data);
        }

        let entry = verdict(rounds);
        match entry.kind {
            WildcardType::None => debug!(domain = %domain, "No DNS wildcard detected"),
            kind => info!(
                domain = %domain,
                kind = %kind,
                answers = entry.answers.len(),
                "DNS wildcard detected"
            ),
        }
        Ok(entry)
    }
}

/// All empty → none; all identical and non-empty → static; anything else → dynamic.
fn verdict(rounds: Vec<BTreeSet<Arc<str>>>) -> WildcardEntry {
    if rounds.iter().all(BTreeSet::is_empty) {
        return WildcardEntry::none();
    }
    let first = &rounds[0];
    if !first.is_empty() && rounds.iter().all(|r| r == first) {
        return WildcardEntry {
            kind: WildcardType::Static,
            answers: first.clone(),
        };
    }
    WildcardEntry {
        kind: WildcardType::Dynamic,
        answers: BTreeSet::new(),
    }
}

fn random_label() -> String {
    (0..PROBE_LABEL_LEN)
        .map(|_| LABEL_CHARS[fastrand::usize(..LABEL_CHARS.len())] as char)
        .collect()
}
