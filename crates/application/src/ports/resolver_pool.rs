use async_trait::async_trait;
use ferrous_recon_domain::{
    CandidateName, DomainError, QueryPriority, RecordType, Resolution, ResolutionAnswer,
    WildcardType,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Load-balanced access to upstream resolvers plus wildcard classification.
///
/// Every async method must observe `ctx`: once it is cancelled, in-flight work
/// is abandoned and `DomainError::Cancelled` (or the neutral verdict) returned.
#[async_trait]
pub trait ResolverPool: Send + Sync {
    /// Resolves `name` for one record type.
    ///
    /// NXDOMAIN and empty answers are `Ok` with no answers. Transient failures are
    /// retried internally; an `Err` means the retry budget is spent.
    async fn resolve(
        &self,
        ctx: &CancellationToken,
        name: &str,
        record_type: RecordType,
        priority: QueryPriority,
    ) -> Result<Resolution, DomainError>;

    /// Classifies `domain`, probing it on first use and caching the verdict.
    async fn get_wildcard_type(&self, ctx: &CancellationToken, domain: &str) -> WildcardType;

    /// True when `answers` for `candidate` are explained by its domain's wildcard.
    async fn matches_wildcard(
        &self,
        ctx: &CancellationToken,
        candidate: &CandidateName,
        answers: &[ResolutionAnswer],
    ) -> bool;

    /// Root domain under study that `name` belongs to, or `None` when out of scope.
    fn subdomain_to_domain(&self, name: &str) -> Option<Arc<str>>;
}
