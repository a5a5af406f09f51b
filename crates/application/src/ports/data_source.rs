use async_trait::async_trait;
use ferrous_recon_domain::{DomainError, SourceTag};

/// Producer of candidate names for a root domain.
///
/// Implementations throttle themselves against their own upstream API.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    fn tag(&self) -> SourceTag;

    async fn discover(&self, domain: &str) -> Result<Vec<String>, DomainError>;
}
