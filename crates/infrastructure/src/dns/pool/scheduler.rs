use ferrous_recon_domain::{DomainError, QueryPriority};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Caps upstream queries in flight and keeps a share of the slots for
/// high-priority work such as wildcard probes.
///
/// Low-priority queries only draw from the shared slots; high-priority queries
/// take whichever slot frees up first, reserved or shared.
pub struct PriorityGate {
    shared: Arc<Semaphore>,
    reserved: Arc<Semaphore>,
    capacity: usize,
    reserved_capacity: usize,
}

/// Held for the duration of one upstream exchange.
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
}

impl PriorityGate {
    /// `capacity` is split so that one eighth (at least one slot) is reserved.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        let reserved = (capacity / 8).max(1);
        Self {
            shared: Arc::new(Semaphore::new(capacity - reserved)),
            reserved: Arc::new(Semaphore::new(reserved)),
            capacity,
            reserved_capacity: reserved,
        }
    }

    pub async fn acquire(
        &self,
        priority: QueryPriority,
        ctx: &CancellationToken,
    ) -> Result<GatePermit, DomainError> {
        let permit = match priority {
            QueryPriority::Low => tokio::select! {
                biased;
                _ = ctx.cancelled() => return Err(DomainError::Cancelled),
                p = Arc::clone(&self.shared).acquire_owned() => p,
            },
            QueryPriority::High => tokio::select! {
                biased;
                _ = ctx.cancelled() => return Err(DomainError::Cancelled),
                p = Arc::clone(&self.reserved).acquire_owned() => p,
                p = Arc::clone(&self.shared).acquire_owned() => p,
            },
        };
        permit
            .map(|p| GatePermit { _permit: p })
            .map_err(|_| DomainError::Cancelled)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn reserved_capacity(&self) -> usize {
        self.reserved_capacity
    }

    /// Slots currently free, shared and reserved.
    #[cfg(test)]
    fn available(&self) -> (usize, usize) {
        (
            self.shared.available_permits(),
            self.reserved.available_permits(),
        )
    }
}
