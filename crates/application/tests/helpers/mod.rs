#![allow(dead_code)]

mod mock_bus;
mod mock_pool;

pub use mock_bus::MockEventBus;
pub use mock_pool::MockResolverPool;

use ferrous_recon_domain::{RecordType, ResolutionAnswer};

pub fn a(data: &str) -> ResolutionAnswer {
    ResolutionAnswer::new(RecordType::A, data)
}

pub fn cname(data: &str) -> ResolutionAnswer {
    ResolutionAnswer::new(RecordType::CNAME, data)
}
