use ferrous_recon_domain::RecordType;
use smallvec::SmallVec;

/// Ordered record types queried for every candidate name.
///
/// Types are deduplicated and, when present, CNAME is moved to the front so
/// that a CNAME answer can short-circuit the remaining lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    types: SmallVec<[RecordType; 4]>,
}

impl QueryPlan {
    pub fn new(record_types: &[RecordType]) -> Self {
        let mut types: SmallVec<[RecordType; 4]> = SmallVec::new();
        for rt in record_types {
            if !types.contains(rt) {
                types.push(*rt);
            }
        }
        if types.is_empty() {
            types.push(RecordType::A);
        }
        if let Some(idx) = types.iter().position(|t| *t == RecordType::CNAME) {
            types.swap(0, idx);
        }
        Self { types }
    }

    pub fn types(&self) -> &[RecordType] {
        &self.types
    }

    /// True when accumulated answers after querying `record_type` make the rest redundant.
    pub fn short_circuits(&self, record_type: RecordType, answers_so_far: usize) -> bool {
        record_type == RecordType::CNAME && answers_so_far > 0
    }
}

impl Default for QueryPlan {
    fn default() -> Self {
        Self::new(&[RecordType::A])
    }
}
