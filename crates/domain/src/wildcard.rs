use std::fmt;

/// Wildcard verdict for a root domain.
///
/// `Dynamic` is the strongest verdict and is never downgraded within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WildcardType {
    #[default]
    None,
    Static,
    Dynamic,
}

impl WildcardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WildcardType::None => "none",
            WildcardType::Static => "static",
            WildcardType::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for WildcardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
