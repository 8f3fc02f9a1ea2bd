/// A single mail-exchange candidate for a domain.
///
/// Ordering follows mail-routing convention: lower `priority` first, with a
/// lexicographic tie-break on `host` so equal-priority records are probed in
/// a stable order.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MxHost {
    pub priority: u16,
    pub host: String,
}

impl MxHost {
    pub fn new(priority: u16, host: impl Into<String>) -> Self {
        Self {
            priority,
            host: host.into(),
        }
    }
}
