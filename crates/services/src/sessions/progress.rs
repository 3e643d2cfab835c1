use serde::Serialize;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    /// 1-based position of the question currently shown.
    pub position: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    /// Share of the quiz passed through so far, in whole percent.
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let scaled = self.position.saturating_mul(100) / self.total;
        u32::try_from(scaled).unwrap_or(100)
    }
}
