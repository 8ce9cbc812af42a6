/// CPU budget for incremental planning.
pub struct CpuBudget {
    /// Function that returns true if the planner should continue working.
    should_continue: Box<dyn Fn() -> bool>,
}

impl CpuBudget {
    pub fn new<F: Fn() -> bool + 'static>(should_continue: F) -> Self {
        CpuBudget {
            should_continue: Box::new(should_continue),
        }
    }

    /// Returns true if there is budget remaining to continue work.
    pub fn has_budget(&self) -> bool {
        (self.should_continue)()
    }

    /// Unlimited budget (for offline/test use).
    pub fn unlimited() -> Self {
        CpuBudget {
            should_continue: Box::new(|| true),
        }
    }
}

/// Result of one budgeted slice of work.
pub enum PhaseResult<T> {
    /// More work remains; everything committed so far is valid output.
    Running,
    /// Work is complete with output.
    Complete(T),
}

impl<T> PhaseResult<T> {
    pub fn is_complete(&self) -> bool {
        matches!(self, PhaseResult::Complete(_))
    }
}
