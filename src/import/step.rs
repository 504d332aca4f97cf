/// Outcome of one remote step under the failure policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<T> {
    Completed(T),

    /// Failed and tolerated; dependent steps are skipped
    Failed,
}

impl<T> Step<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Step::Completed(value) => Some(value),
            Step::Failed => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Step::Failed)
    }
}
