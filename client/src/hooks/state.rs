//! Observable state of a resource hook.

/// Phase of a hook derived from its [`HookState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStatus {
    /// Never fetched. Distinct from an empty successful result.
    Idle,
    /// A request for the current dependencies is outstanding.
    Loading,
    /// The last request for the current dependencies succeeded.
    Success,
    /// The last request for the current dependencies failed.
    Error,
}

/// Data, loading flag and error message exposed to a page.
///
/// Stale data is kept while a refetch is loading and after it fails, so a
/// page can keep showing the last good result next to the error.
#[derive(Debug, Clone, PartialEq)]
pub struct HookState<T> {
    /// Last successfully fetched data.
    pub data: Option<T>,
    /// A request for the current dependencies is outstanding.
    pub loading: bool,
    /// Message of the last failure, cleared when a new request starts.
    pub error: Option<String>,
}

impl<T> Default for HookState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> HookState<T> {
    /// Phase derived from the loading flag, error and data.
    pub fn status(&self) -> HookStatus {
        match (self.loading, &self.error, &self.data) {
            (true, _, _) => HookStatus::Loading,
            (false, Some(_), _) => HookStatus::Error,
            (false, None, Some(_)) => HookStatus::Success,
            (false, None, None) => HookStatus::Idle,
        }
    }

    pub(crate) fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub(crate) fn succeed(&mut self, data: T) {
        self.data = Some(data);
        self.loading = false;
        self.error = None;
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;

    #[test]
    fn idle_is_distinct_from_empty_success() {
        let idle: HookState<Vec<u8>> = HookState::default();
        assert_eq!(idle.status(), HookStatus::Idle);

        let mut empty = HookState::default();
        empty.begin();
        empty.succeed(Vec::<u8>::new());
        assert_eq!(empty.status(), HookStatus::Success);
    }

    #[test]
    fn failure_keeps_previous_data() {
        let mut state = HookState::default();
        state.begin();
        state.succeed(vec![1, 2]);
        state.begin();
        assert_eq!(state.status(), HookStatus::Loading);
        assert_eq!(state.data, Some(vec![1, 2]));

        state.fail("Server unavailable".to_owned());

        assert_eq!(state.status(), HookStatus::Error);
        assert_eq!(state.data, Some(vec![1, 2]));
        assert_eq!(state.error.as_deref(), Some("Server unavailable"));
    }

    #[test]
    fn reloading_clears_the_previous_error() {
        let mut state: HookState<u8> = HookState::default();
        state.fail("boom".to_owned());
        state.begin();
        assert_eq!(state.error, None);
    }
}
