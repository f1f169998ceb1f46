use super::*;

/// Whether `clone_node` keeps the `id` attribute on the copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloneIdPolicy {
    #[default]
    Preserve,
    Clear,
}

/// Which `beforeunload` return value is surfaced when several handlers set one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BeforeUnloadPolicy {
    #[default]
    FirstNonEmpty,
    LastNonEmpty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub document_url: String,
    pub clone_id_policy: CloneIdPolicy,
    pub beforeunload_policy: BeforeUnloadPolicy,
    /// Also prompt when `beforeunload` was cancelled without a message.
    pub prompt_on_cancelled_beforeunload: bool,
    /// Run required-control validation before user-initiated submission.
    pub validate_on_submit: bool,
    pub trace: bool,
    pub trace_events: bool,
    pub trace_log_limit: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            document_url: "about:blank".to_string(),
            clone_id_policy: CloneIdPolicy::default(),
            beforeunload_policy: BeforeUnloadPolicy::default(),
            prompt_on_cancelled_beforeunload: false,
            validate_on_submit: true,
            trace: false,
            trace_events: true,
            trace_log_limit: 10_000,
        }
    }
}

impl HarnessConfig {
    pub fn with_document_url(mut self, url: &str) -> Self {
        self.document_url = url.to_string();
        self
    }

    pub fn with_clone_id_policy(mut self, policy: CloneIdPolicy) -> Self {
        self.clone_id_policy = policy;
        self
    }

    pub fn with_beforeunload_policy(mut self, policy: BeforeUnloadPolicy) -> Self {
        self.beforeunload_policy = policy;
        self
    }

    pub fn with_prompt_on_cancelled_beforeunload(mut self, enabled: bool) -> Self {
        self.prompt_on_cancelled_beforeunload = enabled;
        self
    }

    pub fn with_validate_on_submit(mut self, enabled: bool) -> Self {
        self.validate_on_submit = enabled;
        self
    }

    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.trace_log_limit == 0 {
            return Err(Error::InvalidState(
                "trace_log_limit requires at least 1 entry".into(),
            ));
        }
        Ok(())
    }
}
