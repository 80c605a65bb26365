//! Per-session state: the free-trial flag, the optional password lock and
//! the busy guard that prevents re-entry while a request is in flight.
//!
//! The password gate is a demo gate, not access control. The password is
//! held in memory and compared by plain equality, with no hashing and no
//! rate limiting.

use crate::error::{PrioritizerError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrialState {
    #[default]
    Unused,
    Used,
    Locked,
}

/// Optional shared password.
#[derive(Clone, Default)]
pub struct AccessGate {
    password: Option<String>,
}

impl AccessGate {
    pub fn new(password: Option<String>) -> Self {
        Self {
            password: password.filter(|p| !p.is_empty()),
        }
    }

    pub fn open() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.password.is_some()
    }

    fn accepts(&self, credential: Option<&str>) -> bool {
        match (&self.password, credential) {
            (Some(expected), Some(given)) => expected == given,
            _ => false,
        }
    }
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Explicit session context, passed to the pipeline for each action.
#[derive(Debug, Default)]
pub struct SessionContext {
    state: TrialState,
    busy: bool,
    gate: AccessGate,
}

impl SessionContext {
    pub fn new(gate: AccessGate) -> Self {
        Self {
            state: TrialState::Unused,
            busy: false,
            gate,
        }
    }

    pub fn state(&self) -> TrialState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Check whether the next action may run.
    ///
    /// Once the trial is used, a configured password must be supplied;
    /// a mismatch locks the session until the right one is given.
    pub fn authorize(&mut self, credential: Option<&str>) -> Result<()> {
        match self.state {
            TrialState::Unused => Ok(()),
            TrialState::Used if !self.gate.is_enabled() => Ok(()),
            TrialState::Used => {
                if self.gate.accepts(credential) {
                    Ok(())
                } else {
                    tracing::warn!("Access password mismatch, locking session");
                    self.state = TrialState::Locked;
                    Err(PrioritizerError::AccessDenied)
                }
            }
            TrialState::Locked => {
                if self.gate.accepts(credential) {
                    tracing::info!("Session unlocked");
                    self.state = TrialState::Used;
                    Ok(())
                } else {
                    Err(PrioritizerError::AccessDenied)
                }
            }
        }
    }

    /// Mark the session busy. Fails if an action is already running.
    pub fn begin(&mut self) -> Result<()> {
        if self.busy {
            return Err(PrioritizerError::Busy);
        }
        self.busy = true;
        Ok(())
    }

    /// Clear the busy flag; a successful completion consumes the trial.
    pub fn finish(&mut self, success: bool) {
        self.busy = false;
        if success && self.state == TrialState::Unused {
            tracing::debug!("Free trial consumed");
            self.state = TrialState::Used;
        }
    }

    /// Begin an action and get a guard that clears the busy flag on drop.
    pub fn processing(&mut self) -> Result<ProcessingGuard<'_>> {
        self.begin()?;
        Ok(ProcessingGuard {
            session: self,
            success: false,
        })
    }
}

/// Clears the busy flag when dropped, even on an early return.
pub struct ProcessingGuard<'a> {
    session: &'a mut SessionContext,
    success: bool,
}

impl ProcessingGuard<'_> {
    pub fn succeed(&mut self) {
        self.success = true;
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.session.finish(self.success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gated() -> SessionContext {
        SessionContext::new(AccessGate::new(Some("open sesame".to_string())))
    }

    fn use_trial(session: &mut SessionContext) {
        session.authorize(None).unwrap();
        session.begin().unwrap();
        session.finish(true);
    }

    #[test]
    fn test_unused_allows_without_credential() {
        let mut session = gated();
        assert!(session.authorize(None).is_ok());
        assert_eq!(session.state(), TrialState::Unused);
    }

    #[test]
    fn test_successful_completion_consumes_trial() {
        let mut session = gated();
        use_trial(&mut session);
        assert_eq!(session.state(), TrialState::Used);
    }

    #[test]
    fn test_failed_completion_keeps_trial() {
        let mut session = gated();
        session.begin().unwrap();
        session.finish(false);
        assert_eq!(session.state(), TrialState::Unused);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_used_without_gate_stays_open() {
        let mut session = SessionContext::new(AccessGate::open());
        use_trial(&mut session);
        assert!(session.authorize(None).is_ok());
        assert_eq!(session.state(), TrialState::Used);
    }

    #[test]
    fn test_wrong_password_locks() {
        let mut session = gated();
        use_trial(&mut session);

        let err = session.authorize(Some("guess")).unwrap_err();
        assert!(matches!(err, PrioritizerError::AccessDenied));
        assert_eq!(session.state(), TrialState::Locked);

        assert!(session.authorize(None).is_err());
        assert_eq!(session.state(), TrialState::Locked);
    }

    #[test]
    fn test_right_password_unlocks() {
        let mut session = gated();
        use_trial(&mut session);
        let _ = session.authorize(None);
        assert_eq!(session.state(), TrialState::Locked);

        session.authorize(Some("open sesame")).unwrap();
        assert_eq!(session.state(), TrialState::Used);
    }

    #[test]
    fn test_right_password_while_used() {
        let mut session = gated();
        use_trial(&mut session);
        assert!(session.authorize(Some("open sesame")).is_ok());
        assert_eq!(session.state(), TrialState::Used);
    }

    #[test]
    fn test_busy_rejects_reentry() {
        let mut session = SessionContext::default();
        session.begin().unwrap();
        assert!(matches!(session.begin(), Err(PrioritizerError::Busy)));
        session.finish(false);
        assert!(session.begin().is_ok());
    }

    #[test]
    fn test_guard_clears_busy_on_drop() {
        let mut session = SessionContext::default();
        {
            let _guard = session.processing().unwrap();
        }
        assert!(!session.is_busy());
        assert_eq!(session.state(), TrialState::Unused);

        {
            let mut guard = session.processing().unwrap();
            guard.succeed();
        }
        assert_eq!(session.state(), TrialState::Used);
    }

    #[test]
    fn test_empty_password_disables_gate() {
        assert!(!AccessGate::new(Some(String::new())).is_enabled());
    }
}
