//! One prioritization action: collect → prompt → complete → parse → sort.

use crate::client::CompletionBackend;
use crate::collector;
use crate::error::Result;
use crate::model::{FeatureList, Framework};
use crate::parser::{ParseOutcome, parse_outcome};
use crate::prompt::build_prompt;
use crate::session::SessionContext;
use tracing::{debug, info};

pub struct Prioritizer<B> {
    backend: B,
}

impl<B: CompletionBackend> Prioritizer<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Run the whole action synchronously against `session`.
    pub fn run(
        &self,
        session: &mut SessionContext,
        features: &FeatureList,
        framework: Framework,
        credential: Option<&str>,
    ) -> Result<ParseOutcome> {
        collector::ensure_not_empty(features)?;
        session.authorize(credential)?;

        let mut guard = session.processing()?;
        let raw = self.complete(features, framework)?;
        guard.succeed();
        drop(guard);

        Ok(Self::present(raw))
    }

    /// Validate input and claim the session. Pair with [`Prioritizer::conclude`].
    pub fn admit(
        session: &mut SessionContext,
        features: &FeatureList,
        credential: Option<&str>,
    ) -> Result<()> {
        collector::ensure_not_empty(features)?;
        session.authorize(credential)?;
        session.begin()
    }

    /// The blocking part: build the prompt and call the backend.
    pub fn complete(&self, features: &FeatureList, framework: Framework) -> Result<String> {
        let prompt = build_prompt(features, framework);
        info!(features = features.len(), %framework, "Prioritizing features");
        debug!(prompt = %prompt, "Built prompt");
        self.backend.complete(&prompt)
    }

    /// Release the session and turn the completion into a presentable outcome.
    pub fn conclude(session: &mut SessionContext, completion: Result<String>) -> Result<ParseOutcome> {
        session.finish(completion.is_ok());
        completion.map(Self::present)
    }

    fn present(raw: String) -> ParseOutcome {
        let outcome = parse_outcome(raw).sorted();
        info!(
            parsed = outcome.is_scored(),
            rows = outcome.features().len(),
            "Completion processed"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrioritizerError;
    use crate::session::{AccessGate, TrialState};
    use std::sync::Mutex;

    struct StubBackend {
        reply: Result<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubBackend {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(PrioritizerError::remote(Some(500), "boom")),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl CompletionBackend for StubBackend {
        fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(PrioritizerError::remote(Some(500), "boom")),
            }
        }
    }

    fn features(names: &[&str]) -> FeatureList {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_run_parses_and_sorts() {
        let backend = StubBackend::ok("Dark mode - RICE Score: 17\nLogin flow - RICE Score: 42");
        let prioritizer = Prioritizer::new(backend);
        let mut session = SessionContext::default();

        let outcome = prioritizer
            .run(&mut session, &features(&["Login flow", "Dark mode"]), Framework::Rice, None)
            .unwrap();

        let names: Vec<_> = outcome.features().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Login flow", "Dark mode"]);
        assert_eq!(session.state(), TrialState::Used);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_prompt_sent_contains_features() {
        let prioritizer = Prioritizer::new(StubBackend::ok("nothing useful"));
        let mut session = SessionContext::default();
        let outcome = prioritizer
            .run(&mut session, &features(&["Login flow"]), Framework::Rice, None)
            .unwrap();

        assert!(!outcome.is_scored());
        assert_eq!(outcome.raw(), "nothing useful");
        let prompts = prioritizer.backend.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Login flow"));
    }

    #[test]
    fn test_empty_features_never_call_backend() {
        let prioritizer = Prioritizer::new(StubBackend::ok("x"));
        let mut session = SessionContext::default();
        let err = prioritizer
            .run(&mut session, &vec![], Framework::Rice, None)
            .unwrap_err();

        assert!(err.is_validation());
        assert!(prioritizer.backend.prompts.lock().unwrap().is_empty());
        assert_eq!(session.state(), TrialState::Unused);
    }

    #[test]
    fn test_remote_failure_keeps_trial_and_clears_busy() {
        let prioritizer = Prioritizer::new(StubBackend::failing());
        let mut session = SessionContext::default();
        let err = prioritizer
            .run(&mut session, &features(&["A"]), Framework::Rice, None)
            .unwrap_err();

        assert!(matches!(err, PrioritizerError::RemoteService { .. }));
        assert_eq!(session.state(), TrialState::Unused);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_second_run_requires_password() {
        let prioritizer = Prioritizer::new(StubBackend::ok("A - RICE Score: 1"));
        let mut session = SessionContext::new(AccessGate::new(Some("pw".to_string())));
        let list = features(&["A"]);

        prioritizer.run(&mut session, &list, Framework::Rice, None).unwrap();
        let err = prioritizer
            .run(&mut session, &list, Framework::Rice, Some("nope"))
            .unwrap_err();
        assert!(matches!(err, PrioritizerError::AccessDenied));
        assert_eq!(session.state(), TrialState::Locked);

        prioritizer
            .run(&mut session, &list, Framework::Rice, Some("pw"))
            .unwrap();
        assert_eq!(session.state(), TrialState::Used);
    }

    #[test]
    fn test_admit_and_conclude() {
        let mut session = SessionContext::default();
        let list = features(&["A"]);

        Prioritizer::<StubBackend>::admit(&mut session, &list, None).unwrap();
        assert!(session.is_busy());
        assert!(matches!(
            Prioritizer::<StubBackend>::admit(&mut session, &list, None),
            Err(PrioritizerError::Busy)
        ));

        let outcome =
            Prioritizer::<StubBackend>::conclude(&mut session, Ok("A - RICE Score: 3".to_string()))
                .unwrap();
        assert_eq!(outcome.features().len(), 1);
        assert!(!session.is_busy());
        assert_eq!(session.state(), TrialState::Used);
    }
}
