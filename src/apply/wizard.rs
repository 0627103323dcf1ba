//! Wizard controller. Owns the draft and the current step, gates
//! navigation, and drives the final submission.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::client::Submitter;
use super::model::{ApplicationDraft, DraftUpdate};
use super::steps::{LAST_STEP, STEPS, StepId, progress_pct};
use super::transition::Transition;
use crate::error::WizardError;

/// Pause between picking a choice and moving on, so the pick registers.
pub const DEFAULT_SELECT_DELAY: Duration = Duration::from_millis(120);

/// Submission status of the wizard.
///
/// idle → submitting → success | error. `Success` is terminal. `Error`
/// holds until the next navigation or submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    Idle,
    Submitting,
    Success,
    Error,
}

impl SubmitStatus {
    /// Whether step navigation is frozen in this status.
    fn freezes_navigation(&self) -> bool {
        matches!(self, Self::Submitting | Self::Success)
    }
}

/// What a call to [`Wizard::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The endpoint accepted the application.
    Accepted,
    /// The attempt failed; carries the message shown to the applicant.
    Failed(String),
    /// Nothing was sent: wrong step, or a submit already ran.
    Ignored,
}

/// Point-in-time view of the wizard, for rendering.
#[derive(Debug, Clone)]
pub struct WizardSnapshot {
    pub step_index: usize,
    pub step: StepId,
    pub status: SubmitStatus,
    pub error: Option<String>,
    pub can_advance: bool,
    pub progress_pct: u8,
    pub draft: ApplicationDraft,
}

#[derive(Debug)]
struct WizardState {
    draft: ApplicationDraft,
    step_index: usize,
    status: SubmitStatus,
    error: String,
}

impl WizardState {
    fn step(&self) -> StepId {
        STEPS[self.step_index]
    }

    /// A navigation attempt acknowledges a previous failure.
    fn clear_failure(&mut self) {
        if self.status == SubmitStatus::Error {
            self.status = SubmitStatus::Idle;
            self.error.clear();
        }
    }
}

/// Drives one application session.
pub struct Wizard {
    state: RwLock<WizardState>,
    transition: Arc<dyn Transition>,
    submitter: Arc<dyn Submitter>,
    select_delay: Duration,
}

impl Wizard {
    pub fn new(submitter: Arc<dyn Submitter>, transition: Arc<dyn Transition>) -> Self {
        Self {
            state: RwLock::new(WizardState {
                draft: ApplicationDraft::default(),
                step_index: 0,
                status: SubmitStatus::Idle,
                error: String::new(),
            }),
            transition,
            submitter,
            select_delay: DEFAULT_SELECT_DELAY,
        }
    }

    pub fn with_select_delay(mut self, delay: Duration) -> Self {
        self.select_delay = delay;
        self
    }

    pub async fn snapshot(&self) -> WizardSnapshot {
        let st = self.state.read().await;
        let step = st.step();
        WizardSnapshot {
            step_index: st.step_index,
            step,
            status: st.status,
            error: (st.status == SubmitStatus::Error).then(|| st.error.clone()),
            can_advance: step.can_advance(&st.draft),
            progress_pct: progress_pct(st.step_index),
            draft: st.draft.clone(),
        }
    }

    pub async fn step_index(&self) -> usize {
        self.state.read().await.step_index
    }

    pub async fn current_step(&self) -> StepId {
        self.state.read().await.step()
    }

    pub async fn status(&self) -> SubmitStatus {
        self.state.read().await.status
    }

    pub async fn draft(&self) -> ApplicationDraft {
        self.state.read().await.draft.clone()
    }

    /// Set one field on the draft.
    pub async fn update(&self, update: DraftUpdate) {
        self.state.write().await.draft.apply(update);
    }

    /// Whether the current step's requirements are met.
    pub async fn can_advance(&self) -> bool {
        let st = self.state.read().await;
        st.step().can_advance(&st.draft)
    }

    /// Move one step forward. Returns whether the step changed.
    pub async fn advance(&self) -> bool {
        {
            let st = self.state.read().await;
            if st.status.freezes_navigation()
                || st.step_index >= LAST_STEP
                || !st.step().can_advance(&st.draft)
            {
                return false;
            }
        }

        self.move_to(|i| (i + 1).min(LAST_STEP)).await
    }

    /// Move one step back. Returns whether the step changed.
    pub async fn retreat(&self) -> bool {
        {
            let st = self.state.read().await;
            if st.status.freezes_navigation() || st.step_index == 0 {
                return false;
            }
        }

        self.move_to(|i| i.saturating_sub(1)).await
    }

    /// Jump straight to a step. Out-of-range indices are rejected.
    pub async fn jump_to(&self, index: usize) -> Result<bool, WizardError> {
        {
            let st = self.state.read().await;
            if st.status.freezes_navigation() {
                return Ok(false);
            }
        }
        if index > LAST_STEP {
            return Err(WizardError::StepOutOfRange {
                index,
                len: STEPS.len(),
            });
        }

        Ok(self.move_to(|_| index).await)
    }

    /// Set a choice, give the selection a moment to register, then advance.
    pub async fn select_and_advance(&self, update: DraftUpdate) -> bool {
        self.update(update).await;
        tokio::time::sleep(self.select_delay).await;
        self.advance().await
    }

    /// Send the draft to the submitter. Only acts on the review step.
    pub async fn submit(&self) -> SubmitOutcome {
        let payload = {
            let mut st = self.state.write().await;
            if st.step() != StepId::Review || st.status.freezes_navigation() {
                return SubmitOutcome::Ignored;
            }
            st.status = SubmitStatus::Submitting;
            st.error.clear();
            st.draft.to_payload()
        };

        let result = self.submitter.submit(&payload).await;

        let mut st = self.state.write().await;
        match result {
            Ok(()) => {
                st.status = SubmitStatus::Success;
                info!("Application submitted");
                SubmitOutcome::Accepted
            }
            Err(e) => {
                let message = e.user_message();
                warn!(error = %e, "Application submission failed");
                st.status = SubmitStatus::Error;
                st.error = message.clone();
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Play the exit transition, move the index, play the enter transition.
    async fn move_to(&self, target: impl FnOnce(usize) -> usize) -> bool {
        self.transition.exit().await;

        let (from, to) = {
            let mut st = self.state.write().await;
            // Submit may have started while the exit effect played.
            if st.status.freezes_navigation() {
                return false;
            }
            st.clear_failure();
            let from = st.step_index;
            st.step_index = target(from);
            (from, st.step_index)
        };

        debug!(from = %STEPS[from], to = %STEPS[to], "Wizard step changed");
        self.transition.enter().await;
        from != to
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::apply::model::{DaysPerWeek, Experience, Goal, Obstacle, SubmissionPayload};
    use crate::apply::transition::Instant;
    use crate::error::SubmitError;

    /// Counts transition phases.
    #[derive(Default)]
    struct Recording {
        exits: AtomicUsize,
        enters: AtomicUsize,
    }

    #[async_trait]
    impl Transition for Recording {
        async fn exit(&self) {
            self.exits.fetch_add(1, Ordering::SeqCst);
        }
        async fn enter(&self) {
            self.enters.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Accepts everything and keeps the payloads.
    #[derive(Default)]
    struct Capture {
        sent: Mutex<Vec<serde_json::Value>>,
    }

    #[async_trait]
    impl Submitter for Capture {
        async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError> {
            self.sent
                .lock()
                .unwrap()
                .push(serde_json::to_value(payload).unwrap());
            Ok(())
        }
    }

    struct Reject(fn() -> SubmitError);

    #[async_trait]
    impl Submitter for Reject {
        async fn submit(&self, _payload: &SubmissionPayload) -> Result<(), SubmitError> {
            Err((self.0)())
        }
    }

    /// Blocks until released.
    #[derive(Default)]
    struct Gated {
        release: Notify,
    }

    #[async_trait]
    impl Submitter for Gated {
        async fn submit(&self, _payload: &SubmissionPayload) -> Result<(), SubmitError> {
            self.release.notified().await;
            Ok(())
        }
    }

    fn wizard(submitter: Arc<dyn Submitter>) -> Wizard {
        Wizard::new(submitter, Arc::new(Instant)).with_select_delay(Duration::ZERO)
    }

    async fn fill_required(w: &Wizard) {
        w.update(DraftUpdate::Name("Sam".into())).await;
        w.update(DraftUpdate::Email("sam@example.com".into())).await;
        w.update(DraftUpdate::BodyWeightKg("82.5".into())).await;
        w.update(DraftUpdate::Goal(Goal::Build)).await;
        w.update(DraftUpdate::Experience(Experience::Advanced)).await;
        w.update(DraftUpdate::DaysPerWeek(DaysPerWeek::Five)).await;
        w.update(DraftUpdate::Obstacle(Obstacle::Structure)).await;
    }

    async fn walk_to_review(w: &Wizard) {
        fill_required(w).await;
        for _ in 0..LAST_STEP {
            assert!(w.advance().await);
        }
        assert_eq!(w.current_step().await, StepId::Review);
    }

    #[tokio::test]
    async fn starts_idle_at_intro() {
        let w = wizard(Arc::new(Capture::default()));
        let snap = w.snapshot().await;
        assert_eq!(snap.step_index, 0);
        assert_eq!(snap.step, StepId::Intro);
        assert_eq!(snap.status, SubmitStatus::Idle);
        assert!(snap.can_advance);
        assert!(snap.error.is_none());
    }

    #[tokio::test]
    async fn advance_blocked_until_identity_filled() {
        let w = wizard(Arc::new(Capture::default()));
        assert!(w.advance().await);
        assert_eq!(w.current_step().await, StepId::Identity);

        assert!(!w.advance().await);
        assert_eq!(w.step_index().await, 1);

        w.update(DraftUpdate::Name("Sam".into())).await;
        w.update(DraftUpdate::Email("sam@example.com".into())).await;
        assert!(w.advance().await);
        assert_eq!(w.current_step().await, StepId::Bodyweight);
    }

    #[tokio::test]
    async fn advance_never_passes_last_step() {
        let w = wizard(Arc::new(Capture::default()));
        walk_to_review(&w).await;
        assert!(!w.advance().await);
        assert_eq!(w.step_index().await, LAST_STEP);
    }

    #[tokio::test]
    async fn retreat_never_goes_below_zero() {
        let w = wizard(Arc::new(Capture::default()));
        assert!(!w.retreat().await);
        assert_eq!(w.step_index().await, 0);

        w.advance().await;
        assert!(w.retreat().await);
        assert_eq!(w.step_index().await, 0);
    }

    #[tokio::test]
    async fn navigation_plays_exit_then_enter() {
        let rec = Arc::new(Recording::default());
        let w = Wizard::new(Arc::new(Capture::default()), rec.clone());

        w.advance().await;
        w.retreat().await;
        w.jump_to(4).await.unwrap();
        assert_eq!(rec.exits.load(Ordering::SeqCst), 3);
        assert_eq!(rec.enters.load(Ordering::SeqCst), 3);

        w.jump_to(1).await.unwrap();
        // Identity is still empty, so this one is blocked and plays nothing.
        assert!(!w.advance().await);
        assert_eq!(rec.exits.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn jump_to_ignores_gates_but_rejects_out_of_range() {
        let rec = Arc::new(Recording::default());
        let w = Wizard::new(Arc::new(Capture::default()), rec.clone());

        assert_eq!(w.jump_to(LAST_STEP).await, Ok(true));
        assert_eq!(w.current_step().await, StepId::Review);

        let err = w.jump_to(10).await.unwrap_err();
        assert_eq!(err, WizardError::StepOutOfRange { index: 10, len: 10 });
        assert_eq!(w.step_index().await, LAST_STEP);
        assert_eq!(rec.exits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn select_and_advance_sets_and_moves() {
        let w = wizard(Arc::new(Capture::default()));
        w.jump_to(3).await.unwrap();
        assert!(w.select_and_advance(DraftUpdate::Goal(Goal::Hybrid)).await);
        assert_eq!(w.current_step().await, StepId::Experience);
        assert_eq!(w.draft().await.goal, Some(Goal::Hybrid));
    }

    #[tokio::test]
    async fn submit_only_acts_on_review() {
        let capture = Arc::new(Capture::default());
        let w = wizard(capture.clone());
        fill_required(&w).await;
        assert_eq!(w.submit().await, SubmitOutcome::Ignored);
        assert!(capture.sent.lock().unwrap().is_empty());
        assert_eq!(w.status().await, SubmitStatus::Idle);
    }

    #[tokio::test]
    async fn successful_submit_is_terminal() {
        let capture = Arc::new(Capture::default());
        let w = wizard(capture.clone());
        walk_to_review(&w).await;

        assert_eq!(w.submit().await, SubmitOutcome::Accepted);
        assert_eq!(w.status().await, SubmitStatus::Success);

        let sent = capture.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["bodyWeightKg"], 82.5);
        assert_eq!(sent[0]["goal"], "build");
        assert_eq!(sent[0]["daysPerWeek"], "5");

        // Terminal: no more navigation or submits.
        assert!(!w.retreat().await);
        assert_eq!(w.jump_to(0).await, Ok(false));
        assert_eq!(w.submit().await, SubmitOutcome::Ignored);
        assert_eq!(w.status().await, SubmitStatus::Success);
        assert_eq!(capture.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_weight_is_sent_as_nan() {
        let capture = Arc::new(Capture::default());
        let w = wizard(capture.clone());
        walk_to_review(&w).await;
        w.update(DraftUpdate::BodyWeightKg(String::new())).await;

        assert_eq!(w.submit().await, SubmitOutcome::Accepted);
        let sent = capture.sent.lock().unwrap().clone();
        assert!(sent[0]["bodyWeightKg"].is_null());
    }

    #[tokio::test]
    async fn failed_submit_keeps_error_until_navigation() {
        let w = wizard(Arc::new(Reject(|| SubmitError::Rejected {
            status: 400,
            message: "Missing email".into(),
        })));
        walk_to_review(&w).await;

        assert_eq!(
            w.submit().await,
            SubmitOutcome::Failed("Missing email".into())
        );
        let snap = w.snapshot().await;
        assert_eq!(snap.status, SubmitStatus::Error);
        assert_eq!(snap.error.as_deref(), Some("Missing email"));

        assert!(w.retreat().await);
        let snap = w.snapshot().await;
        assert_eq!(snap.status, SubmitStatus::Idle);
        assert!(snap.error.is_none());
    }

    #[tokio::test]
    async fn failed_submit_can_be_retried() {
        let w = wizard(Arc::new(Reject(|| {
            SubmitError::Transport("connection refused".into())
        })));
        walk_to_review(&w).await;

        assert_eq!(
            w.submit().await,
            SubmitOutcome::Failed("connection refused".into())
        );
        assert_eq!(
            w.submit().await,
            SubmitOutcome::Failed("connection refused".into())
        );
        assert_eq!(w.status().await, SubmitStatus::Error);
    }

    #[tokio::test]
    async fn navigation_is_frozen_while_submitting() {
        let gate = Arc::new(Gated::default());
        let w = Arc::new(wizard(gate.clone()));
        walk_to_review(&w).await;

        let task = {
            let w = Arc::clone(&w);
            tokio::spawn(async move { w.submit().await })
        };
        while w.status().await != SubmitStatus::Submitting {
            tokio::task::yield_now().await;
        }

        assert!(!w.retreat().await);
        assert!(!w.advance().await);
        assert_eq!(w.jump_to(2).await, Ok(false));
        assert_eq!(w.submit().await, SubmitOutcome::Ignored);
        assert_eq!(w.step_index().await, LAST_STEP);

        gate.release.notify_one();
        assert_eq!(task.await.unwrap(), SubmitOutcome::Accepted);
        assert_eq!(w.status().await, SubmitStatus::Success);
    }

    #[tokio::test]
    async fn update_twice_matches_update_once() {
        let w = wizard(Arc::new(Capture::default()));
        w.update(DraftUpdate::Injuries("left knee".into())).await;
        let once = w.draft().await;
        w.update(DraftUpdate::Injuries("left knee".into())).await;
        assert_eq!(w.draft().await, once);
    }
}
