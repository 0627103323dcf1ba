//! Application wizard and the endpoint it submits to.
//!
//! The wizard walks an applicant through a fixed sequence of steps, holding
//! their answers in a draft. On the review step the draft is coerced into a
//! payload and POSTed to `/api/apply`, which presence-checks it and appends
//! it to the lead store.

pub mod client;
pub mod model;
pub mod routes;
pub mod steps;
pub mod terminal;
pub mod transition;
pub mod wizard;

pub use client::{HttpSubmitter, Submitter};
pub use model::{ApplicationDraft, DraftUpdate, SOURCE_TAG, SubmissionPayload};
pub use routes::{ApplyState, apply_routes};
pub use steps::{STEPS, StepId};
pub use wizard::{SubmitOutcome, SubmitStatus, Wizard, WizardSnapshot};
