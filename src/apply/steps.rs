//! The fixed step sequence of the application wizard.

use serde::Serialize;

use super::model::ApplicationDraft;

/// One step of the wizard.
///
/// Progresses linearly: Intro → Identity → Bodyweight → Goal → Experience →
/// Days → Obstacle → Injuries → WhyNow → Review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StepId {
    Intro,
    Identity,
    Bodyweight,
    Goal,
    Experience,
    Days,
    Obstacle,
    Injuries,
    WhyNow,
    Review,
}

/// The sequence, in order.
pub const STEPS: [StepId; 10] = [
    StepId::Intro,
    StepId::Identity,
    StepId::Bodyweight,
    StepId::Goal,
    StepId::Experience,
    StepId::Days,
    StepId::Obstacle,
    StepId::Injuries,
    StepId::WhyNow,
    StepId::Review,
];

/// Index of the last step.
pub const LAST_STEP: usize = STEPS.len() - 1;

impl StepId {
    /// Step at `index`, if in range.
    pub fn at(index: usize) -> Option<StepId> {
        STEPS.get(index).copied()
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Intro => "This isn't a purchase. It's an application.",
            Self::Identity => "Who are you?",
            Self::Bodyweight => "Current body weight",
            Self::Goal => "Aspirations",
            Self::Experience => "Training experience",
            Self::Days => "Commitment",
            Self::Obstacle => "Biggest obstacle",
            Self::Injuries => "Injuries / limitations",
            Self::WhyNow => "Why now?",
            Self::Review => "Review & submit",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Self::Intro => "Answer honestly. Your answers shape your coaching approach.",
            Self::Identity => "Name + email.",
            Self::Bodyweight => "kg (estimate is fine).",
            Self::Goal => "What's your primary goal?",
            Self::Experience => "Be accurate.",
            Self::Days => "How many days per week can you train?",
            Self::Obstacle => "What's been holding you back?",
            Self::Injuries => "Optional, but helpful.",
            Self::WhyNow => "Be honest, short is fine.",
            Self::Review => "Check everything before sending.",
        }
    }

    /// Whether the draft holds enough to leave this step.
    pub fn can_advance(&self, draft: &ApplicationDraft) -> bool {
        match self {
            Self::Identity => !draft.name.trim().is_empty() && !draft.email.trim().is_empty(),
            // Presence only; numeric check happens (loosely) at submit.
            Self::Bodyweight => !draft.body_weight_kg.trim().is_empty(),
            Self::Goal => draft.goal.is_some(),
            Self::Experience => draft.experience.is_some(),
            Self::Days => draft.days_per_week.is_some(),
            Self::Obstacle => draft.obstacle.is_some(),
            Self::Intro | Self::Injuries | Self::WhyNow | Self::Review => true,
        }
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Intro => "intro",
            Self::Identity => "identity",
            Self::Bodyweight => "bodyweight",
            Self::Goal => "goal",
            Self::Experience => "experience",
            Self::Days => "days",
            Self::Obstacle => "obstacle",
            Self::Injuries => "injuries",
            Self::WhyNow => "whyNow",
            Self::Review => "review",
        };
        write!(f, "{s}")
    }
}

/// Progress through the sequence as a whole percentage.
pub fn progress_pct(index: usize) -> u8 {
    let clamped = index.min(LAST_STEP);
    ((clamped as f64 / LAST_STEP as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::model::{DaysPerWeek, DraftUpdate, Experience, Goal, Obstacle};

    #[test]
    fn sequence_has_ten_steps_in_order() {
        assert_eq!(STEPS.len(), 10);
        assert_eq!(StepId::at(0), Some(StepId::Intro));
        assert_eq!(StepId::at(LAST_STEP), Some(StepId::Review));
        assert_eq!(StepId::at(10), None);
    }

    #[test]
    fn optional_steps_always_advance() {
        let empty = ApplicationDraft::default();
        for step in [StepId::Intro, StepId::Injuries, StepId::WhyNow, StepId::Review] {
            assert!(step.can_advance(&empty), "{step} should allow an empty draft");
        }
    }

    #[test]
    fn gated_steps_block_on_empty_draft() {
        let empty = ApplicationDraft::default();
        for step in [
            StepId::Identity,
            StepId::Bodyweight,
            StepId::Goal,
            StepId::Experience,
            StepId::Days,
            StepId::Obstacle,
        ] {
            assert!(!step.can_advance(&empty), "{step} should block an empty draft");
        }
    }

    #[test]
    fn identity_needs_both_fields_trimmed() {
        let mut d = ApplicationDraft::default();
        d.apply(DraftUpdate::Name("  Sam ".into()));
        assert!(!StepId::Identity.can_advance(&d));

        d.apply(DraftUpdate::Email("   ".into()));
        assert!(!StepId::Identity.can_advance(&d));

        d.apply(DraftUpdate::Email("sam@example.com".into()));
        assert!(StepId::Identity.can_advance(&d));

        d.apply(DraftUpdate::Name("\t".into()));
        assert!(!StepId::Identity.can_advance(&d));
    }

    #[test]
    fn bodyweight_checks_presence_not_number() {
        let mut d = ApplicationDraft::default();
        d.apply(DraftUpdate::BodyWeightKg(" ".into()));
        assert!(!StepId::Bodyweight.can_advance(&d));
        d.apply(DraftUpdate::BodyWeightKg("..".into()));
        assert!(StepId::Bodyweight.can_advance(&d));
    }

    #[test]
    fn choice_steps_open_once_set() {
        let mut d = ApplicationDraft::default();
        d.apply(DraftUpdate::Goal(Goal::Fatloss));
        d.apply(DraftUpdate::Experience(Experience::Beginner));
        d.apply(DraftUpdate::DaysPerWeek(DaysPerWeek::Three));
        d.apply(DraftUpdate::Obstacle(Obstacle::Mindset));
        for step in [StepId::Goal, StepId::Experience, StepId::Days, StepId::Obstacle] {
            assert!(step.can_advance(&d));
        }
    }

    #[test]
    fn display_matches_serde() {
        for step in STEPS {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{step}\""), json);
        }
    }

    #[test]
    fn free_text_step_copy() {
        assert_eq!(StepId::Injuries.title(), "Injuries / limitations");
        assert_eq!(StepId::Injuries.hint(), "Optional, but helpful.");
        assert_eq!(StepId::WhyNow.title(), "Why now?");
        assert_eq!(StepId::WhyNow.hint(), "Be honest, short is fine.");
    }

    #[test]
    fn progress_endpoints() {
        assert_eq!(progress_pct(0), 0);
        assert_eq!(progress_pct(1), 11);
        assert_eq!(progress_pct(LAST_STEP), 100);
        assert_eq!(progress_pct(42), 100);
    }
}
