//! Application draft and submission payload models.

use serde::{Serialize, Serializer};

/// Source tag stamped on every lead created through the apply endpoint.
pub const SOURCE_TAG: &str = "website-apply";

/// Primary training goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Build,
    Fatloss,
    Hybrid,
    Performance,
}

/// Training experience level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Experience {
    Beginner,
    Intermediate,
    Advanced,
}

/// Training days per week. Sent over the wire as text ("3", "4", "5").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DaysPerWeek {
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
}

/// Biggest thing holding the applicant back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Obstacle {
    Consistency,
    Nutrition,
    Structure,
    Mindset,
}

/// A single-choice answer with its display copy.
pub trait Choice: Copy + Sized + 'static {
    /// Every variant, in display order.
    const ALL: &'static [Self];

    /// Wire value.
    fn key(&self) -> &'static str;
    fn label(&self) -> &'static str;
    fn blurb(&self) -> &'static str;

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.key() == key)
    }
}

impl Choice for Goal {
    const ALL: &'static [Self] = &[Self::Build, Self::Fatloss, Self::Hybrid, Self::Performance];

    fn key(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Fatloss => "fatloss",
            Self::Hybrid => "hybrid",
            Self::Performance => "performance",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Build => "Build muscle",
            Self::Fatloss => "Fat loss",
            Self::Hybrid => "Hybrid athlete",
            Self::Performance => "Performance",
        }
    }

    fn blurb(&self) -> &'static str {
        match self {
            Self::Build => "Hypertrophy, strength, structure.",
            Self::Fatloss => "Done properly, sustainably.",
            Self::Hybrid => "Strength + conditioning.",
            Self::Performance => "Train for events and outcomes.",
        }
    }
}

impl Choice for Experience {
    const ALL: &'static [Self] = &[Self::Beginner, Self::Intermediate, Self::Advanced];

    fn key(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    fn blurb(&self) -> &'static str {
        match self {
            Self::Beginner => "New or inconsistent training history.",
            Self::Intermediate => "Training regularly with some structure.",
            Self::Advanced => "Years trained, want sharper progression.",
        }
    }
}

impl Choice for DaysPerWeek {
    const ALL: &'static [Self] = &[Self::Three, Self::Four, Self::Five];

    fn key(&self) -> &'static str {
        match self {
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Three => "3 days/week",
            Self::Four => "4 days/week",
            Self::Five => "5 days/week",
        }
    }

    fn blurb(&self) -> &'static str {
        match self {
            Self::Three => "Minimum effective standard.",
            Self::Four => "Strong baseline for progress.",
            Self::Five => "High output. Requires recovery.",
        }
    }
}

impl Choice for Obstacle {
    const ALL: &'static [Self] = &[
        Self::Consistency,
        Self::Nutrition,
        Self::Structure,
        Self::Mindset,
    ];

    fn key(&self) -> &'static str {
        match self {
            Self::Consistency => "consistency",
            Self::Nutrition => "nutrition",
            Self::Structure => "structure",
            Self::Mindset => "mindset",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Consistency => "Consistency",
            Self::Nutrition => "Nutrition",
            Self::Structure => "Structure",
            Self::Mindset => "Mindset",
        }
    }

    fn blurb(&self) -> &'static str {
        match self {
            Self::Consistency => "Start strong, fade out.",
            Self::Nutrition => "Can't stick to intake long-term.",
            Self::Structure => "No clear plan, no progression.",
            Self::Mindset => "Self-sabotage, excuses, confidence.",
        }
    }
}

/// Unset choices go over the wire as an empty string, like an untouched form.
fn choice_or_empty<C: Choice, S: Serializer>(
    value: &Option<C>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.map(|c| c.key()).unwrap_or(""))
}

/// The in-progress answers for one wizard session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDraft {
    pub name: String,
    pub email: String,
    /// Kept as typed text until submission.
    pub body_weight_kg: String,
    #[serde(serialize_with = "choice_or_empty")]
    pub goal: Option<Goal>,
    #[serde(serialize_with = "choice_or_empty")]
    pub experience: Option<Experience>,
    #[serde(serialize_with = "choice_or_empty")]
    pub days_per_week: Option<DaysPerWeek>,
    #[serde(serialize_with = "choice_or_empty")]
    pub obstacle: Option<Obstacle>,
    pub injuries: String,
    pub why_now: String,
}

/// A single-field change to the draft.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftUpdate {
    Name(String),
    Email(String),
    BodyWeightKg(String),
    Goal(Goal),
    Experience(Experience),
    DaysPerWeek(DaysPerWeek),
    Obstacle(Obstacle),
    Injuries(String),
    WhyNow(String),
}

impl ApplicationDraft {
    /// Apply one field change. No validation.
    pub fn apply(&mut self, update: DraftUpdate) {
        match update {
            DraftUpdate::Name(v) => self.name = v,
            DraftUpdate::Email(v) => self.email = v,
            DraftUpdate::BodyWeightKg(v) => self.body_weight_kg = v,
            DraftUpdate::Goal(v) => self.goal = Some(v),
            DraftUpdate::Experience(v) => self.experience = Some(v),
            DraftUpdate::DaysPerWeek(v) => self.days_per_week = Some(v),
            DraftUpdate::Obstacle(v) => self.obstacle = Some(v),
            DraftUpdate::Injuries(v) => self.injuries = v,
            DraftUpdate::WhyNow(v) => self.why_now = v,
        }
    }

    /// Build the payload sent to the endpoint, coercing the weight to a number.
    pub fn to_payload(&self) -> SubmissionPayload {
        SubmissionPayload {
            draft: self.clone(),
            body_weight_kg: coerce_weight(&self.body_weight_kg),
        }
    }

    /// Label/value rows for the review step.
    pub fn review_rows(&self) -> Vec<(&'static str, String)> {
        fn or_dash(s: &str) -> String {
            if s.is_empty() { "—".to_string() } else { s.to_string() }
        }
        fn key<C: Choice>(c: Option<C>) -> String {
            c.map(|c| c.key().to_string()).unwrap_or_default()
        }

        vec![
            ("Name", self.name.clone()),
            ("Email", self.email.clone()),
            ("Body weight (kg)", self.body_weight_kg.clone()),
            ("Goal", key(self.goal)),
            ("Experience", key(self.experience)),
            ("Days/week", key(self.days_per_week)),
            ("Obstacle", key(self.obstacle)),
            ("Injuries", or_dash(&self.injuries)),
            ("Why now", or_dash(&self.why_now)),
        ]
    }
}

/// Text-to-number coercion for the weight field.
///
/// Non-numeric or blank text yields NaN rather than an error.
pub fn coerce_weight(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Input filter for the weight field: keeps digits and dots only.
pub fn filter_weight_input(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// The draft as sent to the submission endpoint.
///
/// Serializes as the draft's fields with `bodyWeightKg` replaced by the
/// coerced number. NaN serializes as JSON `null`.
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    draft: ApplicationDraft,
    pub body_weight_kg: f64,
}

impl SubmissionPayload {
    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }
}

impl Serialize for SubmissionPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let value = serde_json::to_value(&self.draft)
            .map_err(<S::Error as serde::ser::Error>::custom)?;
        let fields = value.as_object().cloned().unwrap_or_default();
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (key, value) in &fields {
            if key == "bodyWeightKg" {
                map.serialize_entry(key, &serde_json::Value::from(self.body_weight_kg))?;
            } else {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}
