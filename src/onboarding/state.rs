//! Interview state machine: which step the onboarding conversation is in.

use serde::{Deserialize, Serialize};

/// A field collected by the interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    LastName,
    Age,
    Disability,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Self::FirstName,
        Self::LastName,
        Self::Age,
        Self::Disability,
    ];

    /// The step that asks for this field.
    pub fn ask_step(&self) -> InterviewStep {
        match self {
            Self::FirstName => InterviewStep::FirstName,
            Self::LastName => InterviewStep::LastName,
            Self::Age => InterviewStep::Age,
            Self::Disability => InterviewStep::Disability,
        }
    }

    /// The step that confirms this field.
    pub fn confirm_step(&self) -> InterviewStep {
        match self {
            Self::FirstName => InterviewStep::FirstNameConfirm,
            Self::LastName => InterviewStep::LastNameConfirm,
            Self::Age => InterviewStep::AgeConfirm,
            Self::Disability => InterviewStep::DisabilityConfirm,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Age => "age",
            Self::Disability => "disability",
        };
        write!(f, "{s}")
    }
}

/// The steps of the onboarding interview.
///
/// Progresses linearly: Greeting → FirstName → FirstNameConfirm → LastName →
/// … → DisabilityConfirm → Photo → Complete. Each confirm step may also loop
/// back to the step that asked for its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStep {
    Greeting,
    FirstName,
    FirstNameConfirm,
    LastName,
    LastNameConfirm,
    Age,
    AgeConfirm,
    Disability,
    DisabilityConfirm,
    Photo,
    Complete,
}

impl InterviewStep {
    pub const ALL: [InterviewStep; 11] = [
        Self::Greeting,
        Self::FirstName,
        Self::FirstNameConfirm,
        Self::LastName,
        Self::LastNameConfirm,
        Self::Age,
        Self::AgeConfirm,
        Self::Disability,
        Self::DisabilityConfirm,
        Self::Photo,
        Self::Complete,
    ];

    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: InterviewStep) -> bool {
        if self.next() == Some(target) {
            return true;
        }
        // Rejection loops a confirm step back to its question.
        self.is_confirmation() && self.field().map(|f| f.ask_step()) == Some(target)
    }

    /// Whether this step is terminal (interview is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Whether this step waits for a yes/no answer.
    pub fn is_confirmation(&self) -> bool {
        matches!(
            self,
            Self::FirstNameConfirm
                | Self::LastNameConfirm
                | Self::AgeConfirm
                | Self::DisabilityConfirm
        )
    }

    /// The field this step asks for or confirms.
    pub fn field(&self) -> Option<Field> {
        use InterviewStep::*;
        match self {
            FirstName | FirstNameConfirm => Some(Field::FirstName),
            LastName | LastNameConfirm => Some(Field::LastName),
            Age | AgeConfirm => Some(Field::Age),
            Disability | DisabilityConfirm => Some(Field::Disability),
            Greeting | Photo | Complete => None,
        }
    }

    /// The next step on the affirmative path, if any.
    pub fn next(&self) -> Option<InterviewStep> {
        use InterviewStep::*;
        match self {
            Greeting => Some(FirstName),
            FirstName => Some(FirstNameConfirm),
            FirstNameConfirm => Some(LastName),
            LastName => Some(LastNameConfirm),
            LastNameConfirm => Some(Age),
            Age => Some(AgeConfirm),
            AgeConfirm => Some(Disability),
            Disability => Some(DisabilityConfirm),
            DisabilityConfirm => Some(Photo),
            Photo => Some(Complete),
            Complete => None,
        }
    }
}

impl Default for InterviewStep {
    fn default() -> Self {
        Self::Greeting
    }
}

impl std::fmt::Display for InterviewStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Greeting => "greeting",
            Self::FirstName => "first_name",
            Self::FirstNameConfirm => "first_name_confirm",
            Self::LastName => "last_name",
            Self::LastNameConfirm => "last_name_confirm",
            Self::Age => "age",
            Self::AgeConfirm => "age_confirm",
            Self::Disability => "disability",
            Self::DisabilityConfirm => "disability_confirm",
            Self::Photo => "photo",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_forward_transitions() {
        for pair in InterviewStep::ALL.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            assert!(
                from.can_transition_to(to),
                "{from} should transition to {to}"
            );
        }
    }

    #[test]
    fn confirm_steps_loop_back() {
        use InterviewStep::*;
        assert!(FirstNameConfirm.can_transition_to(FirstName));
        assert!(LastNameConfirm.can_transition_to(LastName));
        assert!(AgeConfirm.can_transition_to(Age));
        assert!(DisabilityConfirm.can_transition_to(Disability));
    }

    #[test]
    fn invalid_transitions() {
        use InterviewStep::*;
        // Skip steps
        assert!(!Greeting.can_transition_to(LastName));
        assert!(!FirstName.can_transition_to(LastName));
        // Backward from a question step
        assert!(!LastName.can_transition_to(FirstName));
        // Confirm cannot loop to a different field
        assert!(!AgeConfirm.can_transition_to(FirstName));
        // Terminal
        assert!(!Complete.can_transition_to(Greeting));
        // Self-transition
        assert!(!Age.can_transition_to(Age));
    }

    #[test]
    fn is_terminal() {
        use InterviewStep::*;
        assert!(Complete.is_terminal());
        assert!(!Greeting.is_terminal());
        assert!(!Photo.is_terminal());
    }

    #[test]
    fn confirmation_steps_always_advance() {
        for step in InterviewStep::ALL.iter().filter(|s| s.is_confirmation()) {
            let next = step.next().expect("confirmation has a next step");
            assert!(step.can_transition_to(next), "{step} -> {next}");
        }
    }

    #[test]
    fn next_walks_all_steps() {
        let mut current = InterviewStep::default();
        for expected in &InterviewStep::ALL[1..] {
            let next = current.next().unwrap();
            assert_eq!(next, *expected);
            current = next;
        }
        assert!(current.next().is_none());
    }

    #[test]
    fn fields_map_to_their_steps() {
        for field in Field::ALL {
            assert_eq!(field.ask_step().field(), Some(field));
            assert_eq!(field.confirm_step().field(), Some(field));
            assert!(field.confirm_step().is_confirmation());
            assert!(!field.ask_step().is_confirmation());
        }
    }

    #[test]
    fn display_matches_serde() {
        for step in InterviewStep::ALL {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(json, format!("\"{step}\""), "mismatch for {step:?}");
        }
        for field in Field::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{field}\""), "mismatch for {field:?}");
        }
    }
}
