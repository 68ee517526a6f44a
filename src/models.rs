use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const OPTION_COUNT: usize = 4;

/// Question id to selected option index, `None` while unanswered.
pub type Answers = BTreeMap<i64, Option<usize>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub options: [String; OPTION_COUNT],
    pub correct_answer: usize,
}

impl Question {
    pub fn new(id: i64, text: &str, options: [&str; OPTION_COUNT], correct_answer: usize) -> Self {
        Self {
            id,
            text: text.to_string(),
            options: options.map(String::from),
            correct_answer,
        }
    }

    pub fn is_correct(&self, answer: Option<usize>) -> bool {
        answer == Some(self.correct_answer)
    }

    pub fn correct_option(&self) -> &str {
        self.options
            .get(self.correct_answer)
            .map(String::as_str)
            .unwrap_or("")
    }
}

// Steps of the guided flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Login,
    Admin,
    PreTest,
    PreTestResults,
    Video,
    PostTest,
    Results,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Login => "login",
            Step::Admin => "admin",
            Step::PreTest => "pre_test",
            Step::PreTestResults => "pre_test_results",
            Step::Video => "video",
            Step::PostTest => "post_test",
            Step::Results => "results",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Step::Login => "Login",
            Step::Admin => "Admin",
            Step::PreTest => "Pre-Test",
            Step::PreTestResults => "Pre-Test Results",
            Step::Video => "Video",
            Step::PostTest => "Post-Test",
            Step::Results => "Final Results",
        }
    }

    /// Position in the learner's progress indicator. Login and admin are outside it.
    pub fn phase(&self) -> Option<usize> {
        match self {
            Step::Login | Step::Admin => None,
            Step::PreTest => Some(0),
            Step::PreTestResults => Some(1),
            Step::Video => Some(2),
            Step::PostTest => Some(3),
            Step::Results => Some(4),
        }
    }
}

pub const PHASES: [Step; 5] = [
    Step::PreTest,
    Step::PreTestResults,
    Step::Video,
    Step::PostTest,
    Step::Results,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseState {
    Pending,
    Active,
    Completed,
}

pub fn phase_state(current: Step, phase: Step) -> PhaseState {
    match (current.phase(), phase.phase()) {
        (Some(c), Some(p)) if c == p => PhaseState::Active,
        (Some(c), Some(p)) if c > p => PhaseState::Completed,
        _ => PhaseState::Pending,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserRole::User => "User",
            UserRole::Admin => "Admin",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            UserRole::User => UserRole::Admin,
            UserRole::Admin => UserRole::User,
        }
    }
}

/// What a quiz reports to the controller when it is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub score: u32,
    pub answers: Answers,
}

// Post-test score relative to the pre-test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreChange {
    Improved(u32),
    Declined(u32),
    Unchanged,
    Pending,
}

impl ScoreChange {
    pub fn between(pre: Option<u32>, post: Option<u32>) -> Self {
        match (pre, post) {
            (Some(pre), Some(post)) if post > pre => ScoreChange::Improved(post - pre),
            (Some(pre), Some(post)) if post < pre => ScoreChange::Declined(pre - post),
            (Some(_), Some(_)) => ScoreChange::Unchanged,
            _ => ScoreChange::Pending,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ScoreChange::Improved(delta) => format!(
                "Great improvement! You scored {}% higher in the post-test!",
                delta
            ),
            ScoreChange::Declined(delta) => format!(
                "Your score decreased by {}%. Consider reviewing the material again.",
                delta
            ),
            ScoreChange::Unchanged => "Your score remained the same. Keep practicing!".to_string(),
            ScoreChange::Pending => "Results are being calculated...".to_string(),
        }
    }
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
