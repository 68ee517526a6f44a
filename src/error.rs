use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("logging setup failed: {0}")]
    Logging(String),
}

/// Rejected login attempts. Session state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Username and password are required.")]
    MissingCredentials,

    #[error("Invalid admin credentials (hint: admin / admin123).")]
    InvalidAdminCredentials,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("no quiz is in progress")]
    NoActiveQuiz,

    #[error("Loading questions...")]
    NoQuestions,

    #[error("quiz already submitted")]
    AlreadySubmitted,

    #[error("Please answer all questions before submitting ({remaining} remaining)")]
    Unanswered { remaining: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    #[error("admin login required")]
    NotAuthorized,

    #[error("no question with id {0}")]
    UnknownQuestion(i64),

    #[error("no question is being edited")]
    NoQuestionSelected,

    #[error("correct answer index {0} is out of range")]
    CorrectIndexOutOfRange(usize),
}
