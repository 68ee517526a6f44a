use crate::error::QuizError;
use crate::models::{Answers, Question, Submission, OPTION_COUNT};

/// Percentage of correct answers, rounded half up.
pub fn score(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((200 * correct + total) / (2 * total)) as u32
}

/// One pass over an ordered set of questions.
///
/// A quiz becomes read-only once submitted: `score` doubles as the
/// submitted flag, so a score exists exactly when the quiz was submitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Quiz {
    questions: Vec<Question>,
    answers: Answers,
    current_index: usize,
    score: Option<u32>,
}

impl Quiz {
    pub fn new(questions: Vec<Question>) -> Self {
        let answers = questions.iter().map(|q| (q.id, None)).collect();
        Self {
            questions,
            answers,
            current_index: 0,
            score: None,
        }
    }

    /// Rebuilds a quiz from stored fields, repairing anything that no
    /// longer lines up with the question list.
    pub fn restore(
        questions: Vec<Question>,
        answers: Option<Answers>,
        score: Option<u32>,
        current_index: Option<usize>,
    ) -> Self {
        let mut quiz = Self::new(questions);
        if let Some(saved) = answers {
            for (id, answer) in saved {
                if let Some(slot) = quiz.answers.get_mut(&id) {
                    *slot = answer.filter(|&a| a < OPTION_COUNT);
                }
            }
        }
        quiz.current_index = current_index
            .unwrap_or(0)
            .min(quiz.questions.len().saturating_sub(1));
        quiz.score = score.filter(|s| *s <= 100 && !quiz.questions.is_empty());
        quiz
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn answer_for(&self, question_id: i64) -> Option<usize> {
        self.answers.get(&question_id).copied().flatten()
    }

    pub fn score(&self) -> Option<u32> {
        self.score
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn is_loading(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn is_submitted(&self) -> bool {
        self.score.is_some()
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.values().filter(|a| a.is_some()).count()
    }

    pub fn remaining(&self) -> usize {
        self.questions.len() - self.answered_count()
    }

    pub fn all_answered(&self) -> bool {
        !self.questions.is_empty() && self.remaining() == 0
    }

    pub fn correct_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.is_correct(self.answer_for(q.id)))
            .count()
    }

    /// Records a selection. Returns false when nothing changed.
    pub fn select_answer(&mut self, question_id: i64, option: usize) -> bool {
        if self.is_submitted() || option >= OPTION_COUNT {
            return false;
        }
        match self.answers.get_mut(&question_id) {
            Some(slot) => {
                *slot = Some(option);
                true
            }
            None => false,
        }
    }

    pub fn go_next(&mut self) -> bool {
        if self.is_submitted() || self.is_last() {
            return false;
        }
        self.current_index += 1;
        true
    }

    pub fn go_previous(&mut self) -> bool {
        if self.is_submitted() || self.current_index == 0 {
            return false;
        }
        self.current_index -= 1;
        true
    }

    pub fn jump_to(&mut self, index: usize) -> bool {
        if self.is_submitted() || index >= self.questions.len() || index == self.current_index {
            return false;
        }
        self.current_index = index;
        true
    }

    /// Scores the quiz once every question has an answer.
    ///
    /// A second call returns `AlreadySubmitted` and leaves the score alone,
    /// so the submission is reported to the caller exactly once.
    pub fn submit(&mut self) -> Result<Submission, QuizError> {
        if self.is_submitted() {
            return Err(QuizError::AlreadySubmitted);
        }
        if self.is_loading() {
            return Err(QuizError::NoQuestions);
        }
        let remaining = self.remaining();
        if remaining > 0 {
            return Err(QuizError::Unanswered { remaining });
        }

        let score = score(self.correct_count(), self.questions.len());
        self.score = Some(score);
        Ok(Submission {
            score,
            answers: self.answers.clone(),
        })
    }
}
