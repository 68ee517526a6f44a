use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::db::{Database, Key};
use crate::error::{AdminError, LoginError, QuizError};
use crate::models::{Question, Step, UserRole, OPTION_COUNT};
use crate::questions::{self, SAMPLE_SIZE};
use crate::quiz::Quiz;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Everything that survives a logout.
const POOL_KEYS: [Key; 1] = [Key::QuestionsPool];

const PRE_TEST_KEYS: [Key; 4] = [
    Key::PreTestQuestions,
    Key::PreTestAnswers,
    Key::PreTestScore,
    Key::PreTestCurrentQuestion,
];

const POST_TEST_KEYS: [Key; 4] = [
    Key::PostTestQuestions,
    Key::PostTestAnswers,
    Key::PostTestScore,
    Key::PostTestCurrentQuestion,
];

/// Events that move the flow between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    AdminLogin,
    UserLogin,
    QuizSubmitted,
    Acknowledge,
    VideoCompleted,
    Logout,
    Reset,
}

/// The step transition table. `None` means the trigger is not valid from `from`.
pub fn transition(from: Step, trigger: Trigger) -> Option<Step> {
    match (from, trigger) {
        (_, Trigger::Logout) | (_, Trigger::Reset) => Some(Step::Login),
        (Step::Login, Trigger::AdminLogin) => Some(Step::Admin),
        (Step::Login, Trigger::UserLogin) => Some(Step::PreTest),
        (Step::PreTest, Trigger::QuizSubmitted) => Some(Step::PreTestResults),
        (Step::PreTestResults, Trigger::Acknowledge) => Some(Step::Video),
        (Step::Video, Trigger::VideoCompleted) => Some(Step::PostTest),
        (Step::Video, Trigger::Acknowledge) => Some(Step::PostTest),
        (Step::PostTest, Trigger::QuizSubmitted) => Some(Step::Results),
        _ => None,
    }
}

/// Admin logins need the fixed pair (username is case-insensitive); any
/// non-empty pair is a valid user login. Returns the trimmed username.
pub fn check_credentials(
    role: UserRole,
    username: &str,
    password: &str,
) -> Result<String, LoginError> {
    let username = username.trim();
    if username.is_empty() || password.trim().is_empty() {
        return Err(LoginError::MissingCredentials);
    }
    if role == UserRole::Admin
        && (username.to_lowercase() != ADMIN_USERNAME || password != ADMIN_PASSWORD)
    {
        return Err(LoginError::InvalidAdminCredentials);
    }
    Ok(username.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub step: Step,
    pub role: UserRole,
    pub username: String,
    pub pre_test: Quiz,
    pub post_test: Quiz,
    pub video_completed: bool,
    pub question_pool: Vec<Question>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            step: Step::Login,
            role: UserRole::User,
            username: String::new(),
            pre_test: Quiz::default(),
            post_test: Quiz::default(),
            video_completed: false,
            question_pool: questions::default_pool(),
        }
    }
}

impl Session {
    fn load(db: &Database) -> Self {
        let mut session = Session::default();

        if let Some(pool) = db.load::<Vec<Question>>(Key::QuestionsPool) {
            session.question_pool = pool;
        }
        if let Some(role) = db.load(Key::UserType) {
            session.role = role;
        }
        if let Some(username) = db.load(Key::Username) {
            session.username = username;
        }
        if let Some(step) = db.load(Key::CurrentStep) {
            session.step = step;
        }
        if let Some(completed) = db.load(Key::VideoCompleted) {
            session.video_completed = completed;
        }

        session.pre_test = Quiz::restore(
            db.load(Key::PreTestQuestions).unwrap_or_default(),
            db.load(Key::PreTestAnswers),
            db.load(Key::PreTestScore),
            db.load(Key::PreTestCurrentQuestion),
        );
        session.post_test = Quiz::restore(
            db.load(Key::PostTestQuestions).unwrap_or_default(),
            db.load(Key::PostTestAnswers),
            db.load(Key::PostTestScore),
            db.load(Key::PostTestCurrentQuestion),
        );

        session
    }

    /// The step must belong to the stored role and identity.
    fn is_consistent(&self) -> bool {
        match self.step {
            Step::Login => true,
            Step::Admin => self.role == UserRole::Admin && !self.username.is_empty(),
            _ => self.role == UserRole::User && !self.username.is_empty(),
        }
    }

    /// The results step a scored quiz belongs on. Set when a submission was
    /// stored but the step change after it was not.
    fn settled_step(&self) -> Option<Step> {
        self.active_quiz()
            .filter(|quiz| quiz.is_submitted())
            .and_then(|_| transition(self.step, Trigger::QuizSubmitted))
    }

    pub fn active_quiz(&self) -> Option<&Quiz> {
        match self.step {
            Step::PreTest => Some(&self.pre_test),
            Step::PostTest => Some(&self.post_test),
            _ => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.step != Step::Login && !self.username.is_empty()
    }
}

/// Snapshot of the session for the `status` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub step: Step,
    pub role: UserRole,
    pub username: String,
    pub pre_test: QuizSummary,
    pub post_test: QuizSummary,
    pub video_completed: bool,
    pub pool_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizSummary {
    pub questions: usize,
    pub answered: usize,
    pub correct: usize,
    pub score: Option<u32>,
}

impl From<&Quiz> for QuizSummary {
    fn from(quiz: &Quiz) -> Self {
        Self {
            questions: quiz.questions().len(),
            answered: quiz.answered_count(),
            correct: if quiz.is_submitted() {
                quiz.correct_count()
            } else {
                0
            },
            score: quiz.score(),
        }
    }
}

/// Owns the session, drives the step sequence and writes every accepted
/// change back to the store.
pub struct SessionController {
    db: Database,
    session: Session,
    rng: StdRng,
}

impl SessionController {
    pub fn hydrate(db: Database) -> Self {
        Self::with_rng(db, StdRng::from_entropy())
    }

    pub fn with_rng(db: Database, rng: StdRng) -> Self {
        let mut session = Session::load(&db);
        if !session.is_consistent() {
            warn!(
                step = session.step.as_str(),
                role = session.role.as_str(),
                "stored step does not match stored identity, starting at login"
            );
            session.step = Step::Login;
        }
        let settled = session.settled_step();
        if let Some(step) = settled {
            warn!(
                from = session.step.as_str(),
                to = step.as_str(),
                "stored quiz is already scored, moving to its results"
            );
            session.step = step;
        }
        info!(
            step = session.step.as_str(),
            pool = session.question_pool.len(),
            "session hydrated"
        );

        let mut controller = Self { db, session, rng };
        if settled.is_some() {
            controller.persist(&[Key::CurrentStep]);
        }
        controller.ensure_sampled();
        controller
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn step(&self) -> Step {
        self.session.step
    }

    pub fn summary(&self) -> SessionSummary {
        let s = &self.session;
        SessionSummary {
            step: s.step,
            role: s.role,
            username: s.username.clone(),
            pre_test: QuizSummary::from(&s.pre_test),
            post_test: QuizSummary::from(&s.post_test),
            video_completed: s.video_completed,
            pool_size: s.question_pool.len(),
        }
    }

    #[cfg(test)]
    pub(crate) fn into_db(self) -> Database {
        self.db
    }

    pub fn login(
        &mut self,
        role: UserRole,
        username: &str,
        password: &str,
    ) -> Result<bool, LoginError> {
        let trigger = match role {
            UserRole::Admin => Trigger::AdminLogin,
            UserRole::User => Trigger::UserLogin,
        };
        if transition(self.session.step, trigger).is_none() {
            debug!(step = self.session.step.as_str(), "login ignored outside login step");
            return Ok(false);
        }

        let username = check_credentials(role, username, password)?;
        self.session.role = role;
        self.session.username = username;
        info!(username = %self.session.username, role = role.as_str(), "logged in");

        let mut changed = vec![Key::UserType, Key::Username];
        if role == UserRole::User {
            self.session.pre_test = Quiz::new(self.draw_questions());
            changed.extend(PRE_TEST_KEYS);
        }
        self.advance(trigger);
        changed.push(Key::CurrentStep);
        self.persist(&changed);
        Ok(true)
    }

    pub fn select_answer(&mut self, question_id: i64, option: usize) -> bool {
        let Some((quiz, keys)) = self.active_quiz_mut() else {
            return false;
        };
        let changed = quiz.select_answer(question_id, option);
        if changed {
            self.persist(&[keys[1]]);
        }
        changed
    }

    pub fn next_question(&mut self) -> bool {
        self.navigate(Quiz::go_next)
    }

    pub fn previous_question(&mut self) -> bool {
        self.navigate(Quiz::go_previous)
    }

    pub fn jump_to(&mut self, index: usize) -> bool {
        self.navigate(|quiz| quiz.jump_to(index))
    }

    fn navigate(&mut self, mut op: impl FnMut(&mut Quiz) -> bool) -> bool {
        let Some((quiz, keys)) = self.active_quiz_mut() else {
            return false;
        };
        let moved = op(quiz);
        if moved {
            self.persist(&[keys[3]]);
        }
        moved
    }

    /// Submits the active quiz and moves to its results step.
    pub fn submit_quiz(&mut self) -> Result<u32, QuizError> {
        let Some((quiz, keys)) = self.active_quiz_mut() else {
            return Err(QuizError::NoActiveQuiz);
        };
        let submission = quiz.submit()?;
        info!(score = submission.score, "quiz submitted");

        self.advance(Trigger::QuizSubmitted);
        self.persist(&[keys[1], keys[2], Key::CurrentStep]);
        Ok(submission.score)
    }

    pub fn proceed_to_video(&mut self) -> bool {
        if self.session.step != Step::PreTestResults {
            return false;
        }
        self.advance(Trigger::Acknowledge);
        self.persist(&[Key::CurrentStep]);
        true
    }

    /// Leaves the video step once the video has been watched.
    pub fn proceed_to_post_test(&mut self) -> bool {
        if self.session.step != Step::Video || !self.session.video_completed {
            return false;
        }
        self.advance(Trigger::Acknowledge);
        self.persist(&[Key::CurrentStep]);
        self.ensure_sampled();
        true
    }

    /// Called by the media gate when its completion event fires.
    pub fn complete_video(&mut self) -> bool {
        if self.session.step != Step::Video {
            debug!(step = self.session.step.as_str(), "video completion ignored");
            return false;
        }
        self.session.video_completed = true;
        self.advance(Trigger::VideoCompleted);
        self.persist(&[Key::VideoCompleted, Key::CurrentStep]);
        self.ensure_sampled();
        true
    }

    /// Replaces one question in the working pool. Quizzes already drawn keep
    /// their own copies.
    pub fn update_question(&mut self, updated: Question) -> Result<(), AdminError> {
        if self.session.step != Step::Admin || self.session.role != UserRole::Admin {
            return Err(AdminError::NotAuthorized);
        }
        if updated.correct_answer >= OPTION_COUNT {
            return Err(AdminError::CorrectIndexOutOfRange(updated.correct_answer));
        }
        if questions::find(&self.session.question_pool, updated.id).is_none() {
            return Err(AdminError::UnknownQuestion(updated.id));
        }

        info!(id = updated.id, "question updated");
        self.session.question_pool =
            questions::update_question(&self.session.question_pool, &updated);
        self.persist(&POOL_KEYS);
        Ok(())
    }

    /// Drops identity and quiz progress. The question pool, edits included, stays.
    pub fn logout(&mut self) {
        info!(username = %self.session.username, "logged out");
        self.advance(Trigger::Logout);
        let pool = std::mem::take(&mut self.session.question_pool);
        self.session = Session {
            question_pool: pool,
            ..Session::default()
        };

        let keys: Vec<Key> = Key::ALL
            .into_iter()
            .filter(|k| !POOL_KEYS.contains(k))
            .collect();
        self.clear(&keys);
    }

    /// Forgets everything, including question edits; the seed pool comes back.
    pub fn reset(&mut self) {
        info!("session reset");
        self.advance(Trigger::Reset);
        self.session = Session::default();
        self.clear(&Key::ALL);
    }

    fn advance(&mut self, trigger: Trigger) -> bool {
        let from = self.session.step;
        match transition(from, trigger) {
            Some(to) => {
                self.session.step = to;
                info!(from = from.as_str(), to = to.as_str(), ?trigger, "step changed");
                true
            }
            None => {
                debug!(step = from.as_str(), ?trigger, "trigger rejected");
                false
            }
        }
    }

    /// Draws quizzes that were deferred because the pool was empty. Each quiz
    /// is drawn at most once per session.
    fn ensure_sampled(&mut self) {
        let s = &self.session;
        let needs_pre = s.step == Step::PreTest && s.pre_test.is_loading();
        let needs_post = s.post_test.is_loading()
            && (s.step == Step::PostTest || (s.step == Step::Video && s.video_completed));

        if needs_pre && !self.session.question_pool.is_empty() {
            self.session.pre_test = Quiz::new(self.draw_questions());
            self.persist(&PRE_TEST_KEYS);
        }
        if needs_post && !self.session.question_pool.is_empty() {
            self.session.post_test = Quiz::new(self.draw_questions());
            self.persist(&POST_TEST_KEYS);
        }
    }

    fn draw_questions(&mut self) -> Vec<Question> {
        let drawn = questions::sample(&self.session.question_pool, SAMPLE_SIZE, &mut self.rng);
        if drawn.len() < SAMPLE_SIZE {
            warn!(
                drawn = drawn.len(),
                wanted = SAMPLE_SIZE,
                "question pool too small for a full quiz"
            );
        }
        drawn
    }

    fn active_quiz_mut(&mut self) -> Option<(&mut Quiz, &'static [Key; 4])> {
        match self.session.step {
            Step::PreTest => Some((&mut self.session.pre_test, &PRE_TEST_KEYS)),
            Step::PostTest => Some((&mut self.session.post_test, &POST_TEST_KEYS)),
            _ => None,
        }
    }

    fn persist(&self, keys: &[Key]) {
        for &key in keys {
            if let Err(e) = self.write(key) {
                error!(key = key.as_str(), error = %e, "failed to persist session field");
            }
        }
    }

    fn write(&self, key: Key) -> rusqlite::Result<()> {
        let s = &self.session;
        match key {
            Key::CurrentStep => self.db.save(key, &s.step),
            Key::UserType => self.db.save(key, &s.role),
            Key::Username => self.db.save(key, &s.username),
            Key::PreTestQuestions => self.db.save(key, s.pre_test.questions()),
            Key::PreTestAnswers => self.db.save(key, s.pre_test.answers()),
            Key::PreTestScore => self.write_score(key, s.pre_test.score()),
            Key::PreTestCurrentQuestion => self.db.save(key, &s.pre_test.current_index()),
            Key::VideoCompleted => self.db.save(key, &s.video_completed),
            Key::PostTestQuestions => self.db.save(key, s.post_test.questions()),
            Key::PostTestAnswers => self.db.save(key, s.post_test.answers()),
            Key::PostTestScore => self.write_score(key, s.post_test.score()),
            Key::PostTestCurrentQuestion => self.db.save(key, &s.post_test.current_index()),
            Key::QuestionsPool => self.db.save(key, &s.question_pool),
        }
    }

    fn write_score(&self, key: Key, score: Option<u32>) -> rusqlite::Result<()> {
        match score {
            Some(score) => self.db.save(key, &score),
            None => self.db.clear(&[key]),
        }
    }

    fn clear(&self, keys: &[Key]) {
        if let Err(e) = self.db.clear(keys) {
            error!(error = %e, "failed to clear stored session");
        }
    }
}
