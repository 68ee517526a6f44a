use crate::error::AdminError;
use crate::models::{Question, OPTION_COUNT};
use crate::questions;
use crate::session::SessionController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Text,
    Option(usize),
}

impl EditField {
    fn next(self) -> Self {
        match self {
            EditField::Text => EditField::Option(0),
            EditField::Option(i) if i + 1 < OPTION_COUNT => EditField::Option(i + 1),
            EditField::Option(_) => EditField::Text,
        }
    }

    fn prev(self) -> Self {
        match self {
            EditField::Text => EditField::Option(OPTION_COUNT - 1),
            EditField::Option(0) => EditField::Text,
            EditField::Option(i) => EditField::Option(i - 1),
        }
    }
}

/// Working copy of the question being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    pub id: i64,
    pub text: String,
    pub options: [String; OPTION_COUNT],
    pub correct_answer: usize,
    pub field: EditField,
}

impl EditBuffer {
    fn from_question(q: &Question) -> Self {
        Self {
            id: q.id,
            text: q.text.clone(),
            options: q.options.clone(),
            correct_answer: q.correct_answer,
            field: EditField::Text,
        }
    }

    fn to_question(&self) -> Question {
        Question {
            id: self.id,
            text: self.text.clone(),
            options: self.options.clone(),
            correct_answer: self.correct_answer,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.field {
            EditField::Text => &mut self.text,
            EditField::Option(i) => &mut self.options[i],
        }
    }
}

/// Question list cursor plus an optional edit buffer.
#[derive(Debug, Clone, Default)]
pub struct AdminEditor {
    pub selected: usize,
    buffer: Option<EditBuffer>,
}

impl AdminEditor {
    pub fn buffer(&self) -> Option<&EditBuffer> {
        self.buffer.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn select_next(&mut self, pool_len: usize) {
        if pool_len > 0 {
            self.selected = (self.selected + 1) % pool_len;
        }
    }

    pub fn select_previous(&mut self, pool_len: usize) {
        if pool_len > 0 {
            self.selected = (self.selected + pool_len - 1) % pool_len;
        }
    }

    /// Seeds the buffer from the question's current fields.
    pub fn begin_edit(&mut self, pool: &[Question], id: i64) -> Result<(), AdminError> {
        let question = questions::find(pool, id).ok_or(AdminError::UnknownQuestion(id))?;
        self.buffer = Some(EditBuffer::from_question(question));
        Ok(())
    }

    /// Starts editing whatever the list cursor is on.
    pub fn begin_edit_selected(&mut self, pool: &[Question]) -> Result<(), AdminError> {
        let id = pool
            .get(self.selected)
            .map(|q| q.id)
            .ok_or(AdminError::NoQuestionSelected)?;
        self.begin_edit(pool, id)
    }

    pub fn cancel(&mut self) {
        self.buffer = None;
    }

    pub fn focus_next(&mut self) {
        if let Some(buf) = &mut self.buffer {
            buf.field = buf.field.next();
        }
    }

    pub fn focus_previous(&mut self) {
        if let Some(buf) = &mut self.buffer {
            buf.field = buf.field.prev();
        }
    }

    pub fn input(&mut self, c: char) {
        if let Some(buf) = &mut self.buffer {
            buf.focused_mut().push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(buf) = &mut self.buffer {
            buf.focused_mut().pop();
        }
    }

    pub fn set_correct(&mut self, index: usize) -> Result<(), AdminError> {
        let buf = self.buffer.as_mut().ok_or(AdminError::NoQuestionSelected)?;
        if index >= OPTION_COUNT {
            return Err(AdminError::CorrectIndexOutOfRange(index));
        }
        buf.correct_answer = index;
        Ok(())
    }

    /// Commits the buffer to the shared pool. The buffer is kept if the
    /// controller refuses the edit.
    pub fn save(&mut self, controller: &mut SessionController) -> Result<Question, AdminError> {
        let question = self
            .buffer
            .as_ref()
            .map(EditBuffer::to_question)
            .ok_or(AdminError::NoQuestionSelected)?;
        controller.update_question(question.clone())?;
        self.buffer = None;
        Ok(question)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::db::Database;
    use crate::models::UserRole;

    fn admin_controller() -> SessionController {
        let db = Database::open(":memory:").expect("Failed to create in-memory database");
        db.init().expect("Failed to initialize database");
        let mut c = SessionController::with_rng(db, StdRng::seed_from_u64(8));
        c.login(UserRole::Admin, "admin", "admin123").unwrap();
        c
    }

    #[test]
    fn begin_edit_seeds_buffer() {
        let pool = questions::default_pool();
        let mut editor = AdminEditor::default();
        editor.begin_edit(&pool, 3).unwrap();
        let buf = editor.buffer().unwrap();
        assert_eq!(buf.text, "What is 2 + 2?");
        assert_eq!(buf.correct_answer, 1);
        assert_eq!(buf.field, EditField::Text);
    }

    #[test]
    fn begin_edit_unknown_id() {
        let mut editor = AdminEditor::default();
        assert_eq!(
            editor.begin_edit(&questions::default_pool(), 99),
            Err(AdminError::UnknownQuestion(99))
        );
        assert!(!editor.is_editing());
    }

    #[test]
    fn cursor_wraps_around() {
        let mut editor = AdminEditor::default();
        editor.select_previous(12);
        assert_eq!(editor.selected, 11);
        editor.select_next(12);
        assert_eq!(editor.selected, 0);
        editor.select_next(0);
        assert_eq!(editor.selected, 0);
    }

    #[test]
    fn typing_edits_focused_field() {
        let pool = questions::default_pool();
        let mut editor = AdminEditor::default();
        editor.begin_edit(&pool, 3).unwrap();
        editor.backspace();
        editor.input('!');
        editor.focus_next();
        editor.focus_next();
        editor.input('0');
        let buf = editor.buffer().unwrap();
        assert_eq!(buf.text, "What is 2 + 2!");
        assert_eq!(buf.options[1], "40");
    }

    #[test]
    fn focus_cycles_through_all_fields() {
        let pool = questions::default_pool();
        let mut editor = AdminEditor::default();
        editor.begin_edit(&pool, 1).unwrap();
        editor.focus_previous();
        assert_eq!(editor.buffer().unwrap().field, EditField::Option(3));
        for _ in 0..OPTION_COUNT + 1 {
            editor.focus_next();
        }
        assert_eq!(editor.buffer().unwrap().field, EditField::Option(3));
    }

    #[test]
    fn set_correct_validates_range() {
        let pool = questions::default_pool();
        let mut editor = AdminEditor::default();
        assert_eq!(editor.set_correct(0), Err(AdminError::NoQuestionSelected));
        editor.begin_edit(&pool, 1).unwrap();
        assert_eq!(editor.set_correct(4), Err(AdminError::CorrectIndexOutOfRange(4)));
        editor.set_correct(0).unwrap();
        assert_eq!(editor.buffer().unwrap().correct_answer, 0);
    }

    #[test]
    fn cancel_discards_buffer() {
        let mut c = admin_controller();
        let before = c.session().question_pool.clone();
        let mut editor = AdminEditor::default();
        editor.begin_edit_selected(&before).unwrap();
        editor.input('?');
        editor.cancel();
        assert!(!editor.is_editing());
        assert_eq!(editor.save(&mut c), Err(AdminError::NoQuestionSelected));
        assert_eq!(c.session().question_pool, before);
    }

    #[test]
    fn save_commits_to_pool() {
        let mut c = admin_controller();
        let mut editor = AdminEditor::default();
        editor.selected = 1;
        editor.begin_edit_selected(&c.session().question_pool.clone()).unwrap();
        editor.input('?');
        editor.set_correct(3).unwrap();

        let saved = editor.save(&mut c).unwrap();

        assert!(!editor.is_editing());
        assert_eq!(saved.id, 2);
        assert_eq!(saved.text, "Which planet is known as the Red Planet??");
        assert_eq!(questions::find(&c.session().question_pool, 2), Some(&saved));
    }

    #[test]
    fn save_refused_keeps_buffer() {
        let mut c = admin_controller();
        let pool = c.session().question_pool.clone();
        c.logout();
        let mut editor = AdminEditor::default();
        editor.begin_edit(&pool, 1).unwrap();
        assert_eq!(editor.save(&mut c), Err(AdminError::NotAuthorized));
        assert!(editor.is_editing());
    }
}
