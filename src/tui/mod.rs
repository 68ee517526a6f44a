mod ui;
mod widgets;

use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use crate::admin::AdminEditor;
use crate::error::Error;
use crate::media::{MediaEvent, MediaGate, VIDEO_DURATION_SECS};
use crate::models::{Step, UserRole};
use crate::session::SessionController;

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Role,
    Username,
    Password,
}

impl LoginField {
    fn next(self) -> Self {
        match self {
            LoginField::Role => LoginField::Username,
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Role,
        }
    }

    fn prev(self) -> Self {
        match self {
            LoginField::Role => LoginField::Password,
            LoginField::Username => LoginField::Role,
            LoginField::Password => LoginField::Username,
        }
    }
}

pub struct LoginForm {
    pub role: UserRole,
    pub username: String,
    pub password: String,
    pub field: LoginField,
}

impl LoginForm {
    fn new(role: UserRole, username: &str) -> Self {
        Self {
            role,
            username: username.to_string(),
            password: String::new(),
            field: LoginField::Username,
        }
    }

    fn focused_mut(&mut self) -> Option<&mut String> {
        match self.field {
            LoginField::Role => None,
            LoginField::Username => Some(&mut self.username),
            LoginField::Password => Some(&mut self.password),
        }
    }
}

pub struct App {
    pub controller: SessionController,
    pub login: LoginForm,
    pub admin: AdminEditor,
    pub gate: MediaGate,
    pub message: Option<String>,
    pub should_quit: bool,
    shown_step: Step,
}

impl App {
    pub fn new(controller: SessionController) -> Self {
        let session = controller.session();
        let login = LoginForm::new(session.role, &session.username);
        let gate = gate_for(session.video_completed);
        let shown_step = session.step;
        Self {
            controller,
            login,
            admin: AdminEditor::default(),
            gate,
            message: None,
            should_quit: false,
            shown_step,
        }
    }

    pub fn step(&self) -> Step {
        self.controller.step()
    }

    /// Whether keystrokes currently go into a text field.
    pub fn is_typing(&self) -> bool {
        match self.step() {
            Step::Login => self.login.field != LoginField::Role,
            Step::Admin => self.admin.is_editing(),
            _ => false,
        }
    }

    /// Resets per-view state after the controller changed step.
    fn sync_view(&mut self) {
        let step = self.step();
        if step == self.shown_step {
            return;
        }
        let session = self.controller.session();
        match step {
            Step::Login => {
                self.login = LoginForm::new(session.role, &session.username);
                self.admin = AdminEditor::default();
            }
            Step::Video => self.gate = gate_for(session.video_completed),
            _ => {}
        }
        self.shown_step = step;
    }

    fn on_tick(&mut self, elapsed: Duration) {
        if self.step() != Step::Video {
            return;
        }
        if let Some(MediaEvent::Completed) = self.gate.advance(elapsed.as_secs_f64()) {
            info!("video watched to the limit");
            self.controller.complete_video();
            self.sync_view();
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('c') => self.should_quit = true,
                KeyCode::Char('l') if self.controller.session().is_logged_in() => {
                    self.controller.logout();
                    self.message = None;
                }
                KeyCode::Char('r') => {
                    self.controller.reset();
                    self.message = None;
                }
                _ => {}
            }
            self.sync_view();
            return;
        }

        if key == KeyCode::Char('q') && !self.is_typing() {
            self.should_quit = true;
            return;
        }

        match self.step() {
            Step::Login => self.handle_login_key(key),
            Step::Admin => self.handle_admin_key(key),
            Step::PreTest | Step::PostTest => self.handle_quiz_key(key),
            Step::PreTestResults => {
                if key == KeyCode::Enter {
                    self.controller.proceed_to_video();
                }
            }
            Step::Video => match key {
                KeyCode::Char(' ') => {
                    self.gate.toggle_play_pause();
                }
                KeyCode::Enter => {
                    self.controller.proceed_to_post_test();
                }
                _ => {}
            },
            Step::Results => {
                if matches!(key, KeyCode::Char('r') | KeyCode::Enter) {
                    self.controller.reset();
                }
            }
        }
        self.sync_view();
    }

    fn handle_login_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Tab | KeyCode::Down => self.login.field = self.login.field.next(),
            KeyCode::BackTab | KeyCode::Up => self.login.field = self.login.field.prev(),
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
                if self.login.field == LoginField::Role =>
            {
                self.login.role = self.login.role.toggle();
                self.message = None;
            }
            KeyCode::Enter => {
                let form = &self.login;
                match self
                    .controller
                    .login(form.role, &form.username, &form.password)
                {
                    Ok(_) => self.message = None,
                    Err(e) => self.message = Some(e.to_string()),
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.login.focused_mut() {
                    field.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.login.focused_mut() {
                    field.push(c);
                }
            }
            _ => {}
        }
    }

    fn handle_admin_key(&mut self, key: KeyCode) {
        let pool_len = self.controller.session().question_pool.len();

        if self.admin.is_editing() {
            let result = match key {
                KeyCode::Esc => {
                    self.admin.cancel();
                    Ok(())
                }
                KeyCode::Enter => self.admin.save(&mut self.controller).map(|_| ()),
                KeyCode::Tab | KeyCode::Down => {
                    self.admin.focus_next();
                    Ok(())
                }
                KeyCode::BackTab | KeyCode::Up => {
                    self.admin.focus_previous();
                    Ok(())
                }
                KeyCode::F(n @ 1..=4) => self.admin.set_correct(usize::from(n) - 1),
                KeyCode::Backspace => {
                    self.admin.backspace();
                    Ok(())
                }
                KeyCode::Char(c) => {
                    self.admin.input(c);
                    Ok(())
                }
                _ => Ok(()),
            };
            self.message = result.err().map(|e| e.to_string());
            return;
        }

        match key {
            KeyCode::Char('j') | KeyCode::Down => self.admin.select_next(pool_len),
            KeyCode::Char('k') | KeyCode::Up => self.admin.select_previous(pool_len),
            KeyCode::Char('g') => self.admin.selected = 0,
            KeyCode::Char('G') => self.admin.selected = pool_len.saturating_sub(1),
            KeyCode::Enter | KeyCode::Char('e') => {
                let pool = &self.controller.session().question_pool;
                self.message = self
                    .admin
                    .begin_edit_selected(pool)
                    .err()
                    .map(|e| e.to_string());
            }
            _ => {}
        }
    }

    fn handle_quiz_key(&mut self, key: KeyCode) {
        let Some(current) = self
            .controller
            .session()
            .active_quiz()
            .and_then(|quiz| quiz.current_question().map(|q| q.id))
        else {
            return;
        };

        match key {
            KeyCode::Char(c @ '1'..='4') => {
                let option = c as usize - '1' as usize;
                self.controller.select_answer(current, option);
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.controller.previous_question();
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.controller.next_question();
            }
            KeyCode::Char('g') => {
                self.controller.jump_to(0);
            }
            KeyCode::Char('G') => {
                let last = self
                    .controller
                    .session()
                    .active_quiz()
                    .map(|q| q.questions().len().saturating_sub(1))
                    .unwrap_or(0);
                self.controller.jump_to(last);
            }
            KeyCode::Enter | KeyCode::Char('s') => {
                let on_last = self
                    .controller
                    .session()
                    .active_quiz()
                    .is_some_and(|q| q.is_last());
                if key == KeyCode::Enter && !on_last {
                    self.controller.next_question();
                    return;
                }
                self.message = self.controller.submit_quiz().err().map(|e| e.to_string());
            }
            _ => {}
        }
    }
}

fn gate_for(video_completed: bool) -> MediaGate {
    if video_completed {
        return MediaGate::already_completed();
    }
    let mut gate = MediaGate::default();
    gate.load_metadata(VIDEO_DURATION_SECS);
    gate
}

pub fn run(controller: SessionController) -> Result<(), Error> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(controller);

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Error> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key.code, key.modifiers);
            }
        }

        app.on_tick(last_tick.elapsed());
        last_tick = Instant::now();

        if app.should_quit {
            return Ok(());
        }
    }
}
