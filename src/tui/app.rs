//! Screen state machine.

use ratatui::Frame;
use tracing::{debug, error, info};

use super::keys;
use super::message::{Effect, Message, Screen};
use super::screens::{AuthScreen, Context, HomeScreen, View};

/// Owns every registered screen and decides which one sees each message.
#[derive(Debug)]
pub struct App {
    active: Screen,
    size: Option<(u16, u16)>,
    should_quit: bool,
    context: Context,
    auth: AuthScreen,
    home: HomeScreen,
}

impl App {
    /// Starts on the authentication screen.
    #[must_use]
    pub fn new(context: Context) -> Self {
        Self {
            active: Screen::Auth,
            size: None,
            should_quit: false,
            context,
            auth: AuthScreen::new(),
            home: HomeScreen::new(),
        }
    }

    /// Returns `true` for screens that have a model.
    #[must_use]
    pub fn is_registered(screen: Screen) -> bool {
        match screen {
            Screen::Auth | Screen::Home => true,
            Screen::Search
            | Screen::Detail
            | Screen::Download
            | Screen::Library
            | Screen::History => false,
        }
    }

    #[must_use]
    pub fn active(&self) -> Screen {
        self.active
    }

    /// Last terminal size seen, if any.
    #[must_use]
    pub fn size(&self) -> Option<(u16, u16)> {
        self.size
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    #[must_use]
    pub fn auth(&self) -> &AuthScreen {
        &self.auth
    }

    #[must_use]
    pub fn home(&self) -> &HomeScreen {
        &self.home
    }

    /// Runs the active screen's start-up work.
    pub fn init(&mut self) -> Vec<Effect> {
        self.init_screen(self.active)
    }

    /// Applies one message and returns the effects to schedule.
    pub fn update(&mut self, message: Message) -> Vec<Effect> {
        match message {
            Message::Key(key) if keys::is_force_quit(&key) => {
                self.should_quit = true;
                Vec::new()
            }
            Message::Quit => {
                self.should_quit = true;
                Vec::new()
            }
            Message::Resize { width, height } => {
                self.size = Some((width, height));
                let mut effects = self
                    .auth
                    .update(Message::Resize { width, height }, &self.context);
                effects.extend(
                    self.home
                        .update(Message::Resize { width, height }, &self.context),
                );
                effects
            }
            Message::Navigate(screen) => self.navigate(screen),
            Message::SessionReady(session) => {
                info!(user = %session.profile.display_name(), "session ready");
                self.context.session = Some(session.clone());
                self.route(self.active, Message::SessionReady(session))
            }
            Message::LoggedOut => {
                info!("signed out");
                self.context.session = None;
                let mut effects = self.navigate(Screen::Auth);
                effects.extend(self.route(Screen::Auth, Message::LoggedOut));
                effects
            }
            Message::Error(err) => {
                error!(code = err.code(), error = %err, "operation failed");
                self.route(self.active, Message::Error(err))
            }
            Message::Success(text) => {
                info!(message = %text, "operation succeeded");
                self.route(self.active, Message::Success(text))
            }
            other => self.route(self.active, other),
        }
    }

    /// Draws the active screen over the whole frame.
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        match self.active {
            Screen::Auth => self.auth.render(frame, area, &self.context),
            Screen::Home => self.home.render(frame, area, &self.context),
            Screen::Search
            | Screen::Detail
            | Screen::Download
            | Screen::Library
            | Screen::History => {}
        }
    }

    fn navigate(&mut self, screen: Screen) -> Vec<Effect> {
        if !Self::is_registered(screen) {
            debug!(screen = %screen, "no model registered for screen");
            return Vec::new();
        }
        if screen != self.active {
            info!(from = %self.active, to = %screen, "switching screen");
            self.active = screen;
        }
        self.init_screen(screen)
    }

    fn init_screen(&mut self, screen: Screen) -> Vec<Effect> {
        match screen {
            Screen::Auth => self.auth.init(&self.context),
            Screen::Home => self.home.init(&self.context),
            Screen::Search
            | Screen::Detail
            | Screen::Download
            | Screen::Library
            | Screen::History => Vec::new(),
        }
    }

    fn route(&mut self, screen: Screen, message: Message) -> Vec<Effect> {
        match screen {
            Screen::Auth => self.auth.update(message, &self.context),
            Screen::Home => self.home.update(message, &self.context),
            Screen::Search
            | Screen::Detail
            | Screen::Download
            | Screen::Library
            | Screen::History => Vec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;

    use super::*;
    use crate::api::{ApiClient, Session, UserProfile};
    use crate::config::{AppPaths, Config};
    use crate::errors::StructuredError;
    use crate::tui::screens::Status;

    fn app(root: &Path) -> App {
        let paths = AppPaths {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
            cache_dir: root.join("cache"),
            download_dir: root.join("books"),
        };
        App::new(Context::new(Config::defaults(&paths), "http://127.0.0.1:9"))
    }

    fn session() -> Session {
        Session {
            client: ApiClient::new(&[], 10).unwrap(),
            profile: UserProfile {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                ..UserProfile::default()
            },
        }
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_starts_on_auth() {
        let tempdir = TempDir::new().unwrap();
        let app = app(tempdir.path());
        assert_eq!(app.active(), Screen::Auth);
        assert!(!app.should_quit());
        assert!(app.size().is_none());
    }

    #[test]
    fn test_ctrl_c_quits_from_any_screen() {
        let tempdir = TempDir::new().unwrap();
        let mut app = app(tempdir.path());
        app.update(Message::Navigate(Screen::Home));

        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.update(Message::Key(key)).is_empty());
        assert!(app.should_quit());
    }

    #[test]
    fn test_quit_message_sets_flag() {
        let tempdir = TempDir::new().unwrap();
        let mut app = app(tempdir.path());
        app.update(Message::Quit);
        assert!(app.should_quit());
    }

    #[test]
    fn test_navigate_to_unregistered_screen_is_noop() {
        let tempdir = TempDir::new().unwrap();
        let mut app = app(tempdir.path());
        app.update(Message::Navigate(Screen::Home));

        assert!(app.update(Message::Navigate(Screen::Library)).is_empty());
        assert_eq!(app.active(), Screen::Home);
    }

    #[test]
    fn test_screen_state_survives_navigation() {
        let tempdir = TempDir::new().unwrap();
        let mut app = app(tempdir.path());
        let pasted = r#"[{"name": "orm-jwt", "value": "abc"}]"#;

        app.update(Message::Paste(pasted.to_string()));
        app.update(Message::Navigate(Screen::Home));
        for _ in 0..2 {
            app.update(Message::Key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE)));
        }
        app.update(Message::Navigate(Screen::Auth));
        app.update(Message::Navigate(Screen::Home));

        assert_eq!(app.active(), Screen::Home);
        assert_eq!(app.auth().input(), pasted);
        assert_eq!(app.home().cursor(), 2);
    }

    #[test]
    fn test_only_auth_and_home_are_registered() {
        let registered: Vec<Screen> = [
            Screen::Auth,
            Screen::Home,
            Screen::Search,
            Screen::Detail,
            Screen::Download,
            Screen::Library,
            Screen::History,
        ]
        .into_iter()
        .filter(|screen| App::is_registered(*screen))
        .collect();
        assert_eq!(registered, vec![Screen::Auth, Screen::Home]);
    }

    #[test]
    fn test_resize_reaches_every_screen() {
        let tempdir = TempDir::new().unwrap();
        let mut app = app(tempdir.path());

        app.update(Message::Resize { width: 90, height: 33 });
        assert_eq!(app.size(), Some((90, 33)));
        assert_eq!(app.auth().size(), (90, 33));
        assert_eq!(app.home().size(), (90, 33));
    }

    #[test]
    fn test_error_goes_to_active_screen_only() {
        let tempdir = TempDir::new().unwrap();
        let mut app = app(tempdir.path());
        app.update(Message::Navigate(Screen::Home));

        app.update(Message::Error(StructuredError::session_expired().into()));
        assert!(matches!(app.home().status(), Some(Status::Error(_))));
        assert!(app.auth().status().is_none());
    }

    #[tokio::test]
    async fn test_session_ready_stores_session_and_moves_home() {
        let tempdir = TempDir::new().unwrap();
        let mut app = app(tempdir.path());

        let mut effects = app.update(Message::SessionReady(session()));
        assert!(app.context().session.is_some());
        assert_eq!(effects.len(), 1);

        let follow_up = effects.remove(0).into_future().await.unwrap();
        app.update(follow_up);
        assert_eq!(app.active(), Screen::Home);
        assert!(screen_text(&app).contains("Ada Lovelace"));
    }

    #[test]
    fn test_logged_out_clears_session_and_returns_to_auth() {
        let tempdir = TempDir::new().unwrap();
        let mut app = app(tempdir.path());
        app.update(Message::SessionReady(session()));
        app.update(Message::Navigate(Screen::Home));

        app.update(Message::LoggedOut);
        assert!(app.context().session.is_none());
        assert_eq!(app.active(), Screen::Auth);
        assert!(matches!(app.auth().status(), Some(Status::Info(_))));
    }

    #[test]
    fn test_auth_screen_renders() {
        let tempdir = TempDir::new().unwrap();
        let app = app(tempdir.path());
        let text = screen_text(&app);
        assert!(text.contains("O'Reilly Authentication"));
        assert!(text.contains("ctrl+s: validate and save"));
    }
}
