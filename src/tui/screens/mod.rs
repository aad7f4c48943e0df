//! Screen models.
//!
//! Each registered screen implements [`View`]. Screens never fail: fallible
//! work is returned as an [`Effect`] whose failure arrives later as a
//! [`Message::Error`].

mod auth;
mod home;

use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::Style;

pub use auth::AuthScreen;
pub use home::{HomeScreen, MenuItem};

use super::message::{Effect, Message};
use super::theme::Styles;
use crate::api::Session;
use crate::auth::CookieStore;
use crate::config::Config;

/// State shared by every screen, owned by the app.
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub cookie_store: CookieStore,
    /// Service origin used for new clients.
    pub base_url: String,
    pub styles: Styles,
    /// The validated session, once there is one.
    pub session: Option<Session>,
}

impl Context {
    /// Creates a context without a session, styled from the configured theme.
    #[must_use]
    pub fn new(config: Config, base_url: impl Into<String>) -> Self {
        let cookie_store = CookieStore::new(config.cookies_path.clone());
        let styles = Styles::for_theme(config.theme);
        Self {
            config,
            cookie_store,
            base_url: base_url.into(),
            styles,
            session: None,
        }
    }
}

/// A screen of the state machine.
pub trait View {
    /// Runs when the screen becomes active.
    fn init(&mut self, _ctx: &Context) -> Vec<Effect> {
        Vec::new()
    }

    /// Handles one message and returns follow-up effects.
    fn update(&mut self, message: Message, ctx: &Context) -> Vec<Effect>;

    /// Draws the screen into `area`.
    fn render(&self, frame: &mut Frame, area: Rect, ctx: &Context);
}

/// Feedback line shown under a screen's main content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Success(String),
    Error(String),
}

impl Status {
    /// Returns the text prefixed with its marker.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Info(text) => text.clone(),
            Self::Success(text) => format!("✔ {text}"),
            Self::Error(text) => format!("✘ {text}"),
        }
    }

    #[must_use]
    pub fn style(&self, styles: &Styles) -> Style {
        match self {
            Self::Info(_) => styles.warning,
            Self::Success(_) => styles.success,
            Self::Error(_) => styles.error,
        }
    }
}

/// Returns a rectangle of at most `width` x `height` centered in `area`.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}
