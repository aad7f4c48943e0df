//! Cookie import screen.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tokio::time::Instant;
use tracing::debug;

use super::{Context, Status, View, centered};
use crate::api::{RetryPolicy, Session};
use crate::tui::keys;
use crate::tui::message::{Effect, Message, Screen};

const PLACEHOLDER: &str = r#"[{"name": "BrowserCookie", "value": "..."}, ...]"#;

const INSTRUCTIONS: [&str; 6] = [
    "To use this application you need O'Reilly Learning cookies.",
    "",
    "  1. Log in to learning.oreilly.com",
    "  2. Open DevTools (F12) > Application > Cookies",
    "  3. Copy all cookies in JSON format",
    "  4. Paste them below",
];

const HELP: &str = "ctrl+s: validate and save • ctrl+u: clear • esc: quit";

/// Upper bound for validating pasted cookies, limiter wait included.
const VALIDATION_TIMEOUT: Duration = Duration::from_secs(45);

/// Collects pasted cookie JSON and turns it into a session.
#[derive(Debug, Default)]
pub struct AuthScreen {
    input: String,
    validating: bool,
    restore_attempted: bool,
    status: Option<Status>,
    size: (u16, u16),
}

impl AuthScreen {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the text typed or pasted so far.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns `true` while a validation effect is in flight.
    #[must_use]
    pub fn is_validating(&self) -> bool {
        self.validating
    }

    #[must_use]
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &Context) -> Vec<Effect> {
        if key.code == KeyCode::Esc {
            return vec![Effect::message(Message::Quit)];
        }
        if keys::is_ctrl(&key, 's') {
            return self.submit(ctx);
        }
        if self.validating {
            return Vec::new();
        }
        if keys::is_ctrl(&key, 'u') {
            self.input.clear();
            self.status = None;
            return Vec::new();
        }

        match key.code {
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.input.push(ch);
            }
            KeyCode::Enter => self.input.push('\n'),
            KeyCode::Tab => self.input.push('\t'),
            KeyCode::Backspace => {
                self.input.pop();
            }
            _ => {}
        }
        Vec::new()
    }

    fn submit(&mut self, ctx: &Context) -> Vec<Effect> {
        if self.validating {
            return Vec::new();
        }
        let text = self.input.trim().to_string();
        if text.is_empty() {
            self.status = Some(Status::Error("Paste your cookies first.".to_string()));
            return Vec::new();
        }

        debug!(chars = text.len(), "validating pasted cookies");
        self.validating = true;
        self.status = Some(Status::Info("Validating session...".to_string()));

        let store = ctx.cookie_store.clone();
        let base_url = ctx.base_url.clone();
        let rps = ctx.config.rate_limit_rps;
        vec![Effect::attempt(async move {
            let deadline = Instant::now() + VALIDATION_TIMEOUT;
            let session = Session::import(&text, &store, &base_url, rps, Some(deadline)).await?;
            Ok(Message::SessionReady(session))
        })]
    }

    fn restore(&mut self, ctx: &Context) -> Vec<Effect> {
        self.restore_attempted = true;
        self.validating = true;
        self.status = Some(Status::Info("Restoring saved session...".to_string()));

        let store = ctx.cookie_store.clone();
        let base_url = ctx.base_url.clone();
        let rps = ctx.config.rate_limit_rps;
        vec![Effect::attempt(async move {
            let session =
                Session::restore(&store, &base_url, rps, &RetryPolicy::default()).await?;
            Ok(Message::SessionReady(session))
        })]
    }

    fn input_text(&self, ctx: &Context) -> Text<'_> {
        if self.input.is_empty() {
            return Text::styled(PLACEHOLDER, ctx.styles.text_dim);
        }
        Text::styled(self.input.as_str(), ctx.styles.input)
    }
}

impl View for AuthScreen {
    fn init(&mut self, ctx: &Context) -> Vec<Effect> {
        if ctx.session.is_none() && !self.restore_attempted && ctx.cookie_store.exists() {
            return self.restore(ctx);
        }
        Vec::new()
    }

    fn update(&mut self, message: Message, ctx: &Context) -> Vec<Effect> {
        match message {
            Message::Resize { width, height } => {
                self.size = (width, height);
                Vec::new()
            }
            Message::Key(key) => self.handle_key(key, ctx),
            Message::Paste(text) if !self.validating => {
                self.input.push_str(&text.replace("\r\n", "\n"));
                Vec::new()
            }
            Message::Error(err) => {
                self.validating = false;
                self.status = Some(Status::Error(err.user_message()));
                Vec::new()
            }
            Message::Success(text) => {
                self.status = Some(Status::Success(text));
                Vec::new()
            }
            Message::SessionReady(session) => {
                self.validating = false;
                self.input.clear();
                self.status = Some(Status::Success(format!(
                    "Signed in as {}",
                    session.profile.display_name()
                )));
                vec![Effect::message(Message::Navigate(Screen::Home))]
            }
            Message::LoggedOut => {
                self.validating = false;
                self.status = Some(Status::Info(
                    "Signed out. Paste new cookies to sign in again.".to_string(),
                ));
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &Context) {
        let styles = &ctx.styles;
        let area = centered(area, 84, 24);
        let [title, subtitle, instructions, input, status, help] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(7),
            Constraint::Min(5),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new("O'Reilly Authentication").style(styles.title),
            title,
        );
        frame.render_widget(
            Paragraph::new("Enter your session cookies").style(styles.subtitle),
            subtitle,
        );
        frame.render_widget(
            Paragraph::new(INSTRUCTIONS.iter().map(|line| Line::from(*line)).collect::<Vec<_>>())
                .style(styles.text_dim),
            instructions,
        );

        let inner_height = input.height.saturating_sub(2);
        let line_count = u16::try_from(self.input.lines().count()).unwrap_or(u16::MAX);
        frame.render_widget(
            Paragraph::new(self.input_text(ctx))
                .wrap(Wrap { trim: false })
                .scroll((line_count.saturating_sub(inner_height), 0))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(styles.border)
                        .title(" Cookies (JSON) "),
                ),
            input,
        );

        if let Some(current) = &self.status {
            frame.render_widget(
                Paragraph::new(current.text())
                    .style(current.style(styles))
                    .wrap(Wrap { trim: true }),
                status,
            );
        }
        frame.render_widget(Paragraph::new(HELP).style(styles.text_dim), help);
    }
}
