//! Main menu shown once a session is validated.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use super::{Context, Status, View, centered};
use crate::tui::keys::{self, Action};
use crate::tui::message::{Effect, Message, Screen};

/// Entries of the main menu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Search,
    Library,
    History,
    LogOut,
    Exit,
}

impl MenuItem {
    pub const ALL: [Self; 5] = [
        Self::Search,
        Self::Library,
        Self::History,
        Self::LogOut,
        Self::Exit,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Search => "Search books",
            Self::Library => "Library",
            Self::History => "Download history",
            Self::LogOut => "Log out",
            Self::Exit => "Exit",
        }
    }

    fn screen(self) -> Option<Screen> {
        match self {
            Self::Search => Some(Screen::Search),
            Self::Library => Some(Screen::Library),
            Self::History => Some(Screen::History),
            Self::LogOut | Self::Exit => None,
        }
    }
}

/// Menu with a single cursor.
#[derive(Debug, Default)]
pub struct HomeScreen {
    cursor: usize,
    show_help: bool,
    status: Option<Status>,
    size: (u16, u16),
}

impl HomeScreen {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn selected(&self) -> MenuItem {
        MenuItem::ALL[self.cursor.min(MenuItem::ALL.len() - 1)]
    }

    #[must_use]
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    fn activate(&mut self, item: MenuItem, ctx: &Context) -> Vec<Effect> {
        if let Some(screen) = item.screen() {
            self.status = Some(Status::Info(format!(
                "{} is not available yet.",
                item.label()
            )));
            return vec![Effect::message(Message::Navigate(screen))];
        }

        match item {
            MenuItem::LogOut => {
                let store = ctx.cookie_store.clone();
                vec![Effect::attempt(async move {
                    store.delete()?;
                    Ok(Message::LoggedOut)
                })]
            }
            _ => vec![Effect::message(Message::Quit)],
        }
    }

    fn profile_lines(&self, ctx: &Context) -> Vec<Line<'static>> {
        let styles = &ctx.styles;
        let Some(session) = &ctx.session else {
            return vec![Line::styled("Not signed in", styles.text_dim)];
        };
        let profile = &session.profile;
        let mut lines = vec![Line::from(vec![
            Span::styled("Signed in as ", styles.text_dim),
            Span::styled(profile.display_name(), styles.text),
        ])];

        let plan = if profile.subscription.kind.is_empty() {
            "active".to_string()
        } else {
            profile.subscription.kind.clone()
        };
        let mut subscription = format!("Subscription: {plan}");
        if let Some(expires_at) = profile.subscription.expires_at {
            subscription.push_str(&format!(" (expires {})", expires_at.format("%Y-%m-%d")));
        }
        lines.push(Line::styled(subscription, styles.text_dim));
        lines
    }
}

impl View for HomeScreen {
    fn update(&mut self, message: Message, ctx: &Context) -> Vec<Effect> {
        match message {
            Message::Resize { width, height } => {
                self.size = (width, height);
                Vec::new()
            }
            Message::Key(key) => match Action::from_key(&key) {
                Some(Action::Up) => {
                    self.cursor = self.cursor.saturating_sub(1);
                    Vec::new()
                }
                Some(Action::Down) => {
                    self.cursor = (self.cursor + 1).min(MenuItem::ALL.len() - 1);
                    Vec::new()
                }
                Some(Action::Select) => self.activate(self.selected(), ctx),
                Some(Action::Search) => self.activate(MenuItem::Search, ctx),
                Some(Action::Help) => {
                    self.show_help = !self.show_help;
                    Vec::new()
                }
                Some(Action::Quit) => vec![Effect::message(Message::Quit)],
                _ => Vec::new(),
            },
            Message::Error(err) => {
                self.status = Some(Status::Error(err.user_message()));
                Vec::new()
            }
            Message::Success(text) => {
                self.status = Some(Status::Success(text));
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &Context) {
        let styles = &ctx.styles;
        let area = centered(area, 60, 20);
        let [title, profile, menu, status, help] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(MenuItem::ALL.len() as u16 + 2),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new("O'Reilly EPUB Downloader").style(styles.title),
            title,
        );
        frame.render_widget(Paragraph::new(self.profile_lines(ctx)), profile);

        let items: Vec<Line> = MenuItem::ALL
            .iter()
            .enumerate()
            .map(|(index, item)| {
                if index == self.cursor {
                    Line::styled(format!("▶ {}", item.label()), styles.list_item_active)
                } else {
                    Line::styled(format!("  {}", item.label()), styles.list_item)
                }
            })
            .collect();
        frame.render_widget(
            Paragraph::new(items).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(styles.border),
            ),
            menu,
        );

        if let Some(current) = &self.status {
            frame.render_widget(
                Paragraph::new(current.text()).style(current.style(styles)),
                status,
            );
        }

        let help_text = if self.show_help {
            keys::help_line(&[
                Action::Up,
                Action::Down,
                Action::Select,
                Action::Search,
                Action::Help,
                Action::Quit,
            ])
        } else {
            keys::help_line(&[Action::Up, Action::Down, Action::Select, Action::Quit])
        };
        frame.render_widget(Paragraph::new(help_text).style(styles.text_dim), help);
    }
}
