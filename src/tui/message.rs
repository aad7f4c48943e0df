//! Messages delivered to the event loop and the effects that produce them.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crossterm::event::KeyEvent;

use crate::api::Session;
use crate::errors::AppError;

/// Screens of the application. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Auth,
    Home,
    Search,
    Detail,
    Download,
    Library,
    History,
}

impl Screen {
    /// Returns a short label for logs and headers.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Home => "home",
            Self::Search => "search",
            Self::Detail => "detail",
            Self::Download => "download",
            Self::Library => "library",
            Self::History => "history",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to [`super::App::update`].
#[derive(Debug)]
pub enum Message {
    /// Key press from the terminal.
    Key(KeyEvent),
    /// Bracketed paste from the terminal.
    Paste(String),
    /// Terminal size changed.
    Resize { width: u16, height: u16 },
    /// Switch the active screen.
    Navigate(Screen),
    /// A failure to show on the active screen.
    Error(AppError),
    /// A confirmation to show on the active screen.
    Success(String),
    /// A session was validated.
    SessionReady(Session),
    /// The saved session was removed.
    LoggedOut,
    /// Terminate the application.
    Quit,
}

type BoxedMessageFuture = Pin<Box<dyn Future<Output = Option<Message>> + Send + 'static>>;

/// Deferred work scheduled by the event loop. Runs on the Tokio runtime and
/// yields at most one message.
pub struct Effect(BoxedMessageFuture);

impl Effect {
    /// Wraps a future producing an optional message.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Option<Message>> + Send + 'static,
    {
        Self(Box::pin(future))
    }

    /// Wraps a future whose failure becomes a [`Message::Error`].
    pub fn attempt<F>(future: F) -> Self
    where
        F: Future<Output = Result<Message, AppError>> + Send + 'static,
    {
        Self::new(async move {
            Some(match future.await {
                Ok(message) => message,
                Err(err) => Message::Error(err),
            })
        })
    }

    /// An effect that immediately yields `message`.
    #[must_use]
    pub fn message(message: Message) -> Self {
        Self::new(async move { Some(message) })
    }

    /// Consumes the effect, returning its future.
    #[must_use]
    pub fn into_future(self) -> BoxedMessageFuture {
        self.0
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Effect(..)")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::errors::StructuredError;

    #[tokio::test]
    async fn test_message_effect_yields_message() {
        let message = Effect::message(Message::Navigate(Screen::Home))
            .into_future()
            .await;
        assert!(matches!(message, Some(Message::Navigate(Screen::Home))));
    }

    #[tokio::test]
    async fn test_attempt_effect_turns_failure_into_error_message() {
        let message = Effect::attempt(async { Err(StructuredError::network().into()) })
            .into_future()
            .await
            .unwrap();
        match message {
            Message::Error(err) => assert_eq!(err.code(), "NET_001"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_effect_may_yield_nothing() {
        assert!(Effect::new(async { None }).into_future().await.is_none());
    }

    #[test]
    fn test_screen_labels() {
        assert_eq!(Screen::Auth.to_string(), "auth");
        assert_eq!(Screen::History.as_str(), "history");
    }
}
