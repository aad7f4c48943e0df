//! Event loop: terminal input and effect results feed [`App::update`].

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures_util::StreamExt;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, warn};

use super::app::App;
use super::message::{Effect, Message};
use super::terminal::Tui;

/// Runs until the app asks to quit or the terminal input stream ends.
pub async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let mut events = EventStream::new();

    let size = terminal.size()?;
    spawn_effects(
        &tx,
        app.update(Message::Resize {
            width: size.width,
            height: size.height,
        }),
    );
    spawn_effects(&tx, app.init());

    while !app.should_quit() {
        terminal.draw(|frame| app.render(frame))?;

        let message = tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => translate(event),
                Some(Err(err)) => {
                    warn!(error = %err, "failed to read terminal event");
                    None
                }
                None => {
                    debug!("terminal event stream closed");
                    break;
                }
            },
            Some(message) = rx.recv() => Some(message),
        };

        if let Some(message) = message {
            spawn_effects(&tx, app.update(message));
        }
    }
    Ok(())
}

fn translate(event: Event) -> Option<Message> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(Message::Key(key)),
        Event::Paste(text) => Some(Message::Paste(text)),
        Event::Resize(width, height) => Some(Message::Resize { width, height }),
        _ => None,
    }
}

/// Schedules each effect on the runtime; produced messages re-enter the loop.
fn spawn_effects(tx: &UnboundedSender<Message>, effects: Vec<Effect>) {
    for effect in effects {
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(message) = effect.into_future().await {
                // The receiver is gone only after the loop exited.
                let _ = tx.send(message);
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    use super::*;
    use crate::tui::message::Screen;

    #[test]
    fn test_translate_ignores_key_release() {
        let release = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(translate(Event::Key(release)).is_none());
        assert!(matches!(
            translate(Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE))),
            Some(Message::Key(_))
        ));
    }

    #[test]
    fn test_translate_resize_and_paste() {
        assert!(matches!(
            translate(Event::Resize(80, 24)),
            Some(Message::Resize { width: 80, height: 24 })
        ));
        assert!(matches!(
            translate(Event::Paste("x".into())),
            Some(Message::Paste(text)) if text == "x"
        ));
        assert!(translate(Event::FocusGained).is_none());
    }

    #[tokio::test]
    async fn test_spawned_effect_result_reaches_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_effects(
            &tx,
            vec![Effect::message(Message::Navigate(Screen::Home))],
        );
        let message = rx.recv().await.unwrap();
        assert!(matches!(message, Message::Navigate(Screen::Home)));
    }
}
