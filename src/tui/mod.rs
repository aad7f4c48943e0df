//! Interactive terminal client.
//!
//! [`App`] is a message-driven state machine over [`Screen`]s. The runtime
//! feeds it terminal input and the results of [`Effect`]s it asked for.

mod app;
pub mod keys;
mod message;
mod runtime;
pub mod screens;
mod terminal;
pub mod theme;

pub use app::App;
pub use message::{Effect, Message, Screen};
pub use screens::Context;

use anyhow::Result;
use tracing::info;

/// Takes over the terminal and runs the client until the user quits.
///
/// The terminal is restored even when the loop fails.
pub async fn run(context: Context) -> Result<()> {
    terminal::install_panic_hook();
    let mut terminal = terminal::init()?;
    let mut app = App::new(context);
    info!("starting interactive client");

    let result = runtime::run(&mut terminal, &mut app).await;
    terminal::restore()?;
    info!("interactive client stopped");
    result
}
