//! Keyboard input
//!
//! The game loop consumes any stream of [`KeyAction`]s; [`terminal_input`]
//! builds one from crossterm's event stream.

pub mod handler;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::future;
use futures::stream::{LocalBoxStream, StreamExt};

pub use handler::{InputHandler, KeyAction};

/// Key actions read from the terminal. Only key presses are routed.
pub fn terminal_input(handler: InputHandler) -> LocalBoxStream<'static, Result<KeyAction>> {
    EventStream::new()
        .filter_map(move |event| {
            let action = match event {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    Some(Ok(handler.handle_key_event(key)))
                }
                Ok(_) => None,
                Err(e) => Some(Err(
                    anyhow::Error::new(e).context("Failed to read terminal event"),
                )),
            };
            future::ready(action)
        })
        .boxed_local()
}
