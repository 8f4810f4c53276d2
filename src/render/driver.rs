//! Async frame driver.
//!
//! [`run`] is a host loop for an [`Application`]: it drains raw input from a
//! channel and, on every tick of a fixed-rate interval, advances timers and
//! paints if a frame was requested. Input can come from any producer; for
//! terminals, [`spawn_crossterm_reader`] forwards crossterm events.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::{debug, info, warn};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{self, MissedTickBehavior};

use crate::app::Application;
use crate::event::{from_crossterm, RawInput};
use crate::render::Surface;

/// Drive `app` until the input channel closes.
///
/// The application is not `Send`, so the future must run on a
/// current-thread runtime or a `LocalSet`.
pub async fn run(app: &mut Application, surface: &mut dyn Surface, mut input: UnboundedReceiver<RawInput>) {
    let mut ticker = time::interval(app.config().frame_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!("driver started at {} fps", app.config().fps);

    loop {
        tokio::select! {
            event = input.recv() => {
                match event {
                    Some(event) => {
                        app.handle_input(event, Instant::now());
                    }
                    None => {
                        debug!("input channel closed");
                        break;
                    }
                }
            }
            _ = ticker.tick() => {
                app.tick(Instant::now());
                app.paint_if_requested(surface);
            }
        }
    }

    app.paint_if_requested(surface);
    info!("driver stopped after {} frames", app.manager().draw_count());
}

/// Read crossterm events on a blocking thread and forward them as
/// [`RawInput`]. The thread ends when the receiver is dropped or reading
/// fails.
pub fn spawn_crossterm_reader(tx: UnboundedSender<RawInput>) -> JoinHandle<io::Result<()>> {
    thread::spawn(move || loop {
        let event = crossterm::event::read().map_err(|e| {
            warn!("terminal read failed: {e}");
            e
        })?;
        if let Some(input) = from_crossterm(event) {
            if tx.send(input).is_err() {
                debug!("input receiver dropped, reader exiting");
                return Ok(());
            }
        }
    })
}

// ===========================================================================
// Tests
// ===========================================================================
