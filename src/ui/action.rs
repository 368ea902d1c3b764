//! Polling loop that drives a resource while rendering progress.

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use crate::core::resource::{Resource, ResourceError, ResourceState};

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TICK: Duration = Duration::from_millis(80);

/// Drives a [`Resource`] to its terminal state.
///
/// While the resource is pending a spinner line is redrawn in place on
/// stderr, advancing on a fixed tick or as soon as the completion signal
/// fires. When stderr is not a terminal the label is printed once instead so
/// piped output stays clean.
pub struct AsyncAction {
    label: String,
}

impl AsyncAction {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub async fn run<T>(&self, resource: Resource<T>) -> Result<Arc<T>, ResourceError>
    where
        T: Send + Sync + 'static,
    {
        let interactive = io::stderr().is_terminal();
        let mut frame = 0usize;
        let mut announced = false;

        loop {
            match resource.poll() {
                ResourceState::Pending(signal) => {
                    if interactive {
                        let glyph = SPINNER_FRAMES[frame % SPINNER_FRAMES.len()];
                        eprint!("\r{glyph} {}", self.label);
                        let _ = io::stderr().flush();
                        frame += 1;
                    } else if !announced {
                        eprintln!("{}", self.label);
                        announced = true;
                    }
                    tokio::select! {
                        _ = signal.wait() => {}
                        _ = time::sleep(TICK) => {}
                    }
                }
                ResourceState::Ready(value) => {
                    clear_line(interactive);
                    return Ok(value);
                }
                ResourceState::Failed(err) => {
                    clear_line(interactive);
                    return Err(err);
                }
            }
        }
    }
}

fn clear_line(interactive: bool) {
    if interactive {
        eprint!("\r\x1b[2K");
        let _ = io::stderr().flush();
    }
}
