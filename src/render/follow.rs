//! Redraws the bar whenever the phase changes.

use std::io::Write;
use tokio::sync::{broadcast, watch};

use crate::progress::Phase;
use crate::render::bar::render_bar;

/// Erase the current terminal line and return the cursor to column 0.
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Draw every phase change to `out` until shutdown or the indicator is gone.
///
/// Returns the number of frames drawn.
pub async fn follow<W: Write>(
    mut phases: watch::Receiver<Phase>,
    mut shutdown: broadcast::Receiver<()>,
    width: usize,
    mut out: W,
) -> usize {
    let mut frames = 0;

    loop {
        tokio::select! {
            changed = phases.changed() => {
                if changed.is_err() {
                    break;
                }
                let phase = *phases.borrow_and_update();
                if let Err(e) = draw(&mut out, phase, width) {
                    tracing::warn!(error = %e, "Failed to draw progress bar");
                    break;
                }
                frames += 1;
            }
            _ = shutdown.recv() => {
                break;
            }
        }
    }

    let _ = out.write_all(CLEAR_LINE.as_bytes());
    let _ = out.flush();
    frames
}

fn draw<W: Write>(out: &mut W, phase: Phase, width: usize) -> std::io::Result<()> {
    write!(out, "{}{}", CLEAR_LINE, render_bar(phase, width))?;
    out.flush()
}
