//! Text progress bar.

use crate::progress::Phase;

const FILLED: char = '=';
const EMPTY: char = ' ';

/// Render `phase` as a bar `width` cells wide.
///
/// A hidden phase renders as an empty string.
pub fn render_bar(phase: Phase, width: usize) -> String {
    if !phase.is_visible() {
        return String::new();
    }

    let percent = phase.percent() as usize;
    let filled = width / 100 * percent + width % 100 * percent / 100;

    let mut bar = String::with_capacity(width + 16);
    bar.push('[');
    bar.extend(std::iter::repeat(FILLED).take(filled));
    bar.extend(std::iter::repeat(EMPTY).take(width - filled));
    bar.push(']');
    bar.push_str(&format!(" {:>3}% {}", percent, phase));
    bar
}
