use crate::fonts::FontMetrics;

pub(crate) struct WrappedLine {
    pub(crate) text: String,
    pub(crate) width: f32,
}

/// Width of `text` laid out on a single line, spaces collapsed.
pub(crate) fn text_width(text: &str, metrics: &FontMetrics, font_size: f32) -> f32 {
    let space_w = metrics.space_width(font_size);
    text.split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lead = if i > 0 { space_w } else { 0.0 };
            lead + metrics.word_width(word, font_size)
        })
        .sum()
}

/// Greedy word wrap against `max_width`.
///
/// `\n` forces a break (an empty source line yields an empty output line);
/// a word wider than a whole line is split between characters so nothing is
/// ever clipped. Text that is entirely whitespace yields no lines.
pub(crate) fn wrap_text(
    text: &str,
    metrics: &FontMetrics,
    font_size: f32,
    max_width: f32,
) -> Vec<WrappedLine> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let space_w = metrics.space_width(font_size);
    let mut lines = Vec::new();

    for source_line in text.lines() {
        let mut current = String::new();
        let mut current_w = 0.0f32;

        for word in source_line.split_whitespace() {
            let ww = metrics.word_width(word, font_size);

            if ww > max_width {
                if !current.is_empty() {
                    lines.push(WrappedLine {
                        text: std::mem::take(&mut current),
                        width: current_w,
                    });
                }
                let mut pieces = split_long_word(word, metrics, font_size, max_width);
                let last = pieces.pop();
                lines.extend(pieces);
                match last {
                    Some(piece) => {
                        current = piece.text;
                        current_w = piece.width;
                    }
                    None => current_w = 0.0,
                }
                continue;
            }

            let proposed = if current.is_empty() {
                ww
            } else {
                current_w + space_w + ww
            };
            if !current.is_empty() && proposed > max_width {
                lines.push(WrappedLine {
                    text: std::mem::take(&mut current),
                    width: current_w,
                });
                current.push_str(word);
                current_w = ww;
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_w = proposed;
            }
        }

        lines.push(WrappedLine {
            text: current,
            width: current_w,
        });
    }

    lines
}

fn split_long_word(
    word: &str,
    metrics: &FontMetrics,
    font_size: f32,
    max_width: f32,
) -> Vec<WrappedLine> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_w = 0.0f32;
    for ch in word.chars() {
        let cw = metrics.char_width_1000(ch) * font_size / 1000.0;
        if !current.is_empty() && current_w + cw > max_width {
            pieces.push(WrappedLine {
                text: std::mem::take(&mut current),
                width: current_w,
            });
            current_w = 0.0;
        }
        current.push(ch);
        current_w += cw;
    }
    if !current.is_empty() {
        pieces.push(WrappedLine {
            text: current,
            width: current_w,
        });
    }
    pieces
}
