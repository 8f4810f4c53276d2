//! Greedy line breaking and justification.
//!
//! [`wrap_by_word`] breaks on word, space-run and CJK boundaries and falls
//! back to per-character splitting for tokens wider than the line.
//! Breaking is lossless: concatenating the lines of one paragraph gives the
//! paragraph back. A space run that lands at a break stays at the end of the
//! line it follows, and widths are checked with trailing spaces trimmed.
//!
//! [`wrap_by_space`] is the simpler breaker for space-separated text, with
//! optional [`justify_text`].

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::TextMeasure;

/// Characters that never start a line.
const NO_BREAK_BEFORE: &[char] = &[
    ' ', '\t', '.', ']', ')', '}', ',', '?', ';', ':', '!', '"', '\'', '。', '？', '、', '”', '’',
    '】', '》', '）', '：', '；', '，',
];

/// CJK unified ideographs, basic block.
pub fn is_cjk(c: char) -> bool {
    ('\u{4E00}'..='\u{9FA5}').contains(&c)
}

/// Whether a line may begin with `c`.
pub fn can_break_before(c: char) -> bool {
    !NO_BREAK_BEFORE.contains(&c)
}

/// Split one line into breakable units: a run of spaces, a single CJK
/// character, or a run of other characters up to the next space or CJK
/// character. Spaces and CJK characters take one following character that
/// may not start a line.
pub fn segment(line: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let byte_at = |i: usize| chars.get(i).map_or(line.len(), |&(b, _)| b);

    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let start = i;
        let c = chars[i].1;
        if c == ' ' || is_cjk(c) {
            i += 1;
            if c == ' ' {
                while i < chars.len() && chars[i].1 == ' ' {
                    i += 1;
                }
            }
            if i < chars.len() && !can_break_before(chars[i].1) {
                i += 1;
            }
        } else {
            while i < chars.len() && chars[i].1 != ' ' && !is_cjk(chars[i].1) {
                i += 1;
            }
        }
        out.push(&line[byte_at(start)..byte_at(i)]);
    }
    out
}

/// Greedy word wrap to `width`. Each `\n` starts a new paragraph; an empty
/// paragraph yields an empty line.
pub fn wrap_by_word(measure: &mut impl TextMeasure, width: f64, text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut line = String::new();
        for word in segment(paragraph) {
            let candidate = format!("{line}{word}");
            if measure.measure(candidate.trim_end()) <= width {
                line = candidate;
                continue;
            }

            if measure.measure(word.trim_end()) > width {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                line = split_chars(measure, width, word, &mut lines);
            } else {
                lines.push(std::mem::replace(&mut line, word.to_owned()));
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

/// Break `word` character by character, pushing full lines and returning
/// the unfinished tail. A single character wider than `width` still takes a
/// line of its own.
fn split_chars(measure: &mut impl TextMeasure, width: f64, word: &str, lines: &mut Vec<String>) -> String {
    let mut current = String::new();
    for c in word.chars() {
        let mut candidate = current.clone();
        candidate.push(c);
        if !current.is_empty() && measure.measure(candidate.trim_end()) > width {
            lines.push(std::mem::replace(&mut current, c.to_string()));
        } else {
            current = candidate;
        }
    }
    current
}

/// Where the leftover spaces of a justified line go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapFill {
    /// The first gaps get one extra space each.
    #[default]
    LeftToRight,
    /// Gaps picked at random from a seeded generator.
    Seeded(u64),
}

/// Stretch `line` to `max_width` by widening the gaps between words.
///
/// Returns the line unchanged when it has no gaps or the slack is less than
/// one space.
pub fn justify_text(measure: &mut impl TextMeasure, line: &str, max_width: f64, fill: GapFill) -> String {
    let words: Vec<&str> = line.split(' ').collect();
    let gaps = words.len() - 1;
    let space = measure.measure(" ");
    let slack = max_width - measure.measure(line);
    if gaps == 0 || space <= 0.0 || slack < space {
        return line.to_owned();
    }

    let units = (slack / space).floor() as usize;
    let mut extra = vec![units / gaps; gaps];
    let residue = units % gaps;
    match fill {
        GapFill::LeftToRight => {
            for gap in extra.iter_mut().take(residue) {
                *gap += 1;
            }
        }
        GapFill::Seeded(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            for gap in rand::seq::index::sample(&mut rng, gaps, residue).iter() {
                extra[gap] += 1;
            }
        }
    }

    let mut out = String::with_capacity(line.len() + units);
    for (word, n) in words.iter().zip(&extra) {
        out.push_str(word);
        out.push(' ');
        out.extend(std::iter::repeat(' ').take(*n));
    }
    out.push_str(words[gaps]);
    out
}

/// Wrap space-separated text without splitting words. A word wider than
/// `width` gets a line of its own. With `justify`, every line except the
/// last of each paragraph is stretched to `width`.
pub fn wrap_by_space(
    measure: &mut impl TextMeasure,
    width: f64,
    text: &str,
    justify: Option<GapFill>,
) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let candidate = if line.is_empty() {
                word.to_owned()
            } else {
                format!("{line} {word}")
            };
            if !line.is_empty() && measure.measure(&candidate) > width {
                let done = std::mem::replace(&mut line, word.to_owned());
                lines.push(match justify {
                    Some(fill) => justify_text(measure, &done, width, fill),
                    None => done,
                });
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }
    lines
}

// ===========================================================================
// Tests
// ===========================================================================
