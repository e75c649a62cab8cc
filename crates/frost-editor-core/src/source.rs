//! Raw HTML source view.
//!
//! Offsets here are UTF-16 code units, matching `selectionStart` and
//! `selectionEnd` on a textarea.

/// Which surface is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    #[default]
    Editing,
    Source,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Editing => Self::Source,
            Self::Source => Self::Editing,
        }
    }

    pub fn is_source(self) -> bool {
        self == Self::Source
    }
}

/// Number of `\n`-separated lines, for the line-number gutter.
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// Result of a Tab or Shift+Tab in the source textarea.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEdit {
    pub value: String,
    pub start: usize,
    pub end: usize,
}

const TAB: u16 = b'\t' as u16;
const NEWLINE: u16 = b'\n' as u16;

fn from_units(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

/// Start offsets of every line touched by `start..end`.
///
/// A selection ending right after a newline does not touch the next line.
fn line_starts(units: &[u16], start: usize, end: usize) -> Vec<usize> {
    let first = units[..start]
        .iter()
        .rposition(|&u| u == NEWLINE)
        .map_or(0, |i| i + 1);
    let last = if end > start && units[end - 1] == NEWLINE {
        end - 1
    } else {
        end
    };
    let mut starts = vec![first];
    starts.extend(
        (first..last)
            .filter(|&i| units[i] == NEWLINE)
            .map(|i| i + 1),
    );
    starts
}

fn clamp(units: &[u16], start: usize, end: usize) -> (usize, usize) {
    let end = end.min(units.len());
    (start.min(end), end)
}

/// Tab: insert a tab at the caret, replacing a single-line selection, or
/// indent every line of a multi-line selection.
pub fn indent(value: &str, start: usize, end: usize) -> SourceEdit {
    let mut units: Vec<u16> = value.encode_utf16().collect();
    let (start, end) = clamp(&units, start, end);
    let multiline = units[start..end].contains(&NEWLINE);
    if !multiline {
        units.splice(start..end, [TAB]);
        return SourceEdit {
            value: from_units(&units),
            start: start + 1,
            end: start + 1,
        };
    }
    let starts = line_starts(&units, start, end);
    for &line in starts.iter().rev() {
        units.insert(line, TAB);
    }
    SourceEdit {
        value: from_units(&units),
        start: start + 1,
        end: end + starts.len(),
    }
}

/// Shift+Tab: remove one leading tab from every line the selection touches.
pub fn outdent(value: &str, start: usize, end: usize) -> SourceEdit {
    let mut units: Vec<u16> = value.encode_utf16().collect();
    let (start, end) = clamp(&units, start, end);
    let removed: Vec<usize> = line_starts(&units, start, end)
        .into_iter()
        .filter(|&line| units.get(line) == Some(&TAB))
        .collect();
    for &at in removed.iter().rev() {
        units.remove(at);
    }
    let shift = |offset: usize| offset - removed.iter().filter(|&&at| at < offset).count();
    SourceEdit {
        value: from_units(&units),
        start: shift(start),
        end: shift(end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_and_line_count() {
        assert_eq!(ViewMode::default().toggled(), ViewMode::Source);
        assert!(ViewMode::Source.is_source());
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("<p>a</p>\n<p>b</p>\n"), 3);
    }

    #[test]
    fn tab_at_caret() {
        let edit = indent("<p>x</p>", 3, 3);
        assert_eq!(edit.value, "<p>\tx</p>");
        assert_eq!((edit.start, edit.end), (4, 4));
    }

    #[test]
    fn tab_replaces_single_line_selection() {
        let edit = indent("abcdef", 1, 4);
        assert_eq!(edit.value, "a\tef");
        assert_eq!((edit.start, edit.end), (2, 2));
    }

    #[test]
    fn tab_indents_selected_lines() {
        let text = "one\ntwo\nthree";
        let edit = indent(text, 1, 6);
        assert_eq!(edit.value, "\tone\n\ttwo\nthree");
        assert_eq!((edit.start, edit.end), (2, 8));

        // Ending right after a newline leaves the next line alone.
        let edit = indent(text, 0, 4);
        assert_eq!(edit.value, "\tone\ntwo\nthree");
    }

    #[test]
    fn shift_tab_outdents() {
        let edit = outdent("\tone\n\t\ttwo\nthree", 2, 8);
        assert_eq!(edit.value, "one\n\ttwo\nthree");
        assert_eq!((edit.start, edit.end), (1, 6));

        let edit = outdent("plain", 2, 2);
        assert_eq!(edit.value, "plain");
        assert_eq!((edit.start, edit.end), (2, 2));
    }

    #[test]
    fn offsets_are_utf16_units() {
        // The emoji is two code units.
        let edit = indent("😀a\nb", 2, 5);
        assert_eq!(edit.value, "\t😀a\n\tb");
        assert_eq!((edit.start, edit.end), (3, 7));
    }
}
