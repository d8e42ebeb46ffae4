//! Overline markup for diagram labels
//!
//! Signal names and bus values may mark a part of their text as logically
//! negated. A leading `!` draws a line above the text. Splitting the label
//! once on `/` gives two independently marked parts:
//!
//! | label        | drawn as    | overlined    |
//! |--------------|-------------|--------------|
//! | `!ABCD`      | `ABCD`      | `ABCD`       |
//! | `AB!CD`      | `AB!CD`     | nothing      |
//! | `!AB/CD`     | `AB/CD`     | `AB`         |
//! | `AB/!CD`     | `AB/CD`     | `CD`         |
//! | `!AB/!CD/!E` | `AB/CD/!E`  | `AB`, `CD/!E`|

/// A run of label text drawn with or without an overline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub overline: bool,
}

impl<'a> Segment<'a> {
    fn marked(raw: &'a str) -> Self {
        match raw.strip_prefix('!') {
            Some(text) => Self {
                text,
                overline: true,
            },
            None => Self {
                text: raw,
                overline: false,
            },
        }
    }

    fn plain(text: &'a str) -> Self {
        Self {
            text,
            overline: false,
        }
    }
}

/// Split a label into the segments laid out left to right
///
/// Empty segments are dropped, so `"!"` yields nothing and `"A/"` yields
/// `A` followed by `/`.
pub fn parse_markup(label: &str) -> Vec<Segment<'_>> {
    let segments = match label.split_once('/') {
        Some((head, tail)) => vec![
            Segment::marked(head),
            Segment::plain("/"),
            Segment::marked(tail),
        ],
        None => vec![Segment::marked(label)],
    };
    segments
        .into_iter()
        .filter(|segment| !segment.text.is_empty())
        .collect()
}

/// The label text as it appears once overline markers are removed
pub fn strip_markup(label: &str) -> String {
    parse_markup(label)
        .iter()
        .map(|segment| segment.text)
        .collect()
}
