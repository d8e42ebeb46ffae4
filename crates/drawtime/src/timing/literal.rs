//! Quoted string literals used for bus values
//!
//! A literal is enclosed in single or double quotes and may use the usual
//! backslash escapes: `\\ \' \" \n \t \r \a \b \f \v`, octal `\ooo`,
//! `\xHH`, `\uXXXX` and `\UXXXXXXXX`.

use chumsky::prelude::*;

const HEX_DIGITS: &str = "0123456789abcdefABCDEF";
const OCT_DIGITS: &str = "01234567";

/// A code point given as digits in `radix`; `None` when it is not a `char`
fn code_point(digits: &str, radix: u32) -> Option<char> {
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
}

fn hex_escape<'src>(marker: char, digits: usize) -> impl Parser<'src, &'src str, Option<char>> + Clone {
    just(marker).ignore_then(
        one_of(HEX_DIGITS)
            .repeated()
            .exactly(digits)
            .to_slice()
            .map(|digits: &str| code_point(digits, 16)),
    )
}

/// Escape sequence after a backslash. Unknown escapes fail to parse.
fn escape<'src>() -> impl Parser<'src, &'src str, Option<char>> + Clone {
    let simple = choice((
        just('\\').to('\\'),
        just('\'').to('\''),
        just('"').to('"'),
        just('n').to('\n'),
        just('t').to('\t'),
        just('r').to('\r'),
        just('a').to('\x07'),
        just('b').to('\x08'),
        just('f').to('\x0c'),
        just('v').to('\x0b'),
    ))
    .map(Some);

    let octal = one_of(OCT_DIGITS)
        .repeated()
        .at_least(1)
        .at_most(3)
        .to_slice()
        .map(|digits: &str| code_point(digits, 8));

    just('\\').ignore_then(choice((
        simple,
        octal,
        hex_escape('x', 2),
        hex_escape('u', 4),
        hex_escape('U', 8),
    )))
}

fn quoted<'src>(quote: char) -> impl Parser<'src, &'src str, Vec<Option<char>>> + Clone {
    escape()
        .or(none_of([quote, '\\', '\n']).map(Some))
        .repeated()
        .collect::<Vec<_>>()
        .delimited_by(just(quote), just(quote))
}

fn literal<'src>() -> impl Parser<'src, &'src str, Vec<Option<char>>> + Clone {
    quoted('"').or(quoted('\'')).then_ignore(end())
}

/// Parse a complete quoted literal into its string value
pub fn parse_string(token: &str) -> Option<String> {
    literal()
        .parse(token)
        .into_result()
        .ok()?
        .into_iter()
        .collect()
}

/// Write `text` as a double-quoted literal that [`parse_string`] reads back
///
/// A `>` following `-` is escaped so the literal never contains `->`.
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    let mut previous = None;
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            '>' if previous == Some('-') => quoted.push_str("\\x3e"),
            c if c.is_control() => {
                let code = u32::from(c);
                if code <= 0xff {
                    quoted.push_str(&format!("\\x{code:02x}"));
                } else {
                    quoted.push_str(&format!("\\u{code:04x}"));
                }
            }
            c => quoted.push(c),
        }
        previous = Some(c);
    }
    quoted.push('"');
    quoted
}
