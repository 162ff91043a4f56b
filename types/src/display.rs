//! Scrubbing of untrusted text before it reaches the terminal.
//!
//! Model output and upstream error bodies can carry escape sequences that
//! move the cursor, rewrite the clipboard or retitle the window. Everything
//! shown in the dashboard that did not originate from the user goes through
//! [`sanitize_display_text`].

use std::borrow::Cow;
use std::iter::Peekable;

const ESC: char = '\x1b';
const BEL: char = '\x07';
const C1_CSI: char = '\u{009b}';

/// Strip ANSI escape sequences and control characters, keeping `\n` and `\t`.
///
/// Clean input is returned borrowed.
///
/// ```
/// use groflow_types::sanitize_display_text;
///
/// assert_eq!(sanitize_display_text("plain"), "plain");
/// assert_eq!(sanitize_display_text("a\x1b[2Jb"), "ab");
/// ```
#[must_use]
pub fn sanitize_display_text(input: &str) -> Cow<'_, str> {
    if !input.chars().any(is_unsafe) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ESC => skip_escape(&mut chars),
            C1_CSI => skip_csi(&mut chars),
            '\n' | '\t' => out.push(c),
            c if is_unsafe(c) => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn is_unsafe(c: char) -> bool {
    (c.is_control() && c != '\n' && c != '\t') || c == '\x7f'
}

fn skip_escape<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    match chars.peek().copied() {
        Some('[') => {
            chars.next();
            skip_csi(chars);
        }
        Some(']' | 'P' | '^' | '_') => {
            chars.next();
            // OSC ends at BEL; OSC, DCS, PM and APC all end at ESC '\'.
            while let Some(c) = chars.next() {
                if c == BEL {
                    return;
                }
                if c == ESC && chars.peek() == Some(&'\\') {
                    chars.next();
                    return;
                }
            }
        }
        Some('(' | ')' | '*' | '+' | '#' | ' ') => {
            chars.next();
            chars.next();
        }
        Some(_) => {
            chars.next();
        }
        None => {}
    }
}

fn skip_csi<I: Iterator<Item = char>>(chars: &mut Peekable<I>) {
    while let Some(&c) = chars.peek() {
        chars.next();
        if ('\x40'..='\x7e').contains(&c) {
            return;
        }
        if !('\x20'..='\x3f').contains(&c) {
            return;
        }
    }
}
