use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Width of a string in terminal columns (CJK and emoji count double).
///
/// ```
/// use episodic::util::display_width;
///
/// assert_eq!(display_width("Pilot"), 5);
/// assert_eq!(display_width("第一話"), 6);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to at most `max_width` columns, ending in "..." when it was cut.
///
/// Widths of 3 or less have no room for the ellipsis, so the text is simply
/// clipped. Never splits a character.
///
/// ```
/// use episodic::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Pilot", 10), "Pilot");
/// assert_eq!(truncate_to_width("Episode 1: Beginning", 12), "Episode 1...");
/// assert_eq!(truncate_to_width("Pilot", 2), "Pi");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let with_ellipsis = max_width > ELLIPSIS_WIDTH;
    let budget = if with_ellipsis {
        max_width - ELLIPSIS_WIDTH
    } else {
        max_width
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    if with_ellipsis {
        Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
    } else {
        Cow::Owned(s[..end].to_string())
    }
}

/// Truncate, then right-pad with spaces to exactly `width` columns.
///
/// A wide character that would straddle the limit is dropped, so the result
/// can be one column narrower before padding.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let cut = truncate_to_width(s, width);
    let fill = width.saturating_sub(display_width(&cut));
    format!("{}{}", cut, " ".repeat(fill))
}

/// Drop control characters from user-entered text before it is printed.
///
/// Titles are single-line, so newlines and tabs go too.
pub fn sanitize_title(s: &str) -> Cow<'_, str> {
    if !s.chars().any(char::is_control) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|c| !c.is_control()).collect())
}
