use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder strings upstream sites use in place of a missing value.
pub const PLACEHOLDERS: [&str; 6] = ["无", "未知", "N/A", "暂无", "未上榜", "-"];

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static BLOCK_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</?p>|<br\s*/?>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static READ_MORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{3,}全文$").unwrap());

/// Trims a value and maps blanks and [`PLACEHOLDERS`] to `None`.
pub fn present(value: impl AsRef<str>) -> Option<String> {
    let value = value.as_ref().trim();
    if value.is_empty() || PLACEHOLDERS.contains(&value) {
        None
    } else {
        Some(value.to_string())
    }
}

/// Trims a value and maps blanks to `None`. Placeholders are kept, for
/// fields such as titles where "无" can be the real value.
pub fn non_blank(value: impl AsRef<str>) -> Option<String> {
    let value = value.as_ref().trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Like [`present`], but also treats `"0"` as missing. Used for scores and
/// rating counts, where sources print zero for "never rated".
pub fn present_count(value: impl AsRef<str>) -> Option<String> {
    present(value).filter(|value| value.parse::<f64>().map_or(true, |n| n != 0.0))
}

/// Trims every tag and drops blank or placeholder entries, keeping order.
pub fn present_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter().filter_map(present).collect()
}

pub fn strip_tags(text: &str) -> String {
    TAG.replace_all(text, "").into_owned()
}

pub fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Reduces an HTML fragment to a single line of text.
///
/// Tags are removed, whitespace runs collapse to one space and a trailing
/// "...全文" (read-more link) is shortened to "...". Returns `None` only
/// when the result is blank.
pub fn fragment_text(html: &str) -> Option<String> {
    let text = decode_entities(&strip_tags(html));
    let text = WHITESPACE.replace_all(&text, " ");
    non_blank(READ_MORE.replace(text.trim(), "..."))
}

/// [`fragment_text`] with placeholders mapped to `None`.
pub fn clean_fragment(html: &str) -> Option<String> {
    fragment_text(html).and_then(present)
}

/// Formats a synopsis for display.
///
/// Paragraph and line-break tags become newlines, other markup is removed,
/// blank lines are dropped and every line gets a full-width indent.
pub fn reflow_synopsis(text: &str) -> String {
    let text = BLOCK_BREAK.replace_all(text, "\n");
    let text = decode_entities(&strip_tags(&text));
    let lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();

    if lines.is_empty() {
        return String::new();
    }
    format!("\u{3000}\u{3000}{}", lines.join("\n\u{3000}\u{3000}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_normalizes_each_placeholder() {
        for placeholder in PLACEHOLDERS {
            assert_eq!(present(placeholder), None, "{placeholder}");
        }
        assert_eq!(present("   "), None);
        assert_eq!(present(" 连载中 "), Some("连载中".to_string()));
    }

    #[test]
    fn test_present_count_drops_zero() {
        assert_eq!(present_count("0"), None);
        assert_eq!(present_count("0.0"), None);
        assert_eq!(present_count("暂无"), None);
        assert_eq!(present_count("8.5"), Some("8.5".to_string()));
        assert_eq!(present_count("1.2万"), Some("1.2万".to_string()));
    }

    #[test]
    fn test_present_tags_keeps_order() {
        assert_eq!(present_tags(["b", " ", "无", "a"]), vec!["b", "a"]);
    }

    #[test]
    fn test_clean_fragment() {
        assert_eq!(
            clean_fragment("<p>Hello\n   <b>world</b></p>").as_deref(),
            Some("Hello world")
        );
        assert_eq!(
            clean_fragment("A great read......全文").as_deref(),
            Some("A great read...")
        );
        assert_eq!(clean_fragment("<span></span>"), None);
        assert_eq!(clean_fragment("无"), None);
    }

    #[test]
    fn test_fragment_text_keeps_placeholder_words() {
        assert_eq!(fragment_text("<b> 无 </b>").as_deref(), Some("无"));
        assert_eq!(fragment_text("<i> </i>"), None);
        assert_eq!(non_blank(" - ").as_deref(), Some("-"));
        assert_eq!(non_blank("  "), None);
    }

    #[test]
    fn test_reflow_synopsis() {
        let raw = "<p>First line</p><p></p>Second&nbsp;line<br/>  third  ";
        assert_eq!(
            reflow_synopsis(raw),
            "\u{3000}\u{3000}First line\n\u{3000}\u{3000}Second line\n\u{3000}\u{3000}third"
        );
        assert_eq!(reflow_synopsis("<br>"), "");
    }
}
