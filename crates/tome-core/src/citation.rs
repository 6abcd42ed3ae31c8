//! Strips inline retrieval citation markers (e.g. `【4:0†source】`) from generated answers.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// `【n:m†label】` as emitted by the file-search tool, plus the `⟦n:m†label⟧` form.
static CITATION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"【\d+:\d+†[^】]*】|⟦\d+:\d+†[^⟧]*⟧").expect("citation marker pattern is valid")
});

/// Remove every citation marker, leaving all other text (whitespace included) untouched.
/// Idempotent; text without markers is returned borrowed.
///
/// Removing an inner marker can splice its neighbours into a new one, so passes repeat until
/// no marker is left.
pub fn strip_citations(text: &str) -> Cow<'_, str> {
    let mut out = match CITATION_MARKER.replace_all(text, "") {
        Cow::Borrowed(b) => return Cow::Borrowed(b),
        Cow::Owned(o) => o,
    };
    while CITATION_MARKER.is_match(&out) {
        out = CITATION_MARKER.replace_all(&out, "").into_owned();
    }
    Cow::Owned(out)
}

/// True if `text` carries at least one marker.
pub fn has_citations(text: &str) -> bool {
    CITATION_MARKER.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_unchanged() {
        let text = "Risk is the chance of loss.\n  Diversify.  ";
        assert!(matches!(strip_citations(text), Cow::Borrowed(_)));
        assert_eq!(strip_citations(text), text);
        assert_eq!(strip_citations(""), "");
    }

    #[test]
    fn removes_single_marker_only() {
        let text = "Risk is managed, not avoided【4:0†source】.";
        assert_eq!(strip_citations(text), "Risk is managed, not avoided.");
    }

    #[test]
    fn removes_adjacent_and_many_markers() {
        let text = "A⟦4:0†source⟧⟦4:1†book.pdf⟧ and B 【12:3†notes】 end";
        assert_eq!(strip_citations(text), "A and B  end");
        assert!(!has_citations(&strip_citations(text)));
    }

    #[test]
    fn stripping_is_idempotent() {
        let text = "One【1:2†x】 two ⟦3:4†y⟧ three";
        let once = strip_citations(text).into_owned();
        let twice = strip_citations(&once).into_owned();
        assert_eq!(once, twice);
        assert_eq!(once, "One two  three");
    }

    #[test]
    fn nested_markers_collapse_in_one_call() {
        let text = "x⟦1:⟦2:3†y⟧2†z⟧w";
        let once = strip_citations(text).into_owned();
        assert_eq!(once, "xw");
        assert_eq!(strip_citations(&once), once);

        let text = "a【1:【2:3†i】4†o】b";
        assert_eq!(strip_citations(text), "ab");
    }

    #[test]
    fn malformed_markers_are_left_alone() {
        let text = "【a:0†x】 ⟦4-0†x⟧ 【4:0 source】 [4:0†x]";
        assert_eq!(strip_citations(text), text);
    }
}
