use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n\t]+").unwrap());
static MULTISPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());
static BREAK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</p>|<br ?/?>|</br>").unwrap());
static SHARE_FRAGMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#..*$").unwrap());
static UTM_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\?utm_source.*$").unwrap());

/// HTML entities worth decoding before tokenization: typographic and
/// escaped quotes, non-breaking spaces, and escaped ampersands (the
/// `&amp;` forms keep their trailing space so `&amp;lt;` stays intact).
const HTML_ENTITIES: [(&str, &str); 11] = [
    ("&#8216;", "'"),
    ("&#8217;", "'"),
    ("&#8220;", "\""),
    ("&#8221;", "\""),
    ("&nbsp;", " "),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&#34;", "\""),
    ("&#39;", "'"),
    ("&amp;amp; ", "& "),
    ("&amp; ", "& "),
];

/// Normalize an article body for model building: strip single quotes
/// (a straight quote in the raw text glues Greek tokens together when
/// splitting), turn paragraph and `<br>` tags into breaks, decode the
/// common HTML entities, then collapse whitespace, trim, and uppercase.
/// Uppercase rather than lowercase because some languages (Greek among
/// them) use distinct lowercase final forms that uppercase folds away.
pub fn clean_body(body: &str) -> String {
    if body.is_empty() {
        return String::new();
    }

    // Quote stripping runs before entity decoding, so apostrophes that
    // arrive encoded survive as real text.
    let mut text = body.replace('\'', "");
    text = BREAK_TAG_RE.replace_all(&text, "\n").into_owned();
    for (entity, plain) in HTML_ENTITIES {
        text = text.replace(entity, plain);
    }

    let flat = WHITESPACE_RE.replace_all(&text, " ");
    let squeezed = MULTISPACE_RE.replace_all(&flat, " ");
    squeezed.trim().to_uppercase()
}

/// Clean an article link pulled from a tweet: drop share-id fragments
/// (e.g. `/#.WpAW30E8tRc.twitter`) and `utm_source` tracking tails, then
/// reject anything that is not a real article path (root-domain links,
/// unparsable urls). Returns `None` for rejected links.
pub fn clean_link(raw: &str) -> Option<String> {
    let link = SHARE_FRAGMENT_RE.replace(raw, "");
    let link = UTM_TAIL_RE.replace(&link, "").to_string();

    let parsed = url::Url::parse(&link).ok()?;
    if parsed.path().len() <= 1 {
        return None;
    }

    Some(link)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_body_collapses_breaks_and_uppercases() {
        let body = "first line\n\tsecond line\r\nthird   line";
        assert_eq!(clean_body(body), "FIRST LINE SECOND LINE THIRD LINE");
    }

    #[test]
    fn clean_body_trims() {
        assert_eq!(clean_body("  hello \n"), "HELLO");
    }

    #[test]
    fn clean_body_empty() {
        assert_eq!(clean_body(""), "");
    }

    #[test]
    fn clean_body_strips_single_quotes() {
        assert_eq!(clean_body("δεν 'σπαει' το κειμενο"), "ΔΕΝ ΣΠΑΕΙ ΤΟ ΚΕΙΜΕΝΟ");
    }

    #[test]
    fn clean_body_breaks_paragraph_and_br_tags() {
        let body = "first</p>second<br>third<br/>fourth<br />fifth</br>sixth";
        assert_eq!(clean_body(body), "FIRST SECOND THIRD FOURTH FIFTH SIXTH");
    }

    #[test]
    fn clean_body_decodes_common_entities() {
        assert_eq!(clean_body("&#8220;quoted&#8221;&nbsp;text"), "\"QUOTED\" TEXT");
        assert_eq!(clean_body("bread &amp; butter"), "BREAD & BUTTER");
        assert_eq!(clean_body("A &amp;amp; B"), "A & B");
    }

    #[test]
    fn clean_body_keeps_encoded_apostrophes() {
        // A literal quote is stripped, an encoded one decodes and stays.
        assert_eq!(clean_body("it's &#8217;fine&#8217;"), "ITS 'FINE'");
    }

    #[test]
    fn clean_link_strips_share_fragment() {
        let link = clean_link("https://example.com/story/1/#.WpAW30E8tRc.twitter").unwrap();
        assert_eq!(link, "https://example.com/story/1/");
    }

    #[test]
    fn clean_link_strips_utm_tail() {
        let link = clean_link("https://example.com/story/1?utm_source=twitter&utm_medium=social")
            .unwrap();
        assert_eq!(link, "https://example.com/story/1");
    }

    #[test]
    fn clean_link_rejects_root_domain() {
        assert!(clean_link("https://example.com/").is_none());
        assert!(clean_link("https://example.com").is_none());
    }

    #[test]
    fn clean_link_rejects_unparsable() {
        assert!(clean_link("not a url").is_none());
    }

    #[test]
    fn clean_link_keeps_plain_article_urls() {
        let link = clean_link("https://example.com/news/2019/03/01/story").unwrap();
        assert_eq!(link, "https://example.com/news/2019/03/01/story");
    }
}
