use regex::Regex;
use std::sync::OnceLock;

use super::TranscriptSegment;

fn text_element_regex() -> &'static Regex {
    static TEXT_ELEMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    TEXT_ELEMENT_REGEX.get_or_init(|| {
        Regex::new(r"(?s)<text\b([^>]*?)(?:/>|>(.*?)</text>)")
            .expect("Failed to compile timed text element regex")
    })
}

fn attribute_regex() -> &'static Regex {
    static ATTRIBUTE_REGEX: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTE_REGEX.get_or_init(|| {
        Regex::new(r#"(\w+)\s*=\s*"([^"]*)""#).expect("Failed to compile attribute regex")
    })
}

fn markup_regex() -> &'static Regex {
    static MARKUP_REGEX: OnceLock<Regex> = OnceLock::new();
    MARKUP_REGEX.get_or_init(|| Regex::new(r"<[^>]*>").expect("Failed to compile markup regex"))
}

/// Parse a YouTube timed text document into ordered segments.
///
/// Elements without a body are skipped. Missing or unparsable `start`/`dur`
/// attributes default to zero.
pub fn parse(document: &str) -> Vec<TranscriptSegment> {
    text_element_regex()
        .captures_iter(document)
        .filter_map(|caps| {
            let body = caps.get(2)?.as_str();
            if body.is_empty() {
                return None;
            }

            let (start, duration) = timing(caps.get(1).map_or("", |m| m.as_str()));
            Some(TranscriptSegment {
                text: clean_text(body),
                start,
                duration,
            })
        })
        .collect()
}

fn timing(attributes: &str) -> (f64, f64) {
    let mut start = 0.0;
    let mut duration = 0.0;

    for caps in attribute_regex().captures_iter(attributes) {
        let value = caps[2].parse::<f64>().unwrap_or(0.0);
        match &caps[1] {
            "start" => start = value,
            "dur" => duration = value,
            _ => {}
        }
    }

    (start, duration)
}

/// Decode the XML layer, then the HTML layer YouTube puts inside it, then drop markup
fn clean_text(body: &str) -> String {
    let xml_decoded = html_escape::decode_html_entities(body);
    let html_decoded = html_escape::decode_html_entities(&xml_decoded);
    markup_regex().replace_all(&html_decoded, "").into_owned()
}
