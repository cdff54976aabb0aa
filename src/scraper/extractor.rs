//! Guest count extraction from the facility page markup

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Reading;

/// Visitor-number cell rendered by the page component (`SSD-4`, `SSD-12`, ...)
static COUNT_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<td[^>]*id=["']SSD-\d+_visitornumber["'][^>]*>\s*(\d+)\s*<"#)
        .expect("valid count id pattern")
});

static COUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Anzahl\s+G[äa]ste[^0-9]*(\d+)").expect("valid count pattern"));

static CAPACITY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:max\.?\s*)?(?:Kapazit[aä]t|von)\s*(\d+)").expect("valid capacity pattern")
});

static UID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(SSD-\d+)_visitornumber").expect("valid uid pattern"));

static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));

static WHITESPACE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Characters of visible text after the count searched for a capacity
const CAPACITY_WINDOW: usize = 100;

/// Outcome of the markup strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    Found(Reading),
    /// No count pattern matched; the caller falls back to the live channel
    NotFound,
}

/// Locate the guest count and optional capacity in the page content
pub fn extract(html: &str) -> Extraction {
    let text = visible_text(html);

    let (count, window) = if let Some(caps) = COUNT_ID_PATTERN.captures(html) {
        tracing::debug!("Matched visitor-number cell in markup");
        let Some(count) = parse_count(&caps[1]) else {
            return Extraction::NotFound;
        };
        let window = match text.find(&count.to_string()) {
            Some(start) => char_window(&text[start..]),
            None => text.clone(),
        };
        (count, window)
    } else if let Some(caps) = COUNT_PATTERN.captures(&text) {
        tracing::debug!("Matched guest count label in visible text");
        let Some(count) = parse_count(&caps[1]) else {
            return Extraction::NotFound;
        };
        let end = caps.get(0).map_or(0, |m| m.end());
        (count, char_window(&text[end..]))
    } else {
        return Extraction::NotFound;
    };

    let capacity = CAPACITY_PATTERN
        .captures(&window)
        .and_then(|caps| parse_count(&caps[1]));

    Extraction::Found(Reading { count, capacity })
}

/// Facility identifier (e.g. `SSD-4`) embedded in the markup
pub fn extract_uid(html: &str) -> Option<String> {
    UID_PATTERN.captures(html).map(|caps| caps[1].to_string())
}

/// Tag-free, whitespace-collapsed, entity-decoded text of the page
pub fn visible_text(html: &str) -> String {
    let text = TAG_PATTERN.replace_all(html, " ");
    let text = WHITESPACE_PATTERN.replace_all(&text, " ");
    decode_entities(&text).trim().to_string()
}

fn parse_count(digits: &str) -> Option<u32> {
    digits.parse().ok()
}

fn char_window(text: &str) -> String {
    text.chars().take(CAPACITY_WINDOW).collect()
}

/// Decode the entities the page actually uses: named umlauts, markup
/// escapes and numeric references.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "auml" => 'ä',
        "ouml" => 'ö',
        "uuml" => 'ü',
        "Auml" => 'Ä',
        "Ouml" => 'Ö',
        "Uuml" => 'Ü',
        "szlig" => 'ß',
        _ => return None,
    };
    Some(c)
}
