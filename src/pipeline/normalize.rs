//! Text cleanup applied before any pattern matching.
//!
//! Partner emails arrive with mixed line endings, reply quote markers,
//! non-breaking spaces and HTML entities. Everything downstream assumes
//! `\n` line endings and plain spaces.

use std::sync::LazyLock;

use regex::Regex;

static BR_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</p>|</tr>|</div>|</h\d>").unwrap());
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

/// Normalize line endings, strip reply quote markers and invisible characters.
pub fn normalize_text(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(strip_quote_marker)
        .map(|line| {
            line.chars()
                .filter_map(|c| match c {
                    '\u{00A0}' | '\u{202F}' | '\u{2007}' => Some(' '),
                    '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' => None,
                    c if c.is_control() && c != '\t' => None,
                    c => Some(c),
                })
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove leading `>` markers added by mail clients on replies/forwards.
fn strip_quote_marker(line: &str) -> &str {
    let mut rest = line;
    loop {
        let trimmed = rest.trim_start_matches([' ', '\t']);
        match trimmed.strip_prefix('>') {
            Some(after) => rest = after,
            None => return if rest.len() == line.len() { line } else { trimmed },
        }
    }
}

/// Lowercase and strip French diacritics.
pub fn fold_case_and_accents(text: &str) -> String {
    text.chars()
        .flat_map(|c| c.to_lowercase())
        .map(|c| match c {
            'à' | 'â' | 'ä' | 'á' | 'ã' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' | 'í' => 'i',
            'ô' | 'ö' | 'ó' => 'o',
            'ù' | 'û' | 'ü' | 'ú' => 'u',
            'ç' => 'c',
            'ÿ' => 'y',
            'ñ' => 'n',
            '\u{2019}' | '\u{2018}' | '`' | '´' => '\'',
            c => c,
        })
        .collect::<String>()
        .replace('œ', "oe")
        .replace('æ', "ae")
}

/// Canonical form of a field label: folded, single-spaced, no trailing colon.
pub fn fold_label(label: &str) -> String {
    let folded = fold_case_and_accents(label);
    let collapsed = collapse_whitespace(&folded);
    collapsed
        .trim_end_matches([':', ' ', '.', '*'])
        .trim_start_matches(['-', '*', '•', ' '])
        .to_string()
}

/// Collapse runs of whitespace to a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the HTML entities partners actually emit (named French accents + numeric).
pub fn decode_html_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            decode_entity(entity).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(entity: &str) -> Option<String> {
    if let Some(num) = entity.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(|c| c.to_string());
    }
    let decoded = match entity {
        "nbsp" => " ",
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "rsquo" | "lsquo" => "'",
        "eacute" => "é",
        "Eacute" => "É",
        "egrave" => "è",
        "Egrave" => "È",
        "ecirc" => "ê",
        "euml" => "ë",
        "agrave" => "à",
        "Agrave" => "À",
        "acirc" => "â",
        "ccedil" => "ç",
        "Ccedil" => "Ç",
        "icirc" => "î",
        "iuml" => "ï",
        "ocirc" => "ô",
        "ucirc" => "û",
        "ugrave" => "ù",
        "euro" => "€",
        _ => return None,
    };
    Some(decoded.to_string())
}

/// Strip tags from an HTML fragment, keeping line structure, and decode entities.
pub fn html_to_text(html: &str) -> String {
    let with_breaks = BR_TAG.replace_all(html, "\n");
    let stripped = ANY_TAG.replace_all(&with_breaks, "");
    normalize_text(&decode_html_entities(&stripped))
}

/// Clean a single captured HTML cell: tags removed, entities decoded, whitespace collapsed.
pub fn clean_html_cell(cell: &str) -> String {
    let stripped = ANY_TAG.replace_all(cell, " ");
    collapse_whitespace(&decode_html_entities(&stripped))
}
