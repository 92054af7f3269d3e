//! Pattern library: every provider- and format-specific regex in one place.
//!
//! Signal patterns run against folded text (lowercase, accents stripped,
//! typographic apostrophes replaced), so they are written in that form.

use std::sync::LazyLock;

use regex::Regex;

use super::extraction::fields::FieldKey;

/// A named signal pattern used by the provider classifier.
pub struct SignalPattern {
    pub name: &'static str,
    pub target: SignalTarget,
    pub regex: Regex,
}

/// Which part of the message a signal inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalTarget {
    Body,
    Subject,
}

fn signal(name: &'static str, target: SignalTarget, pattern: &str) -> SignalPattern {
    SignalPattern {
        name,
        target,
        regex: Regex::new(pattern).unwrap(),
    }
}

// ──────────────────────────────────────────────
// AssurProspect
// ──────────────────────────────────────────────

/// Start-of-lead marker; also the block separator for bundled messages.
/// Matches raw HTML too, where the apostrophe is often an entity.
pub static ASSURPROSPECT_TRANSMISSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)transmission(?:\s|&nbsp;)+d(?:['\u{2019}]|&rsquo;|&apos;|&#0*39;|&#0*8217;|&#x0*27;|&#x0*2019;)une(?:\s|&nbsp;)+(?:fiche|demande)",
    )
    .unwrap()
});

/// Footer lines after which nothing belongs to the lead.
pub static ASSURPROSPECT_FOOTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^\s*(?:(?:bien )?cordialement[,.!]?|l['\u{2019}][ée]quipe assurprospect.*|pour vous d[ée]sinscrire.*|--)\s*$",
    )
    .unwrap()
});

/// `Label : value` line of the text grammar.
pub static LABEL_VALUE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^:\t]{1,80}?)\s*:\s*(.*?)\s*$").unwrap());

/// HTML grammar: section headers and `<b>Label :</b> value` pairs, in document order.
///
/// A value runs through inline tags (`<span>`, `<a>`, `<i>`, `<font>` ...) and
/// stops at the next bold label, line break, paragraph or header.
pub static ASSURPROSPECT_HTML_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<h[1-6][^>]*>(?P<header>.*?)</h[1-6]>|<(?:b|strong)\b[^>]*>(?P<label>.*?)</(?:b|strong)>(?P<value>(?:[^<]|</?(?:span|a|i|em|u|font|small|sup|sub)\b[^>]*>)*)",
    )
    .unwrap()
});

/// All eight must be present for an AssurProspect message to be a lead.
pub const ASSURPROSPECT_REQUIRED: &[FieldKey] = &[
    FieldKey::Civilite,
    FieldKey::Nom,
    FieldKey::Prenom,
    FieldKey::Telephone,
    FieldKey::Email,
    FieldKey::CodePostal,
    FieldKey::DateNaissance,
    FieldKey::DateEffet,
];

pub static ASSURPROSPECT_SIGNALS: LazyLock<Vec<SignalPattern>> = LazyLock::new(|| {
    use SignalTarget::*;
    vec![
        signal("domain:assurprospect", Body, r"assurprospect\.(?:fr|com)"),
        signal("signature:transmission", Body, r"transmission d'une (?:fiche|demande)"),
        signal("structure:souscripteur", Body, r"(?m)^\s*souscripteur\s*:?\s*$"),
        signal("structure:besoin", Body, r"(?m)^\s*besoins?\s*:?\s*$"),
        signal("subject:fiche", Subject, r"fiche (?:prospect|lead)|assurprospect"),
        signal(
            "sender:assurprospect",
            Body,
            r"(?m)^\s*(?:de|from|expediteur)\s*:.*@assurprospect\.",
        ),
    ]
});

// ──────────────────────────────────────────────
// Assurlead
// ──────────────────────────────────────────────

/// HTML table row with a label cell and a value cell.
pub static ASSURLEAD_TABLE_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<tr[^>]*>\s*<t[dh][^>]*>(?P<label>.*?)</t[dh]>\s*<t[dh][^>]*>(?P<value>.*?)</t[dh]>",
    )
    .unwrap()
});

pub static ASSURLEAD_TABLE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<table\b").unwrap());

pub static ASSURLEAD_SIGNATURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bassurlead\b").unwrap());

/// `Field<TAB>Value` line of the tab grammar.
pub static TAB_FIELD_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^\t]+?)\t+(.*?)\s*$").unwrap());

/// All seven must be present for an Assurlead message to be a lead.
pub const ASSURLEAD_REQUIRED: &[FieldKey] = &[
    FieldKey::Nom,
    FieldKey::Prenom,
    FieldKey::DateNaissance,
    FieldKey::CodePostal,
    FieldKey::Telephone,
    FieldKey::Email,
    FieldKey::RegimeSocial,
];

pub static ASSURLEAD_SIGNALS: LazyLock<Vec<SignalPattern>> = LazyLock::new(|| {
    use SignalTarget::*;
    vec![
        signal("domain:assurlead", Body, r"assurlead\.(?:fr|com|net)"),
        signal(
            "signature:assurlead",
            Body,
            r"(?:transmise?|propose[e]?|fourni[e]?) par assurlead|l'equipe assurlead",
        ),
        signal("structure:tab-fields", Body, r"(?m)^\s*(?:nom|prenom)\t+\S"),
        signal(
            "subject:assurlead",
            Subject,
            r"assurlead|demande de devis (?:sante|mutuelle)",
        ),
        signal(
            "sender:assurlead",
            Body,
            r"(?m)^\s*(?:de|from|expediteur)\s*:.*@assurlead\.",
        ),
    ]
});

// ──────────────────────────────────────────────
// Shared
// ──────────────────────────────────────────────

/// Presence of any of these means the body is HTML.
pub static HTML_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*(?:html|body|table|div|p|br|td|tr|h[1-6]|span|b|strong)\b[^>]*>").unwrap()
});

/// Forward prefixes in subjects (French and English clients).
pub static FORWARD_SUBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:(?:re|r[ée]f)\s*:\s*)*(?:tr|fwd?|transf[ée]r[ée])\s*:").unwrap());

/// Header lines a mail client inserts above a forwarded body.
pub static FORWARD_HEADER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:-{2,}.*(?:message|forwarded|transf).*-*|(?:de|from|envoy[ée]|sent|date|[àa]|to|cc|objet|subject)\s*:.*)$",
    )
    .unwrap()
});

/// True when the body looks like HTML.
pub fn is_html(text: &str) -> bool {
    HTML_MARKERS.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_signal_patterns_compile() {
        assert_eq!(ASSURPROSPECT_SIGNALS.len(), 6);
        assert_eq!(ASSURLEAD_SIGNALS.len(), 5);
    }

    #[test]
    fn required_sets_have_expected_sizes() {
        assert_eq!(ASSURPROSPECT_REQUIRED.len(), 8);
        assert_eq!(ASSURLEAD_REQUIRED.len(), 7);
    }

    #[test]
    fn transmission_marker_matches_both_apostrophes() {
        assert!(ASSURPROSPECT_TRANSMISSION.is_match("Transmission d'une fiche"));
        assert!(ASSURPROSPECT_TRANSMISSION.is_match("TRANSMISSION D\u{2019}UNE FICHE"));
        assert!(!ASSURPROSPECT_TRANSMISSION.is_match("Transmission terminée"));
    }

    #[test]
    fn footer_lines() {
        assert!(ASSURPROSPECT_FOOTER.is_match("Nom : X\nCordialement,\nL'équipe"));
        assert!(ASSURPROSPECT_FOOTER.is_match("--"));
        assert!(!ASSURPROSPECT_FOOTER.is_match("Nom : Cordialement"));
    }

    #[test]
    fn label_value_line_splits_on_first_colon() {
        let caps = LABEL_VALUE_LINE.captures("Email : jean@example.com").unwrap();
        assert_eq!(&caps[1], "Email");
        assert_eq!(&caps[2], "jean@example.com");
    }

    #[test]
    fn tab_line_splits() {
        let caps = TAB_FIELD_LINE.captures("regime social\tTravailleurs Non Salariés").unwrap();
        assert_eq!(&caps[1], "regime social");
        assert_eq!(&caps[2], "Travailleurs Non Salariés");
    }

    #[test]
    fn html_sniffing() {
        assert!(is_html("<p>Nom</p>"));
        assert!(is_html("<TABLE border=1>"));
        assert!(!is_html("Nom : DUPONT\nPrix < 100 > 50"));
    }

    #[test]
    fn forward_subjects() {
        assert!(FORWARD_SUBJECT.is_match("TR: Nouveau lead"));
        assert!(FORWARD_SUBJECT.is_match("Fwd: lead"));
        assert!(FORWARD_SUBJECT.is_match("RE: TR: lead"));
        assert!(!FORWARD_SUBJECT.is_match("Nouveau lead"));
    }

    #[test]
    fn forward_header_lines() {
        assert!(FORWARD_HEADER_LINE.is_match("---------- Forwarded message ---------"));
        assert!(FORWARD_HEADER_LINE.is_match("De : contact@assurprospect.fr"));
        assert!(FORWARD_HEADER_LINE.is_match("Objet : Nouvelle fiche"));
        assert!(!FORWARD_HEADER_LINE.is_match("Nom : DUPONT"));
    }

    #[test]
    fn html_token_ignores_body_and_br() {
        let html = "<body><p><b>Nom :</b> DUPONT<br><b>Prénom :</b> Jean</p></body>";
        let labels: Vec<_> = ASSURPROSPECT_HTML_TOKEN
            .captures_iter(html)
            .filter_map(|c| c.name("label").map(|m| m.as_str().to_string()))
            .collect();
        assert_eq!(labels, vec!["Nom :", "Prénom :"]);
    }

    #[test]
    fn transmission_marker_accepts_encoded_apostrophes() {
        for text in [
            "Transmission d'une fiche prospect",
            "Transmission d\u{2019}une fiche prospect",
            "Transmission d&rsquo;une fiche prospect",
            "Transmission d&#39;une fiche prospect",
            "Transmission&nbsp;d&#x27;une demande",
        ] {
            assert!(ASSURPROSPECT_TRANSMISSION.is_match(text), "{text}");
        }
        assert!(!ASSURPROSPECT_TRANSMISSION.is_match("Transmission dune fiche"));
    }

    #[test]
    fn html_token_value_spans_inline_tags() {
        let html = "<p><b>Nom :</b> <span class=\"v\">MARTIN</span><br>\
            <b>Email :</b> <a href=\"mailto:s@x.fr\">s@x.fr</a></p>";
        let pairs: Vec<_> = ASSURPROSPECT_HTML_TOKEN
            .captures_iter(html)
            .map(|c| (c["label"].to_string(), c["value"].to_string()))
            .collect();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].1, " <span class=\"v\">MARTIN</span>");
        assert!(pairs[1].1.contains("s@x.fr</a>"));
    }

    #[test]
    fn table_row_captures_cells() {
        let html = "<tr><td>Nom</td><td><b>DUPONT</b></td></tr>";
        let caps = ASSURLEAD_TABLE_ROW.captures(html).unwrap();
        assert_eq!(&caps["label"], "Nom");
        assert_eq!(&caps["value"], "<b>DUPONT</b>");
    }
}
