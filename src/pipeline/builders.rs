//! Builders: field map → typed sub-objects, with French-locale normalization.
//!
//! Builders never fail. Values that cannot be normalized are kept as found
//! (dates, phones) or dropped (emails, civilities) and reported as warnings.

use std::sync::LazyLock;

use regex::Regex;

use super::dates::normalize_lead_date;
use super::extraction::fields::{FieldKey, FieldMap, RawChild};
use super::normalize::{collapse_whitespace, fold_case_and_accents};
use crate::models::enums::{Civilite, Section};
use crate::models::lead::{
    ExtractedBesoin, ExtractedChild, ExtractedContact, ExtractedPerson, NeedScores,
};

static EMAIL_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}$").unwrap());
static POSTAL_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{5})\b").unwrap());

// ═══════════════════════════════════════════
// Field normalizers
// ═══════════════════════════════════════════

/// Map civility free text to `Monsieur` / `Madame`.
pub fn normalize_civilite(raw: &str) -> Option<Civilite> {
    let folded = fold_case_and_accents(raw.trim()).replace('.', "");
    match folded.trim() {
        "m" | "mr" | "monsieur" | "homme" | "h" | "masculin" => Some(Civilite::Monsieur),
        "mme" | "madame" | "mlle" | "mademoiselle" | "femme" | "f" | "feminin" => {
            Some(Civilite::Madame)
        }
        _ => None,
    }
}

/// French phone number as ten digits (`0612345678`).
///
/// Returns `Err` with the cleaned input when it is not a French number,
/// so callers can keep it and warn.
pub fn normalize_phone(raw: &str) -> Result<String, String> {
    let digits: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    let national = if let Some(rest) = digits.strip_prefix("+33") {
        format!("0{}", rest.trim_start_matches('0'))
    } else if let Some(rest) = digits.strip_prefix("0033") {
        format!("0{}", rest.trim_start_matches('0'))
    } else if digits.len() == 9 && !digits.starts_with('0') {
        format!("0{digits}")
    } else {
        digits.clone()
    };

    if national.len() == 10 && national.starts_with('0') && national.chars().all(|c| c.is_ascii_digit()) {
        Ok(national)
    } else {
        Err(collapse_whitespace(raw))
    }
}

/// Lowercased, `mailto:`-stripped email; `None` when syntactically invalid.
pub fn normalize_email(raw: &str) -> Option<String> {
    let lower = raw.trim().to_lowercase();
    let cleaned = lower
        .strip_prefix("mailto:")
        .unwrap_or(&lower)
        .trim_matches(|c: char| c == '<' || c == '>' || c.is_whitespace())
        .to_string();
    EMAIL_SYNTAX.is_match(&cleaned).then_some(cleaned)
}

/// Five-digit postal code found in the value, if any.
pub fn normalize_postal_code(raw: &str) -> Option<String> {
    POSTAL_CODE
        .captures(raw)
        .map(|caps| caps[1].to_string())
}

/// Canonical social-regime label.
///
/// Order matters: "non salarié" must be tested before "salarié".
pub fn normalize_regime(raw: &str) -> String {
    let folded = fold_case_and_accents(raw);
    let canonical = if folded.contains("alsace") || folded.contains("moselle") {
        "Alsace-Moselle"
    } else if folded.contains("non salari")
        || folded.contains("tns")
        || folded.contains("independant")
    {
        "TNS"
    } else if folded.contains("exploitant") || folded.contains("amexa") {
        "Exploitant agricole"
    } else if folded.contains("agricole") || folded.contains("msa") {
        "Salarié agricole"
    } else if folded.contains("general")
        || folded.contains("salari")
        || folded.contains("securite sociale")
        || folded.contains("cpam")
    {
        "Général"
    } else {
        return collapse_whitespace(raw);
    };
    canonical.to_string()
}

/// Oui/Non style answer.
pub fn parse_yes_no(raw: &str) -> Option<bool> {
    match fold_case_and_accents(raw.trim()).as_str() {
        "oui" | "o" | "yes" | "y" | "1" | "true" | "vrai" => Some(true),
        "non" | "n" | "no" | "0" | "false" | "faux" => Some(false),
        _ => None,
    }
}

/// Need level 1..=4, from digits ("3", "3/4") or words ("Fort").
pub fn parse_need_score(raw: &str) -> Option<u8> {
    let folded = fold_case_and_accents(raw.trim());
    if let Some(start) = folded.find(|c: char| c.is_ascii_digit()) {
        let digits: String = folded[start..].chars().take_while(char::is_ascii_digit).collect();
        let n: u32 = digits.parse().ok()?;
        return (1..=4).contains(&n).then_some(n as u8);
    }
    match folded.as_str() {
        "minimum" | "faible" | "bas" => Some(1),
        "moyen" | "modere" | "standard" => Some(2),
        "fort" | "eleve" | "renforce" => Some(3),
        "maximum" | "tres fort" | "tres eleve" => Some(4),
        _ => None,
    }
}

fn parse_count(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    if !digits.is_empty() {
        return digits.parse().ok();
    }
    match fold_case_and_accents(raw.trim()).as_str() {
        "aucun" | "non" | "zero" => Some(0),
        _ => None,
    }
}

fn clean_name(raw: &str) -> String {
    collapse_whitespace(raw)
}

fn normalize_date_or_keep(raw: &str, field: &str, warnings: &mut Vec<String>) -> String {
    match normalize_lead_date(raw) {
        Some(d) => d,
        None => {
            warnings.push(format!("Unparseable {field}: '{}'", raw.trim()));
            raw.trim().to_string()
        }
    }
}

// ═══════════════════════════════════════════
// Sub-object builders
// ═══════════════════════════════════════════

/// Contact block of `section`; `None` when the section has no contact fields.
pub fn build_contact(
    fields: &FieldMap,
    section: Section,
    warnings: &mut Vec<String>,
) -> Option<ExtractedContact> {
    let get = |key| fields.get(section, key);

    let civilite = get(FieldKey::Civilite).and_then(|raw| {
        let c = normalize_civilite(raw);
        if c.is_none() {
            warnings.push(format!("Unrecognized civility: '{raw}'"));
        }
        c
    });

    let telephone = get(FieldKey::Telephone).map(|raw| match normalize_phone(raw) {
        Ok(phone) => phone,
        Err(kept) => {
            warnings.push(format!("Non-French phone number kept as is: '{kept}'"));
            kept
        }
    });

    let email = get(FieldKey::Email).and_then(|raw| {
        let e = normalize_email(raw);
        if e.is_none() {
            warnings.push(format!("Invalid email dropped: '{}'", raw.trim()));
        }
        e
    });

    let code_postal = get(FieldKey::CodePostal).map(|raw| {
        normalize_postal_code(raw).unwrap_or_else(|| {
            warnings.push(format!("Unusual postal code: '{}'", raw.trim()));
            raw.trim().to_string()
        })
    });

    let contact = ExtractedContact {
        civilite,
        nom: get(FieldKey::Nom).map(clean_name),
        prenom: get(FieldKey::Prenom).map(clean_name),
        adresse: get(FieldKey::Adresse).map(collapse_whitespace),
        code_postal,
        ville: get(FieldKey::Ville).map(collapse_whitespace),
        telephone,
        email,
    };

    (contact != ExtractedContact::default()).then_some(contact)
}

/// Subscriber or spouse from `section`; `None` when nothing was captured.
pub fn build_person(
    fields: &FieldMap,
    section: Section,
    warnings: &mut Vec<String>,
) -> Option<ExtractedPerson> {
    let get = |key| fields.get(section, key);

    let person = ExtractedPerson {
        civilite: get(FieldKey::Civilite).and_then(normalize_civilite),
        nom: get(FieldKey::Nom).map(clean_name),
        prenom: get(FieldKey::Prenom).map(clean_name),
        date_naissance: get(FieldKey::DateNaissance).map(|raw| {
            normalize_date_or_keep(raw, &format!("{section} birth date"), warnings)
        }),
        profession: get(FieldKey::Profession).map(collapse_whitespace),
        regime_social: get(FieldKey::RegimeSocial).map(normalize_regime),
        nombre_enfants: get(FieldKey::NombreEnfants).and_then(parse_count),
    };

    (person != ExtractedPerson::default()).then_some(person)
}

/// Children from explicit per-child dates, ordered by ordinal then source order.
pub fn build_children(raw: &[RawChild], warnings: &mut Vec<String>) -> Option<Vec<ExtractedChild>> {
    let mut children: Vec<ExtractedChild> = raw
        .iter()
        .map(|c| ExtractedChild {
            date_naissance: normalize_date_or_keep(&c.date_naissance, "child birth date", warnings),
            ordre: c.ordinal,
        })
        .collect();

    children.sort_by_key(|c| c.ordre.unwrap_or(u32::MAX));

    (!children.is_empty()).then_some(children)
}

/// Up to two children synthesized from a min/max birth-date pair.
///
/// Ordinal 1 carries the minimum date, ordinal 2 the maximum when distinct.
pub fn synthesize_children_from_bounds(
    min: Option<&str>,
    max: Option<&str>,
    warnings: &mut Vec<String>,
) -> Option<Vec<ExtractedChild>> {
    let min = min.map(|d| normalize_date_or_keep(d, "child min birth date", warnings));
    let max = max.map(|d| normalize_date_or_keep(d, "child max birth date", warnings));

    let children = match (min, max) {
        (Some(min), Some(max)) if min == max => vec![(1, min)],
        (Some(min), Some(max)) => vec![(1, min), (2, max)],
        (Some(only), None) | (None, Some(only)) => vec![(1, only)],
        (None, None) => return None,
    };

    Some(
        children
            .into_iter()
            .map(|(ordre, date_naissance)| ExtractedChild {
                date_naissance,
                ordre: Some(ordre),
            })
            .collect(),
    )
}

/// Coverage need block; `None` when the need section is empty.
pub fn build_besoin(fields: &FieldMap, warnings: &mut Vec<String>) -> Option<ExtractedBesoin> {
    let get = |key| fields.get(Section::Besoin, key);

    let besoin = ExtractedBesoin {
        date_effet: get(FieldKey::DateEffet)
            .map(|raw| normalize_date_or_keep(raw, "effective date", warnings)),
        actuellement_assure: get(FieldKey::ActuellementAssure).and_then(parse_yes_no),
        besoins: NeedScores {
            soins_medicaux: get(FieldKey::SoinsMedicaux).and_then(parse_need_score),
            hospitalisation: get(FieldKey::Hospitalisation).and_then(parse_need_score),
            optique: get(FieldKey::Optique).and_then(parse_need_score),
            dentaire: get(FieldKey::Dentaire).and_then(parse_need_score),
        },
    };

    (besoin != ExtractedBesoin::default()).then_some(besoin)
}
