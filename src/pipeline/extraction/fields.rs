//! Canonical field keys and the label-alias table.
//!
//! Partners label the same datum in many ways ("Tél. portable", "Téléphone",
//! "Mobile"). Labels are folded (lowercase, no accents) and looked up here;
//! anything unmatched is ignored by the extractors.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::enums::{str_enum, Section};
use crate::pipeline::normalize::fold_label;

str_enum!(
    /// Canonical field identifiers shared by every extractor.
    FieldKey {
        Civilite => "civilite",
        Nom => "nom",
        Prenom => "prenom",
        Adresse => "adresse",
        CodePostal => "code_postal",
        Ville => "ville",
        Telephone => "telephone",
        Email => "email",
        DateNaissance => "date_naissance",
        Profession => "profession",
        RegimeSocial => "regime_social",
        NombreEnfants => "nombre_enfants",
        ChildBirthDate => "date_naissance_enfant",
        ChildBirthDateMin => "date_naissance_enfant_min",
        ChildBirthDateMax => "date_naissance_enfant_max",
        DateEffet => "date_effet",
        ActuellementAssure => "actuellement_assure",
        SoinsMedicaux => "soins_medicaux",
        Hospitalisation => "hospitalisation",
        Optique => "optique",
        Dentaire => "dentaire",
    }
);

impl FieldKey {
    /// Section a key belongs to when the source layout has no section headers.
    pub fn home_section(&self) -> Section {
        match self {
            Self::Civilite
            | Self::Nom
            | Self::Prenom
            | Self::Adresse
            | Self::CodePostal
            | Self::Ville
            | Self::Telephone
            | Self::Email => Section::Contact,
            Self::DateNaissance | Self::Profession | Self::RegimeSocial | Self::NombreEnfants => {
                Section::Souscripteur
            }
            Self::ChildBirthDate | Self::ChildBirthDateMin | Self::ChildBirthDateMax => {
                Section::Enfants
            }
            Self::DateEffet
            | Self::ActuellementAssure
            | Self::SoinsMedicaux
            | Self::Hospitalisation
            | Self::Optique
            | Self::Dentaire => Section::Besoin,
        }
    }
}

/// Folded label → key.
const LABEL_ALIASES: &[(&str, FieldKey)] = &[
    ("civilite", FieldKey::Civilite),
    ("titre", FieldKey::Civilite),
    ("genre", FieldKey::Civilite),
    ("sexe", FieldKey::Civilite),
    ("nom", FieldKey::Nom),
    ("nom de famille", FieldKey::Nom),
    ("prenom", FieldKey::Prenom),
    ("adresse", FieldKey::Adresse),
    ("adresse postale", FieldKey::Adresse),
    ("rue", FieldKey::Adresse),
    ("code postal", FieldKey::CodePostal),
    ("code_postal", FieldKey::CodePostal),
    ("cp", FieldKey::CodePostal),
    ("ville", FieldKey::Ville),
    ("commune", FieldKey::Ville),
    ("telephone", FieldKey::Telephone),
    ("tel", FieldKey::Telephone),
    ("tel.", FieldKey::Telephone),
    ("telephone portable", FieldKey::Telephone),
    ("tel. portable", FieldKey::Telephone),
    ("tel portable", FieldKey::Telephone),
    ("portable", FieldKey::Telephone),
    ("mobile", FieldKey::Telephone),
    ("numero de telephone", FieldKey::Telephone),
    ("email", FieldKey::Email),
    ("e-mail", FieldKey::Email),
    ("mail", FieldKey::Email),
    ("adresse email", FieldKey::Email),
    ("adresse e-mail", FieldKey::Email),
    ("adresse mail", FieldKey::Email),
    ("courriel", FieldKey::Email),
    ("date de naissance", FieldKey::DateNaissance),
    ("date naissance", FieldKey::DateNaissance),
    ("ne(e) le", FieldKey::DateNaissance),
    ("ne le", FieldKey::DateNaissance),
    ("naissance", FieldKey::DateNaissance),
    ("profession", FieldKey::Profession),
    ("activite", FieldKey::Profession),
    ("activite professionnelle", FieldKey::Profession),
    ("metier", FieldKey::Profession),
    ("categorie socioprofessionnelle", FieldKey::Profession),
    ("csp", FieldKey::Profession),
    ("regime social", FieldKey::RegimeSocial),
    ("regime", FieldKey::RegimeSocial),
    ("regime obligatoire", FieldKey::RegimeSocial),
    ("regime de securite sociale", FieldKey::RegimeSocial),
    ("caisse", FieldKey::RegimeSocial),
    ("nombre d'enfants", FieldKey::NombreEnfants),
    ("nombre enfants", FieldKey::NombreEnfants),
    ("nb enfants", FieldKey::NombreEnfants),
    ("nb d'enfants", FieldKey::NombreEnfants),
    ("enfants a charge", FieldKey::NombreEnfants),
    ("date d'effet", FieldKey::DateEffet),
    ("date effet", FieldKey::DateEffet),
    ("date d'effet souhaitee", FieldKey::DateEffet),
    ("date de debut", FieldKey::DateEffet),
    ("debut de contrat", FieldKey::DateEffet),
    ("actuellement assure", FieldKey::ActuellementAssure),
    ("actuellement assure(e)", FieldKey::ActuellementAssure),
    ("assure actuellement", FieldKey::ActuellementAssure),
    ("deja assure", FieldKey::ActuellementAssure),
    ("soins medicaux", FieldKey::SoinsMedicaux),
    ("soins courants", FieldKey::SoinsMedicaux),
    ("medecine courante", FieldKey::SoinsMedicaux),
    ("hospitalisation", FieldKey::Hospitalisation),
    ("optique", FieldKey::Optique),
    ("dentaire", FieldKey::Dentaire),
];

static CHILD_ORDINAL_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:date de naissance |date naissance |naissance )?(?:du |de l'|enfant )?(?:n[°o] ?)?(\d{1,2}) ?(?:er|ere|eme|e|ème)? ?(?:enfant)?$",
    )
    .unwrap()
});
static CHILD_BOUND_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:date de naissance|date naissance|naissance) (?:de l'|des |du )?enfants? (min|max|minimum|maximum|le plus age|le plus jeune)$")
        .unwrap()
});
static CHILD_GENERIC_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:date de |date )?naissance\b.*\benfants?\b").unwrap());

/// Where a label's value goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTarget {
    /// Section forced by the label itself ("... conjoint"), overriding headers.
    pub section: Option<Section>,
    pub key: FieldKey,
    pub ordinal: Option<u32>,
}

/// Resolve a raw label to a canonical field target.
pub fn resolve_label(label: &str) -> Option<FieldTarget> {
    let folded = fold_label(label);
    if folded.is_empty() {
        return None;
    }

    if let Some(caps) = CHILD_BOUND_LABEL.captures(&folded) {
        let key = match &caps[1] {
            "min" | "minimum" | "le plus age" => FieldKey::ChildBirthDateMin,
            _ => FieldKey::ChildBirthDateMax,
        };
        return Some(FieldTarget {
            section: Some(Section::Enfants),
            key,
            ordinal: None,
        });
    }

    if folded.contains("enfant") {
        if let Some(caps) = CHILD_ORDINAL_LABEL.captures(&folded) {
            let ordinal = caps[1].parse::<u32>().ok();
            return Some(FieldTarget {
                section: Some(Section::Enfants),
                key: FieldKey::ChildBirthDate,
                ordinal,
            });
        }
        if CHILD_GENERIC_LABEL.is_match(&folded) {
            return Some(FieldTarget {
                section: Some(Section::Enfants),
                key: FieldKey::ChildBirthDate,
                ordinal: None,
            });
        }
    }

    for suffix in [" du conjoint", " conjoint", " (conjoint)"] {
        if let Some(base) = folded.strip_suffix(suffix) {
            return lookup_alias(base).map(|key| FieldTarget {
                section: Some(Section::Conjoint),
                key,
                ordinal: None,
            });
        }
    }

    lookup_alias(&folded).map(|key| FieldTarget {
        section: None,
        key,
        ordinal: None,
    })
}

fn lookup_alias(folded: &str) -> Option<FieldKey> {
    LABEL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == folded)
        .map(|(_, key)| *key)
}

/// A child birth date as found in the source, before building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChild {
    pub ordinal: Option<u32>,
    pub date_naissance: String,
}

/// Raw field values keyed by section and canonical key.
///
/// First non-empty value wins for a given (section, key).
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    values: HashMap<(Section, FieldKey), String>,
    seen_sections: HashSet<Section>,
    pub children: Vec<RawChild>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a section header was present in the source.
    pub fn mark_section(&mut self, section: Section) {
        self.seen_sections.insert(section);
    }

    pub fn has_section(&self, section: Section) -> bool {
        self.seen_sections.contains(&section)
    }

    /// Insert a value for a resolved label. `current` is the enclosing header, if any.
    pub fn insert(&mut self, target: FieldTarget, current: Option<Section>, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }

        let section = target
            .section
            .or(current)
            .unwrap_or_else(|| target.key.home_section());

        // A plain "Date de naissance" inside the children block is one more child.
        let is_child_date = target.key == FieldKey::ChildBirthDate
            || (section == Section::Enfants && target.key == FieldKey::DateNaissance);
        if is_child_date {
            // Unnumbered labels may list several dates in one value.
            let dates: Vec<&str> = match target.ordinal {
                Some(_) => vec![value],
                None => value.split([',', ';']).map(str::trim).filter(|d| !d.is_empty()).collect(),
            };
            for date in dates {
                self.children.push(RawChild {
                    ordinal: target.ordinal,
                    date_naissance: date.to_string(),
                });
            }
            return;
        }

        self.values
            .entry((section, target.key))
            .or_insert_with(|| value.to_string());
    }

    /// Insert by raw label; returns false when the label is unknown.
    pub fn insert_labelled(&mut self, label: &str, current: Option<Section>, value: &str) -> bool {
        match resolve_label(label) {
            Some(target) => {
                self.insert(target, current, value);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, section: Section, key: FieldKey) -> Option<&str> {
        self.values.get(&(section, key)).map(String::as_str)
    }

    /// Value of `key` in any section.
    pub fn has_key(&self, key: FieldKey) -> bool {
        match key {
            FieldKey::ChildBirthDate => !self.children.is_empty(),
            _ => self.values.keys().any(|(_, k)| *k == key),
        }
    }

    /// Required keys absent from every section.
    pub fn missing(&self, required: &[FieldKey]) -> Vec<FieldKey> {
        required
            .iter()
            .copied()
            .filter(|key| !self.has_key(*key))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.children.is_empty()
    }
}
