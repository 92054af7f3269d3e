//! SwissLife One santé quote form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::enums::{str_enum, Platform};
use crate::models::lead::Lead;
use crate::pipeline::dates::{first_of_next_month, format_lead_date, parse_lead_date};

use super::{
    lookup, map_with_default, require, validate_adult_birth_date, validate_child_birth_date,
    PlatformTransformer, TransformError, TransformOutcome,
};

str_enum!(
    /// Régime social.
    SwissLifeRegime {
        AlsaceMoselle => "ALSACE",
        AmexaAgricole => "AMEXA",
        General => "SECURITE_SOCIALE",
        SalarieAgricole => "MSA",
        Tns => "TNS",
    }
);

str_enum!(
    /// Statut professionnel.
    SwissLifeStatut {
        Salarie => "SALARIE",
        SalarieAgricole => "SALARIE_AGRICOLE",
        ExploitantAgricole => "EXPLOITANT_AGRICOLE",
        Tns => "TNS",
        Retraite => "RETRAITE",
        Etudiant => "ETUDIANT",
        SansActivite => "SANS_ACTIVITE",
        Fonctionnaire => "FONCTIONNAIRE",
    }
);

str_enum!(
    /// Profession, asked only of TNS subscribers.
    SwissLifeProfession {
        Artisan => "ARTISAN",
        Commercant => "COMMERCANT",
        ProfessionLiberale => "PROFESSION_LIBERALE",
        ChefEntreprise => "CHEF_ENTREPRISE",
        ProfessionMedicale => "PROFESSION_MEDICALE",
        Autre => "AUTRE",
    }
);

str_enum!(
    /// Who the child is attached to.
    AyantDroit {
        Principal => "CLIENT",
        Conjoint => "CONJOINT",
    }
);

const REGIME_TABLE: &[(&str, SwissLifeRegime)] = &[
    ("alsace-moselle", SwissLifeRegime::AlsaceMoselle),
    ("alsace moselle", SwissLifeRegime::AlsaceMoselle),
    ("exploitant agricole", SwissLifeRegime::AmexaAgricole),
    ("amexa", SwissLifeRegime::AmexaAgricole),
    ("salarié agricole", SwissLifeRegime::SalarieAgricole),
    ("msa", SwissLifeRegime::SalarieAgricole),
    ("général", SwissLifeRegime::General),
    ("general", SwissLifeRegime::General),
    ("régime général", SwissLifeRegime::General),
    ("salarié", SwissLifeRegime::General),
    ("sécurité sociale", SwissLifeRegime::General),
    ("securite sociale", SwissLifeRegime::General),
    ("tns", SwissLifeRegime::Tns),
    ("indépendant", SwissLifeRegime::Tns),
    ("independant", SwissLifeRegime::Tns),
    ("travailleurs non salariés", SwissLifeRegime::Tns),
];

const STATUT_TABLE: &[(&str, SwissLifeStatut)] = &[
    ("salarié", SwissLifeStatut::Salarie),
    ("salarie", SwissLifeStatut::Salarie),
    ("employé", SwissLifeStatut::Salarie),
    ("employe", SwissLifeStatut::Salarie),
    ("cadre", SwissLifeStatut::Salarie),
    ("ouvrier", SwissLifeStatut::Salarie),
    ("technicien", SwissLifeStatut::Salarie),
    ("salarié agricole", SwissLifeStatut::SalarieAgricole),
    ("exploitant agricole", SwissLifeStatut::ExploitantAgricole),
    ("agriculteur", SwissLifeStatut::ExploitantAgricole),
    ("artisan", SwissLifeStatut::Tns),
    ("commerçant", SwissLifeStatut::Tns),
    ("commercant", SwissLifeStatut::Tns),
    ("profession libérale", SwissLifeStatut::Tns),
    ("profession liberale", SwissLifeStatut::Tns),
    ("chef d'entreprise", SwissLifeStatut::Tns),
    ("gérant", SwissLifeStatut::Tns),
    ("retraité", SwissLifeStatut::Retraite),
    ("retraite", SwissLifeStatut::Retraite),
    ("retraitée", SwissLifeStatut::Retraite),
    ("étudiant", SwissLifeStatut::Etudiant),
    ("etudiant", SwissLifeStatut::Etudiant),
    ("étudiante", SwissLifeStatut::Etudiant),
    ("sans activité", SwissLifeStatut::SansActivite),
    ("sans emploi", SwissLifeStatut::SansActivite),
    ("sans profession", SwissLifeStatut::SansActivite),
    ("fonctionnaire", SwissLifeStatut::Fonctionnaire),
];

const PROFESSION_TABLE: &[(&str, SwissLifeProfession)] = &[
    ("artisan", SwissLifeProfession::Artisan),
    ("commerçant", SwissLifeProfession::Commercant),
    ("commercant", SwissLifeProfession::Commercant),
    ("profession libérale", SwissLifeProfession::ProfessionLiberale),
    ("profession liberale", SwissLifeProfession::ProfessionLiberale),
    ("chef d'entreprise", SwissLifeProfession::ChefEntreprise),
    ("gérant", SwissLifeProfession::ChefEntreprise),
    ("médecin", SwissLifeProfession::ProfessionMedicale),
    ("medecin", SwissLifeProfession::ProfessionMedicale),
    ("infirmier", SwissLifeProfession::ProfessionMedicale),
    ("pharmacien", SwissLifeProfession::ProfessionMedicale),
];

// ═══════════════════════════════════════════
// Form schema
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwissLifeProjet {
    pub nom_projet: String,
    /// False as soon as a spouse or a child is covered.
    pub couverture_individuelle: bool,
    pub date_effet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssurePrincipal {
    pub date_naissance: String,
    pub departement_residence: String,
    pub regime_social: SwissLifeRegime,
    pub statut: SwissLifeStatut,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession: Option<SwissLifeProfession>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwissLifeConjoint {
    pub date_naissance: String,
    pub regime_social: SwissLifeRegime,
    pub statut: SwissLifeStatut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwissLifeEnfant {
    pub date_naissance: String,
    pub ayant_droit: AyantDroit,
    pub regime_social: SwissLifeRegime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwissLifeFormData {
    pub projet: SwissLifeProjet,
    pub assure_principal: AssurePrincipal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conjoint: Option<SwissLifeConjoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enfants: Option<Vec<SwissLifeEnfant>>,
}

// ═══════════════════════════════════════════
// Transformer
// ═══════════════════════════════════════════

pub struct SwissLifeTransformer;

impl PlatformTransformer for SwissLifeTransformer {
    type Output = SwissLifeFormData;

    fn platform(&self) -> Platform {
        Platform::SwissLifeOne
    }

    fn transform_at(
        &self,
        lead: &Lead,
        today: NaiveDate,
    ) -> Result<TransformOutcome<SwissLifeFormData>, TransformError> {
        let mut warnings = Vec::new();
        let subscriber = &lead.subscriber;

        let date_naissance = validate_adult_birth_date(
            "assure_principal.date_naissance",
            subscriber.date_naissance.as_deref(),
            today,
        )?;
        let code_postal = require("assure_principal.code_postal", subscriber.code_postal.as_deref())?;
        let departement_residence = departement_from_postal_code(code_postal)
            .ok_or_else(|| TransformError::MissingField("assure_principal.departement_residence".into()))?;

        let regime = map_regime("assure_principal.regime_social", subscriber.regime_social.as_deref(), &mut warnings);
        let statut = map_statut("assure_principal.statut", subscriber.profession.as_deref(), regime, &mut warnings);
        let profession = (regime == SwissLifeRegime::Tns).then(|| {
            map_with_default(
                "assure_principal.profession",
                subscriber.profession.as_deref(),
                PROFESSION_TABLE,
                SwissLifeProfession::Autre,
                &mut warnings,
            )
        });

        let assure_principal = AssurePrincipal {
            date_naissance,
            departement_residence,
            regime_social: regime,
            statut,
            profession,
        };

        let project = lead.project.as_ref();
        let conjoint = match project.and_then(|p| p.conjoint.as_ref()) {
            Some(spouse) if spouse.date_naissance.is_some() => {
                let date_naissance = validate_adult_birth_date(
                    "conjoint.date_naissance",
                    spouse.date_naissance.as_deref(),
                    today,
                )?;
                let regime = map_regime("conjoint.regime_social", spouse.regime_social.as_deref(), &mut warnings);
                Some(SwissLifeConjoint {
                    date_naissance,
                    regime_social: regime,
                    statut: map_statut("conjoint.statut", spouse.profession.as_deref(), regime, &mut warnings),
                })
            }
            Some(_) => {
                warnings.push("conjoint: no birth date, spouse omitted".to_string());
                None
            }
            None => None,
        };

        let enfants: Vec<SwissLifeEnfant> = lead
            .children
            .iter()
            .flatten()
            .filter_map(|child| {
                validate_child_birth_date(child.ordre, &child.date_naissance, today, &mut warnings).map(
                    |date_naissance| SwissLifeEnfant {
                        date_naissance,
                        ayant_droit: AyantDroit::Principal,
                        regime_social: regime,
                    },
                )
            })
            .collect();

        let projet = SwissLifeProjet {
            nom_projet: project_name(subscriber.nom.as_deref(), subscriber.prenom.as_deref()),
            couverture_individuelle: conjoint.is_none() && enfants.is_empty(),
            date_effet: effective_date(project.and_then(|p| p.date_effet.as_deref()), today, &mut warnings),
        };

        tracing::debug!(
            lead_id = %lead.id,
            departement = %assure_principal.departement_residence,
            enfants = enfants.len(),
            "SwissLife form built"
        );

        Ok(TransformOutcome {
            data: SwissLifeFormData {
                projet,
                assure_principal,
                conjoint,
                enfants: (!enfants.is_empty()).then_some(enfants),
            },
            warnings,
        })
    }
}

pub fn map_regime(field: &str, raw: Option<&str>, warnings: &mut Vec<String>) -> SwissLifeRegime {
    map_with_default(field, raw, REGIME_TABLE, SwissLifeRegime::General, warnings)
}

/// Statut from the profession text. On a miss, the regime decides: TNS for
/// independents, salaried otherwise.
pub fn map_statut(
    field: &str,
    profession: Option<&str>,
    regime: SwissLifeRegime,
    warnings: &mut Vec<String>,
) -> SwissLifeStatut {
    if let Some(statut) = lookup(profession, STATUT_TABLE) {
        return statut;
    }
    let fallback = if regime == SwissLifeRegime::Tns {
        SwissLifeStatut::Tns
    } else {
        SwissLifeStatut::Salarie
    };
    let shown = profession.unwrap_or("");
    tracing::warn!(field = %field, value = %shown, default = %fallback, "Unmapped statut, derived from regime");
    warnings.push(format!("{field}: '{shown}' not recognized, defaulted to {fallback}"));
    fallback
}

/// Département from a French postal code.
///
/// Corsica (20xxx) splits at 20200 into 2A/2B; overseas (97x/98x) keeps three
/// digits. `None` when the code is not five digits.
pub fn departement_from_postal_code(code: &str) -> Option<String> {
    let code = code.trim();
    if code.len() != 5 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(rest) = code.strip_prefix("20") {
        let n: u32 = rest.parse().ok()?;
        return Some(if n < 200 { "2A" } else { "2B" }.to_string());
    }
    if code.starts_with("97") || code.starts_with("98") {
        return Some(code[..3].to_string());
    }
    Some(code[..2].to_string())
}

fn project_name(nom: Option<&str>, prenom: Option<&str>) -> String {
    let holder = [nom, prenom]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if holder.is_empty() {
        "Projet santé".to_string()
    } else {
        format!("Projet santé {holder}")
    }
}

fn effective_date(raw: Option<&str>, today: NaiveDate, warnings: &mut Vec<String>) -> String {
    match raw.and_then(parse_lead_date) {
        Some(date) if date >= today => format_lead_date(date),
        _ => {
            let replacement = format_lead_date(first_of_next_month(today));
            warnings.push(format!("date_effet '{}' unusable, defaulted to {replacement}", raw.unwrap_or("")));
            replacement
        }
    }
}
