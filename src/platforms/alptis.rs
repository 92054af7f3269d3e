//! Alptis Santé Select quote form.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::enums::{str_enum, Civilite, Platform};
use crate::models::lead::Lead;
use crate::pipeline::dates::{first_of_next_month, format_lead_date, parse_lead_date};

use super::{
    map_with_default, require, validate_adult_birth_date, validate_child_birth_date,
    PlatformTransformer, TransformError, TransformOutcome,
};

str_enum!(AlptisCivilite {
    Monsieur => "monsieur",
    Madame => "madame",
});

str_enum!(
    /// Catégorie socioprofessionnelle.
    AlptisProfession {
        AgriculteursExploitants => "AGRICULTEURS_EXPLOITANTS",
        Artisans => "ARTISANS",
        Cadres => "CADRES",
        ChefsDEntreprise => "CHEFS_D_ENTREPRISE",
        CommercantsEtAssimiles => "COMMERCANTS_ET_ASSIMILES",
        EmployesAgentsDeMaitrise => "EMPLOYES_AGENTS_DE_MAITRISE",
        Ouvriers => "OUVRIERS",
        PersonnesSansActiviteProfessionnelle => "PERSONNES_SANS_ACTIVITE_PROFESSIONNELLE",
        ProfessionsLiberalesEtAssimiles => "PROFESSIONS_LIBERALES_ET_ASSIMILES",
        Retraites => "RETRAITES",
    }
);

str_enum!(
    /// Régime obligatoire.
    AlptisRegime {
        AlsaceMoselle => "ALSACE_MOSELLE",
        Amexa => "AMEXA",
        RegimeSalariesAgricoles => "REGIME_SALARIES_AGRICOLES",
        SecuriteSociale => "SECURITE_SOCIALE",
        SecuriteSocialeIndependants => "SECURITE_SOCIALE_INDEPENDANTS",
    }
);

str_enum!(
    /// Cadre d'exercice, asked only for independent-type professions.
    CadreExercice {
        Salarie => "SALARIE",
        Independant => "INDEPENDANT_PRESIDENT_SASU_SASU",
    }
);

const PROFESSION_TABLE: &[(&str, AlptisProfession)] = &[
    ("agriculteur", AlptisProfession::AgriculteursExploitants),
    ("agricultrice", AlptisProfession::AgriculteursExploitants),
    ("agriculteur exploitant", AlptisProfession::AgriculteursExploitants),
    ("exploitant agricole", AlptisProfession::AgriculteursExploitants),
    ("artisan", AlptisProfession::Artisans),
    ("cadre", AlptisProfession::Cadres),
    ("cadre supérieur", AlptisProfession::Cadres),
    ("ingénieur", AlptisProfession::Cadres),
    ("ingenieur", AlptisProfession::Cadres),
    ("chef d'entreprise", AlptisProfession::ChefsDEntreprise),
    ("chef d’entreprise", AlptisProfession::ChefsDEntreprise),
    ("gérant", AlptisProfession::ChefsDEntreprise),
    ("gerant", AlptisProfession::ChefsDEntreprise),
    ("dirigeant", AlptisProfession::ChefsDEntreprise),
    ("commerçant", AlptisProfession::CommercantsEtAssimiles),
    ("commercant", AlptisProfession::CommercantsEtAssimiles),
    ("commerçante", AlptisProfession::CommercantsEtAssimiles),
    ("employé", AlptisProfession::EmployesAgentsDeMaitrise),
    ("employe", AlptisProfession::EmployesAgentsDeMaitrise),
    ("employée", AlptisProfession::EmployesAgentsDeMaitrise),
    ("salarié", AlptisProfession::EmployesAgentsDeMaitrise),
    ("salarie", AlptisProfession::EmployesAgentsDeMaitrise),
    ("agent de maîtrise", AlptisProfession::EmployesAgentsDeMaitrise),
    ("technicien", AlptisProfession::EmployesAgentsDeMaitrise),
    ("ouvrier", AlptisProfession::Ouvriers),
    ("ouvrière", AlptisProfession::Ouvriers),
    ("sans activité", AlptisProfession::PersonnesSansActiviteProfessionnelle),
    ("sans emploi", AlptisProfession::PersonnesSansActiviteProfessionnelle),
    ("sans profession", AlptisProfession::PersonnesSansActiviteProfessionnelle),
    ("demandeur d'emploi", AlptisProfession::PersonnesSansActiviteProfessionnelle),
    ("étudiant", AlptisProfession::PersonnesSansActiviteProfessionnelle),
    ("etudiant", AlptisProfession::PersonnesSansActiviteProfessionnelle),
    ("étudiante", AlptisProfession::PersonnesSansActiviteProfessionnelle),
    ("profession libérale", AlptisProfession::ProfessionsLiberalesEtAssimiles),
    ("profession liberale", AlptisProfession::ProfessionsLiberalesEtAssimiles),
    ("libéral", AlptisProfession::ProfessionsLiberalesEtAssimiles),
    ("médecin", AlptisProfession::ProfessionsLiberalesEtAssimiles),
    ("avocat", AlptisProfession::ProfessionsLiberalesEtAssimiles),
    ("pharmacien", AlptisProfession::ProfessionsLiberalesEtAssimiles),
    ("retraité", AlptisProfession::Retraites),
    ("retraite", AlptisProfession::Retraites),
    ("retraitée", AlptisProfession::Retraites),
];

const REGIME_TABLE: &[(&str, AlptisRegime)] = &[
    ("alsace-moselle", AlptisRegime::AlsaceMoselle),
    ("alsace moselle", AlptisRegime::AlsaceMoselle),
    ("exploitant agricole", AlptisRegime::Amexa),
    ("amexa", AlptisRegime::Amexa),
    ("salarié agricole", AlptisRegime::RegimeSalariesAgricoles),
    ("msa", AlptisRegime::RegimeSalariesAgricoles),
    ("général", AlptisRegime::SecuriteSociale),
    ("general", AlptisRegime::SecuriteSociale),
    ("régime général", AlptisRegime::SecuriteSociale),
    ("salarié", AlptisRegime::SecuriteSociale),
    ("sécurité sociale", AlptisRegime::SecuriteSociale),
    ("securite sociale", AlptisRegime::SecuriteSociale),
    ("tns", AlptisRegime::SecuriteSocialeIndependants),
    ("indépendant", AlptisRegime::SecuriteSocialeIndependants),
    ("independant", AlptisRegime::SecuriteSocialeIndependants),
    ("travailleurs non salariés", AlptisRegime::SecuriteSocialeIndependants),
    ("sécurité sociale des indépendants", AlptisRegime::SecuriteSocialeIndependants),
];

/// Professions for which the form asks for a cadre d'exercice.
const CADRE_EXERCICE_PROFESSIONS: &[AlptisProfession] = &[
    AlptisProfession::AgriculteursExploitants,
    AlptisProfession::Artisans,
    AlptisProfession::ChefsDEntreprise,
    AlptisProfession::CommercantsEtAssimiles,
    AlptisProfession::ProfessionsLiberalesEtAssimiles,
];

// ═══════════════════════════════════════════
// Form schema
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiseEnPlace {
    pub remplacement_contrat: bool,
    /// `DD/MM/YYYY`
    pub date_effet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlptisAdherent {
    pub civilite: AlptisCivilite,
    pub nom: String,
    pub prenom: String,
    pub date_naissance: String,
    pub categorie_socioprofessionnelle: AlptisProfession,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadre_exercice: Option<CadreExercice>,
    pub regime_obligatoire: AlptisRegime,
    pub code_postal: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlptisConjoint {
    pub date_naissance: String,
    pub categorie_socioprofessionnelle: AlptisProfession,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadre_exercice: Option<CadreExercice>,
    pub regime_obligatoire: AlptisRegime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlptisEnfant {
    pub date_naissance: String,
    pub regime_obligatoire: AlptisRegime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlptisFormData {
    pub mise_en_place: MiseEnPlace,
    pub adherent: AlptisAdherent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conjoint: Option<AlptisConjoint>,
    /// Absent when the lead has no child, or none passed validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enfants: Option<Vec<AlptisEnfant>>,
}

// ═══════════════════════════════════════════
// Transformer
// ═══════════════════════════════════════════

pub struct AlptisTransformer;

impl PlatformTransformer for AlptisTransformer {
    type Output = AlptisFormData;

    fn platform(&self) -> Platform {
        Platform::AlptisSanteSelect
    }

    fn transform_at(
        &self,
        lead: &Lead,
        today: NaiveDate,
    ) -> Result<TransformOutcome<AlptisFormData>, TransformError> {
        let mut warnings = Vec::new();
        let subscriber = &lead.subscriber;

        let date_naissance =
            validate_adult_birth_date("adherent.date_naissance", subscriber.date_naissance.as_deref(), today)?;
        let nom = require("adherent.nom", subscriber.nom.as_deref())?.to_string();
        let prenom = require("adherent.prenom", subscriber.prenom.as_deref())?.to_string();
        let code_postal = require("adherent.code_postal", subscriber.code_postal.as_deref())?.to_string();

        let civilite = match subscriber.civilite {
            Some(Civilite::Monsieur) => AlptisCivilite::Monsieur,
            Some(Civilite::Madame) => AlptisCivilite::Madame,
            None => {
                tracing::warn!(lead_id = %lead.id, "Missing civility, defaulting to monsieur");
                warnings.push("adherent.civilite: missing, defaulted to monsieur".to_string());
                AlptisCivilite::Monsieur
            }
        };

        let profession = map_profession("adherent.profession", subscriber.profession.as_deref(), &mut warnings);
        let regime = map_regime("adherent.regime", subscriber.regime_social.as_deref(), &mut warnings);
        let adherent = AlptisAdherent {
            civilite,
            nom,
            prenom,
            date_naissance,
            categorie_socioprofessionnelle: profession,
            cadre_exercice: cadre_exercice(profession, subscriber.regime_social.as_deref()),
            regime_obligatoire: regime,
            code_postal,
        };

        let project = lead.project.as_ref();
        let mise_en_place = MiseEnPlace {
            remplacement_contrat: project.and_then(|p| p.actuellement_assure).unwrap_or(false),
            date_effet: effective_date(project.and_then(|p| p.date_effet.as_deref()), today, &mut warnings),
        };

        let conjoint = match project.and_then(|p| p.conjoint.as_ref()) {
            Some(spouse) if spouse.date_naissance.is_some() => {
                let date_naissance =
                    validate_adult_birth_date("conjoint.date_naissance", spouse.date_naissance.as_deref(), today)?;
                let profession =
                    map_profession("conjoint.profession", spouse.profession.as_deref(), &mut warnings);
                Some(AlptisConjoint {
                    date_naissance,
                    categorie_socioprofessionnelle: profession,
                    cadre_exercice: cadre_exercice(profession, spouse.regime_social.as_deref()),
                    regime_obligatoire: map_regime(
                        "conjoint.regime",
                        spouse.regime_social.as_deref(),
                        &mut warnings,
                    ),
                })
            }
            Some(_) => {
                warnings.push("conjoint: no birth date, spouse omitted".to_string());
                None
            }
            None => None,
        };

        let enfants: Vec<AlptisEnfant> = lead
            .children
            .iter()
            .flatten()
            .filter_map(|child| {
                validate_child_birth_date(child.ordre, &child.date_naissance, today, &mut warnings).map(
                    |date_naissance| AlptisEnfant {
                        date_naissance,
                        regime_obligatoire: regime,
                    },
                )
            })
            .collect();

        tracing::debug!(
            lead_id = %lead.id,
            conjoint = conjoint.is_some(),
            enfants = enfants.len(),
            "Alptis form built"
        );

        Ok(TransformOutcome {
            data: AlptisFormData {
                mise_en_place,
                adherent,
                conjoint,
                enfants: (!enfants.is_empty()).then_some(enfants),
            },
            warnings,
        })
    }
}

/// Profession → categorie socioprofessionnelle; employees on a miss.
pub fn map_profession(field: &str, raw: Option<&str>, warnings: &mut Vec<String>) -> AlptisProfession {
    map_with_default(
        field,
        raw,
        PROFESSION_TABLE,
        AlptisProfession::EmployesAgentsDeMaitrise,
        warnings,
    )
}

/// Regime → regime obligatoire; general social security on a miss.
pub fn map_regime(field: &str, raw: Option<&str>, warnings: &mut Vec<String>) -> AlptisRegime {
    map_with_default(field, raw, REGIME_TABLE, AlptisRegime::SecuriteSociale, warnings)
}

/// Only for whitelisted professions; independent when the regime says so.
pub fn cadre_exercice(profession: AlptisProfession, regime: Option<&str>) -> Option<CadreExercice> {
    if !CADRE_EXERCICE_PROFESSIONS.contains(&profession) {
        return None;
    }
    let regime = regime.unwrap_or_default().to_lowercase();
    if regime.contains("tns") || regime.contains("indépendant") || regime.contains("independant") {
        Some(CadreExercice::Independant)
    } else {
        Some(CadreExercice::Salarie)
    }
}

/// Requested start date, or the first of next month when missing or past.
fn effective_date(raw: Option<&str>, today: NaiveDate, warnings: &mut Vec<String>) -> String {
    let requested = raw.and_then(parse_lead_date);
    match requested {
        Some(date) if date >= today => format_lead_date(date),
        Some(date) => {
            let replacement = first_of_next_month(today);
            warnings.push(format!(
                "date_effet {} is in the past, moved to {}",
                format_lead_date(date),
                format_lead_date(replacement)
            ));
            format_lead_date(replacement)
        }
        None => {
            let replacement = first_of_next_month(today);
            warnings.push(format!(
                "date_effet missing or unparseable, defaulted to {}",
                format_lead_date(replacement)
            ));
            format_lead_date(replacement)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lead::LeadInput;
    use crate::pipeline::fixtures::{
        date, lead_with_subscriber, with_children, with_spouse, ASSURLEAD_TAB, ASSURPROSPECT_TEXT,
    };
    use crate::pipeline::LeadPipeline;

    fn today() -> NaiveDate {
        date(2026, 1, 15)
    }

    #[test]
    fn round_trip_from_text_message() {
        let lead = LeadPipeline::new()
            .parse_single(&LeadInput::new(ASSURPROSPECT_TEXT))
            .unwrap();
        let form = AlptisTransformer.transform_at(&lead, today()).unwrap().data;

        assert_eq!(form.adherent.nom, "DUPONT");
        assert_eq!(form.adherent.prenom, "Jean");
        assert_eq!(form.adherent.code_postal, "75001");
        assert_eq!(form.mise_en_place.date_effet, "01/03/2026");
        assert!(form.mise_en_place.remplacement_contrat);
        assert_eq!(form.conjoint.unwrap().categorie_socioprofessionnelle, AlptisProfession::Cadres);
        assert_eq!(form.enfants.unwrap().len(), 2);
    }

    #[test]
    fn date_effet_is_dd_mm_yyyy() {
        let lead = LeadPipeline::new()
            .parse_single(&LeadInput::new(ASSURPROSPECT_TEXT))
            .unwrap();
        let form = AlptisTransformer.transform_at(&lead, today()).unwrap().data;
        let d = &form.mise_en_place.date_effet;
        assert_eq!(d.len(), 10);
        assert!(NaiveDate::parse_from_str(d, "%d/%m/%Y").is_ok());
    }

    #[test]
    fn tab_message_maps_tns_and_liberal_profession() {
        let lead = LeadPipeline::new()
            .parse_single(&LeadInput::new(ASSURLEAD_TAB))
            .unwrap();
        let form = AlptisTransformer.transform_at(&lead, today()).unwrap().data;
        assert_eq!(
            form.adherent.regime_obligatoire,
            AlptisRegime::SecuriteSocialeIndependants
        );
        assert_eq!(
            form.adherent.categorie_socioprofessionnelle,
            AlptisProfession::ProfessionsLiberalesEtAssimiles
        );
        assert_eq!(form.adherent.cadre_exercice, Some(CadreExercice::Independant));
    }

    #[test]
    fn cadre_exercice_only_for_whitelist() {
        assert_eq!(cadre_exercice(AlptisProfession::Cadres, Some("TNS")), None);
        assert_eq!(
            cadre_exercice(AlptisProfession::Artisans, Some("Général")),
            Some(CadreExercice::Salarie)
        );
        assert_eq!(
            cadre_exercice(AlptisProfession::CommercantsEtAssimiles, Some("Indépendant")),
            Some(CadreExercice::Independant)
        );
    }

    #[test]
    fn unknown_profession_defaults_with_warning() {
        let lead = lead_with_subscriber("15/03/1980", "Astronaute", "Général");
        let outcome = AlptisTransformer.transform_at(&lead, today()).unwrap();
        assert_eq!(
            outcome.data.adherent.categorie_socioprofessionnelle,
            AlptisProfession::EmployesAgentsDeMaitrise
        );
        assert_eq!(outcome.data.adherent.cadre_exercice, None);
        assert!(outcome.warnings.iter().any(|w| w.contains("Astronaute")));
    }

    #[test]
    fn subscriber_age_is_fatal() {
        let lead = lead_with_subscriber("16/01/2008", "Cadre", "Général");
        let err = AlptisTransformer.transform_at(&lead, today()).unwrap_err();
        assert!(matches!(err, TransformError::AgeOutOfRange { age: 17, .. }));

        let lead = lead_with_subscriber("15/01/2008", "Cadre", "Général");
        assert!(AlptisTransformer.transform_at(&lead, today()).is_ok());
    }

    #[test]
    fn spouse_age_is_fatal() {
        let lead = with_spouse(lead_with_subscriber("15/03/1980", "Cadre", "Général"), "01/01/1900");
        let err = AlptisTransformer.transform_at(&lead, today()).unwrap_err();
        assert!(matches!(err, TransformError::AgeOutOfRange { ref field, .. } if field == "conjoint.date_naissance"));
    }

    #[test]
    fn invalid_children_dropped_and_section_omitted() {
        let lead = with_children(
            lead_with_subscriber("15/03/1980", "Cadre", "Général"),
            &["01/01/1990", "pas de date"],
        );
        let outcome = AlptisTransformer.transform_at(&lead, today()).unwrap();
        assert!(outcome.data.enfants.is_none());
        assert_eq!(outcome.warnings.len(), 2);

        let json = serde_json::to_value(&outcome.data).unwrap();
        assert!(json.get("enfants").is_none());
    }

    #[test]
    fn children_inherit_subscriber_regime() {
        let lead = with_children(
            lead_with_subscriber("15/03/1980", "Artisan", "TNS"),
            &["15/01/1999", "15/01/1998", "01/09/2010"],
        );
        let enfants = AlptisTransformer.transform_at(&lead, today()).unwrap().data.enfants.unwrap();
        assert_eq!(enfants.len(), 2);
        assert!(enfants
            .iter()
            .all(|e| e.regime_obligatoire == AlptisRegime::SecuriteSocialeIndependants));
    }

    #[test]
    fn past_or_missing_effective_date_moves_to_next_month() {
        let mut warnings = Vec::new();
        assert_eq!(effective_date(Some("01/01/2020"), today(), &mut warnings), "01/02/2026");
        assert_eq!(effective_date(None, today(), &mut warnings), "01/02/2026");
        assert_eq!(effective_date(Some("2026-01-15"), today(), &mut warnings), "15/01/2026");
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn try_transform_reports_errors() {
        let lead = lead_with_subscriber("pas une date", "Cadre", "Général");
        let result = AlptisTransformer.try_transform_at(&lead, today());
        assert!(!result.success);
        assert!(result.data.is_none());
        assert!(result.errors[0].contains("pas une date"));
    }

    #[test]
    fn serializes_platform_vocabulary() {
        let lead = lead_with_subscriber("15/03/1980", "Profession libérale", "TNS");
        let form = AlptisTransformer.transform_at(&lead, today()).unwrap().data;
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["adherent"]["categorie_socioprofessionnelle"], "PROFESSIONS_LIBERALES_ET_ASSIMILES");
        assert_eq!(json["adherent"]["cadre_exercice"], "INDEPENDANT_PRESIDENT_SASU_SASU");
        assert_eq!(json["adherent"]["regime_obligatoire"], "SECURITE_SOCIALE_INDEPENDANTS");
        assert!(json.get("conjoint").is_none());
    }
}
