//! Sample partner messages shared by tests across the pipeline.

use chrono::NaiveDate;

use crate::models::enums::{Civilite, Confidence, ExtractionMethod, Provider};
use crate::models::lead::{Child, Lead, NeedScores, Project, Provenance, Spouse, Subscriber};

pub const ASSURPROSPECT_TEXT: &str = "De : notifications@assurprospect.fr
Objet : Nouvelle fiche prospect santé

Bonjour,

Transmission d'une fiche prospect Mutuelle santé

Contact
Civilité : Monsieur
Nom : DUPONT
Prénom : Jean
Adresse : 12 rue des Lilas
Code postal : 75001
Ville : Paris
Téléphone : 06 12 34 56 78
Email : jean.dupont@example.com

Souscripteur
Date de naissance : 15/03/1980
Profession : Profession libérale
Régime social : Travailleurs Non Salariés
Nombre d'enfants : 2

Conjoint
Civilité : Madame
Nom : DUPONT
Prénom : Marie
Date de naissance : 22/07/1982
Profession : Cadre
Régime social : Salarié

Enfants
Date de naissance du 1er enfant : 01/09/2010
Date de naissance du 2ème enfant : 15/04/2015

Besoin
Date d'effet : 01/03/2026
Actuellement assuré : Oui
Soins médicaux : 3
Hospitalisation : 4
Optique : 2
Dentaire : 3

Cordialement,
L'équipe AssurProspect
www.assurprospect.fr
";

pub const ASSURPROSPECT_HTML: &str = r#"<html><body>
<p>Bonjour,</p>
<p>Transmission d'une fiche prospect Mutuelle sant&eacute;</p>
<h2>Contact</h2>
<p><b>Civilit&eacute; :</b> Madame<br>
<b>Nom :</b> MARTIN<br>
<b>Pr&eacute;nom :</b> Sophie<br>
<b>Code postal :</b> 69003<br>
<b>Ville :</b> Lyon<br>
<b>T&eacute;l&eacute;phone :</b> +33 7 98 76 54 32<br>
<b>Email :</b> sophie.martin@example.fr</p>
<h2>Souscripteur</h2>
<p><b>Date de naissance :</b> 05/11/1975<br>
<b>Profession :</b> Commer&ccedil;ant<br>
<b>R&eacute;gime social :</b> Ind&eacute;pendant</p>
<h2>Besoin</h2>
<p><b>Date d'effet :</b> 01/04/2026<br>
<b>Actuellement assur&eacute; :</b> Non<br>
<b>Hospitalisation :</b> 3</p>
<p>L'&eacute;quipe AssurProspect - www.assurprospect.fr</p>
</body></html>
"#;

pub const ASSURLEAD_TAB: &str = "Bonjour,

Veuillez trouver ci-dessous une nouvelle demande de devis santé transmise par Assurlead.
Merci de recontacter le prospect dans les meilleurs délais.

Civilite\tMonsieur
Nom\tDUPONT
Prenom\tJEAN
Date de naissance\t15/03/1980
Adresse\t12 rue des Lilas
Code postal\t75001
Ville\tParis
Telephone\t0612345678
Email\tjean.dupont@example.com
regime social\tTravailleurs Non Salariés
Profession\tProfession libérale
Date de naissance enfant min\t01/09/2010
Date de naissance enfant max\t15/04/2015
Date d'effet\t01/03/2026

Cordialement,
L'équipe Assurlead - www.assurlead.fr
";

pub const ASSURLEAD_HTML: &str = r#"<html><body>
<p>Bonjour, voici une nouvelle demande de devis transmise par Assurlead.</p>
<table border="1" cellpadding="4">
<tr><td>Civilit&eacute;</td><td>Madame</td></tr>
<tr><td>Nom</td><td>LEROY</td></tr>
<tr><td>Pr&eacute;nom</td><td>Claire</td></tr>
<tr><td>Date de naissance</td><td>1985-06-30</td></tr>
<tr><td>Code postal</td><td>20090</td></tr>
<tr><td>Ville</td><td>Ajaccio</td></tr>
<tr><td>T&eacute;l&eacute;phone</td><td>06 11 22 33 44</td></tr>
<tr><td>Email</td><td>claire.leroy@example.fr</td></tr>
<tr><td>R&eacute;gime social</td><td>Salari&eacute;</td></tr>
<tr><td>Profession</td><td>Employ&eacute;</td></tr>
<tr><td>Date de naissance conjoint</td><td>12/12/1984</td></tr>
<tr><td>Date d'effet</td><td>01/05/2026</td></tr>
</table>
<p>www.assurlead.fr</p>
</body></html>
"#;

/// Two transmission blocks: the first complete, the second truncated.
pub fn bundled_assurprospect() -> String {
    let first = ASSURPROSPECT_TEXT
        .split_once("Bonjour,\n\n")
        .map_or(ASSURPROSPECT_TEXT, |(_, rest)| rest);
    format!(
        "{first}\nTransmission d'une fiche prospect Mutuelle santé\n\nCeci n'est pas une fiche exploitable.\n"
    )
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Canonical lead with a subscriber born on `birth` and the given profession/regime.
pub fn lead_with_subscriber(birth: &str, profession: &str, regime: &str) -> Lead {
    Lead {
        id: "00000000-0000-5000-8000-000000000000".to_string(),
        subscriber: Subscriber {
            civilite: Some(Civilite::Monsieur),
            nom: Some("DUPONT".to_string()),
            prenom: Some("Jean".to_string()),
            code_postal: Some("75001".to_string()),
            ville: Some("Paris".to_string()),
            telephone: Some("0612345678".to_string()),
            email: Some("jean.dupont@example.com".to_string()),
            date_naissance: Some(birth.to_string()),
            profession: Some(profession.to_string()),
            regime_social: Some(regime.to_string()),
            ..Default::default()
        },
        project: Some(Project {
            date_effet: Some("01/03/2026".to_string()),
            actuellement_assure: Some(false),
            besoins: NeedScores::default(),
            conjoint: None,
            provenance: Provenance {
                provider: Provider::AssurProspect,
                confidence: Confidence::High,
                method: ExtractionMethod::Deterministic,
                email_id: None,
                source: None,
            },
        }),
        children: None,
    }
}

pub fn with_spouse(mut lead: Lead, birth: &str) -> Lead {
    if let Some(project) = lead.project.as_mut() {
        project.conjoint = Some(Spouse {
            civilite: Some(Civilite::Madame),
            nom: Some("DUPONT".to_string()),
            prenom: Some("Marie".to_string()),
            date_naissance: Some(birth.to_string()),
            profession: Some("Cadre".to_string()),
            regime_social: Some("Général".to_string()),
        });
    }
    lead
}

pub fn with_children(mut lead: Lead, births: &[&str]) -> Lead {
    lead.children = Some(
        births
            .iter()
            .enumerate()
            .map(|(i, d)| Child {
                date_naissance: d.to_string(),
                ordre: i as u32 + 1,
            })
            .collect(),
    );
    lead
}
