//! Lead Assembler: extracted sub-objects → canonical `Lead`.

use thiserror::Error;

use crate::models::enums::{Confidence, ExtractionMethod, Provider};
use crate::models::lead::{
    Child, ExtractedChild, ExtractedContact, ExtractedLead, ExtractedPerson, Lead, LeadMetadata,
    Project, Provenance, Spouse, Subscriber,
};

use super::identity::{lead_id, IdentityFields};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeadError {
    #[error("No subscriber data extracted")]
    MissingSubscriber,
}

/// Where the extracted data came from.
#[derive(Debug, Clone)]
pub struct AssemblyContext<'a> {
    pub provider: Provider,
    pub confidence: Confidence,
    pub method: ExtractionMethod,
    pub metadata: &'a LeadMetadata,
}

/// Merge sub-objects into a `Lead`. Souscripteur wins over contact on collision.
pub fn assemble_lead(extracted: ExtractedLead, ctx: &AssemblyContext<'_>) -> Result<Lead, LeadError> {
    let ExtractedLead {
        contact,
        souscripteur,
        conjoint,
        enfants,
        besoin,
    } = extracted;

    let subscriber = merge_subscriber(contact.unwrap_or_default(), souscripteur.unwrap_or_default());
    if subscriber.is_empty() {
        return Err(LeadError::MissingSubscriber);
    }

    let id = lead_id(&IdentityFields {
        nom: subscriber.nom.as_deref(),
        prenom: subscriber.prenom.as_deref(),
        email: subscriber.email.as_deref(),
        telephone: subscriber.telephone.as_deref(),
        date_naissance: subscriber.date_naissance.as_deref(),
    });

    let besoin = besoin.unwrap_or_default();
    let project = Project {
        date_effet: besoin.date_effet,
        actuellement_assure: besoin.actuellement_assure,
        besoins: besoin.besoins,
        conjoint: conjoint.map(to_spouse),
        provenance: Provenance {
            provider: ctx.provider,
            confidence: ctx.confidence,
            method: ctx.method,
            email_id: ctx.metadata.email_id.clone(),
            source: ctx.metadata.source.clone(),
        },
    };

    let children = enfants.map(to_children).filter(|c| !c.is_empty());

    tracing::info!(
        lead_id = %id,
        provider = %ctx.provider,
        method = %ctx.method,
        children = children.as_ref().map_or(0, Vec::len),
        "Lead assembled"
    );

    Ok(Lead {
        id,
        subscriber,
        project: Some(project),
        children,
    })
}

fn merge_subscriber(contact: ExtractedContact, person: ExtractedPerson) -> Subscriber {
    Subscriber {
        civilite: person.civilite.or(contact.civilite),
        nom: person.nom.or(contact.nom),
        prenom: person.prenom.or(contact.prenom),
        adresse: contact.adresse,
        code_postal: contact.code_postal,
        ville: contact.ville,
        telephone: contact.telephone,
        email: contact.email,
        date_naissance: person.date_naissance,
        profession: person.profession,
        regime_social: person.regime_social,
        nombre_enfants: person.nombre_enfants,
    }
}

fn to_spouse(person: ExtractedPerson) -> Spouse {
    Spouse {
        civilite: person.civilite,
        nom: person.nom,
        prenom: person.prenom,
        date_naissance: person.date_naissance,
        profession: person.profession,
        regime_social: person.regime_social,
    }
}

/// Children keep explicit ordinals; the rest are numbered after them.
fn to_children(children: Vec<ExtractedChild>) -> Vec<Child> {
    let mut next = children.iter().filter_map(|c| c.ordre).max().unwrap_or(0);
    children
        .into_iter()
        .map(|c| {
            let ordre = c.ordre.unwrap_or_else(|| {
                next += 1;
                next
            });
            Child {
                date_naissance: c.date_naissance,
                ordre,
            }
        })
        .collect()
}
