//! Deterministic lead identity.
//!
//! The id is a UUIDv5 over the normalized identity tuple
//! `(nom, prenom, email, telephone, date_naissance)`. Downstream stores key
//! on it, so it must never depend on anything else.

use uuid::Uuid;

use super::normalize::collapse_whitespace;

/// Namespace for lead ids.
const LEAD_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6c65_6164_2d69_6e74_616b_652d_6964_7631);

/// Borrowed identity fields; absent fields hash as empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityFields<'a> {
    pub nom: Option<&'a str>,
    pub prenom: Option<&'a str>,
    pub email: Option<&'a str>,
    pub telephone: Option<&'a str>,
    pub date_naissance: Option<&'a str>,
}

/// Composite key: normalized fields joined with `|`.
pub fn identity_key(fields: &IdentityFields<'_>) -> String {
    let text = |v: Option<&str>| v.map(|s| collapse_whitespace(s).to_lowercase()).unwrap_or_default();
    let phone = fields
        .telephone
        .map(|s| s.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .unwrap_or_default();

    [
        text(fields.nom),
        text(fields.prenom),
        text(fields.email),
        phone,
        text(fields.date_naissance),
    ]
    .join("|")
}

/// UUID-shaped, deterministic lead id.
pub fn lead_id(fields: &IdentityFields<'_>) -> String {
    Uuid::new_v5(&LEAD_ID_NAMESPACE, identity_key(fields).as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jean() -> IdentityFields<'static> {
        IdentityFields {
            nom: Some("DUPONT"),
            prenom: Some("Jean"),
            email: Some("jean.dupont@example.com"),
            telephone: Some("0612345678"),
            date_naissance: Some("15/03/1980"),
        }
    }

    #[test]
    fn key_is_normalized() {
        assert_eq!(
            identity_key(&jean()),
            "dupont|jean|jean.dupont@example.com|0612345678|15/03/1980"
        );
    }

    #[test]
    fn same_person_same_id() {
        assert_eq!(lead_id(&jean()), lead_id(&jean()));
    }

    #[test]
    fn whitespace_and_case_do_not_matter() {
        let noisy = IdentityFields {
            nom: Some("  dupont "),
            prenom: Some("JEAN"),
            email: Some(" Jean.Dupont@Example.com"),
            telephone: Some("06 12 34 56 78"),
            date_naissance: Some(" 15/03/1980 "),
        };
        assert_eq!(lead_id(&jean()), lead_id(&noisy));
    }

    #[test]
    fn different_person_different_id() {
        let other = IdentityFields {
            prenom: Some("Marie"),
            ..jean()
        };
        assert_ne!(lead_id(&jean()), lead_id(&other));
    }

    #[test]
    fn id_is_uuid_shaped() {
        let id = lead_id(&jean());
        let parsed = Uuid::parse_str(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 5);
    }

    #[test]
    fn missing_fields_still_hash() {
        let id = lead_id(&IdentityFields::default());
        assert_eq!(id.len(), 36);
    }
}
