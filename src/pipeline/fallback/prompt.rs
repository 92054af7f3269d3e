pub const LEAD_SYSTEM_PROMPT: &str = r#"
You are a data-entry assistant for a French health-insurance broker. Your ONLY
role is to copy the prospect's details from a partner email into JSON.

RULES:
1. Extract ONLY information explicitly written in the email.
2. NEVER guess or invent a value. If a field is missing, output null.
3. Copy dates as written (DD/MM/YYYY preferred).
4. If the email is not a prospect request, output exactly: null
5. Output a single JSON block wrapped in ```json``` fences and nothing else.
"#;

/// Build the extraction prompt for one message.
pub fn build_lead_prompt(raw_text: &str) -> String {
    format!(
        r#"<email>
{raw_text}
</email>

Extract the prospect from the above email into the following JSON structure.
For any field not present in the email, use null.

```json
{{
  "contact": {{
    "civilite": "Monsieur | Madame | null",
    "nom": "string or null",
    "prenom": "string or null",
    "adresse": "string or null",
    "code_postal": "5 digits or null",
    "ville": "string or null",
    "telephone": "string or null",
    "email": "string or null"
  }},
  "souscripteur": {{
    "date_naissance": "DD/MM/YYYY or null",
    "profession": "string or null",
    "regime_social": "string or null",
    "nombre_enfants": "number or null"
  }},
  "conjoint": {{
    "civilite": "string or null",
    "nom": "string or null",
    "prenom": "string or null",
    "date_naissance": "DD/MM/YYYY or null",
    "profession": "string or null",
    "regime_social": "string or null"
  }},
  "enfants": [
    {{"date_naissance": "DD/MM/YYYY", "ordre": 1}}
  ],
  "besoin": {{
    "date_effet": "DD/MM/YYYY or null",
    "actuellement_assure": "oui | non | null",
    "soins_medicaux": "1-4 or null",
    "hospitalisation": "1-4 or null",
    "optique": "1-4 or null",
    "dentaire": "1-4 or null"
  }}
}}
```"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_message() {
        let prompt = build_lead_prompt("Nom : DUPONT");
        assert!(prompt.contains("<email>\nNom : DUPONT\n</email>"));
        assert!(prompt.contains("\"regime_social\""));
    }

    #[test]
    fn system_prompt_forbids_guessing() {
        assert!(LEAD_SYSTEM_PROMPT.contains("NEVER guess"));
    }
}
