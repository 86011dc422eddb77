//! Domain model types used throughout formmailer.
//!
//! These types bridge the validator, the email renderer, the web API and the
//! client form controller.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// The eight fields of a transfer-request form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Nom,
    Prenom,
    DestMail,
    Iban,
    Swift,
    Banque,
    Montant,
    Libelle,
}

impl Field {
    /// All fields in the order they are checked and reported.
    pub const ALL: [Field; 8] = [
        Field::Nom,
        Field::Prenom,
        Field::DestMail,
        Field::Iban,
        Field::Swift,
        Field::Banque,
        Field::Montant,
        Field::Libelle,
    ];

    /// JSON / form key of the field.
    pub fn key(self) -> &'static str {
        match self {
            Self::Nom => "nom",
            Self::Prenom => "prenom",
            Self::DestMail => "dest_mail",
            Self::Iban => "iban",
            Self::Swift => "swift",
            Self::Banque => "banque",
            Self::Montant => "montant",
            Self::Libelle => "libelle",
        }
    }

    /// Human-readable label, used in error reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Nom => "last name",
            Self::Prenom => "first name",
            Self::DestMail => "destination email",
            Self::Iban => "IBAN",
            Self::Swift => "SWIFT code",
            Self::Banque => "bank name",
            Self::Montant => "amount",
            Self::Libelle => "label",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// A transfer-request form as received on the wire.
///
/// Every field is optional so that a body with absent or `null` keys still
/// deserializes and can be reported field by field. JSON numbers are taken
/// as their decimal text, so `"montant": 1500` reads as `"1500"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionForm {
    #[serde(default, deserialize_with = "text_or_number")]
    pub nom: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub prenom: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub iban: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub swift: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub banque: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub montant: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub dest_mail: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub libelle: Option<String>,
}

/// Wire value of a form field.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireValue {
    Text(String),
    Int(i64),
    Uint(u64),
    Float(f64),
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<WireValue>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        WireValue::Text(s) => s,
        WireValue::Int(n) => n.to_string(),
        WireValue::Uint(n) => n.to_string(),
        WireValue::Float(n) => n.to_string(),
    }))
}

impl SubmissionForm {
    /// Raw value of a field, `""` when absent.
    pub fn get(&self, field: Field) -> &str {
        let value = match field {
            Field::Nom => &self.nom,
            Field::Prenom => &self.prenom,
            Field::DestMail => &self.dest_mail,
            Field::Iban => &self.iban,
            Field::Swift => &self.swift,
            Field::Banque => &self.banque,
            Field::Montant => &self.montant,
            Field::Libelle => &self.libelle,
        };
        value.as_deref().unwrap_or("")
    }

    /// Set a field value.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Nom => &mut self.nom,
            Field::Prenom => &mut self.prenom,
            Field::DestMail => &mut self.dest_mail,
            Field::Iban => &mut self.iban,
            Field::Swift => &mut self.swift,
            Field::Banque => &mut self.banque,
            Field::Montant => &mut self.montant,
            Field::Libelle => &mut self.libelle,
        };
        *slot = Some(value.into());
    }

    /// Copy of the form with every value trimmed and absent values set to `""`.
    pub fn trimmed(&self) -> Self {
        let mut out = Self::default();
        for field in Field::ALL {
            out.set(field, self.get(field).trim());
        }
        out
    }
}

/// A validated submission: every field present and trimmed, `dest_mail`
/// well-formed.
///
/// Only obtainable through [`crate::validate::validate_submission`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub nom: String,
    pub prenom: String,
    pub iban: String,
    pub swift: String,
    pub banque: String,
    pub montant: String,
    pub dest_mail: String,
    pub libelle: String,
}

impl Submission {
    /// Built by the validator once all checks have passed.
    pub(crate) fn from_trimmed(form: &SubmissionForm) -> Self {
        Self {
            nom: form.get(Field::Nom).to_string(),
            prenom: form.get(Field::Prenom).to_string(),
            iban: form.get(Field::Iban).to_string(),
            swift: form.get(Field::Swift).to_string(),
            banque: form.get(Field::Banque).to_string(),
            montant: form.get(Field::Montant).to_string(),
            dest_mail: form.get(Field::DestMail).to_string(),
            libelle: form.get(Field::Libelle).to_string(),
        }
    }
}

impl TryFrom<SubmissionForm> for Submission {
    type Error = crate::errors::ValidationError;

    fn try_from(form: SubmissionForm) -> Result<Self, Self::Error> {
        crate::validate::validate_submission(form)
    }
}

// ---------------------------------------------------------------------------
// Reference
// ---------------------------------------------------------------------------

/// Human-readable display label attached to a submission.
///
/// Not unique; never used as a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Reference(pub String);

impl Reference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
