use serde::{Deserialize, Serialize};

use facturier_core::{ClientId, DomainError, DomainResult, Entity};

/// A client (billed party).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub siret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
}

impl Client {
    /// New client with the two required fields; contact details start empty.
    pub fn new(id: ClientId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: String::new(),
            email: email.into(),
            phone: String::new(),
            siret: None,
            vat_number: None,
        }
    }

    /// Invariant: name and email are required.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() {
            return Err(DomainError::validation("client name and email are required"));
        }
        Ok(())
    }

    pub fn apply_patch(&mut self, patch: ClientPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(siret) = patch.siret {
            self.siret = siret;
        }
        if let Some(vat_number) = patch.vat_number {
            self.vat_number = vat_number;
        }
    }
}

impl Entity for Client {
    type Id = ClientId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Partial client update. `None` keeps the existing value; for the optional
/// tax identifiers `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub siret: Option<Option<String>>,
    pub vat_number: Option<Option<String>>,
}

/// The issuing company profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub siret: Option<String>,
    /// Logo image, as a data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl Default for Company {
    fn default() -> Self {
        Self {
            name: "Mon Entreprise".to_string(),
            address: "123 Rue de la Paix\n75001 Paris, France".to_string(),
            phone: "+33 1 23 45 67 89".to_string(),
            email: "contact@monentreprise.fr".to_string(),
            vat_number: Some("FR12345678901".to_string()),
            siret: Some("12345678901234".to_string()),
            logo: None,
        }
    }
}

impl Company {
    pub fn apply_patch(&mut self, patch: CompanyPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(vat_number) = patch.vat_number {
            self.vat_number = vat_number;
        }
        if let Some(siret) = patch.siret {
            self.siret = siret;
        }
        if let Some(logo) = patch.logo {
            self.logo = logo;
        }
    }
}

/// Partial company update, same conventions as [`ClientPatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub vat_number: Option<Option<String>>,
    pub siret: Option<Option<String>>,
    pub logo: Option<Option<String>>,
}
