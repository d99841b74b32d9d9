//! Client directory + company profile store.

use facturier_core::{ClientId, DomainError, DomainResult, position_of};

use crate::party::{Client, ClientPatch, Company, CompanyPatch};

/// Owns the client records and the company profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientDirectory {
    clients: Vec<Client>,
    company: Company,
}

impl ClientDirectory {
    pub fn new(clients: Vec<Client>, company: Company) -> Self {
        Self { clients, company }
    }

    /// Initial state of a fresh installation: default company and one sample
    /// client.
    pub fn seeded() -> Self {
        let sample = Client {
            id: ClientId::from("1"),
            name: "Client Exemple SARL".to_string(),
            address: "456 Avenue des Entreprises\n69000 Lyon, France".to_string(),
            email: "contact@clientexemple.fr".to_string(),
            phone: "+33 4 78 90 12 34".to_string(),
            siret: Some("98765432109876".to_string()),
            vat_number: Some("FR98765432109".to_string()),
        };
        Self::new(vec![sample], Company::default())
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn client(&self, id: &ClientId) -> Option<&Client> {
        self.clients.iter().find(|c| &c.id == id)
    }

    pub fn company(&self) -> &Company {
        &self.company
    }

    pub fn into_parts(self) -> (Vec<Client>, Company) {
        (self.clients, self.company)
    }

    /// Add a client. Requires name + email and an id not already in use.
    pub fn add_client(&mut self, client: Client) -> DomainResult<()> {
        client.validate()?;
        if self.client(&client.id).is_some() {
            return Err(DomainError::conflict(format!(
                "client id '{}' already exists",
                client.id
            )));
        }
        tracing::info!(client_id = %client.id, "client added");
        self.clients.push(client);
        Ok(())
    }

    /// Merge `patch` into the client with `id`. Unknown ids are a no-op;
    /// returns whether a record was updated.
    ///
    /// A patch that would blank the name or email is rejected and the stored
    /// record is left unchanged.
    pub fn update_client(&mut self, id: &ClientId, patch: ClientPatch) -> DomainResult<bool> {
        let Some(idx) = position_of(&self.clients, id) else {
            tracing::warn!(client_id = %id, "update of unknown client ignored");
            return Ok(false);
        };

        let mut updated = self.clients[idx].clone();
        updated.apply_patch(patch);
        updated.validate()?;
        self.clients[idx] = updated;
        tracing::info!(client_id = %id, "client updated");
        Ok(true)
    }

    /// Remove the client with `id`. Invoices keep their own copy of the
    /// client, so nothing cascades.
    pub fn delete_client(&mut self, id: &ClientId) -> bool {
        let before = self.clients.len();
        self.clients.retain(|c| &c.id != id);
        let removed = self.clients.len() != before;
        if removed {
            tracing::info!(client_id = %id, "client deleted");
        } else {
            tracing::warn!(client_id = %id, "delete of unknown client ignored");
        }
        removed
    }

    pub fn update_company(&mut self, patch: CompanyPatch) {
        self.company.apply_patch(patch);
        tracing::info!(company = %self.company.name, "company profile updated");
    }
}
