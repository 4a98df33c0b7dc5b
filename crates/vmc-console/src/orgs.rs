//! Organizations, SDDCs and account-link probes.

use crate::client::ConsoleClient;
use crate::error::{ConsoleError, ConsoleResult};
use crate::types::{AwsCompatibleSubnets, Organization, Sddc};

/// Org-scoped console operations.
pub struct OrgManager<'a> {
    client: &'a ConsoleClient,
}

impl<'a> OrgManager<'a> {
    pub fn new(client: &'a ConsoleClient) -> Self {
        Self { client }
    }

    /// List organizations visible to the token.
    pub async fn list_orgs(&self) -> ConsoleResult<Vec<Organization>> {
        self.client.get_json("/orgs").await
    }

    /// Get one SDDC of an org.
    pub async fn get_sddc(&self, org_id: &str, sddc_id: &str) -> ConsoleResult<Sddc> {
        require("org id", org_id)?;
        require("sddc id", sddc_id)?;
        self.client
            .get_json(&format!("/orgs/{org_id}/sddcs/{sddc_id}"))
            .await
    }

    /// Subnets of the linked AWS account that an SDDC can be attached to.
    pub async fn compatible_subnets(
        &self,
        org_id: &str,
        linked_account_id: Option<&str>,
        region: Option<&str>,
    ) -> ConsoleResult<AwsCompatibleSubnets> {
        require("org id", org_id)?;
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(id) = linked_account_id {
            query.push(("linkedAccountId", id));
        }
        if let Some(r) = region {
            query.push(("region", r));
        }
        self.client
            .get_json_with_query(&format!("/orgs/{org_id}/account-link/compatible-subnets"), &query)
            .await
    }
}

fn require(what: &str, value: &str) -> ConsoleResult<()> {
    if value.trim().is_empty() {
        return Err(ConsoleError::validation(format!("{what} must not be empty")));
    }
    Ok(())
}
