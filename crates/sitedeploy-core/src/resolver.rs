// ── Name resolution ──
//
// Organizations, networks and templates are addressed by human-readable
// name. Lookups distinguish "confirmed absent" (`Ok(None)`) from "lookup
// failed" (`Err`).

use sitedeploy_api::DashboardClient;
use sitedeploy_api::types::{ConfigTemplate, Network, Organization};
use tracing::debug;

use crate::error::CoreError;

/// Outcome of matching a name against a list of candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameMatch<T> {
    /// Exactly one entry carries this name.
    Exact(T),
    /// No exact hit; these entries contain the name as a substring.
    Partial(Vec<T>),
}

/// Exact match first, else every entry whose name contains `query`.
pub fn match_name<T>(items: Vec<T>, query: &str, name: impl Fn(&T) -> &str) -> NameMatch<T> {
    let (exact, rest): (Vec<T>, Vec<T>) = items.into_iter().partition(|item| name(item) == query);
    if let Some(hit) = exact.into_iter().next() {
        return NameMatch::Exact(hit);
    }
    NameMatch::Partial(
        rest.into_iter()
            .filter(|item| name(item).contains(query))
            .collect(),
    )
}

pub async fn resolve_organization(
    client: &DashboardClient,
    name: &str,
) -> Result<Organization, CoreError> {
    let orgs = client.list_organizations().await?;
    debug!(count = orgs.len(), "organizations visible to this key");
    orgs.into_iter()
        .find(|o| o.name == name)
        .ok_or_else(|| CoreError::OrganizationNotFound {
            name: name.to_owned(),
        })
}

/// Lookups scoped to one organization.
pub struct Resolver<'a> {
    client: &'a DashboardClient,
    org_id: &'a str,
}

impl<'a> Resolver<'a> {
    pub fn new(client: &'a DashboardClient, org_id: &'a str) -> Self {
        Self { client, org_id }
    }

    pub async fn networks(&self) -> Result<Vec<Network>, CoreError> {
        Ok(self.client.list_networks(self.org_id).await?)
    }

    pub async fn templates(&self) -> Result<Vec<ConfigTemplate>, CoreError> {
        Ok(self.client.list_config_templates(self.org_id).await?)
    }

    /// Network with exactly this name, across every page of the listing.
    pub async fn find_network(&self, name: &str) -> Result<Option<Network>, CoreError> {
        Ok(self.networks().await?.into_iter().find(|n| n.name == name))
    }

    pub async fn require_network(&self, name: &str) -> Result<Network, CoreError> {
        self.find_network(name)
            .await?
            .ok_or_else(|| CoreError::NetworkNotFound {
                name: name.to_owned(),
            })
    }

    /// Template with exactly this name.
    pub async fn require_template(&self, name: &str) -> Result<ConfigTemplate, CoreError> {
        self.templates()
            .await?
            .into_iter()
            .find(|t| t.name == name)
            .ok_or_else(|| CoreError::TemplateNotFound {
                name: name.to_owned(),
            })
    }

    pub async fn template_by_id(&self, id: &str) -> Result<Option<ConfigTemplate>, CoreError> {
        Ok(self.templates().await?.into_iter().find(|t| t.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&'static str]) -> Vec<&'static str> {
        items.to_vec()
    }

    #[test]
    fn exact_match_beats_substrings() {
        let result = match_name(
            names(&["EMEA - ZTNA Office", "Office", "Office v2"]),
            "Office",
            |s| *s,
        );
        assert_eq!(result, NameMatch::Exact("Office"));
    }

    #[test]
    fn substring_candidates_listed_in_order() {
        let result = match_name(
            names(&["EMEA - ZTNA Office", "BTQ", "Office v2"]),
            "Office",
            |s| *s,
        );
        assert_eq!(
            result,
            NameMatch::Partial(vec!["EMEA - ZTNA Office", "Office v2"])
        );
    }

    #[test]
    fn no_candidates() {
        let result = match_name(names(&["BTQ"]), "Office", |s| *s);
        assert_eq!(result, NameMatch::Partial(vec![]));
    }
}
