//! Name → identifier resolution against the remote inventory.
//!
//! Every call is a fresh query; nothing is cached between resolutions.

use crate::api::{Inventory, InventoryFilter, ResourceKind, ResourceReference, Scope};
use crate::error::{WorkflowError, WorkflowResult};

/// What to do when a name matches more than one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    #[default]
    FailOnAmbiguous,
    FirstMatch,
}

pub struct ResourceResolver {
    policy: MatchPolicy,
}

impl ResourceResolver {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Resolve `name` to exactly one identifier. Zero matches is
    /// `ResourceNotFound`.
    pub async fn resolve(
        &self,
        inventory: &dyn Inventory,
        kind: ResourceKind,
        name: &str,
        scope: Scope,
    ) -> WorkflowResult<ResourceReference> {
        self.find_existing(inventory, kind, name, scope)
            .await?
            .ok_or_else(|| WorkflowError::not_found(kind, name))
    }

    /// Like [`resolve`](Self::resolve) but zero matches is `Ok(None)`.
    pub async fn find_existing(
        &self,
        inventory: &dyn Inventory,
        kind: ResourceKind,
        name: &str,
        scope: Scope,
    ) -> WorkflowResult<Option<ResourceReference>> {
        let filter = InventoryFilter::named(name, scope);
        let ids = inventory.list(kind, &filter).await?;
        self.pick(kind, name, ids)
    }

    /// First non-empty identifier carrying `name`, whatever the match
    /// policy. Used to refuse a duplicate creation.
    pub async fn find_any(
        &self,
        inventory: &dyn Inventory,
        kind: ResourceKind,
        name: &str,
        scope: Scope,
    ) -> WorkflowResult<Option<ResourceReference>> {
        let filter = InventoryFilter::named(name, scope);
        let ids = inventory.list(kind, &filter).await?;
        Ok(ids
            .into_iter()
            .find(|id| !id.trim().is_empty())
            .map(|id| ResourceReference { kind, name: name.to_string(), id }))
    }

    fn pick(
        &self,
        kind: ResourceKind,
        name: &str,
        ids: Vec<String>,
    ) -> WorkflowResult<Option<ResourceReference>> {
        let mut ids: Vec<String> = ids.into_iter().filter(|id| !id.trim().is_empty()).collect();
        let count = ids.len();
        let id = match (count, self.policy) {
            (0, _) => return Ok(None),
            (1, _) | (_, MatchPolicy::FirstMatch) => ids.remove(0),
            (_, MatchPolicy::FailOnAmbiguous) => {
                return Err(WorkflowError::AmbiguousResource { kind, name: name.to_string(), ids });
            }
        };
        if count > 1 {
            log::warn!("{} '{}' matched {} resources, using {}", kind, name, count, id);
        }
        log::debug!("Resolved {} '{}' to {}", kind, name, id);
        Ok(Some(ResourceReference { kind, name: name.to_string(), id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::*;

    mock! {
        pub Inv {}
        #[async_trait]
        impl Inventory for Inv {
            async fn list(&self, kind: ResourceKind, filter: &InventoryFilter) -> WorkflowResult<Vec<String>>;
        }
    }

    fn returning(ids: &'static [&'static str]) -> MockInv {
        let mut inv = MockInv::new();
        inv.expect_list()
            .times(1)
            .returning(move |_, _| Ok(ids.iter().map(|s| s.to_string()).collect()));
        inv
    }

    #[tokio::test]
    async fn single_match_resolves() {
        let mut inv = MockInv::new();
        inv.expect_list()
            .with(
                eq(ResourceKind::Datastore),
                eq(InventoryFilter::named("WorkloadDatastore", Scope::none())),
            )
            .times(1)
            .returning(|_, _| Ok(vec!["datastore-61".into()]));

        let r = ResourceResolver::new(MatchPolicy::default())
            .resolve(&inv, ResourceKind::Datastore, "WorkloadDatastore", Scope::none())
            .await
            .unwrap();
        assert_eq!(r.id, "datastore-61");
        assert_eq!(r.name, "WorkloadDatastore");
    }

    #[tokio::test]
    async fn zero_matches_is_not_found() {
        let inv = returning(&[]);
        let err = ResourceResolver::new(MatchPolicy::FirstMatch)
            .resolve(&inv, ResourceKind::Datastore, "WorkloadDatastore", Scope::none())
            .await
            .unwrap_err();
        match err {
            WorkflowError::ResourceNotFound { kind, name } => {
                assert_eq!(kind, ResourceKind::Datastore);
                assert_eq!(name, "WorkloadDatastore");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_identifiers_do_not_count() {
        let inv = returning(&["", "  "]);
        let err = ResourceResolver::new(MatchPolicy::default())
            .resolve(&inv, ResourceKind::Folder, "Workloads", Scope::none())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::ResourceNotFound { .. }));
    }

    #[tokio::test]
    async fn ambiguity_fails_by_default() {
        let inv = returning(&["group-v1", "group-v2"]);
        let err = ResourceResolver::new(MatchPolicy::default())
            .resolve(&inv, ResourceKind::Folder, "Workloads", Scope::none())
            .await
            .unwrap_err();
        match err {
            WorkflowError::AmbiguousResource { ids, .. } => assert_eq!(ids, vec!["group-v1", "group-v2"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn first_match_takes_first() {
        let inv = returning(&["resgroup-9", "resgroup-10"]);
        let r = ResourceResolver::new(MatchPolicy::FirstMatch)
            .resolve(&inv, ResourceKind::ResourcePool, "Compute-ResourcePool", Scope::none())
            .await
            .unwrap();
        assert_eq!(r.id, "resgroup-9");
    }

    #[tokio::test]
    async fn find_existing_reports_absence_as_none() {
        let inv = returning(&[]);
        let found = ResourceResolver::new(MatchPolicy::default())
            .find_existing(&inv, ResourceKind::Library, "demo-lib", Scope::none())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn find_any_ignores_ambiguity() {
        let inv = returning(&["", "vm-1", "vm-2"]);
        let found = ResourceResolver::new(MatchPolicy::FailOnAmbiguous)
            .find_any(&inv, ResourceKind::VirtualMachine, "web-01", Scope::none())
            .await
            .unwrap();
        assert_eq!(found.map(|r| r.id).as_deref(), Some("vm-1"));
    }

    #[tokio::test]
    async fn remote_errors_propagate() {
        let mut inv = MockInv::new();
        inv.expect_list()
            .returning(|_, _| Err(WorkflowError::remote("list datastores", "WorkloadDatastore", vec!["503".into()])));
        let err = ResourceResolver::new(MatchPolicy::default())
            .resolve(&inv, ResourceKind::Datastore, "WorkloadDatastore", Scope::none())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::RemoteCallFailure { .. }));
    }
}
