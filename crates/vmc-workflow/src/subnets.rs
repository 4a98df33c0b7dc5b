//! Account-link probe: subnets of the linked AWS account an SDDC can use.

use crate::api::CloudConsole;
use crate::error::WorkflowResult;
use crate::orchestrator::{Orchestrator, WorkflowConfig};

#[derive(Debug, Clone, Default)]
pub struct SubnetQuery {
    pub org_id: String,
    pub linked_account_id: Option<String>,
    pub region: Option<String>,
}

/// One row of the flattened VPC → subnet map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibleSubnet {
    pub vpc_id: String,
    pub vpc_cidr: Option<String>,
    pub subnet_id: String,
    pub name: Option<String>,
    pub availability_zone: Option<String>,
    pub cidr: Option<String>,
    pub compatible: bool,
    pub note: Option<String>,
}

/// List compatible subnets, ordered by VPC then subnet id.
pub async fn compatible_subnets<C: CloudConsole + ?Sized>(
    console: &C,
    query: &SubnetQuery,
    config: WorkflowConfig,
) -> WorkflowResult<Vec<CompatibleSubnet>> {
    let orch = Orchestrator::new(config);
    let raw = orch
        .call(
            "list compatible subnets",
            &query.org_id,
            console.compatible_subnets(
                &query.org_id,
                query.linked_account_id.as_deref(),
                query.region.as_deref(),
            ),
        )
        .await?;

    let mut rows = Vec::new();
    for (vpc_id, vpc) in raw.vpc_map {
        for subnet in vpc.subnets {
            rows.push(CompatibleSubnet {
                vpc_id: vpc_id.clone(),
                vpc_cidr: vpc.cidr_block.clone(),
                subnet_id: subnet.subnet_id.unwrap_or_default(),
                name: subnet.name,
                availability_zone: subnet.availability_zone,
                cidr: subnet.subnet_cidr_block,
                compatible: subnet.compatible.unwrap_or(false),
                note: subnet.note,
            });
        }
    }
    rows.sort_by(|a, b| (&a.vpc_id, &a.subnet_id).cmp(&(&b.vpc_id, &b.subnet_id)));
    log::debug!("{} subnet(s) reported for org {}", rows.len(), query.org_id);
    Ok(rows)
}
