use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::workflow::query::ProjectedRequest;

#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, ToSchema)]
pub struct Totals {
    pub requests: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, ToSchema)]
pub struct ApprovalPie {
    pub approved: usize,
    pub waiting: usize,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, ToSchema)]
pub struct DepartmentSeries {
    pub department_id: u64,
    pub department_name: Option<String>,
    pub requests: usize,
    pub approved: usize,
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, ToSchema)]
pub struct Overview {
    pub totals: Totals,
    pub approval_pie: ApprovalPie,
    pub per_department: Vec<DepartmentSeries>,
}

/// Dashboard counters, computed from the same projections the tables use.
/// Anything neither fully approved nor rejected counts as pending.
pub fn overview(items: &[ProjectedRequest]) -> Overview {
    let mut totals = Totals::default();
    let mut departments: BTreeMap<u64, DepartmentSeries> = BTreeMap::new();

    for item in items {
        let approved = item.display.is_fully_approved();
        totals.requests += 1;
        if approved {
            totals.approved += 1;
        } else if item.display.is_rejected() {
            totals.rejected += 1;
        } else {
            totals.pending += 1;
        }

        let series = departments
            .entry(item.request.department_id)
            .or_insert_with(|| DepartmentSeries {
                department_id: item.request.department_id,
                department_name: item.request.department_name.clone(),
                requests: 0,
                approved: 0,
            });
        series.requests += 1;
        if approved {
            series.approved += 1;
        }
    }

    Overview {
        approval_pie: ApprovalPie {
            approved: totals.approved,
            waiting: totals.pending,
        },
        totals,
        per_department: departments.into_values().collect(),
    }
}
