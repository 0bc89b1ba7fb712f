//! Marketing analytics derived from campaign and lead statuses.
//!
//! Shared by the server-side marketing overview and the client dashboard so
//! both report the same numbers.

use serde::{Deserialize, Serialize};

/// Headline counters of the marketing dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_campaigns: usize,
    pub active_campaigns: usize,
    pub total_leads: usize,
    pub converted_leads: usize,
}

impl DashboardStats {
    pub fn compute<'a>(
        campaign_statuses: impl IntoIterator<Item = &'a str>,
        funnel: &LeadFunnel,
    ) -> Self {
        let (total_campaigns, active_campaigns) = campaign_statuses
            .into_iter()
            .fold((0, 0), |(total, active), status| {
                (total + 1, active + usize::from(status == "ACTIVE"))
            });

        Self {
            total_campaigns,
            active_campaigns,
            total_leads: funnel.total,
            converted_leads: funnel.converted,
        }
    }
}

/// Lead conversion funnel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadFunnel {
    pub total: usize,
    /// Leads that moved past NEW
    pub contacted: usize,
    /// QUALIFIED, NURTURING or CONVERTED
    pub qualified: usize,
    /// Leads with the converted flag set
    pub converted: usize,
    /// converted / total, in percent
    pub conversion_rate: f64,
}

const QUALIFIED_STATUSES: [&str; 3] = ["QUALIFIED", "NURTURING", "CONVERTED"];

impl LeadFunnel {
    /// Build the funnel from `(status, converted)` pairs.
    pub fn from_leads<'a>(leads: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        let mut funnel = LeadFunnel::default();

        for (status, converted) in leads {
            funnel.total += 1;
            if status != "NEW" {
                funnel.contacted += 1;
            }
            if QUALIFIED_STATUSES.contains(&status) {
                funnel.qualified += 1;
            }
            if converted {
                funnel.converted += 1;
            }
        }

        if funnel.total > 0 {
            funnel.conversion_rate = funnel.converted as f64 / funnel.total as f64 * 100.0;
        }

        funnel
    }
}
