//! State behind the CRM marketing page.
//!
//! Holds the loaded campaigns, leads and workflows for one tenant along with
//! the search and filter inputs, and derives the figures the page shows.
//! Fetch failures land in [`MarketingDashboard::error`]; failures of user
//! actions (create, delete) are returned to the caller instead.

use uuid::Uuid;

use crate::{
    client::{ClientError, MarketingClient},
    models::{
        campaign::{
            CampaignListQuery, CampaignMetrics, CampaignResponse, CampaignStatus, CampaignType,
            CreateCampaignRequest,
        },
        lead::{CreateLeadRequest, LeadListQuery, LeadResponse},
        workflow::{WorkflowListQuery, WorkflowResponse},
    },
    services::analytics::{DashboardStats, LeadFunnel},
};

/// Page size used for every dashboard fetch.
const FETCH_LIMIT: i64 = 50;

pub const DELETE_CAMPAIGN_PROMPT: &str = "Are you sure you want to delete this campaign?";
pub const DELETE_LEAD_PROMPT: &str = "Are you sure you want to delete this lead?";

#[derive(Debug)]
pub struct MarketingDashboard {
    client: MarketingClient,
    campaigns: Vec<CampaignResponse>,
    leads: Vec<LeadResponse>,
    workflows: Vec<WorkflowResponse>,
    loading: bool,
    error: Option<String>,
    search_term: String,
    status_filter: Option<CampaignStatus>,
    type_filter: Option<CampaignType>,
}

impl MarketingDashboard {
    pub fn new(client: MarketingClient) -> Self {
        Self {
            client,
            campaigns: Vec::new(),
            leads: Vec::new(),
            workflows: Vec::new(),
            loading: false,
            error: None,
            search_term: String::new(),
            status_filter: None,
            type_filter: None,
        }
    }

    /// Fetch campaigns, leads and workflows concurrently.
    ///
    /// A failed fetch leaves its collection untouched and sets the error
    /// banner; the other collections are still updated.
    pub async fn load(&mut self) {
        self.loading = true;
        self.error = None;

        let campaign_query = self.campaign_query();
        let lead_query = LeadListQuery {
            limit: Some(FETCH_LIMIT),
            ..Default::default()
        };
        let workflow_query = WorkflowListQuery {
            limit: Some(FETCH_LIMIT),
            ..Default::default()
        };

        let (campaigns, leads, workflows) = tokio::join!(
            self.client.list_campaigns(&campaign_query),
            self.client.list_leads(&lead_query),
            self.client.list_workflows(&workflow_query),
        );

        match campaigns {
            Ok(page) => self.campaigns = page.campaigns,
            Err(err) => self.record_error(err),
        }
        match leads {
            Ok(page) => self.leads = page.leads,
            Err(err) => self.record_error(err),
        }
        match workflows {
            Ok(page) => self.workflows = page.workflows,
            Err(err) => self.record_error(err),
        }

        self.loading = false;
    }

    pub async fn set_status_filter(&mut self, status: Option<CampaignStatus>) {
        self.status_filter = status;
        self.refresh_campaigns().await;
    }

    pub async fn set_type_filter(&mut self, campaign_type: Option<CampaignType>) {
        self.type_filter = campaign_type;
        self.refresh_campaigns().await;
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Create a campaign and reload the campaign list.
    ///
    /// A blank name is rejected with `ClientError::Validation` and no
    /// request is sent.
    pub async fn create_campaign(
        &mut self,
        request: CreateCampaignRequest,
    ) -> Result<CampaignResponse, ClientError> {
        let campaign = self.client.create_campaign(&request).await?;
        tracing::info!(campaign_id = %campaign.id, "campaign created from dashboard");

        self.refresh_campaigns().await;

        Ok(campaign)
    }

    /// Create a lead and reload the lead list. `source` defaults to `Manual`.
    pub async fn create_lead(
        &mut self,
        mut request: CreateLeadRequest,
    ) -> Result<LeadResponse, ClientError> {
        request.source = Some(request.source_or_default());

        let lead = self.client.create_lead(&request).await?;
        tracing::info!(lead_id = %lead.id, "lead created from dashboard");

        self.refresh_leads().await;

        Ok(lead)
    }

    /// Delete a campaign after `confirm` approves [`DELETE_CAMPAIGN_PROMPT`].
    ///
    /// Returns `Ok(false)` when the prompt was declined.
    pub async fn delete_campaign(
        &mut self,
        campaign_id: Uuid,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<bool, ClientError> {
        if !confirm(DELETE_CAMPAIGN_PROMPT) {
            return Ok(false);
        }

        self.client.delete_campaign(campaign_id).await?;
        self.refresh_campaigns().await;

        Ok(true)
    }

    /// Delete a lead after `confirm` approves [`DELETE_LEAD_PROMPT`].
    pub async fn delete_lead(
        &mut self,
        lead_id: Uuid,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<bool, ClientError> {
        if !confirm(DELETE_LEAD_PROMPT) {
            return Ok(false);
        }

        self.client.delete_lead(lead_id).await?;
        self.refresh_leads().await;

        Ok(true)
    }

    /// Campaigns matching the search term and the status/type filters.
    pub fn filtered_campaigns(&self) -> Vec<&CampaignResponse> {
        let term = self.search_term.to_lowercase();

        self.campaigns
            .iter()
            .filter(|campaign| {
                term.is_empty()
                    || campaign.name.to_lowercase().contains(&term)
                    || campaign
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            })
            .filter(|campaign| {
                self.status_filter
                    .is_none_or(|status| campaign.status == status.as_str())
            })
            .filter(|campaign| {
                self.type_filter
                    .is_none_or(|kind| campaign.campaign_type == kind.as_str())
            })
            .collect()
    }

    /// Leads whose first name, last name or email contains the search term.
    pub fn filtered_leads(&self) -> Vec<&LeadResponse> {
        let term = self.search_term.to_lowercase();
        let matches = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|value| value.to_lowercase().contains(&term))
        };

        self.leads
            .iter()
            .filter(|lead| {
                term.is_empty()
                    || matches(&lead.first_name)
                    || matches(&lead.last_name)
                    || matches(&lead.email)
            })
            .collect()
    }

    pub fn funnel(&self) -> LeadFunnel {
        LeadFunnel::from_leads(
            self.leads
                .iter()
                .map(|lead| (lead.status.as_str(), lead.converted)),
        )
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::compute(
            self.campaigns.iter().map(|campaign| campaign.status.as_str()),
            &self.funnel(),
        )
    }

    /// Metrics of a loaded campaign, recomputed from its counters.
    pub fn campaign_metrics(&self, campaign_id: Uuid) -> Option<CampaignMetrics> {
        self.campaigns
            .iter()
            .find(|campaign| campaign.id == campaign_id)
            .map(|campaign| {
                CampaignMetrics::from_counts(
                    campaign.delivered_count,
                    campaign.opened_count,
                    campaign.clicked_count,
                    campaign.conversion_count,
                )
            })
    }

    pub fn campaigns(&self) -> &[CampaignResponse] {
        &self.campaigns
    }

    pub fn leads(&self) -> &[LeadResponse] {
        &self.leads
    }

    pub fn workflows(&self) -> &[WorkflowResponse] {
        &self.workflows
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Banner message of the last failed fetch.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn campaign_query(&self) -> CampaignListQuery {
        CampaignListQuery {
            status: self.status_filter,
            campaign_type: self.type_filter,
            page: Some(1),
            limit: Some(FETCH_LIMIT),
        }
    }

    async fn refresh_campaigns(&mut self) {
        match self.client.list_campaigns(&self.campaign_query()).await {
            Ok(page) => self.campaigns = page.campaigns,
            Err(err) => self.record_error(err),
        }
    }

    async fn refresh_leads(&mut self) {
        let query = LeadListQuery {
            limit: Some(FETCH_LIMIT),
            ..Default::default()
        };

        match self.client.list_leads(&query).await {
            Ok(page) => self.leads = page.leads,
            Err(err) => self.record_error(err),
        }
    }

    fn record_error(&mut self, err: ClientError) {
        tracing::warn!(error = %err, subdomain = self.client.subdomain(), "dashboard fetch failed");
        self.error = Some(err.to_string());
    }
}
