// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::ids::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RfpStatus {
    #[default]
    Detected,
    Analyzed,
    Matched,
    Priced,
    Submitted,
}

impl RfpStatus {
    pub const ALL: [Self; 5] = [
        Self::Detected,
        Self::Analyzed,
        Self::Matched,
        Self::Priced,
        Self::Submitted,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Detected => "detected",
            Self::Analyzed => "analyzed",
            Self::Matched => "matched",
            Self::Priced => "priced",
            Self::Submitted => "submitted",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Detected => "Detected",
            Self::Analyzed => "Analyzed",
            Self::Matched => "Matched",
            Self::Priced => "Priced",
            Self::Submitted => "Submitted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "detected" => Some(Self::Detected),
            "analyzed" => Some(Self::Analyzed),
            "matched" => Some(Self::Matched),
            "priced" => Some(Self::Priced),
            "submitted" => Some(Self::Submitted),
            _ => None,
        }
    }

    /// Every status past detection counts toward "Analyzed & Matched".
    pub const fn is_analyzed(self) -> bool {
        !matches!(self, Self::Detected)
    }
}

impl<'de> Deserialize<'de> for RfpStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .map(str::trim)
            .map(str::to_ascii_lowercase)
            .and_then(|value| Self::parse(&value))
            .unwrap_or_default())
    }
}

/// A row of the hosted `rfps` table. Read-only from this app's point of view.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Rfp {
    pub id: RfpId,
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub source: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub due_date: Option<Date>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub scope: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub requirements: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub testing_needs: String,
    #[serde(default)]
    pub status: RfpStatus,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub match_percentage: f64,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub total_price: f64,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<OffsetDateTime>,
}

impl Rfp {
    /// Host name of the procurement portal, or the raw source when it is not a URL.
    pub fn source_host(&self) -> String {
        url::Url::parse(&self.source)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_owned))
            .unwrap_or_else(|| self.source.clone())
    }
}

/// Stable newest-first ordering; rows without a creation time sink to the end.
pub fn sort_newest_first(rfps: &mut [Rfp]) {
    rfps.sort_by(|left, right| match (left.created_at, right.created_at) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkuProduct {
    pub id: SkuId,
    pub sku_code: String,
    pub product_name: String,
    pub voltage: String,
    pub conductor_type: String,
    pub insulation: String,
    pub price_per_meter: f64,
    pub test_cost: i64,
    pub stock_available: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RfpMatch {
    pub id: MatchId,
    pub rfp_id: RfpId,
    pub sku_id: SkuId,
    pub match_score: f64,
    pub quantity: i64,
    pub total_material_cost: i64,
    pub total_test_cost: i64,
    pub subtotal: i64,
    pub recommended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    High,
    Mid,
    Low,
}

impl RfpMatch {
    pub fn tier(&self) -> MatchTier {
        if self.match_score >= 90.0 {
            MatchTier::High
        } else if self.match_score >= 70.0 {
            MatchTier::Mid
        } else {
            MatchTier::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentName {
    Sales,
    Technical,
    Pricing,
    Orchestrator,
}

impl AgentName {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Technical => "technical",
            Self::Pricing => "pricing",
            Self::Orchestrator => "orchestrator",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Sales => "Sales Agent",
            Self::Technical => "Technical Agent",
            Self::Pricing => "Pricing Agent",
            Self::Orchestrator => "Main Orchestrator Agent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentLogStatus {
    Active,
    Processing,
    Completed,
}

impl AgentLogStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Processing => "processing",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentLog {
    pub id: AgentLogId,
    pub rfp_id: RfpId,
    pub agent: AgentName,
    pub action: String,
    pub status: AgentLogStatus,
    pub details: BTreeMap<String, String>,
    pub timestamp: Option<OffsetDateTime>,
}

/// One priced SKU in a proposal. Amounts are whole rupees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub sku: String,
    pub quantity: i64,
    pub material_cost: i64,
    pub test_cost: i64,
    pub total: i64,
}

impl LineItem {
    pub fn quote(product: &SkuProduct, quantity: i64) -> Self {
        let material_cost = (product.price_per_meter * quantity as f64).round() as i64;
        Self {
            sku: product.sku_code.clone(),
            quantity,
            material_cost,
            test_cost: product.test_cost,
            total: material_cost + product.test_cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportData {
    pub rfp: Rfp,
    pub selected_products: Vec<LineItem>,
    pub total_price: i64,
    pub match_percentage: f64,
    pub timestamp: OffsetDateTime,
}

impl ReportData {
    pub fn total_material_cost(&self) -> i64 {
        self.selected_products
            .iter()
            .map(|item| item.material_cost)
            .sum()
    }

    pub fn total_test_cost(&self) -> i64 {
        self.selected_products.iter().map(|item| item.test_cost).sum()
    }

    pub fn total_quantity(&self) -> i64 {
        self.selected_products.iter().map(|item| item.quantity).sum()
    }

    pub fn line_total_sum(&self) -> i64 {
        self.selected_products.iter().map(|item| item.total).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardMetrics {
    pub total: usize,
    pub analyzed: usize,
    pub submitted: usize,
}

impl DashboardMetrics {
    pub fn from_rfps(rfps: &[Rfp]) -> Self {
        Self {
            total: rfps.len(),
            analyzed: rfps.iter().filter(|rfp| rfp.status.is_analyzed()).count(),
            submitted: rfps
                .iter()
                .filter(|rfp| rfp.status == RfpStatus::Submitted)
                .count(),
        }
    }
}

/// Result of the one-shot table read. A failure carries the logged reason and no rows.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Loaded(Vec<Rfp>),
    Failed(String),
}

impl FetchOutcome {
    pub fn rfps(&self) -> &[Rfp] {
        match self {
            Self::Loaded(rfps) => rfps,
            Self::Failed(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Loaded(_) => None,
            Self::Failed(error) => Some(error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Sales,
    Technical,
    Pricing,
    Orchestrator,
}

impl PanelKind {
    pub const ALL: [Self; 4] = [
        Self::Sales,
        Self::Technical,
        Self::Pricing,
        Self::Orchestrator,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Sales => "Sales",
            Self::Technical => "Technical",
            Self::Pricing => "Pricing",
            Self::Orchestrator => "Orchestrator",
        }
    }

    pub const fn agent(self) -> AgentName {
        match self {
            Self::Sales => AgentName::Sales,
            Self::Technical => AgentName::Technical,
            Self::Pricing => AgentName::Pricing,
            Self::Orchestrator => AgentName::Orchestrator,
        }
    }

    pub const fn subtitle(self) -> &'static str {
        match self {
            Self::Sales => "RFP Detection & Identification",
            Self::Technical => "Specification Matching & SKU Analysis",
            Self::Pricing => "Cost Analysis & Quote Generation",
            Self::Orchestrator => "Response Consolidation & Coordination",
        }
    }

    pub const fn badge(self) -> &'static str {
        match self {
            Self::Sales | Self::Pricing => "ACTIVE",
            Self::Technical => "PROCESSING",
            Self::Orchestrator => "ORCHESTRATING",
        }
    }

    /// The agent a panel hands its work to; the orchestrator is the last stage.
    pub const fn downstream(self) -> Option<Self> {
        match self {
            Self::Sales => Some(Self::Technical),
            Self::Technical => Some(Self::Pricing),
            Self::Pricing => Some(Self::Orchestrator),
            Self::Orchestrator => None,
        }
    }
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

// `date` columns arrive as `2025-11-15`; tolerate a trailing time part.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(|value| {
        let day = value.trim().get(..10)?;
        Date::parse(day, format_description!("[year]-[month]-[day]")).ok()
    }))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .and_then(|value| OffsetDateTime::parse(value.trim(), &Rfc3339).ok()))
}
