// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Fixed dashboard content for the agent panels and the sample proposal.

use std::collections::BTreeMap;
use time::macros::date;
use time::{Duration, OffsetDateTime};

use crate::{
    AgentLog, AgentLogId, AgentLogStatus, AgentName, LineItem, MatchId, ReportData, Rfp, RfpId,
    RfpMatch, RfpStatus, SkuId, SkuProduct,
};

pub const APP_TITLE: &str = "Agentic AI RFP Optimizer";
pub const COMPANY: &str = "Asian Paints - Wires & Cables Division";

pub const ANALYSIS_TARGET: &str = "Mumbai Metro Phase 3";
pub const ANALYSIS_PROGRESS: u16 = 75;
pub const RESPONSE_TIME: &str = "2.3 minutes";
pub const AI_INSIGHT: &str = "Based on historical data, this configuration has a 92% success probability. Consider adding value-added services like expedited delivery for competitive advantage.";

pub const FEATURED_RFP_ID: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStep {
    pub label: &'static str,
    pub active: bool,
}

pub const PIPELINE_STEPS: [PipelineStep; 5] = [
    PipelineStep {
        label: "Identify",
        active: true,
    },
    PipelineStep {
        label: "Analyze",
        active: true,
    },
    PipelineStep {
        label: "Match",
        active: true,
    },
    PipelineStep {
        label: "Price",
        active: false,
    },
    PipelineStep {
        label: "Submit",
        active: false,
    },
];

/// A catalog SKU next to its precomputed fit against the featured RFP.
#[derive(Debug, Clone, PartialEq)]
pub struct TechnicalMatch {
    pub product: SkuProduct,
    pub fit: RfpMatch,
}

struct CatalogRow {
    sku_code: &'static str,
    product_name: &'static str,
    voltage: &'static str,
    conductor_type: &'static str,
    price_per_meter: f64,
    test_cost: i64,
    match_score: f64,
    quantity: i64,
    recommended: bool,
}

const CATALOG: [CatalogRow; 4] = [
    CatalogRow {
        sku_code: "WC-11000-CU-XLPE",
        product_name: "11kV Copper XLPE Cable",
        voltage: "11kV",
        conductor_type: "Copper",
        price_per_meter: 520.0,
        test_cost: 15_000,
        match_score: 94.5,
        quantity: 25_000,
        recommended: true,
    },
    CatalogRow {
        sku_code: "WC-11000-AL-XLPE",
        product_name: "11kV Aluminum XLPE Cable",
        voltage: "11kV",
        conductor_type: "Aluminum",
        price_per_meter: 350.25,
        test_cost: 15_000,
        match_score: 87.2,
        quantity: 5_000,
        recommended: true,
    },
    CatalogRow {
        sku_code: "WC-6600-CU-XLPE",
        product_name: "6.6kV Copper XLPE Cable",
        voltage: "6.6kV",
        conductor_type: "Copper",
        price_per_meter: 410.0,
        test_cost: 12_000,
        match_score: 72.8,
        quantity: 0,
        recommended: true,
    },
    CatalogRow {
        sku_code: "WC-3300-CU-XLPE",
        product_name: "3.3kV Copper XLPE Cable",
        voltage: "3.3kV",
        conductor_type: "Copper",
        price_per_meter: 300.0,
        test_cost: 10_000,
        match_score: 58.5,
        quantity: 0,
        recommended: false,
    },
];

pub fn featured_rfp() -> Rfp {
    Rfp {
        id: RfpId::new(FEATURED_RFP_ID),
        title: "Industrial Cable Supply - Mumbai Metro Phase 3".to_owned(),
        source: "https://mahadiscom.procurement.gov.in".to_owned(),
        due_date: Some(date!(2025 - 11 - 15)),
        scope: "Supply of 11kV XLPE insulated power cables for metro underground sections. Total requirement: 25,000 meters.".to_owned(),
        requirements: "Voltage: 11kV, Conductor: Copper, Insulation: XLPE, IS 7098 Part 2 compliant, Flame retardant".to_owned(),
        testing_needs: "Type tests: High voltage test, Partial discharge test, Fire resistance test".to_owned(),
        status: RfpStatus::Matched,
        match_percentage: 94.5,
        total_price: 14_781_250.0,
        created_at: None,
        updated_at: None,
    }
}

pub fn technical_matches() -> Vec<TechnicalMatch> {
    CATALOG
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let product = SkuProduct {
                id: SkuId::new(format!("sku-{}", index + 1)),
                sku_code: row.sku_code.to_owned(),
                product_name: row.product_name.to_owned(),
                voltage: row.voltage.to_owned(),
                conductor_type: row.conductor_type.to_owned(),
                insulation: "XLPE".to_owned(),
                price_per_meter: row.price_per_meter,
                test_cost: row.test_cost,
                stock_available: true,
            };
            let line = LineItem::quote(&product, row.quantity);
            let fit = RfpMatch {
                id: MatchId::new(format!("match-{}", index + 1)),
                rfp_id: RfpId::new(FEATURED_RFP_ID),
                sku_id: product.id.clone(),
                match_score: row.match_score,
                quantity: row.quantity,
                total_material_cost: line.material_cost,
                total_test_cost: if row.quantity > 0 { line.test_cost } else { 0 },
                subtotal: if row.quantity > 0 { line.total } else { 0 },
                recommended: row.recommended,
            };
            TechnicalMatch { product, fit }
        })
        .collect()
}

pub fn recommended_count(matches: &[TechnicalMatch]) -> usize {
    matches.iter().filter(|entry| entry.fit.recommended).count()
}

/// Line items for every SKU the pricing agent actually allocated meters to.
pub fn pricing_breakdown() -> Vec<LineItem> {
    technical_matches()
        .iter()
        .filter(|entry| entry.fit.quantity > 0)
        .map(|entry| LineItem::quote(&entry.product, entry.fit.quantity))
        .collect()
}

pub fn collaboration_log() -> Vec<AgentLog> {
    [
        (AgentName::Sales, "RFP Identified & Summarized"),
        (AgentName::Technical, "Spec Matching Complete"),
        (AgentName::Pricing, "Cost Analysis Finalized"),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (agent, action))| AgentLog {
        id: AgentLogId::new(format!("log-{}", index + 1)),
        rfp_id: RfpId::new(FEATURED_RFP_ID),
        agent,
        action: action.to_owned(),
        status: AgentLogStatus::Completed,
        details: BTreeMap::new(),
        timestamp: None,
    })
    .collect()
}

/// The proposal every export action writes, stamped with `now`.
pub fn sample_report(now: OffsetDateTime) -> ReportData {
    let mut rfp = featured_rfp();
    rfp.created_at = Some(now);
    rfp.updated_at = Some(now);

    let selected_products = pricing_breakdown();
    let total_price = selected_products.iter().map(|item| item.total).sum();
    ReportData {
        match_percentage: rfp.match_percentage,
        rfp,
        selected_products,
        total_price,
        timestamp: now,
    }
}

/// Seeded rows behind `--demo`, spread across every pipeline status.
pub fn demo_rfps(now: OffsetDateTime) -> Vec<Rfp> {
    let mut featured = featured_rfp();
    featured.created_at = Some(now - Duration::hours(2));
    featured.updated_at = featured.created_at;

    let seeded = [
        (
            "2",
            "HT Power Cable Tender - Pune Ring Road",
            "https://punemetro.tenders.gov.in",
            date!(2025 - 12 - 05),
            "Supply and laying of 33kV aluminium armoured cables along the ring road corridor.",
            "Voltage: 33kV, Conductor: Aluminum, Insulation: XLPE, Armoured",
            "Routine tests, Impulse withstand test",
            RfpStatus::Detected,
            0.0,
            0.0,
            Duration::hours(5),
        ),
        (
            "3",
            "Control Cable Supply - Nagpur Substation Upgrade",
            "https://msetcl.procurement.gov.in",
            date!(2025 - 11 - 28),
            "Multi-core copper control cables for substation bay extensions.",
            "Voltage: 1.1kV, Conductor: Copper, Insulation: PVC, FRLS sheath",
            "Insulation resistance test, Flame propagation test",
            RfpStatus::Analyzed,
            81.0,
            0.0,
            Duration::days(1),
        ),
        (
            "4",
            "LT Cable Rate Contract - Thane Smart City",
            "https://thanesmartcity.etenders.in",
            date!(2025 - 10 - 30),
            "Annual rate contract for LT distribution cables across smart city works.",
            "Voltage: 1.1kV, Conductor: Aluminum, Insulation: XLPE",
            "Routine tests as per IS 7098 Part 1",
            RfpStatus::Submitted,
            88.4,
            6_420_000.0,
            Duration::days(3),
        ),
    ];

    let mut rows = vec![featured];
    rows.extend(seeded.into_iter().map(
        |(
            id,
            title,
            source,
            due_date,
            scope,
            requirements,
            testing_needs,
            status,
            match_percentage,
            total_price,
            age,
        )| {
            let created = now - age;
            Rfp {
                id: RfpId::new(id),
                title: title.to_owned(),
                source: source.to_owned(),
                due_date: Some(due_date),
                scope: scope.to_owned(),
                requirements: requirements.to_owned(),
                testing_needs: testing_needs.to_owned(),
                status,
                match_percentage,
                total_price,
                created_at: Some(created),
                updated_at: Some(created),
            }
        },
    ));
    rows
}
