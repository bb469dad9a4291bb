// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rfpdesk_app::{LineItem, ReportData};
use serde::Serialize;
use time::macros::format_description;

use crate::format::{format_percent, iso_timestamp};

pub(crate) const AGENT_NOTES: [&str; 4] = [
    "All selected SKUs are in stock and can be delivered within 30 days",
    "Recommended products have highest technical compatibility and cost efficiency",
    "Includes comprehensive testing as per RFP requirements",
    "Competitive pricing based on volume discounts",
];

// Field order here is the key order in the written file.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Draft<'a> {
    metadata: Metadata,
    rfp_details: RfpDetails<'a>,
    proposed_solution: ProposedSolution<'a>,
    pricing: Pricing,
    agent_notes: [&'static str; 4],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    generated_at: String,
    version: &'static str,
    status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RfpDetails<'a> {
    title: &'a str,
    source: &'a str,
    due_date: String,
    scope: &'a str,
    requirements: &'a str,
    testing_needs: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProposedSolution<'a> {
    match_accuracy: String,
    #[serde(rename = "selectedSKUs")]
    selected_skus: &'a [LineItem],
    total_quantity: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Pricing {
    total_material_cost: i64,
    total_testing_cost: i64,
    total_price: i64,
    currency: &'static str,
}

/// Pretty-printed JSON draft of `report`, two-space indented.
pub fn generate_draft_json(report: &ReportData) -> String {
    let rfp = &report.rfp;
    let draft = Draft {
        metadata: Metadata {
            generated_at: iso_timestamp(report.timestamp),
            version: "1.0",
            status: "draft",
        },
        rfp_details: RfpDetails {
            title: &rfp.title,
            source: &rfp.source,
            due_date: rfp
                .due_date
                .and_then(|date| date.format(format_description!("[year]-[month]-[day]")).ok())
                .unwrap_or_default(),
            scope: &rfp.scope,
            requirements: &rfp.requirements,
            testing_needs: &rfp.testing_needs,
        },
        proposed_solution: ProposedSolution {
            match_accuracy: format_percent(report.match_percentage),
            selected_skus: &report.selected_products,
            total_quantity: report.total_quantity(),
        },
        pricing: Pricing {
            total_material_cost: report.total_material_cost(),
            total_testing_cost: report.total_test_cost(),
            total_price: report.total_price,
            currency: "INR",
        },
        agent_notes: AGENT_NOTES,
    };

    // Plain structs of strings and integers always serialize.
    serde_json::to_string_pretty(&draft).unwrap_or_default()
}
