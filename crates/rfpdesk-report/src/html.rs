// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rfpdesk_app::ReportData;
use rfpdesk_app::catalog::COMPANY;
use std::fmt::Write as _;

use crate::format::{format_due_date, format_generated_at, format_grouped, format_inr};

const RECOMMENDATIONS: [&str; 6] = [
    "All selected SKUs meet or exceed the technical specifications mentioned in the RFP",
    "Products are certified to Indian Standards (IS) and international compliance",
    "Delivery timeline: 30 days from order confirmation",
    "Includes comprehensive testing and quality certification",
    "Volume-based pricing offers competitive cost advantage",
    "Our technical team is available for post-delivery support and troubleshooting",
];

const STYLE: &str = r#"
    * { margin: 0; padding: 0; box-sizing: border-box; }
    body { font-family: Arial, sans-serif; color: #333; line-height: 1.6; }
    .container { max-width: 900px; margin: 0 auto; padding: 40px; }
    .header { background: linear-gradient(135deg, #0f172a 0%, #1e293b 100%); color: white; padding: 30px; border-radius: 8px; margin-bottom: 30px; }
    .header h1 { font-size: 28px; margin-bottom: 10px; }
    .header .company { font-size: 14px; opacity: 0.9; }
    .header .generated { font-size: 12px; margin-top: 5px; }
    .section { margin-bottom: 30px; page-break-inside: avoid; }
    .section-title { font-size: 16px; font-weight: bold; color: #0f172a; border-bottom: 2px solid #0ea5e9; padding-bottom: 10px; margin-bottom: 15px; }
    .info-grid { display: grid; grid-template-columns: 1fr 1fr; gap: 20px; margin-bottom: 15px; }
    .info-item { background: #f5f5f5; padding: 12px; border-radius: 4px; margin-top: 10px; }
    .info-label { font-size: 12px; color: #666; font-weight: bold; margin-bottom: 5px; }
    .info-value { font-size: 14px; color: #333; }
    .products-table { width: 100%; border-collapse: collapse; margin-bottom: 15px; }
    .products-table th { background: #0f172a; color: white; padding: 12px; text-align: left; font-size: 12px; }
    .products-table td { padding: 10px 12px; border-bottom: 1px solid #ddd; font-size: 13px; }
    .products-table tr:nth-child(even) { background: #f9f9f9; }
    .pricing-summary { background: #f0f9ff; border-left: 4px solid #0ea5e9; padding: 15px; border-radius: 4px; margin-bottom: 15px; }
    .pricing-row { display: flex; justify-content: space-between; margin-bottom: 8px; font-size: 13px; }
    .pricing-row.total { border-top: 1px solid #0ea5e9; padding-top: 10px; font-weight: bold; font-size: 14px; color: #0f172a; }
    .notes { background: #f5f5f5; padding: 12px; border-radius: 4px; font-size: 12px; }
    .notes li { margin-left: 20px; margin-bottom: 5px; }
    .footer { text-align: center; font-size: 11px; color: #999; margin-top: 40px; padding-top: 20px; border-top: 1px solid #ddd; }
    .match-badge { display: inline-block; background: #10b981; color: white; padding: 6px 12px; border-radius: 20px; font-size: 12px; font-weight: bold; }
"#;

pub fn html_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Self-contained printable proposal for `report`.
///
/// Every interpolated field is escaped; missing fields render as empty cells.
pub fn generate_html_document(report: &ReportData) -> String {
    let rfp = &report.rfp;
    let mut html = String::with_capacity(8 * 1024);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", html_escape(&rfp.title));
    let _ = writeln!(html, "<style>{STYLE}</style>\n</head>\n<body>\n<div class=\"container\">");

    html.push_str("<div class=\"header\">\n<h1>RFP Response Proposal</h1>\n");
    let _ = writeln!(html, "<p class=\"company\">{}</p>", html_escape(COMPANY));
    let _ = writeln!(
        html,
        "<p class=\"generated\">Generated on {}</p>\n</div>",
        format_generated_at(report.timestamp)
    );

    html.push_str("<div class=\"section\">\n<div class=\"section-title\">RFP Details</div>\n");
    html.push_str("<div class=\"info-grid\">\n");
    push_info_item(&mut html, "Project Title", &rfp.title);
    push_info_item(&mut html, "Due Date", &format_due_date(rfp.due_date));
    html.push_str("</div>\n");
    push_info_item(&mut html, "Scope", &rfp.scope);
    push_info_item(&mut html, "Technical Requirements", &rfp.requirements);
    push_info_item(&mut html, "Testing Requirements", &rfp.testing_needs);
    html.push_str("</div>\n");

    let _ = writeln!(
        html,
        "<div class=\"section\">\n<div class=\"section-title\">Proposed Solution <span class=\"match-badge\">{}% Match</span></div>",
        report.match_percentage
    );
    html.push_str(
        "<table class=\"products-table\">\n<thead>\n<tr><th>SKU Code</th><th>Quantity</th><th>Material Cost</th><th>Testing Cost</th><th>Total</th></tr>\n</thead>\n<tbody>\n",
    );
    for item in &report.selected_products {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{} m</td><td>{}</td><td>{}</td><td><strong>{}</strong></td></tr>",
            html_escape(&item.sku),
            format_grouped(item.quantity),
            format_inr(item.material_cost),
            format_inr(item.test_cost),
            format_inr(item.total),
        );
    }
    html.push_str("</tbody>\n</table>\n</div>\n");

    html.push_str("<div class=\"section\">\n<div class=\"section-title\">Pricing Summary</div>\n");
    html.push_str("<div class=\"pricing-summary\">\n");
    push_pricing_row(
        &mut html,
        "",
        "Total Material Cost:",
        report.total_material_cost(),
    );
    push_pricing_row(&mut html, "", "Total Testing Cost:", report.total_test_cost());
    push_pricing_row(
        &mut html,
        " total",
        "TOTAL PROPOSAL VALUE:",
        report.total_price,
    );
    html.push_str("</div>\n</div>\n");

    html.push_str(
        "<div class=\"section\">\n<div class=\"section-title\">Agent Recommendations</div>\n<ul class=\"notes\">\n",
    );
    for note in RECOMMENDATIONS {
        let _ = writeln!(html, "<li>{note}</li>");
    }
    html.push_str("</ul>\n</div>\n");

    html.push_str("<div class=\"footer\">\n");
    html.push_str("<p>This is an AI-generated proposal by the Agentic AI RFP Optimizer System</p>\n");
    html.push_str("<p>For inquiries, contact: sales@asianpaints.com | +91-XXXX-XXXX-XXXX</p>\n");
    html.push_str("</div>\n</div>\n</body>\n</html>\n");
    html
}

/// Wraps a rendered document in a page that opens the print dialog on load.
pub fn print_wrapper_html(document: &str, title: &str) -> String {
    format!(
        "<html>\n<head>\n<title>{}</title>\n<script>\nwindow.onload = function() {{\n  window.print();\n  setTimeout(function() {{ window.close(); }}, 500);\n}}\n</script>\n</head>\n<body>{document}</body>\n</html>\n",
        html_escape(title)
    )
}

fn push_info_item(html: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        html,
        "<div class=\"info-item\">\n<div class=\"info-label\">{label}</div>\n<div class=\"info-value\">{}</div>\n</div>",
        html_escape(value)
    );
}

fn push_pricing_row(html: &mut String, modifier: &str, label: &str, amount: i64) {
    let _ = writeln!(
        html,
        "<div class=\"pricing-row{modifier}\">\n<span>{label}</span>\n<span>{}</span>\n</div>",
        format_inr(amount)
    );
}
