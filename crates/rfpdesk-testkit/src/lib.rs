// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use rfpdesk_app::{LineItem, ReportData, Rfp, RfpId, RfpStatus};
use serde_json::{Value, json};
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, Month, OffsetDateTime, Time};

const CITIES: [&str; 10] = [
    "Mumbai",
    "Pune",
    "Nagpur",
    "Nashik",
    "Thane",
    "Aurangabad",
    "Kolhapur",
    "Solapur",
    "Chennai",
    "Bengaluru",
];

const PROJECTS: [&str; 8] = [
    "Metro Phase 3",
    "Ring Road",
    "Substation Upgrade",
    "Smart City Works",
    "Airport Expansion",
    "Industrial Corridor",
    "Water Treatment Plant",
    "Rail Electrification",
];

const CABLE_KINDS: [&str; 6] = [
    "Industrial Cable Supply",
    "HT Power Cable Tender",
    "Control Cable Supply",
    "LT Cable Rate Contract",
    "Armoured Cable Procurement",
    "Instrumentation Cable Supply",
];

const PORTALS: [&str; 5] = [
    "https://mahadiscom.procurement.gov.in",
    "https://msetcl.procurement.gov.in",
    "https://etenders.gov.in",
    "https://punemetro.tenders.gov.in",
    "https://tnebltd.tenders.gov.in",
];

const VOLTAGES: [&str; 5] = ["1.1kV", "3.3kV", "6.6kV", "11kV", "33kV"];
const CONDUCTORS: [&str; 2] = ["Copper", "Aluminum"];
const TESTS: [&str; 5] = [
    "High voltage test",
    "Partial discharge test",
    "Fire resistance test",
    "Impulse withstand test",
    "Insulation resistance test",
];

const REFERENCE_YEAR: i32 = 2025;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator of tender rows. The same seed always yields the same rows.
#[derive(Debug, Clone)]
pub struct RfpFaker {
    rng: DeterministicRng,
    next_id: u64,
}

impl RfpFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_id: 0,
        }
    }

    pub fn rfp(&mut self) -> Rfp {
        let status = RfpStatus::ALL[self.rng.int_n(RfpStatus::ALL.len())];
        self.rfp_with_status(status)
    }

    pub fn rfp_with_status(&mut self, status: RfpStatus) -> Rfp {
        self.next_id += 1;
        let city = self.pick(&CITIES);
        let project = self.pick(&PROJECTS);
        let kind = self.pick(&CABLE_KINDS);
        let voltage = self.pick(&VOLTAGES);
        let conductor = self.pick(&CONDUCTORS);
        let meters = self.int_range(5, 40) * 1_000;
        let first_test = self.pick(&TESTS);
        let second_test = self.pick(&TESTS);

        let created = reference_now() + Duration::hours(self.int_range(0, 24 * 90));
        let due = created.date() + Duration::days(self.int_range(14, 60));
        let match_percentage = if status.is_analyzed() {
            self.int_range(550, 990) as f64 / 10.0
        } else {
            0.0
        };
        let total_price = if matches!(status, RfpStatus::Priced | RfpStatus::Submitted) {
            (meters * self.int_range(300, 600)) as f64
        } else {
            0.0
        };

        Rfp {
            id: RfpId::new(format!("rfp-{:04}", self.next_id)),
            title: format!("{kind} - {city} {project}"),
            source: self.pick(&PORTALS).to_owned(),
            due_date: Some(due),
            scope: format!(
                "Supply of {voltage} XLPE insulated power cables for {city} {project}. Total requirement: {meters} meters."
            ),
            requirements: format!(
                "Voltage: {voltage}, Conductor: {conductor}, Insulation: XLPE, IS 7098 Part 2 compliant"
            ),
            testing_needs: format!("Type tests: {first_test}, {second_test}"),
            status,
            match_percentage,
            total_price,
            created_at: Some(created),
            updated_at: Some(created),
        }
    }

    /// A report over `rfp` with line items whose totals add up to the report total.
    pub fn report_for(&mut self, rfp: Rfp, at: OffsetDateTime) -> ReportData {
        let count = self.int_range(1, 3) as usize;
        let selected_products = (0..count)
            .map(|index| {
                let quantity = self.int_range(1, 30) * 1_000;
                let material_cost = quantity * self.int_range(250, 600);
                let test_cost = self.int_range(5, 20) * 1_000;
                LineItem {
                    sku: format!("WC-FIX-{:02}", index + 1),
                    quantity,
                    material_cost,
                    test_cost,
                    total: material_cost + test_cost,
                }
            })
            .collect::<Vec<_>>();
        let total_price = selected_products.iter().map(|item| item.total).sum();
        ReportData {
            match_percentage: rfp.match_percentage,
            rfp,
            selected_products,
            total_price,
            timestamp: at,
        }
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

/// The JSON object the hosted table returns for `rfp`.
pub fn row_json(rfp: &Rfp) -> Value {
    let timestamp = |value: Option<OffsetDateTime>| {
        value.map(|at| at.format(&Rfc3339).expect("fixture timestamp formats"))
    };
    let due_date = rfp.due_date.map(|date| {
        date.format(format_description!("[year]-[month]-[day]"))
            .expect("fixture date formats")
    });
    json!({
        "id": rfp.id.as_str(),
        "title": rfp.title,
        "source": rfp.source,
        "due_date": due_date,
        "scope": rfp.scope,
        "requirements": rfp.requirements,
        "testing_needs": rfp.testing_needs,
        "status": rfp.status.as_str(),
        "match_percentage": rfp.match_percentage,
        "total_price": rfp.total_price,
        "created_at": timestamp(rfp.created_at),
        "updated_at": timestamp(rfp.updated_at),
    })
}

pub fn rows_json(rfps: &[Rfp]) -> String {
    Value::Array(rfps.iter().map(row_json).collect()).to_string()
}

pub fn temp_export_dir() -> Result<tempfile::TempDir> {
    tempfile::tempdir().context("create temp export dir")
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

pub fn fixture_datetime() -> OffsetDateTime {
    midnight_utc(REFERENCE_YEAR, Month::October, 14) + Duration::minutes(9 * 60 + 30)
}

fn reference_now() -> OffsetDateTime {
    midnight_utc(REFERENCE_YEAR, Month::January, 1)
}

fn midnight_utc(year: i32, month: Month, day: u8) -> OffsetDateTime {
    let date = Date::from_calendar_date(year, month, day).expect("valid calendar date");
    date.with_time(Time::MIDNIGHT).assume_utc()
}
