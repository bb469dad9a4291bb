// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

/// Rupees with Indian digit grouping: `₹1,47,81,250`.
pub fn format_inr(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut pairs = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (left, right) = rest.split_at(rest.len() - 2);
            pairs.push(right);
            rest = left;
        }
        pairs.push(rest);
        pairs.reverse();
        format!("{},{tail}", pairs.join(","))
    };
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}₹{grouped}")
}

/// Thousands grouping: `30,000`.
pub fn format_grouped(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_percent(value: f64) -> String {
    format!("{value}%")
}

/// `YYYY-MM-DDTHH:MM:SS.mmmZ` in UTC.
pub fn iso_timestamp(at: OffsetDateTime) -> String {
    at.to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        ))
        .unwrap_or_default()
}

pub fn format_generated_at(at: OffsetDateTime) -> String {
    at.to_offset(UtcOffset::UTC)
        .format(format_description!(
            "[day] [month repr:short] [year], [hour]:[minute]:[second] UTC"
        ))
        .unwrap_or_default()
}

/// Empty when the row carries no usable due date.
pub fn format_due_date(date: Option<Date>) -> String {
    date.and_then(|date| {
        date.format(format_description!("[day] [month repr:short] [year]"))
            .ok()
    })
    .unwrap_or_default()
}
