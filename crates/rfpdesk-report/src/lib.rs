// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod draft;
mod export;
mod format;
mod html;

pub use draft::generate_draft_json;
pub use export::{ExportKind, ExportReceipt, Exporter, export_file_name, open_in_viewer, sanitize_title};
pub use format::{format_due_date, format_generated_at, format_grouped, format_inr, format_percent, iso_timestamp};
pub use html::{generate_html_document, html_escape, print_wrapper_html};
