// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use rfpdesk_app::ReportData;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use time::OffsetDateTime;

use crate::{generate_draft_json, generate_html_document, print_wrapper_html};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Draft,
    Html,
    Final,
}

impl ExportKind {
    pub const ALL: [Self; 3] = [Self::Final, Self::Html, Self::Draft];

    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" | "json" => Ok(Self::Draft),
            "html" | "pdf" => Ok(Self::Html),
            "final" => Ok(Self::Final),
            other => bail!("unknown export kind {other:?} -- expected draft, html, or final"),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Html => "html",
            Self::Final => "final",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Save Draft",
            Self::Html => "Export PDF",
            Self::Final => "Generate Final RFP Response",
        }
    }

    const fn file_prefix(self) -> &'static str {
        match self {
            Self::Draft => "RFP_Draft",
            Self::Html => "RFP_Response",
            Self::Final => "RFP_Final_Response",
        }
    }

    const fn extension(self) -> &'static str {
        match self {
            Self::Draft => "json",
            Self::Html | Self::Final => "html",
        }
    }

    pub const fn opens_viewer(self) -> bool {
        !matches!(self, Self::Draft)
    }

    /// The PDF kind wraps the document in a page that opens the print dialog.
    pub fn render(self, report: &ReportData) -> String {
        match self {
            Self::Draft => generate_draft_json(report),
            Self::Html => print_wrapper_html(&generate_html_document(report), &report.rfp.title),
            Self::Final => generate_html_document(report),
        }
    }
}

/// Collapses whitespace runs to `_` and replaces path separators.
pub fn sanitize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut in_space = false;
    for ch in title.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if matches!(ch, '/' | '\\') {
            out.push('_');
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn export_file_name(kind: ExportKind, title: &str, at: OffsetDateTime) -> String {
    let millis = at.unix_timestamp_nanos() / 1_000_000;
    format!(
        "{}_{}_{}.{}",
        kind.file_prefix(),
        sanitize_title(title),
        millis,
        kind.extension()
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub kind: ExportKind,
    pub path: PathBuf,
    pub opened: bool,
}

#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
    open_html: bool,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>, open_html: bool) -> Self {
        Self {
            dir: dir.into(),
            open_html,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the rendered report and, for HTML kinds, hands it to the viewer.
    /// A viewer failure is logged and reported as `opened: false`.
    pub fn export(&self, kind: ExportKind, report: &ReportData) -> Result<ExportReceipt> {
        let path = self.write(kind, report)?;
        let opened = if self.open_html && kind.opens_viewer() {
            match open_in_viewer(&path) {
                Ok(()) => true,
                Err(error) => {
                    tracing::warn!(path = %path.display(), error = %format!("{error:#}"), "could not open viewer");
                    false
                }
            }
        } else {
            false
        };
        Ok(ExportReceipt { kind, path, opened })
    }

    pub fn write(&self, kind: ExportKind, report: &ReportData) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create export dir {}", self.dir.display()))?;
        let path = self
            .dir
            .join(export_file_name(kind, &report.rfp.title, report.timestamp));
        fs::write(&path, kind.render(report))
            .with_context(|| format!("write export {}", path.display()))?;
        tracing::info!(kind = kind.as_str(), path = %path.display(), "exported report");
        Ok(path)
    }
}

/// Opens `path` with the platform's default handler without waiting for it.
pub fn open_in_viewer(path: &Path) -> Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        Command::new("xdg-open")
    };
    command
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("launch viewer for {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ExportKind, export_file_name, sanitize_title};
    use time::macros::datetime;

    #[test]
    fn sanitize_collapses_whitespace_and_separators() {
        assert_eq!(
            sanitize_title("Industrial Cable Supply - Mumbai Metro Phase 3"),
            "Industrial_Cable_Supply_-_Mumbai_Metro_Phase_3"
        );
        assert_eq!(sanitize_title("a \t\n b"), "a_b");
        assert_eq!(sanitize_title("HT/LT cables\\2025"), "HT_LT_cables_2025");
    }

    #[test]
    fn file_names_follow_kind() {
        let at = datetime!(2025-10-14 09:30:00.250 UTC);
        assert_eq!(
            export_file_name(ExportKind::Draft, "Pune Ring Road", at),
            "RFP_Draft_Pune_Ring_Road_1760434200250.json"
        );
        assert_eq!(
            export_file_name(ExportKind::Html, "Pune Ring Road", at),
            "RFP_Response_Pune_Ring_Road_1760434200250.html"
        );
        assert_eq!(
            export_file_name(ExportKind::Final, "Pune Ring Road", at),
            "RFP_Final_Response_Pune_Ring_Road_1760434200250.html"
        );
    }

    #[test]
    fn parse_accepts_aliases_and_rejects_unknown() {
        assert_eq!(ExportKind::parse("draft").ok(), Some(ExportKind::Draft));
        assert_eq!(ExportKind::parse("PDF").ok(), Some(ExportKind::Html));
        assert_eq!(ExportKind::parse(" final ").ok(), Some(ExportKind::Final));
        let error = ExportKind::parse("docx").expect_err("unknown kind should fail");
        assert!(error.to_string().contains("expected draft, html, or final"));
    }

    #[test]
    fn pdf_kind_wraps_document_for_printing() {
        let report = rfpdesk_app::catalog::sample_report(datetime!(2025-10-14 09:30:00 UTC));
        let pdf = ExportKind::Html.render(&report);
        assert!(pdf.contains("window.print();"));
        assert!(pdf.contains("TOTAL PROPOSAL VALUE:"));
        assert!(!ExportKind::Final.render(&report).contains("window.print();"));
    }

    #[test]
    fn only_html_kinds_open_the_viewer() {
        assert!(!ExportKind::Draft.opens_viewer());
        assert!(ExportKind::Html.opens_viewer());
        assert!(ExportKind::Final.opens_viewer());
    }
}
