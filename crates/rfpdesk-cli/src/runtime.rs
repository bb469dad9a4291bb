// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use rfpdesk_app::{ChatTiming, FetchOutcome, catalog, sort_newest_first};
use rfpdesk_report::{ExportKind, ExportReceipt, Exporter};
use rfpdesk_tui::InternalEvent;
use std::sync::mpsc::Sender;
use std::thread;
use time::OffsetDateTime;

#[derive(Debug, Clone)]
pub enum RfpSource {
    Demo,
    Remote(rfpdesk_remote::Client),
}

impl RfpSource {
    pub fn fetch(&self) -> FetchOutcome {
        match self {
            Self::Demo => {
                let mut rows = catalog::demo_rfps(OffsetDateTime::now_utc());
                sort_newest_first(&mut rows);
                tracing::info!(count = rows.len(), "loaded demo rfps");
                FetchOutcome::Loaded(rows)
            }
            Self::Remote(client) => client.fetch_rfps(),
        }
    }
}

pub struct CliRuntime {
    source: RfpSource,
    exporter: Exporter,
    chat_timing: ChatTiming,
}

impl CliRuntime {
    pub fn new(source: RfpSource, exporter: Exporter, chat_timing: ChatTiming) -> Self {
        Self {
            source,
            exporter,
            chat_timing,
        }
    }

    /// Builds a fresh report stamped now and hands it to the exporter.
    pub fn export(&self, kind: ExportKind) -> Result<ExportReceipt> {
        let report = catalog::sample_report(OffsetDateTime::now_utc());
        self.exporter.export(kind, &report)
    }
}

impl rfpdesk_tui::AppRuntime for CliRuntime {
    fn fetch_rfps(&mut self) -> FetchOutcome {
        self.source.fetch()
    }

    fn spawn_fetch(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let source = self.source.clone();
        thread::Builder::new()
            .name("rfp-fetch".to_owned())
            .spawn(move || {
                let outcome = source.fetch();
                if tx.send(InternalEvent::RfpsLoaded(outcome)).is_err() {
                    tracing::debug!("fetch finished after the ui exited");
                }
            })
            .context("spawn fetch thread")?;
        Ok(())
    }

    fn export_report(&mut self, kind: ExportKind) -> Result<ExportReceipt> {
        self.export(kind)
    }

    fn chat_timing(&self) -> ChatTiming {
        self.chat_timing
    }
}
