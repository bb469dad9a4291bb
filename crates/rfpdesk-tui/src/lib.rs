// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};
use rfpdesk_app::catalog::{self, TechnicalMatch};
use rfpdesk_app::{
    AppCommand, AppState, ChatSender, ChatSession, ChatTiming, ChatVisibility, DashboardMetrics,
    FetchOutcome, LineItem, MatchTier, PanelKind, ReportData, Rfp, RfpId, SubmitOutcome,
};
use rfpdesk_report::{
    ExportKind, ExportReceipt, format_due_date, format_grouped, format_inr, format_percent,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use time::{Date, OffsetDateTime};

const IDLE_POLL: Duration = Duration::from_millis(120);
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const BAR_WIDTH: usize = 20;
const CHAT_VISIBLE_MESSAGES: usize = 12;

pub trait AppRuntime {
    fn fetch_rfps(&mut self) -> FetchOutcome;
    fn export_report(&mut self, kind: ExportKind) -> Result<ExportReceipt>;

    /// Delivers one fetch outcome over `tx`. Runtimes with a real backend
    /// override this to run the request off the UI thread.
    fn spawn_fetch(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let outcome = self.fetch_rfps();
        tx.send(InternalEvent::RfpsLoaded(outcome))
            .map_err(|_| anyhow::anyhow!("fetch event channel closed"))?;
        Ok(())
    }

    fn chat_timing(&self) -> ChatTiming {
        ChatTiming::default()
    }

    fn today(&self) -> Date {
        OffsetDateTime::now_utc().date()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    RfpsLoaded(FetchOutcome),
}

#[derive(Debug, Clone, PartialEq)]
enum RfpFeed {
    Loading,
    Ready(FetchOutcome),
}

impl RfpFeed {
    fn rfps(&self) -> &[Rfp] {
        match self {
            Self::Loading => &[],
            Self::Ready(outcome) => outcome.rfps(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct SalesUiState {
    cursor: usize,
    expanded: Option<RfpId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChatUiState {
    session: ChatSession,
    input: String,
}

#[derive(Debug, Clone, PartialEq)]
struct ViewData {
    feed: RfpFeed,
    sales: SalesUiState,
    chat: ChatUiState,
    technical: Vec<TechnicalMatch>,
    preview: ReportData,
    today: Date,
    fetch_in_flight: bool,
    help_visible: bool,
    status_token: u64,
}

impl ViewData {
    fn new(timing: ChatTiming, today: Date) -> Self {
        Self {
            feed: RfpFeed::Loading,
            sales: SalesUiState::default(),
            chat: ChatUiState {
                session: ChatSession::new(timing),
                input: String::new(),
            },
            technical: catalog::technical_matches(),
            preview: catalog::sample_report(OffsetDateTime::now_utc()),
            today,
            fetch_in_flight: false,
            help_visible: false,
            status_token: 0,
        }
    }
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(runtime.chat_timing(), runtime.today());
    let (internal_tx, internal_rx) = mpsc::channel();
    start_fetch(state, runtime, &mut view_data, &internal_tx);

    let mut last_tick = Instant::now();
    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        let now = Instant::now();
        view_data.chat.session.tick(now.duration_since(last_tick));
        last_tick = now;

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let timeout = view_data
            .chat
            .session
            .next_change_in()
            .map_or(IDLE_POLL, |next| next.clamp(Duration::from_millis(1), IDLE_POLL));
        let has_event = event::poll(timeout).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::RfpsLoaded(outcome) => apply_fetch_outcome(state, view_data, tx, outcome),
        }
    }
}

fn apply_fetch_outcome(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    outcome: FetchOutcome,
) {
    let message = match &outcome {
        FetchOutcome::Loaded(rows) => format!("loaded {} rfps", rows.len()),
        FetchOutcome::Failed(error) => format!("fetch failed: {error}"),
    };
    view_data.feed = RfpFeed::Ready(outcome);
    view_data.fetch_in_flight = false;

    let rows = view_data.feed.rfps();
    view_data.sales.cursor = view_data.sales.cursor.min(rows.len().saturating_sub(1));
    if let Some(expanded) = &view_data.sales.expanded
        && !rows.iter().any(|rfp| &rfp.id == expanded)
    {
        view_data.sales.expanded = None;
    }
    emit_status(state, view_data, tx, message);
}

/// Starts a fetch unless one is already outstanding.
fn start_fetch<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) -> bool {
    if view_data.fetch_in_flight {
        emit_status(state, view_data, tx, "fetch already running");
        return false;
    }
    view_data.feed = RfpFeed::Loading;
    view_data.fetch_in_flight = true;
    if let Err(error) = runtime.spawn_fetch(tx.clone()) {
        view_data.fetch_in_flight = false;
        let message = format!("{error:#}");
        tracing::error!(error = %message, "could not start rfp fetch");
        view_data.feed = RfpFeed::Ready(FetchOutcome::Failed(message));
    }
    true
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn dispatch_with_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let before = state.status_line.clone();
    state.dispatch(command);
    if state.status_line.is_some() && state.status_line != before {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
            emit_status(state, view_data, internal_tx, "help hidden");
        }
        return false;
    }

    if state.chat == ChatVisibility::Visible {
        handle_chat_overlay_key(state, view_data, internal_tx, key);
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) => return true,
        (KeyCode::Tab, _) => {
            dispatch_with_status(state, view_data, internal_tx, AppCommand::NextPanel);
        }
        (KeyCode::BackTab, _) => {
            dispatch_with_status(state, view_data, internal_tx, AppCommand::PrevPanel);
        }
        (KeyCode::Char(digit @ '1'..='4'), _) => {
            let index = digit as usize - '1' as usize;
            dispatch_with_status(
                state,
                view_data,
                internal_tx,
                AppCommand::SelectPanel(PanelKind::ALL[index]),
            );
        }
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
            emit_status(state, view_data, internal_tx, "help shown");
        }
        (KeyCode::Char('@' | 'c'), _) => {
            dispatch_with_status(state, view_data, internal_tx, AppCommand::OpenChat);
        }
        (KeyCode::Char('r'), _) => {
            if start_fetch(state, runtime, view_data, internal_tx) {
                emit_status(state, view_data, internal_tx, "refreshing rfps");
            }
        }
        (KeyCode::Char('>'), _) => {
            dispatch_with_status(state, view_data, internal_tx, AppCommand::ForwardToNextAgent);
        }
        _ => match state.active_panel {
            PanelKind::Sales => handle_sales_key(view_data, key),
            PanelKind::Orchestrator => {
                handle_orchestrator_key(state, runtime, view_data, internal_tx, key);
            }
            PanelKind::Technical | PanelKind::Pricing => {}
        },
    }
    false
}

fn handle_sales_key(view_data: &mut ViewData, key: KeyEvent) {
    let count = view_data.feed.rfps().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if view_data.sales.cursor + 1 < count {
                view_data.sales.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.sales.cursor = view_data.sales.cursor.saturating_sub(1);
        }
        KeyCode::Enter => {
            let Some(rfp) = view_data.feed.rfps().get(view_data.sales.cursor) else {
                return;
            };
            let id = rfp.id.clone();
            view_data.sales.expanded = if view_data.sales.expanded.as_ref() == Some(&id) {
                None
            } else {
                Some(id)
            };
        }
        _ => {}
    }
}

fn handle_orchestrator_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let kind = match key.code {
        KeyCode::Char('g') => ExportKind::Final,
        KeyCode::Char('p') => ExportKind::Html,
        KeyCode::Char('s') => ExportKind::Draft,
        _ => return,
    };

    let message = match runtime.export_report(kind) {
        Ok(receipt) => {
            let name = receipt
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| receipt.path.display().to_string());
            if receipt.opened {
                format!("saved {name}; opened viewer")
            } else {
                format!("saved {name}")
            }
        }
        Err(error) => {
            let message = format!("{error:#}");
            tracing::error!(kind = kind.as_str(), error = %message, "export failed");
            format!("export failed: {message}")
        }
    };
    emit_status(state, view_data, internal_tx, message);
}

fn handle_chat_overlay_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            dispatch_with_status(state, view_data, internal_tx, AppCommand::CloseChat);
        }
        (KeyCode::Enter, _) => submit_chat_input(state, view_data, internal_tx),
        (KeyCode::Backspace, _) => {
            view_data.chat.input.pop();
        }
        (KeyCode::Char(ch), modifiers) => {
            if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT {
                view_data.chat.input.push(ch);
            }
        }
        _ => {}
    }
}

fn submit_chat_input(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match view_data.chat.session.submit(&view_data.chat.input) {
        SubmitOutcome::Accepted(topic) => {
            tracing::debug!(?topic, "chat question accepted");
            view_data.chat.input.clear();
        }
        SubmitOutcome::Empty => {
            view_data.chat.input.clear();
            emit_status(state, view_data, internal_tx, "type a question first");
        }
        SubmitOutcome::Busy => {
            emit_status(state, view_data, internal_tx, "agent is still replying");
        }
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let metrics = DashboardMetrics::from_rfps(view_data.feed.rfps());
    let header = Paragraph::new(render_header_text(&metrics)).block(
        Block::default()
            .title(catalog::APP_TITLE)
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(header, layout[0]);

    let selected = PanelKind::ALL
        .iter()
        .position(|panel| *panel == state.active_panel)
        .unwrap_or(0);
    let tabs = Tabs::new(PanelKind::ALL.iter().map(|panel| panel_tab_title(*panel)))
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(panel_accent(state.active_panel))
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[1]);

    let body_text = if view_data.feed == RfpFeed::Loading && state.active_panel == PanelKind::Sales
    {
        render_loading_text()
    } else {
        match state.active_panel {
            PanelKind::Sales => render_sales_text(view_data),
            PanelKind::Technical => render_technical_text(&view_data.technical),
            PanelKind::Pricing => render_pricing_text(&view_data.preview.selected_products),
            PanelKind::Orchestrator => {
                render_orchestrator_text(&view_data.preview, view_data.today)
            }
        }
    };
    let body = Paragraph::new(body_text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(panel_title(state.active_panel))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(panel_accent(state.active_panel))),
        );
    frame.render_widget(body, layout[2]);

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status_widget, layout[3]);

    if state.chat == ChatVisibility::Visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let chat = Paragraph::new(render_chat_overlay_text(&view_data.chat))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title("Orchestrator Agent")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Magenta)),
            );
        frame.render_widget(chat, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn panel_accent(panel: PanelKind) -> Color {
    match panel {
        PanelKind::Sales => Color::Cyan,
        PanelKind::Technical => Color::Yellow,
        PanelKind::Pricing => Color::Green,
        PanelKind::Orchestrator => Color::Magenta,
    }
}

fn panel_tab_title(panel: PanelKind) -> String {
    let index = PanelKind::ALL
        .iter()
        .position(|candidate| *candidate == panel)
        .unwrap_or(0);
    format!("{} {}", index + 1, panel.label())
}

fn panel_title(panel: PanelKind) -> String {
    format!(
        "{} | {} | {}",
        panel.agent().display_name(),
        panel.subtitle(),
        panel.badge()
    )
}

fn render_header_text(metrics: &DashboardMetrics) -> String {
    let pipeline = catalog::PIPELINE_STEPS
        .iter()
        .map(|step| {
            let mark = if step.active { "●" } else { "○" };
            format!("{mark} {}", step.label)
        })
        .collect::<Vec<_>>()
        .join(" → ");
    [
        catalog::COMPANY.to_owned(),
        format!(
            "RFPs Detected: {} | Analyzed & Matched: {} | Submitted: {}",
            metrics.total, metrics.analyzed, metrics.submitted
        ),
        pipeline,
    ]
    .join("\n")
}

fn render_loading_text() -> String {
    "Loading AI Agents...".to_owned()
}

fn render_sales_text(view_data: &ViewData) -> String {
    let rows = view_data.feed.rfps();
    let mut lines = Vec::new();

    if let RfpFeed::Ready(FetchOutcome::Failed(error)) = &view_data.feed {
        lines.push(format!("fetch failed: {error}"));
        lines.push("press r to retry".to_owned());
        lines.push(String::new());
    }

    if rows.is_empty() {
        lines.push("No RFPs detected.".to_owned());
    }

    for (index, rfp) in rows.iter().enumerate() {
        let pointer = if index == view_data.sales.cursor {
            "▸"
        } else {
            " "
        };
        lines.push(format!("{pointer} {} [{}]", rfp.title, rfp.status.label()));
        lines.push(format!(
            "    {} | Due: {}",
            rfp.source_host(),
            format_due_date(rfp.due_date)
        ));

        if view_data.sales.expanded.as_ref() == Some(&rfp.id) {
            lines.push("    AI Summary".to_owned());
            lines.push(format!("      Scope: {}", rfp.scope));
            lines.push(format!("      Requirements: {}", rfp.requirements));
            lines.push(format!("      Testing Needs: {}", rfp.testing_needs));
            lines.push("      > Forward to Technical Agent".to_owned());
        }
    }

    lines.push(String::new());
    lines.push("j/k select | enter AI summary | > forward".to_owned());
    lines.join("\n")
}

fn render_technical_text(matches: &[TechnicalMatch]) -> String {
    let mut lines = vec![
        format!("Analyzing RFP: {}", catalog::ANALYSIS_TARGET),
        format!(
            "{} {}%",
            progress_bar(f64::from(catalog::ANALYSIS_PROGRESS), BAR_WIDTH),
            catalog::ANALYSIS_PROGRESS
        ),
        String::new(),
        "SKU Matching Results".to_owned(),
    ];

    for entry in matches {
        let marker = if entry.fit.recommended { "★" } else { " " };
        lines.push(format!(
            "{marker} {} {}",
            entry.product.sku_code, entry.product.product_name
        ));
        lines.push(format!(
            "    {} | {} | {}  {} {} ({})",
            entry.product.voltage,
            entry.product.conductor_type,
            entry.product.insulation,
            progress_bar(entry.fit.match_score, BAR_WIDTH),
            format_percent(entry.fit.match_score),
            tier_label(entry.fit.tier())
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "Top {} Recommendations Ready",
        catalog::recommended_count(matches)
    ));
    lines.join("\n")
}

fn tier_label(tier: MatchTier) -> &'static str {
    match tier {
        MatchTier::High => "high",
        MatchTier::Mid => "mid",
        MatchTier::Low => "low",
    }
}

fn render_pricing_text(items: &[LineItem]) -> String {
    let material: i64 = items.iter().map(|item| item.material_cost).sum();
    let testing: i64 = items.iter().map(|item| item.test_cost).sum();
    let grand_total: i64 = items.iter().map(|item| item.total).sum();
    let material_share = share_percent(material, grand_total);
    let testing_share = share_percent(testing, grand_total);

    let mut lines = vec![
        "Cost Breakdown".to_owned(),
        format!(
            "  Material Cost  {:>14}  {material_share:.1}% of total",
            format_inr(material)
        ),
        format!(
            "  Testing Cost   {:>14}  {testing_share:.1}% of total",
            format_inr(testing)
        ),
        format!("  Grand Total    {:>14}", format_inr(grand_total)),
        String::new(),
        "Distribution".to_owned(),
        format!(
            "  material {} {material_share:.1}%",
            progress_bar(material_share, BAR_WIDTH)
        ),
        format!(
            "  testing  {} {testing_share:.1}%",
            progress_bar(testing_share, BAR_WIDTH)
        ),
        String::new(),
        format!(
            "  {:<18} {:>10} {:>14} {:>10} {:>14}",
            "SKU", "Quantity", "Material", "Testing", "Total"
        ),
    ];
    for item in items {
        lines.push(format!(
            "  {:<18} {:>10} {:>14} {:>10} {:>14}",
            item.sku,
            format!("{} m", format_grouped(item.quantity)),
            format_inr(item.material_cost),
            format_inr(item.test_cost),
            format_inr(item.total)
        ));
    }
    lines.join("\n")
}

fn render_orchestrator_text(report: &ReportData, today: Date) -> String {
    let mut lines = vec!["Agent Collaboration Log".to_owned()];
    for entry in catalog::collaboration_log() {
        lines.push(format!(
            "  ✓ {:<16} {} ({})",
            entry.agent.display_name(),
            entry.action,
            entry.status.as_str()
        ));
    }

    lines.push(String::new());
    lines.push("Response Summary".to_owned());
    let summary = [
        ("RFP", catalog::ANALYSIS_TARGET.to_owned()),
        (
            "Selected Products",
            format!("{} SKUs", report.selected_products.len()),
        ),
        (
            "Total Quantity",
            format!("{} meters", format_grouped(report.total_quantity())),
        ),
        ("Match Accuracy", format_percent(report.match_percentage)),
        ("Response Time", catalog::RESPONSE_TIME.to_owned()),
        ("Total Quote", format_inr(report.total_price)),
    ];
    for (label, value) in summary {
        lines.push(format!("  {label:<18} {value}"));
    }

    lines.push(String::new());
    lines.push("Submission Deadline".to_owned());
    lines.push(format!(
        "  Due: {} ({})",
        format_due_date(report.rfp.due_date),
        deadline_note(report.rfp.due_date, today)
    ));

    lines.push(String::new());
    lines.push("AI Insight".to_owned());
    lines.push(format!("  {}", catalog::AI_INSIGHT));

    lines.push(String::new());
    lines.push(format!(
        "g {} | p {} | s {} | @ Open Agent Chat",
        ExportKind::Final.label(),
        ExportKind::Html.label(),
        ExportKind::Draft.label()
    ));
    lines.join("\n")
}

fn deadline_note(due: Option<Date>, today: Date) -> String {
    let Some(due) = due else {
        return "no due date".to_owned();
    };
    let days = (due - today).whole_days();
    match days {
        0 => "due today".to_owned(),
        1 => "1 day remaining".to_owned(),
        -1 => "overdue by 1 day".to_owned(),
        days if days > 0 => format!("{days} days remaining"),
        days => format!("overdue by {} days", -days),
    }
}

fn render_chat_overlay_text(chat: &ChatUiState) -> String {
    let session = &chat.session;
    let mut lines = Vec::new();

    let transcript = session.transcript();
    let keep = transcript.len().saturating_sub(CHAT_VISIBLE_MESSAGES);
    for message in transcript.iter().skip(keep) {
        let label = match message.sender {
            ChatSender::User => "you",
            ChatSender::Agent => "agent",
        };
        let cursor = if message.complete { "" } else { "▌" };
        lines.push(format!("{label}: {}{cursor}", message.content));
        lines.push(String::new());
    }

    if session.is_thinking() {
        lines.push("agent is thinking...".to_owned());
        lines.push(String::new());
    }

    if session.is_busy() {
        lines.push("> (waiting for agent)".to_owned());
    } else {
        lines.push(format!("> {}", chat.input));
    }
    lines.push("ask about pricing, timeline, specs, or recommendations | enter send | esc close".to_owned());
    lines.join("\n")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+c quit | q quit | ? help\n\
panels: tab/shift+tab cycle | 1-4 jump | > forward to next agent\n\
sales: j/k select | enter toggle AI summary | r refetch\n\
orchestrator: g final response | p export PDF | s save draft\n\
chat: @ or c open | type to edit | enter send | esc close"
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }
    let default = "tab/1-4 panels | j/k enter | > forward | g/p/s export | @ chat | r refetch | ? help | q quit";
    match &state.status_line {
        Some(status) => format!("{status} | {default}"),
        None => default.to_owned(),
    }
}

fn progress_bar(percent: f64, width: usize) -> String {
    let clamped = percent.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
}

fn share_percent(part: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / total as f64
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InternalEvent, RfpFeed, ViewData, deadline_note, handle_key_event,
        help_overlay_text, process_internal_events, progress_bar, render_chat_overlay_text,
        render_header_text, render_orchestrator_text, render_pricing_text, render_sales_text,
        render_technical_text, share_percent, status_text,
    };
    use anyhow::{Result, anyhow};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use rfpdesk_app::catalog;
    use rfpdesk_app::{
        AppState, ChatTiming, ChatVisibility, DashboardMetrics, FetchOutcome, PanelKind, Rfp,
        RfpStatus,
    };
    use rfpdesk_report::{ExportKind, ExportReceipt};
    use rfpdesk_testkit::RfpFaker;
    use std::path::PathBuf;
    use std::sync::mpsc;
    use std::time::Duration;
    use time::macros::date;

    #[derive(Debug, Default)]
    struct TestRuntime {
        rows: Vec<Rfp>,
        fetch_error: Option<String>,
        fetch_calls: usize,
        exports: Vec<ExportKind>,
        export_error: Option<String>,
    }

    impl TestRuntime {
        fn with_rows(count: usize) -> Self {
            let mut faker = RfpFaker::new(77);
            Self {
                rows: (0..count).map(|_| faker.rfp()).collect(),
                ..Self::default()
            }
        }
    }

    impl AppRuntime for TestRuntime {
        fn fetch_rfps(&mut self) -> FetchOutcome {
            self.fetch_calls += 1;
            match &self.fetch_error {
                Some(error) => FetchOutcome::Failed(error.clone()),
                None => FetchOutcome::Loaded(self.rows.clone()),
            }
        }

        fn export_report(&mut self, kind: ExportKind) -> Result<ExportReceipt> {
            self.exports.push(kind);
            if let Some(error) = &self.export_error {
                return Err(anyhow!("{error}"));
            }
            Ok(ExportReceipt {
                kind,
                path: PathBuf::from(format!("/tmp/out/{}.out", kind.as_str())),
                opened: kind.opens_viewer(),
            })
        }
    }

    fn view_data_for_test() -> ViewData {
        ViewData::new(
            ChatTiming {
                reply_delay: Duration::from_millis(500),
                typing_interval: Duration::from_millis(15),
            },
            date!(2025 - 10 - 16),
        )
    }

    fn internal_tx() -> mpsc::Sender<InternalEvent> {
        let (tx, _rx) = mpsc::channel();
        tx
    }

    fn press(
        state: &mut AppState,
        runtime: &mut TestRuntime,
        view_data: &mut ViewData,
        tx: &mpsc::Sender<InternalEvent>,
        code: KeyCode,
    ) -> bool {
        handle_key_event(
            state,
            runtime,
            view_data,
            tx,
            KeyEvent::new(code, KeyModifiers::NONE),
        )
    }

    fn loaded_view_data(runtime: &mut TestRuntime) -> ViewData {
        let mut view_data = view_data_for_test();
        view_data.feed = RfpFeed::Ready(runtime.fetch_rfps());
        view_data
    }

    #[test]
    fn header_shows_zero_metrics_for_empty_list() {
        let text = render_header_text(&DashboardMetrics::from_rfps(&[]));
        assert!(text.contains("RFPs Detected: 0 | Analyzed & Matched: 0 | Submitted: 0"));
        assert!(text.contains("● Identify → ● Analyze → ● Match → ○ Price → ○ Submit"));
        assert!(text.starts_with("Asian Paints - Wires & Cables Division"));
    }

    #[test]
    fn spawned_fetch_fills_feed_through_channel() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::with_rows(3);
        let mut view_data = view_data_for_test();
        let (tx, rx) = mpsc::channel();

        runtime
            .spawn_fetch(tx.clone())
            .expect("fetch should be delivered");
        process_internal_events(&mut state, &mut view_data, &tx, &rx);

        assert_eq!(view_data.feed.rfps().len(), 3);
        assert_eq!(state.status_line.as_deref(), Some("loaded 3 rfps"));
    }

    #[test]
    fn failed_fetch_renders_empty_list_and_status() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime {
            fetch_error: Some("server returned 503".to_owned()),
            ..TestRuntime::default()
        };
        let mut view_data = view_data_for_test();
        let (tx, rx) = mpsc::channel();

        runtime.spawn_fetch(tx.clone()).expect("fetch should be delivered");
        process_internal_events(&mut state, &mut view_data, &tx, &rx);

        assert!(view_data.feed.rfps().is_empty());
        assert_eq!(
            state.status_line.as_deref(),
            Some("fetch failed: server returned 503")
        );
        let text = render_sales_text(&view_data);
        assert!(text.contains("press r to retry"));
        assert!(text.contains("No RFPs detected."));
    }

    #[test]
    fn stale_status_clear_is_ignored() {
        let mut state = AppState::default();
        let mut view_data = view_data_for_test();
        let (tx, rx) = mpsc::channel();
        state.status_line = Some("kept".to_owned());
        view_data.status_token = 5;

        tx.send(InternalEvent::ClearStatus { token: 4 })
            .expect("send should succeed");
        process_internal_events(&mut state, &mut view_data, &tx, &rx);
        assert_eq!(state.status_line.as_deref(), Some("kept"));

        tx.send(InternalEvent::ClearStatus { token: 5 })
            .expect("send should succeed");
        process_internal_events(&mut state, &mut view_data, &tx, &rx);
        assert!(state.status_line.is_none());
    }

    #[test]
    fn tab_and_digits_switch_panels() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();
        let tx = internal_tx();

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Tab);
        assert_eq!(state.active_panel, PanelKind::Technical);

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::BackTab);
        assert_eq!(state.active_panel, PanelKind::Sales);

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('4'));
        assert_eq!(state.active_panel, PanelKind::Orchestrator);
    }

    #[test]
    fn forward_key_hands_off_to_next_agent() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();
        let tx = internal_tx();

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('>'));
        assert_eq!(state.active_panel, PanelKind::Technical);
        assert_eq!(
            state.status_line.as_deref(),
            Some("forwarded to technical agent")
        );
    }

    #[test]
    fn enter_toggles_single_expanded_summary() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::with_rows(3);
        let mut view_data = loaded_view_data(&mut runtime);
        let tx = internal_tx();
        let first = view_data.feed.rfps()[0].id.clone();
        let second = view_data.feed.rfps()[1].id.clone();

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Enter);
        assert_eq!(view_data.sales.expanded.as_ref(), Some(&first));
        assert!(render_sales_text(&view_data).contains("AI Summary"));

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('j'));
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Enter);
        assert_eq!(view_data.sales.expanded.as_ref(), Some(&second));

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Enter);
        assert!(view_data.sales.expanded.is_none());
        assert!(!render_sales_text(&view_data).contains("AI Summary"));
    }

    #[test]
    fn cursor_stays_within_rows() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::with_rows(2);
        let mut view_data = loaded_view_data(&mut runtime);
        let tx = internal_tx();

        for _ in 0..5 {
            press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('j'));
        }
        assert_eq!(view_data.sales.cursor, 1);
        for _ in 0..5 {
            press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('k'));
        }
        assert_eq!(view_data.sales.cursor, 0);
    }

    #[test]
    fn refetch_is_refused_while_loading() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::with_rows(1);
        let mut view_data = view_data_for_test();
        let tx = internal_tx();
        view_data.fetch_in_flight = true;

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('r'));
        assert_eq!(runtime.fetch_calls, 0);
        assert_eq!(state.status_line.as_deref(), Some("fetch already running"));

        view_data.feed = RfpFeed::Ready(FetchOutcome::Loaded(Vec::new()));
        view_data.fetch_in_flight = false;
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('r'));
        assert_eq!(runtime.fetch_calls, 1);
        assert_eq!(state.status_line.as_deref(), Some("refreshing rfps"));
    }

    #[test]
    fn export_keys_run_on_orchestrator_panel_only() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();
        let tx = internal_tx();

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('s'));
        assert!(runtime.exports.is_empty());

        state.active_panel = PanelKind::Orchestrator;
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('s'));
        assert_eq!(state.status_line.as_deref(), Some("saved draft.out"));
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('g'));
        assert_eq!(
            state.status_line.as_deref(),
            Some("saved final.out; opened viewer")
        );
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('p'));
        assert_eq!(
            runtime.exports,
            vec![ExportKind::Draft, ExportKind::Final, ExportKind::Html]
        );
    }

    #[test]
    fn export_failure_is_reported_in_status() {
        let mut state = AppState {
            active_panel: PanelKind::Orchestrator,
            ..AppState::default()
        };
        let mut runtime = TestRuntime {
            export_error: Some("write export /ro/x.html: permission denied".to_owned()),
            ..TestRuntime::default()
        };
        let mut view_data = view_data_for_test();
        let tx = internal_tx();

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('p'));
        assert_eq!(
            state.status_line.as_deref(),
            Some("export failed: write export /ro/x.html: permission denied")
        );
    }

    #[test]
    fn chat_overlay_captures_typing_and_sends() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();
        let tx = internal_tx();

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('@'));
        assert_eq!(state.chat, ChatVisibility::Visible);

        for ch in "cost?".chars() {
            press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char(ch));
        }
        assert_eq!(view_data.chat.input, "cost?");

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Enter);
        assert!(view_data.chat.input.is_empty());
        assert!(view_data.chat.session.is_busy());
        assert!(render_chat_overlay_text(&view_data.chat).contains("agent is thinking..."));

        view_data.chat.session.tick(Duration::from_secs(30));
        let text = render_chat_overlay_text(&view_data.chat);
        assert!(text.contains("you: cost?"));
        assert!(text.contains("agent: The total cost breakdown is"));

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Esc);
        assert_eq!(state.chat, ChatVisibility::Hidden);
    }

    #[test]
    fn q_inside_chat_is_text_not_quit() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();
        let tx = internal_tx();

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('c'));
        let quit = press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('q'));
        assert!(!quit);
        assert_eq!(view_data.chat.input, "q");

        let quit = handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(quit);
    }

    #[test]
    fn busy_chat_refuses_second_question() {
        let mut state = AppState {
            chat: ChatVisibility::Visible,
            ..AppState::default()
        };
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();
        let tx = internal_tx();

        view_data.chat.input = "when".to_owned();
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Enter);
        view_data.chat.input = "price".to_owned();
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Enter);

        assert_eq!(view_data.chat.input, "price");
        assert_eq!(state.status_line.as_deref(), Some("agent is still replying"));
    }

    #[test]
    fn blank_chat_input_is_rejected() {
        let mut state = AppState {
            chat: ChatVisibility::Visible,
            ..AppState::default()
        };
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();
        let tx = internal_tx();

        view_data.chat.input = "   ".to_owned();
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Enter);
        assert!(!view_data.chat.session.is_busy());
        assert_eq!(view_data.chat.session.transcript().len(), 1);
        assert_eq!(state.status_line.as_deref(), Some("type a question first"));
    }

    #[test]
    fn help_overlay_swallows_keys_until_closed() {
        let mut state = AppState::default();
        let mut runtime = TestRuntime::default();
        let mut view_data = view_data_for_test();
        let tx = internal_tx();

        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('?'));
        assert!(view_data.help_visible);
        assert!(status_text(&state, &view_data).is_empty());

        let quit = press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Char('q'));
        assert!(!quit);
        press(&mut state, &mut runtime, &mut view_data, &tx, KeyCode::Esc);
        assert!(!view_data.help_visible);
        assert!(help_overlay_text().contains("g final response"));
    }

    #[test]
    fn sales_rows_show_host_due_date_and_badge() {
        let mut view_data = view_data_for_test();
        let mut rfp = catalog::featured_rfp();
        rfp.status = RfpStatus::Detected;
        view_data.feed = RfpFeed::Ready(FetchOutcome::Loaded(vec![rfp]));

        let text = render_sales_text(&view_data);
        assert!(text.contains("▸ Industrial Cable Supply - Mumbai Metro Phase 3 [Detected]"));
        assert!(text.contains("mahadiscom.procurement.gov.in | Due: 15 Nov 2025"));
    }

    #[test]
    fn technical_panel_lists_catalog_with_tiers() {
        let text = render_technical_text(&catalog::technical_matches());
        assert!(text.contains("Analyzing RFP: Mumbai Metro Phase 3"));
        assert!(text.contains("75%"));
        assert!(text.contains("★ WC-11000-CU-XLPE 11kV Copper XLPE Cable"));
        assert!(text.contains("58.5% (low)"));
        assert!(text.contains("Top 3 Recommendations Ready"));
    }

    #[test]
    fn pricing_panel_shows_shares_and_total() {
        let text = render_pricing_text(&catalog::pricing_breakdown());
        assert!(text.contains("₹1,47,81,250"));
        assert!(text.contains("99.8% of total"));
        assert!(text.contains("0.2% of total"));
        assert!(text.contains("25,000 m"));
    }

    #[test]
    fn pricing_panel_with_no_items_has_zero_shares() {
        let text = render_pricing_text(&[]);
        assert!(text.contains("0.0% of total"));
        assert!(text.contains("₹0"));
        assert_eq!(share_percent(10, 0), 0.0);
    }

    #[test]
    fn orchestrator_panel_summarizes_proposal() {
        let view_data = view_data_for_test();
        let text = render_orchestrator_text(&view_data.preview, view_data.today);
        assert!(text.contains("✓ Sales Agent"));
        assert!(text.contains("Selected Products  2 SKUs"));
        assert!(text.contains("Total Quantity     30,000 meters"));
        assert!(text.contains("Total Quote        ₹1,47,81,250"));
        assert!(text.contains("Due: 15 Nov 2025 (30 days remaining)"));
        assert!(text.contains("92% success probability"));
    }

    #[test]
    fn deadline_note_covers_past_and_future() {
        let due = Some(date!(2025 - 11 - 15));
        assert_eq!(deadline_note(due, date!(2025 - 11 - 14)), "1 day remaining");
        assert_eq!(deadline_note(due, date!(2025 - 11 - 15)), "due today");
        assert_eq!(deadline_note(due, date!(2025 - 11 - 20)), "overdue by 5 days");
        assert_eq!(deadline_note(None, date!(2025 - 11 - 20)), "no due date");
    }

    #[test]
    fn progress_bar_clamps_and_rounds() {
        assert_eq!(progress_bar(0.0, 4), "[░░░░]");
        assert_eq!(progress_bar(50.0, 4), "[██░░]");
        assert_eq!(progress_bar(140.0, 4), "[████]");
        assert_eq!(progress_bar(-3.0, 4), "[░░░░]");
    }
}
