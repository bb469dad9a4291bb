// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::PanelKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatVisibility {
    Hidden,
    Visible,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub active_panel: PanelKind,
    pub chat: ChatVisibility,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            active_panel: PanelKind::Sales,
            chat: ChatVisibility::Hidden,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextPanel,
    PrevPanel,
    SelectPanel(PanelKind),
    ForwardToNextAgent,
    OpenChat,
    CloseChat,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    PanelChanged(PanelKind),
    ChatVisibilityChanged(ChatVisibility),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextPanel => self.rotate_panel(1),
            AppCommand::PrevPanel => self.rotate_panel(-1),
            AppCommand::SelectPanel(panel) => {
                if self.active_panel == panel {
                    return Vec::new();
                }
                self.active_panel = panel;
                vec![AppEvent::PanelChanged(panel)]
            }
            AppCommand::ForwardToNextAgent => match self.active_panel.downstream() {
                Some(next) => {
                    let message = format!(
                        "forwarded to {}",
                        next.agent().display_name().to_ascii_lowercase()
                    );
                    self.active_panel = next;
                    vec![AppEvent::PanelChanged(next), self.set_status(&message)]
                }
                None => vec![self.set_status("orchestrator is the final stage")],
            },
            AppCommand::OpenChat => {
                self.chat = ChatVisibility::Visible;
                vec![
                    AppEvent::ChatVisibilityChanged(self.chat),
                    self.set_status("chat open"),
                ]
            }
            AppCommand::CloseChat => {
                self.chat = ChatVisibility::Hidden;
                vec![
                    AppEvent::ChatVisibilityChanged(self.chat),
                    self.set_status("chat hidden"),
                ]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_panel(&mut self, delta: isize) -> Vec<AppEvent> {
        let panels = PanelKind::ALL;
        let current = panels
            .iter()
            .position(|panel| *panel == self.active_panel)
            .unwrap_or(0) as isize;
        let len = panels.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_panel = panels[next];
        vec![AppEvent::PanelChanged(self.active_panel)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState, ChatVisibility};
    use crate::PanelKind;

    #[test]
    fn panel_rotation_wraps_both_ways() {
        let mut state = AppState {
            active_panel: PanelKind::Orchestrator,
            ..AppState::default()
        };

        let events = state.dispatch(AppCommand::NextPanel);
        assert_eq!(state.active_panel, PanelKind::Sales);
        assert_eq!(events, vec![AppEvent::PanelChanged(PanelKind::Sales)]);

        state.dispatch(AppCommand::PrevPanel);
        assert_eq!(state.active_panel, PanelKind::Orchestrator);
    }

    #[test]
    fn selecting_the_active_panel_emits_nothing() {
        let mut state = AppState::default();
        assert!(state.dispatch(AppCommand::SelectPanel(PanelKind::Sales)).is_empty());

        let events = state.dispatch(AppCommand::SelectPanel(PanelKind::Pricing));
        assert_eq!(events, vec![AppEvent::PanelChanged(PanelKind::Pricing)]);
    }

    #[test]
    fn forward_moves_to_downstream_agent_with_status() {
        let mut state = AppState::default();

        let events = state.dispatch(AppCommand::ForwardToNextAgent);
        assert_eq!(state.active_panel, PanelKind::Technical);
        assert_eq!(
            events,
            vec![
                AppEvent::PanelChanged(PanelKind::Technical),
                AppEvent::StatusUpdated("forwarded to technical agent".to_owned()),
            ]
        );
    }

    #[test]
    fn forward_from_orchestrator_stays_put() {
        let mut state = AppState {
            active_panel: PanelKind::Orchestrator,
            ..AppState::default()
        };

        let events = state.dispatch(AppCommand::ForwardToNextAgent);
        assert_eq!(state.active_panel, PanelKind::Orchestrator);
        assert_eq!(
            events,
            vec![AppEvent::StatusUpdated(
                "orchestrator is the final stage".to_owned()
            )]
        );
    }

    #[test]
    fn open_and_close_chat() {
        let mut state = AppState::default();

        let opened = state.dispatch(AppCommand::OpenChat);
        assert_eq!(state.chat, ChatVisibility::Visible);
        assert_eq!(
            opened,
            vec![
                AppEvent::ChatVisibilityChanged(ChatVisibility::Visible),
                AppEvent::StatusUpdated("chat open".to_owned()),
            ],
        );

        state.dispatch(AppCommand::CloseChat);
        assert_eq!(state.chat, ChatVisibility::Hidden);
        assert_eq!(state.status_line.as_deref(), Some("chat hidden"));
    }

    #[test]
    fn set_and_clear_status() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::SetStatus("draft saved".to_owned()));
        assert_eq!(state.status_line.as_deref(), Some("draft saved"));

        let events = state.dispatch(AppCommand::ClearStatus);
        assert!(state.status_line.is_none());
        assert_eq!(events, vec![AppEvent::StatusCleared]);
    }
}
