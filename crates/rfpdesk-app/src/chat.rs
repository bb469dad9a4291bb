// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::Duration;

pub const GREETING: &str = "Hello! I'm the Orchestrator Agent. I've analyzed the Mumbai Metro Phase 3 RFP and compiled a comprehensive proposal. Feel free to ask me any questions about specifications, pricing, timeline, or recommendations.";

const DEFAULT_REPLY: &str = "I've analyzed the Mumbai Metro Phase 3 RFP. Our 11kV Copper XLPE cables are an excellent match with 94.5% compatibility. The proposal includes technical specs, pricing breakdown, and delivery timeline. Total quote is ₹14,781,250 for 30,000 meters with comprehensive testing.";
const PRICE_REPLY: &str = "The total cost breakdown is: Material cost ₹14,000,000 + Testing cost ₹20,000 + Delivery ₹25,000 = ₹14,045,000. Volume discounts of 5-8% are available for larger orders. Payment terms: 50% advance, 50% on delivery.";
const TIMELINE_REPLY: &str = "Expected delivery timeline is 30 days from order confirmation. We have sufficient stock of the recommended SKUs. Quality testing and certifications will be completed before shipment. Expedited delivery (15 days) is available at 10% premium.";
const SPECS_REPLY: &str = "The selected cables meet IS 7098 Part 2 standards, feature flame-retardant properties, and are suitable for underground installation. All products have been tested for voltage withstand, partial discharge, and fire resistance. Documentation and test certificates will be provided.";
const RECOMMENDATION_REPLY: &str = "Based on technical requirements, cost efficiency, and delivery capability, I recommend the 11kV Copper XLPE solution. It offers 94.5% spec match, competitive pricing, and proven reliability. Alternative aluminum option available at 8% cost reduction with slightly lower conductivity.";

pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_TYPING_INTERVAL: Duration = Duration::from_millis(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTopic {
    Pricing,
    Timeline,
    Specs,
    Recommendation,
    General,
}

// Checked in order; the first group with a hit wins.
const KEYWORD_GROUPS: [(ResponseTopic, &[&str]); 4] = [
    (ResponseTopic::Pricing, &["price", "cost", "quote"]),
    (ResponseTopic::Timeline, &["timeline", "delivery", "when"]),
    (ResponseTopic::Specs, &["spec", "technical", "requirement"]),
    (
        ResponseTopic::Recommendation,
        &["recommend", "best", "alternative"],
    ),
];

impl ResponseTopic {
    pub fn classify(input: &str) -> Self {
        let lowered = input.to_lowercase();
        KEYWORD_GROUPS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| lowered.contains(keyword)))
            .map(|(topic, _)| *topic)
            .unwrap_or(Self::General)
    }

    pub const fn reply(self) -> &'static str {
        match self {
            Self::Pricing => PRICE_REPLY,
            Self::Timeline => TIMELINE_REPLY,
            Self::Specs => SPECS_REPLY,
            Self::Recommendation => RECOMMENDATION_REPLY,
            Self::General => DEFAULT_REPLY,
        }
    }
}

pub fn respond(input: &str) -> &'static str {
    ResponseTopic::classify(input).reply()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatSender {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: ChatSender,
    pub content: String,
    pub complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatTiming {
    pub reply_delay: Duration,
    pub typing_interval: Duration,
}

impl Default for ChatTiming {
    fn default() -> Self {
        Self {
            reply_delay: DEFAULT_REPLY_DELAY,
            typing_interval: DEFAULT_TYPING_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(ResponseTopic),
    Empty,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChatPhase {
    Idle,
    Thinking {
        reply: &'static str,
        remaining: Duration,
    },
    Typing {
        reply: &'static str,
        revealed: usize,
        carry: Duration,
    },
}

/// Scripted transcript with a timer-driven character reveal.
///
/// The session never reads a clock; callers feed elapsed time through
/// [`ChatSession::tick`]. One interval reveals one character, and one more
/// interval after the last character marks the message complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    timing: ChatTiming,
    transcript: Vec<ChatMessage>,
    phase: ChatPhase,
    next_id: u64,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(ChatTiming::default())
    }
}

impl ChatSession {
    pub fn new(timing: ChatTiming) -> Self {
        let mut session = Self {
            timing,
            transcript: Vec::new(),
            phase: ChatPhase::Idle,
            next_id: 0,
        };
        session.push(ChatSender::Agent, GREETING.to_owned(), true);
        session
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn timing(&self) -> ChatTiming {
        self.timing
    }

    pub fn is_busy(&self) -> bool {
        !matches!(self.phase, ChatPhase::Idle)
    }

    /// True while the agent has been asked but its message has not appeared yet.
    pub fn is_thinking(&self) -> bool {
        matches!(self.phase, ChatPhase::Thinking { .. })
    }

    pub fn submit(&mut self, input: &str) -> SubmitOutcome {
        if self.is_busy() {
            return SubmitOutcome::Busy;
        }
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return SubmitOutcome::Empty;
        }

        let topic = ResponseTopic::classify(trimmed);
        self.push(ChatSender::User, trimmed.to_owned(), true);
        self.phase = ChatPhase::Thinking {
            reply: topic.reply(),
            remaining: self.timing.reply_delay,
        };
        SubmitOutcome::Accepted(topic)
    }

    /// Advances the timers by `elapsed`. Returns whether the transcript changed.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        let mut budget = elapsed;
        let mut changed = false;

        loop {
            match std::mem::replace(&mut self.phase, ChatPhase::Idle) {
                ChatPhase::Idle => return changed,
                ChatPhase::Thinking { reply, remaining } => {
                    if budget < remaining {
                        self.phase = ChatPhase::Thinking {
                            reply,
                            remaining: remaining - budget,
                        };
                        return changed;
                    }
                    budget -= remaining;
                    self.push(ChatSender::Agent, String::new(), false);
                    self.phase = ChatPhase::Typing {
                        reply,
                        revealed: 0,
                        carry: Duration::ZERO,
                    };
                    changed = true;
                }
                ChatPhase::Typing {
                    reply,
                    mut revealed,
                    carry,
                } => {
                    let interval = self.timing.typing_interval;
                    if interval.is_zero() {
                        self.finish_agent_message(reply);
                        return true;
                    }

                    let mut carry = carry + budget;
                    while carry >= interval {
                        carry -= interval;
                        let Some(next) = reply[revealed..].chars().next() else {
                            self.finish_agent_message(reply);
                            return true;
                        };
                        revealed += next.len_utf8();
                        self.set_agent_content(&reply[..revealed]);
                        changed = true;
                    }

                    self.phase = ChatPhase::Typing {
                        reply,
                        revealed,
                        carry,
                    };
                    return changed;
                }
            }
        }
    }

    /// Time until the next visible change, for sizing the UI poll timeout.
    pub fn next_change_in(&self) -> Option<Duration> {
        match self.phase {
            ChatPhase::Idle => None,
            ChatPhase::Thinking { remaining, .. } => Some(remaining),
            ChatPhase::Typing { carry, .. } => {
                Some(self.timing.typing_interval.saturating_sub(carry))
            }
        }
    }

    fn push(&mut self, sender: ChatSender, content: String, complete: bool) {
        self.next_id = self.next_id.saturating_add(1);
        self.transcript.push(ChatMessage {
            id: self.next_id,
            sender,
            content,
            complete,
        });
    }

    fn set_agent_content(&mut self, content: &str) {
        if let Some(message) = self.transcript.last_mut() {
            message.content.clear();
            message.content.push_str(content);
        }
    }

    fn finish_agent_message(&mut self, reply: &str) {
        if let Some(message) = self.transcript.last_mut() {
            message.content = reply.to_owned();
            message.complete = true;
        }
        self.phase = ChatPhase::Idle;
    }
}
