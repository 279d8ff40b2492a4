use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use unburden_core::config::{DeclineCondition, DeclineReason, Tone};
use unburden_core::{
    signal, ActionDetails, ActionIdGen, ActionKind, ActionStatus, AgentAction, EnergyState, Error,
    IncomingMessage, MeetingRequest, PermissionLevel, PersonalityProfile, Result, Signals,
    SocialConfig, SocialDetails,
};

use crate::energy::LOW_ENERGY_THRESHOLD;
use crate::intent::{IntentClassifier, MessageIntent};

const DEADLINE_DECLINE_LEVEL: f64 = 0.6;
const MINUTES_PER_REPLY: f64 = 2.0;
const ENERGY_PER_REPLY: f64 = 0.01;
const MINUTES_PER_SPAM: f64 = 0.5;
const ENERGY_PER_SPAM: f64 = 0.005;
const ENERGY_PER_DECLINE: f64 = 0.03;
const PROTECTION_MINUTES: f64 = 30.0;
const PROTECTION_ENERGY: f64 = 0.05;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialOutcome {
    pub actions: Vec<AgentAction>,
    /// Things the user no longer has to feel bad about.
    pub deleted_guilt_notes: Vec<String>,
}

struct CompiledTemplate {
    id: String,
    trigger: Regex,
    response: String,
}

/// Shields the user from low-value messages and meetings, scaled to how
/// much energy they have left.
pub struct SocialBuffer {
    config: SocialConfig,
    templates: Vec<CompiledTemplate>,
    classifier: IntentClassifier,
}

impl SocialBuffer {
    pub fn new(config: SocialConfig) -> Result<Self> {
        let templates = config
            .reply_templates
            .iter()
            .map(|t| {
                let trigger = Regex::new(&t.trigger).map_err(|e| {
                    Error::Validation(format!("reply template '{}': {}", t.id, e))
                })?;
                Ok(CompiledTemplate {
                    id: t.id.clone(),
                    trigger,
                    response: t.response.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let classifier = IntentClassifier::new(&config.intent_keywords);
        Ok(Self {
            config,
            templates,
            classifier,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &self,
        signals: &Signals,
        energy: &EnergyState,
        messages: &[IncomingMessage],
        meeting_requests: &[MeetingRequest],
        permission: PermissionLevel,
        personality: Option<&PersonalityProfile>,
        now: DateTime<Utc>,
        ids: &mut ActionIdGen,
    ) -> SocialOutcome {
        let mut outcome = SocialOutcome::default();
        let mut spam: Vec<&IncomingMessage> = Vec::new();

        for message in messages {
            if self.is_vip(message) {
                debug!(message = %message.id, "VIP sender, leaving for personal reply");
                continue;
            }
            if self.is_spam(message) {
                spam.push(message);
                continue;
            }
            if let Some(action) = self.auto_reply(message, permission, personality, now, ids) {
                outcome.actions.push(action);
            }
        }

        if !spam.is_empty() {
            let count = spam.len();
            let status = if permission == PermissionLevel::Observe {
                ActionStatus::Pending
            } else {
                ActionStatus::Executed
            };
            outcome.actions.push(
                Self::action(
                    ids,
                    now,
                    ActionKind::SpamFilter,
                    format!("Filtered {} low-priority message(s)", count),
                    SocialDetails::default(),
                )
                .with_status(status)
                .with_targets(spam.iter().map(|m| m.id.clone()))
                .with_savings(MINUTES_PER_SPAM * count as f64, ENERGY_PER_SPAM * count as f64)
                .with_reasoning("Sender or content matched a low-priority pattern", 0.9),
            );
            outcome.deleted_guilt_notes.extend(
                spam.iter()
                    .map(|m| format!("No need to answer {}", m.display_sender())),
            );
        }

        for request in meeting_requests {
            let handled = self.handle_meeting(request, signals, energy, permission, now, ids);
            if let Some((action, executed)) = handled {
                if executed {
                    outcome.deleted_guilt_notes.push(format!(
                        "Declined '{}' from {} without the awkward conversation",
                        request.title, request.requester
                    ));
                }
                outcome.actions.push(action);
            }
        }

        if energy.net_available < LOW_ENERGY_THRESHOLD {
            outcome.actions.push(
                Self::action(
                    ids,
                    now,
                    ActionKind::EnergyProtection,
                    "Do not disturb: holding non-urgent messages and meetings",
                    SocialDetails::default(),
                )
                .with_status(permission.gate())
                .with_savings(PROTECTION_MINUTES, PROTECTION_ENERGY)
                .with_reasoning(
                    format!(
                        "Net energy {:.0}% is below {:.0}%",
                        energy.net_available * 100.0,
                        LOW_ENERGY_THRESHOLD * 100.0
                    ),
                    0.9,
                ),
            );
        }

        info!(
            messages = messages.len(),
            meetings = meeting_requests.len(),
            spam = spam.len(),
            actions = outcome.actions.len(),
            "Social buffer run"
        );
        outcome
    }

    pub fn is_vip(&self, message: &IncomingMessage) -> bool {
        is_contact(&self.config.vip_contacts, &message.sender)
            || message
                .sender_name
                .as_deref()
                .is_some_and(|name| is_contact(&self.config.vip_contacts, name))
    }

    pub fn is_spam(&self, message: &IncomingMessage) -> bool {
        if self.is_vip(message) {
            return false;
        }
        let sender = message.sender.to_lowercase();
        let content = message.content.to_lowercase();
        self.config.low_priority_patterns.iter().any(|p| {
            let p = p.to_lowercase();
            !p.is_empty() && (sender.contains(&p) || content.contains(&p))
        })
    }

    pub fn classify(&self, message: &IncomingMessage) -> MessageIntent {
        self.classifier.classify(&message.content)
    }

    fn auto_reply(
        &self,
        message: &IncomingMessage,
        permission: PermissionLevel,
        personality: Option<&PersonalityProfile>,
        now: DateTime<Utc>,
        ids: &mut ActionIdGen,
    ) -> Option<AgentAction> {
        if !self.config.auto_reply_enabled {
            return None;
        }
        let intent = self.classify(message);
        if intent.needs_personal_attention() {
            debug!(message = %message.id, intent = intent.as_str(), "Needs personal attention");
            return None;
        }
        let template = self
            .templates
            .iter()
            .find(|t| t.trigger.is_match(&message.content))?;

        let reply = match personality {
            Some(profile) if self.config.mirror_personality => {
                apply_tone(&template.response, message.display_sender(), profile)
            }
            _ => template.response.clone(),
        };

        Some(
            Self::action(
                ids,
                now,
                ActionKind::AutoReply,
                format!("Reply to {} via {}", message.display_sender(), message.channel),
                SocialDetails {
                    contact: Some(message.sender.clone()),
                    message_id: Some(message.id.clone()),
                    channel: Some(message.channel.clone()),
                    reply_text: Some(reply),
                },
            )
            .with_status(permission.gate())
            .with_targets([message.id.clone()])
            .with_savings(MINUTES_PER_REPLY, ENERGY_PER_REPLY)
            .with_reasoning(
                format!("Intent {} matched template {}", intent.as_str(), template.id),
                0.75,
            ),
        )
    }

    /// Returns the action for a request that should not reach the user,
    /// and whether it was declined outright.
    fn handle_meeting(
        &self,
        request: &MeetingRequest,
        signals: &Signals,
        energy: &EnergyState,
        permission: PermissionLevel,
        now: DateTime<Utc>,
        ids: &mut ActionIdGen,
    ) -> Option<(AgentAction, bool)> {
        if is_contact(&self.config.priority_contacts, &request.requester) {
            return None;
        }
        let low_energy = energy.net_available < self.config.min_energy_for_social;
        let deadline = signals.get(signal::DEADLINE_PRESSURE) > DEADLINE_DECLINE_LEVEL
            && !request.is_required;
        if !low_energy && !deadline {
            return None;
        }

        let condition = if low_energy {
            DeclineCondition::LowEnergy
        } else {
            DeclineCondition::DeadlinePressure
        };
        let reason: Option<&DeclineReason> = self
            .config
            .decline_reasons
            .iter()
            .find(|r| r.condition == condition);
        let trigger = match condition {
            DeclineCondition::LowEnergy => format!(
                "Net energy {:.0}% is below the {:.0}% social minimum",
                energy.net_available * 100.0,
                self.config.min_energy_for_social * 100.0
            ),
            DeclineCondition::DeadlinePressure => {
                "Deadline pressure is high and attendance is optional".to_string()
            }
        };

        let details = SocialDetails {
            contact: Some(request.requester.clone()),
            message_id: Some(request.id.clone()),
            channel: None,
            reply_text: reason.map(|r| r.message.clone()),
        };

        let auto_apply = reason.is_some_and(|r| r.auto_apply);
        let may_decline = permission != PermissionLevel::Observe;
        if self.config.auto_decline_enabled && auto_apply && may_decline {
            let action = Self::action(
                ids,
                now,
                ActionKind::DeclineRequest,
                format!("Declined '{}' from {}", request.title, request.requester),
                details,
            )
            .with_status(ActionStatus::Executed)
            .with_targets([request.id.clone()])
            .with_savings(request.duration_minutes as f64, ENERGY_PER_DECLINE)
            .with_reasoning(trigger, 0.8);
            return Some((action, true));
        }

        let action = Self::action(
            ids,
            now,
            ActionKind::ScheduleMeeting,
            format!("Reschedule or decline '{}' from {}", request.title, request.requester),
            details,
        )
        .with_targets([request.id.clone()])
        .with_reasoning(trigger, 0.6);
        Some((action, false))
    }

    fn action(
        ids: &mut ActionIdGen,
        now: DateTime<Utc>,
        kind: ActionKind,
        description: impl Into<String>,
        details: SocialDetails,
    ) -> AgentAction {
        AgentAction::new(ids.next("soc"), now, kind, description, ActionDetails::Social(details))
    }
}

fn is_contact(contacts: &[String], who: &str) -> bool {
    contacts.iter().any(|c| c.eq_ignore_ascii_case(who.trim()))
}

fn apply_tone(response: &str, recipient: &str, profile: &PersonalityProfile) -> String {
    let body = match profile.tone {
        Tone::Formal => format!("Dear {},\n\n{}\n\nKind regards", recipient, response),
        Tone::Casual => format!("Hey {}! {}", recipient, response),
        Tone::Minimal => response
            .split_inclusive('.')
            .next()
            .unwrap_or(response)
            .trim()
            .to_string(),
    };
    match &profile.signature {
        Some(sig) if !sig.is_empty() => format!("{}\n{}", body, sig),
        _ => body,
    }
}
