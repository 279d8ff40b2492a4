use serde::{Deserialize, Serialize};
use unburden_core::config::IntentKeywords;

/// Intent categories for incoming messages.
/// Used to decide whether a message can be answered from a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageIntent {
    /// Needs the user personally, never auto-replied.
    Urgent,
    /// Asks the user to do something.
    Request,
    /// Invitations and small talk.
    Social,
    /// Updates that only need an acknowledgement.
    Info,
    /// Nothing matched.
    General,
}

impl MessageIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageIntent::Urgent => "urgent",
            MessageIntent::Request => "request",
            MessageIntent::Social => "social",
            MessageIntent::Info => "info",
            MessageIntent::General => "general",
        }
    }

    pub fn needs_personal_attention(&self) -> bool {
        matches!(self, MessageIntent::Urgent)
    }
}

struct IntentRule {
    intent: MessageIntent,
    keywords: Vec<String>,
}

pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(&IntentKeywords::default())
    }
}

impl IntentClassifier {
    /// Rules are checked in order: urgent, request, social, info.
    pub fn new(keywords: &IntentKeywords) -> Self {
        let rule = |intent, words: &[String]| IntentRule {
            intent,
            keywords: words.iter().map(|w| w.to_lowercase()).collect(),
        };
        let rules = vec![
            rule(MessageIntent::Urgent, &keywords.urgent),
            rule(MessageIntent::Request, &keywords.request),
            rule(MessageIntent::Social, &keywords.social),
            rule(MessageIntent::Info, &keywords.info),
        ];
        Self { rules }
    }

    pub fn classify(&self, content: &str) -> MessageIntent {
        let content_lower = content.to_lowercase();
        self.rules
            .iter()
            .find(|rule| Self::rule_matches(rule, &content_lower))
            .map(|rule| rule.intent)
            .unwrap_or(MessageIntent::General)
    }

    fn rule_matches(rule: &IntentRule, content_lower: &str) -> bool {
        rule.keywords
            .iter()
            .any(|kw| !kw.is_empty() && content_lower.contains(kw.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_order() {
        let classifier = IntentClassifier::default();
        assert_eq!(
            classifier.classify("URGENT: could you sign this?"),
            MessageIntent::Urgent
        );
        assert_eq!(
            classifier.classify("Could you review the deck?"),
            MessageIntent::Request
        );
        assert_eq!(classifier.classify("Coffee next week?"), MessageIntent::Social);
        assert_eq!(classifier.classify("FYI the office is closed"), MessageIntent::Info);
        assert_eq!(classifier.classify("hello there"), MessageIntent::General);
    }

    #[test]
    fn test_custom_keywords() {
        let keywords = IntentKeywords {
            urgent: vec!["SOS".to_string()],
            request: vec![],
            social: vec![],
            info: vec![],
        };
        let classifier = IntentClassifier::new(&keywords);
        assert_eq!(classifier.classify("sos, server down"), MessageIntent::Urgent);
        assert_eq!(classifier.classify("please call"), MessageIntent::General);
        assert!(MessageIntent::Urgent.needs_personal_attention());
        assert!(!MessageIntent::Request.needs_personal_attention());
    }
}
