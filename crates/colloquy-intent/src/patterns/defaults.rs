//! Built-in pattern tables.
//!
//! Intent patterns run against normalized text (lowercase, punctuation turned
//! into spaces), so they spell contractions the way normalization leaves them.

use colloquy_core::models::{EntityType, IntentType};

use super::MatchTarget;

/// `(intent, pattern, target)` in evaluation order.
pub const INTENT_PATTERNS: &[(IntentType, &str, MatchTarget)] = &[
    (
        IntentType::Greeting,
        r"\b(hi|hello|hey|good morning|good afternoon|good evening|greetings)\b",
        MatchTarget::Normalized,
    ),
    (
        IntentType::Greeting,
        r"\b(how are you|how do you do|what s up|whats up)\b",
        MatchTarget::Normalized,
    ),
    (
        IntentType::Greeting,
        r"\b(nice to meet you|pleased to meet you)\b",
        MatchTarget::Normalized,
    ),
    (
        IntentType::Farewell,
        r"\b(bye|goodbye|see you|see ya|farewell|take care|good night|talk to you later)\b",
        MatchTarget::Normalized,
    ),
    (
        IntentType::HelpRequest,
        r"\b(help|assist|support|guide|how to|what can you do)\b",
        MatchTarget::Normalized,
    ),
    (
        IntentType::HelpRequest,
        r"\b(need help|require assistance|looking for help)\b",
        MatchTarget::Normalized,
    ),
    (
        IntentType::HelpRequest,
        r"\b(explain|show me|teach me|demonstrate)\b",
        MatchTarget::Normalized,
    ),
    (
        IntentType::ProductInquiry,
        r"\b(laptop|phone|tablet|computer|smartphone|iphone|android)s?\b",
        MatchTarget::Normalized,
    ),
    (
        IntentType::ProductInquiry,
        r"\b(buy|purchase|price|cost|recommend|suggest)\b",
        MatchTarget::Normalized,
    ),
    (
        IntentType::ProductInquiry,
        r"\b(features|specifications|review|comparison|best)\b",
        MatchTarget::Normalized,
    ),
    (
        IntentType::ProductInquiry,
        r"\b(choose|select|pick|which one|what is the best)\b",
        MatchTarget::Normalized,
    ),
    (
        IntentType::SportsTopic,
        r"\b(football|soccer|basketball|tennis|cricket|baseball)\b",
        MatchTarget::Normalized,
    ),
    (
        IntentType::SportsTopic,
        r"\b(game|match|team|player|score|goal|win|lose)s?\b",
        MatchTarget::Normalized,
    ),
    (
        IntentType::SportsTopic,
        r"\b(championship|league|tournament|world cup|premier league)\b",
        MatchTarget::Normalized,
    ),
    (
        IntentType::GeneralQuestion,
        r"\b(what|where|when|why|how|who|which)\b",
        MatchTarget::Normalized,
    ),
    (
        IntentType::GeneralQuestion,
        r"\b(tell me about|describe|define)\b",
        MatchTarget::Normalized,
    ),
    (IntentType::GeneralQuestion, r"\?\s*$", MatchTarget::Raw),
    (
        IntentType::Conversation,
        r"\b(i think|i feel|i love|i like|i hate|thanks|thank you|cool|awesome|interesting|nice|really)\b",
        MatchTarget::Normalized,
    ),
];

/// `(entity type, pattern)`. Each pattern exposes the canonical value as `value`.
pub const ENTITY_PATTERNS: &[(EntityType, &str)] = &[
    (
        EntityType::ProductType,
        r"(?i)\b(?P<value>laptop|phone|tablet|computer|smartphone|iphone|android|pc|mac)s?\b",
    ),
    (
        EntityType::PriceRange,
        r"(?i)(?P<value>\$?\d+\s*-\s*\$?\d+|\$?\d+\s*(?:to|and)\s*\$?\d+|under\s*\$?\d+|above\s*\$?\d+)\b",
    ),
    (
        EntityType::Brand,
        r"(?i)\b(?P<value>apple|samsung|dell|hp|lenovo|microsoft|sony|lg|google|oneplus)\b",
    ),
    (
        EntityType::Sport,
        r"(?i)\b(?P<value>football|soccer|basketball|tennis|cricket|baseball|golf|hockey)\b",
    ),
    (
        EntityType::Team,
        r"(?i)\b(?P<value>real madrid|barcelona|manchester united|liverpool|chelsea|arsenal|bayern munich)\b",
    ),
];

/// Discourse markers that tie an utterance to the previous turn.
pub const FOLLOW_UP_MARKERS: &[&str] = &[
    "what about",
    "how about",
    "and",
    "also",
    "what if",
    "tell me more",
    "can you explain",
    "why",
    "when",
];
