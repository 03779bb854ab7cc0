//! Built-in response strategies, one per intent family.
//!
//! Selection is deterministic: phrasing rotates with the session's user
//! message count.

use colloquy_core::errors::ColloquyResult;
use colloquy_core::models::{
    ConversationSession, EntityType, Intent, IntentType, Metadata, Response,
};
use colloquy_core::traits::IResponseGenerator;
use serde_json::json;

const GREETINGS: &[&str] = &[
    "Hello! I'm your intelligent assistant. How can I help you today?",
    "Hi there! I'm excited to assist you. What would you like to know?",
    "Good day! I'm here to help with any questions you have.",
    "Hey! I'm ready to help. What's on your mind?",
];

const GREETING_FOLLOW_UPS: &[&str] = &[
    "What would you like to know about?",
    "How can I assist you today?",
    "What topic interests you?",
    "Do you have any specific questions?",
];

const CAPABILITIES: &[&str] = &[
    "I can help you with product recommendations and comparisons",
    "I can discuss sports topics, especially football",
    "I can answer general questions and provide information",
    "I can engage in natural conversation on various topics",
];

const HELP_EXAMPLES: &[&str] = &[
    "Try asking: 'Tell me about laptops'",
    "Try asking: 'What's the best phone under $500?'",
    "Try asking: 'Let's discuss football'",
    "Try asking: 'Help me choose a tablet'",
];

const CONVERSATION_REPLIES: &[&str] = &[
    "That's interesting! Tell me more about what you're thinking.",
    "I'd love to hear your perspective on that.",
    "That's a great point. What else is on your mind?",
    "I'm here to listen. What would you like to discuss next?",
];

const FAREWELLS: &[&str] = &[
    "Thanks for chatting! Come back any time.",
    "Goodbye! It was great talking with you.",
];

struct ProductFacts {
    product_type: &'static str,
    kinds: &'static [&'static str],
    features: &'static [&'static str],
    brands: &'static [&'static str],
}

const PRODUCT_FACTS: &[ProductFacts] = &[
    ProductFacts {
        product_type: "laptop",
        kinds: &["Ultrabook", "Gaming", "Business", "Student"],
        features: &["Processor", "Ram", "Storage", "Display", "Battery"],
        brands: &["Apple", "Dell", "HP", "Lenovo", "Microsoft"],
    },
    ProductFacts {
        product_type: "phone",
        kinds: &["Flagship", "Mid Range", "Budget", "Camera Focused"],
        features: &["Camera", "Battery", "Display", "Processor", "Storage"],
        brands: &["Apple", "Samsung", "Google", "OnePlus", "Xiaomi"],
    },
    ProductFacts {
        product_type: "tablet",
        kinds: &["Productivity", "Entertainment", "Creative", "Budget"],
        features: &["Display", "Processor", "Storage", "Stylus Support", "Battery"],
        brands: &["Apple", "Samsung", "Microsoft", "Amazon", "Lenovo"],
    },
];

const BUDGET_QUESTION: &str = "What's your budget range?";
const BRAND_QUESTION: &str = "Do you have any brand preferences?";
const PRODUCT_QUESTIONS: &[&str] = &[
    BUDGET_QUESTION,
    "What will you use it for primarily?",
    BRAND_QUESTION,
    "Any specific features you need?",
];

/// Closed set of strategies, selected by intent type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStrategy {
    Greeting,
    Help,
    ProductInquiry,
    Sports,
    Farewell,
    Conversation,
}

impl ResponseStrategy {
    pub fn for_intent(intent_type: IntentType) -> Self {
        match intent_type {
            IntentType::Greeting => Self::Greeting,
            IntentType::HelpRequest => Self::Help,
            IntentType::ProductInquiry => Self::ProductInquiry,
            IntentType::SportsTopic => Self::Sports,
            IntentType::Farewell => Self::Farewell,
            IntentType::GeneralQuestion | IntentType::Conversation | IntentType::Unknown => {
                Self::Conversation
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Help => "help",
            Self::ProductInquiry => "product_inquiry",
            Self::Sports => "sports",
            Self::Farewell => "farewell",
            Self::Conversation => "conversation",
        }
    }

    pub fn respond(&self, intent: &Intent, session: &ConversationSession) -> Response {
        let turn = session.context.message_count;
        let mut metadata = Metadata::new();
        metadata.insert("strategy".into(), json!(self.as_str()));

        let (text, confidence, follow_ups) = match self {
            Self::Greeting => {
                let base = rotate(GREETINGS, turn);
                let text = if turn > 0 {
                    format!("Welcome back! {}", base.to_lowercase())
                } else {
                    base.to_string()
                };
                (text, 0.9, take_rotated(GREETING_FOLLOW_UPS, turn, 2))
            }
            Self::Help => {
                let capabilities = bullets(CAPABILITIES.iter().copied());
                let examples = bullets(take_rotated(HELP_EXAMPLES, turn, 2).iter().map(String::as_str));
                let text = format!(
                    "I'm your intelligent assistant! Here's what I can do:\n\n{capabilities}\n\nHere are some examples to get you started:\n{examples}\n\nWhat would you like to explore?"
                );
                metadata.insert("capabilities_count".into(), json!(CAPABILITIES.len()));
                let follow_ups = vec![
                    "What topic interests you most?".to_string(),
                    "Do you need help with something specific?".to_string(),
                    "Would you like product recommendations?".to_string(),
                ];
                (text, 0.95, follow_ups)
            }
            Self::ProductInquiry => {
                let product_type = first_entity(intent, EntityType::ProductType).unwrap_or("product");
                metadata.insert("product_type".into(), json!(product_type));
                (product_text(product_type), 0.85, product_follow_ups(intent))
            }
            Self::Sports => {
                let sport = first_entity(intent, EntityType::Sport).unwrap_or("football");
                metadata.insert("sport".into(), json!(sport));
                let team = first_entity(intent, EntityType::Team);
                let follow_ups = [
                    "Which team do you support?",
                    "What's your favorite tournament?",
                    "Do you follow any specific players?",
                ]
                .map(String::from)
                .to_vec();
                (sports_text(sport, team), 0.8, follow_ups)
            }
            Self::Farewell => (
                rotate(FAREWELLS, turn).to_string(),
                0.9,
                Vec::new(),
            ),
            Self::Conversation => {
                let base = rotate(CONVERSATION_REPLIES, turn);
                let text = if turn > 3 {
                    format!("I'm really enjoying our conversation! {}", base.to_lowercase())
                } else {
                    base.to_string()
                };
                let follow_ups = ["What's on your mind?", "Want to explore a new topic?"]
                    .map(String::from)
                    .to_vec();
                (text, 0.7, follow_ups)
            }
        };

        Response {
            text,
            confidence,
            intent_type: intent.intent_type,
            follow_up_questions: follow_ups,
            metadata,
        }
    }
}

/// Default [`IResponseGenerator`] backed by [`ResponseStrategy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateResponseGenerator;

impl IResponseGenerator for TemplateResponseGenerator {
    fn generate(&self, intent: &Intent, session: &ConversationSession) -> ColloquyResult<Response> {
        Ok(ResponseStrategy::for_intent(intent.intent_type).respond(intent, session))
    }
}

fn rotate<'a>(options: &[&'a str], turn: usize) -> &'a str {
    options[turn % options.len()]
}

fn take_rotated(options: &[&str], turn: usize, n: usize) -> Vec<String> {
    (0..n.min(options.len()))
        .map(|i| options[(turn + i) % options.len()].to_string())
        .collect()
}

fn bullets<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    lines.map(|l| format!("• {l}")).collect::<Vec<_>>().join("\n")
}

fn first_entity(intent: &Intent, entity: EntityType) -> Option<&str> {
    intent
        .entities
        .get(&entity)
        .and_then(|values| values.first())
        .map(String::as_str)
}

fn product_text(product_type: &str) -> String {
    let lookup = match product_type {
        "smartphone" | "iphone" | "android" => "phone",
        "computer" | "pc" | "mac" => "laptop",
        other => other,
    };
    match PRODUCT_FACTS.iter().find(|f| f.product_type == lookup) {
        Some(facts) => format!(
            "Great choice looking at {product_type}s! Let me help you understand the options:\n\n\
             **Types of {product_type}s:**\n{}\n\n\
             **Key Features to Consider:**\n{}\n\n\
             **Popular Brands:**\n• {}\n\n\
             To give you the best recommendation, I'd love to know more about your needs!",
            bullets(facts.kinds.iter().copied()),
            bullets(facts.features.iter().copied()),
            facts.brands.join(", "),
        ),
        None => "I'd be happy to help you find the perfect product! Tell me about your budget, \
                 what you'll use it for and any brand preferences. What specific type of product \
                 are you interested in?"
            .to_string(),
    }
}

fn product_follow_ups(intent: &Intent) -> Vec<String> {
    let has_price = intent.entities.contains_key(&EntityType::PriceRange);
    let has_brand = intent.entities.contains_key(&EntityType::Brand);
    PRODUCT_QUESTIONS
        .iter()
        .filter(|q| !(has_price && **q == BUDGET_QUESTION))
        .filter(|q| !(has_brand && **q == BRAND_QUESTION))
        .take(3)
        .map(|q| q.to_string())
        .collect()
}

fn sports_text(sport: &str, team: Option<&str>) -> String {
    match (sport, team) {
        ("football" | "soccer", Some(team)) => format!(
            "Great choice supporting {}! Football is such an amazing sport. I can discuss match \
             analysis, player performances, tactics and league standings. What aspect of \
             football would you like to explore?",
            title_case(team)
        ),
        ("football" | "soccer", None) => "Football is absolutely incredible! The beautiful game \
             combines athleticism, strategy and passion like nothing else. Who's your favorite \
             team, or what aspect of football interests you most?"
            .to_string(),
        (other, _) => format!(
            "{} is a fantastic sport! I'd love to hear your thoughts on recent games, players or \
             tournaments. What aspects of {other} do you enjoy most?",
            title_case(other)
        ),
    }
}

pub(crate) fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
