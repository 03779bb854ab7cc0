//! SportsAdvisor: football-focused topic and team knowledge.

use colloquy_core::errors::DelegationError;
use colloquy_core::models::{EntityType, IntentType};
use colloquy_core::traits::{AdvisorRequest, IDomainAdvisor};
use colloquy_intent::normalize::normalize;
use serde::Serialize;
use serde_json::{json, Value};

use super::first;
use crate::responses::title_case;

const NAME: &str = "sports_advisor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SportsTopic {
    MatchAnalysis,
    PlayerPerformance,
    TransferNews,
    Tactics,
    LeagueStandings,
    Tournaments,
    Historical,
    Predictions,
}

impl SportsTopic {
    /// Checked in order; the first topic with a keyword hit wins.
    const KEYWORDS: [(SportsTopic, &'static [&'static str]); 8] = [
        (Self::MatchAnalysis, &["match", "game", "score", "result", "performance", "played"]),
        (Self::PlayerPerformance, &["player", "goal", "assist", "form", "stats"]),
        (Self::TransferNews, &["transfer", "signing", "deal", "contract", "move", "rumor"]),
        (Self::Tactics, &["tactics", "formation", "strategy", "style", "system", "approach"]),
        (Self::LeagueStandings, &["league", "table", "standing", "position", "points", "rank"]),
        (Self::Tournaments, &["tournament", "cup", "championship", "trophy", "final", "knockout"]),
        (Self::Historical, &["history", "legend", "past", "record", "achievement", "memorable"]),
        (Self::Predictions, &["predict", "future", "chance", "expect", "forecast"]),
    ];

    /// Keywords match whole words of the normalized utterance, plural `s` allowed.
    pub fn detect(utterance: &str) -> Self {
        let normalized = normalize(utterance);
        let tokens: Vec<&str> = normalized.split(' ').collect();
        let hit = |w: &str| {
            tokens
                .iter()
                .any(|t| *t == w || t.strip_suffix('s') == Some(w))
        };
        Self::KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| hit(w)))
            .map(|(topic, _)| *topic)
            .unwrap_or(Self::MatchAnalysis)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MatchAnalysis => "match_analysis",
            Self::PlayerPerformance => "player_performance",
            Self::TransferNews => "transfer_news",
            Self::Tactics => "tactics",
            Self::LeagueStandings => "league_standings",
            Self::Tournaments => "tournaments",
            Self::Historical => "historical",
            Self::Predictions => "predictions",
        }
    }
}

struct TeamFacts {
    key: &'static str,
    full_name: &'static str,
    stadium: &'static str,
    achievements: &'static str,
    playing_style: &'static str,
}

const TEAMS: &[TeamFacts] = &[
    TeamFacts {
        key: "real madrid",
        full_name: "Real Madrid CF",
        stadium: "Santiago Bernabéu",
        achievements: "14-time Champions League winners",
        playing_style: "possession-based attacking football",
    },
    TeamFacts {
        key: "barcelona",
        full_name: "FC Barcelona",
        stadium: "Camp Nou",
        achievements: "multiple Champions League and La Liga titles",
        playing_style: "tiki-taka possession football",
    },
];

/// Answers football conversations. Other sports get [`DelegationError::NoAnswer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SportsAdvisor;

impl IDomainAdvisor for SportsAdvisor {
    fn name(&self) -> &str {
        NAME
    }

    fn intent_type(&self) -> IntentType {
        IntentType::SportsTopic
    }

    fn advise(&self, request: &AdvisorRequest<'_>) -> Result<Value, DelegationError> {
        let sport = first(request.entities, EntityType::Sport).unwrap_or("football");
        if !matches!(sport, "football" | "soccer") {
            return Err(DelegationError::NoAnswer {
                advisor: NAME.to_string(),
            });
        }

        let topic = SportsTopic::detect(request.utterance);
        let team = first(request.entities, EntityType::Team);
        let response = team
            .and_then(|t| TEAMS.iter().find(|facts| facts.key == t))
            .map(|facts| team_response(facts, topic))
            .unwrap_or_else(|| topic_response(topic).to_string());

        Ok(json!({
            "response": response,
            "topic": topic.as_str(),
            "sport": "football",
            "team": team,
            "follow_up_questions": follow_ups(team, topic),
        }))
    }
}

fn team_response(facts: &TeamFacts, topic: SportsTopic) -> String {
    let mut out = format!(
        "{} is a fantastic club! Based at {}, they are {}. Their {} makes them exciting to watch.",
        facts.full_name, facts.stadium, facts.achievements, facts.playing_style
    );
    match topic {
        SportsTopic::MatchAnalysis => out.push_str(
            " When analyzing their matches, I look at their tactical setup and how they adapt to different opponents.",
        ),
        SportsTopic::PlayerPerformance => out.push_str(
            " Their current stars and legendary players have created a rich footballing legacy.",
        ),
        SportsTopic::Tactics => {
            out.push_str(&format!(" Their tactical approach emphasizes {}.", facts.playing_style));
        }
        _ => {}
    }
    out.push_str(" What aspect of their play interests you most?");
    out
}

fn topic_response(topic: SportsTopic) -> &'static str {
    match topic {
        SportsTopic::Tactics => {
            "Tactics are the chess match of football! From tiki-taka to gegenpressing, each system \
             has its philosophy. I love discussing formations like 4-3-3, 4-2-3-1 or 3-5-2. What \
             tactical approach interests you most?"
        }
        SportsTopic::TransferNews => {
            "Transfer windows are always exciting! From blockbuster signings to academy \
             promotions, each transfer tells a story. Any transfer news or rumors you're following?"
        }
        SportsTopic::Predictions => {
            "Football predictions blend analysis and intuition. We can look at team dynamics, \
             player fitness and tactical matchups. What match are you thinking about?"
        }
        _ => {
            "Football is absolutely incredible! I can discuss tactics, players, teams, leagues or \
             any aspect that interests you. What would you like to explore?"
        }
    }
}

fn follow_ups(team: Option<&str>, topic: SportsTopic) -> Vec<String> {
    let mut questions = Vec::new();
    if let Some(team) = team {
        questions.push(format!("What do you think about {}'s current form?", title_case(team)));
    }
    questions.extend(
        [
            "What's your favorite team?",
            "Which player do you admire most?",
            "Do you prefer attacking or tactical football?",
            "What's the best match you've ever watched?",
        ]
        .map(String::from),
    );
    match topic {
        SportsTopic::Tactics => questions.push("Which formation do you think is most effective?".into()),
        SportsTopic::TransferNews => questions.push("Any transfers you're excited about?".into()),
        _ => {}
    }
    questions.truncate(4);
    questions
}
