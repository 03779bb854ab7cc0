//! Export/import of whole profiles.
//!
//! Enum fields travel as their string names so an unknown name is reported as
//! an `InvalidValue` naming the field instead of a generic parse failure.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use colloquy_core::errors::ProfileImportError;
use colloquy_core::models::{
    InteractionPatterns, Metadata, PersonalizationLevel, PreferenceTable, PreferenceType,
    PreferenceValue, UserPreference, UserProfile,
};

const REQUIRED_FIELDS: [&str; 3] = ["user_id", "personalization_level", "preferences"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedPreference {
    /// Absent means the owning profile's user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub value: PreferenceValue,
    pub confidence: f64,
    pub weight: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub access_count: u64,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub last_decayed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedProfile {
    pub user_id: String,
    pub personalization_level: String,
    /// preference type name → key → preference.
    pub preferences: BTreeMap<String, BTreeMap<String, ExportedPreference>>,
    #[serde(default)]
    pub interaction_patterns: InteractionPatterns,
    #[serde(default)]
    pub total_interactions: u64,
    #[serde(default)]
    pub session_count: u64,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl ExportedProfile {
    pub fn from_profile(profile: &UserProfile) -> Self {
        let preferences = profile
            .preferences
            .iter()
            .map(|(preference_type, by_key)| {
                let exported = by_key
                    .iter()
                    .map(|(key, pref)| {
                        let entry = ExportedPreference {
                            user_id: Some(pref.user_id.clone()),
                            value: pref.value.clone(),
                            confidence: pref.confidence,
                            weight: pref.weight,
                            created_at: pref.created_at,
                            updated_at: pref.updated_at,
                            access_count: pref.access_count,
                            metadata: pref.metadata.clone(),
                            last_decayed_at: pref.last_decayed_at,
                        };
                        (key.clone(), entry)
                    })
                    .collect();
                (preference_type.as_str().to_string(), exported)
            })
            .collect();

        Self {
            user_id: profile.user_id.clone(),
            personalization_level: profile.personalization_level.as_str().to_string(),
            preferences,
            interaction_patterns: profile.interaction_patterns.clone(),
            total_interactions: profile.total_interactions,
            session_count: profile.session_count,
            created_at: profile.created_at,
            last_updated_at: profile.last_updated_at,
        }
    }

    /// Parse a raw payload. Missing required keys are reported by name.
    pub fn parse(data: &serde_json::Value) -> Result<Self, ProfileImportError> {
        let object = data.as_object().ok_or_else(|| ProfileImportError::Malformed {
            reason: "profile payload must be a JSON object".to_string(),
        })?;
        if let Some(field) = REQUIRED_FIELDS.iter().find(|f| !object.contains_key(**f)) {
            return Err(ProfileImportError::MissingField {
                field: (*field).to_string(),
            });
        }
        serde_json::from_value(data.clone()).map_err(|e| ProfileImportError::Malformed {
            reason: e.to_string(),
        })
    }

    /// Validate every field and build the profile. Nothing is applied on error.
    pub fn into_profile(self, weight_cap: f64) -> Result<UserProfile, ProfileImportError> {
        if self.user_id.trim().is_empty() {
            return Err(invalid("user_id", "must not be empty"));
        }
        let personalization_level = PersonalizationLevel::parse(&self.personalization_level)
            .ok_or_else(|| {
                invalid(
                    "personalization_level",
                    format!("unknown level '{}'", self.personalization_level),
                )
            })?;
        if self.last_updated_at < self.created_at {
            return Err(invalid("last_updated_at", "earlier than created_at"));
        }

        let mut preferences = PreferenceTable::new();
        for (type_name, by_key) in self.preferences {
            let preference_type = PreferenceType::parse(&type_name).ok_or_else(|| {
                invalid("preferences", format!("unknown preference type '{type_name}'"))
            })?;
            let mut converted = BTreeMap::new();
            for (key, pref) in by_key {
                let field = format!("preferences.{type_name}.{key}");
                let user_id = match pref.user_id {
                    Some(owner) if owner != self.user_id => {
                        return Err(invalid(
                            &field,
                            format!("belongs to '{owner}', not '{}'", self.user_id),
                        ));
                    }
                    Some(owner) => owner,
                    None => self.user_id.clone(),
                };
                if !(0.0..=1.0).contains(&pref.confidence) {
                    return Err(invalid(
                        &format!("{field}.confidence"),
                        format!("{} outside [0, 1]", pref.confidence),
                    ));
                }
                if !(0.0..=weight_cap).contains(&pref.weight) {
                    return Err(invalid(
                        &format!("{field}.weight"),
                        format!("{} outside [0, {weight_cap}]", pref.weight),
                    ));
                }
                if pref.updated_at < pref.created_at {
                    return Err(invalid(
                        &format!("{field}.updated_at"),
                        "earlier than created_at",
                    ));
                }
                converted.insert(
                    key.clone(),
                    UserPreference {
                        user_id,
                        preference_type,
                        key,
                        value: pref.value,
                        confidence: pref.confidence,
                        weight: pref.weight,
                        created_at: pref.created_at,
                        updated_at: pref.updated_at,
                        access_count: pref.access_count,
                        metadata: pref.metadata,
                        last_decayed_at: pref.last_decayed_at,
                    },
                );
            }
            if !converted.is_empty() {
                preferences.insert(preference_type, converted);
            }
        }

        Ok(UserProfile {
            user_id: self.user_id,
            personalization_level,
            preferences,
            interaction_patterns: self.interaction_patterns,
            total_interactions: self.total_interactions,
            session_count: self.session_count,
            created_at: self.created_at,
            last_updated_at: self.last_updated_at,
        })
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ProfileImportError {
    ProfileImportError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}
