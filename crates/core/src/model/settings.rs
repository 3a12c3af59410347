use thiserror::Error;

/// Yearly goal used when nothing has been configured yet.
pub const DEFAULT_GOAL: u32 = 365;

/// Validated reading-challenge configuration.
///
/// Only obtainable through [`SettingsDraft::validate`] or
/// [`Settings::from_persisted`], so holders can rely on a positive goal and
/// non-empty token and tag.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    goal: u32,
    api_token: String,
    read_tag: String,
}

/// Unvalidated settings as typed by the user.
#[derive(Clone, Debug, Default)]
pub struct SettingsDraft {
    pub goal: i64,
    pub api_token: String,
    pub read_tag: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("goal must be greater than zero, got {provided}")]
    NonPositiveGoal { provided: i64 },
    #[error("API token must not be empty")]
    EmptyToken,
    #[error("read tag must not be empty")]
    EmptyTag,
}

/// Tag suggested for a fresh configuration, e.g. `2024_READ`.
#[must_use]
pub fn default_read_tag(year: i32) -> String {
    format!("{year}_READ")
}

impl SettingsDraft {
    #[must_use]
    pub fn new(goal: i64, api_token: impl Into<String>, read_tag: impl Into<String>) -> Self {
        Self {
            goal,
            api_token: api_token.into(),
            read_tag: read_tag.into(),
        }
    }

    /// Draft prefilled with the default goal and the tag for `year`.
    #[must_use]
    pub fn with_defaults(year: i32) -> Self {
        Self {
            goal: i64::from(DEFAULT_GOAL),
            api_token: String::new(),
            read_tag: default_read_tag(year),
        }
    }

    /// Validate and normalize the draft into settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the goal is not positive, or the token or
    /// tag is blank after trimming.
    pub fn validate(self) -> Result<Settings, SettingsError> {
        let goal = u32::try_from(self.goal)
            .ok()
            .filter(|goal| *goal > 0)
            .ok_or(SettingsError::NonPositiveGoal {
                provided: self.goal,
            })?;
        let api_token = self.api_token.trim().to_string();
        if api_token.is_empty() {
            return Err(SettingsError::EmptyToken);
        }
        let read_tag = self.read_tag.trim().to_string();
        if read_tag.is_empty() {
            return Err(SettingsError::EmptyTag);
        }

        Ok(Settings {
            goal,
            api_token,
            read_tag,
        })
    }
}

impl Settings {
    /// Rebuild settings from storage, re-running validation.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` when the stored values are no longer valid.
    pub fn from_persisted(
        goal: i64,
        api_token: String,
        read_tag: String,
    ) -> Result<Self, SettingsError> {
        SettingsDraft {
            goal,
            api_token,
            read_tag,
        }
        .validate()
    }

    #[must_use]
    pub fn goal(&self) -> u32 {
        self.goal
    }

    #[must_use]
    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    #[must_use]
    pub fn read_tag(&self) -> &str {
        &self.read_tag
    }

    /// Draft carrying the current values, for editing.
    #[must_use]
    pub fn to_draft(&self) -> SettingsDraft {
        SettingsDraft {
            goal: i64::from(self.goal),
            api_token: self.api_token.clone(),
            read_tag: self.read_tag.clone(),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("goal", &self.goal)
            .field("api_token", &"<redacted>")
            .field("read_tag", &self.read_tag)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_trims_token_and_tag() {
        let settings = SettingsDraft::new(52, "  tok  ", " 2024_READ\n")
            .validate()
            .unwrap();
        assert_eq!(settings.goal(), 52);
        assert_eq!(settings.api_token(), "tok");
        assert_eq!(settings.read_tag(), "2024_READ");
    }

    #[test]
    fn validate_rejects_zero_and_negative_goal() {
        assert_eq!(
            SettingsDraft::new(0, "tok", "tag").validate(),
            Err(SettingsError::NonPositiveGoal { provided: 0 })
        );
        assert_eq!(
            SettingsDraft::new(-5, "tok", "tag").validate(),
            Err(SettingsError::NonPositiveGoal { provided: -5 })
        );
        assert_eq!(
            SettingsDraft::new(i64::from(u32::MAX) + 1, "tok", "tag").validate(),
            Err(SettingsError::NonPositiveGoal {
                provided: i64::from(u32::MAX) + 1
            })
        );
    }

    #[test]
    fn validate_rejects_blank_token_before_tag() {
        assert_eq!(
            SettingsDraft::new(10, "   ", "").validate(),
            Err(SettingsError::EmptyToken)
        );
        assert_eq!(
            SettingsDraft::new(10, "tok", " ").validate(),
            Err(SettingsError::EmptyTag)
        );
    }

    #[test]
    fn defaults_follow_the_year() {
        let draft = SettingsDraft::with_defaults(2025);
        assert_eq!(draft.goal, 365);
        assert_eq!(draft.read_tag, "2025_READ");
        assert!(draft.api_token.is_empty());
    }

    #[test]
    fn debug_output_hides_token() {
        let settings = SettingsDraft::new(1, "secret-token", "tag")
            .validate()
            .unwrap();
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("secret-token"));
    }

    #[test]
    fn to_draft_round_trips() {
        let settings = SettingsDraft::new(12, "tok", "Read").validate().unwrap();
        assert_eq!(settings.to_draft().validate().unwrap(), settings);
    }
}
