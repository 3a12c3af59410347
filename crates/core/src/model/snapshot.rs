use super::Settings;

/// Settings plus the last successfully synced read count.
///
/// Replaced as a whole after every successful refresh; never merged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    settings: Settings,
    current_count: u32,
}

impl Snapshot {
    #[must_use]
    pub fn new(settings: Settings, current_count: u32) -> Self {
        Self {
            settings,
            current_count,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn current_count(&self) -> u32 {
        self.current_count
    }

    #[must_use]
    pub fn goal(&self) -> u32 {
        self.settings.goal()
    }

    #[must_use]
    pub fn into_settings(self) -> Settings {
        self.settings
    }
}
