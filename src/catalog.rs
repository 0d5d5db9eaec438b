//! Session catalog: the set of named presets and the active-session pointer.

use crate::models::{builtin_presets, SessionPatch, SessionPreset};
use thiserror::Error;

/// Shortest preset a user may create or edit, in minutes.
pub const MIN_DURATION_MINS: u32 = 1;
/// Longest preset a user may create or edit: a full day.
pub const MAX_DURATION_MINS: u32 = 1440;

#[derive(Error, Debug, PartialEq)]
pub enum CatalogError {
    #[error("invalid session: {0}")]
    Validation(&'static str),
    #[error("no session with id '{0}'")]
    NotFound(String),
    #[error("the last remaining session cannot be removed")]
    LastSession,
}

/// Owns the preset list and the active pointer.
///
/// Invariants: the list is never empty, and the active pointer always
/// references an existing preset. Both are repaired on load rather than
/// surfaced as errors, since stored data may predate a deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCatalog {
    presets: Vec<SessionPreset>,
    active_id: String,
}

impl Default for SessionCatalog {
    fn default() -> Self {
        let presets = builtin_presets();
        let active_id = presets[0].id.clone();
        Self { presets, active_id }
    }
}

impl SessionCatalog {
    /// Rebuilds a catalog from persisted parts, repairing as needed:
    /// an empty list falls back to the built-ins, and an active pointer
    /// whose target is gone moves to the first preset.
    pub fn from_parts(presets: Vec<SessionPreset>, active_id: String) -> Self {
        let presets = if presets.is_empty() {
            builtin_presets()
        } else {
            presets
        };
        let active_id = if presets.iter().any(|p| p.id == active_id) {
            active_id
        } else {
            presets[0].id.clone()
        };
        Self { presets, active_id }
    }

    pub fn presets(&self) -> &[SessionPreset] {
        &self.presets
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// The preset the timer engine counts down. Always exists.
    pub fn active(&self) -> &SessionPreset {
        self.presets
            .iter()
            .find(|p| p.id == self.active_id)
            .unwrap_or(&self.presets[0])
    }

    pub fn get(&self, id: &str) -> Option<&SessionPreset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Appends a new preset and returns it. Does not touch the active
    /// pointer.
    pub fn create(&mut self, name: &str, duration_mins: u32) -> Result<SessionPreset, CatalogError> {
        let name = validate_name(name)?;
        validate_duration(duration_mins)?;

        let preset = SessionPreset::new(name, duration_mins * 60);
        self.presets.push(preset.clone());
        Ok(preset)
    }

    /// Applies a partial edit. Validation happens before any mutation, so
    /// a rejected patch leaves the preset untouched.
    pub fn update(&mut self, id: &str, patch: SessionPatch) -> Result<&SessionPreset, CatalogError> {
        let name = match &patch.name {
            Some(n) => Some(validate_name(n)?.to_string()),
            None => None,
        };
        if let Some(mins) = patch.duration_mins {
            validate_duration(mins)?;
        }

        let preset = self
            .presets
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        if let Some(name) = name {
            preset.name = name;
        }
        if let Some(mins) = patch.duration_mins {
            preset.duration_secs = mins * 60;
        }
        Ok(preset)
    }

    /// Removes a preset. Refused for the last one. Returns true if the
    /// active pointer had to be reassigned (to the first remaining preset).
    pub fn remove(&mut self, id: &str) -> Result<bool, CatalogError> {
        if !self.presets.iter().any(|p| p.id == id) {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        if self.presets.len() == 1 {
            return Err(CatalogError::LastSession);
        }

        self.presets.retain(|p| p.id != id);

        if self.active_id == id {
            self.active_id = self.presets[0].id.clone();
            return Ok(true);
        }
        Ok(false)
    }

    /// Moves the active pointer. The caller resets the timer engine.
    pub fn switch_to(&mut self, id: &str) -> Result<(), CatalogError> {
        if !self.presets.iter().any(|p| p.id == id) {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        self.active_id = id.to_string();
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<&str, CatalogError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::Validation("name cannot be empty"));
    }
    Ok(trimmed)
}

fn validate_duration(mins: u32) -> Result<(), CatalogError> {
    if !(MIN_DURATION_MINS..=MAX_DURATION_MINS).contains(&mins) {
        return Err(CatalogError::Validation(
            "duration must be between 1 and 1440 minutes",
        ));
    }
    Ok(())
}
