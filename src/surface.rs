//! Display surfaces the poller renders into.
//!
//! A surface exposes three text targets addressed by fixed identifiers.
//! Implementations use interior locking so cycles running on different
//! tasks can share one surface.

use crate::error::RenderError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Display target identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Temperature,
    Humidity,
    FanSpeed,
}

impl Target {
    pub const ALL: [Target; 3] = [Target::Temperature, Target::Humidity, Target::FanSpeed];

    /// Stable element id of the target
    pub fn id(&self) -> &'static str {
        match self {
            Target::Temperature => "temperature",
            Target::Humidity => "humidity",
            Target::FanSpeed => "fan_speed",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Trait for anything that can display the three readings
pub trait RenderSurface: Send + Sync {
    /// Whether the surface has an element for `target`
    fn has_target(&self, target: Target) -> bool;

    /// Overwrite the text of `target`
    fn set_text(&self, target: Target, text: &str) -> Result<(), RenderError>;

    /// Current text of `target`, if the target exists
    fn text(&self, target: Target) -> Option<String>;

    /// Write several targets as one update.
    ///
    /// Fails without writing anything if any target is missing.
    fn set_texts(&self, texts: &[(Target, String)]) -> Result<(), RenderError> {
        if let Some((target, _)) = texts.iter().find(|(t, _)| !self.has_target(*t)) {
            return Err(RenderError::MissingTarget(target.id()));
        }
        for (target, text) in texts {
            self.set_text(*target, text)?;
        }
        Ok(())
    }

    /// Texts of all targets in `Target::ALL` order
    fn texts(&self) -> [Option<String>; 3] {
        Target::ALL.map(|t| self.text(t))
    }
}

/// In-memory surface, used by tests and as backing store for the others
pub struct MemorySurface {
    targets: Mutex<HashMap<Target, String>>,
}

impl MemorySurface {
    /// Create a surface with all three targets, initially empty
    pub fn new() -> Self {
        Self::with_targets(&Target::ALL)
    }

    /// Create a surface that only has the given targets
    pub fn with_targets(targets: &[Target]) -> Self {
        let targets = targets.iter().map(|t| (*t, String::new())).collect();
        Self {
            targets: Mutex::new(targets),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Target, String>>, RenderError> {
        self.targets
            .lock()
            .map_err(|_| RenderError::Surface("target store poisoned".to_string()))
    }
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for MemorySurface {
    fn has_target(&self, target: Target) -> bool {
        self.lock().map(|t| t.contains_key(&target)).unwrap_or(false)
    }

    fn set_text(&self, target: Target, text: &str) -> Result<(), RenderError> {
        let mut targets = self.lock()?;
        let slot = targets
            .get_mut(&target)
            .ok_or(RenderError::MissingTarget(target.id()))?;
        slot.clear();
        slot.push_str(text);
        Ok(())
    }

    fn text(&self, target: Target) -> Option<String> {
        self.lock().ok()?.get(&target).cloned()
    }

    fn set_texts(&self, texts: &[(Target, String)]) -> Result<(), RenderError> {
        let mut targets = self.lock()?;
        if let Some((target, _)) = texts.iter().find(|(t, _)| !targets.contains_key(t)) {
            return Err(RenderError::MissingTarget(target.id()));
        }
        for (target, text) in texts {
            if let Some(slot) = targets.get_mut(target) {
                slot.clear();
                slot.push_str(text);
            }
        }
        Ok(())
    }

    fn texts(&self) -> [Option<String>; 3] {
        match self.lock() {
            Ok(targets) => Target::ALL.map(|t| targets.get(&t).cloned()),
            Err(_) => [None, None, None],
        }
    }
}

/// Headless surface that logs every rendered value
pub struct LogSurface {
    inner: MemorySurface,
}

impl LogSurface {
    pub fn new() -> Self {
        Self {
            inner: MemorySurface::new(),
        }
    }
}

impl Default for LogSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for LogSurface {
    fn has_target(&self, target: Target) -> bool {
        self.inner.has_target(target)
    }

    fn set_text(&self, target: Target, text: &str) -> Result<(), RenderError> {
        self.inner.set_text(target, text)?;
        tracing::info!(target_id = target.id(), text, "rendered");
        Ok(())
    }

    fn text(&self, target: Target) -> Option<String> {
        self.inner.text(target)
    }

    fn set_texts(&self, texts: &[(Target, String)]) -> Result<(), RenderError> {
        self.inner.set_texts(texts)?;
        for (target, text) in texts {
            tracing::info!(target_id = target.id(), text = text.as_str(), "rendered");
        }
        Ok(())
    }

    fn texts(&self) -> [Option<String>; 3] {
        self.inner.texts()
    }
}
