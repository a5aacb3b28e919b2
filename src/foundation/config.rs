use serde::{Deserialize, Serialize};

/// Policy deciding when a mounted root repaints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameloopMode {
    /// Repaint on every tick.
    #[default]
    Always,
    /// Repaint only while invalidations are pending.
    Demand,
    /// Never repaint from the loop; invalidation is ignored.
    Never,
}

impl std::str::FromStr for FrameloopMode {
    type Err = crate::SkeneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "demand" => Ok(Self::Demand),
            "never" => Ok(Self::Never),
            other => Err(crate::SkeneError::validation(format!(
                "unknown frameloop mode '{other}' (expected always|demand|never)"
            ))),
        }
    }
}

/// Per-root options supplied at mount time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MountOpts {
    /// Frame-loop policy for this root.
    pub frameloop: FrameloopMode,
    /// Device pixel ratio the application renders at.
    pub dpr: f64,
    /// Delay between `unmount` and final resource release.
    pub unmount_grace_ms: u64,
}

impl Default for MountOpts {
    fn default() -> Self {
        Self {
            frameloop: FrameloopMode::Always,
            dpr: 1.0,
            unmount_grace_ms: 500,
        }
    }
}

impl MountOpts {
    /// Defaults with `SKENE_FRAMELOOP` / `SKENE_UNMOUNT_GRACE_MS` applied.
    ///
    /// Unparsable values are ignored.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(mode) = std::env::var("SKENE_FRAMELOOP")
            .ok()
            .and_then(|v| v.parse::<FrameloopMode>().ok())
        {
            opts.frameloop = mode;
        }
        if let Some(ms) = std::env::var("SKENE_UNMOUNT_GRACE_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            opts.unmount_grace_ms = ms;
        }
        opts
    }

    /// Return options with a different frame-loop mode.
    pub fn with_frameloop(mut self, frameloop: FrameloopMode) -> Self {
        self.frameloop = frameloop;
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
