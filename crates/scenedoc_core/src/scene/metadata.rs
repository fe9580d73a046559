//! Global scene settings.

/// Fog falloff model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FogKind {
    /// Linear falloff between start and end distance.
    #[default]
    Linear,
    /// Exponential falloff.
    Exp,
    /// Squared exponential falloff.
    Exp2,
}

impl FogKind {
    /// Returns the wire byte for this kind.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Linear => 0,
            Self::Exp => 1,
            Self::Exp2 => 2,
        }
    }

    /// Parses a wire byte.
    #[must_use]
    pub const fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Linear),
            1 => Some(Self::Exp),
            2 => Some(Self::Exp2),
            _ => None,
        }
    }
}

/// Global scene metadata: lighting, fog, and editor grid settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMetadata {
    /// Scene display name.
    pub name: String,
    /// Ambient light color (RGBA).
    pub ambient_light: [f32; 4],
    /// Fog falloff model.
    pub fog_kind: FogKind,
    /// Fog color (RGBA).
    pub fog_color: [f32; 4],
    /// Distance where fog starts.
    pub fog_start: f32,
    /// Distance where fog reaches full density.
    pub fog_end: f32,
    /// Fog density for the exponential models.
    pub fog_density: f32,
    /// Per-pixel fog instead of per-vertex.
    pub pixel_fog: bool,
    /// Range-based fog (distance from camera rather than depth).
    pub range_fog: bool,
    /// Editor grid spacing in world units.
    pub grid_size: f32,
    /// Whether the editor snaps placement to the grid.
    pub grid_snap: bool,
}

impl Default for SceneMetadata {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient_light: [0.0, 0.0, 0.0, 0.0],
            fog_kind: FogKind::Linear,
            fog_color: [1.0, 1.0, 1.0, 0.0],
            fog_start: 50.0,
            fog_end: 100.0,
            fog_density: 0.01,
            pixel_fog: false,
            range_fog: false,
            grid_size: 8.0,
            grid_snap: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fog_kind_roundtrip() {
        for kind in [FogKind::Linear, FogKind::Exp, FogKind::Exp2] {
            assert_eq!(FogKind::from_byte(kind.as_byte()), Some(kind));
        }
        assert_eq!(FogKind::from_byte(9), None);
    }

    #[test]
    fn defaults_match_documented_values() {
        let meta = SceneMetadata::default();
        assert_eq!(meta.fog_start, 50.0);
        assert_eq!(meta.fog_end, 100.0);
        assert_eq!(meta.fog_density, 0.01);
        assert_eq!(meta.grid_size, 8.0);
        assert!(!meta.grid_snap);
    }
}
