//! Sampler address and filter mode definitions.

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Nearest neighbor filtering.
    #[default]
    Nearest,
    /// Linear filtering.
    Linear,
}

impl FilterMode {
    /// Raw API code for nearest filtering.
    pub const RAW_NEAREST: u32 = 0x1140;
    /// Raw API code for linear filtering.
    pub const RAW_LINEAR: u32 = 0x1141;

    /// Convert a raw API filter code.
    ///
    /// Only [`Self::RAW_LINEAR`] selects linear filtering; every other value
    /// selects nearest.
    pub fn from_raw(raw: u32) -> Self {
        if raw == Self::RAW_LINEAR {
            Self::Linear
        } else {
            Self::Nearest
        }
    }

    /// Get the raw API code for this filter mode.
    pub fn to_raw(self) -> u32 {
        match self {
            Self::Nearest => Self::RAW_NEAREST,
            Self::Linear => Self::RAW_LINEAR,
        }
    }
}

/// Texture address mode (edge behavior for out-of-range coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    /// No addressing; out-of-range coordinates are undefined.
    #[default]
    None,
    /// Wrap around.
    Repeat,
    /// Clamp to the edge texel.
    ClampToEdge,
    /// Clamp to the border color.
    Clamp,
    /// Mirrored repeat.
    MirroredRepeat,
}

impl AddressMode {
    /// Raw API code for [`AddressMode::None`].
    pub const RAW_NONE: u32 = 0x1130;
    /// Raw API code for [`AddressMode::ClampToEdge`].
    pub const RAW_CLAMP_TO_EDGE: u32 = 0x1131;
    /// Raw API code for [`AddressMode::Clamp`].
    pub const RAW_CLAMP: u32 = 0x1132;
    /// Raw API code for [`AddressMode::Repeat`].
    pub const RAW_REPEAT: u32 = 0x1133;
    /// Raw API code for [`AddressMode::MirroredRepeat`].
    pub const RAW_MIRRORED_REPEAT: u32 = 0x1134;

    /// All address modes, in declaration order.
    pub const ALL: [AddressMode; 5] = [
        AddressMode::None,
        AddressMode::Repeat,
        AddressMode::ClampToEdge,
        AddressMode::Clamp,
        AddressMode::MirroredRepeat,
    ];

    /// Convert a raw API address code.
    ///
    /// Unrecognized codes map to [`AddressMode::None`]. Device code treats
    /// "no addressing" as the permissive default, so this is not an error.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            Self::RAW_REPEAT => Self::Repeat,
            Self::RAW_CLAMP_TO_EDGE => Self::ClampToEdge,
            Self::RAW_CLAMP => Self::Clamp,
            Self::RAW_MIRRORED_REPEAT => Self::MirroredRepeat,
            _ => Self::None,
        }
    }

    /// Get the raw API code for this address mode.
    pub fn to_raw(self) -> u32 {
        match self {
            Self::None => Self::RAW_NONE,
            Self::Repeat => Self::RAW_REPEAT,
            Self::ClampToEdge => Self::RAW_CLAMP_TO_EDGE,
            Self::Clamp => Self::RAW_CLAMP,
            Self::MirroredRepeat => Self::RAW_MIRRORED_REPEAT,
        }
    }
}

/// The three logical sampler settings, unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SamplerSettings {
    /// Whether texture coordinates are normalized to `[0, 1]`.
    pub normalized_coords: bool,
    /// Edge addressing mode.
    pub address_mode: AddressMode,
    /// Filter mode.
    pub filter_mode: FilterMode,
}

impl SamplerSettings {
    /// Create settings from typed values.
    pub fn new(normalized_coords: bool, address_mode: AddressMode, filter_mode: FilterMode) -> Self {
        Self {
            normalized_coords,
            address_mode,
            filter_mode,
        }
    }

    /// Create settings from raw API codes.
    ///
    /// See [`AddressMode::from_raw`] and [`FilterMode::from_raw`] for the
    /// handling of unrecognized codes.
    pub fn from_raw(normalized_coords: bool, address_mode: u32, filter_mode: u32) -> Self {
        Self::new(
            normalized_coords,
            AddressMode::from_raw(address_mode),
            FilterMode::from_raw(filter_mode),
        )
    }

    /// Enable coordinate normalization.
    pub fn with_normalized_coords(mut self, normalized: bool) -> Self {
        self.normalized_coords = normalized;
        self
    }

    /// Set the address mode.
    pub fn with_address_mode(mut self, mode: AddressMode) -> Self {
        self.address_mode = mode;
        self
    }

    /// Set the filter mode.
    pub fn with_filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_mode_raw_codes() {
        for mode in AddressMode::ALL {
            assert_eq!(AddressMode::from_raw(mode.to_raw()), mode);
        }
    }

    #[test]
    fn test_unknown_address_code_is_none() {
        assert_eq!(AddressMode::from_raw(0), AddressMode::None);
        assert_eq!(AddressMode::from_raw(0x1135), AddressMode::None);
        assert_eq!(AddressMode::from_raw(u32::MAX), AddressMode::None);
    }

    #[test]
    fn test_filter_mode_raw_codes() {
        assert_eq!(FilterMode::from_raw(FilterMode::RAW_LINEAR), FilterMode::Linear);
        assert_eq!(FilterMode::from_raw(FilterMode::RAW_NEAREST), FilterMode::Nearest);
        // Anything that isn't linear is nearest
        assert_eq!(FilterMode::from_raw(0xdead), FilterMode::Nearest);
    }

    #[test]
    fn test_settings_builder() {
        let settings = SamplerSettings::default()
            .with_normalized_coords(true)
            .with_address_mode(AddressMode::Repeat)
            .with_filter_mode(FilterMode::Linear);
        assert_eq!(
            settings,
            SamplerSettings::new(true, AddressMode::Repeat, FilterMode::Linear)
        );
    }
}
