//! Packed sampler state word.
//!
//! The layout of [`SamplerState`] is consumed directly by compiled device
//! code and must not change:
//!
//! | bits  | field               | values                                             |
//! |-------|---------------------|----------------------------------------------------|
//! | 0     | normalized coords   | `0` false, `1` true                                |
//! | 1..=3 | address mode        | `0` none, `2` repeat, `4` clamp-to-edge, `6` clamp, `8` mirrored repeat |
//! | 4..=5 | filter mode         | `0x10` nearest, `0x20` linear                      |

use bytemuck::{Pod, Zeroable};

use super::types::{AddressMode, FilterMode, SamplerSettings};

/// Sampler settings packed into a single 32-bit word for device code.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct SamplerState(u32);

impl SamplerState {
    /// Coordinates are in texels.
    pub const NORMALIZED_COORDS_FALSE: u32 = 0x00;
    /// Coordinates are in `[0, 1]`.
    pub const NORMALIZED_COORDS_TRUE: u32 = 0x01;
    /// Bits holding the normalized-coordinates flag.
    pub const NORMALIZED_COORDS_MASK: u32 = Self::NORMALIZED_COORDS_TRUE;

    /// [`AddressMode::None`].
    pub const ADDRESS_NONE: u32 = 0x00;
    /// [`AddressMode::Repeat`].
    pub const ADDRESS_REPEAT: u32 = 0x02;
    /// [`AddressMode::ClampToEdge`].
    pub const ADDRESS_CLAMP_TO_EDGE: u32 = 0x04;
    /// [`AddressMode::Clamp`].
    pub const ADDRESS_CLAMP: u32 = 0x06;
    /// [`AddressMode::MirroredRepeat`].
    pub const ADDRESS_MIRRORED_REPEAT: u32 = 0x08;
    /// Bits holding the address mode.
    pub const ADDRESS_MASK: u32 = Self::ADDRESS_REPEAT
        | Self::ADDRESS_CLAMP_TO_EDGE
        | Self::ADDRESS_CLAMP
        | Self::ADDRESS_MIRRORED_REPEAT;

    /// [`FilterMode::Nearest`].
    pub const FILTER_NEAREST: u32 = 0x10;
    /// [`FilterMode::Linear`].
    pub const FILTER_LINEAR: u32 = 0x20;
    /// Bits holding the filter mode.
    pub const FILTER_MASK: u32 = Self::FILTER_NEAREST | Self::FILTER_LINEAR;

    /// Pack logical settings into a state word.
    pub fn pack(settings: SamplerSettings) -> Self {
        let normalized = if settings.normalized_coords {
            Self::NORMALIZED_COORDS_TRUE
        } else {
            Self::NORMALIZED_COORDS_FALSE
        };

        let address = match settings.address_mode {
            AddressMode::None => Self::ADDRESS_NONE,
            AddressMode::Repeat => Self::ADDRESS_REPEAT,
            AddressMode::ClampToEdge => Self::ADDRESS_CLAMP_TO_EDGE,
            AddressMode::Clamp => Self::ADDRESS_CLAMP,
            AddressMode::MirroredRepeat => Self::ADDRESS_MIRRORED_REPEAT,
        };

        let filter = match settings.filter_mode {
            FilterMode::Nearest => Self::FILTER_NEAREST,
            FilterMode::Linear => Self::FILTER_LINEAR,
        };

        Self(normalized | address | filter)
    }

    /// Decode the state word back into logical settings.
    pub fn unpack(self) -> SamplerSettings {
        SamplerSettings {
            normalized_coords: self.normalized_coords(),
            address_mode: self.address_mode(),
            filter_mode: self.filter_mode(),
        }
    }

    /// Wrap a raw state word, e.g. one read back from device memory.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Get the raw state word.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether coordinates are normalized.
    pub fn normalized_coords(self) -> bool {
        self.0 & Self::NORMALIZED_COORDS_MASK != 0
    }

    /// Decode the address mode field.
    ///
    /// Field values that no packed state can produce decode as
    /// [`AddressMode::None`].
    pub fn address_mode(self) -> AddressMode {
        match self.0 & Self::ADDRESS_MASK {
            Self::ADDRESS_REPEAT => AddressMode::Repeat,
            Self::ADDRESS_CLAMP_TO_EDGE => AddressMode::ClampToEdge,
            Self::ADDRESS_CLAMP => AddressMode::Clamp,
            Self::ADDRESS_MIRRORED_REPEAT => AddressMode::MirroredRepeat,
            _ => AddressMode::None,
        }
    }

    /// Decode the filter mode field.
    pub fn filter_mode(self) -> FilterMode {
        if self.0 & Self::FILTER_MASK == Self::FILTER_NEAREST {
            FilterMode::Nearest
        } else {
            FilterMode::Linear
        }
    }

    /// View the state word as bytes for kernel argument upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl From<SamplerSettings> for SamplerState {
    fn from(settings: SamplerSettings) -> Self {
        Self::pack(settings)
    }
}

impl From<SamplerState> for SamplerSettings {
    fn from(state: SamplerState) -> Self {
        state.unpack()
    }
}
