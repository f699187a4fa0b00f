// Field configuration persisted across power cycles
//
// One byte in non-volatile storage selects which setup the opposing table
// uses. Runs read it to pick a branch; only the config sub-mode writes it.

use tracing::{debug, warn};

use crate::config::FIELD_CONFIG_OFFSET;
use crate::hub::{Color, Result, Storage};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldConfig {
    #[default]
    Blue = 0,
    Magenta = 1,
    Orange = 2,
}

impl FieldConfig {
    pub const ALL: [FieldConfig; 3] = [FieldConfig::Blue, FieldConfig::Magenta, FieldConfig::Orange];

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.get(byte as usize).copied()
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Read the stored value
    ///
    /// Storage that was never written, or holds garbage, reads as the first
    /// configuration. The bad byte is left alone until the operator picks a value.
    pub fn load(storage: &mut dyn Storage) -> Result<Self> {
        let bytes = storage.read(FIELD_CONFIG_OFFSET, 1)?;
        let raw = bytes.first().copied().unwrap_or_default();
        match Self::from_byte(raw) {
            Some(config) => Ok(config),
            None => {
                warn!("Stored field config {} out of range, using {:?}", raw, Self::default());
                Ok(Self::default())
            }
        }
    }

    pub fn save(self, storage: &mut dyn Storage) -> Result<()> {
        debug!("Saving field config {:?}", self);
        storage.write(FIELD_CONFIG_OFFSET, &[self.as_byte()])
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.as_byte() as usize + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.as_byte() as usize + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Status light color while the config is on screen
    pub fn color(self) -> Color {
        match self {
            FieldConfig::Blue => Color::Blue,
            FieldConfig::Magenta => Color::Magenta,
            FieldConfig::Orange => Color::Orange,
        }
    }

    /// Letter shown on the light matrix
    pub fn letter(self) -> char {
        match self {
            FieldConfig::Blue => 'A',
            FieldConfig::Magenta => 'R',
            FieldConfig::Orange => 'N',
        }
    }
}
