//! Error types for tapkey_core

use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    /// The descriptor payload before the `#` separator was empty
    EmptyPayload,
    /// A `#` section was present but was not exactly 8 checksum characters
    MalformedInput,
    /// A payload character is outside the descriptor character set
    InvalidCharacter {
        /// The offending character
        character: char,
        /// Character position within the payload
        position: usize,
    },
    /// The checksum carried by the descriptor does not match the payload
    ChecksumMismatch {
        /// Checksum computed from the payload
        computed: String,
        /// Checksum the descriptor carried
        provided: String,
    },
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorError::EmptyPayload => {
                write!(f, "descriptor payload is empty")
            }
            DescriptorError::MalformedInput => {
                write!(
                    f,
                    "descriptor checksum section must be exactly 8 checksum characters"
                )
            }
            DescriptorError::InvalidCharacter {
                character,
                position,
            } => {
                write!(
                    f,
                    "character {:?} at position {} is not in the descriptor character set",
                    character, position
                )
            }
            DescriptorError::ChecksumMismatch { computed, provided } => {
                write!(
                    f,
                    "descriptor checksum is '{}' but payload requires '{}'",
                    provided, computed
                )
            }
        }
    }
}

impl std::error::Error for DescriptorError {}
