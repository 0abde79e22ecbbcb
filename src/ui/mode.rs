use super::input::TextInput;

/// Which keyboard mode the sessions view is in. Prompt buffers live inside
/// the variant that uses them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Waiting for y/n on killing the session under the cursor
    ConfirmingKill,
    Renaming {
        original: String,
        input: TextInput,
    },
    Creating {
        input: TextInput,
    },
}

impl Mode {
    pub fn renaming(original: impl Into<String>) -> Self {
        let original = original.into();
        Self::Renaming {
            input: TextInput::with_text(original.as_str()),
            original,
        }
    }

    pub fn creating() -> Self {
        Self::Creating {
            input: TextInput::new(),
        }
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Prompt label and buffer for the text-entry modes
    pub fn prompt(&self) -> Option<(&'static str, &TextInput)> {
        match self {
            Self::Renaming { input, .. } => Some(("Rename: ", input)),
            Self::Creating { input } => Some(("New session: ", input)),
            Self::Normal | Self::ConfirmingKill => None,
        }
    }
}
