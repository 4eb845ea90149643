use serde::{Deserialize, Serialize};

/// Creation mode for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeFlags {
    #[default]
    None = 0,
    Ephemeral = 1,
    Sequential = 2,
}

impl NodeFlags {
    /// Map a raw flag value onto a creation mode.
    ///
    /// Values outside `0..=2` silently become [`NodeFlags::None`].
    pub fn normalize(value: i32) -> Self {
        match value {
            1 => Self::Ephemeral,
            2 => Self::Sequential,
            _ => Self::None,
        }
    }

    pub fn bits(&self) -> i32 {
        *self as i32
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Self::Ephemeral)
    }

    pub fn is_sequential(&self) -> bool {
        matches!(self, Self::Sequential)
    }
}

impl From<i32> for NodeFlags {
    fn from(value: i32) -> Self {
        Self::normalize(value)
    }
}
