use crate::error::{Result, SkimError};
use std::fmt;

/// Per-event lifecycle of one component
///
/// Transitions are strictly ordered; no stage may be skipped or revisited
/// within an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ComponentStage {
    #[default]
    Unfilled,
    /// Collection sorted, registry fragment populated
    Filled,
    /// Cross references resolved
    Linked,
    /// Collection handed to the output event
    Finalized,
}

impl ComponentStage {
    pub fn next(self) -> Option<Self> {
        match self {
            ComponentStage::Unfilled => Some(ComponentStage::Filled),
            ComponentStage::Filled => Some(ComponentStage::Linked),
            ComponentStage::Linked => Some(ComponentStage::Finalized),
            ComponentStage::Finalized => None,
        }
    }

    /// Move to `to`, which must be the immediate successor
    pub fn advance(&mut self, component: &str, to: ComponentStage) -> Result<()> {
        if self.next() != Some(to) {
            return Err(SkimError::InvalidStage {
                component: component.to_string(),
                from: *self,
                to,
            });
        }
        *self = to;
        Ok(())
    }
}

impl fmt::Display for ComponentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComponentStage::Unfilled => "unfilled",
            ComponentStage::Filled => "filled",
            ComponentStage::Linked => "linked",
            ComponentStage::Finalized => "finalized",
        };
        f.write_str(s)
    }
}
