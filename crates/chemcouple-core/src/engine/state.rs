use std::fmt;

/// Where a coupling call currently stands.
///
/// A call moves `SettingState -> ReadingState -> UpdatingState` and returns to `Idle` once
/// the transport vectors hold the reacted state. A failed call leaves the phase it failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CouplingPhase {
    #[default]
    Idle,
    SettingState,
    ReadingState,
    UpdatingState,
}

impl CouplingPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouplingPhase::Idle => "idle",
            CouplingPhase::SettingState => "setting state",
            CouplingPhase::ReadingState => "reading state",
            CouplingPhase::UpdatingState => "updating state",
        }
    }
}

impl fmt::Display for CouplingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
