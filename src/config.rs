//! Tuning for `MetaReplay`.

/// How far forward repair scans after a mutation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RepairMode {
    /// Stop as soon as every changed pair has been overridden downstream.
    #[default]
    EarlyExit,
    /// Always scan to the end of the document. Same results, slower; useful
    /// as a reference when checking `EarlyExit`.
    Exhaustive,
}

/// Configuration for a `MetaReplay`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayConfig {
    pub repair: RepairMode,
}

impl ReplayConfig {
    /// Default configuration with the given repair mode.
    pub fn with_repair(repair: RepairMode) -> ReplayConfig {
        return ReplayConfig { repair };
    }

    pub(crate) fn early_exit(&self) -> bool {
        return self.repair == RepairMode::EarlyExit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_exits_early() {
        assert_eq!(ReplayConfig::default().repair, RepairMode::EarlyExit);
        assert!(ReplayConfig::default().early_exit());
        assert!(!ReplayConfig::with_repair(RepairMode::Exhaustive).early_exit());
    }
}
