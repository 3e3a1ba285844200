//! Phase detection from build script output.
//!
//! The build script has no structured progress protocol, so progress is
//! inferred by looking for known phase banners in each output line.

/// A recognised build phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    /// Banner text printed by the build script (matched case-insensitively).
    pub marker: &'static str,
    /// Progress percentage the phase corresponds to.
    pub progress: u8,
}

/// Phases in script order. The first marker found in a line wins.
pub const PHASES: [Phase; 7] = [
    Phase { marker: "Downloading Ubuntu ISO", progress: 10 },
    Phase { marker: "Extracting ISO", progress: 20 },
    Phase { marker: "Setting up chroot", progress: 30 },
    Phase { marker: "Installing packages", progress: 60 },
    Phase { marker: "Rebuilding filesystem", progress: 80 },
    Phase { marker: "Creating ISO", progress: 95 },
    Phase { marker: "Build complete", progress: 100 },
];

/// Highest progress a build may report before it is finalized as completed.
pub const RUNNING_PROGRESS_CAP: u8 = 99;

/// Find the first phase whose marker appears in `line`.
pub fn detect_phase(line: &str) -> Option<&'static Phase> {
    let lowered = line.to_lowercase();
    PHASES
        .iter()
        .find(|phase| lowered.contains(&phase.marker.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_phase_case_insensitively() {
        let phase = detect_phase("==> EXTRACTING iso to /tmp/work").unwrap();
        assert_eq!(phase.marker, "Extracting ISO");
        assert_eq!(phase.progress, 20);
    }

    #[test]
    fn unrelated_lines_have_no_phase() {
        assert!(detect_phase("Get:1 http://archive.ubuntu.com jammy InRelease").is_none());
        assert!(detect_phase("").is_none());
    }

    #[test]
    fn earlier_phase_wins_when_line_mentions_several() {
        let phase = detect_phase("Downloading Ubuntu ISO before Creating ISO").unwrap();
        assert_eq!(phase.progress, 10);
    }

    #[test]
    fn phases_are_in_ascending_order() {
        assert!(PHASES.windows(2).all(|w| w[0].progress < w[1].progress));
    }
}
