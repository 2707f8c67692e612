//! Instruction-set tags and runtime capability detection.

use std::fmt;

/// Instruction set a kernel variant is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Isa {
    /// Portable scalar code, runs everywhere.
    Generic,
    /// SSE2 (128-bit, x86_64 baseline).
    Sse2,
    /// SSE4.1 (128-bit with `blendv`).
    Sse41,
    /// AVX2 (256-bit, Haswell 2013+).
    Avx2,
    /// ARM NEON (128-bit).
    Neon,
}

impl Isa {
    /// Every tag, in ascending preference order.
    pub const ALL: [Self; 5] = [Self::Generic, Self::Sse2, Self::Sse41, Self::Neon, Self::Avx2];

    /// Detects the best supported instruction set for the current platform.
    #[must_use]
    pub fn detect() -> Self {
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|isa| isa.is_supported())
            .unwrap_or(Self::Generic)
    }

    /// Returns true if the running CPU can execute code for this tag.
    #[must_use]
    pub fn is_supported(self) -> bool {
        match self {
            Self::Generic => true,
            #[cfg(target_arch = "x86_64")]
            Self::Sse2 => is_x86_feature_detected!("sse2"),
            #[cfg(target_arch = "x86_64")]
            Self::Sse41 => is_x86_feature_detected!("sse4.1"),
            #[cfg(target_arch = "x86_64")]
            Self::Avx2 => is_x86_feature_detected!("avx2"),
            // NEON is mandatory on AArch64
            #[cfg(target_arch = "aarch64")]
            Self::Neon => true,
            #[allow(unreachable_patterns)]
            _ => false,
        }
    }

    /// Stable tag used in variant names.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Sse2 => "sse2",
            Self::Sse41 => "sse4_1",
            Self::Avx2 => "avx2",
            Self::Neon => "neon",
        }
    }

    /// Returns the register width in bits.
    #[must_use]
    pub const fn register_width_bits(self) -> usize {
        match self {
            Self::Generic => 32,
            Self::Sse2 | Self::Sse41 | Self::Neon => 128,
            Self::Avx2 => 256,
        }
    }

    /// Returns the number of f32 lanes processed per batch.
    #[must_use]
    pub const fn f32_lanes(self) -> usize {
        self.register_width_bits() / 32
    }

    /// Natural vector alignment in bytes required by aligned loads and stores.
    #[must_use]
    pub const fn natural_alignment(self) -> usize {
        match self {
            Self::Generic => std::mem::align_of::<f32>(),
            _ => self.register_width_bits() / 8,
        }
    }

    /// Preference rank, higher is faster.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Generic => 0,
            Self::Sse2 => 1,
            Self::Sse41 => 2,
            Self::Neon => 3,
            Self::Avx2 => 4,
        }
    }
}

impl fmt::Display for Isa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
