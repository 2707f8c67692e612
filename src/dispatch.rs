//! Variant registry and once-bound dispatcher.
//!
//! The registry enumerates every variant compiled for the target
//! architecture. A [`Dispatcher`] binds two of them: the fastest available
//! variant overall (used when both buffers meet its alignment) and the
//! fastest unaligned-safe one (used otherwise). The process-wide dispatcher
//! is bound on first use and never re-probes the CPU.

use std::sync::OnceLock;

use crate::config::DispatchConfig;
use crate::error::{Error, Result};
use crate::isa::Isa;
use crate::kernel::{is_aligned, Alignment, PowerKernel};
use crate::variants::GenericPower;

static GENERIC: GenericPower = GenericPower;

#[cfg(target_arch = "x86_64")]
static SSE2_A: crate::variants::Sse2PowerAligned = crate::variants::Sse2Power::<true>;
#[cfg(target_arch = "x86_64")]
static SSE2_U: crate::variants::Sse2PowerUnaligned = crate::variants::Sse2Power::<false>;
#[cfg(target_arch = "x86_64")]
static SSE41_A: crate::variants::Sse41PowerAligned = crate::variants::Sse41Power::<true>;
#[cfg(target_arch = "x86_64")]
static SSE41_U: crate::variants::Sse41PowerUnaligned = crate::variants::Sse41Power::<false>;
#[cfg(target_arch = "x86_64")]
static AVX2_A: crate::variants::Avx2PowerAligned = crate::variants::Avx2Power::<true>;
#[cfg(target_arch = "x86_64")]
static AVX2_U: crate::variants::Avx2PowerUnaligned = crate::variants::Avx2Power::<false>;
#[cfg(target_arch = "aarch64")]
static NEON_A: crate::variants::NeonPowerAligned = crate::variants::NeonPower::<true>;
#[cfg(target_arch = "aarch64")]
static NEON_U: crate::variants::NeonPowerUnaligned = crate::variants::NeonPower::<false>;

/// Every variant compiled for this architecture, generic first.
#[must_use]
pub fn variants() -> Vec<&'static dyn PowerKernel> {
    let mut all: Vec<&'static dyn PowerKernel> = vec![&GENERIC];

    #[cfg(target_arch = "x86_64")]
    all.extend([
        &SSE2_A as &'static dyn PowerKernel,
        &SSE2_U,
        &SSE41_A,
        &SSE41_U,
        &AVX2_A,
        &AVX2_U,
    ]);

    #[cfg(target_arch = "aarch64")]
    all.extend([&NEON_A as &'static dyn PowerKernel, &NEON_U]);

    all
}

/// Variants the running CPU can execute.
#[must_use]
pub fn available_variants() -> Vec<&'static dyn PowerKernel> {
    variants().into_iter().filter(|v| v.is_available()).collect()
}

/// Looks up a variant by its stable name.
#[must_use]
pub fn find(name: &str) -> Option<&'static dyn PowerKernel> {
    variants().into_iter().find(|v| v.name() == name)
}

/// Fastest available variant, aligned preferred over unaligned at equal ISA.
fn best(candidates: impl Iterator<Item = &'static dyn PowerKernel>) -> &'static dyn PowerKernel {
    candidates
        .filter(|v| v.is_available())
        .max_by_key(|v| (v.isa().rank(), v.alignment() == Alignment::Aligned))
        .unwrap_or(&GENERIC)
}

/// A bound pair of variants plus the selection rule between them.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    aligned: &'static dyn PowerKernel,
    unaligned: &'static dyn PowerKernel,
}

impl Dispatcher {
    /// Binds the fastest variants the running CPU supports.
    #[must_use]
    pub fn detect() -> Self {
        let aligned = best(variants().into_iter());
        let unaligned = best(variants().into_iter().filter(|v| v.alignment() == Alignment::Unaligned));
        Self { aligned, unaligned }
    }

    /// Binds variants according to `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVariant`] if the forced name is not compiled in,
    /// or [`Error::Unsupported`] if its ISA is missing on this CPU.
    pub fn from_config(config: &DispatchConfig) -> Result<Self> {
        if let Some(name) = config.force_variant.as_deref() {
            let forced = find(name).ok_or_else(|| Error::UnknownVariant(name.to_string()))?;
            if !forced.is_available() {
                return Err(Error::Unsupported(forced.name()));
            }
            let unaligned = match forced.alignment() {
                Alignment::Unaligned => forced,
                Alignment::Aligned => best(
                    variants()
                        .into_iter()
                        .filter(|v| v.isa() == forced.isa() && v.alignment() == Alignment::Unaligned),
                ),
            };
            return Ok(Self {
                aligned: forced,
                unaligned,
            });
        }

        if config.disable_simd {
            return Ok(Self::generic());
        }

        Ok(Self::detect())
    }

    /// Binds the generic variant to both slots.
    #[must_use]
    pub fn generic() -> Self {
        Self {
            aligned: &GENERIC,
            unaligned: &GENERIC,
        }
    }

    /// Variant used when both buffers satisfy its alignment.
    #[must_use]
    pub fn aligned_variant(&self) -> &'static dyn PowerKernel {
        self.aligned
    }

    /// Variant used for arbitrary buffers.
    #[must_use]
    pub fn unaligned_variant(&self) -> &'static dyn PowerKernel {
        self.unaligned
    }

    /// Picks the variant for a given pair of buffers.
    #[must_use]
    pub fn select(&self, output: *const f32, input: *const f32) -> &'static dyn PowerKernel {
        let required = self.aligned.required_alignment();
        if is_aligned(output, required) && is_aligned(input, required) {
            self.aligned
        } else {
            self.unaligned
        }
    }

    /// Raises every element of `input` to `exponent` into `output`.
    pub fn apply(&self, output: &mut [f32], input: &[f32], exponent: f32) -> Result<()> {
        self.select(output.as_ptr(), input.as_ptr()).apply(output, input, exponent)
    }

    /// Raises every element of `data` to `exponent` in place.
    pub fn apply_in_place(&self, data: &mut [f32], exponent: f32) -> Result<()> {
        self.select(data.as_ptr(), data.as_ptr()).apply_in_place(data, exponent)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::detect()
    }
}

static DISPATCHER: OnceLock<Dispatcher> = OnceLock::new();

/// Process-wide dispatcher, bound from [`DispatchConfig::from_env`] on first use.
pub fn dispatcher() -> &'static Dispatcher {
    DISPATCHER.get_or_init(|| {
        let config = DispatchConfig::from_env();
        let dispatcher = Dispatcher::from_config(&config).unwrap_or_else(|e| {
            log::warn!("Ignoring dispatch configuration ({e}), auto-detecting");
            Dispatcher::detect()
        });
        log::debug!(
            "Bound power kernels: aligned={} unaligned={} (best ISA {})",
            dispatcher.aligned.name(),
            dispatcher.unaligned.name(),
            Isa::detect()
        );
        dispatcher
    })
}

/// Raises every element of `input` to `exponent` into `output` with the bound variant.
pub fn power_32f(output: &mut [f32], input: &[f32], exponent: f32) -> Result<()> {
    dispatcher().apply(output, input, exponent)
}

/// In-place form of [`power_32f`].
pub fn power_32f_in_place(data: &mut [f32], exponent: f32) -> Result<()> {
    dispatcher().apply_in_place(data, exponent)
}
