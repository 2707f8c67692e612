//! Concrete power-kernel variants.
//!
//! All variants implement [`PowerKernel`](crate::kernel::PowerKernel) and
//! produce the same results as [`GenericPower`] within floating-point
//! tolerance. SIMD variants process full batches of their lane width and
//! hand the remaining `count % lanes` elements to the scalar loop.
//!
//! # Variants
//!
//! | Name | Lanes | Alignment |
//! |---|---|---|
//! | `power_32f_generic` | 1 | none |
//! | `power_32f_{a,u}_sse2` | 4 | 16 / none |
//! | `power_32f_{a,u}_sse4_1` | 4 | 16 / none |
//! | `power_32f_{a,u}_avx2` | 8 | 32 / none |
//! | `power_32f_{a,u}_neon` | 4 | 16 / none |
//!
//! Without the `vector-math` feature the SIMD variants keep their names and
//! contracts but run the scalar loop for every element.

pub mod generic;

#[cfg(target_arch = "x86_64")]
pub mod sse2;

#[cfg(target_arch = "x86_64")]
pub mod sse41;

#[cfg(target_arch = "x86_64")]
pub mod avx2;

#[cfg(target_arch = "aarch64")]
pub mod neon;

pub use generic::GenericPower;

#[cfg(target_arch = "x86_64")]
pub use avx2::{Avx2Power, Avx2PowerAligned, Avx2PowerUnaligned};
#[cfg(target_arch = "aarch64")]
pub use neon::{NeonPower, NeonPowerAligned, NeonPowerUnaligned};
#[cfg(target_arch = "x86_64")]
pub use sse2::{Sse2Power, Sse2PowerAligned, Sse2PowerUnaligned};
#[cfg(target_arch = "x86_64")]
pub use sse41::{Sse41Power, Sse41PowerAligned, Sse41PowerUnaligned};
