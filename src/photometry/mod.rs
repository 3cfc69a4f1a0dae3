/// Computational layer: interpolation, integration, extinction and magnitudes.
///
/// ```text
///   Curve ──► Bandpass (Interpolant)   Curve ──► Spectrum
///                   │                              │
///                   └──────────►  engine  ◄────────┘
///                                   │   ▲
///                                   │   └── ExtinctionLaw
///                                   ▼
///                         magnitude / extinction
/// ```

pub mod bandpass;
pub mod bspline;
pub mod engine;
pub mod extinction;
pub mod integrate;
pub mod interpolate;
pub mod spectrum;
