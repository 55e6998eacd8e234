//! Defines the [`Context`] struct, which holds the hardware backend, the
//! configuration, the hysteresis counter and the flags raised by the
//! operations performed through it.
//!
//! A context is cheap to create and owned by its caller; nothing in the
//! crate is shared between contexts except the read-only lookup tables.

use bitflags::bitflags;
use decimalcodec_tables::{MAX_DIGITS, MAX_EXPONENT, MIN_EXPONENT};
use tracing::debug;

use crate::{
    hardware::{self, DecimalHardware, NoAcceleration},
    MathContext,
};

/// Tunables of the hardware path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    /// Try the hardware path at all.
    pub use_hardware: bool,
    /// Let recent results steer the choice between hardware and software.
    pub hysteresis: bool,
    /// Counter magnitude at which the preference flips.
    pub threshold: i32,
    /// Reported after a rounded add or subtract on the hardware path.
    pub rounded_bias: i32,
    /// Reported after a hardware rescale.
    pub rescale_bias: i32,
    /// Reported after a hardware divide.
    pub divide_bias: i32,
}

impl Config {
    /// Hardware enabled, hysteresis disabled, default biases.
    pub const DEFAULT: Self = Self {
        use_hardware: true,
        hysteresis: false,
        threshold: 1000,
        rounded_bias: -3,
        rescale_bias: 5,
        divide_bias: 10,
    };

    /// Sets [`Config::use_hardware`].
    #[must_use]
    #[inline]
    pub const fn with_hardware(mut self, use_hardware: bool) -> Self {
        self.use_hardware = use_hardware;
        self
    }

    /// Sets [`Config::hysteresis`].
    #[must_use]
    #[inline]
    pub const fn with_hysteresis(mut self, hysteresis: bool) -> Self {
        self.hysteresis = hysteresis;
        self
    }

    /// Sets [`Config::threshold`].
    #[must_use]
    #[inline]
    pub const fn with_threshold(mut self, threshold: i32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the three biases reported after rounded arithmetic, rescale and
    /// divide.
    #[must_use]
    #[inline]
    pub const fn with_biases(mut self, rounded: i32, rescale: i32, divide: i32) -> Self {
        self.rounded_bias = rounded;
        self.rescale_bias = rescale;
        self.divide_bias = divide;
        self
    }
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Counter that decides whether new values should prefer the hardware
/// representation.
///
/// Each completed operation reports a signed bias. Once the counter passes
/// the threshold in either direction the preference is set accordingly and
/// the counter restarts from zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Hysteresis {
    counter: i32,
    prefer_hardware: bool,
}

impl Hysteresis {
    /// Counter at zero, hardware preferred.
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self {
            counter: 0,
            prefer_hardware: true,
        }
    }

    /// Current counter value.
    #[must_use]
    #[inline]
    pub const fn counter(&self) -> i32 {
        self.counter
    }

    /// Whether the hardware representation is currently preferred.
    #[must_use]
    #[inline]
    pub const fn prefers_hardware(&self) -> bool {
        self.prefer_hardware
    }

    /// Adds `bias` to the counter. Returns `true` if the preference changed.
    ///
    /// A bias that would overflow the counter is ignored.
    pub fn record(&mut self, bias: i32, threshold: i32) -> bool {
        let before = self.prefer_hardware;
        if let Some(counter) = self.counter.checked_add(bias) {
            self.counter = counter;
        }
        if self.counter < -threshold {
            self.prefer_hardware = false;
            self.counter = 0;
        } else if self.counter > threshold {
            self.prefer_hardware = true;
            self.counter = 0;
        }
        before != self.prefer_hardware
    }
}

impl Default for Hysteresis {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

bitflags! {
    #[derive(Default)]
    /// What the operations performed through a context did.
    pub struct Flags: u32 {
        /// An operation completed on the hardware path.
        const HARDWARE = 0x01;
        /// An operation asked its caller to take the software path.
        const FALLBACK = 0x02;
        /// A hardware result was rounded.
        const INEXACT = 0x04;
        /// The hysteresis counter changed the preferred representation.
        const HYSTERESIS_FLIPPED = 0x08;
    }
}

/// Stores the hardware backend, configuration, hysteresis state and flags.
#[derive(Clone, Debug)]
pub struct Context {
    pub(crate) hardware: &'static dyn DecimalHardware,
    pub(crate) config: Config,
    pub(crate) hysteresis: Hysteresis,
    pub(crate) flags: Flags,
}

impl Context {
    /// Create a context over the backend detected for this build, with the
    /// default configuration and no flags set.
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::with_hardware(hardware::detect())
    }

    /// Create a context over a specific backend.
    #[must_use]
    #[inline]
    pub fn with_hardware(hardware: &'static dyn DecimalHardware) -> Self {
        Self {
            hardware,
            config: Config::DEFAULT,
            hysteresis: Hysteresis::new(),
            flags: Flags::empty(),
        }
    }

    /// Create a context whose every fast path falls back.
    #[must_use]
    #[inline]
    pub fn without_acceleration() -> Self {
        Self::with_hardware(&NoAcceleration)
    }

    /// Replaces the configuration.
    #[must_use]
    #[inline]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// The backend.
    #[must_use]
    #[inline]
    pub fn hardware(&self) -> &'static dyn DecimalHardware {
        self.hardware
    }

    /// The configuration.
    #[must_use]
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The hysteresis state.
    #[must_use]
    #[inline]
    pub fn hysteresis(&self) -> &Hysteresis {
        &self.hysteresis
    }

    /// Whether new values should be built in the hardware representation.
    #[must_use]
    pub fn use_extension(&self) -> bool {
        self.hardware.is_available()
            && self.config.use_hardware
            && (!self.config.hysteresis || self.hysteresis.prefers_hardware())
    }

    /// Whether a value with `digits` significant digits at `scale` fits a
    /// hardware word.
    #[must_use]
    pub fn suitable_for_extension(&self, digits: u32, scale: i32) -> bool {
        self.use_extension() && suitable_for_hardware(digits, scale)
    }

    /// Reports `bias` to the hysteresis counter for an operation performed
    /// under `mc`. Only operations in the native 16-digit context count.
    pub fn perform_hardware_usage_heuristic(&mut self, mc: MathContext, bias: i32) {
        if mc.is_decimal64() {
            self.record_bias(bias);
        }
    }

    /// Reports `bias` to the hysteresis counter if hysteresis is enabled.
    pub(crate) fn record_bias(&mut self, bias: i32) {
        if !self.config.hysteresis {
            return;
        }
        if self.hysteresis.record(bias, self.config.threshold) {
            debug!(
                prefer_hardware = self.hysteresis.prefers_hardware(),
                bias, "representation preference flipped"
            );
            self.flags.insert(Flags::HYSTERESIS_FLIPPED);
        }
    }

    /// Current flags.
    #[must_use]
    #[inline]
    pub const fn flags(&self) -> Flags {
        self.flags
    }

    /// IEEE 754 5.7.4 **lowerFlags**
    #[doc(alias = "lowerFlags")]
    #[inline]
    pub fn lower_flags(&mut self, flags: Flags) {
        self.flags.remove(flags);
    }

    /// IEEE 754 5.7.4 **raiseFlags**
    #[doc(alias = "raiseFlags")]
    #[inline]
    pub fn raise_flags(&mut self, flags: Flags) {
        self.flags = self.flags.union(flags);
    }

    /// IEEE 754 5.7.4 **testFlags**
    #[doc(alias = "testFlags")]
    #[must_use]
    #[inline]
    pub fn test_flags(&self, flags: Flags) -> Flags {
        self.flags.intersection(flags)
    }

    /// IEEE 754 5.7.4 **restoreFlags**
    #[doc(alias = "restoreFlags")]
    #[inline]
    pub fn restore_flags(&mut self, flags: Flags, mask: Flags) {
        self.flags = self.flags.difference(mask).union(flags.intersection(mask));
    }

    /// IEEE 754 5.7.4 **saveAllFlags**
    ///
    /// Returns the flags and clears them.
    #[doc(alias = "saveAllFlags")]
    #[must_use]
    #[inline]
    pub fn save_all_flags(&mut self) -> Flags {
        core::mem::take(&mut self.flags)
    }
}

impl Default for Context {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `digits` significant digits at `scale` fit a hardware word.
#[must_use]
pub const fn suitable_for_hardware(digits: u32, scale: i32) -> bool {
    digits <= MAX_DIGITS && -MAX_EXPONENT <= scale && scale <= -MIN_EXPONENT
}
