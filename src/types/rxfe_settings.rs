use std::fmt;

use enum_map::Enum;
use strum::{Display, EnumIter, FromRepr, IntoEnumIterator};

use crate::{Error, Result};

/// Gain added by each amplifier stage, in dB
pub const AMP_GAIN_DB: f32 = 20.0;
/// Largest attenuation the pads can add up to, in dB
pub const MAX_ATTENUATION_DB: f32 = 31.5;

/// One switchable stage of the receive front end.
///
/// The discriminant is the stage's bit in [RxfeSettings].
#[derive(Copy, Clone, Debug, Enum, EnumIter, FromRepr, Display, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RxfeStage {
    /// First +20 dB amplifier
    Amp1 = 0,
    /// Second +20 dB amplifier
    Amp2 = 1,
    /// 0.5 dB attenuator pad
    Att0_5dB = 2,
    /// 1 dB attenuator pad
    Att1dB = 3,
    /// 2 dB attenuator pad
    Att2dB = 4,
    /// 4 dB attenuator pad
    Att4dB = 5,
    /// 8 dB attenuator pad
    Att8dB = 6,
    /// 16 dB attenuator pad
    Att16dB = 7,
}

impl RxfeStage {
    pub const fn bit(self) -> u8 {
        1 << self as u8
    }

    pub fn is_amplifier(self) -> bool {
        matches!(self, RxfeStage::Amp1 | RxfeStage::Amp2)
    }

    /// Attenuation of the pad in half-dB steps, zero for amplifiers.
    pub fn attenuation_half_db(self) -> u8 {
        match self {
            RxfeStage::Amp1 | RxfeStage::Amp2 => 0,
            // The pads are binary weighted starting at 0.5 dB
            pad => 1 << (pad as u8 - RxfeStage::Att0_5dB as u8),
        }
    }
}

/// State of the receive front-end amplifier and attenuator chain.
///
/// A bitset with one flag per [RxfeStage]. Every combination is accepted; the total
/// attenuation is the sum of the enabled pads and the total gain is [AMP_GAIN_DB] per
/// enabled amplifier.
///
/// ```
/// # use usrp_rxfe::RxfeSettings;
/// let settings = RxfeSettings::AMP1 | RxfeSettings::ATT_8_DB | RxfeSettings::ATT_0_5_DB;
/// assert_eq!(settings.attenuation_db(), 8.5);
/// assert_eq!(settings.gain_db(), 20.0);
/// ```
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct RxfeSettings(u8);

impl RxfeSettings {
    pub const AMP1: RxfeSettings = RxfeSettings(RxfeStage::Amp1.bit());
    pub const AMP2: RxfeSettings = RxfeSettings(RxfeStage::Amp2.bit());
    pub const ATT_0_5_DB: RxfeSettings = RxfeSettings(RxfeStage::Att0_5dB.bit());
    pub const ATT_1_DB: RxfeSettings = RxfeSettings(RxfeStage::Att1dB.bit());
    pub const ATT_2_DB: RxfeSettings = RxfeSettings(RxfeStage::Att2dB.bit());
    pub const ATT_4_DB: RxfeSettings = RxfeSettings(RxfeStage::Att4dB.bit());
    pub const ATT_8_DB: RxfeSettings = RxfeSettings(RxfeStage::Att8dB.bit());
    pub const ATT_16_DB: RxfeSettings = RxfeSettings(RxfeStage::Att16dB.bit());

    const AMP_BITS: u8 = RxfeStage::Amp1.bit() | RxfeStage::Amp2.bit();
    const ATT_BITS: u8 = !Self::AMP_BITS;

    /// No amplification and every attenuator pad enabled.
    ///
    /// Applied by [initialize_rxfe](crate::DioController::initialize_rxfe).
    pub const SAFE_DEFAULT: RxfeSettings = RxfeSettings(Self::ATT_BITS);

    /// All stages disabled: 0 dB gain, 0 dB attenuation.
    pub const fn empty() -> Self {
        RxfeSettings(0)
    }

    pub const fn from_bits(bits: u8) -> Self {
        RxfeSettings(bits)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Builds settings from the eight legacy integer flags, in the order
    /// `amp1, amp2, att_05_dB, att_1_dB, att_2_dB, att_4_dB, att_8_dB, att_16_dB`.
    ///
    /// Any non-zero value enables the stage.
    pub fn from_flags(flags: [u32; 8]) -> Self {
        RxfeStage::iter()
            .zip(flags)
            .filter(|(_, flag)| *flag != 0)
            .fold(Self::empty(), |settings, (stage, _)| settings.with(stage))
    }

    /// The eight legacy integer flags, see [from_flags](RxfeSettings::from_flags).
    pub fn to_flags(&self) -> [u32; 8] {
        let mut flags = [0; 8];
        for (flag, stage) in flags.iter_mut().zip(RxfeStage::iter()) {
            *flag = self.contains(stage) as u32;
        }
        flags
    }

    /// Selects the attenuator pads adding up to `db`, leaving the amplifiers disabled.
    ///
    /// # Errors
    /// [Error::Range] unless `db` is a multiple of 0.5 within `0.0..=31.5`.
    pub fn from_attenuation_db(db: f32) -> Result<Self> {
        let half_steps = db * 2.0;
        if !(0.0..=MAX_ATTENUATION_DB).contains(&db) || half_steps.fract() != 0.0 {
            return Err(Error::range(format!(
                "Attenuation must be a multiple of 0.5 dB between 0 and {MAX_ATTENUATION_DB} dB, got {db}"
            )));
        }
        Ok(RxfeSettings((half_steps as u8) << RxfeStage::Att0_5dB as u8))
    }

    pub fn contains(&self, stage: RxfeStage) -> bool {
        self.0 & stage.bit() != 0
    }

    /// Returns a copy with `stage` enabled.
    #[must_use]
    pub fn with(self, stage: RxfeStage) -> Self {
        RxfeSettings(self.0 | stage.bit())
    }

    /// Returns a copy with `stage` disabled.
    #[must_use]
    pub fn without(self, stage: RxfeStage) -> Self {
        RxfeSettings(self.0 & !stage.bit())
    }

    /// The enabled stages, amplifiers first.
    pub fn stages(&self) -> impl Iterator<Item = RxfeStage> + '_ {
        RxfeStage::iter().filter(|stage| self.contains(*stage))
    }

    /// Total attenuation of the enabled pads in half-dB steps.
    pub fn attenuation_half_db(&self) -> u8 {
        self.stages().map(RxfeStage::attenuation_half_db).sum()
    }

    pub fn attenuation_db(&self) -> f32 {
        self.attenuation_half_db() as f32 / 2.0
    }

    pub fn gain_db(&self) -> f32 {
        (self.0 & Self::AMP_BITS).count_ones() as f32 * AMP_GAIN_DB
    }

    /// Gain minus attenuation through the chain.
    pub fn net_gain_db(&self) -> f32 {
        self.gain_db() - self.attenuation_db()
    }
}

impl std::ops::BitOr for RxfeSettings {
    type Output = RxfeSettings;

    fn bitor(self, rhs: Self) -> Self {
        RxfeSettings(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for RxfeSettings {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<RxfeStage> for RxfeSettings {
    fn from(stage: RxfeStage) -> Self {
        RxfeSettings(stage.bit())
    }
}

impl fmt::Debug for RxfeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RxfeSettings")
            .field("stages", &self.stages().collect::<Vec<_>>())
            .field("gain_db", &self.gain_db())
            .field("attenuation_db", &self.attenuation_db())
            .finish()
    }
}

impl fmt::Display for RxfeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "+{:.0} dB gain, -{:.1} dB attenuation",
            self.gain_db(),
            self.attenuation_db()
        ))
    }
}
