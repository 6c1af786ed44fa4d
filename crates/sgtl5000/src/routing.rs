//! Audio path routing.
//!
//! The route is a pure decision table keyed on closed enums:
//! [`RoutePlan::new`] turns (source, output, DAP on/off) into an ordered list
//! of switch settings, and [`Sgtl5000::route`] applies them one
//! read-modify-write at a time.
//!
//! | source    | DAP | actions                                               |
//! |-----------|-----|-------------------------------------------------------|
//! | DigitalIn | on  | I2S_IN → DAP, DAP → DAC                               |
//! | LineIn    | on  | LINEIN → ADC, ADC → DAP, DAP → DAC, unmute ADC        |
//! | DigitalIn | off | I2S_IN → DAC                                          |
//! | LineIn    | off | headphone only: LINEIN → headphone (analog bypass)    |
//! | LineIn    | off | otherwise: LINEIN → ADC, ADC → DAC, unmute ADC        |
//!
//! Headphone and Both outputs add DAC → headphone, except in analog bypass.

use embedded_hal::delay::DelayNs;
use platform::RegisterBus;

use crate::error::Error;
use crate::registers::{Field, DAC_SELECT, DAP_SELECT, MUTE_ADC, SELECT_ADC, SELECT_HP};
use crate::Sgtl5000;

/// Where the audio comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioSource {
    /// Analog line input
    LineIn,
    /// I2S digital input
    DigitalIn,
}

/// Which outputs are driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AudioOutput {
    /// Line output only
    LineOut,
    /// Headphone only
    Headphone,
    /// Line output and headphone
    Both,
}

impl AudioOutput {
    /// Headphone is driven.
    pub fn includes_headphone(self) -> bool {
        matches!(self, Self::Headphone | Self::Both)
    }

    /// Line output is driven.
    pub fn includes_line_out(self) -> bool {
        matches!(self, Self::LineOut | Self::Both)
    }
}

/// DAP input (SSS_CTRL DAP_SELECT).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DapInput {
    /// ADC output
    Adc,
    /// I2S input
    I2sIn,
}

/// DAC input (SSS_CTRL DAC_SELECT).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DacInput {
    /// ADC output
    Adc,
    /// I2S input
    I2sIn,
    /// DAP output
    Dap,
}

/// ADC input (ANA_CTRL SELECT_ADC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcInput {
    /// Microphone
    Microphone,
    /// Line input
    LineIn,
}

/// Headphone source (ANA_CTRL SELECT_HP).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeadphoneInput {
    /// DAC output
    Dac,
    /// Line input, bypassing ADC and DAC
    LineInBypass,
}

/// One switch setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RouteAction {
    /// Set the DAP input
    DapInput(DapInput),
    /// Set the DAC input
    DacInput(DacInput),
    /// Set the ADC input
    AdcInput(AdcInput),
    /// Clear the ADC mute
    UnmuteAdc,
    /// Set the headphone source
    HeadphoneInput(HeadphoneInput),
}

impl RouteAction {
    /// Field this action writes.
    pub fn field(self) -> Field {
        match self {
            Self::DapInput(_) => DAP_SELECT,
            Self::DacInput(_) => DAC_SELECT,
            Self::AdcInput(_) => SELECT_ADC,
            Self::UnmuteAdc => MUTE_ADC,
            Self::HeadphoneInput(_) => SELECT_HP,
        }
    }

    /// Code written to the field.
    pub fn code(self) -> u16 {
        match self {
            Self::DapInput(DapInput::Adc)
            | Self::DacInput(DacInput::Adc)
            | Self::AdcInput(AdcInput::Microphone)
            | Self::UnmuteAdc
            | Self::HeadphoneInput(HeadphoneInput::Dac) => 0,
            Self::DapInput(DapInput::I2sIn)
            | Self::DacInput(DacInput::I2sIn)
            | Self::AdcInput(AdcInput::LineIn)
            | Self::HeadphoneInput(HeadphoneInput::LineInBypass) => 1,
            Self::DacInput(DacInput::Dap) => 3,
        }
    }
}

const DIGITAL_THROUGH_DAP: &[RouteAction] = &[
    RouteAction::DapInput(DapInput::I2sIn),
    RouteAction::DacInput(DacInput::Dap),
];

const LINE_IN_THROUGH_DAP: &[RouteAction] = &[
    RouteAction::AdcInput(AdcInput::LineIn),
    RouteAction::DapInput(DapInput::Adc),
    RouteAction::DacInput(DacInput::Dap),
    RouteAction::UnmuteAdc,
];

const DIGITAL_DIRECT: &[RouteAction] = &[RouteAction::DacInput(DacInput::I2sIn)];

const ANALOG_BYPASS: &[RouteAction] =
    &[RouteAction::HeadphoneInput(HeadphoneInput::LineInBypass)];

const LINE_IN_DIRECT: &[RouteAction] = &[
    RouteAction::AdcInput(AdcInput::LineIn),
    RouteAction::DacInput(DacInput::Adc),
    RouteAction::UnmuteAdc,
];

/// Ordered switch settings for one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePlan {
    actions: &'static [RouteAction],
    headphone: Option<RouteAction>,
    bypass: bool,
}

impl RoutePlan {
    /// Decide the switch settings for a route. Pure: no bus access.
    pub fn new(source: AudioSource, output: AudioOutput, dsp_enabled: bool) -> Self {
        let bypass = source == AudioSource::LineIn && !dsp_enabled && output == AudioOutput::Headphone;
        let actions = match (source, dsp_enabled) {
            (AudioSource::DigitalIn, true) => DIGITAL_THROUGH_DAP,
            (AudioSource::LineIn, true) => LINE_IN_THROUGH_DAP,
            (AudioSource::DigitalIn, false) => DIGITAL_DIRECT,
            (AudioSource::LineIn, false) if bypass => ANALOG_BYPASS,
            (AudioSource::LineIn, false) => LINE_IN_DIRECT,
        };
        let headphone = (output.includes_headphone() && !bypass)
            .then_some(RouteAction::HeadphoneInput(HeadphoneInput::Dac));
        Self {
            actions,
            headphone,
            bypass,
        }
    }

    /// Actions in the order they are applied.
    pub fn actions(&self) -> impl Iterator<Item = RouteAction> + '_ {
        self.actions.iter().copied().chain(self.headphone)
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len().saturating_add(usize::from(self.headphone.is_some()))
    }

    /// `true` if the plan does nothing (never the case for a valid route).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Line input straight to the headphone amplifier, skipping ADC and DAC.
    pub fn is_analog_bypass(&self) -> bool {
        self.bypass
    }

    /// `true` if any action writes CHIP_SSS_CTRL.
    pub fn touches_source_switch(&self) -> bool {
        self.actions()
            .any(|a| matches!(a, RouteAction::DapInput(_) | RouteAction::DacInput(_)))
    }
}

impl<B: RegisterBus, D: DelayNs> Sgtl5000<B, D> {
    /// Switch the audio path.
    ///
    /// Each action is an independent read-modify-write. A failure aborts the
    /// remaining actions; those already applied stay applied.
    pub fn route(
        &mut self,
        source: AudioSource,
        output: AudioOutput,
        dsp_enabled: bool,
    ) -> Result<RoutePlan, Error<B::Error>> {
        let plan = RoutePlan::new(source, output, dsp_enabled);
        debug!(
            "route {:?} -> {:?} dsp={} bypass={}",
            source,
            output,
            dsp_enabled,
            plan.is_analog_bypass()
        );
        for action in plan.actions() {
            self.apply_route_action(action)?;
        }
        Ok(plan)
    }

    /// One read-modify-write of the switch `action` names.
    pub(crate) fn apply_route_action(&mut self, action: RouteAction) -> Result<(), Error<B::Error>> {
        let field = action.field();
        match self.regs.modify(field.reg, field.mask, field.shift, action.code()) {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!("route aborted at {}", field.name);
                Err(e)
            }
        }
    }
}
