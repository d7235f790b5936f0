//! Registered Parameter Number (RPN) parsing.
//!
//! RPNs are set through a sequence of control changes: CC101/CC100 select a
//! 14-bit parameter number, then CC6/CC38 (data entry) or CC96/CC97
//! (increment/decrement) change its value. Selecting 0x7F/0x7F (the null
//! function) deselects.

use log::debug;

pub const CC_DATA_ENTRY_MSB: u8 = 6;
pub const CC_DATA_ENTRY_LSB: u8 = 38;
pub const CC_DATA_INCREMENT: u8 = 96;
pub const CC_DATA_DECREMENT: u8 = 97;
pub const CC_RPN_LSB: u8 = 100;
pub const CC_RPN_MSB: u8 = 101;

pub const RPN_PITCH_BEND_SENSITIVITY: u16 = 0x0000;
pub const RPN_MODULATION_DEPTH_RANGE: u16 = 0x0005;

const MAX_14BIT: u16 = 0x3FFF;

/// A 14-bit MIDI value split into two 7-bit halves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Value14 {
    pub msb: u8,
    pub lsb: u8,
}

impl Value14 {
    pub fn new(msb: u8, lsb: u8) -> Self {
        Self {
            msb: msb & 0x7F,
            lsb: lsb & 0x7F,
        }
    }

    pub fn from_14bits(value: u16) -> Self {
        let value = value.min(MAX_14BIT);
        Self::new((value >> 7) as u8, (value & 0x7F) as u8)
    }

    pub fn as_14bits(&self) -> u16 {
        ((self.msb as u16) << 7) | self.lsb as u16
    }

    pub fn increment(&mut self, amount: u8) {
        *self = Self::from_14bits(self.as_14bits().saturating_add(amount as u16));
    }

    pub fn decrement(&mut self, amount: u8) {
        *self = Self::from_14bits(self.as_14bits().saturating_sub(amount as u16));
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    number: u16,
    value: Value14,
}

/// Values of up to `N` enabled parameter numbers
#[derive(Debug, Clone)]
pub struct RpnState<const N: usize> {
    slots: [Option<Slot>; N],
}

impl<const N: usize> RpnState<N> {
    pub fn new() -> Self {
        Self { slots: [None; N] }
    }

    /// Start listening to `number`. Returns false when every slot is taken.
    pub fn enable(&mut self, number: u16) -> bool {
        if self.has(number) {
            return true;
        }
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(free) => {
                *free = Some(Slot {
                    number,
                    value: Value14::default(),
                });
                true
            }
            None => false,
        }
    }

    pub fn has(&self, number: u16) -> bool {
        self.slots.iter().flatten().any(|slot| slot.number == number)
    }

    pub fn get(&self, number: u16) -> Option<Value14> {
        self.slots
            .iter()
            .flatten()
            .find(|slot| slot.number == number)
            .map(|slot| slot.value)
    }

    pub fn get_mut(&mut self, number: u16) -> Option<&mut Value14> {
        self.slots
            .iter_mut()
            .flatten()
            .find(|slot| slot.number == number)
            .map(|slot| &mut slot.value)
    }

    /// Zero every enabled value
    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.value = Value14::default();
        }
    }
}

impl<const N: usize> Default for RpnState<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Control-change state machine feeding an [`RpnState`]
#[derive(Debug, Clone)]
pub struct RpnParser<const N: usize> {
    state: RpnState<N>,
    selected: bool,
    current_number: Value14,
}

impl<const N: usize> RpnParser<N> {
    pub fn new(state: RpnState<N>) -> Self {
        Self {
            state,
            selected: false,
            current_number: Value14::default(),
        }
    }

    pub fn state(&self) -> &RpnState<N> {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RpnState<N> {
        &mut self.state
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.selected = false;
        self.current_number = Value14::default();
    }

    /// Parameter number currently selected for data entry
    pub fn selected_number(&self) -> Option<u16> {
        self.selected.then(|| self.current_number.as_14bits())
    }

    /// Feed one control change. Returns true when a selected value changed.
    pub fn parse_control_change(&mut self, controller: u8, value: u8) -> bool {
        match controller {
            CC_RPN_MSB => {
                self.current_number.msb = value & 0x7F;
                false
            }
            CC_RPN_LSB => {
                if value == 0x7F && self.current_number.msb == 0x7F {
                    // Null function
                    self.selected = false;
                } else {
                    self.current_number.lsb = value & 0x7F;
                    self.selected = self.state.has(self.current_number.as_14bits());
                }
                false
            }
            CC_DATA_INCREMENT => self.update_selected(|current| current.increment(value)),
            CC_DATA_DECREMENT => self.update_selected(|current| current.decrement(value)),
            CC_DATA_ENTRY_MSB => self.update_selected(|current| {
                current.msb = value & 0x7F;
                current.lsb = 0;
            }),
            CC_DATA_ENTRY_LSB => self.update_selected(|current| current.lsb = value & 0x7F),
            // Not part of the RPN workflow
            _ => false,
        }
    }

    fn update_selected(&mut self, update: impl FnOnce(&mut Value14)) -> bool {
        if !self.selected {
            return false;
        }

        let number = self.current_number.as_14bits();
        match self.state.get_mut(number) {
            Some(current) => {
                update(current);
                debug!("RPN {:#06x} = {:#06x}", number, current.as_14bits());
                true
            }
            None => false,
        }
    }
}

/// Per-channel RPN handling for pitch bend sensitivity and modulation depth
#[derive(Debug, Clone)]
pub struct ChannelSetup {
    parser: RpnParser<2>,
    default_bend_range: u8,
}

impl ChannelSetup {
    /// `bend_range` is the pitch bend sensitivity in semitones after setup and reset
    pub fn new(bend_range: u8) -> Self {
        let mut state = RpnState::new();
        state.enable(RPN_PITCH_BEND_SENSITIVITY);
        state.enable(RPN_MODULATION_DEPTH_RANGE);

        let mut setup = Self {
            parser: RpnParser::new(state),
            default_bend_range: bend_range,
        };
        setup.reset();
        setup
    }

    pub fn reset(&mut self) {
        self.parser.reset();
        if let Some(value) = self.parser.state_mut().get_mut(RPN_PITCH_BEND_SENSITIVITY) {
            *value = Value14::new(self.default_bend_range, 0);
        }
    }

    pub fn parse_control_change(&mut self, controller: u8, value: u8) -> bool {
        self.parser.parse_control_change(controller, value)
    }

    /// Pitch bend sensitivity in semitones (MSB semitones, LSB cents)
    pub fn pitch_bend_range(&self) -> f32 {
        let value = self
            .parser
            .state()
            .get(RPN_PITCH_BEND_SENSITIVITY)
            .unwrap_or_default();
        value.msb as f32 + value.lsb as f32 / 100.0
    }

    /// Modulation depth range in semitones (MSB semitones, LSB 1/128 semitone)
    pub fn modulation_depth_range(&self) -> f32 {
        let value = self
            .parser
            .state()
            .get(RPN_MODULATION_DEPTH_RANGE)
            .unwrap_or_default();
        value.msb as f32 + value.lsb as f32 / 128.0
    }
}

impl Default for ChannelSetup {
    fn default() -> Self {
        Self::new(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(parser: &mut RpnParser<2>, number: u16) {
        let value = Value14::from_14bits(number);
        parser.parse_control_change(CC_RPN_MSB, value.msb);
        parser.parse_control_change(CC_RPN_LSB, value.lsb);
    }

    fn parser() -> RpnParser<2> {
        let mut state = RpnState::new();
        state.enable(RPN_PITCH_BEND_SENSITIVITY);
        state.enable(RPN_MODULATION_DEPTH_RANGE);
        RpnParser::new(state)
    }

    #[test]
    fn test_value14_split() {
        let value = Value14::from_14bits(0x2001);
        assert_eq!(value, Value14 { msb: 0x40, lsb: 0x01 });
        assert_eq!(value.as_14bits(), 0x2001);
        assert_eq!(Value14::from_14bits(0xFFFF).as_14bits(), 0x3FFF);
    }

    #[test]
    fn test_value14_saturates() {
        let mut value = Value14::from_14bits(0x3FFE);
        value.increment(10);
        assert_eq!(value.as_14bits(), 0x3FFF);

        let mut value = Value14::from_14bits(3);
        value.decrement(10);
        assert_eq!(value.as_14bits(), 0);
    }

    #[test]
    fn test_state_capacity() {
        let mut state: RpnState<1> = RpnState::new();
        assert!(state.enable(0x0000));
        assert!(state.enable(0x0000));
        assert!(!state.enable(0x0005));
        assert!(state.has(0x0000));
        assert!(!state.has(0x0005));
        assert_eq!(state.get(0x0005), None);
    }

    #[test]
    fn test_data_entry_on_selected_parameter() {
        let mut parser = parser();
        select(&mut parser, RPN_PITCH_BEND_SENSITIVITY);
        assert_eq!(parser.selected_number(), Some(RPN_PITCH_BEND_SENSITIVITY));

        assert!(parser.parse_control_change(CC_DATA_ENTRY_MSB, 12));
        assert!(parser.parse_control_change(CC_DATA_ENTRY_LSB, 50));
        assert_eq!(
            parser.state().get(RPN_PITCH_BEND_SENSITIVITY),
            Some(Value14::new(12, 50))
        );

        // MSB entry clears the LSB
        assert!(parser.parse_control_change(CC_DATA_ENTRY_MSB, 7));
        assert_eq!(
            parser.state().get(RPN_PITCH_BEND_SENSITIVITY),
            Some(Value14::new(7, 0))
        );
    }

    #[test]
    fn test_increment_and_decrement() {
        let mut parser = parser();
        select(&mut parser, RPN_MODULATION_DEPTH_RANGE);
        parser.parse_control_change(CC_DATA_ENTRY_MSB, 1);

        assert!(parser.parse_control_change(CC_DATA_INCREMENT, 5));
        assert_eq!(
            parser.state().get(RPN_MODULATION_DEPTH_RANGE),
            Some(Value14::new(1, 5))
        );
        assert!(parser.parse_control_change(CC_DATA_DECREMENT, 6));
        assert_eq!(
            parser.state().get(RPN_MODULATION_DEPTH_RANGE),
            Some(Value14::new(0, 127))
        );
    }

    #[test]
    fn test_unknown_parameter_is_ignored() {
        let mut parser = parser();
        select(&mut parser, 0x0002); // coarse tuning, not enabled
        assert_eq!(parser.selected_number(), None);
        assert!(!parser.parse_control_change(CC_DATA_ENTRY_MSB, 64));
        assert!(!parser.parse_control_change(CC_DATA_INCREMENT, 1));
    }

    #[test]
    fn test_null_function_deselects() {
        let mut parser = parser();
        select(&mut parser, RPN_PITCH_BEND_SENSITIVITY);
        parser.parse_control_change(CC_RPN_MSB, 0x7F);
        parser.parse_control_change(CC_RPN_LSB, 0x7F);

        assert_eq!(parser.selected_number(), None);
        assert!(!parser.parse_control_change(CC_DATA_ENTRY_MSB, 24));
        assert_eq!(
            parser.state().get(RPN_PITCH_BEND_SENSITIVITY),
            Some(Value14::default())
        );
    }

    #[test]
    fn test_unrelated_controllers_ignored() {
        let mut parser = parser();
        select(&mut parser, RPN_PITCH_BEND_SENSITIVITY);
        assert!(!parser.parse_control_change(1, 64)); // mod wheel
        assert!(!parser.parse_control_change(7, 100)); // volume
    }

    #[test]
    fn test_reset_clears_selection_and_values() {
        let mut parser = parser();
        select(&mut parser, RPN_PITCH_BEND_SENSITIVITY);
        parser.parse_control_change(CC_DATA_ENTRY_MSB, 12);

        parser.reset();
        assert_eq!(parser.selected_number(), None);
        assert_eq!(
            parser.state().get(RPN_PITCH_BEND_SENSITIVITY),
            Some(Value14::default())
        );
    }

    #[test]
    fn test_channel_setup_bend_range() {
        let mut setup = ChannelSetup::new(2);
        assert_eq!(setup.pitch_bend_range(), 2.0);
        assert_eq!(setup.modulation_depth_range(), 0.0);

        setup.parse_control_change(CC_RPN_MSB, 0);
        setup.parse_control_change(CC_RPN_LSB, 0);
        setup.parse_control_change(CC_DATA_ENTRY_MSB, 12);
        setup.parse_control_change(CC_DATA_ENTRY_LSB, 50);
        assert!((setup.pitch_bend_range() - 12.5).abs() < 1e-6);

        setup.reset();
        assert_eq!(setup.pitch_bend_range(), 2.0);
    }
}
