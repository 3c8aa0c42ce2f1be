//! Arturia BeatStep layout and SysEx command builders
//!
//! Encoders, controls and pads are related by fixed offsets. All commands
//! share the `00 20 6B 7F 42` header and are framed as SysEx by
//! [`crate::midi::sysex`].

use crate::midi::sysex;

pub type Channel = u8;
pub type Control = u8;
pub type Encoder = u8;
pub type Pad = u8;

/// Highest selectable global channel (0-based)
pub const MAX_CHANNEL: Channel = 15;

/// Highest 7-bit value
pub const MAX_VALUE: u8 = 127;

/// Physical encoder identifiers
pub const ENCODERS: std::ops::RangeInclusive<Encoder> = 0x20..=0x2F;

const CONTROL_OFFSET: u8 = 20;
const PAD_OFFSET: u8 = 0x50;
const CHANNEL_PAD_BASE: Pad = 0x70;

/// Transport buttons reassigned to send control changes
pub const DECREMENT_CONTROL: Control = 0x34;
pub const INCREMENT_CONTROL: Control = 0x35;
pub const TOGGLE_FREEZE_CONTROL: Control = 0x36;

pub const RESERVED_CONTROLS: [Control; 3] =
    [DECREMENT_CONTROL, INCREMENT_CONTROL, TOGGLE_FREEZE_CONTROL];

const HEADER: [u8; 5] = [0x00, 0x20, 0x6B, 0x7F, 0x42];
const SET: u8 = 0x02;
const GET: u8 = 0x01;

const PARAM_BUTTON_MODE: u8 = 0x01;
const PARAM_BUTTON_CC: u8 = 0x03;
const PARAM_ENCODER_MIN: u8 = 0x04;
const PARAM_ENCODER_MAX: u8 = 0x05;
const PARAM_LED: u8 = 0x10;
const PARAM_GLOBAL: u8 = 0x40;
const GLOBAL_CHANNEL: u8 = 0x06;

const BUTTON_MODE_CC_SWITCH: u8 = 0x08;
const RECALL_BUTTON: u8 = 0x5C;
const STORE_BUTTON: u8 = 0x5D;
const SHIFT_BUTTON: u8 = 0x5E;

/// Reply to a global channel request; carries the channel as payload
pub const CHANNEL_REPLY_TEMPLATE: [u8; 11] = [
    0xF0, 0x00, 0x20, 0x6B, 0x7F, 0x42, 0x02, 0x00, 0x40, 0x06, 0xF7,
];

/// MMC stop, sent by the transport stop button
pub const SAVE_TRIGGER_TEMPLATE: [u8; 6] = [0xF0, 0x7F, 0x7F, 0x06, 0x01, 0xF7];

/// Pad LED colour codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LedColor {
    Off = 0x00,
    Blue = 0x10,
    Magenta = 0x11,
}

pub fn is_reserved(control: Control) -> bool {
    RESERVED_CONTROLS.contains(&control)
}

pub fn control_to_encoder(control: Control) -> Encoder {
    control.wrapping_add(CONTROL_OFFSET)
}

pub fn encoder_to_control(encoder: Encoder) -> Control {
    encoder.wrapping_sub(CONTROL_OFFSET)
}

pub fn encoder_to_pad(encoder: Encoder) -> Pad {
    encoder.wrapping_add(PAD_OFFSET)
}

fn command(op: u8, param: u8, target: u8, value: u8) -> Vec<u8> {
    let mut body = HEADER.to_vec();
    body.extend_from_slice(&[op, 0x00, param, target, value]);
    sysex(&body)
}

pub fn set_global_channel(channel: Channel) -> Vec<u8> {
    command(SET, PARAM_GLOBAL, GLOBAL_CHANNEL, channel & 0x0F)
}

pub fn get_global_channel() -> Vec<u8> {
    let mut body = HEADER.to_vec();
    body.extend_from_slice(&[GET, 0x00, PARAM_GLOBAL, GLOBAL_CHANNEL]);
    sysex(&body)
}

/// Light the pad that indicates the selected channel
pub fn channel_indicator(channel: Channel) -> Vec<u8> {
    set_led(CHANNEL_PAD_BASE + (channel & 0x0F), LedColor::Magenta)
}

pub fn set_led(pad: Pad, color: LedColor) -> Vec<u8> {
    command(SET, PARAM_LED, pad, color as u8)
}

/// Two commands narrowing `encoder` to `[min, max]`
pub fn encoder_range(encoder: Encoder, min: u8, max: u8) -> [Vec<u8>; 2] {
    [
        command(SET, PARAM_ENCODER_MIN, encoder, min & 0x7F),
        command(SET, PARAM_ENCODER_MAX, encoder, max & 0x7F),
    ]
}

/// Switch recall/store/shift to CC mode and assign the reserved controls
pub fn transport_button_setup() -> Vec<Vec<u8>> {
    let buttons = [
        (RECALL_BUTTON, DECREMENT_CONTROL),
        (STORE_BUTTON, INCREMENT_CONTROL),
        (SHIFT_BUTTON, TOGGLE_FREEZE_CONTROL),
    ];

    let modes = buttons
        .iter()
        .map(|&(button, _)| command(SET, PARAM_BUTTON_MODE, button, BUTTON_MODE_CC_SWITCH));
    let controls = buttons
        .iter()
        .map(|&(button, control)| command(SET, PARAM_BUTTON_CC, button, control));

    modes.chain(controls).collect()
}
