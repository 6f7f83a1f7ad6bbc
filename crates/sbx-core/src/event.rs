#![forbid(unsafe_code)]

//! Event encoding shared with the hosting process.
//!
//! The host sends a `u32` bitmask whose high bits select the category
//! ([`EventType::ACCESS`], [`EventType::MOUSE`], [`EventType::KEY`]) and whose
//! low 16 bits carry the sub-code. An auxiliary [`ActionType`] discriminator
//! travels alongside in [`EventInfo`] and selects the scroll phase or action
//! direction.
//!
//! # Design Notes
//!
//! - Exactly one category bit must be set; mixed masks and unknown high
//!   bits are rejected.
//! - Decoding is pure: it never touches the toolkit.

use std::fmt;
use std::time::Duration;

use bitflags::bitflags;

bitflags! {
    /// Category bits of a raw event code.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventType: u32 {
        const ACCESS = 0x0100_0000;
        const MOUSE = 0x0200_0000;
        const KEY = 0x0400_0000;
    }
}

/// Mask for the sub-code half of a raw event code.
pub const SUBCODE_MASK: u32 = 0x0000_FFFF;

/// Access sub-codes.
pub mod access {
    pub const HIGHLIGHT: u32 = 1;
    pub const HIGHLIGHT_NEXT: u32 = 2;
    pub const HIGHLIGHT_PREV: u32 = 3;
    pub const UNHIGHLIGHT: u32 = 4;
    pub const ACTIVATE: u32 = 5;
    pub const ACTION: u32 = 6;
    pub const SCROLL: u32 = 7;
    pub const VALUE_CHANGE: u32 = 8;
    pub const MOUSE: u32 = 9;
    pub const BACK: u32 = 10;
    pub const OVER: u32 = 11;
    pub const READ: u32 = 12;
    pub const ENABLE: u32 = 13;
    pub const DISABLE: u32 = 14;
}

/// Mouse sub-codes.
pub mod mouse {
    pub const DOWN: u32 = 1;
    pub const UP: u32 = 2;
    pub const MOVE: u32 = 3;
    pub const IN: u32 = 4;
    pub const OUT: u32 = 5;
}

/// Key sub-codes.
pub mod key {
    pub const DOWN: u32 = 1;
    pub const UP: u32 = 2;
    pub const FOCUS_IN: u32 = 3;
    pub const FOCUS_OUT: u32 = 4;
}

/// Build a raw code from a category and sub-code.
#[must_use]
pub const fn encode(category: EventType, subcode: u32) -> u32 {
    category.bits() | (subcode & SUBCODE_MASK)
}

/// Auxiliary discriminator sent with scroll and action events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActionType {
    #[default]
    Down,
    Move,
    Up,
    Current,
    Next,
    Prev,
    Off,
}

impl ActionType {
    /// Parse the raw discriminator value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Down),
            1 => Some(Self::Move),
            2 => Some(Self::Up),
            3 => Some(Self::Current),
            4 => Some(Self::Next),
            5 => Some(Self::Prev),
            6 => Some(Self::Off),
            _ => None,
        }
    }
}

/// Phase of an accessibility scroll gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollPhase {
    Begin,
    Move,
    End,
}

/// Direction of an accessibility value action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionDirection {
    Increase,
    Decrease,
}

/// Decoded accessibility action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessAction {
    Highlight,
    HighlightNext,
    HighlightPrev,
    Unhighlight,
    Activate,
    Action(ActionDirection),
    Scroll(ScrollPhase),
    ValueChange,
    Mouse,
    Back,
    Over,
    Read,
    Enable,
    Disable,
}

/// Decoded mouse action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAction {
    Down,
    Up,
    Move,
    In,
    Out,
}

/// Decoded key action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Down,
    Up,
    FocusIn,
    FocusOut,
}

/// A fully decoded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendEvent {
    Access(AccessAction),
    Mouse(MouseAction),
    Key(KeyAction),
}

/// Payload accompanying a raw event code.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EventInfo {
    /// Pointer x in surface coordinates.
    pub x: f64,
    /// Pointer y in surface coordinates.
    pub y: f64,
    /// Host timestamp, same epoch as the backend clock.
    pub timestamp: Duration,
    /// Raw [`ActionType`] discriminator.
    pub action_type: u32,
    /// Key code for key events.
    pub key_code: u32,
}

impl EventInfo {
    /// Pointer event at `(x, y)` stamped `timestamp`.
    #[must_use]
    pub const fn pointer(x: f64, y: f64, timestamp: Duration) -> Self {
        Self {
            x,
            y,
            timestamp,
            action_type: 0,
            key_code: 0,
        }
    }

    /// Set the action discriminator.
    #[must_use]
    pub const fn with_action_type(mut self, action_type: ActionType) -> Self {
        self.action_type = action_type as u32;
        self
    }

    /// Set the key code.
    #[must_use]
    pub const fn with_key_code(mut self, key_code: u32) -> Self {
        self.key_code = key_code;
        self
    }
}

/// Reasons a raw event code is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDecodeError {
    /// Zero or several category bits were set, or an unknown high bit.
    Category(u32),
    /// The sub-code is unknown for its category.
    SubCode { category: u32, subcode: u32 },
    /// The action discriminator is unknown or not valid for the sub-code.
    ActionType(u32),
}

impl fmt::Display for EventDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(raw) => {
                write!(f, "event code {raw:#010x} has no single known category")
            }
            Self::SubCode { category, subcode } => {
                write!(f, "unknown sub-code {subcode} for category {category:#010x}")
            }
            Self::ActionType(raw) => write!(f, "unsupported action type {raw}"),
        }
    }
}

impl std::error::Error for EventDecodeError {}

/// Decode a raw event code plus its action discriminator.
pub fn decode(raw: u32, action_type: u32) -> Result<BackendEvent, EventDecodeError> {
    let Some(category) = EventType::from_bits(raw & !SUBCODE_MASK) else {
        return Err(EventDecodeError::Category(raw));
    };
    let subcode = raw & SUBCODE_MASK;
    let unknown = EventDecodeError::SubCode {
        category: category.bits(),
        subcode,
    };

    if category == EventType::ACCESS {
        let action = match subcode {
            access::HIGHLIGHT => AccessAction::Highlight,
            access::HIGHLIGHT_NEXT => AccessAction::HighlightNext,
            access::HIGHLIGHT_PREV => AccessAction::HighlightPrev,
            access::UNHIGHLIGHT => AccessAction::Unhighlight,
            access::ACTIVATE => AccessAction::Activate,
            access::ACTION => AccessAction::Action(action_direction(action_type)?),
            access::SCROLL => AccessAction::Scroll(scroll_phase(action_type)?),
            access::VALUE_CHANGE => AccessAction::ValueChange,
            access::MOUSE => AccessAction::Mouse,
            access::BACK => AccessAction::Back,
            access::OVER => AccessAction::Over,
            access::READ => AccessAction::Read,
            access::ENABLE => AccessAction::Enable,
            access::DISABLE => AccessAction::Disable,
            _ => return Err(unknown),
        };
        Ok(BackendEvent::Access(action))
    } else if category == EventType::MOUSE {
        let action = match subcode {
            mouse::DOWN => MouseAction::Down,
            mouse::UP => MouseAction::Up,
            mouse::MOVE => MouseAction::Move,
            mouse::IN => MouseAction::In,
            mouse::OUT => MouseAction::Out,
            _ => return Err(unknown),
        };
        Ok(BackendEvent::Mouse(action))
    } else if category == EventType::KEY {
        let action = match subcode {
            key::DOWN => KeyAction::Down,
            key::UP => KeyAction::Up,
            key::FOCUS_IN => KeyAction::FocusIn,
            key::FOCUS_OUT => KeyAction::FocusOut,
            _ => return Err(unknown),
        };
        Ok(BackendEvent::Key(action))
    } else {
        Err(EventDecodeError::Category(raw))
    }
}

fn scroll_phase(raw: u32) -> Result<ScrollPhase, EventDecodeError> {
    match ActionType::from_raw(raw) {
        Some(ActionType::Down) => Ok(ScrollPhase::Begin),
        Some(ActionType::Move) => Ok(ScrollPhase::Move),
        Some(ActionType::Up) => Ok(ScrollPhase::End),
        _ => Err(EventDecodeError::ActionType(raw)),
    }
}

fn action_direction(raw: u32) -> Result<ActionDirection, EventDecodeError> {
    match ActionType::from_raw(raw) {
        Some(ActionType::Up) => Ok(ActionDirection::Increase),
        Some(ActionType::Down) => Ok(ActionDirection::Decrease),
        _ => Err(EventDecodeError::ActionType(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_high_bits_are_rejected() {
        for raw in [0x0a00_0001, 0x8201_0001, 0x0201_0001, 0x0000_0001] {
            assert_eq!(decode(raw, 0), Err(EventDecodeError::Category(raw)), "{raw:#010x}");
        }
        assert!(decode(encode(EventType::MOUSE, mouse::DOWN), 0).is_ok());
    }

    #[test]
    fn decodes_each_category() {
        assert_eq!(
            decode(encode(EventType::ACCESS, access::HIGHLIGHT_NEXT), 0),
            Ok(BackendEvent::Access(AccessAction::HighlightNext))
        );
        assert_eq!(
            decode(encode(EventType::MOUSE, mouse::MOVE), 0),
            Ok(BackendEvent::Mouse(MouseAction::Move))
        );
        assert_eq!(
            decode(encode(EventType::KEY, key::FOCUS_OUT), 0),
            Ok(BackendEvent::Key(KeyAction::FocusOut))
        );
    }

    #[test]
    fn scroll_uses_action_type_as_phase() {
        let raw = encode(EventType::ACCESS, access::SCROLL);
        assert_eq!(
            decode(raw, ActionType::Down as u32),
            Ok(BackendEvent::Access(AccessAction::Scroll(ScrollPhase::Begin)))
        );
        assert_eq!(
            decode(raw, ActionType::Up as u32),
            Ok(BackendEvent::Access(AccessAction::Scroll(ScrollPhase::End)))
        );
        assert_eq!(
            decode(raw, ActionType::Next as u32),
            Err(EventDecodeError::ActionType(ActionType::Next as u32))
        );
    }

    #[test]
    fn action_uses_action_type_as_direction() {
        let raw = encode(EventType::ACCESS, access::ACTION);
        assert_eq!(
            decode(raw, ActionType::Up as u32),
            Ok(BackendEvent::Access(AccessAction::Action(
                ActionDirection::Increase
            )))
        );
        assert!(decode(raw, 99).is_err());
    }

    #[test]
    fn rejects_mixed_or_missing_category() {
        let mixed = EventType::ACCESS.bits() | EventType::MOUSE.bits() | mouse::DOWN;
        assert_eq!(decode(mixed, 0), Err(EventDecodeError::Category(mixed)));
        assert_eq!(decode(mouse::DOWN, 0), Err(EventDecodeError::Category(1)));
    }

    #[test]
    fn rejects_unknown_subcode() {
        let raw = encode(EventType::KEY, 42);
        assert!(matches!(
            decode(raw, 0),
            Err(EventDecodeError::SubCode { subcode: 42, .. })
        ));
    }

    #[test]
    fn event_info_builders_chain() {
        let info = EventInfo::pointer(1.0, 2.0, Duration::from_millis(5))
            .with_action_type(ActionType::Move)
            .with_key_code(36);
        assert_eq!(info.action_type, 1);
        assert_eq!(info.key_code, 36);
    }
}
