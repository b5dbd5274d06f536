//! The system interface between SDL2 and the UI middleware. SDL events are
//! translated into [`UiEvent`]s carrying the middleware's key identifiers,
//! button indices and modifier state.
//!
//! Also does config options for input.

pub mod config;

use std::collections::HashSet;
use std::time::Instant;

use config::InputConfigSdl;
use log::debug;
use sdl2::EventPump;
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::{Keycode, Mod};
use sdl2::mouse::MouseButton;

/// Middleware key identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyIdentifier {
    Unknown,
    /// `'a'..='z'`
    Letter(char),
    /// Top row digits
    Digit(u8),
    /// Keypad digits
    Numpad(u8),
    /// F1 is `Function(1)`
    Function(u8),
    Space,
    Return,
    Escape,
    Backspace,
    Tab,
    Delete,
    Insert,
    Home,
    End,
    PageUp,
    PageDown,
    Left,
    Right,
    Up,
    Down,
    NumpadEnter,
    NumpadAdd,
    NumpadSubtract,
    NumpadMultiply,
    NumpadDivide,
    NumpadDecimal,
    Minus,
    Equals,
    OpenBracket,
    CloseBracket,
    Semicolon,
    Quote,
    Comma,
    Period,
    Slash,
    Backslash,
    Backquote,
    LeftShift,
    RightShift,
    LeftControl,
    RightControl,
    LeftAlt,
    RightAlt,
    LeftMeta,
    RightMeta,
    CapsLock,
    NumLock,
    ScrollLock,
    Pause,
    PrintScreen,
}

const LETTERS: [(Keycode, char); 26] = [
    (Keycode::A, 'a'),
    (Keycode::B, 'b'),
    (Keycode::C, 'c'),
    (Keycode::D, 'd'),
    (Keycode::E, 'e'),
    (Keycode::F, 'f'),
    (Keycode::G, 'g'),
    (Keycode::H, 'h'),
    (Keycode::I, 'i'),
    (Keycode::J, 'j'),
    (Keycode::K, 'k'),
    (Keycode::L, 'l'),
    (Keycode::M, 'm'),
    (Keycode::N, 'n'),
    (Keycode::O, 'o'),
    (Keycode::P, 'p'),
    (Keycode::Q, 'q'),
    (Keycode::R, 'r'),
    (Keycode::S, 's'),
    (Keycode::T, 't'),
    (Keycode::U, 'u'),
    (Keycode::V, 'v'),
    (Keycode::W, 'w'),
    (Keycode::X, 'x'),
    (Keycode::Y, 'y'),
    (Keycode::Z, 'z'),
];

const DIGITS: [Keycode; 10] = [
    Keycode::Num0,
    Keycode::Num1,
    Keycode::Num2,
    Keycode::Num3,
    Keycode::Num4,
    Keycode::Num5,
    Keycode::Num6,
    Keycode::Num7,
    Keycode::Num8,
    Keycode::Num9,
];

const KEYPAD: [Keycode; 10] = [
    Keycode::Kp0,
    Keycode::Kp1,
    Keycode::Kp2,
    Keycode::Kp3,
    Keycode::Kp4,
    Keycode::Kp5,
    Keycode::Kp6,
    Keycode::Kp7,
    Keycode::Kp8,
    Keycode::Kp9,
];

const FUNCTION: [Keycode; 12] = [
    Keycode::F1,
    Keycode::F2,
    Keycode::F3,
    Keycode::F4,
    Keycode::F5,
    Keycode::F6,
    Keycode::F7,
    Keycode::F8,
    Keycode::F9,
    Keycode::F10,
    Keycode::F11,
    Keycode::F12,
];

const NAMED: &[(Keycode, KeyIdentifier)] = &[
    (Keycode::Space, KeyIdentifier::Space),
    (Keycode::Return, KeyIdentifier::Return),
    (Keycode::Escape, KeyIdentifier::Escape),
    (Keycode::Backspace, KeyIdentifier::Backspace),
    (Keycode::Tab, KeyIdentifier::Tab),
    (Keycode::Delete, KeyIdentifier::Delete),
    (Keycode::Insert, KeyIdentifier::Insert),
    (Keycode::Home, KeyIdentifier::Home),
    (Keycode::End, KeyIdentifier::End),
    (Keycode::PageUp, KeyIdentifier::PageUp),
    (Keycode::PageDown, KeyIdentifier::PageDown),
    (Keycode::Left, KeyIdentifier::Left),
    (Keycode::Right, KeyIdentifier::Right),
    (Keycode::Up, KeyIdentifier::Up),
    (Keycode::Down, KeyIdentifier::Down),
    (Keycode::KpEnter, KeyIdentifier::NumpadEnter),
    (Keycode::KpPlus, KeyIdentifier::NumpadAdd),
    (Keycode::KpMinus, KeyIdentifier::NumpadSubtract),
    (Keycode::KpMultiply, KeyIdentifier::NumpadMultiply),
    (Keycode::KpDivide, KeyIdentifier::NumpadDivide),
    (Keycode::KpPeriod, KeyIdentifier::NumpadDecimal),
    (Keycode::Minus, KeyIdentifier::Minus),
    (Keycode::Equals, KeyIdentifier::Equals),
    (Keycode::LeftBracket, KeyIdentifier::OpenBracket),
    (Keycode::RightBracket, KeyIdentifier::CloseBracket),
    (Keycode::Semicolon, KeyIdentifier::Semicolon),
    (Keycode::Quote, KeyIdentifier::Quote),
    (Keycode::Comma, KeyIdentifier::Comma),
    (Keycode::Period, KeyIdentifier::Period),
    (Keycode::Slash, KeyIdentifier::Slash),
    (Keycode::Backslash, KeyIdentifier::Backslash),
    (Keycode::Backquote, KeyIdentifier::Backquote),
    (Keycode::LShift, KeyIdentifier::LeftShift),
    (Keycode::RShift, KeyIdentifier::RightShift),
    (Keycode::LCtrl, KeyIdentifier::LeftControl),
    (Keycode::RCtrl, KeyIdentifier::RightControl),
    (Keycode::LAlt, KeyIdentifier::LeftAlt),
    (Keycode::RAlt, KeyIdentifier::RightAlt),
    (Keycode::LGui, KeyIdentifier::LeftMeta),
    (Keycode::RGui, KeyIdentifier::RightMeta),
    (Keycode::CapsLock, KeyIdentifier::CapsLock),
    (Keycode::NumLockClear, KeyIdentifier::NumLock),
    (Keycode::ScrollLock, KeyIdentifier::ScrollLock),
    (Keycode::Pause, KeyIdentifier::Pause),
    (Keycode::PrintScreen, KeyIdentifier::PrintScreen),
    (Keycode::KpComma, KeyIdentifier::NumpadDecimal),
];

pub fn translate_key(key: Keycode) -> KeyIdentifier {
    if let Some((_, c)) = LETTERS.iter().find(|(k, _)| *k == key) {
        return KeyIdentifier::Letter(*c);
    }
    if let Some(n) = DIGITS.iter().position(|k| *k == key) {
        return KeyIdentifier::Digit(n as u8);
    }
    if let Some(n) = KEYPAD.iter().position(|k| *k == key) {
        return KeyIdentifier::Numpad(n as u8);
    }
    if let Some(n) = FUNCTION.iter().position(|k| *k == key) {
        return KeyIdentifier::Function(n as u8 + 1);
    }
    NAMED
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(KeyIdentifier::Unknown, |(_, id)| *id)
}

/// Middleware button index: left 0, right 1, middle 2, then the extra
/// buttons. `None` for buttons SDL can't name.
pub fn translate_button(button: MouseButton) -> Option<i32> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Right => Some(1),
        MouseButton::Middle => Some(2),
        MouseButton::X1 => Some(3),
        MouseButton::X2 => Some(4),
        MouseButton::Unknown => None,
    }
}

/// Modifier state in the form the middleware expects
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KeyModifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
    pub caps_lock: bool,
    pub num_lock: bool,
}

impl KeyModifiers {
    pub const CTRL: i32 = 1 << 0;
    pub const SHIFT: i32 = 1 << 1;
    pub const ALT: i32 = 1 << 2;
    pub const META: i32 = 1 << 3;
    pub const CAPS_LOCK: i32 = 1 << 4;
    pub const NUM_LOCK: i32 = 1 << 5;

    /// Pack into the middleware's modifier bit set
    pub fn bits(&self) -> i32 {
        let mut bits = 0;
        for (set, bit) in [
            (self.ctrl, Self::CTRL),
            (self.shift, Self::SHIFT),
            (self.alt, Self::ALT),
            (self.meta, Self::META),
            (self.caps_lock, Self::CAPS_LOCK),
            (self.num_lock, Self::NUM_LOCK),
        ] {
            if set {
                bits |= bit;
            }
        }
        bits
    }
}

impl From<Mod> for KeyModifiers {
    fn from(m: Mod) -> Self {
        Self {
            ctrl: m.intersects(Mod::LCTRLMOD | Mod::RCTRLMOD),
            shift: m.intersects(Mod::LSHIFTMOD | Mod::RSHIFTMOD),
            alt: m.intersects(Mod::LALTMOD | Mod::RALTMOD),
            meta: m.intersects(Mod::LGUIMOD | Mod::RGUIMOD),
            caps_lock: m.contains(Mod::CAPSMOD),
            num_lock: m.contains(Mod::NUMMOD),
        }
    }
}

/// What the middleware is told about
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Quit,
    Resized {
        width: u32,
        height: u32,
    },
    KeyDown {
        key: KeyIdentifier,
        modifiers: KeyModifiers,
    },
    KeyUp {
        key: KeyIdentifier,
        modifiers: KeyModifiers,
    },
    TextInput(String),
    MouseMove {
        x: i32,
        y: i32,
        modifiers: KeyModifiers,
    },
    MouseDown {
        button: i32,
        modifiers: KeyModifiers,
    },
    MouseUp {
        button: i32,
        modifiers: KeyModifiers,
    },
    /// Positive scrolls down
    MouseWheel {
        delta: i32,
        modifiers: KeyModifiers,
    },
}

/// Timing for the middleware
pub struct SystemInterface {
    start: Instant,
}

impl Default for SystemInterface {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemInterface {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds since construction
    pub fn elapsed_time(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Held keys and buttons plus the last seen modifiers. Mouse events from SDL
/// carry no modifier state so the keyboard's is reused.
#[derive(Debug, Default, Clone)]
pub struct InputEvents {
    key_state: HashSet<Keycode>,
    mouse_state: HashSet<i32>,
    modifiers: KeyModifiers,
}

impl InputEvents {
    pub fn is_kb_pressed(&self, key: Keycode) -> bool {
        self.key_state.contains(&key)
    }

    pub fn is_mb_pressed(&self, button: i32) -> bool {
        self.mouse_state.contains(&button)
    }

    pub fn modifiers(&self) -> KeyModifiers {
        self.modifiers
    }

    fn key(&mut self, key: Keycode, keymod: Mod, down: bool) -> UiEvent {
        self.modifiers = KeyModifiers::from(keymod);
        let id = translate_key(key);
        if down {
            self.key_state.insert(key);
            UiEvent::KeyDown {
                key: id,
                modifiers: self.modifiers,
            }
        } else {
            self.key_state.remove(&key);
            UiEvent::KeyUp {
                key: id,
                modifiers: self.modifiers,
            }
        }
    }

    fn button(&mut self, button: MouseButton, down: bool) -> Option<UiEvent> {
        let button = translate_button(button)?;
        let modifiers = self.modifiers;
        Some(if down {
            self.mouse_state.insert(button);
            UiEvent::MouseDown { button, modifiers }
        } else {
            self.mouse_state.remove(&button);
            UiEvent::MouseUp { button, modifiers }
        })
    }

    fn wheel(&self, y: i32, invert: bool) -> UiEvent {
        // SDL reports away-from-user as positive
        let delta = if invert { y } else { -y };
        UiEvent::MouseWheel {
            delta,
            modifiers: self.modifiers,
        }
    }

    /// Translate one SDL event, updating the held state. Events the UI has
    /// no use for produce nothing.
    pub fn translate(&mut self, event: Event, config: &InputConfigSdl, out: &mut Vec<UiEvent>) {
        match event {
            Event::Quit { .. } => out.push(UiEvent::Quit),
            Event::Window {
                win_event: WindowEvent::Resized(w, h) | WindowEvent::SizeChanged(w, h),
                ..
            } => {
                debug!("Window resized to {w}x{h}");
                out.push(UiEvent::Resized {
                    width: w.max(0) as u32,
                    height: h.max(0) as u32,
                });
            }
            Event::KeyDown {
                keycode: Some(key),
                keymod,
                ..
            } => {
                out.push(self.key(key, keymod, true));
                if key == config.quit_key {
                    out.push(UiEvent::Quit);
                }
            }
            Event::KeyUp {
                keycode: Some(key),
                keymod,
                ..
            } => out.push(self.key(key, keymod, false)),
            Event::TextInput { text, .. } => out.push(UiEvent::TextInput(text)),
            Event::MouseMotion { x, y, .. } => out.push(UiEvent::MouseMove {
                x,
                y,
                modifiers: self.modifiers,
            }),
            Event::MouseButtonDown { mouse_btn, .. } => out.extend(self.button(mouse_btn, true)),
            Event::MouseButtonUp { mouse_btn, .. } => out.extend(self.button(mouse_btn, false)),
            Event::MouseWheel { y, .. } => out.push(self.wheel(y, config.invert_wheel)),
            _ => {}
        }
    }
}

/// Fetch all input
pub struct Input {
    pump: EventPump,
    pub events: InputEvents,
    pub config: InputConfigSdl,
    quit: bool,
}

impl Input {
    pub fn new(mut pump: EventPump, config: InputConfigSdl) -> Input {
        pump.pump_events();
        Input {
            pump,
            events: InputEvents::default(),
            config,
            quit: false,
        }
    }

    /// Drain everything SDL has queued, translated. Never blocks.
    pub fn poll(&mut self) -> Vec<UiEvent> {
        let mut out = Vec::new();
        while let Some(event) = self.pump.poll_event() {
            self.handle(event, &mut out);
        }
        out
    }

    /// Sleep until an event arrives or `timeout_ms` passes, then drain the
    /// queue. Keeps an idle UI off the CPU.
    pub fn wait(&mut self, timeout_ms: u32) -> Vec<UiEvent> {
        let mut out = Vec::new();
        if let Some(event) = self.pump.wait_event_timeout(timeout_ms) {
            self.handle(event, &mut out);
        }
        while let Some(event) = self.pump.poll_event() {
            self.handle(event, &mut out);
        }
        out
    }

    fn handle(&mut self, event: Event, out: &mut Vec<UiEvent>) {
        let start = out.len();
        self.events.translate(event, &self.config, out);
        if out[start..].contains(&UiEvent::Quit) {
            self.quit = true;
        }
    }

    pub fn get_quit(&self) -> bool {
        self.quit
    }
}
