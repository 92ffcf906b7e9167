use std::collections::HashMap;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

use crate::constants::{INITIAL_HOLD_FRAMES, MIN_REPEAT_DELAY_FRAMES, REPEAT_HOLD_FRAMES};

// Letters are tracked case-insensitively so Shift does not change the binding.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[derive(Debug, Clone, Copy)]
struct HeldKey {
    last_seen: u64,
    repeating: bool,
    // Frame on which a second tap arrived; the key reads as up for that frame.
    retapped_at: Option<u64>,
}

impl HeldKey {
    fn pressed(frame: u64) -> Self {
        HeldKey { last_seen: frame, repeating: false, retapped_at: None }
    }

    fn hold_frames(&self) -> u64 {
        if self.repeating { REPEAT_HOLD_FRAMES } else { INITIAL_HOLD_FRAMES }
    }

    fn expired(&self, frame: u64) -> bool {
        frame - self.last_seen > self.hold_frames()
    }
}

// --- KeyboardState: polled key-down queries on top of terminal key events ---
pub struct KeyboardState {
    held: HashMap<KeyCode, HeldKey>,
    frame: u64,
}

impl KeyboardState {
    pub fn new() -> Self {
        KeyboardState { held: HashMap::new(), frame: 0 }
    }

    /// Without the keyboard enhancement protocol there are no release events
    /// and auto-repeat arrives as more presses, so presses are classified by
    /// timing: one too soon after the last is a new tap, a later one starts
    /// auto-repeat.
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        let code = normalize(key_event.code);
        let frame = self.frame;
        match key_event.kind {
            KeyEventKind::Release => {
                self.held.remove(&code);
            }
            KeyEventKind::Repeat => {
                let held = self.held.entry(code).or_insert_with(|| HeldKey::pressed(frame));
                held.last_seen = frame;
                held.repeating = true;
            }
            KeyEventKind::Press => match self.held.get_mut(&code) {
                None => {
                    self.held.insert(code, HeldKey::pressed(frame));
                }
                Some(held) if held.last_seen == frame => {}
                Some(held) if held.repeating || frame - held.last_seen >= MIN_REPEAT_DELAY_FRAMES => {
                    held.last_seen = frame;
                    held.repeating = true;
                }
                Some(held) => {
                    *held = HeldKey { retapped_at: Some(frame), ..HeldKey::pressed(frame) };
                }
            },
        }
    }

    pub fn next_frame(&mut self) {
        self.frame += 1;
        let frame = self.frame;
        self.held.retain(|_, held| !held.expired(frame));
    }

    /// A key is down from its press until its release. Terminals that never
    /// report releases end the hold once the key goes quiet.
    pub fn is_key_pressed(&self, code: KeyCode) -> bool {
        self.held.get(&normalize(code)).is_some_and(|held| {
            held.retapped_at != Some(self.frame) && !held.expired(self.frame)
        })
    }
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self::new()
    }
}

// --- SimulatedInput for debugging ---
pub struct SimulatedInput {
    events: HashMap<u64, Vec<Event>>,
}

impl SimulatedInput {
    pub fn new() -> Self {
        SimulatedInput { events: HashMap::new() }
    }

    /// Holds `code` down from `press_frame` until `release_frame`.
    pub fn tap(mut self, code: KeyCode, press_frame: u64, release_frame: u64) -> Self {
        self.push(press_frame, code, KeyEventKind::Press);
        self.push(release_frame, code, KeyEventKind::Release);
        self
    }

    /// A lone press with no release, as sent by terminals without release events.
    pub fn press(mut self, code: KeyCode, frame: u64) -> Self {
        self.push(frame, code, KeyEventKind::Press);
        self
    }

    fn push(&mut self, frame: u64, code: KeyCode, kind: KeyEventKind) {
        let event = Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        });
        self.events.entry(frame).or_default().push(event);
    }

    /// Scripted session: a couple of direction changes, then a reset attempt.
    pub fn demo() -> Self {
        SimulatedInput::new()
            .tap(KeyCode::Char(' '), 30, 40)
            .tap(KeyCode::Char(' '), 120, 150)
            .tap(KeyCode::Char(' '), 240, 245)
            .tap(KeyCode::Char('r'), 400, 410)
    }

    pub fn take(&mut self, frame_count: u64) -> Vec<Event> {
        self.events.remove(&frame_count).unwrap_or_default()
    }
}

impl Default for SimulatedInput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent { code, modifiers: KeyModifiers::NONE, kind, state: KeyEventState::NONE }
    }

    #[test]
    fn test_press_and_release() {
        let mut keyboard = KeyboardState::new();
        assert!(!keyboard.is_key_pressed(KeyCode::Char(' ')));
        keyboard.handle_key(key(KeyCode::Char(' '), KeyEventKind::Press));
        assert!(keyboard.is_key_pressed(KeyCode::Char(' ')));
        keyboard.next_frame();
        assert!(keyboard.is_key_pressed(KeyCode::Char(' ')));
        keyboard.handle_key(key(KeyCode::Char(' '), KeyEventKind::Release));
        assert!(!keyboard.is_key_pressed(KeyCode::Char(' ')));
    }

    #[test]
    fn test_press_expires_without_release() {
        let mut keyboard = KeyboardState::new();
        keyboard.handle_key(key(KeyCode::Esc, KeyEventKind::Press));
        for _ in 0..INITIAL_HOLD_FRAMES {
            keyboard.next_frame();
        }
        assert!(keyboard.is_key_pressed(KeyCode::Esc));
        keyboard.next_frame();
        assert!(!keyboard.is_key_pressed(KeyCode::Esc));
    }

    #[test]
    fn test_repeat_keeps_key_down() {
        let mut keyboard = KeyboardState::new();
        keyboard.handle_key(key(KeyCode::Char(' '), KeyEventKind::Press));
        for _ in 0..3 * INITIAL_HOLD_FRAMES {
            keyboard.next_frame();
            keyboard.handle_key(key(KeyCode::Char(' '), KeyEventKind::Repeat));
        }
        assert!(keyboard.is_key_pressed(KeyCode::Char(' ')));
    }

    #[test]
    fn test_repeated_presses_end_after_short_gap() {
        let mut keyboard = KeyboardState::new();
        keyboard.handle_key(key(KeyCode::Char(' '), KeyEventKind::Press));
        for frame in 1..=60 {
            keyboard.next_frame();
            if frame >= 40 && frame % 2 == 0 {
                keyboard.handle_key(key(KeyCode::Char(' '), KeyEventKind::Press));
            }
            assert!(keyboard.is_key_pressed(KeyCode::Char(' ')), "released early at frame {}", frame);
        }
        for _ in 0..=REPEAT_HOLD_FRAMES {
            keyboard.next_frame();
        }
        assert!(!keyboard.is_key_pressed(KeyCode::Char(' ')));
    }

    #[test]
    fn test_quick_second_press_reads_as_new_tap() {
        let mut keyboard = KeyboardState::new();
        keyboard.handle_key(key(KeyCode::Char(' '), KeyEventKind::Press));
        for _ in 0..MIN_REPEAT_DELAY_FRAMES - 1 {
            keyboard.next_frame();
        }
        keyboard.handle_key(key(KeyCode::Char(' '), KeyEventKind::Press));
        assert!(!keyboard.is_key_pressed(KeyCode::Char(' ')));
        keyboard.next_frame();
        assert!(keyboard.is_key_pressed(KeyCode::Char(' ')));
    }

    #[test]
    fn test_letters_ignore_case() {
        let mut keyboard = KeyboardState::new();
        keyboard.handle_key(key(KeyCode::Char('R'), KeyEventKind::Press));
        assert!(keyboard.is_key_pressed(KeyCode::Char('r')));
    }

    #[test]
    fn test_simulated_input_is_consumed_once() {
        let mut input = SimulatedInput::new().tap(KeyCode::Char(' '), 2, 5);
        assert!(input.take(0).is_empty());
        assert_eq!(input.take(2).len(), 1);
        assert!(input.take(2).is_empty());
        let released = input.take(5);
        assert!(matches!(
            released.as_slice(),
            [Event::Key(KeyEvent { kind: KeyEventKind::Release, .. })]
        ));
    }
}
