//! Global keyboard hooks
//!
//! A single rdev listener thread serves the whole process. It never touches
//! GTK; matching key presses are forwarded over unbounded channels that the
//! main loop awaits. Two hooks exist: the capture hotkey and the Escape hook
//! of the active selector session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread;

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use rdev::{listen, Event, EventType, Key};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HotkeyError {
    #[error("Shortcut is empty")]
    Empty,

    #[error("Unknown key '{0}'")]
    UnknownKey(String),

    #[error("Shortcut has no key, only modifiers")]
    MissingKey,

    #[error("Shortcut has more than one key: '{0}' and '{1}'")]
    MultipleKeys(String, String),

    #[error("Shortcut '{0}' needs at least one modifier")]
    NoModifier(String),
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub super_key: bool,
}

impl Modifiers {
    fn any(&self) -> bool {
        self.ctrl || self.shift || self.alt || self.super_key
    }
}

/// A modifier combination plus one key
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HotkeyBinding {
    pub modifiers: Modifiers,
    pub key: Key,
}

impl HotkeyBinding {
    /// Parse a `+`-separated, case-insensitive shortcut such as `super+shift+a`
    pub fn parse(text: &str) -> Result<Self, HotkeyError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(HotkeyError::Empty);
        }

        let mut modifiers = Modifiers::default();
        let mut key: Option<(Key, String)> = None;

        for token in text.split('+').map(|t| t.trim().to_lowercase()) {
            match token.as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "shift" => modifiers.shift = true,
                "alt" => modifiers.alt = true,
                "super" | "win" | "windows" | "meta" | "cmd" => modifiers.super_key = true,
                _ => {
                    let parsed =
                        key_from_name(&token).ok_or_else(|| HotkeyError::UnknownKey(token.clone()))?;
                    if let Some((_, existing)) = key {
                        return Err(HotkeyError::MultipleKeys(existing, token));
                    }
                    key = Some((parsed, token));
                }
            }
        }

        let (key, name) = key.ok_or(HotkeyError::MissingKey)?;
        if !modifiers.any() && !is_standalone_key(key) {
            return Err(HotkeyError::NoModifier(name));
        }

        Ok(Self { modifiers, key })
    }
}

impl std::fmt::Display for HotkeyBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if self.modifiers.ctrl {
            parts.push("ctrl".into());
        }
        if self.modifiers.alt {
            parts.push("alt".into());
        }
        if self.modifiers.super_key {
            parts.push("super".into());
        }
        if self.modifiers.shift {
            parts.push("shift".into());
        }
        parts.push(key_name(self.key));
        write!(f, "{}", parts.join("+"))
    }
}

const LETTERS: [Key; 26] = [
    Key::KeyA,
    Key::KeyB,
    Key::KeyC,
    Key::KeyD,
    Key::KeyE,
    Key::KeyF,
    Key::KeyG,
    Key::KeyH,
    Key::KeyI,
    Key::KeyJ,
    Key::KeyK,
    Key::KeyL,
    Key::KeyM,
    Key::KeyN,
    Key::KeyO,
    Key::KeyP,
    Key::KeyQ,
    Key::KeyR,
    Key::KeyS,
    Key::KeyT,
    Key::KeyU,
    Key::KeyV,
    Key::KeyW,
    Key::KeyX,
    Key::KeyY,
    Key::KeyZ,
];

const DIGITS: [Key; 10] = [
    Key::Num0,
    Key::Num1,
    Key::Num2,
    Key::Num3,
    Key::Num4,
    Key::Num5,
    Key::Num6,
    Key::Num7,
    Key::Num8,
    Key::Num9,
];

const FUNCTION_KEYS: [Key; 12] = [
    Key::F1,
    Key::F2,
    Key::F3,
    Key::F4,
    Key::F5,
    Key::F6,
    Key::F7,
    Key::F8,
    Key::F9,
    Key::F10,
    Key::F11,
    Key::F12,
];

const NAMED_KEYS: [(&str, Key); 13] = [
    ("space", Key::Space),
    ("enter", Key::Return),
    ("return", Key::Return),
    ("tab", Key::Tab),
    ("esc", Key::Escape),
    ("escape", Key::Escape),
    ("insert", Key::Insert),
    ("delete", Key::Delete),
    ("home", Key::Home),
    ("end", Key::End),
    ("pageup", Key::PageUp),
    ("pagedown", Key::PageDown),
    ("printscreen", Key::PrintScreen),
];

fn key_from_name(name: &str) -> Option<Key> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_lowercase() {
            return Some(LETTERS[(c as u8 - b'a') as usize]);
        }
        if c.is_ascii_digit() {
            return Some(DIGITS[(c as u8 - b'0') as usize]);
        }
    }

    if let Some(n) = name.strip_prefix('f').and_then(|n| n.parse::<usize>().ok()) {
        if (1..=12).contains(&n) {
            return Some(FUNCTION_KEYS[n - 1]);
        }
    }

    NAMED_KEYS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, key)| *key)
}

fn key_name(key: Key) -> String {
    if let Some(i) = LETTERS.iter().position(|k| *k == key) {
        return ((b'a' + i as u8) as char).to_string();
    }
    if let Some(i) = DIGITS.iter().position(|k| *k == key) {
        return i.to_string();
    }
    if let Some(i) = FUNCTION_KEYS.iter().position(|k| *k == key) {
        return format!("f{}", i + 1);
    }
    NAMED_KEYS
        .iter()
        .find(|(_, k)| *k == key)
        .map(|(n, _)| n.to_string())
        .unwrap_or_else(|| format!("{:?}", key).to_lowercase())
}

fn is_standalone_key(key: Key) -> bool {
    key == Key::PrintScreen || FUNCTION_KEYS.contains(&key)
}

/// Decides which hook a raw key event belongs to
#[derive(Default)]
pub struct KeyRouter {
    held: Vec<Key>,
    hotkey: Option<HotkeyBinding>,
    hotkey_tx: Option<UnboundedSender<()>>,
    escape: Option<(u64, UnboundedSender<()>)>,
    next_hook_id: u64,
}

impl KeyRouter {
    pub fn handle(&mut self, event_type: &EventType) {
        match *event_type {
            EventType::KeyPress(key) => self.key_press(key),
            EventType::KeyRelease(key) => self.held.retain(|k| *k != key),
            _ => {}
        }
    }

    fn key_press(&mut self, key: Key) {
        // Auto-repeat delivers presses without releases.
        if self.held.contains(&key) {
            return;
        }
        self.held.push(key);

        if key == Key::Escape {
            if let Some((_, ref tx)) = self.escape {
                let _ = tx.unbounded_send(());
            }
        }

        if let (Some(binding), Some(tx)) = (self.hotkey, self.hotkey_tx.as_ref()) {
            if binding.key == key && binding.modifiers == self.held_modifiers() {
                let _ = tx.unbounded_send(());
            }
        }
    }

    fn held_modifiers(&self) -> Modifiers {
        let held = |keys: &[Key]| keys.iter().any(|k| self.held.contains(k));
        Modifiers {
            ctrl: held(&[Key::ControlLeft, Key::ControlRight]),
            shift: held(&[Key::ShiftLeft, Key::ShiftRight]),
            alt: held(&[Key::Alt, Key::AltGr]),
            super_key: held(&[Key::MetaLeft, Key::MetaRight]),
        }
    }

    fn set_escape(&mut self, tx: UnboundedSender<()>) -> u64 {
        self.next_hook_id += 1;
        self.escape = Some((self.next_hook_id, tx));
        self.next_hook_id
    }

    fn remove_escape(&mut self, id: u64) {
        if matches!(self.escape, Some((current, _)) if current == id) {
            self.escape = None;
        }
    }
}

/// Registration of the Escape hook. Dropping it deregisters the hook.
pub struct KeyHook {
    id: u64,
    router: Weak<Mutex<KeyRouter>>,
}

impl Drop for KeyHook {
    fn drop(&mut self) {
        if let Some(router) = self.router.upgrade() {
            lock(&router).remove_escape(self.id);
            log::debug!("Escape hook {} released", self.id);
        }
    }
}

fn lock(router: &Mutex<KeyRouter>) -> MutexGuard<'_, KeyRouter> {
    router.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-wide keyboard hooks
pub struct GlobalKeys {
    router: Arc<Mutex<KeyRouter>>,
    listener_enabled: bool,
    started: AtomicBool,
    listening: Arc<AtomicBool>,
}

impl GlobalKeys {
    /// Create the hook registry. Returns the stream of hotkey activations.
    ///
    /// With `listener_enabled` false no listener thread is ever started and
    /// hooks only record their registration.
    pub fn new(listener_enabled: bool) -> (Self, UnboundedReceiver<()>) {
        let (tx, rx) = unbounded();
        let router = KeyRouter {
            hotkey_tx: Some(tx),
            ..KeyRouter::default()
        };
        let keys = Self {
            router: Arc::new(Mutex::new(router)),
            listener_enabled,
            started: AtomicBool::new(false),
            listening: Arc::new(AtomicBool::new(false)),
        };
        (keys, rx)
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    /// Start the listener thread on first use
    fn ensure_listener(&self) {
        if !self.listener_enabled || self.started.swap(true, Ordering::SeqCst) {
            return;
        }

        let router = self.router.clone();
        let listening = self.listening.clone();
        listening.store(true, Ordering::SeqCst);

        let spawned = thread::Builder::new()
            .name("global-keys".to_string())
            .spawn(move || {
                let callback = move |event: Event| {
                    lock(&router).handle(&event.event_type);
                };

                // Blocks for the life of the process on success
                if let Err(e) = listen(callback) {
                    log::error!("Global key listener error: {:?}", e);
                    listening.store(false, Ordering::SeqCst);
                }
            });

        if let Err(e) = spawned {
            log::error!("Failed to start global key listener: {}", e);
            self.listening.store(false, Ordering::SeqCst);
        }
    }

    /// Register a fresh Escape hook, replacing any previous one.
    ///
    /// The previous hook's receiver is closed.
    pub fn install_escape_hook(&self) -> (KeyHook, UnboundedReceiver<()>) {
        self.ensure_listener();
        let (tx, rx) = unbounded();
        let id = lock(&self.router).set_escape(tx);
        log::debug!("Escape hook {} installed", id);
        let hook = KeyHook {
            id,
            router: Arc::downgrade(&self.router),
        };
        (hook, rx)
    }

    /// Replace the capture hotkey. On failure the previous binding stays active.
    pub fn rebind(&self, text: &str) -> Result<HotkeyBinding, HotkeyError> {
        self.ensure_listener();
        let mut router = lock(&self.router);
        let previous = router.hotkey.take();

        match HotkeyBinding::parse(text) {
            Ok(binding) => {
                router.hotkey = Some(binding);
                log::info!("Capture hotkey set to {}", binding);
                Ok(binding)
            }
            Err(e) => {
                router.hotkey = previous;
                log::warn!("Invalid shortcut '{}': {}", text, e);
                Err(e)
            }
        }
    }
}
