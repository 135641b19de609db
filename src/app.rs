//! Glue between key presses, the workout controller, and the settings store.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use tracing::warn;

use crate::audio::AudioOutput;
use crate::settings::{DebouncedStore, Settings};
use crate::utilities::display::View;
use crate::workout::{ConfigField, RunMode, WorkoutController};

/// Longest value that can be typed into a field.
const MAX_ENTRY_DIGITS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    StartOrPause,
    Stop,
    SelectNext,
    SelectPrev,
    /// Stepper move by fine increments.
    Nudge(i32),
    /// Stepper move by coarse increments.
    Jump(i32),
    Digit(u32),
    EraseDigit,
    CommitEntry,
    CancelEntry,
    Volume(i32),
    TestClick,
}

/// Translates a key press. While a value is being typed only digits,
/// `Backspace`, `Enter` and `Esc` mean anything.
pub fn map_key(key: KeyEvent, typing: bool) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if typing {
        return match key.code {
            KeyCode::Char(c) => c.to_digit(10).map(Action::Digit),
            KeyCode::Backspace => Some(Action::EraseDigit),
            KeyCode::Enter => Some(Action::CommitEntry),
            KeyCode::Esc => Some(Action::CancelEntry),
            _ => None,
        };
    }

    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char(' ') | KeyCode::Enter => Action::StartOrPause,
        KeyCode::Char('x') | KeyCode::Backspace => Action::Stop,
        KeyCode::Down | KeyCode::Tab => Action::SelectNext,
        KeyCode::Up | KeyCode::BackTab => Action::SelectPrev,
        KeyCode::Right => Action::Nudge(1),
        KeyCode::Left => Action::Nudge(-1),
        KeyCode::PageUp => Action::Jump(1),
        KeyCode::PageDown => Action::Jump(-1),
        KeyCode::Char('v') => Action::Volume(10),
        KeyCode::Char('c') => Action::Volume(-10),
        KeyCode::Char('t') => Action::TestClick,
        KeyCode::Char(c) => Action::Digit(c.to_digit(10)?),
        _ => return None,
    };
    Some(action)
}

pub struct App<A> {
    controller: WorkoutController<A>,
    store: Option<DebouncedStore>,
    selected: ConfigField,
    entry: Option<String>,
    quit: bool,
}

impl<A: AudioOutput> App<A> {
    pub fn new(controller: WorkoutController<A>, store: Option<DebouncedStore>) -> Self {
        Self {
            controller,
            store,
            selected: ConfigField::SlowBpm,
            entry: None,
            quit: false,
        }
    }

    /// Returns true when the key changed something worth redrawing.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        match map_key(key, self.entry.is_some()) {
            Some(action) => {
                self.apply(action, now);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, action: Action, now: Instant) {
        match action {
            Action::Quit => self.quit = true,
            Action::StartOrPause => {
                if self.controller.state().run_mode == RunMode::Running {
                    self.controller.pause();
                } else {
                    // Refusals are already posted as notices by the controller.
                    let _ = self.controller.start(now);
                }
            }
            Action::Stop => self.controller.stop(),
            Action::SelectNext => self.selected = self.selected.next(),
            Action::SelectPrev => self.selected = self.selected.prev(),
            Action::Nudge(steps) => {
                self.controller.step_field(self.selected, steps, now);
                self.persist(now);
            }
            Action::Jump(direction) => {
                let steps = direction * self.selected.coarse_steps();
                self.controller.step_field(self.selected, steps, now);
                self.persist(now);
            }
            Action::Digit(digit) => {
                let entry = self.entry.get_or_insert_with(String::new);
                if entry.len() < MAX_ENTRY_DIGITS {
                    entry.push_str(&digit.to_string());
                }
            }
            Action::EraseDigit => {
                if let Some(entry) = &mut self.entry {
                    entry.pop();
                }
            }
            Action::CommitEntry => self.commit_entry(now),
            Action::CancelEntry => self.entry = None,
            Action::Volume(change) => {
                self.controller.adjust_volume(change);
                self.persist(now);
            }
            Action::TestClick => self.controller.test_click(now),
        }
    }

    fn commit_entry(&mut self, now: Instant) {
        let Some(entry) = self.entry.take() else {
            return;
        };
        let Ok(value) = entry.parse::<u32>() else {
            return;
        };
        self.controller.set_field(self.selected, value, now);
        self.persist(now);
    }

    fn persist(&mut self, now: Instant) {
        let settings = self.settings();
        if let Some(store) = &mut self.store {
            store.schedule(settings, now);
        }
    }

    /// Runs due timers and any pending save.
    pub fn poll(&mut self, now: Instant) {
        self.controller.poll(now);

        let saved = self.store.as_mut().and_then(|store| store.poll(now));
        if let Some(Err(err)) = saved {
            warn!(error = %err, "saving settings failed");
            self.controller.notify(format!("Could not save settings: {err}"), now);
        }
    }

    /// Stops the session and writes any pending settings.
    pub fn shutdown(&mut self) {
        self.controller.stop();
        let saved = self.store.as_mut().and_then(DebouncedStore::flush);
        if let Some(Err(err)) = saved {
            warn!(error = %err, "saving settings on exit failed");
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn settings(&self) -> Settings {
        Settings {
            workout: *self.controller.config(),
            volume: self.controller.volume(),
        }
    }

    pub fn selected(&self) -> ConfigField {
        self.selected
    }

    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    pub fn controller(&self) -> &WorkoutController<A> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut WorkoutController<A> {
        &mut self.controller
    }

    pub fn view(&self, now: Instant, audio_ready: bool) -> View<'_> {
        View {
            snapshot: self.controller.snapshot(),
            config: *self.controller.config(),
            selected: self.selected,
            entry: self.entry(),
            volume: self.controller.volume(),
            notice: self.controller.notice(now),
            audio_ready,
        }
    }
}
