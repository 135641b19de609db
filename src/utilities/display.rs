use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use crate::utilities::cache::UICache;
use crate::utilities::sound_type::SoundId;
use crate::workout::{BeatParity, ConfigField, Phase, RunMode, WorkoutConfig, WorkoutSnapshot};

const TITLE_ROW: u16 = 1;
const SUBTITLE_ROW: u16 = 2;
const DIVIDER_ROW: u16 = 3;
const PHASE_PANEL_ROW: u16 = 5;
const SETTINGS_PANEL_ROW: u16 = 11;
const VOLUME_PANEL_ROW: u16 = 16;
const NOTICE_ROW: u16 = 20;
const CONTROLS_TITLE_ROW: u16 = 22;
const CONTROLS_START_ROW: u16 = 23;

const PANEL_LEFT: u16 = 10;
const FAST_PANEL_LEFT: u16 = 42;
const PHASE_PANEL_WIDTH: u16 = 62;
const SETTINGS_PANEL_WIDTH: u16 = 30;

/// Everything the screen shows, gathered once per frame.
pub struct View<'a> {
    pub snapshot: WorkoutSnapshot,
    pub config: WorkoutConfig,
    pub selected: ConfigField,
    pub entry: Option<&'a str>,
    pub volume: u8,
    pub notice: Option<&'a str>,
    pub audio_ready: bool,
}

/// `m:ss`, the way the countdown and phase lengths are shown.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Ready => Color::DarkGrey,
        Phase::Slow => Color::Cyan,
        Phase::Fast => Color::Red,
    }
}

fn run_mode_color(run_mode: RunMode) -> Color {
    match run_mode {
        RunMode::Stopped => Color::DarkGrey,
        RunMode::Running => Color::Green,
        RunMode::Paused => Color::Yellow,
    }
}

pub fn draw_box_border<W: Write>(writer: &mut W, x: u16, y: u16, width: u16, height: u16) -> io::Result<()> {
    let horizontal = format!("+{}+", "-".repeat(width.saturating_sub(2) as usize));

    queue!(writer, cursor::MoveTo(x, y), Print(&horizontal))?;
    for i in 1..height.saturating_sub(1) {
        queue!(writer, cursor::MoveTo(x, y + i), Print("|"))?;
        queue!(writer, cursor::MoveTo(x + width - 1, y + i), Print("|"))?;
    }
    queue!(writer, cursor::MoveTo(x, y + height - 1), Print(&horizontal))?;

    Ok(())
}

pub fn create_progress_bar(progress: f64, width: usize, filled_char: char, empty_char: char) -> String {
    let filled_width = ((progress.clamp(0.0, 1.0)) * width as f64) as usize;
    let mut bar = String::with_capacity(width);
    for i in 0..width {
        bar.push(if i < filled_width { filled_char } else { empty_char });
    }
    bar
}

/// Repaints whatever changed since the last frame.
pub fn display_ui<W: Write>(view: &View<'_>, cache: &mut UICache, writer: &mut W) -> io::Result<()> {
    let first = cache.first_render;

    if first {
        queue!(writer, Clear(ClearType::All))?;
        queue!(
            writer,
            cursor::MoveTo(PANEL_LEFT + 14, TITLE_ROW),
            SetAttribute(Attribute::Bold),
            SetForegroundColor(Color::Magenta),
            Print("=== "),
            SetForegroundColor(Color::Blue),
            Print("WALK INTERVAL METRONOME"),
            SetForegroundColor(Color::Magenta),
            Print(" ==="),
            ResetColor,
        )?;
        queue!(
            writer,
            cursor::MoveTo(PANEL_LEFT, DIVIDER_ROW),
            SetForegroundColor(Color::Cyan),
            Print("=".repeat(PHASE_PANEL_WIDTH as usize)),
            ResetColor,
        )?;
        draw_controls(writer)?;
    }

    if first || cache.last_audio_ready != Some(view.audio_ready) {
        let (label, color) = if view.audio_ready {
            ("audio ready", Color::Green)
        } else {
            ("loading audio...", Color::Yellow)
        };
        queue!(
            writer,
            cursor::MoveTo(PANEL_LEFT + 22, SUBTITLE_ROW),
            Clear(ClearType::UntilNewLine),
            SetForegroundColor(color),
            Print(label),
            ResetColor,
        )?;
        cache.last_audio_ready = Some(view.audio_ready);
    }

    let snapshot = &view.snapshot;
    let phase_changed = cache.last_phase != Some(snapshot.phase)
        || cache.last_run_mode != Some(snapshot.run_mode)
        || cache.last_remaining != Some(snapshot.remaining_seconds)
        || cache.last_beats != snapshot.beats;
    if first || phase_changed {
        draw_phase_panel(writer, snapshot)?;
        cache.last_phase = Some(snapshot.phase);
        cache.last_run_mode = Some(snapshot.run_mode);
        cache.last_remaining = Some(snapshot.remaining_seconds);
        cache.last_beats = snapshot.beats;
    }

    let values = view.config.values();
    let selected = view.selected.index();
    let entry = view.entry.map(str::to_owned);
    if first
        || cache.last_settings != Some(values)
        || cache.last_selected != Some(selected)
        || cache.last_entry != entry
    {
        draw_settings_panel(writer, view, Phase::Slow, PANEL_LEFT)?;
        draw_settings_panel(writer, view, Phase::Fast, FAST_PANEL_LEFT)?;
        cache.last_settings = Some(values);
        cache.last_selected = Some(selected);
        cache.last_entry = entry;
    }

    if first || cache.last_volume != Some(view.volume) {
        draw_box_border(writer, PANEL_LEFT, VOLUME_PANEL_ROW, 25, 4)?;
        queue!(
            writer,
            cursor::MoveTo(PANEL_LEFT + 2, VOLUME_PANEL_ROW + 1),
            SetForegroundColor(Color::Cyan),
            SetAttribute(Attribute::Bold),
            Print(format!("Volume: {:3}%", view.volume)),
            ResetColor,
            cursor::MoveTo(PANEL_LEFT + 2, VOLUME_PANEL_ROW + 2),
            SetForegroundColor(Color::Cyan),
            Print(create_progress_bar(f64::from(view.volume) / 100.0, 15, '#', '.')),
            ResetColor,
        )?;
        cache.last_volume = Some(view.volume);
    }

    let notice = view.notice.map(str::to_owned);
    if first || cache.last_notice != notice {
        queue!(
            writer,
            cursor::MoveTo(PANEL_LEFT, NOTICE_ROW),
            Clear(ClearType::UntilNewLine),
        )?;
        if let Some(message) = &notice {
            queue!(
                writer,
                SetForegroundColor(Color::Yellow),
                SetAttribute(Attribute::Bold),
                Print(format!("! {message}")),
                ResetColor,
            )?;
        }
        cache.last_notice = notice;
    }

    cache.first_render = false;
    writer.flush()
}

fn draw_phase_panel<W: Write>(writer: &mut W, snapshot: &WorkoutSnapshot) -> io::Result<()> {
    draw_box_border(writer, PANEL_LEFT, PHASE_PANEL_ROW, PHASE_PANEL_WIDTH, 5)?;

    queue!(
        writer,
        cursor::MoveTo(PANEL_LEFT + 2, PHASE_PANEL_ROW + 1),
        Clear(ClearType::UntilNewLine),
        SetAttribute(Attribute::Bold),
        SetForegroundColor(phase_color(snapshot.phase)),
        Print(format!("{:<6}", snapshot.phase.name())),
        SetForegroundColor(run_mode_color(snapshot.run_mode)),
        Print(format!("{:<9}", snapshot.run_mode.name())),
        SetForegroundColor(Color::White),
        Print(format!("{} left", format_clock(snapshot.remaining_seconds))),
        ResetColor,
        cursor::MoveTo(PANEL_LEFT + PHASE_PANEL_WIDTH - 1, PHASE_PANEL_ROW + 1),
        Print("|"),
    )?;

    let progress = if snapshot.phase_duration_seconds > 0 {
        let elapsed = snapshot
            .phase_duration_seconds
            .saturating_sub(snapshot.remaining_seconds);
        f64::from(elapsed) / f64::from(snapshot.phase_duration_seconds)
    } else {
        0.0
    };
    queue!(
        writer,
        cursor::MoveTo(PANEL_LEFT + 2, PHASE_PANEL_ROW + 2),
        SetForegroundColor(phase_color(snapshot.phase)),
        Print(create_progress_bar(progress, 40, '#', '.')),
        ResetColor,
    )?;

    queue!(
        writer,
        cursor::MoveTo(PANEL_LEFT + 2, PHASE_PANEL_ROW + 3),
        Clear(ClearType::UntilNewLine),
    )?;
    if let Some(bpm) = snapshot.bpm {
        // Parity has already flipped past the beat that just sounded.
        let sounded = snapshot.beat_parity.flip();
        for (parity, id) in [(BeatParity::Even, SoundId::Primary), (BeatParity::Odd, SoundId::Secondary)] {
            let color = if parity == sounded { Color::Green } else { Color::DarkGrey };
            queue!(
                writer,
                SetForegroundColor(color),
                Print(format!("{} {} ", id.icon(), id.name())),
            )?;
        }
        queue!(
            writer,
            SetForegroundColor(Color::White),
            Print(format!(" beat #{} @ {} bpm", snapshot.beats, bpm)),
            ResetColor,
        )?;
    } else {
        queue!(
            writer,
            SetForegroundColor(Color::DarkGrey),
            Print("metronome idle"),
            ResetColor,
        )?;
    }
    queue!(
        writer,
        cursor::MoveTo(PANEL_LEFT + PHASE_PANEL_WIDTH - 1, PHASE_PANEL_ROW + 3),
        Print("|"),
    )?;

    Ok(())
}

fn draw_settings_panel<W: Write>(writer: &mut W, view: &View<'_>, phase: Phase, x: u16) -> io::Result<()> {
    let (bpm_field, duration_field) = match phase {
        Phase::Fast => (ConfigField::FastBpm, ConfigField::FastDuration),
        _ => (ConfigField::SlowBpm, ConfigField::SlowDuration),
    };

    draw_box_border(writer, x, SETTINGS_PANEL_ROW, SETTINGS_PANEL_WIDTH, 4)?;
    queue!(
        writer,
        cursor::MoveTo(x + 2, SETTINGS_PANEL_ROW),
        SetForegroundColor(phase_color(phase)),
        SetAttribute(Attribute::Bold),
        Print(format!(" {} ", phase.name())),
        ResetColor,
    )?;

    for (row, field) in [bpm_field, duration_field].into_iter().enumerate() {
        let value = view.config.get(field);
        let shown = match field {
            ConfigField::SlowBpm | ConfigField::FastBpm => format!("{value} {}", field.unit()),
            _ => format!("{} ({value} {})", format_clock(value), field.unit()),
        };
        let label = match row {
            0 => "Tempo",
            _ => "Time ",
        };

        let is_selected = field == view.selected;
        let text = match (is_selected, view.entry) {
            (true, Some(entry)) => format!("> {label}: [{entry}_]"),
            (true, None) => format!("> {label}: {shown}"),
            (false, _) => format!("  {label}: {shown}"),
        };
        let in_range = field.range().contains(&value);
        let color = match (is_selected, in_range) {
            (_, false) => Color::Red,
            (true, true) => Color::Yellow,
            (false, true) => Color::White,
        };

        queue!(
            writer,
            cursor::MoveTo(x + 1, SETTINGS_PANEL_ROW + 1 + row as u16),
            Print(" ".repeat(SETTINGS_PANEL_WIDTH as usize - 2)),
            cursor::MoveTo(x + 1, SETTINGS_PANEL_ROW + 1 + row as u16),
            SetForegroundColor(color),
            Print(text),
            ResetColor,
        )?;
    }

    Ok(())
}

fn draw_controls<W: Write>(writer: &mut W) -> io::Result<()> {
    queue!(
        writer,
        cursor::MoveTo(PANEL_LEFT + 18, CONTROLS_TITLE_ROW),
        SetForegroundColor(Color::Yellow),
        SetAttribute(Attribute::Bold),
        Print("=== CONTROLS ==="),
        ResetColor,
    )?;

    let controls = [
        ("SPACE/ENTER", "Start / pause / resume", Color::Green),
        ("X/BACKSPACE", "Stop and reset", Color::Red),
        ("UP/DOWN/TAB", "Select setting", Color::Cyan),
        ("LEFT/RIGHT", "Adjust by 1 bpm / 5 s", Color::Cyan),
        ("PGUP/PGDN", "Adjust by 10 bpm / 30 s", Color::Cyan),
        ("0-9", "Type a value, ENTER to apply", Color::Magenta),
        ("V/C", "Volume up/down", Color::Blue),
        ("T", "Test click", Color::White),
        ("Q/ESC", "Quit", Color::Red),
    ];

    for (i, (key, desc, color)) in controls.iter().enumerate() {
        queue!(
            writer,
            cursor::MoveTo(PANEL_LEFT + 5, CONTROLS_START_ROW + i as u16),
            SetForegroundColor(*color),
            Print(format!("{key:12}")),
            SetForegroundColor(Color::White),
            Print(" - "),
            SetForegroundColor(Color::DarkGrey),
            Print(desc),
            ResetColor,
        )?;
    }

    Ok(())
}
