use std::io::{self, BufWriter};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{Event, poll, read},
    execute,
    terminal::{Clear, ClearType, disable_raw_mode, enable_raw_mode},
};
use tracing::{info, warn};

use walk_metronome::app::App;
use walk_metronome::audio::RodioAudio;
use walk_metronome::logging;
use walk_metronome::settings::{self, DebouncedStore, JsonFileStore, Settings, SettingsStore};
use walk_metronome::utilities::cache::UICache;
use walk_metronome::utilities::display::display_ui;
use walk_metronome::workout::WorkoutController;

const UI_UPDATE_INTERVAL: Duration = Duration::from_millis(16);
const INPUT_CHECK_INTERVAL: Duration = Duration::from_millis(8);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _log_guard = match settings::config_dir() {
        Ok(dir) => logging::init(&dir),
        Err(err) => {
            eprintln!("{err}, logging disabled");
            None
        }
    };

    let mut startup_notice = None;
    let (saved, store) = match JsonFileStore::default_location() {
        Ok(mut store) => {
            let saved = match store.load() {
                Ok(loaded) => loaded.unwrap_or_default(),
                Err(err) => {
                    warn!(error = %err, path = ?store.path(), "could not load settings, using defaults");
                    startup_notice = Some(format!("Could not load settings: {err}"));
                    Settings::default()
                }
            };
            (saved, Some(DebouncedStore::new(store)))
        }
        Err(err) => {
            warn!(error = %err, "settings will not be saved");
            (Settings::default(), None)
        }
    };
    info!(?saved, "starting");

    let controller = WorkoutController::new(saved.workout, saved.volume, RodioAudio::new());
    let mut app = App::new(controller, store);
    if let Some(message) = startup_notice {
        app.controller_mut().notify(message, Instant::now());
    }

    enable_raw_mode()?;
    execute!(io::stdout(), cursor::Hide, Clear(ClearType::All))?;

    let result = run(&mut app);
    app.shutdown();

    execute!(
        io::stdout(),
        cursor::Show,
        Clear(ClearType::All),
        cursor::MoveTo(0, 0)
    )?;
    disable_raw_mode()?;
    result?;

    info!("exiting");
    println!("\n* ======================================= *");
    println!("   Walk on. Keep the rhythm alive!");
    println!("* ======================================= *\n");

    Ok(())
}

fn run(app: &mut App<RodioAudio>) -> io::Result<()> {
    let mut writer = BufWriter::new(io::stdout());
    let mut ui_cache = UICache::new();
    let mut dirty = true;
    let mut last_ui_update = Instant::now();
    let mut input_check_time = Instant::now();

    while !app.should_quit() {
        let now = Instant::now();
        app.poll(now);

        if now.duration_since(input_check_time) >= INPUT_CHECK_INTERVAL {
            while poll(Duration::ZERO)? {
                match read()? {
                    Event::Key(key) => dirty |= app.handle_key(key, Instant::now()),
                    Event::Resize(..) => {
                        ui_cache = UICache::new();
                        dirty = true;
                    }
                    _ => {}
                }
            }
            input_check_time = now;
        }

        if dirty || now.duration_since(last_ui_update) >= UI_UPDATE_INTERVAL {
            let audio_ready = app.controller_mut().is_audio_ready();
            display_ui(&app.view(now, audio_ready), &mut ui_cache, &mut writer)?;
            last_ui_update = now;
            dirty = false;
        }

        thread::sleep(Duration::from_millis(1));
    }

    Ok(())
}
