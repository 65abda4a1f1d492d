use clap::Subcommand;
use pomotask_core::{Config, Settings, SettingsStore};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the current timer settings
    Show {
        /// Print the stored JSON object
        #[arg(long)]
        json: bool,
    },
    /// Change timer settings; omitted values are kept
    Set {
        /// Work duration in minutes (1-60)
        #[arg(long)]
        work: Option<u32>,
        /// Short break duration in minutes (1-15)
        #[arg(long)]
        short_break: Option<u32>,
        /// Long break duration in minutes (5-30)
        #[arg(long)]
        long_break: Option<u32>,
        /// Play a sound when a phase ends
        #[arg(long)]
        sound: Option<bool>,
        /// Skip the prompt when a break ends
        #[arg(long)]
        auto_start: Option<bool>,
    },
    /// Restore default settings
    Reset,
}

pub fn run(action: SettingsAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = SettingsStore::load(super::open_store(config)?);

    match action {
        SettingsAction::Show { json } => {
            let settings = store.settings();
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                print_settings(&settings);
            }
        }
        SettingsAction::Set {
            work,
            short_break,
            long_break,
            sound,
            auto_start,
        } => {
            let current = store.settings();
            let settings = Settings {
                work_minutes: work.unwrap_or(current.work_minutes),
                short_break_minutes: short_break.unwrap_or(current.short_break_minutes),
                long_break_minutes: long_break.unwrap_or(current.long_break_minutes),
                sound_enabled: sound.unwrap_or(current.sound_enabled),
                auto_start_breaks: auto_start.unwrap_or(current.auto_start_breaks),
            };
            settings.validate()?;
            store.save(settings)?;
            println!("ok");
        }
        SettingsAction::Reset => {
            store.reset()?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}

pub fn print_settings(settings: &Settings) {
    let on_off = |b: bool| if b { "on" } else { "off" };
    println!("Work duration:        {} min", settings.work_minutes);
    println!("Short break duration: {} min", settings.short_break_minutes);
    println!("Long break duration:  {} min", settings.long_break_minutes);
    println!("Sound notifications:  {}", on_off(settings.sound_enabled));
    println!("Auto-start breaks:    {}", on_off(settings.auto_start_breaks));
}
