use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::Action;
use crate::config::{KeybindsConfig, parse_key};
use crate::render::{Overlay, Renderer};
use crate::system::collector::Sampler;
use crate::system::snapshot::Snapshot;
use crate::ui::statusbar::KeyHints;
use crate::ui::theme::Theme;

/// Owns the sampling loop state: the sampler, the output style and the
/// snapshot from the previous tick.
pub struct Monitor<R: Renderer> {
    sampler: Sampler,
    renderer: R,
    previous: Option<Snapshot>,
    ticks: u64,
}

impl<R: Renderer> Monitor<R> {
    pub fn new(sampler: Sampler, renderer: R) -> Self {
        Monitor {
            sampler,
            renderer,
            previous: None,
            ticks: 0,
        }
    }

    /// Samples once, renders against the previous snapshot and keeps the new
    /// one for the next tick.
    pub fn tick(&mut self) -> Result<()> {
        let current = self.sampler.collect()?;
        self.renderer.render(&current, self.previous.as_ref())?;
        self.previous = Some(current);
        self.ticks += 1;
        tracing::trace!(tick = self.ticks, "frame rendered");
        Ok(())
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Releases the GPU backend and hands the renderer back.
    pub fn finish(self) -> Result<R> {
        self.sampler.shutdown()?;
        tracing::info!(ticks = self.ticks, "monitor stopped");
        Ok(self.renderer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Help,
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub pause: KeyCode,
    pub refresh: KeyCode,
    pub theme: KeyCode,
    pub help: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            pause: parse_key(&kb.pause).unwrap_or(KeyCode::Char('p')),
            refresh: parse_key(&kb.refresh).unwrap_or(KeyCode::Char('r')),
            theme: parse_key(&kb.theme).unwrap_or(KeyCode::Char('t')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
        }
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        vec![
            (key_label(self.quit), "Quit"),
            (key_label(self.pause), "Pause / resume"),
            (key_label(self.refresh), "Sample now"),
            (key_label(self.theme), "Cycle theme"),
            (key_label(self.help), "Toggle help"),
            ("Ctrl+C".to_string(), "Quit (always)"),
        ]
    }

    pub fn hints(&self) -> KeyHints {
        KeyHints {
            quit: key_label(self.quit),
            pause: key_label(self.pause),
            refresh: key_label(self.refresh),
            theme: key_label(self.theme),
            help: key_label(self.help),
        }
    }
}

fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        _ => "?".to_string(),
    }
}

/// Interactive state for the table style.
pub struct App<R: Renderer> {
    pub running: bool,
    pub paused: bool,
    pub input_mode: InputMode,
    pub theme: Theme,
    pub keybinds: ResolvedKeybinds,
    monitor: Monitor<R>,
}

impl<R: Renderer> App<R> {
    pub fn new(monitor: Monitor<R>, keybinds: ResolvedKeybinds, theme: Theme) -> Self {
        let mut app = App {
            running: true,
            paused: false,
            input_mode: InputMode::Normal,
            theme,
            keybinds,
            monitor,
        };
        app.sync_overlay();
        app
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key.code),
            InputMode::Help => self.map_key_help(key.code),
        }
    }

    fn map_key_normal(&self, code: KeyCode) -> Action {
        let kb = &self.keybinds;
        if code == kb.quit {
            Action::Quit
        } else if code == kb.pause {
            Action::TogglePause
        } else if code == kb.refresh {
            Action::Refresh
        } else if code == kb.theme {
            Action::CycleTheme
        } else if code == kb.help {
            Action::ToggleHelp
        } else {
            Action::None
        }
    }

    fn map_key_help(&self, code: KeyCode) -> Action {
        if code == self.keybinds.help || code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::TogglePause => {
                self.paused = !self.paused;
                tracing::info!(paused = self.paused, "sampling toggled");
                self.sync_overlay();
                self.monitor.renderer_mut().redraw()?;
            }
            Action::Refresh => self.monitor.tick()?,
            Action::CycleTheme => {
                self.theme = self.theme.next();
                self.sync_overlay();
                self.monitor.renderer_mut().redraw()?;
            }
            Action::ToggleHelp => {
                self.input_mode = match self.input_mode {
                    InputMode::Help => InputMode::Normal,
                    InputMode::Normal => InputMode::Help,
                };
                self.sync_overlay();
                self.monitor.renderer_mut().redraw()?;
            }
            Action::None => {}
        }
        Ok(())
    }

    /// Interval tick; skipped while paused.
    pub fn on_tick(&mut self) -> Result<()> {
        if self.paused {
            return Ok(());
        }
        self.monitor.tick()
    }

    pub fn redraw(&mut self) -> Result<()> {
        self.monitor.renderer_mut().redraw()
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn monitor(&self) -> &Monitor<R> {
        &self.monitor
    }

    pub fn into_monitor(self) -> Monitor<R> {
        self.monitor
    }

    fn sync_overlay(&mut self) {
        let overlay = Overlay {
            paused: self.paused,
            theme: self.theme.name,
            help: self.show_help().then(|| self.keybinds.help_entries()),
        };
        self.monitor.renderer_mut().set_overlay(&overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProbeError;
    use crate::system::collector::OsMetrics;
    use crate::system::gpu::NoGpu;
    use crate::system::policy::SamplerPolicy;
    use crate::system::snapshot::{DiskUsage, MemoryUsage, NetworkIo};
    use std::collections::{BTreeMap, VecDeque};

    /// Replays one CPU reading per sample; everything else stays fixed.
    struct ScriptedOs {
        cpu: VecDeque<f64>,
        uptime: u64,
    }

    impl OsMetrics for ScriptedOs {
        fn cpu_per_core(&mut self) -> Result<Vec<f64>, ProbeError> {
            self.cpu
                .pop_front()
                .map(|pct| vec![pct])
                .ok_or(ProbeError::Unavailable("cpu"))
        }

        fn memory(&mut self) -> Result<MemoryUsage, ProbeError> {
            Ok(MemoryUsage::from_bytes(1000, 500))
        }

        fn disks(&mut self) -> Result<BTreeMap<String, DiskUsage>, ProbeError> {
            Ok(BTreeMap::new())
        }

        fn networks(&mut self) -> Result<BTreeMap<String, NetworkIo>, ProbeError> {
            Ok(BTreeMap::new())
        }

        fn uptime(&mut self) -> Result<u64, ProbeError> {
            Ok(self.uptime)
        }
    }

    #[derive(Default)]
    struct Recording {
        /// (current cpu, previous cpu) per render.
        frames: Vec<(Vec<f64>, Option<Vec<f64>>)>,
        overlays: Vec<Overlay>,
        redraws: usize,
    }

    impl Renderer for Recording {
        fn render(&mut self, current: &Snapshot, previous: Option<&Snapshot>) -> Result<()> {
            self.frames.push((
                current.cpu_usage.clone(),
                previous.map(|p| p.cpu_usage.clone()),
            ));
            Ok(())
        }

        fn set_overlay(&mut self, overlay: &Overlay) {
            self.overlays.push(overlay.clone());
        }

        fn redraw(&mut self) -> Result<()> {
            self.redraws += 1;
            Ok(())
        }
    }

    fn monitor(cpu: &[f64]) -> Monitor<Recording> {
        let os = ScriptedOs {
            cpu: cpu.iter().copied().collect(),
            uptime: 10,
        };
        let sampler = Sampler::new(Box::new(os), Box::new(NoGpu), SamplerPolicy::default());
        Monitor::new(sampler, Recording::default())
    }

    fn app(cpu: &[f64]) -> App<Recording> {
        App::new(
            monitor(cpu),
            ResolvedKeybinds::from_config(&KeybindsConfig::default()),
            Theme::dark(),
        )
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn each_tick_renders_against_the_previous_snapshot() {
        let mut monitor = monitor(&[1.0, 2.0, 3.0]);
        for _ in 0..3 {
            monitor.tick().unwrap();
        }
        assert_eq!(monitor.ticks(), 3);
        assert_eq!(monitor.previous().unwrap().cpu_usage, vec![3.0]);

        let recording = monitor.finish().unwrap();
        assert_eq!(
            recording.frames,
            vec![
                (vec![1.0], None),
                (vec![2.0], Some(vec![1.0])),
                (vec![3.0], Some(vec![2.0])),
            ]
        );
    }

    #[test]
    fn substituted_cpu_reading_still_renders() {
        let mut monitor = monitor(&[]);
        monitor.tick().unwrap();
        let recording = monitor.finish().unwrap();
        assert_eq!(recording.frames, vec![(Vec::new(), None)]);
    }

    #[test]
    fn default_keybinds() {
        let app = app(&[]);
        assert_eq!(app.map_key(press(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(app.map_key(press(KeyCode::Char('p'))), Action::TogglePause);
        assert_eq!(app.map_key(press(KeyCode::Char('r'))), Action::Refresh);
        assert_eq!(app.map_key(press(KeyCode::Char('t'))), Action::CycleTheme);
        assert_eq!(app.map_key(press(KeyCode::Char('?'))), Action::ToggleHelp);
        assert_eq!(app.map_key(press(KeyCode::Char('z'))), Action::None);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.map_key(ctrl_c), Action::Quit);
    }

    #[test]
    fn custom_keybind_remap_works() {
        let kb = KeybindsConfig {
            quit: "x".to_string(),
            pause: "Space".to_string(),
            ..KeybindsConfig::default()
        };
        let app = App::new(monitor(&[]), ResolvedKeybinds::from_config(&kb), Theme::dark());

        assert_eq!(app.map_key(press(KeyCode::Char('x'))), Action::Quit);
        assert_eq!(app.map_key(press(KeyCode::Char(' '))), Action::TogglePause);
        assert_eq!(app.map_key(press(KeyCode::Char('q'))), Action::None);
    }

    #[test]
    fn pause_skips_interval_ticks() {
        let mut app = app(&[1.0, 2.0, 3.0]);
        app.on_tick().unwrap();
        app.dispatch(Action::TogglePause).unwrap();
        app.on_tick().unwrap();
        app.on_tick().unwrap();
        assert_eq!(app.monitor().ticks(), 1);

        // A manual refresh samples even while paused.
        app.dispatch(Action::Refresh).unwrap();
        assert_eq!(app.monitor().ticks(), 2);

        app.dispatch(Action::TogglePause).unwrap();
        app.on_tick().unwrap();
        assert_eq!(app.monitor().ticks(), 3);
    }

    #[test]
    fn overlay_tracks_pause_theme_and_help() {
        let mut app = app(&[]);
        app.dispatch(Action::TogglePause).unwrap();
        app.dispatch(Action::CycleTheme).unwrap();
        app.dispatch(Action::ToggleHelp).unwrap();

        let monitor = app.into_monitor();
        let recording = monitor.finish().unwrap();
        let last = recording.overlays.last().unwrap();
        assert!(last.paused);
        assert_eq!(last.theme, "light");
        assert!(last.help.as_ref().is_some_and(|h| h[0].1 == "Quit"));
        assert_eq!(recording.redraws, 3);
        // Initial sync plus one per action.
        assert_eq!(recording.overlays.len(), 4);
    }

    #[test]
    fn help_mode_blocks_other_keys() {
        let mut app = app(&[]);
        app.dispatch(Action::ToggleHelp).unwrap();
        assert!(app.show_help());

        assert_eq!(app.map_key(press(KeyCode::Char('q'))), Action::None);
        assert_eq!(app.map_key(press(KeyCode::Char('p'))), Action::None);
        assert_eq!(app.map_key(press(KeyCode::Char('?'))), Action::ToggleHelp);
        assert_eq!(app.map_key(press(KeyCode::Esc)), Action::ToggleHelp);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.map_key(ctrl_c), Action::Quit);

        app.dispatch(Action::ToggleHelp).unwrap();
        assert!(!app.show_help());
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut app = app(&[]);
        assert!(app.running);
        app.dispatch(Action::Quit).unwrap();
        assert!(!app.running);
    }
}
