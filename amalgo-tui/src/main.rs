mod error;
mod events;
mod options;
mod paths;
mod terminal;
mod view;

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use amalgo::{Combobox, ComboboxBuilder, Document, DocumentEvent, Key, KeyCombo, OptionItem};
use log::{debug, error, info};
use simplelog::{Config, LevelFilter, WriteLogger};

use crate::error::DemoError;
use crate::events::Event;
use crate::terminal::TerminalGuard;
use crate::view::HitMap;

/// Input poll timeout; one animation frame per iteration.
const FRAME: Duration = Duration::from_millis(16);

struct App {
    document: Document,
    combobox: Combobox,
    hits: HitMap,
    selected: Arc<Mutex<Option<String>>>,
    running: bool,
}

impl App {
    fn status(&self) -> String {
        self.selected
            .lock()
            .ok()
            .and_then(|s| s.clone())
            .unwrap_or_else(|| "nothing yet".to_string())
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::Quit => self.running = false,
            Event::Resize => {}
            Event::PointerDown { row } => {
                let body = self.document.body();
                let target = self.hits.node_at(row).unwrap_or(body);
                self.document.dispatch(DocumentEvent::pointer_down(target));
                if target != body {
                    self.document.dispatch(DocumentEvent::click(target));
                }
            }
            Event::PointerMove { row } => {
                if let Some(node) = self.hits.node_at(row) {
                    self.document.dispatch(DocumentEvent::pointer_enter(node));
                }
            }
            Event::Key(key) => self.on_key(key),
        }
    }

    fn on_key(&mut self, key: KeyCombo) {
        if !self.combobox.is_open() {
            match key.key {
                Key::Char('q') | Key::Escape => self.running = false,
                Key::Enter | Key::Down | Key::Char(' ') => {
                    self.combobox.activate_trigger();
                }
                _ => {}
            }
            return;
        }

        let event = self.combobox.press_key(key);
        if event.is_default_prevented() || !self.combobox.is_open() {
            return;
        }
        if key.modifiers.ctrl || key.modifiers.alt {
            return;
        }

        // Unhandled keys edit the query like a text field would
        let mut query = self.combobox.query();
        match key.key {
            Key::Char(c) => query.push(c),
            Key::Backspace => {
                if query.pop().is_none() {
                    return;
                }
            }
            _ => return,
        }
        self.combobox.type_query(&query);
    }
}

fn init_logging() -> Result<(), DemoError> {
    let Some(path) = paths::log_file() else {
        return Ok(());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let log_file = File::create(&path)?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)?;
    Ok(())
}

fn run(path: Option<PathBuf>) -> Result<(), DemoError> {
    let file = options::load(path)?;
    let labels: HashMap<String, String> = file
        .options
        .iter()
        .map(|o| (o.option_value(), o.option_label()))
        .collect();

    let document = Document::new();
    let combobox = ComboboxBuilder::new(&document)
        .id("demo")
        .trigger_label(&file.label)
        .placeholder("type to filter")
        .options(file.options.iter().cloned())
        .config(file.config.clone())
        .mount(document.body())?;
    info!("Mounted {} with {} options", combobox.id(), labels.len());

    let selected = Arc::new(Mutex::new(None));
    {
        let selected = Arc::clone(&selected);
        let document = document.clone();
        let trigger = combobox.parts().trigger;
        combobox.on_select(move |event| {
            let label = labels
                .get(&event.value)
                .cloned()
                .unwrap_or_else(|| event.value.clone());
            info!("Selected {} ({})", label, event.value);
            document.set_text(trigger, label.clone());
            if let Ok(mut selected) = selected.lock() {
                *selected = Some(label);
            }
        });
    }
    document.focus(combobox.parts().trigger);

    let mut terminal = TerminalGuard::new()?;
    let mut app = App {
        document: document.clone(),
        combobox: combobox.clone(),
        hits: HitMap::default(),
        selected,
        running: true,
    };

    while app.running {
        let status = app.status();
        app.hits = view::render(terminal.stdout(), &document, &combobox, &status)?;
        for event in terminal.poll(FRAME)? {
            if let Some(event) = events::convert_event(event) {
                app.handle(event);
            }
        }
        document.run_frame();
    }

    debug!("Shutting down");
    combobox.destroy();
    Ok(())
}

fn main() {
    if let Err(e) = init_logging() {
        eprintln!("Warning: {}", e);
    }

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    if let Err(e) = run(path) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
