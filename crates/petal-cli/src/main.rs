use clap::{CommandFactory, Parser, Subcommand};
use crossterm::event::{KeyEvent, KeyEventKind};
use petal_core::config::{Config, VisionSection};
use petal_core::defaults::{load_defaults, load_embedded_defaults};
use petal_core::speech::{CommandSpeech, SpeechWorker};
use petal_core::vision::{
    classifier_from_config, Classifier, Frame, FrameSource, ImageFolderSource, VisionError,
};
use petal_core::wiki::{article_title, article_url, open_in_browser, parse_summary};
use petal_store::{CareGuideStore, StoreError, NO_INFO};
use reqwest::blocking::Client;
use std::fs::OpenOptions;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod session;
mod tui;

use session::{recognize, FrameGate, Recognition};

#[derive(Debug, Parser)]
#[command(
    name = "petal",
    version,
    about = "Recognize flowers and keep a local care guide"
)]
struct Cli {
    #[arg(
        long = "db",
        value_name = "PATH",
        global = true,
        help = "Care guide database (defaults to PETAL_DB or config)"
    )]
    db: Option<PathBuf>,
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        help = "Increase verbosity",
        conflicts_with = "quiet"
    )]
    verbose: bool,
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress non-error output"
    )]
    quiet: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Launch TUI")]
    Tui {
        #[arg(
            long,
            value_name = "PATH",
            help = "Still image or folder of images to recognize (video files are not supported)"
        )]
        source: Option<PathBuf>,
    },
    #[command(about = "Create the care guide and seed built-in flowers")]
    Init,
    #[command(about = "Show care tips for a flower")]
    Lookup { name: String },
    #[command(about = "Add or replace care tips for a flower")]
    Add {
        name: String,
        #[arg(help = "Care tips, joined with spaces")]
        care: Vec<String>,
    },
    #[command(about = "Search flower names")]
    Search { query: String },
    #[command(about = "List every flower in the care guide")]
    List,
    #[command(about = "List built-in flowers")]
    Defaults,
    #[command(about = "Classify an image and show care tips")]
    Detect { image: PathBuf },
    #[command(about = "Read care tips for a flower aloud")]
    Speak { name: String },
    #[command(about = "Show the Wikipedia page for a flower")]
    Wiki {
        name: String,
        #[arg(long, help = "Open the page in a browser")]
        open: bool,
        #[arg(long, help = "Fetch and print the page summary")]
        summary: bool,
    },
    #[command(about = "Write the care guide as json")]
    Export {
        #[arg(short = 'o', long = "output", value_name = "PATH")]
        output: Option<PathBuf>,
    },
    #[command(about = "Add or replace flowers from a json export")]
    Import { file: PathBuf },
    #[command(about = "Generate shell completions")]
    Completions { shell: clap_complete::Shell },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing home directory in environment")]
    MissingHome,
    #[error("config error: {0}")]
    Config(#[from] petal_core::config::ConfigError),
    #[error("care guide defaults error: {0}")]
    Defaults(#[from] petal_core::defaults::DefaultsError),
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Vision(#[from] VisionError),
    #[error("{0}")]
    Session(#[from] session::SessionError),
    #[error("speech error: {0}")]
    Speech(#[from] petal_core::speech::SpeechError),
    #[error("wikipedia error: {0}")]
    Wiki(#[from] petal_core::wiki::WikiError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("wikipedia request failed ({0}): {1}")]
    WikiStatus(reqwest::StatusCode, String),
    #[error("failed to create directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),
    #[error("failed to open log file: {0}")]
    LogFile(std::io::Error),
    #[error("failed to read {0}: {1}")]
    ReadFile(PathBuf, std::io::Error),
    #[error("failed to write {0}: {1}")]
    WriteFile(PathBuf, std::io::Error),
    #[error("terminal error: {0}")]
    Terminal(std::io::Error),
}

#[derive(Debug, Clone, Copy)]
struct Output {
    quiet: bool,
    verbose: bool,
}

impl Output {
    fn info(&self, message: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", message.as_ref());
        }
    }

    fn status(&self, message: impl AsRef<str>) {
        if !self.quiet {
            eprintln!("{}", message.as_ref());
        }
    }

    fn warn(&self, message: impl AsRef<str>) {
        if !self.quiet {
            eprintln!("{}", message.as_ref());
        }
    }

    fn verbose(&self, message: impl AsRef<str>) {
        if self.verbose && !self.quiet {
            eprintln!("{}", message.as_ref());
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Tui { source: None });
    let output = Output {
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    let log_file = match command {
        Command::Tui { .. } => Some(log_path()?),
        _ => None,
    };
    init_logging(cli.verbose, log_file)?;
    let config = load_config_or_default()?;

    match command {
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "petal", &mut std::io::stdout());
            Ok(())
        }
        Command::Defaults => {
            for (index, name) in load_embedded_defaults()?.keys().enumerate() {
                output.info(format!("{:>2}. {}", index + 1, name));
            }
            Ok(())
        }
        Command::Wiki {
            name,
            open,
            summary,
        } => run_wiki(&output, &config, &name, open, summary),
        command => {
            let db_path = resolve_db_path(cli.db, &config)?;
            let mut store = open_care_guide(&output, &config, &db_path)?;
            let result = run_with_store(command, &output, &config, &db_path, &mut store);
            let closed = store.close();
            result?;
            closed?;
            Ok(())
        }
    }
}

fn run_with_store(
    command: Command,
    output: &Output,
    config: &Config,
    db_path: &Path,
    store: &mut CareGuideStore,
) -> Result<(), CliError> {
    match command {
        Command::Tui { source } => run_tui(output, config, source, store),
        Command::Init => {
            output.info(format!(
                "care guide ready at {} ({} flowers)",
                db_path.display(),
                store.count()?
            ));
            Ok(())
        }
        Command::Lookup { name } => {
            let care = store.lookup(&name)?;
            output.info(care.as_deref().unwrap_or(NO_INFO));
            Ok(())
        }
        Command::Add { name, care } => {
            let care = care.join(" ");
            store.upsert(&name, &care)?;
            output.info(format!("{} added to care guide.", name.trim()));
            Ok(())
        }
        Command::Search { query } => {
            for name in store.search(&query)? {
                output.info(name);
            }
            Ok(())
        }
        Command::List => {
            for entry in store.list()? {
                output.info(format!("{}: {}", entry.name, entry.care));
            }
            Ok(())
        }
        Command::Detect { image } => {
            let vision = resolved_vision(config)?;
            let classifier = classifier_from_config(&vision)?.ok_or(VisionError::Unconfigured)?;
            let frame = Frame::open(&image)?;
            let recognition = recognize(
                classifier.as_ref(),
                store,
                config.vision.blur_threshold,
                &frame,
            )?;
            output.info(recognition.detected_line());
            output.info(recognition.care_line());
            if let Some(quality) = recognition.quality_line() {
                output.info(quality);
            }
            Ok(())
        }
        Command::Speak { name } => {
            let recognition = Recognition::manual(store, &name)?;
            output.verbose(recognition.readout());
            let worker = SpeechWorker::spawn(CommandSpeech::from_config(&config.speech))?;
            worker.speak(recognition.readout());
            worker.finish();
            Ok(())
        }
        Command::Export { output: path } => {
            match path {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .map_err(|err| CliError::WriteFile(path.clone(), err))?;
                    store.export_json(file)?;
                    output.status(format!("exported {} flowers to {}", store.count()?, path.display()));
                }
                None => {
                    let stdout = std::io::stdout();
                    let mut handle = stdout.lock();
                    store.export_json(&mut handle)?;
                    writeln!(handle).map_err(|err| CliError::WriteFile("stdout".into(), err))?;
                }
            }
            Ok(())
        }
        Command::Import { file } => {
            let reader = std::fs::File::open(&file)
                .map_err(|err| CliError::ReadFile(file.clone(), err))?;
            let imported = store.import_json(BufReader::new(reader))?;
            output.info(format!("imported {} flowers", imported));
            Ok(())
        }
        Command::Completions { .. } | Command::Defaults | Command::Wiki { .. } => Ok(()),
    }
}

fn open_care_guide(
    output: &Output,
    config: &Config,
    db_path: &Path,
) -> Result<CareGuideStore, CliError> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|err| CliError::CreateDir(parent.to_path_buf(), err))?;
    }
    let mut extra_dirs = Vec::new();
    for dir in &config.defaults.extra_dirs {
        extra_dirs.push(expand_tilde(dir)?);
    }
    let defaults = load_defaults(&extra_dirs)?;

    let mut store = CareGuideStore::open(db_path)?;
    let seeded = store.initialize(&defaults)?;
    output.verbose(format!(
        "using care guide at {} ({} new default entries)",
        db_path.display(),
        seeded
    ));
    Ok(store)
}

fn run_wiki(
    output: &Output,
    config: &Config,
    name: &str,
    open: bool,
    summary: bool,
) -> Result<(), CliError> {
    let url = article_url(&config.wiki.base_url, name)?;
    output.info(&url);
    if summary {
        match fetch_summary(&config.wiki.summary_url, name)? {
            Some(extract) => output.info(extract),
            None => output.warn("no summary available"),
        }
    }
    if open {
        open_in_browser(&url)?;
    }
    Ok(())
}

fn fetch_summary(summary_url: &str, name: &str) -> Result<Option<String>, CliError> {
    let api_url = format!(
        "{}/{}",
        summary_url.trim_end_matches('/'),
        article_title(name)?
    );
    debug!(url = %api_url, "fetching wikipedia summary");
    let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
    let response = client
        .get(&api_url)
        .header("User-Agent", format!("petal/{}", env!("CARGO_PKG_VERSION")))
        .header("Accept", "application/json")
        .send()?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(CliError::WikiStatus(status, body));
    }
    let body = response.text()?;
    Ok(parse_summary(&body)?)
}

struct TuiContext<'a> {
    store: &'a CareGuideStore,
    classifier: Option<Box<dyn Classifier>>,
    source: Option<Box<dyn FrameSource>>,
    speech: Option<SpeechWorker>,
    gate: FrameGate,
    blur_threshold: f64,
    wiki_base_url: String,
}

fn run_tui(
    output: &Output,
    config: &Config,
    source: Option<PathBuf>,
    store: &CareGuideStore,
) -> Result<(), CliError> {
    use crossterm::terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
    };
    use ratatui::backend::CrosstermBackend;
    use ratatui::Terminal;
    use tui::app::{App, ToastLevel};

    let mut app = App::new(config.tui.dark);
    app.flower_count = store.count()?;

    let classifier = match resolved_vision(config).and_then(|vision| {
        classifier_from_config(&vision).map_err(CliError::from)
    }) {
        Ok(classifier) => classifier,
        Err(err) => {
            app.push_toast(ToastLevel::Error, err.to_string());
            None
        }
    };
    app.classifier_ready = classifier.is_some();

    let source_path = match source {
        Some(path) => Some(path),
        None if !config.vision.source.trim().is_empty() => {
            Some(expand_tilde(config.vision.source.trim())?)
        }
        None => None,
    };
    let frames: Option<Box<dyn FrameSource>> = match source_path {
        Some(path) => match ImageFolderSource::open(&path) {
            Ok(frames) => {
                app.source_label = Some(path.display().to_string());
                Some(Box::new(frames))
            }
            Err(err) => {
                app.push_toast(ToastLevel::Error, err.to_string());
                None
            }
        },
        None => None,
    };

    let speech = match SpeechWorker::spawn(CommandSpeech::from_config(&config.speech)) {
        Ok(worker) => Some(worker),
        Err(err) => {
            output.warn(err.to_string());
            None
        }
    };

    let mut ctx = TuiContext {
        store,
        classifier,
        source: frames,
        speech,
        gate: FrameGate::new(Duration::from_millis(config.vision.frame_interval_ms)),
        blur_threshold: config.vision.blur_threshold,
        wiki_base_url: config.wiki.base_url.clone(),
    };

    enable_raw_mode().map_err(CliError::Terminal)?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen).map_err(CliError::Terminal)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(CliError::Terminal)?;

    let result = run_tui_loop(
        &mut terminal,
        &mut app,
        &mut ctx,
        Duration::from_millis(config.tui.tick_ms.max(1)),
    );

    disable_raw_mode().map_err(CliError::Terminal)?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(CliError::Terminal)?;
    terminal.show_cursor().map_err(CliError::Terminal)?;
    result
}

fn run_tui_loop(
    terminal: &mut ratatui::Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>,
    app: &mut tui::app::App,
    ctx: &mut TuiContext<'_>,
    tick: Duration,
) -> Result<(), CliError> {
    use crossterm::event::{self, Event};

    let mut last_tick = Instant::now();
    loop {
        app.clear_expired_toast();
        terminal
            .draw(|frame| tui::ui::render(frame, app))
            .map_err(CliError::Terminal)?;

        let timeout = tick.saturating_sub(last_tick.elapsed());
        if event::poll(timeout).map_err(CliError::Terminal)? {
            if let Event::Key(key) = event::read().map_err(CliError::Terminal)? {
                if key.kind == KeyEventKind::Press {
                    let result = if app.overlay.is_some() {
                        handle_overlay_key(key, app, ctx)
                    } else {
                        handle_main_key(key, app, ctx)
                    };
                    if let Err(err) = result {
                        app.push_toast(tui::app::ToastLevel::Error, err.to_string());
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick {
            if let Some(source) = ctx.source.as_mut() {
                let outcome = session::run_tick(
                    &mut **source,
                    ctx.classifier.as_deref(),
                    ctx.store,
                    ctx.blur_threshold,
                    &mut ctx.gate,
                    Instant::now(),
                );
                app.apply_tick(outcome);
            }
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_main_key(
    key: KeyEvent,
    app: &mut tui::app::App,
    ctx: &mut TuiContext<'_>,
) -> Result<(), CliError> {
    use tui::app::{FlowerEditorState, Overlay, SourcePromptState, ToastLevel};
    use tui::input::{map_key, InputAction};

    match map_key(key) {
        InputAction::Quit => app.should_quit = true,
        InputAction::Help => app.overlay = Some(Overlay::Help),
        InputAction::Next => app.next(),
        InputAction::Prev => app.prev(),
        InputAction::Insert(ch) => {
            app.query.push(ch);
            update_search_results(ctx.store, app)?;
        }
        InputAction::Backspace => {
            app.query.pop();
            update_search_results(ctx.store, app)?;
        }
        InputAction::Clear => {
            app.query.clear();
            update_search_results(ctx.store, app)?;
        }
        InputAction::Select => match app.selected_result().map(str::to_string) {
            Some(name) => {
                let recognition = Recognition::manual(ctx.store, &name)?;
                app.select_manual(recognition);
            }
            None => app.push_toast(ToastLevel::Info, "No flower selected"),
        },
        InputAction::Speak => {
            let readout = app.current.as_ref().map(Recognition::readout);
            match (readout, &ctx.speech) {
                (Some(readout), Some(speech)) => {
                    speech.speak(readout);
                    app.push_toast(ToastLevel::Info, "Speaking...");
                }
                (None, _) => app.push_toast(ToastLevel::Info, "Nothing to read yet"),
                (_, None) => app.push_toast(ToastLevel::Error, "Speech is unavailable"),
            }
        }
        InputAction::OpenWiki => match app.current_name().map(str::to_string) {
            Some(name) => {
                let url = article_url(&ctx.wiki_base_url, &name)?;
                open_in_browser(&url)?;
                app.push_toast(ToastLevel::Info, url);
            }
            None => app.push_toast(ToastLevel::Info, "Nothing detected yet"),
        },
        InputAction::AddFlower => {
            app.overlay = Some(Overlay::AddFlower(FlowerEditorState::new(String::new())));
        }
        InputAction::EditFlower => match app.current_name().map(str::to_string) {
            Some(name) => {
                let mut editor = FlowerEditorState::new(name.clone());
                editor.care = ctx.store.lookup(&name)?.unwrap_or_default();
                app.overlay = Some(Overlay::AddFlower(editor));
            }
            None => app.push_toast(ToastLevel::Info, "Nothing detected yet"),
        },
        InputAction::ChangeSource => {
            app.overlay = Some(Overlay::Source(SourcePromptState {
                path: app.source_label.clone().unwrap_or_default(),
                error: None,
            }));
        }
        InputAction::ToggleTheme => app.toggle_theme(),
        InputAction::None => {}
    }
    Ok(())
}

fn handle_overlay_key(
    key: KeyEvent,
    app: &mut tui::app::App,
    ctx: &mut TuiContext<'_>,
) -> Result<(), CliError> {
    use tui::app::{EditorField, Overlay, ToastLevel};
    use tui::input::{map_edit_key, EditAction};

    let Some(overlay) = app.overlay.take() else {
        return Ok(());
    };
    let action = map_edit_key(key);

    match overlay {
        Overlay::Help => {
            if !matches!(action, EditAction::Cancel | EditAction::Submit) {
                app.overlay = Some(Overlay::Help);
            }
        }
        Overlay::AddFlower(mut state) => match action {
            EditAction::Cancel => {}
            EditAction::Submit
                if state.active == EditorField::Name && state.care.trim().is_empty() =>
            {
                state.next_field();
                app.overlay = Some(Overlay::AddFlower(state));
            }
            EditAction::Submit => match ctx.store.upsert(&state.name, &state.care) {
                Ok(()) => {
                    let name = state.name.trim().to_string();
                    app.flower_count = ctx.store.count()?;
                    refresh_current_care(ctx.store, app, &name)?;
                    update_search_results(ctx.store, app)?;
                    app.push_toast(ToastLevel::Info, format!("{} added to care guide.", name));
                }
                Err(StoreError::Validation(err)) => {
                    state.error = Some(err.to_string());
                    app.overlay = Some(Overlay::AddFlower(state));
                }
                Err(err) => {
                    app.overlay = Some(Overlay::AddFlower(state));
                    return Err(err.into());
                }
            },
            other => {
                apply_edit(state.active_input(), other);
                state.error = None;
                if other == EditAction::NextField {
                    state.next_field();
                }
                app.overlay = Some(Overlay::AddFlower(state));
            }
        },
        Overlay::Source(mut state) => match action {
            EditAction::Cancel => {}
            EditAction::Submit => {
                let path = expand_tilde(state.path.trim())?;
                match ImageFolderSource::open(&path) {
                    Ok(frames) => {
                        app.push_toast(
                            ToastLevel::Info,
                            format!("{} frames from {}", frames.len(), path.display()),
                        );
                        app.source_label = Some(path.display().to_string());
                        ctx.source = Some(Box::new(frames));
                        ctx.gate.reset();
                    }
                    Err(err) => {
                        state.error = Some(err.to_string());
                        app.overlay = Some(Overlay::Source(state));
                    }
                }
            }
            other => {
                apply_edit(&mut state.path, other);
                state.error = None;
                app.overlay = Some(Overlay::Source(state));
            }
        },
    }
    Ok(())
}

fn apply_edit(input: &mut String, action: tui::input::EditAction) {
    use tui::input::EditAction;

    match action {
        EditAction::Backspace => {
            input.pop();
        }
        EditAction::Clear => input.clear(),
        EditAction::Insert(ch) => input.push(ch),
        EditAction::None | EditAction::Cancel | EditAction::Submit | EditAction::NextField => {}
    }
}

fn update_search_results(
    store: &CareGuideStore,
    app: &mut tui::app::App,
) -> Result<(), CliError> {
    let results = store.search(&app.query)?;
    app.set_results(results);
    Ok(())
}

/// Reloads the care text on screen after `name` was edited.
fn refresh_current_care(
    store: &CareGuideStore,
    app: &mut tui::app::App,
    name: &str,
) -> Result<(), CliError> {
    if let Some(current) = app.current.as_mut() {
        if current.label.to_lowercase() == name.to_lowercase() {
            current.care = store.lookup(&current.label)?;
        }
    }
    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<PathBuf>) -> Result<(), CliError> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|err| CliError::CreateDir(parent.to_path_buf(), err))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(CliError::LogFile)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Vision settings with `~` expanded in file paths.
fn resolved_vision(config: &Config) -> Result<VisionSection, CliError> {
    let mut vision = config.vision.clone();
    if !vision.labels_path.trim().is_empty() {
        vision.labels_path = expand_tilde(vision.labels_path.trim())?
            .to_string_lossy()
            .into_owned();
    }
    Ok(vision)
}

fn load_config_or_default() -> Result<Config, CliError> {
    let path = config_path()?;
    if path.exists() {
        Config::load_from_path(&path).map_err(CliError::Config)
    } else {
        Ok(Config::default())
    }
}

fn resolve_db_path(flag: Option<PathBuf>, config: &Config) -> Result<PathBuf, CliError> {
    if let Some(path) = flag {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os("PETAL_DB").filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = config.store.path.as_deref().filter(|p| !p.trim().is_empty()) {
        return expand_tilde(path.trim());
    }
    default_db_path()
}

fn expand_tilde(path: &str) -> Result<PathBuf, CliError> {
    if let Some(rest) = path.strip_prefix("~/") {
        return Ok(home_dir()?.join(rest));
    }
    if path == "~" {
        return home_dir();
    }
    Ok(PathBuf::from(path))
}

fn config_dir() -> Result<PathBuf, CliError> {
    home_dir().map(|home| home.join(".config").join("petal"))
}

fn config_path() -> Result<PathBuf, CliError> {
    Ok(config_dir()?.join("config.toml"))
}

fn default_db_path() -> Result<PathBuf, CliError> {
    Ok(config_dir()?.join("flowers.db"))
}

fn log_path() -> Result<PathBuf, CliError> {
    Ok(config_dir()?.join("petal.log"))
}

fn home_dir() -> Result<PathBuf, CliError> {
    std::env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| CliError::MissingHome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use tui::app::{EditorField, FlowerEditorState, Overlay};

    #[test]
    fn db_flag_wins_over_config() {
        let mut config = Config::default();
        config.store.path = Some("/var/lib/petal/flowers.db".to_string());
        let path = resolve_db_path(Some(PathBuf::from("/tmp/flag.db")), &config)
            .expect("resolve failed");
        assert_eq!(path, PathBuf::from("/tmp/flag.db"));
    }

    #[test]
    fn apply_edit_appends_and_deletes() {
        use tui::input::EditAction;

        let mut input = String::from("Ros");
        apply_edit(&mut input, EditAction::Insert('e'));
        assert_eq!(input, "Rose");
        apply_edit(&mut input, EditAction::Backspace);
        assert_eq!(input, "Ros");
        apply_edit(&mut input, EditAction::Clear);
        assert!(input.is_empty());
    }

    #[test]
    fn editing_current_flower_refreshes_its_care() {
        let store = CareGuideStore::open_in_memory().expect("open failed");
        store.upsert("Rose", "Full sun.").expect("upsert failed");
        let mut app = tui::app::App::new(true);
        app.select_manual(Recognition::manual(&store, "rose").expect("lookup failed"));

        store.upsert("Rose", "Part shade.").expect("upsert failed");
        refresh_current_care(&store, &mut app, "Rose").expect("refresh failed");
        assert_eq!(
            app.current.and_then(|current| current.care).as_deref(),
            Some("Part shade.")
        );
    }

    fn context(store: &CareGuideStore) -> TuiContext<'_> {
        TuiContext {
            store,
            classifier: None,
            source: None,
            speech: None,
            gate: FrameGate::new(Duration::ZERO),
            blur_threshold: 100.0,
            wiki_base_url: petal_core::wiki::DEFAULT_BASE_URL.to_string(),
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_into_overlay(app: &mut tui::app::App, ctx: &mut TuiContext<'_>, text: &str) {
        for ch in text.chars() {
            handle_overlay_key(press(KeyCode::Char(ch)), app, ctx).expect("key failed");
        }
    }

    fn editor(app: &tui::app::App) -> &FlowerEditorState {
        match &app.overlay {
            Some(Overlay::AddFlower(state)) => state,
            other => panic!("expected flower editor, got {other:?}"),
        }
    }

    #[test]
    fn add_flower_overlay_moves_to_care_then_saves() {
        let store = CareGuideStore::open_in_memory().expect("open failed");
        let mut ctx = context(&store);
        let mut app = tui::app::App::new(true);

        handle_main_key(ctrl('n'), &mut app, &mut ctx).expect("open editor failed");
        type_into_overlay(&mut app, &mut ctx, "Tulip");
        handle_overlay_key(press(KeyCode::Enter), &mut app, &mut ctx).expect("enter failed");
        assert_eq!(editor(&app).active, EditorField::Care);
        assert_eq!(store.count().expect("count failed"), 0);

        type_into_overlay(&mut app, &mut ctx, "Plant bulbs in fall.");
        handle_overlay_key(press(KeyCode::Enter), &mut app, &mut ctx).expect("save failed");
        assert!(app.overlay.is_none());
        assert_eq!(
            store.lookup("tulip").expect("lookup failed").as_deref(),
            Some("Plant bulbs in fall.")
        );
        assert_eq!(app.flower_count, 1);
        assert_eq!(
            app.toast.as_ref().map(|toast| toast.message.as_str()),
            Some("Tulip added to care guide.")
        );
    }

    #[test]
    fn invalid_flower_keeps_editor_open_with_message() {
        let store = CareGuideStore::open_in_memory().expect("open failed");
        let mut ctx = context(&store);
        let mut app = tui::app::App::new(true);
        app.overlay = Some(Overlay::AddFlower(FlowerEditorState {
            name: "   ".to_string(),
            care: "Water weekly.".to_string(),
            active: EditorField::Care,
            error: None,
        }));

        handle_overlay_key(press(KeyCode::Enter), &mut app, &mut ctx).expect("submit failed");
        assert_eq!(
            editor(&app).error.as_deref(),
            Some("flower name must not be empty")
        );
        assert_eq!(store.count().expect("count failed"), 0);

        handle_overlay_key(press(KeyCode::Esc), &mut app, &mut ctx).expect("cancel failed");
        assert!(app.overlay.is_none());
    }

    #[test]
    fn editing_current_flower_from_tui_refreshes_care() {
        let store = CareGuideStore::open_in_memory().expect("open failed");
        store.upsert("Rose", "Full sun.").expect("upsert failed");
        let mut ctx = context(&store);
        let mut app = tui::app::App::new(true);
        app.select_manual(Recognition::manual(&store, "Rose").expect("lookup failed"));

        handle_main_key(ctrl('e'), &mut app, &mut ctx).expect("open editor failed");
        assert_eq!(editor(&app).care, "Full sun.");
        handle_overlay_key(ctrl('u'), &mut app, &mut ctx).expect("clear failed");
        type_into_overlay(&mut app, &mut ctx, "Part shade.");
        handle_overlay_key(press(KeyCode::Enter), &mut app, &mut ctx).expect("save failed");

        assert!(app.overlay.is_none());
        assert_eq!(
            app.current.as_ref().and_then(|current| current.care.as_deref()),
            Some("Part shade.")
        );
    }

    #[test]
    fn bad_source_path_keeps_prompt_open() {
        let store = CareGuideStore::open_in_memory().expect("open failed");
        let mut ctx = context(&store);
        let mut app = tui::app::App::new(true);

        handle_main_key(ctrl('o'), &mut app, &mut ctx).expect("open prompt failed");
        type_into_overlay(&mut app, &mut ctx, "/nonexistent/petal/frames");
        handle_overlay_key(press(KeyCode::Enter), &mut app, &mut ctx).expect("submit failed");
        match &app.overlay {
            Some(Overlay::Source(state)) => assert!(state.error.is_some()),
            other => panic!("expected source prompt, got {other:?}"),
        }
        assert!(ctx.source.is_none());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
