//! Lesson player entry point
//!
//! The interactive loop waits on two sources:
//! 1. stdin (keyboard) - lesson commands
//! 2. timers - voice polling, delayed speech, overlay lifetimes
//!
//! SIGWINCH only sets a flag; the next loop iteration repaints at the new size.

use kidsenglish::input::{create_default_keymap, handle_keys, DefaultKeyHandler};
use kidsenglish::platform::is_wsl;
use kidsenglish::scheduler::{Scheduler, Task};
use kidsenglish::speech::pronouncer::WaitOutcome;
use kidsenglish::speech::{create_synth, PolicyKind, Pronouncer, PronunciationProfile, VoicePolicy};
use kidsenglish::state::config::Config;
use kidsenglish::state::State;
use kidsenglish::terminal::{get_terminal_size, is_tty, Painter, TermiosGuard};
use kidsenglish::{LessonError, Result};
use log::{debug, error, info};
use mio::{Events, Interest, Poll, Token};
use nix::libc;
use nix::sys::signal::{self, SigHandler, Signal};
use std::io::{self, Read};
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Token for stdin in mio poll
const STDIN: Token = Token(0);

/// Longest the loop sleeps without checking for work
const MAX_WAIT: Duration = Duration::from_millis(100);

/// How long one-shot modes wait for voices or speech to finish
const ONE_SHOT_TIMEOUT: Duration = Duration::from_secs(10);

/// Global flag set by SIGWINCH handler
static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_sigwinch(_: libc::c_int) {
    RESIZE_PENDING.store(true, Ordering::Relaxed);
}

/// What the command line asked for
enum Mode {
    Interactive,
    ListVoices,
    Say(String),
}

struct Options {
    debug: bool,
    profile: Option<PolicyKind>,
    lesson: Option<PathBuf>,
    mode: Mode,
}

fn usage() -> ! {
    eprintln!(
        "Usage: {} [--debug|-d] [--profile general|kid] [--lesson FILE] [--list-voices] [--say TEXT]",
        kidsenglish::APP_NAME
    );
    process::exit(2);
}

fn parse_args() -> Options {
    let mut options = Options {
        debug: false,
        profile: None,
        lesson: None,
        mode: Mode::Interactive,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--debug" | "-d" => options.debug = true,
            "--profile" => match args.next().map(|p| p.parse::<PolicyKind>()) {
                Some(Ok(kind)) => options.profile = Some(kind),
                Some(Err(e)) => {
                    eprintln!("Error: {}", e);
                    usage();
                }
                None => usage(),
            },
            "--lesson" => match args.next() {
                Some(path) => options.lesson = Some(PathBuf::from(path)),
                None => usage(),
            },
            "--list-voices" => options.mode = Mode::ListVoices,
            "--say" => match args.next() {
                Some(text) => options.mode = Mode::Say(text),
                None => usage(),
            },
            "--help" | "-h" => usage(),
            other => {
                eprintln!("Error: unknown argument '{}'", other);
                usage();
            }
        }
    }

    options
}

fn init_logging(debug_mode: bool) {
    if debug_mode {
        // The terminal is in raw mode, so debug logs go to a file
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("kidsenglish.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open kidsenglish.log for debug logging: {}", e);
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }

        info!(
            "{} version {} starting (debug mode, logging to kidsenglish.log)",
            kidsenglish::APP_NAME,
            kidsenglish::VERSION
        );
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Error)
            .parse_default_env()
            .init();
    }
}

fn main() {
    let options = parse_args();
    init_logging(options.debug);

    if let Err(e) = run(options) {
        error!("Fatal error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(options: Options) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(kind) = options.profile {
        config.set("speech", "profile", &kind.to_string());
    }
    if let Some(path) = &options.lesson {
        config.set("lesson", "file", &path.to_string_lossy());
    }

    match options.mode {
        Mode::ListVoices => list_voices(&config),
        Mode::Say(text) => say_once(&config, &text),
        Mode::Interactive => interactive(config),
    }
}

/// Build a pronouncer and wait until its catalog is populated (or time runs out)
fn loaded_pronouncer(config: &Config, scheduler: &mut Scheduler) -> Pronouncer {
    let profile = PronunciationProfile::for_kind(config.profile());
    let mut pronouncer = Pronouncer::new(create_synth(config.backend()), profile)
        .with_timing(config.voice_poll_interval(), config.dispatch_delay());

    let start = Instant::now();
    pronouncer.refresh_catalog(start, scheduler);
    while pronouncer.has_speech()
        && pronouncer.catalog().is_empty()
        && start.elapsed() < ONE_SHOT_TIMEOUT
    {
        std::thread::sleep(config.voice_poll_interval());
        for task in scheduler.take_due(Instant::now()) {
            if task == Task::RefreshCatalog {
                pronouncer.refresh_catalog(Instant::now(), scheduler);
            }
        }
    }
    pronouncer
}

fn list_voices(config: &Config) -> Result<()> {
    let mut scheduler = Scheduler::new();
    let pronouncer = loaded_pronouncer(config, &mut scheduler);

    match pronouncer.backend_name() {
        Some(name) => println!("Speech backend: {}", name),
        None => {
            println!("No speech backend available; pronunciation is visual only.");
            return Ok(());
        }
    }

    let voices = pronouncer.catalog().voices();
    println!("{} voices:", voices.len());
    for voice in voices {
        println!("  {:<40} {}", voice.name, voice.language);
    }

    for kind in [PolicyKind::General, PolicyKind::Kid] {
        let policy = VoicePolicy::for_kind(kind);
        let choice = policy
            .select_with_tier(voices)
            .map(|(v, tier)| format!("{} [priority {}/{}]", v, tier + 1, policy.tiers().len()))
            .unwrap_or_else(|| "(platform default)".to_string());
        println!("{} profile uses: {}", kind, choice);
    }
    Ok(())
}

fn say_once(config: &Config, text: &str) -> Result<()> {
    let mut scheduler = Scheduler::new();
    let mut pronouncer = loaded_pronouncer(config, &mut scheduler);

    let ack = pronouncer.pronounce(text, Instant::now(), &mut scheduler);
    println!("{}", ack.headline());
    println!("{}", kidsenglish::speech::pronouncer::POPUP_CAPTION);
    if let Some(alert) = ack.alert {
        println!("{}", alert);
        return Ok(());
    }

    match pronouncer.wait_until_spoken(&mut scheduler, ONE_SHOT_TIMEOUT) {
        WaitOutcome::Finished => debug!("Speech finished"),
        WaitOutcome::NotSpoken => debug!("Nothing was spoken"),
        WaitOutcome::Unreported => debug!("Backend doesn't report when speech ends"),
        WaitOutcome::TimedOut => debug!("No end of speech after {:?}", ONE_SHOT_TIMEOUT),
    }
    Ok(())
}

fn interactive(config: Config) -> Result<()> {
    let stdin_fd = io::stdin().as_raw_fd();
    if !is_tty(stdin_fd) {
        eprintln!("Error: interactive mode requires a terminal (stdin is not a TTY)");
        eprintln!("Try: {} --say \"hello\"", kidsenglish::APP_NAME);
        process::exit(1);
    }

    let mut state = State::new(config)?;
    info!("Configuration loaded from {:?}", state.config.path());
    state.start(Instant::now());

    let keymap = create_default_keymap();
    info!("Key handler initialized with {} bindings", keymap.len());
    let mut default_handler = DefaultKeyHandler::new(keymap);

    unsafe {
        signal::signal(Signal::SIGWINCH, SigHandler::Handler(handle_sigwinch))
            .map_err(|e| LessonError::Terminal(format!("Failed to set SIGWINCH handler: {}", e)))?;
    }

    let _guard = TermiosGuard::raw(stdin_fd)?;
    let mut painter = Painter::new(io::stdout())?;
    let (mut cols, _) = get_terminal_size(stdin_fd)?;

    // WSL doesn't support epoll on TTY file descriptors, so use select() instead
    let use_select = is_wsl();
    let mut mio_poll = if !use_select {
        debug!("Using mio::Poll for event loop");
        let poll = Poll::new()?;
        let mut stdin_source = mio::unix::SourceFd(&stdin_fd);
        poll.registry()
            .register(&mut stdin_source, STDIN, Interest::READABLE)?;
        Some((poll, Events::with_capacity(16)))
    } else {
        debug!("Using select() for event loop (WSL mode)");
        None
    };

    info!("Ready - entering event loop");

    while state.is_running() {
        let now = Instant::now();
        if let Err(e) = state.tick(now) {
            error!("Error running scheduled task: {}", e);
        }

        if RESIZE_PENDING.swap(false, Ordering::Relaxed) {
            cols = get_terminal_size(stdin_fd)?.0;
            info!("Terminal resized to {} columns", cols);
            painter.paint(&state.frame(cols))?;
            state.take_dirty();
        } else if state.take_dirty() {
            painter.paint(&state.frame(cols))?;
        }

        let timeout = state
            .time_until_next_scheduled(Instant::now())
            .map(|d| d.min(MAX_WAIT))
            .unwrap_or(MAX_WAIT);

        let readable = match mio_poll {
            Some((ref mut poll, ref mut events)) => {
                match poll.poll(events, Some(timeout)) {
                    Ok(()) => events.iter().any(|e| e.token() == STDIN),
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => false,
                    Err(e) => return Err(e.into()),
                }
            }
            None => select_stdin(stdin_fd, timeout)?,
        };

        if readable {
            let mut buf = [0u8; 64];
            let n = io::stdin().read(&mut buf)?;
            if n == 0 {
                info!("stdin closed");
                break;
            }
            handle_keys(&buf[..n], &mut state, &mut default_handler, Instant::now())?;
        }
    }

    state.silence()?;
    Ok(())
}

/// Wait for stdin with select(); returns whether it is readable
fn select_stdin(stdin_fd: std::os::unix::io::RawFd, timeout: Duration) -> Result<bool> {
    use nix::sys::select::{select, FdSet};
    use nix::sys::time::{TimeVal, TimeValLike};
    use std::os::unix::io::BorrowedFd;

    let stdin_borrowed = unsafe { BorrowedFd::borrow_raw(stdin_fd) };
    let mut read_fds = FdSet::new();
    read_fds.insert(stdin_borrowed);
    let mut tv = TimeVal::milliseconds(timeout.as_millis() as i64);

    match select(None, Some(&mut read_fds), None, None, Some(&mut tv)) {
        Ok(_) => Ok(read_fds.contains(stdin_borrowed)),
        Err(nix::errno::Errno::EINTR) => {
            debug!("select() interrupted by signal");
            Ok(false)
        }
        Err(e) => Err(LessonError::Io(io::Error::from_raw_os_error(e as i32))),
    }
}
