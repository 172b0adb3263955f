use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::Editor;
use rustyline::{Context, Helper};
use tracing_subscriber::EnvFilter;

use leadline_api::{AuthApiClient, LeadApiClient, SessionApiClient};
use leadline_application::{
    AccountService, AccountStatus, ChatError, ChatService, HistoryService, SessionSynchronizer,
    ThemeProvider,
};
use leadline_core::auth::AuthGateway;
use leadline_core::conversation::lead::SERVICES;
use leadline_core::conversation::message::Sender;
use leadline_core::conversation::schedule::{generate_time_slots, is_time_slot_disabled};
use leadline_core::conversation::stage::Stage;
use leadline_core::event::{SessionSignal, SignalBus};
use leadline_core::session::gateway::{LeadGateway, SessionGateway};
use leadline_core::state::LocalStateRepository;
use leadline_core::theme::ThemeMode;
use leadline_infrastructure::{config_store, LeadlinePaths, LocalStateStore, TokenStore};

/// CLI helper for rustyline that provides completion, highlighting, and hints
/// for the slash commands.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: vec![
                "/history".to_string(),
                "/rename".to_string(),
                "/delete".to_string(),
                "/login".to_string(),
                "/whoami".to_string(),
                "/link".to_string(),
                "/theme".to_string(),
                "/new".to_string(),
                "/open".to_string(),
            ],
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

fn bot_color(text: &str, mode: ThemeMode) -> colored::ColoredString {
    match mode {
        ThemeMode::Dark => text.bright_blue(),
        ThemeMode::Light => text.blue(),
    }
}

/// Prints transcript entries added since the last call.
fn print_new_messages(chat: &ChatService, printed: &mut usize, mode: ThemeMode) {
    for message in chat.transcript().iter().skip(*printed) {
        match message.sender {
            Sender::Bot => {
                for line in message.text.lines() {
                    println!("{}", bot_color(line, mode));
                }
            }
            Sender::User => println!("{}", format!("> {}", message.text).green()),
        }
    }
    *printed = chat.transcript().len();
}

fn print_service_menu() {
    println!("{}", "Available services:".bright_black());
    for (i, label) in SERVICES.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, label);
    }
    println!(
        "{}",
        "Pick a service by number or name.".bright_black()
    );
}

fn print_slot_grid(date: NaiveDate, now: chrono::NaiveDateTime) {
    println!("{}", "Time slots (unavailable marked with x):".bright_black());
    for chunk in generate_time_slots().chunks(4) {
        let row: Vec<String> = chunk
            .iter()
            .map(|slot| {
                if is_time_slot_disabled(&slot.value, date, now) {
                    format!("[x] {:<9}", slot.label)
                } else {
                    format!("    {:<9}", slot.label)
                }
            })
            .collect();
        println!("  {}", row.join(" "));
    }
}

enum DialogOutcome {
    Done,
    Quit,
}

/// Inline date/slot/timezone dialog for the best-time stage.
///
/// Loops until the engine accepts the selection; `quit` or Ctrl-D abandons
/// the dialog (and the program).
async fn best_time_dialog(
    rl: &mut Editor<CliHelper, rustyline::history::DefaultHistory>,
    chat: &mut ChatService,
    printed: &mut usize,
    mode: ThemeMode,
) -> Result<DialogOutcome> {
    loop {
        let date_input = match rl.readline("date (YYYY-MM-DD)> ") {
            Ok(line) => line.trim().to_string(),
            Err(_) => return Ok(DialogOutcome::Quit),
        };
        if date_input == "quit" {
            return Ok(DialogOutcome::Quit);
        }
        let date = NaiveDate::parse_from_str(&date_input, "%Y-%m-%d").ok();
        if date.is_none() {
            println!("{}", "Please enter a date as YYYY-MM-DD.".yellow());
            continue;
        }

        let now = Local::now().naive_local();
        if let Some(date) = date {
            print_slot_grid(date, now);
        }

        let slot_input = match rl.readline("time (HH:MM)> ") {
            Ok(line) => line.trim().to_string(),
            Err(_) => return Ok(DialogOutcome::Quit),
        };
        if slot_input == "quit" {
            return Ok(DialogOutcome::Quit);
        }
        let slot = if slot_input.is_empty() {
            None
        } else {
            Some(slot_input.as_str())
        };

        let tz_input = match rl.readline("timezone [UTC]> ") {
            Ok(line) => line.trim().to_string(),
            Err(_) => return Ok(DialogOutcome::Quit),
        };
        let timezone = if tz_input.is_empty() {
            "UTC".to_string()
        } else {
            tz_input
        };

        match chat.handle_best_time(date, slot, &timezone, now).await {
            Ok(()) => {
                print_new_messages(chat, printed, mode);
                return Ok(DialogOutcome::Done);
            }
            Err(e) => {
                println!("{}", e.to_string().yellow());
                print_new_messages(chat, printed, mode);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    // ===== Stores and clients =====
    let paths = LeadlinePaths::new()?;
    let config = config_store::load_or_init(&paths)?;
    let local_store = LocalStateStore::open(&paths)?;
    let local: Arc<dyn LocalStateRepository> = Arc::new(local_store);
    let tokens = Arc::new(TokenStore::open(&paths));

    let sessions: Arc<dyn SessionGateway> = Arc::new(SessionApiClient::new(&config.api));
    let leads: Arc<dyn LeadGateway> = Arc::new(LeadApiClient::new(&config.api));
    let auth: Arc<dyn AuthGateway> = Arc::new(AuthApiClient::new(&config.api));

    let bus = SignalBus::default();
    let synchronizer = SessionSynchronizer::new(
        sessions.clone(),
        leads,
        local.clone(),
        bus.clone(),
        config.sync,
        config.api.contact_email.clone(),
    );
    let history = HistoryService::new(sessions, local.clone(), bus.clone());
    let account = AccountService::new(auth, tokens, config.api.login_url.clone());
    let mut theme = ThemeProvider::load(
        local.clone(),
        std::env::var("COLORFGBG").ok().as_deref(),
    )
    .await;

    // Transient notices (stale session replaced, sync lag) are printed out
    // of band. Structural signals (created/updated/deleted) fire on every
    // field advance, so they are only logged; /history re-fetches on demand.
    let mut signals = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match signals.recv().await {
                Ok(SessionSignal::Notice { message }) => {
                    println!("{}", message.bright_black());
                }
                Ok(SessionSignal::SyncLagged { session_id }) => {
                    println!(
                        "{}",
                        format!("(some changes to {} not saved yet)", session_id).bright_black()
                    );
                }
                Ok(signal) => {
                    tracing::debug!("[Signals] {:?}", signal);
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // ===== Identity =====
    let mut user_id = match account.current_user().await {
        Ok(AccountStatus::SignedIn(user)) => {
            println!(
                "{}",
                format!("Signed in as {}", user.email.as_deref().unwrap_or(&user.sub))
                    .bright_black()
            );
            Some(user.sub)
        }
        Ok(AccountStatus::SignedOut { .. }) => None,
        Err(e) => {
            tracing::warn!("[Cli] Identity check failed: {}", e);
            None
        }
    };

    // ===== Conversation bootstrap =====
    let mut chat = ChatService::new(synchronizer.clone());
    let resume = local.active_session().await;
    let started = match &resume {
        Some(active) => chat.open(active, user_id.as_deref()).await,
        None => chat.start(user_id.as_deref()).await,
    };

    println!("{}", "=== leadline ===".bright_magenta().bold());
    println!(
        "{}",
        "Slash commands: /history /rename /delete /login /whoami /link /theme /new /open. \
         Type 'quit' to exit."
            .bright_black()
    );
    println!();

    let mut printed = 0usize;
    print_new_messages(&chat, &mut printed, theme.mode());
    if let Err(ChatError::SessionUnavailable) = started {
        println!("{}", "Input is disabled for this conversation.".red());
    }

    // ===== REPL =====
    let helper = CliHelper::new();
    let mut rl: Editor<CliHelper, rustyline::history::DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(helper));

    loop {
        if chat.stage() == Stage::ChooseService && !chat.is_input_disabled() {
            print_service_menu();
        }
        if chat.stage() == Stage::AskBestTime && !chat.is_input_disabled() {
            match best_time_dialog(&mut rl, &mut chat, &mut printed, theme.mode()).await? {
                DialogOutcome::Done => continue,
                DialogOutcome::Quit => break,
            }
        }

        let readline = rl.readline(">> ");
        let line = match readline {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                continue;
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "quit" || trimmed == "exit" {
            break;
        }
        let _ = rl.add_history_entry(&line);

        if let Some(command) = trimmed.strip_prefix('/') {
            let mut parts = command.splitn(2, ' ');
            let name = parts.next().unwrap_or_default();
            let rest = parts.next().unwrap_or_default().trim();

            match name {
                "history" => match history.list_sessions(user_id.as_deref()).await {
                    Ok(list) if list.is_empty() => {
                        println!("{}", "No stored conversations.".bright_black())
                    }
                    Ok(list) => {
                        for summary in list {
                            let when = summary.updated_at.as_deref().unwrap_or("-");
                            println!("  {}  {}  {}", summary.id, when.bright_black(), summary.title);
                        }
                    }
                    Err(e) => println!("{}", format!("Could not load history: {}", e).red()),
                },
                "rename" => {
                    let mut args = rest.splitn(2, ' ');
                    match (args.next(), args.next()) {
                        (Some(id), Some(new_name)) if !id.is_empty() => {
                            match history.rename(id, new_name).await {
                                Ok(()) => println!("{}", "Renamed.".green()),
                                Err(e) => println!("{}", e.to_string().red()),
                            }
                        }
                        _ => println!("{}", "Usage: /rename <session-id> <new name>".yellow()),
                    }
                }
                "delete" => {
                    if rest.is_empty() {
                        println!("{}", "Usage: /delete <session-id>".yellow());
                    } else {
                        match history.delete(rest).await {
                            Ok(()) => println!("{}", "Deleted.".green()),
                            Err(e) => println!(
                                "{}",
                                format!("Removed locally; server delete failed: {}", e).yellow()
                            ),
                        }
                    }
                }
                "login" => match account.current_user().await {
                    Ok(AccountStatus::SignedIn(user)) => println!(
                        "{}",
                        format!(
                            "Already signed in as {}",
                            user.email.as_deref().unwrap_or(&user.sub)
                        )
                        .green()
                    ),
                    Ok(AccountStatus::SignedOut { login_url }) => {
                        println!("Sign in here: {}", login_url.bright_cyan());
                    }
                    Err(e) => println!("{}", format!("Could not reach sign-in: {}", e).red()),
                },
                "whoami" => match account.current_user().await {
                    Ok(AccountStatus::SignedIn(user)) => {
                        println!("  sub:   {}", user.sub);
                        if let Some(email) = &user.email {
                            println!("  email: {}", email);
                        }
                        if let Some(name) = &user.name {
                            println!("  name:  {}", name);
                        }
                        user_id = Some(user.sub);
                    }
                    Ok(AccountStatus::SignedOut { .. }) => {
                        println!("{}", "Not signed in. Use /login.".yellow());
                        user_id = None;
                    }
                    Err(e) => println!("{}", format!("Identity check failed: {}", e).red()),
                },
                "link" => match &user_id {
                    Some(uid) => {
                        let report = synchronizer.link_anonymous_sessions(uid).await;
                        println!(
                            "{}",
                            format!(
                                "Linked {} conversation(s) ({} expired, {} kept for retry).",
                                report.linked, report.expired, report.failed
                            )
                            .green()
                        );
                    }
                    None => println!("{}", "Sign in first (/login), then /link.".yellow()),
                },
                "theme" => match theme.toggle().await {
                    Ok(mode) => println!("{}", format!("Theme: {}", mode).green()),
                    Err(e) => println!("{}", format!("Could not save theme: {}", e).red()),
                },
                "new" => {
                    match chat.start(user_id.as_deref()).await {
                        Ok(()) => printed = 0,
                        Err(e) => println!("{}", e.to_string().red()),
                    }
                    print_new_messages(&chat, &mut printed, theme.mode());
                }
                "open" => {
                    if rest.is_empty() {
                        println!("{}", "Usage: /open <session-id>".yellow());
                    } else {
                        match chat.open(rest, user_id.as_deref()).await {
                            Ok(()) => {
                                printed = 0;
                                print_new_messages(&chat, &mut printed, theme.mode());
                            }
                            Err(e) => println!("{}", e.to_string().red()),
                        }
                    }
                }
                _ => println!("{}", format!("Unknown command: /{}", name).bright_black()),
            }
            continue;
        }

        // Conversation input
        let result = if chat.stage() == Stage::ChooseService {
            let label = trimmed
                .parse::<usize>()
                .ok()
                .and_then(|n| SERVICES.get(n.wrapping_sub(1)).copied())
                .unwrap_or(trimmed);
            chat.handle_service(label).await
        } else {
            chat.handle_text(trimmed).await
        };

        // The echo (if any) is already in the transcript; errors re-prompt
        print_new_messages(&chat, &mut printed, theme.mode());
        if let Err(e) = result {
            println!("{}", e.to_string().yellow());
        }
    }

    // Let in-flight session updates land before exiting
    chat.flush().await;
    println!("{}", "Goodbye!".bright_green());
    Ok(())
}
