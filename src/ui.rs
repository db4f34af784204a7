use crate::app::{update, Action, AppMsg, Effect, ViewerApp};
use crate::model::{load_config, Panel};
use crate::services::api::ViewerApi;
use crate::services::http_client::HttpClient;
use crate::services::loader::{spawn_call, LoadMsg, SharedApi};
use crate::viewer_core::registry::WidgetId;
use crate::viewer_core::scheduler::TICK_MS;
use crate::widgets::banner::draw_banner;
use crate::widgets::chrome::{button_width, draw_button, panel_block};
use crate::widgets::status_bar::{draw_connection_status, draw_footer};
use crate::widgets::tabs::draw_panel_tabs;
use crate::widgets::Widget;
use anyhow::{anyhow, Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::io::Write;
use std::panic;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

struct Runtime {
    api: SharedApi,
    tx: Sender<LoadMsg>,
    rx: Receiver<LoadMsg>,
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

fn run_effects(app: &mut ViewerApp, rt: &Runtime, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::Request(call) => spawn_call(rt.api.clone(), call, rt.tx.clone()),
            Effect::CopyToClipboard(text) => {
                let res = arboard::Clipboard::new().and_then(|mut c| c.set_text(text.clone()));
                match res {
                    Ok(()) => app.show_success(format!("Copied {} lines to clipboard", text.lines().count())),
                    Err(e) => app.show_error(format!("Clipboard unavailable: {e}")),
                }
            }
            Effect::ExportHtml { file_name, html } => {
                let path = app.config.export_dir.join(&file_name);
                match std::fs::write(&path, html)
                    .with_context(|| format!("writing {}", path.display()))
                {
                    Ok(()) => {
                        tracing::info!(path = %path.display(), "result exported");
                        app.show_success(format!("Exported to {}", path.display()));
                    }
                    Err(e) => {
                        tracing::error!(error = %format!("{e:#}"), "export failed");
                        app.show_error(format!("Export failed: {e:#}"));
                    }
                }
            }
        }
    }
}

/// Feed finished background calls back into the controller.
fn pump_loader(app: &mut ViewerApp, rt: &Runtime) {
    let drained: Vec<LoadMsg> = rt.rx.try_iter().collect();
    for msg in drained {
        let effects = match msg {
            LoadMsg::Finished { call, outcome } => update(app, AppMsg::Loaded { call, outcome }),
            LoadMsg::Crashed { call, reason } => {
                app.dbg(format!("<- {} crashed", call.label()));
                update(app, AppMsg::Unexpected(reason))
            }
        };
        run_effects(app, rt, effects);
    }
}

pub fn run() -> Result<()> {
    let cfg = load_config()?;
    let client = HttpClient::new(
        &cfg.api_base,
        Duration::from_secs(cfg.request_timeout_secs),
    );
    let api: Arc<dyn ViewerApi + Send + Sync> = Arc::new(client);
    let (tx, rx) = mpsc::channel::<LoadMsg>();
    let rt = Runtime { api, tx, rx };
    let mut app = ViewerApp::new(cfg);

    if env_flag("DB_VIEWER_HEADLESS") {
        return run_headless(&mut app, &rt);
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    install_panic_hook(enhanced);
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let res = event_loop(&mut terminal, &mut app, &rt);

    restore_terminal(enhanced);
    let _ = panic::take_hook();
    terminal.show_cursor()?;
    res
}

fn restore_terminal(enhanced: bool) {
    let mut stdout = std::io::stdout();
    if enhanced {
        let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    }
    let _ = disable_raw_mode();
    let _ = execute!(stdout, DisableBracketedPaste, LeaveAlternateScreen, Show);
    let _ = stdout.flush();
}

/// Panics on the UI thread restore the terminal before the default report.
/// Worker panics are already turned into `LoadMsg::Crashed`, so they only go
/// to the log.
fn install_panic_hook(enhanced: bool) {
    let ui_thread = thread::current().id();
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if thread::current().id() == ui_thread {
            restore_terminal(enhanced);
            previous(info);
        } else {
            tracing::error!(panic = %info, "worker panicked");
        }
    }));
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut ViewerApp,
    rt: &Runtime,
) -> Result<()> {
    let tick_rate = Duration::from_millis(TICK_MS);
    let mut last_tick = Instant::now();
    let mut input_failures = 0u32;
    let effects = app.startup();
    run_effects(app, rt, effects);
    while !app.should_quit {
        terminal.draw(|f| draw(f, app))?;
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        match read_event(timeout) {
            Ok(Some(msg)) => {
                input_failures = 0;
                let effects = update(app, msg);
                run_effects(app, rt, effects);
            }
            Ok(None) => input_failures = 0,
            Err(e) => {
                input_failures += 1;
                if input_failures >= MAX_INPUT_FAILURES {
                    return Err(e.context("terminal input keeps failing"));
                }
                let effects = report_input_error(app, &e);
                run_effects(app, rt, effects);
            }
        }
        pump_loader(app, rt);
        if last_tick.elapsed() >= tick_rate {
            let effects = update(app, AppMsg::Tick);
            run_effects(app, rt, effects);
            last_tick = Instant::now();
        }
    }
    Ok(())
}

const MAX_INPUT_FAILURES: u32 = 5;

fn report_input_error(app: &mut ViewerApp, err: &anyhow::Error) -> Vec<Effect> {
    update(app, AppMsg::Unexpected(format!("{err:#}")))
}

fn read_event(timeout: Duration) -> Result<Option<AppMsg>> {
    if !event::poll(timeout).context("polling terminal input")? {
        return Ok(None);
    }
    let msg = match event::read().context("reading terminal input")? {
        Event::Key(key) => Some(AppMsg::Key(key)),
        Event::Paste(text) => Some(AppMsg::Paste(text)),
        _ => None,
    };
    Ok(msg)
}

/// Actions named in `DB_VIEWER_HEADLESS_ACTIONS` (comma separated).
fn headless_actions() -> Result<Vec<Action>> {
    let Ok(raw) = std::env::var("DB_VIEWER_HEADLESS_ACTIONS") else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| {
            Action::from_name(name)
                .ok_or_else(|| anyhow!("unknown action in DB_VIEWER_HEADLESS_ACTIONS: {name}"))
        })
        .collect()
}

fn run_headless(app: &mut ViewerApp, rt: &Runtime) -> Result<()> {
    let ticks: u64 = std::env::var("DB_VIEWER_TICKS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(10);
    let actions = headless_actions()?;
    let backend = ratatui::backend::TestBackend::new(100, 32);
    let mut terminal = Terminal::new(backend)?;
    let effects = app.startup();
    run_effects(app, rt, effects);
    for action in actions {
        let effects = update(app, AppMsg::Action(action));
        run_effects(app, rt, effects);
    }
    let mut errors_seen = 0usize;
    for _ in 0..ticks {
        terminal.draw(|f| draw(f, app))?;
        pump_loader(app, rt);
        if app
            .elements
            .error_banner
            .as_ref()
            .is_some_and(|b| b.is_visible())
        {
            errors_seen += 1;
        }
        let effects = update(app, AppMsg::Tick);
        run_effects(app, rt, effects);
        thread::sleep(Duration::from_millis(TICK_MS));
    }
    if env_flag("DB_VIEWER_SMOKE_SUMMARY") {
        println!("{}", smoke_summary(app, errors_seen));
    }
    Ok(())
}

fn smoke_summary(app: &ViewerApp, errors_seen: usize) -> serde_json::Value {
    let pending: Vec<&str> = [Panel::Vector, Panel::Embedded]
        .into_iter()
        .filter(|p| app.followup_pending(*p))
        .map(Panel::slug)
        .collect();
    serde_json::json!({
        "ok": errors_seen == 0,
        "panel": app.state.active_panel.slug(),
        "vector_connected": app.state.vector_connected,
        "embedded_loaded": app.state.embedded_loaded,
        "loading": app.is_loading(),
        "pending_followups": pending,
        "ticks": app.tick,
    })
}

fn draw(f: &mut Frame, app: &mut ViewerApp) {
    let screen = f.area();
    f.render_widget(Block::default().style(app.theme.base_style()), screen);

    let banner_visible = |b: Option<&crate::widgets::banner::Banner>| {
        b.is_some_and(|b| b.is_visible())
    };
    let error_h = u16::from(banner_visible(app.elements.error_banner.as_ref()));
    let success_h = u16::from(banner_visible(app.elements.success_banner.as_ref()));
    const DEBUG_H: u16 = 4;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(error_h),
            Constraint::Length(success_h),
            Constraint::Min(0),
            Constraint::Length(DEBUG_H),
            Constraint::Length(1),
        ])
        .split(screen);

    draw_panel_tabs(f, chunks[0], app.state.active_panel, &app.theme);
    if let Some(b) = &app.elements.error_banner {
        draw_banner(f, chunks[1], b, &app.theme);
    }
    if let Some(b) = &app.elements.success_banner {
        draw_banner(f, chunks[2], b, &app.theme);
    }
    match app.state.active_panel {
        Panel::Vector => draw_vector_panel(f, chunks[3], app),
        Panel::Embedded => draw_embedded_panel(f, chunks[3], app),
    }
    draw_debug(f, chunks[4], app);
    let focus = app.focused();
    draw_footer(
        f,
        chunks[5],
        app.elements.loading.as_ref(),
        focus.map(WidgetId::label),
        help_text(focus),
        app.tick,
        &app.theme,
    );
}

fn help_text(focus: Option<WidgetId>) -> &'static str {
    match focus {
        Some(WidgetId::SqlInput) => "Ctrl+Enter run  Tab next  F1/F2 panels  Esc dismiss",
        Some(id) if id.is_text_input() => "Enter submit  Tab next  F1/F2 panels  Esc dismiss",
        Some(WidgetId::CollectionSelect | WidgetId::TableSelect) => {
            "↑/↓ choose  Enter view data  Tab next  q quit"
        }
        Some(WidgetId::VectorResults | WidgetId::EmbeddedResults) => {
            "↑/↓ PgUp/PgDn rows  ←/→ columns  Enter row detail  Ctrl+S export  Ctrl+Y copy"
        }
        _ => "Enter activate  Tab next  F1/F2 panels  Ctrl+S export  q quit",
    }
}

fn draw_buttons(f: &mut Frame, area: Rect, ids: &[WidgetId], app: &ViewerApp) {
    let mut x = area.x;
    for id in ids.iter().copied().filter(|id| app.elements.has(*id)) {
        let w = button_width(id.label()).min(area.right().saturating_sub(x));
        if w == 0 {
            break;
        }
        let rect = Rect::new(x, area.y, w, 1);
        draw_button(f, rect, id.label(), app.focused() == Some(id), &app.theme);
        x = x.saturating_add(w + 1);
    }
}

fn draw_vector_panel(f: &mut Frame, area: Rect, app: &mut ViewerApp) {
    let block = panel_block(Panel::Vector.title(), true, &app.theme);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(7),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .split(inner);

    if let Some(s) = &app.elements.vector_status {
        draw_connection_status(f, rows[0], s, &app.theme);
    }
    let conn = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(rows[1]);
    let focus = app.focused();
    let theme = app.theme.clone();
    if let Some(w) = &mut app.elements.vector_host {
        w.render(f, conn[0], focus == Some(WidgetId::VectorHost), &theme);
    }
    if let Some(w) = &mut app.elements.vector_port {
        w.render(f, conn[1], focus == Some(WidgetId::VectorPort), &theme);
    }
    draw_buttons(
        f,
        rows[2],
        &[WidgetId::ConnectButton, WidgetId::LoadCollectionsButton],
        app,
    );
    if let Some(w) = &mut app.elements.collection_select {
        w.render(f, rows[3], focus == Some(WidgetId::CollectionSelect), &theme);
    }
    draw_buttons(
        f,
        rows[4],
        &[WidgetId::CollectionInfoButton, WidgetId::CollectionDataButton],
        app,
    );
    if let Some(w) = &mut app.elements.vector_results {
        w.render(f, rows[5], focus == Some(WidgetId::VectorResults), &theme);
    }
}

fn draw_upload_area(f: &mut Frame, area: Rect, app: &ViewerApp) {
    if !app.elements.has(WidgetId::UploadArea) {
        return;
    }
    let focused = app.focused() == Some(WidgetId::UploadArea);
    let block = panel_block("Upload", focused, &app.theme);
    let style = if focused {
        app.theme.text_active_bold()
    } else {
        app.theme.text_muted()
    };
    let p = Paragraph::new(Span::styled(WidgetId::UploadArea.label(), style))
        .block(block)
        .alignment(Alignment::Center);
    f.render_widget(p, area);
}

fn draw_embedded_panel(f: &mut Frame, area: Rect, app: &mut ViewerApp) {
    let block = panel_block(Panel::Embedded.title(), true, &app.theme);
    let inner = block.inner(area);
    f.render_widget(block, area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(6),
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .split(inner);

    if let Some(s) = &app.elements.embedded_status {
        draw_connection_status(f, rows[0], s, &app.theme);
    }
    let upload = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);
    draw_upload_area(f, upload[0], app);
    let focus = app.focused();
    let theme = app.theme.clone();
    if let Some(w) = &mut app.elements.file_input {
        w.render(f, upload[1], focus == Some(WidgetId::FileInput), &theme);
    }
    draw_buttons(
        f,
        rows[2],
        &[WidgetId::UploadButton, WidgetId::LoadTablesButton],
        app,
    );
    if let Some(w) = &mut app.elements.table_select {
        w.render(f, rows[3], focus == Some(WidgetId::TableSelect), &theme);
    }
    draw_buttons(
        f,
        rows[4],
        &[WidgetId::TableInfoButton, WidgetId::TableDataButton],
        app,
    );
    if let Some(w) = &mut app.elements.sql_input {
        w.render(f, rows[5], focus == Some(WidgetId::SqlInput), &theme);
    }
    draw_buttons(
        f,
        rows[6],
        &[WidgetId::ExecuteButton, WidgetId::ClearButton],
        app,
    );
    if let Some(w) = &mut app.elements.embedded_results {
        w.render(f, rows[7], focus == Some(WidgetId::EmbeddedResults), &theme);
    }
}

fn draw_debug(f: &mut Frame, area: Rect, app: &ViewerApp) {
    let b = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            "Debug",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ));
    let h = area.height.saturating_sub(1) as usize;
    let lines: Vec<Line> = {
        let all: Vec<&String> = app.debug_lines().collect();
        let start = all.len().saturating_sub(h);
        all[start..].iter().map(|s| Line::raw(s.as_str())).collect()
    };
    let p = Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .block(b)
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}
