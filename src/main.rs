mod api;
mod app;
mod config;
mod event;
mod form;
mod history;
mod lesson;
mod logging;
mod store;
mod topic;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use app::{App, AppScreen, FormField, StatusKind};
use config::Config;
use event::{AppEvent, EventHandler};
use ui::components::form_panel::FormPanel;
use ui::components::history_list::HistoryList;
use ui::components::lesson_view::LessonPane;
use ui::components::topic_field::TopicField;
use ui::layout::{AppLayout, pack_hint_lines};

#[derive(Parser)]
#[command(
    name = "quillsheet",
    version,
    about = "Terminal worksheet generator for grammar lessons"
)]
struct Cli {
    #[arg(short, long, help = "Grade to start with")]
    grade: Option<i32>,

    #[arg(short, long, help = "Lesson service base URL")]
    api: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Questions per section (1-20)")]
    questions: Option<u32>,

    #[arg(long, help = "Run without contacting the lesson service")]
    offline: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: ignoring unreadable config: {e}");
        Config::default()
    });
    if let Some(grade) = cli.grade {
        config.default_grade = grade;
    }
    if let Some(api) = cli.api {
        config.api_base_url = api;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(questions) = cli.questions {
        config.questions_per_section = questions;
    }
    config.validate();

    match logging::init(&config.log_level) {
        Ok(path) => log::info!("quillsheet starting, logging to {}", path.display()),
        Err(e) => eprintln!("Warning: logging disabled: {e}"),
    }

    let service = api::connect(&config.api_base_url, config.request_timeout(), cli.offline);
    let events = EventHandler::new(Duration::from_millis(100));
    let mut app = App::new(config, service, events.sender());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        log::error!("fatal: {err:?}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Api(event) => app.handle_api_event(event),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            log::info!("quillsheet exiting");
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Only process Press events; Release/Repeat would double-type.
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    app.handle_key(key);
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area);
    render_header(frame, app, &layout);

    match app.screen {
        AppScreen::Form => render_form(frame, app, &layout),
        AppScreen::Lesson => render_lesson(frame, app, &layout),
        AppScreen::History => render_history(frame, app, &layout),
    }

    render_status(frame, app, &layout);
    render_footer(frame, app, &layout);
}

fn render_header(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let screen_name = match app.screen {
        AppScreen::Form => "New Lesson",
        AppScreen::Lesson => "Worksheet",
        AppScreen::History => "History",
    };
    let info = format!(" {screen_name} | {} ", app.config.api_base_url);
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " quillsheet ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default().fg(colors.text_muted()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, layout.header);
}

fn render_form(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let topic = TopicField::new(
        &app.topic,
        &app.topic_input,
        app.focus == FormField::Topic,
        app.theme,
    );
    let panel = FormPanel::new(
        &app.form,
        app.focus,
        topic,
        app.pending.is_some(),
        app.theme,
    );
    frame.render_widget(panel, layout.main);

    if let Some(preview) = layout.preview {
        match app.lesson {
            Some(ref lesson) => frame.render_widget(LessonPane::new(lesson, app.theme), preview),
            None => {
                let colors = &app.theme.colors;
                let placeholder = Paragraph::new(Line::from(Span::styled(
                    "  Generated lessons appear here.",
                    Style::default().fg(colors.text_muted()),
                )))
                .block(Block::bordered().border_style(Style::default().fg(colors.border())));
                frame.render_widget(placeholder, preview);
            }
        }
    }
}

fn render_lesson(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let area = match layout.preview {
        Some(preview) => layout.main.union(preview),
        None => layout.main,
    };
    if let Some(ref lesson) = app.lesson {
        frame.render_widget(LessonPane::new(lesson, app.theme), area);
    }
}

fn render_history(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let area = match layout.preview {
        Some(preview) => layout.main.union(preview),
        None => layout.main,
    };
    frame.render_widget(HistoryList::new(&app.history, app.theme), area);
}

fn render_status(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let Some(ref status) = app.status else {
        return;
    };
    let color = match status.kind {
        StatusKind::Info => colors.fg(),
        StatusKind::Success => colors.success(),
        StatusKind::Warning => colors.warning(),
        StatusKind::Error => colors.error(),
    };
    let line = Line::from(Span::styled(format!(" {}", status.text), Style::default().fg(color)));
    frame.render_widget(Paragraph::new(line), layout.status);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, layout: &AppLayout) {
    let colors = &app.theme.colors;
    let hints: &[&str] = match app.screen {
        AppScreen::Form if app.focus == FormField::Topic => &[
            "[Tab] Next field",
            "[Up/Down] Suggestions",
            "[Enter] Choose",
            "[Esc] Close list",
            "[^G] Generate",
        ],
        AppScreen::Form => &[
            "[Tab/Up/Down] Field",
            "[Left/Right] Change",
            "[^G] Generate",
            "[v] View lesson",
            "[h] History",
            "[q] Quit",
        ],
        AppScreen::Lesson => &[
            "[j/k] Scroll",
            "[p] Print HTML",
            "[t] Text",
            "[d] DOCX",
            "[h] History",
            "[Esc] Back",
        ],
        AppScreen::History => &["[j/k] Select", "[Enter] Open", "[r] Refresh", "[Esc] Back"],
    };
    // Footer is a single row; overflow hints are dropped.
    let packed = pack_hint_lines(hints, layout.footer.width as usize);
    let text = packed.into_iter().next().unwrap_or_default();
    let footer = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(colors.text_muted()),
    )));
    frame.render_widget(footer, layout.footer);
}
