use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use sojourn_core::{
    ConversationSession, Identity, Itinerary, PendingTurn, ProfileNotice, SegmentCategory, Sender, apply_profile_update,
};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::store::{JsonProfileStore, open_default_store};
use crate::transcript::{ChatLog, warn_on_failure};

/// A turn that has been started and is waiting out the response delay.
struct InFlight {
    turn: PendingTurn,
    started: Instant,
}

struct ChatApp {
    session: ConversationSession,
    identity: Identity,
    store: JsonProfileStore,
    latency: Duration,
    input: String,
    in_flight: Option<InFlight>,
    notice: Option<ProfileNotice>,
    log: ChatLog,
}

impl ChatApp {
    fn send(&mut self) {
        let Some(turn) = self.session.begin(&self.input) else {
            return;
        };
        warn_on_failure(self.log.append_user(&self.input));
        self.input.clear();
        self.in_flight = Some(InFlight {
            turn,
            started: Instant::now(),
        });
    }

    /// Complete the in-flight turn once its delay has passed.
    fn tick(&mut self) {
        let due = self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.started.elapsed() >= self.latency);
        if due {
            self.finish();
        }
    }

    /// Append the reply, hand any profile directive to the store, then write the transcript.
    fn finish(&mut self) {
        let Some(f) = self.in_flight.take() else {
            return;
        };
        let Some(outcome) = self.session.complete(f.turn) else {
            return;
        };

        let notice = outcome
            .profile_update
            .as_ref()
            .map(|request| apply_profile_update(&mut self.store, &self.identity, request, chrono::Utc::now()));

        if let Some(m) = self.session.messages().last() {
            warn_on_failure(self.log.append_assistant(&m.text));
        }
        if let Some(n) = notice {
            warn_on_failure(self.log.append_system(&n.to_string()));
            self.notice = Some(n);
        }
    }
}

pub fn run_chat(cfg: &Config, identity: Identity, log: ChatLog) -> Result<()> {
    let store = open_default_store()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let session = match &cfg.chat.greeting {
        Some(g) => ConversationSession::with_greeting(g.clone()),
        None => ConversationSession::new(),
    };
    let mut app = ChatApp {
        session,
        identity,
        store,
        latency: cfg.chat.latency(),
        input: String::new(),
        in_flight: None,
        notice: None,
        log,
    };

    let res = chat_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn chat_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut ChatApp) -> Result<()> {
    warn_on_failure(app.log.append_system("session_start"));

    loop {
        app.tick();
        terminal.draw(|f| draw(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Esc => break,
                    // Input is disabled while a reply is pending.
                    _ if app.session.is_processing() => {}
                    KeyCode::Enter => app.send(),
                    KeyCode::Backspace => {
                        app.input.pop();
                    }
                    KeyCode::Char(c) => {
                        app.input.push(c);
                        app.notice = None;
                    }
                    _ => {}
                }
            }
        }
    }

    // A started turn always gets its reply.
    app.finish();
    warn_on_failure(app.log.append_system("session_end"));
    Ok(())
}

fn draw(f: &mut Frame, app: &ChatApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(5), Constraint::Length(3)])
        .split(f.area());

    let splash = Paragraph::new(Text::from(vec![
        Line::from(Span::styled(
            "Sojourn",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "describe your trip or give your dates (e.g. 'June 23-27, 2025') | Enter=send, Esc=quit",
            Style::default().fg(Color::Gray),
        )),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(splash, chunks[0]);

    let body = if app.session.itinerary_visible() {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
            .split(chunks[1])
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(100)])
            .split(chunks[1])
    };

    draw_conversation(f, app, body[0]);
    if let (Some(it), Some(area)) = (app.session.current_itinerary(), body.get(1)) {
        draw_itinerary(f, it, *area);
    }
    draw_input(f, app, chunks[2]);
}

fn draw_conversation(f: &mut Frame, app: &ChatApp, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for m in app.session.messages() {
        let (tag, color) = match m.sender {
            Sender::User => ("you", Color::Cyan),
            Sender::Assistant => ("sojourn", Color::Magenta),
        };
        let at = m.timestamp.with_timezone(&chrono::Local).format("%H:%M").to_string();
        lines.push(Line::from(vec![
            Span::styled(format!("{tag} "), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(at, Style::default().fg(Color::DarkGray)),
        ]));
        for l in m.text.lines() {
            lines.push(Line::raw(l.to_string()));
        }
        lines.push(Line::raw(""));
    }
    if app.session.is_processing() {
        lines.push(Line::from(Span::styled(
            "sojourn is planning...",
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        )));
    }

    // Keep the latest lines in view.
    let height = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(height) as u16;
    let history = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("conversation"))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(history, area);
}

fn category_color(category: SegmentCategory) -> Color {
    match category {
        SegmentCategory::Flight => Color::Blue,
        SegmentCategory::Lodging => Color::Green,
        SegmentCategory::GroundTransport => Color::Yellow,
        SegmentCategory::Activity => Color::Magenta,
    }
}

fn draw_itinerary(f: &mut Frame, it: &Itinerary, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    for seg in it {
        let color = category_color(seg.category);
        lines.push(Line::from(vec![
            Span::styled(format!("[{}] ", seg.category), Style::default().fg(color)),
            Span::styled(seg.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]));
        lines.push(Line::from(Span::styled(
            seg.date_label.clone(),
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::raw(seg.time_label.clone()));
        lines.push(Line::raw(seg.description.clone()));
        if let Some(loc) = &seg.location {
            lines.push(Line::from(Span::styled(format!("@ {loc}"), Style::default().fg(Color::DarkGray))));
        }
        lines.push(Line::raw(""));
    }

    let panel = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Your Sojourn Itinerary"))
        .wrap(Wrap { trim: false });
    f.render_widget(panel, area);
}

fn draw_input(f: &mut Frame, app: &ChatApp, area: Rect) {
    let title = match &app.notice {
        Some(n) => format!("message | {n}"),
        None => "message".to_string(),
    };
    let title_style = match &app.notice {
        Some(n) if n.is_error() => Style::default().fg(Color::Red),
        Some(_) => Style::default().fg(Color::Green),
        None => Style::default(),
    };
    let input_style = if app.session.is_processing() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };
    let input_widget = Paragraph::new(app.input.as_str())
        .block(Block::default().borders(Borders::ALL).title(Span::styled(title, title_style)))
        .style(input_style);
    f.render_widget(input_widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use sojourn_core::ProfileStore;

    fn app(dir: &std::path::Path, log: ChatLog) -> ChatApp {
        ChatApp {
            session: ConversationSession::new(),
            identity: Identity::signed_in("jane"),
            store: JsonProfileStore::new(dir.join("profiles.json")),
            latency: Duration::ZERO,
            input: String::new(),
            in_flight: None,
            notice: None,
            log,
        }
    }

    #[test]
    fn test_profile_saved_when_transcript_unwritable() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path(), ChatLog::open_today(&dir.path().join("missing")));

        app.input = "update profile: name=Jane Doe".to_string();
        app.send();
        assert!(app.session.is_processing());
        app.tick();

        assert!(!app.session.is_processing());
        assert_eq!(
            app.notice,
            Some(ProfileNotice::Saved {
                fields: vec!["name".to_string()]
            })
        );
        let rec = app.store.get("jane").unwrap().unwrap();
        assert_eq!(rec.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_user_message_kept_as_typed() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path(), ChatLog::disabled());

        app.input = "  need a hotel  ".to_string();
        app.send();
        assert!(app.input.is_empty());
        let user = &app.session.messages()[1];
        assert_eq!(user.sender, Sender::User);
        assert_eq!(user.text, "  need a hotel  ");

        app.finish();
        assert_eq!(app.session.messages().len(), 3);
    }

    #[test]
    fn test_blank_input_is_not_sent() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path(), ChatLog::disabled());

        app.input = "   ".to_string();
        app.send();
        assert!(app.in_flight.is_none());
        assert_eq!(app.input, "   ");
        assert_eq!(app.session.messages().len(), 1);
    }
}
