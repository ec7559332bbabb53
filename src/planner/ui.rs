use super::edit::{CommitOutcome, EditSession};
use super::storage::Storage;
use super::store::Store;
use super::task::Task;
use chrono::Local;
use colored::Colorize;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use dialoguer::{theme::ColorfulTheme, Input};
use std::io::{self, Write};

use crate::error::AppError;

/// One-line message shown until the next key press.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Notice {
    Success(String),
    Info(String),
    Warning(String),
}

impl Notice {
    fn render(&self) -> String {
        match self {
            Notice::Success(msg) => format!("✔ {}", msg).green().to_string(),
            Notice::Info(msg) => format!("ℹ {}", msg).cyan().to_string(),
            Notice::Warning(msg) => format!("⚠ {}", msg).yellow().to_string(),
        }
    }
}

pub fn run_planner<S: Storage>(store: &mut Store<S>) -> Result<(), AppError> {
    let mut session = EditSession::new();
    let mut selected_index = 0;
    let mut notice: Option<Notice> = None;

    let mut stdout = io::stdout();

    enable_raw_mode()?;
    if let Err(e) = execute!(stdout, EnterAlternateScreen, cursor::Hide) {
        let _ = disable_raw_mode();
        return Err(e.into());
    }

    let result = event_loop(&mut stdout, store, &mut session, &mut selected_index, &mut notice);

    disable_raw_mode()?;
    execute!(stdout, cursor::Show, LeaveAlternateScreen)?;
    result
}

fn event_loop<S: Storage>(
    stdout: &mut io::Stdout,
    store: &mut Store<S>,
    session: &mut EditSession,
    selected_index: &mut usize,
    notice: &mut Option<Notice>,
) -> Result<(), AppError> {
    redraw(stdout, store, *selected_index, notice.as_ref())?;

    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        *notice = None;

        match key.code {
            KeyCode::Char('q') => break,

            KeyCode::Up => {
                *selected_index = selected_index.saturating_sub(1);
            }

            KeyCode::Down => {
                if *selected_index < store.len() {
                    *selected_index += 1;
                }
            }

            KeyCode::Char(' ') => {
                if let Some(id) = selected_id(store, *selected_index) {
                    if let Some(task) = store.toggle_complete(&id) {
                        if task.is_completed {
                            *notice = Some(Notice::Success("Task completed!".to_string()));
                        }
                    }
                }
            }

            KeyCode::Char('d') => {
                if let Some(id) = selected_id(store, *selected_index) {
                    if store.delete(&id) {
                        if session.is_editing(&id) {
                            session.cancel();
                        }
                        *notice = Some(Notice::Info("Task deleted!".to_string()));
                    }
                    if *selected_index >= store.len() && !store.is_empty() {
                        *selected_index = store.len() - 1;
                    }
                }
            }

            KeyCode::Char('c') => {
                if !store.is_empty() {
                    store.clear_all();
                    session.cancel();
                    *selected_index = 0;
                    *notice = Some(Notice::Info("All tasks cleared".to_string()));
                }
            }

            KeyCode::Char('a') => {
                add_task(stdout, store, selected_index, notice)?;
            }

            KeyCode::Enter if *selected_index == store.len() => {
                add_task(stdout, store, selected_index, notice)?;
            }

            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(id) = selected_id(store, *selected_index) {
                    session.begin_by_id(store, &id);
                    let draft = session.draft().to_string();
                    let text = with_prompt(stdout, || prompt_edit_task(&draft))?;
                    session.set_draft(text);
                    *notice = edit_notice(session.commit(store));
                    session.cancel();
                }
            }

            _ => {}
        }

        if let Some(e) = store.take_persist_error() {
            *notice = Some(Notice::Warning(format!("Could not save tasks: {}", e)));
        }

        redraw(stdout, store, *selected_index, notice.as_ref())?;
    }

    Ok(())
}

fn add_task<S: Storage>(
    stdout: &mut io::Stdout,
    store: &mut Store<S>,
    selected_index: &mut usize,
    notice: &mut Option<Notice>,
) -> Result<(), AppError> {
    if let Some(title) = with_prompt(stdout, prompt_new_task)? {
        if store.create(&title).is_some() {
            *selected_index = store.len() - 1;
            *notice = Some(Notice::Success("Task created!".to_string()));
        }
    }
    Ok(())
}

/// An empty or unchanged reply leaves the prompt without editing.
fn edit_notice(outcome: CommitOutcome) -> Option<Notice> {
    match outcome {
        CommitOutcome::Saved(_) => Some(Notice::Success("Task updated!".to_string())),
        CommitOutcome::Unchanged | CommitOutcome::Blank => {
            Some(Notice::Info("Edit cancelled".to_string()))
        }
        CommitOutcome::Missing => None,
    }
}

fn selected_id<S: Storage>(store: &Store<S>, index: usize) -> Option<String> {
    store.tasks().get(index).map(|t| t.id.clone())
}

/// Leaves raw mode for the duration of a line-editing prompt.
fn with_prompt<T>(
    stdout: &mut io::Stdout,
    prompt: impl FnOnce() -> Result<T, AppError>,
) -> Result<T, AppError> {
    disable_raw_mode()?;
    execute!(stdout, cursor::Show, cursor::MoveTo(0, 0), Clear(ClearType::All))?;

    let result = prompt();

    enable_raw_mode()?;
    execute!(stdout, cursor::Hide)?;
    result
}

fn redraw<S: Storage>(
    stdout: &mut io::Stdout,
    store: &Store<S>,
    selected: usize,
    notice: Option<&Notice>,
) -> Result<(), AppError> {
    execute!(stdout, cursor::MoveTo(0, 0), Clear(ClearType::All))?;

    let (width, height) = size()?;
    let output = render_tasks(
        store.tasks(),
        store.completed_count(),
        selected,
        notice,
        width as usize,
        height as usize,
    );

    write!(stdout, "{}", output)?;
    stdout.flush()?;
    Ok(())
}

fn render_tasks(
    tasks: &[Task],
    completed: usize,
    selected: usize,
    notice: Option<&Notice>,
    width: usize,
    height: usize,
) -> String {
    if width < 40 || height < 10 {
        return "Terminal too small. Please resize the window.".to_string();
    }

    let mut output = String::new();

    // HEADER
    output.push_str(&format!("{}\r\n", "=".repeat(width)));
    output.push_str(&format!("{}\r\n", "📓 My tasks".bold()));
    output.push_str(&format!("{}\r\n", "=".repeat(width)));
    if tasks.is_empty() {
        output.push_str("\r\n");
    } else {
        output.push_str(&format!("Done: {} | Total: {}\r\n", completed, tasks.len()));
    }

    let footer_lines = 6;
    let header_lines = 5;
    let available = height.saturating_sub(header_lines + footer_lines).max(1);

    // Each task takes two lines, the trailing "add" row one.
    let visible_tasks = (available / 2).max(1);
    let total_items = tasks.len() + 1;
    let start = selected.saturating_sub(visible_tasks / 2);
    let end = (start + visible_tasks).min(total_items);

    for index in start..end {
        let pointer = if index == selected { "→ " } else { "  " };

        match tasks.get(index) {
            Some(task) => {
                let checkbox = if task.is_completed { "☑" } else { "☐" };

                let mut title = task.title.clone();
                let max_title = width.saturating_sub(6);
                if title.chars().count() > max_title {
                    title = title.chars().take(max_title.saturating_sub(1)).collect();
                    title.push('…');
                }
                let title = if task.is_completed {
                    title.dimmed().strikethrough().to_string()
                } else {
                    title
                };

                output.push_str(&format!("{}{} {}\r\n", pointer, checkbox, title));
                output.push_str(&format!("     {}\r\n", timestamp_line(task).dimmed()));
            }
            None => {
                output.push_str(&format!("{}+ Add New Task\r\n", pointer));
            }
        }
    }

    output.push_str(&format!("\r\n{}\r\n", "─".repeat(width)));
    match notice {
        Some(n) => output.push_str(&format!("{}\r\n", n.render())),
        None => output.push_str("\r\n"),
    }
    output.push_str("💡 Controls:\r\n");
    output.push_str("   ↑/↓: Navigate | Space: Toggle | a: Add | e: Edit | d: Delete\r\n");
    output.push_str("   c: Clear all | q: Quit\r\n");

    output
}

fn timestamp_line(task: &Task) -> String {
    let created = task.created_at.with_timezone(&Local);
    match task.completed_at {
        Some(done) => format!(
            "📅 {}  ✅ {}",
            created.format("%Y-%m-%d %H:%M"),
            done.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        ),
        None => format!("📅 {}", created.format("%Y-%m-%d %H:%M")),
    }
}

fn prompt_new_task() -> Result<Option<String>, AppError> {
    println!("📝 Create New Task");
    println!("{}", "=".repeat(80));

    let title: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Task title")
        .allow_empty(true)
        .interact_text()?;

    if title.trim().is_empty() {
        return Ok(None);
    }

    Ok(Some(title))
}

fn prompt_edit_task(current_title: &str) -> Result<String, AppError> {
    println!("✏️  Edit Task");
    println!("{}", "=".repeat(80));

    let title: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Task title (empty to cancel)")
        .with_initial_text(current_title)
        .allow_empty(true)
        .interact_text()?;

    Ok(title)
}
