//! Interactive selection UI.
//!
//! Two interchangeable backends behind the [`Selector`] trait: a fuzzy
//! filter with an incremental search line, and a plain arrow-navigable
//! list. Both return the chosen string verbatim, or `None` when the user
//! aborts.

use std::{io, time::Duration};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};

use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};

use ratatui::{
    DefaultTerminal, Frame, Terminal,
    layout::{Constraint, Direction, Layout, Margin},
    prelude::CrosstermBackend,
    style::{Color, Style},
    widgets::{Block, Borders, List, ListState, Paragraph},
};

use anyhow::Result;

/// A single-pick selection over a list of candidate strings.
pub trait Selector {
    /// Presents `items` under `title`; returns the chosen string, or
    /// `None` when the user aborted without choosing.
    fn choose(&self, title: &str, items: &[String]) -> Result<Option<String>>;
}

/// Incremental fuzzy-filter backend.
pub struct FuzzyFinder;

/// Static list-prompt backend.
pub struct ListPrompt;

impl Selector for FuzzyFinder {
    fn choose(&self, title: &str, items: &[String]) -> Result<Option<String>> {
        run_menu(title, items, true)
    }
}

impl Selector for ListPrompt {
    fn choose(&self, title: &str, items: &[String]) -> Result<Option<String>> {
        run_menu(title, items, false)
    }
}

/// Picks the selector backend for the whole session.
pub fn backend(plain: bool) -> Box<dyn Selector> {
    if plain {
        Box::new(ListPrompt)
    } else {
        Box::new(FuzzyFinder)
    }
}

fn run_menu(
    title: &str,
    items: &[String],
    filter_enabled: bool,
) -> Result<Option<String>> {
    let mut terminal = init()?;
    let mut ui = MenuUi::new(title, items.to_vec(), filter_enabled);
    let outcome = ui.run(&mut terminal);
    restore(terminal)?;
    outcome
}

struct MenuUi {
    title: String,
    all_items: Vec<String>,
    filtered_items: Vec<String>,
    input: String,

    list_state: ListState,
    matcher: SkimMatcherV2,

    filter_enabled: bool,
    chosen: Option<String>,
    exit: bool,
}

impl MenuUi {
    fn new(title: &str, items: Vec<String>, filter_enabled: bool) -> Self {
        let mut list_state = ListState::default();
        if !items.is_empty() {
            list_state.select(Some(0));
        }

        Self {
            title: title.to_string(),
            all_items: items.clone(),
            filtered_items: items,
            input: String::new(),
            list_state,
            matcher: SkimMatcherV2::default(),
            filter_enabled,
            chosen: None,
            exit: false,
        }
    }

    fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<Option<String>> {
        while !self.exit {
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
        }

        Ok(self.chosen.take())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let constraints = if self.filter_enabled {
            vec![Constraint::Min(3), Constraint::Length(3)]
        } else {
            vec![Constraint::Min(3)]
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(frame.area());

        let items = self.filtered_items.iter().map(|s| s.as_str());
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(self.title.as_str()),
            )
            .highlight_style(Style::default().bg(Color::Blue));

        frame.render_stateful_widget(list, chunks[0], &mut self.list_state);

        if self.filter_enabled {
            let input_block =
                Block::default().borders(Borders::ALL).title("Search");
            frame.render_widget(input_block, chunks[1]);

            let text = "> ".to_string() + &self.input;
            let input_text = Paragraph::new(text)
                .style(Style::default().fg(Color::Green));

            frame.render_widget(
                input_text,
                chunks[1].inner(Margin {
                    horizontal: 1,
                    vertical: 1,
                }),
            );
        }
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                self.handle_key_event(key);
            }
        }

        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('p') => self.move_selection(-1),
                KeyCode::Char('n') => self.move_selection(1),
                KeyCode::Char('c') => self.exit = true,
                KeyCode::Char('w') if self.filter_enabled => {
                    self.remove_last_word_from_input();
                    self.update_filter_and_reset();
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char(c) if self.filter_enabled => {
                self.input.push(c);
                self.update_filter_and_reset();
            }
            KeyCode::Backspace if self.filter_enabled => {
                self.input.pop();
                self.update_filter_and_reset();
            }
            KeyCode::Char('q') if !self.filter_enabled => self.exit = true,
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Enter => self.accept_selection(),
            KeyCode::Esc => self.exit = true,
            _ => {}
        }
    }

    fn accept_selection(&mut self) {
        if let Some(selection_idx) = self.list_state.selected() {
            if let Some(selection) = self.filtered_items.get(selection_idx) {
                self.chosen = Some(selection.clone());
                self.exit = true;
            }
        }
    }

    fn update_filter_and_reset(&mut self) {
        self.update_filter();
        self.reset_position();
    }

    fn update_filter(&mut self) {
        if self.input.is_empty() {
            self.filtered_items = self.all_items.clone();
        } else {
            self.filtered_items = self
                .all_items
                .iter()
                .filter(|item| {
                    self.matcher.fuzzy_match(item, &self.input).is_some()
                })
                .cloned()
                .collect();
        }
    }

    fn reset_position(&mut self) {
        if self.filtered_items.is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(0));
        }
    }

    fn move_selection(&mut self, delta: i32) {
        if let Some(selection_idx) = self.list_state.selected() {
            let new_selected =
                usize::try_from((selection_idx as i32 + delta).max(0))
                    .unwrap_or(0);
            self.list_state.select(Some(
                new_selected.min(self.filtered_items.len().saturating_sub(1)),
            ));
        }
    }

    fn remove_last_word_from_input(&mut self) {
        if let Some(last_space) = self.input.trim_end().rfind(' ') {
            self.input.truncate(last_space);
        } else {
            self.input.clear();
        }
    }
}

fn init() -> Result<DefaultTerminal> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore(mut terminal: DefaultTerminal) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(())
}
