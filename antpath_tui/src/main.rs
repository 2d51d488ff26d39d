use antpath_core::{
    ActionCatalog, ActionId, Assignment, Position, Replay, Settings, Verdict,
    assignment::{PIT_ELEMENT_ID, load_assignment_from_string},
    checker::StepResult,
};
use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use ratatui::{
    crossterm::{
        self,
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    io::{self, Stdout},
    path::PathBuf,
    process::ExitCode,
    time::{Duration, Instant},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Check grid puzzle solutions", long_about = None)]
struct Cli {
    /// Settings file (TOML) with validation bounds and the action catalog
    #[arg(short, long, global = true, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate an assignment map and report whether it can be solved
    Validate(MapArgs),
    /// Print a shortest answer for an assignment map
    Solve(MapArgs),
    /// Check an answer and print the verdict
    Check(AnswerArgs),
    /// Animate an answer in the terminal
    Replay(AnswerArgs),
}

#[derive(Args, Debug)]
struct MapArgs {
    /// Map file to load
    #[arg(short, long, value_name = "MAP_FILE")]
    map: PathBuf,
}

#[derive(Args, Debug)]
struct AnswerArgs {
    #[command(flatten)]
    map: MapArgs,

    /// Comma separated action ids or names, e.g. `1,1,step_down`
    #[arg(short, long, value_delimiter = ',', num_args = 0..)]
    answer: Vec<String>,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    match cli.command {
        Command::Validate(args) => {
            let assignment = load_map(&args, &settings)?;
            let field = assignment.field();
            println!(
                "Valid assignment: {}x{} field, start {}, end {}, {} obstacle(s)",
                field.width(),
                field.height(),
                field.start(),
                field.end(),
                assignment.obstacles().len()
            );
            if assignment.is_solvable() {
                Ok(ExitCode::SUCCESS)
            } else {
                println!("Warning: the end position cannot be reached with the permitted actions");
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Solve(args) => {
            let assignment = load_map(&args, &settings)?;
            match assignment.solve() {
                Some(answer) => {
                    println!("{}", describe_answer(&answer, assignment.actions()));
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    println!("No solution");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Check(args) => {
            let assignment = load_map(&args.map, &settings)?;
            let answer = resolve_answer(&args.answer, assignment.actions())?;
            let verdict = assignment.check(&answer)?;
            info!(%verdict, "checked answer");
            if verdict.is_success() {
                println!("PASS: {verdict}");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("FAIL: {verdict}");
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Replay(args) => {
            let assignment = load_map(&args.map, &settings)?;
            let answer = resolve_answer(&args.answer, assignment.actions())?;
            let mut app = App::new(assignment, &answer)?;

            // Set up the terminal
            let mut terminal = setup_terminal()?;
            let result = run_app(&mut terminal, &mut app);
            // Restore the terminal state even if the loop failed
            restore_terminal(&mut terminal)?;
            result?;

            Ok(if app.verdict.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn load_map(args: &MapArgs, settings: &Settings) -> Result<Assignment> {
    if !args.map.exists() {
        return Err(anyhow!("Map file does not exist: {}", args.map.display()));
    }
    let map_string = std::fs::read_to_string(&args.map)
        .with_context(|| format!("Failed to read map file {}", args.map.display()))?;
    let name = args
        .map
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let assignment = load_assignment_from_string(&map_string, &name, settings)?;
    debug!(%name, "map loaded");
    Ok(assignment)
}

/// Turns the tokens of `--answer` into action ids. Tokens are ids or action names.
fn resolve_answer(tokens: &[String], catalog: &ActionCatalog) -> Result<Vec<ActionId>> {
    tokens
        .iter()
        .map(|token| token.trim())
        .filter(|token| !token.is_empty())
        .map(|token| match token.parse::<ActionId>() {
            Ok(id) => Ok(id),
            Err(_) => catalog
                .by_name(token)
                .map(|action| action.id)
                .ok_or_else(|| anyhow!("Unknown action '{token}'")),
        })
        .collect()
}

fn describe_answer(answer: &[ActionId], catalog: &ActionCatalog) -> String {
    let ids: Vec<String> = answer.iter().map(ToString::to_string).collect();
    let names: Vec<&str> = answer
        .iter()
        .filter_map(|id| catalog.get(*id).map(|action| action.name.as_str()))
        .collect();
    format!("{}  ({})", ids.join(","), names.join(" "))
}

struct App {
    assignment: Assignment,
    /// Positions after each accepted step, starting with the start cell.
    trail: Vec<Position>,
    /// Names of the actions of the answer.
    action_names: Vec<String>,
    verdict: Verdict,
    /// Number of trail entries currently shown.
    shown: usize,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(assignment: Assignment, answer: &[ActionId]) -> Result<Self> {
        let catalog = assignment.actions();
        let mut replay = Replay::new(assignment.field(), assignment.obstacles());
        let mut trail = vec![replay.position()];
        let mut action_names = Vec::with_capacity(answer.len());

        for (step, id) in answer.iter().enumerate() {
            let action = catalog
                .get(*id)
                .ok_or_else(|| anyhow!("Action id {id} at step {step} is not permitted"))?;
            action_names.push(action.name.clone());
            match replay.step(action) {
                StepResult::Moved(position) => trail.push(position),
                StepResult::Failed(_) => break,
            }
        }
        let verdict = replay.finish();

        Ok(App {
            assignment,
            trail,
            action_names,
            verdict,
            shown: 1,
            should_quit: false,
        })
    }

    fn is_finished(&self) -> bool {
        self.shown >= self.trail.len()
    }

    /// Reveals the next step of the replay.
    fn tick(&mut self) {
        if !self.is_finished() {
            self.shown += 1;
        }
    }

    fn restart(&mut self) {
        self.shown = 1;
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(400);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                    KeyCode::Char('r') => app.restart(),
                    _ => {}
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(70), // Area for the field
            Constraint::Percentage(20), // Area for the answer
            Constraint::Percentage(10), // Area for status/help
        ])
        .split(frame.area());

    render_field(frame, main_layout[0], app);
    render_answer(frame, main_layout[1], app);

    let help_text = Paragraph::new("Press 'r' to restart, 'q' or 'Esc' to quit.")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

/// Renders the answer and, once the replay is over, the verdict.
fn render_answer(frame: &mut Frame, area: Rect, app: &App) {
    let current = app.shown - 1;
    let steps: Vec<Span> = app
        .action_names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let style = if index < current {
                Style::default().fg(Color::Green)
            } else if index == current && app.is_finished() && app.verdict.failed_step() == Some(index) {
                Style::default().fg(Color::Red).bold()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(format!("{name} "), style)
        })
        .collect();

    let position = app.trail[current];
    let mut lines = vec![
        Line::from(format!("Step {}/{}  Position {}", current, app.action_names.len(), position)),
        Line::from(steps),
    ];
    if app.is_finished() {
        let color = if app.verdict.is_success() {
            Color::Green
        } else {
            Color::Red
        };
        lines.push(Line::from(Span::styled(
            app.verdict.to_string(),
            Style::default().fg(color).bold(),
        )));
    }

    let answer_widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Answer"));
    frame.render_widget(answer_widget, area);
}

/// Renders the field onto the frame.
fn render_field(frame: &mut Frame, area: Rect, app: &App) {
    let field = app.assignment.field();
    let visited = &app.trail[..app.shown];
    let agent = visited.last().copied().unwrap_or(field.start());
    let failed_at = match app.verdict {
        Verdict::OutOfBounds { position, .. } | Verdict::Collision { position, .. } if app.is_finished() => {
            Some(position)
        }
        _ => None,
    };

    let mut lines: Vec<Line> = Vec::with_capacity(field.height() as usize);
    for y in 1..=field.height() {
        let mut spans: Vec<Span> = Vec::with_capacity(field.width() as usize);
        for x in 1..=field.width() {
            let position = Position { x, y };
            let element = app
                .assignment
                .elements()
                .iter()
                .find(|element| element.position == position);

            let span = if failed_at == Some(position) {
                Span::styled("X", Style::default().fg(Color::Red).bold())
            } else if position == agent {
                Span::styled("@", Style::default().fg(Color::Red).bold())
            } else if let Some(element) = element {
                if element.element_id == PIT_ELEMENT_ID {
                    Span::styled("o", Style::default().fg(Color::Magenta))
                } else {
                    Span::styled("#", Style::default().fg(Color::DarkGray))
                }
            } else if position == field.end() {
                Span::styled("E", Style::default().fg(Color::Green).bold())
            } else if position == field.start() {
                Span::styled("S", Style::default().fg(Color::Yellow))
            } else if visited.contains(&position) {
                Span::styled("*", Style::default().fg(Color::Yellow))
            } else {
                Span::styled(".", Style::default().fg(Color::DarkGray))
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let field_paragraph = Paragraph::new(lines)
        .block(Block::default().title(app.assignment.name.as_str()).borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(field_paragraph, area);
}
