use anyhow::Result;
use clap::{Parser, ValueEnum};
use rand::{Rng, SeedableRng, rngs::StdRng};
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
    time::{Duration, Instant},
};
use wumpus_world_core::{
    AgentKind, Direction as MoveDirection, Position,
    agent::{Agent, GreedyAgent, RandomWalker},
    environment::{GameSession, Outcome},
    map::{self, Grid, Tile},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Seed for world generation (random when omitted)
    #[arg(short, long)]
    seed: Option<u64>,
    /// Opponent policy
    #[arg(short, long, value_enum, default_value = "greedy")]
    opponent: OpponentKind,
    /// Pause before the AI takes its turn, in milliseconds
    #[arg(long, default_value_t = 1000)]
    ai_delay_ms: u64,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OpponentKind {
    /// Gold-seeking one-step lookahead
    Greedy,
    /// Uniformly random legal steps
    Random,
}

struct App {
    /// The core game state.
    session: GameSession,
    /// Move selection for the AI side.
    opponent: Box<dyn Agent>,
    /// Source for world generation and opponent seeding.
    rng: StdRng,
    /// Pause between the player's move and the AI's answer.
    ai_delay: Duration,
    /// When the pending AI turn fires, if one is scheduled.
    ai_due: Option<Instant>,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(args: &Args) -> Result<Self> {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let grid = map::generate_grid(&mut rng)?;
        let opponent: Box<dyn Agent> = match args.opponent {
            OpponentKind::Greedy => Box::new(GreedyAgent::new()),
            OpponentKind::Random => Box::new(RandomWalker::new(rng.random())),
        };

        Ok(App {
            session: GameSession::new(grid),
            opponent,
            rng,
            ai_delay: Duration::from_millis(args.ai_delay_ms),
            ai_due: None,
            should_quit: false,
        })
    }

    /// Applies one player step and schedules the AI's answer.
    fn handle_player_move(&mut self, direction: MoveDirection) {
        if self.session.turn() != AgentKind::Player || self.session.outcome().is_over() {
            return;
        }
        let target = self
            .session
            .agent(AgentKind::Player)
            .position
            .step(direction);
        // Moves rejected by the core (off the board) are silently ignored.
        if self.session.apply_move(target).is_ok() {
            self.ai_due = Some(Instant::now() + self.ai_delay);
        }
    }

    /// Fires the delayed AI turn once its deadline has passed.
    fn tick(&mut self) {
        let Some(due) = self.ai_due else { return };
        if Instant::now() < due {
            return;
        }
        self.ai_due = None;
        if self.session.outcome().is_over() {
            return;
        }

        let current = self.session.agent(AgentKind::Ai).position;
        let rival = self.session.agent(AgentKind::Player).position;
        let target = self.opponent.select_move(self.session.grid(), current, rival);
        // Every tile of a generated board has an in-bounds neighbor, so the
        // policy always returns a legal step here.
        let _ = self.session.apply_move(target);
    }

    /// Starts a new game on a freshly generated grid.
    fn reset(&mut self) -> Result<()> {
        let grid = map::generate_grid(&mut self.rng)?;
        self.session.restart(grid);
        self.ai_due = None;
        Ok(())
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn main() -> Result<()> {
    // Parse command line arguments and build the game before touching the
    // terminal, so configuration errors print normally.
    let args = Args::parse();
    let mut app = App::new(&args)?;

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    result
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
    let tick_rate = Duration::from_millis(100);
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
                    KeyCode::Char('r') => app.reset()?,
                    KeyCode::Up => app.handle_player_move(MoveDirection::Up),
                    KeyCode::Down => app.handle_player_move(MoveDirection::Down),
                    KeyCode::Left => app.handle_player_move(MoveDirection::Left),
                    KeyCode::Right => app.handle_player_move(MoveDirection::Right),
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
            Constraint::Percentage(70), // Area for the map
            Constraint::Percentage(20), // Area for scores and turn status
            Constraint::Percentage(10), // Area for help
        ])
        .split(frame.area());

    render_map(frame, main_layout[0], &app.session);
    render_status(frame, main_layout[1], app);

    let help_text =
        Paragraph::new("Arrows: move | r: new game | q/Esc: quit — @ you, # AI, ~ breeze, s stench")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

/// Renders the game board with the fog-of-war rules.
fn render_map(frame: &mut Frame, area: Rect, session: &GameSession) {
    let grid = session.grid();
    let player = session.agent(AgentKind::Player).position;
    let ai = session.agent(AgentKind::Ai).position;

    let mut lines: Vec<Line> = Vec::with_capacity(grid.side() as usize);
    for y in 0..grid.side() {
        let mut spans: Vec<Span> = Vec::with_capacity(grid.side() as usize);
        for x in 0..grid.side() {
            spans.push(render_tile(grid, Position::new(x, y), player, ai));
        }
        lines.push(Line::from(spans));
    }

    let map_paragraph = Paragraph::new(lines)
        .block(Block::default().title("Wumpus World").borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(map_paragraph, area);
}

/// Chooses the glyph for one cell.
///
/// A tile's hazard identity is revealed only by standing on it (where the
/// agent glyph takes precedence anyway); an unoccupied cell shows at most
/// its perception marker, and only while an agent stands orthogonally
/// adjacent to it.
fn render_tile(grid: &Grid, pos: Position, player: Position, ai: Position) -> Span<'static> {
    if pos == player {
        return Span::styled("@", Style::default().fg(Color::Cyan).bold());
    }
    if pos == ai {
        return Span::styled("#", Style::default().fg(Color::Magenta).bold());
    }

    let adjacent = pos
        .orthogonal_neighbors()
        .into_iter()
        .any(|neighbor| neighbor == player || neighbor == ai);
    if !adjacent {
        return Span::styled("·", Style::default().fg(Color::DarkGray));
    }
    match grid[pos] {
        Tile::Breeze => Span::styled("~", Style::default().fg(Color::Blue)),
        Tile::Stench => Span::styled("s", Style::default().fg(Color::Green)),
        _ => Span::raw(" "),
    }
}

/// Renders both scores and the turn or end-of-game banner.
fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let session = &app.session;
    let banner = match session.outcome() {
        Outcome::Won(AgentKind::Player) => {
            Span::styled("You win! Press 'r' for a new game.", Style::default().fg(Color::Green).bold())
        }
        Outcome::Won(AgentKind::Ai) => {
            Span::styled("The AI wins! Press 'r' for a new game.", Style::default().fg(Color::Red).bold())
        }
        Outcome::Ongoing => match session.turn() {
            AgentKind::Player => Span::raw("Your turn — reach the gold, avoid the hazards."),
            AgentKind::Ai => Span::styled("AI is thinking...", Style::default().fg(Color::Magenta)),
        },
    };

    let lines = vec![
        Line::from(format!(
            "Player score: {}",
            session.agent(AgentKind::Player).score
        )),
        Line::from(format!(
            "AI score:     {}",
            session.agent(AgentKind::Ai).score
        )),
        Line::from(banner),
    ];
    let status_widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Score"));
    frame.render_widget(status_widget, area);
}
