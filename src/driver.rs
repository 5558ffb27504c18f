use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::event;
use tracing::{debug, error, info};

use crate::game::{GameState, Snapshot};
use crate::intent::{self, Intent, Outcome, TickSpeed};
use crate::term::TermManager;

/// Everything the game loop reacts to, funneled through one channel.
#[derive(Debug)]
pub enum Message {
    Input(event::Event),
    InputFailed(io::Error),
    /// A timer tick, stamped with the generation of the ticker that sent it.
    Tick(u64),
}

/// Where frames go.
pub trait Screen {
    fn draw(&mut self, snap: &Snapshot<'_>) -> io::Result<()>;
}

impl Screen for TermManager {
    fn draw(&mut self, snap: &Snapshot<'_>) -> io::Result<()> {
        TermManager::draw(self, snap)
    }
}

/// A background thread sending `Message::Tick` every period. Dropping it
/// stops and joins the thread, so no tick is sent afterwards.
pub struct Ticker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn start(period: Duration, generation: u64, tx: Sender<Message>) -> io::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name(format!("ticker-{generation}"))
            .spawn(move || loop {
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        if tx.send(Message::Tick(generation)).is_err() {
                            break;
                        }
                    }
                    // Stop requested or the ticker was dropped.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        debug!(?period, generation, "ticker started");
        Ok(Ticker { stop: Some(stop_tx), handle: Some(handle) })
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("ticker thread panicked");
            }
        }
    }
}

/// Forwards terminal events into the game loop until the loop goes away.
pub fn spawn_input(tx: Sender<Message>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name("input".into()).spawn(move || loop {
        let msg = match event::read() {
            Ok(ev) => Message::Input(ev),
            Err(err) => {
                let _ = tx.send(Message::InputFailed(err));
                break;
            }
        };
        if tx.send(msg).is_err() {
            break;
        }
    })
}

/// Sole owner of the game. Input and ticks are handled one at a time.
pub struct Driver<S: Screen> {
    game: GameState,
    speed: TickSpeed,
    screen: S,
    ticker: Option<Ticker>,
    generation: u64,
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

impl<S: Screen> Driver<S> {
    pub fn new(game: GameState, speed: TickSpeed, screen: S) -> Self {
        let (tx, rx) = mpsc::channel();
        Driver { game, speed, screen, ticker: None, generation: 0, tx, rx }
    }

    /// A sender for feeding the loop from other threads.
    pub fn sender(&self) -> Sender<Message> {
        self.tx.clone()
    }

    /// Runs until a quit intent arrives or input breaks.
    pub fn run(&mut self) -> io::Result<()> {
        self.retime(self.speed.period())?;
        self.redraw()?;

        loop {
            let msg = match self.rx.recv() {
                Ok(msg) => msg,
                Err(_) => return Ok(()),
            };

            if !self.handle(msg)? {
                info!("quitting");
                self.ticker = None;
                return Ok(());
            }
        }
    }

    /// Processes one message. Returns `false` once the game should end.
    pub fn handle(&mut self, msg: Message) -> io::Result<bool> {
        match msg {
            Message::Tick(generation) if generation != self.generation => {
                debug!(generation, current = self.generation, "dropping stale tick");
            }
            Message::Tick(_) => {
                self.game.tick();
                self.redraw()?;
            }
            Message::Input(ev) => {
                let Some(intent) = Intent::from_event(&ev) else {
                    return Ok(true);
                };

                match intent::apply(&mut self.game, &mut self.speed, intent) {
                    Outcome::Quit => return Ok(false),
                    Outcome::Retime(period) => self.retime(period)?,
                    Outcome::Continue => {}
                }
                self.redraw()?;
            }
            Message::InputFailed(err) => return Err(err),
        }

        Ok(true)
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Stops the running ticker before starting one with the new period.
    fn retime(&mut self, period: Duration) -> io::Result<()> {
        self.ticker = None;
        self.generation += 1;
        self.ticker = Some(Ticker::start(period, self.generation, self.tx.clone())?);
        Ok(())
    }

    fn redraw(&mut self) -> io::Result<()> {
        self.screen.draw(&self.game.snapshot(Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

    #[derive(Default)]
    struct CountingScreen {
        frames: usize,
    }

    impl Screen for CountingScreen {
        fn draw(&mut self, _snap: &Snapshot<'_>) -> io::Result<()> {
            self.frames += 1;
            Ok(())
        }
    }

    fn key(code: KeyCode) -> Message {
        Message::Input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn driver() -> Driver<CountingScreen> {
        let game = GameState::with_seed(10, 10, 1).unwrap();
        Driver::new(game, TickSpeed::new(Duration::from_secs(10)), CountingScreen::default())
    }

    #[test]
    fn ticker_stops_when_dropped() {
        let (tx, rx) = mpsc::channel();
        let ticker = Ticker::start(Duration::from_millis(5), 7, tx).unwrap();

        match rx.recv_timeout(Duration::from_secs(5)) {
            Ok(Message::Tick(generation)) => assert_eq!(generation, 7),
            other => panic!("expected a tick, got {:?}", other),
        }

        drop(ticker);
        while rx.try_recv().is_ok() {}
        // The thread is joined and its sender gone.
        assert!(matches!(rx.recv_timeout(Duration::from_millis(50)), Err(RecvTimeoutError::Disconnected)));
    }

    #[test]
    fn current_ticks_advance_the_game() {
        let mut d = driver();
        d.retime(Duration::from_secs(3600)).unwrap();
        let generation = d.generation;

        assert!(d.handle(Message::Tick(generation)).unwrap());
        assert_eq!(d.game().snake().head().y, 4);
        assert_eq!(d.screen.frames, 1);
    }

    #[test]
    fn stale_ticks_are_dropped() {
        let mut d = driver();
        d.retime(Duration::from_secs(3600)).unwrap();
        d.retime(Duration::from_secs(3600)).unwrap();

        assert!(d.handle(Message::Tick(d.generation - 1)).unwrap());
        assert_eq!(d.game().snake().head().y, 5);
        assert_eq!(d.screen.frames, 0);
    }

    #[test]
    fn speed_keys_replace_the_ticker() {
        let mut d = driver();
        d.retime(Duration::from_secs(3600)).unwrap();
        let before = d.generation;

        assert!(d.handle(key(KeyCode::Char('+'))).unwrap());
        assert_eq!(d.generation, before + 1);
        assert_eq!(d.speed.period(), Duration::from_millis(7500));
    }

    #[test]
    fn quit_ends_the_loop() {
        let mut d = driver();
        let quit = Message::Input(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!d.handle(quit).unwrap());
    }

    #[test]
    fn run_stops_on_a_queued_quit() {
        let mut d = driver();
        let tx = d.sender();
        tx.send(key(KeyCode::Char('l'))).unwrap();
        tx.send(Message::Input(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)))).unwrap();

        d.run().unwrap();
        assert!(d.game().loop_walls());
        assert!(d.ticker.is_none());
    }

    #[test]
    fn input_failures_surface() {
        let mut d = driver();
        let err = d.handle(Message::InputFailed(io::Error::new(io::ErrorKind::Other, "gone"))).unwrap_err();
        assert_eq!(err.to_string(), "gone");
    }
}
