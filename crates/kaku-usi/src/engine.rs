//! Event-driven USI engine.
//!
//! The main loop owns all output. Searches run on a worker thread that owns
//! the [`Searcher`] for the duration and hands it back when done.

use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use kaku_core::Position;
use kaku_engine::{
    PAWN_VALUE, PvReport, Score, SearchConfig, SearchHandler, SearchResult, Searcher, StopHandle,
};

use crate::command::{Command, GoParams, UsiOption, parse_command};
use crate::error::UsiError;

/// Largest `USI_Hash` value advertised.
const MAX_HASH_MB: usize = 1024;

/// Depth limit of `go infinite` and the largest `MaxDepth`.
const MAX_DEPTH: i32 = 60;

/// Events processed by the main engine loop.
enum EngineEvent {
    UsiCommand(Result<Command, UsiError>),
    /// The worker reset its stop flag; interrupts now take effect.
    SearchStarted,
    Info(String),
    SearchDone(SearchDone),
    InputClosed,
}

/// Payload returned by the search thread when it finishes.
struct SearchDone {
    result: SearchResult,
    searcher: Searcher,
}

/// Bookkeeping for the search in flight.
struct ActiveSearch {
    stop: StopHandle,
    worker: JoinHandle<()>,
    started: bool,
    stop_requested: bool,
    infinite: bool,
}

/// Forwards progress to the main loop as `info` lines.
struct UsiInfoHandler {
    tx: mpsc::Sender<EngineEvent>,
}

impl UsiInfoHandler {
    fn send(&self, report: &PvReport<'_>, bound: &str) {
        let elapsed_ms = report.elapsed.as_millis() as u64;
        let line = format!(
            "info depth {} score {}{} nodes {} nps {} time {} pv {}",
            report.depth,
            format_score(report.score),
            bound,
            report.info.total_nodes(),
            report.info.nps(report.elapsed),
            elapsed_ms,
            report.pv,
        );
        let _ = self.tx.send(EngineEvent::Info(line));
    }
}

impl SearchHandler for UsiInfoHandler {
    fn on_start(&mut self) {
        let _ = self.tx.send(EngineEvent::SearchStarted);
    }

    fn on_update_pv(&mut self, report: &PvReport<'_>) {
        self.send(report, "");
    }

    fn on_fail_low(&mut self, report: &PvReport<'_>) {
        self.send(report, " upperbound");
    }

    fn on_fail_high(&mut self, report: &PvReport<'_>) {
        self.send(report, " lowerbound");
    }
}

/// `cp <centipawns>` or `mate <plies>`, negative when being mated.
pub fn format_score(score: Score) -> String {
    match score.mate_distance() {
        Some(plies) if score > Score::ZERO => format!("mate {plies}"),
        Some(plies) => format!("mate -{plies}"),
        None => format!("cp {}", score.raw() * 100 / PAWN_VALUE),
    }
}

/// The USI engine, holding the current position and the searcher.
///
/// Runs an event-driven loop on the calling thread, dispatching searches
/// to a worker thread and processing commands concurrently.
pub struct UsiEngine {
    position: Position,
    searcher: Option<Searcher>,
    config: SearchConfig,
    active: Option<ActiveSearch>,
    /// Result of a finished `go infinite`, held until `stop`.
    held: Option<SearchResult>,
    pending_clear: bool,
    input_closed: bool,
}

impl UsiEngine {
    /// Create a new engine with the starting position.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            position: Position::starting_position(),
            searcher: Some(Searcher::new(config.clone())),
            config,
            active: None,
            held: None,
            pending_clear: false,
            input_closed: false,
        }
    }

    /// Run the USI loop on stdin and stdout until `quit` or input closes.
    pub fn run(self) -> Result<(), UsiError> {
        self.run_with(io::BufReader::new(io::stdin()), io::stdout())
    }

    /// Run the USI loop on arbitrary streams.
    pub fn run_with<R, W>(mut self, input: R, mut out: W) -> Result<(), UsiError>
    where
        R: BufRead + Send + 'static,
        W: Write,
    {
        let (tx, rx) = mpsc::channel::<EngineEvent>();

        let input_tx = tx.clone();
        thread::spawn(move || {
            for line in input.lines() {
                let Ok(line) = line else {
                    break;
                };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                debug!(cmd = %trimmed, "received USI command");
                if input_tx.send(EngineEvent::UsiCommand(parse_command(trimmed))).is_err() {
                    return;
                }
            }
            let _ = input_tx.send(EngineEvent::InputClosed);
        });

        while let Ok(event) = rx.recv() {
            match event {
                EngineEvent::UsiCommand(Ok(cmd)) => match cmd {
                    Command::Usi => self.handle_usi(&mut out)?,
                    Command::IsReady => writeln!(out, "readyok")?,
                    Command::SetOption(option) => self.handle_setoption(option),
                    Command::UsiNewGame => self.handle_usinewgame(),
                    Command::Position(position) => self.position = position,
                    Command::Go(params) => self.handle_go(params, &tx, &mut out)?,
                    Command::Stop => self.handle_stop(&mut out)?,
                    Command::GameOver => {
                        self.finish_active(&rx, &mut out, false)?;
                        self.held = None;
                    }
                    Command::Quit => {
                        self.finish_active(&rx, &mut out, true)?;
                        break;
                    }
                    Command::Unknown(cmd) => {
                        if !cmd.is_empty() {
                            debug!(cmd = %cmd, "ignoring unknown command");
                        }
                    }
                },
                EngineEvent::UsiCommand(Err(e)) => warn!(error = %e, "USI parse error"),
                other => self.handle_search_event(other, &mut out, true)?,
            }
            out.flush()?;

            if self.input_closed {
                // Let a bounded search finish; an infinite one would never end.
                if self.active.as_ref().is_some_and(|active| active.infinite) {
                    self.request_stop();
                }
                self.wait_for_search(&rx, &mut out, true)?;
                if let Some(result) = self.held.take() {
                    print_bestmove(&mut out, &result)?;
                }
                break;
            }
        }

        out.flush()?;
        info!("kaku shutting down");
        Ok(())
    }

    fn handle_usi(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "id name kaku")?;
        writeln!(out, "id author kaku developers")?;
        writeln!(
            out,
            "option name USI_Hash type spin default {} min 1 max {MAX_HASH_MB}",
            self.config.hash_mb
        )?;
        writeln!(
            out,
            "option name MaxDepth type spin default {} min 1 max {MAX_DEPTH}",
            self.config.max_depth
        )?;
        writeln!(out, "usiok")
    }

    fn handle_setoption(&mut self, option: UsiOption) {
        match option {
            UsiOption::Hash(mb) => self.config.hash_mb = mb.min(MAX_HASH_MB),
            UsiOption::MaxDepth(depth) => self.config.max_depth = depth.min(MAX_DEPTH),
        }
        // A busy searcher picks the change up when it comes back.
        if let Some(searcher) = self.searcher.as_mut() {
            searcher.set_config(self.config.clone());
        }
    }

    fn handle_usinewgame(&mut self) {
        self.position = Position::starting_position();
        self.held = None;
        match self.searcher.as_mut() {
            Some(searcher) => searcher.clear(),
            None => self.pending_clear = true,
        }
    }

    fn handle_go(
        &mut self,
        params: GoParams,
        tx: &mpsc::Sender<EngineEvent>,
        out: &mut impl Write,
    ) -> io::Result<()> {
        if self.active.is_some() {
            warn!("go received while searching, ignoring");
            return Ok(());
        }
        if let Some(result) = self.held.take() {
            warn!("go received before stop, answering the previous search");
            print_bestmove(out, &result)?;
        }
        let Some(mut searcher) = self.searcher.take() else {
            warn!("searcher unavailable, ignoring go");
            return Ok(());
        };

        let limit = match params.infinite {
            true => None,
            false => params.clock.limit(self.position.turn()),
        };
        searcher.set_time_limit(limit);
        let max_depth = match (params.depth, params.infinite) {
            (Some(depth), _) => depth,
            (None, true) => MAX_DEPTH,
            (None, false) => self.config.max_depth,
        };
        debug!(max_depth, ?limit, infinite = params.infinite, "starting search");

        let stop = searcher.stop_handle();
        let position = self.position.clone();
        let tx = tx.clone();
        let worker = thread::spawn(move || {
            let mut handler = UsiInfoHandler { tx: tx.clone() };
            let result = searcher.idsearch(&position, max_depth, &mut handler);
            let _ = tx.send(EngineEvent::SearchDone(SearchDone { result, searcher }));
        });

        self.active = Some(ActiveSearch {
            stop,
            worker,
            started: false,
            stop_requested: false,
            infinite: params.infinite,
        });
        Ok(())
    }

    fn handle_stop(&mut self, out: &mut impl Write) -> io::Result<()> {
        if let Some(result) = self.held.take() {
            return print_bestmove(out, &result);
        }
        self.request_stop();
        Ok(())
    }

    /// Interrupt the running search, or remember to once it has started.
    fn request_stop(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.stop_requested = true;
            if active.started {
                active.stop.interrupt();
            }
        }
    }

    fn handle_search_event(&mut self, event: EngineEvent, out: &mut impl Write, announce: bool) -> io::Result<()> {
        match event {
            EngineEvent::SearchStarted => {
                if let Some(active) = self.active.as_mut() {
                    active.started = true;
                    if active.stop_requested {
                        active.stop.interrupt();
                    }
                }
            }
            EngineEvent::Info(line) => writeln!(out, "{line}")?,
            EngineEvent::SearchDone(done) => self.finish_search(done, out, announce)?,
            EngineEvent::InputClosed => self.input_closed = true,
            EngineEvent::UsiCommand(_) => {}
        }
        Ok(())
    }

    /// Stop the running search, if any, and wait for it.
    fn finish_active(
        &mut self,
        rx: &mpsc::Receiver<EngineEvent>,
        out: &mut impl Write,
        announce: bool,
    ) -> io::Result<()> {
        self.request_stop();
        self.wait_for_search(rx, out, announce)
    }

    /// Handle worker events until the search in flight has finished.
    fn wait_for_search(
        &mut self,
        rx: &mpsc::Receiver<EngineEvent>,
        out: &mut impl Write,
        announce: bool,
    ) -> io::Result<()> {
        while self.active.is_some() {
            let Ok(event) = rx.recv() else {
                break;
            };
            match event {
                EngineEvent::UsiCommand(Ok(cmd)) => debug!(?cmd, "dropping command while shutting down"),
                other => self.handle_search_event(other, out, announce)?,
            }
        }
        Ok(())
    }

    fn finish_search(&mut self, done: SearchDone, out: &mut impl Write, announce: bool) -> io::Result<()> {
        let mut searcher = done.searcher;
        searcher.set_config(self.config.clone());
        if self.pending_clear {
            searcher.clear();
            self.pending_clear = false;
        }
        self.searcher = Some(searcher);

        let Some(active) = self.active.take() else {
            return Ok(());
        };
        if active.worker.join().is_err() {
            warn!("search worker panicked");
        }
        if !announce {
            return Ok(());
        }
        if active.infinite && !active.stop_requested {
            self.held = Some(done.result);
            return Ok(());
        }
        print_bestmove(out, &done.result)
    }
}

fn print_bestmove(out: &mut impl Write, result: &SearchResult) -> io::Result<()> {
    match result.best_move {
        Some(mv) => writeln!(out, "bestmove {mv}"),
        None => writeln!(out, "bestmove resign"),
    }
}

impl Default for UsiEngine {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn run(script: &str) -> String {
        let config = SearchConfig {
            hash_mb: 1,
            randomize_root: false,
            ..SearchConfig::default()
        };
        let mut out = Vec::new();
        UsiEngine::new(config)
            .run_with(Cursor::new(script.to_string()), &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn handshake() {
        let out = run("usi\nisready\nquit\n");
        assert!(out.starts_with("id name kaku\n"));
        assert!(out.contains("option name USI_Hash type spin"));
        assert!(out.contains("usiok\nreadyok\n"));
    }

    #[test]
    fn go_depth_answers_with_a_move() {
        let out = run("position sfen 4k/5/3P1/5/K4 b G 1\ngo depth 3\n");
        assert!(out.contains("info depth 1 "));
        assert!(out.contains("score mate 1"));
        assert!(out.trim_end().ends_with("bestmove G*2b"), "{out}");
    }

    #[test]
    fn mated_side_resigns() {
        let out = run("position sfen 4k/3G1/3P1/5/K4 w - 2\ngo depth 2\n");
        assert!(out.trim_end().ends_with("bestmove resign"), "{out}");
    }

    #[test]
    fn infinite_search_answers_after_stop() {
        let out = run("position startpos\ngo infinite\nstop\n");
        assert_eq!(out.matches("bestmove ").count(), 1, "{out}");
    }

    #[test]
    fn input_closing_ends_an_infinite_search() {
        let out = run("position startpos\ngo infinite\n");
        assert_eq!(out.matches("bestmove ").count(), 1, "{out}");
    }

    #[test]
    fn bad_commands_are_skipped() {
        let out = run("position startpos moves 5e5d\nsetoption name Bogus value 1\nisready\n");
        assert_eq!(out, "readyok\n");
    }

    #[test]
    fn scores_are_formatted() {
        assert_eq!(format_score(Score::mate_in(3)), "mate 3");
        assert_eq!(format_score(Score::mated_in(2)), "mate -2");
        assert_eq!(format_score(Score::new(PAWN_VALUE * 3 / 2)), "cp 150");
        assert_eq!(format_score(Score::ZERO), "cp 0");
    }
}
