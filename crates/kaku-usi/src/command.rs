//! USI command parsing.

use std::time::Duration;

use kaku_core::Position;
use kaku_engine::Clock;

use crate::error::UsiError;

/// Parameters for the `go` command.
///
/// All fields are optional; a bare `go` searches to the configured depth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    /// Remaining time, increments and byoyomi.
    pub clock: Clock,
    /// Search to this depth only.
    pub depth: Option<i32>,
    /// Search until `stop` and hold the answer until then.
    pub infinite: bool,
}

/// An option set through `setoption`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsiOption {
    /// `USI_Hash`: transposition table size in MiB.
    Hash(usize),
    /// `MaxDepth`: default depth limit in plies.
    MaxDepth(i32),
}

/// A parsed USI command.
#[derive(Debug)]
pub enum Command {
    /// `usi`: identify the engine.
    Usi,
    /// `isready`: synchronization ping.
    IsReady,
    /// `setoption name <id> value <x>`.
    SetOption(UsiOption),
    /// `usinewgame`: forget the previous game.
    UsiNewGame,
    /// `position`: set up a position with optional moves applied.
    Position(Position),
    /// `go`: start searching.
    Go(GoParams),
    /// `stop`: halt the current search.
    Stop,
    /// `gameover win|lose|draw`.
    GameOver,
    /// `quit`: exit the engine.
    Quit,
    /// Unrecognized command, ignored.
    Unknown(String),
}

/// Parse a single line of USI input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, UsiError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, rest)) = tokens.split_first() else {
        return Ok(Command::Unknown(String::new()));
    };

    match head {
        "usi" => Ok(Command::Usi),
        "isready" => Ok(Command::IsReady),
        "usinewgame" => Ok(Command::UsiNewGame),
        "stop" => Ok(Command::Stop),
        "gameover" => Ok(Command::GameOver),
        "quit" => Ok(Command::Quit),
        "setoption" => parse_setoption(rest),
        "position" => parse_position(rest),
        "go" => parse_go(rest),
        _ => Ok(Command::Unknown(head.to_string())),
    }
}

/// Parse `setoption name <id> value <x>`.
fn parse_setoption(tokens: &[&str]) -> Result<Command, UsiError> {
    let name = match tokens {
        ["name", name, ..] => *name,
        _ => {
            return Err(UsiError::MissingValue {
                param: "name".to_string(),
            });
        }
    };
    let value = match &tokens[2..] {
        ["value", value, ..] => Some(value),
        _ => None,
    };

    match name {
        "USI_Hash" => {
            let mb: usize = parse_value(value, name)?;
            Ok(Command::SetOption(UsiOption::Hash(mb.max(1))))
        }
        "MaxDepth" => {
            let depth: i32 = parse_value(value, name)?;
            Ok(Command::SetOption(UsiOption::MaxDepth(depth.max(1))))
        }
        _ => Err(UsiError::UnknownOption {
            name: name.to_string(),
        }),
    }
}

/// Parse the `position` command arguments.
///
/// Supports:
/// - `position startpos [moves 1e1d 5a5b ...]`
/// - `position sfen <sfen> [moves ...]`
fn parse_position(tokens: &[&str]) -> Result<Command, UsiError> {
    let moves_at = tokens.iter().position(|&t| t == "moves").unwrap_or(tokens.len());
    let (setup, moves) = tokens.split_at(moves_at);

    let mut position = match setup {
        ["startpos"] => Position::starting_position(),
        ["sfen", sfen @ ..] => {
            let sfen = sfen.join(" ");
            sfen.parse()
                .map_err(|source| UsiError::InvalidSfen { sfen, source })?
        }
        _ => return Err(UsiError::MalformedPosition),
    };

    for usi_move in moves.iter().skip(1) {
        position.play_usi(usi_move)?;
    }

    Ok(Command::Position(position))
}

/// Parse the `go` command arguments.
///
/// Supports: btime, wtime, binc, winc, byoyomi, depth, infinite. Unknown
/// tokens are silently skipped.
fn parse_go(tokens: &[&str]) -> Result<Command, UsiError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        let value = tokens.get(i + 1);
        match tokens[i] {
            "btime" => params.clock.btime = Some(parse_millis(value, "btime")?),
            "wtime" => params.clock.wtime = Some(parse_millis(value, "wtime")?),
            "binc" => params.clock.binc = Some(parse_millis(value, "binc")?),
            "winc" => params.clock.winc = Some(parse_millis(value, "winc")?),
            "byoyomi" => params.clock.byoyomi = Some(parse_millis(value, "byoyomi")?),
            "depth" => params.depth = Some(parse_value(value, "depth")?),
            "infinite" => {
                params.infinite = true;
                i += 1;
                continue;
            }
            _ => {
                i += 1;
                continue;
            }
        }
        i += 2;
    }

    Ok(Command::Go(params))
}

/// Parse a millisecond value from a token.
fn parse_millis(token: Option<&&str>, param: &str) -> Result<Duration, UsiError> {
    let ms: u64 = parse_value(token, param)?;
    Ok(Duration::from_millis(ms))
}

/// Parse a value from a token.
fn parse_value<T: std::str::FromStr>(token: Option<&&str>, param: &str) -> Result<T, UsiError> {
    let value = token.ok_or_else(|| UsiError::MissingValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UsiError::InvalidValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use kaku_core::Color;

    use super::*;

    #[test]
    fn parse_simple_commands() {
        assert!(matches!(parse_command("usi").unwrap(), Command::Usi));
        assert!(matches!(parse_command("isready").unwrap(), Command::IsReady));
        assert!(matches!(parse_command("usinewgame").unwrap(), Command::UsiNewGame));
        assert!(matches!(parse_command("stop").unwrap(), Command::Stop));
        assert!(matches!(parse_command("gameover win").unwrap(), Command::GameOver));
        assert!(matches!(parse_command("quit").unwrap(), Command::Quit));
    }

    #[test]
    fn parse_position_startpos() {
        match parse_command("position startpos").unwrap() {
            Command::Position(pos) => assert_eq!(pos.hash(), Position::starting_position().hash()),
            _ => panic!("expected Position"),
        }
    }

    #[test]
    fn parse_position_startpos_with_moves() {
        match parse_command("position startpos moves 1e1b 2a1b").unwrap() {
            Command::Position(pos) => {
                assert_eq!(pos.turn(), Color::Black);
                assert_eq!(pos.move_number(), 3);
            }
            _ => panic!("expected Position"),
        }
    }

    #[test]
    fn parse_position_sfen() {
        match parse_command("position sfen 4k/5/3P1/5/K4 b G 1 moves G*2b").unwrap() {
            Command::Position(pos) => assert_eq!(pos.turn(), Color::White),
            _ => panic!("expected Position"),
        }
    }

    #[test]
    fn parse_position_sfen_without_move_number() {
        assert!(matches!(
            parse_command("position sfen 4k/5/3P1/5/K4 b G").unwrap(),
            Command::Position(_)
        ));
    }

    #[test]
    fn parse_position_errors() {
        assert!(matches!(parse_command("position"), Err(UsiError::MalformedPosition)));
        assert!(matches!(
            parse_command("position sfen invalid"),
            Err(UsiError::InvalidSfen { .. })
        ));
        assert!(matches!(
            parse_command("position startpos moves 5e5d"),
            Err(UsiError::InvalidMove { .. })
        ));
    }

    #[test]
    fn parse_go_depth() {
        match parse_command("go depth 6").unwrap() {
            Command::Go(params) => assert_eq!(params.depth, Some(6)),
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_go_bare_defaults() {
        match parse_command("go").unwrap() {
            Command::Go(params) => assert_eq!(params, GoParams::default()),
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_go_clock() {
        match parse_command("go btime 60000 wtime 50000 binc 1000 winc 2000 byoyomi 3000").unwrap() {
            Command::Go(params) => {
                assert_eq!(params.clock.btime, Some(Duration::from_millis(60000)));
                assert_eq!(params.clock.wtime, Some(Duration::from_millis(50000)));
                assert_eq!(params.clock.binc, Some(Duration::from_millis(1000)));
                assert_eq!(params.clock.winc, Some(Duration::from_millis(2000)));
                assert_eq!(params.clock.byoyomi, Some(Duration::from_millis(3000)));
                assert!(!params.infinite);
            }
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_go_infinite() {
        match parse_command("go infinite").unwrap() {
            Command::Go(params) => assert!(params.infinite),
            _ => panic!("expected Go"),
        }
    }

    #[test]
    fn parse_go_bad_values() {
        assert!(matches!(parse_command("go btime"), Err(UsiError::MissingValue { .. })));
        assert!(matches!(parse_command("go depth abc"), Err(UsiError::InvalidValue { .. })));
    }

    #[test]
    fn parse_setoption() {
        assert!(matches!(
            parse_command("setoption name USI_Hash value 64").unwrap(),
            Command::SetOption(UsiOption::Hash(64))
        ));
        assert!(matches!(
            parse_command("setoption name MaxDepth value 12").unwrap(),
            Command::SetOption(UsiOption::MaxDepth(12))
        ));
        assert!(matches!(
            parse_command("setoption name Bogus value 1"),
            Err(UsiError::UnknownOption { .. })
        ));
        assert!(matches!(
            parse_command("setoption name USI_Hash"),
            Err(UsiError::MissingValue { .. })
        ));
    }

    #[test]
    fn parse_unknown_and_empty() {
        assert!(matches!(parse_command("foobar").unwrap(), Command::Unknown(_)));
        assert!(matches!(parse_command("").unwrap(), Command::Unknown(_)));
    }
}
