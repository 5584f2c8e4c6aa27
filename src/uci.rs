use crate::engine::{Engine, EngineConfig};
use crate::error::EngineError;
use crate::move_generator::PromotionMode;
use crate::opening_book::OpeningBook;
use crate::piece::Color;
use crate::r#move::Move;
use crate::search::{SearchLimits, SearchReport};

use regex::Regex;
use rustyline::config::Configurer;
use rustyline::Editor;
use std::collections::HashMap;
use std::fmt::{Display, Error, Formatter};
use std::time::Duration;
use tracing::{debug, warn};

pub struct UCI {
    engine: Engine,
    editor: Editor<()>,
    args_regex: Regex,
    options: HashMap<String, UCIOption>,
}

impl UCI {
    pub fn new() -> Result<UCI, regex::Error> {
        let mut editor = Editor::<()>::new();
        editor.set_auto_add_history(true);
        editor.set_check_cursor_position(true);
        let defaults = EngineConfig::default();
        let options = [
            UCIOption::IntValue {
                name: "MoveTime".to_string(),
                value: defaults.default_budget.as_millis() as i32,
                default: defaults.default_budget.as_millis() as i32,
                min: 10,
                max: 600_000,
            },
            UCIOption::IntValue {
                name: "BookWeight".to_string(),
                value: (defaults.book_weight * 100.0) as i32,
                default: (defaults.book_weight * 100.0) as i32,
                min: 0,
                max: 100,
            },
            UCIOption::StringChoice {
                name: "Promotions".to_string(),
                value: "QueenAndKnight".to_string(),
                default: "QueenAndKnight".to_string(),
                possible_values: vec!["All".to_string(), "QueenOnly".to_string(), "QueenAndKnight".to_string()],
            },
            UCIOption::StringValue {
                name: "BookFile".to_string(),
                value: String::new(),
                default: String::new(),
            },
            UCIOption::BoolValue {
                name: "LateMoveReduction".to_string(),
                value: defaults.search.late_move_reduction,
                default: defaults.search.late_move_reduction,
            },
            UCIOption::BoolValue {
                name: "Quiescence".to_string(),
                value: defaults.search.quiescence,
                default: defaults.search.quiescence,
            },
        ];
        Ok(UCI {
            engine: Engine::new(defaults),
            editor,
            args_regex: Regex::new(r#"(".*?"|[^"\s]+)"#)?,
            options: options.into_iter().map(|o| (o.name().to_string(), o)).collect(),
        })
    }

    pub fn run(&mut self) {
        while let Ok(line) = self.editor.readline("uci> ") {
            match self.handle_command(&line) {
                Ok(UCIOkCode::ShouldQuit) => break,
                Err(UCIErrCode::BadCommand(cmd)) => {
                    eprintln!("Unknown or badly formed UCI command: {}", cmd)
                }
                Err(UCIErrCode::BadMove(mv)) => {
                    eprintln!("Badly formatted or illegal move: {}", mv)
                }
                Err(UCIErrCode::BadPosition(e)) => eprintln!("Could not load position: {}", e),
                Err(UCIErrCode::MissingArg(arg)) => {
                    eprintln!("Missing an argument: {} {} <- here", line.trim(), arg)
                }
                _ => (),
            }
        }
    }

    fn handle_command(&mut self, line: &str) -> Result<UCIOkCode, UCIErrCode> {
        let mut args = self.args_regex.find_iter(line).map(|m| m.as_str().to_string());
        let cmd = if let Some(c) = args.next() {
            c
        } else {
            return Err(UCIErrCode::NoCommand);
        };
        debug!(command = %line.trim(), "received");
        match cmd.as_str() {
            "uci" => {
                Self::send(UCICommand::Id);
                self.options.values().for_each(|o| Self::send(UCICommand::UciOption(o)));
                Self::send(UCICommand::UciOk);
            }
            "isready" => Self::send(UCICommand::ReadyOk),
            "setoption" => {
                let args: Vec<String> = args.collect();
                let (name, value) = match args.as_slice() {
                    [n, name, v, value, ..] if n == "name" && v == "value" => (name, value),
                    [n, _] if n == "name" => return Err(UCIErrCode::MissingArg(String::from("value <value>"))),
                    _ => return Err(UCIErrCode::MissingArg(String::from("name <name>"))),
                };
                let name = name.replace('"', "");
                let value = value.replace('"', "");
                match self.options.get_mut(&name) {
                    Some(option) => option.set_value(&value),
                    None => return Err(UCIErrCode::BadCommand(format!("setoption {}", name))),
                }
                self.apply_option(&name);
            }
            "ucinewgame" => self.engine.new_position(),
            "position" => {
                let args: Vec<String> = args.collect();
                let moves_at = args.iter().position(|a| a == "moves");
                let (setup, moves) = args.split_at(moves_at.unwrap_or(args.len()));
                match setup.first().map(String::as_str) {
                    Some("startpos") => self.engine.new_position(),
                    Some("fen") => self.load(&setup[1..].join(" "))?,
                    Some(fen) => self.load(&fen.replace('"', ""))?,
                    None => return Err(UCIErrCode::MissingArg(String::from("<startpos | fen>"))),
                }
                for mv in moves.iter().skip(1) {
                    if self.engine.make_move_text(mv).is_err() {
                        return Err(UCIErrCode::BadMove(mv.clone()));
                    }
                }
            }
            "go" => {
                let limits = self.parse_go_args(args);
                match self.engine.search(limits) {
                    Ok(report) => {
                        Self::send(UCICommand::Info(&report));
                        Self::send(UCICommand::BestMove(&report.best_move));
                    }
                    Err(e) => {
                        println!("info string {}", e);
                        Self::send(UCICommand::BestMove(&Move::NULL));
                    }
                }
            }
            // Searches are synchronous, there is never anything to stop
            "stop" | "ponderhit" | "debug" => (),
            // Commands that are not part of the UCI protocol
            "show" => println!("{}", self.engine.board()),
            "eval" => println!("{}", self.engine.evaluate()),
            "result" => println!("{}", self.engine.game_result()),
            "perft" => {
                let depth = args
                    .next()
                    .and_then(|d| d.parse::<u32>().ok())
                    .ok_or_else(|| UCIErrCode::MissingArg(String::from("<depth>")))?;
                crate::perft_report(depth, Some(self.engine.current_position_text()));
            }
            "quit" => return Ok(UCIOkCode::ShouldQuit),
            _ => return Err(UCIErrCode::BadCommand(cmd)),
        }

        Ok(UCIOkCode::OkCommand)
    }

    fn load(&mut self, fen: &str) -> Result<(), UCIErrCode> {
        self.engine.load_position(fen).map_err(UCIErrCode::BadPosition)
    }

    /// Pushes the current value of an option into the engine configuration
    fn apply_option(&mut self, name: &str) {
        let option = match self.options.get(name) {
            Some(o) => o,
            None => return,
        };
        let config = self.engine.config_mut();
        match option {
            UCIOption::IntValue { value, .. } if name == "MoveTime" => {
                config.set_default_budget(Duration::from_millis(*value as u64));
            }
            UCIOption::IntValue { value, .. } if name == "BookWeight" => {
                config.set_book_weight(*value as f64 / 100.0);
            }
            UCIOption::StringChoice { value, .. } if name == "Promotions" => {
                config.search.set_promotions(match value.as_str() {
                    "All" => PromotionMode::All,
                    "QueenOnly" => PromotionMode::QueenOnly,
                    _ => PromotionMode::QueenAndKnight,
                });
            }
            UCIOption::BoolValue { value, .. } if name == "LateMoveReduction" => {
                config.search.set_late_move_reduction(*value);
            }
            UCIOption::BoolValue { value, .. } if name == "Quiescence" => {
                config.search.set_quiescence(*value);
            }
            UCIOption::StringValue { value, .. } if name == "BookFile" => {
                if value.is_empty() {
                    self.engine.clear_book();
                    return;
                }
                match OpeningBook::load(value) {
                    Ok(book) => self.engine.set_book(book),
                    Err(e) => warn!("{}", e),
                }
            }
            _ => (),
        }
    }

    pub fn send(command: UCICommand) {
        match command {
            UCICommand::Id => println!(
                "id name corvid {}\nid author {}",
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_AUTHORS")
            ),
            UCICommand::UciOk => println!("uciok"),
            UCICommand::ReadyOk => println!("readyok"),
            UCICommand::BestMove(mv) => println!("bestmove {}", mv),
            UCICommand::Info(report) => println!("info {}", report),
            UCICommand::UciOption(option) => println!("option {}", option),
        }
    }

    fn parse_go_args<I: Iterator<Item = String>>(&self, args: I) -> SearchLimits {
        let valid_args = [
            "wtime", "btime", "winc", "binc", "movestogo", "depth", "movetime", "infinite",
        ];

        let mut arg_value_map: HashMap<String, String> = HashMap::new();
        let mut current_arg = String::new();
        let mut current_value = String::new();
        for word in args {
            if valid_args.contains(&word.as_str()) {
                arg_value_map.insert(current_arg, String::from(current_value.trim()));
                current_arg = word;
                current_value = String::new();
            } else {
                current_value.push_str(&word);
                current_value.push(' ');
            }
        }
        arg_value_map.insert(current_arg, String::from(current_value.trim()));

        let millis = |key: &str| {
            arg_value_map
                .get(key)
                .and_then(|d| d.parse::<u64>().ok())
                .map(Duration::from_millis)
        };
        let time = if arg_value_map.contains_key("movetime") {
            millis("movetime")
        } else {
            let (clock, increment) = if self.engine.board().side_to_move() == Color::White {
                (millis("wtime"), millis("winc"))
            } else {
                (millis("btime"), millis("binc"))
            };
            clock.map(|c| movetime_from_clock(c, increment))
        };

        SearchLimits {
            time,
            depth: arg_value_map.get("depth").and_then(|d| d.parse::<u32>().ok()),
        }
    }
}

/// Spends a fiftieth of the remaining clock plus half the increment
fn movetime_from_clock(clock: Duration, increment: Option<Duration>) -> Duration {
    let movetime = clock / 50 + increment.map_or(Duration::ZERO, |inc| inc / 2);
    movetime.min(clock)
}

#[derive(Debug, PartialEq, Eq)]
enum UCIOkCode {
    OkCommand,
    ShouldQuit,
}

#[derive(Debug)]
enum UCIErrCode {
    MissingArg(String),
    NoCommand,
    BadCommand(String),
    BadMove(String),
    BadPosition(EngineError),
}

pub enum UCICommand<'a> {
    Id,
    UciOk,
    ReadyOk,
    BestMove(&'a Move),
    Info(&'a SearchReport),
    UciOption(&'a UCIOption),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UCIOption {
    BoolValue {
        name: String,
        value: bool,
        default: bool,
    },
    IntValue {
        name: String,
        value: i32,
        default: i32,
        min: i32,
        max: i32,
    },
    StringValue {
        name: String,
        value: String,
        default: String,
    },
    StringChoice {
        name: String,
        value: String,
        default: String,
        possible_values: Vec<String>,
    },
}
impl UCIOption {
    pub fn name(&self) -> &str {
        match self {
            Self::BoolValue { name, .. }
            | Self::IntValue { name, .. }
            | Self::StringValue { name, .. }
            | Self::StringChoice { name, .. } => name,
        }
    }

    pub fn set_value(&mut self, v: &str) {
        match self {
            Self::BoolValue { value, .. } => *value = v.parse::<bool>().unwrap_or(*value),
            Self::IntValue { value, min, max, .. } => {
                let parsed = v.parse::<i32>().unwrap_or(*value);
                *value = parsed.clamp(*min, *max)
            }
            Self::StringValue { value, .. } => *value = v.to_string(),
            Self::StringChoice {
                value,
                possible_values,
                ..
            } => {
                if let Some(set_to) = possible_values.iter().find(|x| x.as_str() == v) {
                    *value = set_to.to_string();
                }
            }
        }
    }
}
impl Display for UCIOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            Self::BoolValue { name, default, .. } => {
                write!(f, "name {} type check default {}", name, default)
            }
            Self::IntValue {
                name,
                default,
                min,
                max,
                ..
            } => write!(
                f,
                "name {} type spin default {} min {} max {}",
                name, default, min, max
            ),
            Self::StringValue { name, default, .. } => {
                write!(f, "name {} type string default {}", name, default)
            }
            Self::StringChoice {
                name,
                default,
                possible_values,
                ..
            } => write!(
                f,
                "name {} type combo default {}{}",
                name,
                default,
                possible_values
                    .iter()
                    .fold(String::new(), |acc, x| format!("{} var {}", acc, x))
            ),
        }
    }
}
