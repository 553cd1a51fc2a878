//! 交互式 Shell
//!
//! 保持串口连接和位置表，逐行执行点动、手势和动作命令。
//! 回放和演示动作在后台运行，Ctrl+C 或 `stop` 取消。

use crate::commands::gesture::resolve;
use crate::session::Session;
use crate::utils::{OutputFormat, hex, parse_actuator, parse_positions, print_statuses, ticks};
use anyhow::{Context, Result, bail};
use hand_sdk::prelude::{HandClient, JogDirection, JogMode, MotionTask, Position, Register};
use hand_sdk::protocol::clamp_positions;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;

const HISTORY_FILE: &str = ".hand_history";

/// Shell 会话
pub struct Shell {
    client: HandClient,
    gestures_path: PathBuf,
    task: Option<MotionTask>,
}

/// 一行命令的执行结果
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

impl Shell {
    /// 连接设备，启动时全部收回并加载手势文件
    pub fn open(session: &Session) -> Result<Self> {
        let mut client = session.client(true, true)?;
        let gestures_path = session.gestures_path().to_path_buf();
        if gestures_path.exists() {
            let loaded = client.load_gestures(&gestures_path)?;
            if loaded.truncated {
                println!("Only the first 10 gestures were loaded");
            }
        }
        Ok(Self {
            client,
            gestures_path,
            task: None,
        })
    }

    /// 当前是否有后台动作
    fn busy(&mut self) -> bool {
        if self.task.as_ref().is_some_and(|task| !task.is_finished()) {
            return true;
        }
        self.finish_task();
        false
    }

    fn finish_task(&mut self) {
        if let Some(task) = self.task.take() {
            let name = task.name().to_string();
            match task.join() {
                Ok(outcome) => println!("[{}] {:?}", name, outcome),
                Err(e) => eprintln!("[{}] failed: {}", name, e),
            }
        }
    }

    fn stop_task(&mut self) {
        if let Some(task) = &self.task {
            task.cancel();
        }
        self.finish_task();
    }

    fn start(&mut self, task: MotionTask) {
        self.stop_task();
        println!("[{}] started", task.name());
        self.task = Some(task);
    }

    fn execute(&mut self, line: &str) -> Result<Flow> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = parts.split_first() else {
            return Ok(Flow::Continue);
        };
        let actuators = self.client.actuators();

        match command {
            "exit" | "quit" => return Ok(Flow::Exit),

            "help" => print_help(),

            "status" => {
                let statuses = match self.client.telemetry() {
                    Some(telemetry) if telemetry.sweep > 0 => telemetry.actuators,
                    _ => self.client.driver().query_all(),
                };
                print_statuses(&statuses, OutputFormat::Table)?;
            },

            "table" => println!("{:?} ({} mode)", ticks(&actuators.snapshot()?), actuators.mode()),

            "mode" => {
                let mode = match args.first() {
                    Some(name) => {
                        let mode: JogMode = name.parse().map_err(anyhow::Error::msg)?;
                        actuators.set_mode(mode);
                        mode
                    },
                    None => actuators.toggle_mode(),
                };
                println!("Jog mode: {} (step {})", mode, mode.step());
            },

            "jog" | "+" | "-" => {
                let (id, direction) = match (command, args) {
                    ("+", [id]) => (*id, JogDirection::Extend),
                    ("-", [id]) => (*id, JogDirection::Retract),
                    ("jog", [id, "+"]) => (*id, JogDirection::Extend),
                    ("jog", [id, "-"]) => (*id, JogDirection::Retract),
                    _ => bail!("Usage: jog <id> <+|->"),
                };
                self.ensure_idle()?;
                let id = parse_actuator(id)?;
                let position = actuators.jog(id, direction)?;
                println!("Actuator {} -> {}", id, position);
            },

            "extend" => {
                self.ensure_idle()?;
                actuators.extend_all()?;
            },

            "retract" => {
                self.ensure_idle()?;
                actuators.retract_all()?;
            },

            "move" => {
                self.ensure_idle()?;
                let positions = clamp_positions(parse_positions(&args.join(" "))?);
                actuators.move_to(positions)?;
            },

            "set" => {
                let [id, value] = args else {
                    bail!("Usage: set <id> <position>");
                };
                self.ensure_idle()?;
                let id = parse_actuator(id)?;
                let value: i32 = value.parse().context("Invalid position")?;
                actuators.set_actuator(id, Position::clamped(value))?;
            },

            "read" => {
                let [id, register, rest @ ..] = args else {
                    bail!("Usage: read <id> <register> [count]");
                };
                let id = parse_actuator(id)?;
                let register: Register = register.parse()?;
                let count = match rest.first() {
                    Some(n) => n.parse().context("Invalid count")?,
                    None => 2,
                };
                let values = self.client.driver().read_register(id, register, count)?;
                println!("{} @ {}: {}", register, id, hex(&values));
            },

            "write" => {
                let [id, register, value] = args else {
                    bail!("Usage: write <id> <register> <value>");
                };
                let id = parse_actuator(id)?;
                let value: u16 = value.parse().context("Invalid value")?;
                self.client
                    .driver()
                    .write_position_by_name(id, register, value)?;
            },

            "list" => {
                for (i, gesture) in self.client.gestures().iter().enumerate() {
                    println!("{:>2}  {:<16} {:?}", i, gesture.name(), ticks(gesture.positions()));
                }
            },

            "capture" => {
                if args.is_empty() {
                    bail!("Usage: capture <name>");
                }
                let gesture = self.client.capture_gesture(args.join(" "))?;
                println!("Captured '{}'", gesture.name());
            },

            "rename" => {
                let [key, name @ ..] = args else {
                    bail!("Usage: rename <gesture> <name>");
                };
                let index = resolve(self.client.gestures(), key)?;
                self.client.gestures_mut().rename(index, name.join(" "))?;
            },

            "edit" => {
                if args.is_empty() {
                    bail!("Usage: edit <gesture>");
                }
                let index = resolve(self.client.gestures(), &args.join(" "))?;
                let snapshot = actuators.snapshot()?;
                self.client.gestures_mut().update(index, snapshot)?;
                println!("Updated '{}' to {:?}", args.join(" "), ticks(&snapshot));
            },

            "delete" => {
                if args.is_empty() {
                    bail!("Usage: delete <gesture>");
                }
                let index = resolve(self.client.gestures(), &args.join(" "))?;
                let removed = self.client.gestures_mut().remove(index)?;
                println!("Deleted '{}'", removed.name());
            },

            "play" => {
                if args.is_empty() {
                    bail!("Usage: play <gesture>");
                }
                let index = resolve(self.client.gestures(), &args.join(" "))?;
                let task = self.client.play_gesture(index)?;
                self.start(task);
            },

            "dance" => {
                let task = self.client.dance()?;
                self.start(task);
            },

            "stop" => self.stop_task(),

            "save" => {
                let path = args.first().map_or(self.gestures_path.clone(), PathBuf::from);
                self.client.save_gestures(&path)?;
                println!("Saved {} gestures to {}", self.client.gestures().len(), path.display());
            },

            "load" => {
                let path = args.first().map_or(self.gestures_path.clone(), PathBuf::from);
                let loaded = self.client.load_gestures(&path)?;
                println!(
                    "Loaded {} gestures{}",
                    loaded.gestures.len(),
                    if loaded.truncated { " (truncated to 10)" } else { "" }
                );
            },

            other => bail!("Unknown command '{}', type 'help'", other),
        }
        Ok(Flow::Continue)
    }

    fn ensure_idle(&mut self) -> Result<()> {
        if self.busy() {
            bail!("A motion is running; 'stop' it first");
        }
        Ok(())
    }

    /// 运行读取-执行循环
    pub fn run(mut self) -> Result<()> {
        let mut editor = DefaultEditor::new().context("Failed to initialize line editor")?;
        let _ = editor.load_history(HISTORY_FILE);

        println!("Hand CLI v{} - interactive shell", env!("CARGO_PKG_VERSION"));
        println!("Type 'help' for commands, 'exit' to quit");

        loop {
            match editor.readline("hand> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = editor.add_history_entry(line);
                    match self.execute(line) {
                        Ok(Flow::Exit) => break,
                        Ok(Flow::Continue) => {},
                        Err(e) => eprintln!("Error: {:#}", e),
                    }
                },
                Err(ReadlineError::Interrupted) => {
                    if self.task.is_some() {
                        self.stop_task();
                    } else {
                        println!("^C (type 'exit' to quit)");
                    }
                },
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    break;
                },
            }
        }

        let _ = editor.save_history(HISTORY_FILE);
        self.stop_task();
        self.client.shutdown();
        Ok(())
    }
}

fn print_help() {
    println!(
        "\
Commands:
  status                      actuator status
  table                       commanded positions and jog mode
  mode [normal|micro]         set or toggle the jog step
  jog <id> <+|->, + <id>, - <id>
  extend | retract            all actuators
  move <p1> .. <p5>           broadcast a full position table
  set <id> <pos>              change one actuator
  read <id> <register> [n]    read register bytes
  write <id> <register> <v>   write a position-type register
  list | capture <name> | rename <g> <name> | delete <g>
  edit <g>                    overwrite a gesture with the current table
  play <g> | dance | stop     background motions
  save [file] | load [file]   gesture file
  exit"
    );
}
