//! The interactive acbledger shell.
//!
//! Reads a command per line, dispatches through a static registry, and
//! lets each command do its own prompting for arguments. Nothing short of
//! the `exit` command leaves the loop; bad input of any kind re-prompts.
//!
//! # Usage
//!
//! ```bash
//! acbledger                 # start with an empty ledger
//! acbledger portfolio.txt   # preload a saved ledger
//! ```

use acbledger_core::{acb, amount, parse_date, Ledger, Transaction, TxnKind};
use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

use crate::report;

/// Interactive adjusted-cost-base (ACB) ledger.
#[derive(Parser, Debug)]
#[command(name = "acbledger")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Ledger file to load at startup
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Main entry point for the shell binary.
pub fn main() -> ExitCode {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .init();
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let ledger = match &args.file {
        Some(path) => {
            let ledger = Ledger::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::debug!(securities = ledger.len(), "loaded ledger");
            ledger
        }
        None => Ledger::new(),
    };

    let input = ReadlineInput::new()?;
    let mut shell = Shell::new(ledger, input, io::stdout());
    shell.run()
}

/// A source of user input lines.
///
/// The shell reads through this seam so tests can drive complete command
/// flows from a script instead of a terminal.
pub trait Input {
    /// Read one line, displaying `prompt`. `Ok(None)` means end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Called once when the shell loop finishes.
    fn close(&mut self) {}
}

/// Line editor with persistent history, for interactive use.
pub struct ReadlineInput {
    editor: DefaultEditor,
    history: Option<PathBuf>,
}

impl ReadlineInput {
    /// Create the editor and load any previous history.
    pub fn new() -> Result<Self> {
        let mut editor = DefaultEditor::new()?;
        let history = dirs::config_dir().map(|p| p.join("acbledger").join("history"));
        if let Some(path) = &history {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = editor.load_history(path);
        }
        Ok(Self { editor, history })
    }
}

impl Input for ReadlineInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(&line);
                }
                Ok(Some(line))
            }
            // Ctrl-C abandons the current line, not the shell.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn close(&mut self) {
        if let Some(path) = &self.history {
            let _ = self.editor.save_history(path);
        }
    }
}

/// Scripted input: yields each line in turn, then reports end of input.
/// Used by the integration tests to exercise whole command flows.
pub struct ScriptedInput {
    lines: std::vec::IntoIter<String>,
}

impl ScriptedInput {
    /// Build from anything yielding lines.
    pub fn new<S, T>(lines: T) -> Self
    where
        S: Into<String>,
        T: IntoIterator<Item = S>,
    {
        Self {
            lines: lines
                .into_iter()
                .map(Into::into)
                .collect::<Vec<_>>()
                .into_iter(),
        }
    }
}

impl Input for ScriptedInput {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        Ok(self.lines.next())
    }
}

enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, Clone, Copy)]
enum CommandKind {
    Acb,
    Exit,
    Help,
    List,
    Load,
    New,
    Save,
}

struct CommandSpec {
    name: &'static str,
    alias: Option<&'static str>,
    description: &'static str,
    kind: CommandKind,
}

/// Command registry, sorted by name. Dispatch is an exact, case-sensitive
/// match on the name or the single-letter alias.
const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "acb",
        alias: None,
        description: "Print adjusted cost base (ACB) for transactions.",
        kind: CommandKind::Acb,
    },
    CommandSpec {
        name: "exit",
        alias: Some("e"),
        description: "Exit the program.",
        kind: CommandKind::Exit,
    },
    CommandSpec {
        name: "help",
        alias: Some("?"),
        description: "Show valid commands.",
        kind: CommandKind::Help,
    },
    CommandSpec {
        name: "list",
        alias: Some("l"),
        description: "List all securities and transactions.",
        kind: CommandKind::List,
    },
    CommandSpec {
        name: "load",
        alias: None,
        description: "Load transactions from a dump file.",
        kind: CommandKind::Load,
    },
    CommandSpec {
        name: "new",
        alias: Some("n"),
        description: "Add a new transaction.",
        kind: CommandKind::New,
    },
    CommandSpec {
        name: "save",
        alias: Some("s"),
        description: "Save all transactions to a dump file.",
        kind: CommandKind::Save,
    },
];

/// The interactive shell: a ledger, an input source, and an output sink.
///
/// The ledger is constructed at startup and owned here; `load` replaces
/// it wholesale, nothing else ever swaps it out.
pub struct Shell<I, W> {
    ledger: Ledger,
    input: I,
    out: W,
}

impl<I: Input, W: Write> Shell<I, W> {
    /// Create a shell over a ledger.
    pub fn new(ledger: Ledger, input: I, out: W) -> Self {
        Self { ledger, input, out }
    }

    /// The ledger, for inspection after a scripted run.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The output sink, for inspection after a scripted run.
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Run the command loop until `exit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        writeln!(
            self.out,
            "Welcome to acbledger. Type ? for a list of commands."
        )?;
        loop {
            let Some(line) = self.input.read_line("> ")? else {
                break;
            };
            let name = line.trim();
            if name.is_empty() {
                continue;
            }
            let found = COMMANDS
                .iter()
                .find(|c| c.name == name || c.alias == Some(name));
            let Some(command) = found else {
                writeln!(self.out, "Invalid input {name:?}. Type ? for help.")?;
                continue;
            };
            match self.dispatch(command.kind)? {
                Flow::Continue => {}
                Flow::Exit => break,
            }
        }
        self.input.close();
        Ok(())
    }

    fn dispatch(&mut self, kind: CommandKind) -> Result<Flow> {
        match kind {
            CommandKind::Acb => self.cmd_acb(),
            CommandKind::Exit => self.cmd_exit(),
            CommandKind::Help => self.cmd_help(),
            CommandKind::List => self.cmd_list(),
            CommandKind::Load => self.cmd_load(),
            CommandKind::New => self.cmd_new(),
            CommandKind::Save => self.cmd_save(),
        }
    }

    fn prompt(&mut self, msg: &str) -> Result<Option<String>> {
        self.out.flush()?;
        self.input.read_line(msg)
    }

    /// Ask a yes/no question, re-asking until the answer is `y` or `n`.
    /// `Ok(None)` means the input ended mid-question.
    fn yes_no(&mut self, msg: &str) -> Result<Option<bool>> {
        loop {
            let Some(answer) = self.prompt(msg)? else {
                return Ok(None);
            };
            match answer.trim() {
                "y" => return Ok(Some(true)),
                "n" => return Ok(Some(false)),
                _ => writeln!(self.out, "Invalid action. Please try again.")?,
            }
        }
    }

    fn prompt_decimal(
        &mut self,
        msg: &str,
        parse: fn(&str) -> Option<Decimal>,
    ) -> Result<Option<Decimal>> {
        loop {
            let Some(raw) = self.prompt(msg)? else {
                return Ok(None);
            };
            match parse(&raw) {
                Some(value) => return Ok(Some(value)),
                None => writeln!(self.out, "Invalid number. Please try again.")?,
            }
        }
    }

    fn cmd_help(&mut self) -> Result<Flow> {
        for command in COMMANDS {
            let alias = command
                .alias
                .map(|a| format!(", {a}"))
                .unwrap_or_default();
            writeln!(
                self.out,
                "{}{}:\t{}",
                command.name, alias, command.description
            )?;
        }
        Ok(Flow::Continue)
    }

    fn cmd_new(&mut self) -> Result<Flow> {
        let Some(symbol) = self.prompt("Enter the security's symbol (e.g. BTC): ")? else {
            return Ok(Flow::Continue);
        };
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() || symbol.contains(',') {
            writeln!(self.out, "Invalid symbol {symbol:?}.")?;
            return Ok(Flow::Continue);
        }

        if !self.ledger.contains(&symbol) {
            let description = loop {
                let Some(raw) =
                    self.prompt("New security. Please enter a description (optional): ")?
                else {
                    return Ok(Flow::Continue);
                };
                let description = raw.trim().to_string();
                if description.contains(',') {
                    // The flat format cannot escape its delimiter.
                    writeln!(
                        self.out,
                        "Descriptions may not contain commas. Please try again."
                    )?;
                } else {
                    break description;
                }
            };
            if let Err(e) = self.ledger.add_security(&symbol, &description) {
                writeln!(self.out, "Error: {e}.")?;
                return Ok(Flow::Continue);
            }
        }

        let date = loop {
            let Some(raw) = self.prompt("Enter transaction date (MM-DD-YYYY): ")? else {
                return Ok(Flow::Continue);
            };
            match parse_date(&raw) {
                Ok(date) => break date,
                Err(e) => writeln!(self.out, "{e}. Please try again.")?,
            }
        };
        let kind = loop {
            let Some(raw) = self.prompt("Transaction type (buy/sell): ")? else {
                return Ok(Flow::Continue);
            };
            match raw.trim().parse::<TxnKind>() {
                Ok(kind) => break kind,
                Err(_) => writeln!(self.out, "Invalid action. Please try again.")?,
            }
        };
        let Some(quantity) = self.prompt_decimal("Enter quantity: ", amount::parse_positive)?
        else {
            return Ok(Flow::Continue);
        };
        let Some(price) = self.prompt_decimal(
            "Enter average price per share: ",
            amount::parse_non_negative,
        )?
        else {
            return Ok(Flow::Continue);
        };
        let fee = loop {
            let Some(raw) = self.prompt("Enter fees (default: 0): ")? else {
                return Ok(Flow::Continue);
            };
            if raw.trim().is_empty() {
                break Decimal::ZERO;
            }
            match amount::parse_non_negative(&raw) {
                Some(fee) => break fee,
                None => writeln!(self.out, "Invalid number. Please try again.")?,
            }
        };

        writeln!(
            self.out,
            "\nNew {symbol:?} transaction summary:\nDate: {}\nType: {kind}\nQuantity: {quantity}\nPrice per share: {price}\nFee: {fee}\n",
            date.format("%b %d, %Y")
        )?;

        match self.yes_no("Add transaction? (y/n): ")? {
            Some(true) => {
                let txn = Transaction::new(date, kind, quantity, price, fee)?;
                self.ledger.add_transaction(&symbol, txn)?;
                writeln!(self.out, "Updated {symbol} with transaction.")?;
            }
            Some(false) => writeln!(self.out, "Did not add new transaction.")?,
            None => {}
        }
        Ok(Flow::Continue)
    }

    fn cmd_acb(&mut self) -> Result<Flow> {
        if self.ledger.is_empty() {
            writeln!(self.out, "No securities entered yet.")?;
            return Ok(Flow::Continue);
        }

        let symbols: Vec<&str> = self.ledger.symbols().collect();
        let listing = symbols.join("\n");
        writeln!(self.out, "List of symbols:\n{listing}\n")?;

        let symbol = loop {
            let Some(raw) =
                self.prompt("Specify the symbol to calculate ACB for sell transactions: ")?
            else {
                return Ok(Flow::Continue);
            };
            let candidate = raw.trim().to_uppercase();
            if self.ledger.contains(&candidate) {
                break candidate;
            }
            writeln!(self.out, "{candidate} does not exist. Please try again.")?;
        };

        let report = {
            let Some(security) = self.ledger.get(&symbol) else {
                return Ok(Flow::Continue);
            };
            acb::compute(&security.sorted_transactions())
        };
        match report {
            Ok(report) => {
                writeln!(self.out, "ACB for {symbol}:")?;
                report::write_acb(&mut self.out, &report)?;
            }
            Err(e) => writeln!(self.out, "Error: {e}.")?,
        }
        Ok(Flow::Continue)
    }

    fn cmd_list(&mut self) -> Result<Flow> {
        if self.ledger.is_empty() {
            writeln!(self.out, "No securities entered yet.")?;
        } else {
            writeln!(self.out, "List of all securities and transactions:")?;
            report::write_listing(&mut self.out, &self.ledger)?;
        }
        Ok(Flow::Continue)
    }

    fn cmd_load(&mut self) -> Result<Flow> {
        let path = loop {
            let Some(raw) = self.prompt("File to load from: ")? else {
                return Ok(Flow::Continue);
            };
            let path = PathBuf::from(raw.trim());
            if path.exists() {
                break path;
            }
            writeln!(
                self.out,
                "File {} does not exist. Please try again.",
                path.display()
            )?;
        };

        let question = format!(
            "Loading from {} will erase all current data. Are you sure? (y/n): ",
            path.display()
        );
        if self.yes_no(&question)? != Some(true) {
            return Ok(Flow::Continue);
        }

        match Ledger::load(&path) {
            Ok(ledger) => {
                tracing::debug!(securities = ledger.len(), path = %path.display(), "reloaded ledger");
                self.ledger = ledger;
                writeln!(self.out, "Load from {} complete.", path.display())?;
                self.cmd_list()
            }
            Err(e) => {
                writeln!(self.out, "Error: {e}.")?;
                Ok(Flow::Continue)
            }
        }
    }

    fn cmd_save(&mut self) -> Result<Flow> {
        self.save_flow()?;
        Ok(Flow::Continue)
    }

    /// Prompt for a target path and write the ledger there. Overwriting
    /// an existing file needs explicit consent; declining re-prompts for
    /// a different path.
    fn save_flow(&mut self) -> Result<()> {
        let path = loop {
            let Some(raw) = self.prompt("File to save to: ")? else {
                return Ok(());
            };
            let path = PathBuf::from(raw.trim());
            if !path.exists() {
                break path;
            }
            writeln!(self.out, "File {} already exists.", path.display())?;
            match self.yes_no("Overwrite? (y/n): ")? {
                Some(true) => break path,
                Some(false) => {}
                None => return Ok(()),
            }
        };
        match self.ledger.save(&path) {
            Ok(()) => writeln!(self.out, "Save to {} successful.", path.display())?,
            Err(e) => writeln!(self.out, "Error: {e}.")?,
        }
        Ok(())
    }

    fn cmd_exit(&mut self) -> Result<Flow> {
        if self.yes_no("Save before exiting? (y/n): ")? == Some(true) {
            self.save_flow()?;
        }
        Ok(Flow::Exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_script(ledger: Ledger, lines: &[&str]) -> (Ledger, String) {
        let mut shell = Shell::new(
            ledger,
            ScriptedInput::new(lines.iter().copied()),
            Vec::new(),
        );
        shell.run().unwrap();
        let Shell { ledger, out, .. } = shell;
        (ledger, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_unknown_command_reprompts() {
        let (_, out) = run_script(Ledger::new(), &["frobnicate", "x"]);
        assert!(out.contains("Invalid input \"frobnicate\". Type ? for help."));
        assert!(out.contains("Invalid input \"x\"."));
    }

    #[test]
    fn test_help_lists_every_command() {
        let (_, out) = run_script(Ledger::new(), &["?"]);
        for name in ["acb", "exit", "help", "list", "load", "new", "save"] {
            assert!(out.contains(name), "missing {name} in {out}");
        }
    }

    #[test]
    fn test_acb_on_empty_ledger_returns_to_prompt() {
        let (_, out) = run_script(Ledger::new(), &["acb", "list"]);
        assert!(out.contains("No securities entered yet."));
    }

    #[test]
    fn test_dispatch_is_case_sensitive_exact_match() {
        let (_, out) = run_script(Ledger::new(), &["HELP", "hel"]);
        assert!(out.contains("Invalid input \"HELP\"."));
        assert!(out.contains("Invalid input \"hel\"."));
    }

    #[test]
    fn test_new_builds_the_transaction() {
        let script = [
            "n",
            "btc",
            "Bitcoin",
            "01-01-2020",
            "buy",
            "10",
            "100",
            "5",
            "y",
        ];
        let (ledger, out) = run_script(Ledger::new(), &script);
        assert!(out.contains("Updated BTC with transaction."));
        let sec = ledger.get("BTC").unwrap();
        assert_eq!(sec.description(), "Bitcoin");
        assert_eq!(sec.transactions().len(), 1);
    }

    #[test]
    fn test_new_reprompts_on_bad_input_and_can_decline() {
        let script = [
            "new", "BTC", "coin", "soon", "01-01-2020", "hold", "buy", "-3", "10", "100", "", "n",
        ];
        let (ledger, out) = run_script(Ledger::new(), &script);
        assert!(out.contains("Please try again."));
        assert!(out.contains("Did not add new transaction."));
        // The security was created, but no transaction was added.
        assert!(ledger.contains("BTC"));
        assert_eq!(ledger.get("BTC").unwrap().transactions().len(), 0);
    }

    #[test]
    fn test_yes_no_reprompts_until_answered() {
        let script = ["e", "maybe", "yes", "n"];
        let (_, out) = run_script(Ledger::new(), &script);
        assert!(out.matches("Invalid action. Please try again.").count() >= 2);
    }
}
