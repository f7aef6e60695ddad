//! Interactive REPL for the Ember language.
//!
//! Every line runs in the same VM, so globals persist until `:reset`.

use std::fs;
use std::path::{Path, PathBuf};

use ember_vm::VM;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::colors::{bold, cyan, gray, green, red};
use crate::config::{home_dir, EmberConfig};

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Quit,
    Help,
    Globals,
    Reset,
}

#[derive(Debug, PartialEq, Eq)]
enum ParsedCommand {
    NotACommand,
    UnknownCommand,
    Command(ReplCommand),
}

fn parse_repl_command(line: &str) -> ParsedCommand {
    let trimmed = line.trim();
    if !trimmed.starts_with(':') {
        return ParsedCommand::NotACommand;
    }
    match trimmed {
        ":quit" | ":q" => ParsedCommand::Command(ReplCommand::Quit),
        ":help" | ":h" => ParsedCommand::Command(ReplCommand::Help),
        ":globals" | ":g" => ParsedCommand::Command(ReplCommand::Globals),
        ":reset" | ":r" => ParsedCommand::Command(ReplCommand::Reset),
        _ => ParsedCommand::UnknownCommand,
    }
}

pub fn run_repl(config: &EmberConfig) -> Result<(), ReadlineError> {
    println!("{}", bold(&cyan(&format!("Ember REPL v{}", env!("CARGO_PKG_VERSION")))));
    println!("{}\n", gray("Type :help for available commands, :quit to exit."));

    let rl_config = rustyline::Config::builder().auto_add_history(true).build();
    let mut rl = DefaultEditor::with_config(rl_config)?;

    let history_path = resolve_history_path(home_dir().as_deref(), config.repl.history_file.as_deref());
    if let Some(ref path) = history_path {
        if path.exists() {
            if let Err(err) = rl.load_history(path) {
                eprintln!(
                    "{} failed to load history from {}: {}",
                    red("Warning:"),
                    path.display(),
                    err
                );
            }
        }
    }

    let mut vm = VM::new(config.vm_config());
    let prompt = format!("{} ", green(&config.repl.prompt));

    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                match parse_repl_command(&line) {
                    ParsedCommand::NotACommand => {
                        // Errors are already reported by the VM.
                        let _ = vm.interpret(&line);
                    }
                    ParsedCommand::UnknownCommand => {
                        eprintln!("{} unknown command. Type :help for usage.", red("Error:"));
                    }
                    ParsedCommand::Command(ReplCommand::Quit) => break,
                    ParsedCommand::Command(ReplCommand::Help) => print_help(),
                    ParsedCommand::Command(ReplCommand::Globals) => {
                        let listing = render_globals(&vm);
                        if listing.is_empty() {
                            println!("{}", gray("(no globals defined)"));
                        } else {
                            for entry in listing {
                                println!("{}", entry);
                            }
                        }
                    }
                    ParsedCommand::Command(ReplCommand::Reset) => {
                        vm.teardown();
                        println!("{}", gray("Session state reset."));
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", gray("(Ctrl-C to exit)"));
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{} {:?}", red("Error:"), err);
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                eprintln!(
                    "{} failed to create history directory {}: {}",
                    red("Warning:"),
                    parent.display(),
                    err
                );
            }
        }
        if let Err(err) = rl.save_history(path) {
            eprintln!(
                "{} failed to save history to {}: {}",
                red("Warning:"),
                path.display(),
                err
            );
        }
    }

    println!("\n{}", cyan("Goodbye!"));
    Ok(())
}

/// `name = value` lines for every global, sorted by name.
fn render_globals(vm: &VM) -> Vec<String> {
    let heap = vm.heap();
    let mut entries: Vec<(String, String)> = vm
        .globals()
        .iter()
        .map(|(name, value)| {
            let name = heap
                .resolve(name)
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| format!("<string #{}>", name.index()));
            (name, value.display(heap).to_string())
        })
        .collect();
    entries.sort();
    entries
        .into_iter()
        .map(|(name, value)| format!("{} = {}", name, value))
        .collect()
}

/// Resolve the path to the history file.
///
/// Rules:
/// - configured absolute path: use as-is.
/// - configured `~/...` or relative path: resolve under HOME.
/// - otherwise: `${HOME}/.ember/repl_history`.
fn resolve_history_path(home: Option<&Path>, configured: Option<&str>) -> Option<PathBuf> {
    let home_path = || home.map(Path::to_path_buf);

    let Some(raw) = configured.map(str::trim).filter(|value| !value.is_empty()) else {
        let mut path = home_path()?;
        path.push(".ember");
        path.push("repl_history");
        return Some(path);
    };

    if raw == "~" {
        return home_path();
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        let mut path = home_path()?;
        path.push(rest);
        return Some(path);
    }
    let path = PathBuf::from(raw);
    if path.is_relative() {
        let mut base = home_path()?;
        base.push(path);
        return Some(base);
    }
    Some(path)
}

fn print_help() {
    println!("{}", bold("Commands:"));
    println!("  {}   exit the REPL", cyan(":quit"));
    println!("  {}   show this help", cyan(":help"));
    println!("  {} list defined globals", cyan(":globals"));
    println!("  {}  forget all globals and strings", cyan(":reset"));
    println!();
    println!("{}", bold("Examples:"));
    println!("  {}", gray("var x = 40;"));
    println!("  {}", gray("print x + 2;"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repl_command() {
        assert_eq!(
            parse_repl_command(":quit"),
            ParsedCommand::Command(ReplCommand::Quit)
        );
        assert_eq!(
            parse_repl_command("  :g  "),
            ParsedCommand::Command(ReplCommand::Globals)
        );
        assert_eq!(
            parse_repl_command(":r"),
            ParsedCommand::Command(ReplCommand::Reset)
        );
        assert_eq!(parse_repl_command(":nope"), ParsedCommand::UnknownCommand);
        assert_eq!(parse_repl_command("print 1;"), ParsedCommand::NotACommand);
    }

    #[test]
    fn test_resolve_history_path() {
        let home = Path::new("/home/tester");

        assert_eq!(
            resolve_history_path(Some(home), None),
            Some(PathBuf::from("/home/tester/.ember/repl_history"))
        );
        assert_eq!(
            resolve_history_path(Some(home), Some("repl/history.log")),
            Some(PathBuf::from("/home/tester/repl/history.log"))
        );
        assert_eq!(
            resolve_history_path(Some(home), Some("~/logs/repl.log")),
            Some(PathBuf::from("/home/tester/logs/repl.log"))
        );
        assert_eq!(
            resolve_history_path(Some(home), Some("/tmp/repl.log")),
            Some(PathBuf::from("/tmp/repl.log"))
        );
        assert_eq!(resolve_history_path(None, Some("relative.log")), None);
        assert_eq!(resolve_history_path(None, None), None);
    }

    #[test]
    fn test_render_globals_is_sorted() {
        let mut vm = VM::default()
            .with_output(Box::new(std::io::sink()), Box::new(std::io::sink()));
        let _ = vm.interpret("var zeta = 1; var alpha = \"a\" + \"b\"; var mid = 2.5;");
        assert_eq!(
            render_globals(&vm),
            vec!["alpha = ab", "mid = 2.5", "zeta = 1"]
        );
        vm.teardown();
        assert!(render_globals(&vm).is_empty());
    }
}
