//! Line-oriented shell over a session.
//!
//! Reads one command per line from stdin. Works both interactively and with
//! piped scripts; prompts are only shown on a terminal.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::UnboundedReceiver;

use stagefile_core::{DirectoryListing, EntryKind, FileStore, OnConflict};
use stagefile_ops::{
    fixed_policy, Conflict, ConflictPolicy, OperationComplete, OperationKind, OpsError,
    PendingOperation, Session, SessionEvent, SessionHandle,
};

const HELP: &str = "\
Commands:
  ls                 Show the current directory
  pwd                Print the current directory
  cd <path>          Enter a directory
  up                 Go to the parent directory
  sel <name>         Select an entry
  unsel <name>       Deselect an entry
  clear              Clear the selection
  copy | move        Mark the selection for copy or move
  paste              Copy or move the marked items here
  pending            Show the marked items
  rename <name>      Rename the selected item (a path moves it)
  rm                 Delete the selected items
  mkdir <name>       Create a directory
  import <file>      Copy a host file into the current directory
  export <dest>      Write the selected file to a host path
  help               Show this help
  quit               Leave";

/// Asks on the terminal before overwriting.
struct PromptPolicy;

impl ConflictPolicy for PromptPolicy {
    fn should_overwrite(&mut self, conflict: &Conflict) -> bool {
        eprint!(
            "{} '{}'. Overwrite? [y/N] ",
            conflict.kind,
            conflict.destination_name()
        );
        let _ = io::stderr().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

pub struct Shell<S> {
    handle: SessionHandle<S>,
    runtime: Runtime,
    events: UnboundedReceiver<SessionEvent>,
    on_conflict: OnConflict,
    interactive: bool,
}

impl<S: FileStore + Send + 'static> Shell<S> {
    pub fn new(session: Session<S>, runtime: Runtime, on_conflict: OnConflict) -> Result<Self> {
        let handle = SessionHandle::new(session);
        let events = handle.subscribe()?;
        Ok(Self {
            handle,
            runtime,
            events,
            on_conflict,
            interactive: io::stdin().is_terminal(),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        if self.interactive {
            eprintln!("stagefile - type 'help' for commands");
        }
        self.show_listing();
        self.drain_events();

        let stdin = io::stdin();
        loop {
            if self.interactive {
                let dir = self.handle.read(|s| s.current_dir().to_string())?;
                eprint!("{dir}> ");
                io::stderr().flush()?;
            }

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (command, arg) = match line.split_once(char::is_whitespace) {
                Some((command, arg)) => (command, arg.trim()),
                None => (line, ""),
            };
            if matches!(command, "quit" | "exit" | "q") {
                break;
            }

            if let Err(err) = self.dispatch(command, arg) {
                eprintln!("error: {err:#}");
            }
            self.drain_events();
        }
        Ok(())
    }

    fn dispatch(&self, command: &str, arg: &str) -> Result<()> {
        match command {
            "ls" => self.show_listing(),
            "pwd" => println!("{}", self.handle.read(|s| s.current_dir().to_string())?),
            "cd" => {
                let target = if arg.is_empty() { "/" } else { arg };
                self.block_on(self.handle.navigate(target))?;
                self.show_listing();
            }
            "up" => {
                self.block_on(self.handle.go_up())?;
                self.show_listing();
            }
            "sel" | "unsel" => {
                let included = command == "sel";
                let path = self.handle.read(|s| stagefile_core::path::join(s.current_dir(), arg))?;
                self.block_on(self.handle.toggle_select(path, included))?;
                self.show_selection()?;
            }
            "clear" => {
                self.block_on(self.handle.run(|s| {
                    s.clear_selection();
                    Ok(())
                }))?;
            }
            "copy" | "move" => {
                let kind = if command == "copy" {
                    OperationKind::Copy
                } else {
                    OperationKind::Move
                };
                let count = self.block_on(self.handle.mark(kind))?;
                println!("Marked {count} item(s) to {kind}");
            }
            "paste" | "commit" => {
                let report = self.block_on(self.handle.commit_pending(self.policy()))?;
                print_report(&report);
                self.show_listing();
            }
            "pending" => {
                let pending = self.handle.read(|s| s.pending().clone())?;
                print_pending(&pending);
            }
            "rename" => {
                let report = self.block_on(self.handle.rename(arg, self.policy()))?;
                print_report(&report);
                self.show_listing();
            }
            "rm" => {
                let report = self.block_on(self.handle.delete())?;
                print_report(&report);
                self.show_listing();
            }
            "mkdir" => {
                let path = self.block_on(self.handle.mkdir(arg))?;
                println!("Created {path}");
            }
            "import" => {
                let host = Path::new(arg);
                let data = std::fs::read(host)
                    .with_context(|| format!("Cannot read {}", host.display()))?;
                let path = self.block_on(self.handle.import_bytes(arg, data))?;
                println!("Imported {path}");
            }
            "export" => {
                let file = self.block_on(self.handle.export_selected())?;
                let mut dest = Path::new(if arg.is_empty() { "." } else { arg }).to_path_buf();
                if dest.is_dir() {
                    dest.push(&file.name);
                }
                std::fs::write(&dest, &file.data)
                    .with_context(|| format!("Cannot write {}", dest.display()))?;
                println!("Exported {} ({})", dest.display(), format_size(file.data.len() as u64));
            }
            "help" | "?" => println!("{HELP}"),
            other => eprintln!("Unknown command '{other}'. Type 'help' for commands."),
        }
        Ok(())
    }

    fn block_on<T>(
        &self,
        future: impl std::future::Future<Output = Result<T, OpsError>>,
    ) -> Result<T, OpsError> {
        self.runtime.block_on(future)
    }

    fn policy(&self) -> Box<dyn ConflictPolicy + Send> {
        match fixed_policy(self.on_conflict) {
            Some(policy) => policy,
            None if self.interactive => Box::new(PromptPolicy),
            None => {
                tracing::warn!("no terminal to ask on; conflicting items will be skipped");
                Box::new(stagefile_ops::NeverOverwrite)
            }
        }
    }

    fn show_listing(&self) {
        match self.handle.read(|s| s.listing().clone()) {
            Ok(listing) => print_listing(&listing),
            Err(err) => eprintln!("error: {err}"),
        }
    }

    fn show_selection(&self) -> Result<()> {
        let selected = self.handle.read(|s| s.selection().snapshot())?;
        println!("{} selected", selected.len());
        Ok(())
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                SessionEvent::ItemFailed(error) => eprintln!("  failed: {error}"),
                SessionEvent::ItemSkipped { path, reason } => eprintln!("  skipped: {path}: {reason}"),
                SessionEvent::PendingDiscarded { count } => {
                    eprintln!("  note: discarded {count} previously marked item(s)")
                }
                SessionEvent::Progress(progress) => {
                    if let Some(item) = &progress.current_item {
                        tracing::debug!(
                            "{} {}/{}: {item}",
                            progress.operation_type,
                            progress.items_completed + 1,
                            progress.items_total
                        );
                    }
                }
                SessionEvent::ListingChanged(_) | SessionEvent::PendingChanged(_) => {}
            }
        }
    }
}

/// Print a listing with directories marked by a trailing slash.
pub fn print_listing(listing: &DirectoryListing) {
    println!("{}", listing.directory);
    if listing.is_empty() {
        println!("  (empty)");
        return;
    }
    for entry in listing {
        match entry.kind {
            EntryKind::Directory => println!("  {:>10}  {}/", "", entry.name),
            EntryKind::File => println!("  {:>10}  {}", format_size(entry.size), entry.name),
            EntryKind::Inaccessible => println!("  {:>10}  {}", "?", entry.name),
        }
    }
}

fn print_pending(pending: &PendingOperation) {
    match pending.kind() {
        None => println!("Nothing marked"),
        Some(kind) => {
            println!("{} item(s) marked to {kind}:", pending.len());
            for item in pending.items() {
                println!("  {item}");
            }
        }
    }
}

fn print_report(report: &OperationComplete) {
    let mut line = report.summary();
    if report.bytes_processed > 0 {
        line.push_str(&format!(" ({})", format_size(report.bytes_processed)));
    }
    println!("{line}");
}

fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
