//! Interactive command loop over a tree and a caller-owned cache pool.

use super::commands::{Command, MANUAL};
use super::render::{render_ids, render_tree, CLEAR_SCREEN};
use super::settings::ShellSettings;
use anyhow::Result;
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use subcache::{CacheHandle, RandomTreeBuilder, Tree};
use tracing::{info, warn};

/// Whitespace-separated tokens read lazily from a line-oriented input.
struct Tokens<R> {
    input: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> Tokens<R> {
    fn new(input: R) -> Self {
        Self {
            input,
            pending: VecDeque::new(),
        }
    }

    /// Returns the next token, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending.extend(line.split_whitespace().map(String::from));
        }
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Shell state: the tree, the caches the shell owns, and the generator.
pub struct Session<W> {
    tree: Tree,
    /// Caches attached through the shell. The tree only holds weak
    /// references, so this pool keeps them alive.
    pool: Vec<CacheHandle>,
    builder: RandomTreeBuilder,
    clear_screen: bool,
    out: W,
}

impl<W: Write> Session<W> {
    /// Creates a session with a freshly generated tree.
    pub fn new(settings: &ShellSettings, out: W) -> Self {
        let mut builder = match settings.seed {
            Some(seed) => RandomTreeBuilder::with_seed(seed),
            None => RandomTreeBuilder::from_entropy(),
        };
        let mut tree = Tree::new();
        builder.populate(&mut tree, settings.initial_nodes);

        Self {
            tree,
            pool: Vec::new(),
            builder,
            clear_screen: settings.clear_screen,
            out,
        }
    }

    /// Reads commands until `Q` or end of input.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        let mut tokens = Tokens::new(input);
        self.print_tree()?;
        write!(self.out, "{}", *MANUAL)?;

        loop {
            write!(self.out, ":")?;
            self.out.flush()?;

            let Some(token) = tokens.next_token()? else {
                break;
            };
            let Some(command) = Command::parse(&token) else {
                writeln!(self.out, "Unknown command: {} (H for help)", token)?;
                continue;
            };

            let argument = match command.prompt() {
                Some(prompt) => {
                    writeln!(self.out, "{}", prompt)?;
                    match tokens.next_token()? {
                        Some(argument) => Some(argument),
                        None => break,
                    }
                }
                None => None,
            };

            if let Flow::Quit = self.execute(command, argument.as_deref())? {
                break;
            }
        }

        info!(nodes = self.tree.len(), caches = self.pool.len(), "shell finished");
        Ok(())
    }

    fn execute(&mut self, command: Command, argument: Option<&str>) -> Result<Flow> {
        match command {
            Command::Print => self.print_tree()?,
            Command::Collect => self.collect()?,
            Command::Insert => {
                if let Some(parent) = self.parse_argument::<i64>(argument)? {
                    self.tree.insert_node(parent);
                    self.print_tree()?;
                    writeln!(self.out, "finish inserting node")?;
                }
            }
            Command::Attach => {
                if let Some(node) = self.parse_argument::<i64>(argument)? {
                    self.attach(node)?;
                }
            }
            Command::Detach => {
                if let Some(node) = self.parse_argument::<i64>(argument)? {
                    self.detach(node)?;
                }
            }
            Command::Reset => {
                if let Some(count) = self.parse_argument::<usize>(argument)? {
                    self.builder.populate(&mut self.tree, count);
                    // The reset released every cache; nothing references them now
                    self.pool.clear();
                    self.print_tree()?;
                }
            }
            Command::Json => {
                let json = self.tree.snapshot().to_json_pretty()?;
                writeln!(self.out, "{}", json)?;
            }
            Command::Help => write!(self.out, "{}", *MANUAL)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn collect(&mut self) -> Result<()> {
        match self.tree.collect_ordered() {
            Ok(ids) => {
                let stats = self.tree.last_stats();
                writeln!(self.out, "{}", render_ids(&ids))?;
                writeln!(
                    self.out,
                    "visited {} nodes, rebuilt {} caches, reused {} caches",
                    stats.nodes_visited, stats.caches_rebuilt, stats.caches_reused
                )?;
            }
            Err(err) => {
                warn!(%err, "collection failed");
                writeln!(self.out, "error: {}", err)?;
            }
        }
        Ok(())
    }

    fn attach(&mut self, node: i64) -> Result<()> {
        let cache = CacheHandle::new();
        match self.tree.attach_cache(node, &cache) {
            Ok(()) => {
                self.pool.push(cache);
                self.print_tree()?;
                writeln!(self.out, "finish attaching cache")?;
            }
            Err(err) => writeln!(self.out, "error: {}", err)?,
        }
        Ok(())
    }

    fn detach(&mut self, node: i64) -> Result<()> {
        match self.tree.detach_cache(node) {
            Some(cache) => {
                self.pool.retain(|owned| !owned.ptr_eq(&cache));
                self.print_tree()?;
                writeln!(self.out, "finish detaching cache")?;
            }
            None => writeln!(self.out, "node has no cache attached")?,
        }
        Ok(())
    }

    /// Parses a numeric argument, reporting bad input instead of failing.
    fn parse_argument<T: std::str::FromStr>(&mut self, argument: Option<&str>) -> Result<Option<T>> {
        let Some(argument) = argument else {
            return Ok(None);
        };
        match argument.parse() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                writeln!(self.out, "Not a number: {}", argument)?;
                Ok(None)
            }
        }
    }

    fn print_tree(&mut self) -> Result<()> {
        if self.clear_screen {
            write!(self.out, "{}", CLEAR_SCREEN)?;
        }
        write!(self.out, "{}", render_tree(&self.tree.snapshot()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn settings(nodes: usize) -> ShellSettings {
        ShellSettings {
            seed: Some(1),
            initial_nodes: nodes,
            clear_screen: false,
            ..Default::default()
        }
    }

    fn run_script(nodes: usize, script: &str) -> String {
        let mut out = Vec::new();
        Session::new(&settings(nodes), &mut out)
            .run(Cursor::new(script))
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn scripted_session_matches_expected_scenario() {
        // Single root, then children 1, 2, 3 under it
        let output = run_script(1, "i 0 i 0 i 0 s c 1 s i 1 s p q");

        assert!(output.contains("0|1|2|3|\n"));
        assert!(output.contains("finish attaching cache"));
        assert!(output.contains("|_1 [NeedsUpdate] Cache:1|\n"));
        assert!(output.contains("0|1|4|2|3|\n"));
        assert!(output.ends_with("|_1 Cache:1|4|\n  |_4\n|_2\n|_3\n:"));
    }

    #[test]
    fn collect_reports_reuse_on_second_run() {
        let output = run_script(1, "i 0 c 1 s s q");
        assert!(output.contains("visited 2 nodes, rebuilt 1 caches, reused 0 caches"));
        assert!(output.contains("visited 2 nodes, rebuilt 0 caches, reused 1 caches"));
    }

    #[test]
    fn bad_input_is_reported_not_fatal() {
        let output = run_script(1, "z i abc p q");
        assert!(output.contains("Unknown command: z"));
        assert!(output.contains("Not a number: abc"));
        assert!(output.trim_end().ends_with(':'));
    }

    #[test]
    fn reset_regenerates_tree_and_drops_pool() {
        let mut out = Vec::new();
        let mut session = Session::new(&settings(3), &mut out);
        session.run(Cursor::new("c 0 r 6 q")).unwrap();

        assert_eq!(session.tree.len(), 6);
        assert!(session.pool.is_empty());
        assert!(!session.tree.root().has_cache());
    }

    #[test]
    fn detach_frees_pool_entry() {
        let mut out = Vec::new();
        let mut session = Session::new(&settings(2), &mut out);
        session.run(Cursor::new("c 1 d 1 d 1 q")).unwrap();
        assert!(session.pool.is_empty());
        drop(session);

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("finish detaching cache"));
        assert!(output.contains("node has no cache attached"));
    }

    #[test]
    fn json_dump_is_valid() {
        let output = run_script(2, "j q");
        let start = output.find('{').unwrap();
        let end = output.rfind('}').unwrap();
        let value: serde_json::Value = serde_json::from_str(&output[start..=end]).unwrap();
        assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn end_of_input_stops_loop() {
        let output = run_script(1, "p");
        assert_eq!(output.matches("[Current Tree Status]").count(), 2);
    }
}
