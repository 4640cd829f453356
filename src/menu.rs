//! Interactive menu driver.
//!
//! Reads numbered choices from any `BufRead` and writes prompts and results
//! to any `Write`, so the same loop serves the terminal and tests. Each
//! action maps to one network operation; invalid input is reported and the
//! loop keeps going. End of input behaves like choosing "Exit".

use std::io::{self, BufRead, Write};
use std::path::Path;

use log::debug;

use crate::content::ContentStore;
use crate::export;
use crate::network::{Network, NetworkError};
use crate::routing::Route;
use crate::topology::{NodeId, TopologyError};
use crate::transfer::{
    Pacer, TransferEngine, TransferError, TransferProgress, TransferState, TransferStatus,
};

/// One entry of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddComputer,
    RemoveComputer,
    AddRoute,
    TransferFile,
    ExportNetwork,
    Exit,
}

impl MenuChoice {
    /// Parse the number typed at the "Choice:" prompt
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::AddComputer),
            "2" => Some(Self::RemoveComputer),
            "3" => Some(Self::AddRoute),
            "4" => Some(Self::TransferFile),
            "5" => Some(Self::ExportNetwork),
            "6" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Prints transfer progress the way the menu reports it
pub struct ConsoleProgress<W> {
    out: W,
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

// Progress lines are best effort; a closed terminal must not abort the transfer.
impl<W: Write> TransferProgress for ConsoleProgress<W> {
    fn on_state(&mut self, state: TransferState) {
        if state == TransferState::Transferring {
            let _ = writeln!(self.out, "Transferring data in packets...");
        }
    }

    fn on_route(&mut self, route: &Route) {
        let _ = writeln!(self.out, "Shortest path: {} ({}ms)", route, route.total_weight);
    }

    fn on_packet(&mut self, _sequence: u64, data: &[u8]) {
        let _ = writeln!(self.out, "Packet sent: {}", String::from_utf8_lossy(data));
        let _ = self.out.flush();
    }
}

/// Parse exactly `count` whitespace-separated integers
fn parse_numbers(line: &str, count: usize) -> Option<Vec<i64>> {
    let numbers: Vec<i64> = line
        .split_whitespace()
        .map(str::parse::<i64>)
        .collect::<Result<_, _>>()
        .ok()?;
    (numbers.len() == count).then_some(numbers)
}

/// Convert a typed number into a node id; negative ids are never valid
fn node_id(value: i64) -> Option<NodeId> {
    NodeId::try_from(value).ok()
}

/// Menu loop over an input and an output stream
pub struct Menu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Print `text` and read one line; `None` at end of input
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn print_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- MENU ---")?;
        writeln!(self.output, "1. Add Computer")?;
        writeln!(self.output, "2. Remove Computer")?;
        writeln!(self.output, "3. Add Route")?;
        writeln!(self.output, "4. Transfer File")?;
        writeln!(self.output, "5. Export Network")?;
        writeln!(self.output, "6. Exit")
    }

    /// Run until the user exits or input ends
    pub fn run<S, P>(
        &mut self,
        network: &mut Network<S>,
        engine: &mut TransferEngine<P>,
        dot_path: &Path,
    ) -> io::Result<()>
    where
        S: ContentStore,
        P: Pacer,
    {
        loop {
            self.print_menu()?;
            let Some(line) = self.prompt("Choice: ")? else {
                writeln!(self.output)?;
                break;
            };
            let Some(choice) = MenuChoice::parse(&line) else {
                writeln!(self.output, "Invalid choice!")?;
                continue;
            };
            debug!("Menu choice: {:?}", choice);

            let keep_going = match choice {
                MenuChoice::AddComputer => self.add_computer(network)?,
                MenuChoice::RemoveComputer => self.remove_computer(network)?,
                MenuChoice::AddRoute => self.add_route(network)?,
                MenuChoice::TransferFile => self.transfer_file(network, engine)?,
                MenuChoice::ExportNetwork => self.export_network(network, dot_path)?,
                MenuChoice::Exit => false,
            };
            if !keep_going {
                break;
            }
        }
        writeln!(self.output, "Goodbye!")?;
        Ok(())
    }

    fn add_computer<S: ContentStore>(&mut self, network: &mut Network<S>) -> io::Result<bool> {
        match network.add_node() {
            Ok(id) => writeln!(self.output, "Computer {} added.", id)?,
            Err(NetworkError::Topology(TopologyError::CapacityExceeded { .. })) => {
                writeln!(self.output, "Network is full!")?
            }
            Err(e) => writeln!(self.output, "Error: {}", e)?,
        }
        Ok(true)
    }

    fn remove_computer<S: ContentStore>(&mut self, network: &mut Network<S>) -> io::Result<bool> {
        let Some(line) = self.prompt("Enter computer ID to remove: ")? else {
            return Ok(false);
        };
        let id = parse_numbers(&line, 1).and_then(|n| node_id(n[0]));
        match id.map(|id| (id, network.remove_node(id))) {
            Some((id, Ok(_))) => writeln!(self.output, "Computer {} removed.", id)?,
            None | Some((_, Err(NetworkError::Topology(TopologyError::InvalidNode { .. })))) => {
                writeln!(self.output, "Invalid computer index!")?
            }
            Some((_, Err(e))) => writeln!(self.output, "Error: {}", e)?,
        }
        Ok(true)
    }

    fn add_route<S: ContentStore>(&mut self, network: &mut Network<S>) -> io::Result<bool> {
        let Some(line) = self.prompt("Enter u, v and weight: ")? else {
            return Ok(false);
        };
        let parsed = parse_numbers(&line, 3)
            .and_then(|n| Some((node_id(n[0])?, node_id(n[1])?, n[2])));
        let Some((u, v, weight)) = parsed else {
            writeln!(self.output, "Invalid computers!")?;
            return Ok(true);
        };
        match network.add_edge(u, v, weight) {
            Ok(edge) => writeln!(self.output, "Route added: {} <--> {} ({}ms)", u, v, edge.weight)?,
            Err(NetworkError::Topology(TopologyError::InvalidNode { .. }))
            | Err(NetworkError::Topology(TopologyError::SelfLoop { .. })) => {
                writeln!(self.output, "Invalid computers!")?
            }
            Err(e) => writeln!(self.output, "Error: {}", e)?,
        }
        Ok(true)
    }

    fn transfer_file<S, P>(
        &mut self,
        network: &mut Network<S>,
        engine: &mut TransferEngine<P>,
    ) -> io::Result<bool>
    where
        S: ContentStore,
        P: Pacer,
    {
        let Some(line) = self.prompt("Enter source and destination: ")? else {
            return Ok(false);
        };
        let parsed = parse_numbers(&line, 2).and_then(|n| Some((node_id(n[0])?, node_id(n[1])?)));
        let Some((from, to)) = parsed else {
            writeln!(self.output, "Invalid computer index!")?;
            return Ok(true);
        };

        // An interrupt that landed after the previous transfer must not stop this one
        engine.cancel_token().reset();
        let result = {
            let mut progress = ConsoleProgress::new(&mut self.output);
            network.transfer(engine, from, to, &mut progress)
        };
        match result {
            Ok(report) if report.status == TransferStatus::Completed => {
                writeln!(self.output, "Data transfer complete.")?
            }
            Ok(report) => writeln!(
                self.output,
                "Data transfer cancelled after {} packets.",
                report.packets
            )?,
            Err(NetworkError::Transfer(TransferError::NoRoute { from, to })) => writeln!(
                self.output,
                "No path exists between {} and {}. Transfer aborted.",
                from, to
            )?,
            Err(NetworkError::Transfer(TransferError::SourceUnavailable { .. })) => {
                writeln!(self.output, "Source file missing.")?
            }
            Err(NetworkError::Transfer(TransferError::DestinationUnavailable { .. })) => {
                writeln!(self.output, "Destination file not found.")?
            }
            Err(e) => writeln!(self.output, "Error: {}", e)?,
        }
        Ok(true)
    }

    fn export_network<S: ContentStore>(&mut self, network: &Network<S>, dot_path: &Path) -> io::Result<bool> {
        match export::write_dot(network.topology(), dot_path) {
            Ok(()) => writeln!(self.output, "Network exported to {}", dot_path.display())?,
            Err(e) => writeln!(self.output, "Error: failed to export network: {}", e)?,
        }
        Ok(true)
    }
}
