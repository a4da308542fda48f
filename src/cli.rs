// CLI commands

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::NetworkConfig;
use crate::consensus::{search_nonce, Target, DEFAULT_DIFFICULTY_BITS};
use crate::core::{Block, Hash256};
use crate::network::Network;
use crate::wallet::{Address, KeyPair};

#[derive(Parser)]
#[command(name = "powsim")]
#[command(about = "Proof-of-work ledger simulator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a keypair and print its address
    Keygen,

    /// Decode and validate an address
    Address {
        /// Base58check address
        address: String,
    },

    /// Print the genesis block
    Genesis {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search a nonce for the genesis header
    MineGenesis {
        /// Leading zero bits required
        #[arg(short, long, default_value_t = DEFAULT_DIFFICULTY_BITS)]
        difficulty: u32,
        /// First nonce to try
        #[arg(short, long, default_value_t = 0)]
        start: u32,
    },

    /// Run a ring of miners that take turns mining and paying each other
    Simulate {
        /// Number of miners in the ring
        #[arg(short, long, default_value_t = 3)]
        miners: usize,
        /// Number of mining rounds
        #[arg(short, long, default_value_t = 5)]
        rounds: usize,
        /// Leading zero bits required
        #[arg(short, long, default_value_t = DEFAULT_DIFFICULTY_BITS)]
        difficulty: u32,
        /// Amount each miner pays its neighbour after mining
        #[arg(short, long, default_value_t = 10)]
        amount: u64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// One block of the reported chain
#[derive(Debug, Serialize)]
pub struct BlockSummary {
    pub hash: Hash256,
    pub prev_hash: Hash256,
    pub nonce: u32,
    pub transactions: usize,
    /// Label of the node that collected the reward, if it is in the network
    pub miner: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Balance {
    pub label: String,
    pub address: Address,
    pub spendable: u64,
}

/// Outcome of a simulation run
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub config: NetworkConfig,
    pub chain: Vec<BlockSummary>,
    pub balances: Vec<Balance>,
}

/// Label of the i-th miner in a simulated ring
fn miner_label(index: usize) -> String {
    format!("miner-{}", index)
}

/// Build a ring of `miners` miners and run `rounds` rounds. In round r,
/// miner r mod n mines, then pays `amount` to the next miner if it can.
pub fn simulate(
    config: NetworkConfig,
    miners: usize,
    rounds: usize,
    amount: u64,
) -> Result<SimulationReport, String> {
    if miners == 0 {
        return Err("Simulation needs at least one miner".to_string());
    }

    let mut network = Network::with_config(config);
    for i in 0..miners {
        network
            .create_miner(&miner_label(i))
            .map_err(|e| e.to_string())?;
    }
    if miners > 1 {
        for i in 0..miners {
            network
                .connect(&miner_label(i), &miner_label((i + 1) % miners))
                .map_err(|e| e.to_string())?;
        }
    }

    for round in 0..rounds {
        let from = miner_label(round % miners);
        network.mine(&from).map_err(|e| e.to_string())?;

        if miners > 1 {
            let to = miner_label((round + 1) % miners);
            let spendable = network.spendable_amount(&from).map_err(|e| e.to_string())?;
            if spendable >= amount {
                network
                    .transfer(&from, &to, amount)
                    .map_err(|e| e.to_string())?;
            } else {
                log::debug!("'{}' has {} and skips paying '{}'", from, spendable, to);
            }
        }
    }

    let chain = network
        .chain()
        .into_iter()
        .map(|block| BlockSummary {
            hash: block.hash(),
            prev_hash: block.header.prev_hash,
            nonce: block.header.nonce,
            transactions: block.transactions.len(),
            miner: block
                .transactions
                .first()
                .and_then(|reward| reward.outputs.first())
                .and_then(|output| network.owner(&output.address))
                .map(str::to_string),
        })
        .collect();

    let mut balances = Vec::new();
    for label in network.labels() {
        let node = network.node(label).map_err(|e| e.to_string())?;
        balances.push(Balance {
            label: label.to_string(),
            address: node.address().clone(),
            spendable: node.spendable_amount(),
        });
    }

    Ok(SimulationReport {
        config,
        chain,
        balances,
    })
}

/// CLI handler
pub struct CliHandler;

impl CliHandler {
    /// Create a new CLI handler
    pub fn new() -> Self {
        Self
    }

    /// Handle CLI command
    pub fn handle(&self, cli: Cli) -> Result<(), String> {
        match cli.command {
            Commands::Keygen => self.keygen(),
            Commands::Address { address } => self.address(&address),
            Commands::Genesis { json } => self.genesis(json),
            Commands::MineGenesis { difficulty, start } => self.mine_genesis(difficulty, start),
            Commands::Simulate {
                miners,
                rounds,
                difficulty,
                amount,
                json,
            } => {
                let config = NetworkConfig::with_difficulty(difficulty);
                let report = simulate(config, miners, rounds, amount)?;
                self.print_report(&report, json)
            }
        }
    }

    fn keygen(&self) -> Result<(), String> {
        let keypair = KeyPair::generate();

        println!("Private key: {}", hex::encode(keypair.private_key()));
        println!("Public key:  {}", hex::encode(keypair.compressed_public_key()));
        println!("Key hash:    {}", hex::encode(keypair.pubkey_hash()));
        println!("Address:     {}", keypair.address());

        Ok(())
    }

    fn address(&self, address: &str) -> Result<(), String> {
        let address = Address::parse(address).map_err(|e| e.to_string())?;
        let payload = address.decode().map_err(|e| e.to_string())?;

        println!("Address: {}", address);
        println!("  Version: {}", payload[0]);
        println!("  Public key hash: {}", hex::encode(&payload[1..]));

        Ok(())
    }

    fn genesis(&self, json: bool) -> Result<(), String> {
        let genesis = Block::genesis();

        if json {
            let out = serde_json::to_string_pretty(&genesis).map_err(|e| e.to_string())?;
            println!("{}", out);
            return Ok(());
        }

        self.print_block(&genesis);
        Ok(())
    }

    fn mine_genesis(&self, difficulty: u32, start: u32) -> Result<(), String> {
        let target = Target::from_leading_zero_bits(difficulty);
        let mut header = Block::genesis().header;

        println!("Mining genesis header at {} bits from nonce {}...", difficulty, start);

        let found = search_nonce(&mut header, &target, start)
            .ok_or("No nonce in the 32-bit space meets the target")?;

        println!("✓ Nonce found");
        println!("  Nonce: {}", found.nonce);
        println!("  Hash: {}", found.hash);
        println!("  Attempts: {}", found.attempts);

        Ok(())
    }

    fn print_report(&self, report: &SimulationReport, json: bool) -> Result<(), String> {
        if json {
            let out = serde_json::to_string_pretty(report).map_err(|e| e.to_string())?;
            println!("{}", out);
            return Ok(());
        }

        println!("Chain ({} blocks, tip first):", report.chain.len());
        for block in &report.chain {
            println!(
                "  {} nonce={} txs={} miner={}",
                block.hash,
                block.nonce,
                block.transactions,
                block.miner.as_deref().unwrap_or("-")
            );
        }

        println!("Balances:");
        for balance in &report.balances {
            println!("  {:<10} {:>6}  {}", balance.label, balance.spendable, balance.address);
        }

        Ok(())
    }

    /// Print block information
    fn print_block(&self, block: &Block) {
        println!("Block:");
        println!("  Hash: {}", block.hash());
        println!("  Previous: {}", block.header.prev_hash);
        println!("  Merkle root: {}", block.header.merkle_root);
        println!("  Nonce: {}", block.header.nonce);
        println!("  Transactions: {}", block.transactions.len());

        for (i, tx) in block.transactions.iter().enumerate() {
            println!("    [{}] {}", i, tx.hash());
        }
    }
}

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::REWARD_AMOUNT;

    #[test]
    fn test_cli_parses_simulate() {
        let cli = Cli::try_parse_from(["powsim", "simulate", "--miners", "4", "--json"]).unwrap();
        match cli.command {
            Commands::Simulate {
                miners,
                rounds,
                difficulty,
                json,
                ..
            } => {
                assert_eq!(miners, 4);
                assert_eq!(rounds, 5);
                assert_eq!(difficulty, DEFAULT_DIFFICULTY_BITS);
                assert!(json);
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_simulate_ring() {
        let report = simulate(NetworkConfig::with_difficulty(0), 3, 4, 10).unwrap();

        assert_eq!(report.chain.len(), 5);
        assert_eq!(report.balances.len(), 3);
        assert_eq!(report.chain[0].miner.as_deref(), Some("miner-0"));
        assert_eq!(report.chain[3].miner.as_deref(), Some("miner-0"));
        assert_eq!(report.chain[2].miner.as_deref(), Some("miner-1"));
        assert_eq!(report.chain[4].miner, None); // genesis

        // Tip first, each block pointing at the next one in the list
        for pair in report.chain.windows(2) {
            assert_eq!(pair[0].prev_hash, pair[1].hash);
        }
        assert!(report.balances.iter().all(|b| b.spendable > 0));
    }

    #[test]
    fn test_simulate_requires_miners() {
        assert!(simulate(NetworkConfig::default(), 0, 1, 10).is_err());
    }

    #[test]
    fn test_single_miner_keeps_everything() {
        let report = simulate(NetworkConfig::with_difficulty(0), 1, 3, 10).unwrap();
        assert_eq!(report.balances[0].spendable, 3 * REWARD_AMOUNT);
    }

    #[test]
    fn test_report_serializes() {
        let report = simulate(NetworkConfig::with_difficulty(0), 2, 2, 5).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["config"]["difficulty_bits"], 0);
        assert_eq!(json["chain"].as_array().map(Vec::len), Some(3));
    }
}
