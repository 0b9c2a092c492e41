//! Contract Pipeline CLI Application
//!
//! `pipeline compile` builds the Solidity contract, `pipeline deploy`
//! creates it on Hedera.

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use contract_pipeline::cli;
use contract_pipeline::contract::{BuildConfig, OptimizerSettings, Solc, DEFAULT_OPTIMIZER_RUNS};
use contract_pipeline::network::{
    DeployConfig, HederaNetwork, KeyType, OperatorIdentity, DEFAULT_CREATE_GAS,
    DEFAULT_MAX_CHUNKS, DEFAULT_QUERY_GAS, DEFAULT_VERIFY_FUNCTION,
};
use primitive_types::U256;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pipeline")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Compile Solidity contracts and deploy them to Hedera", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the contract into bytecode.bin and abi.json
    Compile {
        /// Solidity source file
        #[arg(short, long, default_value = "freelancer.sol")]
        source: PathBuf,

        /// Contract to extract from the compiler output
        #[arg(short, long, default_value = "EscrowMilestones")]
        contract: String,

        /// Directory receiving the artifacts
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Optimizer runs
        #[arg(long, default_value_t = DEFAULT_OPTIMIZER_RUNS)]
        optimizer_runs: u32,

        /// Path to the solc binary
        #[arg(long, env = "SOLC", default_value = "solc")]
        solc: PathBuf,
    },

    /// Deploy bytecode.bin to Hedera and verify the new contract
    Deploy {
        /// Bytecode artifact produced by `compile`
        #[arg(short, long, default_value = "bytecode.bin")]
        bytecode: PathBuf,

        /// Operator account id (shard.realm.num)
        #[arg(long, env = "HEDERA_ACCOUNT_ID")]
        account_id: String,

        /// Operator private key (hex)
        #[arg(long, env = "HEDERA_PRIVATE_KEY", hide_env_values = true)]
        private_key: String,

        /// Operator key algorithm (ecdsa or ed25519)
        #[arg(long, env = "HEDERA_KEY_TYPE", default_value = "ecdsa")]
        key_type: KeyType,

        /// Target network (testnet, previewnet or mainnet)
        #[arg(short, long, env = "HEDERA_NETWORK", default_value = "testnet")]
        network: HederaNetwork,

        /// Gas limit for contract creation
        #[arg(long, default_value_t = DEFAULT_CREATE_GAS)]
        gas: u64,

        /// Maximum chunks used to upload large bytecode
        #[arg(long, default_value_t = DEFAULT_MAX_CHUNKS)]
        max_chunks: usize,

        /// Gas for the verification query
        #[arg(long, default_value_t = DEFAULT_QUERY_GAS)]
        query_gas: u64,

        /// Read-only function called after creation
        #[arg(long, default_value = DEFAULT_VERIFY_FUNCTION)]
        verify_function: String,

        /// Value the verification call must return
        #[arg(long, default_value_t = 0)]
        expect: u64,

        /// Accept whatever the verification call returns
        #[arg(long)]
        no_expect: bool,
    },
}

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(parse_exit_code(&e));
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

/// Help and version requests succeed; every other parse error is a usage
/// failure and exits 1 like any other failed run
fn parse_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

fn run(cli: Cli) -> cli::CliResult<()> {
    match cli.command {
        Commands::Compile {
            source,
            contract,
            out_dir,
            optimizer_runs,
            solc,
        } => {
            let config = BuildConfig {
                source_path: source,
                contract_name: contract,
                out_dir,
                optimizer: OptimizerSettings {
                    enabled: true,
                    runs: optimizer_runs,
                },
            };
            cli::cmd_compile(&config, &Solc::new(solc))
        }

        Commands::Deploy {
            bytecode,
            account_id,
            private_key,
            key_type,
            network,
            gas,
            max_chunks,
            query_gas,
            verify_function,
            expect,
            no_expect,
        } => {
            let identity = OperatorIdentity::new(&account_id, &private_key, key_type)?;
            let config = DeployConfig {
                bytecode_path: bytecode,
                network,
                create_gas: gas,
                max_chunks,
                query_gas,
                verify_function,
                expected_value: (!no_expect).then(|| U256::from(expect)),
            };

            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(cli::cmd_deploy(config, identity))?;
            Ok(())
        }
    }
}
