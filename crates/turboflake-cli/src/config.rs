use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use turboflake::{MAX_MACHINE_IDS, MachineIdLcg, MachineIds};

/// How the binary waits when a tick is exhausted.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Sleep the generating thread.
    #[default]
    Blocking,
    /// Suspend a Tokio task.
    Async,
}

/// Command-line arguments for the `turboflake` binary.
///
/// Every option can also be set through the environment (or a `.env` file).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "turboflake",
    version,
    about = "Generate Sonyflake-style 64-bit IDs"
)]
pub struct CliArgs {
    /// Machine ID to mint IDs under. Repeat (or comma-separate) to give the
    /// generator several; each one adds 256 IDs per 10 ms tick.
    ///
    /// Environment variable: `TURBOFLAKE_MACHINE_IDS`
    #[arg(
        long = "machine-id",
        env = "TURBOFLAKE_MACHINE_IDS",
        value_delimiter = ',',
        allow_negative_numbers = true
    )]
    pub machine_ids: Vec<i64>,

    /// Draw machine IDs from a `MachineIdLcg` seeded with this value instead
    /// of passing them explicitly.
    ///
    /// Environment variable: `TURBOFLAKE_LCG_SEED`
    #[arg(long, env = "TURBOFLAKE_LCG_SEED")]
    pub lcg_seed: Option<u32>,

    /// Number of machine IDs to draw with `--lcg-seed`.
    ///
    /// Environment variable: `TURBOFLAKE_LCG_COUNT`
    #[arg(long, env = "TURBOFLAKE_LCG_COUNT", default_value_t = 1)]
    pub lcg_count: usize,

    /// Epoch in seconds since the UNIX epoch. Defaults to 2014-09-01.
    ///
    /// Environment variable: `TURBOFLAKE_EPOCH`
    #[arg(long, env = "TURBOFLAKE_EPOCH", allow_negative_numbers = true)]
    pub epoch: Option<i64>,

    /// Number of IDs to print.
    ///
    /// Environment variable: `TURBOFLAKE_COUNT`
    #[arg(short = 'n', long, env = "TURBOFLAKE_COUNT", default_value_t = 1)]
    pub count: usize,

    /// Mint all IDs in a single batch call.
    #[arg(short, long, default_value_t = false)]
    pub batch: bool,

    /// Wait strategy for exhausted ticks.
    ///
    /// Environment variable: `TURBOFLAKE_MODE`
    #[arg(long, env = "TURBOFLAKE_MODE", value_enum, default_value_t = Mode::Blocking)]
    pub mode: Mode,

    /// Print `id timestamp machine_id sequence` instead of the bare ID.
    #[arg(short, long, default_value_t = false)]
    pub decompose: bool,
}

/// Validated configuration derived from [`CliArgs`].
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub machine_ids: MachineIds,
    pub epoch: Option<i64>,
    pub count: usize,
    pub batch: bool,
    pub mode: Mode,
    pub decompose: bool,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.count == 0 {
            bail!("TURBOFLAKE_COUNT must be greater than 0");
        }

        let raw: Vec<i64> = match (args.machine_ids.is_empty(), args.lcg_seed) {
            (false, Some(_)) => bail!("--machine-id and --lcg-seed are mutually exclusive"),
            (false, None) => args.machine_ids,
            (true, Some(seed)) => {
                if args.lcg_count == 0 || args.lcg_count > MAX_MACHINE_IDS {
                    bail!("TURBOFLAKE_LCG_COUNT must be in 1..={MAX_MACHINE_IDS}");
                }
                let lcg = MachineIdLcg::new(seed);
                lcg.next_machine_ids(args.lcg_count)
                    .into_iter()
                    .map(i64::from)
                    .collect()
            }
            (true, None) => bail!("At least one machine ID must be provided (--machine-id or --lcg-seed)"),
        };
        let machine_ids = MachineIds::new(raw).context("invalid machine IDs")?;

        if let Some(secs) = args.epoch {
            if secs < 0 {
                bail!("TURBOFLAKE_EPOCH must not be negative (got {secs})");
            }
        }

        Ok(Self {
            machine_ids,
            epoch: args.epoch,
            count: args.count,
            batch: args.batch,
            mode: args.mode,
            decompose: args.decompose,
        })
    }
}
