use anyhow::bail;
use clap::{Parser, Subcommand, ValueEnum};
use flakeid::{Flake, radix};

/// Command-line arguments for the `flakeid` binary.
///
/// Options that identify the host can also be supplied through the
/// environment or a `.env` file in the working directory.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakeid",
    version,
    about = "Generate, inspect and re-encode 63-bit Flake IDs"
)]
pub struct CliArgs {
    /// Machine ID encoded into generated IDs (0-15).
    ///
    /// Every process generating IDs concurrently must use a distinct value.
    ///
    /// Environment variable: `FLAKE_MACHINE_ID`
    #[arg(long, env = "FLAKE_MACHINE_ID", default_value_t = 0, allow_negative_numbers = true)]
    pub machine_id: i64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Issue new IDs, one per line.
    Generate {
        /// Number of IDs to issue.
        #[arg(short, long, default_value_t = 1)]
        count: usize,

        /// Output representation.
        #[arg(short, long, value_enum, default_value_t = Format::Decimal)]
        format: Format,

        /// Left-pad radix output to a fixed width per base.
        ///
        /// Padded `hex` and `base36` strings sort like the IDs; `base62` does
        /// not, since uppercase letters sort before lowercase.
        #[arg(short, long, default_value_t = false)]
        padded: bool,
    },
    /// Break an existing ID into its components.
    Inspect {
        /// The ID, in decimal unless `--base` is given.
        id: String,

        /// Radix the ID is written in (2-62).
        #[arg(short, long)]
        base: Option<u8>,
    },
    /// Re-encode a decimal ID in another radix.
    Encode {
        /// The ID in decimal.
        id: String,

        /// Target radix (2-62).
        #[arg(short, long)]
        base: u8,

        /// Left-pad to the fixed width of the radix.
        #[arg(short, long, default_value_t = false)]
        padded: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Decimal,
    Base62,
    Base36,
    Hex,
    /// Big-endian byte array.
    Bytes,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub machine_id: i64,
    pub command: Command,
}

impl TryFrom<CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if !(0..=Flake::MAX_MACHINE_ID).contains(&args.machine_id) {
            bail!(
                "FLAKE_MACHINE_ID ({}) is outside the machine ID space (0..={})",
                args.machine_id,
                Flake::MAX_MACHINE_ID
            );
        }

        match &args.command {
            Command::Generate { count: 0, .. } => bail!("--count must be greater than 0"),
            Command::Inspect {
                base: Some(base), ..
            }
            | Command::Encode { base, .. } => check_base(*base)?,
            _ => {}
        }

        Ok(Self {
            machine_id: args.machine_id,
            command: args.command,
        })
    }
}

fn check_base(base: u8) -> anyhow::Result<()> {
    if !(radix::MIN_BASE..=radix::MAX_BASE).contains(&base) {
        bail!(
            "--base ({base}) must be between {} and {}",
            radix::MIN_BASE,
            radix::MAX_BASE
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> anyhow::Result<Config> {
        let args = CliArgs::try_parse_from(std::iter::once("flakeid").chain(args.iter().copied()))?;
        Config::try_from(args)
    }

    #[test]
    fn parses_generate_defaults() {
        let parsed = config(&["generate"]).unwrap();
        assert_eq!(parsed.machine_id, 0);
        assert_eq!(
            parsed.command,
            Command::Generate {
                count: 1,
                format: Format::Decimal,
                padded: false
            }
        );
    }

    #[test]
    fn parses_subcommand_options() {
        let parsed = config(&[
            "--machine-id",
            "7",
            "generate",
            "--count",
            "3",
            "--format",
            "base62",
            "--padded",
        ])
        .unwrap();
        assert_eq!(parsed.machine_id, 7);
        assert_eq!(
            parsed.command,
            Command::Generate {
                count: 3,
                format: Format::Base62,
                padded: true
            }
        );

        let parsed = config(&["inspect", "9AD", "--base", "62"]).unwrap();
        assert_eq!(
            parsed.command,
            Command::Inspect {
                id: "9AD".to_owned(),
                base: Some(62)
            }
        );
    }

    #[test]
    fn rejects_invalid_configuration() {
        let err = config(&["--machine-id", "16", "generate"]).unwrap_err();
        assert!(err.to_string().contains("outside the machine ID space"));

        let err = config(&["--machine-id", "-1", "generate"]).unwrap_err();
        assert!(err.to_string().contains("outside the machine ID space"));

        let err = config(&["generate", "--count", "0"]).unwrap_err();
        assert!(err.to_string().contains("--count"));

        let err = config(&["encode", "1", "--base", "63"]).unwrap_err();
        assert!(err.to_string().contains("between 2 and 62"));

        let err = config(&["inspect", "1", "--base", "1"]).unwrap_err();
        assert!(err.to_string().contains("between 2 and 62"));

        assert!(config(&["generate", "--format", "octal"]).is_err());
    }
}
