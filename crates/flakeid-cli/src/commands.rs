use std::io::Write;
use std::time::UNIX_EPOCH;

use flakeid::{Flake, FlakeGenerator};

use crate::config::{Command, Config, Format};

/// Executes the configured command, writing its output to `out`.
pub fn run(config: &Config, out: &mut impl Write) -> anyhow::Result<()> {
    match &config.command {
        Command::Generate {
            count,
            format,
            padded,
        } => generate(config.machine_id, *count, *format, *padded, out),
        Command::Inspect { id, base } => inspect(&parse_id(id, *base)?, out),
        Command::Encode { id, base, padded } => {
            let flake = parse_id(id, None)?;
            writeln!(out, "{}", flake.to_base(*base, *padded)?)?;
            Ok(())
        }
    }
}

fn parse_id(id: &str, base: Option<u8>) -> anyhow::Result<Flake> {
    let flake = match base {
        Some(base) => Flake::from_base(id, base)?,
        None => id.parse()?,
    };
    Ok(flake)
}

fn generate(
    machine_id: i64,
    count: usize,
    format: Format,
    padded: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let generator = FlakeGenerator::new(machine_id)?;
    tracing::info!(machine_id, count, ?format, "generating");

    for _ in 0..count {
        let id = generator.next_id()?;
        match format {
            Format::Decimal => writeln!(out, "{id}")?,
            Format::Base62 => writeln!(out, "{}", id.to_base62(padded))?,
            Format::Base36 => writeln!(out, "{}", id.to_base36(padded))?,
            Format::Hex => writeln!(out, "{}", id.to_base(16, padded)?)?,
            Format::Bytes => writeln!(out, "{:?}", id.to_be_bytes())?,
        }
    }
    Ok(())
}

fn inspect(id: &Flake, out: &mut impl Write) -> anyhow::Result<()> {
    let unix_millis = id.time().duration_since(UNIX_EPOCH)?.as_millis();
    writeln!(out, "raw:        {}", id.raw())?;
    writeln!(out, "timestamp:  {}", id.timestamp())?;
    writeln!(out, "time:       {unix_millis}")?;
    writeln!(out, "machine_id: {}", id.machine_id())?;
    writeln!(out, "sequence:   {}", id.sequence())?;
    writeln!(out, "base62:     {}", id.to_base62(true))?;
    Ok(())
}
