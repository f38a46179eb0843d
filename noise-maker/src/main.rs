mod args;
mod generator;
mod stream;

use std::{
    fs::File,
    io::{self, BufWriter, Write},
};

use access_stats::DateCodec;
use args::CliArgs;
use clap::Parser;
use generator::{Generator, days_left};
use rand::{SeedableRng, rngs::StdRng};
use stream::write_lines;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let first_day = DateCodec::default().encode(args.start_date())?;
    if *args.days() > days_left(first_day) {
        return Err(format!(
            "{} days starting {} run past 31/Dec/9999",
            args.days(),
            args.start_date()
        )
        .into());
    }
    let rng = match args.seed() {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_os_rng(),
    };
    let mut generator = Generator::new(rng, first_day, *args.days(), *args.malformed_ratio());

    let sink: Box<dyn Write> = match args.output() {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    let mut out = BufWriter::new(sink);
    write_lines(&mut out, &mut generator, *args.lines())?;
    Ok(())
}
