use std::io;

use zombie_sim::report::population_records;
use zombie_sim::runner::run_with_args;

fn main() -> anyhow::Result<()> {
    let engine = run_with_args(|_, _| Ok(()))?;

    let mut writer = csv::Writer::from_writer(io::stdout());
    for record in population_records(&engine) {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
