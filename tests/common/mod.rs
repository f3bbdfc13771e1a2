use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub const HEADER: [&str; 5] = ["type", "caller", "counterparty", "amount", "asset"];

/// Writes an eligible asset, `accounts` funded accounts and `transfers`
/// random transfers between them.
pub fn generate_csv(
    path: &Path,
    accounts: usize,
    transfers: usize,
    seed: u64,
) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(file);
    let mut rng = StdRng::seed_from_u64(seed);

    wtr.write_record(HEADER)?;
    wtr.write_record(["add_asset", "admin", "", "", "T"])?;

    for i in 0..accounts {
        wtr.write_record(["deposit", &format!("acct{}", i), "", "1000", "T"])?;
    }

    for _ in 0..transfers {
        let from = rng.gen_range(0..accounts);
        let to = rng.gen_range(0..accounts);
        let amount = rng.gen_range(0..400u32);
        wtr.write_record([
            "transfer",
            &format!("acct{}", from),
            &format!("acct{}", to),
            &amount.to_string(),
            "T",
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
