//! Command handlers. Each one prints to stdout; errors bubble up to `main`.

mod campaigns;
mod history;
mod import;
mod sources;

use anyhow::Result;
use serde::Serialize;

pub use campaigns::run as campaigns;
pub use history::run as history;
pub use import::{import, preview, watch, ImportArgs};
pub use sources::run as sources;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
