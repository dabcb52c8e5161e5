//! `qa state`: load a team-state JSON document from disk, sanitize it, and print (or
//! write back) the result.

use qa_core::model::TeamState;

#[derive(clap::Args, Debug)]
pub struct StateArgs {
    /// Path to a JSON file holding one team's `TeamState` document
    pub path: std::path::PathBuf,

    /// Write the sanitized document back to `path` instead of printing it
    #[arg(long)]
    pub write: bool,

    /// Pretty-print the output
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: StateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(&args.path)?;
    let mut state: TeamState = serde_json::from_str(&raw)?;
    qa_store::sanitize(&mut state);

    let output = if args.pretty {
        serde_json::to_string_pretty(&state)?
    } else {
        serde_json::to_string(&state)?
    };

    if args.write {
        std::fs::write(&args.path, format!("{}\n", output))?;
    } else {
        println!("{}", output);
    }
    Ok(())
}
