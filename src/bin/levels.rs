//! skirmish-levels - Experience table tool
//!
//! Prints the experience curve, or locates an experience total on it.

use anyhow::Result;
use clap::Parser;
use skirmish::roster::curves::MAX_LEVEL;
use skirmish::roster::ExperienceCurve;

/// Experience curve inspector
#[derive(Parser, Debug)]
#[command(
    name = "skirmish-levels",
    version,
    about = "Print the experience curve"
)]
struct Args {
    /// Highest level to print
    #[arg(short, long, default_value_t = MAX_LEVEL)]
    levels: u32,

    /// Show where this experience total lands instead of the table
    #[arg(short, long)]
    experience: Option<u64>,

    /// Emit JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let curve = ExperienceCurve::default();
    match args.experience {
        Some(exp) => {
            let at = curve.current_level(exp);
            if args.json {
                println!("{}", serde_json::to_string(&at)?);
            } else {
                println!(
                    "level {} ({} / {} exp, {:.2}%)",
                    at.level, at.current_exp, at.exp_to_next, at.progress
                );
            }
        }
        None => {
            if args.json {
                let rows: Vec<_> = (0..=args.levels.min(curve.max_level()))
                    .map(|level| {
                        serde_json::json!({
                            "level": level,
                            "total": curve.total_exp(level),
                            "to_next": curve.exp_to_next_level(level),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print!("{}", curve.level_table(args.levels));
            }
        }
    }
    Ok(())
}
