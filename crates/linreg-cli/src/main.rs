//! `linreg` — command-line interface for the accelerator block.
//!
//! ```text
//! USAGE:
//!   linreg self-test                  Known-answer test on the dot engine
//!   linreg predict --model <name> <features…>
//!                                     Run a zoo model (CPU + dot engine)
//!   linreg regs                       Print the CSR window layout
//! ```
//!
//! All commands run against the software model unless `--dev`/`--base`
//! point at a mapped hardware window.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use linreg_chip::regs;
use linreg_driver::{model::zoo, CsrBus, DotAccel, MmioBus, SimBus};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "linreg", about = "LiteX linreg accelerator CLI", version)]
struct Cli {
    /// Resource file with the CSR window (e.g. /dev/mem); omit for the
    /// software model.
    #[arg(long, global = true)]
    dev: Option<String>,

    /// Byte offset of the CSR window inside --dev (hex accepted).
    #[arg(long, global = true, value_parser = parse_base, default_value = "0")]
    base: u64,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run the dot-engine known-answer self test.
    SelfTest,
    /// Run a model from the zoo over the given feature values.
    Predict {
        /// Model name: diabetes | iris.
        #[arg(long)]
        model: String,
        /// Feature values (1 for diabetes, 4 for iris).
        features: Vec<f64>,
    },
    /// Print the CSR window layout.
    Regs,
}

fn parse_base(s: &str) -> std::result::Result<u64, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).map_err(|e| e.to_string())
    } else {
        s.parse().map_err(|e: std::num::ParseIntError| e.to_string())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    let bus: Box<dyn CsrBus> = match &cli.dev {
        Some(dev) => Box::new(MmioBus::map(dev, cli.base)?),
        None => Box::new(SimBus::new()),
    };

    match cli.command {
        Cmd::SelfTest => cmd_self_test(bus),
        Cmd::Predict { model, features } => cmd_predict(bus, &model, &features),
        Cmd::Regs => cmd_regs(),
    }
}

fn cmd_self_test(bus: Box<dyn CsrBus>) -> Result<()> {
    let kind = bus.bus_type();
    let mut accel = DotAccel::new(bus);
    accel.init();
    accel.self_test()?;
    println!("Dot engine self test passed ({kind} bus)");
    Ok(())
}

fn cmd_predict(bus: Box<dyn CsrBus>, model: &str, features: &[f64]) -> Result<()> {
    match model {
        "diabetes" => {
            let &[x] = features else {
                bail!("diabetes takes exactly 1 feature, got {}", features.len());
            };
            let m = zoo::diabetes();
            println!("f64 prediction      : {:.6}", m.predict(x));
            println!("integer ×100 path   : {:.2}", m.quantized(100).predict(x));
        }
        "iris" => {
            if features.len() != 4 {
                bail!("iris takes exactly 4 features, got {}", features.len());
            }
            let m = zoo::iris();
            let mut accel = DotAccel::new(bus);
            accel.init();

            let decision = m.decision(features);
            let accel_decision = m.decision_accel(&mut accel, features)?;
            println!("decision (CPU f64)  : {decision:.6}");
            println!("decision (engine)   : {accel_decision:.6}");
            println!("P(class 1)          : {:.4}", m.predict_proba(features));
            println!("class               : {}", m.classify(features));
        }
        other => bail!("unknown model: {other} (expected diabetes | iris)"),
    }
    Ok(())
}

fn cmd_regs() -> Result<()> {
    println!("CSR window ({:#x} bytes)", regs::WINDOW_SIZE);
    println!();
    println!("dot engine ({} lanes, combinational)", linreg_chip::DOT_LANES);
    println!("  {:#06x}  inputs", regs::dot::INPUT_BASE);
    println!("  {:#06x}  weights", regs::dot::WEIGHT_BASE);
    println!("  {:#06x}  result", regs::dot::RESULT);
    println!();
    println!("scalar engine (sequenced)");
    println!("  {:#06x}  weight", regs::scalar::WEIGHT);
    println!("  {:#06x}  bias", regs::scalar::BIAS);
    println!("  {:#06x}  input", regs::scalar::INPUT);
    println!("  {:#06x}  control  (START={:#x} RESET={:#x})",
        regs::scalar::CONTROL,
        regs::scalar::control::START,
        regs::scalar::control::RESET
    );
    println!("  {:#06x}  status   (READY={:#x} DONE={:#x} BUSY={:#x})",
        regs::scalar::STATUS,
        regs::scalar::status::READY,
        regs::scalar::status::DONE,
        regs::scalar::status::BUSY
    );
    println!("  {:#06x}  result", regs::scalar::RESULT);
    println!();
    println!("wide engine ({} lanes, sequenced)", linreg_chip::WIDE_LANES);
    println!("  {:#06x}  inputs", regs::wide::INPUT_BASE);
    println!("  {:#06x}  weights", regs::wide::WEIGHT_BASE);
    println!("  {:#06x}  bias", regs::wide::BIAS);
    println!("  {:#06x}  start", regs::wide::START);
    println!("  {:#06x}  done", regs::wide::DONE);
    println!("  {:#06x}  result", regs::wide::RESULT);
    Ok(())
}
