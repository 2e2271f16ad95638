use std::{
  path::PathBuf,
  process::ExitCode,
  time::Duration,
};

use clap::{Parser, ValueEnum};
use spire_abs::log::{set_global_logging_threshold, LogLevel};
use spire_lib::core::{
  config::{ProverConfig, ResourceLimits},
  ordering::{OrderingKind, PrecedenceKind},
  saturation::SaturationResult,
  selection::SelectionPolicy,
};

use spire::output::{exit_code, render_proof, status_word};

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum OrdArg {
  Kbo,
  Lpo,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum PrecedenceArg {
  Id,
  Arity,
  Freq,
  Invfreq,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum SelectArg {
  None,
  OneNeg,
  AllNeg,
  MaxNeg,
}

/// A superposition-based automated theorem prover.
#[derive(Parser)]
#[command(name = "spire", version, about)]
struct Cli {
  /// Problem file in the CNF language.
  problem: PathBuf,

  /// Wall-clock limit in seconds.
  #[arg(long)]
  timeout: Option<u64>,

  /// Limit on given-clause iterations.
  #[arg(long)]
  steps: Option<u64>,

  /// Limit on generated clauses.
  #[arg(long)]
  generated: Option<u64>,

  /// Term ordering.
  #[arg(long, value_enum, default_value = "kbo")]
  ord: OrdArg,

  /// Symbol precedence generator.
  #[arg(long, value_enum, default_value = "id")]
  precedence: PrecedenceArg,

  /// Literal selection strategy.
  #[arg(long, value_enum, default_value = "none")]
  select: SelectArg,

  /// Disable subsumption.
  #[arg(long)]
  no_subsumption: bool,

  /// Disable demodulation.
  #[arg(long)]
  no_demod: bool,

  /// Disable simplify-reflect.
  #[arg(long)]
  no_simplify_reflect: bool,

  /// Disable condensation.
  #[arg(long)]
  no_condensation: bool,

  /// Disable contextual literal cutting.
  #[arg(long)]
  no_literal_cutting: bool,

  /// Age:weight pick ratio for the passive queue, e.g. 1:5.
  #[arg(long, default_value = "1:5", value_parser = parse_ratio)]
  age_weight_ratio: (u32, u32),

  /// Print the proof on success.
  #[arg(long)]
  proof: bool,

  /// Print run statistics.
  #[arg(long)]
  stats: bool,

  /// Increase verbosity (-v info, -vv debug, -vvv trace).
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn parse_ratio(text: &str) -> Result<(u32, u32), String> {
  let (age, weight) = text
    .split_once(':')
    .ok_or_else(|| format!("expected AGE:WEIGHT, got {}", text))?;
  let age: u32 = age.parse().map_err(|_| format!("bad age count {}", age))?;
  let weight: u32 = weight.parse().map_err(|_| format!("bad weight count {}", weight))?;
  if age + weight == 0 {
    return Err("ratio must pick something".to_string());
  }
  Ok((age, weight))
}

impl Cli {
  fn config(&self) -> ProverConfig {
    ProverConfig {
      ordering: match self.ord {
        OrdArg::Kbo => OrderingKind::Kbo,
        OrdArg::Lpo => OrderingKind::Lpo,
      },
      precedence: match self.precedence {
        PrecedenceArg::Id      => PrecedenceKind::ById,
        PrecedenceArg::Arity   => PrecedenceKind::Arity,
        PrecedenceArg::Freq    => PrecedenceKind::Frequency,
        PrecedenceArg::Invfreq => PrecedenceKind::InvFrequency,
      },
      selection: match self.select {
        SelectArg::None   => SelectionPolicy::NoSelection,
        SelectArg::OneNeg => SelectionPolicy::SelectOneNegative,
        SelectArg::AllNeg => SelectionPolicy::SelectAllNegative,
        SelectArg::MaxNeg => SelectionPolicy::SelectMaxNegative,
      },
      enable_subsumption: !self.no_subsumption,
      enable_demodulation: !self.no_demod,
      enable_simplify_reflect: !self.no_simplify_reflect,
      enable_condensation: !self.no_condensation,
      enable_literal_cutting: !self.no_literal_cutting,
      age_weight_ratio: self.age_weight_ratio,
      limits: ResourceLimits {
        timeout: self.timeout.map(Duration::from_secs),
        max_steps: self.steps,
        max_generated: self.generated,
      },
    }
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  set_global_logging_threshold(match cli.verbose {
    0 => LogLevel::Warning,
    1 => LogLevel::Info,
    2 => LogLevel::Debug,
    _ => LogLevel::Trace,
  });

  let text = match std::fs::read_to_string(&cli.problem) {
    Ok(text) => text,
    Err(error) => {
      eprintln!("cannot read {}: {}", cli.problem.display(), error);
      return ExitCode::from(3);
    }
  };

  let (result, stats) = match spire::run_problem(&text, cli.config()) {
    Ok(outcome) => outcome,
    Err(error) => {
      eprintln!("{}", error);
      return ExitCode::from(3);
    }
  };

  println!("% SZS status {}", status_word(&result));
  if let SaturationResult::Unsatisfiable(empty) = &result {
    if cli.proof {
      println!("% SZS output start Proof");
      print!("{}", render_proof(empty));
      println!("% SZS output end Proof");
    }
  }
  if cli.stats {
    eprintln!("{}", stats);
  }

  ExitCode::from(exit_code(&result) as u8)
}
