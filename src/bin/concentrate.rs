//! One-shot calculator
//!
//! Usage:
//! ```bash
//! concentrate convert 5 mM mol/L
//! concentrate convert 2 mol/L mg/mL 180
//! concentrate dilute 10 mol/L 1 mol/L 100 mL
//! concentrate mix 0.5 mol/L 100 mL 1:mol/L 5:mg/mL:180:2
//! ```

use clap::{Parser, Subcommand};
use concentrator::tools::conversion::convert_concentration;
use concentrator::tools::dilution::{calculate_dilution, DilutionForm};
use concentrator::tools::mixture::{calculate_mixture, rows_from_fields, CompoundFields, MixtureForm};

#[derive(Parser)]
#[command(
    name = "concentrate",
    version,
    about = "Lab solution calculator",
    long_about = "Runs one concentration conversion, dilution or mixture calculation and prints the result."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a concentration between units
    Convert {
        /// Concentration value
        value: String,
        /// Unit to convert from: mol/L, mM, µM, nM, mg/mL
        from: String,
        /// Unit to convert to: mol/L, mM, µM, nM, mg/mL
        to: String,
        /// Molecular weight in g/mol, needed when either unit is mg/mL
        molecular_weight: Option<String>,
    },

    /// Volumes of stock and diluent for a target concentration
    Dilute {
        /// Stock concentration
        stock: String,
        stock_unit: String,
        /// Target concentration
        target: String,
        target_unit: String,
        /// Target volume
        volume: String,
        /// Volume unit: mL or µL
        volume_unit: String,
        /// Molecular weight in g/mol, needed when either unit is mg/mL
        molecular_weight: Option<String>,
    },

    /// Volumes of each compound stock and buffer for a mixture
    Mix {
        /// Target concentration
        target: String,
        target_unit: String,
        /// Target volume
        volume: String,
        /// Volume unit: mL or µL
        volume_unit: String,
        /// Final mass, only read for an mg/mL target
        #[arg(long)]
        final_mass: Option<String>,
        /// Compounds as conc:unit[:mw[:ratio]]
        #[arg(required = true, value_parser = parse_compound_arg)]
        compounds: Vec<CompoundArg>,
    },
}

/// One `conc:unit[:mw[:ratio]]` compound argument
#[derive(Debug, Clone, PartialEq)]
struct CompoundArg {
    concentration: Option<String>,
    unit: Option<String>,
    molecular_weight: Option<String>,
    ratio: Option<u32>,
}

impl CompoundArg {
    fn as_fields(&self) -> CompoundFields<'_> {
        CompoundFields {
            concentration: self.concentration.as_deref(),
            unit: self.unit.as_deref(),
            molecular_weight: self.molecular_weight.as_deref(),
            ratio: self.ratio,
        }
    }
}

fn parse_compound_arg(arg: &str) -> Result<CompoundArg, String> {
    if arg.split(':').count() > 4 {
        return Err("expected at most conc:unit:mw:ratio".to_string());
    }
    let mut parts = arg.split(':').map(|s| Some(s).filter(|s| !s.is_empty()));
    let mut next = || parts.next().flatten().map(str::to_string);
    let concentration = next();
    let unit = next();
    let molecular_weight = next();
    let ratio = match next() {
        Some(r) => Some(
            r.parse::<u32>()
                .map_err(|_| format!("invalid mixing ratio '{}'", r))?,
        ),
        None => None,
    };
    Ok(CompoundArg {
        concentration,
        unit,
        molecular_weight,
        ratio,
    })
}

fn run(command: Command) -> Result<String, String> {
    match command {
        Command::Convert {
            value,
            from,
            to,
            molecular_weight,
        } => convert_concentration(&value, &from, &to, molecular_weight.as_deref())
            .map(|r| r.display)
            .map_err(|e| e.to_string()),
        Command::Dilute {
            stock,
            stock_unit,
            target,
            target_unit,
            volume,
            volume_unit,
            molecular_weight,
        } => {
            let form = DilutionForm {
                stock_concentration: &stock,
                stock_unit: &stock_unit,
                final_concentration: &target,
                final_unit: &target_unit,
                final_volume: &volume,
                volume_unit: &volume_unit,
                molecular_weight: molecular_weight.as_deref(),
            };
            let r = calculate_dilution(&form).map_err(|e| e.to_string())?;
            if r.feasible {
                Ok(r.display)
            } else {
                Ok(format!(
                    "{}\nStock is too dilute to reach the target concentration.",
                    r.display
                ))
            }
        }
        Command::Mix {
            target,
            target_unit,
            volume,
            volume_unit,
            final_mass,
            compounds,
        } => {
            let fields: Vec<CompoundFields<'_>> = compounds.iter().map(CompoundArg::as_fields).collect();
            let rows = rows_from_fields(&fields).map_err(|e| e.to_string())?;
            let form = MixtureForm {
                final_concentration: &target,
                final_concentration_unit: &target_unit,
                final_volume: &volume,
                volume_unit: &volume_unit,
                final_mass: final_mass.as_deref(),
            };
            calculate_mixture(&rows, &form)
                .map(|r| r.display)
                .map_err(|e| e.to_string())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(output) => println!("{}", output),
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn run_line(line: &str) -> Result<String, String> {
        let cli = Cli::try_parse_from(std::iter::once("concentrate").chain(line.split_whitespace()))
            .map_err(|e| e.to_string())?;
        run(cli.command)
    }

    fn parse_error(line: &str) -> ErrorKind {
        match Cli::try_parse_from(std::iter::once("concentrate").chain(line.split_whitespace())) {
            Ok(_) => panic!("'{}' should not parse", line),
            Err(e) => e.kind(),
        }
    }

    #[test]
    fn test_convert() {
        assert_eq!(run_line("convert 5 mM mol/L").unwrap(), "5.00 mM = 0.01 mol/L");
        assert_eq!(
            run_line("convert 2 mol/L mg/mL 180").unwrap(),
            "2.00 mol/L = 360.00 mg/mL"
        );
    }

    #[test]
    fn test_dilute() {
        assert_eq!(
            run_line("dilute 10 mol/L 1 mol/L 100 mL").unwrap(),
            "Stock: 10.00 mL, Diluent: 90.00 mL"
        );
        assert!(run_line("dilute 1 mol/L 2 mol/L 100 mL")
            .unwrap()
            .contains("too dilute"));
    }

    #[test]
    fn test_mix() {
        assert_eq!(
            run_line("mix 0.5 mol/L 100 mL 1:mol/L 1:mol/L::1").unwrap(),
            "Compound 1: 25.00 mL\nCompound 2: 25.00 mL\nBuffer: 50.00 mL"
        );
    }

    #[test]
    fn test_mix_final_mass_flag() {
        let err = run_line("mix 0.5 mg/mL 100 mL --final-mass 0 1:mol/L").unwrap_err();
        assert!(err.contains("final mass"), "{}", err);
        assert!(run_line("mix 0.5 mg/mL 100 mL --final-mass 3 1:mol/L").is_ok());
    }

    #[test]
    fn test_parse_compound_arg() {
        let arg = parse_compound_arg("5:mg/mL:180:2").unwrap();
        let f = arg.as_fields();
        assert_eq!(f.concentration, Some("5"));
        assert_eq!(f.unit, Some("mg/mL"));
        assert_eq!(f.molecular_weight, Some("180"));
        assert_eq!(f.ratio, Some(2));

        let arg = parse_compound_arg("5").unwrap();
        assert_eq!(arg.unit, None);
        assert_eq!(parse_compound_arg("5:mM::").unwrap().molecular_weight, None);
        assert!(parse_compound_arg("5:mM::x").is_err());
        assert!(parse_compound_arg("5:mM:1:1:1").is_err());
    }

    #[test]
    fn test_help_and_bad_arguments_are_parse_errors() {
        assert_eq!(parse_error("--help"), ErrorKind::DisplayHelp);
        assert_eq!(parse_error("mix --help"), ErrorKind::DisplayHelp);
        assert_eq!(parse_error("convert 5 mM mol/L 1 2"), ErrorKind::UnknownArgument);
        assert_eq!(parse_error("mix 0.5 mol/L 100 mL"), ErrorKind::MissingRequiredArgument);
        assert_eq!(parse_error("mix 0.5 mol/L 100 mL 1:mM::x"), ErrorKind::ValueValidation);
        assert!(Cli::try_parse_from(["concentrate", "bogus"]).is_err());
    }

    #[test]
    fn test_calculation_errors_are_messages() {
        let err = run_line("convert abc mM mol/L").unwrap_err();
        assert!(err.contains("concentration"));
    }
}
