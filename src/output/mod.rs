//! Output formatting for CLI results

use colored::Colorize;

use crate::cli::OutputFormat;
use crate::client::BulletToken;
use crate::error::Result;

pub mod json;

/// Trait for types that can be formatted for output
pub trait Formattable {
    /// Format the data according to the specified format
    fn format(&self, format: OutputFormat) -> Result<String>;
}

/// Format and print data to stdout
pub fn print<T: Formattable>(data: &T, format: OutputFormat) -> Result<()> {
    let output = data.format(format)?;
    println!("{}", output);
    Ok(())
}

impl Formattable for BulletToken {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(json::format_json(self)?),
            OutputFormat::Pretty => Ok(format!(
                "{} {}\n{} {}\n{} {}\n{} {}",
                "Bullet token:".bold(),
                self.bullet,
                "Language:".bold(),
                self.language,
                "Country:".bold(),
                self.country,
                "Web app version:".bold(),
                self.version,
            )),
        }
    }
}
