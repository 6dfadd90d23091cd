//! Output rendering for API objects.
//!
//! Two paths exist: the one-line success message written after a mutation
//! (`print_success`) and the [`ObjectPrinter`] selected by `--output`.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::Serialize;

use crate::errors::PrinterError;
use crate::models::{UserIdentityMapping, RESOURCE_SINGULAR};

/// An API object the printers know how to render.
pub trait PrintableObject: Serialize {
    /// Singular lowercase resource name (e.g. `useridentitymapping`).
    fn resource(&self) -> &'static str;

    /// Object name.
    fn name(&self) -> &str;

    /// Column headers for the human-readable table.
    fn table_headers(&self) -> &'static [&'static str];

    /// One table row, aligned with [`table_headers`](Self::table_headers).
    fn table_row(&self) -> Vec<String>;
}

impl PrintableObject for UserIdentityMapping {
    fn resource(&self) -> &'static str {
        RESOURCE_SINGULAR
    }

    fn name(&self) -> &str {
        UserIdentityMapping::name(self)
    }

    fn table_headers(&self) -> &'static [&'static str] {
        &["NAME", "IDENTITY", "USER NAME", "USER UID"]
    }

    fn table_row(&self) -> Vec<String> {
        vec![
            self.name().to_string(),
            self.identity.name.clone(),
            self.user.name.clone(),
            self.user.uid.clone().unwrap_or_default(),
        ]
    }
}

// ---------------------------------------------------------------------------
// Output format
// ---------------------------------------------------------------------------

/// Value of the `--output` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// No `--output` given.
    #[default]
    Default,
    Name,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Whether the success line (rather than the object) is printed.
    pub fn prints_success(&self) -> bool {
        matches!(self, Self::Default | Self::Name)
    }

    /// Whether the abbreviated `resource/name` form is requested.
    pub fn is_short(&self) -> bool {
        *self == Self::Name
    }
}

impl FromStr for OutputFormat {
    type Err = PrinterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Self::Default),
            "name" => Ok(Self::Name),
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            other => Err(PrinterError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, ""),
            Self::Name => write!(f, "name"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

// ---------------------------------------------------------------------------
// Printing
// ---------------------------------------------------------------------------

/// Write the one-line result of `operation` (e.g. `created`) on `obj`.
///
/// Short form is `resource/name`; the long form is
/// `resource "name" <operation>`. Both gain a ` (dry run)` suffix when
/// nothing was persisted.
pub fn print_success<W, O>(
    short: bool,
    out: &mut W,
    obj: &O,
    dry_run: bool,
    operation: &str,
) -> Result<(), PrinterError>
where
    W: Write + ?Sized,
    O: PrintableObject + ?Sized,
{
    let dry_run_msg = if dry_run { " (dry run)" } else { "" };
    if short {
        writeln!(out, "{}/{}{}", obj.resource(), obj.name(), dry_run_msg)?;
    } else {
        writeln!(
            out,
            "{} \"{}\" {}{}",
            obj.resource(),
            obj.name(),
            operation,
            dry_run_msg
        )?;
    }
    Ok(())
}

/// Renders full objects in the format chosen by `--output`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectPrinter {
    format: OutputFormat,
}

impl ObjectPrinter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn print<W, O>(&self, obj: &O, out: &mut W) -> Result<(), PrinterError>
    where
        W: Write + ?Sized,
        O: PrintableObject,
    {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, obj)?;
                writeln!(out)?;
            }
            OutputFormat::Yaml => {
                let yaml = serde_yaml::to_string(obj)?;
                out.write_all(yaml.as_bytes())?;
            }
            OutputFormat::Name => {
                writeln!(out, "{}/{}", obj.resource(), obj.name())?;
            }
            OutputFormat::Default => print_table(obj, out)?,
        }
        Ok(())
    }
}

fn print_table<W, O>(obj: &O, out: &mut W) -> Result<(), PrinterError>
where
    W: Write + ?Sized,
    O: PrintableObject,
{
    let headers = obj.table_headers();
    let row = obj.table_row();
    let widths: Vec<usize> = headers
        .iter()
        .zip(&row)
        .map(|(h, v)| h.len().max(v.len()))
        .collect();

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = w))
            .collect::<Vec<_>>()
            .join("   ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(headers.to_vec()))?;
    writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
    Ok(())
}
