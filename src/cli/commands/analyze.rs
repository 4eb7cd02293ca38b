//! Analyze command handler

use std::path::PathBuf;

use crate::cli::commands::prepare;
use crate::cli::error::CliError;
use crate::schema::Selection;

/// Arguments for the analyze command
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    pub input: PathBuf,
    pub ignore_ns: bool,
    /// Write the default selection here
    pub output: Option<PathBuf>,
    /// Print the tree as JSON instead of text
    pub json: bool,
}

/// Print the schema tree with default checkmarks
pub fn handle_analyze(args: &AnalyzeArgs) -> Result<(), CliError> {
    let prepared = prepare(&args.input, None, args.ignore_ns)?;
    let analysis = &prepared.analysis;

    if args.json {
        let json = serde_json::to_string_pretty(analysis).map_err(|e| {
            CliError::InvalidArgument(format!("Failed to serialize analysis: {}", e))
        })?;
        println!("{}", json);
    } else {
        print!("{}", analysis.tree.render(&prepared.checked));
        if !analysis.collisions.is_empty() {
            println!();
            println!("Naming collisions:");
            for collision in &analysis.collisions {
                println!("  {}", collision);
            }
        }
    }

    if let Some(output) = &args.output {
        Selection::new(prepared.ignore_ns, prepared.checked.clone())
            .save(output)
            .map_err(|e| CliError::FileWriteError(output.clone(), format!("{:#}", e)))?;
        eprintln!("Selection written to {}", output.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_analyze_writes_selection() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.xml");
        std::fs::write(&input, "<Root><Item>A</Item><Item>B</Item></Root>").unwrap();
        let output = dir.path().join("selection.json");

        handle_analyze(&AnalyzeArgs {
            input,
            ignore_ns: false,
            output: Some(output.clone()),
            json: false,
        })
        .unwrap();

        let selection = Selection::load(&output).unwrap();
        assert!(!selection.ignore_ns);
        assert!(selection.checked.contains("Root/Item"));
    }
}
