//! Naming flags shared by the subcommands
//!
//! Each option has an on and an off switch so the command line can override
//! the configuration file either way. The last switch given wins.

use clap::Args;

use crate::export::MappingOptions;

/// Namespace handling switches
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct NamespaceFlags {
    /// Strip namespace qualifiers from names
    #[arg(long, overrides_with = "no_ignore_ns")]
    pub ignore_ns: bool,
    /// Keep namespace qualifiers even if the configuration strips them
    #[arg(long, overrides_with = "ignore_ns")]
    pub no_ignore_ns: bool,
}

impl NamespaceFlags {
    pub fn resolve(&self, configured: bool) -> bool {
        switch(self.ignore_ns, self.no_ignore_ns).unwrap_or(configured)
    }
}

/// Namespace and table naming switches
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct MappingFlags {
    #[command(flatten)]
    pub namespaces: NamespaceFlags,
    /// Use full paths as table names
    #[arg(long, overrides_with = "no_full_name")]
    pub full_name: bool,
    /// Use local names even if the configuration asks for full paths
    #[arg(long, overrides_with = "full_name")]
    pub no_full_name: bool,
}

impl MappingFlags {
    /// Apply the switches given on the command line over `configured`
    pub fn resolve(&self, configured: MappingOptions) -> MappingOptions {
        MappingOptions::new(
            self.namespaces.resolve(configured.ignore_ns),
            switch(self.full_name, self.no_full_name).unwrap_or(configured.full_name),
        )
    }
}

fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        flags: MappingFlags,
    }

    fn resolve(args: &[&str], configured: MappingOptions) -> MappingOptions {
        let argv = std::iter::once("xml2sql").chain(args.iter().copied());
        Harness::try_parse_from(argv).unwrap().flags.resolve(configured)
    }

    #[test]
    fn test_config_applies_without_flags() {
        let configured = MappingOptions::new(true, true);
        assert_eq!(resolve(&[], configured), configured);
    }

    #[test]
    fn test_flags_override_config_both_ways() {
        assert_eq!(
            resolve(&["--no-ignore-ns", "--no-full-name"], MappingOptions::new(true, true)),
            MappingOptions::new(false, false)
        );
        assert_eq!(
            resolve(&["--ignore-ns", "--full-name"], MappingOptions::default()),
            MappingOptions::new(true, true)
        );
    }

    #[test]
    fn test_last_switch_wins() {
        let options = resolve(
            &["--ignore-ns", "--no-ignore-ns", "--no-full-name", "--full-name"],
            MappingOptions::default(),
        );
        assert_eq!(options, MappingOptions::new(false, true));
    }
}
