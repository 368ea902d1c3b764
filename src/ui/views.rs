//! Success and failure panels plus the per-action result views.
//!
//! Result views print to stdout; panels that signal a problem go to stderr.

use std::fmt::Display;

use crate::services::gateway::{MembershipCounters, PublishResponse};
use crate::services::plugins::PluginCatalogue;

pub fn success(message: impl Display) {
    println!("\u{2713} {message}");
}

/// Failure panel for an interactive action. Verbose mode prints the full
/// error chain instead of the single-line summary.
pub fn failure(error: &anyhow::Error, verbose: bool) {
    eprintln!("x Action Failed");
    eprintln!();
    eprintln!("Details");
    if verbose {
        eprintln!("   {error:?}");
    } else {
        eprintln!("   {error:#}");
    }
}

pub fn publish_result(file: &str, response: &PublishResponse) {
    success(format!("Configuration {file} Published"));
    if !response.message.is_empty() {
        println!();
        println!("{}", response.message);
    }
    if !response.results.is_empty() {
        println!();
        println!("{}", response.results);
    }
}

pub fn membership_result(counters: &MembershipCounters) {
    success("Membership Updated");
    println!();
    println!("+ {} Added", counters.added);
    println!("- {} Removed", counters.removed);
    println!("? {} Missing", counters.missing);
}

pub fn plugins_list(catalogue: &PluginCatalogue) {
    println!("GWA Plugins");
    println!("* denotes BC Gov plugin");
    println!();

    for entry in catalogue.values() {
        let marker = if entry.meta.bcgov { " *" } else { "" };
        if entry.meta.url.is_empty() {
            println!("{}{marker}", entry.meta.name);
        } else {
            println!("{}{marker}  {}", entry.meta.name, entry.meta.url);
        }
        if !entry.meta.description.is_empty() {
            println!("    {}", entry.meta.description);
        }
        println!();
    }
}

pub fn update_notice(latest: &str) {
    eprintln!(
        "A newer release v{latest} is available: https://github.com/bcgov/gwa-cli/releases"
    );
}
