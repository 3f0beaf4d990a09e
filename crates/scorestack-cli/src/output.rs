use colored::Colorize;
use scorestack_setup::ProvisionReport;
use tabled::builder::Builder;
use tabled::settings::Style;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_report(report: &ProvisionReport) {
    if report.applied.is_empty() {
        println!("No resources in manifest.");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(["Kind", "Name"]);
    for resource in &report.applied {
        builder.push_record([resource.kind.as_str(), resource.name.as_str()]);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
    println!("Applied: {}", report.applied.len());
}

/// One line per service for `check`.
pub fn print_state(service: &str, url: &str, state: Result<&str, String>) {
    match state {
        Ok("green") => println!(
            "{} {} ({}) is {}",
            "✓".green(),
            service,
            url.cyan(),
            "green".green()
        ),
        Ok(other) => println!(
            "{} {} ({}) is {}",
            "…".yellow(),
            service,
            url.cyan(),
            other.yellow()
        ),
        Err(e) => println!("{} {} ({}) {}", "✗".red(), service, url.cyan(), e.red()),
    }
}
