use crate::diagnostic::Diagnostic;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn banner(title: &str, subtitle: &str) {
    println!("{} {}", Icons::ROCKET, title);
    println!("   {}", subtitle.style(theme().dim.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn dim(text: &str) -> String {
    text.style(theme().dim.clone()).to_string()
}

/// One numbered line of a build order
pub fn order_line(index: usize, unit: &str) {
    println!("{:>4}  {}", dim(&format!("{}.", index + 1)), unit.style(theme().unit.clone()));
}

/// A dependency path such as a cycle, `a.rb → b.rb → a.rb`
pub fn path_line(units: &[String]) {
    let arrow = format!(" {} ", Icons::ARROW);
    println!("  {} {}", Icons::CYCLE, units.join(&arrow).style(theme().error.clone()));
}

pub fn diagnostic(d: &Diagnostic) {
    eprintln!("{} {}", Icons::WARN, d.to_string().style(theme().warn.clone()));
}
