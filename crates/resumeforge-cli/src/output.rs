//! Output formatting for CLI
//!
//! Every command prints through [`Output`]:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use resumeforge_core::api::{
    format_price, CheckoutSession, GenerateResponse, Plan, Product, TokenStatus,
};
use resumeforge_core::{AppliedTo, Education, Experience, IdSource, PersonalField, Resume};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print the whole resume
    pub fn print_resume(&self, resume: &Resume) {
        match self.format {
            OutputFormat::Human => {
                if resume.is_empty() {
                    println!("Resume is empty.");
                    return;
                }

                println!("── Personal ──");
                for field in PersonalField::ALL {
                    let value = resume.personal_info.get(*field);
                    if !value.is_empty() {
                        println!("{:<10} {}", format!("{}:", field), first_line(value));
                    }
                }

                println!();
                println!("── Experience ({}) ──", resume.experience.len());
                for entry in &resume.experience {
                    println!("{}", experience_line(entry));
                }

                println!();
                println!("── Education ({}) ──", resume.education.len());
                for entry in &resume.education {
                    println!("{}", education_line(entry));
                }

                println!();
                println!("── Skills ({}) ──", resume.skills.len());
                if !resume.skills.is_empty() {
                    println!("{}", resume.skills.join(", "));
                }
            }
            OutputFormat::Json => print_json(resume),
            OutputFormat::Quiet => {
                println!("{}", resume.personal_info.name);
            }
        }
    }

    pub fn print_experience(&self, entries: &[Experience]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("No experience entries.");
                    return;
                }
                for entry in entries {
                    println!("{}", experience_line(entry));
                }
                println!("\n{} entr{}", entries.len(), plural_y(entries.len()));
            }
            OutputFormat::Json => print_json(&entries),
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.id);
                }
            }
        }
    }

    pub fn print_education(&self, entries: &[Education]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("No education entries.");
                    return;
                }
                for entry in entries {
                    println!("{}", education_line(entry));
                }
                println!("\n{} entr{}", entries.len(), plural_y(entries.len()));
            }
            OutputFormat::Json => print_json(&entries),
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.id);
                }
            }
        }
    }

    pub fn print_skills(&self, skills: &[String]) {
        match self.format {
            OutputFormat::Human => {
                if skills.is_empty() {
                    println!("No skills.");
                    return;
                }
                for skill in skills {
                    println!("- {}", skill);
                }
            }
            OutputFormat::Json => print_json(&skills),
            OutputFormat::Quiet => {
                for skill in skills {
                    println!("{}", skill);
                }
            }
        }
    }

    /// Print generated content and where it was stored
    pub fn print_generated(&self, response: &GenerateResponse, applied: Option<&AppliedTo>) {
        match self.format {
            OutputFormat::Human => {
                println!("{}", response.content);
                println!();
                match applied {
                    Some(AppliedTo::Summary) => println!("✓ Saved as summary"),
                    Some(AppliedTo::Skills(count)) => println!("✓ Saved {} skill(s)", count),
                    Some(AppliedTo::NotRouted) | None => {}
                }
                println!(
                    "{} generation(s) remaining ({})",
                    response.tokens_remaining, response.source
                );
            }
            OutputFormat::Json => {
                let applied = applied.map(|a| match a {
                    AppliedTo::Summary => "summary",
                    AppliedTo::Skills(_) => "skills",
                    AppliedTo::NotRouted => "none",
                });
                print_json(&serde_json::json!({
                    "content": response.content,
                    "tokens_remaining": response.tokens_remaining,
                    "source": response.source,
                    "applied_to": applied,
                }));
            }
            OutputFormat::Quiet => {
                println!("{}", response.content);
            }
        }
    }

    pub fn print_token_status(&self, status: &TokenStatus) {
        match self.format {
            OutputFormat::Human => {
                println!("Tokens remaining: {}", status.tokens_remaining);
                println!("Used today:       {}/{}", status.daily_used, status.daily_limit);
                println!(
                    "Can generate:     {}",
                    if status.can_generate { "yes" } else { "no" }
                );
            }
            OutputFormat::Json => print_json(status),
            OutputFormat::Quiet => {
                println!("{}", status.tokens_remaining);
            }
        }
    }

    pub fn print_plans(&self, plans: &[Plan]) {
        match self.format {
            OutputFormat::Human => {
                for plan in plans {
                    let marker = if plan.is_popular() { " (popular)" } else { "" };
                    let sku = plan.sku().map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:<10} ${:>6}  {}{}",
                        plan.id(),
                        format_price(i64::from(plan.price_cents())),
                        sku,
                        marker
                    );
                }
            }
            OutputFormat::Json => {
                let plans: Vec<_> = plans
                    .iter()
                    .map(|plan| {
                        serde_json::json!({
                            "id": plan.id(),
                            "sku": plan.sku(),
                            "price_cents": plan.price_cents(),
                            "popular": plan.is_popular(),
                        })
                    })
                    .collect();
                print_json(&plans);
            }
            OutputFormat::Quiet => {
                for plan in plans {
                    println!("{}", plan.id());
                }
            }
        }
    }

    pub fn print_products(&self, products: &[Product]) {
        match self.format {
            OutputFormat::Human => {
                if products.is_empty() {
                    println!("No products available.");
                    return;
                }
                for product in products {
                    let discount = product
                        .discount_percent
                        .map(|d| format!("  save {}%", d))
                        .unwrap_or_default();
                    println!(
                        "{:<18} {:<18} ${:>6}  {} generations{}",
                        product.sku,
                        truncate(&product.name, 18),
                        format_price(product.price_cents),
                        product.generations,
                        discount
                    );
                }
            }
            OutputFormat::Json => print_json(&products),
            OutputFormat::Quiet => {
                for product in products {
                    println!("{}", product.sku);
                }
            }
        }
    }

    pub fn print_checkout(&self, session: &CheckoutSession, opened: bool) {
        match self.format {
            OutputFormat::Human => {
                if opened {
                    println!("Opened checkout in your browser.");
                } else {
                    println!("Open this link to complete your purchase:");
                }
                println!("  {}", session.checkout_url);
            }
            OutputFormat::Json => print_json(session),
            OutputFormat::Quiet => println!("{}", session.checkout_url),
        }
    }

    pub fn print_device(&self, id: &str, source: Option<IdSource>) {
        match self.format {
            OutputFormat::Human => {
                println!("Device ID: {}", id);
                if let Some(source) = source {
                    println!("Source:    {}", source_label(source));
                }
            }
            OutputFormat::Json => {
                print_json(&serde_json::json!({
                    "device_id": id,
                    "source": source.map(source_label),
                }));
            }
            OutputFormat::Quiet => println!("{}", id),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn source_label(source: IdSource) -> &'static str {
    match source {
        IdSource::Storage => "stored",
        IdSource::Fingerprint => "fingerprint",
        IdSource::Random => "random",
    }
}

fn experience_line(entry: &Experience) -> String {
    format!(
        "{} | {} | {} | {}",
        short_id(&entry.id.to_string()),
        truncate(&or_dash(&entry.title), 30),
        truncate(&or_dash(&entry.company), 25),
        date_range(&entry.start_date, &entry.end_date)
    )
}

fn education_line(entry: &Education) -> String {
    format!(
        "{} | {} | {} | {}",
        short_id(&entry.id.to_string()),
        truncate(&or_dash(&entry.degree), 30),
        truncate(&or_dash(&entry.school), 25),
        date_range(&entry.start_date, &entry.end_date)
    )
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn or_dash(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

fn date_range(start: &str, end: &str) -> String {
    match (start.is_empty(), end.is_empty()) {
        (true, true) => String::new(),
        (false, true) => format!("{} - present", start),
        _ => format!("{} - {}", start, end),
    }
}

fn plural_y(count: usize) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("Ingeniería de software", 10), "Ingenie...");
    }

    #[test]
    fn test_date_range() {
        assert_eq!(date_range("", ""), "");
        assert_eq!(date_range("2020", ""), "2020 - present");
        assert_eq!(date_range("2020", "2023"), "2020 - 2023");
        assert_eq!(date_range("", "2023"), " - 2023");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_experience_line() {
        let mut entry = Experience::new();
        entry.title = "Engineer".to_string();
        entry.start_date = "2021".to_string();

        let line = experience_line(&entry);
        assert!(line.contains("Engineer | - | 2021 - present"));
    }
}
