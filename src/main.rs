mod db;
mod fields;
mod merge;
mod models;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use db::Database;
use merge::ApplicationForm;

#[derive(Parser)]
#[command(name = "apptrack")]
#[command(about = "Track job applications - statuses, dates, compensation, and notes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Add a new application
    Add {
        /// Company name
        #[arg(value_parser = non_blank)]
        company: String,

        /// Role applied for
        #[arg(value_parser = non_blank)]
        role: String,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// List applications
    List {
        /// Which view to show
        #[arg(short, long, default_value = "active")]
        view: View,
    },

    /// Show application details and notes
    Show {
        /// Application ID
        id: i64,
    },

    /// Edit an application (resubmits the full form: omitted options keep
    /// their stored value, empty-string options clear it, and checkbox
    /// flags left off are cleared)
    Edit {
        /// Application ID
        id: i64,

        /// Company name
        #[arg(value_parser = non_blank)]
        company: String,

        /// Role applied for
        #[arg(value_parser = non_blank)]
        role: String,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Delete an application and its notes
    Delete {
        /// Application ID
        id: i64,
    },

    /// Mark an application active
    Activate {
        /// Application ID
        id: i64,
    },

    /// Mark an application inactive
    Deactivate {
        /// Application ID
        id: i64,
    },

    /// Append a timestamped note to an application
    Note {
        /// Application ID
        id: i64,

        /// Note content (the timestamp is added automatically)
        content: String,
    },

    /// Dump applications and their notes as JSON
    Export {
        /// Which view to export
        #[arg(short, long, default_value = "all")]
        view: View,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum View {
    /// Active applications only
    Active,
    /// Inactive applications only
    Inactive,
    /// Everything
    All,
}

impl View {
    fn is_active(self) -> Option<bool> {
        match self {
            View::Active => Some(true),
            View::Inactive => Some(false),
            View::All => None,
        }
    }
}

/// The raw form fields shared by add and edit. An omitted option is a field
/// that was not submitted at all; an option given "" clears the field.
#[derive(Args)]
struct FieldArgs {
    /// Date applied (YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,

    /// Status (e.g. applied, screening, rejected)
    #[arg(long)]
    status: Option<String>,

    /// Contact person
    #[arg(long)]
    contact: Option<String>,

    /// Contact phone
    #[arg(long)]
    phone: Option<String>,

    /// Posting URL (absolute, with scheme)
    #[arg(long)]
    url: Option<String>,

    /// Interview date (YYYY-MM-DD)
    #[arg(long)]
    interview: Option<String>,

    /// Salary as a plain number, e.g. 85000
    #[arg(long)]
    salary: Option<String>,

    /// Bonus percentage, e.g. "12.5%"
    #[arg(long)]
    bonus: Option<String>,

    /// PTO terms
    #[arg(long)]
    pto: Option<String>,

    /// Cover letter submitted
    #[arg(long)]
    cover_letter: bool,

    /// Offer received
    #[arg(long)]
    offer: bool,

    /// Equity included
    #[arg(long)]
    equity: bool,

    /// Health coverage included
    #[arg(long)]
    health_coverage: bool,
}

fn non_blank(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("must not be blank".to_string())
    } else {
        Ok(s.to_string())
    }
}

fn to_form(company: String, role: String, fields: FieldArgs) -> ApplicationForm {
    ApplicationForm {
        company_name: company,
        role,
        application_date: fields.date,
        status: fields.status,
        contact_person: fields.contact,
        phone: fields.phone,
        url: fields.url,
        interview_date: fields.interview,
        salary: fields.salary,
        bonus: fields.bonus,
        pto: fields.pto,
        cover_letter: fields.cover_letter,
        offer: fields.offer,
        equity: fields.equity,
        health_coverage: fields.health_coverage,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let db = Database::open()?;

    match cli.command {
        Commands::Init => {
            db.init()?;
            println!("Database initialized at {}", db.path().display());
        }

        Commands::Add {
            company,
            role,
            fields,
        } => {
            db.ensure_initialized()?;
            let form = to_form(company, role, fields);
            let draft = merge::create(&form);
            let id = db.create_application(&draft)?;
            println!(
                "Added application #{} ({} - {})",
                id, draft.company_name, draft.role
            );
        }

        Commands::List { view } => {
            db.ensure_initialized()?;
            let applications = db.list_applications(view.is_active())?;
            if applications.is_empty() {
                println!("No applications found.");
            } else {
                println!(
                    "{:<6} {:<22} {:<24} {:<12} {:<12} {:>12}",
                    "ID", "COMPANY", "ROLE", "STATUS", "APPLIED", "SALARY"
                );
                println!("{}", "-".repeat(92));
                for app in applications {
                    let salary = app
                        .salary
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:<6} {:<22} {:<24} {:<12} {:<12} {:>12}",
                        app.id,
                        truncate(&app.company_name, 20),
                        truncate(&app.role, 22),
                        truncate(app.status.as_deref().unwrap_or("-"), 10),
                        app.application_date
                            .map(|d| d.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                        truncate(&salary, 12)
                    );
                }
            }
        }

        Commands::Show { id } => {
            db.ensure_initialized()?;
            match db.get_application(id)? {
                Some(app) => {
                    println!("Application #{}", app.id);
                    println!("Company: {}", app.company_name);
                    println!("Role: {}", app.role);
                    if let Some(date) = app.application_date {
                        println!("Applied: {}", date);
                    }
                    if let Some(status) = &app.status {
                        println!("Status: {}", status);
                    }
                    if let Some(contact) = &app.contact_person {
                        println!("Contact: {}", contact);
                    }
                    if let Some(phone) = &app.phone {
                        println!("Phone: {}", phone);
                    }
                    if let Some(url) = &app.url {
                        println!("URL: {}", url);
                    }
                    if let Some(date) = app.interview_date {
                        println!("Interview: {}", date);
                    }
                    if let Some(salary) = app.salary {
                        println!("Salary: {}", salary);
                    }
                    if let Some(bonus) = app.bonus {
                        println!("Bonus: {}", percent_display(bonus));
                    }
                    if let Some(pto) = &app.pto {
                        println!("PTO: {}", pto);
                    }
                    println!(
                        "Cover letter: {}  Offer: {}  Equity: {}  Health coverage: {}",
                        yes_no(app.cover_letter),
                        yes_no(app.offer),
                        yes_no(app.equity),
                        yes_no(app.health_coverage)
                    );
                    println!("Active: {}", yes_no(app.is_active));
                    println!("Created: {}", app.created_at);

                    let notes = db.list_notes(id)?;
                    if !notes.is_empty() {
                        println!("\nNotes ({}):", notes.len());
                        for note in notes {
                            println!("  {}", note.content);
                        }
                    }
                }
                None => {
                    println!("Application #{} not found.", id);
                }
            }
        }

        Commands::Edit {
            id,
            company,
            role,
            fields,
        } => {
            db.ensure_initialized()?;
            match db.get_application(id)? {
                Some(existing) => {
                    let form = to_form(company, role, fields);
                    let draft = merge::update(&existing, &form);
                    if db.update_application(id, &draft)? {
                        println!("Updated application #{}", id);
                    } else {
                        println!("Application #{} not found.", id);
                    }
                }
                None => {
                    println!("Application #{} not found.", id);
                }
            }
        }

        Commands::Delete { id } => {
            db.ensure_initialized()?;
            if db.delete_application(id)? {
                println!("Deleted application #{}", id);
            } else {
                println!("Application #{} not found.", id);
            }
        }

        Commands::Activate { id } => {
            db.ensure_initialized()?;
            if db.set_active(id, true)? {
                println!("Application #{} marked active.", id);
            } else {
                println!("Application #{} not found.", id);
            }
        }

        Commands::Deactivate { id } => {
            db.ensure_initialized()?;
            if db.set_active(id, false)? {
                println!("Application #{} marked inactive.", id);
            } else {
                println!("Application #{} not found.", id);
            }
        }

        Commands::Note { id, content } => {
            db.ensure_initialized()?;
            match db.add_note(id, &content)? {
                Some(note_id) => println!("Added note #{} to application #{}", note_id, id),
                None => println!("Application #{} not found.", id),
            }
        }

        Commands::Export { view } => {
            db.ensure_initialized()?;
            let applications = db.list_applications(view.is_active())?;
            let mut entries = Vec::new();
            for app in applications {
                let notes = db.list_notes(app.id)?;
                entries.push(serde_json::json!({
                    "application": app,
                    "notes": notes,
                }));
            }
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }

    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Display a stored bonus fraction as a percentage, rounded to four decimal
/// places so float noise (0.333 -> 33.300000000000004) never reaches the
/// output.
fn percent_display(fraction: f64) -> String {
    format!("{}%", (fraction * 1_000_000.0).round() / 10_000.0)
}

/// Shorten to at most `max` characters. Counts chars, not bytes, so a
/// multi-byte name never splits mid-character.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let prefix: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", prefix)
    }
}
