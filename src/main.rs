use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

mod ai;
mod boot;
mod crypto;
mod db;
mod google;
mod models;
mod rate_limit;
mod report;
mod workflow;

#[cfg(test)]
mod tests;

use google::auth;
use models::draft_history::DraftRecord;
use models::user::User;
use rate_limit::CallPacer;

#[derive(Parser)]
#[command(
    name = "daybrief",
    about = "Daily status-report drafts, from sheet to Gmail",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Authorize a Google account and store its secrets
    Login {
        /// Google OAuth client file (installed-app type)
        #[arg(long, default_value = "credentials.json")]
        credentials: PathBuf,
        /// Gemini API key for this account
        #[arg(long)]
        api_key: String,
    },
    /// Update the stored Gemini API key for an account
    SetKey {
        email: String,
        #[arg(long)]
        api_key: String,
    },
    /// List registered accounts, most recent login first
    Users,
    /// Delete an account and its draft history
    Delete { email: String },
    /// Generate a status report and file it as a Gmail draft
    Generate {
        /// Account to act as
        #[arg(long)]
        email: String,
        /// Google Sheets ID (from the sheet URL)
        #[arg(long)]
        sheet: String,
        /// Sheet range, e.g. "Sheet1" or "Sheet1!A1:F20"
        #[arg(long, default_value = "Sheet1")]
        range: String,
        /// Recipient; defaults to the account itself
        #[arg(long)]
        to: Option<String>,
        /// Compose and print only; skip draft creation
        #[arg(long)]
        preview: bool,
    },
    /// Show filed draft history for an account
    History {
        email: String,
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// List recent Gmail drafts
    Drafts {
        email: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Show one Gmail draft
    Draft { email: String, id: String },
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    // Boot check: verify/create directories before touching the database
    boot::run();

    let pool = match db::init_pool() {
        Ok(p) => p,
        Err(e) => fail(&format!("Failed to open database: {}", e)),
    };
    if let Err(e) = db::run_migrations(&pool) {
        fail(&format!("Failed to run migrations: {}", e));
    }

    let cipher = match crypto::Cipher::from_env_or_file() {
        Ok(c) => c,
        Err(e) => fail(&format!("Failed to load encryption key: {}", e)),
    };

    let pacer = CallPacer::new(report::MIN_CALL_INTERVAL);

    let result = match cli.command {
        Command::Login {
            credentials,
            api_key,
        } => login(&pool, &cipher, &credentials, &api_key),
        Command::SetKey { email, api_key } => {
            workflow::update_api_key(&pool, &cipher, &email, &api_key)
                .map(|_| println!("API key updated for {}", email))
        }
        Command::Users => {
            let emails = User::list_emails(&pool);
            if emails.is_empty() {
                println!("No accounts registered. Run `daybrief login` to add one.");
            }
            for email in emails {
                println!("{}", email);
            }
            Ok(())
        }
        Command::Delete { email } => {
            User::delete(&pool, &email).map(|_| println!("Account deleted: {}", email))
        }
        Command::Generate {
            email,
            sheet,
            range,
            to,
            preview,
        } => workflow::generate_report(
            &pool,
            &cipher,
            &pacer,
            &email,
            &sheet,
            &range,
            to.as_deref(),
            preview,
        )
        .map(print_report),
        Command::History { email, limit } => history(&pool, &cipher, &email, limit),
        Command::Drafts { email, limit } => {
            workflow::list_drafts(&pool, &cipher, &email, limit).map(|drafts| {
                if drafts.is_empty() {
                    println!("No drafts found.");
                }
                for d in drafts {
                    println!("{}  {}  to: {}  [{}]", d.date, d.subject, d.to, d.id);
                }
            })
        }
        Command::Draft { email, id } => {
            workflow::show_draft(&pool, &cipher, &email, &id).map(|d| {
                println!("Subject: {}", d.subject);
                println!("To: {}", d.to);
                println!("---");
                println!("{}", d.body);
            })
        }
    };

    if let Err(msg) = result {
        fail(&msg);
    }
}

fn login(
    pool: &db::DbPool,
    cipher: &crypto::Cipher,
    credentials: &PathBuf,
    api_key: &str,
) -> Result<(), String> {
    let secrets = auth::ClientSecrets::load(credentials)?;

    println!("Open this link and authorize access:\n");
    println!("  {}\n", auth::authorize_url(&secrets));
    print!("Paste the authorization code: ");
    io::stdout().flush().map_err(|e| e.to_string())?;

    let mut code = String::new();
    io::stdin()
        .lock()
        .read_line(&mut code)
        .map_err(|e| e.to_string())?;

    let email = workflow::complete_login(pool, cipher, &secrets, code.trim(), api_key)?;
    println!("Logged in as {}", email);
    Ok(())
}

fn history(
    pool: &db::DbPool,
    cipher: &crypto::Cipher,
    email: &str,
    limit: i64,
) -> Result<(), String> {
    let user =
        User::get(pool, cipher, email).ok_or_else(|| format!("No account found for {}", email))?;

    let records = DraftRecord::list_for_user(pool, user.id, limit);
    if records.is_empty() {
        println!("No drafts filed yet.");
    }
    for r in records {
        println!(
            "{}  {}  to: {}  [{}]",
            r.created_at,
            r.subject.unwrap_or_else(|| "No Subject".to_string()),
            r.recipient.unwrap_or_else(|| "Unknown".to_string()),
            r.draft_id
        );
    }
    Ok(())
}

fn print_report(report: workflow::Report) {
    println!("Subject: {}", report.subject);
    println!("To: {}", report.recipient);
    println!("---");
    println!("{}", report.body);
    match report.draft_id {
        Some(id) => println!("\nDraft created: {} (check your Gmail drafts)", id),
        None => println!("\nPreview only; no draft was created."),
    }
}

fn fail(msg: &str) -> ! {
    eprintln!("Error: {}", msg);
    process::exit(1);
}
