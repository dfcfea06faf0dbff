//! Command handlers. Each one drives the `ApiClient` and prints the result.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use tracing::warn;

use cashbook_core::config::Config;
use cashbook_core::models::{
    DateRange, ExportFormat, NewTransaction, Pagination, TransactionFilter, TransactionType,
};
use cashbook_core::utils::{
    format_amount, format_date, format_optional, format_signed_amount, truncate_string,
};
use cashbook_core::{ApiClient, ApiError};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum EntryType {
    In,
    Out,
}

impl From<EntryType> for TransactionType {
    fn from(value: EntryType) -> Self {
        match value {
            EntryType::In => TransactionType::CashIn,
            EntryType::Out => TransactionType::CashOut,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Period {
    AllTime,
    Today,
    Last7Days,
    Last30Days,
    ThisMonth,
}

impl From<Period> for DateRange {
    fn from(value: Period) -> Self {
        match value {
            Period::AllTime => DateRange::AllTime,
            Period::Today => DateRange::Today,
            Period::Last7Days => DateRange::Last7Days,
            Period::Last30Days => DateRange::Last30Days,
            Period::ThisMonth => DateRange::ThisMonth,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Format {
    Excel,
    Pdf,
}

impl From<Format> for ExportFormat {
    fn from(value: Format) -> Self {
        match value {
            Format::Excel => ExportFormat::Excel,
            Format::Pdf => ExportFormat::Pdf,
        }
    }
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Cashbook ID (defaults to the configured default cashbook)
    #[arg(short, long)]
    pub cashbook: Option<i64>,
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
    #[arg(long = "type", value_enum)]
    pub kind: Option<EntryType>,
    #[arg(long)]
    pub category: Option<i64>,
    #[arg(long)]
    pub party: Option<i64>,
    #[arg(long)]
    pub member: Option<i64>,
    #[arg(long)]
    pub payment_mode: Option<i64>,
    #[arg(long, value_enum, default_value_t = Period::AllTime)]
    pub period: Period,
    #[arg(short, long)]
    pub search: Option<String>,
    /// Print the raw JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl FilterArgs {
    fn to_filter(&self, config: &Config) -> Result<TransactionFilter> {
        let cashbook = self
            .cashbook
            .or(config.default_cashbook)
            .context("No cashbook given. Pass --cashbook or set default_cashbook in the config")?;
        Ok(TransactionFilter {
            cashbook: Some(cashbook),
            page: Some(self.page),
            kind: self.kind.map(Into::into),
            category: self.category,
            party: self.party,
            member: self.member,
            payment_mode: self.payment_mode,
            duration: self.period.into(),
            search: self.search.clone(),
        })
    }
}

#[derive(Args, Debug)]
pub struct NewEntryArgs {
    #[arg(short, long)]
    pub cashbook: Option<i64>,
    #[arg(long = "type", value_enum)]
    pub kind: EntryType,
    #[arg(short, long)]
    pub amount: f64,
    #[arg(long)]
    pub category: i64,
    #[arg(long)]
    pub payment_mode: i64,
    #[arg(long)]
    pub party: Option<i64>,
    #[arg(short, long, default_value = "")]
    pub remark: String,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    pub report_id: i64,
    #[arg(short, long, value_enum, default_value_t = Format::Pdf)]
    pub format: Format,
    /// Output file (defaults to `<cashbook>_report.<ext>` in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Turn an API failure into a message for the terminal.
fn describe(err: ApiError) -> anyhow::Error {
    match err {
        ApiError::Validation { .. } => {
            anyhow::anyhow!("Request rejected:\n{}", err.field_errors().join("\n"))
        }
        other => anyhow::Error::new(other),
    }
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{}", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub async fn login(client: &ApiClient, config: &mut Config, username: Option<String>) -> Result<()> {
    let username = match username.or_else(|| config.last_username.clone()) {
        Some(name) if !name.is_empty() => name,
        _ => prompt("Username: ")?,
    };
    if username.is_empty() {
        bail!("Username is required");
    }
    let password = rpassword::prompt_password(format!("Password for {}: ", username))
        .context("Failed to read password")?;

    match client.login(&username, &password).await {
        Ok(user) => {
            println!("Signed in as {}", user.display_name());
            config.last_username = Some(username);
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            Ok(())
        }
        Err(e) if e.is_network() => Err(anyhow::Error::new(e).context("Could not reach the server")),
        Err(e) => bail!("{}", e.login_message()),
    }
}

pub async fn logout(client: &ApiClient) -> Result<()> {
    client.logout().await;
    println!("Signed out");
    Ok(())
}

pub async fn whoami(client: &ApiClient) -> Result<()> {
    match client.bootstrap().await? {
        Some(user) => {
            println!("{}", user.display_name());
            if let Some(ref email) = user.email {
                println!("{}", email);
            }
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

pub async fn cashbooks(client: &ApiClient) -> Result<()> {
    let books = client.list_cashbooks().await.map_err(describe)?;
    if books.is_empty() {
        println!("No cashbooks yet");
        return Ok(());
    }

    println!("{:>6}  {:<28}  {:>14}", "ID", "NAME", "BALANCE");
    for book in &books {
        let marker = if book.is_default { "*" } else { " " };
        println!(
            "{:>6}{} {:<28}  {:>14}",
            book.id,
            marker,
            truncate_string(&book.name, 28),
            format_amount(book.net_balance())
        );
    }
    Ok(())
}

pub async fn transactions(client: &ApiClient, config: &Config, args: &FilterArgs) -> Result<()> {
    let filter = args.to_filter(config)?;
    let page = client.list_transactions(&filter).await.map_err(describe)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(page.items())?);
        return Ok(());
    }

    let mut pagination = Pagination::default();
    pagination.update_from(&page);
    pagination.page = args.page;

    if page.items().is_empty() {
        if filter.is_unfiltered() {
            println!("No transactions yet");
        } else {
            println!("No transactions match these filters");
        }
        return Ok(());
    }

    println!(
        "{:<13} {:<24} {:<14} {:<10} {:>12} {:>12}",
        "DATE", "DETAILS", "CATEGORY", "MODE", "AMOUNT", "BALANCE"
    );
    for tx in page.items() {
        let details = tx
            .remark
            .as_deref()
            .filter(|r| !r.is_empty())
            .or(tx.party_name.as_deref());
        println!(
            "{:<13} {:<24} {:<14} {:<10} {:>12} {:>12}",
            format_date(tx.transaction_date),
            truncate_string(&format_optional(details, "-"), 24),
            truncate_string(&format_optional(tx.category_name.as_deref(), "-"), 14),
            truncate_string(&format_optional(tx.payment_mode_name.as_deref(), "-"), 10),
            format_signed_amount(tx.signed_amount()),
            tx.running_balance.map(format_amount).unwrap_or_else(|| "-".to_string()),
        );
    }
    println!(
        "Showing {}-{} of {} (page {} of {})",
        pagination.first_index(),
        pagination.last_index(),
        pagination.total_count,
        pagination.page,
        pagination.total_pages().max(1)
    );
    Ok(())
}

pub async fn summary(client: &ApiClient, config: &Config, args: &FilterArgs) -> Result<()> {
    let filter = args.to_filter(config)?;
    let cashbook = filter.cashbook.unwrap_or_default();
    let summary = client.summary(cashbook, &filter).await.map_err(describe)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    println!("Cash in:   {:>14}", format_amount(summary.total_in));
    println!("Cash out:  {:>14}", format_amount(summary.total_out));
    println!("Balance:   {:>14}", format_amount(summary.net_balance));
    Ok(())
}

pub async fn add(client: &ApiClient, config: &Config, args: &NewEntryArgs) -> Result<()> {
    let cashbook = args
        .cashbook
        .or(config.default_cashbook)
        .context("No cashbook given. Pass --cashbook or set default_cashbook in the config")?;

    let entry = NewTransaction {
        category: Some(args.category),
        payment_mode: Some(args.payment_mode),
        party: args.party,
        remark: args.remark.clone(),
        ..NewTransaction::new(cashbook, args.kind.into(), args.amount)
    };

    let created = client.create_transaction(&entry).await.map_err(describe)?;
    println!(
        "Recorded {} of {} (#{})",
        created.kind.display_name(),
        format_amount(created.amount),
        created.id
    );
    Ok(())
}

pub async fn lookups(client: &ApiClient, cashbook: Option<i64>) -> Result<()> {
    let (categories, parties, modes) = tokio::try_join!(
        client.list_categories(cashbook),
        client.list_parties(cashbook),
        client.list_payment_modes(cashbook),
    )
    .map_err(describe)?;

    println!("Categories:");
    for c in &categories {
        println!("  {:>6}  {}", c.id, c.name);
    }
    println!("Parties:");
    for p in &parties {
        println!("  {:>6}  {}", p.id, p.name);
    }
    println!("Payment modes:");
    for m in &modes {
        println!("  {:>6}  {}", m.id, m.name);
    }
    Ok(())
}

pub async fn reports(client: &ApiClient) -> Result<()> {
    let reports = client.list_reports().await.map_err(describe)?;
    println!("{:>6}  {:<28}  {:>14}", "ID", "CASHBOOK", "BALANCE");
    for report in &reports {
        println!(
            "{:>6}  {:<28}  {:>14}",
            report.id,
            truncate_string(&report.cashbook_name, 28),
            format_amount(report.net_balance)
        );
    }
    Ok(())
}

pub async fn export(client: &ApiClient, args: &ExportArgs) -> Result<()> {
    let format: ExportFormat = args.format.into();

    let output = match args.output {
        Some(ref path) => path.clone(),
        None => {
            let report = client.report(args.report_id).await.map_err(describe)?;
            PathBuf::from(format.report_filename(&report.cashbook_name))
        }
    };

    let bytes = client
        .export_report(args.report_id, format)
        .await
        .map_err(describe)?;
    std::fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Saved {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}
