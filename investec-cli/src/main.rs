//! Investec CLI - Programmable Banking in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{accounts, beneficiaries, documents, tools, transactions, transfer};

/// Investec - Programmable Banking in your terminal
///
/// Credentials are read from INVESTEC_CLIENT_ID, INVESTEC_CLIENT_SECRET and
/// INVESTEC_API_KEY (a .env file in the working directory is loaded first).
#[derive(Parser)]
#[command(name = "inv", version, about)]
struct Cli {
    /// Increase log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use the Investec sandbox (public test credentials if none are set)
    #[arg(long, global = true)]
    sandbox: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List accounts
    Accounts {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the balance of an account
    Balance {
        account_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List transactions for an account
    Transactions {
        account_id: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Filter by transaction type, e.g. CardPurchases
        #[arg(long = "type")]
        transaction_type: Option<String>,
        /// Include pending transactions
        #[arg(long)]
        include_pending: bool,
        /// Only show pending transactions
        #[arg(long, conflicts_with = "include_pending")]
        pending_only: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List pending card transactions for an account
    Pending {
        account_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List beneficiaries
    Beneficiaries {
        /// Limit to one profile account (requires --account)
        #[arg(long, requires = "account")]
        profile: Option<String>,
        /// Account within --profile
        #[arg(long, requires = "profile")]
        account: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List beneficiary categories
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List profiles
    Profiles {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the accounts of a profile
    ProfileAccounts {
        profile_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show who must authorise payments from an account
    AuthSetup {
        profile_id: String,
        account_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List statements and tax documents
    Documents {
        account_id: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download a document
    Document {
        account_id: String,
        /// Document type as listed by `documents`
        document_type: String,
        /// Document date (YYYY-MM-DD)
        date: NaiveDate,
        /// File to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Transfer money to one of your own accounts
    Transfer {
        /// Account to transfer from
        account_id: String,
        /// Account to transfer to
        #[arg(long = "to")]
        to_account: String,
        /// Amount, e.g. 100.00
        #[arg(long)]
        amount: Decimal,
        /// Reference on your statement
        #[arg(long, default_value = "")]
        my_ref: String,
        /// Reference on the receiving statement
        #[arg(long, default_value = "")]
        their_ref: String,
        /// Profile owning the source account
        #[arg(long)]
        profile: Option<String>,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pay a saved beneficiary
    Pay {
        /// Account to pay from
        account_id: String,
        /// Beneficiary to pay
        #[arg(long)]
        beneficiary: String,
        /// Amount, e.g. 250.00
        #[arg(long)]
        amount: Decimal,
        /// Reference on your statement
        #[arg(long, default_value = "")]
        my_ref: String,
        /// Reference on the beneficiary's statement
        #[arg(long, default_value = "")]
        their_ref: String,
        /// Request an instant payment
        #[arg(long)]
        faster: bool,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the tools exposed to agent hosts
    Tools {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Invoke a tool by name and print its JSON result
    Tool {
        name: String,
        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

fn main() -> ExitCode {
    // A missing .env file is the normal case
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let sandbox = cli.sandbox;
    match cli.command {
        Commands::Accounts { json } => accounts::run_accounts(sandbox, json),
        Commands::Balance { account_id, json } => accounts::run_balance(sandbox, &account_id, json),
        Commands::Transactions { account_id, from, to, transaction_type, include_pending, pending_only, json } => {
            let mut query = investec_core::TransactionQuery::new()
                .include_pending(include_pending)
                .pending_only(pending_only);
            query.from_date = from;
            query.to_date = to;
            query.transaction_type = transaction_type;
            transactions::run_transactions(sandbox, &account_id, &query, json)
        }
        Commands::Pending { account_id, json } => transactions::run_pending(sandbox, &account_id, json),
        Commands::Beneficiaries { profile, account, json } => {
            let scope = profile.zip(account);
            beneficiaries::run_beneficiaries(sandbox, scope, json)
        }
        Commands::Categories { json } => beneficiaries::run_categories(sandbox, json),
        Commands::Profiles { json } => accounts::run_profiles(sandbox, json),
        Commands::ProfileAccounts { profile_id, json } => {
            accounts::run_profile_accounts(sandbox, &profile_id, json)
        }
        Commands::AuthSetup { profile_id, account_id, json } => {
            accounts::run_auth_setup(sandbox, &profile_id, &account_id, json)
        }
        Commands::Documents { account_id, from, to, json } => {
            documents::run_list(sandbox, &account_id, from, to, json)
        }
        Commands::Document { account_id, document_type, date, output } => {
            documents::run_download(sandbox, &account_id, &document_type, date, &output)
        }
        Commands::Transfer { account_id, to_account, amount, my_ref, their_ref, profile, yes, json } => {
            let item = investec_core::TransferItem::new(to_account, amount, my_ref, their_ref);
            transfer::run_transfer(sandbox, &account_id, item, profile.as_deref(), yes, json)
        }
        Commands::Pay { account_id, beneficiary, amount, my_ref, their_ref, faster, yes, json } => {
            let mut item = investec_core::BeneficiaryPaymentItem::new(beneficiary, amount, my_ref, their_ref);
            if faster {
                item = item.with_faster_payment(true);
            }
            transfer::run_pay(sandbox, &account_id, item, yes, json)
        }
        Commands::Tools { json } => tools::run_list(json),
        Commands::Tool { name, args } => tools::run_call(sandbox, &name, &args),
    }
}
