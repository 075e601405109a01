use std::{io::BufRead, path::PathBuf, process::ExitCode};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use folio_client::{
    api::{RelayApiService, RelayApiServiceImpl},
    chatbot,
    form::{ContactForm, SubmissionClient, VisitorProfileForm},
    notify::ConsoleNotifier,
    store::{self, FileStore},
};
use folio_utils::folio_version;
use tracing_subscriber::EnvFilter;
use url::Url;

type Client = SubmissionClient<RelayApiServiceImpl, FileStore, ConsoleNotifier>;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = || -> anyhow::Result<Client> {
        Ok(SubmissionClient::new(
            RelayApiServiceImpl::new(cli.relay_url.clone())?,
            FileStore::open(&cli.store)?,
            ConsoleNotifier,
            cli.fallback_email.clone(),
        ))
    };

    match &cli.command {
        Command::Contact(args) => {
            let mut form = ContactForm {
                name: args.name.clone(),
                email: args.email.clone(),
                subject: args.subject.clone().unwrap_or_default(),
                message: args.message.clone(),
            };
            let client = client()?;
            if client.submit_contact(&mut form).await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Visitor(args) => {
            let mut form = VisitorProfileForm {
                name: args.name.clone(),
                email: args.email.clone(),
                country: args.country.clone().unwrap_or_default(),
                state: args.state.clone().unwrap_or_default(),
                message: args.message.clone(),
            };
            let client = client()?;
            if client.submit_visitor_profile(&mut form).await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Hire => {
            client()?.express_hire_interest()?;
        }
        Command::Visit => {
            let count = client()?.register_visit()?;
            println!("Visitor #{count}");
        }
        Command::Stats => {
            let stats = store::stats(&FileStore::open(&cli.store)?)?;
            println!("Visitors: {}", stats.visitors);
            println!("Hire requests: {}", stats.hires);
            println!("States: {}", stats.states);
            println!("Messages: {}", stats.messages);
        }
        Command::Chat { message } => chat(message),
        Command::Health => {
            let report = RelayApiServiceImpl::new(cli.relay_url.clone())?
                .health()
                .await?;
            println!("Relay status: {}", report.status);
            println!("Mail server reachable: {}", yes_no(report.email));
            println!("Email configured: {}", yes_no(report.email_configured));
            if report.status != "ok" {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Completion { shell } => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                env!("CARGO_BIN_NAME"),
                &mut std::io::stdout(),
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn chat(message: &[String]) {
    let print = |reply: chatbot::Reply| {
        println!("{}", reply.text);
        if !reply.quick_replies.is_empty() {
            println!("[{}]", reply.quick_replies.join("] ["));
        }
    };

    if !message.is_empty() {
        if let Some(reply) = chatbot::respond(&message.join(" ")) {
            print(reply);
        }
        return;
    }

    print(chatbot::WELCOME);
    for line in std::io::stdin().lock().lines().map_while(Result::ok) {
        if let Some(reply) = chatbot::respond(&line) {
            print(reply);
        }
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

#[derive(Debug, Parser)]
#[command(version = folio_version())]
struct Cli {
    /// Base url of the relay
    #[arg(long, env = "FOLIO_RELAY_URL", default_value = "http://127.0.0.1:3000/")]
    relay_url: Url,
    /// File that keeps the local counters
    #[arg(long, env = "FOLIO_CLIENT_STORE", default_value = "folio-client.json")]
    store: PathBuf,
    /// Address suggested to the user when a message cannot be delivered
    #[arg(long, env = "FOLIO_FALLBACK_EMAIL", default_value = "owner@localhost")]
    fallback_email: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a message through the contact form
    Contact(ContactArgs),
    /// Submit a visitor profile
    Visitor(VisitorArgs),
    /// Express interest in hiring the owner
    Hire,
    /// Count a visit
    Visit,
    /// Show the local dashboard counters
    Stats,
    /// Talk to the portfolio assistant, reads from stdin if no message is given
    Chat { message: Vec<String> },
    /// Check that the relay is up and can send emails
    Health,
    /// Generate shell completions
    Completion {
        /// The shell to generate completions for
        #[clap(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
struct ContactArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    subject: Option<String>,
    #[arg(long)]
    message: String,
}

#[derive(Debug, Args)]
struct VisitorArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    message: String,
}
