use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use client_db::{config, db, Client, ClientRepository, ClientSummary, PhoneOutcome};

#[derive(Parser)]
#[command(name = "client-db", version, about = "Manage clients and their phone numbers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the tables if they are missing
    Init,
    /// Add a client, optionally with an email and phones
    Add {
        first_name: String,
        last_name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long = "phone")]
        phones: Vec<String>,
    },
    /// Add a phone to an existing client
    AddPhone { client_id: i32, phone: String },
    /// Replace a client's name and email
    Update {
        client_id: i32,
        first_name: String,
        last_name: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Delete a phone by its own id
    DeletePhone { phone_id: i32 },
    /// Delete a client and all of its phones
    Delete { client_id: i32 },
    /// Find clients by name, surname, email or phone
    Find { field: String, value: String },
    /// List every client with its phones
    List,
    /// List the phones of one client with their ids
    Phones { client_id: i32 },
    /// Walk through every operation on sample data
    Demo,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = config::init()?;
    let mut repo = db::init(&config).await?;

    let result = run(&mut repo, cli.command).await;

    repo.close().await?;
    result
}

async fn run(repo: &mut ClientRepository, command: Command) -> Result<()> {
    match command {
        Command::Init => println!("Schema is ready"),
        Command::Add {
            first_name,
            last_name,
            email,
            phones,
        } => {
            let added = repo
                .add_client(&first_name, &last_name, email.as_deref(), &phones)
                .await?;
            println!("Added client {}", added.client_id);
            for outcome in &added.phones {
                print_phone_outcome(outcome);
            }
        }
        Command::AddPhone { client_id, phone } => {
            let phone_id = repo.add_client_phone(client_id, &phone).await?;
            println!("Added phone {} to client {}", phone_id, client_id);
        }
        Command::Update {
            client_id,
            first_name,
            last_name,
            email,
        } => {
            let rows = repo
                .update_client(client_id, &first_name, &last_name, email.as_deref())
                .await?;
            println!("Updated {} client(s)", rows);
        }
        Command::DeletePhone { phone_id } => {
            let rows = repo.delete_client_phone(phone_id).await?;
            println!("Deleted {} phone(s)", rows);
        }
        Command::Delete { client_id } => {
            let rows = repo.delete_client(client_id).await?;
            println!("Deleted {} client(s)", rows);
        }
        Command::Find { field, value } => {
            let clients = repo.find_client(&field, &value).await?;
            print_clients(&clients);
        }
        Command::List => {
            let clients = repo.list_all_clients().await?;
            print_summaries(&clients);
        }
        Command::Phones { client_id } => {
            for phone in repo.client_phones(client_id).await? {
                println!("{:>6}  {}", phone.client_phone_id, phone.phone);
            }
        }
        Command::Demo => demo(repo).await?,
    }

    Ok(())
}

async fn demo(repo: &mut ClientRepository) -> Result<()> {
    let no_phones: [&str; 0] = [];

    let ivan = repo.add_client("Ivan", "Ivanov", None, no_phones).await?;
    repo.add_client("Vasily", "Petrov", Some("petrov@mail.server.ru"), no_phones)
        .await?;
    let sidorov = repo
        .add_client(
            "Vasily",
            "Sidorov",
            Some("v.sidorov@mail.com"),
            ["+1-111-111-1111", "(495)000-00-00", "+0(000) 000 00 00"],
        )
        .await?;
    for outcome in &sidorov.phones {
        print_phone_outcome(outcome);
    }
    println!("Clients after adding three:");
    print_summaries(&repo.list_all_clients().await?);

    repo.add_client_phone(ivan.client_id, "1234567890").await?;
    println!("\nClients after adding a phone to the first one:");
    print_summaries(&repo.list_all_clients().await?);

    repo.update_client(ivan.client_id, "Ivan Ivanovich", "Ivanov", Some("ivan.ii@mail.com"))
        .await?;
    println!("\nClients after updating the first one:");
    print_summaries(&repo.list_all_clients().await?);

    if let Some(phone) = repo.client_phones(sidorov.client_id).await?.first() {
        repo.delete_client_phone(phone.client_phone_id).await?;
    }
    println!("\nClients after deleting a phone:");
    print_summaries(&repo.list_all_clients().await?);

    repo.delete_client(ivan.client_id).await?;
    println!("\nClients after deleting the first one:");
    print_summaries(&repo.list_all_clients().await?);

    let searches = [
        ("name", "Vasily"),
        ("Surname", "Petrov"),
        ("email", "petrov@mail.server.ru"),
        ("phone", "(495)000-00-00"),
    ];
    for (field, value) in searches {
        println!("\nSearch by {} ({}):", field, value);
        print_clients(&repo.find_client(field, value).await?);
    }

    Ok(())
}

fn print_phone_outcome(outcome: &PhoneOutcome) {
    match outcome {
        PhoneOutcome::Inserted {
            client_phone_id,
            phone,
        } => println!("  phone {} added as {}", phone, client_phone_id),
        PhoneOutcome::Rejected { phone, reason, .. } => {
            println!("  phone {} skipped: {}", phone, reason)
        }
        PhoneOutcome::Failed { phone, error } => {
            println!("  phone {} failed: {}", phone, error)
        }
    }
}

fn print_clients(clients: &[Client]) {
    if clients.is_empty() {
        println!("No clients found");
    }
    for client in clients {
        println!(
            "{:>6}  {} {}  {}",
            client.client_id,
            client.first_name,
            client.last_name,
            client.email.as_deref().unwrap_or("-")
        );
    }
}

fn print_summaries(clients: &[ClientSummary]) {
    for client in clients {
        println!(
            "{:>6}  {} {}  {}  [{}]",
            client.client_id,
            client.first_name,
            client.last_name,
            client.email.as_deref().unwrap_or("-"),
            client.phones.as_deref().unwrap_or("")
        );
    }
}
