use {
    anyhow::{ensure, Context},
    args::{Args, Command, OutputFormat},
    clap::Parser,
    phonebook::{config, json, server, store::Directory, vcard, Contact},
    std::{
        io::{self, Write},
        sync::Arc,
    },
};

mod args;
mod logger;

const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.verbose());

    let config = config::obtain_config()?.unwrap_or_default();
    let store_path = args.store_path(&config)?;
    let directory = Directory::open(store_path)?;
    tracing::debug!(path = ?directory.path(), "opened contact store");

    match args.command() {
        Command::List => print_contacts(&directory.list()),
        Command::Add { name, phone } => {
            let contact = Contact::new(name.as_str(), phone.as_str());
            contact.validate()?;
            directory.add(contact).context("Error adding contact")?;
            println!("Contact {name} added successfully.");
        }
        Command::Delete { name } => {
            ensure!(!name.is_empty(), "Name is required");
            directory.delete(name).context("Error deleting contact")?;
            println!("Contact {name} deleted successfully.");
        }
        Command::Edit {
            name,
            new_name,
            new_phone,
        } => {
            ensure!(!name.is_empty(), "Name is required");
            let mut contact = directory
                .find_by_name(name)
                .into_iter()
                .next()
                .with_context(|| format!("Contact {name} not found"))?;

            if let Some(new_name) = new_name.as_ref().filter(|n| !n.is_empty()) {
                contact.name = new_name.to_owned();
            }
            if let Some(new_phone) = new_phone.as_ref().filter(|p| !p.is_empty()) {
                contact.phone = new_phone.to_owned();
            }

            directory
                .edit(name, contact)
                .context("Error updating contact")?;
            println!("Contact updated successfully.");
        }
        Command::Exists { name } => {
            ensure!(!name.is_empty(), "Name is required");
            if directory.contact_exists(&Contact::new(name.as_str(), "")) {
                println!("Contact {name} exists in the directory.");
            } else {
                println!("Contact {name} does not exist in the directory.");
            }
        }
        Command::Find { name } => print_contacts(&directory.find_by_name(name)),
        Command::Export { format } => {
            let contacts = directory.list();
            let mut stdout = io::stdout().lock();
            match format {
                OutputFormat::Json => {
                    json::contacts_to_json(&mut stdout, &contacts)
                        .context("Failed to write contacts to JSON")?;
                    writeln!(stdout)?;
                }
                OutputFormat::Vcard => vcard::contacts_to_vcard(&mut stdout, &contacts)?,
            }
        }
        Command::Serve { bind } => {
            let bind = bind
                .clone()
                .or(config.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_owned());
            server::serve(Arc::new(directory), &bind).await?;
        }
    }

    Ok(())
}

fn print_contacts(contacts: &[Contact]) {
    if contacts.is_empty() {
        println!("No contacts found.");
        return;
    }

    println!("Contacts:");
    for (i, contact) in contacts.iter().enumerate() {
        println!("{}. {contact}", i + 1);
    }
}
