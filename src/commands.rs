//! Non-interactive subcommands: the same view-model, printed instead of drawn.

use anyhow::{bail, Result};
use comfy_table::{Attribute, Cell, Color, Table};

use crate::api::ClientService;
use crate::dashboard::{Dashboard, FormField, SubmitOutcome};
use crate::models::{Client, ClientId};

/// Field values for `create`, in form order
#[derive(Debug, Default, Clone)]
pub struct CreateArgs {
    pub values: Vec<(FormField, String)>,
}

pub async fn list<S: ClientService>(dashboard: &mut Dashboard<S>, inactive_only: bool) -> Result<()> {
    dashboard.ensure_fresh().await?;

    let clients: Vec<&Client> = if inactive_only {
        dashboard.inactive_clients()
    } else {
        dashboard.clients().iter().collect()
    };

    println!("{}", clients_table(&clients));
    Ok(())
}

pub fn clients_table(clients: &[&Client]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Id"),
        Cell::new("Nome"),
        Cell::new("Email"),
        Cell::new("Telefone"),
        Cell::new("Cidade"),
        Cell::new("UF"),
        Cell::new("Status"),
    ]);

    for client in clients {
        let status = if client.is_active() {
            Cell::new("ativo").fg(Color::Green)
        } else {
            Cell::new("inativo").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(client.id.to_string()),
            Cell::new(&client.name).add_attribute(Attribute::Bold),
            Cell::new(&client.email),
            Cell::new(&client.phone),
            Cell::new(&client.city),
            Cell::new(&client.state),
            status,
        ]);
    }

    table
}

pub async fn create<S: ClientService>(dashboard: &mut Dashboard<S>, args: CreateArgs) -> Result<()> {
    for (field, value) in &args.values {
        dashboard.form_mut().set(*field, value);
    }

    match dashboard.submit().await? {
        SubmitOutcome::Created(client) => {
            println!("Created client {} ({})", client.name, client.id);
            Ok(())
        }
        SubmitOutcome::Invalid => {
            for (field, message) in dashboard.errors() {
                eprintln!("{}: {}", field.label(), message);
            }
            bail!("client not created: {} invalid field(s)", dashboard.errors().len())
        }
    }
}

pub async fn delete<S: ClientService>(dashboard: &mut Dashboard<S>, id: &ClientId) -> Result<()> {
    let result = dashboard.delete(id).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
