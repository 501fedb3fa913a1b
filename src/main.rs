mod api;
mod commands;
mod config;
mod dashboard;
mod logging;
mod models;
mod ui;
mod validation;

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::info;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::api::{ClientApi, ClientService};
use crate::commands::CreateArgs;
use crate::dashboard::{Dashboard, FormField, SubmitOutcome};
use crate::models::ClientId;
use crate::ui::dashboard::{
    handle_input as handle_dashboard_input, render_dashboard, DashboardAction,
    DashboardScreenState,
};

#[derive(Parser)]
#[command(name = "client-dashboard", version, about = "Manage clients of the BMG client API")]
struct Cli {
    /// Base URL of the client API (overrides API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, global = true)]
    insecure: bool,

    /// Write logs to this file (overrides LOG_FILE)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive dashboard (default)
    Ui,
    /// Print the client list
    List {
        /// Only clients whose status is inactive
        #[arg(long)]
        inactive: bool,
    },
    /// Validate and create a client
    Create(CreateCommand),
    /// Delete a client by id
    Delete { id: ClientId },
}

#[derive(Args)]
struct CreateCommand {
    #[arg(long)]
    nome: String,
    #[arg(long)]
    email: String,
    /// Digits or an already masked number; the mask is applied either way
    #[arg(long)]
    telefone: String,
    #[arg(long)]
    cep: Option<String>,
    #[arg(long)]
    logradouro: Option<String>,
    #[arg(long)]
    complemento: Option<String>,
    #[arg(long)]
    numero: Option<String>,
    #[arg(long)]
    bairro: Option<String>,
    #[arg(long)]
    cidade: Option<String>,
    #[arg(long)]
    uf: Option<String>,
}

impl From<CreateCommand> for CreateArgs {
    fn from(cmd: CreateCommand) -> Self {
        let optional = [
            (FormField::PostalCode, cmd.cep),
            (FormField::Street, cmd.logradouro),
            (FormField::Complement, cmd.complemento),
            (FormField::Number, cmd.numero),
            (FormField::Neighborhood, cmd.bairro),
            (FormField::City, cmd.cidade),
            (FormField::State, cmd.uf),
        ];

        let mut values = vec![
            (FormField::Name, cmd.nome),
            (FormField::Email, cmd.email),
            (FormField::Phone, cmd.telefone),
        ];
        values.extend(
            optional
                .into_iter()
                .filter_map(|(field, value)| value.map(|v| (field, v))),
        );

        CreateArgs { values }
    }
}

// Main application state
struct AppState {
    dashboard: Dashboard<ClientApi>,
    screen_state: DashboardScreenState,
}

impl AppState {
    fn new(api: ClientApi) -> Self {
        Self {
            dashboard: Dashboard::new(api),
            screen_state: DashboardScreenState::new(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::init(config::Overrides {
        api_url: cli.api_url,
        insecure: cli.insecure,
        log_file: cli.log_file,
    })?;
    logging::init(&config.log_file)?;
    info!(api_url = config.api_url(), "starting client dashboard");

    let api = ClientApi::new(&config)?;

    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Ui => run_ui(api).await,
        command => run_command(command, api).await,
    }
}

// One-shot subcommands; remote failures propagate to the exit status
async fn run_command<S: ClientService>(command: Commands, service: S) -> Result<()> {
    let mut dashboard = Dashboard::new(service);

    match command {
        Commands::List { inactive } => commands::list(&mut dashboard, inactive).await,
        Commands::Create(cmd) => commands::create(&mut dashboard, cmd.into()).await,
        Commands::Delete { id } => commands::delete(&mut dashboard, &id).await,
        Commands::Ui => bail!("the dashboard is not a one-shot command"),
    }
}

async fn run_ui(api: ClientApi) -> Result<()> {
    let mut app_state = AppState::new(api);

    // Fetch the list before taking over the terminal
    app_state.dashboard.ensure_fresh().await?;

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "dashboard stopped");
    }

    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| {
            render_dashboard(f, &app_state.dashboard, &mut app_state.screen_state);
        })?;

        if handle_dashboard_screen(app_state).await? {
            break;
        }
    }

    Ok(())
}

async fn handle_dashboard_screen(app_state: &mut AppState) -> Result<bool> {
    let dashboard = &mut app_state.dashboard;
    let state = &mut app_state.screen_state;

    let action = handle_dashboard_input(dashboard, state)?;
    Ok(apply_action(dashboard, state, action).await)
}

/// Run the remote side of an action. API failures go to the status line and
/// the loop keeps going, so the form and lists survive them.
async fn apply_action<S: ClientService>(
    dashboard: &mut Dashboard<S>,
    state: &mut DashboardScreenState,
    action: Option<DashboardAction>,
) -> bool {
    let outcome: api::Result<Option<String>> = match action {
        Some(DashboardAction::Quit) => return true,
        Some(DashboardAction::Submit) => dashboard.submit().await.map(|outcome| {
            Some(match outcome {
                SubmitOutcome::Created(client) => format!("Cliente {} criado", client.name),
                SubmitOutcome::Invalid => "Corrija os campos destacados".to_string(),
            })
        }),
        Some(DashboardAction::Delete(id)) => dashboard
            .delete(&id)
            .await
            .map(|_| Some(format!("Cliente {} removido", id))),
        Some(DashboardAction::Refresh) => dashboard
            .refresh()
            .await
            .map(|_| Some("Lista atualizada".to_string())),
        None => Ok(None),
    };

    match outcome {
        Ok(Some(message)) => state.set_status(message),
        Ok(None) => {}
        Err(err) => {
            tracing::error!(error = %err, "dashboard action failed");
            state.set_error(format!("Erro: {}", err));
        }
    }

    let inactive = dashboard.inactive_clients().len();
    state.clamp_selection(dashboard.clients().len(), inactive);

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::testing::{client, FakeService};
    use clap::CommandFactory;

    fn failing_service(clients: Vec<crate::models::Client>) -> FakeService {
        let service = FakeService::with_clients(clients);
        *service.fail.borrow_mut() = true;
        service
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn create_collects_only_given_fields() {
        let cli = Cli::try_parse_from([
            "client-dashboard",
            "create",
            "--nome",
            "Ana",
            "--email",
            "a@b.co",
            "--telefone",
            "11912345678",
            "--uf",
            "sp",
        ])
        .unwrap();

        let Some(Commands::Create(cmd)) = cli.command else {
            panic!("expected create");
        };
        let args: CreateArgs = cmd.into();
        let fields: Vec<_> = args.values.iter().map(|(f, _)| *f).collect();
        assert_eq!(
            fields,
            vec![FormField::Name, FormField::Email, FormField::Phone, FormField::State]
        );
    }

    #[test]
    fn delete_parses_numeric_and_text_ids() {
        let cli = Cli::try_parse_from(["client-dashboard", "delete", "42"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Delete { id: ClientId::Number(42) })));

        let cli = Cli::try_parse_from(["client-dashboard", "--insecure", "delete", "abc"]).unwrap();
        assert!(cli.insecure);
        assert!(matches!(cli.command, Some(Commands::Delete { id: ClientId::Text(_) })));
    }

    fn command(args: &[&str]) -> Commands {
        let argv = std::iter::once("client-dashboard").chain(args.iter().copied());
        Cli::try_parse_from(argv).unwrap().command.unwrap()
    }

    #[tokio::test]
    async fn one_shot_commands_build_their_own_dashboard() {
        let service = FakeService::with_clients(vec![client(1, "Ana", true)]);
        run_command(command(&["list", "--inactive"]), service).await.unwrap();

        let service = FakeService::with_clients(vec![client(1, "Ana", true)]);
        run_command(command(&["delete", "1"]), service).await.unwrap();

        let invalid = command(&["create", "--nome", "Ana", "--email", "x", "--telefone", "1"]);
        assert!(run_command(invalid, FakeService::default()).await.is_err());

        assert!(run_command(Commands::Ui, FakeService::default()).await.is_err());
    }

    #[tokio::test]
    async fn one_shot_commands_propagate_remote_failures() {
        let err = run_command(command(&["list"]), failing_service(vec![])).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn failed_submit_is_reported_and_keeps_the_form() {
        let mut dashboard = Dashboard::new(failing_service(vec![]));
        let mut state = DashboardScreenState::new();
        dashboard.form_mut().set(FormField::Name, "Ana");
        dashboard.form_mut().set(FormField::Email, "a@b.co");
        dashboard.form_mut().set(FormField::Phone, "11912345678");

        let quit = apply_action(&mut dashboard, &mut state, Some(DashboardAction::Submit)).await;

        assert!(!quit);
        assert!(state.status_is_error());
        assert!(state.status().unwrap_or_default().contains("503"));
        assert_eq!(dashboard.form().name, "Ana");
        assert_eq!(dashboard.form().phone, "(11) 91234-5678");
        assert!(dashboard.clients().is_empty());
    }

    #[tokio::test]
    async fn failed_refresh_and_delete_keep_the_loop_running() {
        let mut dashboard = Dashboard::new(FakeService::with_clients(vec![client(1, "Ana", true)]));
        dashboard.refresh().await.unwrap();
        *dashboard.service().fail.borrow_mut() = true;
        let mut state = DashboardScreenState::new();

        let quit = apply_action(&mut dashboard, &mut state, Some(DashboardAction::Refresh)).await;
        assert!(!quit);
        assert!(state.status_is_error());

        let delete = Some(DashboardAction::Delete(ClientId::Number(1)));
        assert!(!apply_action(&mut dashboard, &mut state, delete).await);
        assert!(state.status_is_error());
        assert_eq!(dashboard.clients().len(), 1);
    }

    #[tokio::test]
    async fn successful_action_clears_a_previous_error() {
        let mut dashboard = Dashboard::new(FakeService::with_clients(vec![client(1, "Ana", true)]));
        let mut state = DashboardScreenState::new();
        state.set_error("Erro: down");

        assert!(!apply_action(&mut dashboard, &mut state, Some(DashboardAction::Refresh)).await);
        assert!(!state.status_is_error());
        assert_eq!(state.status(), Some("Lista atualizada"));
        assert_eq!(state.selected_client(), Some(0));
    }

    #[tokio::test]
    async fn quit_ends_the_loop_without_remote_calls() {
        let mut dashboard = Dashboard::new(FakeService::default());
        let mut state = DashboardScreenState::new();

        assert!(apply_action(&mut dashboard, &mut state, Some(DashboardAction::Quit)).await);
        assert_eq!(*dashboard.service().list_calls.borrow(), 0);
    }
}
