//! takeatask - terminal client for the TAKE a TASK task manager.
//!
//! Logs in against the TAKE a TASK backend, keeps the session on disk and
//! exposes tasks, users, tags, comments, attachments and subtasks as
//! subcommands.

mod app;
mod commands;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use takeatask_core::models::{PerfilUsuario, PrioridadeTarefa, StatusTarefa};
use takeatask_core::{ApiError, AuthError, Config, LogoutPolicy};

use app::App;
use commands::{CreateTarefa, CreateUsuario, EditTarefa, EditUsuario, ListTarefas, UsuarioRef};

// ============================================================================
// Constants
// ============================================================================

/// Log file prefix inside `--log-dir`; rotated daily.
const LOG_FILE_PREFIX: &str = "takeatask.log";

#[derive(Parser)]
#[command(name = "takeatask", version, about = "TAKE a TASK - terminal client")]
struct Cli {
    /// Backend URL
    #[arg(long, env = "TAKEATASK_API_URL", global = true)]
    api_url: Option<String>,

    /// Also write logs to a daily file in this directory
    #[arg(long, env = "TAKEATASK_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        /// Login (prompted when omitted; defaults to the remembered login)
        #[arg(long)]
        login: Option<String>,
        /// Remember the login for the next prompt
        #[arg(long)]
        remember: bool,
        /// Path to continue to after login
        #[arg(long)]
        redirect: Option<String>,
    },
    /// End the session
    Logout,
    /// Show the current session
    Whoami,
    /// Evaluate the route guard for a path
    Guard {
        /// Path, e.g. /tarefas/7
        path: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        nome: String,
        #[arg(long)]
        login: String,
    },
    /// Dashboard counters and recent tasks
    Stats,
    /// Tasks
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Tags
    Tags {
        #[command(subcommand)]
        command: TagCommands,
    },
    /// Comments on a task
    Comments {
        #[command(subcommand)]
        command: CommentCommands,
    },
    /// Attachments on a task
    Attachments {
        #[command(subcommand)]
        command: AttachmentCommands,
    },
    /// Subtasks of a task
    Subtasks {
        #[command(subcommand)]
        command: SubtaskCommands,
    },
    /// Show or change the saved configuration
    Config {
        /// Backend URL to save
        #[arg(long)]
        set_api_url: Option<String>,
        /// keep_profile or clear_all
        #[arg(long)]
        logout_policy: Option<String>,
        /// Request timeout in seconds (0 disables)
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// List tasks for a tab
    List {
        /// minhas, equipe, todas, pendentes, andamento, concluidas, atrasadas
        #[arg(long, default_value = "todas")]
        tab: String,
        /// Text search
        #[arg(long)]
        q: Option<String>,
        #[arg(long)]
        status: Option<StatusTarefa>,
        #[arg(long)]
        prioridade: Option<PrioridadeTarefa>,
        /// Tag name (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long, default_value = "1")]
        page: usize,
        #[arg(long, default_value = "20")]
        per_page: usize,
    },
    /// Keyword search
    Search { keyword: String },
    /// Task details with subtasks, attachments and comments
    Show { id: i64 },
    /// Create a task
    Create {
        nome: String,
        #[arg(long)]
        descricao: Option<String>,
        #[arg(long)]
        status: Option<StatusTarefa>,
        #[arg(long)]
        prioridade: Option<PrioridadeTarefa>,
        /// Assignee user id
        #[arg(long)]
        responsavel: Option<i64>,
        /// Deadline, YYYY-MM-DD
        #[arg(long)]
        prazo: Option<String>,
        /// Tag name (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Change some fields of a task
    Edit {
        id: i64,
        #[arg(long)]
        nome: Option<String>,
        #[arg(long)]
        descricao: Option<String>,
        #[arg(long)]
        status: Option<StatusTarefa>,
        #[arg(long)]
        prioridade: Option<PrioridadeTarefa>,
        /// Assignee user id
        #[arg(long)]
        responsavel: Option<i64>,
        /// Deadline, YYYY-MM-DD
        #[arg(long)]
        prazo: Option<String>,
        /// Tag name (repeatable); replaces the current tags
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Move a task to another status
    Status { id: i64, status: StatusTarefa },
    /// Delete a task
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum UserCommands {
    List {
        #[arg(long)]
        q: Option<String>,
    },
    /// By id, or by login with --login
    Show {
        #[arg(required_unless_present = "login", conflicts_with = "login")]
        id: Option<i64>,
        #[arg(long)]
        login: Option<String>,
    },
    /// Create a user (prompts for the password)
    Create {
        nome: String,
        login: String,
        #[arg(long)]
        email: Option<String>,
        /// admin or padrao
        #[arg(long, default_value = "padrao")]
        perfil: PerfilUsuario,
        #[arg(long)]
        cargo: Option<String>,
        #[arg(long)]
        telefone: Option<String>,
        #[arg(long)]
        departamento: Option<String>,
    },
    /// Change some fields of a user
    Edit {
        id: i64,
        #[arg(long)]
        nome: Option<String>,
        #[arg(long)]
        login: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        perfil: Option<PerfilUsuario>,
        #[arg(long)]
        cargo: Option<String>,
        #[arg(long)]
        telefone: Option<String>,
        #[arg(long)]
        departamento: Option<String>,
        #[arg(long)]
        ativo: Option<bool>,
        /// Prompt for a new password
        #[arg(long)]
        senha: bool,
    },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum TagCommands {
    List {
        #[arg(long)]
        q: Option<String>,
    },
    Create {
        nome: String,
        /// #RRGGBB
        #[arg(long)]
        cor: Option<String>,
        #[arg(long)]
        descricao: Option<String>,
    },
    /// Look a tag up by name
    Show { nome: String },
    /// Rename, recolour or redescribe a tag
    Edit {
        id: i64,
        #[arg(long)]
        nome: Option<String>,
        /// #RRGGBB
        #[arg(long)]
        cor: Option<String>,
        #[arg(long)]
        descricao: Option<String>,
    },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum CommentCommands {
    List { tarefa: i64 },
    Add { tarefa: i64, texto: String },
    Delete { tarefa: i64, id: i64 },
}

#[derive(Subcommand)]
enum AttachmentCommands {
    List { tarefa: i64 },
    Upload { tarefa: i64, file: PathBuf },
    Download {
        tarefa: i64,
        id: i64,
        /// Output path (defaults to the original file name)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Delete { tarefa: i64, id: i64 },
}

#[derive(Subcommand)]
enum SubtaskCommands {
    List { tarefa: i64 },
    Add {
        tarefa: i64,
        descricao: String,
        #[arg(long)]
        responsavel: Option<i64>,
    },
    /// Mark done (or reopen with --undo)
    Done {
        tarefa: i64,
        id: i64,
        #[arg(long)]
        undo: bool,
    },
    Delete { tarefa: i64, id: i64 },
}

/// Initialize the tracing subscriber for logging.
/// RUST_LOG controls the level (default `warn`). Stderr always; a daily
/// file as well when a log directory is given.
fn init_tracing(log_dir: Option<&PathBuf>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_dir.as_ref());
    info!(version = env!("CARGO_PKG_VERSION"), "takeatask starting");

    let app = match App::new(cli.api_url) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = run(&app, cli.command).await;

    if let Some(hint) = app.forced_logout_hint() {
        eprintln!("{}", hint);
    }
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("Error: {}", user_message(&e));
            ExitCode::FAILURE
        }
    }
}

/// The text to show for a failed command: the login message for auth
/// failures, the backend's reason for API errors, the full chain otherwise.
fn user_message(err: &anyhow::Error) -> String {
    if let Some(auth) = err.downcast_ref::<AuthError>() {
        return auth.user_message();
    }
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::NetworkError(_)) => takeatask_core::api::CONNECTION_FALLBACK_MESSAGE.to_string(),
        Some(api) => api.to_string(),
        None => format!("{:#}", err),
    }
}

async fn run(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Login {
            login,
            remember,
            redirect,
        } => {
            app.login_interactive(login, remember, redirect.as_deref())
                .await?;
        }
        Commands::Logout => {
            app.logout()?;
            println!("Sessão encerrada.");
        }
        Commands::Whoami => commands::whoami(app)?,
        Commands::Guard { path } => commands::guard(app, &path)?,
        Commands::Register { nome, login } => commands::register(app, &nome, &login).await?,
        Commands::Stats => commands::stats(app).await?,
        Commands::Tasks { command } => run_tasks(app, command).await?,
        Commands::Users { command } => match command {
            UserCommands::List { q } => commands::list_usuarios(app, q.as_deref()).await?,
            UserCommands::Show { id, login } => {
                let who = match (id, login) {
                    (Some(id), _) => UsuarioRef::Id(id),
                    (None, Some(login)) => UsuarioRef::Login(login),
                    (None, None) => anyhow::bail!("Informe o id ou --login."),
                };
                commands::show_usuario(app, who).await?
            }
            UserCommands::Create {
                nome,
                login,
                email,
                perfil,
                cargo,
                telefone,
                departamento,
            } => {
                commands::create_usuario(
                    app,
                    CreateUsuario {
                        nome,
                        login,
                        email,
                        perfil,
                        cargo,
                        telefone,
                        departamento,
                    },
                )
                .await?
            }
            UserCommands::Edit {
                id,
                nome,
                login,
                email,
                perfil,
                cargo,
                telefone,
                departamento,
                ativo,
                senha,
            } => {
                commands::edit_usuario(
                    app,
                    id,
                    EditUsuario {
                        nome,
                        login,
                        email,
                        perfil,
                        cargo,
                        telefone,
                        departamento,
                        ativo,
                        senha,
                    },
                )
                .await?
            }
            UserCommands::Delete { id } => commands::delete_usuario(app, id).await?,
        },
        Commands::Tags { command } => match command {
            TagCommands::List { q } => commands::list_tags(app, q.as_deref()).await?,
            TagCommands::Create {
                nome,
                cor,
                descricao,
            } => commands::create_tag(app, nome, cor, descricao).await?,
            TagCommands::Show { nome } => commands::show_tag(app, &nome).await?,
            TagCommands::Edit {
                id,
                nome,
                cor,
                descricao,
            } => commands::edit_tag(app, id, nome, cor, descricao).await?,
            TagCommands::Delete { id } => commands::delete_tag(app, id).await?,
        },
        Commands::Comments { command } => match command {
            CommentCommands::List { tarefa } => commands::list_comentarios(app, tarefa).await?,
            CommentCommands::Add { tarefa, texto } => {
                commands::add_comentario(app, tarefa, &texto).await?
            }
            CommentCommands::Delete { tarefa, id } => {
                commands::delete_comentario(app, tarefa, id).await?
            }
        },
        Commands::Attachments { command } => match command {
            AttachmentCommands::List { tarefa } => commands::list_anexos(app, tarefa).await?,
            AttachmentCommands::Upload { tarefa, file } => {
                commands::upload_anexo(app, tarefa, &file).await?
            }
            AttachmentCommands::Download { tarefa, id, out } => {
                commands::download_anexo(app, tarefa, id, out).await?
            }
            AttachmentCommands::Delete { tarefa, id } => {
                commands::delete_anexo(app, tarefa, id).await?
            }
        },
        Commands::Subtasks { command } => match command {
            SubtaskCommands::List { tarefa } => commands::list_subtarefas(app, tarefa).await?,
            SubtaskCommands::Add {
                tarefa,
                descricao,
                responsavel,
            } => commands::add_subtarefa(app, tarefa, &descricao, responsavel).await?,
            SubtaskCommands::Done { tarefa, id, undo } => {
                commands::complete_subtarefa(app, tarefa, id, !undo).await?
            }
            SubtaskCommands::Delete { tarefa, id } => {
                commands::delete_subtarefa(app, tarefa, id).await?
            }
        },
        Commands::Config {
            set_api_url,
            logout_policy,
            timeout,
        } => update_config(app, set_api_url, logout_policy, timeout)?,
    }
    Ok(())
}

async fn run_tasks(app: &App, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::List {
            tab,
            q,
            status,
            prioridade,
            tags,
            page,
            per_page,
        } => {
            commands::list_tarefas(
                app,
                ListTarefas {
                    tab: &tab,
                    q: q.as_deref(),
                    status,
                    prioridade,
                    tags: &tags,
                    page,
                    per_page,
                },
            )
            .await
        }
        TaskCommands::Search { keyword } => commands::search_tarefas(app, &keyword).await,
        TaskCommands::Show { id } => commands::show_tarefa(app, id).await,
        TaskCommands::Create {
            nome,
            descricao,
            status,
            prioridade,
            responsavel,
            prazo,
            tags,
        } => {
            commands::create_tarefa(
                app,
                CreateTarefa {
                    nome,
                    descricao,
                    status,
                    prioridade,
                    responsavel,
                    prazo,
                    tags,
                },
            )
            .await
        }
        TaskCommands::Edit {
            id,
            nome,
            descricao,
            status,
            prioridade,
            responsavel,
            prazo,
            tags,
        } => {
            commands::edit_tarefa(
                app,
                id,
                EditTarefa {
                    nome,
                    descricao,
                    status,
                    prioridade,
                    responsavel,
                    prazo,
                    tags,
                },
            )
            .await
        }
        TaskCommands::Status { id, status } => commands::set_tarefa_status(app, id, status).await,
        TaskCommands::Delete { id } => commands::delete_tarefa(app, id).await,
    }
}

fn update_config(
    app: &App,
    api_url: Option<String>,
    logout_policy: Option<String>,
    timeout: Option<u64>,
) -> Result<()> {
    // Start from the file, not from the effective config with CLI overrides.
    let mut config = Config::load().unwrap_or_else(|_| app.config.clone());
    let changed = api_url.is_some() || logout_policy.is_some() || timeout.is_some();

    if let Some(url) = api_url {
        config.api_url = Some(url);
    }
    if let Some(policy) = logout_policy {
        config.logout_policy = parse_logout_policy(&policy)?;
    }
    if let Some(secs) = timeout {
        config.request_timeout_secs = (secs > 0).then_some(secs);
    }
    if changed {
        config.save().context("Failed to save config")?;
    }

    println!("api_url:         {}", config.api_url());
    println!("logout_policy:   {:?}", config.logout_policy);
    match config.request_timeout_secs {
        Some(secs) => println!("request_timeout: {}s", secs),
        None => println!("request_timeout: none"),
    }
    Ok(())
}

fn parse_logout_policy(value: &str) -> Result<LogoutPolicy> {
    match value.trim().to_lowercase().replace('-', "_").as_str() {
        "keep_profile" => Ok(LogoutPolicy::KeepProfile),
        "clear_all" => Ok(LogoutPolicy::ClearAll),
        other => anyhow::bail!("Unknown logout policy: {} (keep_profile or clear_all)", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_task_list_args() {
        let cli = Cli::try_parse_from([
            "takeatask", "tasks", "list", "--tab", "minhas", "--status", "EM_ANDAMENTO",
            "--tag", "Bug", "--tag", "Docs",
        ])
        .unwrap();
        match cli.command {
            Commands::Tasks {
                command: TaskCommands::List { tab, status, tags, page, .. },
            } => {
                assert_eq!(tab, "minhas");
                assert_eq!(status, Some(StatusTarefa::EmAndamento));
                assert_eq!(tags, vec!["Bug", "Docs"]);
                assert_eq!(page, 1);
            }
            _ => panic!("expected tasks list"),
        }
    }

    #[test]
    fn test_parse_task_status_and_edit() {
        let cli = Cli::try_parse_from(["takeatask", "tasks", "status", "7", "concluída"]).unwrap();
        match cli.command {
            Commands::Tasks {
                command: TaskCommands::Status { id, status },
            } => {
                assert_eq!(id, 7);
                assert_eq!(status, StatusTarefa::Concluida);
            }
            _ => panic!("expected tasks status"),
        }

        let cli = Cli::try_parse_from([
            "takeatask", "tasks", "edit", "7", "--prioridade", "alta", "--tag", "Bug",
        ])
        .unwrap();
        match cli.command {
            Commands::Tasks {
                command: TaskCommands::Edit { id, prioridade, tags, nome, .. },
            } => {
                assert_eq!(id, 7);
                assert_eq!(prioridade, Some(PrioridadeTarefa::Alta));
                assert_eq!(tags, vec!["Bug"]);
                assert_eq!(nome, None);
            }
            _ => panic!("expected tasks edit"),
        }
    }

    #[test]
    fn test_users_show_by_id_or_login() {
        let cli = Cli::try_parse_from(["takeatask", "users", "show", "12"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Users {
                command: UserCommands::Show { id: Some(12), login: None }
            }
        ));

        // numeric logins stay logins when asked for explicitly
        let cli = Cli::try_parse_from(["takeatask", "users", "show", "--login", "12345"]).unwrap();
        match cli.command {
            Commands::Users {
                command: UserCommands::Show { id, login },
            } => {
                assert_eq!(id, None);
                assert_eq!(login.as_deref(), Some("12345"));
            }
            _ => panic!("expected users show"),
        }

        assert!(Cli::try_parse_from(["takeatask", "users", "show"]).is_err());
        assert!(Cli::try_parse_from(["takeatask", "users", "show", "1", "--login", "ana"]).is_err());
    }

    #[test]
    fn test_parse_user_create_and_edit() {
        let cli = Cli::try_parse_from([
            "takeatask", "users", "create", "Ana Souza", "ana", "--perfil", "admin",
        ])
        .unwrap();
        match cli.command {
            Commands::Users {
                command: UserCommands::Create { login, perfil, .. },
            } => {
                assert_eq!(login, "ana");
                assert_eq!(perfil, PerfilUsuario::AdministradorGestor);
            }
            _ => panic!("expected users create"),
        }

        let cli = Cli::try_parse_from([
            "takeatask", "users", "edit", "3", "--ativo", "false", "--senha",
        ])
        .unwrap();
        match cli.command {
            Commands::Users {
                command: UserCommands::Edit { id, ativo, senha, .. },
            } => {
                assert_eq!(id, 3);
                assert_eq!(ativo, Some(false));
                assert!(senha);
            }
            _ => panic!("expected users edit"),
        }
    }

    #[test]
    fn test_parse_tag_edit() {
        let cli = Cli::try_parse_from(["takeatask", "tags", "edit", "4", "--cor", "#DC2626"]).unwrap();
        match cli.command {
            Commands::Tags {
                command: TagCommands::Edit { id, cor, nome, .. },
            } => {
                assert_eq!(id, 4);
                assert_eq!(cor.as_deref(), Some("#DC2626"));
                assert_eq!(nome, None);
            }
            _ => panic!("expected tags edit"),
        }
    }

    #[test]
    fn test_parse_logout_policy() {
        assert_eq!(parse_logout_policy("clear-all").unwrap(), LogoutPolicy::ClearAll);
        assert_eq!(parse_logout_policy("KEEP_PROFILE").unwrap(), LogoutPolicy::KeepProfile);
        assert!(parse_logout_policy("forget").is_err());
    }

    #[test]
    fn test_user_message_prefers_auth_text() {
        let err: anyhow::Error = AuthError::Rejected {
            status: 400,
            message: "Credenciais inválidas".into(),
        }
        .into();
        assert_eq!(user_message(&err), "Credenciais inválidas");

        let err: anyhow::Error = anyhow::Error::new(ApiError::NotFound("Tarefa 9".into()))
            .context("GET /api/tarefas/9 failed");
        assert_eq!(user_message(&err), "Resource not found: Tarefa 9");
    }
}
