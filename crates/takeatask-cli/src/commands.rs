//! Subcommand handlers. Each one prints its result to stdout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::info;

use takeatask_core::auth::{GuardDecision, RouteGuard, TOKEN_KEY};
use takeatask_core::models::{
    NovaSubtarefa, NovaTag, NovaTarefa, NovoUsuario, PerfilUsuario, PrioridadeTarefa,
    StatusTarefa, SubtarefaUpdate, Tag, Tarefa, TarefaFilter, TarefaUpdate, UsuarioUpdate,
};
use takeatask_core::utils::{
    format_date, format_date_time, initials, paginate, truncate_string,
};

use crate::app::App;

/// Tasks shown under "recent" on the stats screen.
const RECENT_TASKS: usize = 5;

/// Width of the task name column in listings.
const NAME_COLUMN_WIDTH: usize = 40;

// ===== Session =====

pub fn whoami(app: &App) -> Result<()> {
    println!("API:        {}", app.api.base_url());
    println!("Policy:     {:?}", app.config.logout_policy);
    if app.is_authenticated() {
        let name = app.session.display_name();
        println!("Usuário:    {} ({})", name, initials(&name));
        match app.session.cookies().expires_at(TOKEN_KEY) {
            Some(expiry) => println!("Cookie até: {}", expiry.with_timezone(&Local).format("%d/%m/%Y %H:%M")),
            None => println!("Cookie:     ausente"),
        }
    } else {
        println!("Sessão:     não autenticado");
    }
    if let Some(login) = app.session.remembered_login() {
        println!("Login salvo: {}", login);
    }
    Ok(())
}

pub fn guard(app: &App, path: &str) -> Result<()> {
    let cookie = app.session.cookie_token();
    let decision = RouteGuard::evaluate(path, cookie.as_deref());
    info!(path, ?decision, "Route evaluated");
    match decision.location() {
        None => println!("allow {}", path),
        Some(location) => {
            let kind = match decision {
                GuardDecision::RedirectToApp => "redirect (authenticated)",
                _ => "redirect (login required)",
            };
            println!("{} -> {}", kind, location);
        }
    }
    Ok(())
}

/// Ask for a new password twice.
fn prompt_new_password() -> Result<String> {
    let senha = rpassword::prompt_password("Senha: ")?;
    let confirm = rpassword::prompt_password("Confirme a senha: ")?;
    if senha != confirm {
        anyhow::bail!("As senhas não coincidem.");
    }
    Ok(senha)
}

pub async fn register(app: &App, nome: &str, login: &str) -> Result<()> {
    let senha = prompt_new_password()?;
    let novo = NovoUsuario::registration(nome.trim(), login.trim(), &senha);
    let usuario = app.api.register(&novo).await?;
    println!("Conta criada para {} (id {}). Faça login com `takeatask login`.", usuario.nome, usuario.id);
    Ok(())
}

// ===== Dashboard =====

pub async fn stats(app: &App) -> Result<()> {
    app.require_session()?;
    let filter = TarefaFilter::from_tab("minhas").unwrap_or_default();
    let (stats, tarefas) =
        futures::try_join!(app.api.tarefa_stats(), app.api.list_tarefas(&filter))?;

    println!("Olá, {}!\n", app.session.display_name());
    println!("Total:         {}", stats.total_tarefas);
    println!("Em andamento:  {}", stats.tarefas_em_andamento);
    println!("Concluídas:    {} ({}%)", stats.tarefas_concluidas, stats.completion_percent());
    println!("Atrasadas:     {}", stats.tarefas_atrasadas);

    let mut recent = tarefas;
    recent.sort_by(|a, b| b.data_criacao.cmp(&a.data_criacao));
    if !recent.is_empty() {
        println!("\nRecentes:");
        for tarefa in recent.iter().take(RECENT_TASKS) {
            print_tarefa_row(tarefa);
        }
    }
    Ok(())
}

// ===== Tarefas =====

pub struct ListTarefas<'a> {
    pub tab: &'a str,
    pub q: Option<&'a str>,
    pub status: Option<StatusTarefa>,
    pub prioridade: Option<PrioridadeTarefa>,
    pub tags: &'a [String],
    pub page: usize,
    pub per_page: usize,
}

pub async fn list_tarefas(app: &App, args: ListTarefas<'_>) -> Result<()> {
    app.require_session()?;
    let mut filter = TarefaFilter::from_tab(args.tab)
        .with_context(|| format!("Aba desconhecida: {}", args.tab))?;
    if let Some(q) = args.q {
        filter = filter.with_query(q);
    }
    if args.status.is_some() {
        filter.status = args.status;
    }
    filter.prioridade = args.prioridade;
    if !args.tags.is_empty() {
        let resolved = app.api.tags_by_names(args.tags).await?;
        let unknown = unknown_tag_names(args.tags, &resolved);
        if !unknown.is_empty() {
            anyhow::bail!("Tag desconhecida: {}", unknown.join(", "));
        }
        filter.tag_ids = resolved.into_iter().map(|t| t.id).collect();
    }

    let tarefas = app.api.list_tarefas(&filter).await?;
    let page = paginate(&tarefas, args.page, args.per_page);
    if page.items.is_empty() {
        println!("Nenhuma tarefa encontrada.");
        return Ok(());
    }
    for tarefa in &page.items {
        print_tarefa_row(tarefa);
    }
    println!(
        "\nPágina {}/{} ({} tarefas)",
        page.page, page.total_pages, page.total_items
    );
    Ok(())
}

pub async fn search_tarefas(app: &App, keyword: &str) -> Result<()> {
    app.require_session()?;
    let tarefas = app.api.search_tarefas(keyword).await?;
    if tarefas.is_empty() {
        println!("Nenhuma tarefa encontrada para \"{}\".", keyword);
    }
    for tarefa in &tarefas {
        print_tarefa_row(tarefa);
    }
    Ok(())
}

pub async fn show_tarefa(app: &App, id: i64) -> Result<()> {
    app.require_session()?;
    let (tarefa, subtarefas) =
        futures::try_join!(app.api.get_tarefa(id), app.api.list_subtarefas(id))?;

    println!("#{} {}", tarefa.id, tarefa.nome);
    println!("Status:      {}", tarefa.status);
    println!("Prioridade:  {}", tarefa.prioridade);
    println!("Responsável: {}", tarefa.responsavel_display());
    println!("Criada:      {}", format_date_time(tarefa.data_criacao.as_ref()));
    let overdue = if tarefa.is_overdue(Local::now().naive_local()) {
        " (atrasada)"
    } else {
        ""
    };
    println!("Prazo:       {}{}", format_date(tarefa.data_prazo.as_ref()), overdue);
    if !tarefa.tags.is_empty() {
        let tags: Vec<String> = tarefa
            .tags
            .iter()
            .map(|t| format!("{} {}", t.nome, t.color()))
            .collect();
        println!("Tags:        {}", tags.join(", "));
    }
    if let Some(ref descricao) = tarefa.descricao {
        println!("\n{}", descricao);
    }

    if !subtarefas.is_empty() {
        let (done, total) = takeatask_core::models::subtarefa::progress(&subtarefas);
        println!("\nSubtarefas ({}/{}):", done, total);
        for sub in &subtarefas {
            println!("  [{}] #{} {}", if sub.concluida { "x" } else { " " }, sub.id, sub.descricao);
        }
    }
    if !tarefa.anexos.is_empty() {
        println!("\nAnexos:");
        for anexo in &tarefa.anexos {
            println!("  #{} {} ({})", anexo.id, anexo.nome_arquivo, anexo.size_display());
        }
    }
    if !tarefa.comentarios.is_empty() {
        println!("\nComentários:");
        for c in &tarefa.comentarios {
            println!(
                "  [{}] {} - {}",
                c.author_initials(),
                format_date_time(c.data_criacao.as_ref()),
                c.texto
            );
        }
    }
    Ok(())
}

pub struct CreateTarefa {
    pub nome: String,
    pub descricao: Option<String>,
    pub status: Option<StatusTarefa>,
    pub prioridade: Option<PrioridadeTarefa>,
    pub responsavel: Option<i64>,
    pub prazo: Option<String>,
    pub tags: Vec<String>,
}

pub async fn create_tarefa(app: &App, args: CreateTarefa) -> Result<()> {
    app.require_session()?;
    let mut nova = NovaTarefa::new(args.nome.trim());
    nova.descricao = args.descricao;
    if let Some(status) = args.status {
        nova.status = status;
    }
    if let Some(prioridade) = args.prioridade {
        nova.prioridade = prioridade;
    }
    nova.responsavel_id = args.responsavel;
    nova.data_prazo = args.prazo.as_deref().map(parse_deadline).transpose()?;
    nova.tags = args.tags;

    let tarefa = app.api.create_tarefa(&nova).await?;
    println!("Tarefa criada: #{} {}", tarefa.id, tarefa.nome);
    Ok(())
}

pub async fn delete_tarefa(app: &App, id: i64) -> Result<()> {
    app.require_session()?;
    app.api.delete_tarefa(id).await?;
    println!("Tarefa #{} excluída.", id);
    Ok(())
}

pub struct EditTarefa {
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub status: Option<StatusTarefa>,
    pub prioridade: Option<PrioridadeTarefa>,
    pub responsavel: Option<i64>,
    pub prazo: Option<String>,
    /// Replaces the task's tags when non-empty.
    pub tags: Vec<String>,
}

pub async fn edit_tarefa(app: &App, id: i64, args: EditTarefa) -> Result<()> {
    app.require_session()?;
    let update = tarefa_update(args)?;
    let tarefa = app.api.update_tarefa(id, &update).await?;
    println!("Tarefa atualizada:");
    print_tarefa_row(&tarefa);
    Ok(())
}

pub async fn set_tarefa_status(app: &App, id: i64, status: StatusTarefa) -> Result<()> {
    app.require_session()?;
    let tarefa = app
        .api
        .update_tarefa(id, &TarefaUpdate::status(status))
        .await?;
    println!("Tarefa #{} agora está {}.", tarefa.id, tarefa.status.label());
    Ok(())
}

fn tarefa_update(args: EditTarefa) -> Result<TarefaUpdate> {
    let update = TarefaUpdate {
        nome: args.nome.map(|n| n.trim().to_string()),
        descricao: args.descricao,
        status: args.status,
        prioridade: args.prioridade,
        responsavel_id: args.responsavel,
        data_prazo: args.prazo.as_deref().map(parse_deadline).transpose()?,
        tags: (!args.tags.is_empty()).then_some(args.tags),
    };
    if update.is_empty() {
        anyhow::bail!("Nada para alterar.");
    }
    Ok(update)
}

/// Requested names with no matching tag, as typed.
fn unknown_tag_names<'a>(requested: &'a [String], resolved: &[Tag]) -> Vec<&'a str> {
    requested
        .iter()
        .map(String::as_str)
        .filter(|name| {
            let wanted = name.trim().to_lowercase();
            !resolved.iter().any(|t| t.nome.to_lowercase() == wanted)
        })
        .collect()
}

fn print_tarefa_row(tarefa: &Tarefa) {
    println!(
        "#{:<5} {:<width$} {:<13} {:<8} {}",
        tarefa.id,
        truncate_string(&tarefa.nome, NAME_COLUMN_WIDTH),
        tarefa.status.label(),
        tarefa.prioridade.label(),
        format_date(tarefa.data_prazo.as_ref()),
        width = NAME_COLUMN_WIDTH
    );
}

/// `YYYY-MM-DD` (end of day) or `YYYY-MM-DDTHH:MM[:SS]`.
fn parse_deadline(input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default();
        return Ok(date.and_time(end_of_day));
    }
    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M"))
        .with_context(|| format!("Prazo inválido: {} (use AAAA-MM-DD)", input))
}

// ===== Usuarios =====

pub async fn list_usuarios(app: &App, q: Option<&str>) -> Result<()> {
    app.require_session()?;
    for u in app.api.list_usuarios(q).await? {
        let perfil = u.perfil.map(|p| p.label()).unwrap_or("-");
        println!(
            "#{:<5} {:<30} {:<20} {}",
            u.id,
            truncate_string(&u.nome, 30),
            u.login,
            perfil
        );
    }
    Ok(())
}

pub enum UsuarioRef {
    Id(i64),
    Login(String),
}

pub async fn show_usuario(app: &App, who: UsuarioRef) -> Result<()> {
    app.require_session()?;
    let usuario = match who {
        UsuarioRef::Id(id) => app.api.get_usuario(id).await?,
        UsuarioRef::Login(login) => app.api.get_usuario_by_login(login.trim()).await?,
    };
    println!("#{} {} ({})", usuario.id, usuario.nome, usuario.login);
    println!("Email:        {}", usuario.email.as_deref().unwrap_or("N/A"));
    println!(
        "Perfil:       {}",
        usuario.perfil.map(|p| p.label()).unwrap_or("N/A")
    );
    println!("Cargo:        {}", usuario.cargo.as_deref().unwrap_or("N/A"));
    println!("Departamento: {}", usuario.departamento.as_deref().unwrap_or("N/A"));
    println!("Ativo:        {}", if usuario.ativo { "sim" } else { "não" });
    println!("Desde:        {}", format_date(usuario.data_criacao.as_ref()));
    Ok(())
}

pub struct CreateUsuario {
    pub nome: String,
    pub login: String,
    pub email: Option<String>,
    pub perfil: PerfilUsuario,
    pub cargo: Option<String>,
    pub telefone: Option<String>,
    pub departamento: Option<String>,
}

pub async fn create_usuario(app: &App, args: CreateUsuario) -> Result<()> {
    app.require_session()?;
    let senha = prompt_new_password()?;
    let mut novo = NovoUsuario::registration(args.nome.trim(), args.login.trim(), &senha);
    novo.email = args.email;
    novo.perfil = args.perfil;
    novo.cargo = args.cargo;
    novo.telefone = args.telefone;
    novo.departamento = args.departamento;

    let usuario = app.api.create_usuario(&novo).await?;
    println!("Usuário criado: #{} {} ({})", usuario.id, usuario.nome, usuario.login);
    Ok(())
}

pub struct EditUsuario {
    pub nome: Option<String>,
    pub login: Option<String>,
    pub email: Option<String>,
    pub perfil: Option<PerfilUsuario>,
    pub cargo: Option<String>,
    pub telefone: Option<String>,
    pub departamento: Option<String>,
    pub ativo: Option<bool>,
    /// Prompt for a new password.
    pub senha: bool,
}

pub async fn edit_usuario(app: &App, id: i64, args: EditUsuario) -> Result<()> {
    app.require_session()?;
    let senha = if args.senha {
        Some(prompt_new_password()?)
    } else {
        None
    };
    let update = usuario_update(args, senha)?;
    let usuario = app.api.update_usuario(id, &update).await?;
    println!("Usuário atualizado: #{} {} ({})", usuario.id, usuario.nome, usuario.login);
    Ok(())
}

fn usuario_update(args: EditUsuario, senha: Option<String>) -> Result<UsuarioUpdate> {
    let update = UsuarioUpdate {
        nome: args.nome.map(|n| n.trim().to_string()),
        login: args.login.map(|l| l.trim().to_string()),
        email: args.email,
        senha,
        perfil: args.perfil,
        cargo: args.cargo,
        telefone: args.telefone,
        departamento: args.departamento,
        ativo: args.ativo,
    };
    if update.is_empty() {
        anyhow::bail!("Nada para alterar.");
    }
    Ok(update)
}

pub async fn delete_usuario(app: &App, id: i64) -> Result<()> {
    app.require_session()?;
    app.api.delete_usuario(id).await?;
    println!("Usuário #{} excluído.", id);
    Ok(())
}

// ===== Tags =====

pub async fn list_tags(app: &App, q: Option<&str>) -> Result<()> {
    app.require_session()?;
    let tags = match q {
        Some(q) => app.api.list_tags(Some(q)).await?,
        None => app.api.tags().await?,
    };
    for tag in tags {
        println!(
            "#{:<5} {:<20} {} {}",
            tag.id,
            tag.nome,
            tag.color(),
            tag.descricao.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

pub async fn create_tag(
    app: &App,
    nome: String,
    cor: Option<String>,
    descricao: Option<String>,
) -> Result<()> {
    app.require_session()?;
    let tag = app
        .api
        .create_tag(&NovaTag {
            nome,
            cor,
            descricao,
        })
        .await?;
    println!("Tag criada: #{} {} {}", tag.id, tag.nome, tag.color());
    Ok(())
}

pub async fn show_tag(app: &App, nome: &str) -> Result<()> {
    app.require_session()?;
    let tag = app.api.get_tag_by_name(nome.trim()).await?;
    println!("#{} {} {}", tag.id, tag.nome, tag.color());
    if let Some(ref descricao) = tag.descricao {
        println!("{}", descricao);
    }
    println!("Criada: {}", format_date(tag.data_criacao.as_ref()));
    Ok(())
}

/// Rename or recolour a tag. Fields left out keep their current value.
pub async fn edit_tag(
    app: &App,
    id: i64,
    nome: Option<String>,
    cor: Option<String>,
    descricao: Option<String>,
) -> Result<()> {
    app.require_session()?;
    if nome.is_none() && cor.is_none() && descricao.is_none() {
        anyhow::bail!("Nada para alterar.");
    }
    let atual = app.api.get_tag(id).await?;
    let tag = app.api.update_tag(id, &merge_tag(atual, nome, cor, descricao)).await?;
    println!("Tag atualizada: #{} {} {}", tag.id, tag.nome, tag.color());
    Ok(())
}

fn merge_tag(
    atual: Tag,
    nome: Option<String>,
    cor: Option<String>,
    descricao: Option<String>,
) -> NovaTag {
    NovaTag {
        nome: nome.map(|n| n.trim().to_string()).unwrap_or(atual.nome),
        cor: cor.or(atual.cor),
        descricao: descricao.or(atual.descricao),
    }
}

pub async fn delete_tag(app: &App, id: i64) -> Result<()> {
    app.require_session()?;
    app.api.delete_tag(id).await?;
    println!("Tag #{} excluída.", id);
    Ok(())
}

// ===== Comentarios =====

pub async fn list_comentarios(app: &App, tarefa_id: i64) -> Result<()> {
    app.require_session()?;
    let comentarios = app.api.list_comentarios(tarefa_id).await?;
    if comentarios.is_empty() {
        println!("Sem comentários.");
    }
    for c in comentarios {
        println!(
            "#{:<5} [{}] {} {}: {}",
            c.id,
            c.author_initials(),
            format_date_time(c.data_criacao.as_ref()),
            c.nome_autor.as_deref().unwrap_or("?"),
            c.texto
        );
    }
    Ok(())
}

pub async fn add_comentario(app: &App, tarefa_id: i64, texto: &str) -> Result<()> {
    app.require_session()?;
    let c = app.api.add_comentario(tarefa_id, texto).await?;
    println!("Comentário #{} adicionado.", c.id);
    Ok(())
}

pub async fn delete_comentario(app: &App, tarefa_id: i64, id: i64) -> Result<()> {
    app.require_session()?;
    app.api.delete_comentario(tarefa_id, id).await?;
    println!("Comentário #{} excluído.", id);
    Ok(())
}

// ===== Anexos =====

pub async fn list_anexos(app: &App, tarefa_id: i64) -> Result<()> {
    app.require_session()?;
    for a in app.api.list_anexos(tarefa_id).await? {
        println!(
            "#{:<5} {:<30} {:>10} {}",
            a.id,
            truncate_string(&a.nome_arquivo, 30),
            a.size_display(),
            format_date(a.data_upload.as_ref())
        );
    }
    Ok(())
}

pub async fn upload_anexo(app: &App, tarefa_id: i64, path: &Path) -> Result<()> {
    app.require_session()?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Invalid file name: {:?}", path))?
        .to_string();
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))?;
    let anexo = app.api.upload_anexo(tarefa_id, &file_name, bytes).await?;
    println!("Anexo enviado: #{} {} ({})", anexo.id, anexo.nome_arquivo, anexo.size_display());
    Ok(())
}

pub async fn download_anexo(
    app: &App,
    tarefa_id: i64,
    id: i64,
    out: Option<PathBuf>,
) -> Result<()> {
    app.require_session()?;
    let out = match out {
        Some(out) => out,
        None => PathBuf::from(app.api.get_anexo(tarefa_id, id).await?.nome_arquivo),
    };
    let bytes = app.api.download_anexo(tarefa_id, id).await?;
    tokio::fs::write(&out, &bytes)
        .await
        .with_context(|| format!("Failed to write {:?}", out))?;
    println!("Salvo em {} ({} bytes)", out.display(), bytes.len());
    Ok(())
}

pub async fn delete_anexo(app: &App, tarefa_id: i64, id: i64) -> Result<()> {
    app.require_session()?;
    app.api.delete_anexo(tarefa_id, id).await?;
    println!("Anexo #{} excluído.", id);
    Ok(())
}

// ===== Subtarefas =====

pub async fn list_subtarefas(app: &App, tarefa_id: i64) -> Result<()> {
    app.require_session()?;
    for sub in app.api.list_subtarefas(tarefa_id).await? {
        println!(
            "[{}] #{:<5} {} {}",
            if sub.concluida { "x" } else { " " },
            sub.id,
            sub.descricao,
            sub.nome_responsavel.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

pub async fn add_subtarefa(
    app: &App,
    tarefa_id: i64,
    descricao: &str,
    responsavel: Option<i64>,
) -> Result<()> {
    app.require_session()?;
    let sub = app
        .api
        .create_subtarefa(&NovaSubtarefa {
            descricao: descricao.trim().to_string(),
            tarefa_principal_id: tarefa_id,
            responsavel_id: responsavel,
        })
        .await?;
    println!("Subtarefa #{} adicionada.", sub.id);
    Ok(())
}

pub async fn complete_subtarefa(app: &App, tarefa_id: i64, id: i64, done: bool) -> Result<()> {
    app.require_session()?;
    let update = SubtarefaUpdate {
        concluida: Some(done),
        ..Default::default()
    };
    let sub = app.api.update_subtarefa(tarefa_id, id, &update).await?;
    println!(
        "Subtarefa #{} {}.",
        sub.id,
        if sub.concluida { "concluída" } else { "reaberta" }
    );
    Ok(())
}

pub async fn delete_subtarefa(app: &App, tarefa_id: i64, id: i64) -> Result<()> {
    app.require_session()?;
    app.api.delete_subtarefa(tarefa_id, id).await?;
    println!("Subtarefa #{} excluída.", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deadline_date_only() {
        let dt = parse_deadline("2024-12-31").unwrap();
        assert_eq!(dt.to_string(), "2024-12-31 23:59:59");
    }

    #[test]
    fn test_parse_deadline_with_time() {
        assert_eq!(
            parse_deadline("2024-12-31T09:30").unwrap().to_string(),
            "2024-12-31 09:30:00"
        );
        assert_eq!(
            parse_deadline(" 2024-12-31T09:30:15 ").unwrap().to_string(),
            "2024-12-31 09:30:15"
        );
    }

    fn tag(id: i64, nome: &str) -> Tag {
        Tag {
            id,
            nome: nome.to_string(),
            cor: None,
            descricao: None,
            data_criacao: None,
        }
    }

    #[test]
    fn test_unknown_tag_names_are_reported() {
        let requested = vec!["bug".to_string(), "Nope".to_string(), " Docs ".to_string()];
        let resolved = vec![tag(1, "Bug"), tag(2, "Docs")];
        assert_eq!(unknown_tag_names(&requested, &resolved), vec!["Nope"]);
        assert!(unknown_tag_names(&requested[..1], &resolved).is_empty());
        assert_eq!(unknown_tag_names(&requested[1..2], &[]), vec!["Nope"]);
    }

    fn no_task_changes() -> EditTarefa {
        EditTarefa {
            nome: None,
            descricao: None,
            status: None,
            prioridade: None,
            responsavel: None,
            prazo: None,
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_tarefa_update_requires_a_change() {
        assert!(tarefa_update(no_task_changes()).is_err());

        let update = tarefa_update(EditTarefa {
            nome: Some("  Novo nome ".into()),
            prazo: Some("2024-12-31".into()),
            ..no_task_changes()
        })
        .unwrap();
        assert_eq!(update.nome.as_deref(), Some("Novo nome"));
        assert_eq!(update.data_prazo.unwrap().to_string(), "2024-12-31 23:59:59");
        assert_eq!(update.tags, None);

        let update = tarefa_update(EditTarefa {
            tags: vec!["Bug".into()],
            ..no_task_changes()
        })
        .unwrap();
        assert_eq!(update.tags, Some(vec!["Bug".to_string()]));
    }

    #[test]
    fn test_usuario_update_requires_a_change() {
        let nothing = EditUsuario {
            nome: None,
            login: None,
            email: None,
            perfil: None,
            cargo: None,
            telefone: None,
            departamento: None,
            ativo: None,
            senha: false,
        };
        assert!(usuario_update(nothing, None).is_err());

        let update = usuario_update(
            EditUsuario {
                nome: None,
                login: None,
                email: None,
                perfil: Some(PerfilUsuario::AdministradorGestor),
                cargo: None,
                telefone: None,
                departamento: None,
                ativo: Some(false),
                senha: false,
            },
            None,
        )
        .unwrap();
        assert_eq!(update.perfil, Some(PerfilUsuario::AdministradorGestor));
        assert_eq!(update.ativo, Some(false));
        assert_eq!(update.senha, None);
    }

    #[test]
    fn test_merge_tag_keeps_unchanged_fields() {
        let atual = Tag {
            cor: Some("#EF4444".into()),
            descricao: Some("Defeitos".into()),
            ..tag(1, "Bug")
        };
        let merged = merge_tag(atual, None, Some("#DC2626".into()), None);
        assert_eq!(merged.nome, "Bug");
        assert_eq!(merged.cor.as_deref(), Some("#DC2626"));
        assert_eq!(merged.descricao.as_deref(), Some("Defeitos"));
    }

    #[test]
    fn test_parse_deadline_rejects_garbage() {
        assert!(parse_deadline("31/12/2024").is_err());
        assert!(parse_deadline("").is_err());
    }
}
