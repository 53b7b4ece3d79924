//! Domain command handlers.

use std::sync::Arc;

use tabled::Tabled;

use rwtool_core::projection::{StatusFilter, project};
use rwtool_core::{Domain, DomainDraft, DomainId, validation};

use crate::cli::{DomainsArgs, DomainsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::CommandContext;
use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DomainRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Created")]
    created: String,
}

fn domain_row(d: &Arc<Domain>) -> DomainRow {
    DomainRow {
        id: d.id.to_string(),
        name: d.name.clone(),
        description: output::or_dash(Some(&d.description)),
        created: output::fmt_time(d.created),
    }
}

fn detail(d: &Domain) -> String {
    output::detail_lines(&[
        ("ID", d.id.to_string()),
        ("Name", d.name.clone()),
        ("Description", output::or_dash(Some(&d.description))),
        ("Created", output::fmt_time(d.created)),
    ])
}

fn not_found(err: CliError, id: &str) -> CliError {
    err.for_resource("domain", id, "domains list")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: DomainsArgs,
    ctx: &CommandContext,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let gw = &ctx.gateways.domains;

    match args.command {
        DomainsCommand::List(filter) => {
            let all: Vec<Arc<Domain>> = gw.list_domains().await?.into_iter().map(Arc::new).collect();
            let visible = project(
                &all,
                filter.search.as_deref().unwrap_or_default(),
                &StatusFilter::parse(filter.status.as_deref()),
            );
            let out = output::render_list(&global.output, &visible, domain_row, |d| d.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DomainsCommand::Get { id } => {
            let domain = gw
                .get_domain(DomainId::from(id.as_str()))
                .await
                .map_err(|e| not_found(e.into(), &id))?;
            let out = output::render_single(&global.output, &domain, detail, |d| d.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DomainsCommand::Create { name, description } => {
            let draft = DomainDraft::new(name.trim(), description.trim());
            validation::domain_draft(&draft)?;
            let created = gw.create_domain(draft).await?;
            ctx.notice(global, "Domain created successfully");
            let out = output::render_single(&global.output, &created, detail, |d| d.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DomainsCommand::Update {
            id,
            name,
            description,
        } => {
            let domain_id = DomainId::from(id.as_str());
            // The server replaces the whole record, so unset fields keep
            // their current values.
            let current = gw
                .get_domain(domain_id.clone())
                .await
                .map_err(|e| not_found(e.into(), &id))?;
            let draft = DomainDraft::new(
                name.map_or(current.name, |n| n.trim().to_owned()),
                description.map_or(current.description, |d| d.trim().to_owned()),
            );
            validation::domain_draft(&draft)?;
            let updated = gw.update_domain(domain_id, draft).await?;
            ctx.notice(global, "Domain updated successfully");
            let out = output::render_single(&global.output, &updated, detail, |d| d.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DomainsCommand::Delete { id } => {
            util::confirm(
                &format!("Delete domain {id}? This cannot be undone."),
                "domains delete",
                global.yes,
            )?;
            gw.delete_domain(DomainId::from(id.as_str()))
                .await
                .map_err(|e| not_found(e.into(), &id))?;
            ctx.notice(global, "Domain deleted successfully");
            Ok(())
        }
    }
}
