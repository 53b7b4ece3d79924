//! User group command handlers.

use std::sync::Arc;

use tabled::Tabled;

use rwtool_core::projection::{StatusFilter, project};
use rwtool_core::{Folder, GroupId, UserGroup, UserGroupDraft, validation};

use crate::cli::{GlobalOpts, GroupFields, GroupsArgs, GroupsCommand};
use crate::error::CliError;
use crate::output;

use super::CommandContext;
use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "AD Group")]
    name: String,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Folders")]
    folders: String,
    #[tabled(rename = "Members")]
    members: usize,
    #[tabled(rename = "Updated")]
    updated: String,
}

fn group_row(g: &Arc<UserGroup>) -> GroupRow {
    GroupRow {
        id: g.id.to_string(),
        name: g.ad_group_name.clone(),
        domain: output::or_dash(g.associated_domain.as_deref()),
        folders: g.folder_access.join(", "),
        members: g.members.len(),
        updated: output::fmt_time(g.updated.or(g.created)),
    }
}

fn detail(g: &UserGroup) -> String {
    output::detail_lines(&[
        ("ID", g.id.to_string()),
        ("AD Group", g.ad_group_name.clone()),
        ("Domain", output::or_dash(g.associated_domain.as_deref())),
        ("Folders", g.folder_access.join(", ")),
        ("Members", g.members.join(", ")),
        ("Created", output::fmt_time(g.created)),
        ("Updated", output::fmt_time(g.updated)),
    ])
}

#[derive(Tabled)]
struct FolderRow {
    #[tabled(rename = "Folder")]
    name: String,
}

fn not_found(err: CliError, id: GroupId) -> CliError {
    err.for_resource("user group", &id.to_string(), "groups list")
}

/// Draft from flags, falling back to `base` for anything not given.
fn draft_from(fields: GroupFields, base: Option<&UserGroup>) -> UserGroupDraft {
    let keep_or = |given: Vec<String>, current: Option<&Vec<String>>| {
        if given.is_empty() {
            current.cloned().unwrap_or_default()
        } else {
            given.into_iter().map(|s| s.trim().to_owned()).collect()
        }
    };
    UserGroupDraft {
        ad_group_name: fields
            .name
            .map(|n| n.trim().to_owned())
            .or_else(|| base.map(|g| g.ad_group_name.clone()))
            .unwrap_or_default(),
        folder_access: keep_or(fields.folders, base.map(|g| &g.folder_access)),
        associated_domain: fields
            .domain
            .map(|d| d.trim().to_owned())
            .or_else(|| base.and_then(|g| g.associated_domain.clone()))
            .unwrap_or_default(),
        members: keep_or(fields.members, base.map(|g| &g.members)),
    }
}

fn print_group(global: &GlobalOpts, group: &UserGroup) {
    let out = output::render_single(&global.output, group, detail, |g| g.id.to_string());
    output::print_output(&out, global.quiet);
}

fn print_groups(global: &GlobalOpts, groups: &[Arc<UserGroup>]) {
    let out = output::render_list(&global.output, groups, group_row, |g| g.id.to_string());
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: GroupsArgs,
    ctx: &CommandContext,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let gw = &ctx.gateways.groups;

    match args.command {
        GroupsCommand::List(filter) => {
            let all: Vec<Arc<UserGroup>> =
                gw.list_groups().await?.into_iter().map(Arc::new).collect();
            let visible = project(
                &all,
                filter.search.as_deref().unwrap_or_default(),
                &StatusFilter::parse(filter.status.as_deref()),
            );
            print_groups(global, &visible);
            Ok(())
        }

        GroupsCommand::Get { id } => {
            let id = GroupId(id);
            let group = gw.get_group(id).await.map_err(|e| not_found(e.into(), id))?;
            print_group(global, &group);
            Ok(())
        }

        GroupsCommand::Create(fields) => {
            let draft = draft_from(fields, None);
            validation::user_group_draft(&draft)?;
            let created = gw.create_group(draft).await?;
            ctx.notice(global, "User group created successfully");
            print_group(global, &created);
            Ok(())
        }

        GroupsCommand::Update { id, fields } => {
            let id = GroupId(id);
            let current = gw.get_group(id).await.map_err(|e| not_found(e.into(), id))?;
            let draft = draft_from(fields, Some(&current));
            validation::user_group_draft(&draft)?;
            let updated = gw.update_group(id, draft).await?;
            ctx.notice(global, "User group updated successfully");
            print_group(global, &updated);
            Ok(())
        }

        GroupsCommand::Delete { id } => {
            let id = GroupId(id);
            util::confirm(
                &format!("Delete user group {id}? This cannot be undone."),
                "groups delete",
                global.yes,
            )?;
            gw.delete_group(id).await.map_err(|e| not_found(e.into(), id))?;
            ctx.notice(global, "User group deleted successfully");
            Ok(())
        }

        GroupsCommand::AddMember { id, email } => {
            let id = GroupId(id);
            let group = gw
                .add_member(id, email.trim().to_owned())
                .await
                .map_err(|e| not_found(e.into(), id))?;
            ctx.notice(global, &format!("Added {} to {}", email.trim(), group.ad_group_name));
            print_group(global, &group);
            Ok(())
        }

        GroupsCommand::RemoveMember { id, email } => {
            let id = GroupId(id);
            let group = gw
                .remove_member(id, email.trim().to_owned())
                .await
                .map_err(|e| not_found(e.into(), id))?;
            ctx.notice(global, &format!("Removed {} from {}", email.trim(), group.ad_group_name));
            print_group(global, &group);
            Ok(())
        }

        GroupsCommand::ForUser { email } => {
            let groups: Vec<Arc<UserGroup>> = gw
                .groups_for_user(email.trim().to_owned())
                .await?
                .into_iter()
                .map(Arc::new)
                .collect();
            print_groups(global, &groups);
            Ok(())
        }

        GroupsCommand::FoldersForUser { email } => {
            let folders = gw.folders_for_user(email.trim().to_owned()).await?;
            print_folders(global, &folders);
            Ok(())
        }
    }
}

/// Shared with `folders list`.
pub(super) fn print_folders(global: &GlobalOpts, folders: &[Folder]) {
    let out = output::render_list(
        &global.output,
        folders,
        |f| FolderRow {
            name: f.name().to_owned(),
        },
        |f| f.name().to_owned(),
    );
    output::print_output(&out, global.quiet);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: Option<&str>, folders: &[&str]) -> GroupFields {
        GroupFields {
            name: name.map(str::to_owned),
            folders: folders.iter().map(|s| (*s).to_owned()).collect(),
            domain: None,
            members: Vec::new(),
        }
    }

    #[test]
    fn update_keeps_unset_fields() {
        let current = UserGroup {
            id: GroupId(4),
            ad_group_name: "FIN-READERS".into(),
            associated_domain: Some("Finance".into()),
            folder_access: vec!["finance".into()],
            members: vec!["ann@corp.com".into()],
            created: None,
            updated: None,
        };
        let draft = draft_from(fields(None, &["finance", "ledger"]), Some(&current));
        assert_eq!(draft.ad_group_name, "FIN-READERS");
        assert_eq!(draft.associated_domain, "Finance");
        assert_eq!(draft.folder_access, vec!["finance", "ledger"]);
        assert_eq!(draft.members, vec!["ann@corp.com"]);
    }

    #[test]
    fn create_without_folders_fails_validation() {
        let draft = draft_from(fields(Some("FIN"), &[]), None);
        assert!(validation::user_group_draft(&draft).is_err());
    }
}
