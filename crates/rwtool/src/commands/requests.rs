//! Subscription request command handlers.

use std::sync::Arc;

use tabled::Tabled;
use tracing::debug;

use rwtool_core::projection::{self, StatusFilter};
use rwtool_core::{
    DomainId, NewRequest, RequestId, ReviewDecision, SubscriptionRequest, SubscriptionStats,
    validation,
};

use crate::cli::{FilterArgs, GlobalOpts, RequestsArgs, RequestsCommand, ReviewAction};
use crate::error::CliError;
use crate::output;

use super::CommandContext;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct RequestRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Department")]
    department: String,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Requested")]
    requested: String,
    #[tabled(rename = "Note")]
    note: String,
}

fn request_row(r: &SubscriptionRequest, color: bool) -> RequestRow {
    let note = match (&r.rejection_reason, r.is_pending() && !r.department_matches()) {
        (Some(reason), _) => reason.clone(),
        (None, true) => "department mismatch".into(),
        (None, false) => String::new(),
    };
    RequestRow {
        id: r.id.to_string(),
        user: format!("{} <{}>", r.user_name, r.user_email),
        department: r.department().to_owned(),
        domain: r.domain_name.clone(),
        status: output::paint_status(r.status.as_str(), color),
        requested: output::fmt_time(r.requested),
        note,
    }
}

fn detail(r: &SubscriptionRequest) -> String {
    output::detail_lines(&[
        ("ID", r.id.to_string()),
        ("User", r.user_name.clone()),
        ("Email", r.user_email.clone()),
        ("Department", r.department().to_owned()),
        ("Role", output::or_dash(r.user_role.as_deref())),
        ("Domain", r.domain_name.clone()),
        ("Reason", output::or_dash(Some(&r.request_reason))),
        ("Status", r.status.to_string()),
        ("Requested", output::fmt_time(r.requested)),
        ("Reviewed", output::fmt_time(r.reviewed)),
        ("Rejection", output::or_dash(r.rejection_reason.as_deref())),
    ])
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn stats_detail(s: &SubscriptionStats) -> String {
    let rows = [
        StatRow { metric: "Total", value: s.total.to_string() },
        StatRow { metric: "Pending", value: s.pending.to_string() },
        StatRow { metric: "Approved", value: s.approved.to_string() },
        StatRow { metric: "Rejected", value: s.rejected.to_string() },
        StatRow { metric: "Approval rate", value: format!("{:.1}%", s.approval_rate) },
    ];
    tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string()
}

fn not_found(err: CliError, id: &str) -> CliError {
    err.for_resource("request", id, "requests list")
}

/// Fetch a request and make sure it is still awaiting review.
async fn pending_request(ctx: &CommandContext, id: &str) -> Result<SubscriptionRequest, CliError> {
    let request = ctx
        .gateways
        .subscriptions
        .get_request(RequestId::from(id))
        .await
        .map_err(|e| not_found(e.into(), id))?;
    if !request.is_pending() {
        return Err(CliError::Validation {
            message: format!(
                "Request {id} is {}; only pending requests can be changed",
                request.status
            ),
        });
    }
    Ok(request)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: RequestsArgs,
    ctx: &CommandContext,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let gw = &ctx.gateways.subscriptions;

    match args.command {
        RequestsCommand::List {
            pending,
            user,
            mine,
            filter,
        } => {
            let items = if mine {
                gw.list_for_user(ctx.email()?.to_owned()).await?
            } else if let Some(email) = user {
                gw.list_for_user(email).await?
            } else if pending {
                gw.list_pending().await?
            } else {
                gw.list_requests().await?
            };
            let visible = project(items, &filter, mine);
            let color = ctx.color;
            let out = output::render_list(
                &global.output,
                &visible,
                |r| request_row(r, color),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RequestsCommand::Get { id } => {
            let request = gw
                .get_request(RequestId::from(id.as_str()))
                .await
                .map_err(|e| not_found(e.into(), &id))?;
            let out = output::render_single(&global.output, &request, detail, |r| r.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RequestsCommand::Create { domain, reason } => {
            validation::request_reason(&reason)?;
            let email = ctx.email()?.to_owned();
            let domain = ctx
                .gateways
                .domains
                .get_domain(DomainId::from(domain.as_str()))
                .await
                .map_err(|e| CliError::from(e).for_resource("domain", &domain, "domains list"))?;
            let request = NewRequest {
                domain_id: domain.id,
                domain_name: domain.name,
                reason: reason.trim().to_owned(),
                user_name: ctx.session.display_name().to_owned(),
                user_email: email,
                user_department: ctx.session.department.clone(),
                user_role: Some(ctx.session.role.to_string()),
            };
            let created = gw.create_request(request).await?;
            ctx.notice(global, "Subscription request submitted successfully!");
            let out = output::render_single(&global.output, &created, detail, |r| r.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RequestsCommand::Approve { id } => {
            let request = pending_request(ctx, &id).await?;
            let updated = gw.approve(request.id).await?;
            ctx.notice(global, "Subscription request approved successfully!");
            let out = output::render_single(&global.output, &updated, detail, |r| r.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RequestsCommand::Reject { id, reason } => {
            validation::rejection_reason(&reason)?;
            let request = pending_request(ctx, &id).await?;
            let updated = gw.reject(request.id, reason.trim().to_owned()).await?;
            ctx.notice(global, "Subscription request rejected");
            let out = output::render_single(&global.output, &updated, detail, |r| r.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RequestsCommand::Review { id, action, reason } => {
            let decision = match action {
                ReviewAction::Approve => ReviewDecision::Approve,
                ReviewAction::Reject => {
                    let reason = reason.unwrap_or_default();
                    validation::rejection_reason(&reason)?;
                    ReviewDecision::Reject {
                        reason: reason.trim().to_owned(),
                    }
                }
            };
            let request = pending_request(ctx, &id).await?;
            let updated = gw.review(request.id, decision).await?;
            ctx.notice(global, "Request reviewed");
            let out = output::render_single(&global.output, &updated, detail, |r| r.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RequestsCommand::Cancel { id } => {
            let email = ctx.email()?.to_owned();
            let request = pending_request(ctx, &id).await?;
            gw.cancel(request.id, email).await?;
            ctx.notice(global, "Request cancelled successfully");
            Ok(())
        }

        RequestsCommand::Stats => {
            let stats = match gw.stats().await {
                Ok(stats) => stats,
                Err(err) => {
                    debug!(error = %err, "stats endpoint failed, computing locally");
                    let items = gw.list_requests().await?;
                    SubscriptionStats::from_requests(&items)
                }
            };
            let out = output::render_single(&global.output, &stats, stats_detail, |s| {
                format!("{}\t{}\t{}\t{}\t{:.1}", s.total, s.pending, s.approved, s.rejected, s.approval_rate)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

/// Apply `--search`/`--status`. Own requests are searched by domain and
/// rejection reason; the admin list by requester and domain.
fn project(items: Vec<SubscriptionRequest>, filter: &FilterArgs, own: bool) -> Vec<Arc<SubscriptionRequest>> {
    let items: Vec<_> = items.into_iter().map(Arc::new).collect();
    let search = filter.search.as_deref().unwrap_or_default();
    let status = StatusFilter::parse(filter.status.as_deref());
    if own {
        projection::project_with(&items, search, &status, projection::own_request_fields, |r| {
            Some(r.status.as_str())
        })
    } else {
        projection::project(&items, search, &status)
    }
}
