use std::fmt::Write;

use crate::models::{
    DashboardSummary, ListEntry, Notification, NotificationKind, PendingSubmission,
};
use crate::view::{DashboardView, ReadyView, TabContent};

fn stat(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn render_view(view: &DashboardView, notification: Option<&Notification>) -> String {
    let mut out = String::new();
    if let Some(note) = notification {
        let marker = match note.kind {
            NotificationKind::Success => "[ok]",
            NotificationKind::Error => "[error]",
            NotificationKind::Info => "[info]",
        };
        let _ = writeln!(out, "{marker} {}", note.text);
    }
    match view {
        DashboardView::Loading => {
            out.push_str("Loading Admin Dashboard\nFetching data...\n");
        }
        DashboardView::Failed { message } => {
            let _ = writeln!(out, "Connection Failed\n{message}\nRun again to retry.");
        }
        DashboardView::Ready(ready) => render_ready(&mut out, ready),
    }
    out
}

fn render_ready(out: &mut String, ready: &ReadyView) {
    out.push_str("Admin Dashboard\n");
    if let Some(banner) = &ready.banner {
        let _ = writeln!(out, "! {banner}");
    }
    if ready.refreshing {
        out.push_str("Refreshing...\n");
    }
    let tabs: Vec<String> = ready
        .tabs
        .iter()
        .map(|t| {
            if t.active {
                format!("[{}]", t.label)
            } else {
                t.label.clone()
            }
        })
        .collect();
    let _ = writeln!(out, "{}\n", tabs.join(" | "));

    match &ready.content {
        TabContent::Dashboard(summary) => render_summary(out, summary.as_ref()),
        TabContent::Pending(pending) => render_pending(out, pending),
        TabContent::Authors(items) => render_list(out, "Authors", "authors", items),
        TabContent::Readers(items) => render_list(out, "Readers", "readers", items),
        TabContent::Summary(items) => render_list(out, "Books Summary", "books", items),
    }
}

fn render_summary(out: &mut String, summary: Option<&DashboardSummary>) {
    let Some(summary) = summary else {
        out.push_str("No Dashboard Data\nUnable to load dashboard statistics\n");
        return;
    };
    let books = summary.books.clone().unwrap_or_default();
    let users = summary.users.clone().unwrap_or_default();
    let _ = writeln!(
        out,
        "Books    total {}  approved {}  pending {}  rejected {}",
        stat(books.total),
        stat(books.approved),
        stat(books.pending),
        stat(books.rejected)
    );
    let _ = writeln!(
        out,
        "Users    authors {}  readers {}  subscribed {}",
        stat(users.authors),
        stat(users.readers),
        stat(users.subscribed_readers)
    );
}

fn render_pending(out: &mut String, pending: &[PendingSubmission]) {
    let _ = writeln!(out, "Pending Book Approvals ({} awaiting review)", pending.len());
    if pending.is_empty() {
        out.push_str("All Caught Up! No pending books to review\n");
        return;
    }
    for book in pending {
        let _ = write!(out, "#{} {} by {}", book.id, book.title, book.author);
        if let Some(category) = &book.category {
            let _ = write!(out, " [{category}]");
        }
        if let Some(date) = book.submitted_date {
            let _ = write!(out, " submitted {}", date.format("%Y-%m-%d"));
        }
        out.push('\n');
        if let Some(description) = &book.description {
            let _ = writeln!(out, "    {description}");
        }
    }
}

fn render_list<T: ListEntry>(out: &mut String, title: &str, kind: &str, items: &[T]) {
    let _ = writeln!(out, "{title} ({} {kind} total)", items.len());
    if items.is_empty() {
        let _ = writeln!(out, "No {kind} found");
        return;
    }
    for (index, item) in items.iter().enumerate() {
        let _ = write!(out, "- {}: {}", item.display_name(index), item.detail());
        if let Some(status) = item.status_label() {
            let _ = write!(out, " ({status})");
        }
        out.push('\n');
    }
}
