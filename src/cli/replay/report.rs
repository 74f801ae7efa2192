//! What a replay leaves behind.

use owo_colors::OwoColorize;
use serde::Serialize;

use crate::dom::Document;
use crate::host::{FetchRequest, ShellEvent};
use crate::nav::{HistoryEntry, OldTarget, ReplaceSpec, SeoSnapshot};
use crate::window::{HistoryRecord, Window};

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub title: String,
    pub location: String,
    pub page: String,
    pub history: Vec<HistoryLine>,
    pub seo: SeoLine,
    pub events: Vec<String>,
    pub requests: Vec<String>,
    pub markup: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryLine {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    pub current: bool,
}

#[derive(Debug, Default, Serialize)]
pub struct SeoLine {
    pub canonical: Option<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl From<SeoSnapshot> for SeoLine {
    fn from(snapshot: SeoSnapshot) -> Self {
        Self {
            canonical: snapshot.canonical,
            prev: snapshot.prev,
            next: snapshot.next,
        }
    }
}

impl HistoryLine {
    fn new(record: &HistoryRecord, current: bool) -> Self {
        let page = record
            .state
            .as_ref()
            .and_then(HistoryEntry::from_value)
            .map(|entry| entry.page.to_string());
        Self {
            url: record.url.to_string(),
            page,
            current,
        }
    }
}

pub(super) fn describe_event(event: &ShellEvent) -> String {
    match event {
        ShellEvent::Alert(message) => format!("alert: {message}"),
        ShellEvent::Flash(message) => format!("flash: {message}"),
        ShellEvent::Notify(kind) => kind.event_name().to_string(),
        ShellEvent::LayoutChange => "layout-change".to_string(),
        ShellEvent::Redirect(url) => format!("redirect: {url}"),
    }
}

pub(super) fn describe_request(request: &FetchRequest) -> String {
    format!("{} {}", request.method, request.url)
}

/// Markup of everything the replace spec targets, or the whole document.
pub(super) fn region_markup(doc: &Document, spec: Option<&ReplaceSpec>, full: bool) -> String {
    let selector = match spec.map(|spec| &spec.old) {
        Some(OldTarget::Selector(selector)) if !full => selector,
        _ => return doc.outer_html(doc.root()),
    };
    doc.outermost(&doc.query_selector_all(selector))
        .into_iter()
        .map(|node| doc.outer_html(node))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ReplayReport {
    pub(super) fn history_lines(window: &Window) -> Vec<HistoryLine> {
        let index = window.history_index();
        window
            .history()
            .iter()
            .enumerate()
            .map(|(i, record)| HistoryLine::new(record, i == index))
            .collect()
    }

    pub fn print(&self) {
        println!("{} {}", "title".bold(), self.title);
        println!("{} {} (page {})", "location".bold(), self.location, self.page);

        println!("{}", "history".bold());
        for line in &self.history {
            let marker = if line.current { ">" } else { " " };
            match &line.page {
                Some(page) => println!("  {marker} {} (page {page})", line.url),
                None => println!("  {marker} {}", line.url),
            }
        }

        println!("{}", "seo".bold());
        let none = || "-".dimmed().to_string();
        println!("  canonical {}", self.seo.canonical.clone().unwrap_or_else(none));
        println!("  prev      {}", self.seo.prev.clone().unwrap_or_else(none));
        println!("  next      {}", self.seo.next.clone().unwrap_or_else(none));

        println!("{}", "requests".bold());
        for request in &self.requests {
            println!("  {request}");
        }
        println!("{}", "events".bold());
        for event in &self.events {
            println!("  {event}");
        }

        println!("{}", "markup".bold());
        println!("{}", self.markup);
    }
}
