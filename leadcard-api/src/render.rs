use leadcard_app::domain::{CardSnapshot, RecordFields};
use uuid::Uuid;

const CSS: &str = r#"
body { font-family: system-ui, sans-serif; background: #fafafa; margin: 0; }
.container { max-width: 32rem; margin: 2rem auto; }
.card { background: #fff; border-radius: 5px; box-shadow: 0 0 3px 2px #eee; overflow: hidden; }
.card__header { padding: 0.75rem 1rem; background: #4452ce; color: #fff; }
.card__content { padding: 0.75rem 1rem; color: #555; }
.card__footer { display: flex; gap: 1rem; align-items: center; padding: 0.5rem 1rem; background: #fafafa; }
.badge { border-radius: 1rem; padding: 0 0.4rem; color: #fff; font-size: 0.8em; }
.badge--up { background: #46b33c; }
.badge--down { background: #ff5656; }
.card__verified { opacity: 0.8; }
.copied { width: 100%; margin-top: 1rem; min-height: 8rem; }
.snackbar { margin-top: 1rem; padding: 0.75rem 1rem; background: #333; color: #fff; border-radius: 4px; display: flex; justify-content: space-between; }
button { cursor: pointer; }
button:disabled { opacity: 0.4; cursor: default; }
"#;

/// What the page shows besides the record and the vote snapshot.
#[derive(Debug, Default)]
pub struct PageExtras {
    pub verified: Option<String>,
    pub can_share: bool,
    pub copied_text: Option<String>,
}

/// Full HTML page for a card, with form buttons that post back to the API.
pub fn render_card_page(
    id: Uuid,
    record: &RecordFields,
    snapshot: &CardSnapshot,
    extras: &PageExtras,
) -> String {
    let base = format!("/cards/{}", id);
    let refresh = if snapshot.notification.visible {
        r#"<meta http-equiv="refresh" content="2">"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    {refresh}
    <title>{title}</title>
    <style>{CSS}</style>
</head>
<body>
    <main class="container">
        <div class="card">
            <div class="card__header">{header}</div>
            <div class="card__content">{content}</div>
            <div class="card__footer">
                {upvote}
                {downvote}
                <form method="post" action="{base}/copy?redirect=view"><button type="submit">Copy</button></form>
                {share}
            </div>
        </div>
        {copied}
        {snackbar}
    </main>
</body>
</html>"#,
        refresh = refresh,
        title = escape_html(record.title().unwrap_or("Lead")),
        CSS = CSS,
        header = render_header(record, extras.verified.as_deref()),
        content = render_content(record),
        upvote = vote_button(&base, "upvote", "Helpful", snapshot.permissions.can_upvote, snapshot.up_badge, "badge--up"),
        downvote = vote_button(&base, "downvote", "Not helpful", snapshot.permissions.can_downvote, snapshot.down_badge, "badge--down"),
        share = render_share(&base, extras.can_share),
        copied = render_copied(extras.copied_text.as_deref()),
        base = base,
        snackbar = render_snackbar(&base, snapshot),
    )
}

fn render_header(record: &RecordFields, verified: Option<&str>) -> String {
    let mut header = String::new();
    let kinds: Vec<String> = [record.resource_type(), record.sub_resource_type()]
        .into_iter()
        .flatten()
        .map(escape_html)
        .collect();
    if !kinds.is_empty() {
        header.push_str(&format!("<small>{}</small>", kinds.join(" / ")));
    }
    if let Some(title) = record.title() {
        header.push_str(&format!("<h2>{}</h2>", escape_html(title)));
    }
    if let Some(verified) = verified {
        header.push_str(&format!(
            r#"<small class="card__verified">verified {}</small>"#,
            escape_html(verified)
        ));
    }
    header
}

fn render_content(record: &RecordFields) -> String {
    let rows = [
        ("Phone", record.phone()),
        ("State", record.state()),
        ("City", record.city()),
        ("Address", record.location()),
        ("Availability", record.availability()),
        ("Cost Per Unit", record.cost_per_unit()),
        ("Details", record.details()),
    ];

    rows.iter()
        .filter_map(|(label, value)| {
            value.map(|v| format!("<p><strong>{}:</strong> {}</p>", label, escape_html(v)))
        })
        .collect()
}

fn vote_button(
    base: &str,
    action: &str,
    label: &str,
    enabled: bool,
    badge: Option<i64>,
    badge_class: &str,
) -> String {
    let badge = badge
        .map(|count| format!(r#" <span class="badge {}">{}</span>"#, badge_class, count))
        .unwrap_or_default();
    let disabled = if enabled { "" } else { " disabled" };
    format!(
        r#"<form method="post" action="{base}/{action}?redirect=view"><button type="submit"{disabled}>{label}{badge}</button></form>"#,
        base = base,
        action = action,
        disabled = disabled,
        label = label,
        badge = badge,
    )
}

fn render_share(base: &str, can_share: bool) -> String {
    if !can_share {
        return String::new();
    }
    format!(
        r#"<form method="post" action="{}/share?redirect=view"><button type="submit">Share</button></form>"#,
        base
    )
}

fn render_copied(copied: Option<&str>) -> String {
    copied
        .map(|text| format!(r#"<textarea class="copied" readonly>{}</textarea>"#, escape_html(text)))
        .unwrap_or_default()
}

fn render_snackbar(base: &str, snapshot: &CardSnapshot) -> String {
    if !snapshot.notification.visible {
        return String::new();
    }
    format!(
        r#"<div class="snackbar"><span>{}</span><form method="post" action="{}/notification/dismiss?redirect=view"><button type="submit">Close</button></form></div>"#,
        escape_html(&snapshot.notification.text),
        base,
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
