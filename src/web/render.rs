//! HTML rendering for the dashboard page.
//!
//! Plain string building; every piece of user or API supplied text goes
//! through [`escape`].

use rust_decimal::Decimal;
use url::form_urlencoded;

use crate::models::{Fill, Position, TrackedTrader};
use crate::monitor::{DashboardSettings, DashboardSnapshot, TraderReport, REFRESH_INTERVALS};

const TITLE: &str = "Hyperliquid Big Trader Monitor";
const PLACEHOLDER: &str = "—";

const STYLE: &str = r#"
:root {
    --bg: #0b0f14;
    --panel: #121821;
    --panel-2: #0f141c;
    --text: #e6edf3;
    --muted: #9aa4b2;
    --accent: #4fd1c5;
    --border: #1f2a37;
    --up: #48bb78;
    --down: #f56565;
}
* { box-sizing: border-box; }
body {
    margin: 0;
    background: radial-gradient(1200px 500px at 20% 0%, #121a24, var(--bg));
    color: var(--text);
    font-family: "IBM Plex Sans", "SF Pro Text", sans-serif;
}
.layout { display: flex; min-height: 100vh; }
.sidebar {
    width: 320px;
    padding: 1.5rem;
    background: linear-gradient(180deg, var(--panel-2) 0%, var(--bg) 100%);
    border-right: 1px solid var(--border);
    color: var(--muted);
}
.sidebar label { display: block; margin-top: 0.9rem; font-size: 0.85rem; }
.sidebar textarea, .sidebar input, .sidebar select {
    width: 100%;
    margin-top: 0.3rem;
    background: var(--panel);
    color: var(--text);
    border: 1px solid var(--border);
    border-radius: 6px;
    padding: 0.4rem;
}
.sidebar input[type=checkbox] { width: auto; }
.sidebar textarea { min-height: 9rem; font-family: monospace; }
button {
    margin-top: 1rem;
    background: var(--panel);
    color: var(--text);
    border: 1px solid var(--border);
    border-radius: 8px;
    padding: 0.45rem 0.9rem;
    cursor: pointer;
}
button:hover { border-color: var(--accent); color: var(--accent); }
main { flex: 1; padding: 2.2rem 2rem 3rem; overflow-x: auto; }
.cards { display: flex; gap: 1rem; margin: 1rem 0; }
.metric-card {
    flex: 1;
    background: linear-gradient(180deg, var(--panel) 0%, var(--panel-2) 100%);
    border: 1px solid var(--border);
    border-radius: 12px;
    padding: 14px 16px;
}
.metric-label { color: var(--muted); font-size: 0.85rem; }
.metric-value { font-size: 1.3rem; font-weight: 600; }
.caption { color: var(--muted); font-size: 0.8rem; }
.trader {
    margin-top: 2rem;
    padding-top: 1rem;
    border-top: 1px solid var(--border);
}
.trader code { color: var(--muted); }
.account { color: var(--muted); font-size: 0.85rem; }
table {
    width: 100%;
    border-collapse: collapse;
    border: 1px solid var(--border);
    font-size: 0.85rem;
}
th, td { padding: 0.35rem 0.6rem; border-bottom: 1px solid var(--border); text-align: right; }
th:first-child, td:first-child { text-align: left; }
th { color: var(--muted); font-weight: 500; background: var(--panel); }
td.empty { text-align: center; color: var(--muted); }
.up { color: var(--up); }
.down { color: var(--down); }
.warning, .error, .info {
    border-radius: 8px;
    padding: 0.7rem 1rem;
    margin: 0.6rem 0;
}
.warning { background: #3a2e12; color: #f6ad55; }
.error { background: #3b1618; color: #feb2b2; }
"#;

/// Render the whole dashboard. `snapshot` is `None` when no trader was entered.
pub fn dashboard_page(
    traders: &[TrackedTrader],
    settings: &DashboardSettings,
    snapshot: Option<&DashboardSnapshot>,
    api_url: &str,
) -> String {
    let refresh_meta = match snapshot {
        Some(_) if settings.auto_refresh => format!(
            r#"<meta http-equiv="refresh" content="{}; url={}">"#,
            settings.refresh_secs,
            escape(&dashboard_url(traders, settings))
        ),
        _ => String::new(),
    };

    let content = match snapshot {
        Some(snapshot) => snapshot_html(snapshot),
        None => r#"<div class="warning">Add at least one trader address in the sidebar to load data.</div>"#
            .to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{refresh_meta}
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<div class="layout">
{sidebar}
<main>
<h1>{title}</h1>
<p>Read-only dashboard for recent fills and active positions of large traders.</p>
{content}
<p class="caption">Data source: Hyperliquid public info API ({api_url}).</p>
</main>
</div>
</body>
</html>
"#,
        refresh_meta = refresh_meta,
        title = TITLE,
        style = STYLE,
        sidebar = sidebar_html(traders, settings),
        content = content,
        api_url = escape(api_url),
    )
}

/// Dashboard link that reproduces the given sidebar state.
pub fn dashboard_url(traders: &[TrackedTrader], settings: &DashboardSettings) -> String {
    let lines: Vec<String> = traders.iter().map(TrackedTrader::to_line).collect();

    let mut query = form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("traders", &lines.join("\n"))
        .append_pair("max_fills", &settings.max_fills.to_string())
        .append_pair("window_hours", &settings.window_hours.to_string())
        .append_pair("auto_refresh", on_off(settings.auto_refresh))
        .append_pair("refresh_secs", &settings.refresh_secs.to_string());
    if settings.aggregate_by_time {
        query.append_pair("aggregate", "on");
    }

    format!("/?{}", query.finish())
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn sidebar_html(traders: &[TrackedTrader], settings: &DashboardSettings) -> String {
    let lines: Vec<String> = traders.iter().map(TrackedTrader::to_line).collect();
    let traders_text = escape(&lines.join("\n"));

    let refresh_options: String = REFRESH_INTERVALS
        .iter()
        .map(|secs| {
            let selected = if *secs == settings.refresh_secs { " selected" } else { "" };
            format!(r#"<option value="{secs}"{selected}>{secs}</option>"#)
        })
        .collect();

    let auto_refresh_options: String = [true, false]
        .iter()
        .map(|flag| {
            let selected = if *flag == settings.auto_refresh { " selected" } else { "" };
            let text = if *flag { "On" } else { "Off" };
            format!(r#"<option value="{}"{}>{}</option>"#, on_off(*flag), selected, text)
        })
        .collect();

    let aggregate_checked = if settings.aggregate_by_time { " checked" } else { "" };
    let hidden_aggregate = if settings.aggregate_by_time {
        r#"<input type="hidden" name="aggregate" value="on">"#
    } else {
        ""
    };

    format!(
        r#"<aside class="sidebar">
<h3>Inputs</h3>
<form method="get" action="/">
<label>Tracked traders (one per line, optionally <code>label = address</code>)
<textarea name="traders" placeholder="0xabc...">{traders_text}</textarea></label>
<label>Max fills per trader
<input type="number" name="max_fills" min="10" max="2000" step="10" value="{max_fills}"></label>
<label><input type="checkbox" name="aggregate"{aggregate_checked}> Aggregate fills by time</label>
<label>Fill window (hours): {window_hours}
<input type="range" name="window_hours" min="1" max="24" step="1" value="{window_hours}"></label>
<label>Auto refresh
<select name="auto_refresh">{auto_refresh_options}</select></label>
<label>Refresh interval (seconds)
<select name="refresh_secs">{refresh_options}</select></label>
<button type="submit">Apply</button>
<button type="submit" name="refresh" value="1">Refresh now</button>
</form>
<form method="post" action="/upload" enctype="multipart/form-data">
<label>Upload wallet list (txt or csv, one address per line or a single column)
<input type="file" name="wallets" accept=".txt,.csv"></label>
<input type="hidden" name="traders" value="{traders_text}">
<input type="hidden" name="max_fills" value="{max_fills}">
<input type="hidden" name="window_hours" value="{window_hours}">
<input type="hidden" name="auto_refresh" value="{auto_refresh}">
<input type="hidden" name="refresh_secs" value="{refresh_secs}">
{hidden_aggregate}
<button type="submit">Add from file</button>
</form>
</aside>"#,
        traders_text = traders_text,
        max_fills = settings.max_fills,
        aggregate_checked = aggregate_checked,
        window_hours = settings.window_hours,
        auto_refresh_options = auto_refresh_options,
        refresh_options = refresh_options,
        auto_refresh = on_off(settings.auto_refresh),
        refresh_secs = settings.refresh_secs,
        hidden_aggregate = hidden_aggregate,
    )
}

fn snapshot_html(snapshot: &DashboardSnapshot) -> String {
    let window = &snapshot.window;
    let mut html = format!(
        r#"<div class="cards">
<div class="metric-card"><div class="metric-label">Tracking</div><div class="metric-value">{} traders</div></div>
<div class="metric-card"><div class="metric-label">Window</div><div class="metric-value">{} hours</div></div>
<div class="metric-card"><div class="metric-label">UTC Range</div><div class="metric-value">{} → {}</div></div>
</div>
<p class="caption">Window: {} to {} (UTC)</p>
"#,
        snapshot.reports.len(),
        window.hours,
        window.start.format("%m/%d %H:%M"),
        window.end.format("%m/%d %H:%M"),
        window.start.to_rfc3339(),
        window.end.to_rfc3339(),
    );

    for report in &snapshot.reports {
        html.push_str(&trader_html(report, window.hours));
    }

    html
}

fn trader_html(report: &TraderReport, window_hours: u32) -> String {
    let trader = &report.trader;

    let account = report
        .summary
        .as_ref()
        .map(|s| {
            format!(
                r#"<div class="account">Account value {} · Withdrawable {} · Notional {}</div>"#,
                fmt_amount(s.account_value),
                fmt_amount(s.withdrawable),
                fmt_amount(s.total_notional),
            )
        })
        .unwrap_or_default();

    let errors: String = report
        .errors
        .iter()
        .map(|e| format!(r#"<div class="error">{}</div>"#, escape(e)))
        .collect();

    format!(
        r#"<section class="trader">
<h2>{label}</h2>
<code>{address}</code>
{account}
{errors}
<h3>Recent Fills (Last {window_hours} Hours)</h3>
{fills}
<h3>Active Positions ({position_count})</h3>
{positions}
</section>
"#,
        label = escape(trader.display_name()),
        address = escape(&trader.address),
        account = account,
        errors = errors,
        window_hours = window_hours,
        fills = fills_table(&report.fills, window_hours),
        position_count = report.positions.len(),
        positions = positions_table(&report.positions),
    )
}

fn fills_table(fills: &[Fill], window_hours: u32) -> String {
    const COLUMNS: [&str; 10] = [
        "Time (UTC)",
        "Coin",
        "Side",
        "Direction",
        "Price",
        "Size",
        "Notional",
        "Closed PnL",
        "Fee",
        "Liquidation",
    ];

    let rows: String = if fills.is_empty() {
        empty_row(
            COLUMNS.len(),
            &format!("No fills in the last {} hours.", window_hours),
        )
    } else {
        fills
            .iter()
            .map(|f| {
                format!(
                    r#"<tr class="fill-row"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>{}<td>{}</td><td>{}</td></tr>"#,
                    f.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    escape(&f.coin),
                    f.side.map(|s| s.as_str()).unwrap_or(PLACEHOLDER),
                    escape(&f.direction),
                    fmt_exact(f.price),
                    fmt_exact(f.size),
                    fmt_amount(f.notional()),
                    signed_cell(f.closed_pnl),
                    fmt_fee(f.fee, &f.fee_token),
                    if f.liquidation { "yes" } else { "" },
                )
            })
            .collect()
    };

    table("fills", &COLUMNS, fills.len(), &rows)
}

fn positions_table(positions: &[Position]) -> String {
    const COLUMNS: [&str; 10] = [
        "Coin",
        "Side",
        "Size",
        "Entry Price",
        "Position Value",
        "Unrealized PnL",
        "ROE",
        "Liq. Price",
        "Margin Used",
        "Leverage",
    ];

    let rows: String = if positions.is_empty() {
        empty_row(COLUMNS.len(), "No active positions.")
    } else {
        positions
            .iter()
            .map(|p| {
                let leverage = match p.leverage {
                    Some(value) => format!("{}x {}", value.normalize(), escape(&p.leverage_type)),
                    None => escape(&p.leverage_type),
                };
                format!(
                    r#"<tr class="position-row"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>{}<td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                    escape(&p.coin),
                    p.side().map(|s| s.as_str()).unwrap_or(PLACEHOLDER),
                    fmt_exact(p.size),
                    fmt_exact(p.entry_price),
                    fmt_amount(p.position_value),
                    signed_cell(p.unrealized_pnl),
                    fmt_percent(p.return_on_equity),
                    fmt_exact(p.liquidation_price),
                    fmt_amount(p.margin_used),
                    leverage,
                )
            })
            .collect()
    };

    table("positions", &COLUMNS, positions.len(), &rows)
}

fn table(class: &str, columns: &[&str], row_count: usize, rows: &str) -> String {
    let header: String = columns.iter().map(|c| format!("<th>{}</th>", c)).collect();
    format!(
        r#"<table class="{class}" data-rows="{row_count}"><thead><tr>{header}</tr></thead><tbody>{rows}</tbody></table>"#
    )
}

fn empty_row(columns: usize, message: &str) -> String {
    format!(
        r#"<tr><td class="empty" colspan="{}">{}</td></tr>"#,
        columns,
        escape(message)
    )
}

fn signed_cell(value: Option<Decimal>) -> String {
    let class = match value {
        Some(v) if v.is_sign_positive() && !v.is_zero() => r#" class="up""#,
        Some(v) if v.is_sign_negative() && !v.is_zero() => r#" class="down""#,
        _ => "",
    };
    format!("<td{}>{}</td>", class, fmt_amount(value))
}

/// Value as sent by the exchange, without trailing zeros.
fn fmt_exact(value: Option<Decimal>) -> String {
    value
        .map(|v| v.normalize().to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Fee followed by the token it is paid in.
fn fmt_fee(fee: Option<Decimal>, token: &str) -> String {
    match fee {
        Some(_) if !token.is_empty() => format!("{} {}", fmt_amount(fee), escape(token)),
        _ => fmt_amount(fee),
    }
}

/// Money-like value rounded to cents.
fn fmt_amount(value: Option<Decimal>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Ratio shown as a percentage.
fn fmt_percent(value: Option<Decimal>) -> String {
    value
        .map(|v| format!("{:.2}%", v * Decimal::ONE_HUNDRED))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(fmt_exact(Some(dec!(18.4350))), "18.435");
        assert_eq!(fmt_exact(None), PLACEHOLDER);
        assert_eq!(fmt_amount(Some(dec!(1234.5678))), "1234.57");
        assert_eq!(fmt_percent(Some(dec!(-0.0123))), "-1.23%");
    }

    #[test]
    fn test_signed_cell_classes() {
        assert_eq!(signed_cell(Some(dec!(5))), r#"<td class="up">5.00</td>"#);
        assert_eq!(signed_cell(Some(dec!(-5))), r#"<td class="down">-5.00</td>"#);
        assert_eq!(signed_cell(Some(Decimal::ZERO)), "<td>0.00</td>");
    }

    #[test]
    fn test_empty_tables_are_rendered() {
        let fills = fills_table(&[], 24);
        assert!(fills.starts_with(r#"<table class="fills" data-rows="0">"#));
        assert!(fills.contains("No fills in the last 24 hours."));

        let positions = positions_table(&[]);
        assert!(positions.contains(r#"data-rows="0""#));
        assert!(positions.contains("No active positions."));
    }

    #[test]
    fn test_fee_shows_token() {
        assert_eq!(fmt_fee(Some(dec!(3.256)), "USDC"), "3.26 USDC");
        assert_eq!(fmt_fee(Some(dec!(1)), ""), "1.00");
        assert_eq!(fmt_fee(None, "USDC"), PLACEHOLDER);
    }

    #[test]
    fn test_position_with_unknown_size() {
        let position = Position {
            trader_address: "0xabc".to_string(),
            coin: "ETH".to_string(),
            size: None,
            entry_price: Some(dec!(2400)),
            position_value: None,
            unrealized_pnl: None,
            return_on_equity: None,
            liquidation_price: None,
            margin_used: None,
            leverage_type: "cross".to_string(),
            leverage: None,
        };

        let html = positions_table(&[position]);
        assert!(html.contains(r#"data-rows="1""#));
        assert!(html.contains(&format!(
            "<td>ETH</td><td>{0}</td><td>{0}</td><td>2400</td>",
            PLACEHOLDER
        )));
    }

    #[test]
    fn test_dashboard_url_roundtrip() {
        let traders = vec![
            TrackedTrader::new("Big & Bold", "0xabc"),
            TrackedTrader::new("", "0xdef"),
        ];
        let settings = DashboardSettings {
            aggregate_by_time: true,
            ..Default::default()
        };

        let url = dashboard_url(&traders, &settings);
        let (_, query) = url.split_once('?').unwrap();
        let pairs: std::collections::HashMap<String, String> =
            form_urlencoded::parse(query.as_bytes()).into_owned().collect();

        assert_eq!(pairs["traders"], "Big & Bold = 0xabc\n0xdef");
        assert_eq!(pairs["aggregate"], "on");
        assert_eq!(pairs["auto_refresh"], "on");
        assert_eq!(pairs["max_fills"], "200");
    }

    #[test]
    fn test_page_without_traders() {
        let html = dashboard_page(&[], &DashboardSettings::default(), None, "https://api");
        assert!(html.contains("Add at least one trader address"));
        assert!(!html.contains("http-equiv"));
    }
}
