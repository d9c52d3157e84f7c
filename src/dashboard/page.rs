// src/dashboard/page.rs

use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde_json::Value;

use super::leading::{latest_polls, row_leader};
use super::{CountrySummary, DEFAULT_PARTY_COLOR, DISPLAY_DATE};

const STYLE: &str = r#"
body { background: #000; color: #fff; font-family: Helvetica, Arial, sans-serif; margin: 2rem; }
h1, h2 { font-weight: 600; }
a { color: #9ecbff; }
section { margin-top: 3rem; }
table.latest { border-collapse: collapse; margin-top: 1rem; font-size: 0.9rem; }
table.latest th, table.latest td { padding: 0.3rem 0.6rem; text-align: center; }
table.latest th { border-bottom: 1px solid #666; }
table.latest tbody tr:nth-child(even) { background: #151515; }
table.latest td.leader { font-weight: 700; color: #000; }
.leader-note { color: #ccc; }
"#;

const SCRIPTS: &[&str] = &[
    "https://cdn.jsdelivr.net/npm/vega@5",
    "https://cdn.jsdelivr.net/npm/vega-lite@5",
    "https://cdn.jsdelivr.net/npm/vega-embed@6",
];

/// One country block of the page.
#[derive(Debug, Clone)]
pub struct Section {
    pub key: String,
    pub heading: String,
    pub note: String,
    pub trend: Value,
    pub table: String,
}

/// Vega spec as a JS literal that is safe inside `<script>`.
fn script_json(spec: &Value) -> String {
    spec.to_string().replace("</", "<\\/")
}

fn format_share(v: f64) -> String {
    format!("{v}")
}

/// Latest `k` polls, newest first, with each row's leading share filled in
/// the party colour.
pub fn latest_table(c: &CountrySummary<'_>, k: usize) -> String {
    let mut html = String::from("<table class=\"latest\">\n<thead><tr><th>Date</th>");
    for party in &c.parties {
        html.push_str(&format!("<th>{}</th>", encode_text(c.source.label_of(party))));
    }
    if c.table.has_lead {
        html.push_str("<th>Lead</th>");
    }
    html.push_str("<th>Pollster</th><th>Sample size</th></tr></thead>\n<tbody>\n");

    for rec in latest_polls(c.table, k) {
        let leader = row_leader(c.table, rec, &c.parties);
        let leader_color = leader
            .and_then(|p| c.source.color_of(p))
            .unwrap_or(DEFAULT_PARTY_COLOR);

        html.push_str("<tr>");
        let date = rec
            .date_conducted
            .map(|d| d.format(DISPLAY_DATE).to_string())
            .unwrap_or_default();
        html.push_str(&format!("<td>{}</td>", encode_text(&date)));

        for party in &c.parties {
            let text = c
                .table
                .share(rec, party)
                .map(format_share)
                .unwrap_or_else(|| "–".to_string());
            if leader == Some(party.as_str()) {
                html.push_str(&format!(
                    "<td class=\"leader\" style=\"background: {}\">{}</td>",
                    encode_double_quoted_attribute(leader_color),
                    encode_text(&text)
                ));
            } else {
                html.push_str(&format!("<td>{}</td>", encode_text(&text)));
            }
        }
        if c.table.has_lead {
            let lead = rec.lead.as_ref().map(|l| l.to_string()).unwrap_or_default();
            html.push_str(&format!(
                "<td style=\"color: {}\">{}</td>",
                encode_double_quoted_attribute(leader_color),
                encode_text(&lead)
            ));
        }
        let sample = rec.sample_size.map(|n| n.to_string()).unwrap_or_default();
        html.push_str(&format!(
            "<td>{}</td><td>{}</td></tr>\n",
            encode_text(&rec.pollster),
            encode_text(&sample)
        ));
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

/// Whole dashboard: map on top, then one section per country.
pub fn render_page(generated: NaiveDate, map: &Value, sections: &[Section]) -> String {
    let mut html =
        String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>European Opinion Polls</title>\n");
    for src in SCRIPTS {
        html.push_str(&format!("<script src=\"{src}\"></script>\n"));
    }
    html.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n"));
    html.push_str("<h1>European Opinion Polls</h1>\n");
    html.push_str(&format!(
        "<p>Generated on {}. Countries are coloured by the party leading the most recent polls.</p>\n",
        generated.format(DISPLAY_DATE)
    ));
    html.push_str("<div id=\"map\"></div>\n");

    for s in sections {
        let id = encode_double_quoted_attribute(&s.key);
        html.push_str(&format!(
            "<section id=\"{id}\">\n<h2>{}</h2>\n<p class=\"leader-note\">{}</p>\n<div id=\"trend-{id}\"></div>\n{}</section>\n",
            encode_text(&s.heading),
            encode_text(&s.note),
            s.table
        ));
    }

    html.push_str("<script>\nconst opts = { actions: false };\n");
    html.push_str(&format!("vegaEmbed('#map', {}, opts);\n", script_json(map)));
    for s in sections {
        html.push_str(&format!(
            "vegaEmbed({}, {}, opts);\n",
            script_json(&Value::String(format!("#trend-{}", s.key))),
            script_json(&s.trend)
        ));
    }
    html.push_str("</script>\n</body>\n</html>\n");
    html
}
