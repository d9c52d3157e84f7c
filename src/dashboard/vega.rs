// src/dashboard/vega.rs

use serde::Serialize;
use serde_json::{json, Value};

use super::long::to_long;
use super::trend::trend_lines;
use super::{CountrySummary, DEFAULT_PARTY_COLOR};

const SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";
const WORLD_TOPOJSON: &str =
    "https://cdn.jsdelivr.net/npm/vega-datasets@v1.29.0/data/world-110m.json";
const NO_DATA_COLOR: &str = "#333333";
const ISO_DATE: &str = "%Y-%m-%d";

/// Shared dark look: black canvas, white text, muted grid.
pub fn theme() -> Value {
    json!({
        "background": "#000000",
        "view": { "stroke": null },
        "title": { "color": "#ffffff", "fontSize": 18, "anchor": "start" },
        "axis": {
            "labelColor": "#ffffff",
            "titleColor": "#ffffff",
            "gridColor": "#2a2a2a",
            "domainColor": "#666666",
            "tickColor": "#666666"
        },
        "legend": { "labelColor": "#ffffff", "titleColor": "#ffffff" }
    })
}

#[derive(Debug, Serialize)]
struct MapCountry<'a> {
    id: u16,
    country: &'a str,
    leader: &'a str,
    fill: &'a str,
}

/// Europe map: every source's country filled with its leading party colour,
/// everything else grey.
pub fn map_spec(countries: &[CountrySummary<'_>]) -> Value {
    let rows: Vec<MapCountry<'_>> = countries
        .iter()
        .map(|c| MapCountry {
            id: c.source.iso_numeric,
            country: &c.source.country,
            leader: c.leader_label().unwrap_or("n/a"),
            fill: c.leader_color(),
        })
        .collect();

    json!({
        "$schema": SCHEMA,
        "config": theme(),
        "width": 520,
        "height": 520,
        "data": {
            "url": WORLD_TOPOJSON,
            "format": { "type": "topojson", "feature": "countries" }
        },
        "projection": { "type": "mercator", "center": [12, 54], "scale": 480 },
        "transform": [
            {
                "lookup": "id",
                "from": {
                    "data": { "values": rows },
                    "key": "id",
                    "fields": ["country", "leader", "fill"]
                }
            },
            { "calculate": format!("datum.fill || '{NO_DATA_COLOR}'"), "as": "fill" }
        ],
        "mark": { "type": "geoshape", "stroke": "#000000", "strokeWidth": 0.5 },
        "encoding": {
            "color": { "field": "fill", "type": "nominal", "scale": null },
            "tooltip": [
                { "field": "country", "type": "nominal", "title": "Country" },
                { "field": "leader", "type": "nominal", "title": "Leading party" }
            ]
        }
    })
}

#[derive(Debug, Serialize)]
struct PollPoint<'a> {
    date: String,
    party: &'a str,
    value: f64,
    pollster: &'a str,
    sample_size: Option<u64>,
}

#[derive(Debug, Serialize)]
struct CurvePoint<'a> {
    date: String,
    party: &'a str,
    value: f64,
}

/// Poll scatter with one LOESS line per party, coloured by the palette.
pub fn trend_spec(c: &CountrySummary<'_>, bandwidth: f64) -> Value {
    let long = to_long(c.table, &c.parties);
    let lines = trend_lines(&long, bandwidth);

    let points: Vec<PollPoint<'_>> = long
        .iter()
        .map(|r| PollPoint {
            date: r.date.format(ISO_DATE).to_string(),
            party: c.source.label_of(&r.party),
            value: r.value,
            pollster: &r.pollster,
            sample_size: r.sample_size,
        })
        .collect();
    let curve: Vec<CurvePoint<'_>> = lines
        .iter()
        .flat_map(|line| {
            let party = c.source.label_of(&line.party);
            line.points.iter().map(move |(date, value)| CurvePoint {
                date: date.format(ISO_DATE).to_string(),
                party,
                value: *value,
            })
        })
        .collect();

    let domain: Vec<&str> = c.parties.iter().map(|p| c.source.label_of(p)).collect();
    let range: Vec<&str> = c
        .parties
        .iter()
        .map(|p| c.source.color_of(p).unwrap_or(DEFAULT_PARTY_COLOR))
        .collect();

    json!({
        "$schema": SCHEMA,
        "config": theme(),
        "title": c.title(),
        "width": 720,
        "height": 360,
        "encoding": {
            "x": { "field": "date", "type": "temporal", "title": null },
            "y": { "field": "value", "type": "quantitative", "title": "Share (%)" },
            "color": {
                "field": "party",
                "type": "nominal",
                "title": "Party",
                "scale": { "domain": domain, "range": range }
            }
        },
        "layer": [
            {
                "data": { "values": points },
                "mark": { "type": "circle", "size": 28, "opacity": 0.35 },
                "encoding": {
                    "tooltip": [
                        { "field": "date", "type": "temporal", "title": "Date" },
                        { "field": "party", "type": "nominal", "title": "Party" },
                        { "field": "value", "type": "quantitative", "title": "Share" },
                        { "field": "pollster", "type": "nominal", "title": "Pollster" },
                        { "field": "sample_size", "type": "quantitative", "title": "Sample size" }
                    ]
                }
            },
            {
                "data": { "values": curve },
                "mark": { "type": "line", "strokeWidth": 2.5 }
            }
        ]
    })
}
