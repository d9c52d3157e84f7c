// src/config/builtin.rs

use std::collections::BTreeMap;
use url::Url;

use super::source::{
    CellScope, CleanConfig, DateColumn, DropPolicy, LeadColumn, PartyStyle, RowConfig,
    SourceConfig, TableMatch, YearStrategy,
};

const WIKI_BASE: &str = "https://en.wikipedia.org/wiki/";

/// The poll pages scraped when no `POLLS_SOURCES` file is given.
pub fn builtin_sources() -> Vec<SourceConfig> {
    vec![
        united_kingdom(),
        germany(),
        austria(),
        denmark(),
        italy(),
    ]
}

fn wiki(page: &str) -> Url {
    Url::parse(WIKI_BASE)
        .and_then(|base| base.join(page))
        .expect("built-in Wikipedia URL should parse")
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn palette(entries: &[(&str, &str, &str)]) -> Vec<PartyStyle> {
    entries
        .iter()
        .map(|(party, color, label)| PartyStyle {
            party: party.to_string(),
            color: color.to_string(),
            label: label.to_string(),
        })
        .collect()
}

fn united_kingdom() -> SourceConfig {
    SourceConfig {
        key: "uk".into(),
        country: "United Kingdom".into(),
        iso_numeric: 826,
        url: wiki("Opinion_polling_for_the_next_United_Kingdom_general_election"),
        tables: TableMatch {
            markers: strings(&["Pollster", "Sample size"]),
            max_tables: None,
        },
        rows: RowConfig {
            header_skip: 0,
            cells: CellScope::All,
            year_chain: vec![
                YearStrategy::SortValue { cell: None },
                YearStrategy::SortKey,
                YearStrategy::DateText,
            ],
            date_column: Some(DateColumn {
                header: "Date(s) conducted".into(),
                fallback_index: 0,
            }),
        },
        clean: CleanConfig {
            pollster_column: "Pollster".into(),
            pollster_markers: vec!['['],
            fieldwork_column: "Date(s) conducted".into(),
            sample_size_column: "Sample size".into(),
            party_columns: strings(&["Lab", "Con", "Ref", "LD", "Grn", "SNP", "PC", "Others"]),
            lead: Some(LeadColumn {
                column: "Lead".into(),
                numeric: true,
            }),
            renames: BTreeMap::new(),
            strip_question_marks: false,
            policy: DropPolicy::RequireSampleSizeAndDate,
        },
        palette: palette(&[
            ("Lab", "#E4003B", "Labour"),
            ("Con", "#0087DC", "Conservative"),
            ("Ref", "#12B6CF", "Reform UK"),
            ("Grn", "#6AB023", "Green"),
            ("LD", "#FDBB30", "Liberal Democrats"),
            ("SNP", "#FFF95D", "SNP"),
        ]),
    }
}

fn germany() -> SourceConfig {
    SourceConfig {
        key: "de".into(),
        country: "Germany".into(),
        iso_numeric: 276,
        url: wiki("Opinion_polling_for_the_next_German_federal_election"),
        tables: TableMatch {
            markers: strings(&["Abs."]),
            max_tables: None,
        },
        rows: RowConfig {
            header_skip: 0,
            cells: CellScope::DataOnly,
            year_chain: vec![YearStrategy::SortValue { cell: Some(1) }],
            date_column: Some(DateColumn {
                header: "Fieldwork date".into(),
                fallback_index: 1,
            }),
        },
        clean: CleanConfig {
            pollster_column: "Polling firm".into(),
            pollster_markers: vec!['['],
            fieldwork_column: "Fieldwork date".into(),
            sample_size_column: "Sample size".into(),
            party_columns: strings(&[
                "Union", "AfD", "SPD", "Grüne", "Linke", "BSW", "FDP", "Others",
            ]),
            lead: Some(LeadColumn {
                column: "Lead".into(),
                numeric: false,
            }),
            renames: BTreeMap::new(),
            strip_question_marks: false,
            policy: DropPolicy::RequireSampleSizeAndDate,
        },
        palette: palette(&[
            ("Union", "#A0A0A0", "CDU/CSU"),
            ("AfD", "#009EE0", "AfD"),
            ("SPD", "#E3000F", "SPD"),
            ("Grüne", "#46962B", "Greens"),
            ("Linke", "#BE3075", "The Left"),
            ("BSW", "#792351", "BSW"),
            ("FDP", "#FFED00", "FDP"),
        ]),
    }
}

fn austria() -> SourceConfig {
    let mut renames = BTreeMap::new();
    renames.insert("Grüne".to_string(), "Grüne_AT".to_string());

    SourceConfig {
        key: "at".into(),
        country: "Austria".into(),
        iso_numeric: 40,
        url: wiki("Next_Austrian_legislative_election"),
        tables: TableMatch {
            markers: strings(&["Fieldwork date", "Lead"]),
            max_tables: None,
        },
        rows: RowConfig {
            header_skip: 0,
            cells: CellScope::All,
            year_chain: vec![YearStrategy::DateText],
            date_column: Some(DateColumn {
                header: "Fieldwork date".into(),
                fallback_index: 1,
            }),
        },
        clean: CleanConfig {
            pollster_column: "Polling firm".into(),
            pollster_markers: vec!['('],
            fieldwork_column: "Fieldwork date".into(),
            sample_size_column: "Sample size".into(),
            party_columns: strings(&["FPÖ", "ÖVP", "SPÖ", "NEOS", "Grüne", "KPÖ", "Others"]),
            lead: Some(LeadColumn {
                column: "Lead".into(),
                numeric: false,
            }),
            renames,
            strip_question_marks: true,
            policy: DropPolicy::RequireSampleSizeAndDate,
        },
        palette: palette(&[
            ("FPÖ", "#005DA8", "FPÖ"),
            ("ÖVP", "#63C3D0", "ÖVP"),
            ("SPÖ", "#CE000C", "SPÖ"),
            ("NEOS", "#E84188", "NEOS"),
            ("Grüne_AT", "#88B626", "Greens"),
            ("KPÖ", "#AA0000", "KPÖ"),
        ]),
    }
}

fn denmark() -> SourceConfig {
    let renames: BTreeMap<String, String> = [
        ("A", "Social Democrats"),
        ("V", "Venstre (Liberal Party)"),
        ("M", "The Moderates"),
        ("F", "Socialist People’s Party"),
        ("Æ", "Denmark Democrats"),
        ("I", "Liberal Alliance"),
        ("C", "Conservative People’s Party"),
        ("Ø", "Red–Green Alliance"),
        ("B", "Social Liberal Party"),
        ("Å", "The Alternative"),
        ("O", "Danish People’s Party"),
        ("H", "Hard Line (Stram Kurs)"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    SourceConfig {
        key: "dk".into(),
        country: "Denmark".into(),
        iso_numeric: 208,
        url: wiki("Opinion_polling_for_the_2026_Danish_general_election"),
        tables: TableMatch {
            markers: Vec::new(),
            max_tables: Some(4),
        },
        rows: RowConfig {
            header_skip: 1,
            cells: CellScope::All,
            year_chain: vec![
                YearStrategy::SortValue { cell: None },
                YearStrategy::SortKey,
                YearStrategy::RowText,
            ],
            date_column: None,
        },
        clean: CleanConfig {
            pollster_column: "Polling firm".into(),
            pollster_markers: vec!['['],
            fieldwork_column: "Fieldwork date".into(),
            sample_size_column: "Sample size".into(),
            party_columns: strings(&[
                "A", "V", "M", "F", "Æ", "I", "C", "Ø", "B", "H", "Å", "O", "Others",
            ]),
            lead: Some(LeadColumn {
                column: "Lead".into(),
                numeric: false,
            }),
            renames,
            strip_question_marks: false,
            policy: DropPolicy::RequireSampleSizeAndDate,
        },
        palette: palette(&[
            ("Social Democrats", "#A82721", "Social Democrats"),
            ("Venstre (Liberal Party)", "#01438E", "Venstre"),
            ("The Moderates", "#842990", "Moderates"),
            ("Socialist People’s Party", "#E07EA8", "SF"),
            ("Denmark Democrats", "#7896D2", "Denmark Democrats"),
            ("Liberal Alliance", "#3FB2BE", "Liberal Alliance"),
            ("Conservative People’s Party", "#96B226", "Conservatives"),
            ("Red–Green Alliance", "#E6801A", "Red–Green"),
            ("Danish People’s Party", "#EAC73E", "DF"),
        ]),
    }
}

fn italy() -> SourceConfig {
    SourceConfig {
        key: "it".into(),
        country: "Italy".into(),
        iso_numeric: 380,
        url: wiki("Opinion_polling_for_the_next_Italian_general_election"),
        tables: TableMatch {
            markers: strings(&["Polling firm", "Fieldwork date", "Sample size"]),
            max_tables: None,
        },
        rows: RowConfig {
            header_skip: 0,
            cells: CellScope::DataOnly,
            year_chain: vec![YearStrategy::SortValue { cell: Some(0) }],
            date_column: None,
        },
        clean: CleanConfig {
            pollster_column: "Polling firm".into(),
            pollster_markers: Vec::new(),
            fieldwork_column: "Fieldwork date".into(),
            sample_size_column: "Sample size".into(),
            party_columns: strings(&[
                "FdI", "PD", "M5S", "Lega", "FI", "A", "IV", "AVS", "+E", "NM",
            ]),
            lead: Some(LeadColumn {
                column: "Lead".into(),
                numeric: true,
            }),
            renames: BTreeMap::new(),
            strip_question_marks: false,
            policy: DropPolicy::RequireSampleSizeAndDate,
        },
        palette: palette(&[
            ("FdI", "#03386A", "Brothers of Italy"),
            ("PD", "#F0001C", "Democratic Party"),
            ("M5S", "#FFEB3B", "Five Star Movement"),
            ("Lega", "#008037", "Lega"),
            ("FI", "#0087DC", "Forza Italia"),
            ("AVS", "#A2C617", "AVS"),
        ]),
    }
}
