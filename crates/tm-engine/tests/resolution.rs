//! End-to-end resolution over JSON-defined tables: a mission generator
//! aggregating five component tables, chained subtables, and embedded
//! roll/table tokens.

use std::collections::HashMap;
use std::rc::Rc;

use tm_core::RandomTable;
use tm_engine::Randomizer;

fn load_tables(definitions: &[&str]) -> HashMap<String, Rc<RandomTable>> {
    definitions
        .iter()
        .map(|json| {
            let table = RandomTable::from_json(json).unwrap();
            (table.key.clone(), Rc::new(table))
        })
        .collect()
}

fn engine(tables: HashMap<String, Rc<RandomTable>>) -> Randomizer {
    let mut rand = Randomizer::with_seed(2026);
    rand.set_table_lookup(move |key| tables.get(key).cloned());
    rand
}

const MISSION_TABLES: &[&str] = &[
    r#"{
        "key": "mission_generator",
        "title": "Mission Generator",
        "macro": [
            "mission_action",
            "mission_patron",
            "mission_antagonist",
            "mission_complication",
            "mission_reward"
        ]
    }"#,
    r#"{
        "key": "mission_action",
        "title": "Mission Action",
        "table": ["rescue the hostages", "recover the cargo", "scout the ruins"]
    }"#,
    r#"{
        "key": "mission_patron",
        "title": "Mission Patron",
        "table": [
            { "label": "colonial governor", "weight": 3 },
            { "label": "smuggler baron" }
        ]
    }"#,
    r#"{
        "key": "mission_antagonist",
        "title": "Mission Antagonist",
        "table": ["pirate crew", "rogue marshal", "feral drones"]
    }"#,
    r#"{
        "key": "mission_complication",
        "title": "Mission Complication",
        "table": ["a dust storm rolls in", "the patron lied", "supplies run short"]
    }"#,
    r#"{
        "key": "mission_reward",
        "title": "Mission Reward",
        "table": ["{{roll:2d6}} crates of medicine", "a land deed", "hard currency"]
    }"#,
];

#[test]
fn mission_generator_produces_five_parts_in_order() {
    let tables = load_tables(MISSION_TABLES);
    let generator = tables.get("mission_generator").unwrap().clone();
    let mut rand = engine(tables);

    let result = rand.resolve_table(&generator, None).unwrap();
    assert_eq!(result.len(), 5);
    let order: Vec<&str> = result.iter().map(|e| e.table.as_str()).collect();
    assert_eq!(
        order,
        [
            "mission_action",
            "mission_patron",
            "mission_antagonist",
            "mission_complication",
            "mission_reward"
        ]
    );
    // every part rolled an actual entry, tokens included
    for entry in result.iter() {
        assert!(!entry.result.is_empty());
        assert!(!entry.result.contains("{{"));
    }
}

#[test]
fn mission_generator_formats_as_report() {
    let tables = load_tables(MISSION_TABLES);
    let generator = tables.get("mission_generator").unwrap().clone();
    let mut rand = engine(tables);

    let result = rand.resolve_table(&generator, None).unwrap();
    let report = generator.format_result(&result, false);
    assert_eq!(report.lines().count(), 5);
    assert!(report.starts_with("Mission_action: "));
}

#[test]
fn chained_subtables_with_weights_and_times() {
    let tables = load_tables(&[r#"{
        "key": "color2",
        "title": "Two-part Color",
        "sequence": ["shade", { "table": "color", "times": 2 }],
        "tables": {
            "shade": ["Light"],
            "color": {
                "Blue": { "weight": 5 },
                "Red": {}
            }
        }
    }"#]);
    let color2 = tables.get("color2").unwrap().clone();
    let mut rand = engine(tables);

    let result = rand.resolve_table(&color2, None).unwrap();
    assert_eq!(result.len(), 3);
    assert_eq!(result.entries[0].table, "shade");
    assert_eq!(result.entries[0].result, "Light");
    for entry in &result.entries[1..] {
        assert_eq!(entry.table, "color");
        assert!(entry.result == "Blue" || entry.result == "Red");
    }
}

#[test]
fn nested_table_tokens_resolve_through_the_registry() {
    let tables = load_tables(&[
        r#"{
            "key": "weapon",
            "table": ["laser pike"]
        }"#,
        r#"{
            "key": "guard",
            "table": ["sentry armed with a {{table:weapon}}"]
        }"#,
        r#"{
            "key": "post",
            "table": ["{{table:guard}} at the gate"]
        }"#,
    ]);
    let post = tables.get("post").unwrap().clone();
    let mut rand = engine(tables);

    let result = rand.resolve_table(&post, None).unwrap();
    assert_eq!(
        result.entries[0].result,
        "Sentry armed with a Laser pike at the gate"
    );
}

#[test]
fn dependencies_cover_the_same_references_resolution_follows() {
    let table = RandomTable::from_json(
        r#"{
            "key": "guard",
            "table": ["sentry armed with a {{table:weapon}}", "{{table:this:off_duty}} clerk"],
            "tables": { "off_duty": ["sleeping"] }
        }"#,
    )
    .unwrap();
    assert_eq!(table.dependencies(), ["weapon"]);
}
