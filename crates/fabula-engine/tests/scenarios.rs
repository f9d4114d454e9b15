//! End-to-end scenarios over a small two-room adventure, loaded from JSON
//! the way a host would load it.

use fabula_core::{Fact, FactValue};
use fabula_defs::schema::EventParameter;
use fabula_defs::{AdventureDef, Condition, Effect, EventSchema, Term};
use fabula_engine::{ActionRequest, FailurePhase, Session};

/// A kitchen and a pantry. The apple sits on the table, the pear is shut
/// inside the box, and the goal is to pocket the apple.
fn adventure() -> AdventureDef {
    let json = r#"{
        "entity_types": {
            "apple": {"repr_str": "apple", "traits": ["takeable", "needs_support"]},
            "pear": {"repr_str": "pear", "traits": ["takeable", "needs_support"]},
            "box": {"repr_str": "wooden box", "traits": ["container", "openable"]},
            "table": {"repr_str": "table", "traits": ["support"]}
        },
        "room_types": {
            "kitchen": {"repr_str": "kitchen"},
            "pantry": {"repr_str": "pantry"}
        },
        "domain": {
            "hierarchy": {
                "entity": ["apple", "pear", "box", "table", "player"],
                "room": ["kitchen", "pantry"]
            },
            "functions": [{"predicate": "itemcount", "owner_type": "inventory"}]
        },
        "actions": [
            {
                "kind": "go",
                "parameters": [
                    {"variable": "?dest", "type_name": "room", "source": "arg1"},
                    {"variable": "?player", "type_name": "player", "source": "player"},
                    {"variable": "?here", "type_name": "room", "source": "current_room"}
                ],
                "precondition": {"all": [
                    {"predicate": {"name": "exit", "args": [
                        {"variable": "?here"}, {"variable": "?dest"}]}},
                    {"predicate": {"name": "at", "args": [
                        {"variable": "?player"}, {"variable": "?here"}]}}
                ]},
                "effects": [
                    {"fact": {"polarity": "remove", "predicate": "at", "args": [
                        {"variable": "?player"}, {"variable": "?here"}]}},
                    {"fact": {"polarity": "add", "predicate": "at", "args": [
                        {"variable": "?player"}, {"variable": "?dest"}]}}
                ],
                "success_template": "You go to the {dest}.",
                "parameter_failures": [
                    {"template": "you can't go to the {dest}.", "kind": "go_bad_destination"},
                    {"template": "you can't do that.", "kind": "go_bad_player"},
                    {"template": "you can't do that.", "kind": "go_bad_origin"}
                ],
                "precondition_failures": [
                    {"template": "there is no passage to the {dest}.", "kind": "no_passage"},
                    {"template": "you are not in the {here}.", "kind": "not_in_origin"}
                ],
                "epistemic": true
            },
            {
                "kind": "take",
                "parameters": [
                    {"variable": "?item", "type_name": "takeable", "source": "arg1"},
                    {"variable": "?room", "type_name": "room", "source": "current_room"}
                ],
                "precondition": {"all": [
                    {"predicate": {"name": "accessible", "args": [{"variable": "?item"}]}},
                    {"not": {"predicate": {"name": "in", "args": [
                        {"variable": "?item"}, {"literal": "inventory"}]}}}
                ]},
                "effects": [
                    {"fact": {"polarity": "remove", "predicate": "at", "args": [
                        {"variable": "?item"}, {"variable": "?room"}]}},
                    {"forall": {"variable": "?holder", "filter": "all_entities", "body": [
                        {"fact": {"polarity": "remove", "predicate": "on", "args": [
                            {"variable": "?item"}, {"variable": "?holder"}]}},
                        {"fact": {"polarity": "remove", "predicate": "in", "args": [
                            {"variable": "?item"}, {"variable": "?holder"}]}}
                    ]}},
                    {"fact": {"polarity": "add", "predicate": "in", "args": [
                        {"variable": "?item"}, {"literal": "inventory"}]}},
                    {"function_change": {"op": "increase", "target": {
                        "predicate": "itemcount", "owner": {"literal": "inventory"}},
                        "amount": {"number": 1}}}
                ],
                "success_template": "You take the {item}.",
                "parameter_failures": [
                    {"template": "you can't take the {item}.", "kind": "take_non_takeable"},
                    {"template": "you can't do that.", "kind": "take_bad_room"}
                ],
                "precondition_failures": [
                    {"template": "you can't reach the {item}.", "kind": "not_accessible"},
                    {"template": "you already have the {item}.", "kind": "already_in_inventory"}
                ]
            },
            {
                "kind": "open",
                "parameters": [
                    {"variable": "?cont", "type_name": "openable", "source": "arg1"}
                ],
                "precondition": {"all": [
                    {"predicate": {"name": "closed", "args": [{"variable": "?cont"}]}},
                    {"predicate": {"name": "accessible", "args": [{"variable": "?cont"}]}}
                ]},
                "effects": [
                    {"fact": {"polarity": "remove", "predicate": "closed", "args": [
                        {"variable": "?cont"}]}},
                    {"fact": {"polarity": "add", "predicate": "open", "args": [
                        {"variable": "?cont"}]}},
                    {"forall": {"variable": "?e", "filter": "all_entities", "body": [
                        {"when": {
                            "condition": {"predicate": {"name": "in", "args": [
                                {"variable": "?e"}, {"variable": "?cont"}]}},
                            "then": [{"fact": {"polarity": "add", "predicate": "accessible",
                                "args": [{"variable": "?e"}]}}]
                        }}
                    ]}}
                ],
                "success_template": "You open the {cont}. {container_content}",
                "parameter_failures": [
                    {"template": "the {cont} can't be opened.", "kind": "not_openable"}
                ],
                "precondition_failures": [
                    {"template": "the {cont} is already open.", "kind": "already_open"},
                    {"template": "you can't reach the {cont}.", "kind": "not_accessible"}
                ]
            }
        ],
        "initial_state": [
            "type(player1,player)",
            "type(apple1,apple)",
            "type(pear1,pear)",
            "type(box1,box)",
            "type(table1,table)",
            "room(kitchen1,kitchen)",
            "room(pantry1,pantry)",
            "at(player1,kitchen1)",
            "at(apple1,kitchen1)",
            "at(pear1,kitchen1)",
            "at(box1,kitchen1)",
            "at(table1,kitchen1)",
            "on(apple1,table1)",
            "in(pear1,box1)",
            "closed(box1)",
            "exit(kitchen1,pantry1)",
            "exit(pantry1,kitchen1)"
        ],
        "goal_state": ["in(apple1,inventory)"]
    }"#;
    AdventureDef::from_json(json).expect("adventure definition loads")
}

/// The same adventure with two chained events: a draft slams the box shut
/// and startles the player, and the startle resolves as a second event.
fn adventure_with_events() -> AdventureDef {
    let mut def = adventure();
    def.events.push(EventSchema {
        name: "draft_slams_box".to_string(),
        parameters: vec![EventParameter {
            variable: "?b".to_string(),
            type_name: "box".to_string(),
        }],
        precondition: Condition::predicate("open", vec![Term::var("?b")]),
        effects: vec![
            Effect::remove("open", vec![Term::var("?b")]),
            Effect::add("closed", vec![Term::var("?b")]),
            Effect::add("startled", vec![Term::lit("player")]),
        ],
        feedback_template: "A draft blows the {b} shut.".to_string(),
        randomize: None,
    });
    def.events.push(EventSchema {
        name: "startle_fades".to_string(),
        parameters: vec![EventParameter {
            variable: "?p".to_string(),
            type_name: "player".to_string(),
        }],
        precondition: Condition::predicate("startled", vec![Term::var("?p")]),
        effects: vec![Effect::remove("startled", vec![Term::var("?p")])],
        feedback_template: "You flinch.".to_string(),
        randomize: None,
    });
    def
}

#[test]
fn taking_an_accessible_item_moves_it_to_the_inventory() {
    let mut session = Session::new(adventure(), 0).unwrap();
    let report = session
        .process_action(&ActionRequest::with_arg1("take", "apple"))
        .unwrap();

    assert!(report.success);
    assert_eq!(report.feedback, "You take the apple.");
    assert!(report
        .diff
        .added
        .contains(&Fact::binary("in", "apple1", "inventory")));
    assert!(report
        .diff
        .removed
        .contains(&Fact::binary("at", "apple1", "kitchen1")));
    assert!(session
        .world()
        .contains(&Fact::binary("in", "apple1", "inventory")));
    assert!(!session
        .world()
        .contains(&Fact::binary("on", "apple1", "table1")));
}

#[test]
fn inaccessible_item_fails_on_the_accessible_leaf_without_side_effects() {
    let mut session = Session::new(adventure(), 0).unwrap();
    let before = session.world().clone();

    // The pear is shut inside the closed box.
    let report = session
        .process_action(&ActionRequest::with_arg1("take", "pear"))
        .unwrap();

    assert!(!report.success);
    let failure = report.failure.unwrap();
    assert_eq!(failure.phase, FailurePhase::Precondition);
    assert_eq!(failure.kind, "not_accessible");
    assert_eq!(failure.feedback, "You can't reach the pear.");
    assert_eq!(session.world(), &before);
}

#[test]
fn opening_a_container_makes_its_contents_accessible() {
    let mut session = Session::new(adventure(), 0).unwrap();
    assert!(!session
        .world()
        .contains(&Fact::unary("accessible", "pear1")));

    let report = session
        .process_action(&ActionRequest::with_arg1("open", "box"))
        .unwrap();
    assert!(report.success);
    assert_eq!(
        report.feedback,
        "You open the wooden box. In the wooden box there is a pear."
    );
    assert!(session.world().contains(&Fact::unary("open", "box1")));
    assert!(session
        .world()
        .contains(&Fact::unary("accessible", "pear1")));

    // And the pear can now be taken.
    let report = session
        .process_action(&ActionRequest::with_arg1("take", "pear"))
        .unwrap();
    assert!(report.success);
}

#[test]
fn failed_plan_rolls_back_every_step() {
    let mut session = Session::new(adventure(), 0).unwrap();
    let history_before = session.history_len();

    let reports = session
        .execute_plan_sequence(&[
            ActionRequest::with_arg1("go", "pantry"),
            ActionRequest::with_arg1("take", "ghost"),
        ])
        .unwrap();

    assert_eq!(reports.len(), 2);
    assert!(reports[0].success);
    assert!(!reports[1].success);
    assert_eq!(reports[1].feedback, "You can't do that.");

    // The successful go was reverted along with the failure.
    assert!(session
        .world()
        .contains(&Fact::binary("at", "player1", "kitchen1")));
    assert_eq!(session.history_len(), history_before);
}

#[test]
fn successful_plan_is_also_reverted() {
    let mut session = Session::new(adventure(), 0).unwrap();
    let reports = session
        .execute_plan_sequence(&[ActionRequest::with_arg1("take", "apple")])
        .unwrap();

    assert!(reports[0].success);
    assert!(session
        .world()
        .contains(&Fact::binary("at", "apple1", "kitchen1")));
    assert!(!session
        .world()
        .contains(&Fact::binary("in", "apple1", "inventory")));
}

#[test]
fn goal_facts_are_reported_once_achieved() {
    let mut session = Session::new(adventure(), 0).unwrap();
    assert!(session.achieved_goals().is_empty());

    let report = session
        .process_action(&ActionRequest::with_arg1("take", "apple"))
        .unwrap();
    assert!(report
        .achieved_goals
        .contains("in(apple1,inventory)"));
}

#[test]
fn events_cascade_until_quiescent_and_concatenate_feedback() {
    let mut session = Session::new(adventure_with_events(), 0).unwrap();
    let report = session
        .process_action(&ActionRequest::with_arg1("open", "box"))
        .unwrap();

    assert!(report.success);
    assert_eq!(
        report.feedback,
        "You open the wooden box. In the wooden box there is a pear.\n\
         A draft blows the wooden box shut.\n\
         You flinch."
    );
    // The draft undid the open and the startle resolved itself.
    assert!(session.world().contains(&Fact::unary("closed", "box1")));
    assert!(!session.world().contains(&Fact::unary("open", "box1")));
    assert!(!session
        .world()
        .contains(&Fact::unary("startled", "player1")));
}

#[test]
fn parse_failures_still_let_pending_events_run() {
    // Start with the box already open so the draft event is pending.
    let mut def = adventure_with_events();
    def.initial_state.retain(|fact| fact != "closed(box1)");
    def.initial_state.push("open(box1)".to_string());
    let mut session = Session::new(def, 0).unwrap();
    let history_before = session.history_len();

    let feedback = session.process_parse_failure();
    assert_eq!(feedback, "A draft blows the wooden box shut.\nYou flinch.");
    assert!(session.world().contains(&Fact::unary("closed", "box1")));
    assert!(!session.world().contains(&Fact::unary("open", "box1")));
    // Each triggered event snapshots the world.
    assert_eq!(session.history_len(), history_before + 2);

    // Quiescent now: another unparsed turn changes nothing.
    assert_eq!(session.process_parse_failure(), "");
    assert_eq!(session.history_len(), history_before + 2);
}

#[test]
fn plan_rollback_discards_event_snapshots_too() {
    let mut session = Session::new(adventure_with_events(), 0).unwrap();
    let history_before = session.history_len();

    session
        .execute_plan_sequence(&[ActionRequest::with_arg1("open", "box")])
        .unwrap();

    assert_eq!(session.history_len(), history_before);
    assert!(session.world().contains(&Fact::unary("closed", "box1")));
    assert!(!session
        .world()
        .contains(&Fact::unary("accessible", "pear1")));
    assert!(!session
        .world()
        .contains(&Fact::unary("startled", "player1")));
}

/// Every id-valued fact argument must resolve through the type index, in
/// every state a play-through can reach. The inventory is the one fixed
/// identifier with no defining fact.
#[test]
fn every_fact_argument_resolves_through_the_type_index() {
    fn assert_instances_defined(session: &Session) {
        for fact in session.world().iter() {
            let ids: Vec<&str> = match fact.predicate.as_str() {
                // The second argument of a defining fact is a type name.
                "type" | "room" => fact.id_arg(0).into_iter().collect(),
                _ => fact.args.iter().filter_map(FactValue::as_id).collect(),
            };
            for id in ids {
                if id == "inventory" {
                    continue;
                }
                assert!(
                    session.world().type_of(id).is_some(),
                    "{fact} references the undefined instance {id}"
                );
            }
        }
    }

    let mut session = Session::new(adventure(), 0).unwrap();
    assert_instances_defined(&session);
    for request in [
        ActionRequest::with_arg1("open", "box"),
        ActionRequest::with_arg1("take", "pear"),
        ActionRequest::with_arg1("go", "pantry"),
        ActionRequest::with_arg1("go", "kitchen"),
        ActionRequest::with_arg1("take", "apple"),
    ] {
        assert!(session.process_action(&request).unwrap().success);
        assert_instances_defined(&session);
    }
}

#[test]
fn moving_to_a_new_room_counts_as_epistemic_gain() {
    let mut session = Session::new(adventure(), 0).unwrap();
    let report = session
        .process_action(&ActionRequest::with_arg1("go", "pantry"))
        .unwrap();

    assert!(report.success);
    assert_eq!(report.feedback, "You go to the pantry.");
    assert!(report.exploration.action_epistemic);
    assert!(report.exploration.epistemic_gain > 0);
    // Both rooms have now been visited.
    assert!((report.exploration.visited_rooms_ratio - 1.0).abs() < f64::EPSILON);
}

#[test]
fn room_and_inventory_descriptions_track_the_world() {
    let mut session = Session::new(adventure(), 0).unwrap();
    let room = session.room_description();
    assert!(room.starts_with("You are in a kitchen now."));
    assert!(room.contains("apple"));
    assert!(room.contains("The wooden box is closed."));
    assert!(room.contains("passage to a pantry"));

    assert_eq!(session.inventory_description(), "Your inventory is empty.");
    session
        .process_action(&ActionRequest::with_arg1("take", "apple"))
        .unwrap();
    assert_eq!(
        session.inventory_description(),
        "In your inventory you have a apple."
    );
}

#[test]
fn sessions_with_the_same_seed_replay_identically() {
    let transcript = |seed: u64| -> Vec<String> {
        let mut session = Session::new(adventure_with_events(), seed).unwrap();
        [
            ActionRequest::with_arg1("open", "box"),
            ActionRequest::with_arg1("open", "box"),
            ActionRequest::with_arg1("take", "apple"),
        ]
        .iter()
        .map(|request| session.process_action(request).unwrap().feedback)
        .collect()
    };
    assert_eq!(transcript(17), transcript(17));
}
