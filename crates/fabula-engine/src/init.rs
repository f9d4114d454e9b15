//! Initial world construction and augmentation.
//!
//! The initial state arrives as flat textual facts. Construction parses them
//! and then derives the augmentation facts a hand-written adventure may omit:
//! trait facts per instance, a floor per room, floor placement for
//! unsupported entities, accessibility, and numeric function coercion with
//! zero defaults. All derivations unify with facts the state already holds.

use std::collections::HashSet;

use fabula_core::{Fact, FactValue, Num, TypeGraph, WorldState};
use fabula_defs::AdventureDef;

use crate::constants::{
    ACCESSIBLE, CONTAINER, EXEMPT_FROM_SUPPORT, FLOOR_ID_SUFFIX, FLOOR_TYPE, INVENTORY_ID,
    NEEDS_SUPPORT, PLAYER_ID, SUPPORT,
};
use crate::error::{EngineError, EngineResult};

/// Build the initial world state from an adventure definition.
pub fn build_initial_world(def: &AdventureDef, graph: &TypeGraph) -> EngineResult<WorldState> {
    let mut world = WorldState::new();
    for fact_str in &def.initial_state {
        world.insert(fact_str.parse()?);
    }

    add_trait_facts(&mut world, def);
    add_room_floors(&mut world);
    place_unsupported_entities(&mut world);
    derive_accessibility(&mut world);
    coerce_function_facts(&mut world, graph)?;
    add_function_defaults(&mut world, graph);

    if world
        .facts_about(PLAYER_ID)
        .all(|f| f.predicate != "at")
    {
        return Err(EngineError::MissingPlayer);
    }
    Ok(world)
}

/// Parse the goal facts, coercing numeric function values like the world.
pub fn parse_goal_state(def: &AdventureDef, graph: &TypeGraph) -> EngineResult<HashSet<Fact>> {
    let mut goals = HashSet::new();
    for fact_str in &def.goal_state {
        let mut fact: Fact = fact_str.parse()?;
        if graph
            .functions()
            .iter()
            .any(|f| f.predicate == fact.predicate)
        {
            fact = coerce_fact(fact)?;
        }
        goals.insert(fact);
    }
    Ok(goals)
}

/// Every entity's declared type traits become standalone facts.
fn add_trait_facts(world: &mut WorldState, def: &AdventureDef) {
    let mut facts = Vec::new();
    for (id, type_name) in world.entity_instances() {
        if let Some(entity_def) = def.entity_types.get(type_name) {
            for type_trait in &entity_def.traits {
                facts.push(Fact::unary(type_trait.clone(), id));
            }
        }
    }
    for fact in facts {
        world.insert(fact);
    }
}

/// Synthesize one floor entity per room, placed in that room.
fn add_room_floors(world: &mut WorldState) {
    let rooms: Vec<String> = world.room_instances().map(|(id, _)| id.to_string()).collect();
    for room in rooms {
        let floor_id = format!("{room}{FLOOR_ID_SUFFIX}");
        world.insert(Fact::binary("type", floor_id.clone(), FLOOR_TYPE));
        world.insert(Fact::binary("at", floor_id, room));
    }
}

/// Entities needing support with no `on`/`in` fact land on their room's floor.
fn place_unsupported_entities(world: &mut WorldState) {
    let mut facts = Vec::new();
    for fact in world.iter() {
        if fact.predicate != "at" {
            continue;
        }
        let (Some(entity), Some(room)) = (fact.id_arg(0), fact.id_arg(1)) else {
            continue;
        };
        if !world.contains(&Fact::unary(NEEDS_SUPPORT, entity)) {
            continue;
        }
        let supported = world
            .facts_about(entity)
            .any(|f| f.predicate == "on" || f.predicate == "in");
        if !supported {
            facts.push(Fact::binary("on", entity, format!("{room}{FLOOR_ID_SUFFIX}")));
        }
    }
    for fact in facts {
        world.insert(fact);
    }
}

/// Mark reachable entities accessible.
///
/// Entities inside open containers, inside the inventory, or on supports are
/// accessible, as is every entity with no support requirement (floors and the
/// player excepted). The inventory itself is always accessible.
fn derive_accessibility(world: &mut WorldState) {
    let mut facts = Vec::new();
    for fact in world.iter() {
        let Some(entity) = fact.id_arg(0) else {
            continue;
        };
        match fact.predicate.as_str() {
            "in" => {
                let Some(holder) = fact.id_arg(1) else {
                    continue;
                };
                if holder == INVENTORY_ID {
                    facts.push(Fact::unary(ACCESSIBLE, entity));
                } else if world.contains(&Fact::unary(CONTAINER, holder))
                    && world.contains(&Fact::unary("open", holder))
                {
                    facts.push(Fact::unary(ACCESSIBLE, entity));
                }
            }
            "on" => {
                let Some(holder) = fact.id_arg(1) else {
                    continue;
                };
                if world.contains(&Fact::unary(SUPPORT, holder)) {
                    facts.push(Fact::unary(ACCESSIBLE, entity));
                }
            }
            "type" => {
                let Some(type_name) = fact.id_arg(1) else {
                    continue;
                };
                if !world.contains(&Fact::unary(NEEDS_SUPPORT, entity))
                    && !EXEMPT_FROM_SUPPORT.contains(&type_name)
                {
                    facts.push(Fact::unary(ACCESSIBLE, entity));
                }
            }
            _ => {}
        }
    }
    facts.push(Fact::unary(ACCESSIBLE, INVENTORY_ID));
    for fact in facts {
        world.insert(fact);
    }
}

/// Replace textual numbers in function facts with numeric values.
fn coerce_function_facts(world: &mut WorldState, graph: &TypeGraph) -> EngineResult<()> {
    for function in graph.functions() {
        let textual: Vec<Fact> = world
            .facts_with_predicate(&function.predicate)
            .filter(|f| f.num_arg(1).is_none())
            .cloned()
            .collect();
        for fact in textual {
            world.remove(&fact);
            world.insert(coerce_fact(fact)?);
        }
    }
    Ok(())
}

fn coerce_fact(fact: Fact) -> EngineResult<Fact> {
    let Some(value) = fact.id_arg(1) else {
        return Ok(fact);
    };
    let num: Num = value.parse()?;
    let mut args = fact.args.clone();
    args[1] = FactValue::Num(num);
    Ok(Fact::new(fact.predicate, args))
}

/// Add zero-valued function facts for every owner instance lacking one.
///
/// The inventory owns function values too but has no `type` fact, so it gets
/// its own check.
fn add_function_defaults(world: &mut WorldState, graph: &TypeGraph) {
    for function in graph.functions() {
        let mut owners: Vec<String> = world
            .entity_instances()
            .chain(world.room_instances())
            .filter(|(_, t)| *t == function.owner_type)
            .map(|(id, _)| id.to_string())
            .collect();
        if function.owner_type == INVENTORY_ID {
            owners.push(INVENTORY_ID.to_string());
        }
        for owner in owners {
            if world.numeric_value(&function.predicate, &owner).is_none() {
                world.insert(Fact::binary(
                    function.predicate.clone(),
                    owner,
                    Num::Int(0),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabula_core::FunctionDef;
    use fabula_defs::EntityTypeDef;

    fn def() -> AdventureDef {
        let mut def = AdventureDef {
            initial_state: vec![
                "type(player1,player)".to_string(),
                "type(apple1,apple)".to_string(),
                "type(box1,box)".to_string(),
                "room(kitchen1,kitchen)".to_string(),
                "at(player1,kitchen1)".to_string(),
                "at(apple1,kitchen1)".to_string(),
                "at(box1,kitchen1)".to_string(),
                "closed(box1)".to_string(),
            ],
            goal_state: vec!["in(apple1,inventory)".to_string()],
            ..AdventureDef::default()
        };
        def.entity_types.insert(
            "apple".to_string(),
            EntityTypeDef {
                repr_str: "apple".to_string(),
                traits: vec!["takeable".to_string(), "needs_support".to_string()],
                ..EntityTypeDef::default()
            },
        );
        def.entity_types.insert(
            "box".to_string(),
            EntityTypeDef {
                repr_str: "box".to_string(),
                traits: vec!["container".to_string(), "openable".to_string()],
                ..EntityTypeDef::default()
            },
        );
        def
    }

    fn graph() -> TypeGraph {
        TypeGraph::builder()
            .function(FunctionDef {
                predicate: "itemcount".to_string(),
                owner_type: INVENTORY_ID.to_string(),
            })
            .build()
    }

    #[test]
    fn traits_become_facts() {
        let world = build_initial_world(&def(), &graph()).unwrap();
        assert!(world.contains(&Fact::unary("takeable", "apple1")));
        assert!(world.contains(&Fact::unary("container", "box1")));
    }

    #[test]
    fn every_room_gets_a_floor() {
        let world = build_initial_world(&def(), &graph()).unwrap();
        assert!(world.contains(&Fact::binary("type", "kitchen1floor1", "floor")));
        assert!(world.contains(&Fact::binary("at", "kitchen1floor1", "kitchen1")));
    }

    #[test]
    fn unsupported_entities_land_on_the_floor() {
        let world = build_initial_world(&def(), &graph()).unwrap();
        assert!(world.contains(&Fact::binary("on", "apple1", "kitchen1floor1")));
    }

    #[test]
    fn accessibility_is_derived() {
        let world = build_initial_world(&def(), &graph()).unwrap();
        // The box needs no support, so it is accessible outright.
        assert!(world.contains(&Fact::unary("accessible", "box1")));
        assert!(world.contains(&Fact::unary("accessible", "inventory")));
        // The player is exempt and never marked.
        assert!(!world.contains(&Fact::unary("accessible", "player1")));
    }

    #[test]
    fn function_facts_are_coerced_and_defaulted() {
        let mut adventure = def();
        adventure
            .initial_state
            .push("capacity(box1,3)".to_string());
        let graph = TypeGraph::builder()
            .function(FunctionDef {
                predicate: "capacity".to_string(),
                owner_type: "box".to_string(),
            })
            .function(FunctionDef {
                predicate: "itemcount".to_string(),
                owner_type: INVENTORY_ID.to_string(),
            })
            .build();
        let world = build_initial_world(&adventure, &graph).unwrap();
        assert_eq!(world.numeric_value("capacity", "box1"), Some(Num::Int(3)));
        assert_eq!(
            world.numeric_value("itemcount", "inventory"),
            Some(Num::Int(0))
        );
    }

    #[test]
    fn missing_player_is_fatal() {
        let mut adventure = def();
        adventure.initial_state.retain(|f| f != "at(player1,kitchen1)");
        assert!(matches!(
            build_initial_world(&adventure, &graph()),
            Err(EngineError::MissingPlayer)
        ));
    }

    #[test]
    fn goal_facts_parse_with_numeric_coercion() {
        let mut adventure = def();
        adventure.goal_state.push("itemcount(inventory,2)".to_string());
        let goals = parse_goal_state(&adventure, &graph()).unwrap();
        assert!(goals.contains(&Fact::binary("in", "apple1", "inventory")));
        assert!(goals.contains(&Fact::binary("itemcount", "inventory", Num::Int(2))));
    }
}
