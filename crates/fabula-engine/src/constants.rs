//! Fixed identifiers and message texts.

/// Instance identifier of the player.
pub const PLAYER_ID: &str = "player1";

/// Identifier of the inventory pseudo-entity. It has no `type` fact.
pub const INVENTORY_ID: &str = "inventory";

/// Suffix appended to a room id to name its synthesized floor.
pub const FLOOR_ID_SUFFIX: &str = "floor1";

/// Type of synthesized floor entities.
pub const FLOOR_TYPE: &str = "floor";

/// Types whose instances never need support and are never marked accessible
/// by the support rule.
pub const EXEMPT_FROM_SUPPORT: [&str; 2] = ["floor", "player"];

/// Trait predicate marking entities that must rest on or in something.
pub const NEEDS_SUPPORT: &str = "needs_support";

/// Trait predicate marking containers.
pub const CONTAINER: &str = "container";

/// Trait predicate marking supports.
pub const SUPPORT: &str = "support";

/// Predicate marking reachable entities.
pub const ACCESSIBLE: &str = "accessible";

/// Generic response when a request cannot be bound at all.
pub const CANNOT_DO_THAT: &str = "You can't do that.";

/// Failure kind reported with [`CANNOT_DO_THAT`].
pub const UNRESOLVED_ARGUMENT: &str = "unresolved_argument";

/// Room description opening, filled with the room's surface string.
pub const ROOM_TEMPLATE: &str = "You are in a {room} now.";

/// Room content sentence for a single visible entity.
pub const SINGLE_ITEM_TEMPLATE: &str = "There is a {items} here.";

/// Room content sentence for several visible entities.
pub const MULTI_ITEM_TEMPLATE: &str = "There are a {items} here.";

/// Inventory description, filled with the item listing.
pub const INVENTORY_TEMPLATE: &str = "In your inventory you have {items}.";

/// Response when the inventory holds nothing.
pub const EMPTY_INVENTORY: &str = "Your inventory is empty.";
