//! Live entity state carried between update frames.

use std::collections::BTreeMap;

use schema::{EntityMapDef, SessionSchema, Tick, Value};

/// One live entity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkEntity {
    pub uid: u32,
    /// Id of the entity map the entity belongs to.
    pub model_hash: u32,
    pub tick: Tick,
}

impl NetworkEntity {
    /// Creates an entity seeded from its map's default tick.
    #[must_use]
    pub fn spawn(uid: u32, def: &EntityMapDef) -> Self {
        Self {
            uid,
            model_hash: def.id,
            tick: def.default_tick.clone(),
        }
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.tick.get(field)
    }
}

/// Runtime uid list for one entity map.
///
/// `sorted_uids` is strictly ascending; bitmask bit `i` in an update frame
/// addresses `sorted_uids[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityMap {
    id: u32,
    sorted_uids: Vec<u32>,
}

impl EntityMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self {
            id,
            sorted_uids: Vec::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Live uids in ascending order.
    #[must_use]
    pub fn sorted_uids(&self) -> &[u32] {
        &self.sorted_uids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sorted_uids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted_uids.is_empty()
    }

    /// Returns the bit position of `uid`, if live.
    #[must_use]
    pub fn position(&self, uid: u32) -> Option<usize> {
        self.sorted_uids.binary_search(&uid).ok()
    }

    pub(crate) fn replace_uids(&mut self, uids: Vec<u32>) {
        debug_assert!(uids.windows(2).all(|w| w[0] < w[1]));
        self.sorted_uids = uids;
    }
}

/// The entity table of one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityTable {
    entities: BTreeMap<u32, NetworkEntity>,
    maps: Vec<EntityMap>,
}

impl EntityTable {
    /// Creates an empty table with one uid list per entity map of `schema`.
    #[must_use]
    pub fn new(schema: &SessionSchema) -> Self {
        Self {
            entities: BTreeMap::new(),
            maps: schema
                .entity_maps
                .iter()
                .map(|def| EntityMap::new(def.id))
                .collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[must_use]
    pub fn contains(&self, uid: u32) -> bool {
        self.entities.contains_key(&uid)
    }

    #[must_use]
    pub fn get(&self, uid: u32) -> Option<&NetworkEntity> {
        self.entities.get(&uid)
    }

    /// Iterates entities in ascending uid order.
    pub fn iter(&self) -> impl Iterator<Item = &NetworkEntity> {
        self.entities.values()
    }

    /// Runtime uid lists, in schema order.
    #[must_use]
    pub fn maps(&self) -> &[EntityMap] {
        &self.maps
    }

    #[must_use]
    pub fn entity_map(&self, id: u32) -> Option<&EntityMap> {
        self.maps.iter().find(|map| map.id == id)
    }

    /// Iterates the live entities of one map in bit order.
    pub fn entities_in_map(&self, id: u32) -> impl Iterator<Item = &NetworkEntity> {
        self.entity_map(id)
            .map(EntityMap::sorted_uids)
            .unwrap_or_default()
            .iter()
            .filter_map(|uid| self.entities.get(uid))
    }

    /// Finds the first entity, by uid, whose `Name` field equals `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&NetworkEntity> {
        self.entities
            .values()
            .find(|entity| entity.get("Name").and_then(Value::as_str) == Some(name))
    }

    /// Drops every entity and empties every uid list.
    pub fn clear(&mut self) {
        self.entities.clear();
        for map in &mut self.maps {
            map.sorted_uids.clear();
        }
    }

    pub(crate) fn get_mut(&mut self, uid: u32) -> Option<&mut NetworkEntity> {
        self.entities.get_mut(&uid)
    }

    pub(crate) fn insert(&mut self, entity: NetworkEntity) -> Option<NetworkEntity> {
        self.entities.insert(entity.uid, entity)
    }

    pub(crate) fn remove(&mut self, uid: u32) -> Option<NetworkEntity> {
        self.entities.remove(&uid)
    }

    /// Installs `uids` as the list of map `id`, adding the map if absent.
    pub(crate) fn set_map_uids(&mut self, id: u32, uids: Vec<u32>) {
        match self.maps.iter_mut().find(|map| map.id == id) {
            Some(map) => map.replace_uids(uids),
            None => {
                let mut map = EntityMap::new(id);
                map.replace_uids(uids);
                self.maps.push(map);
            }
        }
    }
}
