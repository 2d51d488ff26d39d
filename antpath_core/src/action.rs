use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ActionId, Displacement};

/// Represents errors raised while assembling an action catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Action id {id} is defined more than once")]
    DuplicateAction { id: ActionId },
    #[error("Action id {id} is not part of the catalog")]
    MissingAction { id: ActionId },
}

/// A row of the action table as supplied by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action_id: ActionId,
    pub name: String,
    pub x_value_changes: i32,
    pub y_value_changes: i32,
}

/// A named, signed displacement the agent can perform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub name: String,
    pub dx: i32,
    pub dy: i32,
}

impl Action {
    pub fn new(id: ActionId, name: impl Into<String>, dx: i32, dy: i32) -> Self {
        Action {
            id,
            name: name.into(),
            dx,
            dy,
        }
    }
}

impl Displacement for Action {
    fn displacement(&self) -> (i32, i32) {
        (self.dx, self.dy)
    }
}

impl From<ActionRecord> for Action {
    fn from(record: ActionRecord) -> Self {
        Action {
            id: record.action_id,
            name: record.name,
            dx: record.x_value_changes,
            dy: record.y_value_changes,
        }
    }
}

impl From<&Action> for ActionRecord {
    fn from(action: &Action) -> Self {
        ActionRecord {
            action_id: action.id,
            name: action.name.clone(),
            x_value_changes: action.dx,
            y_value_changes: action.dy,
        }
    }
}

/// Lookup table from action id to displacement.
///
/// Iteration is ordered by id so anything built on top of the catalog
/// (the solver in particular) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionCatalog {
    actions: BTreeMap<ActionId, Action>,
}

impl ActionCatalog {
    /// Builds a catalog, rejecting duplicate ids.
    pub fn new<I: IntoIterator<Item = Action>>(actions: I) -> Result<Self, CatalogError> {
        let mut catalog = BTreeMap::new();
        for action in actions {
            let id = action.id;
            if catalog.insert(id, action).is_some() {
                return Err(CatalogError::DuplicateAction { id });
            }
        }
        Ok(ActionCatalog { actions: catalog })
    }

    pub fn from_records<I: IntoIterator<Item = ActionRecord>>(records: I) -> Result<Self, CatalogError> {
        Self::new(records.into_iter().map(Action::from))
    }

    /// The 8 standard moves: unit steps and jumps of 2 in each direction.
    pub fn canonical() -> Self {
        let actions = canonical_actions()
            .into_iter()
            .map(|action| (action.id, action))
            .collect();
        ActionCatalog { actions }
    }

    #[inline]
    pub fn get(&self, id: ActionId) -> Option<&Action> {
        self.actions.get(&id)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns an iterator over the actions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.values()
    }

    /// Finds an action by its name.
    pub fn by_name(&self, name: &str) -> Option<&Action> {
        self.actions.values().find(|action| action.name == name)
    }

    /// Returns the sub-catalog holding only the permitted ids.
    pub fn restrict<I: IntoIterator<Item = ActionId>>(&self, permitted: I) -> Result<Self, CatalogError> {
        let mut actions = BTreeMap::new();
        for id in permitted {
            let action = self.get(id).ok_or(CatalogError::MissingAction { id })?;
            actions.insert(id, action.clone());
        }
        Ok(ActionCatalog { actions })
    }
}

/// The standard move set.
pub fn canonical_actions() -> Vec<Action> {
    vec![
        Action::new(1, "step_right", 1, 0),
        Action::new(2, "step_left", -1, 0),
        Action::new(3, "step_up", 0, -1),
        Action::new(4, "step_down", 0, 1),
        Action::new(5, "jump_right", 2, 0),
        Action::new(6, "jump_left", -2, 0),
        Action::new(7, "jump_up", 0, -2),
        Action::new(8, "jump_down", 0, 2),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_catalog_has_eight_moves() {
        let catalog = ActionCatalog::canonical();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.get(4).map(|a| (a.dx, a.dy)), Some((0, 1)));
        assert_eq!(catalog.by_name("jump_left").map(|a| a.id), Some(6));
        assert!(catalog.get(9).is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = ActionCatalog::new([Action::new(1, "a", 1, 0), Action::new(1, "b", 0, 1)]).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateAction { id: 1 });
    }

    #[test]
    fn records_map_to_displacements() {
        let catalog = ActionCatalog::from_records([ActionRecord {
            action_id: 42,
            name: "diagonal".to_string(),
            x_value_changes: 3,
            y_value_changes: -3,
        }])
        .unwrap();
        assert_eq!(catalog.get(42).unwrap().displacement(), (3, -3));
    }

    #[test]
    fn restrict_keeps_only_permitted_ids() {
        let catalog = ActionCatalog::canonical();
        let restricted = catalog.restrict([1, 4]).unwrap();
        assert_eq!(restricted.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 4]);

        let err = catalog.restrict([1, 99]).unwrap_err();
        assert_eq!(err, CatalogError::MissingAction { id: 99 });
    }
}
