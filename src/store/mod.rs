//! Ship records and the store that holds them.
//!
//! This module defines the `ShipStore` trait that every store backend must
//! implement, the `Ship` record itself, and `NewShip`, the creation draft
//! that carries the field defaults.

mod memory;

pub use memory::MemoryStore;

use crate::error::{PortTrackError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status assigned when a creation request does not supply one.
pub const DEFAULT_STATUS: &str = "docked";

/// A tracked ship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    /// Store-assigned identifier, unique and increasing.
    pub id: u64,
    /// Ship name.
    pub name: String,
    /// Free-form status such as "docked" or "arriving".
    pub status: String,
    /// Cargo description.
    pub cargo: Option<String>,
    /// Expected arrival as ISO-8601 text.
    pub eta: Option<String>,
}

/// Creation draft for a ship.
///
/// Only `name` is required. `status` falls back to [`DEFAULT_STATUS`];
/// `cargo` and `eta` stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewShip {
    pub name: Option<String>,
    pub status: Option<String>,
    pub cargo: Option<String>,
    pub eta: Option<String>,
}

impl NewShip {
    /// Creates a draft with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Builds a draft from a raw request body.
    ///
    /// A missing, malformed or non-object body yields an empty draft, which
    /// then fails the name check. Within an object, `null` counts as absent
    /// and any other non-string value is rejected.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
            return Ok(Self::default());
        };

        let text = |key: &str| match fields.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(PortTrackError::validation(format!("{} must be a string", key))),
        };

        Ok(Self {
            name: text("name")?,
            status: text("status")?,
            cargo: text("cargo")?,
            eta: text("eta")?,
        })
    }

    /// Checks the draft and resolves defaults into a record with `id`.
    pub fn into_ship(self, id: u64) -> Result<Ship> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(PortTrackError::validation("name required")),
        };

        Ok(Ship {
            id,
            name,
            status: self.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            cargo: self.cargo,
            eta: self.eta,
        })
    }
}

/// Trait implemented by ship store backends.
#[async_trait]
pub trait ShipStore: Send + Sync {
    /// Returns the backend name.
    fn name(&self) -> &'static str;

    /// Returns every ship in insertion order.
    async fn list(&self) -> Result<Vec<Ship>>;

    /// Validates `ship`, assigns the next id and appends it.
    ///
    /// Fails with [`PortTrackError::Validation`] when the name is missing or
    /// empty; the store is left unchanged in that case.
    async fn create(&self, ship: NewShip) -> Result<Ship>;

    /// Returns the number of stored ships.
    async fn len(&self) -> Result<usize> {
        Ok(self.list().await?.len())
    }
}
