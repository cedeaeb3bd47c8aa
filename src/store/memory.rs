//! In-memory ship store.
//!
//! Records live for the lifetime of the process and are lost on exit.

use super::{NewShip, Ship, ShipStore};
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// Ship store backed by a vector.
///
/// Id assignment and append happen under one write lock, so concurrent
/// creations never hand out the same id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ships: RwLock<Vec<Ship>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the two demo ships.
    pub fn seeded() -> Self {
        Self::with_ships(vec![
            Ship {
                id: 1,
                name: "Andromeda".to_string(),
                status: "docked".to_string(),
                cargo: Some("containers".to_string()),
                eta: None,
            },
            Ship {
                id: 2,
                name: "Aurora".to_string(),
                status: "arriving".to_string(),
                cargo: Some("grain".to_string()),
                eta: Some("2025-08-25T10:00:00Z".to_string()),
            },
        ])
    }

    /// Creates a store holding `ships` in the given order.
    pub fn with_ships(ships: Vec<Ship>) -> Self {
        Self {
            ships: RwLock::new(ships),
        }
    }
}

fn next_id(ships: &[Ship]) -> u64 {
    ships.iter().map(|s| s.id).max().map_or(1, |max| max + 1)
}

#[async_trait]
impl ShipStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> Result<Vec<Ship>> {
        Ok(self.ships.read().await.clone())
    }

    async fn create(&self, ship: NewShip) -> Result<Ship> {
        let mut ships = self.ships.write().await;
        let ship = ship.into_ship(next_id(&ships))?;

        debug!(id = ship.id, "Appending ship");
        ships.push(ship.clone());
        Ok(ship)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.ships.read().await.len())
    }
}
