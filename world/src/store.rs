//! Generational storage for every element on the battlefield.

use std::collections::BTreeSet;

use tank_battle_core::{CellCoord, Direction, EntityId, EntitySnapshot, Grid, Material, PixelRect};

use crate::terrain::TerrainMap;

/// Behaviour attached to an element on top of its material and box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Body {
    Terrain,
    Tank(TankState),
    Bullet(BulletState),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TankState {
    pub(crate) direction: Direction,
    pub(crate) speed: u32,
    pub(crate) bullet: Option<EntityId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BulletState {
    pub(crate) direction: Direction,
    pub(crate) speed: u32,
    pub(crate) owner: EntityId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Entity {
    pub(crate) material: Material,
    pub(crate) rect: PixelRect,
    pub(crate) body: Body,
}

impl Entity {
    pub(crate) const fn terrain(material: Material, rect: PixelRect) -> Self {
        Self {
            material,
            rect,
            body: Body::Terrain,
        }
    }

    pub(crate) const fn tank(
        material: Material,
        rect: PixelRect,
        direction: Direction,
        speed: u32,
    ) -> Self {
        Self {
            material,
            rect,
            body: Body::Tank(TankState {
                direction,
                speed,
                bullet: None,
            }),
        }
    }

    pub(crate) const fn bullet(
        rect: PixelRect,
        direction: Direction,
        speed: u32,
        owner: EntityId,
    ) -> Self {
        Self {
            material: Material::Bullet,
            rect,
            body: Body::Bullet(BulletState {
                direction,
                speed,
                owner,
            }),
        }
    }

    /// Elements that tanks collide with and bullets impact.
    pub(crate) const fn is_solid(&self) -> bool {
        !self.material.is_passable()
    }

    pub(crate) const fn tank_state(&self) -> Option<&TankState> {
        match &self.body {
            Body::Tank(state) => Some(state),
            Body::Terrain | Body::Bullet(_) => None,
        }
    }

    pub(crate) const fn direction(&self) -> Option<Direction> {
        match &self.body {
            Body::Tank(state) => Some(state.direction),
            Body::Bullet(state) => Some(state.direction),
            Body::Terrain => None,
        }
    }

    pub(crate) const fn snapshot(&self, id: EntityId) -> EntitySnapshot {
        EntitySnapshot {
            id,
            material: self.material,
            rect: self.rect,
            direction: self.direction(),
        }
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

/// Arena that hands out generation-checked handles.
#[derive(Clone, Debug, Default)]
pub(crate) struct EntityStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl EntityStore {
    pub(crate) fn insert(&mut self, entity: Entity) -> EntityId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            if let Some(slot) = self.slots.get_mut(index as usize) {
                slot.entity = Some(entity);
                return EntityId::new(index, slot.generation);
            }
        }

        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            entity: Some(entity),
        });
        EntityId::new(index, 0)
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.entity.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.entity.as_mut())
    }

    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self
            .slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())?;
        let entity = slot.entity.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        self.live -= 1;
        Some(entity)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let index = u32::try_from(index).ok()?;
            slot.entity
                .as_ref()
                .map(|entity| (EntityId::new(index, slot.generation), entity))
        })
    }

    pub(crate) const fn len(&self) -> usize {
        self.live
    }
}

/// Live entity set together with the spatial index over its terrain.
///
/// Terrain is looked up through the cell index; tanks and bullets are few and
/// move every tick, so they are tracked in a flat ordered set instead.
#[derive(Clone, Debug)]
pub(crate) struct Battlefield {
    grid: Grid,
    entities: EntityStore,
    terrain: TerrainMap,
    mobiles: BTreeSet<EntityId>,
}

impl Battlefield {
    pub(crate) fn new(grid: Grid) -> Self {
        Self {
            grid,
            entities: EntityStore::default(),
            terrain: TerrainMap::default(),
            mobiles: BTreeSet::new(),
        }
    }

    pub(crate) const fn grid(&self) -> &Grid {
        &self.grid
    }

    pub(crate) fn insert(&mut self, entity: Entity) -> EntityId {
        let rect = entity.rect;
        let is_terrain = matches!(entity.body, Body::Terrain);
        let id = self.entities.insert(entity);
        if is_terrain {
            self.terrain.insert(id, self.grid.cells_covering(&rect));
        } else {
            let _ = self.mobiles.insert(id);
        }
        id
    }

    /// Removes an element. A removed bullet no longer counts as its owner's
    /// outstanding shot.
    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(id)?;
        match entity.body {
            Body::Terrain => self.terrain.remove(id, self.grid.cells_covering(&entity.rect)),
            Body::Tank(_) => {
                let _ = self.mobiles.remove(&id);
            }
            Body::Bullet(state) => {
                let _ = self.mobiles.remove(&id);
                if let Some(Body::Tank(tank)) = self
                    .entities
                    .get_mut(state.owner)
                    .map(|owner| &mut owner.body)
                {
                    if tank.bullet == Some(id) {
                        tank.bullet = None;
                    }
                }
            }
        }
        Some(entity)
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub(crate) fn tank_mut(&mut self, id: EntityId) -> Option<&mut TankState> {
        match self.entities.get_mut(id).map(|entity| &mut entity.body) {
            Some(Body::Tank(state)) => Some(state),
            _ => None,
        }
    }

    /// Repositions a tank or bullet. Terrain never moves.
    pub(crate) fn relocate(&mut self, id: EntityId, rect: PixelRect) {
        if let Some(entity) = self.entities.get_mut(id) {
            if !matches!(entity.body, Body::Terrain) {
                entity.rect = rect;
            }
        }
    }

    /// Handles of every element whose box shares pixels with `rect`, in
    /// ascending handle order.
    pub(crate) fn overlapping(&self, rect: &PixelRect) -> Vec<EntityId> {
        let mut candidates = self.terrain.candidates(self.grid.cells_covering(rect));
        candidates.extend(self.mobiles.iter().copied());
        candidates
            .into_iter()
            .filter(|id| {
                self.entities
                    .get(*id)
                    .is_some_and(|entity| entity.rect.intersects(rect))
            })
            .collect()
    }

    /// First solid element overlapping `rect`, skipping `exclude` and any
    /// bullet `exclude` fired.
    pub(crate) fn first_blocker(
        &self,
        rect: &PixelRect,
        exclude: Option<EntityId>,
    ) -> Option<EntityId> {
        self.overlapping(rect).into_iter().find(|id| {
            Some(*id) != exclude
                && self.entities.get(*id).is_some_and(|entity| {
                    let own_shot = matches!(
                        entity.body,
                        Body::Bullet(state) if Some(state.owner) == exclude
                    );
                    entity.is_solid() && !own_shot
                })
        })
    }

    pub(crate) fn mobiles(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.mobiles
            .iter()
            .filter_map(|id| self.entities.get(*id).map(|entity| (*id, entity)))
    }

    pub(crate) fn ids_of(&self, material: Material) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, entity)| entity.material == material)
            .map(|(id, _)| id)
            .collect()
    }

    pub(crate) fn terrain_in(&self, cell: CellCoord) -> Vec<EntityId> {
        self.terrain.at(cell)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter()
    }

    pub(crate) const fn len(&self) -> usize {
        self.entities.len()
    }
}
