use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::{AgentKind, Direction};
use crate::roads::Quad;
use crate::tiles::{Tile, TilePosition, Tool};

// =============================================================================
// Construction
// =============================================================================

/// Player input: place `tool` at `position`.
#[derive(Event, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub position: TilePosition,
    pub tool: Tool,
}

/// A grid slot now holds `tile`. Not sent for no-op rebuilds.
#[derive(Event, Debug, Clone)]
pub struct TileBuilt {
    pub tile: Tile,
}

/// The renderer must drop `asset`; its tile has been replaced.
#[derive(Event, Debug, Clone, Copy)]
pub struct TileAssetReleased {
    pub position: TilePosition,
    pub asset: Entity,
}

/// A road tile landed. Carries its waypoint quads for debug overlays.
#[derive(Event, Debug, Clone, Copy)]
pub struct RoadBuilt {
    pub position: TilePosition,
    pub curb: Quad,
    pub lane: Quad,
}

// =============================================================================
// Agents
// =============================================================================

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub position: Vec2,
    pub kind: AgentKind,
    /// Spawn parked inside (hidden, not moving).
    pub indoors: bool,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct AgentSpawned {
    pub entity: Entity,
    pub kind: AgentKind,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SetIndoors {
    pub entity: Entity,
    pub indoors: bool,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct AgentVisibilityChanged {
    pub entity: Entity,
    pub visible: bool,
}

/// Redraw notification for an agent that moved or turned this tick.
#[derive(Event, Debug, Clone, Copy)]
pub struct AgentMoved {
    pub entity: Entity,
    pub position: Vec2,
    /// Sprite rotation in degrees; people don't rotate.
    pub rotation: Option<f32>,
    pub direction: Option<Direction>,
    pub depth: u32,
}

// =============================================================================
// Single-responder channel
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResponderError {
    #[error("a responder is already registered for this request type")]
    AlreadyRegistered,
    #[error("no responder registered for this request type")]
    Missing,
}

pub type Handler<Req, Resp> = Box<dyn Fn(&mut World, Req) -> Resp + Send + Sync>;

/// Request/response channel with at most one handler, unlike fan-out events.
#[derive(Resource)]
pub struct Responder<Req: Send + Sync + 'static, Resp: Send + Sync + 'static> {
    handler: Option<Handler<Req, Resp>>,
}

impl<Req: Send + Sync + 'static, Resp: Send + Sync + 'static> Default for Responder<Req, Resp> {
    fn default() -> Self {
        Self { handler: None }
    }
}

impl<Req: Send + Sync + 'static, Resp: Send + Sync + 'static> Responder<Req, Resp> {
    pub fn register(
        &mut self,
        handler: impl Fn(&mut World, Req) -> Resp + Send + Sync + 'static,
    ) -> Result<(), ResponderError> {
        if self.handler.is_some() {
            warn!(
                "Responder<{}>: second registration rejected",
                std::any::type_name::<Req>()
            );
            return Err(ResponderError::AlreadyRegistered);
        }
        self.handler = Some(Box::new(handler));
        Ok(())
    }

    pub fn is_registered(&self) -> bool {
        self.handler.is_some()
    }

    /// Remove the handler so another may register.
    pub fn clear(&mut self) {
        self.handler = None;
    }
}

/// Route `req` to the registered responder.
pub fn request<Req, Resp>(world: &mut World, req: Req) -> Result<Resp, ResponderError>
where
    Req: Send + Sync + 'static,
    Resp: Send + Sync + 'static,
{
    if !world.contains_resource::<Responder<Req, Resp>>() {
        return Err(ResponderError::Missing);
    }
    world.resource_scope(|world, responder: Mut<Responder<Req, Resp>>| {
        responder
            .handler
            .as_ref()
            .map(|handler| handler(world, req))
            .ok_or(ResponderError::Missing)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Ping(u32);

    #[derive(Resource, Default)]
    struct Seen(u32);

    #[test]
    fn test_request_reaches_handler() {
        let mut world = World::new();
        world.init_resource::<Seen>();
        let mut responder = Responder::<Ping, u32>::default();
        responder
            .register(|world: &mut World, Ping(n)| {
                world.resource_mut::<Seen>().0 += 1;
                n * 2
            })
            .unwrap();
        world.insert_resource(responder);

        assert_eq!(request::<Ping, u32>(&mut world, Ping(21)), Ok(42));
        assert_eq!(world.resource::<Seen>().0, 1);
        // Still installed after the scope.
        assert!(world.resource::<Responder<Ping, u32>>().is_registered());
    }

    #[test]
    fn test_second_registration_rejected() {
        let mut responder = Responder::<Ping, u32>::default();
        responder.register(|_: &mut World, _| 1).unwrap();
        assert_eq!(
            responder.register(|_: &mut World, _| 2),
            Err(ResponderError::AlreadyRegistered)
        );
        responder.clear();
        assert!(responder.register(|_: &mut World, _| 3).is_ok());
    }

    #[test]
    fn test_request_without_responder() {
        let mut world = World::new();
        assert_eq!(
            request::<Ping, u32>(&mut world, Ping(1)),
            Err(ResponderError::Missing)
        );
        world.init_resource::<Responder<Ping, u32>>();
        assert_eq!(
            request::<Ping, u32>(&mut world, Ping(1)),
            Err(ResponderError::Missing)
        );
    }
}
