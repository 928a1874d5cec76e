use bevy::prelude::*;

use crate::agent::{AgentKind, Indoors};
use crate::config::SimConfig;
use crate::events::{
    self, AgentSpawned, AgentVisibilityChanged, Responder, ResponderError, SetIndoors,
    SpawnRequest,
};
use crate::person::Person;
use crate::vehicle::Vehicle;

pub type SpawnResponder = Responder<SpawnRequest, Entity>;

/// Default spawn handler: creates the agent entity with speeds from
/// `SimConfig`.
pub fn spawn_agent(world: &mut World, request: SpawnRequest) -> Entity {
    let params = world
        .get_resource::<SimConfig>()
        .map(|config| config.agents)
        .unwrap_or_default();

    let mut agent = match request.kind {
        AgentKind::Person => world.spawn(Person::new(request.position, &params)),
        AgentKind::Vehicle => world.spawn(Vehicle::new(request.position, &params)),
    };
    if request.indoors {
        agent.insert(Indoors);
    }
    let entity = agent.id();

    debug!(
        "spawned {} {entity} at ({:.1}, {:.1})",
        request.kind, request.position.x, request.position.y
    );
    world.send_event(AgentSpawned {
        entity,
        kind: request.kind,
    });
    if request.indoors {
        world.send_event(AgentVisibilityChanged {
            entity,
            visible: false,
        });
    }
    entity
}

/// Install [`spawn_agent`] unless another responder already owns the channel.
pub fn register_default_spawner(world: &mut World) -> Result<(), ResponderError> {
    world
        .get_resource_or_insert_with(SpawnResponder::default)
        .register(spawn_agent)
}

/// Route this tick's `SpawnRequest` events through the spawn responder.
pub fn dispatch_spawn_requests(world: &mut World) {
    let pending: Vec<SpawnRequest> = match world.get_resource_mut::<Events<SpawnRequest>>() {
        Some(mut events) => events.drain().collect(),
        None => return,
    };
    for request in pending {
        if let Err(err) = events::request::<SpawnRequest, Entity>(world, request) {
            warn!("spawn request for {} dropped: {err}", request.kind);
        }
    }
}

/// Park agents inside or let them back out.
pub fn apply_indoor_requests(
    mut commands: Commands,
    mut requests: EventReader<SetIndoors>,
    agents: Query<Has<Indoors>, Or<(With<Person>, With<Vehicle>)>>,
    mut visibility: EventWriter<AgentVisibilityChanged>,
) {
    for request in requests.read() {
        let Ok(is_indoors) = agents.get(request.entity) else {
            warn!("SetIndoors: {} is not an agent", request.entity);
            continue;
        };
        if is_indoors == request.indoors {
            continue;
        }
        if request.indoors {
            commands.entity(request.entity).insert(Indoors);
        } else {
            commands.entity(request.entity).remove::<Indoors>();
        }
        visibility.send(AgentVisibilityChanged {
            entity: request.entity,
            visible: !request.indoors,
        });
    }
}
