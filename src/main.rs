//! Empires world - Headless runner. Generates a match from the saved
//! settings, wanders the villagers around and logs frame stats.

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use empires_world::components::EntityId;
use empires_world::messages::MoveOrderMsg;
use empires_world::resources::{FrameCounter, FrameStats};
use empires_world::settings::{load_settings, WorldSettings};
use empires_world::world::GameWorld;
use empires_world::Step;

/// Frames between wander orders and stats lines.
const WANDER_INTERVAL: u64 = 120;

#[derive(Resource)]
struct WanderRng(StdRng);

fn main() {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0))),
        LogPlugin::default(),
    ));

    let settings = load_settings();
    let world = match GameWorld::generate(&settings) {
        Ok(w) => w,
        Err(e) => {
            error!("world generation failed: {}", e);
            std::process::exit(1);
        }
    };

    empires_world::build_app(&mut app);
    app.insert_resource(WanderRng(StdRng::seed_from_u64(settings.seed)))
       .insert_resource(world)
       .insert_resource(settings)
       .add_systems(Update, wander_system.before(Step::Drain))
       .add_systems(Update, (report_system, exit_system).after(Step::Cull));

    app.run();
}

/// Send idle villagers toward a random point in view.
fn wander_system(
    world: Res<GameWorld>,
    counter: Res<FrameCounter>,
    mut rng: ResMut<WanderRng>,
    mut orders: MessageWriter<MoveOrderMsg>,
) {
    if counter.0 % WANDER_INTERVAL != 0 {
        return;
    }
    let view = world.map.viewport();
    let (min, max) = (view.min(), view.max());
    if min.x >= max.x || min.y >= max.y {
        return;
    }
    let idle: Vec<EntityId> = world.tree().dynamic_ids().into_iter()
        .filter(|id| world.unit(*id).and_then(|u| u.movement()).is_some_and(|m| !m.is_moving()))
        .collect();
    for id in idle {
        orders.write(MoveOrderMsg {
            id,
            x: rng.0.random_range(min.x..max.x),
            y: rng.0.random_range(min.y..max.y),
            dx: 0,
            dy: 0,
        });
    }
}

fn report_system(counter: Res<FrameCounter>, stats: Res<FrameStats>) {
    if counter.0 % WANDER_INTERVAL == 0 {
        info!("frame {}: {:?}", counter.0, *stats);
    }
}

fn exit_system(
    counter: Res<FrameCounter>,
    settings: Res<WorldSettings>,
    mut exit: MessageWriter<AppExit>,
) {
    if settings.frames > 0 && counter.0 >= settings.frames {
        info!("simulated {} frames, exiting", counter.0);
        exit.write(AppExit::Success);
    }
}
