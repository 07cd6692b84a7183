//! Applies the staged generator to the world, one cell per tick.
//!
//! A [`RebuildCityEvent`] clears the grid and starts a new run when the
//! generator is idle; requests arriving mid-run are dropped. While a run is in
//! progress [`advance_generation`] pulls one [`CellStep`] per elapsed step
//! interval and spawns or reshapes the matching block.

use std::time::Duration;

use bevy::prelude::*;

use super::generator::{CellStep, CityGenerator, GenerationPhase};
use super::layout::is_road;
use crate::world::{CellCoord, CityConfig, CityGrid};

pub struct CityBuilderPlugin;

impl Plugin for CityBuilderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CityGenerator>()
            .init_resource::<StepTimer>()
            .add_event::<RebuildCityEvent>()
            .add_systems(Startup, trigger_initial_generation)
            .add_systems(
                Update,
                (
                    handle_rebuild_requests,
                    advance_generation.run_if(generation_running),
                )
                    .chain()
                    .in_set(CityBuilderSet),
            );
    }
}

/// Request handling and stepping; readers of the generator run after it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CityBuilderSet;

/// Event requesting a fresh city. Ignored while a run is in progress.
#[derive(Event)]
pub struct RebuildCityEvent;

/// A placed building or road tile.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CityBlock {
    pub coord: CellCoord,
}

/// Which material a block should be drawn with.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlockSurface {
    #[default]
    Building,
    Road,
}

/// Paces generation steps.
#[derive(Resource)]
pub struct StepTimer(pub Timer);

impl Default for StepTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(0.0, TimerMode::Once))
    }
}

impl StepTimer {
    /// Timer that is already finished so the first step runs immediately.
    fn primed(interval: f32) -> Self {
        let mut timer = Timer::from_seconds(interval, TimerMode::Once);
        let duration = timer.duration();
        timer.tick(duration);
        Self(timer)
    }

    fn ready(&mut self, delta: Duration) -> bool {
        if !self.0.finished() {
            self.0.tick(delta);
        }
        self.0.finished()
    }
}

fn trigger_initial_generation(mut events: EventWriter<RebuildCityEvent>) {
    events.send(RebuildCityEvent);
}

fn generation_running(generator: Res<CityGenerator>) -> bool {
    generator.is_busy()
}

fn handle_rebuild_requests(
    mut commands: Commands,
    mut events: EventReader<RebuildCityEvent>,
    config: Res<CityConfig>,
    mut generator: ResMut<CityGenerator>,
    mut grid: ResMut<CityGrid>,
    mut timer: ResMut<StepTimer>,
) {
    for _ in events.read() {
        if generator.is_busy() {
            debug!(
                "Rebuild requested during '{}', ignoring",
                generator.phase().label()
            );
            continue;
        }

        if let Err(err) = config.validate() {
            error!("Cannot generate city: {err}");
            continue;
        }

        let released = grid.reset(config.grid_size);
        let cleared = released.len();
        for entity in released {
            commands.entity(entity).despawn_recursive();
        }

        generator.start(&config);
        *timer = StepTimer::primed(config.step_interval);

        info!(
            "Generating {}x{} city (run {}, cleared {} blocks)",
            config.grid_size,
            config.grid_size,
            generator.runs(),
            cleared
        );
    }
}

fn advance_generation(
    mut commands: Commands,
    time: Res<Time>,
    mut timer: ResMut<StepTimer>,
    mut generator: ResMut<CityGenerator>,
    mut grid: ResMut<CityGrid>,
    mut blocks: Query<(&mut Transform, &mut BlockSurface), With<CityBlock>>,
) {
    if !timer.ready(time.delta()) {
        return;
    }
    timer.0.reset();

    let before = generator.phase();
    let step = generator.next_step();
    let after = generator.phase();
    if before != after {
        info!("{}", after.label());
    }

    let Some(step) = step else {
        if after == GenerationPhase::Complete {
            let spacing = generator.road_spacing();
            let roads = grid.iter().filter(|(c, _)| is_road(*c, spacing)).count();
            info!(
                "City complete: {} blocks, {} road tiles",
                grid.occupied(),
                roads
            );
        }
        return;
    };

    match step {
        CellStep::Place { coord, height } => {
            let transform = generator.block_transform(coord, height);
            let entity = commands
                .spawn((CityBlock { coord }, BlockSurface::Building, transform))
                .id();
            if let Some(previous) = grid.set(coord, entity) {
                commands.entity(previous).despawn_recursive();
            }
        }
        CellStep::Pave { coord, height } => {
            if let Some((mut transform, mut surface)) = block_at(&grid, &mut blocks, coord) {
                *surface = BlockSurface::Road;
                transform.scale = generator.block_scale(height);
            }
        }
        CellStep::Raise { coord, height } => {
            if let Some((mut transform, _)) = block_at(&grid, &mut blocks, coord) {
                transform.scale = generator.block_scale(height);
            }
        }
        CellStep::Skip { .. } => {}
    }
}

fn block_at<'a>(
    grid: &CityGrid,
    blocks: &'a mut Query<(&mut Transform, &mut BlockSurface), With<CityBlock>>,
    coord: CellCoord,
) -> Option<(Mut<'a, Transform>, Mut<'a, BlockSurface>)> {
    let entity = grid.get(coord)?;
    match blocks.get_mut(entity) {
        Ok(block) => Some(block),
        Err(_) => {
            warn!("Block at ({}, {}) is missing, skipping", coord.x, coord.z);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procgen::layout::{HIGH_RISE_HEIGHTS, LOW_RISE_HEIGHTS, ROAD_HEIGHT};
    use crate::procgen::ProcgenPlugin;
    use crate::world::WorldPlugin;

    fn test_app(config: CityConfig) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(config);
        app.add_plugins((WorldPlugin, ProcgenPlugin));
        app
    }

    fn small_city() -> CityConfig {
        CityConfig {
            grid_size: 3,
            road_spacing: 3,
            step_interval: 0.0,
            ..default()
        }
    }

    fn run_until_idle(app: &mut App) {
        for _ in 0..1000 {
            app.update();
            if !app.world().resource::<CityGenerator>().is_busy() {
                return;
            }
        }
        panic!("generation did not finish");
    }

    fn blocks(app: &mut App) -> Vec<(Entity, CityBlock, Transform, BlockSurface)> {
        let world = app.world_mut();
        let mut query = world.query::<(Entity, &CityBlock, &Transform, &BlockSurface)>();
        query
            .iter(world)
            .map(|(e, b, t, s)| (e, *b, *t, *s))
            .collect()
    }

    #[test]
    fn startup_generates_a_full_city() {
        let mut app = test_app(small_city());
        run_until_idle(&mut app);

        assert_eq!(
            app.world().resource::<CityGenerator>().phase(),
            GenerationPhase::Complete
        );
        assert_eq!(app.world().resource::<CityGrid>().occupied(), 9);
        assert_eq!(blocks(&mut app).len(), 9);
    }

    #[test]
    fn final_layout_follows_road_and_height_rules() {
        let mut app = test_app(small_city());
        run_until_idle(&mut app);

        for (_, block, transform, surface) in blocks(&mut app) {
            let coord = block.coord;
            assert_eq!(transform.scale.x, 1.0);
            assert_eq!(transform.scale.z, 1.0);
            assert_eq!(
                transform.translation,
                Vec3::new(coord.x as f32, 0.0, coord.z as f32)
            );
            if is_road(coord, 3) {
                assert_eq!(surface, BlockSurface::Road);
                assert_eq!(transform.scale.y, ROAD_HEIGHT);
            } else {
                assert_eq!(surface, BlockSurface::Building);
                let band = if (coord.x + coord.z) % 5 < 3 {
                    LOW_RISE_HEIGHTS
                } else {
                    HIGH_RISE_HEIGHTS
                };
                assert!(band.contains(&transform.scale.y));
            }
        }
    }

    #[test]
    fn rebuild_replaces_every_block() {
        let mut app = test_app(small_city());
        run_until_idle(&mut app);
        let first: Vec<Entity> = blocks(&mut app).into_iter().map(|b| b.0).collect();

        app.world_mut().send_event(RebuildCityEvent);
        run_until_idle(&mut app);
        let second = blocks(&mut app);

        assert_eq!(second.len(), 9);
        assert!(second.iter().all(|b| !first.contains(&b.0)));
        assert_eq!(app.world().resource::<CityGenerator>().runs(), 2);
    }

    #[test]
    fn rebuild_during_a_run_is_dropped() {
        let mut app = test_app(small_city());
        for _ in 0..4 {
            app.update();
        }
        let placed: Vec<Entity> = blocks(&mut app).into_iter().map(|b| b.0).collect();
        assert_eq!(placed.len(), 4);

        app.world_mut().send_event(RebuildCityEvent);
        app.update();

        let generator = app.world().resource::<CityGenerator>();
        assert_eq!(generator.runs(), 1);
        assert_eq!(generator.phase(), GenerationPhase::PlacingBuildings);
        let now = blocks(&mut app);
        assert_eq!(now.len(), 5);
        assert!(placed.iter().all(|e| now.iter().any(|b| b.0 == *e)));

        run_until_idle(&mut app);
        assert_eq!(blocks(&mut app).len(), 9);
        assert_eq!(app.world().resource::<CityGenerator>().runs(), 1);
    }

    #[test]
    fn phase_label_advances_through_every_stage() {
        let mut app = test_app(small_city());
        let mut seen = Vec::new();
        for _ in 0..100 {
            app.update();
            let phase = app.world().resource::<CityGenerator>().phase();
            if seen.last() != Some(&phase) {
                seen.push(phase);
            }
        }
        assert_eq!(
            seen,
            vec![
                GenerationPhase::PlacingBuildings,
                GenerationPhase::ClearingRoads,
                GenerationPhase::AdjustingHeights,
                GenerationPhase::Complete,
            ]
        );
    }

    #[test]
    fn step_interval_paces_generation() {
        let mut app = test_app(CityConfig {
            step_interval: 1000.0,
            ..small_city()
        });
        for _ in 0..5 {
            app.update();
        }
        assert_eq!(blocks(&mut app).len(), 1);
        assert!(app.world().resource::<CityGenerator>().is_busy());
    }

    #[test]
    fn invalid_config_generates_nothing() {
        let mut app = test_app(CityConfig {
            road_spacing: 0,
            ..small_city()
        });
        for _ in 0..5 {
            app.update();
        }
        assert!(blocks(&mut app).is_empty());
        assert_eq!(
            app.world().resource::<CityGenerator>().phase(),
            GenerationPhase::Idle
        );
    }

    #[test]
    fn unrepresentable_step_interval_generates_nothing() {
        let mut app = test_app(CityConfig {
            grid_size: 2,
            step_interval: 1e20,
            ..small_city()
        });
        for _ in 0..3 {
            app.update();
        }
        assert!(blocks(&mut app).is_empty());
        let generator = app.world().resource::<CityGenerator>();
        assert_eq!(generator.phase(), GenerationPhase::Idle);
        assert_eq!(generator.runs(), 0);
    }

    #[test]
    fn empty_grid_completes_without_blocks() {
        let mut app = test_app(CityConfig {
            grid_size: 0,
            ..small_city()
        });
        run_until_idle(&mut app);
        assert!(blocks(&mut app).is_empty());
        assert_eq!(
            app.world().resource::<CityGenerator>().phase(),
            GenerationPhase::Complete
        );
    }
}
