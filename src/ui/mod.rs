//! Status overlay and keyboard controls.

use bevy::prelude::*;

use crate::procgen::city_builder::{CityBuilderSet, RebuildCityEvent};
use crate::procgen::generator::CityGenerator;
use crate::world::CityConfig;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_status_overlay).add_systems(
            Update,
            (
                handle_rebuild_key,
                update_phase_text
                    .after(CityBuilderSet)
                    .run_if(resource_changed::<CityGenerator>),
            ),
        );
    }
}

const OVERLAY_FONT_SIZE: f32 = 24.0;

/// Marker for the line showing the current generation phase.
#[derive(Component)]
struct PhaseText;

/// Human-readable name of a key, e.g. `KeyB` becomes `B`.
pub fn key_label(key: KeyCode) -> String {
    let name = format!("{key:?}");
    for prefix in ["Key", "Digit"] {
        if let Some(rest) = name.strip_prefix(prefix) {
            return rest.to_owned();
        }
    }
    name
}

pub fn instruction_text(config: &CityConfig) -> String {
    format!("Press {} to Rebuild", key_label(config.rebuild_key))
}

fn setup_status_overlay(
    mut commands: Commands,
    config: Res<CityConfig>,
    generator: Res<CityGenerator>,
) {
    let font = TextFont {
        font_size: OVERLAY_FONT_SIZE,
        ..default()
    };

    commands.spawn((
        Text::new(instruction_text(&config)),
        font.clone(),
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));

    commands.spawn((
        Text::new(generator.phase().label()),
        font,
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(40.0),
            left: Val::Px(10.0),
            ..default()
        },
        PhaseText,
    ));
}

fn update_phase_text(
    generator: Res<CityGenerator>,
    mut query: Query<&mut Text, With<PhaseText>>,
) {
    let label = generator.phase().label();
    for mut text in &mut query {
        if text.0 != label {
            **text = label.to_string();
        }
    }
}

fn handle_rebuild_key(
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<CityConfig>,
    generator: Res<CityGenerator>,
    mut events: EventWriter<RebuildCityEvent>,
) {
    if keys.just_pressed(config.rebuild_key) && !generator.is_busy() {
        events.send(RebuildCityEvent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procgen::ProcgenPlugin;
    use crate::world::WorldPlugin;

    #[test]
    fn key_labels_drop_prefixes() {
        assert_eq!(key_label(KeyCode::KeyB), "B");
        assert_eq!(key_label(KeyCode::Digit7), "7");
        assert_eq!(key_label(KeyCode::Space), "Space");
    }

    #[test]
    fn instruction_names_the_rebuild_key() {
        assert_eq!(instruction_text(&CityConfig::default()), "Press B to Rebuild");
        let config = CityConfig {
            rebuild_key: KeyCode::KeyR,
            ..default()
        };
        assert_eq!(instruction_text(&config), "Press R to Rebuild");
    }

    fn phase_line(app: &mut App) -> String {
        let world = app.world_mut();
        let mut query = world.query_filtered::<&Text, With<PhaseText>>();
        query.single(world).0.clone()
    }

    #[test]
    fn phase_line_tracks_generation_progress() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(CityConfig {
            grid_size: 2,
            step_interval: 0.0,
            ..default()
        });
        app.add_plugins((WorldPlugin, ProcgenPlugin));
        app.add_systems(Startup, setup_status_overlay);
        app.add_systems(
            Update,
            update_phase_text
                .after(CityBuilderSet)
                .run_if(resource_changed::<CityGenerator>),
        );

        app.update();
        assert_eq!(phase_line(&mut app), "Phase 1: Generating Buildings");

        let mut seen = vec![phase_line(&mut app)];
        for _ in 0..50 {
            app.update();
            let line = phase_line(&mut app);
            let phase = app.world().resource::<CityGenerator>().phase();
            assert_eq!(line, phase.label());
            if seen.last() != Some(&line) {
                seen.push(line);
            }
        }
        assert_eq!(
            seen,
            vec![
                "Phase 1: Generating Buildings",
                "Phase 2: Clearing Roads",
                "Phase 3: Adjusting Building Heights",
                "Generation Complete!",
            ]
        );
    }

    #[test]
    fn rebuild_key_starts_a_new_run_once_idle() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(CityConfig {
            grid_size: 2,
            step_interval: 0.0,
            ..default()
        });
        app.init_resource::<ButtonInput<KeyCode>>();
        app.add_plugins((WorldPlugin, ProcgenPlugin));
        app.add_systems(Update, handle_rebuild_key);

        for _ in 0..50 {
            app.update();
        }
        assert_eq!(app.world().resource::<CityGenerator>().runs(), 1);
        assert!(!app.world().resource::<CityGenerator>().is_busy());

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyB);
        app.update();
        app.update();
        assert_eq!(app.world().resource::<CityGenerator>().runs(), 2);
    }
}
