use bevy_ecs::prelude::Entity;
use glam::Vec3;
use orbit_playground::config::AnimationConfig;
use orbit_playground::ecs::{AnimationDirector, AnimationRoster, SceneWorld, Transform3D};
use orbit_playground::SimError;

struct Fixture {
    scene: SceneWorld,
    shapes: Vec<Entity>,
    house: Entity,
    lights: [Entity; 2],
}

fn fixture(shape_count: usize) -> Fixture {
    let mut scene = SceneWorld::default();
    let shapes: Vec<Entity> = (0..shape_count)
        .map(|i| scene.spawn_object(Transform3D::from_translation(Vec3::new(i as f32, 1.0, 0.0))))
        .collect();
    let house = scene.spawn_object(Transform3D::default());
    let lights = [
        scene.spawn_object(Transform3D::from_translation(Vec3::new(10.0, 10.0, 10.0))),
        scene.spawn_object(Transform3D::from_translation(Vec3::new(0.0, 30.0, 0.0))),
    ];
    let roster = AnimationRoster { shapes: shapes.clone(), procedural_model: house, orbiting_lights: lights };
    scene.install_director(AnimationDirector::new(roster, &AnimationConfig::default()));
    Fixture { scene, shapes, house, lights }
}

fn transform(scene: &SceneWorld, entity: Entity) -> Transform3D {
    scene.transform(entity).expect("entity has a transform")
}

fn assert_near(actual: f32, expected: f32) {
    assert!((actual - expected).abs() < 1e-5, "expected {expected}, got {actual}");
}

#[test]
fn shapes_spin_by_index_band() {
    let mut fx = fixture(4);
    fx.scene.animate(0.5, 0.1);
    let speeds = [0.5, 0.8, 1.1, 0.5];
    for (i, &entity) in fx.shapes.iter().enumerate() {
        let t = transform(&fx.scene, entity);
        assert_near(t.rotation.x, speeds[i] * 0.1);
        assert_near(t.rotation.y, speeds[i] * 0.1 * 0.7);
        assert_eq!(t.rotation.z, 0.0);
    }
}

#[test]
fn float_offset_is_added_every_tick() {
    let mut fx = fixture(2);
    let elapsed = 1.25;
    fx.scene.animate(elapsed, 0.016);
    fx.scene.animate(elapsed, 0.016);
    let speed = 0.8;
    let step = (elapsed * speed + 1.0).sin() * 0.01;
    let y = transform(&fx.scene, fx.shapes[1]).translation.y;
    assert_near(y, 1.0 + 2.0 * step);
}

#[test]
fn procedural_model_spins_on_yaw_only() {
    let mut fx = fixture(0);
    for _ in 0..10 {
        fx.scene.animate(0.0, 0.1);
    }
    let t = transform(&fx.scene, fx.house);
    assert_near(t.rotation.y, 0.5);
    assert_eq!(t.rotation.x, 0.0);
    assert_eq!(t.translation, Vec3::ZERO);
}

#[test]
fn lights_orbit_as_pure_function_of_elapsed() {
    let mut fx = fixture(0);
    let elapsed = 2.0_f32;
    fx.scene.animate(elapsed, 0.016);
    let a = transform(&fx.scene, fx.lights[0]).translation;
    let b = transform(&fx.scene, fx.lights[1]).translation;
    assert_near(a.x, elapsed.sin() * 20.0);
    assert_near(a.z, elapsed.cos() * 20.0);
    assert_eq!(a.y, 10.0);
    assert_near(b.x, (elapsed * 0.7).sin() * 15.0);
    assert_near(b.z, (elapsed * 0.7).cos() * 15.0);
    assert_eq!(b.y, 30.0);

    // Same elapsed, same placement, however many ticks ran in between.
    fx.scene.animate(0.3, 0.016);
    fx.scene.animate(elapsed, 0.5);
    assert_eq!(transform(&fx.scene, fx.lights[0]).translation, a);
}

#[test]
fn missing_loaded_model_is_skipped() {
    let mut fx = fixture(1);
    assert!(fx.scene.director().loaded_model().is_none());
    fx.scene.animate(1.0, 0.1);
    assert_near(transform(&fx.scene, fx.house).rotation.y, 0.05);
}

#[test]
fn attached_model_spins_after_it_arrives() {
    let mut fx = fixture(1);
    fx.scene.animate(0.1, 0.1);
    let model = fx.scene.spawn_object(Transform3D::default());
    fx.scene.attach_model(model).expect("attach model");
    fx.scene.animate(0.2, 0.1);
    fx.scene.animate(0.3, 0.1);
    assert_near(transform(&fx.scene, model).rotation.y, 0.06);
}

#[test]
fn model_slot_only_accepts_one_model() {
    let mut fx = fixture(0);
    let first = fx.scene.spawn_object(Transform3D::default());
    let second = fx.scene.spawn_object(Transform3D::default());
    fx.scene.attach_model(first).expect("first attach");
    let err = fx.scene.attach_model(second).unwrap_err();
    assert_eq!(err, SimError::ModelSlotOccupied(first.index()));
    assert_eq!(fx.scene.director().loaded_model(), Some(first));
}

#[test]
fn despawned_roster_members_are_tolerated() {
    let mut fx = fixture(3);
    assert!(fx.scene.despawn(fx.shapes[1]));
    let model = fx.scene.spawn_object(Transform3D::default());
    fx.scene.attach_model(model).expect("attach");
    assert!(fx.scene.despawn(model));
    fx.scene.animate(1.0, 0.1);
    assert_near(transform(&fx.scene, fx.shapes[2]).rotation.x, 0.11);
}

#[test]
fn particles_are_not_touched_by_the_director() {
    let mut fx = fixture(2);
    let id = fx.scene.spawn_particle_with(Vec3::ZERO, Vec3::ZERO, glam::Vec4::ONE).expect("spawn");
    fx.scene.animate(3.0, 0.1);
    assert_eq!(transform(&fx.scene, id), Transform3D::default());
}
