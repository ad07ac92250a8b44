//! End-to-end tests through the public API: scenes, emitters, fields and
//! a recording renderer.

use flurry::prelude::*;
use flurry::renderer::RenderLog;
use flurry::{DrawCommand, MapObject, VectorGrid};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn recorded(emitter: &mut Emitter) -> Rc<RefCell<RenderLog>> {
    let renderer = RecordingRenderer::new().with_draw_target();
    let log = renderer.log();
    emitter.set_renderer(Box::new(renderer)).unwrap();
    log
}

fn frame_bound_scene() -> Scene {
    Scene::new(SceneConfig::default().with_size(200.0, 100.0).with_frame_bound(true).with_fps(60.0))
}

#[test]
fn test_half_particle_per_frame_spawns_one_in_two_ticks() {
    let mut scene = frame_bound_scene();
    scene
        .add_emitter(Emitter::new(EmitterConfig::default().with_birth_rate(30.0).with_seed(1)))
        .unwrap();

    scene.render(0.0);
    scene.render(16.67);
    assert_eq!(scene.emitters()[0].total_spawned(), 1);

    for i in 2..60 {
        scene.render(i as f64 * 16.67);
    }
    assert_eq!(scene.emitters()[0].total_spawned(), 30);
}

fn capped_ids(reverse: bool) -> Vec<u32> {
    let mut emitter = Emitter::new(
        EmitterConfig::default()
            .with_position(100.0, 50.0)
            .with_velocity(0.0)
            .with_max_particles(5)
            .with_reverse_render_order(reverse)
            .with_render_hooks(false, true)
            .with_seed(2),
    );
    emitter.init(SurfaceSize::new(200.0, 100.0)).unwrap();
    let log = recorded(&mut emitter);

    emitter.generate_particles(0.0, 10);
    emitter.render_particles(16.0, 1.0);
    assert_eq!(emitter.count(), 5);

    let log = log.borrow();
    assert_eq!(log.post_stats[0], flurry::FrameStats { count: 5, total: 10 });
    log.last_frame().iter().map(|p| p.id).collect()
}

#[test]
fn test_cap_renders_oldest_in_normal_order() {
    assert_eq!(capped_ids(false), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_cap_renders_newest_in_reverse_order() {
    assert_eq!(capped_ids(true), vec![10, 9, 8, 7, 6]);
}

#[test]
fn test_dead_particles_do_not_use_cap_slots() {
    let mut emitter = Emitter::new(
        EmitterConfig::default()
            .with_velocity(0.0)
            .with_max_particles(3)
            .with_render_hooks(false, true)
            .with_seed(3),
    );
    emitter.init(SurfaceSize::new(100.0, 100.0)).unwrap();
    let log = recorded(&mut emitter);

    emitter.generate_particles(0.0, 6);
    for p in &mut emitter.particles_mut()[..2] {
        p.kill();
    }
    emitter.render_particles(16.0, 1.0);

    let ids: Vec<u32> = log.borrow().last_frame().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![3, 4, 5]);
}

#[test]
fn test_reflector_bounces_once_per_crossing() {
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    let floor = Rc::new(RefCell::new(
        Reflector::new(0.0, 50.0, 200.0, 50.0)
            .with_radius(4.0)
            .with_callback(move |_| counter.set(counter.get() + 1)),
    ));

    // falling straight down at 2 px per frame
    let mut emitter = Emitter::new(
        EmitterConfig::default()
            .with_position(100.0, 40.0)
            .with_spread(0.0, 90.0)
            .with_velocity(200.0)
            .with_seed(4),
    );
    emitter.init(SurfaceSize::new(200.0, 100.0)).unwrap();
    emitter.add_field(floor.clone());
    emitter.generate_particles(0.0, 1);

    for frame in 1..30 {
        emitter.render_particles(frame as f64, 1.0);
    }

    assert_eq!(hits.get(), 1);
    let p = &emitter.particles()[0];
    assert!(p.velocity.y < 0.0);
    assert!(p.position.y < 40.0);
}

#[test]
fn test_reflector_ignores_particle_lingering_inside() {
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    let floor = shared(
        Reflector::new(0.0, 50.0, 200.0, 50.0)
            .with_radius(4.0)
            .with_callback(move |_| counter.set(counter.get() + 1)),
    );

    // sliding along the line, never leaving the hit region
    let mut emitter = Emitter::new(
        EmitterConfig::default()
            .with_position(10.0, 50.0)
            .with_spread(0.0, 0.0)
            .with_velocity(200.0)
            .with_seed(5),
    );
    emitter.init(SurfaceSize::new(200.0, 100.0)).unwrap();
    emitter.add_field(floor);
    emitter.generate_particles(0.0, 1);

    for frame in 1..20 {
        emitter.render_particles(frame as f64, 1.0);
    }
    assert_eq!(hits.get(), 1);
    assert!(emitter.particles()[0].is_hit);
}

#[test]
fn test_collector_kills_and_compaction_drops() {
    let caught = Rc::new(Cell::new(0));
    let counter = Rc::clone(&caught);

    let mut scene = frame_bound_scene();
    let mut emitter = Emitter::new(
        EmitterConfig::default()
            .with_position(100.0, 20.0)
            .with_spread(0.0, 90.0)
            .with_velocity(400.0)
            .with_birth_rate(60.0)
            .with_seed(6),
    );
    emitter.add_field(shared(
        Collector::new(0.0, 60.0, 200.0, 60.0)
            .with_radius(8.0)
            .with_callback(move |_| counter.set(counter.get() + 1)),
    ));
    let i = scene.add_emitter(emitter).unwrap();

    let mut now = 0.0;
    for _ in 0..30 {
        scene.render(now);
        now += 16.67;
    }
    let e = scene.emitter(i).unwrap();
    assert!(caught.get() > 0);
    let dead = e.particles().iter().filter(|p| !p.is_active()).count();
    assert!(dead > 0);

    // first compaction is due after one second
    for _ in 0..40 {
        scene.render(now);
        now += 16.67;
    }
    let e = scene.emitter(i).unwrap();
    assert!(e.particles().len() < e.total_spawned() as usize);
}

#[test]
fn test_bounds_particles_die_when_leaving_surface() {
    let mut emitter = Emitter::new(
        EmitterConfig::default()
            .with_life(0.0)
            .with_position(190.0, 50.0)
            .with_spread(0.0, 0.0)
            .with_velocity(400.0)
            .with_seed(7),
    );
    emitter.init(SurfaceSize::new(200.0, 100.0)).unwrap();
    emitter.generate_particles(0.0, 1);

    emitter.render_particles(1.0, 1.0); // 190 -> 194
    emitter.render_particles(2.0, 1.0); // 194 -> 198
    emitter.render_particles(3.0, 1.0); // 198 -> 202
    assert!(emitter.particles()[0].is_active());
    emitter.render_particles(4.0, 1.0);
    assert!(!emitter.particles()[0].is_active());
    assert_eq!(emitter.count(), 0);
    // life never advances for bounds particles
    assert_eq!(emitter.particles()[0].life_index(), 0.0);
}

#[test]
fn test_pause_preserves_remaining_life() {
    let mut scene = Scene::new(SceneConfig::default().with_size(100.0, 100.0));
    let mut emitter = Emitter::new(EmitterConfig::default().with_life(1.0).with_birth_rate(0.0).with_seed(8));
    emitter.init(SurfaceSize::new(100.0, 100.0)).unwrap();
    emitter.generate_particles(0.0, 1);
    scene.add_emitter(emitter).unwrap();

    scene.render(500.0);
    let before = scene.emitters()[0].particles()[0].life_index();

    scene.pause(500.0);
    scene.render(5000.0);
    scene.play(5000.0);
    scene.render(5000.0);

    let p = &scene.emitters()[0].particles()[0];
    assert!(p.is_active());
    assert!(p.life_index() < before + 0.01);
}

#[test]
fn test_vector_grid_survives_json_round_trip() {
    let mut grid = VectorGrid::new(120.0, 80.0, 6, 4);
    for (x, y) in grid.cells() {
        grid.set_vector_at_cell(x, y, Vector::new(x as f64 * 0.25, -(y as f64) / 3.0));
    }

    let json = grid.map_object().to_json().unwrap();
    let restored = VectorGrid::from_map_object(MapObject::from_json(&json).unwrap()).unwrap();
    assert_eq!(restored, grid);

    let mut target = VectorGrid::new(10.0, 10.0, 1, 1);
    target.set_map_object(grid.map_object()).unwrap();
    assert_eq!(target.vectors(), grid.vectors());
    assert_eq!((target.cells_x(), target.cells_y()), (6, 4));
}

#[test]
fn test_scale_one_leaves_scene_untouched() {
    let mut scene = frame_bound_scene();
    let vortex = Rc::new(RefCell::new(Vortex::new(100.0, 50.0).with_force(0.5).with_cells(8, 8).with_seed(9)));
    let mut emitter = Emitter::new(
        EmitterConfig::default()
            .with_position(100.0, 50.0)
            .with_box_radius(30.0)
            .with_birth_rate(600.0)
            .with_seed(10),
    );
    emitter.add_field(vortex.clone());
    emitter.add_field(shared(Gravity::new(0.0, 0.1)));
    scene.add_emitter(emitter).unwrap();
    scene.render(0.0);
    scene.render(16.0);

    let snapshot = |scene: &Scene| {
        scene.emitters()[0]
            .particles()
            .iter()
            .map(|p| (p.position, p.previous, p.velocity, p.base_size))
            .collect::<Vec<_>>()
    };
    let particles = snapshot(&scene);
    let grid = vortex.borrow().grid().cloned();
    let settings = vortex.borrow().settings();

    scene.scale(1.0);

    assert_eq!(snapshot(&scene), particles);
    assert_eq!(vortex.borrow().grid().cloned(), grid);
    assert_eq!(vortex.borrow().settings(), settings);
    assert_eq!(scene.emitters()[0].box_radius(), 30.0);
}

#[test]
fn test_shared_field_mutation_reaches_all_emitters() {
    let gravity = Rc::new(RefCell::new(Gravity::new(0.0, 1.0)));
    let mut scene = frame_bound_scene();
    for seed in [11, 12] {
        let mut e = Emitter::new(
            EmitterConfig::default()
                .with_position(100.0, 10.0)
                .with_velocity(0.0)
                .with_birth_rate(0.0)
                .with_seed(seed),
        );
        e.add_field(gravity.clone());
        let i = scene.add_emitter(e).unwrap();
        scene.emitter_mut(i).unwrap().generate_particles(0.0, 1);
    }

    gravity.borrow_mut().set_xy(0.0, 2.0);
    scene.render(0.0);
    for e in scene.emitters() {
        assert_eq!(e.particles()[0].velocity, Vector::new(0.0, 2.0));
    }
}

#[test]
fn test_debug_draws_every_field() {
    let mut emitter = Emitter::new(EmitterConfig::default().with_seed(13));
    emitter.init(SurfaceSize::new(200.0, 100.0)).unwrap();
    let log = recorded(&mut emitter);
    emitter.add_field(shared(Vortex::new(50.0, 50.0).with_radius(20.0)));
    emitter.add_field(shared(Collector::new(0.0, 90.0, 200.0, 90.0)));
    emitter.set_debug(true).unwrap();

    emitter.render_particles(0.0, 1.0);
    emitter.render_particles(16.0, 1.0);

    let log = log.borrow();
    let commands = log.debug.commands();
    assert!(commands.contains(&DrawCommand::Circle { x: 50.0, y: 50.0, radius: 20.0 }));
    assert!(commands.contains(&DrawCommand::LineTo { x: 200.0, y: 90.0 }));
    // reset each frame: one circle, not two
    let circles = commands.iter().filter(|c| matches!(c, DrawCommand::Circle { .. })).count();
    assert_eq!(circles, 1);
}

#[test]
fn test_emitter_from_json_spawns_on_a_grid() {
    let mut emitter = Emitter::from_json(
        r#"{
            "type": "grid", "x": 10, "y": 20,
            "gridWidth": 40, "gridHeight": 40, "cellsX": 4, "cellsY": 4,
            "velocity": 0, "seed": 14
        }"#,
    )
    .unwrap();
    emitter.init(SurfaceSize::new(100.0, 100.0)).unwrap();
    emitter.generate_particles(0.0, 50);

    for p in emitter.particles() {
        let cx = (p.position.x - 10.0) / 10.0;
        let cy = (p.position.y - 20.0) / 10.0;
        assert_eq!(cx.fract(), 0.0);
        assert_eq!(cy.fract(), 0.0);
        assert!((0.0..4.0).contains(&cx) && (0.0..4.0).contains(&cy));
    }

    assert!(Emitter::from_json(r#"{"type": "ring"}"#).is_err());
}
