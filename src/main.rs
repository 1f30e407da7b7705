//! Demo: procedural color swirls through a tint and a bloom pass.

use glint::*;

fn main() {
    env_logger::init();

    run(
        AppConfig::new().title("Glint — color swirls").size(1280, 720),
        |ctx| {
            let swirl = ctx.scene_pass(include_str!("shaders/swirl.wgsl"));
            let tint = ctx.tint();
            let bloom = ctx.bloom();

            {
                let root = ctx.root();
                let pivot = root.add_child(SceneNode::group("pivot"));
                pivot.add_child(SceneNode::new(NodeKind::Mesh).named("swirl"));
                root.add_child(SceneNode::new(NodeKind::Light).named("key"));
            }

            ctx.load("assets/palette.png");
            ctx.on_loaded(|report| {
                if !report.is_success() {
                    log::warn!("continuing without: {:?}", report.failed_descriptors);
                }
            });
            let gate = ctx.gate();

            let mut dumped = false;
            move |tick| {
                if !gate.is_ready() {
                    return;
                }
                if !dumped {
                    dumped = true;
                    for line in dump(&*tick.scene) {
                        log::info!("{}", line);
                    }
                }

                // The first delta spans from startup; don't integrate it.
                let dt = tick.dt.min(0.1);

                if let Some(pivot) = tick.scene.find_mut("pivot") {
                    pivot.transform.rotation *= Quat::from_rotation_z(dt * 0.3);
                    swirl.borrow_mut().focus = pivot.transform.matrix();
                }
                tint.borrow_mut().color = [
                    1.0,
                    0.9 + 0.1 * (tick.time * 0.6).sin(),
                    0.85 + 0.15 * (tick.time * 0.4).cos(),
                ];
                bloom.borrow_mut().strength = 1.5 + 0.5 * (tick.time * 0.7).sin();
            }
        },
    );
}
