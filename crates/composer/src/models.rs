use orbitscene_scene::{
    Geometry, GeometryHandle, Material, MaterialHandle, NodeId, NodeKind, Scene, SceneError,
    SphereGeometry, TorusGeometry,
};
use std::f32::consts::{PI, TAU};

/// Number of rings placed around the circle.
pub const RING_COUNT: usize = 8;

/// Radius of the circle the rings and the small ball sit on.
pub const RING_RADIUS: f32 = 2.0;

/// Handles to the nodes created by [`build_models`].
#[derive(Debug, Clone)]
pub struct ModelSet {
    pub axes: NodeId,
    pub plane: NodeId,
    pub big_ball: NodeId,
    pub ring_pivots: Vec<NodeId>,
    pub rings: Vec<NodeId>,
    pub ring_geometry: GeometryHandle,
    pub ring_material: MaterialHandle,
    /// Left unrotated; a hook for animating the small ball around the circle.
    pub small_ball_pivot: NodeId,
    pub small_ball: NodeId,
}

/// Populate `scene` with the static demo geometry.
pub fn build_models(scene: &mut Scene) -> Result<ModelSet, SceneError> {
    let axes_geometry = scene.add_geometry(Geometry::axes(10.0));
    let axes_material = scene.add_material(Material::line_basic(true));
    let axes = scene.create_node(NodeKind::Lines {
        geometry: axes_geometry,
        material: axes_material,
    })?;
    scene.add(axes)?;

    let plane_geometry = scene.add_geometry(Geometry::plane(5.0, 5.0));
    let plane_material = scene.add_material(Material::phong());
    let plane = scene.create_mesh(plane_geometry, plane_material)?;
    scene.set_name(plane, "plane")?;
    {
        let t = scene.transform_mut(plane)?;
        t.rotate_x(-PI / 2.0);
        t.translate_z(-0.5);
    }
    scene.add(plane)?;

    let big_ball_geometry = scene.add_geometry(Geometry::Sphere(
        SphereGeometry::new(1.0)
            .with_segments(32, 16)
            .with_phi(0.0, TAU)
            .with_theta(0.0, PI / 2.0),
    ));
    let big_ball_material = scene.add_material(Material::phong());
    let big_ball = scene.create_mesh(big_ball_geometry, big_ball_material)?;
    scene.set_name(big_ball, "bigBall")?;
    scene.transform_mut(big_ball)?.translate_y(-0.5);
    scene.add(big_ball)?;

    // One geometry and one material shared by every ring.
    let ring_geometry = scene.add_geometry(Geometry::Torus(TorusGeometry::new(0.3, 0.1)));
    let ring_material = scene.add_material(Material::phong());
    let mut ring_pivots = Vec::with_capacity(RING_COUNT);
    let mut rings = Vec::with_capacity(RING_COUNT);
    for i in 0..RING_COUNT {
        let ring = scene.create_mesh(ring_geometry, ring_material)?;
        let pivot = scene.create_pivot();
        scene.add(pivot)?;

        scene.transform_mut(ring)?.translate_x(RING_RADIUS);
        scene
            .transform_mut(pivot)?
            .rotate_y(TAU / RING_COUNT as f32 * i as f32);

        scene.attach(pivot, ring)?;
        scene.set_name(ring, format!("torus-{i}"))?;
        ring_pivots.push(pivot);
        rings.push(ring);
    }

    let small_ball_geometry = scene.add_geometry(Geometry::Sphere(SphereGeometry::new(0.2)));
    let small_ball_material = scene.add_material(Material::phong());
    let small_ball = scene.create_mesh(small_ball_geometry, small_ball_material)?;
    let small_ball_pivot = scene.create_pivot();
    scene.attach(small_ball_pivot, small_ball)?;
    scene.transform_mut(small_ball)?.translate_x(RING_RADIUS);
    scene.set_name(small_ball, "smallBall")?;
    scene.add(small_ball_pivot)?;

    tracing::debug!(
        nodes = scene.node_count(),
        root_children = scene.root_children().len(),
        "models built"
    );

    Ok(ModelSet {
        axes,
        plane,
        big_ball,
        ring_pivots,
        rings,
        ring_geometry,
        ring_material,
        small_ball_pivot,
        small_ball,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use std::collections::HashSet;

    const EPS: f32 = 1e-5;

    fn built() -> (Scene, ModelSet) {
        let mut scene = Scene::new();
        let models = build_models(&mut scene).unwrap();
        (scene, models)
    }

    #[test]
    fn root_has_twelve_children() {
        let (scene, models) = built();
        assert_eq!(scene.root_children().len(), 12);
        assert!(scene.root_children().contains(&models.axes));
        assert!(scene.root_children().contains(&models.small_ball_pivot));
        for pivot in &models.ring_pivots {
            assert_eq!(scene.node(*pivot).unwrap().children().len(), 1);
        }
        assert_eq!(
            scene.node(models.small_ball_pivot).unwrap().children(),
            &[models.small_ball]
        );
    }

    #[test]
    fn ring_pivots_step_by_45_degrees() {
        let (scene, models) = built();
        for (i, pivot) in models.ring_pivots.iter().enumerate() {
            let rotation = scene.node(*pivot).unwrap().transform.rotation;
            let expected = Quat::from_rotation_y((45.0 * i as f32).to_radians());
            assert!(rotation.abs_diff_eq(expected, EPS), "pivot {i}");
        }
    }

    #[test]
    fn rings_sit_on_circle_at_pivot_angle() {
        let (scene, models) = built();
        let mut angles = Vec::new();
        for ring in &models.rings {
            let p = scene.world_position(*ring).unwrap();
            assert!((p.length() - RING_RADIUS).abs() < EPS);
            assert!(p.y.abs() < EPS);
            // Rotation about +Y carries +X towards -Z.
            let deg = (-p.z).atan2(p.x).to_degrees().rem_euclid(360.0);
            angles.push(deg);
        }
        for (i, deg) in angles.iter().enumerate() {
            let expected = 45.0 * i as f32;
            let diff = (deg - expected).rem_euclid(360.0);
            assert!(diff < 1e-3 || diff > 360.0 - 1e-3, "ring {i} at {deg}");
        }
    }

    #[test]
    fn rings_share_geometry_and_material() {
        let (scene, models) = built();
        for ring in &models.rings {
            assert_eq!(
                scene.node(*ring).unwrap().kind,
                NodeKind::Mesh {
                    geometry: models.ring_geometry,
                    material: models.ring_material,
                }
            );
        }
    }

    #[test]
    fn plane_lies_flat_below_origin() {
        let (scene, models) = built();
        let world = scene.world_matrix(models.plane).unwrap();
        assert!(world
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::new(0.0, -0.5, 0.0), EPS));
        let normal = world.transform_vector3(Vec3::Z);
        assert!(normal.abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn big_ball_is_upper_hemisphere_shifted_down() {
        let (scene, models) = built();
        let world = scene.world_matrix(models.big_ball).unwrap();
        let NodeKind::Mesh { geometry, .. } = scene.node(models.big_ball).unwrap().kind else {
            panic!("big ball should be a mesh");
        };
        let Some(Geometry::Sphere(sphere)) = scene.geometry(geometry) else {
            panic!("big ball should be a sphere");
        };
        assert_eq!(sphere.phi_length, TAU);
        assert_eq!(sphere.theta_length, PI / 2.0);

        let apex = world.transform_point3(sphere.sample(0.0, 0.0));
        let equator = world.transform_point3(sphere.sample(0.5, 1.0));
        assert!((apex.y - 0.5).abs() < EPS);
        assert!((equator.y + 0.5).abs() < EPS);
        assert!(apex.y > equator.y);
    }

    #[test]
    fn small_ball_pivot_is_unrotated() {
        let (scene, models) = built();
        let pivot = scene.node(models.small_ball_pivot).unwrap();
        assert_eq!(pivot.transform.rotation, Quat::IDENTITY);
        let p = scene.world_position(models.small_ball).unwrap();
        assert!(p.abs_diff_eq(Vec3::new(RING_RADIUS, 0.0, 0.0), EPS));
    }

    #[test]
    fn mesh_names_are_unique() {
        let (scene, _) = built();
        let names = scene.names();
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), 11);
        assert_eq!(unique.len(), 11);
        for name in ["plane", "bigBall", "smallBall"] {
            assert!(unique.contains(name));
        }
        for i in 0..RING_COUNT {
            assert!(unique.contains(format!("torus-{i}").as_str()));
        }
    }

    #[test]
    fn every_surface_mesh_uses_lit_material() {
        let (scene, _) = built();
        for d in scene.drawables() {
            let material = scene.material(d.material).unwrap();
            match d.kind {
                NodeKind::Mesh { .. } => assert!(material.is_lit()),
                NodeKind::Lines { .. } => assert!(!material.is_lit()),
                NodeKind::Empty => unreachable!(),
            }
        }
        assert_eq!(scene.drawables().len(), 1 + 1 + 1 + RING_COUNT + 1);
    }
}
