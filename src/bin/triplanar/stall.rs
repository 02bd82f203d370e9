//! The bathroom stall assembly, built from primitives.
//!
//! Dimensions and placements are in scene units with Y up; the stall door
//! faces -Z at z = 9.1 and the back wall sits behind it at z = -3.7.

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::{Matrix4, Vector3};

use triplanar::algo::parameterize::{reset_uvs, PlanarOptions};
use triplanar::algo::Progress;
use triplanar::error::Result;
use triplanar::geometry::primitives::{box_geometry, cylinder_geometry, plane_geometry};
use triplanar::geometry::{Geometry, InstancedGeometry};

/// One named piece of the scene: a shared geometry and its placements.
#[derive(Debug)]
pub struct Part {
    pub name: String,
    pub instances: InstancedGeometry,
    /// Whether the part gets world-scale planar UVs.
    pub reproject: bool,
}

/// Owns every geometry of the stall until it is exported.
#[derive(Debug, Default)]
pub struct StallScene {
    parts: Vec<Part>,
}

fn translation(x: f64, y: f64, z: f64) -> Matrix4<f64> {
    Matrix4::new_translation(&Vector3::new(x, y, z))
}

/// Row-major affine matrix with the given linear part and translation.
#[rustfmt::skip]
fn affine(linear: [[f64; 3]; 3], t: [f64; 3]) -> Matrix4<f64> {
    Matrix4::new(
        linear[0][0], linear[0][1], linear[0][2], t[0],
        linear[1][0], linear[1][1], linear[1][2], t[1],
        linear[2][0], linear[2][1], linear[2][2], t[2],
        0.0,          0.0,          0.0,          1.0,
    )
}

impl StallScene {
    /// Build the full stall: walls, door, metal fittings, wall text and floor.
    pub fn build() -> Result<Self> {
        let mut scene = StallScene::default();

        scene.add(
            "bg_wall",
            box_geometry(17.0, 15.0, 2.0)?,
            vec![translation(0.0, 6.4, -3.7)],
            true,
        );

        // Side walls turned a quarter turn about Y.
        let quarter_turn = [[0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]];
        scene.add(
            "stall_walls",
            box_geometry(13.0, 12.0, 0.3)?,
            vec![
                affine(quarter_turn, [-4.3, 7.5, 2.5]),
                affine(quarter_turn, [4.3, 7.5, 2.5]),
            ],
            true,
        );
        scene.add(
            "stall_pillars",
            box_geometry(2.0, 14.7, 0.3)?,
            vec![translation(-3.7, 6.15, 9.1), translation(3.7, 6.15, 9.1)],
            true,
        );
        scene.add(
            "stall_door",
            box_geometry(5.3, 11.0, 0.3)?,
            vec![translation(0.0, 6.5, 9.1)],
            true,
        );

        scene.add(
            "stall_top_bar",
            box_geometry(9.75, 0.35, 0.3)?,
            vec![translation(0.0, 13.67, 9.1)],
            false,
        );
        scene.add(
            "stall_pillar_caps",
            box_geometry(2.05, 0.55, 0.35)?,
            vec![translation(-3.7, -0.85, 9.1), translation(3.7, -0.85, 9.1)],
            false,
        );
        scene.add(
            "hinges",
            cylinder_geometry(0.07, 0.07, 0.5, 16)?,
            [10.5, 9.95, 3.5, 2.95]
                .iter()
                .map(|&y| translation(2.65, y, 8.9))
                .collect(),
            false,
        );
        scene.add(
            "hinge_attachments",
            box_geometry(0.2, 0.5, 0.03)?,
            vec![
                translation(2.75, 10.5, 8.93),
                translation(2.55, 9.95, 8.93),
                translation(2.75, 3.5, 8.93),
                translation(2.55, 2.95, 8.93),
            ],
            false,
        );

        // Lock discs lie in the door plane; the whole group is offset by (0, 5, 5).
        let upright = [[1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]];
        let lock_offset = translation(0.0, 5.0, 5.0);
        scene.add(
            "door_locks",
            cylinder_geometry(0.15, 0.15, 0.05, 16)?,
            vec![
                lock_offset * affine(upright, [-2.25, 1.75, 3.95]),
                lock_offset * affine(upright, [-2.25, 1.75, 4.25]),
            ],
            false,
        );

        // Text panels just inside the side walls and the door, facing the viewer.
        let panels = [
            ("text_1", 11.0 / 5.0, FRAC_PI_2, [-4.13, 8.5, 2.5]),
            ("text_2", 8.0 / 5.0, PI, [0.0, 7.0, 8.9]),
            ("text_3", 11.0 / 5.0, -FRAC_PI_2, [4.13, 8.0, 3.0]),
        ];
        for (name, scale, angle, [x, y, z]) in panels {
            let placement = translation(x, y, z)
                * Matrix4::new_rotation(Vector3::y() * angle)
                * Matrix4::new_scaling(scale);
            scene.add(name, plane_geometry(5.0, 5.0)?, vec![placement], false);
        }

        scene.add(
            "floor",
            plane_geometry(50.0, 50.0)?,
            vec![translation(0.0, -1.1, 0.0) * Matrix4::new_rotation(Vector3::x() * FRAC_PI_2)],
            false,
        );

        log::debug!("built stall scene with {} parts", scene.parts.len());
        Ok(scene)
    }

    fn add(
        &mut self,
        name: &str,
        geometry: Geometry,
        transforms: Vec<Matrix4<f64>>,
        reproject: bool,
    ) {
        self.parts.push(Part {
            name: name.to_string(),
            instances: InstancedGeometry::with_transforms(geometry.with_name(name), transforms),
            reproject,
        });
    }

    /// Place loaded fixture geometries (e.g. the toilet) under one transform.
    pub fn add_fixture(&mut self, name: &str, geometries: Vec<Geometry>, transform: Matrix4<f64>) {
        for (i, geometry) in geometries.into_iter().enumerate() {
            let part_name = match geometry.name() {
                Some(own) => format!("{}.{}", name, own),
                None => format!("{}.{}", name, i),
            };
            self.add(&part_name, geometry, vec![transform], false);
        }
    }

    /// All parts in build order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Look up a part by name.
    pub fn part(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// Reproject UVs of the parts flagged for it.
    ///
    /// Instanced parts are projected once in local space, so every instance
    /// shares the same UVs.
    pub fn reproject(&mut self, options: &PlanarOptions, progress: &Progress) -> Result<()> {
        let total = self.parts.iter().filter(|p| p.reproject).count();
        let mut done = 0;
        for part in self.parts.iter_mut().filter(|p| p.reproject) {
            reset_uvs(part.instances.geometry_mut(), options)?;
            done += 1;
            progress.report(done, total, &format!("Projecting {}", part.name));
        }
        Ok(())
    }

    /// Bake every part into world space, one geometry per part.
    pub fn bake(&self) -> Result<Vec<Geometry>> {
        self.parts.iter().map(|part| part.instances.bake()).collect()
    }
}
