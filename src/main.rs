//! Headless render driver: builds a default Cornell-box scene, runs a
//! bounded number of accumulation frames, and writes the result to disk.
//!
//! A concrete interactive windowing backend is out of scope for this crate;
//! this binary exercises [`irradiance::engine::Engine`] through a trivial
//! [`irradiance::engine::Presenter`] that just remembers the last presented
//! frame, then saves it once sample accumulation settles.

use irradiance::camera::Camera;
use irradiance::cli::parse_args;
use irradiance::engine::{Engine, InputState, Presenter};
use irradiance::material::PBRMaterial;
use irradiance::math::{Color, Point3, Vec3};
use irradiance::mesh::{Mesh, MeshInstance};
use irradiance::primitive::{Object, Quadrilateral, Sphere};
use irradiance::scene::Scene;

const SETTLE_FRAMES: u32 = 32;

struct FileWriter {
    pub last_frame: Vec<u8>,
}

impl Presenter for FileWriter {
    fn present(&mut self, _width: u32, _height: u32, rgb: &[u8]) {
        self.last_frame = rgb.to_vec();
    }
}

fn main() {
    env_logger::init();

    let config = parse_args(std::env::args().skip(1));
    log::info!(
        "rendering {}x{} at {} bounces for {} frames",
        config.width,
        config.height,
        config.max_bounces,
        SETTLE_FRAMES
    );

    let aspect_ratio = config.width as f32 / config.height as f32;
    let mut camera = Camera::new(Point3::new(0.0, 1.0, -4.0), std::f32::consts::FRAC_PI_2, 0.0, config.fov_degrees, aspect_ratio);
    camera.aperture_radius = config.aperture_radius;
    camera.focal_distance = config.focal_distance;

    let scene = cornell_box();
    let mut engine = Engine::new(config.clone(), camera, scene);
    let mut presenter = FileWriter { last_frame: Vec::new() };

    for frame in 0..SETTLE_FRAMES {
        let input = if frame == 0 { InputState::default() } else { InputState { request_screenshot: frame == SETTLE_FRAMES - 1, ..Default::default() } };
        engine.step(&input, None, &mut presenter);
    }

    let output_path = config.output_path.unwrap_or_else(|| "irradiance_output.png".to_string());
    match image::save_buffer(
        &output_path,
        &presenter.last_frame,
        config.width,
        config.height,
        image::ColorType::Rgb8,
    ) {
        Ok(()) => log::info!("wrote {output_path}"),
        Err(err) => log::error!("failed to write {output_path}: {err}"),
    }
}

/// The classic Cornell box: five enclosing walls, a red left wall, a green
/// right wall, an overhead area light, and two reflective/refractive
/// spheres standing in for the usual pair of boxes.
fn cornell_box() -> Scene {
    let white = PBRMaterial { albedo: Color::splat(0.73), ..Default::default() };
    let red = PBRMaterial { albedo: Color::new(0.65, 0.05, 0.05), ..Default::default() };
    let green = PBRMaterial { albedo: Color::new(0.12, 0.45, 0.15), ..Default::default() };
    let light = PBRMaterial { emission: Color::splat(15.0), ..Default::default() };

    let objects = vec![
        // Floor.
        Object::Quadrilateral(Quadrilateral::new(
            Point3::new(-2.0, 0.0, -2.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 4.0),
            white.clone(),
        )),
        // Ceiling.
        Object::Quadrilateral(Quadrilateral::new(
            Point3::new(-2.0, 4.0, -2.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 4.0),
            white.clone(),
        )),
        // Back wall.
        Object::Quadrilateral(Quadrilateral::new(
            Point3::new(-2.0, 0.0, 2.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(0.0, 4.0, 0.0),
            white,
        )),
        // Left wall (red).
        Object::Quadrilateral(Quadrilateral::new(
            Point3::new(-2.0, 0.0, -2.0),
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::new(0.0, 4.0, 0.0),
            red,
        )),
        // Right wall (green).
        Object::Quadrilateral(Quadrilateral::new(
            Point3::new(2.0, 0.0, -2.0),
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::new(0.0, 4.0, 0.0),
            green,
        )),
        // Overhead area light.
        Object::Quadrilateral(Quadrilateral::new(
            Point3::new(-0.5, 3.99, -0.5),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            light,
        )),
        // A mirrored sphere standing in for the usual tall box.
        Object::Sphere(Sphere::new(
            Point3::new(-0.8, 0.8, 0.6),
            0.8,
            PBRMaterial { metallicity: 1.0, roughness: 0.05, albedo: Color::splat(0.9), ..Default::default() },
        )),
        // A glass sphere standing in for the usual short box.
        Object::Sphere(Sphere::new(
            Point3::new(0.8, 0.5, -0.6),
            0.5,
            PBRMaterial {
                transmission: 1.0,
                refraction_index: 1.5,
                roughness: 0.0,
                albedo: Color::splat(0.95),
                ..Default::default()
            },
        )),
    ];

    let mesh = Mesh::new(objects);
    let instance = MeshInstance::new(0, irradiance::math::Mat4::identity(), &mesh);
    Scene::new(vec![mesh], vec![instance])
}
