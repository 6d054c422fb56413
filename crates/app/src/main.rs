//! Application entry point and event loop.

mod controller;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use ash::vk;
use raw_window_handle::HasDisplayHandle;
use winit::application::ApplicationHandler;
use winit::event::{KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::WindowId;

use lantern_core::Timer;
use lantern_platform::{required_surface_extensions, InputState, Surface, Window};
use lantern_render::{
    FrameInfo, GlobalUbo, MeshRenderSystem, PointLightSystem, Renderer,
};
use lantern_resources::{MeshData, Model};
use lantern_rhi::{
    select_physical_device, Buffer, CommandPool, DescriptorPool, DescriptorSetLayout, Device,
    Instance, MAX_FRAMES_IN_FLIGHT,
};
use lantern_scene::{Camera, GameObject, ObjectMap, Transform};

use controller::CameraController;

const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;
const WINDOW_TITLE: &str = "lantern";

fn shader_dir() -> PathBuf {
    std::env::var_os("LANTERN_SHADER_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("shaders/spirv"))
}

/// Everything that exists once a window is available.
///
/// Field order is teardown order: scene and renderer resources go before
/// the device, the surface before the instance.
struct Engine {
    mesh_system: MeshRenderSystem,
    light_system: PointLightSystem,
    ubo_buffers: Vec<Buffer>,
    global_sets: Vec<vk::DescriptorSet>,
    // Kept alive for the descriptor sets allocated from them.
    _descriptor_pool: DescriptorPool,
    _global_set_layout: DescriptorSetLayout,
    objects: ObjectMap,
    renderer: Renderer,
    device: Arc<Device>,
    surface: Surface,
    instance: Instance,
    window: Window,

    camera: Camera,
    viewer: Transform,
    controller: CameraController,
    input: InputState,
    timer: Timer,
}

impl Engine {
    fn new(event_loop: &ActiveEventLoop) -> Result<Self> {
        let window = Window::new(event_loop, WINDOW_WIDTH, WINDOW_HEIGHT, WINDOW_TITLE)?;

        let display_handle = event_loop
            .display_handle()
            .context("no display handle")?;
        let extensions = required_surface_extensions(display_handle.as_raw())?;
        let instance = Instance::new(WINDOW_TITLE, &extensions)?;

        let surface = window.create_surface(instance.entry(), instance.handle())?;

        let (physical_device, queue_families) =
            select_physical_device(instance.handle(), surface.loader(), surface.handle())?;
        let device = Arc::new(Device::new(
            instance.handle(),
            physical_device,
            queue_families,
        )?);

        let renderer = Renderer::new(&instance, device.clone(), &window, &surface)?;

        let global_set_layout = DescriptorSetLayout::uniform(device.clone())?;
        let descriptor_pool =
            DescriptorPool::uniform(device.clone(), MAX_FRAMES_IN_FLIGHT as u32)?;

        let mut ubo_buffers = Vec::with_capacity(MAX_FRAMES_IN_FLIGHT);
        for _ in 0..MAX_FRAMES_IN_FLIGHT {
            ubo_buffers.push(Buffer::uniform::<GlobalUbo>(device.clone(), "global ubo")?);
        }

        let layouts = vec![global_set_layout.handle(); MAX_FRAMES_IN_FLIGHT];
        let global_sets = descriptor_pool.allocate(&layouts)?;
        for (set, buffer) in global_sets.iter().zip(&ubo_buffers) {
            descriptor_pool.write_uniform(*set, buffer);
        }

        let shader_dir = shader_dir();
        let mesh_system = MeshRenderSystem::new(
            device.clone(),
            renderer.render_pass(),
            global_set_layout.handle(),
            &shader_dir,
        )?;
        let light_system = PointLightSystem::new(
            device.clone(),
            renderer.render_pass(),
            global_set_layout.handle(),
            &shader_dir,
        )?;

        let objects = build_scene(device.clone())?;

        let mut viewer = Transform::default();
        viewer.translation.z = -2.5;

        Ok(Self {
            mesh_system,
            light_system,
            ubo_buffers,
            global_sets,
            _descriptor_pool: descriptor_pool,
            _global_set_layout: global_set_layout,
            objects,
            renderer,
            device,
            surface,
            instance,
            window,
            camera: Camera::new(),
            viewer,
            controller: CameraController,
            input: InputState::new(),
            timer: Timer::new(),
        })
    }

    fn draw(&mut self) -> Result<()> {
        let dt = self.timer.delta_secs();

        self.controller.update(&self.input, dt, &mut self.viewer);
        self.camera.set_view_yxz(self.viewer.translation, self.viewer.rotation);
        self.camera.set_perspective(
            50f32.to_radians(),
            self.renderer.aspect_ratio(),
            0.1,
            100.0,
        );

        let Some(command_buffer) =
            self.renderer
                .begin_frame(&self.window, &self.instance, &self.surface)?
        else {
            // Swapchain was stale; skip this frame.
            return Ok(());
        };

        let frame_index = self.renderer.frame_index();
        let mut frame_info = FrameInfo {
            frame_index,
            frame_time: dt,
            command_buffer,
            camera: &self.camera,
            global_descriptor_set: self.global_sets[frame_index],
            game_objects: &mut self.objects,
        };

        let mut ubo = GlobalUbo {
            projection: self.camera.projection(),
            view: self.camera.view(),
            inverse_view: self.camera.inverse_view(),
            ..Default::default()
        };
        self.light_system.update(&mut frame_info, &mut ubo);
        self.ubo_buffers[frame_index].write(&[ubo])?;

        self.renderer.begin_render_pass(command_buffer);
        self.mesh_system.render(&mut frame_info);
        self.light_system.render(&mut frame_info);
        self.renderer.end_render_pass(command_buffer);

        self.renderer
            .end_frame(&self.window, &self.instance, &self.surface)?;
        Ok(())
    }
}

fn build_scene(device: Arc<Device>) -> Result<ObjectMap> {
    // Dedicated pool for the staging uploads; dropped once the scene is
    // built.
    let upload_pool = CommandPool::new(device.clone())?;
    let cube = Arc::new(Model::new(device, &upload_pool, &MeshData::cube())?);

    let mut objects = ObjectMap::new();

    let mut center = GameObject::new();
    center.model = Some(cube.clone());
    center.transform.translation = glam::vec3(0.0, 0.0, 0.0);
    center.transform.scale = glam::Vec3::splat(0.5);
    objects.insert(center.id(), center);

    let mut floor = GameObject::new();
    floor.model = Some(cube);
    floor.transform.translation = glam::vec3(0.0, 0.6, 0.0);
    floor.transform.scale = glam::vec3(3.0, 0.05, 3.0);
    objects.insert(floor.id(), floor);

    let light_colors = [
        glam::vec3(1.0, 0.2, 0.2),
        glam::vec3(0.2, 0.2, 1.0),
        glam::vec3(0.9, 0.9, 0.6),
    ];
    for (i, color) in light_colors.into_iter().enumerate() {
        let mut light = GameObject::point_light(0.6, 0.05, color);
        let angle = i as f32 * std::f32::consts::TAU / light_colors.len() as f32;
        light.transform.translation = glam::vec3(angle.cos(), -0.8, angle.sin());
        objects.insert(light.id(), light);
    }

    Ok(objects)
}

#[derive(Default)]
struct App {
    engine: Option<Engine>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.engine.is_some() {
            return;
        }
        match Engine::new(event_loop) {
            Ok(engine) => {
                engine.window.request_redraw();
                self.engine = Some(engine);
            }
            Err(e) => {
                tracing::error!("Failed to initialize engine: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                tracing::debug!("Window resized to {}x{}", size.width, size.height);
                engine.window.mark_resized();
            }
            WindowEvent::Focused(false) => {
                engine.input.clear();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                ..
            } => {
                engine.input.handle_key(key, state);
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = engine.draw() {
                    tracing::error!("Frame failed: {:#}", e);
                    event_loop.exit();
                    return;
                }
                engine.window.request_redraw();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(engine) = &self.engine {
            if let Err(e) = engine.device.wait_idle() {
                tracing::warn!("wait_idle failed on exit: {}", e);
            }
        }
    }
}

fn main() -> Result<()> {
    lantern_core::init_logging();

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::default();
    event_loop.run_app(&mut app).context("event loop error")?;
    Ok(())
}
