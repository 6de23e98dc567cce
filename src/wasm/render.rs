use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{
    window, HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram,
    WebGlShader, WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject, Window,
};

use super::clock::{AnimationFrameScheduler, FrameCallback, PerformanceClock};
use super::recorder::MediaRecorderSink;
use super::{controls, panel, texture};
use crate::camera::PerspectiveCamera;
use crate::error::{DemoError, Result};
use crate::geometry::Vertex;
use crate::material::{ShaderMaterial, Side};
use crate::render_loop::{FrameScheduler, RenderLoop, Surface};
use crate::scene::{build_mesh, Mesh};
use crate::viewport::SurfaceSize;
use crate::DemoConfig;

pub type App = RenderLoop<GlSurface, MediaRecorderSink, PerformanceClock>;
pub type SharedApp = Rc<RefCell<App>>;

const POSITION_LOCATION: u32 = 0;
const UV_LOCATION: u32 = 1;
const RANDOM_LOCATION: u32 = 2;

struct Uniforms {
    projection: Option<WebGlUniformLocation>,
    view: Option<WebGlUniformLocation>,
    model: Option<WebGlUniformLocation>,
    frequency: Option<WebGlUniformLocation>,
    time: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    texture: Option<WebGlUniformLocation>,
}

impl Uniforms {
    fn locate(gl: &GL, program: &WebGlProgram) -> Self {
        let at = |name: &str| gl.get_uniform_location(program, name);
        Self {
            projection: at("projectionMatrix"),
            view: at("viewMatrix"),
            model: at("modelMatrix"),
            frequency: at("uFrequency"),
            time: at("uTime"),
            color: at("uColor"),
            texture: at("uTexture"),
        }
    }
}

/// WebGL2 output for the demo: one program, one VAO, one texture.
pub struct GlSurface {
    gl: GL,
    canvas: HtmlCanvasElement,
    program: WebGlProgram,
    vao: WebGlVertexArrayObject,
    _vertex_buffer: WebGlBuffer,
    _index_buffer: WebGlBuffer,
    index_count: i32,
    uniforms: Uniforms,
    texture: WebGlTexture,
    size: SurfaceSize,
}

impl GlSurface {
    pub fn new(
        gl: GL,
        canvas: HtmlCanvasElement,
        mesh: &Mesh,
        texture: WebGlTexture,
    ) -> Result<Self> {
        let program = link_program(&gl, &mesh.material)?;
        let uniforms = Uniforms::locate(&gl, &program);

        let vao = gl
            .create_vertex_array()
            .ok_or(DemoError::GlResource("vertex array"))?;
        gl.bind_vertex_array(Some(&vao));

        let vertices = mesh.geometry.interleaved();
        let vertex_buffer = gl
            .create_buffer()
            .ok_or(DemoError::GlResource("vertex buffer"))?;
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&vertex_buffer));
        gl.buffer_data_with_u8_array(
            GL::ARRAY_BUFFER,
            bytemuck::cast_slice(&vertices),
            GL::STATIC_DRAW,
        );

        for (location, size, offset) in [
            (POSITION_LOCATION, 3, Vertex::POSITION_OFFSET),
            (UV_LOCATION, 2, Vertex::UV_OFFSET),
            (RANDOM_LOCATION, 1, Vertex::RANDOM_OFFSET),
        ] {
            gl.enable_vertex_attrib_array(location);
            gl.vertex_attrib_pointer_with_i32(location, size, GL::FLOAT, false, Vertex::STRIDE, offset);
        }

        let index_buffer = gl
            .create_buffer()
            .ok_or(DemoError::GlResource("index buffer"))?;
        gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&index_buffer));
        gl.buffer_data_with_u8_array(
            GL::ELEMENT_ARRAY_BUFFER,
            bytemuck::cast_slice(&mesh.geometry.indices),
            GL::STATIC_DRAW,
        );

        gl.bind_vertex_array(None);

        Ok(Self {
            gl,
            canvas,
            program,
            vao,
            _vertex_buffer: vertex_buffer,
            _index_buffer: index_buffer,
            index_count: mesh.geometry.indices.len() as i32,
            uniforms,
            texture,
            size: SurfaceSize {
                css_width: 0,
                css_height: 0,
                buffer_width: 0,
                buffer_height: 0,
            },
        })
    }
}

impl Surface for GlSurface {
    fn set_size(&mut self, size: SurfaceSize) {
        self.canvas.set_width(size.buffer_width);
        self.canvas.set_height(size.buffer_height);
        let style = self.canvas.style();
        style
            .set_property("width", &format!("{}px", size.css_width))
            .ok();
        style
            .set_property("height", &format!("{}px", size.css_height))
            .ok();
        self.size = size;
    }

    fn draw(&mut self, mesh: &Mesh, camera: &PerspectiveCamera) -> Result<()> {
        let gl = &self.gl;
        gl.viewport(
            0,
            0,
            self.size.buffer_width as i32,
            self.size.buffer_height as i32,
        );
        gl.clear_color(0.0, 0.0, 0.0, 1.0);
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
        gl.enable(GL::DEPTH_TEST);

        match mesh.material.side {
            Side::Double => gl.disable(GL::CULL_FACE),
            Side::Front => {
                gl.enable(GL::CULL_FACE);
                gl.cull_face(GL::BACK);
            }
            Side::Back => {
                gl.enable(GL::CULL_FACE);
                gl.cull_face(GL::FRONT);
            }
        }

        gl.use_program(Some(&self.program));

        let u = &self.uniforms;
        let material = &mesh.material.uniforms;
        gl.uniform_matrix4fv_with_f32_array(
            u.projection.as_ref(),
            false,
            &camera.projection_matrix().to_cols_array(),
        );
        gl.uniform_matrix4fv_with_f32_array(
            u.view.as_ref(),
            false,
            &camera.view_matrix().to_cols_array(),
        );
        gl.uniform_matrix4fv_with_f32_array(u.model.as_ref(), false, &mesh.model_matrix.to_cols_array());

        let frequency = material.frequency();
        gl.uniform2f(u.frequency.as_ref(), frequency.x, frequency.y);
        gl.uniform1f(u.time.as_ref(), material.time);
        let [r, g, b] = material.color.to_array();
        gl.uniform3f(u.color.as_ref(), r, g, b);

        let unit = material.texture.unit;
        gl.active_texture(GL::TEXTURE0 + unit);
        gl.bind_texture(GL::TEXTURE_2D, Some(&self.texture));
        gl.uniform1i(u.texture.as_ref(), unit as i32);

        gl.bind_vertex_array(Some(&self.vao));
        gl.draw_elements_with_i32(GL::TRIANGLES, self.index_count, GL::UNSIGNED_INT, 0);
        gl.bind_vertex_array(None);

        if gl.is_context_lost() {
            return Err(DemoError::Context("WebGL context lost".into()));
        }
        Ok(())
    }
}

fn compile_shader(gl: &GL, stage: u32, source: &str) -> Result<WebGlShader> {
    let name = if stage == GL::VERTEX_SHADER {
        "vertex"
    } else {
        "fragment"
    };
    let shader = gl
        .create_shader(stage)
        .ok_or(DemoError::GlResource("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let ok = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if !ok {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        return Err(DemoError::ShaderCompile { stage: name, log });
    }
    Ok(shader)
}

fn link_program(gl: &GL, material: &ShaderMaterial) -> Result<WebGlProgram> {
    let vertex = compile_shader(gl, GL::VERTEX_SHADER, material.vertex_shader)?;
    let fragment = compile_shader(gl, GL::FRAGMENT_SHADER, material.fragment_shader)?;

    let program = gl
        .create_program()
        .ok_or(DemoError::GlResource("program"))?;
    gl.attach_shader(&program, &vertex);
    gl.attach_shader(&program, &fragment);
    gl.link_program(&program);

    // Shaders are no longer needed once linked.
    gl.delete_shader(Some(&vertex));
    gl.delete_shader(Some(&fragment));

    let ok = gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if !ok {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        return Err(DemoError::ProgramLink(log));
    }
    Ok(program)
}

/// `(innerWidth, innerHeight, devicePixelRatio)`
pub fn window_metrics(window: &Window) -> Result<(f64, f64, f64)> {
    let width = window.inner_width()?.as_f64().unwrap_or(0.0);
    let height = window.inner_height()?.as_f64().unwrap_or(0.0);
    Ok((width, height, window.device_pixel_ratio()))
}

/// Builds the scene on `canvas` and wraps it, with the capture sink and
/// clock, in a render loop sized to the window.
pub fn build_app(window: &Window, canvas: &HtmlCanvasElement, config: &DemoConfig) -> Result<SharedApp> {
    let gl: GL = canvas
        .get_context("webgl2")?
        .ok_or_else(|| DemoError::Context("WebGL2 not supported".into()))?
        .dyn_into()
        .map_err(|_| DemoError::Context("unexpected context type".into()))?;

    let mesh = build_mesh(config, &mut rand::thread_rng());
    let texture = texture::load(&gl, config.texture_path)?;
    let surface = GlSurface::new(gl, canvas.clone(), &mesh, texture)?;
    let sink = MediaRecorderSink::new(canvas.clone(), config.capture.clone());
    let clock = PerformanceClock::new(window)?;

    let metrics = window_metrics(window)?;
    let app: SharedApp = Rc::new(RefCell::new(RenderLoop::new(
        config, mesh, metrics, surface, sink, clock,
    )));
    log::info!(
        "viewport {}x{} @ {}x",
        metrics.0,
        metrics.1,
        app.borrow().state().viewport.pixel_ratio
    );
    Ok(app)
}

/// Builds the scene, wires resize, pointer and panel input, and starts the
/// animation loop.
pub fn start(canvas: HtmlCanvasElement, config: DemoConfig) -> Result<()> {
    let window = window().ok_or(DemoError::MissingElement("window"))?;
    let document = window
        .document()
        .ok_or(DemoError::MissingElement("document"))?;

    let app = build_app(&window, &canvas, &config)?;

    // Keep canvas, camera and renderer in step with the window.
    let resize_closure = {
        let app = app.clone();
        let window = window.clone();
        Closure::<dyn FnMut()>::new(move || match window_metrics(&window) {
            Ok((w, h, dpr)) => app.borrow_mut().resize(w, h, dpr),
            Err(err) => log::error!("resize failed: {err}"),
        })
    };
    window.add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref())?;
    resize_closure.forget();

    controls::attach(&canvas, app.clone())?;
    panel::build(&document, app.clone(), &config)?;

    // Animation loop. The callback owns a scheduler that points back at the
    // slot holding the callback, so each frame can request the next one.
    let slot: FrameCallback = Rc::new(RefCell::new(None));
    let mut scheduler = AnimationFrameScheduler::new(window.clone(), slot.clone());
    let frame_app = app.clone();
    *slot.borrow_mut() = Some(Closure::new(move || {
        if let Err(err) = frame_app.borrow_mut().run_frame(&mut scheduler) {
            log::error!("frame failed: {err}");
        }
    }));

    AnimationFrameScheduler::new(window, slot).request_frame()?;
    Ok(())
}
