//! Core application state and lifecycle.

use std::sync::Arc;

use vello::util::RenderSurface;
use vello::wgpu::PresentMode;
use widgetdeck_core::storage::PlatformStorage;
use widgetdeck_core::{Canvas, LayoutStore};
use winit::application::ApplicationHandler;
#[cfg(not(target_arch = "wasm32"))]
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

pub use crate::config::AppConfig;
use crate::ui::{UiAction, UiState, render_ui};

#[cfg(feature = "native")]
mod file_ops {
    use std::path::Path;

    use widgetdeck_core::{ContentEdit, WidgetId};

    const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

    /// Ask for an image file and build the edit storing it in a widget.
    pub fn pick_image(id: WidgetId) -> Option<ContentEdit> {
        let path = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file()?;
        read_image(id, &path)
    }

    fn read_image(id: WidgetId, path: &Path) -> Option<ContentEdit> {
        match std::fs::read(path) {
            Ok(data) => {
                let extension = path.extension().and_then(|e| e.to_str());
                log::info!("Image for widget {} loaded from {}", id, path.display());
                Some(ContentEdit::image(id, &data, extension))
            }
            Err(e) => {
                log::error!("Failed to read image {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod file_ops {
    use std::cell::RefCell;
    use std::sync::Arc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;
    use widgetdeck_core::{ContentEdit, WidgetId};
    use winit::window::Window;

    thread_local! {
        static PICKED_IMAGES: RefCell<Vec<ContentEdit>> = const { RefCell::new(Vec::new()) };
    }

    /// Open the browser file picker for an image.
    /// The result will be available via `take_picked_images()`; `window` is
    /// redrawn once the file has been read.
    pub fn pick_image_async(id: WidgetId, window: Arc<Window>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document for the file picker");
            return;
        };
        let input = match document
            .create_element("input")
            .ok()
            .and_then(|e| e.dyn_into::<web_sys::HtmlInputElement>().ok())
        {
            Some(input) => input,
            None => {
                log::error!("Failed to create file input");
                return;
            }
        };

        input.set_type("file");
        input.set_accept("image/*");
        input.style().set_property("display", "none").ok();

        let input_clone = input.clone();
        let onchange = Closure::once(Box::new(move |_event: web_sys::Event| {
            if let Some(file) = input_clone.files().and_then(|files| files.get(0)) {
                read_as_data_url(id, file, window);
            }
            input_clone.remove();
        }) as Box<dyn FnOnce(_)>);

        input.set_onchange(Some(onchange.as_ref().unchecked_ref()));
        onchange.forget();

        if let Some(body) = document.body() {
            body.append_child(&input).ok();
        }
        input.click();
    }

    fn read_as_data_url(id: WidgetId, file: web_sys::File, window: Arc<Window>) {
        let reader = match web_sys::FileReader::new() {
            Ok(reader) => reader,
            Err(e) => {
                log::error!("Failed to create FileReader: {:?}", e);
                return;
            }
        };
        let reader_clone = reader.clone();

        let onload = Closure::once(Box::new(move |_event: web_sys::Event| {
            match reader_clone.result().ok().and_then(|r| r.as_string()) {
                Some(data_url) => {
                    PICKED_IMAGES.with(|cell| {
                        cell.borrow_mut().push(ContentEdit::replace(id, data_url));
                    });
                    window.request_redraw();
                }
                None => log::error!("Failed to read image for widget {}", id),
            }
        }) as Box<dyn FnOnce(_)>);

        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();

        if let Err(e) = reader.read_as_data_url(&file) {
            log::error!("Failed to read file: {:?}", e);
        }
    }

    /// Take the images picked since the last call.
    pub fn take_picked_images() -> Vec<ContentEdit> {
        PICKED_IMAGES.with(|cell| std::mem::take(&mut *cell.borrow_mut()))
    }
}

/// Runtime state for the application.
struct AppState {
    window: Arc<Window>,
    surface: RenderSurface<'static>,

    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    ui_state: UiState,

    canvas: Canvas,
    layout: Option<LayoutStore<PlatformStorage>>,
    config: AppConfig,
    /// Dirty flag currently shown in the window title.
    title_dirty: bool,
}

impl AppState {
    fn handle_action(&mut self, action: UiAction) {
        match action {
            UiAction::Drop { pointer, target } => {
                if let Some(id) = self.canvas.handle_drop(self.ui_state.transfer(), pointer, &target) {
                    log::info!("Widget {} dropped at {:?}", id, self.canvas.widget(id).map(|w| w.position()));
                }
                self.ui_state.finish_drag();
            }
            UiAction::Edit(edit) => {
                self.canvas.apply_edit(edit);
            }
            UiAction::Remove(id) => {
                self.canvas.remove(id);
                log::info!("Widget {} removed", id);
            }
            UiAction::PickImage(id) => {
                #[cfg(feature = "native")]
                if let Some(edit) = file_ops::pick_image(id) {
                    self.canvas.apply_edit(edit);
                }
                #[cfg(target_arch = "wasm32")]
                file_ops::pick_image_async(id, self.window.clone());
                #[cfg(not(any(feature = "native", target_arch = "wasm32")))]
                log::warn!("No image picker available for widget {}", id);
            }
            UiAction::ButtonPressed(id) => {
                log::info!("Button widget {} clicked", id);
                self.ui_state.set_status("button clicked");
            }
            UiAction::SaveLayout => self.save_layout(),
        }
    }

    fn save_layout(&mut self) {
        let Some(layout) = &self.layout else {
            log::error!("Cannot save layout: no storage available");
            self.ui_state.set_status("Saving is unavailable");
            return;
        };
        match self.canvas.save(layout) {
            Ok(()) => self.ui_state.set_status("Layout saved"),
            Err(e) => {
                log::error!("Failed to save layout: {}", e);
                self.ui_state.set_status("Could not save layout");
            }
        }
    }

    fn update_title(&mut self) {
        let dirty = self.canvas.is_dirty();
        if dirty != self.title_dirty {
            let title = if dirty {
                format!("{} *", self.config.title)
            } else {
                self.config.title.clone()
            };
            self.window.set_title(&title);
            self.title_dirty = dirty;
        }
    }
}

/// The WidgetDeck editor window.
pub struct App {
    config: AppConfig,
    state: Option<AppState>,
    render_cx: Option<vello::util::RenderContext>,
    /// Window whose surface is still being created (WASM).
    pending_window: Option<Arc<Window>>,
    /// Set while the WASM surface future is running.
    #[cfg(target_arch = "wasm32")]
    init_in_progress: std::cell::Cell<bool>,
}

impl App {
    /// Create a new application with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a new application with custom configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            state: None,
            render_cx: None,
            pending_window: None,
            #[cfg(target_arch = "wasm32")]
            init_in_progress: std::cell::Cell::new(false),
        }
    }

    /// Run the application with configuration from the environment.
    pub async fn run() {
        let event_loop = EventLoop::new().expect("Failed to create event loop");
        let app = App::with_config(AppConfig::from_env());

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::EventLoopExtWebSys;
            event_loop.spawn_app(app);
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut app = app;
            event_loop.run_app(&mut app).expect("Event loop error");
        }
    }

    /// Build egui and restore the layout once the surface exists.
    fn finish_init(&mut self, window: Arc<Window>, surface: RenderSurface<'static>) {
        let Some(render_cx) = self.render_cx.as_ref() else {
            log::error!("RenderContext not initialized");
            return;
        };
        let device = &render_cx.devices[surface.dev_id].device;

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface.config.format,
            egui_wgpu::RendererOptions::default(),
        );

        let layout = self.config.open_layout_store();
        let canvas = layout.as_ref().map(Canvas::restore).unwrap_or_default();

        log::info!(
            "WidgetDeck initialized - {}x{}, {} widgets restored",
            surface.config.width,
            surface.config.height,
            canvas.widgets().len()
        );

        self.state = Some(AppState {
            window: window.clone(),
            surface,
            egui_ctx,
            egui_state,
            egui_renderer,
            ui_state: UiState::default(),
            canvas,
            layout,
            config: self.config.clone(),
            title_dirty: false,
        });

        self.pending_window = None;

        window.request_redraw();
    }

    /// Run one egui frame and draw it to the surface.
    fn redraw(&mut self) {
        let Some(state) = &mut self.state else {
            return;
        };

        #[cfg(target_arch = "wasm32")]
        for edit in file_ops::take_picked_images() {
            state.canvas.apply_edit(edit);
        }

        let palette_width = state.config.palette_width;
        let background = state.config.background_color32();

        let egui_input = state.egui_state.take_egui_input(&state.window);
        let mut action = None;
        let egui_output = state.egui_ctx.run(egui_input, |ctx| {
            if let Some(a) = render_ui(ctx, &mut state.ui_state, &state.canvas, palette_width, background) {
                action = Some(a);
            }
        });

        if let Some(action) = action {
            state.handle_action(action);
        }
        state.update_title();

        state
            .egui_state
            .handle_platform_output(&state.window, egui_output.platform_output);
        let egui_primitives = state
            .egui_ctx
            .tessellate(egui_output.shapes, egui_output.pixels_per_point);

        let Some(render_cx) = self.render_cx.as_ref() else {
            return;
        };

        let device_handle = &render_cx.devices[state.surface.dev_id];
        let device = &device_handle.device;
        let queue = &device_handle.queue;

        let surface_texture = match state.surface.surface.get_current_texture() {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Failed to get surface texture: {:?}", e);
                return;
            }
        };
        let surface_view = surface_texture
            .texture
            .create_view(&vello::wgpu::TextureViewDescriptor::default());

        for (id, image_delta) in &egui_output.textures_delta.set {
            state.egui_renderer.update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [state.surface.config.width, state.surface.config.height],
            pixels_per_point: egui_output.pixels_per_point,
        };

        {
            let mut encoder = device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
                label: Some("egui encoder"),
            });

            state.egui_renderer.update_buffers(
                device,
                queue,
                &mut encoder,
                &egui_primitives,
                &screen_descriptor,
            );

            let render_pass = encoder.begin_render_pass(&vello::wgpu::RenderPassDescriptor {
                label: Some("egui render pass"),
                color_attachments: &[Some(vello::wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: vello::wgpu::Operations {
                        load: vello::wgpu::LoadOp::Clear(state.config.clear_color()),
                        store: vello::wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            // egui-wgpu wants a 'static pass.
            let mut render_pass = render_pass.forget_lifetime();
            state
                .egui_renderer
                .render(&mut render_pass, &egui_primitives, &screen_descriptor);
            drop(render_pass);

            queue.submit(std::iter::once(encoder.finish()));
        }

        for id in &egui_output.textures_delta.free {
            state.egui_renderer.free_texture(id);
        }
        surface_texture.present();

        let repaint_now = egui_output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .is_some_and(|viewport| viewport.repaint_delay.is_zero());
        if repaint_now {
            state.window.request_redraw();
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.pending_window.is_some() {
            return;
        }

        log::info!("Creating window...");

        #[cfg(not(target_arch = "wasm32"))]
        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        // WASM: reuse or create the `widgetdeck-canvas` element.
        #[cfg(target_arch = "wasm32")]
        let window_attrs = {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            let web_window = web_sys::window().expect("No window");
            let document = web_window.document().expect("No document");

            let canvas = document
                .get_element_by_id("widgetdeck-canvas")
                .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok())
                .or_else(|| {
                    let body = document.body()?;
                    let canvas = document.create_element("canvas").ok()?;
                    canvas.set_id("widgetdeck-canvas");
                    body.append_child(&canvas).ok()?;
                    canvas.dyn_into::<web_sys::HtmlCanvasElement>().ok()
                })
                .expect("Failed to create canvas");

            let style = canvas.style();
            let _ = style.set_property("width", "100%");
            let _ = style.set_property("height", "100%");
            let _ = style.set_property("display", "block");

            Window::default_attributes()
                .with_title(&self.config.title)
                .with_canvas(Some(canvas))
        };

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );

        let size = window.inner_size();
        let (width, height) = if size.width == 0 || size.height == 0 {
            (self.config.width, self.config.height)
        } else {
            (size.width, size.height)
        };

        log::info!("Surface size: {}x{}", width, height);

        #[cfg(not(target_arch = "wasm32"))]
        {
            let render_cx = self
                .render_cx
                .get_or_insert_with(vello::util::RenderContext::new);

            let surface = pollster::block_on(render_cx.create_surface(
                window.clone(),
                width,
                height,
                PresentMode::AutoVsync,
            ))
            .expect("Failed to create surface");

            // AppState holds the window alongside the surface that borrows it.
            let surface: RenderSurface<'static> = unsafe { std::mem::transmute(surface) };
            self.finish_init(window, surface);
        }

        // WASM: the surface is created asynchronously from `window_event`.
        #[cfg(target_arch = "wasm32")]
        {
            self.pending_window = Some(window);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // WASM: create the surface on the first event after `resumed`.
        #[cfg(target_arch = "wasm32")]
        if self.state.is_none() {
            if let Some(window) = self.pending_window.clone() {
                if !self.init_in_progress.get() {
                    self.init_in_progress.set(true);

                    let size = window.inner_size();
                    let width = size.width.max(1);
                    let height = size.height.max(1);

                    let self_ptr = self as *mut Self;
                    let window_clone = window.clone();

                    wasm_bindgen_futures::spawn_local(async move {
                        let mut render_cx = vello::util::RenderContext::new();

                        match render_cx
                            .create_surface(window_clone.clone(), width, height, PresentMode::AutoVsync)
                            .await
                        {
                            Ok(surface) => {
                                let surface: RenderSurface<'static> =
                                    unsafe { std::mem::transmute(surface) };

                                // SAFETY: single-threaded; the event loop owns the App for
                                // the lifetime of the page.
                                let app = unsafe { &mut *self_ptr };
                                app.render_cx = Some(render_cx);
                                app.finish_init(window_clone, surface);
                            }
                            Err(e) => {
                                log::error!("Failed to create surface: {:?}", e);
                                let app = unsafe { &mut *self_ptr };
                                app.init_in_progress.set(false);
                            }
                        }
                    });
                }

                // Keep frames coming until the surface is ready.
                window.request_redraw();
            }
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };

        let egui_response = state.egui_state.on_window_event(&state.window, &event);
        if egui_response.repaint {
            state.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => {
                if state.canvas.is_dirty() {
                    log::info!("Closing with unsaved layout changes");
                }
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }

                if let Some(render_cx) = self.render_cx.as_mut() {
                    render_cx.resize_surface(&mut state.surface, size.width, size.height);
                }

                state.window.request_redraw();
            }

            WindowEvent::RedrawRequested => self.redraw(),

            _ => {}
        }
    }
}
