use anyhow::{Context, Result};

use prism_engine::core::{AppControl, Element, EventCtx, FrameCtx, SurfaceRequest};
use prism_engine::input::{ButtonState, InputEvent, Key};
use prism_engine::paint::Color;
use prism_engine::render::{
    ButtonDraw, ButtonRenderer, ButtonStyle, LabelRasterizer, ShaderProgram, ShaderQuadRenderer,
};
use prism_engine::window::{Host, MonitorInfo, RuntimeCtx};

use crate::attributes::ElementAttributes;
use crate::button::{self, ButtonEvent, OverlayButton};
use crate::capability::probe;
use crate::host::{classify_change, runtime_command, FullscreenChange};
use crate::loader::ShaderLoader;
use crate::presentation::{PresentationController, PresentationMode, PresentationRequest};
use crate::settings::ElementSettings;

/// The shader element.
///
/// Everything built in `connected` lives in an [`ElementScope`] that is
/// dropped on `disconnected`, which stops rendering and frees GPU resources.
pub struct ShaderElement {
    attributes: ElementAttributes,
    settings: ElementSettings,
    scope: Option<ElementScope>,
}

struct ElementScope {
    controller: PresentationController,
    button: OverlayButton,
    style: ButtonStyle,

    quad: ShaderQuadRenderer,
    button_renderer: ButtonRenderer,
    labels: LabelRasterizer,
    /// Label text and scale factor currently uploaded to the GPU.
    uploaded_label: Option<(&'static str, f32)>,
}

impl ShaderElement {
    pub fn new(attributes: ElementAttributes, settings: ElementSettings) -> Self {
        Self {
            attributes,
            settings,
            scope: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.scope.is_some()
    }

    fn build_scope(&self, monitors: Vec<MonitorInfo>) -> Result<ElementScope> {
        // Capability first, then fetch, then compile.
        let display = probe(&self.settings, monitors)
            .resolve()
            .context("immersive display query failed")?;
        match &display {
            Some(d) => log::info!("immersive display: {} at {:?}", d.name(), d.position()),
            None => log::info!("no immersive display; using fullscreen"),
        }

        let src = self.attributes.src();
        let source = ShaderLoader::new()
            .load(src)
            .with_context(|| format!("failed to load shader from {src:?}"))?;
        let program = ShaderProgram::compile(&source)
            .with_context(|| format!("failed to compile shader from {src:?}"))?;
        log::info!("shader loaded from {src:?} ({} bytes)", source.len());

        let labels =
            LabelRasterizer::from_bytes(&self.settings.font).context("failed to load label font")?;

        let mode = PresentationMode::from_capability(display);
        let controller = PresentationController::new(mode, self.attributes.size());

        Ok(ElementScope {
            controller,
            button: OverlayButton::new(),
            style: button::style(),
            quad: ShaderQuadRenderer::new(program),
            button_renderer: ButtonRenderer::new(),
            labels,
            uploaded_label: None,
        })
    }
}

impl ElementScope {
    fn dispatch(&mut self, request: PresentationRequest, runtime: &mut RuntimeCtx) {
        log::debug!("presentation request: {request:?}");
        runtime.push(runtime_command(request));
    }
}

impl Element for ShaderElement {
    fn connected(&mut self, host: &Host<'_>) -> Result<SurfaceRequest> {
        let scope = self.build_scope(host.monitors())?;
        let (width, height) = scope.controller.viewport().size();
        log::info!(
            "element connected: {} mode, {width}x{height}",
            scope.controller.label()
        );
        self.scope = Some(scope);
        Ok(SurfaceRequest { width, height })
    }

    fn on_input(&mut self, ctx: &mut EventCtx<'_>, event: &InputEvent) -> AppControl {
        let Some(scope) = self.scope.as_mut() else {
            return AppControl::Continue;
        };

        if let InputEvent::Key {
            key: Key::Escape,
            state: ButtonState::Pressed,
            repeat: false,
        } = event
        {
            if let Some(request) = scope.controller.escape() {
                scope.dispatch(request, ctx.runtime);
            }
        }

        match scope.button.on_input(event) {
            Some(ButtonEvent::Hover(hovered)) => {
                scope.controller.set_hovered(hovered);
            }
            Some(ButtonEvent::Clicked) => {
                let request = scope.controller.click();
                scope.dispatch(request, ctx.runtime);
            }
            None => {}
        }

        AppControl::Continue
    }

    fn on_fullscreen_change(
        &mut self,
        ctx: &mut EventCtx<'_>,
        monitor: Option<&MonitorInfo>,
    ) -> AppControl {
        let Some(scope) = self.scope.as_mut() else {
            return AppControl::Continue;
        };

        let requests = match classify_change(scope.controller.mode(), monitor) {
            FullscreenChange::Presentation(presenting) => {
                scope.controller.on_presentation_change(presenting);
                Vec::new()
            }
            FullscreenChange::Fullscreen(size) => scope.controller.on_fullscreen_change(size),
        };
        scope.quad.set_stereo(scope.controller.stereo());

        for request in requests {
            scope.dispatch(request, ctx.runtime);
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
        let Some(scope) = self.scope.as_mut() else {
            return Ok(AppControl::Continue);
        };

        let time = ctx.time.elapsed;
        let scale = ctx.window.scale_factor();
        let label = scope.controller.label();
        let opacity = scope.controller.opacity();
        let rect = scope.button.rect();

        let ElementScope {
            quad,
            button_renderer,
            labels,
            uploaded_label,
            style,
            ..
        } = scope;

        ctx.render(Color::BLACK, |rctx, target| {
            if *uploaded_label != Some((label, scale)) {
                let bitmap = labels.rasterize(label, button::LABEL_SIZE, scale);
                button_renderer.set_label(rctx, &bitmap);
                *uploaded_label = Some((label, scale));
            }

            quad.render(rctx, target, time);
            button_renderer.render(
                rctx,
                target,
                ButtonDraw {
                    rect,
                    style,
                    opacity,
                },
            );
        })?;

        Ok(AppControl::Continue)
    }

    fn disconnected(&mut self) {
        if self.scope.take().is_some() {
            log::info!("element disconnected; resources released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(src: &str) -> ShaderElement {
        ShaderElement::new(
            ElementAttributes {
                src: Some(src.to_string()),
                width: Some("320".into()),
                height: Some("240".into()),
            },
            ElementSettings::new(Vec::new()),
        )
    }

    fn hmd() -> MonitorInfo {
        MonitorInfo {
            name: Some("HTC Vive".into()),
            position: (1920, 0),
            size: (2160, 1200),
            scale_factor: 1.0,
            refresh_millihertz: Some(90_000),
        }
    }

    #[test]
    fn missing_shader_fails_after_capability() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.wgsl");
        let err = element(path.to_str().unwrap())
            .build_scope(vec![hmd()])
            .err()
            .unwrap();
        let msg = format!("{err:#}");
        assert!(msg.contains("failed to load shader"), "{msg}");
        assert!(msg.contains("none.wgsl"), "{msg}");
    }

    #[test]
    fn empty_src_fails() {
        let err = element("").build_scope(Vec::new()).err().unwrap();
        assert!(format!("{err:#}").contains("empty shader source location"));
    }

    #[test]
    fn broken_shader_fails_to_compile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wgsl");
        std::fs::write(&path, "@fragment fn fs_main( {").unwrap();

        let err = element(path.to_str().unwrap())
            .build_scope(Vec::new())
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("failed to compile shader"));
    }

    #[test]
    fn capability_failure_stops_before_fetch() {
        let mut el = element("");
        el.settings.hmd_patterns = vec![String::new()];
        let err = el.build_scope(vec![hmd()]).err().unwrap();
        let msg = format!("{err:#}");
        assert!(msg.contains("immersive display query failed"), "{msg}");
        assert!(!msg.contains("shader"), "{msg}");
    }

    #[test]
    fn bad_font_is_reported_after_shader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.wgsl");
        std::fs::write(
            &path,
            "@fragment fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {\n\
             return vec4<f32>(in.uv, sin(uniforms.time), 1.0);\n}\n",
        )
        .unwrap();

        let err = element(path.to_str().unwrap())
            .build_scope(Vec::new())
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("failed to load label font"));
    }

    #[test]
    fn disconnect_without_connect_is_noop() {
        let mut el = element("x.wgsl");
        el.disconnected();
        assert!(!el.is_connected());
    }
}
