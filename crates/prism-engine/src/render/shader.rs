use std::fmt;

/// Declarations every fragment shader is compiled against: the `uniforms.time`
/// binding, the `VertexOutput` varyings and the `vs_main` plane vertex stage.
pub const SHADER_PRELUDE: &str = include_str!("shaders/prelude.wgsl");

/// Entry point a fragment source must define.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Failure to turn fragment source into a usable module.
///
/// Messages are naga's rendered diagnostics against the composed source.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    Parse(String),
    Validation(String),
    MissingEntryPoint,
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::Parse(msg) => write!(f, "shader parse error:\n{msg}"),
            ShaderError::Validation(msg) => write!(f, "shader validation error:\n{msg}"),
            ShaderError::MissingEntryPoint => {
                write!(f, "shader has no `@fragment fn {FRAGMENT_ENTRY}` entry point")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// A fragment shader composed with the prelude and checked by naga.
///
/// Compilation happens on the CPU so failures are reported as errors before
/// any GPU object exists; wgpu would otherwise treat them as device errors.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    source: String,
}

impl ShaderProgram {
    pub fn compile(fragment: &str) -> Result<Self, ShaderError> {
        let source = format!("{SHADER_PRELUDE}\n{fragment}");

        let module = naga::front::wgsl::parse_str(&source)
            .map_err(|e| ShaderError::Parse(e.emit_to_string(&source)))?;

        let has_entry = module
            .entry_points
            .iter()
            .any(|ep| ep.name == FRAGMENT_ENTRY && ep.stage == naga::ShaderStage::Fragment);
        if !has_entry {
            return Err(ShaderError::MissingEntryPoint);
        }

        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .map_err(|e| ShaderError::Validation(e.emit_to_string(&source)))?;

        Ok(Self { source })
    }

    /// Composed WGSL (prelude + fragment).
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn create_module(&self, device: &wgpu::Device) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("prism fragment shader"),
            source: wgpu::ShaderSource::Wgsl(self.source.as_str().into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PULSE: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let t = 0.5 + 0.5 * sin(uniforms.time);
    return vec4<f32>(in.uv, t, 1.0);
}
"#;

    #[test]
    fn compiles_fragment_against_prelude() {
        let program = ShaderProgram::compile(PULSE).expect("valid shader");
        assert!(program.source().starts_with(SHADER_PRELUDE));
        assert!(program.source().contains("fn fs_main"));
    }

    #[test]
    fn syntax_error_is_parse_error() {
        let err = ShaderProgram::compile("@fragment fn fs_main( {").unwrap_err();
        assert!(matches!(err, ShaderError::Parse(_)), "{err}");
    }

    #[test]
    fn unknown_identifier_is_rejected() {
        let src = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(resolution, 0.0, 1.0);
}
"#;
        assert!(ShaderProgram::compile(src).is_err());
    }

    #[test]
    fn wrong_entry_name_is_reported() {
        let src = r#"
@fragment
fn main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;
        assert_eq!(ShaderProgram::compile(src).unwrap_err(), ShaderError::MissingEntryPoint);
    }

    #[test]
    fn empty_fragment_has_no_entry_point() {
        assert_eq!(ShaderProgram::compile("").unwrap_err(), ShaderError::MissingEntryPoint);
    }
}
