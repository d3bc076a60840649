use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use prism_element::{load_font, ElementAttributes, ElementSettings, ShaderElement};
use prism_engine::device::GpuInit;
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::window::{Runtime, RuntimeConfig};

/// Render a WGSL fragment shader full-window, with VR or fullscreen presentation.
#[derive(Debug, Parser)]
#[command(name = "prism", version, about)]
struct Cli {
    /// Shader location: http(s) URL, file:// URL or path.
    #[arg(long)]
    src: Option<String>,

    /// Windowed width in pixels (lenient integer parsing; invalid means 0).
    #[arg(long, allow_hyphen_values = true)]
    width: Option<String>,

    /// Windowed height in pixels (lenient integer parsing; invalid means 0).
    #[arg(long, allow_hyphen_values = true)]
    height: Option<String>,

    /// Monitor name fragment identifying a head-mounted display. Repeatable;
    /// replaces the built-in list.
    #[arg(long = "hmd-pattern", value_name = "NAME")]
    hmd_patterns: Vec<String>,

    /// Never present on a head-mounted display.
    #[arg(long)]
    no_immersive: bool,

    /// Font used for the button label.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `prism_element=trace`.
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,

    /// Window title.
    #[arg(long, default_value = "prism")]
    title: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log.map(LoggingConfig::with_filter).unwrap_or_default());

    let font = load_font(cli.font.as_deref())?;
    let settings = ElementSettings::new(font)
        .with_hmd_patterns(cli.hmd_patterns)
        .with_immersive(!cli.no_immersive);

    let attributes = ElementAttributes {
        src: cli.src,
        width: cli.width,
        height: cli.height,
    };

    Runtime::run(
        RuntimeConfig { title: cli.title },
        GpuInit::default(),
        ShaderElement::new(attributes, settings),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn every_option_is_documented() {
        let cmd = Cli::command();
        for arg in cmd.get_arguments() {
            let id = arg.get_id().as_str();
            if id == "help" || id == "version" {
                continue;
            }
            assert!(arg.get_help().is_some(), "--{id} has no help text");
        }
    }

    #[test]
    fn title_defaults_to_prism() {
        let cli = Cli::try_parse_from(["prism", "--src", "a.wgsl"]).unwrap();
        assert_eq!(cli.title, "prism");
        let cli = Cli::try_parse_from(["prism", "--title", "waves"]).unwrap();
        assert_eq!(cli.title, "waves");
    }
}
