//! Hand-rolled `-name=value` command-line parser. Malformed or unrecognized
//! flags are silently ignored rather than rejected, leaving the previous
//! value (the default, unless set earlier on the line) in place.

use crate::RenderConfig;

/// Parses `-name=value` style arguments into a `RenderConfig`, starting
/// from `RenderConfig::default()` and overwriting only the fields an
/// argument actually names.
pub fn parse_args(args: impl Iterator<Item = String>) -> RenderConfig {
    let mut config = RenderConfig::default();

    for arg in args {
        let Some(body) = arg.strip_prefix('-') else {
            continue;
        };
        let Some((name, value)) = body.split_once('=') else {
            continue;
        };

        match name {
            "width" => assign(value, |v| config.width = v),
            "height" => assign(value, |v| config.height = v),
            "bounces" => assign(value, |v| config.max_bounces = v),
            "samples" => assign(value, |v| config.samples_per_pixel = v),
            "captures" => assign(value, |v| config.captures = v),
            "fov" => assign(value, |v| config.fov_degrees = v),
            "aperture" => assign(value, |v| config.aperture_radius = v),
            "focal" => assign(value, |v| config.focal_distance = v),
            "iso" => assign(value, |v| config.iso = v),
            "shutter" => assign(value, |v| config.shutter_seconds = v),
            "scene" => config.scene_path = Some(value.to_string()),
            "out" => config.output_path = Some(value.to_string()),
            _ => continue,
        }
    }

    config
}

fn assign<T: std::str::FromStr>(value: &str, mut apply: impl FnMut(T)) {
    if let Ok(parsed) = value.parse() {
        apply(parsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> impl Iterator<Item = String> {
        items.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_recognized_flags() {
        let config = parse_args(args(&[
            "-width=640",
            "-height=480",
            "-bounces=8",
            "-samples=16",
            "-captures=3",
        ]));
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 480);
        assert_eq!(config.max_bounces, 8);
        assert_eq!(config.samples_per_pixel, 16);
        assert_eq!(config.captures, 3);
    }

    #[test]
    fn silently_ignores_malformed_values() {
        let default = RenderConfig::default();
        let config = parse_args(args(&["-width=not_a_number"]));
        assert_eq!(config.width, default.width);
    }

    #[test]
    fn silently_ignores_unrecognized_flags() {
        let default = RenderConfig::default();
        let config = parse_args(args(&["-frobnicate=true"]));
        assert_eq!(config.width, default.width);
    }

    #[test]
    fn ignores_arguments_without_a_leading_dash() {
        let default = RenderConfig::default();
        let config = parse_args(args(&["width=640"]));
        assert_eq!(config.width, default.width);
    }
}
