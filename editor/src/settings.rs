use json::{ object, JsonValue };

use raster_backend::{
    data::prelude::*,
    renderer::RendererRegistry,
    scene_system::pipeline::{ FillSettings, LineSettings, PointSettings, RenderSettings, SplineSettings },
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSettings {
    pub width: i32,
    pub height: i32,
    pub background: Color,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self { width: 256, height: 256, background: Color::BLACK }
    }
}

/// Everything the editor lets a user configure, stored as one JSON document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorSettings {
    pub wireframe: LineSettings,
    pub points: PointSettings,
    pub splines: SplineSettings,
    pub fill: FillSettings,
    pub canvas: CanvasSettings,
}

pub fn load(path: &std::path::Path, registry: &RendererRegistry) -> anyhow::Result<EditorSettings> {
    json_to_settings(&json::parse(std::fs::read_to_string(path)?.as_str())?, registry)
}

pub fn save(settings: &EditorSettings, path: &std::path::Path) -> anyhow::Result<()> {
    std::fs::write(path, settings_to_json(settings).pretty(4))?;

    Ok(())
}

fn wrong_type(field: &str) -> json::JsonError {
    json::JsonError::WrongType(field.to_string())
}

fn string_to_color(data: &JsonValue, field: &str) -> anyhow::Result<Color> {
    let text = data.as_str().ok_or_else(|| wrong_type(field))?;
    match Rgba8::parse_hex(text) {
        Some(rgba) => Ok(Color::from(rgba)),
        None => anyhow::bail!("`{}` is not a #rrggbbaa color: {}", field, text),
    }
}

fn color_to_string(color: Color) -> String {
    color.to_rgba8().to_hex()
}

fn json_to_render_settings<R: Copy>(
    data: &JsonValue,
    section: &str,
    default: RenderSettings<R>,
    lookup: impl Fn(&str) -> Option<R>,
) -> anyhow::Result<RenderSettings<R>> {
    if data.is_null() {
        return Ok(default);
    }

    let field = |name: &str| format!("{}.{}", section, name);
    let renderer_name = data["renderer"].as_str().ok_or_else(|| wrong_type(&field("renderer")))?;
    let fallback_renderer = match lookup(renderer_name) {
        Some(renderer) => renderer,
        None => anyhow::bail!("unknown {} renderer `{}`", section, renderer_name),
    };

    Ok(RenderSettings {
        fallback_renderer,
        enforce_renderer: data["enforce_renderer"].as_bool().ok_or_else(|| wrong_type(&field("enforce_renderer")))?,
        fallback_color: string_to_color(&data["color"], &field("color"))?,
        enforce_color: data["enforce_color"].as_bool().ok_or_else(|| wrong_type(&field("enforce_color")))?,
        fallback_size: data["size"].as_f32().ok_or_else(|| wrong_type(&field("size")))?,
        enforce_size: data["enforce_size"].as_bool().ok_or_else(|| wrong_type(&field("enforce_size")))?,
        ignore_transforms: data["ignore_transforms"].as_bool().unwrap_or(false),
    })
}

fn render_settings_to_json<R>(settings: &RenderSettings<R>, renderer_name: &str) -> JsonValue {
    object! {
        renderer: renderer_name,
        enforce_renderer: settings.enforce_renderer,
        color: color_to_string(settings.fallback_color),
        enforce_color: settings.enforce_color,
        size: settings.fallback_size,
        enforce_size: settings.enforce_size,
        ignore_transforms: settings.ignore_transforms,
    }
}

fn json_to_settings(data: &JsonValue, registry: &RendererRegistry) -> anyhow::Result<EditorSettings> {
    let defaults = EditorSettings::default();

    let fill = if data["fill"].is_null() {
        defaults.fill
    } else {
        FillSettings {
            fallback_color: string_to_color(&data["fill"]["color"], "fill.color")?,
            enforce_color: data["fill"]["enforce_color"].as_bool().ok_or_else(|| wrong_type("fill.enforce_color"))?,
            ignore_transforms: data["fill"]["ignore_transforms"].as_bool().unwrap_or(false),
        }
    };

    let canvas = if data["canvas"].is_null() {
        defaults.canvas
    } else {
        CanvasSettings {
            width: data["canvas"]["width"].as_i32().ok_or_else(|| wrong_type("canvas.width"))?,
            height: data["canvas"]["height"].as_i32().ok_or_else(|| wrong_type("canvas.height"))?,
            background: string_to_color(&data["canvas"]["background"], "canvas.background")?,
        }
    };

    Ok(EditorSettings {
        wireframe: json_to_render_settings(&data["wireframe"], "wireframe", defaults.wireframe, |name| registry.line(name))?,
        points: json_to_render_settings(&data["points"], "points", defaults.points, |name| registry.point(name))?,
        splines: json_to_render_settings(&data["splines"], "splines", defaults.splines, |name| registry.spline(name))?,
        fill,
        canvas,
    })
}

fn settings_to_json(settings: &EditorSettings) -> JsonValue {
    object! {
        wireframe: render_settings_to_json(&settings.wireframe, settings.wireframe.fallback_renderer.name()),
        points: render_settings_to_json(&settings.points, settings.points.fallback_renderer.name()),
        splines: render_settings_to_json(&settings.splines, settings.splines.fallback_renderer.name()),
        fill: {
            color: color_to_string(settings.fill.fallback_color),
            enforce_color: settings.fill.enforce_color,
            ignore_transforms: settings.fill.ignore_transforms,
        },
        canvas: {
            width: settings.canvas.width,
            height: settings.canvas.height,
            background: color_to_string(settings.canvas.background),
        },
    }
}
