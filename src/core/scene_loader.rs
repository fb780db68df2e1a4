// Copyright @yucwang 2026

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::error::ConfigError;
use crate::core::material::GraphicParams;
use crate::core::scene::Scene;
use crate::core::settings::RenderSettings;
use crate::core::shape::Shape;
use crate::io::obj_utils::ImportError;
use crate::math::constants::{Float, Vector3f};
use crate::sensors::perspective::{PerspectiveCamera, DEFAULT_FOV};
use crate::shapes::lens::Lens;
use crate::shapes::polygon::Polygon;
use crate::shapes::polygonal_model::PolygonalModel;
use crate::shapes::sphere::Sphere;

#[derive(Debug)]
pub enum SceneLoadError {
    Io(std::io::Error),
    Parse(String),
    MissingField(&'static str),
    Config(ConfigError),
    Import(ImportError),
}

impl From<std::io::Error> for SceneLoadError {
    fn from(err: std::io::Error) -> Self {
        SceneLoadError::Io(err)
    }
}

impl From<ConfigError> for SceneLoadError {
    fn from(err: ConfigError) -> Self {
        SceneLoadError::Config(err)
    }
}

impl From<ImportError> for SceneLoadError {
    fn from(err: ImportError) -> Self {
        SceneLoadError::Import(err)
    }
}

impl fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneLoadError::Io(err) => write!(f, "io error: {}", err),
            SceneLoadError::Parse(msg) => write!(f, "parse error: {}", msg),
            SceneLoadError::MissingField(field) => write!(f, "missing field: {}", field),
            SceneLoadError::Config(err) => write!(f, "invalid scene: {}", err),
            SceneLoadError::Import(err) => write!(f, "mesh import failed: {}", err),
        }
    }
}

impl std::error::Error for SceneLoadError {}

pub struct SceneLoadResult {
    pub scene: Scene,
    pub settings: RenderSettings,
    pub width: Option<usize>,
    pub height: Option<usize>,
}

pub fn load_scene_with_settings<P: AsRef<Path>>(path: P) -> Result<SceneLoadResult, SceneLoadError> {
    let path = path.as_ref();
    log::info!("Loading scene from: {}.", path.display());
    let xml = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_scene(&xml, base_dir)
}

type Attributes = HashMap<String, String>;

// A shape element whose material children are still being read.
struct PendingShape {
    kind: String,
    attrs: Attributes,
    params: GraphicParams,
}

pub fn parse_scene(xml: &str, base_dir: &Path) -> Result<SceneLoadResult, SceneLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut scene = Scene::new();
    let mut settings = RenderSettings::default();
    let mut width: Option<usize> = None;
    let mut height: Option<usize> = None;
    let mut pending: Option<PendingShape> = None;

    loop {
        let (e, is_empty) = match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => (e.into_owned(), false),
            Ok(Event::Empty(e)) => (e.into_owned(), true),
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if pending.as_ref().map_or(false, |shape| shape.kind == name) {
                    if let Some(shape) = pending.take() {
                        scene.add_object(build_shape(shape, base_dir)?);
                    }
                }
                buf.clear();
                continue;
            }
            Ok(_) => {
                buf.clear();
                continue;
            }
            Err(e) => return Err(SceneLoadError::Parse(format!("xml error at {}: {}", reader.buffer_position(), e))),
        };
        buf.clear();

        let attrs = attributes(&e)?;
        match e.name().as_ref() {
            b"scene" => {}
            b"settings" => apply_settings(&attrs, &mut settings)?,
            b"film" => {
                width = Some(parse_usize(required(&attrs, "width", "film.width")?)?);
                height = Some(parse_usize(required(&attrs, "height", "film.height")?)?);
            }
            b"camera" => {
                let position = optional_vec3(&attrs, "position")?.unwrap_or_else(Vector3f::zeros);
                let direction = optional_vec3(&attrs, "direction")?.unwrap_or_else(|| Vector3f::new(1.0, 0.0, 0.0));
                let screen_distance = optional_float(&attrs, "screen_distance")?.unwrap_or(1.0);
                let fov = optional_float(&attrs, "fov")?.unwrap_or(DEFAULT_FOV);
                scene.set_camera(PerspectiveCamera::new(position, direction, screen_distance, fov)?);
            }
            b"sphere" | b"polygon" | b"lens" | b"model" => {
                if pending.is_some() {
                    return Err(SceneLoadError::Parse("shapes cannot be nested".to_string()));
                }
                let shape = PendingShape {
                    kind: String::from_utf8_lossy(e.name().as_ref()).to_string(),
                    attrs,
                    params: GraphicParams::default(),
                };
                if is_empty {
                    scene.add_object(build_shape(shape, base_dir)?);
                } else {
                    pending = Some(shape);
                }
            }
            b"material" => {
                let shape = pending.as_mut().ok_or(SceneLoadError::Parse("material outside of a shape".to_string()))?;
                apply_material(&attrs, &mut shape.params)?;
            }
            b"emission" => {
                let shape = pending.as_mut().ok_or(SceneLoadError::Parse("emission outside of a shape".to_string()))?;
                let color = optional_vec3(&attrs, "color")?.unwrap_or_else(|| Vector3f::new(1.0, 1.0, 1.0));
                let intensity = optional_float(&attrs, "intensity")?.unwrap_or(1.0);
                shape.params = shape.params.with_emission(color, intensity);
            }
            other => {
                log::warn!("Ignoring unknown element <{}>.", String::from_utf8_lossy(other));
            }
        }
    }

    if pending.is_some() {
        return Err(SceneLoadError::Parse("unterminated shape element".to_string()));
    }
    settings.validate()?;
    log::info!("Scene loaded, {} objects.", scene.objects().len());

    Ok(SceneLoadResult { scene, settings, width, height })
}

fn build_shape(shape: PendingShape, base_dir: &Path) -> Result<Arc<dyn Shape>, SceneLoadError> {
    let attrs = &shape.attrs;
    let params = shape.params;
    let object: Arc<dyn Shape> = match shape.kind.as_str() {
        "sphere" => {
            let center = parse_vec3(required(attrs, "center", "sphere.center")?)?;
            let radius = parse_float(required(attrs, "radius", "sphere.radius")?)?;
            Arc::new(Sphere::new(center, radius, params)?)
        }
        "polygon" => {
            let v0 = parse_vec3(required(attrs, "v0", "polygon.v0")?)?;
            let v1 = parse_vec3(required(attrs, "v1", "polygon.v1")?)?;
            let v2 = parse_vec3(required(attrs, "v2", "polygon.v2")?)?;
            Arc::new(Polygon::new(v0, v1, v2, params)?)
        }
        "lens" => {
            let position = parse_vec3(required(attrs, "position", "lens.position")?)?;
            let direction = parse_vec3(required(attrs, "direction", "lens.direction")?)?;
            let curve_radius = parse_float(required(attrs, "curve_radius", "lens.curve_radius")?)?;
            let radius = parse_float(required(attrs, "radius", "lens.radius")?)?;
            Arc::new(Lens::new(position, direction, curve_radius, radius, params)?)
        }
        "model" => {
            let filename = required(attrs, "filename", "model.filename")?;
            let mut model = PolygonalModel::from_obj(base_dir.join(filename), params)?;
            if let Some(k) = optional_float(attrs, "scale")? {
                model.scale(k)?;
            }
            if let Some(angle) = optional_float(attrs, "rotate_angle")? {
                let axis = optional_vec3(attrs, "rotate_axis")?.unwrap_or_else(|| Vector3f::new(0.0, 1.0, 0.0));
                model.rotate(&axis, angle)?;
            }
            if let Some(position) = optional_vec3(attrs, "position")? {
                model.set_position(position);
            }
            Arc::new(model)
        }
        other => return Err(SceneLoadError::Parse(format!("unsupported shape: {}", other))),
    };

    Ok(object)
}

fn apply_settings(attrs: &Attributes, settings: &mut RenderSettings) -> Result<(), SceneLoadError> {
    if let Some(v) = attrs.get("depth") {
        settings.rendering_depth = parse_u32(v)?;
    }
    if let Some(v) = attrs.get("photons_per_light") {
        settings.photons_per_light = parse_u32(v)?;
    }
    if let Some(v) = attrs.get("nearest_photons") {
        settings.nearest_photons_num = parse_u32(v)?;
    }
    if let Some(v) = attrs.get("radius") {
        settings.indirect_light_max_r = parse_float(v)?;
    }
    if let Some(v) = attrs.get("filter_constant") {
        settings.filter_constant = parse_float(v)?;
    }
    if let Some(v) = attrs.get("seed") {
        settings.seed = v.parse::<u64>().map_err(|_| SceneLoadError::Parse(format!("invalid seed: {}", v)))?;
    }
    if let Some(v) = attrs.get("background") {
        settings.background = parse_vec3(v)?;
    }
    if let Some(v) = attrs.get("threads") {
        settings.threads = Some(parse_usize(v)?);
    }
    Ok(())
}

fn apply_material(attrs: &Attributes, params: &mut GraphicParams) -> Result<(), SceneLoadError> {
    if let Some(color) = optional_vec3(attrs, "color")? {
        params.color = color;
    }
    if let Some(v) = optional_float(attrs, "transparency")? {
        params.transparency = v;
    }
    if let Some(v) = optional_float(attrs, "reflectivity")? {
        params.reflectivity = v;
    }
    if let Some(v) = optional_float(attrs, "refractive_index")? {
        params.refractive_index = v;
    }
    if let Some(v) = optional_float(attrs, "dispersion_r")? {
        params.dispersion_r = v;
    }
    if let Some(v) = optional_float(attrs, "dispersion_b")? {
        params.dispersion_b = v;
    }
    Ok(())
}

fn attributes(e: &BytesStart) -> Result<Attributes, SceneLoadError> {
    let mut out = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| SceneLoadError::Parse(format!("bad attribute: {}", err)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| SceneLoadError::Parse(format!("bad attribute value: {}", err)))?
            .to_string();
        out.insert(key, value);
    }
    Ok(out)
}

fn required<'a>(attrs: &'a Attributes, key: &str, field: &'static str) -> Result<&'a str, SceneLoadError> {
    attrs.get(key).map(|v| v.as_str()).ok_or(SceneLoadError::MissingField(field))
}

fn optional_float(attrs: &Attributes, key: &str) -> Result<Option<Float>, SceneLoadError> {
    attrs.get(key).map(|v| parse_float(v)).transpose()
}

fn optional_vec3(attrs: &Attributes, key: &str) -> Result<Option<Vector3f>, SceneLoadError> {
    attrs.get(key).map(|v| parse_vec3(v)).transpose()
}

fn parse_float(value: &str) -> Result<Float, SceneLoadError> {
    value.trim().parse::<Float>().map_err(|_| SceneLoadError::Parse(format!("invalid float: {}", value)))
}

fn parse_u32(value: &str) -> Result<u32, SceneLoadError> {
    value.trim().parse::<u32>().map_err(|_| SceneLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_usize(value: &str) -> Result<usize, SceneLoadError> {
    value.trim().parse::<usize>().map_err(|_| SceneLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_vec3(value: &str) -> Result<Vector3f, SceneLoadError> {
    let mut parts = value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty());
    let x = parts.next().ok_or_else(|| SceneLoadError::Parse(format!("invalid vec3: {}", value)))?;
    let y = parts.next().ok_or_else(|| SceneLoadError::Parse(format!("invalid vec3: {}", value)))?;
    let z = parts.next().ok_or_else(|| SceneLoadError::Parse(format!("invalid vec3: {}", value)))?;
    Ok(Vector3f::new(parse_float(x)?, parse_float(y)?, parse_float(z)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"
<scene>
  <settings depth="6" photons_per_light="500" nearest_photons="20" radius="0.2"
            filter_constant="1.5" seed="9" background="0.1, 0.1, 0.2"/>
  <film width="64" height="48"/>
  <camera position="0,1,-5" direction="0,0,1" screen_distance="1" fov="50"/>
  <sphere center="0,4,0" radius="0.5">
    <emission color="1,1,1" intensity="2"/>
  </sphere>
  <sphere center="0,1,0" radius="1">
    <material color="1,1,1" transparency="0.9" refractive_index="1.5" dispersion_r="-0.01" dispersion_b="0.01"/>
  </sphere>
  <lens position="2,1,0" direction="0,1,0" curve_radius="3" radius="1"/>
  <polygon v0="-5,0,-5" v1="5,0,-5" v2="5,0,5">
    <material color="0.8,0.8,0.8" reflectivity="0.2"/>
  </polygon>
</scene>
"#;

    #[test]
    fn test_parse_scene() {
        let result = parse_scene(SCENE, Path::new(".")).unwrap();
        assert_eq!(result.width, Some(64));
        assert_eq!(result.height, Some(48));
        assert_eq!(result.settings.rendering_depth, 6);
        assert_eq!(result.settings.photons_per_light, 500);
        assert_eq!(result.settings.nearest_photons_num, 20);
        assert_eq!(result.settings.seed, 9);
        assert_eq!(result.settings.background, Vector3f::new(0.1, 0.1, 0.2));

        let scene = result.scene;
        assert_eq!(scene.objects().len(), 4);
        assert!(scene.objects()[0].params().emission.is_emissive());
        assert_eq!(scene.objects()[0].params().emission.intensity, 2.0);
        assert_eq!(scene.objects()[1].params().transparency, 0.9);
        assert_eq!(scene.objects()[1].params().dispersion_b, 0.01);
        assert_eq!(scene.objects()[3].params().reflectivity, 0.2);

        let camera = scene.camera().unwrap();
        assert_eq!(camera.position(), Vector3f::new(0.0, 1.0, -5.0));
        assert_eq!(camera.fov(), 50.0);
    }

    #[test]
    fn test_invalid_geometry_aborts_loading() {
        let xml = r#"<scene><lens position="0,0,0" direction="0,0,1" curve_radius="1" radius="2"/></scene>"#;
        assert!(matches!(
            parse_scene(xml, Path::new(".")),
            Err(SceneLoadError::Config(ConfigError::LensCurvature { .. }))
        ));

        let xml = r#"<scene><settings depth="0"/></scene>"#;
        assert!(matches!(parse_scene(xml, Path::new(".")), Err(SceneLoadError::Config(_))));
    }

    #[test]
    fn test_missing_and_malformed_fields() {
        let xml = r#"<scene><sphere center="0,0,0"/></scene>"#;
        assert!(matches!(
            parse_scene(xml, Path::new(".")),
            Err(SceneLoadError::MissingField("sphere.radius"))
        ));

        let xml = r#"<scene><sphere center="0,0" radius="1"/></scene>"#;
        assert!(matches!(parse_scene(xml, Path::new(".")), Err(SceneLoadError::Parse(_))));

        let xml = r#"<scene><material color="1,1,1"/></scene>"#;
        assert!(matches!(parse_scene(xml, Path::new(".")), Err(SceneLoadError::Parse(_))));
    }

    #[test]
    fn test_model_loading() {
        let dir = std::env::temp_dir().join("caustic_scene_loader_test");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("tri.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let xml = r#"<scene><model filename="tri.obj" position="0,0,3" scale="2"/></scene>"#;
        let scene = parse_scene(xml, &dir).unwrap().scene;
        assert_eq!(scene.objects().len(), 1);
        assert_eq!(scene.objects()[0].position(), Vector3f::new(0.0, 0.0, 3.0));

        let xml = r#"<scene><model filename="missing.obj"/></scene>"#;
        assert!(matches!(parse_scene(xml, &dir), Err(SceneLoadError::Import(ImportError::Io(_)))));
        let _ = fs::remove_dir_all(&dir);
    }
}
