//! # Design files
//!
//! A design is saved as a single JSON document. The base image travels inline as a PNG data
//! URL, or by absolute path on disk, so one file is all a design needs. Object IDs are not
//! part of the format and fresh ones are allocated on import.

pub mod data_url;

use crate::editor::Editor;
use crate::raster::{self, Adjustments, RasterError, MAX_PIXELS};
use crate::render::RenderError;
use crate::repositories::images::ImageId;
use crate::state::{BaseImage, CanvasSpec, Design, GraphicCollection, TextCollection, Transform};
use data_url::DataUrlError;
use std::path::PathBuf;

/// Format version written by this build.
pub const VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error("design file version {0} is newer than supported ({VERSION})")]
    UnsupportedVersion(u32),
    #[error("malformed design file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bad image data URL: {0}")]
    DataUrl(#[from] DataUrlError),
    #[error("image path {0:?} must be absolute")]
    RelativePath(PathBuf),
    #[error("image sources must be inline data URLs")]
    PathNotAllowed,
    #[error("canvas {0}x{1} is empty or exceeds {MAX_PIXELS} pixels")]
    BadCanvas(u32, u32),
    #[error("reading {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("image {0} is no longer available")]
    MissingImage(ImageId),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Where an image `src` may be loaded from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sources {
    /// Data URLs only. Designs from remote clients must never reach the local disk.
    InlineOnly,
    /// Data URLs, or absolute paths on the local filesystem.
    InlineOrPath,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    /// A `data:` URL, or an absolute file path.
    pub src: String,
    #[serde(default)]
    pub transform: Transform,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignFile {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub canvas: CanvasSpec,
    #[serde(default)]
    pub image: Option<ImageEntry>,
    #[serde(default)]
    pub texts: TextCollection,
    #[serde(default)]
    pub graphics: GraphicCollection,
    #[serde(default)]
    pub adjustments: Adjustments,
}
fn current_version() -> u32 {
    VERSION
}
impl DesignFile {
    pub fn from_json(text: &str) -> Result<Self, IoError> {
        let file: Self = serde_json::from_str(text)?;
        if file.version > VERSION {
            return Err(IoError::UnsupportedVersion(file.version));
        }
        Ok(file)
    }
    pub fn to_json(&self) -> Result<String, IoError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
    /// Snapshot the editor's present design, inlining its image.
    pub fn export(editor: &Editor) -> Result<Self, IoError> {
        let design = editor.design();
        let image = design
            .image
            .map(|base| -> Result<ImageEntry, IoError> {
                let pixels = editor
                    .images()
                    .get(base.source)
                    .ok_or(IoError::MissingImage(base.source))?;
                Ok(ImageEntry {
                    src: data_url::encode_png(&pixels)?,
                    transform: base.transform,
                })
            })
            .transpose()?;
        Ok(Self {
            version: VERSION,
            canvas: design.canvas,
            image,
            texts: design.texts.clone(),
            graphics: design.graphics.clone(),
            adjustments: editor.adjustments(),
        })
    }
    /// Decode the image and build the design, storing pixels in the editor's repository.
    /// The image is downscaled like an upload, keeping its size on the canvas.
    pub fn into_design(
        self,
        editor: &Editor,
        sources: Sources,
    ) -> Result<(Design, Adjustments), IoError> {
        if self.version > VERSION {
            return Err(IoError::UnsupportedVersion(self.version));
        }
        let [width, height] = self.canvas.size();
        if width == 0 || height == 0 || u64::from(width) * u64::from(height) > MAX_PIXELS {
            return Err(IoError::BadCanvas(width, height));
        }
        let image = self
            .image
            .map(|entry| store_image(editor, entry, sources))
            .transpose()?;
        let design = Design {
            canvas: self.canvas,
            image,
            texts: self.texts,
            graphics: self.graphics,
        };
        Ok((design, self.adjustments.clamped()))
    }
    /// Replace the editor's session with this design. History starts over.
    pub fn import(self, editor: &mut Editor, sources: Sources) -> Result<(), IoError> {
        let (design, adjustments) = self.into_design(editor, sources)?;
        log::info!(
            "imported design with {} texts, {} graphics",
            design.texts.len(),
            design.graphics.len()
        );
        editor.reset_to(design);
        editor.set_adjustments(adjustments);
        Ok(())
    }
}

fn store_image(
    editor: &Editor,
    entry: ImageEntry,
    sources: Sources,
) -> Result<BaseImage, IoError> {
    let decoded = raster::decode(&load_source(&entry.src, sources)?)?;
    let original = [decoded.width(), decoded.height()];
    let pixels = raster::resize_to_max(decoded, editor.config().max_dimension);
    let size = [pixels.width(), pixels.height()];
    let mut transform = entry.transform;
    #[allow(clippy::cast_precision_loss)]
    {
        transform.scale_x *= original[0] as f32 / size[0] as f32;
        transform.scale_y *= original[1] as f32 / size[1] as f32;
    }
    Ok(BaseImage {
        source: editor.images().insert(pixels),
        size,
        transform,
    })
}

/// Raw encoded bytes behind an image `src`.
fn load_source(src: &str, sources: Sources) -> Result<Vec<u8>, IoError> {
    if data_url::is_data_url(src) {
        return Ok(data_url::decode(src)?.data);
    }
    if sources == Sources::InlineOnly {
        return Err(IoError::PathNotAllowed);
    }
    let path = PathBuf::from(src);
    if !path.is_absolute() {
        return Err(IoError::RelativePath(path));
    }
    std::fs::read(&path).map_err(|source| IoError::Read { path, source })
}

#[cfg(test)]
mod test {
    use super::{DesignFile, IoError, Sources, VERSION};
    use crate::editor::{Editor, EditorConfig};
    use crate::raster::Adjustments;
    use crate::repositories::{fonts::Fonts, images::Images};
    use crate::state::graphics::{BasicShape, CatalogArt, Variant};
    use crate::state::text::TextDraft;
    use std::sync::Arc;

    fn editor() -> Editor {
        Editor::new(
            Arc::new(Images::new()),
            Arc::new(Fonts::empty()),
            EditorConfig::default(),
        )
    }
    #[test]
    fn export_import_keeps_design() {
        let mut editor = editor();
        let image = image::RgbaImage::from_pixel(8, 4, image::Rgba([1, 2, 3, 255]));
        editor
            .load_image(&crate::render::encode_png(&image).unwrap())
            .unwrap();
        editor.save_text(TextDraft::new("hello"));
        editor.add_graphic(CatalogArt::Shape {
            shape: BasicShape::Star,
            variant: Variant::Outline,
        });
        editor.set_adjustments(Adjustments {
            contrast: 30.0,
            ..Adjustments::IDENTITY
        });
        let json = DesignFile::export(&editor).unwrap().to_json().unwrap();

        let mut other = self::editor();
        DesignFile::from_json(&json)
            .unwrap()
            .import(&mut other, Sources::InlineOnly)
            .unwrap();
        let (a, b) = (editor.design(), other.design());
        assert_eq!(a.canvas, b.canvas);
        assert_eq!(b.texts.len(), 1);
        assert_eq!(b.graphics.len(), 1);
        assert_eq!(
            b.graphics.iter().next().unwrap().shape,
            a.graphics.iter().next().unwrap().shape
        );
        let (ia, ib) = (a.image.unwrap(), b.image.unwrap());
        assert_eq!(ia.transform, ib.transform);
        assert_eq!(*other.images().get(ib.source).unwrap(), image);
        assert_eq!(other.adjustments().contrast, 30.0);
        assert!(!other.history().can_undo());
    }
    #[test]
    fn minimal_file() {
        let file = DesignFile::from_json("{}").unwrap();
        assert_eq!(file.version, VERSION);
        assert!(file.image.is_none());
        let mut editor = editor();
        file.import(&mut editor, Sources::InlineOnly).unwrap();
        assert!(editor.design().is_empty());
    }
    #[test]
    fn rejects_future_and_relative() {
        assert!(matches!(
            DesignFile::from_json(r#"{"version": 99}"#),
            Err(IoError::UnsupportedVersion(99))
        ));
        let file = DesignFile::from_json(r#"{"image": {"src": "mug.png"}}"#).unwrap();
        assert!(matches!(
            file.import(&mut editor(), Sources::InlineOrPath),
            Err(IoError::RelativePath(_))
        ));
    }
    #[test]
    fn inline_only_refuses_paths() {
        let path = std::env::temp_dir().join("mugsmith-inline-only.png");
        let image = image::RgbaImage::from_pixel(3, 2, image::Rgba([7, 77, 177, 255]));
        std::fs::write(&path, crate::render::encode_png(&image).unwrap()).unwrap();
        let json = serde_json::json!({ "image": { "src": path } }).to_string();

        let mut editor = editor();
        let file = DesignFile::from_json(&json).unwrap();
        assert!(matches!(
            file.clone().import(&mut editor, Sources::InlineOnly),
            Err(IoError::PathNotAllowed)
        ));
        assert!(editor.images().is_empty());
        file.import(&mut editor, Sources::InlineOrPath).unwrap();
        assert_eq!(editor.design().image.unwrap().size, [3, 2]);
        let _ = std::fs::remove_file(path);
    }
    #[test]
    fn rejects_unreasonable_canvas() {
        for canvas in [[0, 300], [900, 0], [u32::MAX, u32::MAX], [8192, 4096]] {
            let json = serde_json::json!({
                "canvas": { "width": canvas[0], "height": canvas[1] }
            })
            .to_string();
            let file = DesignFile::from_json(&json).unwrap();
            assert!(matches!(
                file.import(&mut editor(), Sources::InlineOnly),
                Err(IoError::BadCanvas(..))
            ));
        }
        let largest = r#"{"canvas": {"width": 4096, "height": 4096}}"#;
        DesignFile::from_json(largest)
            .unwrap()
            .import(&mut editor(), Sources::InlineOnly)
            .unwrap();
    }
    #[test]
    fn large_import_is_downscaled_in_place() {
        let image = image::RgbaImage::from_pixel(2048, 512, image::Rgba([9, 9, 9, 255]));
        let src = super::data_url::encode_png(&image).unwrap();
        let json = serde_json::json!({
            "image": {
                "src": src,
                "transform": { "x": 10, "y": 20, "scaleX": 0.25, "scaleY": 0.5 }
            }
        })
        .to_string();
        let mut editor = editor();
        DesignFile::from_json(&json)
            .unwrap()
            .import(&mut editor, Sources::InlineOnly)
            .unwrap();
        let base = editor.design().image.unwrap();
        assert_eq!(base.size, [1024, 256]);
        assert_eq!(editor.images().dimensions(base.source), Some([1024, 256]));
        // Same footprint on the canvas as before the downscale.
        assert_eq!(base.transform.scale_x, 0.5);
        assert_eq!(base.transform.scale_y, 1.0);
        assert_eq!((base.transform.x, base.transform.y), (10.0, 20.0));
    }
    #[test]
    fn text_json_shape() {
        let json = r##"{
            "texts": [{
                "content": "Hi",
                "fontFamily": "Georgia",
                "fontSize": 32,
                "fill": "#ff0000",
                "transform": {"x": 10, "y": 20}
            }]
        }"##;
        let file = DesignFile::from_json(json).unwrap();
        let text = file.texts.iter().next().unwrap();
        assert_eq!(text.font_family, "Georgia");
        assert_eq!(text.opacity, 1.0);
        assert_eq!(text.transform.scale_x, 1.0);
        assert_eq!(text.transform.y, 20.0);
    }
}
