#![forbid(unsafe_code)]

//! A toolkit that keeps its object tree in memory and records every call.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rustc_hash::FxHashMap;
use sbx_core::event::{AccessAction, KeyAction, MouseAction};
use sbx_core::{ColorClass, Size};
use sbx_runtime::{ImageNode, Toolkit, ToolkitError};
use sbx_scene::ObjectRef;

/// Order in which [`RecordingToolkit::delete`] reports a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DestroyOrder {
    /// The deleted object first, then its contents depth-first.
    #[default]
    ParentFirst,
    /// Contents depth-first, the deleted object last.
    ChildrenFirst,
}

/// What a recorded object is.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Layout { path: PathBuf, group: String },
    Image { size: Size, keep_aspect: bool, snapshot: bool },
}

/// A live object of the recording toolkit.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedObject {
    pub kind: ObjectKind,
    pub size: Option<Size>,
    /// Swallowed content by part name.
    pub parts: BTreeMap<String, ObjectRef>,
    pub texts: BTreeMap<String, String>,
    pub descriptions: BTreeMap<String, String>,
    pub drags: BTreeMap<String, (f64, f64)>,
    pub color_classes: BTreeMap<String, ColorClass>,
}

impl RecordedObject {
    fn new(kind: ObjectKind, size: Option<Size>) -> Self {
        Self {
            kind,
            size,
            parts: BTreeMap::new(),
            texts: BTreeMap::new(),
            descriptions: BTreeMap::new(),
            drags: BTreeMap::new(),
            color_classes: BTreeMap::new(),
        }
    }
}

/// One call that does not leave state on an object.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Signal { object: ObjectRef, signal: String, source: String },
    Mouse { object: ObjectRef, action: MouseAction, x: f64, y: f64, timestamp: Duration },
    Key { object: ObjectRef, action: KeyAction, key_code: u32 },
    Access { object: ObjectRef, action: AccessAction },
    Paint { object: ObjectRef, size: Size },
}

/// In-memory [`Toolkit`].
#[derive(Debug, Default)]
pub struct RecordingToolkit {
    next_object: u64,
    objects: BTreeMap<ObjectRef, RecordedObject>,
    calls: Vec<Call>,
    deleted: Vec<ObjectRef>,
    destroy_order: DestroyOrder,
    part_geometry: FxHashMap<String, Size>,
    access_results: FxHashMap<AccessAction, bool>,
    key_result: bool,
    load_failure: Option<ToolkitError>,
    image_failure: Option<ToolkitError>,
    swallow_failure: Option<ToolkitError>,
}

impl RecordingToolkit {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_object: 1,
            key_result: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_destroy_order(mut self, order: DestroyOrder) -> Self {
        self.destroy_order = order;
        self
    }

    /// Report `size` as the geometry of every part named `part`.
    pub fn set_part_geometry(&mut self, part: &str, size: Size) {
        self.part_geometry.insert(part.to_string(), size);
    }

    /// Result of the next accessibility actions of this kind (default `true`).
    pub fn set_access_result(&mut self, action: AccessAction, handled: bool) {
        self.access_results.insert(action, handled);
    }

    pub fn set_key_result(&mut self, handled: bool) {
        self.key_result = handled;
    }

    /// Make every following layout load fail with `error`.
    pub fn fail_loads(&mut self, error: Option<ToolkitError>) {
        self.load_failure = error;
    }

    pub fn fail_images(&mut self, error: Option<ToolkitError>) {
        self.image_failure = error;
    }

    pub fn fail_swallows(&mut self, error: Option<ToolkitError>) {
        self.swallow_failure = error;
    }

    /// Live object, if not deleted.
    #[must_use]
    pub fn object(&self, object: ObjectRef) -> Option<&RecordedObject> {
        self.objects.get(&object)
    }

    #[must_use]
    pub fn live_objects(&self) -> usize {
        self.objects.len()
    }

    /// Content swallowed into `part` of `container`.
    #[must_use]
    pub fn swallowed(&self, container: ObjectRef, part: &str) -> Option<ObjectRef> {
        self.objects.get(&container)?.parts.get(part).copied()
    }

    /// Every object deleted so far, in destruction order.
    #[must_use]
    pub fn deleted(&self) -> &[ObjectRef] {
        &self.deleted
    }

    #[must_use]
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// The first layout object ever loaded that is still alive.
    #[must_use]
    pub fn first_layout(&self) -> Option<ObjectRef> {
        self.objects
            .iter()
            .find(|(_, obj)| matches!(obj.kind, ObjectKind::Layout { .. }))
            .map(|(object, _)| *object)
    }

    fn allocate(&mut self, kind: ObjectKind, size: Option<Size>) -> ObjectRef {
        let object = ObjectRef::from_raw(self.next_object);
        self.next_object += 1;
        self.objects.insert(object, RecordedObject::new(kind, size));
        object
    }

    fn collect(&self, object: ObjectRef, out: &mut Vec<ObjectRef>) {
        let Some(record) = self.objects.get(&object) else {
            return;
        };
        if self.destroy_order == DestroyOrder::ParentFirst {
            out.push(object);
        }
        for content in record.parts.values() {
            self.collect(*content, out);
        }
        if self.destroy_order == DestroyOrder::ChildrenFirst {
            out.push(object);
        }
    }
}

impl Toolkit for RecordingToolkit {
    fn load_layout(&mut self, path: &Path, group: &str) -> Result<ObjectRef, ToolkitError> {
        if let Some(err) = self.load_failure.clone() {
            return Err(err);
        }
        Ok(self.allocate(
            ObjectKind::Layout {
                path: path.to_path_buf(),
                group: group.to_string(),
            },
            None,
        ))
    }

    fn delete(&mut self, object: ObjectRef) -> Vec<ObjectRef> {
        let mut destroyed = Vec::new();
        self.collect(object, &mut destroyed);
        for record in self.objects.values_mut() {
            record.parts.retain(|_, content| *content != object);
        }
        for dead in &destroyed {
            self.objects.remove(dead);
        }
        self.deleted.extend_from_slice(&destroyed);
        tracing::trace!(target: "sbx.harness", %object, count = destroyed.len(), "deleted");
        destroyed
    }

    fn part_swallow(
        &mut self,
        container: ObjectRef,
        part: &str,
        content: ObjectRef,
    ) -> Result<(), ToolkitError> {
        if let Some(err) = self.swallow_failure.clone() {
            return Err(err);
        }
        let record = self.objects.get_mut(&container).ok_or(ToolkitError::Fault {
            message: format!("swallow into unknown {container}"),
        })?;
        record.parts.insert(part.to_string(), content);
        Ok(())
    }

    fn part_unswallow(&mut self, container: ObjectRef, part: &str) -> Option<ObjectRef> {
        self.objects.get_mut(&container)?.parts.remove(part)
    }

    fn part_geometry(&self, object: ObjectRef, part: &str) -> Option<Size> {
        self.objects.get(&object)?;
        self.part_geometry.get(part).copied()
    }

    fn part_text_set(&mut self, object: ObjectRef, part: &str, text: &str) {
        if let Some(record) = self.objects.get_mut(&object) {
            record.texts.insert(part.to_string(), text.to_string());
        }
    }

    fn set_access_description(&mut self, object: ObjectRef, part: &str, description: Option<&str>) {
        if let Some(record) = self.objects.get_mut(&object) {
            match description {
                Some(text) => {
                    record.descriptions.insert(part.to_string(), text.to_string());
                }
                None => {
                    record.descriptions.remove(part);
                }
            }
        }
    }

    fn signal_emit(&mut self, object: ObjectRef, signal: &str, source: &str) {
        self.calls.push(Call::Signal {
            object,
            signal: signal.to_string(),
            source: source.to_string(),
        });
    }

    fn part_drag_value_set(&mut self, object: ObjectRef, part: &str, x: f64, y: f64) {
        if let Some(record) = self.objects.get_mut(&object) {
            record.drags.insert(part.to_string(), (x, y));
        }
    }

    fn resize(&mut self, object: ObjectRef, size: Size) {
        if let Some(record) = self.objects.get_mut(&object) {
            record.size = Some(size);
        }
    }

    fn create_image(&mut self, node: ImageNode) -> Result<ObjectRef, ToolkitError> {
        if let Some(err) = self.image_failure.clone() {
            return Err(err);
        }
        let size = node.size();
        let kind = match node {
            ImageNode::Scaled { keep_aspect, .. } => ObjectKind::Image {
                size,
                keep_aspect,
                snapshot: false,
            },
            ImageNode::Snapshot { .. } => ObjectKind::Image {
                size,
                keep_aspect: false,
                snapshot: true,
            },
        };
        Ok(self.allocate(kind, Some(size)))
    }

    fn set_color_class(&mut self, object: ObjectRef, class: &str, colors: &ColorClass) {
        if let Some(record) = self.objects.get_mut(&object) {
            record.color_classes.insert(class.to_string(), *colors);
        }
    }

    fn feed_mouse(
        &mut self,
        object: ObjectRef,
        action: MouseAction,
        x: f64,
        y: f64,
        timestamp: Duration,
    ) {
        self.calls.push(Call::Mouse {
            object,
            action,
            x,
            y,
            timestamp,
        });
    }

    fn feed_key(&mut self, object: ObjectRef, action: KeyAction, key_code: u32) -> bool {
        self.calls.push(Call::Key {
            object,
            action,
            key_code,
        });
        self.key_result
    }

    fn access_action(&mut self, object: ObjectRef, action: AccessAction, _x: f64, _y: f64) -> bool {
        self.calls.push(Call::Access { object, action });
        self.access_results.get(&action).copied().unwrap_or(true)
    }

    fn paint(
        &mut self,
        object: ObjectRef,
        target: &mut [u8],
        size: Size,
    ) -> Result<(), ToolkitError> {
        if target.len() as u64 != size.area() * 4 {
            return Err(ToolkitError::Fault {
                message: format!("target holds {} bytes for {size:?}", target.len()),
            });
        }
        let shade = (object.raw() & 0xFF) as u8;
        for pixel in target.chunks_exact_mut(4) {
            pixel.copy_from_slice(&[shade, shade, shade, 0xFF]);
        }
        self.calls.push(Call::Paint { object, size });
        Ok(())
    }
}
